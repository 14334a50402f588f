//! Dirty-parameter tracking and handoff reconciliation.
//!
//! A tab edits a private copy of its parameters. Until the server confirms
//! them, the copy is dirty and must be carried back into the project at
//! every handoff point (tab replaced or torn down) so the next mount can
//! recover the draft. Only keys the tab edited (or the project lacks) are
//! written back, so a tab never reverts a shared key another tab changed.

use std::collections::BTreeSet;

use crate::project::{ParamValue, Parameters, ProjectPatch, ProjectSnapshot};
use crate::tab::{SubView, TabKind, TabState};

/// Per-tab draft state plus the rules for folding it back into the project.
#[derive(Debug, Clone, PartialEq)]
pub struct DirtyStateTracker {
    kind: TabKind,
    state: TabState,
    /// Keys edited since the parameters were last clean.
    edited: BTreeSet<String>,
}

impl DirtyStateTracker {
    /// Seed from the project's persisted fields.
    pub fn new(kind: TabKind, snapshot: &ProjectSnapshot) -> Self {
        Self {
            kind,
            state: TabState::seed(kind, snapshot),
            edited: BTreeSet::new(),
        }
    }

    pub fn kind(&self) -> TabKind {
        self.kind
    }

    pub fn state(&self) -> &TabState {
        &self.state
    }

    pub fn parameters(&self) -> &Parameters {
        &self.state.parameters
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.state.parameters_saved
    }

    /// Set `field` and mark the parameters unsaved.
    pub fn record_edit(&mut self, field: impl Into<String>, value: impl Into<ParamValue>) {
        let field = field.into();
        let value = value.into();
        tracing::debug!(tab = %self.kind, field = %field, value = %value, "parameter edited");
        self.state.parameters.insert(field.clone(), value);
        self.state.parameters_saved = false;
        self.edited.insert(field);
    }

    pub fn select_action(&mut self, action: usize) {
        self.state.selected_action = action;
    }

    pub fn request_refresh(&mut self) {
        self.state.request_refresh();
    }

    pub fn take_refresh(&mut self, view: SubView) -> bool {
        self.state.take_refresh(view)
    }

    /// Patch handing this tab's draft to `snapshot`'s project.
    ///
    /// Clean parameters leave the project's parameters alone. When dirty,
    /// the edited keys and any the project is missing are merged over the
    /// project's and carried with `parameters_saved = false`. The selected action is always carried.
    /// Pure: calling it twice with no edit in between yields the same patch.
    pub fn reconcile(&self, snapshot: &ProjectSnapshot) -> ProjectPatch {
        let mut patch = ProjectPatch::empty(snapshot.result_id.clone());
        if self.is_dirty() {
            patch.parameters = Some(self.draft_over(&snapshot.parameters));
            patch.parameters_saved = Some(false);
        }
        patch.selected_action = Some((self.kind, self.state.selected_action));
        patch
    }

    /// Take parameters echoed by a loaded result.
    ///
    /// Only applied while clean; a dirty draft wins over stored values.
    /// Returns whether anything was absorbed.
    pub fn absorb_loaded(&mut self, server: &Parameters) -> bool {
        if self.is_dirty() {
            tracing::debug!(tab = %self.kind, "keeping draft parameters over stored ones");
            return false;
        }
        self.absorb(server);
        true
    }

    /// The server recomputed with this tab's parameters: take its echoed
    /// values, become clean, and return the patch confirming them on the
    /// project.
    pub fn confirm(&mut self, snapshot: &ProjectSnapshot, server: &Parameters) -> ProjectPatch {
        self.absorb(server);
        self.state.parameters_saved = true;
        self.edited.clear();

        let mut patch = ProjectPatch::empty(snapshot.result_id.clone());
        patch.parameters = Some(merge(&snapshot.parameters, server));
        patch.parameters_saved = Some(true);
        patch
    }

    fn draft_over(&self, base: &Parameters) -> Parameters {
        let mut merged = base.clone();
        for (key, value) in &self.state.parameters {
            if self.edited.contains(key) || !merged.contains_key(key) {
                merged.insert(key.clone(), value.clone());
            }
        }
        merged
    }

    fn absorb(&mut self, server: &Parameters) {
        for (key, value) in server {
            if self.kind.owns(key) {
                self.state.parameters.insert(key.clone(), value.clone());
            }
        }
    }
}

fn merge(base: &Parameters, over: &Parameters) -> Parameters {
    let mut merged = base.clone();
    merged.extend(over.iter().map(|(k, v)| (k.clone(), v.clone())));
    merged
}
