//! Tab lifecycle coordination.
//!
//! One [`TabCoordinator`] per mounted tab. It owns the tab's request
//! sequencer, dirty-state tracker, cached result and filtered view, and
//! moves through the phases below:
//!
//! ```text
//! Uninitialized --mount--> Loading --complete--> Ready
//!                            ^  |                  |
//!                            |  +-- recompute -----+
//!                            +--- project switch --+
//! Loading | Ready --teardown--> TornDown
//! ```
//!
//! Every request is issued as a [`FetchRequest`] for the host to perform.
//! Its [`Completion`] is only applied if the request is still the newest
//! one for the tab's resource; teardown advances the generation so late
//! completions are dropped by the same check.

use std::fmt;

use rst_filter::{FilterView, Item};

use crate::dirty::DirtyStateTracker;
use crate::error::{FetchError, Result, SyncError};
use crate::fetch::{Completion, FetchMode, FetchRequest, ResourceDescriptor, ResultSet};
use crate::notify::{NotificationSink, Severity};
use crate::project::{ParamValue, Parameters, ProjectPatch, ProjectSnapshot, ProjectStore};
use crate::sequencer::RequestSequencer;
use crate::tab::{SubView, TabKind, TabState};

/// Lifecycle phase of a tab instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TabPhase {
    Uninitialized,
    Loading,
    Ready,
    TornDown,
}

impl fmt::Display for TabPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::TornDown => "torn down",
        })
    }
}

/// What happened to a completion handed to [`TabCoordinator::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The result was stored and the view recomputed.
    Applied,
    /// The request failed; the tab shows an empty result.
    Failed,
    /// A newer request superseded this one; nothing changed.
    Stale,
}

/// Drives one tab through its lifecycle.
#[derive(Debug)]
pub struct TabCoordinator {
    kind: TabKind,
    phase: TabPhase,
    sequencer: RequestSequencer,
    /// The project this tab is bound to, as last seen plus the tab's own
    /// patches.
    project: Option<ProjectSnapshot>,
    tracker: Option<DirtyStateTracker>,
    items: Vec<Item>,
    view: FilterView,
    outdated: bool,
}

impl TabCoordinator {
    pub fn new(kind: TabKind) -> Self {
        Self {
            kind,
            phase: TabPhase::Uninitialized,
            sequencer: RequestSequencer::new(),
            project: None,
            tracker: None,
            items: Vec::new(),
            view: FilterView::new(),
            outdated: false,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn kind(&self) -> TabKind {
        self.kind
    }

    pub fn phase(&self) -> TabPhase {
        self.phase
    }

    /// Draft state, once mounted.
    pub fn tab_state(&self) -> Option<&TabState> {
        self.tracker.as_ref().map(DirtyStateTracker::state)
    }

    pub fn parameters(&self) -> Option<&Parameters> {
        self.tracker.as_ref().map(DirtyStateTracker::parameters)
    }

    /// Project the tab is currently bound to.
    pub fn project(&self) -> Option<&ProjectSnapshot> {
        self.project.as_ref()
    }

    /// Full cached result.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items passing the active filter, in result order.
    pub fn displayed(&self) -> impl Iterator<Item = &Item> {
        self.view.select(&self.items)
    }

    /// Raw filter text as typed, possibly invalid.
    pub fn filter_text(&self) -> &str {
        self.view.text()
    }

    /// Whether the last accepted result was computed on outdated inputs.
    pub fn is_outdated(&self) -> bool {
        self.outdated
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Seed the tab from the current project and issue the initial load.
    ///
    /// # Errors
    ///
    /// Fails if the tab was already mounted or no project is open.
    pub fn mount<S: ProjectStore + ?Sized>(&mut self, store: &S) -> Result<FetchRequest> {
        self.require(&[TabPhase::Uninitialized], "mount")?;
        let snapshot = store.snapshot().ok_or(SyncError::NoProject)?.clone();
        self.bind(snapshot);
        Ok(self.issue(FetchMode::Load))
    }

    /// Hand the draft to the project and ask the server to recompute.
    ///
    /// Allowed while a previous request is still loading; that request is
    /// superseded.
    ///
    /// # Errors
    ///
    /// Fails unless the tab is loading or ready.
    pub fn recompute<S: ProjectStore + ?Sized>(&mut self, store: &mut S) -> Result<FetchRequest> {
        self.require(&[TabPhase::Loading, TabPhase::Ready], "recompute")?;
        self.hand_off(store);
        Ok(self.issue(FetchMode::Recompute))
    }

    /// React to the host switching the open project.
    ///
    /// Reconciles the draft into the outgoing project, rebinds to the new
    /// one and issues a load. Returns `None` if the project identity did
    /// not actually change.
    ///
    /// # Errors
    ///
    /// Fails unless the tab is loading or ready, or if no project is open.
    pub fn project_replaced<S: ProjectStore + ?Sized>(
        &mut self,
        store: &mut S,
    ) -> Result<Option<FetchRequest>> {
        self.require(&[TabPhase::Loading, TabPhase::Ready], "switch project")?;
        let incoming = store.snapshot().ok_or(SyncError::NoProject)?.clone();
        if self
            .project
            .as_ref()
            .is_some_and(|outgoing| outgoing.result_id == incoming.result_id)
        {
            return Ok(None);
        }

        self.hand_off(store);
        tracing::info!(tab = %self.kind, project = %incoming.result_id, "tab rebound to new project");
        self.items.clear();
        self.view.clear();
        self.outdated = false;
        self.bind(incoming);
        Ok(Some(self.issue(FetchMode::Load)))
    }

    /// Apply a settled request.
    ///
    /// Stale completions are dropped without touching any state. A current
    /// failure leaves the tab ready with an empty result and one error
    /// notification.
    pub fn complete<S, N>(
        &mut self,
        completion: Completion,
        store: &mut S,
        sink: &mut N,
    ) -> CompletionOutcome
    where
        S: ProjectStore + ?Sized,
        N: NotificationSink + ?Sized,
    {
        let Completion { request, outcome } = completion;
        if !self.sequencer.is_current(&request.token) {
            tracing::debug!(
                resource = %request.token.resource,
                generation = request.token.generation,
                current = self.sequencer.current(&request.token.resource),
                "stale response dropped"
            );
            return CompletionOutcome::Stale;
        }

        match outcome {
            Ok(result) => {
                self.accept(request.descriptor.mode, result, store, sink);
                CompletionOutcome::Applied
            }
            Err(err) => {
                tracing::warn!(
                    tab = %self.kind,
                    token = %request.token,
                    error = %err,
                    "fetch failed"
                );
                self.items.clear();
                self.view.clear();
                sink.notify(&failure_message(&err), Severity::Error);
                self.transition(TabPhase::Ready);
                CompletionOutcome::Failed
            }
        }
    }

    /// Reconcile into the project and stop accepting completions.
    ///
    /// Runs even with a request in flight; that request's completion will
    /// be reported stale. Tearing down twice is a no-op.
    pub fn teardown<S: ProjectStore + ?Sized>(&mut self, store: &mut S) {
        match self.phase {
            TabPhase::TornDown => return,
            TabPhase::Uninitialized => {}
            TabPhase::Loading | TabPhase::Ready => self.hand_off(store),
        }
        self.sequencer.invalidate(self.kind.resource_name());
        self.transition(TabPhase::TornDown);
    }

    // =========================================================================
    // User input
    // =========================================================================

    /// Replace the filter text and recompute the displayed set.
    ///
    /// On a syntax error the raw text is kept, the previous displayed set
    /// stays on screen and one error notification is emitted. Returns
    /// whether the filter was applied.
    pub fn set_filter<N: NotificationSink + ?Sized>(
        &mut self,
        text: impl Into<String>,
        sink: &mut N,
    ) -> bool {
        match self.view.set_text(text, &self.items) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(tab = %self.kind, error = %err, "filter rejected");
                sink.notify(&err.user_message(), Severity::Error);
                false
            }
        }
    }

    /// Edit one parameter of the draft.
    ///
    /// Ignored unless the tab is ready, so a draft never races a request.
    /// Returns whether the edit was recorded.
    pub fn edit_parameter(&mut self, field: &str, value: impl Into<ParamValue>) -> bool {
        if self.phase != TabPhase::Ready {
            tracing::debug!(tab = %self.kind, phase = %self.phase, field, "parameter edit ignored");
            return false;
        }
        let Some(tracker) = self.tracker.as_mut() else {
            return false;
        };
        tracker.record_edit(field, value);
        true
    }

    /// Choose the tab's active action. Always allowed once mounted.
    pub fn select_action(&mut self, action: usize) {
        if let Some(tracker) = self.tracker.as_mut() {
            tracker.select_action(action);
        }
    }

    /// Return and clear the refresh flag of a dependent sub-view.
    pub fn take_refresh(&mut self, view: SubView) -> bool {
        self.tracker
            .as_mut()
            .is_some_and(|tracker| tracker.take_refresh(view))
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn require(&self, allowed: &[TabPhase], action: &'static str) -> Result<()> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SyncError::InvalidPhase {
                action,
                phase: self.phase,
            })
        }
    }

    fn transition(&mut self, next: TabPhase) {
        if self.phase != next {
            tracing::debug!(tab = %self.kind, from = %self.phase, to = %next, "tab phase changed");
            self.phase = next;
        }
    }

    fn bind(&mut self, snapshot: ProjectSnapshot) {
        self.tracker = Some(DirtyStateTracker::new(self.kind, &snapshot));
        self.project = Some(snapshot);
    }

    fn issue(&mut self, mode: FetchMode) -> FetchRequest {
        let token = self.sequencer.begin(self.kind.resource_name());
        let parameters = match (mode, self.tracker.as_ref()) {
            (FetchMode::Recompute, Some(tracker)) => tracker.parameters().clone(),
            _ => Parameters::new(),
        };
        let result_id = self
            .project
            .as_ref()
            .map(|project| project.result_id.clone())
            .unwrap_or_default();

        self.transition(TabPhase::Loading);
        FetchRequest {
            token,
            descriptor: ResourceDescriptor {
                kind: self.kind,
                result_id,
                mode,
                parameters,
            },
        }
    }

    /// Replace the bound copy with the store's version of the same project,
    /// so patches merge over edits other tabs have already handed off.
    fn refresh_project<S: ProjectStore + ?Sized>(&mut self, store: &S) {
        if let Some(project) = self.project.as_mut()
            && let Some(live) = store.project(&project.result_id)
        {
            *project = live.clone();
        }
    }

    /// Reconcile the draft into the bound project.
    fn hand_off<S: ProjectStore + ?Sized>(&mut self, store: &mut S) {
        self.refresh_project(store);
        let (Some(tracker), Some(project)) = (self.tracker.as_ref(), self.project.as_mut()) else {
            return;
        };
        let patch = tracker.reconcile(project);
        tracing::info!(
            tab = %self.kind,
            project = %patch.target,
            dirty = tracker.is_dirty(),
            "handing tab state to project"
        );
        patch.apply_to(project);
        store.apply_patch(patch);
    }

    fn accept<S, N>(&mut self, mode: FetchMode, result: ResultSet, store: &mut S, sink: &mut N)
    where
        S: ProjectStore + ?Sized,
        N: NotificationSink + ?Sized,
    {
        let ResultSet {
            items,
            parameters,
            freshness,
            external_data,
        } = result;

        self.refresh_project(store);
        if let (Some(tracker), Some(project)) = (self.tracker.as_mut(), self.project.as_mut()) {
            let mut patch = match mode {
                FetchMode::Load => {
                    tracker.absorb_loaded(&parameters);
                    ProjectPatch::empty(project.result_id.clone())
                }
                FetchMode::Recompute => tracker.confirm(project, &parameters),
            };
            patch.external_data = external_data;
            tracker.request_refresh();

            if !patch.is_empty() {
                patch.apply_to(project);
                store.apply_patch(patch);
            }
        }

        self.items = items;
        self.view.refresh(&self.items);
        self.outdated = freshness.is_outdated();
        if self.outdated {
            sink.notify(
                &format!(
                    "{} result is outdated. Recalculate to reflect the current data.",
                    self.kind.label()
                ),
                Severity::Warning,
            );
        }

        tracing::debug!(
            tab = %self.kind,
            mode = %mode,
            items = self.items.len(),
            "result accepted"
        );
        self.transition(TabPhase::Ready);
    }
}

/// Notification text for a failed fetch, with the hint when there is one.
fn failure_message(err: &FetchError) -> String {
    let message = err.user_message();
    match err.suggestion() {
        Some(hint) => format!("{}. {hint}", message.trim_end_matches('.')),
        None => message,
    }
}
