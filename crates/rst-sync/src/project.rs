//! Shared project model as seen by the tabs.
//!
//! The project snapshot is owned by whoever hosts the tabs. Tabs only read
//! a snapshot and hand back a [`ProjectPatch`]; [`ProjectStore::apply_patch`]
//! is the one write path into shared state.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SyncError};
use crate::tab::TabKind;

/// Server-side identity of an opened project.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultId(pub String);

impl ResultId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResultId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A single computation parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Computation parameters keyed by name.
pub type Parameters = BTreeMap<String, ParamValue>;

/// Parameters of a freshly opened project.
pub fn default_parameters() -> Parameters {
    [
        ("consistencyThreshold", ParamValue::Integer(0)),
        (
            "defaultClassificationResult",
            ParamValue::from("majorityDecisionClass"),
        ),
        ("filterSelector", ParamValue::from("")),
        ("numberOfFolds", ParamValue::Integer(2)),
        ("seed", ParamValue::Integer(0)),
        ("typeOfClassifier", ParamValue::from("SimpleRuleClassifier")),
        ("typeOfRules", ParamValue::from("certain")),
        ("typeOfUnions", ParamValue::from("monotonic")),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value))
    .collect()
}

/// Persisted per-project fields the tabs read on mount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub result_id: ResultId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_parameters")]
    pub parameters: Parameters,
    #[serde(default = "saved_by_default")]
    pub parameters_saved: bool,
    /// Last chosen action per tab kind.
    #[serde(default)]
    pub selected_actions: BTreeMap<TabKind, usize>,
    /// Whether the last result was computed on uploaded external data.
    #[serde(default)]
    pub external_data: bool,
}

fn saved_by_default() -> bool {
    true
}

impl ProjectSnapshot {
    /// Snapshot of a project that has never been edited.
    pub fn new(result_id: impl Into<ResultId>, name: impl Into<String>) -> Self {
        Self {
            result_id: result_id.into(),
            name: name.into(),
            parameters: default_parameters(),
            parameters_saved: true,
            selected_actions: BTreeMap::new(),
            external_data: false,
        }
    }

    /// Selected action for `kind`, 0 if never chosen.
    pub fn selected_action(&self, kind: TabKind) -> usize {
        self.selected_actions.get(&kind).copied().unwrap_or(0)
    }
}

/// Changes a tab hands back to the project model.
///
/// `None` leaves the corresponding project field untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    /// Project the patch belongs to. A handoff on project replacement
    /// targets the outgoing project, not the current one.
    pub target: ResultId,
    /// Full replacement parameter map, already merged.
    pub parameters: Option<Parameters>,
    pub parameters_saved: Option<bool>,
    pub selected_action: Option<(TabKind, usize)>,
    pub external_data: Option<bool>,
}

impl ProjectPatch {
    /// Patch that changes nothing.
    pub fn empty(target: ResultId) -> Self {
        Self {
            target,
            parameters: None,
            parameters_saved: None,
            selected_action: None,
            external_data: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_none()
            && self.parameters_saved.is_none()
            && self.selected_action.is_none()
            && self.external_data.is_none()
    }

    /// Write the patch into `snapshot`.
    pub fn apply_to(&self, snapshot: &mut ProjectSnapshot) {
        if let Some(parameters) = &self.parameters {
            snapshot.parameters = parameters.clone();
        }
        if let Some(saved) = self.parameters_saved {
            snapshot.parameters_saved = saved;
        }
        if let Some((kind, action)) = self.selected_action {
            snapshot.selected_actions.insert(kind, action);
        }
        if let Some(external) = self.external_data {
            snapshot.external_data = external;
        }
    }
}

/// Read/write access to the project model, supplied by the tab host.
pub trait ProjectStore {
    /// Snapshot of the currently open project.
    fn snapshot(&self) -> Option<&ProjectSnapshot>;

    /// Project with the given id, if the store holds it.
    fn project(&self, id: &ResultId) -> Option<&ProjectSnapshot> {
        self.snapshot().filter(|snapshot| &snapshot.result_id == id)
    }

    /// Apply a patch to the project it targets.
    fn apply_patch(&mut self, patch: ProjectPatch);
}

/// In-memory project model keyed by result id.
#[derive(Debug, Clone, Default)]
pub struct ProjectRegistry {
    projects: BTreeMap<ResultId, ProjectSnapshot>,
    current: Option<ResultId>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a project. The first project added becomes current.
    pub fn insert(&mut self, snapshot: ProjectSnapshot) -> Option<ProjectSnapshot> {
        let id = snapshot.result_id.clone();
        if self.current.is_none() {
            self.current = Some(id.clone());
        }
        self.projects.insert(id, snapshot)
    }

    /// Make `id` the current project.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::UnknownProject`] if no such project was added.
    pub fn open(&mut self, id: &ResultId) -> Result<&ProjectSnapshot> {
        let Some(snapshot) = self.projects.get(id) else {
            return Err(SyncError::UnknownProject(id.clone()));
        };
        tracing::info!(project = %id, "project opened");
        self.current = Some(id.clone());
        Ok(snapshot)
    }

    pub fn get(&self, id: &ResultId) -> Option<&ProjectSnapshot> {
        self.projects.get(id)
    }

    pub fn current_id(&self) -> Option<&ResultId> {
        self.current.as_ref()
    }

    /// Leave the registry with no current project.
    pub fn close(&mut self) {
        self.current = None;
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

impl ProjectStore for ProjectRegistry {
    fn snapshot(&self) -> Option<&ProjectSnapshot> {
        self.current.as_ref().and_then(|id| self.projects.get(id))
    }

    fn project(&self, id: &ResultId) -> Option<&ProjectSnapshot> {
        self.get(id)
    }

    fn apply_patch(&mut self, patch: ProjectPatch) {
        match self.projects.get_mut(&patch.target) {
            Some(snapshot) => {
                patch.apply_to(snapshot);
                tracing::debug!(project = %patch.target, "project patch applied");
            }
            None => {
                tracing::warn!(project = %patch.target, "patch for unknown project dropped");
            }
        }
    }
}
