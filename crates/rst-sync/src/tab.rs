//! Tab kinds and per-tab draft state.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;
use crate::project::{Parameters, ProjectSnapshot, default_parameters};

/// A result tab. Each kind fetches one resource and owns a fixed set of
/// parameter keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TabKind {
    Unions,
    Rules,
    Classification,
    CrossValidation,
}

impl TabKind {
    pub const ALL: [Self; 4] = [
        Self::Unions,
        Self::Rules,
        Self::Classification,
        Self::CrossValidation,
    ];

    /// Resource name used for sequencing and in the server path.
    pub const fn resource_name(self) -> &'static str {
        match self {
            Self::Unions => "unions",
            Self::Rules => "rules",
            Self::Classification => "classification",
            Self::CrossValidation => "crossValidation",
        }
    }

    /// Parameter keys this tab edits and sends on recompute.
    pub const fn parameter_keys(self) -> &'static [&'static str] {
        match self {
            Self::Unions => &["consistencyThreshold", "typeOfUnions"],
            Self::Rules => &[
                "consistencyThreshold",
                "filterSelector",
                "typeOfRules",
                "typeOfUnions",
            ],
            Self::Classification => &["defaultClassificationResult", "typeOfClassifier"],
            Self::CrossValidation => &[
                "consistencyThreshold",
                "defaultClassificationResult",
                "filterSelector",
                "numberOfFolds",
                "seed",
                "typeOfClassifier",
                "typeOfRules",
                "typeOfUnions",
            ],
        }
    }

    /// Whether `key` is one of this tab's parameters.
    pub fn owns(self, key: &str) -> bool {
        self.parameter_keys().contains(&key)
    }

    /// Human-readable tab title.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unions => "Unions",
            Self::Rules => "Rules",
            Self::Classification => "Classification",
            Self::CrossValidation => "Cross-validation",
        }
    }
}

impl fmt::Display for TabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.resource_name())
    }
}

impl FromStr for TabKind {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "unions" => Ok(Self::Unions),
            "rules" => Ok(Self::Rules),
            "classification" => Ok(Self::Classification),
            "crossvalidation" => Ok(Self::CrossValidation),
            _ => Err(SyncError::UnknownResource(s.to_string())),
        }
    }
}

/// Dependent sub-views that re-fetch when the tab's result changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubView {
    /// Per-item details dialog.
    Details,
    /// Misclassification matrix.
    Matrix,
}

impl SubView {
    pub const ALL: [Self; 2] = [Self::Details, Self::Matrix];
}

/// Draft state of one tab instance.
#[derive(Debug, Clone, PartialEq)]
pub struct TabState {
    pub parameters: Parameters,
    /// False once the user edited a parameter the server has not confirmed.
    pub parameters_saved: bool,
    pub selected_action: usize,
    pub refresh_needed: BTreeMap<SubView, bool>,
}

impl TabState {
    /// Seed from the project's persisted fields, restricted to the keys
    /// `kind` owns. Keys missing from the snapshot fall back to defaults.
    pub fn seed(kind: TabKind, snapshot: &ProjectSnapshot) -> Self {
        let defaults = default_parameters();
        let parameters = kind
            .parameter_keys()
            .iter()
            .filter_map(|key| {
                snapshot
                    .parameters
                    .get(*key)
                    .or_else(|| defaults.get(*key))
                    .map(|value| ((*key).to_string(), value.clone()))
            })
            .collect();

        Self {
            parameters,
            parameters_saved: snapshot.parameters_saved,
            selected_action: snapshot.selected_action(kind),
            refresh_needed: SubView::ALL.iter().map(|view| (*view, false)).collect(),
        }
    }

    /// Flag every sub-view for refresh.
    pub fn request_refresh(&mut self) {
        for flag in self.refresh_needed.values_mut() {
            *flag = true;
        }
    }

    /// Return and clear the refresh flag of `view`.
    pub fn take_refresh(&mut self, view: SubView) -> bool {
        self.refresh_needed
            .get_mut(&view)
            .map(std::mem::take)
            .unwrap_or(false)
    }
}
