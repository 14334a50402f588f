//! Filter syntax errors.

use thiserror::Error;

/// A clause of the filter text could not be parsed.
///
/// Carries the offending clause exactly as the user typed it (whitespace
/// included) so the notification can point at it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid filter condition '{clause}': {kind}")]
pub struct FilterSyntaxError {
    /// The clause text as it appeared in the input.
    pub clause: String,
    /// What was wrong with it.
    pub kind: SyntaxErrorKind,
}

/// Reason a clause was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SyntaxErrorKind {
    /// Nothing between two `&` separators (or a leading/trailing `&`).
    #[error("empty condition")]
    EmptyClause,

    /// No relation operator found.
    #[error("expected one of >, >=, =, <=, <")]
    MissingRelation,

    /// The relation has nothing in front of it.
    #[error("missing characteristic name")]
    MissingCharacteristic,

    /// A run of operator characters that is not a known relation.
    #[error("unrecognized relation '{0}'")]
    UnrecognizedRelation(String),

    /// The threshold is not a number.
    #[error("threshold '{0}' is not a number")]
    InvalidThreshold(String),
}

impl FilterSyntaxError {
    pub(crate) fn new(clause: impl Into<String>, kind: SyntaxErrorKind) -> Self {
        Self {
            clause: clause.into(),
            kind,
        }
    }

    /// Message suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        format!(
            "Filter condition \"{}\" is invalid ({}). The list was left unchanged.",
            self.clause.trim(),
            self.kind
        )
    }
}

/// Result type alias for filter parsing.
pub type Result<T> = std::result::Result<T, FilterSyntaxError>;
