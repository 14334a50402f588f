//! The fetch capability and the values flowing through it.
//!
//! The coordinator never performs I/O itself. It hands out a
//! [`FetchRequest`]; the host runs it through a [`ResultFetcher`] and feeds
//! the resulting [`Completion`] back in, the same way a GUI task result is
//! routed back into the update loop as a message.

use std::fmt;
use std::future::Future;

use rst_filter::Item;

use crate::error::FetchError;
use crate::project::{Parameters, ResultId};
use crate::sequencer::ResourceToken;
use crate::tab::TabKind;

/// Whether a request reads the stored result or asks for a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// Read the result stored for the project.
    Load,
    /// Recompute the result with the tab's parameters.
    Recompute,
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Load => "load",
            Self::Recompute => "recompute",
        })
    }
}

/// What to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    pub kind: TabKind,
    pub result_id: ResultId,
    pub mode: FetchMode,
    /// Parameters sent with a recompute; empty for a load.
    pub parameters: Parameters,
}

/// A descriptor paired with the token captured when it was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub token: ResourceToken,
    pub descriptor: ResourceDescriptor,
}

/// Whether the result still reflects the project's current inputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Freshness {
    /// Computed on the current learning data, if the server says.
    pub learning_data: Option<bool>,
    /// Computed with the current rule set, if the server says.
    pub rule_set: Option<bool>,
}

impl Freshness {
    /// True if the server reported either input as out of date.
    pub fn is_outdated(&self) -> bool {
        self.learning_data == Some(false) || self.rule_set == Some(false)
    }
}

/// A decoded result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    /// Entities projected for filtering, in server order.
    pub items: Vec<Item>,
    /// Parameters the server reports the result was computed with.
    pub parameters: Parameters,
    pub freshness: Freshness,
    /// Whether the result was computed on uploaded external data.
    pub external_data: Option<bool>,
}

pub type FetchOutcome = std::result::Result<ResultSet, FetchError>;

/// A settled request, ready to be handed back to the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub request: FetchRequest,
    pub outcome: FetchOutcome,
}

/// Performs requests for result sets. Supplied by the host.
pub trait ResultFetcher {
    fn perform(&self, descriptor: &ResourceDescriptor) -> impl Future<Output = FetchOutcome>;
}

/// Run `request` through `fetcher` and package the outcome.
pub async fn execute<F: ResultFetcher + ?Sized>(fetcher: &F, request: FetchRequest) -> Completion {
    tracing::debug!(
        token = %request.token,
        mode = %request.descriptor.mode,
        project = %request.descriptor.result_id,
        "performing request"
    );
    let outcome = fetcher.perform(&request.descriptor).await;
    Completion { request, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_freshness() {
        assert!(!Freshness::default().is_outdated());
        let fresh = Freshness {
            learning_data: Some(true),
            rule_set: Some(true),
        };
        assert!(!fresh.is_outdated());
        let stale_rules = Freshness {
            learning_data: Some(true),
            rule_set: Some(false),
        };
        assert!(stale_rules.is_outdated());
        let stale_data = Freshness {
            learning_data: Some(false),
            rule_set: None,
        };
        assert!(stale_data.is_outdated());
    }
}
