//! Per-resource request generations.
//!
//! Every request for a resource captures a [`ResourceToken`] before it is
//! issued. When it settles, the completion handler asks
//! [`RequestSequencer::is_current`] whether a newer request for the same
//! resource was issued in the meantime; only the newest one may touch
//! visible state.

use std::collections::BTreeMap;
use std::fmt;

/// Generation captured when a request was issued.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceToken {
    /// Logical resource the request belongs to.
    pub resource: String,
    /// Counter value at issue time.
    pub generation: u64,
}

impl fmt::Display for ResourceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.resource, self.generation)
    }
}

/// Owned map from resource name to its latest generation.
///
/// Counters start at 0, so the first [`begin`](Self::begin) for a resource
/// returns generation 1.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    generations: BTreeMap<String, u64>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter for `resource` and return the new token.
    pub fn begin(&mut self, resource: &str) -> ResourceToken {
        let generation = self.bump(resource);
        tracing::trace!(resource, generation, "request issued");
        ResourceToken {
            resource: resource.to_string(),
            generation,
        }
    }

    /// Whether no newer request for the token's resource has begun.
    ///
    /// Must be checked against the live counter inside the completion
    /// handler, before any state is mutated.
    pub fn is_current(&self, token: &ResourceToken) -> bool {
        self.current(&token.resource) == token.generation
    }

    /// Present generation for `resource` (0 if never requested).
    pub fn current(&self, resource: &str) -> u64 {
        self.generations.get(resource).copied().unwrap_or(0)
    }

    /// Supersede every outstanding request for `resource` without issuing
    /// a new one. Used on teardown so late completions are dropped.
    pub fn invalidate(&mut self, resource: &str) -> u64 {
        let generation = self.bump(resource);
        tracing::trace!(resource, generation, "outstanding requests invalidated");
        generation
    }

    fn bump(&mut self, resource: &str) -> u64 {
        let counter = self.generations.entry(resource.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }
}
