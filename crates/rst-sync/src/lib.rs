//! Client-side synchronization layer for result tabs.
//!
//! Each tab of the analysis UI fetches a derived result set for the open
//! project, lets the user edit the parameters it was computed with, and
//! narrows the cached rows locally with a filter. This crate holds the
//! pieces every tab shares:
//!
//! - **Request sequencing** so a superseded response never overwrites the
//!   view of a newer request
//! - **Dirty-parameter reconciliation** so unsaved edits survive a tab
//!   being replaced or torn down
//! - **Lifecycle coordination** tying both to the filter engine
//!
//! # Example
//!
//! ```
//! use rst_sync::{
//!     Completion, CompletionOutcome, ProjectRegistry, ProjectSnapshot, RecordingSink,
//!     ResultSet, TabCoordinator, TabKind,
//! };
//!
//! let mut projects = ProjectRegistry::new();
//! projects.insert(ProjectSnapshot::new("p1", "iris"));
//! let mut sink = RecordingSink::new();
//!
//! let mut tab = TabCoordinator::new(TabKind::Classification);
//! let first = tab.mount(&projects).unwrap();
//! let second = tab.recompute(&mut projects).unwrap();
//!
//! let late = Completion { request: first, outcome: Ok(ResultSet::default()) };
//! assert_eq!(tab.complete(late, &mut projects, &mut sink), CompletionOutcome::Stale);
//!
//! let fresh = Completion { request: second, outcome: Ok(ResultSet::default()) };
//! assert_eq!(tab.complete(fresh, &mut projects, &mut sink), CompletionOutcome::Applied);
//! ```
//!
//! # Architecture
//!
//! - `sequencer` - Per-resource generation tokens
//! - `dirty` - Draft tracking and handoff patches
//! - `coordinator` - Tab state machine
//! - `project` - Project snapshot, patch and the store seam
//! - `tab` - Tab kinds, parameter keys and draft state
//! - `fetch` - Fetch capability seam and result types
//! - `notify` - Notification sink seam
//! - `error.rs` - Error types with user-friendly messages

mod coordinator;
mod dirty;
mod error;
mod fetch;
mod notify;
mod project;
mod sequencer;
mod tab;

pub use coordinator::{CompletionOutcome, TabCoordinator, TabPhase};
pub use dirty::DirtyStateTracker;
pub use error::{FetchError, Result, SyncError};
pub use fetch::{
    Completion, FetchMode, FetchOutcome, FetchRequest, Freshness, ResourceDescriptor,
    ResultFetcher, ResultSet, execute,
};
pub use notify::{Notification, NotificationSink, RecordingSink, Severity};
pub use project::{
    ParamValue, Parameters, ProjectPatch, ProjectRegistry, ProjectSnapshot, ProjectStore,
    ResultId, default_parameters,
};
pub use sequencer::{RequestSequencer, ResourceToken};
pub use tab::{SubView, TabKind, TabState};

// Items are the unit the filter engine works on; re-exported so hosts only
// need this crate to build result sets.
pub use rst_filter::{CharacteristicValue, Item};
