//! HTTP client for the rule computation server.
//!
//! Provides the [`HttpFetcher`] implementation of
//! [`rst_sync::ResultFetcher`], the decoders that turn server payloads into
//! result sets, and the persisted [`ClientSettings`].
//!
//! # Architecture
//!
//! - `http` - Endpoint construction and request dispatch
//! - `decode` - Per-resource payload shapes and name mapping
//! - `settings` - TOML connection settings
//! - `error.rs` - Error types with user-friendly messages

mod decode;
mod error;
mod http;
mod settings;

pub use decode::{client_parameter_name, decode, rule_characteristic_name, server_parameter_name};
pub use error::{ClientError, Result};
pub use http::HttpFetcher;
pub use settings::{ClientSettings, DEFAULT_SERVER_BASE, DEFAULT_TIMEOUT_SECS};
