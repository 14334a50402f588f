//! Library side of the `rst` command-line front end.
//!
//! # Architecture
//!
//! - `cli` - Argument definitions
//! - `commands` - Command implementations and exit codes
//! - `logging` - Subscriber setup
//! - `render` - Table output

pub mod cli;
pub mod commands;
pub mod logging;
mod render;
