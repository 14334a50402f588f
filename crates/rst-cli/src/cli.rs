//! CLI argument definitions for the `rst` front end.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use rst_sync::{ParamValue, TabKind};

#[derive(Parser)]
#[command(
    name = "rst",
    version,
    about = "Rule Studio tabs - fetch, filter and recompute analysis results",
    long_about = "Fetch derived results (unions, rules, classification, cross-validation)\n\
                  for a project from the computation server, narrow them with a filter\n\
                  expression, and request recomputation with edited parameters."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags and RUST_LOG).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Computation server base URL (overrides the settings file).
    #[arg(long = "server", value_name = "URL", global = true)]
    pub server: Option<String>,

    /// Settings file to use instead of the platform default.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Filter a local items file without contacting the server.
    Filter(FilterArgs),

    /// Load stored results for one or more tabs of a project.
    Show(ShowArgs),

    /// Ask the server to recompute one tab with edited parameters.
    Recompute(RecomputeArgs),

    /// Print the effective client settings.
    Config(ConfigArgs),
}

#[derive(Parser)]
pub struct FilterArgs {
    /// JSON file holding an array of items.
    #[arg(long = "items", value_name = "FILE")]
    pub items: PathBuf,

    /// Filter expression, e.g. "support >= 5 & length <= 2".
    #[arg(long = "filter", default_value = "")]
    pub filter: String,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Tabs to load (unions, rules, classification, cross-validation).
    #[arg(value_name = "RESOURCE", required = true, num_args = 1..)]
    pub resources: Vec<TabKind>,

    /// Result id of the project.
    #[arg(long = "project", value_name = "ID")]
    pub project: String,

    /// Filter expression (defaults to the settings file's filter).
    #[arg(long = "filter")]
    pub filter: Option<String>,
}

#[derive(Parser)]
pub struct RecomputeArgs {
    /// Tab to recompute.
    #[arg(value_name = "RESOURCE")]
    pub resource: TabKind,

    /// Result id of the project.
    #[arg(long = "project", value_name = "ID")]
    pub project: String,

    /// Parameter edit as KEY=VALUE; repeatable.
    #[arg(long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub params: Vec<(String, ParamValue)>,

    /// Filter expression (defaults to the settings file's filter).
    #[arg(long = "filter")]
    pub filter: Option<String>,
}

#[derive(Parser)]
pub struct ConfigArgs {
    /// Write the effective settings back to the settings file.
    #[arg(long = "save")]
    pub save: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// Parse a `KEY=VALUE` parameter edit.
///
/// Values read as `true`/`false`, then integers, then numbers, and fall back
/// to text.
pub fn parse_param(raw: &str) -> Result<(String, ParamValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing parameter name in '{raw}'"));
    }

    let value = value.trim();
    let parsed = if let Ok(flag) = value.parse::<bool>() {
        ParamValue::Bool(flag)
    } else if let Ok(integer) = value.parse::<i64>() {
        ParamValue::Integer(integer)
    } else if let Ok(number) = value.parse::<f64>()
        && number.is_finite()
    {
        ParamValue::Number(number)
    } else {
        ParamValue::from(value)
    };
    Ok((key.to_string(), parsed))
}
