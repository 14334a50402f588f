//! Command implementations.
//!
//! Each server command drives real [`TabCoordinator`]s against an in-memory
//! [`ProjectRegistry`] holding the one project named on the command line,
//! so the same sequencing and handoff rules apply as in an interactive
//! session.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use futures_util::future::join_all;

use rst_client::{ClientSettings, HttpFetcher};
use rst_filter::{FilterSyntaxError, Item, apply_filter, parse};
use rst_sync::{
    CompletionOutcome, NotificationSink, ParamValue, ProjectRegistry, ProjectSnapshot, Severity,
    TabCoordinator, execute,
};

use crate::cli::{Cli, Command, ConfigArgs, FilterArgs, RecomputeArgs, ShowArgs};
use crate::render::{print_items, print_parameters, print_settings, print_tab};

/// Process exit codes.
pub mod exit {
    pub const SUCCESS: i32 = 0;
    pub const FAILURE: i32 = 1;
    pub const INVALID_FILTER: i32 = 2;
}

/// Run the parsed command and return its exit code.
///
/// # Errors
///
/// Returns an error for anything that stops the command from running at
/// all; see [`exit_code_for`] for how errors map to exit codes.
pub fn run(cli: &Cli) -> Result<i32> {
    let (settings, settings_path) = resolve_settings(cli);
    match &cli.command {
        Command::Filter(args) => run_filter(args),
        Command::Show(args) => run_show(args, &settings),
        Command::Recompute(args) => run_recompute(args, &settings),
        Command::Config(args) => run_config(args, &settings, &settings_path),
    }
}

/// Exit code for a command that returned an error.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<FilterSyntaxError>().is_some() {
        exit::INVALID_FILTER
    } else {
        exit::FAILURE
    }
}

/// Settings from the file named by `--config` (or the platform default),
/// with `--server` applied on top.
pub fn resolve_settings(cli: &Cli) -> (ClientSettings, PathBuf) {
    let path = cli.config.clone().unwrap_or_else(ClientSettings::config_path);
    let mut settings = ClientSettings::load_from(&path);
    if let Some(server) = &cli.server {
        settings = settings.with_server(server.as_str());
    }
    tracing::debug!(path = %path.display(), server = %settings.server_base, "settings resolved");
    (settings, path)
}

// =============================================================================
// Commands
// =============================================================================

/// Filter a local JSON array of items.
///
/// # Errors
///
/// Fails if the file cannot be read or decoded, or the filter is malformed.
pub fn run_filter(args: &FilterArgs) -> Result<i32> {
    let items = read_items(&args.items)?;
    let shown = apply_filter(&args.filter, &items)?;
    print_items(&shown, items.len());
    Ok(exit::SUCCESS)
}

/// Load the stored results of each requested tab concurrently.
///
/// # Errors
///
/// Fails if the filter is malformed or the fetcher cannot be built. A failed
/// fetch is reported through notifications and the exit code instead.
pub fn run_show(args: &ShowArgs, settings: &ClientSettings) -> Result<i32> {
    let filter = args.filter.as_deref().unwrap_or(&settings.default_filter);
    parse(filter)?;

    let fetcher = build_fetcher(settings)?;
    let runtime = runtime()?;
    let mut projects = single_project(&args.project);
    let mut sink = StderrSink;

    let mut tabs = Vec::with_capacity(args.resources.len());
    let mut requests = Vec::with_capacity(args.resources.len());
    for &kind in &args.resources {
        let mut tab = TabCoordinator::new(kind);
        tab.set_filter(filter, &mut sink);
        requests.push(tab.mount(&projects)?);
        tabs.push(tab);
    }

    let completions =
        runtime.block_on(join_all(requests.into_iter().map(|request| execute(&fetcher, request))));

    let mut failed = false;
    for (tab, completion) in tabs.iter_mut().zip(completions) {
        failed |= tab.complete(completion, &mut projects, &mut sink) == CompletionOutcome::Failed;
        print_tab(tab);
        tab.teardown(&mut projects);
    }
    Ok(if failed { exit::FAILURE } else { exit::SUCCESS })
}

/// Load one tab, apply parameter edits and request a recompute.
///
/// A failed initial load does not stop the recompute; its notification is
/// printed and the tab carries on with the project's parameters.
///
/// # Errors
///
/// Fails if the filter is malformed, a parameter does not belong to the
/// tab, or the fetcher cannot be built.
pub fn run_recompute(args: &RecomputeArgs, settings: &ClientSettings) -> Result<i32> {
    let kind = args.resource;
    let filter = args.filter.as_deref().unwrap_or(&settings.default_filter);
    parse(filter)?;
    if let Some((key, _)) = args.params.iter().find(|(key, _)| !kind.owns(key)) {
        bail!(
            "'{key}' is not a {} parameter (expected one of: {})",
            kind.label(),
            kind.parameter_keys().join(", ")
        );
    }

    let fetcher = build_fetcher(settings)?;
    let runtime = runtime()?;
    let mut projects = single_project(&args.project);
    let mut sink = StderrSink;

    let mut tab = TabCoordinator::new(kind);
    tab.set_filter(filter, &mut sink);
    let load = tab.mount(&projects)?;
    let loaded = runtime.block_on(execute(&fetcher, load));
    tab.complete(loaded, &mut projects, &mut sink);

    apply_edits(&mut tab, &args.params)?;

    let request = tab.recompute(&mut projects)?;
    let recomputed = runtime.block_on(execute(&fetcher, request));
    let outcome = tab.complete(recomputed, &mut projects, &mut sink);

    print_tab(&tab);
    if outcome == CompletionOutcome::Applied
        && let Some(parameters) = tab.parameters()
    {
        print_parameters(parameters);
    }
    tab.teardown(&mut projects);

    Ok(if outcome == CompletionOutcome::Applied {
        exit::SUCCESS
    } else {
        exit::FAILURE
    })
}

/// Print the effective settings and optionally persist them.
///
/// # Errors
///
/// Fails if `--save` is given and the file cannot be written.
pub fn run_config(args: &ConfigArgs, settings: &ClientSettings, path: &Path) -> Result<i32> {
    print_settings(settings, path);
    if args.save {
        settings
            .save_to(path)
            .with_context(|| format!("failed to save settings to {}", path.display()))?;
        println!("Saved {}", path.display());
    }
    Ok(exit::SUCCESS)
}

// =============================================================================
// Helpers
// =============================================================================

/// Notifications go to stderr so table output stays pipeable.
struct StderrSink;

impl NotificationSink for StderrSink {
    fn notify(&mut self, message: &str, severity: Severity) {
        eprintln!("{severity}: {message}");
    }
}

fn apply_edits(tab: &mut TabCoordinator, params: &[(String, ParamValue)]) -> Result<()> {
    for (key, value) in params {
        if !tab.edit_parameter(key, value.clone()) {
            bail!(
                "could not apply {key}={value}: the {} tab is not ready for edits",
                tab.kind().label()
            );
        }
    }
    Ok(())
}

fn build_fetcher(settings: &ClientSettings) -> Result<HttpFetcher> {
    HttpFetcher::new(settings).map_err(|err| {
        let message = err.user_message();
        anyhow::Error::new(err).context(message)
    })
}

fn read_items(path: &Path) -> Result<Vec<Item>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("{} is not a JSON array of items", path.display()))
}

fn single_project(result_id: &str) -> ProjectRegistry {
    let mut projects = ProjectRegistry::new();
    projects.insert(ProjectSnapshot::new(result_id, result_id));
    projects
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rst_filter::SyntaxErrorKind;
    use rst_sync::{ResultId, TabKind};

    #[test]
    fn test_exit_code_for_filter_error() {
        let err = anyhow::Error::new(FilterSyntaxError {
            clause: "support >> 5".into(),
            kind: SyntaxErrorKind::UnrecognizedRelation(">>".into()),
        });
        assert_eq!(exit_code_for(&err), exit::INVALID_FILTER);

        let wrapped = err.context("while filtering");
        assert_eq!(exit_code_for(&wrapped), exit::INVALID_FILTER);
    }

    #[test]
    fn test_exit_code_for_other_errors() {
        let err = anyhow::anyhow!("connection refused");
        assert_eq!(exit_code_for(&err), exit::FAILURE);
    }

    #[test]
    fn test_bad_server_address_is_reported_plainly() {
        let settings = ClientSettings::default().with_server("not a url");
        let Err(err) = build_fetcher(&settings) else {
            panic!("expected an invalid address error");
        };
        assert_eq!(err.to_string(), "'not a url' is not a valid server address");
        assert_eq!(exit_code_for(&err), exit::FAILURE);
    }

    #[test]
    fn test_rejected_edit_stops_recompute() {
        let mut tab = TabCoordinator::new(TabKind::Rules);
        let params = [("typeOfRules".to_string(), ParamValue::from("possible"))];
        let err = apply_edits(&mut tab, &params).unwrap_err();
        assert!(err.to_string().contains("typeOfRules=possible"));
        assert!(tab.parameters().is_none());
    }

    #[test]
    fn test_single_project_is_current() {
        let projects = single_project("p7");
        assert_eq!(projects.current_id(), Some(&ResultId::from("p7")));
    }
}
