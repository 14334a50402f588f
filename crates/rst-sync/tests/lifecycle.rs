//! End-to-end tab lifecycle scenarios against a scripted fetcher.

use std::cell::RefCell;

use rst_sync::{
    CompletionOutcome, FetchError, FetchMode, FetchOutcome, Freshness, Item,
    ParamValue, Parameters, ProjectRegistry, ProjectSnapshot, ProjectStore, RecordingSink,
    ResourceDescriptor, ResultFetcher, ResultId, ResultSet, Severity, SubView, TabCoordinator,
    TabKind, TabPhase, execute,
};

/// Answers loads and recomputes from canned outcomes and records every call.
struct ScriptedFetcher {
    load: FetchOutcome,
    recompute: FetchOutcome,
    calls: RefCell<Vec<ResourceDescriptor>>,
}

impl ScriptedFetcher {
    fn new(load: FetchOutcome, recompute: FetchOutcome) -> Self {
        Self {
            load,
            recompute,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl ResultFetcher for ScriptedFetcher {
    async fn perform(&self, descriptor: &ResourceDescriptor) -> FetchOutcome {
        self.calls.borrow_mut().push(descriptor.clone());
        match descriptor.mode {
            FetchMode::Load => self.load.clone(),
            FetchMode::Recompute => self.recompute.clone(),
        }
    }
}

fn rules(values: &[f64]) -> Vec<Item> {
    values
        .iter()
        .enumerate()
        .map(|(id, support)| Item::new(id).with("support", *support))
        .collect()
}

fn result(items: Vec<Item>) -> ResultSet {
    ResultSet {
        items,
        ..ResultSet::default()
    }
}

fn registry() -> ProjectRegistry {
    let mut registry = ProjectRegistry::new();
    registry.insert(ProjectSnapshot::new("p1", "iris"));
    registry
}

fn project(registry: &ProjectRegistry, id: &str) -> ProjectSnapshot {
    registry.get(&ResultId::from(id)).cloned().unwrap()
}

#[tokio::test]
async fn superseded_response_is_dropped_and_latest_applied_once() {
    let mut registry = registry();
    let mut sink = RecordingSink::new();
    let fetcher = ScriptedFetcher::new(
        Ok(result(rules(&[1.0]))),
        Ok(result(rules(&[4.0, 6.0]))),
    );
    let mut tab = TabCoordinator::new(TabKind::Classification);

    let first = tab.mount(&registry).unwrap();
    assert_eq!(first.token.resource, "classification");
    assert_eq!(first.token.generation, 1);

    let second = tab.recompute(&mut registry).unwrap();
    assert_eq!(second.token.generation, 2);

    // generation 1 settles first
    let late = execute(&fetcher, first).await;
    assert_eq!(
        tab.complete(late, &mut registry, &mut sink),
        CompletionOutcome::Stale
    );
    assert_eq!(tab.phase(), TabPhase::Loading);
    assert!(tab.items().is_empty());

    let fresh = execute(&fetcher, second).await;
    let applied = tab.complete(fresh, &mut registry, &mut sink);
    assert_eq!(applied, CompletionOutcome::Applied);
    assert_eq!(tab.phase(), TabPhase::Ready);
    let shown: Vec<_> = tab.displayed().map(|item| item.id).collect();
    assert_eq!(shown, [0, 1]);

    let modes: Vec<_> = fetcher.calls.borrow().iter().map(|call| call.mode).collect();
    assert_eq!(modes, [FetchMode::Load, FetchMode::Recompute]);
    assert!(sink.notifications().is_empty());
}

#[tokio::test]
async fn unmount_with_pending_edit_hands_draft_to_project() {
    let mut registry = registry();
    let mut sink = RecordingSink::new();
    let fetcher = ScriptedFetcher::new(Ok(result(Vec::new())), Ok(result(Vec::new())));
    let mut tab = TabCoordinator::new(TabKind::Unions);

    let load = tab.mount(&registry).unwrap();
    let done = execute(&fetcher, load).await;
    tab.complete(done, &mut registry, &mut sink);

    assert!(tab.edit_parameter("consistencyThreshold", 0.4));
    let pending = tab.recompute(&mut registry).unwrap();
    tab.teardown(&mut registry);

    let stored = project(&registry, "p1");
    assert!(!stored.parameters_saved);
    assert_eq!(
        stored.parameters["consistencyThreshold"],
        ParamValue::Number(0.4)
    );
    // unrelated project parameters are preserved
    assert_eq!(stored.parameters["typeOfRules"], ParamValue::from("certain"));

    // the in-flight recompute settles after teardown and is ignored
    let late = execute(&fetcher, pending).await;
    assert_eq!(
        tab.complete(late, &mut registry, &mut sink),
        CompletionOutcome::Stale
    );
    assert_eq!(tab.phase(), TabPhase::TornDown);
    assert_eq!(project(&registry, "p1"), stored);
}

#[tokio::test]
async fn teardown_during_initial_load_carries_selected_action() {
    let mut registry = registry();
    let mut sink = RecordingSink::new();
    let fetcher = ScriptedFetcher::new(Ok(result(rules(&[9.0]))), Ok(result(Vec::new())));
    let mut tab = TabCoordinator::new(TabKind::Rules);

    let load = tab.mount(&registry).unwrap();
    tab.select_action(2);
    tab.teardown(&mut registry);

    let stored = project(&registry, "p1");
    assert_eq!(stored.selected_action(TabKind::Rules), 2);
    assert!(stored.parameters_saved);

    let late = execute(&fetcher, load).await;
    assert_eq!(
        tab.complete(late, &mut registry, &mut sink),
        CompletionOutcome::Stale
    );
    assert!(tab.items().is_empty());
}

#[tokio::test]
async fn project_switch_patches_outgoing_project() {
    let mut registry = registry();
    registry.insert(ProjectSnapshot::new("p2", "wine"));
    let mut sink = RecordingSink::new();
    let fetcher = ScriptedFetcher::new(Ok(result(rules(&[3.0]))), Ok(result(Vec::new())));
    let mut tab = TabCoordinator::new(TabKind::Rules);

    let load = tab.mount(&registry).unwrap();
    let done = execute(&fetcher, load).await;
    tab.complete(done, &mut registry, &mut sink);
    assert!(tab.edit_parameter("typeOfRules", "possible"));

    registry.open(&ResultId::from("p2")).unwrap();
    let reload = tab.project_replaced(&mut registry).unwrap().unwrap();
    assert_eq!(reload.descriptor.result_id, ResultId::from("p2"));
    assert_eq!(reload.descriptor.mode, FetchMode::Load);
    assert!(tab.items().is_empty());

    let outgoing = project(&registry, "p1");
    assert_eq!(outgoing.parameters["typeOfRules"], ParamValue::from("possible"));
    assert!(!outgoing.parameters_saved);

    let incoming = project(&registry, "p2");
    assert!(incoming.parameters_saved);
    assert_eq!(incoming.parameters["typeOfRules"], ParamValue::from("certain"));

    // the new tab state comes from p2, so it is clean again
    assert!(tab.tab_state().unwrap().parameters_saved);

    // same identity again is not a switch
    assert!(tab.project_replaced(&mut registry).unwrap().is_none());
}

#[tokio::test]
async fn tabs_tearing_down_keep_each_others_drafts() {
    let mut registry = registry();
    let mut sink = RecordingSink::new();
    let fetcher = ScriptedFetcher::new(Ok(result(Vec::new())), Ok(result(Vec::new())));
    let mut tabs = [
        TabCoordinator::new(TabKind::Unions),
        TabCoordinator::new(TabKind::Rules),
        TabCoordinator::new(TabKind::Classification),
    ];

    for tab in &mut tabs {
        let load = tab.mount(&registry).unwrap();
        let done = execute(&fetcher, load).await;
        tab.complete(done, &mut registry, &mut sink);
    }

    let [unions, rules, classification] = &mut tabs;
    assert!(unions.edit_parameter("typeOfUnions", "standard"));
    assert!(rules.edit_parameter("typeOfRules", "possible"));
    assert!(classification.edit_parameter("typeOfClassifier", "ScoringRuleClassifier"));

    // rules also owns typeOfUnions but never edited it
    unions.teardown(&mut registry);
    rules.teardown(&mut registry);
    classification.teardown(&mut registry);

    let stored = project(&registry, "p1");
    assert_eq!(stored.parameters["typeOfUnions"], ParamValue::from("standard"));
    assert_eq!(stored.parameters["typeOfRules"], ParamValue::from("possible"));
    assert_eq!(
        stored.parameters["typeOfClassifier"],
        ParamValue::from("ScoringRuleClassifier")
    );
    assert!(!stored.parameters_saved);
}

#[tokio::test]
async fn confirmed_recompute_keeps_edits_handed_off_meanwhile() {
    let mut registry = registry();
    let mut sink = RecordingSink::new();
    let mut echoed = Parameters::new();
    echoed.insert("typeOfClassifier".into(), ParamValue::from("ScoringRuleClassifier"));
    let fetcher = ScriptedFetcher::new(
        Ok(result(Vec::new())),
        Ok(ResultSet {
            parameters: echoed,
            ..ResultSet::default()
        }),
    );
    let mut classification = TabCoordinator::new(TabKind::Classification);
    let mut unions = TabCoordinator::new(TabKind::Unions);

    let load = classification.mount(&registry).unwrap();
    let done = execute(&fetcher, load).await;
    classification.complete(done, &mut registry, &mut sink);

    assert!(classification.edit_parameter("typeOfClassifier", "ScoringRuleClassifier"));
    let request = classification.recompute(&mut registry).unwrap();

    // another tab hands off a draft while the recompute is in flight
    let load = unions.mount(&registry).unwrap();
    let done = execute(&fetcher, load).await;
    unions.complete(done, &mut registry, &mut sink);
    assert!(unions.edit_parameter("typeOfUnions", "standard"));
    unions.teardown(&mut registry);

    let done = execute(&fetcher, request).await;
    assert_eq!(
        classification.complete(done, &mut registry, &mut sink),
        CompletionOutcome::Applied
    );

    let stored = project(&registry, "p1");
    assert_eq!(
        stored.parameters["typeOfClassifier"],
        ParamValue::from("ScoringRuleClassifier")
    );
    assert_eq!(stored.parameters["typeOfUnions"], ParamValue::from("standard"));
}

#[tokio::test]
async fn recompute_confirms_parameters_on_project() {
    let mut registry = registry();
    let mut sink = RecordingSink::new();
    let mut echoed = Parameters::new();
    echoed.insert("typeOfClassifier".into(), ParamValue::from("ScoringRuleClassifier"));
    echoed.insert(
        "defaultClassificationResult".into(),
        ParamValue::from("majorityDecisionClass"),
    );
    let fetcher = ScriptedFetcher::new(
        Ok(result(Vec::new())),
        Ok(ResultSet {
            items: rules(&[1.0]),
            parameters: echoed,
            freshness: Freshness::default(),
            external_data: Some(true),
        }),
    );
    let mut tab = TabCoordinator::new(TabKind::Classification);

    let load = tab.mount(&registry).unwrap();
    let done = execute(&fetcher, load).await;
    tab.complete(done, &mut registry, &mut sink);

    assert!(tab.edit_parameter("typeOfClassifier", "ScoringRuleClassifier"));
    let request = tab.recompute(&mut registry).unwrap();
    assert_eq!(
        request.descriptor.parameters["typeOfClassifier"],
        ParamValue::from("ScoringRuleClassifier")
    );
    // the draft was handed to the project before the request went out
    assert!(!project(&registry, "p1").parameters_saved);

    let done = execute(&fetcher, request).await;
    assert_eq!(
        tab.complete(done, &mut registry, &mut sink),
        CompletionOutcome::Applied
    );

    let stored = project(&registry, "p1");
    assert!(stored.parameters_saved);
    assert!(stored.external_data);
    assert_eq!(
        stored.parameters["typeOfClassifier"],
        ParamValue::from("ScoringRuleClassifier")
    );
    assert!(tab.tab_state().unwrap().parameters_saved);
    assert!(tab.take_refresh(SubView::Details));
}

#[tokio::test]
async fn draft_recovered_on_remount_wins_over_stored_parameters() {
    let mut snapshot = ProjectSnapshot::new("p1", "iris");
    snapshot
        .parameters
        .insert("typeOfUnions".into(), ParamValue::from("standard"));
    snapshot.parameters_saved = false;
    let mut registry = ProjectRegistry::new();
    registry.insert(snapshot);

    let mut stored = Parameters::new();
    stored.insert("typeOfUnions".into(), ParamValue::from("monotonic"));
    let fetcher = ScriptedFetcher::new(
        Ok(ResultSet {
            parameters: stored,
            ..ResultSet::default()
        }),
        Ok(result(Vec::new())),
    );
    let mut sink = RecordingSink::new();
    let mut tab = TabCoordinator::new(TabKind::Unions);

    let load = tab.mount(&registry).unwrap();
    let done = execute(&fetcher, load).await;
    tab.complete(done, &mut registry, &mut sink);

    assert_eq!(
        tab.parameters().unwrap()["typeOfUnions"],
        ParamValue::from("standard")
    );
}

#[tokio::test]
async fn outdated_result_warns_once() {
    let mut registry = registry();
    let mut sink = RecordingSink::new();
    let fetcher = ScriptedFetcher::new(
        Ok(ResultSet {
            freshness: Freshness {
                learning_data: Some(true),
                rule_set: Some(false),
            },
            ..ResultSet::default()
        }),
        Ok(result(Vec::new())),
    );
    let mut tab = TabCoordinator::new(TabKind::Classification);

    let load = tab.mount(&registry).unwrap();
    let done = execute(&fetcher, load).await;
    tab.complete(done, &mut registry, &mut sink);

    assert!(tab.is_outdated());
    assert_eq!(sink.count(Severity::Warning), 1);
    assert_eq!(sink.notifications().len(), 1);
}

#[tokio::test]
async fn failed_fetch_notifies_once_and_allows_retry() {
    let mut registry = registry();
    let mut sink = RecordingSink::new();
    let fetcher = ScriptedFetcher::new(
        Err(FetchError::Transport("connection refused".into())),
        Ok(result(rules(&[7.0]))),
    );
    let mut tab = TabCoordinator::new(TabKind::CrossValidation);

    let load = tab.mount(&registry).unwrap();
    let done = execute(&fetcher, load).await;
    assert_eq!(
        tab.complete(done, &mut registry, &mut sink),
        CompletionOutcome::Failed
    );
    assert_eq!(tab.phase(), TabPhase::Ready);
    assert_eq!(sink.notifications().len(), 1);
    let message = &sink.notifications()[0].message;
    assert!(message.starts_with("Server not responding. "));
    assert!(message.ends_with("Check that the server is running and reachable."));

    let retry = tab.recompute(&mut registry).unwrap();
    let done = execute(&fetcher, retry).await;
    tab.complete(done, &mut registry, &mut sink);
    assert_eq!(tab.items().len(), 1);
    assert_eq!(sink.notifications().len(), 1);
}

#[tokio::test]
async fn filter_typo_keeps_previous_rows() {
    let mut registry = registry();
    let mut sink = RecordingSink::new();
    let fetcher = ScriptedFetcher::new(
        Ok(result(rules(&[2.0, 6.0, 8.0]))),
        Ok(result(Vec::new())),
    );
    let mut tab = TabCoordinator::new(TabKind::Rules);

    let load = tab.mount(&registry).unwrap();
    let done = execute(&fetcher, load).await;
    tab.complete(done, &mut registry, &mut sink);

    assert!(tab.set_filter("support >= 5", &mut sink));
    let before: Vec<_> = tab.displayed().map(|item| item.id).collect();
    assert_eq!(before, [1, 2]);

    assert!(!tab.set_filter("support >># 5", &mut sink));
    let after: Vec<_> = tab.displayed().map(|item| item.id).collect();
    assert_eq!(after, before);
    assert_eq!(tab.filter_text(), "support >># 5");
    assert_eq!(sink.count(Severity::Error), 1);
    assert!(sink.notifications()[0].message.contains("support >># 5"));
}

#[test]
fn store_snapshot_reflects_current_project() {
    let mut registry = registry();
    registry.insert(ProjectSnapshot::new("p2", "wine"));
    assert_eq!(registry.snapshot().unwrap().name, "iris");
    registry.open(&ResultId::from("p2")).unwrap();
    assert_eq!(registry.snapshot().unwrap().name, "wine");
}
