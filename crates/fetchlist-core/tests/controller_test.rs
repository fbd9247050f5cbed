#![allow(clippy::unwrap_used)]
// Refresh-cycle tests for `ItemListController` against scripted sources.

mod common;

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use pretty_assertions::assert_eq;
use tokio::sync::oneshot;
use tokio_test::{assert_pending, assert_ready};

use fetchlist_core::pipeline::{FLAT_GROUP_KEY, flatten};
use fetchlist_core::{
    ControllerConfig, CoreError, GENERIC_ERROR_MESSAGE, Grouping, ItemListController, LoadStatus,
};

use common::{ScriptedSource, Step, init_tracing, item, render};

// ── Helpers ─────────────────────────────────────────────────────────

fn controller(steps: Vec<Step>) -> (Arc<ScriptedSource>, ItemListController<Arc<ScriptedSource>>) {
    controller_with(steps, ControllerConfig::default())
}

fn controller_with(
    steps: Vec<Step>,
    config: ControllerConfig,
) -> (Arc<ScriptedSource>, ItemListController<Arc<ScriptedSource>>) {
    init_tracing();
    let source = Arc::new(ScriptedSource::new(steps));
    let ctrl = ItemListController::new(Arc::clone(&source), config);
    (source, ctrl)
}

fn names(ctrl: &ItemListController<Arc<ScriptedSource>>) -> Vec<String> {
    flatten(&ctrl.grouped_items())
        .iter()
        .filter_map(|i| i.name.clone())
        .collect()
}

// ── Scenarios ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_two_lists_succeed() {
    let (_, ctrl) = controller(vec![Step::Items(vec![
        item(1, 1, Some("Item A")),
        item(2, 2, Some("Item B")),
    ])]);

    let snap = ctrl.refresh().await;

    assert_eq!(snap.status, LoadStatus::Success);
    assert!(!snap.refreshing);
    assert_eq!(snap.groups.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(snap.groups[&1][0].name.as_deref(), Some("Item A"));
    assert_eq!(snap.groups[&2][0].name.as_deref(), Some("Item B"));
}

#[tokio::test]
async fn test_empty_fetch_is_empty() {
    let (_, ctrl) = controller(vec![Step::Items(Vec::new())]);

    let snap = ctrl.refresh().await;

    assert_eq!(snap.status, LoadStatus::Empty);
    assert!(snap.groups.is_empty());
}

#[tokio::test]
async fn test_blank_names_are_filtered() {
    let (_, ctrl) = controller(vec![Step::Items(vec![
        item(1, 1, Some("Valid")),
        item(2, 1, Some("")),
        item(3, 1, None),
    ])]);

    let snap = ctrl.refresh().await;

    assert_eq!(snap.status, LoadStatus::Success);
    assert_eq!(snap.item_count(), 1);
    assert_eq!(names(&ctrl), vec!["Valid"]);
}

#[tokio::test]
async fn test_fully_filtered_fetch_is_empty_not_success() {
    let (_, ctrl) = controller(vec![Step::Items(vec![
        item(1, 1, Some("  ")),
        item(2, 2, None),
    ])]);

    assert_eq!(ctrl.refresh().await.status, LoadStatus::Empty);
}

#[tokio::test]
async fn test_sorted_by_list_then_name() {
    let (_, ctrl) = controller(vec![Step::Items(vec![
        item(1, 2, Some("B Item")),
        item(2, 1, Some("A Item")),
        item(3, 1, Some("Z Item")),
        item(4, 2, Some("A Item")),
    ])]);

    let snap = ctrl.refresh().await;

    assert_eq!(names(&ctrl), vec!["A Item", "Z Item", "A Item", "B Item"]);
    insta::assert_snapshot!(render(&snap), @r"
    List ID: 1
      A Item (ID: 2)
      Z Item (ID: 3)
    List ID: 2
      A Item (ID: 4)
      B Item (ID: 1)
    ");
}

#[tokio::test]
async fn test_network_failure_publishes_generic_error() {
    let (_, ctrl) = controller(vec![Step::Fail(CoreError::Network {
        message: "connection reset by peer at 10.0.0.7".into(),
        status: None,
    })]);

    let snap = ctrl.refresh().await;

    assert_eq!(snap.status, LoadStatus::failed());
    assert_eq!(snap.status.error_message(), Some(GENERIC_ERROR_MESSAGE));
    assert!(snap.groups.is_empty());
    assert!(!snap.refreshing);
    assert!(!format!("{:?}", snap.status).contains("10.0.0.7"));
}

#[tokio::test]
async fn test_decode_failure_publishes_generic_error() {
    let (_, ctrl) = controller(vec![Step::Fail(CoreError::Decode {
        message: "missing field `listId` at line 1 column 9".into(),
    })]);

    let snap = ctrl.refresh().await;

    assert_eq!(snap.status.error_message(), Some(GENERIC_ERROR_MESSAGE));
    assert!(snap.groups.is_empty());
}

#[tokio::test]
async fn test_pipeline_panic_is_contained() {
    let config =
        ControllerConfig::default().with_grouping(Grouping::custom(|_| panic!("key exploded")));
    let (_, ctrl) = controller_with(vec![Step::Items(vec![item(1, 1, Some("x"))])], config);

    let snap = ctrl.refresh().await;

    assert_eq!(snap.status, LoadStatus::failed());
    assert!(!snap.refreshing);
}

#[tokio::test]
async fn test_error_clears_previous_groups() {
    let (_, ctrl) = controller(vec![
        Step::Items(vec![item(1, 1, Some("Item A"))]),
        Step::Fail(CoreError::Network {
            message: "timeout".into(),
            status: None,
        }),
    ]);

    assert_eq!(ctrl.refresh().await.status, LoadStatus::Success);
    let snap = ctrl.refresh().await;

    assert_eq!(snap.status, LoadStatus::failed());
    assert!(ctrl.grouped_items().is_empty());
    assert!(ctrl.item(1).is_none());
}

#[tokio::test]
async fn test_flat_grouping_single_group() {
    let config = ControllerConfig::default().with_grouping(Grouping::Flat);
    let (_, ctrl) = controller_with(
        vec![Step::Items(vec![
            item(1, 2, Some("B")),
            item(2, 1, Some("A")),
        ])],
        config,
    );

    let snap = ctrl.refresh().await;

    assert_eq!(snap.groups.len(), 1);
    let ids: Vec<i64> = snap.groups[&FLAT_GROUP_KEY].iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![2, 1]);
}

// ── State machine ordering ──────────────────────────────────────────

#[tokio::test]
async fn test_transitions_loading_then_terminal() {
    let (_, ctrl) = controller(vec![
        Step::Items(vec![item(1, 1, Some("a"))]),
        Step::Items(Vec::new()),
    ]);
    let mut rx = ctrl.transitions();

    ctrl.refresh().await;
    ctrl.refresh().await;

    let mut seen = Vec::new();
    while let Ok(snap) = rx.try_recv() {
        assert!(
            !(snap.status.is_loading() && !snap.refreshing),
            "observed Loading without refreshing: {snap:?}"
        );
        seen.push((snap.generation, snap.status.as_ref().to_owned(), snap.refreshing));
    }

    assert_eq!(
        seen,
        vec![
            (1, "loading".to_owned(), true),
            (1, "success".to_owned(), false),
            (2, "loading".to_owned(), true),
            (2, "empty".to_owned(), false),
        ]
    );
}

#[tokio::test]
async fn test_refreshing_is_true_while_fetch_in_flight() {
    let (tx, rx) = oneshot::channel();
    let (source, ctrl) = controller(vec![Step::Gate(rx)]);

    let handle = ctrl.spawn_refresh();
    source.started.notified().await;

    assert!(ctrl.is_refreshing());
    assert_eq!(ctrl.status(), LoadStatus::Loading);

    tx.send(vec![item(1, 1, Some("late"))]).unwrap();
    let snap = handle.await.unwrap();

    assert_eq!(snap.status, LoadStatus::Success);
    assert!(!ctrl.is_refreshing());
}

#[tokio::test]
async fn test_subscription_wakes_on_publish() {
    let (_, ctrl) = controller(vec![Step::Items(vec![item(3, 1, Some("c"))])]);
    let mut stream = ctrl.subscribe();
    assert_eq!(stream.current().generation, 0);

    let mut changed = tokio_test::task::spawn(stream.changed());
    assert_pending!(changed.poll());

    ctrl.refresh().await;

    assert!(changed.is_woken());
    let snap = assert_ready!(changed.poll()).unwrap();
    assert_eq!(snap.status, LoadStatus::Success);
}

#[tokio::test]
async fn test_settled_waits_for_cycle_end() {
    let (tx, rx) = oneshot::channel();
    let (source, ctrl) = controller(vec![Step::Gate(rx)]);
    let mut stream = ctrl.subscribe();

    let handle = ctrl.spawn_refresh();
    source.started.notified().await;
    tx.send(Vec::new()).unwrap();

    let snap = stream.settled().await.unwrap();
    assert_eq!(snap.status, LoadStatus::Empty);
    assert_eq!(stream.current().generation, 1);
    handle.await.unwrap();
}

#[tokio::test]
async fn test_state_stream_yields_current_then_latest() {
    let (_, ctrl) = controller(vec![Step::Items(vec![item(1, 1, Some("a"))])]);
    let mut stream = ctrl.subscribe().into_stream();

    let first = stream.next().await.unwrap();
    assert_eq!(first.generation, 0);
    assert_eq!(first.status, LoadStatus::Loading);
    assert!(!first.refreshing);
    assert!(!first.is_settled());

    ctrl.refresh().await;

    let latest = stream.next().await.unwrap();
    assert_eq!(latest.status, LoadStatus::Success);
    assert_eq!(latest.items().len(), 1);
}

// ── Overlapping refreshes ───────────────────────────────────────────

#[tokio::test]
async fn test_newer_refresh_supersedes_in_flight_one() {
    let (_slow_tx, slow_rx) = oneshot::channel();
    let (source, ctrl) = controller(vec![
        Step::Gate(slow_rx),
        Step::Items(vec![item(7, 3, Some("fresh"))]),
    ]);

    let first = ctrl.spawn_refresh();
    source.started.notified().await;

    let second = ctrl.refresh().await;
    let first = first.await.unwrap();

    assert_eq!(second.status, LoadStatus::Success);
    assert_eq!(second.generation, 2);
    // The superseded cycle returns the winner's snapshot and never publishes.
    assert_eq!(first, second);
    assert_eq!(ctrl.snapshot().generation, 2);
    assert_eq!(ctrl.item(7).unwrap().name.as_deref(), Some("fresh"));
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_shutdown_settles_in_flight_cycle() {
    let (_tx, rx) = oneshot::channel();
    let (source, ctrl) = controller(vec![Step::Gate(rx)]);

    let handle = ctrl.spawn_refresh();
    source.started.notified().await;
    ctrl.shutdown().await;

    let snap = handle.await.unwrap();
    assert_eq!(snap.status, LoadStatus::failed());
    assert!(!snap.refreshing);
}

#[tokio::test]
async fn test_dropped_refresh_still_settles() {
    let (tx, rx) = oneshot::channel();
    let (source, ctrl) = controller(vec![Step::Gate(rx)]);
    let mut stream = ctrl.subscribe();

    let timed_out = tokio::time::timeout(Duration::from_millis(50), ctrl.refresh()).await;
    assert!(timed_out.is_err());
    assert_eq!(source.calls(), 1);
    assert!(ctrl.is_refreshing());

    tx.send(vec![item(1, 1, Some("late"))]).unwrap();

    let snap = stream.settled().await.unwrap();
    assert_eq!(snap.status, LoadStatus::Success);
    assert!(!ctrl.is_refreshing());
    assert_eq!(ctrl.item(1).unwrap().name.as_deref(), Some("late"));
}

#[tokio::test]
async fn test_dropped_refresh_settles_on_fetch_failure() {
    let (tx, rx) = oneshot::channel::<Vec<fetchlist_core::Item>>();
    let (_, ctrl) = controller(vec![Step::Gate(rx)]);
    let mut stream = ctrl.subscribe();

    tokio::select! {
        _ = ctrl.refresh() => panic!("gated refresh finished early"),
        () = tokio::time::sleep(Duration::from_millis(20)) => {}
    }
    drop(tx);

    let snap = stream.settled().await.unwrap();
    assert_eq!(snap.status, LoadStatus::failed());
    assert!(!snap.refreshing);
}

#[tokio::test]
async fn test_source_panic_publishes_generic_error() {
    let (_, ctrl) = controller(vec![
        Step::Panic("source blew up"),
        Step::Items(vec![item(1, 1, Some("a"))]),
    ]);

    let snap = ctrl.refresh().await;

    assert_eq!(snap.status, LoadStatus::failed());
    assert!(!snap.refreshing);
    assert_eq!(ctrl.refresh().await.status, LoadStatus::Success);
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_periodic_refresh() {
    let config = ControllerConfig {
        refresh_interval_secs: 30,
        ..ControllerConfig::default()
    };
    let (source, ctrl) = controller_with(vec![Step::Items(vec![item(1, 1, Some("a"))])], config);

    let snap = ctrl.start().await;
    assert_eq!(snap.status, LoadStatus::Success);
    assert_eq!(source.calls(), 1);

    tokio::time::sleep(Duration::from_secs(65)).await;
    assert_eq!(source.calls(), 3);
    // Script exhausted after the first step: later cycles fetch `[]`.
    assert_eq!(ctrl.status(), LoadStatus::Empty);

    ctrl.shutdown().await;
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(source.calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_second_start_does_not_duplicate_periodic_task() {
    let config = ControllerConfig {
        refresh_interval_secs: 30,
        ..ControllerConfig::default()
    };
    let (source, ctrl) = controller_with(Vec::new(), config);

    ctrl.start().await;
    ctrl.start().await;
    assert_eq!(source.calls(), 2);

    tokio::time::sleep(Duration::from_secs(65)).await;
    assert_eq!(source.calls(), 4);

    ctrl.shutdown().await;
}

#[tokio::test]
async fn test_start_without_interval_fetches_once() {
    let (source, ctrl) = controller(vec![Step::Items(vec![item(1, 1, Some("a"))])]);

    ctrl.start().await;
    ctrl.shutdown().await;

    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_item_lookup_by_id() {
    let (_, ctrl) = controller(vec![Step::Items(vec![
        item(1, 1, Some("one")),
        item(2, 1, None),
    ])]);
    assert!(ctrl.item(1).is_none());

    ctrl.refresh().await;

    assert_eq!(ctrl.item(1).unwrap().list_id, 1);
    // Filtered items are not routable.
    assert!(ctrl.item(2).is_none());
}
