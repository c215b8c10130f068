//! Cascade behavior under injected store faults
//!
//! The node record's delete is the primary write; everything after it is
//! best-effort. These scenarios force the cascade to fail and verify the
//! contract: the node stays gone, readers never see the orphans, and a
//! sweep makes the cleanup physical.

mod common;

use common::{flaky_api, memory_api};
use mindgraph::GraphError;
use rand::seq::SliceRandom;

// === Scenario: cascade failure is partial success, not an error ===
#[tokio::test]
async fn failed_cascade_reports_cleanup_pending() {
    let (api, store) = flaky_api();
    let n = api.create_node(Some("u1"), "N", "").await.unwrap();
    let other = api.create_node(Some("u1"), "O", "").await.unwrap();
    let quiz = api.create_quiz(Some("u1"), "Q", "", None).await.unwrap();
    api.create_edge(Some("u1"), &n.key, &other.key).await.unwrap();
    api.create_tag(Some("u1"), &quiz.key, &n.key).await.unwrap();

    store.fail_deletes(true);
    let report = api.delete_node(Some("u1"), &n.key).await.unwrap();
    assert!(report.cleanup_pending);
    assert_eq!(report.edges_removed, 0);
    assert_eq!(report.tags_removed, 0);

    // The primary delete committed: the node is gone and stays gone.
    assert!(matches!(
        api.get_node(&n.key).await,
        Err(GraphError::NodeNotFound(_))
    ));

    // Readers already see the orphans as deleted.
    assert!(api.list_all_edges(100).await.unwrap().is_empty());
    assert!(api.list_tags_by_node(&n.key).await.unwrap().is_empty());
    assert!(api
        .list_tags_by_artifact(&quiz.key, 100)
        .await
        .unwrap()
        .is_empty());
}

// === Scenario: the sweep finishes what the cascade could not ===
#[tokio::test]
async fn sweep_repairs_after_failed_cascade() {
    let (api, store) = flaky_api();
    let n = api.create_node(Some("u1"), "N", "").await.unwrap();
    let other = api.create_node(Some("u1"), "O", "").await.unwrap();
    let quiz = api.create_quiz(Some("u1"), "Q", "", None).await.unwrap();
    api.create_edge(Some("u1"), &n.key, &other.key).await.unwrap();
    api.create_edge(Some("u1"), &other.key, &n.key).await.unwrap();
    api.create_tag(Some("u1"), &quiz.key, &n.key).await.unwrap();

    store.fail_deletes(true);
    let report = api.delete_node(Some("u1"), &n.key).await.unwrap();
    assert!(report.cleanup_pending);

    // Store recovers; the repair pass drains the orphans.
    store.fail_deletes(false);
    let sweep = api.sweep(1000).await.unwrap();
    assert_eq!(sweep.edges_removed, 2);
    assert_eq!(sweep.tags_removed, 1);

    // Nothing left on the second pass.
    let again = api.sweep(1000).await.unwrap();
    assert_eq!(again.edges_removed, 0);
    assert_eq!(again.tags_removed, 0);
}

// === Scenario: validation failures abort before any write even when the
// store is healthy, so a later cascade failure cannot be blamed on them ===
#[tokio::test]
async fn validation_failures_never_write() {
    let (api, store) = flaky_api();
    store.fail_deletes(true); // deletes broken; creates must be unaffected

    let n = api.create_node(Some("u1"), "N", "").await.unwrap();
    assert!(matches!(
        api.create_edge(Some("u1"), &n.key, &n.key).await,
        Err(GraphError::Forbidden(_))
    ));
    assert!(api.list_all_edges(10).await.unwrap().is_empty());
}

// === Scenario: random topology, full cascade, graph ends consistent ===
#[tokio::test]
async fn randomized_cascade_leaves_no_dangling_edges() {
    let api = memory_api();
    let mut rng = rand::thread_rng();

    let mut nodes = Vec::new();
    for i in 0..12 {
        nodes.push(
            api.create_node(Some("u1"), &format!("n{i}"), "")
                .await
                .unwrap()
                .key,
        );
    }

    // Random simple digraph; duplicates and self-loops rejected by design.
    for _ in 0..40 {
        let parent = nodes.choose(&mut rng).unwrap().clone();
        let child = nodes.choose(&mut rng).unwrap().clone();
        let _ = api.create_edge(Some("u1"), &parent, &child).await;
    }

    // Delete a random half of the nodes through the engine.
    let mut victims = nodes.clone();
    victims.shuffle(&mut rng);
    victims.truncate(6);
    for victim in &victims {
        api.delete_node(Some("u1"), victim).await.unwrap();
    }

    // Every surviving edge touches only surviving nodes.
    let survivors: Vec<_> = nodes
        .iter()
        .filter(|n| !victims.contains(n))
        .cloned()
        .collect();
    for edge in api.list_all_edges(1000).await.unwrap() {
        assert!(survivors.contains(&edge.parent_key));
        assert!(survivors.contains(&edge.child_key));
    }

    // And a sweep finds nothing to repair.
    let sweep = api.sweep(1000).await.unwrap();
    assert_eq!(sweep.edges_removed, 0);
    assert_eq!(sweep.tags_removed, 0);
}
