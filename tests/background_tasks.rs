//! Background drain, export and snapshot tasks on a paused tokio clock

mod common;

use common::{learner, satellite, two_fusing_worlds, vessel};
use fusegraph::{EventBus, FusionConfig, OpenStore, SnapshotStore, SqliteSnapshotStore};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn drain_task_learns_one_entity_per_tick() {
    let learner = learner();
    for i in 0..3 {
        learner.learn_from_entity(vessel(&format!("v{}", i), 0.0, 0.0, 1.0));
    }

    let task = Arc::clone(&learner).spawn(Duration::from_secs(5));

    tokio::time::sleep(Duration::from_millis(5_500)).await;
    assert_eq!(learner.queue_len(), 2);

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(learner.queue_len(), 0);
    assert_eq!(learner.get_metrics().processed, 3);

    task.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stopped_drain_task_leaves_queue_alone() {
    let learner = learner();
    let task = Arc::clone(&learner).spawn(Duration::from_secs(5));
    task.stop().await;

    learner.learn_from_entity(vessel("late", 0.0, 0.0, 1.0));
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(learner.queue_len(), 1);
}

#[tokio::test(start_paused = true)]
async fn exporter_writes_periodic_snapshots() {
    let learner = learner();
    let store: Arc<dyn SnapshotStore> = Arc::new(SqliteSnapshotStore::open_in_memory().unwrap());
    let task = Arc::clone(&learner).spawn_exporter(Arc::clone(&store), Duration::from_secs(60));

    tokio::time::sleep(Duration::from_secs(125)).await;
    task.stop().await;

    assert_eq!(store.export_count().unwrap(), 2);
    let latest = store.latest_export().unwrap().unwrap();
    assert_eq!(latest.metrics.node_count, learner.get_metrics().node_count);
}

#[tokio::test(start_paused = true)]
async fn snapshot_task_measures_throughput() {
    let orchestrator = Arc::new(two_fusing_worlds(EventBus::default()));
    let task = Arc::clone(&orchestrator).spawn_snapshot_task(Duration::from_secs(5));

    for i in 0..4 {
        orchestrator
            .add_entity_to_world("alpha", satellite(&format!("sat-{}", i), 100 + i))
            .unwrap();
    }
    tokio::time::sleep(Duration::from_millis(5_100)).await;
    task.stop().await;

    let alpha = orchestrator.get_world_state("alpha").unwrap();
    assert_eq!(alpha.performance.registrations_total, 4);
    assert!(alpha.performance.sampled_at.is_some());
}

#[tokio::test(start_paused = true)]
async fn configured_intervals_drive_every_task() {
    let config = FusionConfig::from_yaml_str(
        r#"
learner:
  drain_interval_ms: 1000
  export_interval_ms: 10000
orchestrator:
  snapshot_interval_ms: 2000
"#,
    )
    .unwrap();
    let events = EventBus::default();
    let learner = Arc::new(config.learner(events.clone()));
    let orchestrator = Arc::new(config.orchestrator(events, Arc::clone(&learner)).unwrap());
    let store: Arc<dyn SnapshotStore> = Arc::new(SqliteSnapshotStore::open_in_memory().unwrap());

    for i in 0..3 {
        orchestrator
            .add_entity(vessel(&format!("v{}", i), i as f64, 0.0, 5.0))
            .unwrap();
    }
    let tasks = config.spawn_background(
        Arc::clone(&learner),
        Arc::clone(&orchestrator),
        Some(Arc::clone(&store)),
    );
    let names: Vec<_> = tasks.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["ontology-drain", "world-snapshot", "ontology-export"]);

    tokio::time::sleep(Duration::from_millis(1_500)).await;
    assert_eq!(learner.queue_len(), 2);
    assert!(orchestrator
        .get_world_state("production")
        .unwrap()
        .performance
        .sampled_at
        .is_none());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(learner.queue_len(), 0);
    assert!(orchestrator
        .get_world_state("production")
        .unwrap()
        .performance
        .sampled_at
        .is_some());
    assert_eq!(store.export_count().unwrap(), 0);

    tokio::time::sleep(Duration::from_secs(7)).await;
    assert_eq!(store.export_count().unwrap(), 1);
    assert_eq!(store.latest_export().unwrap().unwrap().metrics.processed, 3);

    for task in tasks {
        task.stop().await;
    }
}

#[tokio::test(start_paused = true)]
async fn no_store_means_no_exporter() {
    let config = FusionConfig::default();
    let events = EventBus::default();
    let learner = Arc::new(config.learner(events.clone()));
    let orchestrator = Arc::new(config.orchestrator(events, Arc::clone(&learner)).unwrap());

    let tasks = config.spawn_background(learner, orchestrator, None);
    assert_eq!(tasks.len(), 2);
    for task in tasks {
        task.stop().await;
    }
}
