// File: valepad-core/tests/battery_poll_tests.rs

mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::watch;

use valepad_common::models::robot::STATE_PATH;
use valepad_core::tasks::battery_poll::{fetch_battery_level, spawn_battery_poll_task};

use test_utils::helpers::RecordingTransport;

fn robot_state(level: u8) -> serde_json::Value {
    json!({
        "__class": "ValetudoRobotState",
        "attributes": [
            {"__class": "StatusStateAttribute", "value": "idle"},
            {"__class": "BatteryStateAttribute", "level": level, "flag": "charging"}
        ]
    })
}

#[tokio::test]
async fn fetch_reads_battery_attribute() {
    let transport = RecordingTransport::with_state(robot_state(64));
    let level = fetch_battery_level(&transport, Duration::from_secs(2)).await.unwrap();
    assert_eq!(level, Some(64));
    assert_eq!(transport.gets.lock().unwrap().as_slice(), [STATE_PATH.to_string()]);
}

#[tokio::test(start_paused = true)]
async fn poller_publishes_and_stops_on_shutdown() {
    let transport = RecordingTransport::with_state(robot_state(87));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (handle, mut level_rx) = spawn_battery_poll_task(
        Arc::new(transport.clone()),
        Duration::from_secs(5),
        Duration::from_secs(2),
        shutdown_rx,
    );

    level_rx.changed().await.unwrap();
    assert_eq!(*level_rx.borrow(), Some(87));

    tokio::time::sleep(Duration::from_secs(11)).await;
    assert_eq!(transport.gets.lock().unwrap().len(), 3);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn failed_poll_reports_unknown_level() {
    let transport = RecordingTransport::new();
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let (handle, mut level_rx) = spawn_battery_poll_task(
        Arc::new(transport),
        Duration::from_secs(5),
        Duration::from_secs(2),
        shutdown_rx,
    );

    level_rx.changed().await.unwrap();
    assert_eq!(*level_rx.borrow(), None);
    handle.abort();
}
