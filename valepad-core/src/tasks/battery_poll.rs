// src/tasks/battery_poll.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use valepad_common::error::Error;
use valepad_common::models::robot::{RobotState, STATE_PATH};
use valepad_common::traits::RobotTransport;

/// Reads the robot's battery charge from its state endpoint.
pub async fn fetch_battery_level(
    transport: &dyn RobotTransport,
    request_timeout: Duration,
) -> Result<Option<u8>, Error> {
    let value = timeout(request_timeout, transport.get_json(STATE_PATH)).await??;
    Ok(RobotState::from_value(value)?.battery_level())
}

/// Spawns a background task that refreshes the robot battery level every
/// `period` until `shutdown_rx` flips to true (or its sender goes away).
///
/// The latest reading is published on the returned receiver; `None` means
/// the level is unknown, including after a failed poll.
pub fn spawn_battery_poll_task(
    transport: Arc<dyn RobotTransport>,
    period: Duration,
    request_timeout: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> (JoinHandle<()>, watch::Receiver<Option<u8>>) {
    let (level_tx, level_rx) = watch::channel(None);

    let handle = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            if *shutdown_rx.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    let level = match fetch_battery_level(transport.as_ref(), request_timeout).await {
                        Ok(level) => level,
                        Err(e) => {
                            warn!("Failed to get battery level: {}", e);
                            None
                        }
                    };
                    debug!("Robot battery: {:?}", level);
                    level_tx.send_replace(level);
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("Battery poller stopped.");
    });

    (handle, level_rx)
}
