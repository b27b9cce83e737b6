// valepad-tui/src/status_display.rs
//
// Full-screen status readout, redrawn on a timer. Purely presentational: it
// only ever reads the snapshots published by the control loop and the
// battery poller.

use std::io::{stdout, Write};
use std::time::Duration;

use colored::{ColoredString, Colorize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, warn};

use valepad_common::models::status::ControlSnapshot;

const BAR_WIDTH: usize = 20;
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

const HELP: [&str; 6] = [
    "X: Toggle fan mode",
    "Circle: Cycle speed",
    "Square: Play sound",
    "Triangle: Dock robot and quit",
    "R1: Toggle boost",
    "Options: Quit",
];

/// Everything shown on screen for one redraw.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusView {
    pub control: ControlSnapshot,
    pub robot_battery: Option<u8>,
}

fn percent(level: Option<u8>) -> ColoredString {
    match level {
        Some(l) if l >= 50 => format!("{l}%").green(),
        Some(l) if l >= 20 => format!("{l}%").yellow(),
        Some(l) => format!("{l}%").red(),
        None => "?%".dimmed(),
    }
}

/// `[=========           ] -0.10` for an axis value in `[-1, 1]`.
fn axis_bar(value: f64) -> String {
    let value = if value.is_nan() { 0.0 } else { value.clamp(-1.0, 1.0) };
    let filled = (((value + 1.0) * 10.0) as usize).min(BAR_WIDTH);
    format!("[{:<width$}] {:.2}", "=".repeat(filled), value, width = BAR_WIDTH)
}

pub fn render_status(view: &StatusView) -> String {
    let control = &view.control;
    let mut lines = vec![
        "Valetudo TUI".bold().to_string(),
        String::new(),
        format!("Robot battery:      {}", percent(view.robot_battery)),
        format!("Controller battery: {}", percent(control.controller_battery)),
        format!("Speed level:        {}", control.speed_level),
        format!(
            "Boost:              {}",
            if control.boost { "on".cyan() } else { "off".normal() }
        ),
        format!("Fan mode:           {}", control.fan),
        String::new(),
    ];
    lines.extend(HELP.iter().map(|h| h.to_string()));
    lines.push(String::new());
    lines.push(format!("Joystick X: {}", axis_bar(control.stick.x)));
    lines.push(format!("Joystick Y: {}", axis_bar(control.stick.y)));
    if let Some(sent) = control.last_sent {
        lines.push(format!(
            "Last sent:  velocity {:.3}, angle {:.1}",
            sent.velocity, sent.angle
        ));
    }
    lines.join("\n")
}

/// Spawns the display refresher. It redraws every `period` until
/// `shutdown_rx` flips to true or its sender is dropped.
pub fn spawn_status_display_task(
    snapshot_rx: watch::Receiver<ControlSnapshot>,
    battery_rx: watch::Receiver<Option<u8>>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            if *shutdown_rx.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    let view = StatusView {
                        control: snapshot_rx.borrow().clone(),
                        robot_battery: *battery_rx.borrow(),
                    };
                    let mut out = stdout().lock();
                    if let Err(e) = writeln!(out, "{}{}", CLEAR_SCREEN, render_status(&view))
                        .and_then(|_| out.flush())
                    {
                        warn!("Status display write failed: {}", e);
                        break;
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        debug!("Status display stopped.");
    })
}
