// src/control/session.rs
//
// The control loop: poll the controller, react to button presses, turn the
// stick into a motion vector and forward it through the throttle. Whatever
// ends the loop, `ControlSession::run` finishes with the dispatcher's
// shutdown sequence.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::watch;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{error, info, warn};

use valepad_common::error::Error;
use valepad_common::models::controller::{ControlButton, ControllerFrame};
use valepad_common::models::modes::{FanMode, SpeedMode};
use valepad_common::models::motion::MotionVector;
use valepad_common::models::status::ControlSnapshot;
use valepad_common::traits::InputDevice;

use crate::config::ControlConfig;
use crate::control::dispatcher::CommandDispatcher;
use crate::control::throttle::CommandThrottle;
use crate::input::buttons::ButtonLatch;
use crate::input::normalizer::normalize;

/// Why a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// The quit button was pressed.
    Quit,
    /// The robot was sent home.
    Docked,
    /// Ctrl-C or another external stop request.
    Interrupted,
}

pub struct ControlSession<D: InputDevice> {
    config: ControlConfig,
    input: D,
    dispatcher: Arc<CommandDispatcher>,
    throttle: CommandThrottle,
    latch: ButtonLatch,
    speed: SpeedMode,
    fan: FanMode,
    last_sent: Option<MotionVector>,
    snapshot_tx: watch::Sender<ControlSnapshot>,
}

impl<D: InputDevice> ControlSession<D> {
    pub fn new(
        config: ControlConfig,
        input: D,
        dispatcher: Arc<CommandDispatcher>,
    ) -> Result<Self, Error> {
        let speed = config.speed_mode()?;
        let throttle = CommandThrottle::from_config(&config);
        let snapshot = ControlSnapshot {
            speed_level: speed.level(),
            ..Default::default()
        };
        let (snapshot_tx, _) = watch::channel(snapshot);
        Ok(Self {
            config,
            input,
            dispatcher,
            throttle,
            latch: ButtonLatch::new(),
            speed,
            fan: FanMode::default(),
            last_sent: None,
            snapshot_tx,
        })
    }

    /// Receiver for the state snapshots published after every tick.
    pub fn subscribe(&self) -> watch::Receiver<ControlSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn dispatcher(&self) -> &Arc<CommandDispatcher> {
        &self.dispatcher
    }

    pub fn fan(&self) -> FanMode {
        self.fan
    }

    /// Enables manual control and runs the loop until it ends or `interrupt`
    /// resolves. Enabling happens inside the same cancellation scope, so an
    /// interrupt during a slow enable still reaches the shutdown sequence.
    ///
    /// The exit sequence (shutdown, or dock for `Docked`) runs after the
    /// scope has closed and cannot be cut short by `interrupt`.
    pub async fn run<F>(mut self, interrupt: F) -> Result<SessionExit, Error>
    where
        F: Future<Output = ()>,
    {
        info!("Starting control session with '{}'", self.input.name());

        let outcome = tokio::select! {
            result = AssertUnwindSafe(self.drive()).catch_unwind() => match result {
                Ok(result) => result,
                Err(panic) => Err(Error::Session(format!(
                    "control loop panicked: {}",
                    panic_message(panic.as_ref())
                ))),
            },
            _ = interrupt => {
                info!("Interrupt received; leaving control loop.");
                Ok(SessionExit::Interrupted)
            }
        };

        match &outcome {
            Ok(SessionExit::Docked) => {
                if !self.dispatcher.dock().await {
                    warn!("Dock request did not complete.");
                }
            }
            Ok(_) => {
                self.dispatcher.shutdown().await;
            }
            Err(e) => {
                error!("Control loop ended with an error: {}", e);
                self.dispatcher.shutdown().await;
            }
        }
        outcome
    }

    async fn drive(&mut self) -> Result<SessionExit, Error> {
        self.dispatcher.enable().await;
        self.run_loop().await
    }

    async fn run_loop(&mut self) -> Result<SessionExit, Error> {
        let mut ticker = interval(self.config.tick_period());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if let Some(exit) = self.tick(Instant::now()).await? {
                return Ok(exit);
            }
        }
    }

    /// One pass of the loop. Returns `Some` when the session should end; the
    /// caller is then responsible for the matching exit sequence.
    pub async fn tick(&mut self, now: Instant) -> Result<Option<SessionExit>, Error> {
        let frame = self.input.poll()?;

        for button in self.latch.rising_edges(&frame) {
            if let Some(exit) = self.handle_button(button).await {
                self.publish(&frame);
                return Ok(Some(exit));
            }
        }

        let candidate = normalize(frame.stick, self.config.deadzone, self.speed.max_speed());
        if let Some(vector) = self.throttle.should_send(candidate, now) {
            self.dispatcher.move_robot(vector).await;
            // Recorded even if the send failed, so a dead link is not
            // hammered at tick rate.
            self.throttle.record(vector, now);
            self.last_sent = Some(vector);
        }

        self.publish(&frame);
        Ok(None)
    }

    async fn handle_button(&mut self, button: ControlButton) -> Option<SessionExit> {
        match button {
            ControlButton::Cross => {
                self.fan = self.fan.toggled();
                self.dispatcher.set_fan(self.fan).await;
            }
            ControlButton::Circle => {
                let level = self.speed.cycle();
                info!("Speed level set to {}", level);
            }
            ControlButton::Square => {
                self.dispatcher.play_sound().await;
            }
            ControlButton::R1 => {
                let boosted = self.speed.toggle_boost();
                info!(
                    "Boost {} (max speed {})",
                    if boosted { "on" } else { "off" },
                    self.speed.max_speed()
                );
            }
            ControlButton::Triangle => {
                info!("Dock requested.");
                return Some(SessionExit::Docked);
            }
            ControlButton::Options => {
                info!("Quit requested.");
                return Some(SessionExit::Quit);
            }
        }
        None
    }

    fn publish(&self, frame: &ControllerFrame) {
        self.snapshot_tx.send_replace(ControlSnapshot {
            stick: frame.stick,
            speed_level: self.speed.level(),
            boost: self.speed.is_boosted(),
            fan: self.fan,
            controller_battery: frame.battery,
            last_sent: self.last_sent,
        });
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
