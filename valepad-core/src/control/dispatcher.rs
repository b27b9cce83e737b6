// src/control/dispatcher.rs

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use valepad_common::error::Error;
use valepad_common::models::modes::FanMode;
use valepad_common::models::motion::MotionVector;
use valepad_common::models::robot::RobotCommand;
use valepad_common::traits::RobotTransport;

use crate::config::ControlConfig;

/// Lifecycle of the manual-control session with the robot.
///
/// `Uninitialized -> Enabled -> Disabling -> Terminated`. There is no way
/// back; `Terminated` is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DispatcherState {
    Uninitialized = 0,
    Enabled = 1,
    Disabling = 2,
    Terminated = 3,
}

impl DispatcherState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => DispatcherState::Uninitialized,
            1 => DispatcherState::Enabled,
            2 => DispatcherState::Disabling,
            _ => DispatcherState::Terminated,
        }
    }
}

/// Sends commands to the robot. Failures are logged and reported as `false`,
/// never raised.
///
/// Only the first `shutdown` call runs the stop + disable sequence; once it
/// has started every other command is refused.
pub struct CommandDispatcher {
    transport: Arc<dyn RobotTransport>,
    state: AtomicU8,
    request_timeout: Duration,
    stop_settle: Duration,
    dock_settle: Duration,
}

impl CommandDispatcher {
    pub fn new(
        transport: Arc<dyn RobotTransport>,
        request_timeout: Duration,
        stop_settle: Duration,
        dock_settle: Duration,
    ) -> Self {
        Self {
            transport,
            state: AtomicU8::new(DispatcherState::Uninitialized as u8),
            request_timeout,
            stop_settle,
            dock_settle,
        }
    }

    pub fn from_config(transport: Arc<dyn RobotTransport>, config: &ControlConfig) -> Self {
        Self::new(
            transport,
            config.request_timeout(),
            config.stop_settle(),
            config.dock_settle(),
        )
    }

    pub fn state(&self) -> DispatcherState {
        DispatcherState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_enabled(&self) -> bool {
        self.state() == DispatcherState::Enabled
    }

    fn transition(&self, from: DispatcherState, to: DispatcherState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    async fn send(&self, command: RobotCommand) -> Result<(), Error> {
        let body = command.body()?;
        timeout(self.request_timeout, self.transport.put_json(command.path(), body)).await??;
        Ok(())
    }

    async fn send_logged(&self, command: RobotCommand) -> bool {
        match self.send(command).await {
            Ok(()) => {
                debug!("Sent {} ({:?})", command.describe(), command);
                true
            }
            Err(e) => {
                warn!("Failed to {}: {}", command.describe(), e);
                false
            }
        }
    }

    /// Sends only while the session is enabled.
    async fn send_if_enabled(&self, command: RobotCommand) -> bool {
        if !self.is_enabled() {
            debug!("Dropping {} in state {:?}", command.describe(), self.state());
            return false;
        }
        self.send_logged(command).await
    }

    /// Puts the robot into manual control. Only the first call does anything.
    /// The session counts as enabled even if the request fails, so the
    /// shutdown sequence still runs later.
    pub async fn enable(&self) -> bool {
        if !self.transition(DispatcherState::Uninitialized, DispatcherState::Enabled) {
            debug!("enable() ignored in state {:?}", self.state());
            return false;
        }
        let ok = self.send_logged(RobotCommand::EnableManualControl).await;
        if ok {
            info!("Manual control enabled.");
        }
        ok
    }

    pub async fn move_robot(&self, vector: MotionVector) -> bool {
        self.send_if_enabled(RobotCommand::Move(vector)).await
    }

    pub async fn disable(&self) -> bool {
        self.send_if_enabled(RobotCommand::DisableManualControl).await
    }

    pub async fn set_fan(&self, mode: FanMode) -> bool {
        let ok = self.send_if_enabled(RobotCommand::SetFan(mode)).await;
        if ok {
            info!("Fan set to {}", mode);
        }
        ok
    }

    pub async fn play_sound(&self) -> bool {
        self.send_if_enabled(RobotCommand::PlayTestSound).await
    }

    /// Stops the robot and leaves manual control: `move(0, 0)`, a short
    /// pause, then `disable`. Each step is best effort.
    ///
    /// Returns true only for the call that actually ran the sequence.
    pub async fn shutdown(&self) -> bool {
        if !self.transition(DispatcherState::Enabled, DispatcherState::Disabling) {
            // Never enabled: nothing to stop, just close the lifecycle.
            if self.transition(DispatcherState::Uninitialized, DispatcherState::Terminated) {
                info!("Shutdown before manual control was enabled; nothing to stop.");
            }
            return false;
        }

        info!("Stopping robot and disabling manual control...");
        let stopped = self.send_logged(RobotCommand::Move(MotionVector::STOP)).await;
        sleep(self.stop_settle).await;
        let disabled = self.send_logged(RobotCommand::DisableManualControl).await;

        self.state
            .store(DispatcherState::Terminated as u8, Ordering::SeqCst);
        if stopped && disabled {
            info!("Robot stopped, manual control disabled.");
        } else {
            warn!(
                "Shutdown sequence finished with failures (stop ok: {}, disable ok: {})",
                stopped, disabled
            );
        }
        true
    }

    /// Leaves manual control through the shutdown sequence, waits for the
    /// robot to settle, then sends it home.
    pub async fn dock(&self) -> bool {
        if !self.shutdown().await {
            warn!("Dock requested after shutdown had already started; ignoring.");
            return false;
        }
        sleep(self.dock_settle).await;
        let ok = self.send_logged(RobotCommand::Home).await;
        if ok {
            info!("Robot is returning to the dock.");
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::{mock, Sequence};
    use serde_json::Value;

    mock! {
        pub Transport {}

        #[async_trait]
        impl RobotTransport for Transport {
            async fn put_json(&self, path: &str, body: Value) -> Result<(), Error>;
            async fn get_json(&self, path: &str) -> Result<Value, Error>;
        }
    }

    fn action_is(body: &Value, action: &str) -> bool {
        body.get("action").and_then(Value::as_str) == Some(action)
    }

    fn dispatcher(mock: MockTransport) -> CommandDispatcher {
        CommandDispatcher::new(
            Arc::new(mock),
            Duration::from_secs(2),
            Duration::from_millis(100),
            Duration::from_secs(2),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_sends_stop_then_disable_once() {
        let mut mock = MockTransport::new();
        let mut seq = Sequence::new();
        mock.expect_put_json()
            .withf(|_, body| action_is(body, "enable"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_put_json()
            .withf(|_, body| {
                action_is(body, "move")
                    && body.pointer("/vector/velocity").and_then(Value::as_f64) == Some(0.0)
                    && body.pointer("/vector/angle").and_then(Value::as_f64) == Some(0.0)
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        mock.expect_put_json()
            .withf(|_, body| action_is(body, "disable"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        let d = dispatcher(mock);
        assert!(d.enable().await);
        assert!(d.shutdown().await);
        assert!(!d.shutdown().await);
        assert_eq!(d.state(), DispatcherState::Terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_stop_still_disables() {
        let mut mock = MockTransport::new();
        mock.expect_put_json()
            .withf(|_, body| action_is(body, "enable"))
            .times(1)
            .returning(|_, _| Ok(()));
        mock.expect_put_json()
            .withf(|_, body| action_is(body, "move"))
            .times(1)
            .returning(|_, _| Err(Error::HttpStatus { status: 500, body: "boom".into() }));
        mock.expect_put_json()
            .withf(|_, body| action_is(body, "disable"))
            .times(1)
            .returning(|_, _| Err(Error::HttpStatus { status: 503, body: String::new() }));

        let d = dispatcher(mock);
        d.enable().await;
        assert!(d.shutdown().await);
        assert_eq!(d.state(), DispatcherState::Terminated);
    }

    #[tokio::test(start_paused = true)]
    async fn commands_are_refused_outside_enabled_state() {
        let mut mock = MockTransport::new();
        mock.expect_put_json()
            .withf(|_, body| action_is(body, "enable"))
            .times(1)
            .returning(|_, _| Ok(()));
        mock.expect_put_json()
            .withf(|_, body| action_is(body, "move") || action_is(body, "disable"))
            .times(2)
            .returning(|_, _| Ok(()));

        let d = dispatcher(mock);
        assert!(!d.move_robot(MotionVector::new(0.5, 0.0)).await);
        assert!(!d.play_sound().await);
        d.enable().await;
        d.shutdown().await;
        assert!(!d.move_robot(MotionVector::new(0.5, 0.0)).await);
        assert!(!d.set_fan(FanMode::Max).await);
        assert!(!d.dock().await);
    }

    #[tokio::test(start_paused = true)]
    async fn dock_disables_before_going_home() {
        let mut mock = MockTransport::new();
        let mut seq = Sequence::new();
        for action in ["enable", "move", "disable", "home"] {
            mock.expect_put_json()
                .withf(move |_, body| action_is(body, action))
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        }

        let d = dispatcher(mock);
        d.enable().await;
        assert!(d.dock().await);
        assert!(!d.shutdown().await);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_request_is_cut_off_by_timeout() {
        struct Hanging;

        #[async_trait]
        impl RobotTransport for Hanging {
            async fn put_json(&self, _path: &str, _body: Value) -> Result<(), Error> {
                std::future::pending::<()>().await;
                Ok(())
            }

            async fn get_json(&self, _path: &str) -> Result<Value, Error> {
                std::future::pending::<()>().await;
                Ok(Value::Null)
            }
        }

        let d = CommandDispatcher::new(
            Arc::new(Hanging),
            Duration::from_secs(2),
            Duration::from_millis(100),
            Duration::from_secs(2),
        );
        assert!(!d.enable().await);
        assert!(d.is_enabled());
        assert!(d.shutdown().await);
        assert_eq!(d.state(), DispatcherState::Terminated);
    }

    #[tokio::test]
    async fn shutdown_without_enable_sends_nothing() {
        let mock = MockTransport::new();
        let d = dispatcher(mock);
        assert!(!d.shutdown().await);
        assert_eq!(d.state(), DispatcherState::Terminated);
        assert!(!d.enable().await);
    }
}
