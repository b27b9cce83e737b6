// File: valepad-core/tests/test_utils/helpers.rs
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use valepad_common::error::Error;
use valepad_common::models::controller::{ControlButton, ControllerFrame};
use valepad_common::models::motion::StickSample;
use valepad_common::traits::{InputDevice, RobotTransport};
use valepad_core::{CommandDispatcher, ControlConfig};

/// Records every request instead of talking to a robot.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    pub puts: Arc<Mutex<Vec<(String, Value)>>>,
    pub gets: Arc<Mutex<Vec<String>>>,
    pub fail_puts: bool,
    /// How long each PUT takes to answer, after it has been recorded.
    pub put_delay: Duration,
    pub state: Arc<Mutex<Option<Value>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_puts: true,
            ..Default::default()
        }
    }

    pub fn slow(put_delay: Duration) -> Self {
        Self {
            put_delay,
            ..Default::default()
        }
    }

    pub fn with_state(state: Value) -> Self {
        let transport = Self::default();
        *transport.state.lock().unwrap() = Some(state);
        transport
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.puts.lock().unwrap().iter().map(|(_, b)| b.clone()).collect()
    }

    /// One label per PUT: the `action` field, or `fan:<preset>` for fan calls.
    pub fn actions(&self) -> Vec<String> {
        self.bodies()
            .iter()
            .map(|body| {
                if let Some(action) = body.get("action").and_then(Value::as_str) {
                    action.to_string()
                } else if let Some(name) = body.get("name").and_then(Value::as_str) {
                    format!("fan:{name}")
                } else {
                    body.to_string()
                }
            })
            .collect()
    }

    pub fn count(&self, action: &str) -> usize {
        self.actions().iter().filter(|a| a.as_str() == action).count()
    }

    pub fn moves(&self) -> Vec<(f64, f64)> {
        self.bodies()
            .iter()
            .filter(|b| b.get("action").and_then(Value::as_str) == Some("move"))
            .map(|b| {
                (
                    b.pointer("/vector/velocity").and_then(Value::as_f64).unwrap(),
                    b.pointer("/vector/angle").and_then(Value::as_f64).unwrap(),
                )
            })
            .collect()
    }
}

#[async_trait]
impl RobotTransport for RecordingTransport {
    async fn put_json(&self, path: &str, body: Value) -> Result<(), Error> {
        self.puts.lock().unwrap().push((path.to_string(), body));
        if !self.put_delay.is_zero() {
            tokio::time::sleep(self.put_delay).await;
        }
        if self.fail_puts {
            return Err(Error::HttpStatus {
                status: 503,
                body: "robot unavailable".into(),
            });
        }
        Ok(())
    }

    async fn get_json(&self, path: &str) -> Result<Value, Error> {
        self.gets.lock().unwrap().push(path.to_string());
        match self.state.lock().unwrap().clone() {
            Some(state) => Ok(state),
            None => Err(Error::HttpStatus {
                status: 500,
                body: String::new(),
            }),
        }
    }
}

/// Plays back a fixed list of frames, then keeps repeating the last one
/// (or fails, or panics, if asked to).
pub struct ScriptedInput {
    frames: VecDeque<ControllerFrame>,
    last: ControllerFrame,
    on_exhausted: Exhausted,
    pub polls: usize,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Exhausted {
    RepeatLast,
    Disconnect,
    Panic,
}

impl ScriptedInput {
    pub fn new(frames: Vec<ControllerFrame>) -> Self {
        Self {
            frames: frames.into(),
            last: ControllerFrame::default(),
            on_exhausted: Exhausted::RepeatLast,
            polls: 0,
        }
    }

    pub fn then(mut self, behaviour: Exhausted) -> Self {
        self.on_exhausted = behaviour;
        self
    }
}

impl InputDevice for ScriptedInput {
    fn name(&self) -> String {
        "scripted".to_string()
    }

    fn poll(&mut self) -> Result<ControllerFrame, Error> {
        self.polls += 1;
        if let Some(frame) = self.frames.pop_front() {
            self.last = frame.clone();
            return Ok(frame);
        }
        match self.on_exhausted {
            Exhausted::RepeatLast => Ok(self.last.clone()),
            Exhausted::Disconnect => Err(Error::Input("controller unplugged".into())),
            Exhausted::Panic => panic!("gamepad driver exploded"),
        }
    }
}

pub fn stick(x: f64, y: f64) -> ControllerFrame {
    ControllerFrame::new(StickSample::new(x, y))
}

pub fn press(button: ControlButton) -> ControllerFrame {
    ControllerFrame::default().with_pressed(button)
}

pub fn test_config() -> ControlConfig {
    ControlConfig::default()
}

pub fn dispatcher_for(transport: &RecordingTransport, config: &ControlConfig) -> Arc<CommandDispatcher> {
    Arc::new(CommandDispatcher::from_config(Arc::new(transport.clone()), config))
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-3
}

pub const TICK: Duration = Duration::from_millis(16);
