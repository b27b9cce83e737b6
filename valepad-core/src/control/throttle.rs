// src/control/throttle.rs

use std::time::Duration;

use tokio::time::Instant;

use valepad_common::models::motion::MotionVector;

use crate::config::ControlConfig;

const ANGLE_DECIMALS: i32 = 1;
const VELOCITY_DECIMALS: i32 = 3;

/// What was last handed to the robot. The `last_*` fields are `None` only
/// until the first move has been attempted.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThrottleState {
    pub last_angle: Option<f64>,
    pub last_velocity: Option<f64>,
    pub last_send_time: Option<Instant>,
}

/// Decides which motion vectors are worth a network round trip.
///
/// A candidate goes out when it differs from the last sent vector by more
/// than the epsilons, or when `send_interval` has passed since the last
/// send (a heartbeat, so a held stick keeps the robot's command fresh).
#[derive(Debug, Clone)]
pub struct CommandThrottle {
    angle_epsilon: f64,
    velocity_epsilon: f64,
    send_interval: Duration,
    state: ThrottleState,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Rounds a vector to the precision the throttle compares and sends at.
pub fn quantize(vector: MotionVector) -> MotionVector {
    MotionVector::new(
        round_to(vector.velocity.clamp(-1.0, 1.0), VELOCITY_DECIMALS),
        round_to(vector.angle, ANGLE_DECIMALS),
    )
}

impl CommandThrottle {
    pub fn new(angle_epsilon: f64, velocity_epsilon: f64, send_interval: Duration) -> Self {
        Self {
            angle_epsilon,
            velocity_epsilon,
            send_interval,
            state: ThrottleState::default(),
        }
    }

    pub fn from_config(config: &ControlConfig) -> Self {
        Self::new(config.angle_epsilon, config.velocity_epsilon, config.send_interval())
    }

    pub fn state(&self) -> &ThrottleState {
        &self.state
    }

    /// Returns the rounded vector to send, or `None` to skip this tick.
    /// Does not touch the state; call `record` once the send was attempted.
    pub fn should_send(&self, candidate: MotionVector, now: Instant) -> Option<MotionVector> {
        let rounded = quantize(candidate);

        let (last_angle, last_velocity, last_time) = match (
            self.state.last_angle,
            self.state.last_velocity,
            self.state.last_send_time,
        ) {
            (Some(a), Some(v), Some(t)) => (a, v, t),
            _ => return Some(rounded),
        };

        // Deltas are rounded too, so 0.52 - 0.50 compares as exactly 0.02.
        let angle_delta = round_to((rounded.angle - last_angle).abs(), ANGLE_DECIMALS);
        let velocity_delta = round_to((rounded.velocity - last_velocity).abs(), VELOCITY_DECIMALS);
        let stale = now.saturating_duration_since(last_time) > self.send_interval;

        if angle_delta > self.angle_epsilon || velocity_delta > self.velocity_epsilon || stale {
            Some(rounded)
        } else {
            None
        }
    }

    /// Records an attempted send, whether or not it reached the robot.
    pub fn record(&mut self, sent: MotionVector, now: Instant) {
        let sent = quantize(sent);
        self.state = ThrottleState {
            last_angle: Some(sent.angle),
            last_velocity: Some(sent.velocity),
            last_send_time: Some(now),
        };
    }
}
