// File: valepad-common/src/models/motion.rs

use serde::{Deserialize, Serialize};

/// One reading of the left stick, already oriented so that pushing the
/// stick away from the player gives a positive `y`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StickSample {
    pub x: f64,
    pub y: f64,
}

impl StickSample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Motion intent for a single tick, in the robot's manual-control terms.
///
/// `angle` is in degrees: 0 drives straight ahead, +90/-90 spin right/left in
/// place and 180 reverses. `velocity` is a signed fraction of full speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MotionVector {
    pub velocity: f64,
    pub angle: f64,
}

impl MotionVector {
    pub const STOP: MotionVector = MotionVector { velocity: 0.0, angle: 0.0 };

    pub fn new(velocity: f64, angle: f64) -> Self {
        Self { velocity, angle }
    }
}
