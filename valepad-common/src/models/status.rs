// File: valepad-common/src/models/status.rs

use crate::models::modes::FanMode;
use crate::models::motion::{MotionVector, StickSample};

/// Read-only copy of the control loop's state, published for the display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlSnapshot {
    pub stick: StickSample,
    pub speed_level: f64,
    pub boost: bool,
    pub fan: FanMode,
    pub controller_battery: Option<u8>,
    pub last_sent: Option<MotionVector>,
}
