// File: valepad-common/src/models/mod.rs
pub mod controller;
pub mod modes;
pub mod motion;
pub mod robot;
pub mod status;

pub use controller::{ControlButton, ControllerFrame};
pub use modes::{FanMode, SpeedMode};
pub use motion::{MotionVector, StickSample};
pub use robot::{RobotCommand, RobotState};
pub use status::ControlSnapshot;
