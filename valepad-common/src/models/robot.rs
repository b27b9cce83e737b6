// File: valepad-common/src/models/robot.rs
//
// Request and response shapes for the Valetudo capability API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::models::modes::FanMode;
use crate::models::motion::MotionVector;

pub const MANUAL_CONTROL_PATH: &str =
    "/api/v2/robot/capabilities/HighResolutionManualControlCapability";
pub const FAN_PRESET_PATH: &str = "/api/v2/robot/capabilities/FanSpeedControlCapability/preset";
pub const BASIC_CONTROL_PATH: &str = "/api/v2/robot/capabilities/BasicControlCapability";
pub const SPEAKER_TEST_PATH: &str = "/api/v2/robot/capabilities/SpeakerTestCapability";
pub const STATE_PATH: &str = "/api/v2/robot/state/";

pub const BATTERY_ATTRIBUTE_CLASS: &str = "BatteryStateAttribute";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ManualControlBody {
    Move { vector: MotionVector },
    Enable,
    Disable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct FanPresetBody {
    name: FanMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum BasicControlBody {
    Home,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum SpeakerTestBody {
    PlayTestSound,
}

/// Every write the controller can make against the robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RobotCommand {
    Move(MotionVector),
    EnableManualControl,
    DisableManualControl,
    SetFan(FanMode),
    Home,
    PlayTestSound,
}

impl RobotCommand {
    /// Capability path, relative to the robot's base URL.
    pub fn path(&self) -> &'static str {
        match self {
            RobotCommand::Move(_)
            | RobotCommand::EnableManualControl
            | RobotCommand::DisableManualControl => MANUAL_CONTROL_PATH,
            RobotCommand::SetFan(_) => FAN_PRESET_PATH,
            RobotCommand::Home => BASIC_CONTROL_PATH,
            RobotCommand::PlayTestSound => SPEAKER_TEST_PATH,
        }
    }

    pub fn body(&self) -> Result<Value, Error> {
        let value = match *self {
            RobotCommand::Move(vector) => serde_json::to_value(ManualControlBody::Move { vector })?,
            RobotCommand::EnableManualControl => serde_json::to_value(ManualControlBody::Enable)?,
            RobotCommand::DisableManualControl => serde_json::to_value(ManualControlBody::Disable)?,
            RobotCommand::SetFan(name) => serde_json::to_value(FanPresetBody { name })?,
            RobotCommand::Home => serde_json::to_value(BasicControlBody::Home)?,
            RobotCommand::PlayTestSound => serde_json::to_value(SpeakerTestBody::PlayTestSound)?,
        };
        Ok(value)
    }

    /// Short name used in log lines.
    pub fn describe(&self) -> &'static str {
        match self {
            RobotCommand::Move(_) => "move",
            RobotCommand::EnableManualControl => "enable",
            RobotCommand::DisableManualControl => "disable",
            RobotCommand::SetFan(_) => "set fan",
            RobotCommand::Home => "dock",
            RobotCommand::PlayTestSound => "play sound",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RobotAttribute {
    #[serde(rename = "__class", default)]
    pub class: String,
    #[serde(default)]
    pub level: Option<f64>,
}

/// The subset of `GET /api/v2/robot/state/` the controller cares about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RobotState {
    #[serde(default)]
    pub attributes: Vec<RobotAttribute>,
}

impl RobotState {
    pub fn from_value(value: Value) -> Result<Self, Error> {
        Ok(serde_json::from_value(value)?)
    }

    /// Battery charge in percent, taken from the battery-state attribute.
    pub fn battery_level(&self) -> Option<u8> {
        self.attributes
            .iter()
            .find(|a| a.class == BATTERY_ATTRIBUTE_CLASS)
            .and_then(|a| a.level)
            .map(|level| level.clamp(0.0, 100.0).round() as u8)
    }
}
