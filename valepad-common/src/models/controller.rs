// File: valepad-common/src/models/controller.rs

use std::collections::HashSet;
use std::fmt;

use crate::models::motion::StickSample;

/// Buttons the control loop reacts to. Names follow the PlayStation layout
/// the controller was mapped against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlButton {
    /// Toggle the fan between off and max.
    Cross,
    /// Cycle through the speed presets.
    Circle,
    /// Play the robot's test sound.
    Square,
    /// Send the robot home and quit.
    Triangle,
    /// Toggle boost.
    R1,
    /// Quit without docking.
    Options,
}

impl ControlButton {
    pub const ALL: [ControlButton; 6] = [
        ControlButton::Cross,
        ControlButton::Circle,
        ControlButton::Square,
        ControlButton::Triangle,
        ControlButton::R1,
        ControlButton::Options,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ControlButton::Cross => "X",
            ControlButton::Circle => "Circle",
            ControlButton::Square => "Square",
            ControlButton::Triangle => "Triangle",
            ControlButton::R1 => "R1",
            ControlButton::Options => "Options",
        }
    }
}

impl fmt::Display for ControlButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything read from the gamepad in one poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerFrame {
    pub stick: StickSample,
    pub pressed: HashSet<ControlButton>,
    /// Controller charge in percent, if the device reports one.
    pub battery: Option<u8>,
}

impl ControllerFrame {
    pub fn new(stick: StickSample) -> Self {
        Self {
            stick,
            ..Default::default()
        }
    }

    pub fn with_pressed(mut self, button: ControlButton) -> Self {
        self.pressed.insert(button);
        self
    }

    pub fn is_down(&self, button: ControlButton) -> bool {
        self.pressed.contains(&button)
    }
}
