// src/input/gamepad.rs
//
// gilrs-backed controller. gilrs already reports the left stick with "up"
// as positive Y, so no sign flip is needed here.

use gilrs::{Axis, Button, EventType, GamepadId, Gilrs, PowerInfo};
use tracing::{info, warn};

use valepad_common::error::Error;
use valepad_common::models::controller::{ControlButton, ControllerFrame};
use valepad_common::models::motion::StickSample;
use valepad_common::traits::InputDevice;

pub struct GilrsInput {
    gilrs: Gilrs,
    id: GamepadId,
    name: String,
}

impl GilrsInput {
    /// Opens the first connected gamepad.
    pub fn open() -> Result<Self, Error> {
        let mut gilrs = Gilrs::new()
            .map_err(|e| Error::NoInputDevice(format!("gamepad backend unavailable: {e}")))?;
        while gilrs.next_event().is_some() {}

        let (id, name) = gilrs
            .gamepads()
            .find(|(_, gp)| gp.is_connected())
            .map(|(id, gp)| (id, gp.name().to_string()))
            .ok_or_else(|| Error::NoInputDevice("no joystick connected".into()))?;

        info!("Using controller '{}' ({:?})", name, id);
        Ok(Self { gilrs, id, name })
    }
}

fn gilrs_button(button: ControlButton) -> Button {
    match button {
        ControlButton::Cross => Button::South,
        ControlButton::Circle => Button::East,
        ControlButton::Square => Button::West,
        ControlButton::Triangle => Button::North,
        ControlButton::R1 => Button::RightTrigger,
        ControlButton::Options => Button::Start,
    }
}

fn battery_percent(power: PowerInfo) -> Option<u8> {
    match power {
        PowerInfo::Discharging(level) | PowerInfo::Charging(level) => Some(level),
        PowerInfo::Charged => Some(100),
        PowerInfo::Wired | PowerInfo::Unknown => None,
    }
}

impl InputDevice for GilrsInput {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn poll(&mut self) -> Result<ControllerFrame, Error> {
        while let Some(event) = self.gilrs.next_event() {
            if event.id == self.id && event.event == EventType::Disconnected {
                warn!("Controller '{}' disconnected", self.name);
                return Err(Error::Input(format!("controller '{}' disconnected", self.name)));
            }
        }

        let gamepad = self
            .gilrs
            .connected_gamepad(self.id)
            .ok_or_else(|| Error::Input(format!("controller '{}' is no longer connected", self.name)))?;

        let stick = StickSample::new(
            f64::from(gamepad.value(Axis::LeftStickX)),
            f64::from(gamepad.value(Axis::LeftStickY)),
        );
        let mut frame = ControllerFrame::new(stick);
        frame.battery = battery_percent(gamepad.power_info());
        for button in ControlButton::ALL {
            if gamepad.is_pressed(gilrs_button(button)) {
                frame.pressed.insert(button);
            }
        }
        Ok(frame)
    }
}
