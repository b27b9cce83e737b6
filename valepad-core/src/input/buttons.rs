// src/input/buttons.rs

use std::collections::HashMap;

use valepad_common::models::controller::{ControlButton, ControllerFrame};

/// Remembers whether each button was held on the previous tick, so that an
/// action fires once per press rather than once per tick while held.
#[derive(Debug, Default, Clone)]
pub struct ButtonLatch {
    previous: HashMap<ControlButton, bool>,
}

impl ButtonLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true exactly on the tick `button` goes from released to held.
    pub fn was_pressed(&mut self, button: ControlButton, down: bool) -> bool {
        let was_down = self.previous.insert(button, down).unwrap_or(false);
        down && !was_down
    }

    /// Runs `was_pressed` for every known button against one frame and
    /// returns the buttons that were newly pressed, in `ControlButton::ALL`
    /// order.
    pub fn rising_edges(&mut self, frame: &ControllerFrame) -> Vec<ControlButton> {
        ControlButton::ALL
            .into_iter()
            .filter(|button| self.was_pressed(*button, frame.is_down(*button)))
            .collect()
    }
}
