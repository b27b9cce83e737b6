// File: valepad-common/src/models/modes.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_SPEED_LEVELS: [f64; 3] = [0.1, 0.6, 1.0];
pub const DEFAULT_SPEED_INDEX: usize = 1;
pub const DEFAULT_BOOST_SPEED: f64 = 1.0;

/// Active maximum-speed multiplier.
///
/// The ordinary presets are cycled with one button; boost is a separate
/// toggle that overrides the preset while it is on.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedMode {
    levels: Vec<f64>,
    index: usize,
    boost: bool,
    boost_speed: f64,
}

impl SpeedMode {
    pub fn new(levels: Vec<f64>, default_index: usize, boost_speed: f64) -> Result<Self, Error> {
        if levels.is_empty() {
            return Err(Error::Config("at least one speed level is required".into()));
        }
        if let Some(bad) = levels.iter().find(|l| !(**l > 0.0 && **l <= 1.0)) {
            return Err(Error::Config(format!("speed level {bad} is outside (0, 1]")));
        }
        if !(boost_speed > 0.0 && boost_speed <= 1.0) {
            return Err(Error::Config(format!("boost speed {boost_speed} is outside (0, 1]")));
        }
        let index = default_index.min(levels.len() - 1);
        Ok(Self {
            levels,
            index,
            boost: false,
            boost_speed,
        })
    }

    /// Advances to the next preset, wrapping around. Returns the new level.
    pub fn cycle(&mut self) -> f64 {
        self.index = (self.index + 1) % self.levels.len();
        self.level()
    }

    /// Flips boost on or off. Returns whether boost is now on.
    pub fn toggle_boost(&mut self) -> bool {
        self.boost = !self.boost;
        self.boost
    }

    pub fn max_speed(&self) -> f64 {
        if self.boost {
            self.boost_speed
        } else {
            self.level()
        }
    }

    pub fn level(&self) -> f64 {
        self.levels[self.index]
    }

    pub fn is_boosted(&self) -> bool {
        self.boost
    }
}

impl Default for SpeedMode {
    fn default() -> Self {
        Self {
            levels: DEFAULT_SPEED_LEVELS.to_vec(),
            index: DEFAULT_SPEED_INDEX,
            boost: false,
            boost_speed: DEFAULT_BOOST_SPEED,
        }
    }
}

/// Fan preset as understood by the fan-speed capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanMode {
    #[default]
    Off,
    Max,
}

impl FanMode {
    pub fn toggled(self) -> Self {
        match self {
            FanMode::Off => FanMode::Max,
            FanMode::Max => FanMode::Off,
        }
    }

    pub fn preset_name(&self) -> &'static str {
        match self {
            FanMode::Off => "off",
            FanMode::Max => "max",
        }
    }
}

impl fmt::Display for FanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.preset_name())
    }
}
