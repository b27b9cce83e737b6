// src/config.rs
//
// Controller settings. Layered as: built-in defaults, then a JSON file, then
// the environment (`VALETUDO_URL`, optionally from `.env`). Command-line
// overrides are applied on top by the binary.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use valepad_common::error::Error;
use valepad_common::models::modes::{
    SpeedMode, DEFAULT_BOOST_SPEED, DEFAULT_SPEED_INDEX, DEFAULT_SPEED_LEVELS,
};

pub const VALETUDO_URL_ENV: &str = "VALETUDO_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    #[serde(default = "default_valetudo_url")]
    pub valetudo_url: String,

    #[serde(default = "default_speed_levels")]
    pub speed_levels: Vec<f64>,
    #[serde(default = "default_speed_index")]
    pub default_speed_index: usize,
    #[serde(default = "default_boost_speed")]
    pub boost_speed: f64,

    #[serde(default = "default_deadzone")]
    pub deadzone: f64,
    #[serde(default = "default_angle_epsilon")]
    pub angle_epsilon: f64,
    #[serde(default = "default_velocity_epsilon")]
    pub velocity_epsilon: f64,
    #[serde(default = "default_send_interval_ms")]
    pub send_interval_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,
    #[serde(default = "default_battery_poll_secs")]
    pub battery_poll_secs: u64,
    #[serde(default = "default_display_refresh_ms")]
    pub display_refresh_ms: u64,

    /// Pause between the final stop and disabling manual control.
    #[serde(default = "default_stop_settle_ms")]
    pub stop_settle_ms: u64,
    /// Pause between disabling manual control and sending the robot home.
    #[serde(default = "default_dock_settle_ms")]
    pub dock_settle_ms: u64,
}

fn default_valetudo_url() -> String {
    "http://192.168.178.43".to_string()
}

fn default_speed_levels() -> Vec<f64> {
    DEFAULT_SPEED_LEVELS.to_vec()
}

fn default_speed_index() -> usize {
    DEFAULT_SPEED_INDEX
}

fn default_boost_speed() -> f64 {
    DEFAULT_BOOST_SPEED
}

fn default_deadzone() -> f64 {
    0.15
}

fn default_angle_epsilon() -> f64 {
    3.0
}

fn default_velocity_epsilon() -> f64 {
    0.02
}

fn default_send_interval_ms() -> u64 {
    100
}

fn default_request_timeout_ms() -> u64 {
    2000
}

fn default_tick_hz() -> u32 {
    60
}

fn default_battery_poll_secs() -> u64 {
    5
}

fn default_display_refresh_ms() -> u64 {
    200
}

fn default_stop_settle_ms() -> u64 {
    100
}

fn default_dock_settle_ms() -> u64 {
    2000
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            valetudo_url: default_valetudo_url(),
            speed_levels: default_speed_levels(),
            default_speed_index: default_speed_index(),
            boost_speed: default_boost_speed(),
            deadzone: default_deadzone(),
            angle_epsilon: default_angle_epsilon(),
            velocity_epsilon: default_velocity_epsilon(),
            send_interval_ms: default_send_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            tick_hz: default_tick_hz(),
            battery_poll_secs: default_battery_poll_secs(),
            display_refresh_ms: default_display_refresh_ms(),
            stop_settle_ms: default_stop_settle_ms(),
            dock_settle_ms: default_dock_settle_ms(),
        }
    }
}

impl ControlConfig {
    /// `<config dir>/valepad/config.json`, e.g. `~/.config/valepad/config.json`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("valepad").join("config.json"))
    }

    /// Loads defaults, then the given file (which must exist) or the default
    /// file (if it exists), then environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, Error> {
        let mut config = match explicit_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.is_file()) {
                Some(path) => Self::from_file(&path)?,
                None => {
                    debug!("No config file found; using built-in defaults.");
                    Self::default()
                }
            },
        };
        config.apply_env();
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let raw = fs::read_to_string(path)?;
        let config: ControlConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(VALETUDO_URL_ENV) {
            if !url.trim().is_empty() {
                self.valetudo_url = url.trim().to_string();
            }
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        self.base_url()?;
        if !(self.deadzone > 0.0 && self.deadzone < 1.0) {
            return Err(Error::Config(format!(
                "deadzone must be between 0 and 1 (exclusive), got {}",
                self.deadzone
            )));
        }
        if self.angle_epsilon < 0.0 || self.velocity_epsilon < 0.0 {
            return Err(Error::Config("epsilons must not be negative".into()));
        }
        if self.tick_hz == 0 {
            return Err(Error::Config("tick_hz must be positive".into()));
        }
        if self.request_timeout_ms == 0 || self.battery_poll_secs == 0 || self.display_refresh_ms == 0 {
            return Err(Error::Config("timeouts and poll intervals must be positive".into()));
        }
        self.speed_mode()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, Error> {
        let url = Url::parse(&self.valetudo_url)
            .map_err(|e| Error::Config(format!("invalid robot URL '{}': {}", self.valetudo_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "robot URL must be http or https, got '{}'",
                self.valetudo_url
            )));
        }
        Ok(url)
    }

    pub fn speed_mode(&self) -> Result<SpeedMode, Error> {
        SpeedMode::new(self.speed_levels.clone(), self.default_speed_index, self.boost_speed)
    }

    pub fn send_interval(&self) -> Duration {
        Duration::from_millis(self.send_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.tick_hz.max(1)))
    }

    pub fn battery_poll_period(&self) -> Duration {
        Duration::from_secs(self.battery_poll_secs)
    }

    pub fn display_refresh_period(&self) -> Duration {
        Duration::from_millis(self.display_refresh_ms)
    }

    pub fn stop_settle(&self) -> Duration {
        Duration::from_millis(self.stop_settle_ms)
    }

    pub fn dock_settle(&self) -> Duration {
        Duration::from_millis(self.dock_settle_ms)
    }
}
