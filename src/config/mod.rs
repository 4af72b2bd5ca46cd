pub mod loader;

use serde::{Deserialize, Serialize};

use crate::components::SpawnPolicy;
use crate::game::{
    FALL_DELAY, FIELD_HEIGHT, FIELD_WIDTH, FRAMES_PER_SECOND, MIN_FIELD_HEIGHT, MIN_FIELD_WIDTH,
};
use loader::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub field: FieldConfig,
    pub timing: TimingConfig,
    pub spawn: SpawnConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            field: FieldConfig::default(),
            timing: TimingConfig::default(),
            spawn: SpawnConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub width: usize,
    pub height: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub frames_per_second: u32,
    // Gravity steps per second; the piece falls faster as this grows
    pub fall_delay: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frames_per_second: FRAMES_PER_SECOND,
            fall_delay: FALL_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub policy: SpawnPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Config {
    /// Rejects settings the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.field.width < MIN_FIELD_WIDTH || self.field.height < MIN_FIELD_HEIGHT {
            return Err(ConfigError::Invalid(format!(
                "field must be at least {MIN_FIELD_WIDTH}x{MIN_FIELD_HEIGHT}, got {}x{}",
                self.field.width, self.field.height
            )));
        }

        if self.timing.fall_delay == 0 {
            return Err(ConfigError::Invalid(
                "fall_delay must be at least 1".to_string(),
            ));
        }

        if self.timing.frames_per_second < self.timing.fall_delay {
            return Err(ConfigError::Invalid(format!(
                "frames_per_second ({}) must not be lower than fall_delay ({})",
                self.timing.frames_per_second, self.timing.fall_delay
            )));
        }

        Ok(())
    }
}
