//! Board settings
//!
//! Everything a session needs that is not game state: which mode to play,
//! which side the engine takes, how hard it searches, and where the engine
//! and the emulator live. The controller never sees this type; the host
//! converts it into a [`GameMode`] and [`EngineSettings`].

use crate::core::error::{CoreError, CoreResult};
use crate::game::ai::{EngineDifficulty, EngineSettings, DEFAULT_ENGINE_ENDPOINT};
use crate::game::controller::GameMode;
use crate::game::types::Color;
use crate::networking::DEFAULT_EMULATOR_ADDR;
use serde::{Deserialize, Serialize};
use url::Url;

/// Mode choice as stored in the settings file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModeSetting {
    /// Two players at the board
    #[default]
    Local,
    /// Play against the engine
    Assisted,
    /// Light every square whose sensor reads a piece; no game is tracked
    #[serde(rename = "sensor-test")]
    SensorTest,
}

/// Persisted session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub mode: ModeSetting,

    /// Side the engine plays in assisted mode
    pub engine_color: Color,

    pub difficulty: EngineDifficulty,

    /// Engine service URL
    pub engine_endpoint: String,

    /// Emulator `host:port`
    pub emulator_addr: String,

    /// Delay between sensor polls
    pub poll_interval_ms: u64,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            mode: ModeSetting::Local,
            engine_color: Color::Black,
            difficulty: EngineDifficulty::Medium,
            engine_endpoint: DEFAULT_ENGINE_ENDPOINT.to_string(),
            emulator_addr: DEFAULT_EMULATOR_ADDR.to_string(),
            poll_interval_ms: 50,
        }
    }
}

impl BoardSettings {
    /// Game mode for the controller; the sensor test tracks no game and
    /// falls back to [`GameMode::Local`]
    pub fn game_mode(&self) -> GameMode {
        match self.mode {
            ModeSetting::Local | ModeSetting::SensorTest => GameMode::Local,
            ModeSetting::Assisted => GameMode::Assisted {
                engine_color: self.engine_color,
            },
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings::from(self.difficulty)
    }

    /// Reject values the session cannot run with
    pub fn validate(&self) -> CoreResult<()> {
        if self.poll_interval_ms == 0 || self.poll_interval_ms > 1_000 {
            return Err(CoreError::InvalidSetting {
                name: "poll_interval_ms",
                message: format!("{} is outside 1..=1000", self.poll_interval_ms),
            });
        }
        if let Err(e) = Url::parse(&self.engine_endpoint) {
            return Err(CoreError::InvalidSetting {
                name: "engine_endpoint",
                message: e.to_string(),
            });
        }
        if self.emulator_addr.trim().is_empty() {
            return Err(CoreError::InvalidSetting {
                name: "emulator_addr",
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
