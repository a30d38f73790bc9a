//! Engine strength and request settings
//!
//! Configures how hard the external engine searches and how long the board
//! is willing to wait for it.
//!
//! # Difficulty Levels
//!
//! Strength is controlled by search depth; the timeout grows with it so a
//! deep search is not cut off by the transport:
//!
//! | Difficulty | Depth | Timeout |
//! |------------|-------|---------|
//! | Easy       | 6     | 15 s    |
//! | Medium     | 10    | 25 s    |
//! | Hard       | 14    | 45 s    |
//! | Expert     | 16    | 60 s    |
//!
//! # Integration
//!
//! The host loop builds the settings once from the persisted configuration:
//!
//! ```rust,ignore
//! let settings = EngineSettings::from(EngineDifficulty::Hard);
//! let spec = controller.request_engine_move(&engine, &settings)?;
//! ```
//!
//! Retries are counted by the caller; see [`EngineSettings::max_retries`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Per-request engine parameters
///
/// # Fields
///
/// - `depth`: Search depth passed to the engine
/// - `timeout_ms`: Upper bound on one request, transport included
/// - `max_retries`: Consecutive failed requests tolerated before the host
///   gives up on the current engine turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub depth: u8,
    pub timeout_ms: u64,
    pub max_retries: u32,
}

impl Default for EngineSettings {
    /// Depth 12, 30 second timeout, 3 retries
    fn default() -> Self {
        Self {
            depth: 12,
            timeout_ms: 30_000,
            max_retries: 3,
        }
    }
}

impl EngineSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl From<EngineDifficulty> for EngineSettings {
    fn from(difficulty: EngineDifficulty) -> Self {
        Self {
            depth: difficulty.depth(),
            timeout_ms: difficulty.timeout_ms(),
            ..Self::default()
        }
    }
}

/// Engine difficulty presets
///
/// Serialized in lowercase so the settings file reads `"difficulty": "hard"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineDifficulty {
    /// Depth 6, 15 second timeout
    ///
    /// Misses most tactics beyond a couple of moves. Good for new players
    /// and for exercising the board quickly.
    Easy,

    /// Depth 10, 25 second timeout
    #[default]
    Medium,

    /// Depth 14, 45 second timeout
    Hard,

    /// Depth 16, 60 second timeout
    ///
    /// Close to the service's practical limit; expect long waits.
    Expert,
}

impl EngineDifficulty {
    pub const ALL: [EngineDifficulty; 4] = [
        EngineDifficulty::Easy,
        EngineDifficulty::Medium,
        EngineDifficulty::Hard,
        EngineDifficulty::Expert,
    ];

    /// Search depth for this preset
    pub fn depth(self) -> u8 {
        match self {
            EngineDifficulty::Easy => 6,
            EngineDifficulty::Medium => 10,
            EngineDifficulty::Hard => 14,
            EngineDifficulty::Expert => 16,
        }
    }

    /// Request timeout for this preset, in milliseconds
    pub fn timeout_ms(self) -> u64 {
        match self {
            EngineDifficulty::Easy => 15_000,
            EngineDifficulty::Medium => 25_000,
            EngineDifficulty::Hard => 45_000,
            EngineDifficulty::Expert => 60_000,
        }
    }
}

impl fmt::Display for EngineDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineDifficulty::Easy => "easy",
            EngineDifficulty::Medium => "medium",
            EngineDifficulty::Hard => "hard",
            EngineDifficulty::Expert => "expert",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for EngineDifficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(EngineDifficulty::Easy),
            "medium" => Ok(EngineDifficulty::Medium),
            "hard" => Ok(EngineDifficulty::Hard),
            "expert" => Ok(EngineDifficulty::Expert),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_settings_default() {
        //! Verifies the default request parameters
        let settings = EngineSettings::default();
        assert_eq!(settings.depth, 12);
        assert_eq!(settings.timeout_ms, 30_000);
        assert_eq!(settings.max_retries, 3);
    }

    #[test]
    fn test_difficulty_presets() {
        //! Verifies each preset's depth and timeout
        let expected = [(6, 15_000), (10, 25_000), (14, 45_000), (16, 60_000)];
        for (difficulty, (depth, timeout)) in EngineDifficulty::ALL.iter().zip(expected) {
            let settings = EngineSettings::from(*difficulty);
            assert_eq!(settings.depth, depth, "depth for {difficulty}");
            assert_eq!(settings.timeout_ms, timeout, "timeout for {difficulty}");
            assert_eq!(settings.max_retries, 3, "retries keep the default");
        }
    }

    #[test]
    fn test_depth_increases_with_difficulty() {
        //! Verifies harder difficulties search deeper and wait longer
        for pair in EngineDifficulty::ALL.windows(2) {
            assert!(pair[0].depth() < pair[1].depth());
            assert!(pair[0].timeout_ms() < pair[1].timeout_ms());
        }
    }

    #[test]
    fn test_difficulty_parse_and_display() {
        //! Tests the CLI/settings spelling of difficulties
        for difficulty in EngineDifficulty::ALL {
            let parsed: EngineDifficulty = difficulty.to_string().parse().unwrap();
            assert_eq!(parsed, difficulty);
        }
        assert_eq!("HARD".parse::<EngineDifficulty>(), Ok(EngineDifficulty::Hard));
        assert!("grandmaster".parse::<EngineDifficulty>().is_err());
    }

    #[test]
    fn test_settings_json_fills_missing_fields() {
        //! A partial settings object keeps defaults for absent fields
        let settings: EngineSettings = serde_json::from_str(r#"{"depth":8}"#).unwrap();
        assert_eq!(settings.depth, 8);
        assert_eq!(settings.timeout_ms, 30_000);
        assert_eq!(settings.max_retries, 3);
    }
}
