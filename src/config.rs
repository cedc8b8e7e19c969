use crate::game_logic::Difficulty;
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("a race needs at least one lap")]
    ZeroLaps,
    #[error("a race needs at least one car")]
    ZeroCars,
    #[error("invalid race config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Run-time race options. Missing JSON fields take their defaults.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    pub total_laps: u32,
    /// Player included
    pub total_cars: u32,
    pub difficulty: Difficulty,
    /// Seed for every random decision the AI makes
    pub seed: u64,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            total_laps: 3,
            total_cars: 4,
            difficulty: Difficulty::Easy,
            seed: 0,
        }
    }
}

impl RaceConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_laps == 0 {
            return Err(ConfigError::ZeroLaps);
        }
        if self.total_cars == 0 {
            return Err(ConfigError::ZeroCars);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RaceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.total_laps, 3);
        assert_eq!(config.total_cars, 4);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = RaceConfig::from_json_str(r#"{"difficulty": "hard", "seed": 7}"#).unwrap();
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.seed, 7);
        assert_eq!(config.total_laps, 3);
    }

    #[test]
    fn test_rejects_zero_laps_and_cars() {
        assert!(matches!(
            RaceConfig::from_json_str(r#"{"total_laps": 0}"#),
            Err(ConfigError::ZeroLaps)
        ));
        let config = RaceConfig {
            total_cars: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroCars)));
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            RaceConfig::from_json_str(r#"{"difficulty": "insane"}"#),
            Err(ConfigError::Json(_))
        ));
    }
}
