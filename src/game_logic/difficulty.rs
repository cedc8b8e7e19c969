// src/game_logic/difficulty.rs
use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Hard => "Hard",
        }
    }

    /// AI top speed ceiling in km/h
    pub fn ai_max_speed_kmh(&self) -> f32 {
        match self {
            Difficulty::Easy => 10.0,
            Difficulty::Hard => 15.0,
        }
    }

    /// AI top speed ceiling in pixels per tick
    pub fn ai_max_speed(&self) -> f32 {
        self.ai_max_speed_kmh() / 3.6
    }

    /// Fraction of a car's base turn rate the AI steers with
    pub fn turn_fraction(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Hard => 1.0,
        }
    }

    /// Stationary ticks tolerated before stuck recovery kicks in
    pub fn stuck_threshold_range(&self) -> RangeInclusive<u32> {
        match self {
            Difficulty::Easy => 600..=900,
            Difficulty::Hard => 120..=180,
        }
    }
}
