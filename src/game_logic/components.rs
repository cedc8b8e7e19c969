use crate::game_logic::{
    AI_ACCELERATION, AI_DECELERATION, AI_TURN_RATE, BOOST_DRAIN, BOOST_RECHARGE, CAR_HEIGHT,
    CAR_WIDTH, MAX_BOOST, PLAYER_ACCELERATION, PLAYER_DECELERATION, PLAYER_MAX_SPEED,
    PLAYER_TURN_RATE,
};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Normalized controls for one tick, whatever device produced them
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub accelerate: bool,
    pub brake: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub boost: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiBehavior {
    Aggressive,
    Conservative,
}

impl AiBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiBehavior::Aggressive => "aggressive",
            AiBehavior::Conservative => "conservative",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AiMode {
    #[default]
    Seeking,
    StuckRecovering,
}

/// Per-car AI bookkeeping
#[derive(Clone, Debug, PartialEq)]
pub struct AiBrain {
    pub behavior: AiBehavior,
    pub mode: AiMode,
    /// Top speed before the difficulty ceiling is applied
    pub base_max_speed: f32,
    pub last_position: Vec2,
    pub stationary_ticks: u32,
    pub stuck_attempts: u32,
    pub stuck_threshold: u32,
}

impl AiBrain {
    pub fn new(behavior: AiBehavior, base_max_speed: f32, stuck_threshold: u32, position: Vec2) -> Self {
        Self {
            behavior,
            mode: AiMode::Seeking,
            base_max_speed,
            last_position: position,
            stationary_ticks: 0,
            stuck_attempts: 0,
            stuck_threshold,
        }
    }

    pub fn reset_stuck(&mut self, position: Vec2) {
        self.last_position = position;
        self.stationary_ticks = 0;
        self.stuck_attempts = 0;
        self.mode = AiMode::Seeking;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Driver {
    Player,
    Ai(AiBrain),
}

/// Checkpoint and lap standing of a single car
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RaceProgress {
    /// Last checkpoint reached; 0 is the start line
    pub checkpoint: usize,
    pub lap: u32,
    pub finished: bool,
    /// 1 for the first car across the line, set once the car finishes
    pub finish_order: Option<u32>,
}

impl Default for RaceProgress {
    fn default() -> Self {
        Self {
            checkpoint: 0,
            lap: 1,
            finished: false,
            finish_order: None,
        }
    }
}

impl RaceProgress {
    /// Index of the checkpoint this car is heading for
    pub fn target(&self, checkpoint_count: usize) -> usize {
        if checkpoint_count == 0 {
            0
        } else {
            (self.checkpoint + 1) % checkpoint_count
        }
    }
}

/// Every car in the race, player or AI. All fields are always present.
#[derive(Clone, Debug, PartialEq)]
pub struct Car {
    pub position: Vec2,
    /// Radians, clockwise from north
    pub angle: f32,
    pub speed: f32,
    pub width: f32,
    pub height: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub turn_rate: f32,
    pub boost: f32,
    pub max_boost: f32,
    pub boost_drain: f32,
    pub boost_recharge: f32,
    pub controls: ControlState,
    pub progress: RaceProgress,
    /// Seconds spent off the track since last being on it
    pub off_track_time: f32,
    pub driver: Driver,
}

impl Car {
    pub fn player(position: Vec2) -> Self {
        Self {
            position,
            angle: 0.0,
            speed: 0.0,
            width: CAR_WIDTH,
            height: CAR_HEIGHT,
            max_speed: PLAYER_MAX_SPEED,
            acceleration: PLAYER_ACCELERATION,
            deceleration: PLAYER_DECELERATION,
            turn_rate: PLAYER_TURN_RATE,
            boost: MAX_BOOST,
            max_boost: MAX_BOOST,
            boost_drain: BOOST_DRAIN,
            boost_recharge: BOOST_RECHARGE,
            controls: ControlState::default(),
            progress: RaceProgress::default(),
            off_track_time: 0.0,
            driver: Driver::Player,
        }
    }

    pub fn ai(position: Vec2, brain: AiBrain, max_speed: f32, speed: f32) -> Self {
        Self {
            speed,
            max_speed,
            acceleration: AI_ACCELERATION,
            deceleration: AI_DECELERATION,
            turn_rate: AI_TURN_RATE,
            driver: Driver::Ai(brain),
            ..Self::player(position)
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.driver, Driver::Player)
    }

    pub fn brain(&self) -> Option<&AiBrain> {
        match &self.driver {
            Driver::Ai(brain) => Some(brain),
            Driver::Player => None,
        }
    }

    /// Four axis-aligned bounding-box corners
    pub fn corners(&self) -> [Vec2; 4] {
        let half = Vec2::new(self.width / 2.0, self.height / 2.0);
        [
            self.position + Vec2::new(-half.x, -half.y),
            self.position + Vec2::new(half.x, -half.y),
            self.position + Vec2::new(-half.x, half.y),
            self.position + Vec2::new(half.x, half.y),
        ]
    }

    /// Unit vector the car drives along (screen y points down)
    pub fn forward_vector(&self) -> Vec2 {
        Vec2::new(self.angle.sin(), -self.angle.cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_defaults() {
        let car = Car::player(Vec2::new(10.0, 20.0));
        assert!(car.is_player());
        assert!(car.brain().is_none());
        assert_eq!(car.progress.lap, 1);
        assert_eq!(car.progress.checkpoint, 0);
        assert_eq!(car.boost, car.max_boost);
    }

    #[test]
    fn test_ai_car_keeps_body_dimensions() {
        let brain = AiBrain::new(AiBehavior::Conservative, 5.0, 150, Vec2::ZERO);
        let car = Car::ai(Vec2::ZERO, brain, 4.0, 3.0);
        assert!(!car.is_player());
        assert_eq!(car.width, CAR_WIDTH);
        assert_eq!(car.max_speed, 4.0);
        assert_eq!(car.brain().map(|b| b.stuck_threshold), Some(150));
    }

    #[test]
    fn test_target_wraps() {
        let progress = RaceProgress {
            checkpoint: 5,
            ..Default::default()
        };
        assert_eq!(progress.target(6), 0);
        assert_eq!(progress.target(0), 0);
        assert_eq!(RaceProgress::default().target(6), 1);
    }

    #[test]
    fn test_corners_surround_position() {
        let car = Car::player(Vec2::new(100.0, 100.0));
        let corners = car.corners();
        assert_eq!(corners[0], Vec2::new(85.0, 75.0));
        assert_eq!(corners[3], Vec2::new(115.0, 125.0));
    }
}
