// Simulation timing
pub const TICK_RATE: f64 = 60.0; // display-refresh reference rate
pub const TICK_SECONDS: f32 = 1.0 / 60.0;

// Player physics constants (per tick, radians)
pub const PLAYER_MAX_SPEED: f32 = 8.0;
pub const PLAYER_ACCELERATION: f32 = 0.2;
pub const PLAYER_DECELERATION: f32 = 0.1;
pub const PLAYER_TURN_RATE: f32 = 0.05;
pub const FRICTION: f32 = 0.95;

// Boost
pub const MAX_BOOST: f32 = 100.0;
pub const BOOST_SPEED_BONUS: f32 = 0.5;
pub const BOOST_SPEED_CAP: f32 = 1.5; // multiple of max speed
pub const BOOST_DRAIN: f32 = 1.0;
pub const BOOST_RECHARGE: f32 = 0.5;

// AI longitudinal response
pub const AI_ACCELERATION: f32 = 0.1;
pub const AI_DECELERATION: f32 = 0.05;
pub const AI_TURN_RATE: f32 = 0.05;

// Car body
pub const CAR_WIDTH: f32 = 30.0;
pub const CAR_HEIGHT: f32 = 50.0;
pub const GRID_SPACING: f32 = 20.0;

// Collisions
pub const PUSH_DISTANCE: f32 = 2.0;
pub const COLLISION_SPEED_PENALTY: f32 = 0.8;
pub const OFF_TRACK_TIMEOUT: f32 = 0.5; // seconds

// Checkpoints
pub const PLAYER_CAPTURE_SCALE: f32 = 1.0;
pub const AI_CAPTURE_SCALE: f32 = 1.5;
pub const DEFAULT_CHECKPOINT_RADIUS: f32 = 30.0;
pub const GENERATED_CHECKPOINTS: usize = 6;

// Stuck detection
pub const STUCK_DISPLACEMENT: f32 = 2.0;
pub const STUCK_RELOCATE_ATTEMPTS: u32 = 2;
pub const RELOCATE_MIN_DISTANCE: f32 = 30.0;
pub const RELOCATE_MAX_DISTANCE: f32 = 80.0;

// Track
pub const DEFAULT_TRACK_WIDTH: f32 = 40.0;
pub const DEFAULT_TRACK_COLOR: &str = "#0066cc";
pub const CURVE_SEGMENTS: usize = 10;

// HUD
pub const SPEED_TO_KMH: f32 = 10.0;
