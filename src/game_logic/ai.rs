use crate::game_logic::{
    AI_CAPTURE_SCALE, Advance, AiBehavior, AiBrain, AiMode, Car, Checkpoint, Difficulty, Driver,
    FRICTION, RELOCATE_MAX_DISTANCE, RELOCATE_MIN_DISTANCE, STUCK_DISPLACEMENT,
    STUCK_RELOCATE_ATTEMPTS, advance_checkpoint, bearing, normalize_angle, try_capture_checkpoint,
};
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::{FRAC_PI_4, TAU};

// Steering gain relative to the car's turn rate, by distance to the target
const NEAR_DISTANCE: f32 = 50.0;
const FAR_DISTANCE: f32 = 200.0;
const NEAR_TURN_FACTOR: f32 = 1.6;
const FAR_TURN_FACTOR: f32 = 0.6;
const STEERING_JITTER: f32 = 0.01; // radians either way

// Target speed scaling
const CONSERVATIVE_SPEED: f32 = 0.8;
const APPROACH_DISTANCE: f32 = 30.0;
const APPROACH_SPEED: f32 = 0.7;
const SHARP_TURN_SPEED: f32 = 0.8;

// Per-car speed spread: base top speed by behavior plus a random variation
const AGGRESSIVE_BASE_SPEED: f32 = 4.0;
const CONSERVATIVE_BASE_SPEED: f32 = 3.0;
const TOP_SPEED_HEADROOM: f32 = 2.0;
const SPEED_VARIATION: f32 = 2.0;

/// Shared per-tick inputs for every AI car
#[derive(Clone, Copy)]
pub struct AiContext<'a> {
    pub checkpoints: &'a [Checkpoint],
    pub difficulty: Difficulty,
    pub total_laps: u32,
}

// transitions between AI driving modes
enum Transition {
    None,
    ToStuckRecovering,
    ToSeeking,
}

/// Outcome of one AI update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiStep {
    /// Heading and speed set, integrate as usual
    Drive,
    /// The car was relocated this tick and must not move further
    Recovered,
    /// Finished or not an AI car
    Parked,
}

/// Create an AI car on the grid with a randomized behavior, top speed and stuck threshold
pub fn spawn_ai_car<R: Rng + ?Sized>(position: Vec2, difficulty: Difficulty, rng: &mut R) -> Car {
    let behavior = if rng.random_bool(0.5) {
        AiBehavior::Aggressive
    } else {
        AiBehavior::Conservative
    };
    let base_speed = match behavior {
        AiBehavior::Aggressive => AGGRESSIVE_BASE_SPEED,
        AiBehavior::Conservative => CONSERVATIVE_BASE_SPEED,
    };
    let variation = rng.random_range(0.0..SPEED_VARIATION);
    let base_max_speed = base_speed + TOP_SPEED_HEADROOM + variation;
    let max_speed = base_max_speed.min(difficulty.ai_max_speed());
    let stuck_threshold = rng.random_range(difficulty.stuck_threshold_range());

    debug!(
        "Spawned {} AI car, top speed {:.2} (ceiling {:.2})",
        behavior.as_str(),
        base_max_speed,
        max_speed
    );
    let brain = AiBrain::new(behavior, base_max_speed, stuck_threshold, position);
    Car::ai(position, brain, max_speed, (base_speed + variation).min(max_speed))
}

/// Re-apply the difficulty ceiling on top of the car's own top speed
pub fn apply_difficulty(car: &mut Car, difficulty: Difficulty) {
    if let Driver::Ai(brain) = &car.driver {
        car.max_speed = brain.base_max_speed.min(difficulty.ai_max_speed());
    }
}

/// Run one tick of the AI state machine: stuck detection, then steering and speed.
/// Position integration is left to the physics step.
pub fn update_ai_car<R: Rng + ?Sized>(car: &mut Car, ctx: &AiContext, rng: &mut R) -> AiStep {
    if car.progress.finished {
        car.speed = 0.0;
        return AiStep::Parked;
    }
    // take the brain out while the car body is being mutated
    let Driver::Ai(mut brain) = std::mem::replace(&mut car.driver, Driver::Player) else {
        return AiStep::Parked;
    };

    let step = drive(car, &mut brain, ctx, rng);
    car.driver = Driver::Ai(brain);
    step
}

fn drive<R: Rng + ?Sized>(
    car: &mut Car,
    brain: &mut AiBrain,
    ctx: &AiContext,
    rng: &mut R,
) -> AiStep {
    let count = ctx.checkpoints.len();
    if count == 0 {
        car.speed *= FRICTION;
        return AiStep::Drive;
    }
    if car.progress.checkpoint >= count {
        warn!(
            "AI car checkpoint {} not found, resetting to 0",
            car.progress.checkpoint
        );
        car.progress.checkpoint = 0;
    }

    let mut transition = match brain.mode {
        AiMode::Seeking => seek(car, brain, ctx, rng),
        AiMode::StuckRecovering => Transition::ToStuckRecovering,
    };

    let mut step = AiStep::Drive;
    loop {
        match transition {
            Transition::None => return step,
            Transition::ToStuckRecovering => {
                brain.mode = AiMode::StuckRecovering;
                transition = handle_stuck_ai(car, brain, ctx, rng);
                step = AiStep::Recovered;
            }
            Transition::ToSeeking => {
                brain.mode = AiMode::Seeking;
                transition = Transition::None;
            }
        }
    }
}

fn seek<R: Rng + ?Sized>(
    car: &mut Car,
    brain: &mut AiBrain,
    ctx: &AiContext,
    rng: &mut R,
) -> Transition {
    let moved = car.position.distance(brain.last_position);
    if moved < STUCK_DISPLACEMENT {
        brain.stationary_ticks += 1;
        if brain.stationary_ticks % 30 == 0 {
            debug!(
                "AI car stuck for {} ticks, movement: {:.2}",
                brain.stationary_ticks, moved
            );
        }
    } else {
        brain.stationary_ticks = 0;
        brain.last_position = car.position;
    }
    if brain.stationary_ticks > brain.stuck_threshold {
        return Transition::ToStuckRecovering;
    }

    let target = ctx.checkpoints[car.progress.target(ctx.checkpoints.len())].center();
    let distance = car.position.distance(target);
    let angle_diff = normalize_angle(bearing(car.position, target) - car.angle);

    // steer harder close in, gentler on long straights
    let distance_factor = if distance < NEAR_DISTANCE {
        NEAR_TURN_FACTOR
    } else if distance > FAR_DISTANCE {
        FAR_TURN_FACTOR
    } else {
        1.0
    };
    let gain = car.turn_rate * distance_factor * ctx.difficulty.turn_fraction();
    let jitter = rng.random_range(-STEERING_JITTER..=STEERING_JITTER);
    car.angle = normalize_angle(car.angle + (angle_diff + jitter) * gain);

    let mut target_speed = car.max_speed;
    if brain.behavior == AiBehavior::Conservative {
        target_speed *= CONSERVATIVE_SPEED;
    }
    if distance < APPROACH_DISTANCE {
        target_speed *= APPROACH_SPEED;
    } else if angle_diff.abs() > FRAC_PI_4 {
        target_speed *= SHARP_TURN_SPEED;
    }

    car.speed = if car.speed < target_speed {
        (car.speed + car.acceleration).min(target_speed)
    } else {
        (car.speed - car.deceleration).max(target_speed)
    };

    Transition::None
}

/// First two attempts drop the car near its target; after that the target is credited
/// and the car placed on it.
fn handle_stuck_ai<R: Rng + ?Sized>(
    car: &mut Car,
    brain: &mut AiBrain,
    ctx: &AiContext,
    rng: &mut R,
) -> Transition {
    let count = ctx.checkpoints.len();
    brain.stuck_attempts += 1;
    info!(
        "AI car stuck, attempting recovery (attempt {})",
        brain.stuck_attempts
    );

    if brain.stuck_attempts <= STUCK_RELOCATE_ATTEMPTS {
        let target = ctx.checkpoints[car.progress.target(count)].center();
        let angle = rng.random_range(0.0..TAU);
        let distance = rng.random_range(RELOCATE_MIN_DISTANCE..=RELOCATE_MAX_DISTANCE);
        car.position = target + Vec2::new(angle.cos(), angle.sin()) * distance;
        brain.stationary_ticks = 0;
        brain.last_position = car.position;
        info!(
            "Moving AI car to ({:.1}, {:.1})",
            car.position.x, car.position.y
        );
        return Transition::ToSeeking;
    }

    let advance = advance_checkpoint(car, count, ctx.total_laps);
    car.position = ctx.checkpoints[car.progress.checkpoint].center();
    if advance == Advance::Finished {
        car.speed = 0.0;
    }
    brain.reset_stuck(car.position);
    info!(
        "AI car force advanced to checkpoint {}",
        car.progress.checkpoint
    );
    Transition::ToSeeking
}

/// AI capture test with the enlarged radius; reaching a checkpoint clears stuck bookkeeping
pub fn capture_ai_checkpoint(car: &mut Car, ctx: &AiContext) -> Option<Advance> {
    let advance = try_capture_checkpoint(car, ctx.checkpoints, AI_CAPTURE_SCALE, ctx.total_laps)?;
    let position = car.position;
    if let Driver::Ai(brain) = &mut car.driver {
        brain.reset_stuck(position);
    }
    if advance == Advance::Finished {
        car.speed = 0.0;
    }
    Some(advance)
}
