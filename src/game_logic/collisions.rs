use crate::game_logic::{
    COLLISION_SPEED_PENALTY, Car, OFF_TRACK_TIMEOUT, PUSH_DISTANCE, TICK_SECONDS, Track,
};
use bevy::prelude::*;

// Tolerance for accumulating 1/60 s steps up to the timeout
const TIMEOUT_EPSILON: f32 = 1e-4;

// Push-back trial order: axes first, then diagonals
const PUSH_OFFSETS: [Vec2; 8] = [
    Vec2::new(-PUSH_DISTANCE, 0.0),
    Vec2::new(PUSH_DISTANCE, 0.0),
    Vec2::new(0.0, -PUSH_DISTANCE),
    Vec2::new(0.0, PUSH_DISTANCE),
    Vec2::new(-PUSH_DISTANCE, -PUSH_DISTANCE),
    Vec2::new(PUSH_DISTANCE, -PUSH_DISTANCE),
    Vec2::new(-PUSH_DISTANCE, PUSH_DISTANCE),
    Vec2::new(PUSH_DISTANCE, PUSH_DISTANCE),
];

/// A car is on the track only if all four bounding-box corners are
pub fn is_car_on_track(car: &Car, track: &Track) -> bool {
    car.corners().iter().all(|&c| track.is_point_on_track(c))
}

/// Nudge an off-track car back onto the track and apply the collision penalty.
/// Returns true if the car started the check off the track.
pub fn keep_car_on_track(car: &mut Car, track: &Track) -> bool {
    if is_car_on_track(car, track) {
        return false;
    }

    let original = car.position;
    let mut recovered = false;
    for offset in PUSH_OFFSETS {
        car.position = original + offset;
        if is_car_on_track(car, track) {
            recovered = true;
            break;
        }
    }
    if !recovered {
        car.position = original;
    }

    car.speed *= COLLISION_SPEED_PENALTY;
    true
}

/// Track off-track time and send the car back to the checkpoint behind its target
/// (the last one it reached) once it runs out. Returns true when the car was reset.
pub fn apply_off_track_timeout(car: &mut Car, track: &Track) -> bool {
    if is_car_on_track(car, track) {
        car.off_track_time = 0.0;
        return false;
    }

    car.off_track_time += TICK_SECONDS;
    if car.off_track_time + TIMEOUT_EPSILON < OFF_TRACK_TIMEOUT {
        return false;
    }

    let index = car.progress.checkpoint;
    if let Some(checkpoint) = track.checkpoints().get(index) {
        car.position = checkpoint.center();
        info!(
            "Car returned to checkpoint {} after {:.0}ms off track",
            index,
            OFF_TRACK_TIMEOUT * 1000.0
        );
    }
    car.speed = 0.0;
    car.off_track_time = 0.0;
    true
}

/// Seconds left before an off-track reset (HUD countdown)
pub fn off_track_time_left(car: &Car) -> f32 {
    (OFF_TRACK_TIMEOUT - car.off_track_time).max(0.0)
}
