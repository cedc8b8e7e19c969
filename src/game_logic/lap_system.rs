use crate::game_logic::{Car, Checkpoint, SPEED_TO_KMH, off_track_time_left};
use bevy::prelude::*;
use std::cmp::Reverse;

/// What happened when a car moved on to its next checkpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Checkpoint(usize),
    Lap(u32),
    Finished,
}

/// Credit the car's target checkpoint. Wrapping to 0 completes a lap; going past the
/// configured lap count finishes the car.
pub fn advance_checkpoint(car: &mut Car, checkpoint_count: usize, total_laps: u32) -> Advance {
    if checkpoint_count == 0 {
        return Advance::Checkpoint(0);
    }

    let progress = &mut car.progress;
    progress.checkpoint = (progress.checkpoint + 1) % checkpoint_count;
    if progress.checkpoint != 0 {
        return Advance::Checkpoint(progress.checkpoint);
    }

    progress.lap += 1;
    if progress.lap > total_laps {
        progress.finished = true;
        Advance::Finished
    } else {
        Advance::Lap(progress.lap)
    }
}

/// Capture test against the car's target checkpoint, `scale` widens the radius
pub fn try_capture_checkpoint(
    car: &mut Car,
    checkpoints: &[Checkpoint],
    capture_scale: f32,
    total_laps: u32,
) -> Option<Advance> {
    if car.progress.finished {
        return None;
    }
    let target = checkpoints.get(car.progress.target(checkpoints.len()))?;
    if car.position.distance(target.center()) >= target.radius * capture_scale {
        return None;
    }

    let advance = advance_checkpoint(car, checkpoints.len(), total_laps);
    match advance {
        Advance::Checkpoint(index) => debug!("Reached checkpoint {}", index),
        Advance::Lap(lap) => info!("Lap complete, now on lap {}", lap),
        Advance::Finished => info!("Car finished all laps!"),
    }
    Some(advance)
}

/// Ranking metric. Finished cars are pinned above anything still racing.
pub fn progress_score(car: &Car, checkpoint_count: usize) -> u32 {
    if car.progress.finished {
        return u32::MAX;
    }
    car.progress.lap.saturating_sub(1) * checkpoint_count as u32 + car.progress.checkpoint as u32
}

/// Car indices ordered leader first. Finished cars lead in the order they crossed the
/// line; the rest follow by score. Ties keep the iteration order of `cars`.
pub fn rank_cars(cars: &[Car], checkpoint_count: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..cars.len()).collect();
    // sort_by_key is stable, so equal keys stay in player-then-AI order
    order.sort_by_key(|&i| {
        let progress = &cars[i].progress;
        if progress.finished {
            (0, progress.finish_order.unwrap_or(u32::MAX), Reverse(0))
        } else {
            (1, 0, Reverse(progress_score(&cars[i], checkpoint_count)))
        }
    });
    order
}

/// Hand out the next finishing position to a car that has finished but has none yet
pub fn record_finish(car: &mut Car, finishers: &mut u32) -> Option<u32> {
    if !car.progress.finished || car.progress.finish_order.is_some() {
        return None;
    }
    *finishers += 1;
    car.progress.finish_order = Some(*finishers);
    Some(*finishers)
}

/// 1-based position of the car at `index`
pub fn rank_of(cars: &[Car], checkpoint_count: usize, index: usize) -> usize {
    rank_cars(cars, checkpoint_count)
        .iter()
        .position(|&i| i == index)
        .map_or(cars.len(), |p| p + 1)
}

pub fn ordinal_suffix(n: usize) -> &'static str {
    match (n % 10, n % 100) {
        (1, m) if m != 11 => "st",
        (2, m) if m != 12 => "nd",
        (3, m) if m != 13 => "rd",
        _ => "th",
    }
}

/// Numbers a heads-up display needs for the player
#[derive(Debug, Clone, PartialEq)]
pub struct RaceHud {
    pub lap: u32,
    pub total_laps: u32,
    pub checkpoint: usize,
    pub checkpoint_count: usize,
    pub lap_progress_percent: u32,
    pub position: usize,
    pub position_label: String,
    pub speed_kmh: i32,
    pub boost_fraction: f32,
    /// Seconds before an off-track reset, present only while off the track
    pub off_track_time_left: Option<f32>,
}

impl RaceHud {
    pub fn for_player(
        player: &Car,
        position: usize,
        total_laps: u32,
        checkpoint_count: usize,
        on_track: bool,
    ) -> Self {
        let lap_progress_percent = if checkpoint_count > 0 {
            (player.progress.checkpoint as f32 / checkpoint_count as f32 * 100.0).round() as u32
        } else {
            0
        };
        Self {
            lap: player.progress.lap,
            total_laps,
            checkpoint: player.progress.checkpoint,
            checkpoint_count,
            lap_progress_percent,
            position,
            position_label: format!("{}{}", position, ordinal_suffix(position)),
            speed_kmh: (player.speed * SPEED_TO_KMH).round() as i32,
            boost_fraction: if player.max_boost > 0.0 {
                player.boost / player.max_boost
            } else {
                0.0
            },
            off_track_time_left: (!on_track).then(|| off_track_time_left(player)),
        }
    }
}
