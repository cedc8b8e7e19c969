use crate::config::{ConfigError, RaceConfig};
use crate::game_logic::{
    AiContext, AiStep, Car, ControlState, Difficulty, Driver, GRID_SPACING, PLAYER_CAPTURE_SCALE,
    RaceHud, Track, apply_difficulty, apply_off_track_timeout, apply_physics,
    capture_ai_checkpoint, integrate_position, is_car_on_track, keep_car_on_track,
    ordinal_suffix, rank_of, record_finish, spawn_ai_car, try_capture_checkpoint, update_ai_car,
};
use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RacePhase {
    #[default]
    Menu,
    Racing,
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaceState {
    pub phase: RacePhase,
    pub total_laps: u32,
    /// 1-based, recomputed every tick
    pub player_rank: usize,
    pub final_rank: Option<usize>,
    /// Cars that have crossed the finish line so far
    pub finishers: u32,
    pub tick: u64,
}

/// Everything one race needs, stepped by [`Simulation::tick`].
/// The player is always `cars[0]`; AI cars follow in creation order.
#[derive(Resource, Clone)]
pub struct Simulation {
    track: Track,
    cars: Vec<Car>,
    race: RaceState,
    config: RaceConfig,
    rng: StdRng,
}

impl Simulation {
    pub fn new(config: RaceConfig, track: Track) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let cars = spawn_field(&track, &config, &mut rng);
        Ok(Self {
            race: RaceState {
                phase: RacePhase::Menu,
                total_laps: config.total_laps,
                player_rank: 1,
                final_rank: None,
                finishers: 0,
                tick: 0,
            },
            track,
            cars,
            config,
            rng,
        })
    }

    pub fn start_race(&mut self) {
        self.restart_race();
        info!(
            "Race started: {} laps, {} cars, {} AI",
            self.race.total_laps,
            self.cars.len(),
            self.config.difficulty.as_str()
        );
    }

    /// Put a fresh field on the grid. The seed is reapplied so restarts replay identically.
    pub fn restart_race(&mut self) {
        self.rng = StdRng::seed_from_u64(self.config.seed);
        self.cars = spawn_field(&self.track, &self.config, &mut self.rng);
        self.race = RaceState {
            phase: RacePhase::Racing,
            total_laps: self.config.total_laps,
            player_rank: 1,
            final_rank: None,
            finishers: 0,
            tick: 0,
        };
    }

    /// Swap in a new track between ticks and restart on it
    pub fn load_track(&mut self, track: Track) {
        self.track = track;
        self.restart_race();
        info!(
            "Track loaded, {} checkpoints",
            self.track.checkpoints().len()
        );
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.config.difficulty = difficulty;
        for car in &mut self.cars {
            apply_difficulty(car, difficulty);
        }
        info!("AI difficulty set to {}", difficulty.as_str());
    }

    /// Advance the race by one fixed step. Does nothing outside the racing phase.
    pub fn tick(&mut self, controls: &ControlState) {
        if self.race.phase != RacePhase::Racing {
            return;
        }
        self.race.tick += 1;

        // cars marked finished outside a tick still get their place first
        for car in &mut self.cars {
            record_finish(car, &mut self.race.finishers);
        }

        let ctx = AiContext {
            checkpoints: self.track.checkpoints(),
            difficulty: self.config.difficulty,
            total_laps: self.race.total_laps,
        };

        for car in &mut self.cars {
            let moves = match car.driver {
                Driver::Player => {
                    car.controls = *controls;
                    apply_physics(car);
                    true
                }
                Driver::Ai(_) => {
                    let step = update_ai_car(car, &ctx, &mut self.rng);
                    if step == AiStep::Drive {
                        integrate_position(car);
                    }
                    step != AiStep::Parked
                }
            };
            if !moves {
                continue;
            }

            keep_car_on_track(car, &self.track);
            apply_off_track_timeout(car, &self.track);

            if car.is_player() {
                try_capture_checkpoint(
                    car,
                    ctx.checkpoints,
                    PLAYER_CAPTURE_SCALE,
                    ctx.total_laps,
                );
            } else {
                capture_ai_checkpoint(car, &ctx);
            }
            if let Some(place) = record_finish(car, &mut self.race.finishers) {
                info!("Car finished in place {}", place);
            }
        }

        let checkpoint_count = self.track.checkpoints().len();
        self.race.player_rank = rank_of(&self.cars, checkpoint_count, 0);

        if self.player().progress.finished {
            let rank = self.race.player_rank;
            self.race.phase = RacePhase::Finished;
            self.race.final_rank = Some(rank);
            info!("Race finished! You placed {}{}", rank, ordinal_suffix(rank));
        }
    }

    pub fn hud(&self) -> RaceHud {
        let player = self.player();
        RaceHud::for_player(
            player,
            self.race.player_rank,
            self.race.total_laps,
            self.track.checkpoints().len(),
            is_car_on_track(player, &self.track),
        )
    }

    pub fn player(&self) -> &Car {
        &self.cars[0]
    }

    pub fn cars(&self) -> &[Car] {
        &self.cars
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn race(&self) -> &RaceState {
        &self.race
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }
}

// player on the start position, AI cars in a row to its right
fn spawn_field(track: &Track, config: &RaceConfig, rng: &mut StdRng) -> Vec<Car> {
    let start = track.start_position();
    let mut cars = Vec::with_capacity(config.total_cars as usize);
    cars.push(Car::player(start));
    for i in 1..config.total_cars {
        let position = Vec2::new(start.x + i as f32 * GRID_SPACING, start.y);
        cars.push(spawn_ai_car(position, config.difficulty, rng));
    }
    cars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_logic::map::tests::sample_track;

    fn racing(config: RaceConfig) -> Simulation {
        let mut sim = Simulation::new(config, Track::default_track()).unwrap();
        sim.start_race();
        sim
    }

    fn hard(seed: u64) -> RaceConfig {
        RaceConfig {
            difficulty: Difficulty::Hard,
            seed,
            ..Default::default()
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = RaceConfig {
            total_laps: 0,
            ..Default::default()
        };
        assert!(matches!(
            Simulation::new(config, Track::default_track()),
            Err(ConfigError::ZeroLaps)
        ));
    }

    #[test]
    fn test_menu_phase_does_not_tick() {
        let mut sim = Simulation::new(RaceConfig::default(), Track::default_track()).unwrap();
        let before = sim.cars().to_vec();
        sim.tick(&ControlState {
            accelerate: true,
            ..Default::default()
        });
        assert_eq!(sim.race().phase, RacePhase::Menu);
        assert_eq!(sim.race().tick, 0);
        assert_eq!(sim.cars(), &before[..]);
    }

    #[test]
    fn test_grid_layout() {
        let sim = racing(RaceConfig::default());
        let start = sim.track().start_position();
        assert_eq!(sim.cars().len(), 4);
        assert!(sim.player().is_player());
        for (i, car) in sim.cars().iter().enumerate().skip(1) {
            assert!(!car.is_player());
            assert_eq!(car.position, start + Vec2::new(i as f32 * GRID_SPACING, 0.0));
        }
    }

    #[test]
    fn test_idle_player_stays_put() {
        let mut sim = racing(RaceConfig::default());
        let start = sim.player().position;
        sim.tick(&ControlState::default());
        assert_eq!(sim.player().position, start);
        assert_eq!(sim.race().tick, 1);
    }

    #[test]
    fn test_player_captures_checkpoint_through_tick() {
        let mut sim = racing(RaceConfig::default());
        let target = sim.track().checkpoints()[1].center();
        sim.cars[0].position = target + Vec2::new(0.0, 29.0);
        sim.tick(&ControlState::default());
        assert_eq!(sim.player().progress.checkpoint, 1);
        assert_eq!(sim.race().player_rank, 1);
        assert_eq!(sim.hud().position_label, "1st");
    }

    #[test]
    fn test_rank_follows_progress() {
        let mut sim = racing(RaceConfig::default());
        sim.cars[2].progress.lap = 2;
        sim.tick(&ControlState::default());
        assert_eq!(sim.race().player_rank, 2);
        assert_eq!(sim.hud().position, 2);
    }

    #[test]
    fn test_player_finish_ends_race() {
        let mut sim = racing(RaceConfig::default());
        let finish = sim.track().checkpoints()[0].center();
        let player = &mut sim.cars[0];
        player.progress.lap = 3;
        player.progress.checkpoint = 5;
        player.position = finish;

        sim.tick(&ControlState::default());
        assert!(sim.player().progress.finished);
        assert_eq!(sim.race().phase, RacePhase::Finished);
        assert_eq!(sim.race().final_rank, Some(1));

        // finished race no longer advances
        sim.tick(&ControlState::default());
        assert_eq!(sim.race().tick, 1);
    }

    fn finish_ai_car(sim: &mut Simulation, index: usize) {
        let finish = sim.track().checkpoints()[0].center();
        let car = &mut sim.cars[index];
        car.progress.lap = 3;
        car.progress.checkpoint = 5;
        car.position = finish;
    }

    #[test]
    fn test_player_behind_earlier_finisher_places_second() {
        let mut sim = racing(RaceConfig::default());
        sim.cars[1].progress.lap = 4;
        sim.cars[1].progress.finished = true;

        let finish = sim.track().checkpoints()[0].center();
        let player = &mut sim.cars[0];
        player.progress.lap = 3;
        player.progress.checkpoint = 5;
        player.position = finish;

        sim.tick(&ControlState::default());
        assert_eq!(sim.race().phase, RacePhase::Finished);
        assert_eq!(sim.race().final_rank, Some(2));
        assert_eq!(sim.cars()[1].progress.finish_order, Some(1));
        assert_eq!(sim.player().progress.finish_order, Some(2));
    }

    #[test]
    fn test_ai_finishers_keep_crossing_order() {
        let mut sim = racing(RaceConfig::default());
        // car 3 crosses first, car 2 a tick later
        finish_ai_car(&mut sim, 3);
        sim.tick(&ControlState::default());
        finish_ai_car(&mut sim, 2);
        sim.tick(&ControlState::default());

        assert_eq!(sim.cars()[3].progress.finish_order, Some(1));
        assert_eq!(sim.cars()[2].progress.finish_order, Some(2));
        assert_eq!(sim.race().finishers, 2);
        assert_eq!(sim.race().player_rank, 3);
        assert_eq!(sim.race().phase, RacePhase::Racing);

        // the player finishing last is placed last among finishers
        let finish = sim.track().checkpoints()[0].center();
        let player = &mut sim.cars[0];
        player.progress.lap = 3;
        player.progress.checkpoint = 5;
        player.position = finish;
        sim.tick(&ControlState::default());
        assert_eq!(sim.race().final_rank, Some(3));
    }

    #[test]
    fn test_same_seed_same_race() {
        let controls = ControlState {
            accelerate: true,
            turn_right: true,
            ..Default::default()
        };
        let run = || {
            let mut sim = racing(hard(99));
            for _ in 0..600 {
                sim.tick(&controls);
            }
            sim
        };
        let (a, b) = (run(), run());
        assert_eq!(a.cars(), b.cars());
        assert_eq!(a.race(), b.race());
    }

    #[test]
    fn test_restart_replays_the_grid() {
        let mut sim = racing(hard(5));
        let grid = sim.cars().to_vec();
        for _ in 0..120 {
            sim.tick(&ControlState::default());
        }
        sim.restart_race();
        assert_eq!(sim.cars(), &grid[..]);
        assert_eq!(sim.race().tick, 0);
    }

    #[test]
    fn test_progress_stays_in_bounds_over_long_run() {
        let mut sim = racing(hard(3));
        let count = sim.track().checkpoints().len();
        for _ in 0..3000 {
            sim.tick(&ControlState::default());
            for car in sim.cars() {
                assert!(car.progress.checkpoint < count);
                assert!((1..=sim.race().total_laps + 1).contains(&car.progress.lap));
                assert!(car.position.is_finite());
            }
        }
    }

    #[test]
    fn test_difficulty_change_applies_to_field() {
        let mut sim = racing(RaceConfig::default());
        sim.set_difficulty(Difficulty::Hard);
        assert_eq!(sim.config().difficulty, Difficulty::Hard);
        for car in sim.cars().iter().skip(1) {
            assert!(car.max_speed <= Difficulty::Hard.ai_max_speed() + 1e-5);
            assert!(car.max_speed > Difficulty::Easy.ai_max_speed());
        }
    }

    #[test]
    fn test_load_track_restarts_on_new_layout() {
        let mut sim = racing(RaceConfig::default());
        sim.cars[0].progress.checkpoint = 3;
        let track = sample_track();
        let start = track.start_position();
        sim.load_track(track);
        assert_eq!(sim.race().phase, RacePhase::Racing);
        assert_eq!(sim.player().position, start);
        assert_eq!(sim.player().progress.checkpoint, 0);
        assert_eq!(sim.hud().checkpoint_count, 5);
    }

    #[test]
    fn test_single_car_race() {
        let mut sim = racing(RaceConfig {
            total_cars: 1,
            ..Default::default()
        });
        assert_eq!(sim.cars().len(), 1);
        sim.tick(&ControlState::default());
        assert_eq!(sim.race().player_rank, 1);
    }
}
