use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use circuit_racers::config::RaceConfig;
use circuit_racers::game_logic::{
    ControlState, TICK_SECONDS, Track, bearing, normalize_angle, ordinal_suffix,
};
use circuit_racers::race_plugin::{PlayerControls, RacePlugin, RaceSet};
use circuit_racers::simulation::{RacePhase, Simulation};
use circuit_racers::track_store::{JsonDirTrackStore, TrackStore};
use std::time::Duration;

// give up after ten simulated minutes
const MAX_TICKS: u64 = 60 * 60 * 10;
const STEER_DEADBAND: f32 = 0.05;

/// Headless race: the player car is driven by a simple autopilot until the race ends.
///
/// Usage: circuit-racers [TRACK_DIR TRACK_NAME]
/// Set CIRCUIT_RACERS_CONFIG to a JSON file to override the race options.
fn main() -> AppExit {
    let mut app = App::new();
    app.add_plugins((
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::ZERO)),
        LogPlugin::default(),
    ))
    // every update advances exactly one fixed step
    .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        TICK_SECONDS,
    )));

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return AppExit::from_code(1);
        }
    };
    let track = load_track();

    let mut simulation = match Simulation::new(config, track) {
        Ok(simulation) => simulation,
        Err(e) => {
            error!("{}", e);
            return AppExit::from_code(1);
        }
    };
    simulation.start_race();

    app.add_plugins(RacePlugin::new(simulation))
        .add_systems(FixedUpdate, autopilot.in_set(RaceSet::Input))
        .add_systems(Update, report_and_exit)
        .run()
}

fn load_config() -> Result<RaceConfig, Box<dyn std::error::Error>> {
    match std::env::var("CIRCUIT_RACERS_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)?;
            info!("Using race config from {}", path);
            Ok(RaceConfig::from_json_str(&json)?)
        }
        Err(_) => Ok(RaceConfig::default()),
    }
}

fn load_track() -> Track {
    let mut args = std::env::args().skip(1);
    let (Some(dir), Some(name)) = (args.next(), args.next()) else {
        info!("No track given, racing on the built-in track");
        return Track::default_track();
    };

    let store = JsonDirTrackStore::new(dir);
    match store.load(&name) {
        Ok(definition) => Track::from_definition(definition),
        Err(e) => {
            warn!("Could not load track {:?}: {}, using the built-in track", name, e);
            Track::default_track()
        }
    }
}

// Head for the next checkpoint, lifting off when the turn is sharp
fn autopilot(sim: Res<Simulation>, mut controls: ResMut<PlayerControls>) {
    let player = sim.player();
    let checkpoints = sim.track().checkpoints();
    let Some(target) = checkpoints.get(player.progress.target(checkpoints.len())) else {
        controls.0 = ControlState::default();
        return;
    };

    let diff = normalize_angle(bearing(player.position, target.center()) - player.angle);
    let distance = player.position.distance(target.center());
    let sharp = diff.abs() > 0.5 || (distance < 120.0 && diff.abs() > 0.2);

    controls.0 = ControlState {
        accelerate: !sharp || player.speed < 2.0,
        brake: false,
        turn_left: diff < -STEER_DEADBAND,
        turn_right: diff > STEER_DEADBAND,
        boost: !sharp && distance > 200.0,
    };
}

fn report_and_exit(sim: Res<Simulation>, mut exit: EventWriter<AppExit>) {
    let race = sim.race();
    if race.tick > 0 && race.tick % 600 == 0 {
        let hud = sim.hud();
        info!(
            "Lap {}/{}  checkpoint {}/{}  {}  {} km/h",
            hud.lap,
            hud.total_laps,
            hud.checkpoint,
            hud.checkpoint_count,
            hud.position_label,
            hud.speed_kmh
        );
    }

    if race.phase == RacePhase::Finished {
        if let Some(rank) = race.final_rank {
            info!(
                "Finished {}{} after {} ticks",
                rank,
                ordinal_suffix(rank),
                race.tick
            );
        }
        exit.write(AppExit::Success);
    } else if race.tick >= MAX_TICKS {
        warn!("Race did not finish within {} ticks", MAX_TICKS);
        exit.write(AppExit::Success);
    }
}
