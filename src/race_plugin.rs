use crate::game_logic::{ControlState, TICK_RATE};
use crate::simulation::Simulation;
use bevy::prelude::*;

/// Produces the player's controls once per tick (keyboard, gamepad, script...)
pub trait InputSource {
    fn poll(&mut self) -> ControlState;
}

/// Consumes the simulation after each tick
pub trait Renderer {
    fn draw(&mut self, sim: &Simulation);
}

#[derive(Resource)]
pub struct InputDevice(pub Box<dyn InputSource + Send + Sync>);

#[derive(Resource)]
pub struct RendererHandle(pub Box<dyn Renderer + Send + Sync>);

/// Controls fed to the next simulation step
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct PlayerControls(pub ControlState);

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum RaceSet {
    Input,
    Step,
    Draw,
}

/// Runs a [`Simulation`] on the fixed 60 Hz schedule
pub struct RacePlugin {
    simulation: Simulation,
}

impl RacePlugin {
    pub fn new(simulation: Simulation) -> Self {
        Self { simulation }
    }
}

impl Plugin for RacePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.simulation.clone())
            .init_resource::<PlayerControls>()
            .insert_resource(Time::<Fixed>::from_hz(TICK_RATE))
            .configure_sets(
                FixedUpdate,
                (RaceSet::Input, RaceSet::Step, RaceSet::Draw).chain(),
            )
            .add_systems(
                FixedUpdate,
                (
                    poll_input.in_set(RaceSet::Input),
                    step_simulation.in_set(RaceSet::Step),
                    draw_simulation.in_set(RaceSet::Draw),
                ),
            );
    }
}

fn poll_input(device: Option<ResMut<InputDevice>>, mut controls: ResMut<PlayerControls>) {
    if let Some(mut device) = device {
        controls.0 = device.0.poll();
    }
}

fn step_simulation(mut sim: ResMut<Simulation>, controls: Res<PlayerControls>) {
    sim.tick(&controls.0);
}

fn draw_simulation(renderer: Option<ResMut<RendererHandle>>, sim: Res<Simulation>) {
    if let Some(mut renderer) = renderer {
        renderer.0.draw(&sim);
    }
}
