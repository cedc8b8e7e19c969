pub mod constants;
pub mod geometry;
pub mod components;
pub mod physics;
pub mod collisions;
pub mod difficulty;
pub mod map;
pub mod lap_system;
pub mod ai;

pub use constants::*;
pub use geometry::*;
pub use components::*;
pub use physics::*;
pub use collisions::*;
pub use difficulty::*;
pub use map::*;
pub use lap_system::*;
pub use ai::*;
