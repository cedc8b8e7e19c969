pub mod config;
pub mod game_logic;
pub mod race_plugin;
pub mod simulation;
pub mod track_store;
