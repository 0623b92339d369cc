pub mod config;
pub mod physics;
pub mod model;
pub mod vehicle;
pub mod sim;
pub mod io;

pub use config::SimSettings;
pub use sim::{analyze, analyze_with, delta_v, BurnReport};
pub use vehicle::VehicleSnapshot;
