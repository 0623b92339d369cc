pub mod rocket;

pub use rocket::{mass_flow, tsiolkovsky, weighted_direction, G0};
