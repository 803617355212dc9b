pub mod rocket;

pub use rocket::{presets, RocketBuilder, RocketConfig, WATER_DENSITY};
