pub mod error;
pub mod physics;
pub mod dynamics;
pub mod vehicle;
pub mod sim;
pub mod io;

pub use error::{SimError, SimResult};
