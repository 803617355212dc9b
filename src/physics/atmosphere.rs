use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Launch-site environment (constant over the flight)
// ---------------------------------------------------------------------------

pub const R_AIR: f64 = 287.05; // specific gas constant for dry air, J/(kg·K)
pub const GAMMA: f64 = 1.4; // ratio of specific heats for air

const G0: f64 = 9.81; // m/s^2
const P0: f64 = 101_325.0; // sea-level pressure, Pa
const T0: f64 = 293.15; // launch-day temperature, K (20 °C)
const RHO0: f64 = 1.225; // sea-level air density, kg/m^3

/// Ambient conditions at the launch site.
///
/// Water rockets stay within a few hundred metres of the ground, so the
/// atmosphere is taken as uniform over the whole flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub gravity: f64,     // m/s^2
    pub air_density: f64, // kg/m^3
    pub pressure: f64,    // Pa
    pub temperature: f64, // K
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            gravity: G0,
            air_density: RHO0,
            pressure: P0,
            temperature: T0,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
