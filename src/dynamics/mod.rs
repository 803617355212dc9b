pub mod phase;
pub mod state;

use nalgebra::Vector2;

use crate::error::SimResult;
use crate::physics::aerodynamics::drag_force;
use crate::physics::thrust::Propulsion;
use crate::vehicle::RocketConfig;

pub use phase::{propulsion, FlightPhase, PhaseDynamics};
pub use state::{Deriv, RocketState, SimConfig, Tolerances};

/// Below this speed free-flying thrust keeps to the launch direction instead
/// of the velocity.
const WEATHERVANE_SPEED: f64 = 1.0; // m/s

// ---------------------------------------------------------------------------
// Equations of motion (2-D point mass with variable mass)
// ---------------------------------------------------------------------------

/// Forces acting on the rocket at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Forces {
    pub thrust: Vector2<f64>,  // N
    pub drag: Vector2<f64>,    // N
    pub gravity: Vector2<f64>, // N
    pub rail: Vector2<f64>,    // N, normal reaction of the launch rail
    pub mass: f64,             // kg
    pub propulsion: Propulsion,
}

impl Forces {
    pub fn net(&self) -> Vector2<f64> {
        self.thrust + self.drag + self.gravity + self.rail
    }

    pub fn acceleration(&self) -> Vector2<f64> {
        self.net() / self.mass
    }
}

/// Compute the forces on `state` while flying in `phase`.
///
/// Forces modeled:
///   1. Gravity - uniform, down
///   2. Thrust  - from the phase handler, along the launch rail until the
///                rocket clears it, then along the velocity (fins weathervane
///                the rocket)
///   3. Drag    - quadratic, opposing velocity
///   4. Rail    - cancels every force component across the rail while the
///                rocket is still guided
pub fn forces(state: &RocketState, phase: FlightPhase, rocket: &RocketConfig) -> SimResult<Forces> {
    let mass = state.mass(rocket);
    let env = &rocket.environment;

    let propulsion = phase::propulsion(phase, state, rocket)?;

    let along = rocket.launch_direction();
    let thrust = if propulsion.thrust > 0.0 {
        let speed = state.speed();
        let direction = if !state.on_rail && speed > WEATHERVANE_SPEED {
            state.vel / speed
        } else {
            along
        };
        direction * propulsion.thrust
    } else {
        Vector2::zeros()
    };

    let mut f = Forces {
        thrust,
        drag: drag_force(&state.vel, env.air_density, rocket.cd, rocket.frontal_area),
        gravity: Vector2::new(0.0, -env.gravity * mass),
        rail: Vector2::zeros(),
        mass,
        propulsion,
    };
    if state.on_rail {
        let net = f.net();
        f.rail = along * net.dot(&along) - net;
    }
    Ok(f)
}

/// Compute state derivatives for a given state, phase and rocket.
pub fn derivatives(state: &RocketState, phase: FlightPhase, rocket: &RocketConfig) -> SimResult<Deriv> {
    let f = forces(state, phase, rocket)?;
    Ok(Deriv {
        dpos: state.vel,
        dvel: f.acceleration(),
        dwater: -f.propulsion.water_mass_flow / rocket.water_density,
        dair: -f.propulsion.air_mass_flow,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
