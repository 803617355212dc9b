use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dynamics::state::RocketState;
use crate::error::SimResult;
use crate::physics::thrust::{self, Propulsion};
use crate::vehicle::RocketConfig;

// ---------------------------------------------------------------------------
// Flight phases
// ---------------------------------------------------------------------------

/// Physically distinct regimes of a water rocket flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightPhase {
    /// Compressed air pushes water out of the nozzle.
    WaterExpulsion,
    /// Water is gone, the remaining overpressure vents as an air jet.
    AirExpulsion,
    /// No thrust left: gravity and drag only.
    Ballistic,
    /// Back at launch altitude. Terminal.
    Landed,
}

impl FlightPhase {
    /// Force model for this phase.
    pub fn dynamics(self) -> &'static dyn PhaseDynamics {
        match self {
            FlightPhase::WaterExpulsion => &WaterThrust,
            FlightPhase::AirExpulsion => &AirThrust,
            FlightPhase::Ballistic | FlightPhase::Landed => &Unpowered,
        }
    }

    pub fn is_powered(self) -> bool {
        matches!(self, FlightPhase::WaterExpulsion | FlightPhase::AirExpulsion)
    }

    pub fn is_terminal(self) -> bool {
        self == FlightPhase::Landed
    }

    pub fn label(self) -> &'static str {
        match self {
            FlightPhase::WaterExpulsion => "WATER",
            FlightPhase::AirExpulsion => "AIR",
            FlightPhase::Ballistic => "COAST",
            FlightPhase::Landed => "LANDED",
        }
    }
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Thrust and mass loss of one flight phase.
///
/// Implementations are evaluated on every RK4 sub-stage, so they must only
/// read the state they are given.
pub trait PhaseDynamics {
    fn propulsion(&self, state: &RocketState, rocket: &RocketConfig) -> SimResult<Propulsion>;

    fn name(&self) -> &str;
}

/// Thrust and mass flow for `state` flying in `phase`.
pub fn propulsion(
    phase: FlightPhase,
    state: &RocketState,
    rocket: &RocketConfig,
) -> SimResult<Propulsion> {
    phase.dynamics().propulsion(state, rocket)
}

// ---------------------------------------------------------------------------
// Phase handlers
// ---------------------------------------------------------------------------

pub struct WaterThrust;

impl PhaseDynamics for WaterThrust {
    fn propulsion(&self, state: &RocketState, rocket: &RocketConfig) -> SimResult<Propulsion> {
        if state.water() <= 0.0 {
            return Ok(Propulsion::NONE);
        }
        let pressure = state.internal_pressure(rocket)?;
        Ok(thrust::water_jet(
            pressure,
            rocket.environment.pressure,
            rocket.water_density,
            rocket.nozzle_area(),
        ))
    }

    fn name(&self) -> &str {
        "water thrust"
    }
}

pub struct AirThrust;

impl PhaseDynamics for AirThrust {
    fn propulsion(&self, state: &RocketState, rocket: &RocketConfig) -> SimResult<Propulsion> {
        let pressure = state.internal_pressure(rocket)?;
        Ok(thrust::air_jet(
            pressure,
            rocket.environment.pressure,
            state.gas_density(rocket),
            rocket.expansion.heat_capacity_ratio(),
            rocket.nozzle_area(),
            rocket.pressure_thrust,
        ))
    }

    fn name(&self) -> &str {
        "air thrust"
    }
}

pub struct Unpowered;

impl PhaseDynamics for Unpowered {
    fn propulsion(&self, _state: &RocketState, _rocket: &RocketConfig) -> SimResult<Propulsion> {
        Ok(Propulsion::NONE)
    }

    fn name(&self) -> &str {
        "unpowered"
    }
}
