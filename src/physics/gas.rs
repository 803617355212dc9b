use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::physics::atmosphere::GAMMA;

// ---------------------------------------------------------------------------
// Polytropic expansion of the trapped air (P · V^n = const)
// ---------------------------------------------------------------------------

/// How the compressed air expands as water and air leave the bottle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "law", rename_all = "snake_case")]
pub enum ExpansionLaw {
    /// Temperature held constant: P · V = const.
    Isothermal,
    /// No heat exchange: P · V^gamma = const.
    Adiabatic { gamma: f64 },
}

impl Default for ExpansionLaw {
    fn default() -> Self {
        ExpansionLaw::Adiabatic { gamma: GAMMA }
    }
}

impl ExpansionLaw {
    /// Polytropic exponent n.
    pub fn exponent(&self) -> f64 {
        match *self {
            ExpansionLaw::Isothermal => 1.0,
            ExpansionLaw::Adiabatic { gamma } => gamma,
        }
    }

    /// Heat capacity ratio used for the nozzle flow of the air phase.
    pub fn heat_capacity_ratio(&self) -> f64 {
        match *self {
            ExpansionLaw::Isothermal => GAMMA,
            ExpansionLaw::Adiabatic { gamma } => gamma,
        }
    }

    /// Gas pressure after expanding from `initial_volume` to `current_volume`,
    /// without any clamping against ambient.
    pub fn expanded_pressure(
        &self,
        current_volume: f64,
        initial_volume: f64,
        initial_pressure: f64,
    ) -> SimResult<f64> {
        if !(initial_volume > 0.0) {
            return Err(SimError::invalid(format!(
                "initial gas volume must be positive, got {initial_volume} m^3"
            )));
        }
        if !(current_volume > 0.0) {
            return Err(SimError::invalid(format!(
                "gas volume must be positive, got {current_volume} m^3"
            )));
        }
        let ratio = initial_volume / current_volume;
        Ok(initial_pressure * ratio.powf(self.exponent()))
    }

    /// Internal pressure, never below ambient: once the gas has expanded to
    /// ambient no more thrust is possible.
    pub fn pressure(
        &self,
        current_volume: f64,
        initial_volume: f64,
        initial_pressure: f64,
        ambient_pressure: f64,
    ) -> SimResult<f64> {
        let p = self.expanded_pressure(current_volume, initial_volume, initial_pressure)?;
        Ok(p.max(ambient_pressure))
    }
}
