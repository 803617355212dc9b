use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::vehicle::RocketConfig;

// ---------------------------------------------------------------------------
// Rocket state: position, velocity, propellant, internal pressure
// ---------------------------------------------------------------------------

/// Full state at a single point in time.
/// Frame: (downrange, up), origin at the launch pad.
#[derive(Debug, Clone, PartialEq)]
pub struct RocketState {
    pub time: f64,            // s
    pub pos: Vector2<f64>,    // m
    pub vel: Vector2<f64>,    // m/s
    pub water_volume: f64,    // m^3 left in the bottle
    pub air_mass: f64,        // kg of air left in the bottle
    pub pressure: f64,        // Pa, refreshed after every accepted step
    pub on_rail: bool,        // still guided by the launch rail
}

impl RocketState {
    /// State on the pad at t = 0.
    pub fn launch(rocket: &RocketConfig) -> RocketState {
        RocketState {
            time: 0.0,
            pos: Vector2::zeros(),
            vel: rocket.launch_direction() * rocket.launch_speed,
            water_volume: rocket.water_volume(),
            air_mass: rocket.initial_air_mass(),
            pressure: rocket.initial_pressure(),
            on_rail: true,
        }
    }

    /// Advance state by a derivative scaled by dt (used inside RK4).
    /// `pressure` is carried over unchanged; it is derived, not integrated.
    pub fn apply(&self, d: &Deriv, dt: f64) -> RocketState {
        RocketState {
            time: self.time + dt,
            pos: self.pos + d.dpos * dt,
            vel: self.vel + d.dvel * dt,
            water_volume: self.water_volume + d.dwater * dt,
            air_mass: self.air_mass + d.dair * dt,
            pressure: self.pressure,
            on_rail: self.on_rail,
        }
    }

    pub fn altitude(&self) -> f64 {
        self.pos.y
    }

    pub fn downrange(&self) -> f64 {
        self.pos.x
    }

    pub fn speed(&self) -> f64 {
        self.vel.norm()
    }

    /// Distance travelled along the launch rail, m.
    pub fn rail_travel(&self, rocket: &RocketConfig) -> f64 {
        self.pos.dot(&rocket.launch_direction())
    }

    /// Water left, never negative.
    pub fn water(&self) -> f64 {
        self.water_volume.max(0.0)
    }

    /// Structure + water + air.
    pub fn mass(&self, rocket: &RocketConfig) -> f64 {
        rocket.dry_mass + self.water() * rocket.water_density + self.air_mass.max(0.0)
    }

    /// Volume occupied by air inside the bottle.
    pub fn gas_volume(&self, rocket: &RocketConfig) -> f64 {
        rocket.bottle_volume - self.water().min(rocket.bottle_volume)
    }

    /// Volume the launch charge of air would fill at the current gas density.
    ///
    /// Equals the gas volume while no air has escaped, so a single polytropic
    /// law covers both thrust phases.
    pub fn effective_gas_volume(&self, rocket: &RocketConfig) -> f64 {
        if self.air_mass <= 0.0 {
            return f64::INFINITY;
        }
        self.gas_volume(rocket) * rocket.initial_air_mass() / self.air_mass
    }

    /// Air density inside the bottle, kg/m^3.
    pub fn gas_density(&self, rocket: &RocketConfig) -> f64 {
        self.air_mass.max(0.0) / self.gas_volume(rocket)
    }

    /// Polytropic pressure without clamping, may drop below ambient.
    pub fn expanded_pressure(&self, rocket: &RocketConfig) -> SimResult<f64> {
        rocket.expansion.expanded_pressure(
            self.effective_gas_volume(rocket),
            rocket.initial_gas_volume(),
            rocket.initial_pressure(),
        )
    }

    /// Internal pressure, clamped to ambient.
    pub fn internal_pressure(&self, rocket: &RocketConfig) -> SimResult<f64> {
        rocket.expansion.pressure(
            self.effective_gas_volume(rocket),
            rocket.initial_gas_volume(),
            rocket.initial_pressure(),
            rocket.environment.pressure,
        )
    }

    /// Fail if any integrated quantity left the reals.
    pub fn check_finite(&self) -> SimResult<()> {
        let fields = [
            ("time", self.time),
            ("downrange position", self.pos.x),
            ("altitude", self.pos.y),
            ("horizontal velocity", self.vel.x),
            ("vertical velocity", self.vel.y),
            ("water volume", self.water_volume),
            ("air mass", self.air_mass),
            ("pressure", self.pressure),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some(&(quantity, _)) => Err(SimError::NumericalInstability {
                time: self.time,
                quantity,
            }),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// State derivative
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Deriv {
    pub dpos: Vector2<f64>,   // velocity
    pub dvel: Vector2<f64>,   // acceleration
    pub dwater: f64,          // m^3/s (negative while water flows)
    pub dair: f64,            // kg/s (negative while air flows)
}

// ---------------------------------------------------------------------------
// Simulation configuration
// ---------------------------------------------------------------------------

/// Margins used to decide that a boundary has been reached.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerances {
    pub water_volume: f64, // m^3
    pub pressure: f64,     // Pa
    pub altitude: f64,     // m
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            water_volume: 1e-9, // 1 mm^3
            pressure: 1.0,
            altitude: 1e-4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub dt: f64,              // base integration timestep, s
    pub min_dt: f64,          // smallest refined step near a boundary, s
    pub max_time: f64,        // hard stop, s
    pub sample_interval: f64, // s between recorded samples, 0 = every step
    pub tolerances: Tolerances,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 1e-3,         // 1 kHz, the water phase lasts a few hundred ms
            min_dt: 1e-9,
            max_time: 30.0,
            sample_interval: 0.0,
            tolerances: Tolerances::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::invalid(format!("time step must be positive, got {}", self.dt)));
        }
        if !(self.min_dt > 0.0 && self.min_dt <= self.dt) {
            return Err(SimError::invalid(format!(
                "minimum step must be in (0, dt], got {}",
                self.min_dt
            )));
        }
        if !(self.max_time.is_finite() && self.max_time > 0.0) {
            return Err(SimError::invalid(format!(
                "maximum duration must be positive, got {}",
                self.max_time
            )));
        }
        if !(self.sample_interval.is_finite() && self.sample_interval >= 0.0) {
            return Err(SimError::invalid(format!(
                "sample interval must not be negative, got {}",
                self.sample_interval
            )));
        }
        let t = &self.tolerances;
        if !(t.water_volume > 0.0 && t.pressure > 0.0 && t.altitude > 0.0) {
            return Err(SimError::invalid("tolerances must be positive"));
        }
        Ok(())
    }
}
