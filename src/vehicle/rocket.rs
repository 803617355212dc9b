use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::physics::atmosphere::{Environment, R_AIR};
use crate::physics::gas::ExpansionLaw;

pub const WATER_DENSITY: f64 = 1000.0; // kg/m^3

// ---------------------------------------------------------------------------
// Rocket definition (immutable input of a run, SI units)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RocketConfig {
    pub name: String,
    pub bottle_volume: f64,   // m^3
    pub fill_fraction: f64,   // water volume / bottle volume
    pub nozzle_diameter: f64, // m
    pub gauge_pressure: f64,  // Pa above ambient at launch
    pub dry_mass: f64,        // kg, bottle + payload
    pub cd: f64,              // drag coefficient (dimensionless)
    pub frontal_area: f64,    // m^2
    pub launch_angle: f64,    // rad from vertical (0 = straight up)
    pub launch_speed: f64,    // m/s along the launch direction at t = 0
    pub rail_length: f64,     // m of guide rail along the launch direction
    pub water_density: f64,   // kg/m^3
    pub expansion: ExpansionLaw,
    pub pressure_thrust: bool, // add (p_exit - p_a) A when the air jet is choked
    pub environment: Environment,
}

impl Default for RocketConfig {
    fn default() -> Self {
        Self {
            name: "Water Rocket".into(),
            bottle_volume: 2.5e-3,
            fill_fraction: 0.4,
            nozzle_diameter: 0.01,
            gauge_pressure: 700_000.0,
            dry_mass: 0.45,
            cd: 0.3,
            frontal_area: PI * 0.06 * 0.06,
            launch_angle: 0.0,
            launch_speed: 0.0,
            rail_length: 1.0,
            water_density: WATER_DENSITY,
            expansion: ExpansionLaw::default(),
            pressure_thrust: true,
            environment: Environment::default(),
        }
    }
}

impl RocketConfig {
    pub fn nozzle_area(&self) -> f64 {
        PI * 0.25 * self.nozzle_diameter * self.nozzle_diameter
    }

    /// Water volume at launch, m^3.
    pub fn water_volume(&self) -> f64 {
        self.bottle_volume * self.fill_fraction
    }

    /// Air volume at launch, m^3.
    pub fn initial_gas_volume(&self) -> f64 {
        self.bottle_volume - self.water_volume()
    }

    /// Absolute internal pressure at launch, Pa.
    pub fn initial_pressure(&self) -> f64 {
        self.environment.pressure + self.gauge_pressure
    }

    /// Mass of the compressed air at launch (ideal gas at ambient temperature).
    pub fn initial_air_mass(&self) -> f64 {
        self.initial_pressure() * self.initial_gas_volume() / (R_AIR * self.environment.temperature)
    }

    pub fn initial_water_mass(&self) -> f64 {
        self.water_volume() * self.water_density
    }

    /// Mass on the pad: structure, water and compressed air.
    pub fn launch_mass(&self) -> f64 {
        self.dry_mass + self.initial_water_mass() + self.initial_air_mass()
    }

    /// Unit vector of the launch rail in the (downrange, up) plane.
    pub fn launch_direction(&self) -> Vector2<f64> {
        Vector2::new(self.launch_angle.sin(), self.launch_angle.cos())
    }

    /// Reject non-physical input before a run starts.
    pub fn validate(&self) -> SimResult<()> {
        let positive = [
            ("bottle volume", self.bottle_volume),
            ("nozzle diameter", self.nozzle_diameter),
            ("dry mass", self.dry_mass),
            ("frontal area", self.frontal_area),
            ("water density", self.water_density),
            ("gravity", self.environment.gravity),
            ("ambient air density", self.environment.air_density),
            ("ambient pressure", self.environment.pressure),
            ("ambient temperature", self.environment.temperature),
        ];
        for (what, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::invalid(format!("{what} must be positive, got {value}")));
            }
        }

        let non_negative = [
            ("gauge pressure", self.gauge_pressure),
            ("drag coefficient", self.cd),
            ("launch speed", self.launch_speed),
            ("rail length", self.rail_length),
        ];
        for (what, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::invalid(format!("{what} must not be negative, got {value}")));
            }
        }

        if !(0.0..1.0).contains(&self.fill_fraction) {
            return Err(SimError::invalid(format!(
                "water fill fraction must be in [0, 1), got {}",
                self.fill_fraction
            )));
        }

        if self.nozzle_area() >= self.frontal_area {
            return Err(SimError::invalid(format!(
                "nozzle area {:.3e} m^2 must be smaller than the bottle cross-section {:.3e} m^2",
                self.nozzle_area(),
                self.frontal_area
            )));
        }

        if !(self.launch_angle.is_finite() && self.launch_angle.abs() < FRAC_PI_2) {
            return Err(SimError::invalid(format!(
                "launch angle must be within 90 degrees of vertical, got {:.1} deg",
                self.launch_angle.to_degrees()
            )));
        }

        if let ExpansionLaw::Adiabatic { gamma } = self.expansion {
            if !(gamma.is_finite() && gamma > 1.0) {
                return Err(SimError::invalid(format!(
                    "adiabatic exponent must be greater than 1, got {gamma}"
                )));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Rocket builder
// ---------------------------------------------------------------------------

pub struct RocketBuilder {
    config: RocketConfig,
}

impl RocketBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            config: RocketConfig {
                name: name.into(),
                ..RocketConfig::default()
            },
        }
    }

    pub fn bottle_volume(mut self, v: f64) -> Self { self.config.bottle_volume = v; self }
    pub fn fill_fraction(mut self, v: f64) -> Self { self.config.fill_fraction = v; self }
    pub fn nozzle_diameter(mut self, v: f64) -> Self { self.config.nozzle_diameter = v; self }
    pub fn gauge_pressure(mut self, v: f64) -> Self { self.config.gauge_pressure = v; self }
    pub fn dry_mass(mut self, v: f64) -> Self { self.config.dry_mass = v; self }
    pub fn cd(mut self, v: f64) -> Self { self.config.cd = v; self }
    pub fn frontal_area(mut self, v: f64) -> Self { self.config.frontal_area = v; self }
    pub fn launch_angle(mut self, v: f64) -> Self { self.config.launch_angle = v; self }
    pub fn launch_speed(mut self, v: f64) -> Self { self.config.launch_speed = v; self }
    pub fn rail_length(mut self, v: f64) -> Self { self.config.rail_length = v; self }
    pub fn water_density(mut self, v: f64) -> Self { self.config.water_density = v; self }
    pub fn expansion(mut self, v: ExpansionLaw) -> Self { self.config.expansion = v; self }
    pub fn pressure_thrust(mut self, v: bool) -> Self { self.config.pressure_thrust = v; self }
    pub fn environment(mut self, v: Environment) -> Self { self.config.environment = v; self }

    /// Bottle volume in litres.
    pub fn bottle_litres(self, litres: f64) -> Self {
        self.bottle_volume(litres * 1e-3)
    }

    /// Nozzle diameter in millimetres.
    pub fn nozzle_mm(self, mm: f64) -> Self {
        self.nozzle_diameter(mm * 1e-3)
    }

    /// Gauge pressure in kilopascals.
    pub fn gauge_kpa(self, kpa: f64) -> Self {
        self.gauge_pressure(kpa * 1e3)
    }

    /// Launch angle in degrees from vertical.
    pub fn launch_angle_deg(self, deg: f64) -> Self {
        self.launch_angle(deg.to_radians())
    }

    pub fn build(self) -> SimResult<RocketConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ---------------------------------------------------------------------------
// Preset rockets
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// 2.5 L bottle, 40 % water, 10 mm nozzle, 7 bar, launched 10° off vertical.
    pub fn standard() -> RocketConfig {
        RocketConfig {
            name: "Default".into(),
            launch_angle: 10.0_f64.to_radians(),
            ..RocketConfig::default()
        }
    }

    /// 2.0 L bottle, 33 % water, 9 mm nozzle, 100 psi, light airframe.
    pub fn two_litre() -> RocketConfig {
        RocketConfig {
            name: "Two-Litre".into(),
            bottle_volume: 2.0e-3,
            fill_fraction: 0.33,
            nozzle_diameter: 0.009,
            gauge_pressure: 689_000.0,
            dry_mass: 0.1,
            cd: 0.3,
            frontal_area: 0.002,
            ..RocketConfig::default()
        }
    }

    pub fn by_name(name: &str) -> Option<RocketConfig> {
        match name.to_ascii_lowercase().as_str() {
            "default" => Some(standard()),
            "two-litre" | "two_litre" | "2l" => Some(two_litre()),
            _ => None,
        }
    }

    pub const NAMES: &[&str] = &["default", "two-litre"];
}
