// ---------------------------------------------------------------------------
// Nozzle flow: thrust and mass flow for water and air jets
// ---------------------------------------------------------------------------

/// Instantaneous propulsive output of the nozzle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Propulsion {
    pub thrust: f64,          // N
    pub water_mass_flow: f64, // kg/s leaving the bottle
    pub air_mass_flow: f64,   // kg/s leaving the bottle
}

impl Propulsion {
    pub const NONE: Propulsion = Propulsion {
        thrust: 0.0,
        water_mass_flow: 0.0,
        air_mass_flow: 0.0,
    };

    fn clamped(self) -> Self {
        Propulsion {
            thrust: self.thrust.max(0.0),
            water_mass_flow: self.water_mass_flow.max(0.0),
            air_mass_flow: self.air_mass_flow.max(0.0),
        }
    }
}

/// Incompressible water jet driven by the pressure differential.
///
/// Bernoulli: v_e = sqrt(2 (P - P_a) / rho_w), mdot = rho_w A v_e, F = mdot v_e.
pub fn water_jet(pressure: f64, ambient: f64, water_density: f64, nozzle_area: f64) -> Propulsion {
    let dp = pressure - ambient;
    if dp <= 0.0 || water_density <= 0.0 {
        return Propulsion::NONE;
    }
    let exit_velocity = (2.0 * dp / water_density).sqrt();
    let mass_flow = water_density * nozzle_area * exit_velocity;
    Propulsion {
        thrust: mass_flow * exit_velocity,
        water_mass_flow: mass_flow,
        air_mass_flow: 0.0,
    }
    .clamped()
}

/// Ambient-to-stagnation pressure ratio below which the nozzle chokes.
pub fn critical_pressure_ratio(gamma: f64) -> f64 {
    (2.0 / (gamma + 1.0)).powf(gamma / (gamma - 1.0))
}

/// Isentropic air jet from a reservoir at `pressure` and `gas_density`.
///
/// Choked when P_a / P falls below the critical ratio: the exit runs at the
/// local speed of sound and the exit plane sits above ambient, so the
/// pressure-area term contributes when `pressure_thrust` is set. Otherwise the
/// jet expands fully to ambient.
pub fn air_jet(
    pressure: f64,
    ambient: f64,
    gas_density: f64,
    gamma: f64,
    nozzle_area: f64,
    pressure_thrust: bool,
) -> Propulsion {
    if pressure <= ambient || gas_density <= 0.0 || gamma <= 1.0 {
        return Propulsion::NONE;
    }

    let ratio = ambient / pressure;
    let critical = critical_pressure_ratio(gamma);

    let (mass_flow, exit_velocity, exit_pressure) = if ratio <= critical {
        let flow_factor = (2.0 / (gamma + 1.0)).powf((gamma + 1.0) / (2.0 * (gamma - 1.0)));
        let mdot = nozzle_area * (gamma * pressure * gas_density).sqrt() * flow_factor;
        let v_e = (2.0 * gamma / (gamma + 1.0) * pressure / gas_density).sqrt();
        (mdot, v_e, pressure * critical)
    } else {
        let expansion = 1.0 - ratio.powf((gamma - 1.0) / gamma);
        let v_e = (2.0 * gamma / (gamma - 1.0) * pressure / gas_density * expansion).sqrt();
        let exit_density = gas_density * ratio.powf(1.0 / gamma);
        (exit_density * nozzle_area * v_e, v_e, ambient)
    };

    let pressure_term = if pressure_thrust {
        (exit_pressure - ambient) * nozzle_area
    } else {
        0.0
    };

    Propulsion {
        thrust: mass_flow * exit_velocity + pressure_term,
        water_mass_flow: 0.0,
        air_mass_flow: mass_flow,
    }
    .clamped()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const AREA: f64 = 6.361_725e-5; // 9 mm nozzle

    #[test]
    fn water_thrust_is_twice_area_times_gauge() {
        let p = water_jet(101_325.0 + 689_000.0, 101_325.0, 1000.0, AREA);
        assert_relative_eq!(p.thrust, 2.0 * AREA * 689_000.0, max_relative = 1e-9);
        assert!(p.water_mass_flow > 0.0);
        assert_eq!(p.air_mass_flow, 0.0);
    }

    #[test]
    fn no_water_flow_without_overpressure() {
        assert_eq!(water_jet(101_325.0, 101_325.0, 1000.0, AREA), Propulsion::NONE);
        assert_eq!(water_jet(90_000.0, 101_325.0, 1000.0, AREA), Propulsion::NONE);
    }

    #[test]
    fn critical_ratio_for_air() {
        assert_relative_eq!(critical_pressure_ratio(1.4), 0.528_28, epsilon = 1e-4);
    }

    #[test]
    fn choked_and_unchoked_flow_meet_at_critical_ratio() {
        let gamma = 1.4;
        let ambient = 101_325.0;
        let p_crit = ambient / critical_pressure_ratio(gamma);
        let rho = p_crit / (287.05 * 293.15);

        let below = air_jet(p_crit * (1.0 - 1e-9), ambient, rho, gamma, AREA, false);
        let above = air_jet(p_crit * (1.0 + 1e-9), ambient, rho, gamma, AREA, false);
        assert_relative_eq!(below.air_mass_flow, above.air_mass_flow, max_relative = 1e-6);
        assert_relative_eq!(below.thrust, above.thrust, max_relative = 1e-6);
    }

    #[test]
    fn air_thrust_decays_towards_ambient() {
        let ambient = 101_325.0;
        let thrust_at = |p: f64| {
            let rho = p / (287.05 * 293.15);
            air_jet(p, ambient, rho, 1.4, AREA, true).thrust
        };
        assert!(thrust_at(400_000.0) > thrust_at(200_000.0));
        assert!(thrust_at(200_000.0) > thrust_at(110_000.0));
        assert!(thrust_at(101_325.5) < 1e-3);
        assert_eq!(thrust_at(ambient), 0.0);
    }

    #[test]
    fn pressure_term_only_when_choked() {
        let ambient = 101_325.0;
        let p = 500_000.0;
        let rho = p / (287.05 * 293.15);
        let with = air_jet(p, ambient, rho, 1.4, AREA, true);
        let without = air_jet(p, ambient, rho, 1.4, AREA, false);
        assert!(with.thrust > without.thrust);

        let p = 150_000.0;
        let rho = p / (287.05 * 293.15);
        let with = air_jet(p, ambient, rho, 1.4, AREA, true);
        let without = air_jet(p, ambient, rho, 1.4, AREA, false);
        assert_relative_eq!(with.thrust, without.thrust);
    }
}
