use crate::dynamics::{self, FlightPhase, RocketState};
use crate::error::SimResult;
use crate::vehicle::RocketConfig;

// ---------------------------------------------------------------------------
// Classical 4th-order Runge-Kutta integrator
// ---------------------------------------------------------------------------

/// Single RK4 step: advance state by dt within one flight phase.
///
/// Every sub-stage evaluates the phase forces on its own interpolated state,
/// so mass, water volume and pressure are consistent with the stage rather
/// than frozen at the step start. Pressure is refreshed only while a thrust
/// phase is venting; after that it stays where the phase machine left it.
pub fn rk4_step(
    state: &RocketState,
    phase: FlightPhase,
    rocket: &RocketConfig,
    dt: f64,
) -> SimResult<RocketState> {
    let k1 = dynamics::derivatives(state, phase, rocket)?;
    let k2 = dynamics::derivatives(&state.apply(&k1, dt * 0.5), phase, rocket)?;
    let k3 = dynamics::derivatives(&state.apply(&k2, dt * 0.5), phase, rocket)?;
    let k4 = dynamics::derivatives(&state.apply(&k3, dt), phase, rocket)?;

    let mut next = RocketState {
        time: state.time + dt,
        pos: state.pos + (k1.dpos + 2.0 * k2.dpos + 2.0 * k3.dpos + k4.dpos) * (dt / 6.0),
        vel: state.vel + (k1.dvel + 2.0 * k2.dvel + 2.0 * k3.dvel + k4.dvel) * (dt / 6.0),
        water_volume: state.water_volume
            + (k1.dwater + 2.0 * k2.dwater + 2.0 * k3.dwater + k4.dwater) * (dt / 6.0),
        air_mass: state.air_mass + (k1.dair + 2.0 * k2.dair + 2.0 * k3.dair + k4.dair) * (dt / 6.0),
        pressure: state.pressure,
        on_rail: state.on_rail,
    };
    next.check_finite()?;
    if phase.is_powered() {
        next.pressure = next.internal_pressure(rocket)?;
        next.check_finite()?;
    }
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::RocketBuilder;
    use approx::assert_relative_eq;
    use nalgebra::Vector2;

    #[test]
    fn free_fall_is_exact_for_constant_gravity() {
        let r = RocketBuilder::new("Drop").cd(0.0).gauge_pressure(0.0).build().unwrap();
        let mut s = RocketState::launch(&r);
        s.pos.y = 100.0;
        s.on_rail = false;
        let g = r.environment.gravity;
        let next = rk4_step(&s, FlightPhase::Ballistic, &r, 0.5).unwrap();
        assert_relative_eq!(next.pos.y, 100.0 - 0.5 * g * 0.25, epsilon = 1e-12);
        assert_relative_eq!(next.vel.y, -g * 0.5, epsilon = 1e-12);
        assert_relative_eq!(next.time, 0.5);
    }

    #[test]
    fn water_step_lowers_water_and_pressure() {
        let r = RocketBuilder::new("Test").build().unwrap();
        let s = RocketState::launch(&r);
        let next = rk4_step(&s, FlightPhase::WaterExpulsion, &r, 1e-3).unwrap();
        assert!(next.water_volume < s.water_volume);
        assert!(next.pressure < s.pressure);
        assert!(next.vel.y > 0.0);
        assert_relative_eq!(next.air_mass, s.air_mass);
    }

    #[test]
    fn step_reports_blow_up() {
        let r = RocketBuilder::new("Test").build().unwrap();
        let mut s = RocketState::launch(&r);
        s.vel = Vector2::new(0.0, f64::INFINITY);
        assert!(rk4_step(&s, FlightPhase::Ballistic, &r, 1e-3).is_err());
    }
}
