use log::{debug, warn};
use nalgebra::Vector2;

use crate::dynamics::{FlightPhase, RocketState, Tolerances};
use crate::error::SimResult;
use crate::vehicle::RocketConfig;

// ---------------------------------------------------------------------------
// Phase transitions
// ---------------------------------------------------------------------------

/// A change of flight phase, stamped with the time it took effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub time: f64,
    pub from: FlightPhase,
    pub to: FlightPhase,
}

/// Verdict on a trial step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepCheck {
    /// No boundary crossed, or crossed within tolerance.
    Accept,
    /// A boundary was crossed by more than its tolerance; retry with a
    /// shorter step.
    Overshot { quantity: &'static str, excess: f64 },
}

/// Owns the current flight phase and decides when it changes.
///
/// Transitions are evaluated on the state after each accepted step and
/// select the phase used by the next step.
#[derive(Debug, Clone)]
pub struct PhaseStateMachine {
    phase: FlightPhase,
    tolerances: Tolerances,
}

impl PhaseStateMachine {
    pub fn new(rocket: &RocketConfig, tolerances: Tolerances) -> Self {
        Self {
            phase: Self::initial_phase(rocket, &tolerances),
            tolerances,
        }
    }

    /// Water first if there is any and the bottle is pressurised, otherwise
    /// straight to the air jet, or no thrust at all.
    pub fn initial_phase(rocket: &RocketConfig, tolerances: &Tolerances) -> FlightPhase {
        if rocket.gauge_pressure <= tolerances.pressure {
            FlightPhase::Ballistic
        } else if rocket.water_volume() > tolerances.water_volume {
            FlightPhase::WaterExpulsion
        } else {
            FlightPhase::AirExpulsion
        }
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    /// Classify a trial step taken in the current phase.
    pub fn check_step(&self, next: &RocketState, rocket: &RocketConfig) -> SimResult<StepCheck> {
        let tol = &self.tolerances;

        if self.phase == FlightPhase::WaterExpulsion && next.water_volume < -tol.water_volume {
            return Ok(StepCheck::Overshot {
                quantity: "water volume",
                excess: -next.water_volume,
            });
        }

        if self.phase.is_powered() {
            let overpressure = next.expanded_pressure(rocket)? - rocket.environment.pressure;
            if overpressure < -tol.pressure {
                return Ok(StepCheck::Overshot {
                    quantity: "pressure",
                    excess: -overpressure,
                });
            }
        }

        if !next.on_rail && next.vel.y <= 0.0 && next.altitude() < -tol.altitude {
            return Ok(StepCheck::Overshot {
                quantity: "altitude",
                excess: -next.altitude(),
            });
        }

        Ok(StepCheck::Accept)
    }

    /// Apply the transition rules to an accepted state.
    ///
    /// Snaps the state onto the boundary it reached: water to zero when the
    /// air jet starts, pressure to ambient when thrust ends, altitude to the
    /// pad on landing. While the rocket is on the launch rail it is kept on
    /// the rail line, or at rest on the pad if it has slid back to it.
    pub fn update(
        &mut self,
        state: &mut RocketState,
        rocket: &RocketConfig,
    ) -> SimResult<Option<Transition>> {
        let tol = self.tolerances;
        let ambient = rocket.environment.pressure;

        if state.on_rail {
            let along = rocket.launch_direction();
            let travel = state.rail_travel(rocket);
            if travel <= 0.0 {
                state.pos = Vector2::zeros();
                state.vel = Vector2::zeros();
            } else if travel >= rocket.rail_length {
                state.on_rail = false;
                debug!(
                    "t={:.4} s: cleared the {:.2} m rail at {:.2} m/s",
                    state.time,
                    rocket.rail_length,
                    state.speed()
                );
            } else {
                state.pos = along * travel;
                state.vel = along * state.vel.dot(&along);
            }
        }

        let from = self.phase;
        let mut to = from;

        if from.is_powered() {
            let vented = state.expanded_pressure(rocket)? - ambient <= tol.pressure;
            let water_gone = state.water_volume <= tol.water_volume;
            if from == FlightPhase::WaterExpulsion && water_gone {
                state.water_volume = 0.0;
                to = FlightPhase::AirExpulsion;
            }
            if vented {
                state.pressure = ambient;
                to = FlightPhase::Ballistic;
            }
        }

        if !from.is_terminal() {
            if state.on_rail {
                if !to.is_powered() && state.pos == Vector2::zeros() {
                    warn!(
                        "{}: at rest on the pad at t={:.3} s without clearing the rail",
                        rocket.name, state.time
                    );
                    to = FlightPhase::Landed;
                }
            } else if state.vel.y <= 0.0 && state.altitude() <= tol.altitude {
                state.pos.y = 0.0;
                to = FlightPhase::Landed;
            }
        }

        if to == from {
            return Ok(None);
        }

        debug!(
            "t={:.4} s: {} -> {} ({})",
            state.time,
            from,
            to,
            to.dynamics().name()
        );
        self.phase = to;
        Ok(Some(Transition {
            time: state.time,
            from,
            to,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{presets, RocketBuilder};

    fn machine(rocket: &RocketConfig) -> PhaseStateMachine {
        PhaseStateMachine::new(rocket, Tolerances::default())
    }

    #[test]
    fn initial_phase_follows_propellant() {
        let tol = Tolerances::default();
        let wet = presets::two_litre();
        assert_eq!(PhaseStateMachine::initial_phase(&wet, &tol), FlightPhase::WaterExpulsion);

        let dry = RocketBuilder::new("Dry").fill_fraction(0.0).build().unwrap();
        assert_eq!(PhaseStateMachine::initial_phase(&dry, &tol), FlightPhase::AirExpulsion);

        let flat = RocketBuilder::new("Flat").fill_fraction(0.0).gauge_pressure(0.0).build().unwrap();
        assert_eq!(PhaseStateMachine::initial_phase(&flat, &tol), FlightPhase::Ballistic);
    }

    #[test]
    fn water_depletion_switches_to_air() {
        let r = presets::two_litre();
        let mut m = machine(&r);
        let mut s = RocketState::launch(&r);
        s.pos.y = 5.0;
        s.vel.y = 20.0;
        s.water_volume = 5e-10;
        let t = m.update(&mut s, &r).unwrap().unwrap();
        assert_eq!(t.from, FlightPhase::WaterExpulsion);
        assert_eq!(t.to, FlightPhase::AirExpulsion);
        assert_eq!(s.water_volume, 0.0);
        assert!(!s.on_rail);
    }

    #[test]
    fn venting_with_water_left_goes_ballistic() {
        let r = RocketBuilder::new("Soft").fill_fraction(0.9).gauge_kpa(50.0).build().unwrap();
        let mut m = machine(&r);
        let mut s = RocketState::launch(&r);
        s.pos.y = 2.0;
        s.vel.y = 2.0;
        // expand the gas until it is below ambient
        s.water_volume = 0.5 * r.bottle_volume;
        let t = m.update(&mut s, &r).unwrap().unwrap();
        assert_eq!(t.to, FlightPhase::Ballistic);
        assert_eq!(s.pressure, r.environment.pressure);
        assert!(s.water_volume > 0.0);
    }

    #[test]
    fn landing_is_terminal() {
        let r = presets::two_litre();
        let mut m = machine(&r);
        let mut s = RocketState::launch(&r);
        s.pos.y = 10.0;
        s.vel.y = 5.0;
        m.update(&mut s, &r).unwrap();
        assert!(!s.on_rail);

        s.pos.y = -5e-5;
        s.vel.y = -10.0;
        let t = m.update(&mut s, &r).unwrap().unwrap();
        assert_eq!(t.to, FlightPhase::Landed);
        assert_eq!(s.pos.y, 0.0);
        assert!(m.update(&mut s, &r).unwrap().is_none());
    }

    #[test]
    fn overshoot_is_reported() {
        let r = presets::two_litre();
        let m = machine(&r);
        let mut s = RocketState::launch(&r);
        s.water_volume = -1e-6;
        match m.check_step(&s, &r).unwrap() {
            StepCheck::Overshot { quantity, .. } => assert_eq!(quantity, "water volume"),
            other => panic!("expected overshoot, got {other:?}"),
        }
        s.water_volume = -1e-10;
        assert_eq!(m.check_step(&s, &r).unwrap(), StepCheck::Accept);
    }

    #[test]
    fn rocket_that_never_lifts_off_lands_on_the_pad() {
        let r = RocketBuilder::new("Brick").dry_mass(50.0).gauge_kpa(10.0).build().unwrap();
        let mut m = machine(&r);
        let mut s = RocketState::launch(&r);
        s.pos.y = -0.01;
        s.vel.y = -0.5;
        assert!(m.update(&mut s, &r).unwrap().is_none());
        assert_eq!(s.pos, Vector2::zeros());
        assert!(s.on_rail);

        // all overpressure gone
        s.air_mass *= 0.01;
        s.water_volume = 0.0;
        let t = m.update(&mut s, &r).unwrap().unwrap();
        assert_eq!(t.to, FlightPhase::Landed);
    }

    #[test]
    fn rail_holds_rocket_until_cleared() {
        let r = RocketBuilder::new("Steep").launch_angle_deg(60.0).build().unwrap();
        let along = r.launch_direction();
        let mut m = machine(&r);
        let mut s = RocketState::launch(&r);

        // drifted off the rail line and already dipping
        s.pos = along * 0.4 + Vector2::new(0.0, -1e-6);
        s.vel = along * 6.0 + Vector2::new(0.0, -0.2);
        assert!(m.update(&mut s, &r).unwrap().is_none());
        assert!(s.on_rail);
        assert!((s.pos.x * along.y - s.pos.y * along.x).abs() < 1e-15);
        assert!((s.vel.x * along.y - s.vel.y * along.x).abs() < 1e-12);
        // a low, descending rocket on the rail has not landed
        assert_eq!(m.check_step(&s, &r).unwrap(), StepCheck::Accept);

        s.pos = along * 1.05;
        assert!(m.update(&mut s, &r).unwrap().is_none());
        assert!(!s.on_rail);
        assert_eq!(m.phase(), FlightPhase::WaterExpulsion);
    }

    #[test]
    fn rocket_sliding_back_down_the_rail_lands_on_the_pad() {
        let r = RocketBuilder::new("Weak").launch_angle_deg(45.0).build().unwrap();
        let mut m = machine(&r);
        let mut s = RocketState::launch(&r);
        s.pos = r.launch_direction() * 0.3;
        s.water_volume = 0.0;
        s.air_mass *= 0.01;
        // thrust is over but the rocket is still moving on the rail
        let t = m.update(&mut s, &r).unwrap().unwrap();
        assert_eq!(t.to, FlightPhase::Ballistic);

        s.pos = r.launch_direction() * -0.01;
        s.vel = r.launch_direction() * -1.0;
        let t = m.update(&mut s, &r).unwrap().unwrap();
        assert_eq!(t.to, FlightPhase::Landed);
        assert_eq!(s.pos, Vector2::zeros());
    }
}
