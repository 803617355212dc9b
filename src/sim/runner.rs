use log::{debug, info};

use crate::dynamics::{self, FlightPhase, RocketState, SimConfig};
use crate::error::{SimError, SimResult};
use crate::sim::event::{ApogeeDetector, EventDetector, EventKind, LiftoffDetector, SimEvent};
use crate::sim::integrator::rk4_step;
use crate::sim::phase_machine::{PhaseStateMachine, StepCheck, Transition};
use crate::sim::recorder::{Trajectory, TrajectoryRecorder, TrajectorySample};
use crate::vehicle::RocketConfig;

// ---------------------------------------------------------------------------
// Result of a run
// ---------------------------------------------------------------------------

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct Flight {
    pub trajectory: Trajectory,
    pub events: Vec<SimEvent>,
    pub transitions: Vec<Transition>,
}

impl Flight {
    /// First event of the given kind.
    pub fn event(&self, kind: EventKind) -> Option<&SimEvent> {
        self.events.iter().find(|e| e.kind == kind)
    }

    /// Maximum recorded altitude, m.
    pub fn apogee(&self) -> f64 {
        self.trajectory.apogee().map_or(0.0, |s| s.altitude)
    }

    /// Time at which the flight ended, s.
    pub fn flight_time(&self) -> f64 {
        self.trajectory.last().map_or(0.0, |s| s.time)
    }

    /// Phase of the last recorded sample.
    pub fn final_phase(&self) -> Option<FlightPhase> {
        self.trajectory.last().map(|s| s.phase)
    }
}

// ---------------------------------------------------------------------------
// Full flight simulation
// ---------------------------------------------------------------------------

fn sample(state: &RocketState, phase: FlightPhase, rocket: &RocketConfig) -> SimResult<TrajectorySample> {
    let forces = dynamics::forces(state, phase, rocket)?;
    Ok(TrajectorySample::new(state, phase, &forces))
}

/// Run one flight from the pad until it lands.
///
/// Steps are `config.dt` long except near a phase boundary or the ground,
/// where a trial step that overshoots by more than the tolerance is halved
/// down to `config.min_dt`.
pub fn simulate(rocket: &RocketConfig, config: &SimConfig) -> SimResult<Flight> {
    rocket.validate()?;
    config.validate()?;

    let mut machine = PhaseStateMachine::new(rocket, config.tolerances);
    let mut state = RocketState::launch(rocket);
    if !machine.phase().is_powered() {
        state.pressure = rocket.environment.pressure;
    }

    info!(
        "Simulating {} ({}): dt={} s, max {} s",
        rocket.name,
        machine.phase(),
        config.dt,
        config.max_time
    );

    let per_sample = if config.sample_interval > 0.0 {
        config.sample_interval
    } else {
        config.dt
    };
    let capacity = (config.max_time / per_sample) as usize + 1;
    let mut recorder = TrajectoryRecorder::new(config.sample_interval, capacity.min(100_000));
    recorder.record(sample(&state, machine.phase(), rocket)?);

    let mut detectors: Vec<Box<dyn EventDetector>> = vec![
        Box::new(LiftoffDetector::default()),
        Box::new(ApogeeDetector::default()),
    ];
    let mut events = Vec::new();
    let mut transitions = Vec::new();

    while !machine.phase().is_terminal() {
        if state.time >= config.max_time - config.min_dt {
            return Err(SimError::MaxDurationExceeded {
                max_time: config.max_time,
            });
        }

        let phase = machine.phase();
        let mut h = config.dt.min(config.max_time - state.time);
        let mut next = loop {
            let trial = rk4_step(&state, phase, rocket, h)?;
            match machine.check_step(&trial, rocket)? {
                StepCheck::Accept => break trial,
                StepCheck::Overshot { quantity, excess } => {
                    if h * 0.5 < config.min_dt {
                        debug!(
                            "t={:.6} s: accepting {quantity} overshoot of {excess:.3e} at minimum step",
                            trial.time
                        );
                        break trial;
                    }
                    h *= 0.5;
                }
            }
        };

        let transition = machine.update(&mut next, rocket)?;

        for detector in detectors.iter_mut() {
            if let Some(kind) = detector.check(&state, &next) {
                debug!("t={:.4} s: {:?} at {:.2} m", next.time, kind, next.altitude());
                events.push(SimEvent {
                    time: next.time,
                    kind,
                    state: next.clone(),
                });
            }
        }

        let s = sample(&next, machine.phase(), rocket)?;
        match transition {
            Some(t) => {
                if let Some(kind) = EventKind::from_transition(&t) {
                    events.push(SimEvent {
                        time: t.time,
                        kind,
                        state: next.clone(),
                    });
                }
                transitions.push(t);
                recorder.record(s);
            }
            None => {
                recorder.offer(s);
            }
        }

        state = next;
    }

    let flight = Flight {
        trajectory: recorder.finish(),
        events,
        transitions,
    };

    info!(
        "{} landed at t={:.2} s, apogee {:.2} m, {} samples",
        rocket.name,
        flight.flight_time(),
        flight.apogee(),
        flight.trajectory.len()
    );

    Ok(flight)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Environment;
    use crate::vehicle::{presets, RocketBuilder, RocketConfig};

    #[test]
    fn two_litre_goes_through_every_phase() {
        let flight = simulate(&presets::two_litre(), &SimConfig::default()).unwrap();
        let phases: Vec<FlightPhase> = flight.transitions.iter().map(|t| t.to).collect();
        assert_eq!(
            phases,
            vec![FlightPhase::AirExpulsion, FlightPhase::Ballistic, FlightPhase::Landed]
        );
        assert_eq!(flight.final_phase(), Some(FlightPhase::Landed));
        assert!(flight.event(EventKind::Liftoff).is_some());
        assert!(flight.event(EventKind::Apogee).is_some());
    }

    #[test]
    fn rocket_returns_to_ground() {
        let flight = simulate(&presets::standard(), &SimConfig::default()).unwrap();
        let last = flight.trajectory.last().unwrap();
        assert_eq!(last.altitude, 0.0);
        assert!(last.vertical_velocity < 0.0);
        assert!(last.downrange > 0.0, "10 degree launch should drift downrange");
        assert!(flight.apogee() > 10.0);
    }

    #[test]
    fn sampling_interval_thins_the_record() {
        let every = simulate(&presets::two_litre(), &SimConfig::default()).unwrap();
        let config = SimConfig {
            sample_interval: 0.1,
            ..SimConfig::default()
        };
        let thinned = simulate(&presets::two_litre(), &config).unwrap();
        assert!(thinned.trajectory.len() < every.trajectory.len() / 10);
        assert_eq!(thinned.final_phase(), Some(FlightPhase::Landed));
        // transitions are always kept
        assert!(thinned.trajectory.phase_start(FlightPhase::AirExpulsion).is_some());
    }

    #[test]
    fn too_short_duration_fails() {
        let config = SimConfig {
            max_time: 0.5,
            ..SimConfig::default()
        };
        let err = simulate(&presets::two_litre(), &config).unwrap_err();
        assert_eq!(err, SimError::MaxDurationExceeded { max_time: 0.5 });
    }

    #[test]
    fn invalid_rocket_fails_before_flight() {
        let mut rocket = presets::two_litre();
        rocket.fill_fraction = 1.2;
        let err = simulate(&rocket, &SimConfig::default()).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration(_)));
    }

    #[test]
    fn underpowered_rocket_stays_on_pad() {
        let rocket = RocketBuilder::new("Brick").dry_mass(20.0).gauge_kpa(20.0).build().unwrap();
        let flight = simulate(&rocket, &SimConfig::default()).unwrap();
        assert_eq!(flight.final_phase(), Some(FlightPhase::Landed));
        assert_eq!(flight.apogee(), 0.0);
        assert!(flight.event(EventKind::Liftoff).is_none());
    }

    #[test]
    fn overflowing_air_jet_is_reported() {
        // absurdly cold air packs so much mass into the bottle that the
        // choked mass flow overflows once the water is gone
        let rocket = RocketConfig {
            environment: Environment {
                temperature: 1e-300,
                ..Environment::default()
            },
            ..presets::standard()
        };
        let err = simulate(&rocket, &SimConfig::default()).unwrap_err();
        match err {
            SimError::NumericalInstability { time, .. } => assert!(time > 0.1 && time < 1.0, "t={time}"),
            other => panic!("expected numerical instability, got {other:?}"),
        }
    }
}
