use crate::dynamics::{FlightPhase, RocketState};
use crate::sim::phase_machine::Transition;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

/// Kinds of simulation events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Liftoff,
    WaterDepleted,
    Burnout,
    Apogee,
    Landing,
}

impl EventKind {
    /// Event marking a phase transition.
    pub fn from_transition(transition: &Transition) -> Option<EventKind> {
        match transition.to {
            FlightPhase::AirExpulsion => Some(EventKind::WaterDepleted),
            FlightPhase::Ballistic => Some(EventKind::Burnout),
            FlightPhase::Landed => Some(EventKind::Landing),
            FlightPhase::WaterExpulsion => None,
        }
    }
}

/// A discrete event that occurred during simulation.
#[derive(Debug, Clone)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
    pub state: RocketState,
}

/// Trait for passive event detectors.
/// Implementations inspect consecutive states and report events.
pub trait EventDetector {
    fn check(&mut self, prev: &RocketState, current: &RocketState) -> Option<EventKind>;
}

/// Detects apogee (vertical velocity going from positive to non-positive).
#[derive(Debug, Default)]
pub struct ApogeeDetector {
    fired: bool,
}

impl EventDetector for ApogeeDetector {
    fn check(&mut self, prev: &RocketState, current: &RocketState) -> Option<EventKind> {
        if !self.fired && prev.vel.y > 0.0 && current.vel.y <= 0.0 && current.altitude() > 0.0 {
            self.fired = true;
            Some(EventKind::Apogee)
        } else {
            None
        }
    }
}

/// Detects the rocket leaving the pad.
#[derive(Debug, Default)]
pub struct LiftoffDetector {
    fired: bool,
}

impl EventDetector for LiftoffDetector {
    fn check(&mut self, prev: &RocketState, current: &RocketState) -> Option<EventKind> {
        if !self.fired && prev.altitude() <= 0.0 && current.altitude() > 0.0 {
            self.fired = true;
            Some(EventKind::Liftoff)
        } else {
            None
        }
    }
}
