use serde::{Deserialize, Serialize};

use crate::dynamics::{FlightPhase, Forces, RocketState};

// ---------------------------------------------------------------------------
// Trajectory samples
// ---------------------------------------------------------------------------

/// One recorded point of the flight. Plain data for export and plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    pub time: f64,                // s
    pub altitude: f64,            // m
    pub downrange: f64,           // m
    pub speed: f64,               // m/s
    pub vertical_velocity: f64,   // m/s
    pub horizontal_velocity: f64, // m/s
    pub acceleration: f64,        // m/s^2, magnitude
    pub phase: FlightPhase,
    pub water_volume: f64,        // m^3
    pub pressure: f64,            // Pa, absolute
    pub mass: f64,                // kg
    pub thrust: f64,              // N
}

impl TrajectorySample {
    pub fn new(state: &RocketState, phase: FlightPhase, forces: &Forces) -> Self {
        Self {
            time: state.time,
            altitude: state.altitude(),
            downrange: state.downrange(),
            speed: state.speed(),
            vertical_velocity: state.vel.y,
            horizontal_velocity: state.vel.x,
            acceleration: forces.acceleration().norm(),
            phase,
            water_volume: state.water(),
            pressure: state.pressure,
            mass: forces.mass,
            thrust: forces.propulsion.thrust,
        }
    }
}

// ---------------------------------------------------------------------------
// Recorder: append-only while the run is in progress
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct TrajectoryRecorder {
    samples: Vec<TrajectorySample>,
    interval: f64,
    last_time: Option<f64>,
}

impl TrajectoryRecorder {
    /// Recorder keeping one sample per `interval` seconds (0 keeps all).
    pub fn new(interval: f64, capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            interval: interval.max(0.0),
            last_time: None,
        }
    }

    /// Append unconditionally.
    pub fn record(&mut self, sample: TrajectorySample) {
        self.last_time = Some(sample.time);
        self.samples.push(sample);
    }

    /// Append if the sampling interval has elapsed. Returns whether it was kept.
    pub fn offer(&mut self, sample: TrajectorySample) -> bool {
        let due = match self.last_time {
            Some(t) => sample.time - t >= self.interval - 1e-12,
            None => true,
        };
        if due {
            self.record(sample);
        }
        due
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Freeze the recording.
    pub fn finish(self) -> Trajectory {
        Trajectory {
            samples: self.samples,
        }
    }
}

// ---------------------------------------------------------------------------
// Trajectory: read-only result of a run
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    samples: Vec<TrajectorySample>,
}

impl Trajectory {
    pub fn samples(&self) -> &[TrajectorySample] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectorySample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn first(&self) -> Option<&TrajectorySample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&TrajectorySample> {
        self.samples.last()
    }

    /// Highest recorded sample.
    pub fn apogee(&self) -> Option<&TrajectorySample> {
        self.samples
            .iter()
            .max_by(|a, b| a.altitude.total_cmp(&b.altitude))
    }

    /// Time of the first sample recorded in `phase`.
    pub fn phase_start(&self, phase: FlightPhase) -> Option<f64> {
        self.samples.iter().find(|s| s.phase == phase).map(|s| s.time)
    }

    /// Samples recorded in `phase`, in time order.
    pub fn in_phase(&self, phase: FlightPhase) -> impl Iterator<Item = &TrajectorySample> {
        self.samples.iter().filter(move |s| s.phase == phase)
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectorySample;
    type IntoIter = std::slice::Iter<'a, TrajectorySample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
