use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dynamics::FlightPhase;
use crate::sim::{EventKind, Flight};
use crate::vehicle::RocketConfig;

/// Summary statistics computed from a flight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlightSummary {
    pub apogee_m: f64,
    pub apogee_time_s: f64,
    pub max_speed_ms: f64,
    pub max_speed_time_s: f64,
    pub max_accel_ms2: f64,
    pub max_accel_time_s: f64,
    /// Time the last water left the nozzle, if it ever did.
    pub water_expulsion_time_s: Option<f64>,
    /// Time thrust ended, if it ever did.
    pub burnout_time_s: Option<f64>,
    pub flight_time_s: f64,
    pub downrange_m: f64,
    pub impact_speed_ms: f64,
}

impl FlightSummary {
    pub fn from_flight(flight: &Flight) -> Self {
        let traj = &flight.trajectory;
        let (Some(first), Some(last)) = (traj.first(), traj.last()) else {
            return Self::default();
        };

        let apogee = traj.apogee().unwrap_or(first);
        let fastest = traj
            .iter()
            .max_by(|a, b| a.speed.total_cmp(&b.speed))
            .unwrap_or(first);
        let hardest = traj
            .iter()
            .max_by(|a, b| a.acceleration.total_cmp(&b.acceleration))
            .unwrap_or(first);

        let water_expulsion_time_s = flight
            .event(EventKind::WaterDepleted)
            .map(|e| e.time)
            .or_else(|| traj.phase_start(FlightPhase::AirExpulsion));
        let burnout_time_s = flight
            .event(EventKind::Burnout)
            .map(|e| e.time)
            .or_else(|| traj.phase_start(FlightPhase::Ballistic));

        FlightSummary {
            apogee_m: apogee.altitude,
            apogee_time_s: apogee.time,
            max_speed_ms: fastest.speed,
            max_speed_time_s: fastest.time,
            max_accel_ms2: hardest.acceleration,
            max_accel_time_s: hardest.time,
            water_expulsion_time_s,
            burnout_time_s,
            flight_time_s: last.time,
            downrange_m: last.downrange,
            impact_speed_ms: last.speed,
        }
    }
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    rocket: &'a RocketConfig,
    performance: &'a FlightSummary,
}

/// Write the rocket parameters and flight summary as pretty JSON.
pub fn write_summary<W: Write>(
    writer: W,
    rocket: &RocketConfig,
    summary: &FlightSummary,
) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(
        writer,
        &SummaryReport {
            rocket,
            performance: summary,
        },
    )
}

/// Write flight summary JSON to a file.
pub fn write_summary_file(
    path: impl AsRef<Path>,
    rocket: &RocketConfig,
    summary: &FlightSummary,
) -> serde_json::Result<()> {
    let file = std::fs::File::create(path).map_err(serde_json::Error::io)?;
    write_summary(file, rocket, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::SimConfig;
    use crate::sim::simulate;
    use crate::vehicle::presets;

    #[test]
    fn summary_orders_flight_milestones() {
        let flight = simulate(&presets::two_litre(), &SimConfig::default()).unwrap();
        let s = FlightSummary::from_flight(&flight);

        let water = s.water_expulsion_time_s.unwrap();
        let burnout = s.burnout_time_s.unwrap();
        assert!(water > 0.0 && water < burnout);
        assert!(burnout < s.apogee_time_s);
        assert!(s.apogee_time_s < s.flight_time_s);
        // peak speed is reached under thrust
        assert!(s.max_speed_time_s <= burnout + 1e-9);
        assert!(s.max_accel_ms2 > 9.81);
        assert!(s.impact_speed_ms > 0.0);
    }

    #[test]
    fn empty_flight_gives_zero_summary() {
        let flight = Flight {
            trajectory: Default::default(),
            events: vec![],
            transitions: vec![],
        };
        assert_eq!(FlightSummary::from_flight(&flight), FlightSummary::default());
    }

    #[test]
    fn json_output_is_valid() {
        let rocket = presets::two_litre();
        let flight = simulate(&rocket, &SimConfig::default()).unwrap();
        let summary = FlightSummary::from_flight(&flight);

        let mut buf = Vec::new();
        write_summary(&mut buf, &rocket, &summary).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["rocket"]["name"], rocket.name.as_str());
        assert!(value["performance"]["apogee_m"].as_f64().unwrap() > 0.0);

        let back: FlightSummary = serde_json::from_value(value["performance"].clone()).unwrap();
        assert_eq!(back, summary);
    }
}
