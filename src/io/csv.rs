use std::io::Write;
use std::path::Path;

use crate::sim::{SweepPoint, Trajectory};

/// Write trajectory samples as CSV, one row per sample.
///
/// Columns follow `TrajectorySample`: time, altitude, downrange, speed,
/// vertical_velocity, horizontal_velocity, acceleration, phase,
/// water_volume, pressure, mass, thrust. SI units throughout.
pub fn write_trajectory<W: Write>(writer: W, trajectory: &Trajectory) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for sample in trajectory {
        writer.serialize(sample)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write trajectory to a CSV file at the given path.
pub fn write_trajectory_file(path: impl AsRef<Path>, trajectory: &Trajectory) -> csv::Result<()> {
    let file = std::fs::File::create(path)?;
    write_trajectory(file, trajectory)
}

/// Write water-fraction sweep results (fraction, apogee, downrange).
pub fn write_sweep<W: Write>(writer: W, points: &[SweepPoint]) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_sweep_file(path: impl AsRef<Path>, points: &[SweepPoint]) -> csv::Result<()> {
    let file = std::fs::File::create(path)?;
    write_sweep(file, points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::FlightPhase;
    use crate::sim::{TrajectoryRecorder, TrajectorySample};

    fn sample(time: f64, altitude: f64, phase: FlightPhase) -> TrajectorySample {
        TrajectorySample {
            time,
            altitude,
            downrange: 0.0,
            speed: 12.5,
            vertical_velocity: 12.5,
            horizontal_velocity: 0.0,
            acceleration: 80.0,
            phase,
            water_volume: 6.6e-4,
            pressure: 790_325.0,
            mass: 0.77,
            thrust: 87.7,
        }
    }

    #[test]
    fn csv_output_has_header_and_rows() {
        let mut rec = TrajectoryRecorder::default();
        rec.record(sample(0.0, 0.0, FlightPhase::WaterExpulsion));
        rec.record(sample(0.001, 0.01, FlightPhase::WaterExpulsion));
        let traj = rec.finish();

        let mut buf = Vec::new();
        write_trajectory(&mut buf, &traj).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert!(lines[0].starts_with("time,altitude,downrange,speed,"));
        assert!(lines[0].ends_with(",thrust"));
        assert!(lines[1].starts_with("0.0,0.0,"));
        assert!(lines[2].contains(",WaterExpulsion,"));
    }

    #[test]
    fn sweep_rows_round_trip() {
        let points = vec![
            SweepPoint { fraction: 0.1, apogee: 150.0, downrange: 0.0 },
            SweepPoint { fraction: 0.3, apogee: 169.0, downrange: 1.5 },
        ];
        let mut buf = Vec::new();
        write_sweep(&mut buf, &points).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["fraction", "apogee", "downrange"]);
        let back: Vec<SweepPoint> = reader.deserialize::<SweepPoint>().collect::<Result<_, _>>().unwrap();
        assert_eq!(back, points);
    }
}
