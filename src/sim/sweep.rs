use log::info;
use serde::{Deserialize, Serialize};

use crate::dynamics::SimConfig;
use crate::error::{SimError, SimResult};
use crate::sim::runner::simulate;
use crate::vehicle::RocketConfig;

// ---------------------------------------------------------------------------
// Water-fraction sweep
// ---------------------------------------------------------------------------

pub const MIN_FRACTION: f64 = 0.1;
pub const MAX_FRACTION: f64 = 0.9;

/// Outcome of one fill level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub fraction: f64,
    pub apogee: f64,    // m
    pub downrange: f64, // m, at landing
}

/// Fill fractions evenly spaced over [0.1, 0.9].
pub fn fractions(n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![0.5 * (MIN_FRACTION + MAX_FRACTION)],
        _ => {
            let step = (MAX_FRACTION - MIN_FRACTION) / (n - 1) as f64;
            (0..n).map(|i| MIN_FRACTION + step * i as f64).collect()
        }
    }
}

/// Fly the same rocket with `n` different fill levels.
///
/// Everything except `fill_fraction` is taken from `rocket`. The first
/// failing run aborts the sweep.
pub fn water_fraction_sweep(
    rocket: &RocketConfig,
    config: &SimConfig,
    n: usize,
) -> SimResult<Vec<SweepPoint>> {
    if n == 0 {
        return Err(SimError::invalid("sweep needs at least one fill level"));
    }

    info!("Sweeping {} fill fractions for {}", n, rocket.name);

    fractions(n)
        .into_iter()
        .map(|fraction| {
            let variant = RocketConfig {
                fill_fraction: fraction,
                ..rocket.clone()
            };
            let flight = simulate(&variant, config)?;
            let downrange = flight.trajectory.last().map_or(0.0, |s| s.downrange);
            info!(
                "  fill {:.3}: apogee {:.2} m, downrange {:.2} m",
                fraction,
                flight.apogee(),
                downrange
            );
            Ok(SweepPoint {
                fraction,
                apogee: flight.apogee(),
                downrange,
            })
        })
        .collect()
}

/// Point with the highest apogee.
pub fn best(points: &[SweepPoint]) -> Option<&SweepPoint> {
    points.iter().max_by(|a, b| a.apogee.total_cmp(&b.apogee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::presets;
    use approx::assert_relative_eq;

    #[test]
    fn fractions_span_the_range() {
        let f = fractions(5);
        assert_eq!(f.len(), 5);
        assert_relative_eq!(f[0], 0.1);
        assert_relative_eq!(f[2], 0.5);
        assert_relative_eq!(f[4], 0.9);
        assert_eq!(fractions(1), vec![0.5]);
        assert!(fractions(0).is_empty());
    }

    #[test]
    fn sweep_finds_an_interior_optimum() {
        let config = SimConfig {
            dt: 2e-3,
            sample_interval: 0.05,
            ..SimConfig::default()
        };
        let points = water_fraction_sweep(&presets::two_litre(), &config, 5).unwrap();
        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|p| p.apogee > 0.0));

        // Too little water wastes the air, too much leaves no room for it.
        let top = best(&points).unwrap();
        assert!(top.fraction > 0.1 && top.fraction < 0.9, "best fill {}", top.fraction);
    }

    #[test]
    fn empty_sweep_is_rejected() {
        let err = water_fraction_sweep(&presets::two_litre(), &SimConfig::default(), 0).unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration(_)));
    }
}
