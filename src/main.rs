use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::info;

use water_rocket_sim::dynamics::{FlightPhase, SimConfig};
use water_rocket_sim::io::{self, FlightSummary, LaunchFile};
use water_rocket_sim::sim::{self, sweep, Flight};
use water_rocket_sim::vehicle::{presets, RocketConfig};

#[derive(Parser, Debug)]
#[command(name = "water-rocket-sim", version, about = "Water rocket flight simulation", long_about = None)]
struct Args {
    /// Launch config TOML with [rocket] and [simulation] tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Built-in rocket to start from (ignored with --config)
    #[arg(short, long, default_value = "default")]
    preset: String,

    /// Bottle volume, litres
    #[arg(long)]
    bottle_volume: Option<f64>,

    /// Fraction of the bottle filled with water (0-1)
    #[arg(long)]
    water_fraction: Option<f64>,

    /// Initial gauge pressure, kPa
    #[arg(long)]
    pressure: Option<f64>,

    /// Nozzle diameter, mm
    #[arg(long)]
    nozzle_diameter: Option<f64>,

    /// Launch angle from vertical, degrees (positive tilts downrange)
    #[arg(long)]
    launch_angle: Option<f64>,

    /// Launch rail length, m
    #[arg(long)]
    rail_length: Option<f64>,

    /// Integration time step, s
    #[arg(long)]
    dt: Option<f64>,

    /// Write trajectory.csv and summary.json to the output directory
    #[arg(long)]
    save_data: bool,

    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Run a water fraction sweep instead of a single flight
    #[arg(long)]
    sweep: bool,

    /// Number of fill fractions in the sweep
    #[arg(long, default_value_t = 10)]
    n_values: usize,
}

impl Args {
    fn launch(&self) -> Result<LaunchFile> {
        let mut launch = match &self.config {
            Some(path) => io::load_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => LaunchFile {
                rocket: presets::by_name(&self.preset).ok_or_else(|| {
                    anyhow!(
                        "unknown preset '{}', expected one of {:?}",
                        self.preset,
                        presets::NAMES
                    )
                })?,
                simulation: SimConfig::default(),
            },
        };

        let rocket = &mut launch.rocket;
        if let Some(litres) = self.bottle_volume {
            rocket.bottle_volume = litres * 1e-3;
        }
        if let Some(fraction) = self.water_fraction {
            rocket.fill_fraction = fraction;
        }
        if let Some(kpa) = self.pressure {
            rocket.gauge_pressure = kpa * 1e3;
        }
        if let Some(mm) = self.nozzle_diameter {
            rocket.nozzle_diameter = mm * 1e-3;
        }
        if let Some(deg) = self.launch_angle {
            rocket.launch_angle = deg.to_radians();
        }
        if let Some(m) = self.rail_length {
            rocket.rail_length = m;
        }
        if let Some(dt) = self.dt {
            launch.simulation.dt = dt;
            launch.simulation.min_dt = launch.simulation.min_dt.min(dt);
        }

        launch.validate()?;
        Ok(launch)
    }
}

fn main() -> Result<()> {
    // Default log level to "info"
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let args = Args::parse();
    let LaunchFile { rocket, simulation } = args.launch()?;

    if args.save_data || args.sweep {
        std::fs::create_dir_all(&args.output)
            .with_context(|| format!("creating {}", args.output.display()))?;
    }

    if args.sweep {
        let points = sim::water_fraction_sweep(&rocket, &simulation, args.n_values)?;
        print_sweep(&points);
        let path = args.output.join("water_fraction_sweep.csv");
        io::csv::write_sweep_file(&path, &points)?;
        info!("Sweep written to {}", path.display());
        return Ok(());
    }

    let flight = sim::simulate(&rocket, &simulation)?;
    let summary = FlightSummary::from_flight(&flight);
    print_summary(&rocket, &flight, &summary);

    if args.save_data {
        let csv_path = args.output.join("trajectory.csv");
        io::csv::write_trajectory_file(&csv_path, &flight.trajectory)?;
        let json_path = args.output.join("summary.json");
        io::json::write_summary_file(&json_path, &rocket, &summary)?;
        info!("Saved {} and {}", csv_path.display(), json_path.display());
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Console output
// ---------------------------------------------------------------------------

fn print_summary(rocket: &RocketConfig, flight: &Flight, summary: &FlightSummary) {
    let rule = "─".repeat(66);

    println!();
    println!("====================================================================");
    println!("  WATER ROCKET SIMULATION: {}", rocket.name);
    println!("====================================================================");
    println!();
    println!("  Rocket Parameters");
    println!("  {rule}");
    println!(
        "  Bottle:        {:>8.2} L     Water fill:   {:>8.1} %",
        rocket.bottle_volume * 1e3,
        rocket.fill_fraction * 100.0
    );
    println!(
        "  Pressure:      {:>8.1} kPa   Nozzle:       {:>8.1} mm",
        rocket.gauge_pressure * 1e-3,
        rocket.nozzle_diameter * 1e3
    );
    println!(
        "  Dry mass:      {:>8.3} kg    Launch mass:  {:>8.3} kg",
        rocket.dry_mass,
        rocket.launch_mass()
    );
    println!(
        "  Cd:            {:>8.3}       Area:         {:>8.4} m^2",
        rocket.cd, rocket.frontal_area
    );
    println!(
        "  Launch angle:  {:>8.1} deg   Rail:         {:>8.2} m",
        rocket.launch_angle.to_degrees(),
        rocket.rail_length
    );
    println!("  Expansion n:   {:>8.2}", rocket.expansion.exponent());
    println!();

    println!("  Flight Events");
    println!("  {rule}");
    for t in &flight.transitions {
        let alt = flight
            .trajectory
            .iter()
            .find(|s| s.time >= t.time)
            .map_or(0.0, |s| s.altitude);
        println!(
            "  {:<7} -> {:<7} t={:>7.3}s   alt={:>8.2}m",
            t.from.label(),
            t.to.label(),
            t.time,
            alt
        );
    }
    println!();

    println!("  Performance Summary");
    println!("  {rule}");
    println!(
        "  Max altitude:  {:>8.2} m     at t={:.2} s",
        summary.apogee_m, summary.apogee_time_s
    );
    println!(
        "  Max speed:     {:>8.2} m/s   at t={:.2} s",
        summary.max_speed_ms, summary.max_speed_time_s
    );
    println!(
        "  Max accel:     {:>8.1} m/s^2 ({:.1} g) at t={:.3} s",
        summary.max_accel_ms2,
        summary.max_accel_ms2 / rocket.environment.gravity,
        summary.max_accel_time_s
    );
    match summary.water_expulsion_time_s {
        Some(t) => println!("  Water out:     {:>8.3} s", t),
        None => println!("  Water out:          n/a"),
    }
    println!("  Flight time:   {:>8.2} s", summary.flight_time_s);
    println!("  Downrange:     {:>8.2} m", summary.downrange_m);
    println!("  Impact speed:  {:>8.2} m/s", summary.impact_speed_ms);
    println!();

    print_table(flight);

    println!(
        "  Simulation: {} samples, ended {}",
        flight.trajectory.len(),
        flight.final_phase().unwrap_or(FlightPhase::Landed)
    );
    println!("====================================================================");
    println!();
}

fn print_table(flight: &Flight) {
    let samples = flight.trajectory.samples();
    if samples.is_empty() {
        return;
    }

    println!("  Trajectory");
    println!("  {}", "─".repeat(66));
    println!(
        "  {:>7}  {:>8}  {:>8}  {:>9}  {:>9}  {:>7}",
        "t (s)", "alt (m)", "x (m)", "vel (m/s)", "p (kPa)", "phase"
    );
    println!("  {}", "─".repeat(60));

    let every = (samples.len() / 30).max(1);
    for (i, s) in samples.iter().enumerate() {
        let phase_change = i > 0 && samples[i - 1].phase != s.phase;
        if !(i % every == 0 || phase_change || i == samples.len() - 1) {
            continue;
        }
        println!(
            "  {:>7.3}  {:>8.2}  {:>8.2}  {:>9.2}  {:>9.1}  {:>7}",
            s.time,
            s.altitude,
            s.downrange,
            s.speed,
            s.pressure * 1e-3,
            s.phase.label()
        );
    }
    println!();
}

fn print_sweep(points: &[sweep::SweepPoint]) {
    println!();
    println!("  Water Fraction Sweep");
    println!("  {}", "─".repeat(44));
    println!("  {:>8}  {:>14}  {:>14}", "fill %", "apogee (m)", "downrange (m)");
    for p in points {
        println!(
            "  {:>8.1}  {:>14.2}  {:>14.2}",
            p.fraction * 100.0,
            p.apogee,
            p.downrange
        );
    }
    if let Some(top) = sweep::best(points) {
        println!();
        println!("  Best fill: {:.1} % ({:.2} m)", top.fraction * 100.0, top.apogee);
    }
    println!();
}
