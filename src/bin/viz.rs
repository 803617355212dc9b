use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};

use water_rocket_sim::dynamics::SimConfig;
use water_rocket_sim::sim::{self, Flight, TrajectorySample};
use water_rocket_sim::vehicle::{presets, RocketConfig};

fn main() -> eframe::Result {
    pretty_env_logger::init();

    let name = std::env::args().nth(1).unwrap_or_else(|| "default".into());
    let rocket = presets::by_name(&name).unwrap_or_else(presets::standard);
    let config = SimConfig {
        sample_interval: 0.002,
        ..SimConfig::default()
    };
    let flight = match sim::simulate(&rocket, &config) {
        Ok(flight) => flight,
        Err(e) => {
            eprintln!("simulation failed: {e}");
            std::process::exit(1);
        }
    };

    let app = SimViz { flight, rocket };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Water Rocket Simulator", options, Box::new(|_| Ok(Box::new(app))))
}

struct SimViz {
    flight: Flight,
    rocket: RocketConfig,
}

impl SimViz {
    fn series(&self, f: impl Fn(&TrajectorySample) -> [f64; 2]) -> Vec<[f64; 2]> {
        self.flight.trajectory.iter().map(f).collect()
    }

    fn phase_summary(&self) -> String {
        self.flight
            .transitions
            .iter()
            .map(|t| format!("{} @ {:.3} s", t.to.label(), t.time))
            .collect::<Vec<_>>()
            .join("  ->  ")
    }
}

impl eframe::App for SimViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Rocket: {}", self.rocket.name));
            let max_v = self.flight.trajectory.iter().map(|s| s.speed).fold(0.0_f64, f64::max);
            ui.label(format!(
                "Apogee: {:.1} m  |  Max speed: {:.1} m/s  |  Fill: {:.0} %  |  {:.0} kPa  |  Flight: {:.2} s",
                self.flight.apogee(),
                max_v,
                self.rocket.fill_fraction * 100.0,
                self.rocket.gauge_pressure * 1e-3,
                self.flight.flight_time(),
            ));
            ui.label(self.phase_summary());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Altitude (m)");
                    let points = PlotPoints::from(self.series(|s| [s.time, s.altitude]));
                    Plot::new("altitude")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Altitude", points));
                        });
                });

                ui.vertical(|ui| {
                    ui.label("Speed (m/s)");
                    let points = PlotPoints::from(self.series(|s| [s.time, s.speed]));
                    Plot::new("speed")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Speed", points));
                        });
                });
            });

            ui.horizontal(|ui| {
                ui.vertical(|ui| {
                    ui.label("Bottle Pressure (kPa, absolute)");
                    let points = PlotPoints::from(self.series(|s| [s.time, s.pressure * 1e-3]));
                    Plot::new("pressure")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Pressure", points));
                        });
                });

                ui.vertical(|ui| {
                    ui.label("Trajectory Profile (m)");
                    let points = PlotPoints::from(self.series(|s| [s.downrange, s.altitude]));
                    Plot::new("profile")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Downrange (m)")
                        .data_aspect(1.0)
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Trajectory", points));
                        });
                });
            });
        });
    }
}
