use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};
use nalgebra::Vector2;

use deltav_sim::config::SimSettings;
use deltav_sim::io::velocity_string;
use deltav_sim::sim::{self, BurnReport};
use deltav_sim::vehicle::{presets, VehicleSnapshot};

fn main() -> eframe::Result {
    let name = std::env::args().nth(1).unwrap_or_else(|| "booster-lander".to_string());
    let vehicle = presets::by_name(&name).unwrap_or_else(|| {
        eprintln!("unknown preset '{name}', using booster-lander");
        presets::booster_lander()
    });
    let report = sim::analyze(&vehicle, &SimSettings::default());

    let app = BurnViz { report, vehicle };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Delta-V Burn Phases", options, Box::new(|_| Ok(Box::new(app))))
}

struct BurnViz {
    report: BurnReport,
    vehicle: VehicleSnapshot,
}

impl BurnViz {
    /// Two points per phase so piecewise-constant values draw as steps.
    fn steps(&self, value: impl Fn(usize) -> f64) -> Vec<[f64; 2]> {
        self.report
            .phases
            .iter()
            .enumerate()
            .flat_map(|(i, p)| {
                let v = value(i);
                [[p.start_time, v], [p.start_time + p.duration, v]]
            })
            .collect()
    }
}

impl eframe::App for BurnViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let phases = &self.report.phases;

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Vehicle: {}", self.vehicle.name));
            ui.label(format!(
                "ΔV: {}  |  Burn: {:.1} s  |  Phases: {}  |  Propellant: {:.3}",
                velocity_string(self.report.magnitude()),
                self.report.burn_time(),
                phases.len(),
                self.report.propellant_used(),
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let half_h = available.y / 2.0 - 8.0;

            ui.horizontal(|ui| {
                // Mass vs Time
                ui.vertical(|ui| {
                    ui.label("Mass");
                    let mut points: Vec<[f64; 2]> = phases
                        .iter()
                        .map(|p| [p.start_time, p.mass_before])
                        .collect();
                    if let Some(last) = phases.last() {
                        points.push([last.start_time + last.duration, last.mass_after]);
                    }
                    Plot::new("mass")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Mass", PlotPoints::from(points)));
                        });
                });

                // Cumulative delta-V vs Time
                ui.vertical(|ui| {
                    ui.label("Delta-V (m/s)");
                    let mut acc = Vector2::<f64>::zeros();
                    let mut points = vec![[0.0, 0.0]];
                    for p in phases {
                        acc += p.delta_v_vector();
                        points.push([p.start_time + p.duration, acc.norm()]);
                    }
                    Plot::new("delta_v")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("ΔV", PlotPoints::from(points)));
                        });
                });
            });

            ui.horizontal(|ui| {
                // Effective isp per phase
                ui.vertical(|ui| {
                    ui.label("Effective Isp (s)");
                    let points = self.steps(|i| phases[i].global_isp);
                    Plot::new("isp")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Isp", PlotPoints::from(points)));
                        });
                });

                // Thrust alignment per phase
                ui.vertical(|ui| {
                    ui.label("Thrust Alignment");
                    let points = self.steps(|i| phases[i].direction.norm());
                    Plot::new("alignment")
                        .width(half_w)
                        .height(half_h)
                        .x_axis_label("Time (s)")
                        .include_y(0.0)
                        .include_y(1.0)
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("|d|", PlotPoints::from(points)));
                        });
                });
            });
        });
    }
}
