use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Plot};

use rusty_dash::stats::distribution::Bucket;
use rusty_dash::stats::format::{format_fixed, is_emphasised};
use rusty_dash::stats::AnalysisReport;

use crate::color::correlation_fill;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Analysis view (central panel)
// ---------------------------------------------------------------------------

pub fn analysis_view(ui: &mut Ui, state: &mut AppState) {
    if state.dataset().is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to analyse it  (File → Open…)");
        });
        return;
    }

    // ---- Column selection ----
    ui.strong("Columns to analyse");
    if state.numeric_columns.is_empty() {
        ui.label("This dataset has no numeric columns.");
    }
    let numeric = state.numeric_columns.clone();
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for col in &numeric {
            let mut on = state.selected_columns.contains(col);
            if ui.checkbox(&mut on, col).changed() {
                state.toggle_selected_column(col);
            }
        }
    });

    if ui
        .add_enabled(state.can_analyse(), egui::Button::new("Analyse"))
        .clicked()
    {
        state.run_analysis();
    }
    ui.separator();

    let Some(report) = &state.analysis else {
        ui.label("No analysis yet.");
        return;
    };
    let precision = state.settings.display_precision;
    let strong = state.settings.strong_correlation;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Descriptive statistics");
            ui.label(format!("{} rows of {}", report.row_count, report.dataset));
            statistics_grid(ui, report, precision);
            ui.add_space(12.0);

            ui.heading("Correlation matrix");
            correlation_grid(ui, report, precision, strong);
            strong_pairs(ui, report, precision, strong);
            ui.add_space(12.0);

            if let Some(first) = report.columns.first() {
                ui.heading(format!("Distribution of {first}"));
                distribution_chart(ui, &state.distribution);
            }
        });
}

fn statistics_grid(ui: &mut Ui, report: &AnalysisReport, precision: u32) {
    if report.statistics.is_empty() {
        ui.label("No statistics available.");
        return;
    }

    egui::Grid::new("stats_grid")
        .striped(true)
        .num_columns(7)
        .spacing([16.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            for title in ["Column", "Count", "Mean", "Median", "Min", "Max", "Std dev"] {
                ui.strong(title);
            }
            ui.end_row();

            for entry in report.statistics.iter() {
                let s = &entry.stats;
                ui.label(&entry.column);
                ui.label(s.count.to_string());
                for v in [s.mean, s.median, s.min, s.max, s.std_dev] {
                    ui.label(format_fixed(v, precision));
                }
                ui.end_row();
            }
        });

    // Selected columns without any numeric value have no row above.
    let missing: Vec<&str> = report
        .columns
        .iter()
        .filter(|c| !report.statistics.contains(c))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        ui.weak(format!("No numeric values in: {}", missing.join(", ")));
    }
}

fn correlation_grid(ui: &mut Ui, report: &AnalysisReport, precision: u32, strong: f64) {
    let matrix = &report.correlation;
    if matrix.size() == 0 {
        ui.label("No correlation matrix available.");
        return;
    }

    egui::Grid::new("correlation_grid")
        .num_columns(matrix.size() + 1)
        .spacing([8.0, 4.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("");
            for col in &matrix.columns {
                ui.strong(col);
            }
            ui.end_row();

            for (i, row_name) in matrix.columns.iter().enumerate() {
                ui.strong(row_name);
                for j in 0..matrix.size() {
                    let r = matrix.get(i, j);
                    let mut text = RichText::new(format_fixed(r, precision));
                    if is_emphasised(r, strong) {
                        text = text.strong();
                    }
                    match correlation_fill(r) {
                        Some(fill) => {
                            egui::Frame::default().fill(fill).show(ui, |ui: &mut Ui| {
                                ui.label(text.color(Color32::BLACK));
                            });
                        }
                        None => {
                            ui.label(text);
                        }
                    }
                }
                ui.end_row();
            }
        });
}

fn strong_pairs(ui: &mut Ui, report: &AnalysisReport, precision: u32, strong: f64) {
    let pairs = report.correlation.strong_pairs(strong);
    if pairs.is_empty() {
        return;
    }
    ui.add_space(4.0);
    ui.strong(format!("Pairs with |r| ≥ {}", format_fixed(strong, precision)));
    for p in pairs {
        ui.label(format!(
            "{} ↔ {}: {}",
            p.first,
            p.second,
            format_fixed(p.r, precision)
        ));
    }
}

fn distribution_chart(ui: &mut Ui, buckets: &[Bucket]) {
    if buckets.is_empty() {
        ui.label("No numeric values to plot.");
        return;
    }

    let bars: Vec<Bar> = buckets
        .iter()
        .enumerate()
        .map(|(k, b)| {
            Bar::new(k as f64, b.count as f64)
                .width(0.9)
                .name(format!("{}  ({:.1}%)", b.label(), b.percentage))
        })
        .collect();

    Plot::new("distribution_plot")
        .height(240.0)
        .x_axis_label("bucket")
        .y_axis_label("count")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("count"));
        });
}
