use std::f32::consts::TAU;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use rusty_dash::chart::{ChartConfig, ChartKind, PieSlice, build_series, pie_slices};

use crate::color::generate_palette;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Charts view (central panel)
// ---------------------------------------------------------------------------

/// Chart configuration controls followed by the chart itself.
pub fn chart_view(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset() else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to build charts  (File → Open…)");
        });
        return;
    };
    let all_columns = dataset.column_names.clone();
    let numeric_columns = state.numeric_columns.clone();

    chart_controls(ui, &mut state.chart, &all_columns, &numeric_columns);
    ui.separator();

    if !state.chart.title.is_empty() {
        ui.heading(&state.chart.title);
    }

    // Charts are fed the same capped preview as the data table.
    let rows = state.visible_rows().take(state.settings.preview_rows);
    let config = &state.chart;

    match config.kind {
        ChartKind::Bar | ChartKind::Line => xy_plot(ui, rows, config),
        ChartKind::Pie => {
            let (Some(name_col), Some(value_col)) =
                (config.x_column.as_deref(), config.y_columns.first())
            else {
                ui.label("Pick a category column and a value column.");
                return;
            };
            let slices = pie_slices(rows, name_col, value_col);
            pie_chart(ui, &slices, config);
        }
    }
}

fn chart_controls(
    ui: &mut Ui,
    chart: &mut ChartConfig,
    all_columns: &[String],
    numeric_columns: &[String],
) {
    egui::Grid::new("chart_controls")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Title");
            ui.text_edit_singleline(&mut chart.title);
            ui.end_row();

            ui.label("Type");
            ui.horizontal(|ui: &mut Ui| {
                for kind in ChartKind::ALL {
                    ui.selectable_value(&mut chart.kind, kind, kind.label());
                }
            });
            ui.end_row();

            let x_label = if chart.kind == ChartKind::Pie { "Category" } else { "X axis" };
            ui.label(x_label);
            let current = chart.x_column.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("chart_x")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for col in all_columns {
                        if ui.selectable_label(current == *col, col).clicked() {
                            chart.x_column = Some(col.clone());
                        }
                    }
                });
            ui.end_row();

            ui.label(if chart.kind == ChartKind::Pie { "Value" } else { "Series" });
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for col in numeric_columns {
                    let mut on = chart.y_columns.contains(col);
                    if ui.checkbox(&mut on, col).changed() {
                        chart.toggle_series(col);
                    }
                }
            });
            ui.end_row();

            ui.label("Options");
            ui.horizontal(|ui: &mut Ui| {
                let opts = &mut chart.options;
                match chart.kind {
                    ChartKind::Bar => {
                        ui.checkbox(&mut opts.stacked, "Stacked");
                        ui.checkbox(&mut opts.horizontal, "Horizontal");
                    }
                    ChartKind::Line => {}
                    ChartKind::Pie => {
                        ui.checkbox(&mut opts.donut, "Donut");
                    }
                }
                ui.checkbox(&mut opts.show_labels, "Labels");
            });
            ui.end_row();
        });
}

// ---------------------------------------------------------------------------
// Bar / line
// ---------------------------------------------------------------------------

fn xy_plot<'a, I>(ui: &mut Ui, rows: I, config: &ChartConfig)
where
    I: Iterator<Item = &'a rusty_dash::data::model::Row> + Clone,
{
    let series = build_series(rows, config);
    if series.is_empty() {
        ui.label("Select at least one numeric series.");
        return;
    }
    let palette = generate_palette(series.len());
    let x_label = config.x_column.clone().unwrap_or_else(|| "row".into());

    Plot::new("chart_plot")
        .legend(Legend::default())
        .x_axis_label(x_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| match config.kind {
            ChartKind::Line => {
                for (s, &color) in series.iter().zip(&palette) {
                    let points: PlotPoints = s.points.iter().map(|p| [p.x, p.y]).collect();
                    plot_ui.line(Line::new(points).name(&s.name).color(color).width(1.5));
                    if config.options.show_labels {
                        let marks: PlotPoints = s.points.iter().map(|p| [p.x, p.y]).collect();
                        plot_ui.points(Points::new(marks).color(color).radius(3.0));
                    }
                }
            }
            _ => {
                let n = series.len() as f64;
                // Side-by-side bars share one unit of x; stacked bars use it whole.
                let width = if config.options.stacked { 0.8 } else { 0.8 / n };
                let mut charts: Vec<BarChart> = Vec::with_capacity(series.len());

                for (k, (s, &color)) in series.iter().zip(&palette).enumerate() {
                    let offset = if config.options.stacked {
                        0.0
                    } else {
                        (k as f64 - (n - 1.0) / 2.0) * width
                    };
                    let bars: Vec<Bar> = s
                        .points
                        .iter()
                        .map(|p| {
                            Bar::new(p.x + offset, p.y)
                                .width(width)
                                .name(format!("{}: {}", p.label, p.y))
                        })
                        .collect();

                    let mut chart = BarChart::new(bars).name(&s.name).color(color);
                    if config.options.horizontal {
                        chart = chart.horizontal();
                    }
                    if config.options.stacked {
                        let below: Vec<&BarChart> = charts.iter().collect();
                        chart = chart.stack_on(&below);
                    }
                    charts.push(chart);
                }

                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Pie
// ---------------------------------------------------------------------------

/// Arc segments per full turn; every slice is a fan of small triangles.
const PIE_SEGMENTS: f32 = 128.0;

fn pie_chart(ui: &mut Ui, slices: &[PieSlice], config: &ChartConfig) {
    if slices.is_empty() {
        ui.label("No positive values to show.");
        return;
    }
    let palette = generate_palette(slices.len());

    ui.horizontal(|ui: &mut Ui| {
        let side = ui.available_height().min(ui.available_width() * 0.6).max(120.0);
        let (response, painter) =
            ui.allocate_painter(egui::vec2(side, side), egui::Sense::hover());
        let center = response.rect.center();
        let radius = side * 0.45;

        let mut start = -TAU / 4.0;
        for (slice, &color) in slices.iter().zip(&palette) {
            let sweep = slice.fraction as f32 * TAU;
            let steps = ((sweep / TAU) * PIE_SEGMENTS).ceil().max(1.0) as usize;
            let point_at = |angle: f32| center + radius * egui::vec2(angle.cos(), angle.sin());

            for s in 0..steps {
                let a0 = start + sweep * s as f32 / steps as f32;
                let a1 = start + sweep * (s + 1) as f32 / steps as f32;
                painter.add(egui::Shape::convex_polygon(
                    vec![center, point_at(a0), point_at(a1)],
                    color,
                    egui::Stroke::NONE,
                ));
            }

            if config.options.show_labels {
                let mid = start + sweep / 2.0;
                let label_pos = center + radius * 0.75 * egui::vec2(mid.cos(), mid.sin());
                painter.text(
                    label_pos,
                    egui::Align2::CENTER_CENTER,
                    format!("{:.1}%", slice.fraction * 100.0),
                    egui::FontId::proportional(12.0),
                    Color32::BLACK,
                );
            }
            start += sweep;
        }

        if config.options.donut {
            painter.circle_filled(center, radius * 0.5, ui.visuals().panel_fill);
        }

        // ---- Legend ----
        ui.vertical(|ui: &mut Ui| {
            for (slice, &color) in slices.iter().zip(&palette) {
                ui.label(
                    RichText::new(format!(
                        "■ {}: {} ({:.1}%)",
                        slice.label,
                        slice.value,
                        slice.fraction * 100.0
                    ))
                    .color(color),
                );
            }
        });
    });
}
