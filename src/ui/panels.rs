use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use rusty_dash::data::library::DatasetId;

use crate::state::{AppState, View};

// ---------------------------------------------------------------------------
// Left side panel – view selector, dataset list and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Views");
    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.selectable_value(&mut state.view, View::Data, "Data");
        ui.selectable_value(&mut state.view, View::Charts, "Charts");
        ui.selectable_value(&mut state.view, View::Analysis, "Analysis");
        ui.selectable_value(&mut state.view, View::Reports, "Reports");
    });
    ui.add_space(4.0);

    dataset_list(ui, state);
    ui.add_space(4.0);

    ui.heading("Filters");
    ui.separator();

    let dataset = match state.dataset() {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the loop.
    let columns: Vec<String> = dataset
        .column_names
        .iter()
        .filter(|c| state.filters.contains_key(*c))
        .cloned()
        .collect();
    let unique = dataset.unique_values.clone();

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Colour-by selector ----
            ui.strong("Color by");
            let current_color_col = state.color_column.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("color_by")
                .selected_text(&current_color_col)
                .show_ui(ui, |ui: &mut Ui| {
                    for col in &columns {
                        if ui
                            .selectable_label(current_color_col == *col, col)
                            .clicked()
                        {
                            state.set_color_column(col.clone());
                        }
                    }
                });
            ui.separator();

            // ---- Per-column filter widgets (collapsible) ----
            for col in &columns {
                let Some(all_values) = unique.get(col) else {
                    continue;
                };

                let n_selected = state.filters.get(col).map_or(0, |s| s.len());
                let n_total = all_values.len();
                let header_text = format!("{col}  ({n_selected}/{n_total})");

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(col)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(col);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(col);
                            }
                        });

                        let tint = (state.color_column.as_deref() == Some(col.as_str()))
                            .then(|| state.color_map.clone())
                            .flatten();

                        let selected = state.filters.entry(col.clone()).or_default();
                        for val in all_values {
                            let mut text = RichText::new(val.to_string());
                            if let Some(cm) = &tint {
                                text = text.color(cm.color_for(val));
                            }

                            let mut checked = selected.contains(val);
                            if ui.checkbox(&mut checked, text).changed() {
                                if checked {
                                    selected.insert(val.clone());
                                } else {
                                    selected.remove(val);
                                }
                                changed = true;
                            }
                        }
                    });
            }
        });

    if changed {
        state.refilter();
    }
}

enum DatasetAction {
    Select(DatasetId),
    Rename(DatasetId),
    Remove(DatasetId),
}

/// Loaded datasets: click to switch, rename or remove the current one.
fn dataset_list(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Datasets");
    ui.separator();
    if state.library.is_empty() {
        ui.label("Nothing loaded yet.");
        return;
    }

    let mut action = None;
    for (id, dataset) in state.library.iter() {
        let is_current = state.current == Some(id);
        let label = format!("{}  ({} rows)", dataset.name, dataset.len());
        if ui.selectable_label(is_current, label).clicked() && !is_current {
            action = Some(DatasetAction::Select(id));
        }
    }

    if let Some(id) = state.current {
        ui.horizontal(|ui: &mut Ui| {
            let edit = ui.add(
                egui::TextEdit::singleline(&mut state.rename_buffer).desired_width(120.0),
            );
            let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if ui.small_button("Rename").clicked() || submitted {
                action = Some(DatasetAction::Rename(id));
            }
            if ui.small_button("Remove").clicked() {
                action = Some(DatasetAction::Remove(id));
            }
        });
    }

    let result = match action {
        Some(DatasetAction::Select(id)) => {
            state.select_dataset(id);
            Ok(())
        }
        Some(DatasetAction::Rename(id)) => {
            let name = state.rename_buffer.clone();
            state.rename_dataset(id, &name)
        }
        Some(DatasetAction::Remove(id)) => state.remove_dataset(id),
        None => Ok(()),
    };
    if let Err(e) = result {
        log::warn!("{e}");
        state.status_message = Some(format!("Error: {e}"));
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let has_report = state.analysis.is_some();
            if ui
                .add_enabled(has_report, egui::Button::new("Export report (JSON)…"))
                .clicked()
            {
                export_dialog(state, ExportKind::Report);
                ui.close_menu();
            }
            if ui
                .add_enabled(has_report, egui::Button::new("Export statistics (CSV)…"))
                .clicked()
            {
                export_dialog(state, ExportKind::Statistics);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = state.dataset() {
            ui.label(format!(
                "{}: {} rows loaded, {} visible",
                ds.name,
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter(
            "Supported files",
            &["csv", "json", "parquet", "pq", "xlsx", "xls", "xlsm", "xlsb", "ods"],
        )
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("Spreadsheet", &["xlsx", "xls", "xlsm", "xlsb", "ods"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}

#[derive(Debug, Clone, Copy)]
enum ExportKind {
    Report,
    Statistics,
}

fn export_dialog(state: &mut AppState, kind: ExportKind) {
    let (title, ext, default_name) = match kind {
        ExportKind::Report => ("Export analysis report", "json", "report.json"),
        ExportKind::Statistics => ("Export statistics", "csv", "statistics.csv"),
    };

    let Some(path) = rfd::FileDialog::new()
        .set_title(title)
        .add_filter(ext.to_uppercase(), &[ext])
        .set_file_name(default_name)
        .save_file()
    else {
        return;
    };

    let result = match kind {
        ExportKind::Report => state.export_report(&path),
        ExportKind::Statistics => state.export_statistics(&path),
    };

    match result {
        Ok(()) => state.status_message = None,
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
