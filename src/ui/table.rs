use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Data preview (central panel, Data view)
// ---------------------------------------------------------------------------

/// Table of the first `preview_rows` visible rows.
pub fn data_table(ui: &mut Ui, state: &AppState) {
    let dataset = match state.dataset() {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to view data  (File → Open…)");
            });
            return;
        }
    };

    let preview: Vec<usize> = state
        .visible_indices
        .iter()
        .copied()
        .take(state.settings.preview_rows)
        .collect();

    ui.label(format!(
        "Showing {} of {} visible rows",
        preview.len(),
        state.visible_indices.len()
    ));
    ui.separator();

    let color_col = state.color_column.as_deref();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(40.0))
        .columns(
            Column::initial(120.0).at_least(40.0).clip(true),
            dataset.column_names.len(),
        )
        .min_scrolled_height(0.0)
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong("#");
            });
            for name in &dataset.column_names {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, preview.len(), |mut row| {
                let idx = preview[row.index()];
                let record = &dataset.rows[idx];

                let tint = color_col.and_then(|col| {
                    let cm = state.color_map.as_ref()?;
                    Some(cm.color_for(record.get(col)))
                });

                row.col(|ui: &mut Ui| {
                    let mut text = RichText::new(idx.to_string());
                    if let Some(c) = tint {
                        text = text.color(c);
                    }
                    ui.label(text);
                });
                for name in &dataset.column_names {
                    row.col(|ui: &mut Ui| {
                        let cell = record.get(name);
                        if cell.is_null() {
                            ui.weak("—");
                        } else {
                            ui.label(cell.to_string());
                        }
                    });
                }
            });
        });
}
