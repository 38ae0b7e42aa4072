use eframe::egui::{self, RichText, ScrollArea, Ui};

use rusty_dash::report::{Report, ReportId};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Reports view (central panel)
// ---------------------------------------------------------------------------

enum ReportAction {
    Edit(ReportId),
    SaveEdit,
    CancelEdit,
    Duplicate(ReportId),
    Download(ReportId),
    Delete(ReportId),
}

pub fn reports_view(ui: &mut Ui, state: &mut AppState) {
    new_report_form(ui, state);
    ui.separator();

    ui.heading("Saved reports");
    if state.reports.is_empty() {
        ui.label("No reports yet.");
        return;
    }

    let mut action = None;
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for report in state.reports.iter() {
                ui.group(|ui: &mut Ui| match &mut state.report_edit {
                    Some((id, form)) if *id == report.id => {
                        ui.text_edit_singleline(&mut form.title);
                        ui.text_edit_multiline(&mut form.description);
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.button("Save").clicked() {
                                action = Some(ReportAction::SaveEdit);
                            }
                            if ui.button("Cancel").clicked() {
                                action = Some(ReportAction::CancelEdit);
                            }
                        });
                    }
                    _ => {
                        if let Some(a) = report_card(ui, report) {
                            action = Some(a);
                        }
                    }
                });
            }
        });

    let result = match action {
        Some(ReportAction::Edit(id)) => {
            state.begin_report_edit(id);
            Ok(())
        }
        Some(ReportAction::SaveEdit) => state.commit_report_edit().map_err(anyhow::Error::from),
        Some(ReportAction::CancelEdit) => {
            state.report_edit = None;
            Ok(())
        }
        Some(ReportAction::Duplicate(id)) => {
            state.reports.duplicate(id).map(|_| ()).map_err(anyhow::Error::from)
        }
        Some(ReportAction::Download(id)) => download_dialog(state, id),
        Some(ReportAction::Delete(id)) => state.remove_report(id).map_err(anyhow::Error::from),
        None => return,
    };

    match result {
        Ok(()) => state.status_message = None,
        Err(e) => {
            log::error!("Report action failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

fn new_report_form(ui: &mut Ui, state: &mut AppState) {
    ui.heading("New report");
    egui::Grid::new("report_form")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Title");
            ui.text_edit_singleline(&mut state.report_form.title);
            ui.end_row();

            ui.label("Description");
            ui.text_edit_multiline(&mut state.report_form.description);
            ui.end_row();
        });

    let what = if state.analysis.is_some() {
        "the current chart and analysis"
    } else {
        "the current chart (run an analysis to include statistics)"
    };
    ui.weak(format!("Saves {what}."));

    if ui
        .add_enabled(state.dataset().is_some(), egui::Button::new("Save report"))
        .clicked()
    {
        match state.save_report() {
            Ok(_) => state.status_message = None,
            Err(e) => state.status_message = Some(format!("Error: {e}")),
        }
    }
}

fn report_card(ui: &mut Ui, report: &Report) -> Option<ReportAction> {
    let mut action = None;
    ui.label(RichText::new(&report.title).strong());
    if !report.description.is_empty() {
        ui.label(&report.description);
    }
    let columns = report
        .analysis
        .as_ref()
        .map_or(0, |analysis| analysis.columns.len());
    ui.weak(format!(
        "{} · {} chart · {columns} analysed columns · {} downloads",
        report.dataset,
        report.chart.kind.label(),
        report.downloads
    ));
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("Edit").clicked() {
            action = Some(ReportAction::Edit(report.id));
        }
        if ui.small_button("Duplicate").clicked() {
            action = Some(ReportAction::Duplicate(report.id));
        }
        if ui.small_button("Download…").clicked() {
            action = Some(ReportAction::Download(report.id));
        }
        if ui.small_button("Delete").clicked() {
            action = Some(ReportAction::Delete(report.id));
        }
    });
    action
}

fn download_dialog(state: &mut AppState, id: ReportId) -> anyhow::Result<()> {
    let default_name = state
        .reports
        .get(id)
        .map(|r| format!("{}.json", r.title.replace(['/', '\\'], "_")))
        .unwrap_or_else(|| "report.json".into());

    let Some(path) = rfd::FileDialog::new()
        .set_title("Download report")
        .add_filter("JSON", &["json"])
        .set_file_name(default_name)
        .save_file()
    else {
        return Ok(());
    };
    state.download_report(id, &path)
}
