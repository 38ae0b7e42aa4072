use eframe::egui;

use rusty_dash::settings::Settings;

use crate::state::{AppState, View};
use crate::ui::{analysis, panels, plot, reports, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustyDashApp {
    pub state: AppState,
}

impl RustyDashApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AppState::new(settings),
        }
    }
}

impl eframe::App for RustyDashApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: views, datasets and filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current view ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::Data => table::data_table(ui, &self.state),
            View::Charts => plot::chart_view(ui, &mut self.state),
            View::Analysis => analysis::analysis_view(ui, &mut self.state),
            View::Reports => reports::reports_view(ui, &mut self.state),
        });
    }
}
