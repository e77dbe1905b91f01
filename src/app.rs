use eframe::egui::{self, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RustyPlotterApp {
    pub state: AppState,
}

impl eframe::App for RustyPlotterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: plot configuration ----
        egui::SidePanel::left("plot_config")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: data input, preview and chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Interactive Data Visualization");
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    panels::data_panel(ui, &mut self.state);
                    plot::chart_view(ui, &self.state);
                });
        });
    }
}
