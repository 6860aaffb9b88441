use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: title and summary ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: filtered records ----
        egui::TopBottomPanel::bottom("records_panel")
            .resizable(true)
            .default_height(180.0)
            .show(ctx, |ui| {
                egui::CollapsingHeader::new("Filtered records")
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        table::records_table(ui, &self.state);
                    });
            });

        // ---- Central panel: the five charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    let dashboard = &self.state.dashboard;
                    let ids = ["bar_chart", "line_chart", "scatter_plot", "pie_chart", "histogram"];
                    for (id, chart) in ids.into_iter().zip(dashboard.charts()) {
                        plot::chart(ui, id, chart);
                    }
                });
        });
    }
}
