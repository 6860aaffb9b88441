use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::plot::to_color32;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Clone what we need so we can mutate state inside the loop.
    let regions = state.service.records().regions().to_vec();
    let bounds = state.service.records().year_bounds();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Region multi-select ----
            let n_selected = state.selection.regions.len();
            let header_text = if n_selected == 0 {
                format!("Select Region  (all {})", regions.len())
            } else {
                format!("Select Region  ({n_selected}/{})", regions.len())
            };

            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("regions")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_regions();
                        }
                        if ui.small_button("Clear").clicked() {
                            state.clear_regions();
                        }
                    });

                    for region in &regions {
                        let mut checked = state.selection.regions.contains(region);
                        let color = state.service.colors().region.color_for(region);
                        let text = RichText::new(region).color(to_color32(color));
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_region(region);
                        }
                    }
                });

            ui.separator();

            // ---- Year range ----
            ui.strong("Select Year");
            let mut start = state.selection.years.start();
            let mut end = state.selection.years.end();
            if ui
                .add(
                    egui::Slider::new(&mut start, bounds.start()..=bounds.end())
                        .step_by(1.0)
                        .text("from"),
                )
                .changed()
            {
                state.set_year_start(start);
            }
            if ui
                .add(
                    egui::Slider::new(&mut end, bounds.start()..=bounds.end())
                        .step_by(1.0)
                        .text("to"),
                )
                .changed()
            {
                state.set_year_end(end);
            }

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset();
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the title and dataset summary.
pub fn top_bar(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading("Electric Vehicle Adoption Dashboard");
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label(state.data_path.display().to_string());
        ui.separator();
        ui.label(format!(
            "{} records loaded, {} visible",
            state.service.records().len(),
            state.visible_indices.len()
        ));
    });
}
