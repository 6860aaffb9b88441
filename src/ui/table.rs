use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::model::REQUIRED_COLUMNS;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Render the records of the current filtered view.
pub fn records_table(ui: &mut Ui, state: &AppState) {
    let records = state.service.records();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(60.0), REQUIRED_COLUMNS.len())
        .header(ROW_HEIGHT + 2.0, |mut header| {
            for name in REQUIRED_COLUMNS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, state.visible_indices.len(), |mut row| {
                let Some(record) = state
                    .visible_indices
                    .get(row.index())
                    .and_then(|&i| records.get(i))
                else {
                    return;
                };
                let cells = [
                    record.region.clone(),
                    record.year.to_string(),
                    record.category.clone(),
                    format!("{:.2}", record.value),
                    record.powertrain.clone(),
                    record.parameter.clone(),
                    record.mode.clone(),
                ];
                for cell in cells {
                    row.col(|ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}
