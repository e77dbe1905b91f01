use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{CellValue, Dataset};

/// Rows shown by the raw-data preview.
pub const PREVIEW_ROWS: usize = 10;

/// Render the first [`PREVIEW_ROWS`] rows as a striped table.
pub fn preview_table(ui: &mut Ui, dataset: &Dataset) {
    let names = dataset.column_names();
    let rows = dataset.head(PREVIEW_ROWS);

    egui::ScrollArea::horizontal()
        .id_salt("raw_preview")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .vscroll(false)
                .columns(Column::auto().at_least(60.0), names.len())
                .header(20.0, |mut header| {
                    for name in &names {
                        header.col(|ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for row in &rows {
                        body.row(18.0, |mut table_row| {
                            for cell in row {
                                table_row.col(|ui| {
                                    ui.label(cell_text(cell));
                                });
                            }
                        });
                    }
                });
        });
}

fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        other => other.to_string(),
    }
}
