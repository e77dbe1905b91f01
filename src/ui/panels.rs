use eframe::egui::{self, Color32, RichText, TextEdit, Ui};

use crate::chart::{FieldOptions, PlotKind};
use crate::data::loader::FileFormat;
use crate::state::{AppState, NoticeLevel};
use crate::ui::table;

// ---------------------------------------------------------------------------
// Left side panel – plot configuration
// ---------------------------------------------------------------------------

/// Render the plot configuration panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Plot Configuration");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };
    let kind = state.plot_kind;
    let options = FieldOptions::for_kind(kind, dataset);

    ui.strong("Choose plot type");
    egui::ComboBox::from_id_salt("plot_type")
        .selected_text(kind.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for candidate in PlotKind::ALL {
                if ui
                    .selectable_label(candidate == kind, candidate.to_string())
                    .clicked()
                {
                    state.set_plot_kind(candidate);
                }
            }
        });
    ui.separator();

    // The kind may have just changed; draw the pickers next frame.
    if state.plot_kind != kind {
        return;
    }

    let selection = &mut state.selection;
    if kind == PlotKind::PairPlot {
        ui.strong("Select dimensions");
        if options.dimensions.is_empty() {
            warn_label(ui, "No numeric columns available.");
        }
        for col in &options.dimensions {
            let mut checked = selection.dimensions.contains(col);
            if ui.checkbox(&mut checked, col).changed() {
                selection.toggle_dimension(col, checked, &options.dimensions);
            }
        }
        return;
    }

    column_picker(ui, "X Axis", &options.x, &mut selection.x, false);
    if kind.uses_y() {
        column_picker(ui, "Y Axis", &options.y, &mut selection.y, false);
    }
    if kind.uses_color() {
        column_picker(ui, "Color by", &options.color, &mut selection.color, true);
    }
}

/// A labelled combo box over `options`. With `allow_none` a leading "None"
/// entry clears the pick.
fn column_picker(
    ui: &mut Ui,
    label: &str,
    options: &[String],
    current: &mut Option<String>,
    allow_none: bool,
) {
    ui.strong(label);
    if options.is_empty() {
        warn_label(ui, "No suitable columns available.");
        return;
    }
    let shown = current.clone().unwrap_or_else(|| "None".to_string());
    egui::ComboBox::from_id_salt(label)
        .selected_text(shown)
        .show_ui(ui, |ui: &mut Ui| {
            if allow_none {
                ui.selectable_value(current, None, "None");
            }
            for col in options {
                ui.selectable_value(current, Some(col.clone()), col);
            }
        });
    ui.add_space(4.0);
}

fn warn_label(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(Color32::YELLOW));
}

// ---------------------------------------------------------------------------
// Data input (top of the central panel)
// ---------------------------------------------------------------------------

/// Manual entry box, load notices and the raw-data preview.
pub fn data_panel(ui: &mut Ui, state: &mut AppState) {
    ui.label("Or enter/paste your own data (CSV, TSV, or space-separated values)");
    ui.add(
        TextEdit::multiline(&mut state.manual_text)
            .desired_rows(8)
            .desired_width(f32::INFINITY)
            .code_editor()
            .hint_text("Ensure headers are included in the first row"),
    );
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Load manual data").clicked() {
            state.load_manual();
        }
        if ui.button("Use example data (Tips dataset)").clicked() {
            state.load_example();
        }
    });

    if let Some(notice) = &state.notice {
        let color = match notice.level {
            NoticeLevel::Success => Color32::GREEN,
            NoticeLevel::Warning => Color32::YELLOW,
            NoticeLevel::Error => Color32::RED,
        };
        ui.label(RichText::new(&notice.text).color(color));
    }
    ui.separator();

    if let Some(dataset) = &state.dataset {
        ui.checkbox(&mut state.show_raw, "Show raw data");
        if state.show_raw {
            table::preview_table(ui, dataset);
        }
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
            if ui.button("Use example data").clicked() {
                state.load_example();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!("{} rows, {} columns", ds.len(), ds.width()));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Upload a file (CSV, TSV, TXT, Excel, JSON, Parquet)")
        .add_filter("Supported files", FileFormat::EXTENSIONS)
        .add_filter("Delimited text", &["csv", "tsv", "txt"])
        .add_filter("Excel", &["xlsx"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet"])
        .pick_file();

    let Some(path) = file else {
        return;
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match std::fs::read(&path) {
        Ok(bytes) => state.load_upload(&name, bytes),
        Err(e) => state.fail(format!("Could not read file: {e}")),
    }
}
