use eframe::egui::{self, Color32, RichText, TextEdit, Ui};

use crate::data::filter::ALL_CATEGORIES;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let categories = match &state.gallery {
        Some(gallery) => gallery.categories.clone(),
        None => {
            ui.label("No gallery loaded.");
            return;
        }
    };

    let mut changed = false;

    // ---- Residue type ----
    ui.strong("Residue type");
    let current = state.category_input.clone();
    let criteria = state.criteria();
    egui::ComboBox::from_id_salt("residue_type")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            let is_all = criteria.category().is_none();
            if ui.selectable_label(is_all, ALL_CATEGORIES).clicked() {
                state.category_input = ALL_CATEGORIES.to_string();
                changed = true;
            }
            for category in &categories {
                let selected = criteria.selects(category);
                let text = RichText::new(category).color(state.colors.color_for(category));
                if ui.selectable_label(selected, text).clicked() {
                    state.category_input = category.clone();
                    changed = true;
                }
            }
        });
    ui.add_space(6.0);

    // ---- Year range ----
    ui.strong("Years");
    egui::Grid::new("year_range")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label("From");
            changed |= ui
                .add(
                    TextEdit::singleline(&mut state.start_year_input)
                        .hint_text("any")
                        .desired_width(80.0),
                )
                .changed();
            ui.end_row();

            ui.label("To");
            changed |= ui
                .add(
                    TextEdit::singleline(&mut state.end_year_input)
                        .hint_text("any")
                        .desired_width(80.0),
                )
                .changed();
            ui.end_row();
        });

    if let Some((lo, hi)) = state.gallery.as_ref().and_then(|g| g.year_span()) {
        ui.small(format!("Gallery spans {lo}–{hi}"));
    }
    ui.add_space(6.0);

    let filtered = !state.criteria().is_unfiltered();
    if ui.add_enabled(filtered, egui::Button::new("Reset")).clicked() {
        state.reset_filters();
    } else if changed {
        state.refilter();
    }

    ui.separator();
    ui.label(format!(
        "{} of {} shown",
        state.visible_count(),
        state.visibility.len()
    ));
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open gallery…").clicked() {
                open_gallery_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open gallery folder…").clicked() {
                open_gallery_folder_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open residue log…").clicked() {
                open_records_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(gallery) = &state.gallery {
            ui.label(format!(
                "{} charts loaded, {} visible",
                gallery.len(),
                state.visible_count()
            ));
        }

        if let Some(records) = &state.records {
            ui.separator();
            if records.is_empty() {
                ui.label("Residue log has no usable records");
            } else {
                ui.label(format!(
                    "{} residue records, {} types",
                    records.len(),
                    records.residue_types().len()
                ));
            }
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

pub fn open_gallery_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open gallery manifest")
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_gallery(&path);
    }
}

pub fn open_gallery_folder_dialog(state: &mut AppState) {
    let folder = rfd::FileDialog::new()
        .set_title("Open folder of chart images")
        .pick_folder();

    if let Some(path) = folder {
        state.open_gallery(&path);
    }
}

pub fn open_records_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open residue log")
        .add_filter("Supported files", &["csv", "json"])
        .pick_file();

    if let Some(path) = file {
        state.open_records(&path);
    }
}
