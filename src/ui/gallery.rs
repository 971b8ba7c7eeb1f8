use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Thumbnail grid (central panel)
// ---------------------------------------------------------------------------

/// Render every visible gallery item as a captioned thumbnail.
pub fn gallery_grid(ui: &mut Ui, state: &AppState) {
    let gallery = match &state.gallery {
        Some(g) => g,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a gallery to view charts  (File → Open gallery…)");
            });
            return;
        }
    };

    if gallery.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(format!("No charts found in {}", gallery.source.display()));
        });
        return;
    }

    if state.visible_count() == 0 {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No charts match the current filters.");
        });
        return;
    }

    let width = state.thumbnail_width;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                let visible = gallery
                    .items
                    .iter()
                    .zip(&state.visibility)
                    .filter(|(_, visible)| **visible);

                for (item, _) in visible {
                    ui.allocate_ui(egui::vec2(width, width), |ui: &mut Ui| {
                        ui.vertical(|ui: &mut Ui| {
                            ui.add(
                                egui::Image::new(item.image_uri())
                                    .max_width(width)
                                    .maintain_aspect_ratio(true),
                            )
                            .on_hover_text(item.image.display().to_string());
                            ui.label(
                                RichText::new(&item.title)
                                    .strong()
                                    .color(state.colors.color_for(&item.category)),
                            );
                            ui.small(item.to_string());
                        });
                    });
                }
            });
        });
}
