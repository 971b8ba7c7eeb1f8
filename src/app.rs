use eframe::egui;

use crate::config::Config;
use crate::state::AppState;
use crate::ui::{gallery, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ResidueGalleryApp {
    pub state: AppState,
}

impl ResidueGalleryApp {
    /// Apply config and open any startup files it names.
    pub fn new(config: &Config) -> Self {
        let mut state = AppState {
            thumbnail_width: config.ui.thumbnail_width,
            ..AppState::default()
        };
        if let Some(path) = &config.gallery.manifest {
            state.open_gallery(path);
        }
        if let Some(path) = &config.gallery.records {
            state.open_records(path);
        }
        Self { state }
    }
}

impl eframe::App for ResidueGalleryApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: weight plot for a single residue type ----
        if let Some((label, totals)) = self.state.monthly_totals() {
            egui::TopBottomPanel::bottom("weight_panel")
                .default_height(220.0)
                .resizable(true)
                .show(ctx, |ui| {
                    plot::weight_plot(ui, &self.state, &label, &totals);
                });
        }

        // ---- Central panel: thumbnails ----
        egui::CentralPanel::default().show(ctx, |ui| {
            gallery::gallery_grid(ui, &self.state);
        });
    }
}
