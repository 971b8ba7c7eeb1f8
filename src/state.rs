use std::path::Path;

use crate::color::CategoryColors;
use crate::data::filter::{compute_visibility, FilterCriteria, ALL_CATEGORIES};
use crate::data::loader::load_gallery;
use crate::data::model::Gallery;
use crate::data::records::{load_records, MonthlyTotal, ResidueLog};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded gallery (None until user opens one).
    pub gallery: Option<Gallery>,

    /// Residue log backing the monthly weight plot.
    pub records: Option<ResidueLog>,

    /// Raw filter inputs as typed/selected in the side panel.
    pub category_input: String,
    pub start_year_input: String,
    pub end_year_input: String,

    /// One flag per gallery item, from the last filter pass.
    pub visibility: Vec<bool>,

    /// Caption colour per category.
    pub colors: CategoryColors,

    /// Thumbnail width in points.
    pub thumbnail_width: f32,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            gallery: None,
            records: None,
            category_input: ALL_CATEGORIES.to_string(),
            start_year_input: String::new(),
            end_year_input: String::new(),
            visibility: Vec::new(),
            colors: CategoryColors::default(),
            thumbnail_width: 240.0,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded gallery and show everything matching the current inputs.
    pub fn set_gallery(&mut self, gallery: Gallery) {
        self.colors = CategoryColors::new(&gallery.categories);
        self.gallery = Some(gallery);
        self.status_message = None;
        self.refilter();
    }

    pub fn set_records(&mut self, records: ResidueLog) {
        self.records = Some(records);
        self.status_message = None;
    }

    /// Criteria rebuilt from the current raw inputs.
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria::from_inputs(
            &self.category_input,
            &self.start_year_input,
            &self.end_year_input,
        )
    }

    /// Recompute `visibility` after an input change.
    pub fn refilter(&mut self) {
        let criteria = self.criteria();
        self.visibility = match &self.gallery {
            Some(gallery) => compute_visibility(&gallery.items, &criteria),
            None => Vec::new(),
        };
        log::debug!(
            "filter {:?}: {}/{} visible",
            criteria,
            self.visible_count(),
            self.visibility.len()
        );
    }

    /// Back to "all" with no year bounds.
    pub fn reset_filters(&mut self) {
        self.category_input = ALL_CATEGORIES.to_string();
        self.start_year_input.clear();
        self.end_year_input.clear();
        self.refilter();
    }

    pub fn set_category(&mut self, category: &str) {
        self.category_input = category.to_string();
        self.refilter();
    }

    pub fn visible_count(&self) -> usize {
        self.visibility.iter().filter(|v| **v).count()
    }

    /// Monthly totals for the selected category, when a single one is
    /// selected and a residue log is loaded.
    pub fn monthly_totals(&self) -> Option<(String, Vec<MonthlyTotal>)> {
        let records = self.records.as_ref()?;
        let criteria = self.criteria();
        let category = criteria.category()?;
        let totals = records.monthly_totals(category, criteria.start_year, criteria.end_year);
        Some((self.category_input.trim().to_string(), totals))
    }

    /// Load a gallery from disk, reporting failures in the status line.
    pub fn open_gallery(&mut self, path: &Path) {
        match load_gallery(path) {
            Ok(gallery) => {
                log::info!(
                    "Loaded {} gallery items from {} with categories {:?}",
                    gallery.len(),
                    path.display(),
                    gallery.categories
                );
                self.set_gallery(gallery);
            }
            Err(e) => {
                log::error!("Failed to load gallery: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Load a residue log from disk, reporting failures in the status line.
    pub fn open_records(&mut self, path: &Path) {
        match load_records(path) {
            Ok(records) => {
                log::info!(
                    "Loaded {} residue records ({} skipped) from {}",
                    records.len(),
                    records.skipped,
                    path.display()
                );
                self.set_records(records);
            }
            Err(e) => {
                log::error!("Failed to load residue log: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::DisplayItem;
    use crate::data::records::ResidueRecord;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn state_with_gallery() -> AppState {
        let mut state = AppState::default();
        state.set_gallery(Gallery::from_items(
            vec![
                DisplayItem::new("metal", Some(2019), "/g/metal_2019.png"),
                DisplayItem::new("metal", Some(2021), "/g/metal_2021.png"),
                DisplayItem::new("plastic", Some(2020), "/g/plastic_2020.png"),
            ],
            "/g",
        ));
        state
    }

    #[test]
    fn new_gallery_starts_fully_visible() {
        let state = state_with_gallery();
        assert_eq!(state.visibility, vec![true, true, true]);
        assert_eq!(state.visible_count(), 3);
    }

    #[test]
    fn inputs_drive_visibility_and_reset_restores_all() {
        let mut state = state_with_gallery();
        state.start_year_input = "2020".to_string();
        state.set_category("Metal");
        assert_eq!(state.visibility, vec![false, true, false]);

        state.reset_filters();
        assert_eq!(state.category_input, "all");
        assert_eq!(state.visibility, vec![true, true, true]);
    }

    #[test]
    fn failed_load_sets_status_and_keeps_gallery() {
        let mut state = state_with_gallery();
        state.open_gallery(Path::new("/definitely/missing/gallery.json"));
        assert!(state.status_message.as_deref().unwrap_or("").starts_with("Error:"));
        assert_eq!(state.gallery.as_ref().map(Gallery::len), Some(3));
    }

    #[test]
    fn monthly_totals_need_a_single_category() {
        let mut state = state_with_gallery();
        state.set_records(ResidueLog {
            records: vec![ResidueRecord {
                date: NaiveDate::from_ymd_opt(2020, 4, 9).unwrap(),
                residue_type: "Metal".to_string(),
                weight: 7.0,
            }],
            skipped: 0,
        });
        assert!(state.monthly_totals().is_none());

        state.set_category("metal");
        let (label, totals) = state.monthly_totals().unwrap();
        assert_eq!(label, "metal");
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].weight, 7.0);
    }
}
