use super::model::{parse_year, DisplayItem};

/// The category value that matches every item.
pub const ALL_CATEGORIES: &str = "all";

// ---------------------------------------------------------------------------
// Filter criteria: category + inclusive year range
// ---------------------------------------------------------------------------

/// Criteria for one filter pass. Rebuilt from the form inputs every time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Lowercased category, or `None` for "all".
    category: Option<String>,
    /// Inclusive lower bound; `None` means unbounded.
    pub start_year: Option<i32>,
    /// Inclusive upper bound; `None` means unbounded.
    pub end_year: Option<i32>,
}

impl FilterCriteria {
    pub fn new(category: &str, start_year: Option<i32>, end_year: Option<i32>) -> Self {
        let category = category.trim();
        let category = if category.is_empty() || category.eq_ignore_ascii_case(ALL_CATEGORIES) {
            None
        } else {
            Some(category.to_lowercase())
        };
        Self {
            category,
            start_year,
            end_year,
        }
    }

    /// Build criteria from raw form text. Year fields that do not parse are
    /// treated as absent (unbounded on that side).
    pub fn from_inputs(category: &str, start_year: &str, end_year: &str) -> Self {
        Self::new(category, parse_year(start_year), parse_year(end_year))
    }

    /// The lowercased category, or `None` when every category matches.
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// True when these criteria name exactly this category (Unicode case folding).
    pub fn selects(&self, category: &str) -> bool {
        self.category.as_deref() == Some(category.to_lowercase().as_str())
    }

    pub fn has_year_bound(&self) -> bool {
        self.start_year.is_some() || self.end_year.is_some()
    }

    /// True when no item can be hidden by these criteria.
    pub fn is_unfiltered(&self) -> bool {
        self.category.is_none() && !self.has_year_bound()
    }

    fn matches_category(&self, category: &str) -> bool {
        match &self.category {
            None => true,
            Some(wanted) => category.to_lowercase() == *wanted,
        }
    }

    fn matches_year(&self, year: Option<i32>) -> bool {
        if !self.has_year_bound() {
            return true;
        }
        // An item without a usable year never satisfies a bounded range.
        let Some(year) = year else {
            return false;
        };
        self.start_year.map_or(true, |start| year >= start)
            && self.end_year.map_or(true, |end| year <= end)
    }
}

// ---------------------------------------------------------------------------
// Visibility
// ---------------------------------------------------------------------------

/// Whether a single item passes the criteria.
pub fn is_visible(item: &DisplayItem, criteria: &FilterCriteria) -> bool {
    criteria.matches_category(&item.category) && criteria.matches_year(item.year)
}

/// One visibility flag per item, in input order.
pub fn compute_visibility(items: &[DisplayItem], criteria: &FilterCriteria) -> Vec<bool> {
    items.iter().map(|item| is_visible(item, criteria)).collect()
}
