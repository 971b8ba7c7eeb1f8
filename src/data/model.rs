use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// ---------------------------------------------------------------------------
// DisplayItem – one image in the gallery
// ---------------------------------------------------------------------------

/// A single displayable gallery entry (one chart image).
///
/// Visibility is not stored here; it is recomputed from the current
/// [`FilterCriteria`](super::filter::FilterCriteria) on every filter pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayItem {
    /// Residue type label. Compared case-insensitively.
    pub category: String,
    /// Year the chart refers to. `None` when missing or malformed at load time.
    pub year: Option<i32>,
    /// Absolute (or manifest-resolved) path to the PNG.
    pub image: PathBuf,
    /// Caption shown under the thumbnail.
    pub title: String,
}

impl DisplayItem {
    pub fn new(category: impl Into<String>, year: Option<i32>, image: impl Into<PathBuf>) -> Self {
        let image = image.into();
        let title = image
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        Self {
            category: category.into(),
            year,
            image,
            title,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// `file://` URI for egui's image loaders.
    pub fn image_uri(&self) -> String {
        format!("file://{}", self.image.display())
    }
}

impl fmt::Display for DisplayItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(y) => write!(f, "{} ({y})", self.category),
            None => write!(f, "{} (no year)", self.category),
        }
    }
}

// ---------------------------------------------------------------------------
// Gallery – the complete loaded collection
// ---------------------------------------------------------------------------

/// The static collection of items subject to filtering, plus its category index.
#[derive(Debug, Clone, Default)]
pub struct Gallery {
    /// All items in display order.
    pub items: Vec<DisplayItem>,
    /// Where the gallery was read from (manifest file or directory).
    pub source: PathBuf,
    /// Distinct category labels, first-seen spelling, sorted case-insensitively.
    pub categories: Vec<String>,
}

impl Gallery {
    /// Build the category index from the loaded items.
    pub fn from_items(items: Vec<DisplayItem>, source: impl Into<PathBuf>) -> Self {
        // lowercase key → first spelling seen
        let mut by_key: BTreeMap<String, String> = BTreeMap::new();
        for item in &items {
            by_key
                .entry(item.category.to_lowercase())
                .or_insert_with(|| item.category.clone());
        }
        Gallery {
            items,
            source: source.into(),
            categories: by_key.into_values().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Inclusive (min, max) over the items that carry a year.
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let mut years = self.items.iter().filter_map(|it| it.year);
        let first = years.next()?;
        Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
    }
}

// ---------------------------------------------------------------------------
// Permissive year parsing
// ---------------------------------------------------------------------------

/// Parse a year the way a browser's `parseInt` would.
///
/// Leading whitespace is skipped, an optional sign and the leading run of
/// ASCII digits are read, anything after is ignored. Returns `None` when no
/// digits are present or the value does not fit in an `i32`.
pub fn parse_year(input: &str) -> Option<i32> {
    let s = input.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => ("-", &s[1..]),
        Some(b'+') => ("", &s[1..]),
        _ => ("", s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    format!("{sign}{}", &rest[..end]).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_year_accepts_plain_and_prefixed_numbers() {
        assert_eq!(parse_year("2020"), Some(2020));
        assert_eq!(parse_year("  2021 "), Some(2021));
        assert_eq!(parse_year("2020-05-01"), Some(2020));
        assert_eq!(parse_year("+1999"), Some(1999));
        assert_eq!(parse_year("-44"), Some(-44));
    }

    #[test]
    fn parse_year_rejects_non_numeric_input() {
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("   "), None);
        assert_eq!(parse_year("abc"), None);
        assert_eq!(parse_year("-"), None);
        assert_eq!(parse_year("year 2020"), None);
        assert_eq!(parse_year("99999999999"), None);
    }

    #[test]
    fn categories_are_deduplicated_case_insensitively() {
        let gallery = Gallery::from_items(
            vec![
                DisplayItem::new("Plastic", Some(2020), "/g/a.png"),
                DisplayItem::new("metal", Some(2019), "/g/b.png"),
                DisplayItem::new("PLASTIC", Some(2021), "/g/c.png"),
                DisplayItem::new("Glass", None, "/g/d.png"),
            ],
            "/g",
        );
        assert_eq!(gallery.categories, vec!["Glass", "metal", "Plastic"]);
        assert_eq!(gallery.len(), 4);
    }

    #[test]
    fn year_span_ignores_items_without_year() {
        let gallery = Gallery::from_items(
            vec![
                DisplayItem::new("a", Some(2021), "/g/a.png"),
                DisplayItem::new("a", None, "/g/b.png"),
                DisplayItem::new("a", Some(2018), "/g/c.png"),
            ],
            "/g",
        );
        assert_eq!(gallery.year_span(), Some((2018, 2021)));
        assert_eq!(Gallery::default().year_span(), None);
    }

    #[test]
    fn title_defaults_to_file_stem() {
        let item = DisplayItem::new("metal", Some(2020), "/g/metal_2020.png");
        assert_eq!(item.title, "metal_2020");
        assert_eq!(item.clone().with_title("Metal").title, "Metal");
        assert_eq!(item.to_string(), "metal (2020)");
    }
}
