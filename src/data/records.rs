use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate};
use serde_json::Value as JsonValue;

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Residue log – the raw weight records the charts are drawn from
// ---------------------------------------------------------------------------

/// One weighing: how much of a residue type was collected on a date.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueRecord {
    pub date: NaiveDate,
    pub residue_type: String,
    pub weight: f64,
}

/// Summed weight for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyTotal {
    /// First day of the month.
    pub month: NaiveDate,
    pub weight: f64,
}

impl MonthlyTotal {
    /// Fractional year for plotting (`2021-07` → `2021.5`).
    pub fn as_plot_x(&self) -> f64 {
        self.month.year() as f64 + self.month.month0() as f64 / 12.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResidueLog {
    pub records: Vec<ResidueRecord>,
    /// Rows dropped while loading because a field was missing or malformed.
    pub skipped: usize,
}

impl ResidueLog {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct residue types in first-seen order.
    pub fn residue_types(&self) -> Vec<String> {
        let mut types: Vec<String> = Vec::new();
        for rec in &self.records {
            if !types.contains(&rec.residue_type) {
                types.push(rec.residue_type.clone());
            }
        }
        types
    }

    /// Per-month weight totals for one residue type within an inclusive year range.
    ///
    /// The type is matched case-insensitively. Months between the first and
    /// last month present that have no records are reported with zero weight.
    pub fn monthly_totals(
        &self,
        residue_type: &str,
        start_year: Option<i32>,
        end_year: Option<i32>,
    ) -> Vec<MonthlyTotal> {
        let wanted = residue_type.to_lowercase();
        let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();

        for rec in &self.records {
            let year = rec.date.year();
            if rec.residue_type.to_lowercase() != wanted
                || start_year.is_some_and(|s| year < s)
                || end_year.is_some_and(|e| year > e)
            {
                continue;
            }
            if let Some(month) = month_start(rec.date) {
                *sums.entry(month).or_default() += rec.weight;
            }
        }

        let (Some(&first), Some(&last)) = (sums.keys().next(), sums.keys().next_back()) else {
            return Vec::new();
        };

        let mut totals = Vec::new();
        let mut month = Some(first);
        while let Some(m) = month.filter(|m| *m <= last) {
            totals.push(MonthlyTotal {
                month: m,
                weight: sums.get(&m).copied().unwrap_or(0.0),
            });
            month = next_month(m);
        }
        totals
    }
}

fn month_start(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
}

fn next_month(month: NaiveDate) -> Option<NaiveDate> {
    if month.month() == 12 {
        NaiveDate::from_ymd_opt(month.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(month.year(), month.month() + 1, 1)
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a residue log from `.json` (array of records) or `.csv`.
///
/// Rows with a missing or malformed field are skipped and counted in
/// [`ResidueLog::skipped`].
pub fn load_records(path: &Path) -> Result<ResidueLog> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let log = match ext.as_str() {
        "json" => load_json(path)?,
        "csv" => load_csv(path)?,
        other => bail!(LoadError::UnsupportedFormat(other.to_string())),
    };

    if log.skipped > 0 {
        log::warn!("{}: skipped {} malformed rows", path.display(), log.skipped);
    }
    Ok(log)
}

fn load_json(path: &Path) -> Result<ResidueLog> {
    let text = std::fs::read_to_string(path).context("reading JSON residue log")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let rows = root.as_array().ok_or(LoadError::NotAnArray)?;

    let mut log = ResidueLog::default();
    for (row, value) in rows.iter().enumerate() {
        let parsed = value.as_object().and_then(|obj| {
            let date = obj.get("date")?.as_str().and_then(parse_date)?;
            let residue_type = obj.get("residue_type")?.as_str()?.trim().to_string();
            let weight = match obj.get("weight")? {
                JsonValue::Number(n) => n.as_f64(),
                JsonValue::String(s) => parse_weight(s),
                _ => None,
            }?;
            Some(ResidueRecord {
                date,
                residue_type,
                weight,
            })
        });
        match parsed {
            Some(rec) => log.records.push(rec),
            None => {
                log::debug!("skipping residue row {row}: {value}");
                log.skipped += 1;
            }
        }
    }
    Ok(log)
}

/// Headers are matched after trimming quotes and whitespace, case-insensitively.
/// The Portuguese export headers (`Data`, `Tipo Resíduo`, `Peso`) are accepted.
fn load_csv(path: &Path) -> Result<ResidueLog> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().trim_matches('"').trim().to_lowercase())
        .collect();

    let find = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));
    let date_idx = find(&["date", "data"]).ok_or(LoadError::MissingColumn("date"))?;
    let type_idx = find(&["residue_type", "tipo resíduo", "tipo residuo"])
        .ok_or(LoadError::MissingColumn("residue_type"))?;
    let weight_idx = find(&["weight", "peso"]).ok_or(LoadError::MissingColumn("weight"))?;

    let mut log = ResidueLog::default();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row}"))?;

        let date = record.get(date_idx).and_then(parse_date);
        let residue_type = record
            .get(type_idx)
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let weight = record.get(weight_idx).and_then(parse_weight);

        match (date, residue_type, weight) {
            (Some(date), Some(residue_type), Some(weight)) => log.records.push(ResidueRecord {
                date,
                residue_type: residue_type.to_string(),
                weight,
            }),
            _ => {
                log::debug!("skipping residue row {row}: {record:?}");
                log.skipped += 1;
            }
        }
    }
    Ok(log)
}

/// `YYYY-MM-DD`, falling back to `DD/MM/YYYY`.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%d/%m/%Y"))
        .ok()
}

/// A single comma with no dot is a decimal comma (`"12,50"`); otherwise commas
/// are thousands separators (`"1,234.5"`, `"1,234,567"`).
fn parse_weight(s: &str) -> Option<f64> {
    let s = s.trim();
    let normalized = if s.matches(',').count() == 1 && !s.contains('.') {
        s.replace(',', ".")
    } else {
        s.replace(',', "")
    };
    normalized.parse().ok()
}
