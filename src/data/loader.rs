use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Int32Type, Int64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{parse_year, DisplayItem, Gallery};
use crate::error::LoadError;

/// Prefix the chart script puts in front of every generated file name.
const CHART_FILE_PREFIX: &str = "weight_over_time_";

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a gallery from a manifest file or a directory of PNG charts.
///
/// Supported sources:
/// * a directory   – every `*.png` inside, named `<category>_<year>.png`
/// * `.json`       – `[{ "category": "...", "year": 2020, "image": "a.png" }, ...]`
/// * `.csv`        – header row with `category`, `year`, `image`, `title`
/// * `.parquet`    – same columns as the CSV layout
///
/// `residue_type` is accepted in place of `category`. Relative image paths
/// are resolved against the manifest's directory.
pub fn load_gallery(path: &Path) -> Result<Gallery> {
    if path.is_dir() {
        return scan_directory(path);
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let items = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path, base)?,
        "json" => load_json(path, base)?,
        "csv" => load_csv(path, base)?,
        other => bail!(LoadError::UnsupportedFormat(other.to_string())),
    };

    Ok(Gallery::from_items(items, path))
}

fn resolve_image(base: &Path, image: &str) -> PathBuf {
    let image = Path::new(image);
    if image.is_absolute() {
        image.to_path_buf()
    } else {
        base.join(image)
    }
}

// ---------------------------------------------------------------------------
// Directory scan
// ---------------------------------------------------------------------------

fn scan_directory(dir: &Path) -> Result<Gallery> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.is_file()
                && p.extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("png"))
        })
        .collect();
    paths.sort();

    let items = paths
        .into_iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            let (category, year) = split_chart_stem(&stem);
            DisplayItem::new(category, year, path)
        })
        .collect();

    Ok(Gallery::from_items(items, dir))
}

/// `weight_over_time_Plastic_2021` → (`"Plastic"`, `Some(2021)`).
fn split_chart_stem(stem: &str) -> (String, Option<i32>) {
    let stem = stem.strip_prefix(CHART_FILE_PREFIX).unwrap_or(stem);
    if let Some((rest, suffix)) = stem.rsplit_once('_') {
        if !rest.is_empty() && suffix.len() == 4 && suffix.bytes().all(|b| b.is_ascii_digit()) {
            return (rest.replace('_', " "), suffix.parse().ok());
        }
    }
    (stem.replace('_', " "), None)
}

// ---------------------------------------------------------------------------
// JSON manifest
// ---------------------------------------------------------------------------

fn load_json(path: &Path, base: &Path) -> Result<Vec<DisplayItem>> {
    let text = std::fs::read_to_string(path).context("reading JSON manifest")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().ok_or(LoadError::NotAnArray)?;

    records
        .iter()
        .enumerate()
        .map(|(row, rec)| -> Result<DisplayItem> {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {row} is not a JSON object"))?;

            let category = obj
                .get("category")
                .or_else(|| obj.get("residue_type"))
                .and_then(JsonValue::as_str)
                .ok_or(LoadError::MissingField { row, field: "category" })?;
            let image = obj
                .get("image")
                .and_then(JsonValue::as_str)
                .ok_or(LoadError::MissingField { row, field: "image" })?;
            let year = obj.get("year").and_then(json_to_year);

            let mut item = DisplayItem::new(category, year, resolve_image(base, image));
            if let Some(title) = obj.get("title").and_then(JsonValue::as_str) {
                item = item.with_title(title);
            }
            Ok(item)
        })
        .collect()
}

fn json_to_year(val: &JsonValue) -> Option<i32> {
    match val {
        JsonValue::Number(n) => n.as_i64().and_then(|i| i32::try_from(i).ok()),
        JsonValue::String(s) => parse_year(s),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// CSV manifest
// ---------------------------------------------------------------------------

fn load_csv(path: &Path, base: &Path) -> Result<Vec<DisplayItem>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_ascii_lowercase())
        .collect();

    let position = |name: &str| headers.iter().position(|h| h == name);
    let category_idx = position("category")
        .or_else(|| position("residue_type"))
        .ok_or(LoadError::MissingColumn("category"))?;
    let image_idx = position("image").ok_or(LoadError::MissingColumn("image"))?;
    let year_idx = position("year");
    let title_idx = position("title");

    let mut items = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row}"))?;

        let category = record.get(category_idx).unwrap_or("").trim();
        if category.is_empty() {
            bail!(LoadError::MissingField { row, field: "category" });
        }
        let image = record.get(image_idx).unwrap_or("").trim();
        if image.is_empty() {
            bail!(LoadError::MissingField { row, field: "image" });
        }
        let year = year_idx.and_then(|i| record.get(i)).and_then(parse_year);

        let mut item = DisplayItem::new(category, year, resolve_image(base, image));
        if let Some(title) = title_idx.and_then(|i| record.get(i)).filter(|t| !t.is_empty()) {
            item = item.with_title(title);
        }
        items.push(item);
    }

    Ok(items)
}

// ---------------------------------------------------------------------------
// Parquet manifest
// ---------------------------------------------------------------------------

/// Expected schema:
/// - `category` (or `residue_type`): Utf8 / LargeUtf8
/// - `image`: Utf8 / LargeUtf8
/// - `year` (optional): Int32, Int64 or Utf8
/// - `title` (optional): Utf8 / LargeUtf8
fn load_parquet(path: &Path, base: &Path) -> Result<Vec<DisplayItem>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut items = Vec::new();
    let mut row_offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let category_idx = schema
            .index_of("category")
            .or_else(|_| schema.index_of("residue_type"))
            .map_err(|_| LoadError::MissingColumn("category"))?;
        let image_idx = schema
            .index_of("image")
            .map_err(|_| LoadError::MissingColumn("image"))?;
        let year_col = schema.index_of("year").ok().map(|i| batch.column(i));
        let title_col = schema.index_of("title").ok().map(|i| batch.column(i));

        let category_col = batch.column(category_idx);
        let image_col = batch.column(image_idx);

        for row in 0..batch.num_rows() {
            let global_row = row_offset + row;
            let category = extract_string(category_col, row).ok_or(LoadError::MissingField {
                row: global_row,
                field: "category",
            })?;
            let image = extract_string(image_col, row).ok_or(LoadError::MissingField {
                row: global_row,
                field: "image",
            })?;
            let year = year_col.and_then(|col| extract_year(col, row));

            let mut item = DisplayItem::new(category, year, resolve_image(base, &image));
            if let Some(title) = title_col.and_then(|col| extract_string(col, row)) {
                item = item.with_title(title);
            }
            items.push(item);
        }
        row_offset += batch.num_rows();
    }

    Ok(items)
}

// -- Arrow helpers --

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => Some(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        _ => None,
    }
}

fn extract_year(col: &Arc<dyn Array>, row: usize) -> Option<i32> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Int32 => Some(col.as_primitive::<Int32Type>().value(row)),
        DataType::Int64 => i32::try_from(col.as_primitive::<Int64Type>().value(row)).ok(),
        DataType::Utf8 | DataType::LargeUtf8 => extract_string(col, row).as_deref().and_then(parse_year),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use pretty_assertions::assert_eq;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn splits_chart_file_names() {
        assert_eq!(split_chart_stem("metal_2020"), ("metal".to_string(), Some(2020)));
        assert_eq!(
            split_chart_stem("weight_over_time_Plastic_2021"),
            ("Plastic".to_string(), Some(2021))
        );
        assert_eq!(split_chart_stem("food_waste_2019"), ("food waste".to_string(), Some(2019)));
        assert_eq!(split_chart_stem("glass"), ("glass".to_string(), None));
        assert_eq!(split_chart_stem("glass_20x1"), ("glass 20x1".to_string(), None));
        assert_eq!(split_chart_stem("_2020"), (" 2020".to_string(), None));
    }

    #[test]
    fn scans_png_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "plastic_2020.png", "");
        write(dir.path(), "metal_2019.PNG", "");
        write(dir.path(), "notes.txt", "");
        write(dir.path(), "glass.png", "");

        let gallery = load_gallery(dir.path()).unwrap();
        let summary: Vec<(String, Option<i32>)> = gallery
            .items
            .iter()
            .map(|it| (it.category.clone(), it.year))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("glass".to_string(), None),
                ("metal".to_string(), Some(2019)),
                ("plastic".to_string(), Some(2020)),
            ]
        );
        assert_eq!(gallery.source, dir.path());
    }

    #[test]
    fn loads_json_manifest_with_permissive_years() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "gallery.json",
            r#"[
                {"category": "Metal", "year": 2020, "image": "metal.png", "title": "Metal 2020"},
                {"residue_type": "Plastic", "year": "2021-03-01", "image": "/abs/plastic.png"},
                {"category": "Glass", "year": "unknown", "image": "glass.png"},
                {"category": "Paper", "image": "paper.png"}
            ]"#,
        );

        let gallery = load_gallery(&path).unwrap();
        assert_eq!(gallery.len(), 4);
        assert_eq!(gallery.items[0].title, "Metal 2020");
        assert_eq!(gallery.items[0].image, dir.path().join("metal.png"));
        assert_eq!(gallery.items[1].category, "Plastic");
        assert_eq!(gallery.items[1].year, Some(2021));
        assert_eq!(gallery.items[1].image, PathBuf::from("/abs/plastic.png"));
        assert_eq!(gallery.items[2].year, None);
        assert_eq!(gallery.items[3].year, None);
        assert_eq!(gallery.categories, vec!["Glass", "Metal", "Paper", "Plastic"]);
    }

    #[test]
    fn json_manifest_requires_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "g.json", r#"[{"category": "Metal", "year": 2020}]"#);
        let err = load_gallery(&path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::MissingField { row: 0, field: "image" })
        );

        let path = write(dir.path(), "obj.json", r#"{"category": "Metal"}"#);
        let err = load_gallery(&path).unwrap_err();
        assert_eq!(err.downcast_ref::<LoadError>(), Some(&LoadError::NotAnArray));
    }

    #[test]
    fn loads_csv_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "gallery.csv",
            "Category,Year,Image\nmetal,2019,a.png\nplastic,,b.png\nmetal,20x,c.png\n",
        );

        let gallery = load_gallery(&path).unwrap();
        let years: Vec<Option<i32>> = gallery.items.iter().map(|it| it.year).collect();
        assert_eq!(years, vec![Some(2019), None, Some(20)]);
        assert_eq!(gallery.items[1].image, dir.path().join("b.png"));
        assert_eq!(gallery.items[1].title, "b");
    }

    #[test]
    fn csv_manifest_requires_image_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "gallery.csv", "category,year\nmetal,2019\n");
        let err = load_gallery(&path).unwrap_err();
        assert_eq!(err.downcast_ref::<LoadError>(), Some(&LoadError::MissingColumn("image")));
    }

    #[test]
    fn csv_manifest_requires_category() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "gallery.csv", "category,year,image\nmetal,2019,a.png\n ,2020,b.png\n");
        let err = load_gallery(&path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::MissingField { row: 1, field: "category" })
        );
    }

    #[test]
    fn parquet_manifest_requires_category() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("category", DataType::Utf8, true),
            Field::new("image", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec![Some("metal"), None])),
                Arc::new(StringArray::from(vec!["metal.png", "unknown.png"])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let err = load_gallery(&path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::MissingField { row: 1, field: "category" })
        );
    }

    #[test]
    fn rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "gallery.xml", "<gallery/>");
        let err = load_gallery(&path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LoadError>(),
            Some(&LoadError::UnsupportedFormat("xml".to_string()))
        );
    }

    #[test]
    fn loads_parquet_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gallery.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new("residue_type", DataType::Utf8, false),
            Field::new("year", DataType::Int64, true),
            Field::new("image", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["metal", "plastic"])),
                Arc::new(Int64Array::from(vec![Some(2020), None])),
                Arc::new(StringArray::from(vec!["metal.png", "plastic.png"])),
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let gallery = load_gallery(&path).unwrap();
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.items[0].year, Some(2020));
        assert_eq!(gallery.items[1].year, None);
        assert_eq!(gallery.items[1].image, dir.path().join("plastic.png"));
        assert_eq!(gallery.categories, vec!["metal", "plastic"]);
    }
}
