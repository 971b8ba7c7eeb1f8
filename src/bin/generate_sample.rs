use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use image::{Rgb, RgbImage};
use parquet::arrow::ArrowWriter;

const CHART_WIDTH: u32 = 480;
const CHART_HEIGHT: u32 = 320;
const MARGIN: i64 = 30;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Seasonal weekly collection weight in kg.
fn weekly_weight(base: f64, week: u32, rng: &mut SimpleRng) -> f64 {
    let season = (week as f64 / 52.0 * 2.0 * std::f64::consts::PI).sin();
    (base * (1.0 + 0.3 * season) * (0.8 + 0.4 * rng.next_f64())).max(0.0)
}

// ---------------------------------------------------------------------------
// Chart rendering
// ---------------------------------------------------------------------------

fn draw_line(img: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let (dx, dy) = ((x1 - x0).abs(), -(y1 - y0).abs());
    let (sx, sy) = (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 });
    let (mut x, mut y, mut err) = (x0, y0, dx + dy);
    loop {
        if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
            img.put_pixel(x as u32, y as u32, color);
        }
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Monthly totals as a line on a white canvas with plain axes.
fn render_chart(monthly: &[f64; 12], color: Rgb<u8>) -> RgbImage {
    let mut img = RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, Rgb([255, 255, 255]));
    let (w, h) = (CHART_WIDTH as i64, CHART_HEIGHT as i64);
    let axis = Rgb([90, 90, 90]);
    draw_line(&mut img, (MARGIN, h - MARGIN), (w - MARGIN, h - MARGIN), axis);
    draw_line(&mut img, (MARGIN, MARGIN), (MARGIN, h - MARGIN), axis);

    let max = monthly.iter().cloned().fold(f64::EPSILON, f64::max);
    let points: Vec<(i64, i64)> = monthly
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let x = MARGIN + (i as i64) * (w - 2 * MARGIN) / 11;
            let y = h - MARGIN - ((v / max) * (h - 2 * MARGIN) as f64) as i64;
            (x, y)
        })
        .collect();

    for pair in points.windows(2) {
        // Three pixels thick.
        for offset in -1..=1 {
            let (a, b) = (pair[0], pair[1]);
            draw_line(&mut img, (a.0, a.1 + offset), (b.0, b.1 + offset), color);
        }
    }
    img
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn write_manifest(path: &Path, rows: &[(String, i32, String, String)]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("category", DataType::Utf8, false),
        Field::new("year", DataType::Int32, true),
        Field::new("image", DataType::Utf8, false),
        Field::new("title", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.0.as_str()))),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.1))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.2.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.3.as_str()))),
        ],
    )
    .context("building manifest batch")?;

    let file = std::fs::File::create(path).context("creating manifest file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing manifest")?;
    writer.close().context("closing manifest")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let residue_types: [(&str, f64, Rgb<u8>); 4] = [
        ("Plastic", 120.0, Rgb([220, 120, 40])),
        ("Metal", 60.0, Rgb([70, 110, 200])),
        ("Glass", 90.0, Rgb([40, 160, 90])),
        ("Paper", 150.0, Rgb([170, 60, 160])),
    ];
    let years = 2019..=2022;

    let gallery_dir = Path::new("sample_gallery");
    std::fs::create_dir_all(gallery_dir).context("creating sample_gallery/")?;

    let mut log = csv::Writer::from_path("sample_residues.csv").context("creating residue log")?;
    log.write_record(["date", "residue_type", "weight"])?;

    let mut manifest = Vec::new();
    let mut n_records = 0;

    for (residue_type, base, color) in residue_types {
        for year in years.clone() {
            let mut monthly = [0.0f64; 12];
            for week in 0..52u32 {
                let day_of_year = week * 7 + 1;
                let date = NaiveDate::from_yo_opt(year, day_of_year)
                    .context("computing sample date")?;
                let weight = weekly_weight(base, week, &mut rng);
                monthly[date.month0() as usize] += weight;

                log.write_record([
                    date.format("%Y-%m-%d").to_string(),
                    residue_type.to_string(),
                    format!("{weight:.2}"),
                ])?;
                n_records += 1;
            }

            let file_name = format!("{}_{year}.png", residue_type.to_lowercase());
            render_chart(&monthly, color)
                .save(gallery_dir.join(&file_name))
                .with_context(|| format!("writing {file_name}"))?;

            manifest.push((
                residue_type.to_string(),
                year,
                file_name,
                format!("{residue_type} {year}"),
            ));
        }
    }
    log.flush()?;

    let manifest_path = gallery_dir.join("gallery.parquet");
    write_manifest(&manifest_path, &manifest)?;

    println!(
        "Wrote {} charts to {} and {n_records} residue records to sample_residues.csv",
        manifest.len(),
        manifest_path.display()
    );
    Ok(())
}
