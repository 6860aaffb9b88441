use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

/// One output row; column order follows the IEA Global EV Outlook export.
#[derive(Debug, Serialize)]
struct Row {
    region: &'static str,
    category: &'static str,
    parameter: &'static str,
    mode: &'static str,
    powertrain: &'static str,
    year: i32,
    unit: &'static str,
    value: f64,
}

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

    /// Multiplicative noise in `[1 - spread, 1 + spread)`.
    fn jitter(&mut self, spread: f64) -> f64 {
        1.0 + spread * (2.0 * self.next_f64() - 1.0)
    }
}

const LAST_HISTORICAL_YEAR: i32 = 2023;

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    // (region, EV sales of all cars in 2010, yearly growth)
    let regions: [(&str, f64, f64); 5] = [
        ("China", 8_000.0, 1.62),
        ("Europe", 9_000.0, 1.50),
        ("USA", 12_000.0, 1.38),
        ("India", 300.0, 1.70),
        ("Norway", 700.0, 1.42),
    ];
    // (mode, share of the region's volume)
    let modes = [("Cars", 1.0), ("Buses", 0.02), ("Vans", 0.05), ("Trucks", 0.01)];
    // (powertrain, share of the mode's volume)
    let powertrains = [("BEV", 0.7), ("PHEV", 0.28), ("FCEV", 0.02)];

    let mut rows = Vec::new();
    for &(region, base, growth) in &regions {
        for year in 2010..=2030 {
            let category = if year <= LAST_HISTORICAL_YEAR {
                "Historical"
            } else {
                "Projection-STEPS"
            };
            // Growth slows down after 2020.
            let t = f64::from(year.min(2020) - 2010);
            let late = f64::from((year - 2020).max(0));
            let sales_total = base * growth.powf(t) * 1.15_f64.powf(late);

            for &(mode, mode_share) in &modes {
                for &(powertrain, pt_share) in &powertrains {
                    let sales = (sales_total * mode_share * pt_share * rng.jitter(0.15)).round();
                    let stock = (sales * (1.0 + t * 0.6) * rng.jitter(0.1)).round();
                    let share = (100.0 * sales / (sales_total * 12.0)).min(100.0);

                    for (parameter, unit, value) in [
                        ("EV sales", "Vehicles", sales),
                        ("EV stock", "Vehicles", stock),
                        ("EV sales share", "percent", share),
                    ] {
                        rows.push(Row {
                            region,
                            category,
                            parameter,
                            mode,
                            powertrain,
                            year,
                            unit,
                            value,
                        });
                    }
                }
            }
        }
    }
    rows
}

fn write_csv(path: &Path, rows: &[Row]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV file")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV file")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[Row]) -> Result<()> {
    let text = |f: fn(&Row) -> &'static str| -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    };

    let schema = Arc::new(Schema::new(vec![
        Field::new("region", DataType::Utf8, false),
        Field::new("category", DataType::Utf8, false),
        Field::new("parameter", DataType::Utf8, false),
        Field::new("mode", DataType::Utf8, false),
        Field::new("powertrain", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
        Field::new("unit", DataType::Utf8, false),
        Field::new("value", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            text(|r| r.region),
            text(|r| r.category),
            text(|r| r.parameter),
            text(|r| r.mode),
            text(|r| r.powertrain),
            Arc::new(Int32Array::from_iter_values(rows.iter().map(|r| r.year))),
            text(|r| r.unit),
            Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.value))),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let output = std::env::args().nth(1).unwrap_or_else(|| "data.csv".to_string());
    let path = Path::new(&output);

    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let is_parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet") || e.eq_ignore_ascii_case("pq"));
    if is_parquet {
        write_parquet(path, &rows)?;
    } else {
        write_csv(path, &rows)?;
    }

    println!("Wrote {} records to {output}", rows.len());
    Ok(())
}
