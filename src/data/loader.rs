use std::path::Path;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value};

use super::error::DataError;
use super::model::{Record, RecordSet, REQUIRED_COLUMNS};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the record set from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming at least the required columns
/// * `.json`    – `[{ "region": "...", "year": 2020, ... }, ...]`
/// * `.parquet` – flat columns; years are read as text, values cast to Float64
///
/// Missing columns, unparseable cells and empty files are rejected.
pub fn load_file(path: &Path) -> Result<RecordSet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(DataError::UnsupportedFormat(other.to_string()).into()),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    let set = RecordSet::from_records(records)
        .with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "Loaded {} records from {} ({} regions, years {}–{})",
        set.len(),
        path.display(),
        set.regions().len(),
        set.year_bounds().start(),
        set.year_bounds().end()
    );
    Ok(set)
}

/// Fail with every required column `present` does not contain.
fn check_columns(present: &[&str]) -> Result<(), DataError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !present.contains(*col))
        .map(|col| col.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataError::MissingColumns(missing))
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Column positions of the required fields inside a CSV header.
struct CsvColumns {
    region: usize,
    year: usize,
    category: usize,
    value: usize,
    powertrain: usize,
    parameter: usize,
    mode: usize,
}

impl CsvColumns {
    fn locate(headers: &[String]) -> Result<Self, DataError> {
        let names: Vec<&str> = headers.iter().map(String::as_str).collect();
        check_columns(&names)?;
        let at = |name: &str| headers.iter().position(|h| h == name).unwrap_or_default();
        Ok(CsvColumns {
            region: at("region"),
            year: at("year"),
            category: at("category"),
            value: at("value"),
            powertrain: at("powertrain"),
            parameter: at("parameter"),
            mode: at("mode"),
        })
    }
}

fn load_csv(path: &Path) -> Result<Vec<Record>> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Record>> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let cols = CsvColumns::locate(&headers)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let text = |idx: usize| record.get(idx).unwrap_or("").trim();

        records.push(Record {
            region: text(cols.region).to_string(),
            year: parse_year(text(cols.year), row_no)?,
            category: text(cols.category).to_string(),
            value: parse_value(text(cols.value), row_no)?,
            powertrain: text(cols.powertrain).to_string(),
            parameter: text(cols.parameter).to_string(),
            mode: text(cols.mode).to_string(),
        });
    }
    Ok(records)
}

/// Years may be written as `2021` or `2021.0` (pandas float export).
fn parse_year(s: &str, row: usize) -> Result<i32, DataError> {
    if s.is_empty() {
        return Err(DataError::MissingValue { row, column: "year" });
    }
    let invalid = || DataError::InvalidValue {
        row,
        column: "year",
        value: s.to_string(),
    };
    if let Ok(y) = s.parse::<i32>() {
        return Ok(y);
    }
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 && f >= f64::from(i32::MIN) && f <= f64::from(i32::MAX) => {
            Ok(f as i32)
        }
        _ => Err(invalid()),
    }
}

fn parse_value(s: &str, row: usize) -> Result<f64, DataError> {
    if s.is_empty() {
        return Err(DataError::MissingValue {
            row,
            column: "value",
        });
    }
    s.parse::<f64>().map_err(|_| DataError::InvalidValue {
        row,
        column: "value",
        value: s.to_string(),
    })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "region": "Norway", "year": 2021, "category": "Historical",
///     "value": 113000.0, "powertrain": "BEV",
///     "parameter": "EV sales", "mode": "Cars" },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<Record>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text)
}

fn parse_json(text: &str) -> Result<Vec<Record>> {
    let rows: Vec<Map<String, Value>> =
        serde_json::from_str(text).context("Expected top-level JSON array of objects")?;

    let records = rows
        .iter()
        .enumerate()
        .map(|(row_no, row)| json_record(row, row_no))
        .collect::<Result<Vec<_>, DataError>>()?;
    Ok(records)
}

/// Every object is checked on its own; `year` and `value` go through the
/// same parsers as CSV cells.
fn json_record(row: &Map<String, Value>, row_no: usize) -> Result<Record, DataError> {
    let keys: Vec<&str> = row.keys().map(String::as_str).collect();
    check_columns(&keys)?;

    let cell = |column: &'static str| -> Result<String, DataError> {
        match row.get(column) {
            None | Some(Value::Null) => Err(DataError::MissingValue {
                row: row_no,
                column,
            }),
            Some(Value::String(s)) => Ok(s.trim().to_string()),
            Some(other) => Ok(other.to_string()),
        }
    };

    Ok(Record {
        region: cell("region")?,
        year: parse_year(&cell("year")?, row_no)?,
        category: cell("category")?,
        value: parse_value(&cell("value")?, row_no)?,
        powertrain: cell("powertrain")?,
        parameter: cell("parameter")?,
        mode: cell("mode")?,
    })
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Vec<Record>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    check_columns(&names)?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        append_batch(&batch, records.len(), &mut records)?;
    }
    Ok(records)
}

/// Decode one record batch; `offset` is the number of rows already read.
fn append_batch(batch: &RecordBatch, offset: usize, out: &mut Vec<Record>) -> Result<()> {
    let column = |name: &str, to: &DataType| -> Result<ArrayRef> {
        let col = batch
            .column_by_name(name)
            .ok_or_else(|| DataError::MissingColumns(vec![name.to_string()]))?;
        cast(col.as_ref(), to).with_context(|| format!("column '{name}' cannot be read as {to:?}"))
    };

    let region = column("region", &DataType::Utf8)?;
    // Years are formatted and reparsed like CSV cells: a plain cast would
    // truncate fractional years and null out overflowing ones.
    let year = column("year", &DataType::Utf8)?;
    let category = column("category", &DataType::Utf8)?;
    let value = column("value", &DataType::Float64)?;
    let powertrain = column("powertrain", &DataType::Utf8)?;
    let parameter = column("parameter", &DataType::Utf8)?;
    let mode = column("mode", &DataType::Utf8)?;

    let values = value.as_primitive::<Float64Type>();

    for row in 0..batch.num_rows() {
        let abs = offset + row;
        let text = |arr: &ArrayRef, column: &'static str| -> Result<String, DataError> {
            if arr.is_null(row) {
                return Err(DataError::MissingValue { row: abs, column });
            }
            Ok(arr.as_string::<i32>().value(row).to_string())
        };
        if values.is_null(row) {
            return Err(DataError::MissingValue {
                row: abs,
                column: "value",
            }
            .into());
        }

        out.push(Record {
            region: text(&region, "region")?,
            year: parse_year(text(&year, "year")?.trim(), abs)?,
            category: text(&category, "category")?,
            value: values.value(row),
            powertrain: text(&powertrain, "powertrain")?,
            parameter: text(&parameter, "parameter")?,
            mode: text(&mode, "mode")?,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    const CSV: &str = "\
region,category,parameter,mode,powertrain,year,unit,value
North,Historical,EV sales,Cars,BEV,2020,Vehicles,100
South,Historical,EV stock share,Buses,PHEV,2021.0,percent,2.5
";

    fn write_temp(suffix: &str, contents: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents).unwrap();
        file
    }

    fn root_cause(err: &anyhow::Error) -> Option<&DataError> {
        err.chain().find_map(|e| e.downcast_ref::<DataError>())
    }

    #[test]
    fn csv_loads_required_columns_and_ignores_extras() {
        let file = write_temp(".csv", CSV.as_bytes());
        let set = load_file(file.path()).unwrap();

        assert_eq!(set.len(), 2);
        let second = &set.records()[1];
        assert_eq!(second.region, "South");
        assert_eq!(second.year, 2021);
        assert_eq!(second.value, 2.5);
        assert_eq!(second.parameter, "EV stock share");
        assert_eq!(second.mode, "Buses");
    }

    #[test]
    fn csv_missing_columns_are_named() {
        let file = write_temp(".csv", b"region,year,value\nNorth,2020,1\n");
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(
            root_cause(&err),
            Some(&DataError::MissingColumns(vec![
                "category".into(),
                "powertrain".into(),
                "parameter".into(),
                "mode".into(),
            ]))
        );
    }

    #[test]
    fn csv_bad_value_reports_row_and_column() {
        let data = CSV.replace(",100\n", ",lots\n");
        let file = write_temp(".csv", data.as_bytes());
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(
            root_cause(&err),
            Some(&DataError::InvalidValue {
                row: 0,
                column: "value",
                value: "lots".into()
            })
        );
    }

    #[test]
    fn csv_with_only_header_is_empty() {
        let file = write_temp(".csv", b"region,year,category,value,powertrain,parameter,mode\n");
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(root_cause(&err), Some(&DataError::Empty));
    }

    #[test]
    fn fractional_year_is_invalid() {
        assert!(matches!(
            parse_year("2020.5", 3),
            Err(DataError::InvalidValue { row: 3, .. })
        ));
        assert_eq!(parse_year("", 1), Err(DataError::MissingValue { row: 1, column: "year" }));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = write_temp(".xlsx", b"");
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(
            root_cause(&err),
            Some(&DataError::UnsupportedFormat("xlsx".into()))
        );
    }

    #[test]
    fn json_matches_csv() {
        let json = r#"[
            {"region": "North", "category": "Historical", "parameter": "EV sales",
             "mode": "Cars", "powertrain": "BEV", "year": 2020, "unit": "Vehicles", "value": 100.0},
            {"region": "South", "category": "Historical", "parameter": "EV stock share",
             "mode": "Buses", "powertrain": "PHEV", "year": 2021, "unit": "percent", "value": 2.5}
        ]"#;
        let csv_file = write_temp(".csv", CSV.as_bytes());
        let json_file = write_temp(".json", json.as_bytes());

        let from_csv = load_file(csv_file.path()).unwrap();
        let from_json = load_file(json_file.path()).unwrap();
        assert_eq!(from_csv.records(), from_json.records());
    }

    #[test]
    fn json_missing_column_is_named() {
        let err = parse_json(r#"[{"region": "North", "year": 2020, "value": 1.0,
            "category": "c", "powertrain": "p", "parameter": "x"}]"#)
        .unwrap_err();
        assert_eq!(
            root_cause(&err),
            Some(&DataError::MissingColumns(vec!["mode".into()]))
        );
    }

    /// Two-row parquet file shaped like `CSV`, with the given `year` column.
    fn write_parquet(year: ArrayRef) -> tempfile::NamedTempFile {
        let text = |v: [&str; 2]| Arc::new(StringArray::from(v.to_vec())) as ArrayRef;
        let schema = Arc::new(Schema::new(vec![
            Field::new("region", DataType::Utf8, false),
            Field::new("category", DataType::Utf8, false),
            Field::new("parameter", DataType::Utf8, false),
            Field::new("mode", DataType::Utf8, false),
            Field::new("powertrain", DataType::Utf8, false),
            Field::new("year", year.data_type().clone(), false),
            Field::new("value", DataType::Float64, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                text(["North", "South"]),
                text(["Historical", "Historical"]),
                text(["EV sales", "EV stock share"]),
                text(["Cars", "Buses"]),
                text(["BEV", "PHEV"]),
                year,
                Arc::new(Float64Array::from(vec![100.0, 2.5])),
            ],
        )
        .unwrap();

        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
        file
    }

    #[test]
    fn parquet_matches_csv() {
        let csv_file = write_temp(".csv", CSV.as_bytes());
        let from_csv = load_file(csv_file.path()).unwrap();

        let int_years = write_parquet(Arc::new(Int64Array::from(vec![2020, 2021])));
        assert_eq!(load_file(int_years.path()).unwrap().records(), from_csv.records());

        let float_years = write_parquet(Arc::new(Float64Array::from(vec![2020.0, 2021.0])));
        assert_eq!(load_file(float_years.path()).unwrap().records(), from_csv.records());
    }

    #[test]
    fn parquet_fractional_year_is_invalid() {
        let file = write_parquet(Arc::new(Float64Array::from(vec![2020.7, 2021.0])));
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(
            root_cause(&err),
            Some(&DataError::InvalidValue {
                row: 0,
                column: "year",
                value: "2020.7".into()
            })
        );
    }

    #[test]
    fn parquet_year_outside_i32_is_invalid() {
        let file = write_parquet(Arc::new(Int64Array::from(vec![2020, 3_000_000_000])));
        let err = load_file(file.path()).unwrap_err();
        assert_eq!(
            root_cause(&err),
            Some(&DataError::InvalidValue {
                row: 1,
                column: "year",
                value: "3000000000".into()
            })
        );
    }

    #[test]
    fn json_rows_are_checked_individually() {
        let row = |extra: &str| {
            format!(
                r#"{{"region": "North", "category": "c", "parameter": "x",
                    "powertrain": "p", "mode": "Cars", {extra}}}"#
            )
        };
        let good = row(r#""year": 2020, "value": 1.0"#);

        let missing_key = format!("[{good}, {}]", row(r#""year": 2021"#));
        let err = parse_json(&missing_key).unwrap_err();
        assert_eq!(
            root_cause(&err),
            Some(&DataError::MissingColumns(vec!["value".into()]))
        );

        let null_value = format!("[{good}, {}]", row(r#""year": 2021, "value": null"#));
        let err = parse_json(&null_value).unwrap_err();
        assert_eq!(
            root_cause(&err),
            Some(&DataError::MissingValue {
                row: 1,
                column: "value"
            })
        );

        let fractional = format!("[{good}, {}]", row(r#""year": 2021.5, "value": 1.0"#));
        let err = parse_json(&fractional).unwrap_err();
        assert_eq!(
            root_cause(&err),
            Some(&DataError::InvalidValue {
                row: 1,
                column: "year",
                value: "2021.5".into()
            })
        );
    }
}
