use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Column, Dataset, Record, STATION, WIND_DIRECTION};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a station table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the PRSA column names (recommended)
/// * `.json`    – `[{ "year": 2013, "month": 3, ..., "wd": "NNW" }, ...]`
/// * `.parquet` – flat columns with the same names (ints, floats, strings)
///
/// Any failure is reported as [`DashboardError::DataUnavailable`].
pub fn load_file(path: &Path) -> crate::error::Result<Dataset> {
    load_by_extension(path).map_err(|e| DashboardError::DataUnavailable {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })
}

/// [`load_file`] followed by an in-place forward fill of each given column.
pub fn load_and_impute(path: &Path, fill: &[Column]) -> crate::error::Result<Dataset> {
    let mut dataset = load_file(path)?;
    for &column in fill {
        let filled = dataset.forward_fill(column);
        log::info!("Forward-filled {filled} missing {column} values");
    }
    Ok(dataset)
}

fn load_by_extension(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Shared schema handling
// ---------------------------------------------------------------------------

/// The numeric columns a source carries.
struct Schema {
    columns: BTreeSet<Column>,
}

impl Schema {
    fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let mut columns = BTreeSet::new();
        let mut has_wind = false;
        for name in names {
            if let Some(col) = Column::from_name(name) {
                columns.insert(col);
            } else if name == WIND_DIRECTION {
                has_wind = true;
            }
        }

        let mut missing: Vec<&str> = Column::ALL
            .iter()
            .filter(|c| c.is_required() && !columns.contains(*c))
            .map(|c| c.name())
            .collect();
        if !has_wind {
            missing.push(WIND_DIRECTION);
        }
        if !missing.is_empty() {
            bail!("missing required column(s): {}", missing.join(", "));
        }
        Ok(Schema { columns })
    }
}

/// Assemble one record, rejecting rows with a missing or impossible timestamp.
fn build_record(
    row: usize,
    cells: impl IntoIterator<Item = (Column, Option<f64>)>,
    wd: Option<String>,
    station: Option<String>,
) -> Result<Record> {
    let mut rec = Record::default();
    for (col, value) in cells {
        if col.is_timestamp() {
            let Some(v) = value else {
                bail!("row {row}: missing value in '{col}'");
            };
            check_timestamp(row, col, v)?;
        }
        rec.set(col, value);
    }
    rec.wd = wd;
    rec.station = station;
    Ok(rec)
}

/// Timestamp cells must be whole numbers within their calendar range.
fn check_timestamp(row: usize, col: Column, v: f64) -> Result<()> {
    if !v.is_finite() || v.fract() != 0.0 {
        bail!("row {row}: '{col}' value {v} is not a whole number");
    }
    let range = match col {
        Column::Month => 1.0..=12.0,
        Column::Day => 1.0..=31.0,
        Column::Hour => 0.0..=23.0,
        _ => f64::from(i32::MIN)..=f64::from(i32::MAX),
    };
    if !range.contains(&v) {
        bail!("row {row}: {col} {v} out of range");
    }
    Ok(())
}

/// Empty cells and the usual NA spellings count as missing.
fn is_missing(s: &str) -> bool {
    matches!(s, "" | "NA" | "N/A" | "NaN" | "nan" | "null")
}

fn parse_number(s: &str, row: usize, col: Column) -> Result<Option<f64>> {
    let s = s.trim();
    if is_missing(s) {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .with_context(|| format!("row {row}, {col}: '{s}' is not a number"))
}

fn text_cell(s: &str) -> Option<String> {
    let s = s.trim();
    (!is_missing(s)).then(|| s.to_string())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one hourly observation per row.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let schema = Schema::from_names(headers.iter().map(String::as_str))?;
    let numeric: Vec<(usize, Column)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| Column::from_name(h).map(|c| (i, c)))
        .collect();
    let wd_idx = headers.iter().position(|h| h == WIND_DIRECTION);
    let station_idx = headers.iter().position(|h| h == STATION);

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cells = numeric
            .iter()
            .map(|&(i, col)| Ok((col, parse_number(record.get(i).unwrap_or(""), row_no, col)?)))
            .collect::<Result<Vec<_>>>()?;
        let wd = wd_idx.and_then(|i| record.get(i)).and_then(text_cell);
        let station = station_idx.and_then(|i| record.get(i)).and_then(text_cell);
        records.push(build_record(row_no, cells, wd, station)?);
    }

    Ok(Dataset::from_records(records, schema.columns))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "year": 2013, "month": 3, "day": 1, "hour": 0, "PM2.5": 9.0, "wd": "NNW", ... },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut names: BTreeSet<&str> = BTreeSet::new();
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        names.extend(obj.keys().map(String::as_str));
    }
    let schema = Schema::from_names(names.iter().copied())?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        let cells = schema
            .columns
            .iter()
            .map(|&col| Ok((col, json_number(obj.get(col.name()), i, col)?)))
            .collect::<Result<Vec<_>>>()?;
        let wd = obj.get(WIND_DIRECTION).and_then(json_text);
        let station = obj.get(STATION).and_then(json_text);
        records.push(build_record(i, cells, wd, station)?);
    }

    Ok(Dataset::from_records(records, schema.columns))
}

fn json_number(val: Option<&JsonValue>, row: usize, col: Column) -> Result<Option<f64>> {
    match val {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => Ok(n.as_f64()),
        Some(JsonValue::String(s)) => parse_number(s, row, col),
        Some(other) => bail!("Row {row}, {col}: {other} is not a number"),
    }
}

fn json_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::String(s) => text_cell(s),
        JsonValue::Null => None,
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per header name.
///
/// Numeric columns may be any integer or float type, text columns Utf8 or
/// LargeUtf8. Works with files written by both **Pandas**
/// (`df.to_parquet()`) and **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = Schema::from_names(builder.schema().fields().iter().map(|f| f.name().as_str()))?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let batch_schema = batch.schema();

        let mut numeric = Vec::with_capacity(schema.columns.len());
        for &col in &schema.columns {
            let idx = batch_schema.index_of(col.name())?;
            let floats = cast(batch.column(idx), &DataType::Float64)
                .with_context(|| format!("column '{col}' is not numeric"))?;
            numeric.push((col, floats));
        }
        let wd = text_column(&batch, WIND_DIRECTION)?;
        let station = text_column(&batch, STATION)?;

        for row in 0..batch.num_rows() {
            let cells = numeric.iter().map(|(col, arr)| {
                let arr = arr.as_primitive::<Float64Type>();
                let value = (!arr.is_null(row))
                    .then(|| arr.value(row))
                    .filter(|v| !v.is_nan());
                (*col, value)
            });
            let row_no = records.len();
            records.push(build_record(
                row_no,
                cells,
                text_value(wd.as_ref(), row),
                text_value(station.as_ref(), row),
            )?);
        }
    }

    Ok(Dataset::from_records(records, schema.columns))
}

// -- Parquet / Arrow helpers --

/// Fetch an optional text column, normalised to Utf8.
fn text_column(batch: &arrow::record_batch::RecordBatch, name: &str) -> Result<Option<ArrayRef>> {
    let Ok(idx) = batch.schema().index_of(name) else {
        return Ok(None);
    };
    let arr = cast(batch.column(idx), &DataType::Utf8)
        .with_context(|| format!("column '{name}' is not text"))?;
    Ok(Some(arr))
}

fn text_value(col: Option<&ArrayRef>, row: usize) -> Option<String> {
    let col = col?;
    if col.is_null(row) {
        return None;
    }
    text_cell(col.as_string::<i32>().value(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Arc;

    const HEADER: &str =
        "No,year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd,WSPM,station";

    fn write_temp(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_csv() {
        let csv = format!(
            "{HEADER}\n\
             1,2013,3,1,0,9,9,6,17,200,62,0.3,1021.9,-19,0,WNW,2,Wanshouxigong\n\
             2,2013,3,1,1,NA,11,7,,200,63,-0.1,1022.4,-19.3,0,NA,4.4,Wanshouxigong\n"
        );
        let file = write_temp(".csv", &csv);
        let ds = load_file(file.path()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.columns().len(), Column::ALL.len());
        let first = &ds.records()[0];
        assert_eq!((first.year, first.month, first.day, first.hour), (2013, 3, 1, 0));
        assert_eq!(first.pm25, Some(9.0));
        assert_eq!(first.wd.as_deref(), Some("WNW"));
        assert_eq!(first.station.as_deref(), Some("Wanshouxigong"));
        let second = &ds.records()[1];
        assert_eq!(second.pm25, None);
        assert_eq!(second.no2, None);
        assert_eq!(second.wd, None);
    }

    #[test]
    fn test_optional_columns_may_be_absent() {
        let csv = "year,month,day,hour,PM2.5,PM10,SO2,NO2,CO,O3,TEMP,PRES,DEWP,RAIN,wd\n\
                   2014,1,2,3,1,2,3,4,5,6,7,8,9,0,N\n";
        let file = write_temp(".csv", csv);
        let ds = load_file(file.path()).unwrap();
        assert!(!ds.has_column(Column::Wspm));
        assert!(!ds.has_column(Column::No));
        assert_eq!(ds.records()[0].station, None);
    }

    #[test]
    fn test_missing_required_column_is_data_unavailable() {
        let csv = "year,month,day,hour,PM2.5\n2013,1,1,0,5\n";
        let file = write_temp(".csv", csv);
        let err = load_file(file.path()).unwrap_err();
        match err {
            DashboardError::DataUnavailable { reason, .. } => {
                assert!(reason.contains("PM10"));
                assert!(reason.contains("wd"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_load_and_impute_fills_listed_columns() {
        let csv = format!(
            "{HEADER}\n\
             1,2013,3,1,0,10,9,6,17,200,62,0.3,1021.9,-19,0,N,2,S\n\
             2,2013,3,1,1,NA,11,7,NA,200,63,-0.1,1022.4,-19.3,0,N,4.4,S\n"
        );
        let file = write_temp(".csv", &csv);
        let ds = load_and_impute(file.path(), &[Column::Pm25]).unwrap();
        assert_eq!(ds.records()[1].pm25, Some(10.0));
        assert_eq!(ds.records()[1].no2, None);
    }

    #[test]
    fn test_missing_file_is_data_unavailable() {
        let err = load_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, DashboardError::DataUnavailable { .. }));
    }

    #[test]
    fn test_bad_number_and_timestamp() {
        let bad_value = format!("{HEADER}\n1,2013,3,1,0,abc,9,6,17,200,62,0.3,1021.9,-19,0,N,2,S\n");
        let file = write_temp(".csv", &bad_value);
        assert!(load_file(file.path()).is_err());

        let bad_month = format!("{HEADER}\n1,2013,13,1,0,1,9,6,17,200,62,0.3,1021.9,-19,0,N,2,S\n");
        let file = write_temp(".csv", &bad_month);
        assert!(load_file(file.path()).is_err());

        let no_year = format!("{HEADER}\n1,,3,1,0,1,9,6,17,200,62,0.3,1021.9,-19,0,N,2,S\n");
        let file = write_temp(".csv", &no_year);
        assert!(load_file(file.path()).is_err());
    }

    #[test]
    fn test_malformed_timestamps_rejected() {
        for (day, hour) in [("1", "2.5"), ("-5", "0"), ("32", "0"), ("0", "0"), ("1", "24")] {
            let csv = format!(
                "{HEADER}\n1,2013,3,{day},{hour},1,9,6,17,200,62,0.3,1021.9,-19,0,N,2,S\n"
            );
            let file = write_temp(".csv", &csv);
            let err = load_file(file.path()).unwrap_err();
            assert!(
                matches!(err, DashboardError::DataUnavailable { .. }),
                "day={day} hour={hour}"
            );
        }

        let ok = format!("{HEADER}\n1,2013,3,31,23.0,1,9,6,17,200,62,0.3,1021.9,-19,0,N,2,S\n");
        let file = write_temp(".csv", &ok);
        let ds = load_file(file.path()).unwrap();
        assert_eq!((ds.records()[0].day, ds.records()[0].hour), (31, 23));
    }

    #[test]
    fn test_unsupported_extension() {
        let file = write_temp(".xlsx", "");
        let err = load_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn test_load_json() {
        let json = r#"[
            {"year": 2013, "month": 3, "day": 1, "hour": 0, "PM2.5": 4.0, "PM10": 4,
             "SO2": 4, "NO2": 7, "CO": 300, "O3": 77, "TEMP": -0.7, "PRES": 1023,
             "DEWP": -18.8, "RAIN": 0, "wd": "NNW"},
            {"year": 2013, "month": 3, "day": 1, "hour": 1, "PM2.5": null, "PM10": "8",
             "SO2": 4, "NO2": 7, "CO": 300, "O3": 77, "TEMP": -1.1, "PRES": 1023.2,
             "DEWP": -18.2, "RAIN": 0, "wd": null}
        ]"#;
        let file = write_temp(".json", json);
        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records()[0].wd.as_deref(), Some("NNW"));
        assert_eq!(ds.records()[1].pm25, None);
        assert_eq!(ds.records()[1].pm10, Some(8.0));
    }

    #[test]
    fn test_load_parquet() {
        use arrow::array::{Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema as ArrowSchema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let mut fields = Vec::new();
        let mut arrays: Vec<ArrayRef> = Vec::new();
        for col in Column::ALL.iter().filter(|c| c.is_required()) {
            if col.is_timestamp() {
                fields.push(Field::new(col.name(), DataType::Int64, false));
                let v: i64 = match col {
                    Column::Year => 2015,
                    Column::Month => 6,
                    _ => 1,
                };
                arrays.push(Arc::new(Int64Array::from(vec![v, v])));
            } else {
                fields.push(Field::new(col.name(), DataType::Float64, true));
                arrays.push(Arc::new(Float64Array::from(vec![Some(1.5), None])));
            }
        }
        fields.push(Field::new(WIND_DIRECTION, DataType::Utf8, true));
        arrays.push(Arc::new(StringArray::from(vec![Some("SE"), None])));

        let schema = Arc::new(ArrowSchema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();
        let file = tempfile::Builder::new().suffix(".parquet").tempfile().unwrap();
        let mut writer = ArrowWriter::try_new(file.reopen().unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(file.path()).unwrap();
        assert_eq!(ds.len(), 2);
        let first = &ds.records()[0];
        assert_eq!((first.year, first.month), (2015, 6));
        assert_eq!(first.pm25, Some(1.5));
        assert_eq!(first.wd.as_deref(), Some("SE"));
        assert_eq!(ds.records()[1].rain, None);
        assert_eq!(ds.records()[1].wd, None);
    }
}
