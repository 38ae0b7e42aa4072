use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Date32Array, Float32Array, Float64Array, Int32Array,
    Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Dataset, Row};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line
/// * `.json`    – `[{ "col": value, ... }, ...]` (records orientation)
/// * `.parquet` – flat scalar columns
/// * `.xlsx` / `.xls` / `.xlsm` / `.xlsb` / `.ods` – first worksheet, header row first
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("dataset")
        .to_string();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path, name),
        "json" => load_json(path, name),
        "parquet" | "pq" => load_parquet(path, name),
        "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => load_workbook(path, name),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    log::debug!(
        "parsed {} rows x {} columns from {}",
        dataset.len(),
        dataset.column_names.len(),
        path.display()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one record per line.
/// Cell types are guessed per cell (see [`CellValue::parse_guess`]).
fn load_csv(path: &Path, name: String) -> Result<Dataset> {
    let reader = csv::Reader::from_path(path).context("opening CSV")?;
    read_csv(reader, name)
}

/// Parse CSV from any reader; shared by the file loader and tests.
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>, name: String) -> Result<Dataset> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut row = Row::default();
        for (col_idx, value) in record.iter().enumerate() {
            let Some(col_name) = headers.get(col_idx) else {
                bail!("CSV row {row_no}: more fields than header columns");
            };
            row.insert(col_name.clone(), CellValue::parse_guess(value));
        }
        rows.push(row);
    }

    Ok(Dataset::new(name, headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "region": "North", "sales": 120.5, "units": 12 },
///   ...
/// ]
/// ```
fn load_json(path: &Path, name: String) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text, name)
}

/// Parse records-oriented JSON text.
pub fn parse_json(text: &str, name: String) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut column_names: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut row = Row::default();
        for (key, val) in obj {
            if !column_names.contains(key) {
                column_names.push(key.clone());
            }
            row.insert(key.clone(), json_to_cell(val));
        }
        rows.push(row);
    }

    Ok(Dataset::new(name, column_names, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the first worksheet of a spreadsheet. The first row holds the
/// column names; blank header cells become `column_<n>` (1-based).
fn load_workbook(path: &Path, name: String) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("workbook has no worksheets")?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("reading worksheet '{sheet}'"))?;

    let mut lines = range.rows();
    let Some(header) = lines.next() else {
        return Ok(Dataset::new(name, Vec::new(), Vec::new()));
    };
    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell.to_string().trim() {
            "" => format!("column_{}", i + 1),
            text => text.to_string(),
        })
        .collect();

    let rows = lines
        .map(|line| {
            headers
                .iter()
                .zip(line)
                .map(|(col, cell)| (col.clone(), sheet_cell(cell)))
                .collect::<Row>()
        })
        .collect();

    Ok(Dataset::new(name, headers, rows))
}

/// Spreadsheets store every number as a float; whole values read back as
/// integers, like they would from CSV.
fn sheet_cell(cell: &Data) -> CellValue {
    const EXACT_INT: f64 = 9_007_199_254_740_992.0; // 2^53
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < EXACT_INT => CellValue::Integer(*f as i64),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if s.is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::DateTime(_) | Data::DateTimeIso(_) => CellValue::Date(cell.to_string()),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Nested columns are rendered as their
/// Arrow type name.
fn load_parquet(path: &Path, name: String) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let n_rows = batch.num_rows();

        for row_idx in 0..n_rows {
            let mut row = Row::default();
            for (col_idx, col_name) in column_names.iter().enumerate() {
                let value = extract_cell(batch.column(col_idx), row_idx)
                    .with_context(|| format!("Row {row_idx}: failed to read '{col_name}'"))?;
                row.insert(col_name.clone(), value);
            }
            rows.push(row);
        }
    }

    Ok(Dataset::new(name, column_names, rows))
}

// -- Parquet / Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => {
            let s = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            CellValue::String(s.value(row).to_string())
        }
        DataType::LargeUtf8 => {
            let s = col.as_string::<i64>();
            CellValue::String(s.value(row).to_string())
        }
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            CellValue::Bool(arr.value(row))
        }
        DataType::Date32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Date32Array>()
                .context("expected Date32Array")?;
            match arr.value_as_date(row) {
                Some(d) => CellValue::Date(d.to_string()),
                None => CellValue::Null,
            }
        }
        other => CellValue::String(format!("{other:?}")),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn csv_keeps_header_order_and_guesses_types() {
        let text = "region,sales,units,note\nNorth,120.5,12,\nSouth,80,7,late\n";
        let reader = csv::Reader::from_reader(text.as_bytes());
        let ds = read_csv(reader, "sales.csv".into()).unwrap();

        assert_eq!(ds.len(), 2);
        assert_eq!(ds.column_names, vec!["region", "sales", "units", "note"]);
        assert_eq!(ds.rows[0].get("sales"), &CellValue::Float(120.5));
        assert_eq!(ds.rows[1].get("units"), &CellValue::Integer(7));
        assert_eq!(ds.rows[0].get("note"), &CellValue::Null);
        assert_eq!(ds.numeric_columns(), vec!["sales", "units"]);
    }

    #[test]
    fn json_records_keep_first_seen_order() {
        let text = r#"[{"b": 1, "a": "x"}, {"c": 2.5, "b": null}]"#;
        let ds = parse_json(text, "t.json".into()).unwrap();
        // serde_json objects iterate sorted unless preserve_order is on
        assert_eq!(ds.column_names, vec!["a", "b", "c"]);
        assert_eq!(ds.rows[1].get("b"), &CellValue::Null);
        assert_eq!(ds.rows[1].get("c"), &CellValue::Float(2.5));
        assert_eq!(ds.rows[0].get("c"), &CellValue::Null);
    }

    #[test]
    fn json_rejects_non_array_root() {
        let err = parse_json(r#"{"a": 1}"#, "t.json".into()).unwrap_err();
        assert!(format!("{err:#}").contains("top-level JSON array"));
    }

    #[test]
    fn load_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.CSV");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "a,b").unwrap();
        writeln!(f, "1,2").unwrap();
        drop(f);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.name, "data.CSV");
        assert_eq!(ds.len(), 1);

        let bad = dir.path().join("data.txt");
        std::fs::write(&bad, "a").unwrap();
        assert!(load_file(&bad).is_err());
    }

    #[test]
    fn xlsx_first_sheet_with_header_row() {
        use rust_xlsxwriter::Workbook;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "region").unwrap();
        sheet.write_string(0, 1, "units").unwrap();
        sheet.write_string(0, 2, "price").unwrap();
        sheet.write_string(0, 3, "late").unwrap();
        sheet.write_string(1, 0, "North").unwrap();
        sheet.write_number(1, 1, 12.0).unwrap();
        sheet.write_number(1, 2, 9.5).unwrap();
        sheet.write_boolean(1, 3, true).unwrap();
        sheet.write_string(2, 0, "South").unwrap();
        sheet.write_number(2, 1, 7.0).unwrap();
        sheet.write_number(2, 2, 24.0).unwrap();
        workbook.save(&path).unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.name, "sales.xlsx");
        assert_eq!(ds.column_names, vec!["region", "units", "price", "late"]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.rows[0].get("region"), &CellValue::from("North"));
        assert_eq!(ds.rows[0].get("units"), &CellValue::Integer(12));
        assert_eq!(ds.rows[0].get("price"), &CellValue::Float(9.5));
        assert_eq!(ds.rows[0].get("late"), &CellValue::Bool(true));
        assert_eq!(ds.rows[1].get("late"), &CellValue::Null);
        assert_eq!(ds.numeric_columns(), vec!["units", "price"]);
    }

    #[test]
    fn unreadable_workbook_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, "not a zip archive").unwrap();
        let err = load_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("opening workbook"));
    }
}
