use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use calamine::{Data, ExcelDateTime, Reader, open_workbook_auto};
use chrono::NaiveTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{
    CellValue, CustomerType, Gender, Payment, SalesTable, TimeOfDay, Transaction, normalize_header,
};
use crate::config::SourceConfig;
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the transaction table described by `source`.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – `sheet`, `skip_rows`, `columns`
///   and `row_cap` all apply
/// * `.csv`     – header after `skip_rows` lines, `row_cap` applies
/// * `.json`    – `[{ "City": "...", "Total": 1.0, ... }, ...]`
/// * `.parquet` – flat columns named like the sheet headers
///
/// The load is all-or-nothing: a single bad row fails it.
pub fn load(source: &SourceConfig) -> Result<SalesTable> {
    let path = source.path.as_path();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let raw = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_workbook(source)?,
        "csv" => read_csv(source)?,
        "json" => read_json(source)?,
        "parquet" | "pq" => read_parquet(source)?,
        other => {
            return Err(DashboardError::unavailable(
                path,
                format!("unsupported file extension: .{other}"),
            ));
        }
    };

    let table = build_table(raw)?;
    log::info!(
        "Loaded {} transactions from {} (extra columns: {:?})",
        table.len(),
        path.display(),
        table.extra_columns()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// RawSheet – header + cells, before typing
// ---------------------------------------------------------------------------

/// Untyped grid produced by the format readers.
#[derive(Debug, Default)]
struct RawSheet {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// Spreadsheet reader
// ---------------------------------------------------------------------------

fn read_workbook(source: &SourceConfig) -> Result<RawSheet> {
    let path = source.path.as_path();
    let range_spec = source
        .column_range()
        .map_err(|e| DashboardError::InvalidConfig { detail: format!("{e:#}") })?;

    let mut workbook =
        open_workbook_auto(path).map_err(|e| DashboardError::unavailable(path, e))?;
    let range = workbook
        .worksheet_range(&source.sheet)
        .map_err(|e| DashboardError::unavailable(path, format!("sheet '{}': {e}", source.sheet)))?;

    // Sheet coordinates are absolute: a banner in rows 1-3 still counts
    // towards `skip_rows` even though calamine trims leading blank rows.
    let Some(last) = range.end() else {
        return Ok(RawSheet::default());
    };
    let header_row = source.skip_rows as u32;
    let cell = |row: u32, col: usize| -> CellValue {
        range
            .get_value((row, col as u32))
            .map(cell_from_calamine)
            .unwrap_or(CellValue::Null)
    };

    let headers: Vec<String> = range_spec
        .indices()
        .map(|c| cell(header_row, c).to_string().trim().to_string())
        .collect();
    log::debug!("Sheet '{}' header at row {}: {headers:?}", source.sheet, header_row + 1);

    let rows = (header_row + 1..=last.0)
        .take(source.row_cap)
        .map(|r| range_spec.indices().map(|c| cell(r, c)).collect())
        .collect();

    Ok(RawSheet { headers, rows })
}

fn cell_from_calamine(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::Text(excel_datetime_to_text(dt)),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

/// Render a date/time-formatted cell as `YYYY-MM-DD`, `HH:MM:SS`, or both.
/// calamine applies the 1904 date system and the 1900 leap-year quirk.
fn excel_datetime_to_text(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        return match dt.as_duration() {
            Some(d) => {
                let secs = d.num_seconds();
                format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
            }
            None => dt.as_f64().to_string(),
        };
    }
    let Some(datetime) = dt.as_datetime() else {
        return dt.as_f64().to_string();
    };
    // A serial without a day part is a bare time of day.
    if dt.as_f64().trunc() == 0.0 {
        return datetime.format("%H:%M:%S").to_string();
    }
    if datetime.time() == NaiveTime::MIN {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// CSV layout: `skip_rows` preamble lines, a header row, then data.
fn read_csv(source: &SourceConfig) -> Result<RawSheet> {
    let path = source.path.as_path();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DashboardError::unavailable(path, e))?;

    let mut records = reader.records().skip(source.skip_rows);
    let headers: Vec<String> = match records.next() {
        Some(rec) => rec
            .map_err(|e| DashboardError::unavailable(path, e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for (row_no, result) in records.take(source.row_cap).enumerate() {
        let record = result.map_err(|e| DashboardError::parse(row_no + 1, "<record>", e.to_string()))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawSheet { headers, rows })
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "City": "Yangon", "Customer_type": "Member", "Total": 548.97, ... },
///   ...
/// ]
/// ```
fn read_json(source: &SourceConfig) -> Result<RawSheet> {
    let path = source.path.as_path();
    let text = std::fs::read_to_string(path).map_err(|e| DashboardError::unavailable(path, e))?;
    let root: JsonValue = serde_json::from_str(&text)
        .map_err(|e| DashboardError::unavailable(path, format!("parsing JSON: {e}")))?;
    let records = root
        .as_array()
        .ok_or_else(|| DashboardError::unavailable(path, "expected top-level JSON array"))?;

    let mut headers: Vec<String> = Vec::new();
    for rec in records.iter().take(source.row_cap) {
        if let Some(obj) = rec.as_object() {
            for key in obj.keys() {
                if !headers.contains(key) {
                    headers.push(key.clone());
                }
            }
        }
    }

    let mut rows = Vec::new();
    for (i, rec) in records.iter().take(source.row_cap).enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DashboardError::parse(i + 1, "<record>", "not a JSON object"))?;
        rows.push(
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect(),
        );
    }

    Ok(RawSheet { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Flat Parquet file whose column names match the sheet headers.  Works
/// with files written by `df.to_parquet()` and by `generate_sample`.
fn read_parquet(source: &SourceConfig) -> Result<RawSheet> {
    let path = source.path.as_path();
    let file = std::fs::File::open(path).map_err(|e| DashboardError::unavailable(path, e))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .and_then(|b| b.build())
        .map_err(|e| DashboardError::unavailable(path, format!("reading parquet: {e}")))?;

    let mut raw = RawSheet::default();
    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| DashboardError::unavailable(path, format!("reading record batch: {e}")))?;
        if raw.headers.is_empty() {
            raw.headers = batch.schema().fields().iter().map(|f| f.name().clone()).collect();
        }
        for row in 0..batch.num_rows() {
            if raw.rows.len() == source.row_cap {
                return Ok(raw);
            }
            raw.rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }
    Ok(raw)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map_or(CellValue::Null, |s| CellValue::Text(s.value(row).to_string())),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map_or(CellValue::Null, |a| CellValue::Integer(i64::from(a.value(row)))),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map_or(CellValue::Null, |a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map_or(CellValue::Null, |a| CellValue::Float(f64::from(a.value(row)))),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map_or(CellValue::Null, |a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map_or(CellValue::Null, |a| CellValue::Bool(a.value(row))),
        other => CellValue::Text(format!("{other:?}")),
    }
}

// ---------------------------------------------------------------------------
// Typing: RawSheet → SalesTable
// ---------------------------------------------------------------------------

/// Header positions of the required columns plus the pass-through ones.
struct Layout {
    city: usize,
    customer_type: usize,
    gender: usize,
    product_line: usize,
    payment: usize,
    total: usize,
    rating: usize,
    time: usize,
    extras: Vec<(usize, String)>,
}

impl Layout {
    fn resolve(headers: &[String]) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
        let find = |name: &str| -> Result<usize> {
            let wanted = normalize_header(name);
            normalized
                .iter()
                .position(|h| *h == wanted)
                .ok_or_else(|| DashboardError::SchemaMismatch {
                    column: name.to_string(),
                })
        };

        let mut layout = Layout {
            city: find("City")?,
            customer_type: find("Customer_type")?,
            gender: find("Gender")?,
            product_line: find("Product_line")?,
            payment: find("Payment")?,
            total: find("Total")?,
            rating: find("Rating")?,
            time: find("Time")?,
            extras: Vec::new(),
        };
        let typed = [
            layout.city,
            layout.customer_type,
            layout.gender,
            layout.product_line,
            layout.payment,
            layout.total,
            layout.rating,
            layout.time,
        ];
        layout.extras = headers
            .iter()
            .enumerate()
            .filter(|(i, h)| !typed.contains(i) && !h.is_empty() && normalized[*i] != "hour")
            .map(|(i, h)| (i, h.clone()))
            .collect();
        Ok(layout)
    }
}

fn build_table(raw: RawSheet) -> Result<SalesTable> {
    let layout = Layout::resolve(&raw.headers)?;
    log::debug!(
        "Column layout: city={} customer_type={} gender={} product_line={} payment={} \
         total={} rating={} time={} extras={}",
        layout.city,
        layout.customer_type,
        layout.gender,
        layout.product_line,
        layout.payment,
        layout.total,
        layout.rating,
        layout.time,
        layout.extras.len()
    );

    // Formatted-but-blank rows after the last transaction are not data;
    // a blank row before it is.
    let is_blank = |cells: &Vec<CellValue>| cells.iter().all(CellValue::is_null);
    let data_end = raw.rows.iter().rposition(|cells| !is_blank(cells)).map_or(0, |i| i + 1);

    let mut transactions = Vec::with_capacity(data_end);
    for (i, cells) in raw.rows[..data_end].iter().enumerate() {
        if is_blank(cells) {
            return Err(DashboardError::parse(i + 1, "<record>", "blank row inside the data block"));
        }
        transactions.push(parse_row(&layout, cells, i + 1)?);
    }

    let extra_columns = layout.extras.into_iter().map(|(_, name)| name).collect();
    Ok(SalesTable::from_rows(transactions, extra_columns))
}

/// Type one row; `row` is the 1-based data row number used in errors.
fn parse_row(layout: &Layout, cells: &[CellValue], row: usize) -> Result<Transaction> {
    static NULL_CELL: CellValue = CellValue::Null;
    let cell = |idx: usize| cells.get(idx).unwrap_or(&NULL_CELL);

    let text = |idx: usize, column: &str| -> Result<String> {
        let value = cell(idx);
        if value.is_null() {
            return Err(DashboardError::parse(row, column, "empty cell"));
        }
        Ok(value.to_string().trim().to_string())
    };
    let number = |idx: usize, column: &str| -> Result<f64> {
        cell(idx)
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| DashboardError::parse(row, column, format!("'{}' is not a number", cell(idx))))
    };

    let customer_type = text(layout.customer_type, "Customer_type")?
        .parse::<CustomerType>()
        .map_err(|e| DashboardError::parse(row, "Customer_type", e))?;
    let gender = text(layout.gender, "Gender")?
        .parse::<Gender>()
        .map_err(|e| DashboardError::parse(row, "Gender", e))?;
    let payment = text(layout.payment, "Payment")?
        .parse::<Payment>()
        .map_err(|e| DashboardError::parse(row, "Payment", e))?;

    let total = number(layout.total, "Total")?;
    if total < 0.0 {
        return Err(DashboardError::parse(row, "Total", format!("{total} is negative")));
    }
    let rating = number(layout.rating, "Rating")?;
    if !(0.0..=10.0).contains(&rating) {
        return Err(DashboardError::parse(row, "Rating", format!("{rating} is outside 0-10")));
    }

    let time = match cell(layout.time) {
        CellValue::Float(f) => TimeOfDay::from_day_fraction(*f),
        CellValue::Integer(i) => TimeOfDay::from_day_fraction(*i as f64),
        CellValue::Null => Err("empty cell".to_string()),
        other => TimeOfDay::parse(&other.to_string()),
    }
    .map_err(|e| DashboardError::parse(row, "Time", e))?;

    let extra: BTreeMap<String, CellValue> = layout
        .extras
        .iter()
        .map(|(idx, name)| (name.clone(), cell(*idx).clone()))
        .collect();

    Ok(Transaction {
        city: text(layout.city, "City")?,
        customer_type,
        gender,
        product_line: text(layout.product_line, "Product_line")?,
        payment,
        total,
        rating,
        time,
        hour: time.hour,
        extra,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use arrow::array::ArrayRef;
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use calamine::ExcelDateTimeType;
    use parquet::arrow::ArrowWriter;
    use rust_xlsxwriter::Workbook;

    use super::*;
    use crate::data::model::Dimension;

    const HEADER: &str = "Invoice ID,City,Customer_type,Gender,Product_line,Payment,Total,Rating,Time";

    fn csv_source(dir: &Path, body: &str) -> SourceConfig {
        let path = dir.join("sales.csv");
        std::fs::write(&path, body).unwrap();
        SourceConfig {
            path,
            skip_rows: 0,
            ..SourceConfig::default()
        }
    }

    #[test]
    fn loads_csv_and_derives_hour() {
        let dir = tempfile::tempdir().unwrap();
        let source = csv_source(
            dir.path(),
            &format!(
                "{HEADER}\n\
                 750-67-8428,Yangon,Member,Female,Health and beauty,Ewallet,548.9715,9.1,13:08:00\n\
                 226-31-3081,Naypyitaw,Normal,Female,Electronic accessories,Cash,80.22,9.6,10:29:00\n"
            ),
        );

        let table = load(&source).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].hour, 13);
        assert_eq!(table.rows()[1].payment, Payment::Cash);
        assert_eq!(table.extra_columns(), ["Invoice ID"]);
        assert_eq!(
            table.rows()[0].extra["Invoice ID"],
            CellValue::Text("750-67-8428".to_string())
        );
        assert_eq!(table.unique_values(Dimension::Hour).len(), 2);
    }

    #[test]
    fn honours_skip_rows_and_row_cap() {
        let dir = tempfile::tempdir().unwrap();
        let mut body = format!("Sales Report\nQ1 2019\n{HEADER}\n");
        for i in 0..5 {
            body.push_str(&format!("{i},Yangon,Member,Male,Sports and travel,Cash,10,5,0{i}:00:00\n"));
        }
        let mut source = csv_source(dir.path(), &body);
        source.skip_rows = 2;
        source.row_cap = 3;

        let table = load(&source).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.rows()[2].hour, 2);
    }

    #[test]
    fn missing_time_column_is_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let source = csv_source(
            dir.path(),
            "City,Customer_type,Gender,Product_line,Payment,Total,Rating\n\
             Yangon,Member,Male,Sports and travel,Cash,10,5\n",
        );
        assert_eq!(
            load(&source).unwrap_err(),
            DashboardError::SchemaMismatch {
                column: "Time".to_string()
            }
        );
    }

    #[test]
    fn invalid_time_fails_the_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        let source = csv_source(
            dir.path(),
            &format!(
                "{HEADER}\n\
                 1,Yangon,Member,Male,Sports and travel,Cash,10,5,10:00:00\n\
                 2,Yangon,Member,Male,Sports and travel,Cash,10,5,25:61:00\n"
            ),
        );
        match load(&source).unwrap_err() {
            DashboardError::ParseError { row, column, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "Time");
            }
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_payment_and_bad_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let source = csv_source(
            dir.path(),
            &format!("{HEADER}\n1,Yangon,Member,Male,Sports and travel,Cheque,10,5,10:00:00\n"),
        );
        assert!(matches!(
            load(&source),
            Err(DashboardError::ParseError { ref column, .. }) if column == "Payment"
        ));

        let source = csv_source(
            dir.path(),
            &format!("{HEADER}\n1,Yangon,Member,Male,Sports and travel,Cash,-3,5,10:00:00\n"),
        );
        assert!(matches!(
            load(&source),
            Err(DashboardError::ParseError { ref column, .. }) if column == "Total"
        ));

        let source = csv_source(
            dir.path(),
            &format!("{HEADER}\n1,Yangon,Member,Male,Sports and travel,Cash,3,11,10:00:00\n"),
        );
        assert!(matches!(
            load(&source),
            Err(DashboardError::ParseError { ref column, .. }) if column == "Rating"
        ));
    }

    #[test]
    fn missing_file_and_unknown_extension_are_unavailable() {
        let source = SourceConfig::default().with_path("/definitely/not/here.xlsx");
        assert!(matches!(load(&source), Err(DashboardError::SourceUnavailable { .. })));

        let source = SourceConfig::default().with_path(PathBuf::from("sales.txt"));
        assert!(matches!(load(&source), Err(DashboardError::SourceUnavailable { .. })));
    }

    #[test]
    fn loads_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.json");
        std::fs::write(
            &path,
            r#"[
                {"City": "Mandalay", "Customer_type": "Normal", "Gender": "Male",
                 "Product line": "Home and lifestyle", "Payment": "Credit card",
                 "Total": 340.5, "Rating": 7, "Time": "19:45:00", "Branch": "B"}
            ]"#,
        )
        .unwrap();

        let table = load(&SourceConfig::default().with_path(path)).unwrap();
        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.product_line, "Home and lifestyle");
        assert_eq!(row.payment, Payment::CreditCard);
        assert_eq!(row.rating, 7.0);
        assert_eq!(row.hour, 19);
        assert_eq!(row.extra["Branch"], CellValue::Text("B".to_string()));
    }

    /// Workbook in the production layout: banner rows, data in B:R-style
    /// range, numeric serial time in one row and text time in another.
    fn write_workbook(path: &Path, time_header: &str) {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("Sales").unwrap();
        sheet.write_string(0, 1, "Sales Report").unwrap();

        let headers = [
            "Branch", "City", "Customer_type", "Gender", "Product_line", "Payment", "Total",
            "Rating", time_header,
        ];
        for (c, h) in headers.iter().enumerate() {
            sheet.write_string(3, (c + 1) as u16, *h).unwrap();
        }
        let rows = [
            ("A", "Yangon", "Member", "Female", "Food and beverages", "Ewallet", 120.5, 8.0),
            ("C", "Naypyitaw", "Normal", "Male", "Fashion accessories", "Cash", 60.25, 6.5),
        ];
        for (r, (branch, city, ct, g, pl, pay, total, rating)) in rows.iter().enumerate() {
            let row = (r + 4) as u32;
            sheet.write_string(row, 1, *branch).unwrap();
            sheet.write_string(row, 2, *city).unwrap();
            sheet.write_string(row, 3, *ct).unwrap();
            sheet.write_string(row, 4, *g).unwrap();
            sheet.write_string(row, 5, *pl).unwrap();
            sheet.write_string(row, 6, *pay).unwrap();
            sheet.write_number(row, 7, *total).unwrap();
            sheet.write_number(row, 8, *rating).unwrap();
        }
        sheet.write_number(4, 9, 0.75).unwrap();
        sheet.write_string(5, 9, "10:29:00").unwrap();
        // Column K lies outside B:J and must be ignored.
        sheet.write_string(3, 10, "Notes").unwrap();
        workbook.save(path).unwrap();
    }

    #[test]
    fn loads_workbook_with_banner_and_column_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.xlsx");
        write_workbook(&path, "Time");

        let source = SourceConfig {
            path,
            columns: "B:J".to_string(),
            ..SourceConfig::default()
        };
        let table = load(&source).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].hour, 18);
        assert_eq!(table.rows()[1].hour, 10);
        assert_eq!(table.rows()[1].total, 60.25);
        assert_eq!(table.extra_columns(), ["Branch"]);
    }

    #[test]
    fn workbook_without_time_header_is_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.xlsx");
        write_workbook(&path, "Clock");

        let source = SourceConfig {
            path,
            columns: "B:J".to_string(),
            ..SourceConfig::default()
        };
        assert!(matches!(load(&source), Err(DashboardError::SchemaMismatch { ref column }) if column == "Time"));
    }

    #[test]
    fn unknown_sheet_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.xlsx");
        write_workbook(&path, "Time");

        let source = SourceConfig {
            path,
            sheet: "Returns".to_string(),
            ..SourceConfig::default()
        };
        assert!(matches!(load(&source), Err(DashboardError::SourceUnavailable { .. })));
    }

    #[test]
    fn blank_row_inside_data_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let source = csv_source(
            dir.path(),
            &format!(
                "{HEADER}\n\
                 1,Yangon,Member,Male,Sports and travel,Cash,10,5,10:00:00\n\
                 ,,,,,,,,\n\
                 3,Mandalay,Normal,Female,Food and beverages,Ewallet,20,6,11:00:00\n\
                 4,Mandalay,Normal,Female,Food and beverages,Ewallet,20,6,99:99:99\n"
            ),
        );
        match load(&source).unwrap_err() {
            DashboardError::ParseError { row, .. } => assert_eq!(row, 2),
            other => panic!("expected ParseError, got {other:?}"),
        }
    }

    #[test]
    fn trailing_blank_rows_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let source = csv_source(
            dir.path(),
            &format!(
                "{HEADER}\n\
                 1,Yangon,Member,Male,Sports and travel,Cash,10,5,10:00:00\n\
                 2,Mandalay,Normal,Female,Food and beverages,Ewallet,20,6,11:00:00\n\
                 ,,,,,,,,\n\
                 ,,,,,,,,\n"
            ),
        );
        let table = load(&source).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[1].city, "Mandalay");
    }

    #[test]
    fn malformed_column_range_is_a_config_error() {
        let source = SourceConfig {
            columns: "R:B".to_string(),
            ..SourceConfig::default()
        };
        let err = load(&source).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidConfig { .. }));
        assert!(err.is_load_error());
    }

    fn write_parquet_file(path: &Path, columns: Vec<(&str, ArrayRef)>) {
        let schema = Arc::new(Schema::new(
            columns
                .iter()
                .map(|(name, col)| Field::new(*name, col.data_type().clone(), true))
                .collect::<Vec<_>>(),
        ));
        let batch =
            RecordBatch::try_new(schema.clone(), columns.into_iter().map(|(_, col)| col).collect())
                .unwrap();
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();
    }

    fn parquet_columns(with_time: bool) -> Vec<(&'static str, ArrayRef)> {
        let text = |v: [&str; 3]| -> ArrayRef { Arc::new(StringArray::from(v.to_vec())) };
        let mut columns: Vec<(&'static str, ArrayRef)> = vec![
            ("City", text(["Yangon", "Mandalay", "Naypyitaw"])),
            ("Customer_type", text(["Member", "Normal", "Member"])),
            ("Gender", text(["Female", "Male", "Male"])),
            ("Product_line", text(["Health and beauty", "Sports and travel", "Food and beverages"])),
            ("Payment", text(["Ewallet", "Credit card", "Cash"])),
            ("Total", Arc::new(Float64Array::from(vec![548.9715, 80.22, 340.5]))),
            ("Rating", Arc::new(Int64Array::from(vec![9, 7, 5]))),
            ("Quantity", Arc::new(Int64Array::from(vec![Some(7), None, Some(2)]))),
        ];
        if with_time {
            columns.push(("Time", text(["13:08:00", "10:29:00", "19:45:00"])));
        }
        columns
    }

    #[test]
    fn loads_parquet_with_row_cap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.parquet");
        write_parquet_file(&path, parquet_columns(true));

        let source = SourceConfig {
            row_cap: 2,
            ..SourceConfig::default().with_path(path)
        };
        let table = load(&source).unwrap();
        assert_eq!(table.len(), 2);

        let first = &table.rows()[0];
        assert_eq!(first.city, "Yangon");
        assert_eq!(first.payment, Payment::Ewallet);
        assert_eq!(first.total, 548.9715);
        assert_eq!(first.rating, 9.0);
        assert_eq!(first.hour, 13);
        assert_eq!(first.extra["Quantity"], CellValue::Integer(7));

        let second = &table.rows()[1];
        assert_eq!(second.payment, Payment::CreditCard);
        assert_eq!(second.extra["Quantity"], CellValue::Null);
        assert_eq!(table.extra_columns(), ["Quantity"]);
    }

    #[test]
    fn parquet_without_time_is_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.parquet");
        write_parquet_file(&path, parquet_columns(false));

        assert_eq!(
            load(&SourceConfig::default().with_path(path)).unwrap_err(),
            DashboardError::SchemaMismatch {
                column: "Time".to_string()
            }
        );
    }

    fn date_cell(serial: f64, is_1904: bool) -> String {
        excel_datetime_to_text(&ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, is_1904))
    }

    #[test]
    fn serial_dates_follow_the_workbook_date_system() {
        // 1900 system, including the phantom 1900-02-29 at serial 60.
        assert_eq!(date_cell(1.0, false), "1900-01-01");
        assert_eq!(date_cell(59.0, false), "1900-02-28");
        assert_eq!(date_cell(61.0, false), "1900-03-01");
        assert_eq!(date_cell(43_466.0, false), "2019-01-01");
        assert_eq!(date_cell(43_466.75, false), "2019-01-01 18:00:00");
        assert_eq!(date_cell(0.5, false), "12:00:00");
        // 1904 system.
        assert_eq!(date_cell(1.0, true), "1904-01-02");

        let duration = ExcelDateTime::new(1.5, ExcelDateTimeType::TimeDelta, false);
        assert_eq!(excel_datetime_to_text(&duration), "36:00:00");
    }
}
