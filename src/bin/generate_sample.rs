use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::{Format, Workbook};
use rusty_sales::config::SourceConfig;
use rusty_sales::data::model::{CustomerType, Gender, Payment};

const BRANCHES: [(&str, &str); 3] = [("A", "Yangon"), ("B", "Mandalay"), ("C", "Naypyitaw")];

const PRODUCT_LINES: [(&str, f64); 6] = [
    ("Electronic accessories", 1.00),
    ("Fashion accessories", 0.95),
    ("Food and beverages", 1.05),
    ("Health and beauty", 0.90),
    ("Home and lifestyle", 1.10),
    ("Sports and travel", 1.00),
];

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

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

/// One synthetic row in sheet column order (B:R).
struct SaleRow {
    invoice_id: String,
    branch: &'static str,
    city: &'static str,
    customer_type: &'static str,
    gender: &'static str,
    product_line: &'static str,
    unit_price: f64,
    quantity: i64,
    tax: f64,
    total: f64,
    date: String,
    time: String,
    payment: &'static str,
    cogs: f64,
    gross_margin_pct: f64,
    gross_income: f64,
    rating: f64,
}

const HEADERS: [&str; 17] = [
    "Invoice ID",
    "Branch",
    "City",
    "Customer_type",
    "Gender",
    "Product_line",
    "Unit_price",
    "Quantity",
    "Tax_5%",
    "Total",
    "Date",
    "Time",
    "Payment",
    "cogs",
    "gross_margin_percentage",
    "gross_income",
    "Rating",
];

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn generate_rows(n: usize, rng: &mut SimpleRng) -> Vec<SaleRow> {
    (0..n)
        .map(|_| {
            let (branch, city) = *rng.pick(&BRANCHES);
            let (product_line, price_factor) = *rng.pick(&PRODUCT_LINES);
            let unit_price = round2(rng.range(10.0, 100.0) * price_factor);
            let quantity = 1 + (rng.next_u64() % 10) as i64;
            let cogs = round2(unit_price * quantity as f64);
            let tax = round2(cogs * 0.05);
            // Store opens 10:00, last sale before 21:00.
            let minute_of_day = 600 + rng.next_u64() % 660;

            SaleRow {
                invoice_id: format!(
                    "{:03}-{:02}-{:04}",
                    rng.next_u64() % 900 + 100,
                    rng.next_u64() % 90 + 10,
                    rng.next_u64() % 9000 + 1000
                ),
                branch,
                city,
                customer_type: rng.pick(CustomerType::ALL).label(),
                gender: rng.pick(Gender::ALL).label(),
                product_line,
                unit_price,
                quantity,
                tax,
                total: round2(cogs + tax),
                date: format!("{}/{}/2019", 1 + rng.next_u64() % 3, 1 + rng.next_u64() % 28),
                time: format!("{:02}:{:02}:00", minute_of_day / 60, minute_of_day % 60),
                payment: rng.pick(Payment::ALL).label(),
                cogs,
                gross_margin_pct: 4.761904762,
                gross_income: tax,
                rating: (rng.range(4.0, 10.0) * 10.0).round() / 10.0,
            }
        })
        .collect()
}

/// Workbook laid out like the production export: a title banner, the
/// header on row 4 and data in columns B:R of the "Sales" sheet.
fn write_workbook(rows: &[SaleRow], source: &SourceConfig) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(&source.sheet)?;

    sheet.write_string_with_format(0, 1, "Supermarket Sales", &bold)?;
    sheet.write_string(1, 1, "Synthetic data generated by generate_sample")?;

    let header_row = source.skip_rows as u32;
    for (c, h) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(header_row, (c + 1) as u16, *h, &bold)?;
    }

    for (i, r) in rows.iter().enumerate() {
        let row = header_row + 1 + i as u32;
        sheet.write_string(row, 1, r.invoice_id.as_str())?;
        sheet.write_string(row, 2, r.branch)?;
        sheet.write_string(row, 3, r.city)?;
        sheet.write_string(row, 4, r.customer_type)?;
        sheet.write_string(row, 5, r.gender)?;
        sheet.write_string(row, 6, r.product_line)?;
        sheet.write_number(row, 7, r.unit_price)?;
        sheet.write_number(row, 8, r.quantity as f64)?;
        sheet.write_number(row, 9, r.tax)?;
        sheet.write_number(row, 10, r.total)?;
        sheet.write_string(row, 11, r.date.as_str())?;
        sheet.write_string(row, 12, r.time.as_str())?;
        sheet.write_string(row, 13, r.payment)?;
        sheet.write_number(row, 14, r.cogs)?;
        sheet.write_number(row, 15, r.gross_margin_pct)?;
        sheet.write_number(row, 16, r.gross_income)?;
        sheet.write_number(row, 17, r.rating)?;
    }

    workbook
        .save(&source.path)
        .with_context(|| format!("writing {}", source.path.display()))?;
    Ok(())
}

/// Flat Parquet copy, one column per header.
fn write_parquet(rows: &[SaleRow], path: &str) -> Result<()> {
    fn text<'a>(rows: &'a [SaleRow], f: impl Fn(&'a SaleRow) -> &'a str) -> ArrayRef {
        Arc::new(StringArray::from(rows.iter().map(f).collect::<Vec<_>>()))
    }
    fn number(rows: &[SaleRow], f: impl Fn(&SaleRow) -> f64) -> ArrayRef {
        Arc::new(Float64Array::from(rows.iter().map(f).collect::<Vec<_>>()))
    }

    let columns: Vec<ArrayRef> = vec![
        text(rows, |r| r.invoice_id.as_str()),
        text(rows, |r| r.branch),
        text(rows, |r| r.city),
        text(rows, |r| r.customer_type),
        text(rows, |r| r.gender),
        text(rows, |r| r.product_line),
        number(rows, |r| r.unit_price),
        Arc::new(Int64Array::from(rows.iter().map(|r| r.quantity).collect::<Vec<_>>())),
        number(rows, |r| r.tax),
        number(rows, |r| r.total),
        text(rows, |r| r.date.as_str()),
        text(rows, |r| r.time.as_str()),
        text(rows, |r| r.payment),
        number(rows, |r| r.cogs),
        number(rows, |r| r.gross_margin_pct),
        number(rows, |r| r.gross_income),
        number(rows, |r| r.rating),
    ];

    let schema = Arc::new(Schema::new(
        HEADERS
            .iter()
            .zip(&columns)
            .map(|(name, col)| Field::new(*name, col.data_type().clone(), false))
            .collect::<Vec<_>>(),
    ));

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let mut rng = SimpleRng::new(42);
    let source = SourceConfig::default();
    let rows = generate_rows(source.row_cap, &mut rng);

    write_workbook(&rows, &source)?;
    let parquet_path = "supermarket_sales.parquet";
    write_parquet(&rows, parquet_path)?;

    println!(
        "Wrote {} transactions to {} (sheet '{}', columns {}) and {parquet_path}",
        rows.len(),
        source.path.display(),
        source.sheet,
        source.columns
    );
    Ok(())
}
