use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single loosely-typed spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as found in the source sheet.
/// Categorical filter values and group keys are `CellValue`s, so the type
/// must be `Ord` to live in `BTreeSet` / `BTreeMap`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, ""),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl CellValue {
    /// Interpret the cell as a number, accepting numeric text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Canonical form of a header for matching: lower-case, trimmed, with
/// spaces folded into underscores (`"Product line"` == `"Product_line"`).
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c.to_ascii_lowercase() })
        .collect()
}

// ---------------------------------------------------------------------------
// Closed categorical domains
// ---------------------------------------------------------------------------

macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = normalize_header(s);
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| normalize_header(v.label()) == wanted)
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = $name::ALL.iter().map(|v| v.label()).collect();
                        format!("'{s}' is not one of {allowed:?}")
                    })
            }
        }
    };
}

label_enum!(
    /// Loyalty status of the buyer.
    CustomerType { Member => "Member", Normal => "Normal" }
);

label_enum!(Gender { Male => "Male", Female => "Female" });

label_enum!(
    /// Tender used for the transaction.
    Payment { Cash => "Cash", CreditCard => "Credit card", Ewallet => "Ewallet" }
);

// ---------------------------------------------------------------------------
// TimeOfDay
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self, String> {
        if hour > 23 || minute > 59 || second > 59 {
            return Err(format!(
                "{hour:02}:{minute:02}:{second:02} is not a valid time of day"
            ));
        }
        Ok(TimeOfDay {
            hour,
            minute,
            second,
        })
    }

    /// Parse `HH:MM:SS`, optionally followed by a fractional second
    /// (`13:08:00.000` as written by some exporters).
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        // chrono accepts single-digit fields; the sheet always pads them.
        let clock = s.split_once('.').map_or(s, |(whole, _)| whole);
        if clock.len() != 8 {
            return Err(format!("'{s}' does not match HH:MM:SS"));
        }
        NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
            .map(TimeOfDay::from)
            .map_err(|e| format!("'{s}' is not a valid time of day: {e}"))
    }

    /// Spreadsheet serial time: the fractional part of a day.  A full
    /// serial date-time (e.g. `45123.5417`) keeps only its time part.
    pub fn from_day_fraction(serial: f64) -> Result<Self, String> {
        if !serial.is_finite() || serial < 0.0 {
            return Err(format!("{serial} is not a spreadsheet time"));
        }
        let secs = (serial.fract() * 86_400.0).round() as u32 % 86_400;
        TimeOfDay::new((secs / 3600) as u8, (secs / 60 % 60) as u8, (secs % 60) as u8)
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(t: NaiveTime) -> Self {
        // Leap seconds fold into :59.
        TimeOfDay {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
            second: t.second() as u8,
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)
    }
}

// ---------------------------------------------------------------------------
// Dimension / Metric – the columns the report layer understands
// ---------------------------------------------------------------------------

/// Categorical columns usable for filtering and grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Dimension {
    City,
    CustomerType,
    Gender,
    Payment,
    ProductLine,
    /// Derived from `Time` at load.
    Hour,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::City,
        Dimension::CustomerType,
        Dimension::Gender,
        Dimension::Payment,
        Dimension::ProductLine,
        Dimension::Hour,
    ];

    /// The dimensions offered as sidebar multi-selects, in display order.
    pub const SIDEBAR: [Dimension; 5] = [
        Dimension::City,
        Dimension::CustomerType,
        Dimension::Gender,
        Dimension::Payment,
        Dimension::ProductLine,
    ];

    /// Header name in the source sheet.
    pub fn column_name(self) -> &'static str {
        match self {
            Dimension::City => "City",
            Dimension::CustomerType => "Customer_type",
            Dimension::Gender => "Gender",
            Dimension::Payment => "Payment",
            Dimension::ProductLine => "Product_line",
            Dimension::Hour => "hour",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::City => "City",
            Dimension::CustomerType => "Customer Type",
            Dimension::Gender => "Gender",
            Dimension::Payment => "Payment",
            Dimension::ProductLine => "Product Line",
            Dimension::Hour => "Hour",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Numeric columns usable as aggregate inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Metric {
    Total,
    Rating,
}

impl Metric {
    pub fn column_name(self) -> &'static str {
        match self {
            Metric::Total => "Total",
            Metric::Rating => "Rating",
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction – one row of the sheet
// ---------------------------------------------------------------------------

/// A single sales transaction (one row of the source sheet).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub city: String,
    pub customer_type: CustomerType,
    pub gender: Gender,
    pub product_line: String,
    pub payment: Payment,
    /// Gross amount including tax, never negative.
    pub total: f64,
    /// Customer rating on a 0–10 scale.
    pub rating: f64,
    pub time: TimeOfDay,
    /// Derived from `time` once, at load.
    pub hour: u8,
    /// All remaining columns of the configured range: column_name → value.
    pub extra: BTreeMap<String, CellValue>,
}

impl Transaction {
    /// The row's value for a categorical dimension.
    pub fn value(&self, dimension: Dimension) -> CellValue {
        match dimension {
            Dimension::City => CellValue::Text(self.city.clone()),
            Dimension::CustomerType => self.customer_type.label().into(),
            Dimension::Gender => self.gender.label().into(),
            Dimension::Payment => self.payment.label().into(),
            Dimension::ProductLine => CellValue::Text(self.product_line.clone()),
            Dimension::Hour => CellValue::Integer(i64::from(self.hour)),
        }
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Total => self.total,
            Metric::Rating => self.rating,
        }
    }
}

// ---------------------------------------------------------------------------
// SalesTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The immutable transaction table with pre-computed distinct values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesTable {
    rows: Vec<Transaction>,
    /// Names of the pass-through columns, in sheet order.
    extra_columns: Vec<String>,
    /// For each dimension the sorted set of distinct values.
    unique_values: BTreeMap<Dimension, BTreeSet<CellValue>>,
}

impl SalesTable {
    /// Build the dimension indices from the loaded rows.
    pub fn from_rows(rows: Vec<Transaction>, extra_columns: Vec<String>) -> Self {
        let mut unique_values: BTreeMap<Dimension, BTreeSet<CellValue>> = Dimension::ALL
            .iter()
            .map(|d| (*d, BTreeSet::new()))
            .collect();

        for row in &rows {
            for dim in Dimension::ALL {
                unique_values.entry(dim).or_default().insert(row.value(dim));
            }
        }
        SalesTable {
            rows,
            extra_columns,
            unique_values,
        }
    }

    pub fn rows(&self) -> &[Transaction] {
        &self.rows
    }

    pub fn extra_columns(&self) -> &[String] {
        &self.extra_columns
    }

    /// Distinct values of a dimension (empty set for an empty table).
    pub fn unique_values(&self, dimension: Dimension) -> &BTreeSet<CellValue> {
        static EMPTY: BTreeSet<CellValue> = BTreeSet::new();
        self.unique_values.get(&dimension).unwrap_or(&EMPTY)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
