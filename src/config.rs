use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Environment variable naming an optional JSON configuration file.
pub const CONFIG_ENV: &str = "SALES_DASHBOARD_CONFIG";

// ---------------------------------------------------------------------------
// Source layout
// ---------------------------------------------------------------------------

/// Where the transactions live and how the sheet is laid out.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub path: PathBuf,
    /// Worksheet name (spreadsheet sources only).
    pub sheet: String,
    /// Rows above the header row (title banner etc.).
    pub skip_rows: usize,
    /// Column-letter range to read, e.g. `B:R` (spreadsheet sources only).
    pub columns: String,
    /// Maximum number of data rows to read.
    pub row_cap: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("supermarket_sales.xlsx"),
            sheet: "Sales".to_string(),
            skip_rows: 3,
            columns: "B:R".to_string(),
            row_cap: 1000,
        }
    }
}

impl SourceConfig {
    /// Same layout, different file.
    pub fn with_path(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..self.clone()
        }
    }

    /// Resolve `columns` into zero-based inclusive indices.
    pub fn column_range(&self) -> Result<ColumnRange> {
        ColumnRange::parse(&self.columns)
    }
}

/// Inclusive, zero-based column span parsed from `"B:R"`-style notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRange {
    pub first: usize,
    pub last: usize,
}

impl ColumnRange {
    pub fn parse(spec: &str) -> Result<Self> {
        let (a, b) = spec
            .split_once(':')
            .with_context(|| format!("column range '{spec}' must look like 'B:R'"))?;
        let first = column_index(a).with_context(|| format!("column range '{spec}'"))?;
        let last = column_index(b).with_context(|| format!("column range '{spec}'"))?;
        if last < first {
            bail!("column range '{spec}' ends before it starts");
        }
        Ok(ColumnRange { first, last })
    }

    /// Zero-based sheet column indices covered by the range.
    pub fn indices(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// `A` → 0, `Z` → 25, `AA` → 26.
fn column_index(letters: &str) -> Result<usize> {
    let letters = letters.trim();
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        bail!("'{letters}' is not a column name");
    }
    let mut n = 0usize;
    for c in letters.chars() {
        let digit = c.to_ascii_uppercase() as usize - 'A' as usize + 1;
        n = match n.checked_mul(26).and_then(|v| v.checked_add(digit)) {
            Some(v) => v,
            None => bail!("'{letters}' is too long for a column name"),
        };
    }
    Ok(n - 1)
}

// ---------------------------------------------------------------------------
// Display options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Upper bound of the star glyph count next to the average rating.
    pub max_stars: u8,
    /// Bar fill colour, `#RRGGBB`.
    pub bar_color: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_stars: 10,
            bar_color: "#0083B8".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// DashboardConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub source: SourceConfig,
    pub display: DisplayConfig,
}

impl DashboardConfig {
    /// Read a JSON config file; absent keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DashboardConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.source.column_range()?;
        Ok(config)
    }

    /// Defaults, then `$SALES_DASHBOARD_CONFIG`, then a source path given
    /// as the first command-line argument.
    pub fn resolve(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(path) = args.into_iter().next() {
            config.source.path = PathBuf::from(path);
        }
        config.source.column_range()?;
        log::debug!("Resolved configuration: {config:?}");
        Ok(config)
    }
}
