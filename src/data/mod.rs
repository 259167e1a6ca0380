/// Data layer: core types, loading, caching, and filtering.
///
/// Architecture:
/// ```text
///  .xlsx / .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + type rows, derive hour → SalesTable
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  Arc<SalesTable>, loaded once per session
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  per-dimension allow-lists → filtered SalesTable
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
