/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RecordSet (fail fast on bad input)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ RecordSet │  Vec<Record>, label indices, year bounds
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  year range + region set → FilteredView
///   └──────────┘
/// ```

pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
