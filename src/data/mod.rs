/// Data layer: core types, ingestion, and the bundled example.
///
/// Architecture:
/// ```text
///  upload (.csv .tsv .txt .xlsx .json .parquet) / pasted text / example
///        │
///        ▼
///   ┌───────────┐     ┌────────────┐
///   │  loader    │ ──▶ │ delimiter  │  guess , \t or ␠ for text input
///   └───────────┘     └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  named, equal-length, typed columns
///   └──────────┘
/// ```

pub mod delimiter;
pub mod example;
pub mod loader;
pub mod model;
