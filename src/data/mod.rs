/// Data layer: core types, loading, filtering and chart statistics.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Dataset (fatal on failure)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  Vec<Record>, distinct years / months, present columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  (year, month) → View (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────────────────┐
///   │ stats / impute / decompose   │  describe, correlate, group means,
///   └──────────────────────────────┘  forward fill, additive decomposition
///        │
///        ▼
///   ┌──────────┐
///   │  charts  │  render(Dataset, Selection) → ChartInputs
///   └──────────┘
/// ```

pub mod charts;
pub mod decompose;
pub mod filter;
pub mod impute;
pub mod loader;
pub mod model;
pub mod stats;
