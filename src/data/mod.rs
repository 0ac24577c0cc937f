/// Data layer: core types, file I/O, joining and scoring.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet      .csv / .json / .parquet
///        │                             │
///        ▼                             ▼
///   ┌──────────┐                 ┌──────────┐
///   │  loader   │  parse → A      │  loader   │  parse → B
///   └──────────┘                 └──────────┘
///        │                             │
///        └──────────────┬──────────────┘
///                       ▼
///               ┌──────────────┐
///               │    merge      │  full outer join on the composite key
///               └──────────────┘
///                       │
///                       ▼
///               ┌──────────────┐
///               │    score      │  missing cells over the fixed ColumnSet
///               └──────────────┘
///                       │
///                       ▼
///        writer (.csv / .json / .arff / .parquet), split (train / test)
/// ```

pub mod loader;
pub mod merge;
pub mod model;
pub mod score;
pub mod split;
pub mod writer;
