//! Merge two country/year tables with a full outer join, then run a
//! simulated-annealing column-elimination search over the result.

pub mod anneal;
pub mod config;
pub mod data;
pub mod error;

pub use anneal::{ColumnEliminationSearch, SearchOutcome, StepRecord, merge_and_optimize};
pub use config::AnnealConfig;
pub use data::model::{ColumnSet, Dataset, JoinKey, JoinSpec, Row};
pub use error::{MergeError, Result, Side};
