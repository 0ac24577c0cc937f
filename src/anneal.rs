//! Column-elimination search driven by a simulated-annealing acceptance rule.
//!
//! ```text
//!   outer_join(A, B) ──► current = best
//!          │
//!          ▼   repeat iteration_count times
//!   ┌───────────────────────────────────────────────┐
//!   │ candidate = most-missing column of current    │
//!   │ working   = current without candidate         │
//!   │ delta     = score(working) - best_score       │
//!   │ accept with p = 1 if delta <= 0               │
//!   │              else exp(-delta / temperature)   │
//!   │ temperature *= cooling_rate                   │
//!   └───────────────────────────────────────────────┘
//!          │
//!          ▼
//!        best
//! ```
//!
//! The column set used for scoring is fixed for the whole run. Stripping a
//! column's values makes that column missing in every row, so its share of
//! the score rises to the row count and a drop can never lower the score.
//! `best` therefore always keeps the score of the unmodified merge.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::AnnealConfig;
use crate::data::merge::outer_join;
use crate::data::model::{ColumnSet, Dataset, JoinSpec};
use crate::data::score::{score, select_candidate};
use crate::error::Result;

// ---------------------------------------------------------------------------
// Search trace
// ---------------------------------------------------------------------------

/// What happened during one iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct StepRecord {
    /// Temperature in effect for this step (before cooling).
    pub temperature: f64,
    /// Column whose values were stripped, or `None` when nothing was missing.
    pub dropped: Option<String>,
    pub new_score: Option<usize>,
    /// `new_score - best_score` at the time of the step.
    pub delta: Option<i64>,
    pub acceptance_probability: Option<f64>,
    pub accepted: bool,
}

impl StepRecord {
    fn idle(temperature: f64) -> Self {
        StepRecord {
            temperature,
            dropped: None,
            new_score: None,
            delta: None,
            acceptance_probability: None,
            accepted: false,
        }
    }
}

/// Result of a full search run.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    /// Lowest-scoring dataset seen, the unmodified merge included.
    pub best: Dataset,
    pub best_score: usize,
    pub initial_score: usize,
    /// Column set the run scored against.
    pub columns: ColumnSet,
    pub steps: Vec<StepRecord>,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Metropolis acceptance probability for a score change.
pub fn acceptance_probability(delta: i64, temperature: f64) -> f64 {
    if delta <= 0 {
        1.0
    } else {
        (-(delta as f64) / temperature).exp()
    }
}

pub struct ColumnEliminationSearch {
    config: AnnealConfig,
}

impl ColumnEliminationSearch {
    pub fn new(config: AnnealConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnnealConfig {
        &self.config
    }

    /// Run exactly `iteration_count` steps starting from `initial`.
    pub fn run<R: Rng + ?Sized>(&self, initial: Dataset, columns: &ColumnSet, rng: &mut R) -> SearchOutcome {
        let initial_score = score(&initial, columns);
        let mut current = initial;
        let mut best = current.clone();
        let mut best_score = initial_score;
        let mut temperature = self.config.initial_temperature;
        let mut steps = Vec::with_capacity(self.config.iteration_count);

        for step in 0..self.config.iteration_count {
            let record = match select_candidate(&current, columns) {
                Some(column) => {
                    let working = current.without_column(&column);
                    let new_score = score(&working, columns);
                    let delta = new_score as i64 - best_score as i64;
                    let probability = acceptance_probability(delta, temperature);
                    let accepted = rng.gen::<f64>() < probability;

                    debug!(
                        "step {step}: drop '{column}' score {new_score} delta {delta} \
                         p={probability:.4} T={temperature:.4} accepted={accepted}"
                    );

                    if accepted {
                        current = working;
                        if new_score < best_score {
                            best = current.clone();
                            best_score = new_score;
                        }
                    }
                    StepRecord {
                        temperature,
                        dropped: Some(column),
                        new_score: Some(new_score),
                        delta: Some(delta),
                        acceptance_probability: Some(probability),
                        accepted,
                    }
                }
                None => {
                    debug!("step {step}: no column has missing values");
                    StepRecord::idle(temperature)
                }
            };
            steps.push(record);
            temperature *= self.config.cooling_rate;
        }

        let accepted = steps.iter().filter(|s| s.accepted).count();
        info!(
            "annealing finished: {} steps, {accepted} accepted, score {initial_score} -> {best_score}",
            steps.len()
        );

        SearchOutcome {
            best,
            best_score,
            initial_score,
            columns: columns.clone(),
            steps,
        }
    }
}

/// Random source for a run: seeded when the config carries a seed.
pub fn rng_for(config: &AnnealConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Validate, merge and optimise in one call.
///
/// Input errors surface from the join, before the search starts.
pub fn merge_and_optimize<R: Rng + ?Sized>(
    a: &Dataset,
    b: &Dataset,
    join: &JoinSpec,
    config: &AnnealConfig,
    rng: &mut R,
) -> Result<SearchOutcome> {
    let search = ColumnEliminationSearch::new(config.clone())?;
    let columns = ColumnSet::from_headers(a, b);
    let merged = outer_join(a, b, &columns, join)?;
    info!(
        "merged {} + {} rows into {} rows over {} columns",
        a.len(),
        b.len(),
        merged.len(),
        columns.len()
    );
    Ok(search.run(merged, &columns, rng))
}
