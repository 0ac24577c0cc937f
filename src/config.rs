use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::model::JoinSpec;
use crate::error::MergeError;

// ---------------------------------------------------------------------------
// Annealing parameters
// ---------------------------------------------------------------------------

pub const DEFAULT_INITIAL_TEMPERATURE: f64 = 100.0;
pub const DEFAULT_COOLING_RATE: f64 = 0.95;
pub const DEFAULT_ITERATION_COUNT: usize = 10;

/// Parameters of the column-elimination search.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnealConfig {
    pub initial_temperature: f64,
    /// Multiplier applied to the temperature after every step, in (0, 1).
    pub cooling_rate: f64,
    pub iteration_count: usize,
    /// Seed for the acceptance draws. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            initial_temperature: DEFAULT_INITIAL_TEMPERATURE,
            cooling_rate: DEFAULT_COOLING_RATE,
            iteration_count: DEFAULT_ITERATION_COUNT,
            seed: None,
        }
    }
}

impl AnnealConfig {
    pub fn validate(&self) -> Result<(), MergeError> {
        if !self.initial_temperature.is_finite() || self.initial_temperature <= 0.0 {
            return Err(MergeError::InvalidConfig(format!(
                "initial temperature must be a positive number, got {}",
                self.initial_temperature
            )));
        }
        if !(self.cooling_rate > 0.0 && self.cooling_rate < 1.0) {
            return Err(MergeError::InvalidConfig(format!(
                "cooling rate must lie strictly between 0 and 1, got {}",
                self.cooling_rate
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config file (TOML)
// ---------------------------------------------------------------------------

/// Contents of an optional `rusty-merge.toml`. Every field may be omitted.
///
/// ```toml
/// initial_temperature = 100.0
/// cooling_rate = 0.95
/// iteration_count = 10
/// seed = 7
/// key_fields = ["Country", "Year"]
/// key_separator = "-"
/// split_ratio = 0.8
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct FileConfig {
    pub initial_temperature: Option<f64>,
    pub cooling_rate: Option<f64>,
    pub iteration_count: Option<usize>,
    pub seed: Option<u64>,
    pub key_fields: Option<[String; 2]>,
    pub key_separator: Option<String>,
    pub split_ratio: Option<f64>,
}

pub fn load_config(path: &Path) -> Result<FileConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config(&text).with_context(|| format!("parsing config {}", path.display()))
}

pub fn parse_config(text: &str) -> Result<FileConfig> {
    Ok(toml::from_str(text)?)
}

// ---------------------------------------------------------------------------
// Effective settings: defaults < config file < command line
// ---------------------------------------------------------------------------

/// Values given explicitly on the command line.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Overrides {
    pub initial_temperature: Option<f64>,
    pub cooling_rate: Option<f64>,
    pub iteration_count: Option<usize>,
    pub seed: Option<u64>,
    pub key_fields: Option<[String; 2]>,
    /// `--split` was given, with or without a ratio.
    pub split_requested: bool,
    pub split_ratio: Option<f64>,
}

pub const DEFAULT_SPLIT_RATIO: f64 = 0.8;

/// Settings after merging every source.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub anneal: AnnealConfig,
    pub join: JoinSpec,
    /// Training fraction of the train/test split; `None` disables the split.
    pub split_ratio: Option<f64>,
}

impl Settings {
    pub fn resolve(file: FileConfig, cli: Overrides) -> Result<Self, MergeError> {
        let defaults = AnnealConfig::default();
        let anneal = AnnealConfig {
            initial_temperature: cli
                .initial_temperature
                .or(file.initial_temperature)
                .unwrap_or(defaults.initial_temperature),
            cooling_rate: cli
                .cooling_rate
                .or(file.cooling_rate)
                .unwrap_or(defaults.cooling_rate),
            iteration_count: cli
                .iteration_count
                .or(file.iteration_count)
                .unwrap_or(defaults.iteration_count),
            seed: cli.seed.or(file.seed),
        };
        anneal.validate()?;

        let mut join = JoinSpec::default();
        if let Some(fields) = cli.key_fields.or(file.key_fields) {
            join.fields = fields;
        }
        if let Some(sep) = file.key_separator {
            join.separator = sep;
        }

        let requested = cli.split_requested || cli.split_ratio.is_some() || file.split_ratio.is_some();
        let split_ratio = requested.then(|| {
            cli.split_ratio
                .or(file.split_ratio)
                .unwrap_or(DEFAULT_SPLIT_RATIO)
        });
        if let Some(ratio) = split_ratio {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(MergeError::InvalidConfig(format!(
                    "split ratio must lie in [0, 1], got {ratio}"
                )));
            }
        }

        Ok(Settings {
            anneal,
            join,
            split_ratio,
        })
    }
}
