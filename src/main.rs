use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;

use rusty_merge::anneal::{merge_and_optimize, rng_for};
use rusty_merge::config::{FileConfig, Overrides, Settings, load_config};
use rusty_merge::data::writer::{Format, Output};
use rusty_merge::data::{loader, split, writer};

#[derive(Parser, Debug)]
#[command(
    name = "rusty-merge",
    about = "Outer-join two country/year tables and anneal away sparse columns"
)]
struct Cli {
    /// First input table (.csv, .json or .parquet)
    left: PathBuf,

    /// Second input table
    right: PathBuf,

    /// Merged output (.csv, .json, .arff or .parquet)
    output: PathBuf,

    /// Optional TOML config file
    #[arg(long, env = "RUSTY_MERGE_CONFIG")]
    config: Option<PathBuf>,

    /// Starting temperature of the annealing schedule
    #[arg(long)]
    initial_temperature: Option<f64>,

    /// Temperature multiplier applied after every step, in (0, 1)
    #[arg(long)]
    cooling_rate: Option<f64>,

    /// Number of annealing steps
    #[arg(long)]
    iterations: Option<usize>,

    /// Seed for the acceptance draws (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// The two join-key columns, e.g. `Country,Year`
    #[arg(long, value_delimiter = ',')]
    key_fields: Option<Vec<String>>,

    /// Also export the merged table as Weka ARFF, whatever the extension
    #[arg(long)]
    arff: Option<PathBuf>,

    /// Also write `<output>.train` / `<output>.test`. The optional value is
    /// the training fraction (config file `split_ratio`, then 0.8, when omitted)
    #[arg(long, num_args = 0..=1)]
    split: Option<Option<f64>>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let file = match &cli.config {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };
    let key_fields = match cli.key_fields.as_deref() {
        Some([first, second]) => Some([first.clone(), second.clone()]),
        Some(other) => bail!("--key-fields takes exactly two names, got {}", other.len()),
        None => None,
    };
    let overrides = Overrides {
        initial_temperature: cli.initial_temperature,
        cooling_rate: cli.cooling_rate,
        iteration_count: cli.iterations,
        seed: cli.seed,
        key_fields,
        split_requested: cli.split.is_some(),
        split_ratio: cli.split.flatten(),
    };
    let settings = Settings::resolve(file, overrides)?;
    log::debug!("effective settings: {settings:?}");

    let output_format = Format::from_path(&cli.output)?;

    let left = loader::load_file(&cli.left)?;
    let right = loader::load_file(&cli.right)?;

    let mut rng = rng_for(&settings.anneal);
    let outcome = merge_and_optimize(&left, &right, &settings.join, &settings.anneal, &mut rng)
        .context("merging inputs")?;

    // Every output is produced before any of them is put in place.
    let split_sets = settings
        .split_ratio
        .map(|ratio| split::train_test_split(&outcome.best, ratio, &mut rng));
    let train_path = with_suffix(&cli.output, "train");
    let test_path = with_suffix(&cli.output, "test");

    let mut outputs = vec![Output {
        dataset: &outcome.best,
        format: output_format,
        path: &cli.output,
    }];
    if let Some(arff) = &cli.arff {
        outputs.push(Output {
            dataset: &outcome.best,
            format: Format::Arff,
            path: arff,
        });
    }
    if let Some((train, test)) = &split_sets {
        outputs.push(Output {
            dataset: train,
            format: output_format,
            path: &train_path,
        });
        outputs.push(Output {
            dataset: test,
            format: output_format,
            path: &test_path,
        });
    }
    writer::write_all(&outputs)?;

    println!(
        "Merged {} rows (missing cells: {}) into {}",
        outcome.best.len(),
        outcome.best_score,
        cli.output.display()
    );
    Ok(())
}

/// `out/merged.csv` + `train` → `out/merged.train.csv`
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("merged");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}.{suffix}.{ext}"),
        None => format!("{stem}.{suffix}"),
    };
    path.with_file_name(name)
}
