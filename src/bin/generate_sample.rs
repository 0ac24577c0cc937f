use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rusty_merge::data::model::{Dataset, Row};
use rusty_merge::data::writer::write_file;

/// Write two overlapping country/year tables with gaps, for trying out
/// `rusty-merge`.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Directory the two CSV files are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Probability that any measurement cell is left empty
    #[arg(long, default_value_t = 0.2)]
    gap_rate: f64,
}

const COUNTRIES: [&str; 6] = ["Angola", "Brazil", "Chad", "Denmark", "Ecuador", "Fiji"];

fn measurement<R: Rng>(rng: &mut R, gap_rate: f64, low: f64, high: f64) -> String {
    if rng.gen_bool(gap_rate.clamp(0.0, 1.0)) {
        String::new()
    } else {
        format!("{:.1}", rng.gen_range(low..high))
    }
}

/// Mortality covers 1995–2009, nutrition 2000–2014, so both sides have
/// rows the other lacks.
fn generate<R: Rng>(rng: &mut R, gap_rate: f64) -> (Dataset, Dataset) {
    let mut mortality = Dataset::new();
    let mut nutrition = Dataset::new();

    for country in COUNTRIES {
        for year in 1995..2015 {
            let year_text = year.to_string();
            if year < 2010 {
                let row: Row = [
                    ("Country", country.to_string()),
                    ("Year", year_text.clone()),
                    ("Under5_Mortality", measurement(rng, gap_rate, 3.0, 180.0)),
                    ("Infant_Mortality", measurement(rng, gap_rate, 2.0, 120.0)),
                    ("Neonatal_Mortality", measurement(rng, gap_rate, 1.0, 50.0)),
                ]
                .into_iter()
                .collect();
                mortality.push(row);
            }
            if year >= 2000 {
                let row: Row = [
                    ("Country", country.to_string()),
                    ("Year", year_text),
                    ("Stunting", measurement(rng, gap_rate, 2.0, 60.0)),
                    ("Wasting", measurement(rng, gap_rate, 0.5, 20.0)),
                    ("Exclusive_Breastfeeding", measurement(rng, gap_rate, 5.0, 90.0)),
                ]
                .into_iter()
                .collect();
                nutrition.push(row);
            }
        }
    }
    (mortality, nutrition)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut rng = StdRng::seed_from_u64(args.seed);
    let (mortality, nutrition) = generate(&mut rng, args.gap_rate);

    std::fs::create_dir_all(&args.out_dir)?;
    let mortality_path = args.out_dir.join("child_mortality.csv");
    let nutrition_path = args.out_dir.join("infant_nutrition.csv");
    write_file(&mortality, &mortality_path)?;
    write_file(&nutrition, &nutrition_path)?;

    println!(
        "Wrote {} rows to {} and {} rows to {}",
        mortality.len(),
        mortality_path.display(),
        nutrition.len(),
        nutrition_path.display()
    );
    Ok(())
}
