//! Pipeline entry point: pick model families and run them against a
//! warehouse directory.

use bloom_forecast::config::{ModelFamily, WalkForwardConfig};
use bloom_forecast::pipeline::Pipeline;
use bloom_forecast::sink::Warehouse;
use std::env;
use std::process;
use tracing::error;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "\
usage: run_forecast [OPTIONS] FAMILY...

Families: demand, dispatch, production, rejection, or 'all'.
Selecting nothing runs nothing.

Options:
  --warehouse DIR   warehouse directory (default ./warehouse)
  --min-weeks N     walk-forward warm-up weeks (default 12)
  --min-rows N      per-week training row floor (default 100)
";

struct CliArgs {
    families: Vec<ModelFamily>,
    warehouse: String,
    config: WalkForwardConfig,
}

fn parse_args() -> Result<CliArgs, String> {
    let mut families = Vec::new();
    let mut warehouse = "./warehouse".to_string();
    let mut config = WalkForwardConfig::default();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--warehouse" => {
                warehouse = args.next().ok_or("--warehouse needs a directory")?;
            }
            "--min-weeks" => {
                let value = args.next().ok_or("--min-weeks needs a number")?;
                config.min_train_weeks = value
                    .parse()
                    .map_err(|_| format!("invalid --min-weeks value '{}'", value))?;
            }
            "--min-rows" => {
                let value = args.next().ok_or("--min-rows needs a number")?;
                config.min_train_rows = value
                    .parse()
                    .map_err(|_| format!("invalid --min-rows value '{}'", value))?;
            }
            "all" => {
                families = ModelFamily::ALL.to_vec();
            }
            name => {
                let family: ModelFamily =
                    name.parse().map_err(|_| format!("unknown family '{}'", name))?;
                if !families.contains(&family) {
                    families.push(family);
                }
            }
        }
    }

    Ok(CliArgs {
        families,
        warehouse,
        config,
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("{}", USAGE);
            process::exit(2);
        }
    };

    // No selection is a no-op, not an error.
    if args.families.is_empty() {
        print!("{}", USAGE);
        return;
    }

    let pipeline = Pipeline::new(Warehouse::new(args.warehouse.as_str()), args.config);
    match pipeline.run(&args.families) {
        Ok(summary) => {
            for family in &summary.families {
                println!(
                    "{:<11} {:?}  walk-forward rows: {}  holdout rows: {}  best: {}",
                    family.family.to_string(),
                    family.status,
                    family.walk_forward_rows,
                    family.holdout_rows,
                    family.best_algorithm.as_deref().unwrap_or("-"),
                );
            }
        }
        Err(e) => {
            error!(error = %e, "pipeline run failed");
            process::exit(1);
        }
    }
}
