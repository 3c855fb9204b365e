//! Generate synthetic feature tables for local pipeline runs.
//!
//! Produces one table per model family with a seasonal target, lag/rolling
//! features derived from the generated series, and family-specific extras,
//! then writes them to the warehouse directory the pipeline reads from.

use bloom_forecast::config::ModelFamily;
use bloom_forecast::sink::Warehouse;
use polars::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use std::env;
use std::f64::consts::PI;
use std::process;

const VARIETIES: [&str; 4] = ["rose", "tulip", "lily", "carnation"];
const CUSTOMERS: [&str; 3] = ["acme_flowers", "bloom_and_co", "petal_palace"];
const FARMS: [&str; 3] = ["riverside", "hillcrest", "sunnyvale"];

struct Calendar {
    /// (year, week) pairs, wrapping at week 52
    weeks: Vec<(i64, i64)>,
}

impl Calendar {
    fn new(start_year: i64, n_weeks: usize) -> Self {
        let mut weeks = Vec::with_capacity(n_weeks);
        let mut year = start_year;
        let mut week = 1i64;
        for _ in 0..n_weeks {
            weeks.push((year, week));
            week += 1;
            if week > 52 {
                week = 1;
                year += 1;
            }
        }
        Self { weeks }
    }
}

struct TableBuilder {
    dim_a: Vec<String>,
    dim_b: Vec<String>,
    year: Vec<i64>,
    week: Vec<i64>,
    week_sin: Vec<f64>,
    week_cos: Vec<f64>,
    lags: Vec<(String, Vec<Option<f64>>)>,
    rollings: Vec<(String, Vec<Option<f64>>)>,
    extras: Vec<(String, Vec<f64>)>,
    target: Vec<f64>,
}

impl TableBuilder {
    fn new(lag_names: &[(&str, usize)], rolling_names: &[(&str, usize)], extra_names: &[&str]) -> Self {
        Self {
            dim_a: Vec::new(),
            dim_b: Vec::new(),
            year: Vec::new(),
            week: Vec::new(),
            week_sin: Vec::new(),
            week_cos: Vec::new(),
            lags: lag_names
                .iter()
                .map(|(n, _)| (n.to_string(), Vec::new()))
                .collect(),
            rollings: rolling_names
                .iter()
                .map(|(n, _)| (n.to_string(), Vec::new()))
                .collect(),
            extras: extra_names.iter().map(|n| (n.to_string(), Vec::new())).collect(),
            target: Vec::new(),
        }
    }
}

/// Target history for one entity: a per-entity base, a yearly seasonal swing
/// and some noise, floored at zero
fn entity_series(rng: &mut StdRng, calendar: &Calendar, base: f64) -> Vec<f64> {
    let noise = Normal::new(0.0, base * 0.08).unwrap();
    calendar
        .weeks
        .iter()
        .map(|(_, week)| {
            let seasonal = 1.0 + 0.35 * (2.0 * PI * (*week as f64) / 52.0).sin();
            (base * seasonal + noise.sample(rng)).max(0.0)
        })
        .collect()
}

fn build_family_table(family: ModelFamily, calendar: &Calendar, rng: &mut StdRng) -> DataFrame {
    let spec = family.spec();

    // (name, lag) and (name, window) pairs present in this family's spec
    let lag_defs: Vec<(&str, usize)> = [("lag_1", 1), ("lag_2", 2), ("lag_4", 4), ("lag_52", 52)]
        .into_iter()
        .filter(|(n, _)| spec.features.contains(n))
        .collect();
    let rolling_defs: Vec<(&str, usize)> = [
        ("rolling_mean_4", 4),
        ("rolling_mean_8", 8),
        ("rolling_mean_12", 12),
    ]
    .into_iter()
    .filter(|(n, _)| spec.features.contains(n))
    .collect();
    let extra_defs: Vec<&str> = spec
        .features
        .iter()
        .copied()
        .filter(|f| {
            !f.starts_with("lag_")
                && !f.starts_with("rolling_mean_")
                && *f != "week_sin"
                && *f != "week_cos"
        })
        .collect();

    let mut builder = TableBuilder::new(&lag_defs, &rolling_defs, &extra_defs);

    let (dims_a, dims_b): (&[&str], &[&str]) = match family {
        ModelFamily::Demand | ModelFamily::Dispatch => (&VARIETIES, &CUSTOMERS),
        ModelFamily::Production | ModelFamily::Rejection => (&FARMS, &VARIETIES),
    };

    let rate_noise = Normal::new(0.0, 0.02).unwrap();
    for (ai, a) in dims_a.iter().enumerate() {
        for (bi, b) in dims_b.iter().enumerate() {
            let base = match family {
                ModelFamily::Rejection => 40.0 + (ai * 7 + bi * 3) as f64,
                _ => 800.0 + (ai * 120 + bi * 60) as f64,
            };
            let series = entity_series(rng, calendar, base);

            for (i, &(year, week)) in calendar.weeks.iter().enumerate() {
                builder.dim_a.push(a.to_string());
                builder.dim_b.push(b.to_string());
                builder.year.push(year);
                builder.week.push(week);
                builder
                    .week_sin
                    .push((2.0 * PI * week as f64 / 52.0).sin());
                builder
                    .week_cos
                    .push((2.0 * PI * week as f64 / 52.0).cos());

                for ((_, values), (_, lag)) in builder.lags.iter_mut().zip(lag_defs.iter()) {
                    values.push(if i >= *lag { Some(series[i - lag]) } else { None });
                }
                for ((_, values), (_, window)) in
                    builder.rollings.iter_mut().zip(rolling_defs.iter())
                {
                    if i == 0 {
                        values.push(None);
                    } else {
                        let from = i.saturating_sub(*window);
                        let slice = &series[from..i];
                        values.push(Some(slice.iter().sum::<f64>() / slice.len() as f64));
                    }
                }
                for (name, values) in builder.extras.iter_mut() {
                    let prev = if i > 0 { series[i - 1] } else { base };
                    let value = match name.as_str() {
                        "customer_share_4w" => 0.2 + 0.05 * bi as f64 + rate_noise.sample(rng),
                        "fulfillment_rate_4w" => (0.92 + rate_noise.sample(rng)).min(1.0),
                        "rejection_rate_4w" => (0.05 + rate_noise.sample(rng)).max(0.0),
                        "variety_total_lag_1" | "customer_total_lag_1" | "farm_total_lag_1" => {
                            prev * 3.0
                        }
                        "production_lag_1" => prev * 18.0,
                        "area_planted" => 2.5 + 0.5 * ai as f64,
                        _ => prev,
                    };
                    values.push(value);
                }
                builder.target.push(series[i]);
            }
        }
    }

    let mut columns = vec![
        Series::new(spec.group_columns[0], builder.dim_a),
        Series::new(spec.group_columns[1], builder.dim_b),
        Series::new("year", builder.year),
        Series::new("week", builder.week),
        Series::new("week_sin", builder.week_sin),
        Series::new("week_cos", builder.week_cos),
    ];
    for (name, values) in builder.lags {
        columns.push(Series::new(&name, values));
    }
    for (name, values) in builder.rollings {
        columns.push(Series::new(&name, values));
    }
    for (name, values) in builder.extras {
        columns.push(Series::new(&name, values));
    }
    columns.push(Series::new(spec.target, builder.target));

    DataFrame::new(columns).expect("synthetic columns share one length")
}

fn main() {
    let mut warehouse_dir = "./warehouse".to_string();
    let mut n_weeks = 40usize;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--warehouse" => match args.next() {
                Some(dir) => warehouse_dir = dir,
                None => {
                    eprintln!("--warehouse needs a directory");
                    process::exit(2);
                }
            },
            "--weeks" => match args.next().and_then(|v| v.parse().ok()) {
                Some(n) => n_weeks = n,
                None => {
                    eprintln!("--weeks needs a number");
                    process::exit(2);
                }
            },
            other => {
                eprintln!("unknown argument '{}'", other);
                eprintln!("usage: seed_warehouse [--warehouse DIR] [--weeks N]");
                process::exit(2);
            }
        }
    }

    let warehouse = Warehouse::new(warehouse_dir.as_str());
    let calendar = Calendar::new(2023, n_weeks);

    for (i, family) in ModelFamily::ALL.into_iter().enumerate() {
        let mut rng = StdRng::seed_from_u64(7 + i as u64);
        let mut table = build_family_table(family, &calendar, &mut rng);
        if let Err(e) = warehouse.write_table(family.spec().table, &mut table) {
            eprintln!("failed to write {}: {}", family.spec().table, e);
            process::exit(1);
        }
        println!("{}: {} rows", family.spec().table, table.height());
    }

    println!("seeded warehouse at {}", warehouse_dir);
}
