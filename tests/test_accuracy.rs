use assert_approx_eq::assert_approx_eq;
use bloom_forecast::accuracy::{dimension_accuracy, weekly_accuracy, with_row_errors};
use polars::prelude::*;
use pretty_assertions::assert_eq;

/// Four holdout predictions in the canonical schema: two weeks, two customers.
fn holdout_frame() -> DataFrame {
    DataFrame::new(vec![
        Series::new("model", vec!["demand"; 4]),
        Series::new("algorithm", vec!["linear"; 4]),
        Series::new("year", vec![2024i64; 4]),
        Series::new("week", vec![10i64, 10, 11, 11]),
        Series::new("week_key", vec![202410i64, 202410, 202411, 202411]),
        Series::new("farm", vec![None::<&str>; 4]),
        Series::new("variety", vec!["rose"; 4]),
        Series::new(
            "customer",
            vec!["acme_flowers", "bloom_and_co", "acme_flowers", "bloom_and_co"],
        ),
        Series::new("actual", vec![100.0f64, 50.0, 80.0, 0.0]),
        Series::new("predicted", vec![90.0f64, 60.0, 80.0, 5.0]),
        Series::new("training_weeks", vec![None::<i64>; 4]),
    ])
    .unwrap()
}

#[test]
fn row_errors_floor_zero_actuals() {
    let enriched = with_row_errors(holdout_frame()).unwrap();

    let abs: Vec<f64> = enriched
        .column("abs_error")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(abs, vec![10.0, 10.0, 0.0, 5.0]);

    let pct: Vec<f64> = enriched
        .column("pct_error")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_approx_eq!(pct[0], 10.0);
    assert_approx_eq!(pct[1], 20.0);
    assert_approx_eq!(pct[2], 0.0);
    // zero actual divides by the floor of 1, not by zero
    assert_approx_eq!(pct[3], 500.0);
}

#[test]
fn weekly_rollup_sums_per_week() {
    let weekly = weekly_accuracy(&holdout_frame()).unwrap();
    assert_eq!(weekly.height(), 2);

    let keys: Vec<i64> = weekly
        .column("week_key")
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(keys, vec![202410, 202411]);

    let actual: Vec<f64> = weekly
        .column("actual_total")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(actual, vec![150.0, 80.0]);

    let wmape: Vec<f64> = weekly
        .column("wmape")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    // week 10: (10 + 10) / 150, week 11: (0 + 5) / 80
    assert_approx_eq!(wmape[0], 20.0 / 150.0 * 100.0);
    assert_approx_eq!(wmape[1], 5.0 / 80.0 * 100.0);
}

#[test]
fn dimension_rollup_groups_one_column() {
    let by_customer = dimension_accuracy(&holdout_frame(), "customer").unwrap();
    assert_eq!(by_customer.height(), 2);

    let customers: Vec<&str> = by_customer
        .column("customer")
        .unwrap()
        .utf8()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(customers, vec!["acme_flowers", "bloom_and_co"]);

    let wmape: Vec<f64> = by_customer
        .column("wmape")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_approx_eq!(wmape[0], 10.0 / 180.0 * 100.0);
    assert_approx_eq!(wmape[1], 15.0 / 50.0 * 100.0);
}

#[test]
fn null_dimension_rows_are_excluded() {
    let by_farm = dimension_accuracy(&holdout_frame(), "farm").unwrap();
    assert_eq!(by_farm.height(), 0);
}

#[test]
fn all_zero_actuals_use_the_unit_floor() {
    let frame = DataFrame::new(vec![
        Series::new("model", vec!["rejection"; 2]),
        Series::new("algorithm", vec!["linear"; 2]),
        Series::new("year", vec![2024i64; 2]),
        Series::new("week", vec![5i64, 5]),
        Series::new("week_key", vec![202405i64, 202405]),
        Series::new("farm", vec!["north_field"; 2]),
        Series::new("variety", vec!["tulip"; 2]),
        Series::new("customer", vec![None::<&str>; 2]),
        Series::new("actual", vec![0.0f64, 0.0]),
        Series::new("predicted", vec![3.0f64, 4.0]),
        Series::new("training_weeks", vec![None::<i64>; 2]),
    ])
    .unwrap();

    let weekly = weekly_accuracy(&frame).unwrap();
    assert_eq!(weekly.height(), 1);
    let wmape = weekly.column("wmape").unwrap().f64().unwrap().get(0).unwrap();
    assert_approx_eq!(wmape, 700.0);
}
