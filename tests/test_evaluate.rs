use bloom_forecast::config::ModelFamily;
use bloom_forecast::data;
use bloom_forecast::evaluate::evaluate_holdout;
use bloom_forecast::models::default_roster;
use polars::prelude::*;
use pretty_assertions::assert_eq;

/// Three entities over `n_weeks` weeks with a target that is an exact linear
/// function of the lag features, so the linear baseline can in principle
/// score a near-zero error.
fn linear_demand_table(n_weeks: i64) -> DataFrame {
    let customers = ["acme_flowers", "bloom_and_co", "petal_palace"];

    let mut variety = Vec::new();
    let mut customer = Vec::new();
    let mut year = Vec::new();
    let mut week = Vec::new();
    let mut lag_1 = Vec::new();
    let mut lag_2 = Vec::new();
    let mut rolling = Vec::new();
    let mut target = Vec::new();

    for w in 1..=n_weeks {
        for (ci, c) in customers.iter().enumerate() {
            let base = 100.0 + ci as f64 * 40.0;
            let l1 = base + w as f64 * 2.0;
            let l2 = base + w as f64 * 1.5;

            variety.push("rose");
            customer.push(*c);
            year.push(2024i64);
            week.push(w);
            lag_1.push(l1);
            lag_2.push(l2);
            rolling.push((l1 + l2) / 2.0);
            target.push(2.0 * l1 - 0.5 * l2 + 10.0);
        }
    }

    DataFrame::new(vec![
        Series::new("variety", variety),
        Series::new("customer", customer),
        Series::new("year", year),
        Series::new("week", week),
        Series::new("lag_1", lag_1),
        Series::new("lag_2", lag_2),
        Series::new("rolling_mean_4", rolling),
        Series::new("demand_qty", target),
    ])
    .unwrap()
}

#[test]
fn every_roster_algorithm_gets_a_metric_row() {
    let spec = ModelFamily::Demand.spec();
    let prepared = data::prepare(linear_demand_table(30), &spec).unwrap();
    let roster = default_roster();

    let output = evaluate_holdout(&prepared, &spec, &roster)
        .unwrap()
        .expect("enough rows for a holdout split");

    let algorithms: Vec<String> = output.metrics.iter().map(|m| m.algorithm.clone()).collect();
    assert_eq!(
        algorithms,
        vec!["random_forest", "gradient_boosting", "decision_tree", "linear"]
    );
    for metric in &output.metrics {
        assert_eq!(metric.model, "demand");
        assert!(metric.wmape.is_finite());
        assert!(metric.train_rows > metric.test_rows);
    }
}

#[test]
fn winner_selection_is_deterministic() {
    let spec = ModelFamily::Demand.spec();
    let prepared = data::prepare(linear_demand_table(30), &spec).unwrap();
    let roster = default_roster();

    let first = evaluate_holdout(&prepared, &spec, &roster).unwrap().unwrap();
    let second = evaluate_holdout(&prepared, &spec, &roster).unwrap().unwrap();

    assert_eq!(first.best_algorithm, second.best_algorithm);
    for (a, b) in first.metrics.iter().zip(second.metrics.iter()) {
        assert_eq!(a.algorithm, b.algorithm);
        assert_eq!(a.wmape.to_bits(), b.wmape.to_bits());
        assert_eq!(a.mae.to_bits(), b.mae.to_bits());
    }
    assert!(first.predictions.frame_equal_missing(&second.predictions));
}

#[test]
fn holdout_predictions_are_tagged_with_the_winner() {
    let spec = ModelFamily::Demand.spec();
    let prepared = data::prepare(linear_demand_table(30), &spec).unwrap();
    let roster = default_roster();

    let output = evaluate_holdout(&prepared, &spec, &roster).unwrap().unwrap();

    let tags: Vec<&str> = output
        .predictions
        .column("algorithm")
        .unwrap()
        .utf8()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert!(!tags.is_empty());
    assert!(tags.iter().all(|t| *t == output.best_algorithm));

    // Chronological 80/20: the held-out rows are the latest 20%.
    assert_eq!(output.predictions.height(), 30 * 3 - (30 * 3 * 8 / 10));
}

#[test]
fn winner_gets_one_importance_per_feature() {
    let spec = ModelFamily::Demand.spec();
    let prepared = data::prepare(linear_demand_table(30), &spec).unwrap();
    let roster = default_roster();

    let output = evaluate_holdout(&prepared, &spec, &roster).unwrap().unwrap();

    let features: Vec<String> = output.importances.iter().map(|i| i.feature.clone()).collect();
    assert_eq!(features, prepared.feature_columns);
    for importance in &output.importances {
        assert!(importance.importance >= 0.0);
    }
}

#[test]
fn tiny_tables_soft_skip_the_holdout() {
    let spec = ModelFamily::Demand.spec();
    let prepared = data::prepare(linear_demand_table(2), &spec).unwrap();
    let roster = default_roster();

    assert!(evaluate_holdout(&prepared, &spec, &roster).unwrap().is_none());
}
