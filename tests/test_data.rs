use bloom_forecast::config::ModelFamily;
use bloom_forecast::data::{self, WEEK_KEY};
use bloom_forecast::error::ForecastError;
use polars::prelude::*;
use pretty_assertions::assert_eq;

/// A demand table carrying every declared feature except the given ones,
/// plus a couple of rows with holes in lag_1 and the target.
fn demand_table_without(excluded: &[&str]) -> DataFrame {
    let spec = ModelFamily::Demand.spec();
    let n = 6usize;

    let mut columns = vec![
        Series::new("variety", vec!["rose"; n]),
        Series::new("customer", vec!["acme"; n]),
        Series::new("year", vec![2024i64; n]),
        Series::new("week", (1..=n as i64).collect::<Vec<i64>>()),
    ];

    for feature in spec.features {
        if excluded.contains(feature) {
            continue;
        }
        if *feature == "lag_1" {
            // One hole, to exercise the drop rule
            columns.push(Series::new(
                "lag_1",
                vec![Some(10.0), None, Some(12.0), Some(13.0), Some(14.0), Some(15.0)],
            ));
        } else {
            columns.push(Series::new(*feature, vec![1.0; n]));
        }
    }

    // Target with one hole of its own
    columns.push(Series::new(
        spec.target,
        vec![Some(100.0), Some(101.0), None, Some(103.0), Some(104.0), Some(105.0)],
    ));

    DataFrame::new(columns).unwrap()
}

#[test]
fn missing_features_are_reported_not_fatal() {
    let spec = ModelFamily::Demand.spec();
    let table = demand_table_without(&["lag_52", "customer_share_4w"]);

    let prepared = data::prepare(table, &spec).unwrap();

    assert_eq!(
        prepared.missing_features,
        vec!["lag_52".to_string(), "customer_share_4w".to_string()]
    );
    assert_eq!(
        prepared.feature_columns.len(),
        spec.features.len() - 2
    );
    // Rows with a null target or null available feature are gone.
    assert_eq!(prepared.df.height(), 4);
}

#[test]
fn absent_target_is_fatal_for_the_family() {
    let spec = ModelFamily::Demand.spec();
    let table = demand_table_without(&[])
        .drop(spec.target)
        .unwrap();

    let result = data::prepare(table, &spec);
    match result {
        Err(ForecastError::MissingTarget { table, column }) => {
            assert_eq!(table, "features_demand");
            assert_eq!(column, "demand_qty");
        }
        other => panic!("expected MissingTarget, got {:?}", other.map(|p| p.df)),
    }
}

#[test]
fn week_key_is_derived_and_sorted() {
    let spec = ModelFamily::Demand.spec();
    let table = demand_table_without(&[]);

    let prepared = data::prepare(table, &spec).unwrap();

    let keys: Vec<i64> = prepared
        .df
        .column(WEEK_KEY)
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(keys, vec![202401, 202404, 202405, 202406]);
}

#[test]
fn fill_missing_zero_fills_without_dropping() {
    let df = DataFrame::new(vec![
        Series::new("lag_1", vec![Some(1.0), None, Some(3.0)]),
        Series::new("lag_2", vec![None::<f64>, None, None]),
    ])
    .unwrap();

    let filled =
        data::fill_missing(df, &["lag_1".to_string(), "lag_2".to_string()]).unwrap();

    assert_eq!(filled.height(), 3);
    let lag_1: Vec<f64> = filled
        .column("lag_1")
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect();
    assert_eq!(lag_1, vec![1.0, 0.0, 3.0]);
}

#[test]
fn meta_columns_follow_the_family_dimensions() {
    let spec = ModelFamily::Demand.spec();
    let prepared = data::prepare(demand_table_without(&[]), &spec).unwrap();

    let expected: Vec<String> = ["year", "week", WEEK_KEY, "variety", "customer"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(prepared.meta_columns, expected);
}

#[test]
fn feature_rows_preserve_row_and_column_order() {
    let df = DataFrame::new(vec![
        Series::new("a", vec![1.0, 2.0]),
        Series::new("b", vec![10.0, 20.0]),
    ])
    .unwrap();

    let rows = data::feature_rows(&df, &["b".to_string(), "a".to_string()]).unwrap();
    assert_eq!(rows, vec![vec![10.0, 1.0], vec![20.0, 2.0]]);
}
