//! Property tests for the transforms' round-trip and reindexing guarantees.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, TimeDelta};
use polars::prelude::*;
use proptest::prelude::*;
use timepp_model::{DecomposeMode, EncodingKind, Frequency, Table};
use timepp_transform::{Encoder, Normalizer, auto_fill_missing_time_steps, classical_decompose};

fn single_column(name: &str, series: Series) -> Table {
    Table::new(DataFrame::new(vec![series.with_name(name.into()).into_column()]).unwrap())
}

proptest! {
    #[test]
    fn normalizer_inverse_restores_values(
        values in prop::collection::vec(-1_000.0f64..1_000.0, 2..60)
    ) {
        let spread = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
            - values.iter().cloned().fold(f64::INFINITY, f64::min);
        prop_assume!(spread > 1.0);

        let table = single_column("x", Series::new("x".into(), &values));
        let mut normalizer = Normalizer::new(&table);
        let scaled = normalizer.fit_transform("x").unwrap();
        let params = normalizer.params().unwrap();

        let scaled_values: Vec<f64> = scaled.f64().unwrap().into_no_null_iter().collect();
        let mean = scaled_values.iter().sum::<f64>() / scaled_values.len() as f64;
        prop_assert!(mean.abs() < 1e-9);

        let scaled_table = single_column("x", scaled);
        let restored = Normalizer::with_params(&scaled_table, params)
            .inverse_transform("x")
            .unwrap();
        for (restored, original) in restored.f64().unwrap().into_no_null_iter().zip(&values) {
            prop_assert!((restored - original).abs() < 1e-6);
        }
    }

    #[test]
    fn label_encoding_round_trips(
        values in prop::collection::vec("[a-e]{1,3}", 1..40)
    ) {
        let table = single_column("category", Series::new("category".into(), &values));
        let mut encoder = Encoder::new(&table, EncodingKind::Label);
        let encoded = encoder.fit_transform("category").unwrap();
        let decoded = encoder.inverse_transform(&encoded).unwrap();

        let decoded: Vec<&str> = decoded.str().unwrap().into_no_null_iter().collect();
        prop_assert_eq!(decoded, values.iter().map(String::as_str).collect::<Vec<_>>());

        let mapping = encoder.mapping().unwrap();
        prop_assert_eq!(mapping.len(), values.iter().collect::<BTreeSet<_>>().len());
    }

    #[test]
    fn integer_label_encoding_round_trips(
        values in prop::collection::vec(-20i64..200, 1..40)
    ) {
        let table = single_column("store", Series::new("store".into(), &values));
        let mut encoder = Encoder::new(&table, EncodingKind::Label);
        let encoded = encoder.fit_transform("store").unwrap();
        let decoded = encoder.inverse_transform(&encoded).unwrap();

        let decoded: Vec<i64> = decoded.i64().unwrap().into_no_null_iter().collect();
        prop_assert_eq!(&decoded, &values);

        let distinct: Vec<i64> = values.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let codes: Vec<i64> = encoded
            .column("store")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        for (value, code) in values.iter().zip(&codes) {
            let rank = distinct.binary_search(value).unwrap() as i64;
            prop_assert_eq!(*code, rank);
        }
    }

    #[test]
    fn auto_fill_covers_every_day_once(
        observed in prop::collection::btree_map(0i64..45, 1.0f64..100.0, 1..20)
    ) {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates: Vec<String> = observed
            .keys()
            .map(|offset| (base + TimeDelta::days(*offset)).format("%Y-%m-%d").to_string())
            .collect();
        let sales: Vec<f64> = observed.values().copied().collect();
        let frame = df! { "date" => dates, "sales" => sales }.unwrap();
        let table = Table::new(frame).with_time_index("date", None).unwrap();

        let filled = auto_fill_missing_time_steps(&table, Frequency::DAILY).unwrap();

        let first = *observed.keys().next().unwrap();
        let last = *observed.keys().next_back().unwrap();
        prop_assert_eq!(filled.height() as i64, last - first + 1);

        let by_offset: BTreeMap<i64, f64> = filled
            .index_timestamps()
            .unwrap()
            .into_iter()
            .zip(
                filled
                    .column("sales")
                    .unwrap()
                    .as_materialized_series()
                    .f64()
                    .unwrap()
                    .into_no_null_iter(),
            )
            .map(|(stamp, value)| ((stamp.date() - base).num_days(), value))
            .collect();
        for (offset, value) in &by_offset {
            let expected = observed.get(offset).copied().unwrap_or(0.0);
            prop_assert_eq!(*value, expected);
        }
    }

    #[test]
    fn additive_components_reconstruct_series(
        period in 2usize..8,
        extra in 0usize..40,
        seed in prop::collection::vec(-50.0f64..50.0, 100)
    ) {
        let n = 2 * period + extra;
        let values: Vec<f64> = seed[..n].to_vec();
        let components = classical_decompose(&values, period, DecomposeMode::Additive).unwrap();

        for (i, y) in values.iter().enumerate() {
            match (components.trend[i], components.residual[i]) {
                (Some(trend), Some(residual)) => {
                    prop_assert!((components.seasonal[i] + trend + residual - y).abs() < 1e-9);
                }
                (None, None) => {
                    prop_assert!(i < period / 2 || i >= n - period / 2);
                }
                _ => {
                    prop_assert!(false, "trend and residual disagree at {}", i);
                }
            }
        }
    }
}
