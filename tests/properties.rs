use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::{json, Value as JsonValue};
use tabular_analyze::analysis::{analyze, AnalysisOptions, OperationRequest};
use tabular_analyze::expr::compile;
use tabular_analyze::processing::{self, reduce::count_non_null};
use tabular_analyze::types::{DataSet, DataType, Field, Schema, Value};

fn int_cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        1 => Just(Value::Null),
        6 => (-50_i64..50).prop_map(Value::Int64),
    ]
}

fn float_cell() -> impl Strategy<Value = Value> {
    prop_oneof![
        1 => Just(Value::Null),
        6 => (-1.0e3_f64..1.0e3).prop_map(Value::Float64),
    ]
}

fn label_cell() -> impl Strategy<Value = Value> {
    prop_oneof![Just("x"), Just("y"), Just("z")].prop_map(|s| Value::Utf8(s.to_string()))
}

/// Rows of `(id, label, qty: Int64, price: Float64)`; ids are the row positions.
fn table() -> impl Strategy<Value = DataSet> {
    prop::collection::vec((label_cell(), int_cell(), float_cell()), 0..40).prop_map(|cells| {
        let rows = cells
            .into_iter()
            .enumerate()
            .map(|(i, (label, qty, price))| vec![Value::Int64(i as i64), label, qty, price])
            .collect();
        DataSet::new(
            Schema::new(vec![
                Field::new("id", DataType::Int64),
                Field::new("label", DataType::Utf8),
                Field::new("qty", DataType::Int64),
                Field::new("price", DataType::Float64),
            ]),
            rows,
        )
    })
}

fn run(ds: &DataSet, request: OperationRequest) -> JsonValue {
    let result = analyze(ds, "generated", &request, &AnalysisOptions::default());
    result.result().cloned().unwrap()
}

proptest! {
    #[test]
    fn ranking_everything_sorts_the_present_values(ds in table(), column in prop_oneof![Just("qty"), Just("price")]) {
        let idx = ds.schema.index_of(column).unwrap();
        let n = ds.row_count() + 1;
        let top = processing::top_n(&ds, idx, n);
        let bottom = processing::bottom_n(&ds, idx, n);

        let present = count_non_null(&ds, idx);
        prop_assert_eq!(top.len(), present);
        prop_assert_eq!(bottom.len(), present);

        let top_values: Vec<f64> = top.iter().filter_map(|r| r[idx].as_f64()).collect();
        let bottom_values: Vec<f64> = bottom.iter().filter_map(|r| r[idx].as_f64()).collect();
        prop_assert!(top_values.windows(2).all(|w| w[0] >= w[1]));
        prop_assert!(bottom_values.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn ranking_ties_keep_row_order(ds in table()) {
        let top = processing::top_n(&ds, 2, ds.row_count());
        for pair in top.windows(2) {
            if pair[0][2] == pair[1][2] {
                prop_assert!(pair[0][0].as_f64() < pair[1][0].as_f64());
            }
        }
    }

    #[test]
    fn mean_is_sum_over_present_count(ds in table(), idx in 2_usize..4) {
        let sum = processing::reduce::sum(&ds, idx).unwrap();
        let mean = processing::reduce::mean(&ds, idx).unwrap();
        let count = count_non_null(&ds, idx);
        if count == 0 {
            prop_assert_eq!(mean, None);
        } else {
            let expected = sum / count as f64;
            let got = mean.unwrap();
            prop_assert!((got - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }
    }

    #[test]
    fn refiltering_a_full_match_stays_full(ds in table(), threshold in -50_i64..50) {
        let condition = format!("qty >= {threshold} or label == 'x'");
        let predicate = compile(&condition, &ds.schema).unwrap();
        let matched = processing::filter(&ds, |row| predicate.matches(row));
        let again = processing::filter_summary(&matched, &predicate, 5);
        prop_assert_eq!(again.matching_rows, matched.row_count());
        if matched.row_count() > 0 {
            prop_assert_eq!(again.percentage, 100.0);
        }
    }

    #[test]
    fn reported_duplicates_have_a_twin(ds in table(), subset in prop::sample::subsequence(vec![1_usize, 2, 3], 1..=3)) {
        let dupes = processing::duplicates(&ds, &subset, usize::MAX);
        prop_assert_eq!(dupes.sample.len(), dupes.duplicate_rows);
        for row in &dupes.sample {
            let twins = ds
                .rows
                .iter()
                .filter(|other| subset.iter().all(|&c| other[c] == row[c]))
                .count();
            prop_assert!(twins >= 2);
        }
    }

    #[test]
    fn correlation_is_symmetric(ds in table()) {
        let ab = run(&ds, OperationRequest::new("correlate").with_pair("qty", "price"));
        let ba = run(&ds, OperationRequest::new("correlate").with_pair("price", "qty"));
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn self_correlation_is_one_with_variance(ds in table()) {
        let values: Vec<f64> = ds.column(3).filter_map(Value::as_f64).collect();
        let varies = values.windows(2).any(|w| w[0] != w[1]);
        let result = run(&ds, OperationRequest::new("correlate").with_pair("price", "price"));
        if varies {
            prop_assert_eq!(&result["correlation"], &json!(1.0));
            prop_assert_eq!(&result["interpretation"], &json!("strong positive"));
        } else {
            prop_assert_eq!(&result["correlation"], &JsonValue::Null);
        }
    }

    #[test]
    fn unique_values_are_distinct(ds in table(), column in prop_oneof![Just("label"), Just("qty"), Just("price")]) {
        let result = run(&ds, OperationRequest::new("unique").with_column(column));
        let values = result["values"].as_array().unwrap();
        let rendered: HashSet<String> = values.iter().map(JsonValue::to_string).collect();
        prop_assert_eq!(rendered.len(), values.len());
        let count = result["unique_count"].as_u64().unwrap() as usize;
        prop_assert!(count <= ds.row_count());
        prop_assert_eq!(values.len(), count.min(100));
    }
}
