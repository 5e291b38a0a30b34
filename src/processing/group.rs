//! Group-by-and-sum.

use std::cmp::Ordering;

use crate::error::AnalyzeResult;
use crate::types::{DataSet, Value};

use super::reduce::SumAccumulator;

/// One partition produced by [`group_sum`].
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTotal {
    /// Grouping value shared by every row of the partition.
    pub key: Value,
    /// Sum of the aggregate column over the partition, typed like the aggregate column.
    pub total: Value,
}

/// Partition rows by the value of column `key_idx` and sum column `agg_idx` per partition.
///
/// Rows with a null or NaN key are dropped and `-0.0` joins the `0.0` partition. Partitions
/// come back in ascending key order.
pub fn group_sum(dataset: &DataSet, key_idx: usize, agg_idx: usize) -> AnalyzeResult<Vec<GroupTotal>> {
    let agg_field = &dataset.schema.fields[agg_idx];

    let mut keyed: Vec<(Value, &Value)> = dataset
        .rows
        .iter()
        .filter_map(|row| {
            let key = row.get(key_idx).filter(|k| !k.is_missing())?;
            Some((group_key(key), row.get(agg_idx).unwrap_or(&Value::Null)))
        })
        .collect();
    keyed.sort_by(|(a, _), (b, _)| a.compare(b).unwrap_or(Ordering::Equal));

    let mut partitions: Vec<(Value, SumAccumulator)> = Vec::new();
    for (key, value) in keyed {
        let same_key = partitions
            .last()
            .is_some_and(|(k, _)| k.compare(&key) == Some(Ordering::Equal));
        if !same_key {
            partitions.push((key, SumAccumulator::for_type(agg_field.data_type)));
        }
        if let Some((_, acc)) = partitions.last_mut() {
            acc.add(value);
        }
    }

    partitions
        .into_iter()
        .map(|(key, acc)| {
            Ok(GroupTotal {
                key,
                total: acc.finish(&agg_field.name)?,
            })
        })
        .collect()
}

fn group_key(key: &Value) -> Value {
    match key {
        // Adding zero turns -0.0 into 0.0.
        Value::Float64(v) => Value::Float64(v + 0.0),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Field, Schema};

    fn sales() -> DataSet {
        DataSet::new(
            Schema::new(vec![
                Field::new("category", DataType::Utf8),
                Field::new("revenue", DataType::Int64),
                Field::new("margin", DataType::Float64),
            ]),
            vec![
                vec![Value::Utf8("b".into()), Value::Int64(30), Value::Float64(0.5)],
                vec![Value::Utf8("a".into()), Value::Int64(10), Value::Float64(0.25)],
                vec![Value::Null, Value::Int64(99), Value::Float64(9.0)],
                vec![Value::Utf8("a".into()), Value::Int64(20), Value::Null],
                vec![Value::Utf8("b".into()), Value::Null, Value::Float64(1.0)],
            ],
        )
    }

    #[test]
    fn sums_per_group_in_key_order() {
        let groups = group_sum(&sales(), 0, 1).unwrap();
        assert_eq!(
            groups,
            vec![
                GroupTotal {
                    key: Value::Utf8("a".into()),
                    total: Value::Int64(30)
                },
                GroupTotal {
                    key: Value::Utf8("b".into()),
                    total: Value::Int64(30)
                },
            ]
        );
    }

    #[test]
    fn float_aggregates_stay_floats() {
        let groups = group_sum(&sales(), 0, 2).unwrap();
        assert_eq!(groups[0].total, Value::Float64(0.25));
        assert_eq!(groups[1].total, Value::Float64(1.5));
    }

    #[test]
    fn signed_zero_keys_share_a_group_and_nan_keys_drop() {
        let ds = DataSet::new(
            Schema::new(vec![
                Field::new("bucket", DataType::Float64),
                Field::new("units", DataType::Int64),
            ]),
            vec![
                vec![Value::Float64(-0.0), Value::Int64(1)],
                vec![Value::Float64(0.0), Value::Int64(2)],
                vec![Value::Float64(f64::NAN), Value::Int64(40)],
                vec![Value::Float64(1.5), Value::Int64(4)],
            ],
        );
        let groups = group_sum(&ds, 0, 1).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].total, Value::Int64(3));
        assert!(groups[0].key.as_f64().is_some_and(|k| k.is_sign_positive() && k == 0.0));
        assert_eq!(groups[1].key, Value::Float64(1.5));
    }

    #[test]
    fn empty_dataset_has_no_groups() {
        let ds = DataSet::new(sales().schema, Vec::new());
        assert!(group_sum(&ds, 0, 1).unwrap().is_empty());
    }
}
