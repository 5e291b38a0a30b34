//! Ranking rows by a single column (`top_n` / `bottom_n`).

use std::cmp::Ordering;

use crate::types::{DataSet, Value};

/// Sort direction for [`rank_rows`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Largest values first (`top_n`).
    Descending,
    /// Smallest values first (`bottom_n`).
    Ascending,
}

/// Up to `n` rows ordered by column `idx`.
///
/// Rows whose value is null or NaN are left out. The sort is stable, so tied rows keep their original
/// relative order in both directions.
pub fn rank_rows(dataset: &DataSet, idx: usize, n: usize, order: RankOrder) -> Vec<Vec<Value>> {
    let mut ranked: Vec<(&Value, &Vec<Value>)> = dataset
        .rows
        .iter()
        .filter_map(|row| match row.get(idx) {
            Some(v) if !v.is_missing() => Some((v, row)),
            _ => None,
        })
        .collect();

    ranked.sort_by(|(a, _), (b, _)| {
        let ord = a.compare(b).unwrap_or(Ordering::Equal);
        match order {
            RankOrder::Descending => ord.reverse(),
            RankOrder::Ascending => ord,
        }
    });

    ranked
        .into_iter()
        .take(n)
        .map(|(_, row)| row.clone())
        .collect()
}

/// The `n` rows with the largest values in column `idx`.
pub fn top_n(dataset: &DataSet, idx: usize, n: usize) -> Vec<Vec<Value>> {
    rank_rows(dataset, idx, n, RankOrder::Descending)
}

/// The `n` rows with the smallest values in column `idx`.
pub fn bottom_n(dataset: &DataSet, idx: usize, n: usize) -> Vec<Vec<Value>> {
    rank_rows(dataset, idx, n, RankOrder::Ascending)
}
