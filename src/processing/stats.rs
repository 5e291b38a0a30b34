//! Descriptive statistics and Pearson correlation.

use crate::error::AnalyzeResult;
use crate::types::{DataSet, Value};

use super::reduce;

/// `describe()`-style summary of one numeric column.
///
/// Every field except `count` is `None` when the column has no values; `std` is also `None`
/// with a single value.
#[derive(Debug, Clone, PartialEq)]
pub struct Describe {
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (`n - 1` denominator).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub p25: Option<f64>,
    pub p50: Option<f64>,
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

/// Summarize numeric column `idx`, ignoring nulls and NaN.
pub fn describe(dataset: &DataSet, idx: usize) -> AnalyzeResult<Describe> {
    let mut values: Vec<f64> = dataset
        .column(idx)
        .filter_map(Value::as_f64)
        .filter(|v| !v.is_nan())
        .collect();
    let count = values.len();
    let mean = reduce::mean(dataset, idx)?;

    let std = match mean {
        Some(m) if count > 1 => {
            let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
            Some((ss / (count - 1) as f64).sqrt())
        }
        _ => None,
    };

    values.sort_by(f64::total_cmp);
    Ok(Describe {
        count,
        mean,
        std,
        min: values.first().copied(),
        p25: percentile_linear(&values, 0.25),
        p50: percentile_linear(&values, 0.50),
        p75: percentile_linear(&values, 0.75),
        max: values.last().copied(),
    })
}

/// Percentile of already-sorted values with linear interpolation between closest ranks.
pub fn percentile_linear(sorted: &[f64], q: f64) -> Option<f64> {
    match sorted {
        [] => None,
        [only] => Some(*only),
        _ => {
            let pos = q * (sorted.len() - 1) as f64;
            let lower = pos.floor() as usize;
            let upper = pos.ceil() as usize;
            if lower == upper {
                Some(sorted[lower])
            } else {
                let frac = pos - lower as f64;
                Some(sorted[lower] * (1.0 - frac) + sorted[upper] * frac)
            }
        }
    }
}

/// Pearson correlation coefficient and its verbal bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Correlation {
    /// `None` when fewer than two complete pairs exist or either side has zero variance.
    pub coefficient: Option<f64>,
    pub interpretation: &'static str,
}

impl Correlation {
    fn new(coefficient: Option<f64>) -> Self {
        Self {
            coefficient,
            interpretation: interpret(coefficient),
        }
    }
}

/// Bucket a coefficient: above 0.7 strong positive, below -0.7 strong negative, magnitude under
/// 0.3 weak, anything else moderate.
pub fn interpret(coefficient: Option<f64>) -> &'static str {
    match coefficient {
        None => "undefined",
        Some(r) if r > 0.7 => "strong positive",
        Some(r) if r < -0.7 => "strong negative",
        Some(r) if r.abs() < 0.3 => "weak",
        Some(_) => "moderate",
    }
}

/// Pearson correlation between numeric columns `x_idx` and `y_idx` over rows where both values
/// are present and not NaN.
pub fn pearson(dataset: &DataSet, x_idx: usize, y_idx: usize) -> Correlation {
    let pairs: Vec<(f64, f64)> = dataset
        .rows
        .iter()
        .filter_map(|row| {
            let x = row.get(x_idx)?.as_f64()?;
            let y = row.get(y_idx)?.as_f64()?;
            (!x.is_nan() && !y.is_nan()).then_some((x, y))
        })
        .collect();

    if pairs.len() < 2 {
        return Correlation::new(None);
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0_f64;
    let mut var_x = 0.0_f64;
    let mut var_y = 0.0_f64;
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return Correlation::new(None);
    }
    let r = (cov / denom).clamp(-1.0, 1.0);
    Correlation::new(r.is_finite().then_some(r))
}
