//! Multi-criteria decision maths shared by edge baking and path ranking.
//!
//! Every criterion here is a cost: smaller raw values are better.

use serde::{Deserialize, Serialize};

/// Number of criteria: length, risk, rainfall.
pub const CRITERIA: usize = 3;

/// Floor applied to vector-normalisation denominators.
pub const NORM_EPSILON: f64 = 1e-9;

/// Normalised value used when a min-max column has no spread.
pub const DEGENERATE_MIDPOINT: f64 = 0.5;

/// Relative importance of each criterion.
///
/// Values need not sum to one; [`CriteriaWeights::normalized`] rescales them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaWeights {
    pub length: f64,
    pub risk: f64,
    pub rainfall: f64,
}

impl Default for CriteriaWeights {
    fn default() -> Self {
        Self {
            length: 1.0,
            risk: 1.0,
            rainfall: 1.0,
        }
    }
}

impl CriteriaWeights {
    pub fn new(length: f64, risk: f64, rainfall: f64) -> Self {
        Self { length, risk, rainfall }
    }

    /// Weights rescaled to sum to one. All-zero weights become equal thirds.
    pub fn normalized(&self) -> [f64; CRITERIA] {
        let raw = self.as_array();
        let sum: f64 = raw.iter().sum();
        if sum <= 0.0 || !sum.is_finite() {
            return [1.0 / CRITERIA as f64; CRITERIA];
        }
        raw.map(|w| w / sum)
    }

    pub fn as_array(&self) -> [f64; CRITERIA] {
        [self.length, self.risk, self.rainfall]
    }
}

/// Min-max scaling of `value` into [0, 1] over `[min, max]`.
pub fn min_max(value: f64, min: f64, max: f64) -> f64 {
    let range = max - min;
    if range <= 0.0 {
        return DEGENERATE_MIDPOINT;
    }
    ((value - min) / range).clamp(0.0, 1.0)
}

/// Weighted sum of already-normalised criteria.
pub fn weighted_sum(normalized: &[f64; CRITERIA], weights: &[f64; CRITERIA]) -> f64 {
    normalized.iter().zip(weights).map(|(v, w)| v * w).sum()
}

/// Euclidean norm of every column, floored at [`NORM_EPSILON`].
pub fn column_norms(rows: &[[f64; CRITERIA]]) -> [f64; CRITERIA] {
    let mut sums = [0.0; CRITERIA];
    for row in rows {
        for (sum, value) in sums.iter_mut().zip(row) {
            *sum += value * value;
        }
    }
    sums.map(|s| s.sqrt().max(NORM_EPSILON))
}

/// TOPSIS closeness coefficient for each row.
///
/// Rows are vector-normalised per column, weighted, and compared to the
/// positive ideal (column minimum) and negative ideal (column maximum).
/// A row equidistant from nothing (both distances zero) scores 0.
pub fn topsis(rows: &[[f64; CRITERIA]], weights: &[f64; CRITERIA]) -> Vec<f64> {
    if rows.is_empty() {
        return Vec::new();
    }

    let norms = column_norms(rows);
    let weighted: Vec<[f64; CRITERIA]> = rows
        .iter()
        .map(|row| std::array::from_fn(|c| row[c] / norms[c] * weights[c]))
        .collect();

    let mut ideal = [f64::INFINITY; CRITERIA];
    let mut anti_ideal = [f64::NEG_INFINITY; CRITERIA];
    for row in &weighted {
        for c in 0..CRITERIA {
            ideal[c] = ideal[c].min(row[c]);
            anti_ideal[c] = anti_ideal[c].max(row[c]);
        }
    }

    weighted
        .iter()
        .map(|row| {
            let d_pos = distance(row, &ideal);
            let d_neg = distance(row, &anti_ideal);
            let denom = d_pos + d_neg;
            if denom > 0.0 { d_neg / denom } else { 0.0 }
        })
        .collect()
}

fn distance(a: &[f64; CRITERIA], b: &[f64; CRITERIA]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_weights_sum_to_one() {
        let weights = CriteriaWeights::new(2.0, 1.0, 1.0).normalized();
        assert_eq!(weights, [0.5, 0.25, 0.25]);
    }

    #[test]
    fn test_zero_weights_fall_back_to_equal() {
        let weights = CriteriaWeights::new(0.0, 0.0, 0.0).normalized();
        for w in weights {
            assert!((w - 1.0 / 3.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_min_max_degenerate_column() {
        assert_eq!(min_max(4.0, 4.0, 4.0), DEGENERATE_MIDPOINT);
        assert_eq!(min_max(5.0, 0.0, 10.0), 0.5);
    }

    #[test]
    fn test_topsis_dominant_row_scores_one() {
        let rows = [[1.0, 0.0, 0.0], [5.0, 3.0, 20.0]];
        let scores = topsis(&rows, &[1.0 / 3.0; 3]);
        assert!((scores[0] - 1.0).abs() < 1e-12);
        assert!(scores[1].abs() < 1e-12);
    }

    #[test]
    fn test_topsis_identical_rows_score_zero() {
        let rows = [[2.0, 1.0, 0.0], [2.0, 1.0, 0.0]];
        let scores = topsis(&rows, &[1.0 / 3.0; 3]);
        assert_eq!(scores, vec![0.0, 0.0]);
    }

    #[test]
    fn test_topsis_scores_within_unit_interval() {
        let rows = [
            [120.0, 2.0, 4.0],
            [80.0, 5.0, 12.0],
            [200.0, 0.0, 1.0],
            [95.0, 3.0, 30.0],
        ];
        for score in topsis(&rows, &[0.5, 0.3, 0.2]) {
            assert!((0.0..=1.0).contains(&score), "score out of range: {score}");
        }
    }

    #[test]
    fn test_topsis_all_zero_column_is_safe() {
        let rows = [[10.0, 0.0, 0.0], [20.0, 0.0, 0.0]];
        let scores = topsis(&rows, &[1.0 / 3.0; 3]);
        assert!(scores.iter().all(|s| s.is_finite()));
        assert!(scores[0] > scores[1]);
    }
}
