//! Correlation coefficients with significance

use statrs::distribution::{ContinuousCDF, StudentsT};

/// One computed coefficient over n paired observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub coefficient: f64,
    pub p_value: f64,
    pub n: usize,
}

/// Pearson product-moment correlation with a two-sided p-value.
///
/// `None` when fewer than 3 pairs are available or either side has
/// zero variance.
pub fn pearson(x_values: &[f64], y_values: &[f64]) -> Option<Correlation> {
    let n = x_values.len();
    if n < 3 || n != y_values.len() {
        return None;
    }
    let n_f = n as f64;

    let mean_x = x_values.iter().sum::<f64>() / n_f;
    let mean_y = y_values.iter().sum::<f64>() / n_f;

    let (covariance, variance_x, variance_y) = x_values
        .iter()
        .zip(y_values.iter())
        .map(|(x, y)| {
            let diff_x = x - mean_x;
            let diff_y = y - mean_y;
            (diff_x * diff_y, diff_x * diff_x, diff_y * diff_y)
        })
        .fold((0.0, 0.0, 0.0), |acc, (cov, var_x, var_y)| {
            (acc.0 + cov, acc.1 + var_x, acc.2 + var_y)
        });

    if variance_x == 0.0 || variance_y == 0.0 {
        return None;
    }

    let coefficient = covariance / (variance_x.sqrt() * variance_y.sqrt());
    // Floating error can push |r| epsilon past 1.
    let coefficient = coefficient.clamp(-1.0, 1.0);

    Some(Correlation {
        coefficient,
        p_value: two_sided_p(coefficient, n)?,
        n,
    })
}

/// Spearman rank correlation: Pearson over average ranks, which handles
/// ties the standard way.
pub fn spearman(x_values: &[f64], y_values: &[f64]) -> Option<Correlation> {
    if x_values.len() < 3 || x_values.len() != y_values.len() {
        return None;
    }
    pearson(&ranks(x_values), &ranks(y_values))
}

/// Two-sided p-value from the t-approximation with n-2 degrees of
/// freedom. Perfect correlations short-circuit to 0.
fn two_sided_p(r: f64, n: usize) -> Option<f64> {
    if (r.abs() - 1.0).abs() < f64::EPSILON {
        return Some(0.0);
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df).ok()?;
    Some(2.0 * (1.0 - dist.cdf(t.abs())))
}

/// Average ranks (1-based); tied values share the mean of their ranks.
fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut result = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        // ranks start+1 ..= end+1 averaged over the tie group
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &index in &order[start..=end] {
            result[index] = rank;
        }
        start = end + 1;
    }
    result
}
