//! Distribution normality classification

use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Jarque–Bera needs a handful of observations before its χ²
/// approximation means anything.
const MIN_SAMPLES: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct Normality {
    pub statistic: f64,
    pub p_value: f64,
    pub normal: bool,
}

/// Jarque–Bera test. `None` for degenerate input (too few samples or
/// zero variance); callers treat that as non-normal and fall back to
/// rank correlation.
pub fn jarque_bera(values: &[f64], alpha: f64) -> Option<Normality> {
    let n = values.len();
    if n < MIN_SAMPLES {
        return None;
    }
    let n_f = n as f64;
    let mean = values.iter().sum::<f64>() / n_f;

    let (m2, m3, m4) = values
        .iter()
        .map(|v| {
            let d = v - mean;
            let d2 = d * d;
            (d2, d2 * d, d2 * d2)
        })
        .fold((0.0, 0.0, 0.0), |acc, (a, b, c)| {
            (acc.0 + a / n_f, acc.1 + b / n_f, acc.2 + c / n_f)
        });

    if m2 == 0.0 {
        return None;
    }

    let skewness = m3 / m2.powf(1.5);
    let kurtosis = m4 / (m2 * m2);
    let statistic = n_f / 6.0 * (skewness * skewness + (kurtosis - 3.0).powi(2) / 4.0);

    let dist = ChiSquared::new(2.0).ok()?;
    let p_value = 1.0 - dist.cdf(statistic);

    Some(Normality {
        statistic,
        p_value,
        normal: p_value > alpha,
    })
}
