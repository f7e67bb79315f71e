//! Shapiro-Wilk test for normality, using Royston's approximation of the coefficients and of
//! the distribution of the statistic
use statrs::distribution::{ContinuousCDF, Normal};

use crate::results::ResultsError;

/// Outcome of a normality test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalityTest {
    /// The W statistic, in `(0, 1]`
    pub statistic: f64,
    pub p_value: f64,
    /// Significance level the p-value was compared against
    pub alpha: f64,
    /// Whether the hypothesis of normality is kept, `p_value > alpha`
    pub normal: bool,
}

impl NormalityTest {
    pub(crate) fn new(statistic: f64, p_value: f64, alpha: f64) -> NormalityTest {
        NormalityTest {
            statistic,
            p_value,
            alpha,
            normal: p_value > alpha,
        }
    }
}

/// Shapiro-Wilk statistic and p-value of a sample
///
/// Needs between 3 and 5000 values that are not all equal.
pub fn shapiro_wilk(sample: &[f64]) -> Result<(f64, f64), ResultsError> {
    let n = sample.len();
    if !(3..=5000).contains(&n) {
        return Err(ResultsError::Precondition(format!(
            "Shapiro-Wilk needs between 3 and 5000 values, found {}",
            n
        )));
    }
    let mut x = sample.to_vec();
    x.sort_by(|a, b| a.total_cmp(b));
    let mean = x.iter().sum::<f64>() / n as f64;
    let sum_of_squares: f64 = x.iter().map(|v| (v - mean).powi(2)).sum();
    if sum_of_squares <= 0.0 {
        return Err(ResultsError::Precondition(
            "Shapiro-Wilk needs values that are not all equal".to_string(),
        ));
    }

    let normal = standard_normal()?;
    let a = coefficients(n, &normal);
    let numerator: f64 = a.iter().zip(&x).map(|(a, x)| a * x).sum();
    let w = (numerator.powi(2) / sum_of_squares).min(1.0);
    Ok((w, p_value(w, n, &normal)))
}

fn standard_normal() -> Result<Normal, ResultsError> {
    Normal::new(0.0, 1.0).map_err(|e| ResultsError::Format(format!("{:?}", e)))
}

fn polynomial(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Coefficients of the ordered sample, antisymmetric around the middle
fn coefficients(n: usize, normal: &Normal) -> Vec<f64> {
    if n == 3 {
        return vec![-0.5f64.sqrt(), 0.0, 0.5f64.sqrt()];
    }
    let m: Vec<f64> = (1..=n)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (n as f64 + 0.25)))
        .collect();
    let mm: f64 = m.iter().map(|v| v * v).sum();
    let u = 1.0 / (n as f64).sqrt();
    let a_n = m[n - 1] / mm.sqrt()
        + polynomial(&[0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056], u);

    let mut a = vec![0.0; n];
    if n > 5 {
        let a_n1 = m[n - 2] / mm.sqrt()
            + polynomial(&[0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633], u);
        let phi = (mm - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
            / (1.0 - 2.0 * a_n.powi(2) - 2.0 * a_n1.powi(2));
        for i in 2..n - 2 {
            a[i] = m[i] / phi.sqrt();
        }
        a[1] = -a_n1;
        a[n - 2] = a_n1;
    } else {
        let phi = (mm - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * a_n.powi(2));
        for i in 1..n - 1 {
            a[i] = m[i] / phi.sqrt();
        }
    }
    a[0] = -a_n;
    a[n - 1] = a_n;
    a
}

fn p_value(w: f64, n: usize, normal: &Normal) -> f64 {
    if n == 3 {
        let p = 6.0 / std::f64::consts::PI * (w.sqrt().asin() - 0.75f64.sqrt().asin());
        return p.clamp(0.0, 1.0);
    }
    let nf = n as f64;
    let z = if n <= 11 {
        let gamma = polynomial(&[-2.273, 0.459], nf);
        let mu = polynomial(&[0.5440, -0.39978, 0.025054, -6.714e-4], nf);
        let sigma = polynomial(&[1.3822, -0.77857, 0.062767, -0.0020322], nf).exp();
        (-(gamma - (1.0 - w).ln()).ln() - mu) / sigma
    } else {
        let ln_n = nf.ln();
        let mu = polynomial(&[-1.5861, -0.31082, -0.083751, 0.0038915], ln_n);
        let sigma = polynomial(&[-0.4803, -0.082676, 0.0030302], ln_n).exp();
        ((1.0 - w).ln() - mu) / sigma
    };
    1.0 - normal.cdf(z)
}

#[cfg(test)]
mod normality_tests {
    use super::*;

    #[test]
    fn three_values_use_the_exact_distribution() {
        let (w, p) = shapiro_wilk(&[0.5, -1.0, 1.0]).unwrap();
        assert!((w - 0.923077).abs() < 1e-6);
        assert!((p - 0.463263).abs() < 1e-6);
    }

    #[test]
    fn skewed_sample_is_rejected() {
        let sample = [148.0, 154.0, 158.0, 160.0, 161.0, 162.0, 166.0, 170.0, 182.0, 195.0, 236.0];
        let (w, p) = shapiro_wilk(&sample).unwrap();
        assert!((w - 0.78881).abs() < 1e-4);
        assert!((p - 0.0067).abs() < 5e-4);
        assert!(!NormalityTest::new(w, p, 0.05).normal);
    }

    #[test]
    fn outlier_in_large_sample() {
        let sample = [
            0.1, -0.2, 0.05, 0.0, -0.1, 0.15, -0.05, 0.2, -0.15, 0.02, -0.02, 25.0,
        ];
        let (w, p) = shapiro_wilk(&sample).unwrap();
        assert!((w - 0.34208).abs() < 1e-4);
        assert!(p < 1e-5);
    }

    #[test]
    fn normal_scores_are_accepted() {
        let normal = standard_normal().unwrap();
        let sample: Vec<f64> = (1..=20)
            .map(|i| normal.inverse_cdf((i as f64 - 0.5) / 20.0))
            .collect();
        let (w, p) = shapiro_wilk(&sample).unwrap();
        assert!(w > 0.99);
        assert!(NormalityTest::new(w, p, 0.05).normal);
    }

    #[test]
    fn invalid_samples() {
        assert!(matches!(
            shapiro_wilk(&[1.0, 2.0]),
            Err(ResultsError::Precondition(_))
        ));
        assert!(matches!(
            shapiro_wilk(&[1.0, 1.0, 1.0, 1.0]),
            Err(ResultsError::Precondition(_))
        ));
    }
}
