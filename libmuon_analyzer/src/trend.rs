use serde::{Deserialize, Serialize};

use super::error::FitError;

/// A first degree polynomial fit, y = slope * x + intercept
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    pub fn predict_all(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|x| self.predict(*x)).collect()
    }
}

/// Ordinary least squares fit of a line through (x, y).
///
/// Needs at least two points and at least two distinct x values.
pub fn fit_linear(x: &[f64], y: &[f64]) -> Result<TrendLine, FitError> {
    if x.len() != y.len() {
        return Err(FitError::MismatchedLengths(x.len(), y.len()));
    }
    if x.len() < 2 {
        return Err(FitError::InsufficientData("a line needs at least two points"));
    }
    // The mean of identical values need not round back to them, so check before the moments
    if x.iter().all(|xi| *xi == x[0]) {
        return Err(FitError::InsufficientData("all x values are identical"));
    }

    let n = x.len() as f64;
    let x_mean = x.iter().sum::<f64>() / n;
    let y_mean = y.iter().sum::<f64>() / n;
    let (sxx, sxy) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(sxx, sxy), (xi, yi)| {
            let dx = xi - x_mean;
            (sxx + dx * dx, sxy + dx * (yi - y_mean))
        });
    if sxx <= f64::EPSILON * n * x_mean.abs().max(1.0).powi(2) || !sxx.is_finite() {
        return Err(FitError::InsufficientData("x values do not vary"));
    }

    let slope = sxy / sxx;
    Ok(TrendLine {
        slope,
        intercept: y_mean - slope * x_mean,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_perfect_line() {
        let x: Vec<f64> = (0..10).map(|i| i as f64 * 0.7 - 2.0).collect();
        let y: Vec<f64> = x.iter().map(|x| 2.0 * x + 1.0).collect();
        let line = fit_linear(&x, &y).unwrap();
        assert_approx_eq!(line.slope, 2.0);
        assert_approx_eq!(line.intercept, 1.0);
        assert_approx_eq!(line.predict(10.0), 21.0);
        assert_eq!(line.predict_all(&x).len(), x.len());
    }

    #[test]
    fn test_noisy_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [1.0, 2.0, 2.0, 3.0];
        let line = fit_linear(&x, &y).unwrap();
        assert_approx_eq!(line.slope, 0.6);
        assert_approx_eq!(line.intercept, 1.1);
    }

    #[test]
    fn test_insufficient_data() {
        assert!(matches!(
            fit_linear(&[1.0], &[2.0]),
            Err(FitError::InsufficientData(_))
        ));
        assert!(matches!(
            fit_linear(&[], &[]),
            Err(FitError::InsufficientData(_))
        ));
        assert!(matches!(
            fit_linear(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]),
            Err(FitError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_constant_inexact_x() {
        // 0.1 is not representable, so its mean differs from it in the last bit
        assert!(matches!(
            fit_linear(&[0.1, 0.1, 0.1], &[1.0, 2.0, 3.0]),
            Err(FitError::InsufficientData(_))
        ));
        assert!(matches!(
            fit_linear(&[21.3; 7], &[0.5, 0.7, 0.2, 0.9, 0.1, 0.4, 0.3]),
            Err(FitError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_mismatched_lengths() {
        assert_eq!(
            fit_linear(&[1.0, 2.0], &[1.0]),
            Err(FitError::MismatchedLengths(2, 1))
        );
    }
}
