//! Locally weighted scatterplot smoothing.
//!
//! Used to draw a trend through the dark count rate as a function of temperature. Each point is
//! replaced by the value of a weighted linear fit through its nearest neighbours, with tricube
//! weights on distance. Optional robustness passes then downweight outliers using bisquare
//! weights on the residuals.

use super::error::FitError;

fn tricube(u: f64) -> f64 {
    if u >= 1.0 {
        0.0
    } else {
        let t = 1.0 - u * u * u;
        t * t * t
    }
}

fn bisquare(u: f64) -> f64 {
    if u >= 1.0 {
        0.0
    } else {
        let t = 1.0 - u * u;
        t * t
    }
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        0.5 * (values[mid - 1] + values[mid])
    } else {
        values[mid]
    }
}

/// Weighted linear fit over x[left..=right], evaluated at x[target]
fn local_fit(
    x: &[f64],
    y: &[f64],
    robustness: &[f64],
    left: usize,
    right: usize,
    target: usize,
) -> f64 {
    let x0 = x[target];
    let radius = (x0 - x[left]).max(x[right] - x0);

    let mut weights = Vec::with_capacity(right - left + 1);
    for j in left..=right {
        let distance_weight = if radius > 0.0 {
            tricube((x[j] - x0).abs() / radius)
        } else {
            1.0
        };
        weights.push(distance_weight * robustness[j]);
    }

    let weight_sum: f64 = weights.iter().sum();
    if weight_sum <= 0.0 {
        return y[target];
    }
    let (mut x_mean, mut y_mean) = (0.0, 0.0);
    for (w, j) in weights.iter().zip(left..=right) {
        x_mean += w * x[j];
        y_mean += w * y[j];
    }
    x_mean /= weight_sum;
    y_mean /= weight_sum;

    let (mut sxx, mut sxy) = (0.0, 0.0);
    for (w, j) in weights.iter().zip(left..=right) {
        let dx = x[j] - x_mean;
        sxx += w * dx * dx;
        sxy += w * dx * (y[j] - y_mean);
    }
    // Neighbourhood collapsed onto a single x; fall back to the weighted mean
    if sxx <= f64::EPSILON * weight_sum {
        return y_mean;
    }
    y_mean + (sxy / sxx) * (x0 - x_mean)
}

/// Smooth (x, y) with LOWESS.
///
/// `fraction` is the share of points used for each local fit and `iterations` the number of
/// robustness passes. Returns the smoothed curve as (x, fitted y) ordered by x.
pub fn lowess(
    x: &[f64],
    y: &[f64],
    fraction: f64,
    iterations: usize,
) -> Result<Vec<(f64, f64)>, FitError> {
    if x.len() != y.len() {
        return Err(FitError::MismatchedLengths(x.len(), y.len()));
    }
    if !(fraction > 0.0 && fraction <= 1.0) {
        return Err(FitError::InvalidFraction(fraction));
    }
    let n = x.len();
    if n < 2 {
        return Err(FitError::InsufficientData("smoothing needs at least two points"));
    }

    let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (xs, ys): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();

    let n_local = ((fraction * n as f64 + 1e-10) as usize).clamp(2, n);
    let mut robustness = vec![1.0; n];
    let mut fitted = vec![0.0; n];

    for pass in 0..=iterations {
        let mut left = 0;
        let mut right = n_local - 1;
        for target in 0..n {
            // Slide the window so it holds the n_local points nearest to the target
            while right + 1 < n && xs[right + 1] - xs[target] < xs[target] - xs[left] {
                left += 1;
                right += 1;
            }
            fitted[target] = local_fit(&xs, &ys, &robustness, left, right, target);
        }

        if pass == iterations {
            break;
        }
        let residuals: Vec<f64> = ys.iter().zip(&fitted).map(|(y, f)| y - f).collect();
        let mut abs_residuals: Vec<f64> = residuals.iter().map(|r| r.abs()).collect();
        let scale = 6.0 * median(&mut abs_residuals);
        // Residuals already at rounding level; robustness weights would only add noise
        let y_scale = ys.iter().map(|y| y.abs()).sum::<f64>() / n as f64;
        if scale <= 1e-7 * y_scale {
            break;
        }
        for (weight, residual) in robustness.iter_mut().zip(&residuals) {
            *weight = bisquare(residual.abs() / scale);
        }
    }

    Ok(xs.into_iter().zip(fitted).collect())
}
