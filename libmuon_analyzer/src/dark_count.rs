use serde::{Deserialize, Serialize};

use super::bin_scan::{check_lengths, peak, scan_bins};
use super::error::BinError;

/// A bin whose peak amplitude stayed under the dark count threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DarkCountBin {
    /// Mean temperature over the bin
    pub temperature: f64,
    pub dark_rate_hz: f64,
}

/// Find the bins which only contain dark counts.
///
/// Uses the same partitioning as [`crate::bin_scan::bin_by_duration`]. A bin is kept only if its
/// peak amplitude is strictly below `threshold`; brighter bins are discarded. Rates are per unit
/// of `times`.
pub fn classify_dark_counts(
    times: &[f64],
    amplitudes: &[f64],
    temperatures: &[f64],
    bin_size: f64,
    threshold: f64,
) -> Result<Vec<DarkCountBin>, BinError> {
    if !threshold.is_finite() {
        return Err(BinError::InvalidThreshold(threshold));
    }
    check_lengths(times, amplitudes)?;
    check_lengths(times, temperatures)?;

    scan_bins(times, bin_size, |window| {
        if peak(window.slice(amplitudes)) >= threshold {
            return None;
        }
        let temps = window.slice(temperatures);
        Some(DarkCountBin {
            temperature: temps.iter().sum::<f64>() / temps.len() as f64,
            dark_rate_hz: window.rate(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn sample() -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let times: Vec<f64> = (0..40).map(|i| i as f64 * 0.5).collect();
        let amplitudes: Vec<f64> = (0..40).map(|i| ((i * 37) % 150) as f64).collect();
        let temperatures: Vec<f64> = (0..40).map(|i| 20.0 + i as f64 * 0.1).collect();
        (times, amplitudes, temperatures)
    }

    #[test]
    fn test_only_quiet_bins_emitted() {
        let times = [0.0, 1.0, 2.0, 3.0];
        let amplitudes = [10.0, 20.0, 5.0, 30.0];
        let temperatures = [20.0, 22.0, 24.0, 26.0];
        let bins = classify_dark_counts(&times, &amplitudes, &temperatures, 1.0, 25.0).unwrap();
        // peaks are 20, 20, 30
        assert_eq!(bins.len(), 2);
        assert_approx_eq!(bins[0].temperature, 21.0);
        assert_approx_eq!(bins[1].temperature, 23.0);
        assert_approx_eq!(bins[0].dark_rate_hz, 1.0);
    }

    #[test]
    fn test_threshold_is_strict() {
        let times = [0.0, 1.0];
        let amplitudes = [10.0, 20.0];
        let temperatures = [20.0, 20.0];
        let at = classify_dark_counts(&times, &amplitudes, &temperatures, 1.0, 20.0).unwrap();
        assert!(at.is_empty());
        let above = classify_dark_counts(&times, &amplitudes, &temperatures, 1.0, 20.1).unwrap();
        assert_eq!(above.len(), 1);
    }

    #[test]
    fn test_threshold_monotonic() {
        let (times, amplitudes, temperatures) = sample();
        let mut last_count = 0;
        for threshold in [0.0, 10.0, 50.0, 90.0, 120.0, 149.0, 150.0, 1000.0] {
            let bins =
                classify_dark_counts(&times, &amplitudes, &temperatures, 1.0, threshold).unwrap();
            assert!(bins.len() >= last_count);
            last_count = bins.len();
        }
    }

    #[test]
    fn test_threshold_does_not_change_rates() {
        let (times, amplitudes, temperatures) = sample();
        let all = classify_dark_counts(&times, &amplitudes, &temperatures, 1.0, 1e9).unwrap();
        for bin in classify_dark_counts(&times, &amplitudes, &temperatures, 1.0, 90.0).unwrap() {
            assert!(all.contains(&bin));
        }
    }

    #[test]
    fn test_invalid_threshold() {
        let (times, amplitudes, temperatures) = sample();
        assert!(matches!(
            classify_dark_counts(&times, &amplitudes, &temperatures, 1.0, f64::NAN),
            Err(BinError::InvalidThreshold(_))
        ));
        assert_eq!(
            classify_dark_counts(&times, &amplitudes, &temperatures, 0.0, 90.0),
            Err(BinError::InvalidBinSize(0.0))
        );
    }
}
