use serde::{Deserialize, Serialize};

use super::bin_scan::check_bin_size;
use super::constants::MAX_HISTOGRAM_BINS;
use super::error::BinError;

/// Event counts in fixed-width time bins
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventHistogram {
    pub bin_width: f64,
    /// Bin edges; there is one more edge than there are counts
    pub edges: Vec<f64>,
    pub counts: Vec<u64>,
}

/// Edges from `start` in steps of `width` until `stop` is covered. Always at least one bin.
pub fn make_bin_edges(start: f64, stop: f64, width: f64) -> Vec<f64> {
    let mut edges = vec![start];
    let mut n_bins: usize = 0;
    loop {
        n_bins += 1;
        let edge = start + n_bins as f64 * width;
        edges.push(edge);
        if edge >= stop {
            break;
        }
    }
    edges
}

/// Count events per fixed-width bin.
///
/// The first edge is the earliest time rounded down to a multiple of `width`. An event landing
/// exactly on the final edge is counted in the last bin. Non-finite times are ignored.
pub fn event_histogram(times: &[f64], width: f64) -> Result<EventHistogram, BinError> {
    check_bin_size(width)?;
    let finite: Vec<f64> = times.iter().copied().filter(|t| t.is_finite()).collect();
    let (Some(first), Some(last)) = (
        finite.iter().copied().reduce(f64::min),
        finite.iter().copied().reduce(f64::max),
    ) else {
        return Ok(EventHistogram {
            bin_width: width,
            ..Default::default()
        });
    };

    let start = (first / width).floor() * width;
    let requested = ((last - start) / width).ceil();
    if requested > MAX_HISTOGRAM_BINS as f64 {
        return Err(BinError::TooManyBins { width, requested });
    }
    let edges = make_bin_edges(start, last, width);
    let n_bins = edges.len() - 1;
    let mut counts = vec![0; n_bins];
    for time in finite {
        let idx = (((time - start) / width).floor() as usize).min(n_bins - 1);
        counts[idx] += 1;
    }

    Ok(EventHistogram {
        bin_width: width,
        edges,
        counts,
    })
}
