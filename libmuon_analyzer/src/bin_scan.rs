use serde::{Deserialize, Serialize};

use super::error::BinError;

/// A closed bin found by [`scan_bins`].
///
/// The bin covers `times[start_index..=end_index]`. The event at `end_index` is the one that
/// crossed the boundary; it contributes to in-bin aggregates (peak, mean) but is not counted as
/// an event of this bin, since it starts the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinWindow {
    pub start_index: usize,
    pub end_index: usize,
    pub start_time: f64,
    pub duration: f64,
}

impl BinWindow {
    pub fn event_count(&self) -> usize {
        self.end_index - self.start_index
    }

    /// Events per unit of the scanned time axis
    pub fn rate(&self) -> f64 {
        self.event_count() as f64 / self.duration
    }

    /// Slice the window out of a sequence parallel to the scanned times
    pub fn slice<'a>(&self, values: &'a [f64]) -> &'a [f64] {
        &values[self.start_index..=self.end_index]
    }
}

/// Aggregate of one duration bin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub start_time: f64,
    pub duration: f64,
    pub event_count: usize,
    pub peak_amplitude: f64,
    pub rate_hz: f64,
}

pub(crate) fn check_bin_size(bin_size: f64) -> Result<(), BinError> {
    if bin_size.is_finite() && bin_size > 0.0 {
        Ok(())
    } else {
        Err(BinError::InvalidBinSize(bin_size))
    }
}

pub(crate) fn check_lengths(times: &[f64], values: &[f64]) -> Result<(), BinError> {
    if times.len() != values.len() {
        Err(BinError::MismatchedLengths(times.len(), values.len()))
    } else {
        Ok(())
    }
}

/// Largest value in a window. NaN values are ignored.
pub fn peak(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Partition a time-ordered sequence into bins of at least `bin_size` duration.
///
/// A bin closes at the first event whose time is `bin_size` or more past the bin start. That
/// event then starts the next bin. For each closed bin `extract` is called; returning `None`
/// drops the bin from the output. The trailing bin, which never reaches `bin_size`, is not
/// passed to `extract`. Fewer than two times produce no bins.
pub fn scan_bins<T, F>(times: &[f64], bin_size: f64, mut extract: F) -> Result<Vec<T>, BinError>
where
    F: FnMut(&BinWindow) -> Option<T>,
{
    check_bin_size(bin_size)?;
    let mut output = Vec::new();
    if times.len() < 2 {
        return Ok(output);
    }

    let mut bin_start_index: usize = 0;
    let mut bin_start_time = times[0];
    for (idx, time) in times.iter().enumerate().skip(1) {
        let elapsed = time - bin_start_time;
        if elapsed >= bin_size {
            let window = BinWindow {
                start_index: bin_start_index,
                end_index: idx,
                start_time: bin_start_time,
                duration: elapsed,
            };
            if let Some(item) = extract(&window) {
                output.push(item);
            }
            bin_start_index = idx;
            bin_start_time = *time;
        }
    }
    Ok(output)
}

/// Bin `values` by elapsed `times`, recording the rate and peak value of every closed bin.
///
/// Rates are in events per unit of `times`; pass times in seconds to get Hz.
pub fn bin_by_duration(times: &[f64], values: &[f64], bin_size: f64) -> Result<Vec<Bin>, BinError> {
    check_lengths(times, values)?;
    scan_bins(times, bin_size, |window| {
        Some(Bin {
            start_time: window.start_time,
            duration: window.duration,
            event_count: window.event_count(),
            peak_amplitude: peak(window.slice(values)),
            rate_hz: window.rate(),
        })
    })
}
