use serde::{Deserialize, Serialize};

use super::constants::{MS_PER_MINUTE, PREVIEW_ROWS};
use super::event_file::{DetectorSeries, EventRecord};

/// Simple descriptive statistics of one column
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ColumnStats {
    pub mean: f64,
    pub median: f64,
    /// Most frequent value; the smallest one on ties
    pub mode: f64,
    pub min: f64,
    pub max: f64,
}

/// Longest run of equal values in a sorted slice
fn sorted_mode(sorted: &[f64]) -> f64 {
    let mut best = (sorted[0], 0);
    let mut run_start = 0;
    for idx in 1..=sorted.len() {
        if idx == sorted.len() || sorted[idx] != sorted[run_start] {
            if idx - run_start > best.1 {
                best = (sorted[run_start], idx - run_start);
            }
            run_start = idx;
        }
    }
    best.0
}

impl ColumnStats {
    /// Returns None for an empty column
    pub fn new(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            0.5 * (sorted[mid - 1] + sorted[mid])
        } else {
            sorted[mid]
        };
        Some(Self {
            mean: values.iter().sum::<f64>() / values.len() as f64,
            median,
            mode: sorted_mode(&sorted),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Overview of an uploaded event log: a preview of either end and statistics of the measured
/// quantities.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub n_events: usize,
    pub run_minutes: f64,
    pub first_rows: Vec<EventRecord>,
    pub last_rows: Vec<EventRecord>,
    pub adc: ColumnStats,
    pub sipm_amplitude: ColumnStats,
    pub deadtime: ColumnStats,
    pub temperature: ColumnStats,
}

impl SeriesSummary {
    pub fn new(series: &DetectorSeries) -> Self {
        let n_events = series.len();
        let tail_start = n_events.saturating_sub(PREVIEW_ROWS);
        let run_minutes = match (series.device_time_ms.first(), series.device_time_ms.last()) {
            (Some(first), Some(last)) => (last - first) / MS_PER_MINUTE,
            _ => 0.0,
        };
        Self {
            n_events,
            run_minutes,
            first_rows: series.records().take(PREVIEW_ROWS).collect(),
            last_rows: series.records().skip(tail_start).collect(),
            adc: ColumnStats::new(&series.adc).unwrap_or_default(),
            sipm_amplitude: ColumnStats::new(&series.sipm_amplitude).unwrap_or_default(),
            deadtime: ColumnStats::new(&series.deadtime).unwrap_or_default(),
            temperature: ColumnStats::new(&series.temperature).unwrap_or_default(),
        }
    }
}
