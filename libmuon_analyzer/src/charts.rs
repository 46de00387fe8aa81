use serde::{Deserialize, Serialize};
use std::fmt::Display;

use super::bin_scan::{bin_by_duration, Bin};
use super::config::{BinSettings, Config, DetectorConfig};
use super::constants::{DEFAULT_LOWESS_ITERATIONS, SECONDS_PER_MINUTE};
use super::dark_count::{classify_dark_counts, DarkCountBin};
use super::error::ChartError;
use super::event_file::DetectorSeries;
use super::histogram::{event_histogram, EventHistogram};
use super::lowess::lowess;
use super::trend::{fit_linear, TrendLine};

/// An (x, y) pair handed to the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub x: f64,
    pub y: f64,
}

impl From<(f64, f64)> for SeriesPoint {
    fn from(value: (f64, f64)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

/// The charts drawn for every detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    EventHistogram,
    RateVsPeakVoltage,
    DarkCountVsTemperature,
    VoltageTrend,
    MuonRate,
}

impl ChartKind {
    pub const ALL: [ChartKind; 5] = [
        ChartKind::EventHistogram,
        ChartKind::RateVsPeakVoltage,
        ChartKind::DarkCountVsTemperature,
        ChartKind::VoltageTrend,
        ChartKind::MuonRate,
    ];

    /// Short name, usable in file names
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::EventHistogram => "event_histogram",
            ChartKind::RateVsPeakVoltage => "rate_vs_peak_voltage",
            ChartKind::DarkCountVsTemperature => "dark_count_vs_temperature",
            ChartKind::VoltageTrend => "voltage_trend",
            ChartKind::MuonRate => "muon_rate",
        }
    }
}

impl Display for ChartKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Derived series for one chart of one detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chart")]
pub enum Chart {
    /// Events per fixed-width bin of device time (minutes)
    EventHistogram { histogram: EventHistogram },
    /// Rate (Hz) against the peak SiPM voltage of each bin
    RateVsPeakVoltage {
        bin_seconds: f64,
        bins: Vec<Bin>,
        points: Vec<SeriesPoint>,
    },
    /// Dark count rate (Hz) against mean temperature, with a LOWESS trend ordered by
    /// temperature
    DarkCountVsTemperature {
        bin_seconds: f64,
        threshold: f64,
        bins: Vec<DarkCountBin>,
        smoothed: Vec<SeriesPoint>,
    },
    /// SiPM voltage against device time (minutes) with a linear trend
    VoltageTrend {
        points: Vec<SeriesPoint>,
        trend: TrendLine,
        predicted: Vec<SeriesPoint>,
    },
    /// Muon rate (Hz) per bin, keyed by bin start time (seconds)
    MuonRate {
        bin_seconds: f64,
        bins: Vec<Bin>,
        points: Vec<SeriesPoint>,
    },
}

impl Chart {
    pub fn kind(&self) -> ChartKind {
        match self {
            Chart::EventHistogram { .. } => ChartKind::EventHistogram,
            Chart::RateVsPeakVoltage { .. } => ChartKind::RateVsPeakVoltage,
            Chart::DarkCountVsTemperature { .. } => ChartKind::DarkCountVsTemperature,
            Chart::VoltageTrend { .. } => ChartKind::VoltageTrend,
            Chart::MuonRate { .. } => ChartKind::MuonRate,
        }
    }
}

/// Everything needed to derive the charts of one detector
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSettings {
    pub bins: BinSettings,
    pub dark_count_threshold: f64,
    pub lowess_fraction: f64,
    pub lowess_iterations: usize,
}

impl ChartSettings {
    pub fn new(config: &Config, detector: &DetectorConfig) -> Self {
        Self {
            bins: config.bins.clone(),
            dark_count_threshold: detector.dark_count_threshold,
            lowess_fraction: config.lowess_fraction,
            lowess_iterations: DEFAULT_LOWESS_ITERATIONS,
        }
    }
}

/// The result of deriving a single chart. A failed chart does not affect the others.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartOutcome {
    pub kind: ChartKind,
    pub result: Result<Chart, ChartError>,
}

pub fn event_histogram_chart(
    series: &DetectorSeries,
    settings: &ChartSettings,
) -> Result<Chart, ChartError> {
    let histogram = event_histogram(&series.time_minutes(), settings.bins.histogram_minutes)?;
    Ok(Chart::EventHistogram { histogram })
}

pub fn rate_vs_peak_chart(
    series: &DetectorSeries,
    settings: &ChartSettings,
) -> Result<Chart, ChartError> {
    let bin_seconds = settings.bins.rate_vs_peak_minutes * SECONDS_PER_MINUTE;
    let bins = bin_by_duration(&series.time_seconds(), &series.sipm_amplitude, bin_seconds)?;
    let points = bins
        .iter()
        .map(|bin| SeriesPoint::from((bin.peak_amplitude, bin.rate_hz)))
        .collect();
    Ok(Chart::RateVsPeakVoltage {
        bin_seconds,
        bins,
        points,
    })
}

pub fn dark_count_chart(
    series: &DetectorSeries,
    settings: &ChartSettings,
) -> Result<Chart, ChartError> {
    let bin_seconds = settings.bins.dark_count_minutes * SECONDS_PER_MINUTE;
    let bins = classify_dark_counts(
        &series.time_seconds(),
        &series.sipm_amplitude,
        &series.temperature,
        bin_seconds,
        settings.dark_count_threshold,
    )?;

    let smoothed = if bins.len() < 2 {
        Vec::new()
    } else {
        let temperatures: Vec<f64> = bins.iter().map(|b| b.temperature).collect();
        let rates: Vec<f64> = bins.iter().map(|b| b.dark_rate_hz).collect();
        lowess(
            &temperatures,
            &rates,
            settings.lowess_fraction,
            settings.lowess_iterations,
        )?
        .into_iter()
        .map(SeriesPoint::from)
        .collect()
    };

    Ok(Chart::DarkCountVsTemperature {
        bin_seconds,
        threshold: settings.dark_count_threshold,
        bins,
        smoothed,
    })
}

pub fn voltage_trend_chart(series: &DetectorSeries) -> Result<Chart, ChartError> {
    let times = series.time_minutes();
    let trend = fit_linear(&times, &series.sipm_amplitude)?;
    let points = times
        .iter()
        .zip(&series.sipm_amplitude)
        .map(|(t, v)| SeriesPoint::from((*t, *v)))
        .collect();
    let predicted = times
        .iter()
        .zip(trend.predict_all(&times))
        .map(|(t, v)| SeriesPoint::from((*t, v)))
        .collect();
    Ok(Chart::VoltageTrend {
        points,
        trend,
        predicted,
    })
}

pub fn muon_rate_chart(
    series: &DetectorSeries,
    settings: &ChartSettings,
) -> Result<Chart, ChartError> {
    let bin_seconds = settings.bins.muon_rate_seconds;
    let bins = bin_by_duration(&series.time_seconds(), &series.sipm_amplitude, bin_seconds)?;
    let points = bins
        .iter()
        .map(|bin| SeriesPoint::from((bin.start_time, bin.rate_hz)))
        .collect();
    Ok(Chart::MuonRate {
        bin_seconds,
        bins,
        points,
    })
}

/// Derive every chart for a detector. Each chart succeeds or fails on its own.
pub fn build_charts(series: &DetectorSeries, settings: &ChartSettings) -> Vec<ChartOutcome> {
    ChartKind::ALL
        .iter()
        .map(|kind| {
            let result = match kind {
                ChartKind::EventHistogram => event_histogram_chart(series, settings),
                ChartKind::RateVsPeakVoltage => rate_vs_peak_chart(series, settings),
                ChartKind::DarkCountVsTemperature => dark_count_chart(series, settings),
                ChartKind::VoltageTrend => voltage_trend_chart(series),
                ChartKind::MuonRate => muon_rate_chart(series, settings),
            };
            ChartOutcome {
                kind: *kind,
                result,
            }
        })
        .collect()
}
