use std::path::PathBuf;
use thiserror::Error;

use super::constants::{MAX_DETECTORS, MAX_HISTOGRAM_BINS};

#[derive(Debug, Error)]
pub enum EventFileError {
    #[error("Could not open event log because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Event log failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Event log is not valid UTF-8 text: {0}")]
    BadEncoding(#[from] std::str::Utf8Error),
    #[error("Event log contained no data rows")]
    NoDataRows,
    #[error("Event log table could not be shaped: {0}")]
    BadShape(#[from] ndarray::ShapeError),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BinError {
    #[error("Bin size must be a positive number of time units; got {0}")]
    InvalidBinSize(f64),
    #[error("Dark count threshold must be a finite voltage; got {0}")]
    InvalidThreshold(f64),
    #[error("Bin scan was given sequences of unequal length -- times: {0} values: {1}")]
    MismatchedLengths(usize, usize),
    #[error("Bin width {width} would need {requested} bins; at most {max} are allowed", max=MAX_HISTOGRAM_BINS)]
    TooManyBins { width: f64, requested: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("Fit has insufficient data: {0}")]
    InsufficientData(&'static str),
    #[error("Fit was given sequences of unequal length -- x: {0} y: {1}")]
    MismatchedLengths(usize, usize),
    #[error("LOWESS smoothing fraction must be in (0, 1]; got {0}")]
    InvalidFraction(f64),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("Chart failed due to binning error: {0}")]
    BinError(#[from] BinError),
    #[error("Chart failed due to fit error: {0}")]
    FitError(#[from] FitError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Config must name between 1 and {max} detectors; found {0}", max=MAX_DETECTORS)]
    BadDetectorCount(usize),
    #[error("Config bin width {name} must be positive and finite; got {value}")]
    BadBinWidth { name: &'static str, value: f64 },
    #[error("Config dark count threshold for detector {0} must be finite; got {1}")]
    BadThreshold(String, f64),
    #[error("Config LOWESS fraction must be in (0, 1]; got {0}")]
    BadLowessFraction(f64),
    #[error("Config detectors {0} and {1} would write to the same output files")]
    DuplicateLabel(String, String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session failed to load detector {label}: {source}")]
    LoadFailed {
        label: String,
        #[source]
        source: EventFileError,
    },
}

#[derive(Debug, Error)]
pub enum PresenterError {
    #[error("Presenter failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Presenter failed to convert to yaml: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Presenter could not write to output directory {0:?}")]
    BadOutputPath(PathBuf),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to Presenter error: {0}")]
    PresenterError(#[from] PresenterError),
}
