//! # muon_analyzer
//!
//! muon_analyzer reconstructs physical quantities from the event logs written by cosmic-ray
//! muon detectors (one to three units). It reads the timestamped event log of each detector
//! and derives the series behind the standard set of charts: event counts over time, rate
//! against peak SiPM voltage, dark count rate against temperature, SiPM voltage over time with
//! a linear trend, and the muon rate in short fixed windows.
//!
//! ## Building & Install
//!
//! To build and install the CLI use `cargo install --path ./muon_analyzer_cli` from the top
//! level muon_analyzer repository. See the `muon_analyzer_cli` documentation for usage.
//!
//! ## Event log format
//!
//! Event logs are plain, whitespace delimited text. An optional header block may precede the
//! data; the header ends at the last line, within the first 1000, containing the word
//! `Device`. Each data line has at least eight fields:
//!
//! ```text
//! <name> <name> event_number device_time_ms adc sipm_amplitude deadtime temperature ...
//! ```
//!
//! The first two fields are ignored. Lines which do not parse are skipped. The first data row
//! is normally a power-on transient and is dropped; this is controlled by the
//! `first_row_policy` configuration field.
//!
//! ## Configuration
//!
//! The YAML format of a configuration file is as follows:
//!
//! ```yml
//! detectors:
//! - path: /path/to/muon1.txt
//!   label: Muon1
//!   dark_count_threshold: 90.0
//! output_path: /path/to/output/
//! first_row_policy: DropFirst
//! bins:
//!   histogram_minutes: 1.0
//!   rate_vs_peak_minutes: 0.25
//!   dark_count_minutes: 1.0
//!   muon_rate_seconds: 10.0
//! lowess_fraction: 0.3
//! ```
//!
//! Between one and three detectors may be given. `dark_count_threshold` is the peak SiPM
//! amplitude (mV) below which a bin is treated as containing only dark counts.
//!
//! ## Binning
//!
//! Rates are computed by a single pass over the (sorted) device times. A bin closes at the
//! first event at least one bin width after the bin start; that event starts the next bin.
//! The final bin never reaches the full width and is not reported.
//!
//! ## Output
//!
//! Each detector produces a summary (first and last rows, column statistics) and one document
//! per chart. Failures, such as a file which could not be parsed or a trend which could not be
//! fit, are collected per detector and operation; one failure never stops the other charts.
pub mod bin_scan;
pub mod charts;
pub mod config;
pub mod constants;
pub mod dark_count;
pub mod error;
pub mod event_file;
pub mod histogram;
pub mod lowess;
pub mod presenter;
pub mod process;
pub mod session;
pub mod status;
pub mod summary;
pub mod trend;
