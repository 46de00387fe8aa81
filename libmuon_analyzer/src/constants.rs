// Event log layout
/// Token marking the detector header block of an event log
pub const HEADER_MARKER: &str = "Device";
/// Only this many leading lines are searched for the header marker
pub const HEADER_SCAN_LIMIT: usize = 1000;
/// The first two whitespace separated fields are the device name and are never parsed
pub const FIRST_DATA_COLUMN: usize = 2;
/// event number, device time (ms), adc, sipm amplitude, deadtime, temperature
pub const NUMBER_OF_DATA_COLUMNS: usize = 6;

// Column positions within a parsed table row
pub const EVENT_NUMBER_COLUMN: usize = 0;
pub const DEVICE_TIME_COLUMN: usize = 1;
pub const ADC_COLUMN: usize = 2;
pub const SIPM_COLUMN: usize = 3;
pub const DEADTIME_COLUMN: usize = 4;
pub const TEMPERATURE_COLUMN: usize = 5;

// Units
pub const MS_PER_SECOND: f64 = 1000.0;
pub const SECONDS_PER_MINUTE: f64 = 60.0;
pub const MS_PER_MINUTE: f64 = MS_PER_SECOND * SECONDS_PER_MINUTE;

// Chart defaults
pub const DEFAULT_HISTOGRAM_MINUTES: f64 = 1.0;
pub const DEFAULT_RATE_VS_PEAK_MINUTES: f64 = 0.25;
pub const DEFAULT_DARK_COUNT_MINUTES: f64 = 1.0;
pub const DEFAULT_MUON_RATE_SECONDS: f64 = 10.0;
/// Peak SiPM amplitude (mV) below which a bin is counted as dark
pub const DEFAULT_DARK_COUNT_THRESHOLD: f64 = 90.0;
pub const DEFAULT_LOWESS_FRACTION: f64 = 0.3;
pub const DEFAULT_LOWESS_ITERATIONS: usize = 3;
/// Upper limit on the number of bins in an event histogram
pub const MAX_HISTOGRAM_BINS: usize = 1_000_000;

/// Rows shown at either end of a file preview
pub const PREVIEW_ROWS: usize = 5;
pub const MAX_DETECTORS: usize = 3;
