use ndarray::{s, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::constants::*;
use super::error::EventFileError;

/// What to do with the first data row of an event log.
///
/// The first pulse recorded after a detector powers on is usually a transient rather than a
/// physical event, so by default it is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FirstRowPolicy {
    Keep,
    #[default]
    DropFirst,
}

/// A single detector event, as read from one row of an event log
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EventRecord {
    pub event_number: f64,
    pub device_time_ms: f64,
    pub adc: f64,
    pub sipm_amplitude: f64,
    pub deadtime: f64,
    pub temperature: f64,
}

/// All of the events recorded by one physical detector, stored as six parallel columns.
///
/// Device time is expected to be non-decreasing, but this is not checked.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectorSeries {
    pub event_number: Vec<f64>,
    pub device_time_ms: Vec<f64>,
    pub adc: Vec<f64>,
    pub sipm_amplitude: Vec<f64>,
    pub deadtime: Vec<f64>,
    pub temperature: Vec<f64>,
}

impl DetectorSeries {
    /// Split a (rows, 6) table into columns
    pub fn from_table(table: ArrayView2<f64>) -> Self {
        Self {
            event_number: table.column(EVENT_NUMBER_COLUMN).to_vec(),
            device_time_ms: table.column(DEVICE_TIME_COLUMN).to_vec(),
            adc: table.column(ADC_COLUMN).to_vec(),
            sipm_amplitude: table.column(SIPM_COLUMN).to_vec(),
            deadtime: table.column(DEADTIME_COLUMN).to_vec(),
            temperature: table.column(TEMPERATURE_COLUMN).to_vec(),
        }
    }

    /// Rebuild the (rows, 6) table
    pub fn table(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.len(), NUMBER_OF_DATA_COLUMNS), |(row, col)| {
            match col {
                EVENT_NUMBER_COLUMN => self.event_number[row],
                DEVICE_TIME_COLUMN => self.device_time_ms[row],
                ADC_COLUMN => self.adc[row],
                SIPM_COLUMN => self.sipm_amplitude[row],
                DEADTIME_COLUMN => self.deadtime[row],
                _ => self.temperature[row],
            }
        })
    }

    pub fn len(&self) -> usize {
        self.event_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_number.is_empty()
    }

    pub fn record(&self, index: usize) -> Option<EventRecord> {
        if index >= self.len() {
            return None;
        }
        Some(EventRecord {
            event_number: self.event_number[index],
            device_time_ms: self.device_time_ms[index],
            adc: self.adc[index],
            sipm_amplitude: self.sipm_amplitude[index],
            deadtime: self.deadtime[index],
            temperature: self.temperature[index],
        })
    }

    pub fn records(&self) -> impl Iterator<Item = EventRecord> + '_ {
        (0..self.len()).filter_map(|idx| self.record(idx))
    }

    /// Device time converted to minutes
    pub fn time_minutes(&self) -> Vec<f64> {
        self.device_time_ms
            .iter()
            .map(|t| t / MS_PER_MINUTE)
            .collect()
    }

    /// Device time converted to seconds
    pub fn time_seconds(&self) -> Vec<f64> {
        self.device_time_ms
            .iter()
            .map(|t| t / MS_PER_SECOND)
            .collect()
    }
}

/// Find the number of header lines to skip.
///
/// The header ends at the last line containing the header marker within the scan limit. No
/// marker means no header.
pub fn count_header_lines(lines: &[&str]) -> usize {
    lines
        .iter()
        .take(HEADER_SCAN_LIMIT)
        .enumerate()
        .filter(|(_, line)| line.contains(HEADER_MARKER))
        .map(|(idx, _)| idx + 1)
        .last()
        .unwrap_or(0)
}

/// Extract the six data fields of a row. Returns None if the row is malformed.
fn parse_row(line: &str) -> Option<[f64; NUMBER_OF_DATA_COLUMNS]> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < FIRST_DATA_COLUMN + NUMBER_OF_DATA_COLUMNS {
        return None;
    }
    let mut row = [0.0; NUMBER_OF_DATA_COLUMNS];
    for (value, field) in row
        .iter_mut()
        .zip(&fields[FIRST_DATA_COLUMN..FIRST_DATA_COLUMN + NUMBER_OF_DATA_COLUMNS])
    {
        *value = field.parse().ok()?;
    }
    Some(row)
}

/// Parse the raw contents of an event log into a (rows, 6) table.
///
/// Malformed rows are skipped. The table is always two dimensional, even with a single row.
pub fn parse_event_table(
    bytes: &[u8],
    policy: FirstRowPolicy,
) -> Result<Array2<f64>, EventFileError> {
    let text = std::str::from_utf8(bytes)?;
    let lines: Vec<&str> = text.lines().collect();
    let header_lines = count_header_lines(&lines);
    log::debug!("Skipping {header_lines} header lines");

    let mut flat: Vec<f64> = Vec::new();
    let mut n_rows: usize = 0;
    let mut n_skipped: usize = 0;
    for line in lines.iter().skip(header_lines) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_row(trimmed) {
            Some(row) => {
                flat.extend_from_slice(&row);
                n_rows += 1;
            }
            None => n_skipped += 1,
        }
    }
    if n_skipped > 0 {
        log::warn!("Skipped {n_skipped} malformed rows in event log");
    }

    let mut table = Array2::from_shape_vec((n_rows, NUMBER_OF_DATA_COLUMNS), flat)?;
    if policy == FirstRowPolicy::DropFirst && n_rows > 0 {
        table = table.slice(s![1.., ..]).to_owned();
    }
    if table.nrows() == 0 {
        return Err(EventFileError::NoDataRows);
    }
    Ok(table)
}

/// Parse the raw contents of an event log into a DetectorSeries
pub fn parse_event_log(
    bytes: &[u8],
    policy: FirstRowPolicy,
) -> Result<DetectorSeries, EventFileError> {
    let table = parse_event_table(bytes, policy)?;
    Ok(DetectorSeries::from_table(table.view()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_line(event: usize) -> String {
        format!(
            "Muon1 dev {} {} {} {} {} {}",
            event,
            event * 1000 + 250,
            300 + event,
            50.5 + event as f64,
            17,
            21.5
        )
    }

    #[test]
    fn test_parse_without_header() {
        let text: String = (1..=4).map(|e| data_line(e) + "\n").collect();
        let series = parse_event_log(text.as_bytes(), FirstRowPolicy::Keep).unwrap();
        assert_eq!(series.len(), 4);
        for (idx, record) in series.records().enumerate() {
            let event = idx + 1;
            assert_eq!(record.event_number, event as f64);
            assert_eq!(record.device_time_ms, (event * 1000 + 250) as f64);
            assert_eq!(record.adc, (300 + event) as f64);
            assert_eq!(record.sipm_amplitude, 50.5 + event as f64);
            assert_eq!(record.deadtime, 17.0);
            assert_eq!(record.temperature, 21.5);
        }
    }

    #[test]
    fn test_drop_first_row() {
        let text: String = (1..=4).map(|e| data_line(e) + "\n").collect();
        let series = parse_event_log(text.as_bytes(), FirstRowPolicy::DropFirst).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.event_number, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_skips_through_last_header_marker() {
        let text = format!(
            "Device ID: Muon1\n{}\n#comment\nDevice Time Start\n{}\n{}\n",
            data_line(99),
            data_line(1),
            data_line(2)
        );
        let series = parse_event_log(text.as_bytes(), FirstRowPolicy::Keep).unwrap();
        assert_eq!(series.event_number, vec![1.0, 2.0]);
    }

    #[test]
    fn test_header_marker_past_scan_limit_ignored() {
        let lines: Vec<String> = (0..HEADER_SCAN_LIMIT + 5)
            .map(|idx| {
                if idx == HEADER_SCAN_LIMIT + 2 {
                    String::from("Device")
                } else {
                    String::from("x")
                }
            })
            .collect();
        let refs: Vec<&str> = lines.iter().map(|l| l.as_str()).collect();
        assert_eq!(count_header_lines(&refs), 0);
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let text = format!(
            "{}\nMuon1 dev 2 short\nMuon1 dev 3 abc 1 2 3 4\n{}\n",
            data_line(1),
            data_line(4)
        );
        let series = parse_event_log(text.as_bytes(), FirstRowPolicy::Keep).unwrap();
        assert_eq!(series.event_number, vec![1.0, 4.0]);
    }

    #[test]
    fn test_single_row_stays_two_dimensional() {
        let text = data_line(7);
        let table = parse_event_table(text.as_bytes(), FirstRowPolicy::Keep).unwrap();
        assert_eq!(table.shape(), &[1, NUMBER_OF_DATA_COLUMNS]);
        let series = DetectorSeries::from_table(table.view());
        assert_eq!(series.len(), 1);
        assert_eq!(series.table(), table);
    }

    #[test]
    fn test_no_data_rows() {
        let text = "Device header only\nnot data\n";
        match parse_event_log(text.as_bytes(), FirstRowPolicy::Keep) {
            Err(EventFileError::NoDataRows) => (),
            other => panic!("Expected NoDataRows, got {other:?}"),
        }
        let single = data_line(1);
        match parse_event_log(single.as_bytes(), FirstRowPolicy::DropFirst) {
            Err(EventFileError::NoDataRows) => (),
            other => panic!("Expected NoDataRows, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_encoding() {
        let bytes = [0xff, 0xfe, 0x00];
        assert!(matches!(
            parse_event_log(&bytes, FirstRowPolicy::Keep),
            Err(EventFileError::BadEncoding(_))
        ));
    }

    #[test]
    fn test_time_conversion() {
        let text = "a b 1 60000 0 0 0 0\na b 2 120000 0 0 0 0\n";
        let series = parse_event_log(text.as_bytes(), FirstRowPolicy::Keep).unwrap();
        assert_eq!(series.time_minutes(), vec![1.0, 2.0]);
        assert_eq!(series.time_seconds(), vec![60.0, 120.0]);
    }
}
