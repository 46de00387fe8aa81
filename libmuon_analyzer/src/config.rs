use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::constants::*;
use super::error::ConfigError;
use super::event_file::FirstRowPolicy;
use super::presenter::file_stem;

/// One detector's event log and the settings that belong to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    pub path: PathBuf,
    pub label: String,
    #[serde(default = "default_threshold")]
    pub dark_count_threshold: f64,
}

fn default_threshold() -> f64 {
    DEFAULT_DARK_COUNT_THRESHOLD
}

impl DetectorConfig {
    pub fn new(path: &Path, label: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            label: label.to_string(),
            dark_count_threshold: DEFAULT_DARK_COUNT_THRESHOLD,
        }
    }
}

/// Widths of the bins used by each chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinSettings {
    pub histogram_minutes: f64,
    pub rate_vs_peak_minutes: f64,
    pub dark_count_minutes: f64,
    pub muon_rate_seconds: f64,
}

impl Default for BinSettings {
    fn default() -> Self {
        Self {
            histogram_minutes: DEFAULT_HISTOGRAM_MINUTES,
            rate_vs_peak_minutes: DEFAULT_RATE_VS_PEAK_MINUTES,
            dark_count_minutes: DEFAULT_DARK_COUNT_MINUTES,
            muon_rate_seconds: DEFAULT_MUON_RATE_SECONDS,
        }
    }
}

/// The number of detectors being analyzed together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorMode {
    One,
    Two,
    Three,
}

/// Structure representing the application configuration. Contains the detector files and the
/// analysis settings.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub detectors: Vec<DetectorConfig>,
    pub output_path: PathBuf,
    #[serde(default)]
    pub first_row_policy: FirstRowPolicy,
    #[serde(default)]
    pub bins: BinSettings,
    #[serde(default = "default_lowess_fraction")]
    pub lowess_fraction: f64,
}

fn default_lowess_fraction() -> f64 {
    DEFAULT_LOWESS_FRACTION
}

impl Default for Config {
    /// Generate a new Config object with a single placeholder detector
    fn default() -> Self {
        Self {
            detectors: vec![DetectorConfig::new(Path::new("None"), "Detector 1")],
            output_path: PathBuf::from("None"),
            first_row_policy: FirstRowPolicy::default(),
            bins: BinSettings::default(),
            lowess_fraction: DEFAULT_LOWESS_FRACTION,
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Write the configuration to a YAML file
    pub fn write_config_file(&self, config_path: &Path) -> Result<(), ConfigError> {
        let yaml_str = serde_yaml::to_string(self)?;
        std::fs::write(config_path, yaml_str)?;
        Ok(())
    }

    /// Check that the settings can be used for analysis
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.detector_mode()?;

        let widths = [
            ("histogram_minutes", self.bins.histogram_minutes),
            ("rate_vs_peak_minutes", self.bins.rate_vs_peak_minutes),
            ("dark_count_minutes", self.bins.dark_count_minutes),
            ("muon_rate_seconds", self.bins.muon_rate_seconds),
        ];
        for (name, value) in widths {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::BadBinWidth { name, value });
            }
        }

        // Each detector's output files are named after its label
        for (idx, detector) in self.detectors.iter().enumerate() {
            let stem = file_stem(&detector.label);
            if let Some(other) = self.detectors[..idx]
                .iter()
                .find(|other| file_stem(&other.label) == stem)
            {
                return Err(ConfigError::DuplicateLabel(
                    other.label.clone(),
                    detector.label.clone(),
                ));
            }
        }

        for detector in self.detectors.iter() {
            if !detector.dark_count_threshold.is_finite() {
                return Err(ConfigError::BadThreshold(
                    detector.label.clone(),
                    detector.dark_count_threshold,
                ));
            }
        }

        if !(self.lowess_fraction > 0.0 && self.lowess_fraction <= 1.0) {
            return Err(ConfigError::BadLowessFraction(self.lowess_fraction));
        }
        Ok(())
    }

    pub fn detector_mode(&self) -> Result<DetectorMode, ConfigError> {
        match self.detectors.len() {
            1 => Ok(DetectorMode::One),
            2 => Ok(DetectorMode::Two),
            3 => Ok(DetectorMode::Three),
            n => Err(ConfigError::BadDetectorCount(n)),
        }
    }

    /// Get the path to the output directory, if it exists
    pub fn get_output_directory(&self) -> Result<&Path, ConfigError> {
        if self.output_path.exists() {
            Ok(&self.output_path)
        } else {
            Err(ConfigError::BadFilePath(self.output_path.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.detector_mode().unwrap(), DetectorMode::One);
        assert_eq!(config.first_row_policy, FirstRowPolicy::DropFirst);
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        let mut config = Config::default();
        config.detectors.push(DetectorConfig::new(Path::new("b.txt"), "B"));
        config.detectors[1].dark_count_threshold = 75.0;
        config.first_row_policy = FirstRowPolicy::Keep;
        config.write_config_file(&path).unwrap();
        let read = Config::read_config_file(&path).unwrap();
        assert_eq!(read, config);
        assert_eq!(read.detector_mode().unwrap(), DetectorMode::Two);
    }

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let yaml = "detectors:\n  - path: run.txt\n    label: Muon1\noutput_path: out\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.detectors[0].dark_count_threshold, DEFAULT_DARK_COUNT_THRESHOLD);
        assert_eq!(config.bins, BinSettings::default());
        assert_eq!(config.lowess_fraction, DEFAULT_LOWESS_FRACTION);
        assert_eq!(config.first_row_policy, FirstRowPolicy::DropFirst);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.detectors.clear();
        assert!(matches!(config.validate(), Err(ConfigError::BadDetectorCount(0))));

        let mut config = Config::default();
        config.detectors = vec![config.detectors[0].clone(); 4];
        assert!(matches!(config.validate(), Err(ConfigError::BadDetectorCount(4))));

        let mut config = Config::default();
        config.bins.muon_rate_seconds = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BadBinWidth {
                name: "muon_rate_seconds",
                ..
            })
        ));

        let mut config = Config::default();
        config.detectors[0].dark_count_threshold = f64::INFINITY;
        assert!(matches!(config.validate(), Err(ConfigError::BadThreshold(_, _))));

        let mut config = Config::default();
        config.lowess_fraction = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::BadLowessFraction(_))));
    }

    #[test]
    fn test_labels_must_name_distinct_outputs() {
        let mut config = Config::default();
        config.detectors = vec![
            DetectorConfig::new(Path::new("a.txt"), "Muon 1"),
            DetectorConfig::new(Path::new("b.txt"), "Muon 2"),
            DetectorConfig::new(Path::new("c.txt"), "Muon_1"),
        ];
        match config.validate() {
            Err(ConfigError::DuplicateLabel(first, second)) => {
                assert_eq!(first, "Muon 1");
                assert_eq!(second, "Muon_1");
            }
            other => panic!("expected a duplicate label error, got {other:?}"),
        }

        config.detectors[2].label = String::from("Muon 2");
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateLabel(_, _))));

        config.detectors[2].label = String::from("Muon 3");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Config::read_config_file(Path::new("/no/such/config.yml")),
            Err(ConfigError::BadFilePath(_))
        ));
    }
}
