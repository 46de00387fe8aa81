use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::charts::Chart;
use super::error::PresenterError;
use super::summary::SeriesSummary;

const FAILURES_NAME: &str = "failures.yml";

/// A user-facing report of an operation which failed for one detector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub detector: String,
    pub operation: String,
    pub message: String,
}

impl Failure {
    pub fn new(detector: &str, operation: &str, error: &dyn std::error::Error) -> Self {
        Self {
            detector: detector.to_string(),
            operation: operation.to_string(),
            message: error.to_string(),
        }
    }
}

/// The sink for derived series. Rendering them is up to the implementor.
pub trait SeriesPresenter {
    fn present_summary(
        &mut self,
        detector: &str,
        summary: &SeriesSummary,
    ) -> Result<(), PresenterError>;

    fn present_chart(&mut self, detector: &str, chart: &Chart) -> Result<(), PresenterError>;

    fn present_failure(&mut self, failure: &Failure) -> Result<(), PresenterError>;

    /// Called once all detectors are done
    fn finish(&mut self) -> Result<(), PresenterError> {
        Ok(())
    }
}

/// Make a detector label safe to use in a file name
pub fn file_stem(label: &str) -> String {
    label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Writes every derived series as a YAML document in an output directory.
///
/// Layout:
/// ```text
/// <output>/<detector>_summary.yml
/// <output>/<detector>_<chart name>.yml
/// <output>/failures.yml
/// ```
#[derive(Debug)]
pub struct YamlPresenter {
    output_path: PathBuf,
    failures: Vec<Failure>,
}

impl YamlPresenter {
    pub fn new(output_path: &Path) -> Result<Self, PresenterError> {
        if !output_path.is_dir() {
            return Err(PresenterError::BadOutputPath(output_path.to_path_buf()));
        }
        Ok(Self {
            output_path: output_path.to_path_buf(),
            failures: Vec::new(),
        })
    }

    fn write_yaml<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, PresenterError> {
        let path = self.output_path.join(name);
        let yaml_str = serde_yaml::to_string(value)?;
        let mut file = File::create(&path)?;
        file.write_all(yaml_str.as_bytes())?;
        Ok(path)
    }
}

impl SeriesPresenter for YamlPresenter {
    fn present_summary(
        &mut self,
        detector: &str,
        summary: &SeriesSummary,
    ) -> Result<(), PresenterError> {
        let path = self.write_yaml(&format!("{}_summary.yml", file_stem(detector)), summary)?;
        log::info!("Wrote summary of {detector} to {}", path.display());
        Ok(())
    }

    fn present_chart(&mut self, detector: &str, chart: &Chart) -> Result<(), PresenterError> {
        let name = format!("{}_{}.yml", file_stem(detector), chart.kind().name());
        let path = self.write_yaml(&name, chart)?;
        log::info!("Wrote {} of {detector} to {}", chart.kind(), path.display());
        Ok(())
    }

    fn present_failure(&mut self, failure: &Failure) -> Result<(), PresenterError> {
        self.failures.push(failure.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), PresenterError> {
        self.write_yaml(FAILURES_NAME, &self.failures)?;
        if !self.failures.is_empty() {
            log::warn!(
                "{} operations failed; see {}",
                self.failures.len(),
                self.output_path.join(FAILURES_NAME).display()
            );
        }
        Ok(())
    }
}
