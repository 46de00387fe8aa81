use super::charts::{build_charts, ChartSettings};
use super::config::{Config, DetectorConfig};
use super::error::ProcessorError;
use super::presenter::{Failure, SeriesPresenter};
use super::session::Session;
use super::status::ProcessStatus;
use super::summary::SeriesSummary;

/// Tally of what a processing pass produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessReport {
    pub detectors_loaded: usize,
    pub detectors_failed: usize,
    pub charts_rendered: usize,
    pub charts_failed: usize,
}

impl ProcessReport {
    pub fn has_failures(&self) -> bool {
        self.detectors_failed > 0 || self.charts_failed > 0
    }
}

/// Load one detector and hand its summary and charts to the presenter.
///
/// A file which cannot be parsed, or a chart which cannot be derived, is reported to the
/// presenter and logged. Only presenter errors are returned.
pub fn process_detector(
    config: &Config,
    detector: &DetectorConfig,
    session: &mut Session,
    presenter: &mut dyn SeriesPresenter,
    report: &mut ProcessReport,
) -> Result<(), ProcessorError> {
    let series = match session.load_file(&detector.label, &detector.path, config.first_row_policy)
    {
        Ok(series) => series,
        Err(e) => {
            log::error!("{e}");
            presenter.present_failure(&Failure::new(&detector.label, "parse", &e))?;
            report.detectors_failed += 1;
            return Ok(());
        }
    };
    report.detectors_loaded += 1;

    presenter.present_summary(&detector.label, &SeriesSummary::new(&series))?;

    let settings = ChartSettings::new(config, detector);
    for outcome in build_charts(&series, &settings) {
        match outcome.result {
            Ok(chart) => {
                presenter.present_chart(&detector.label, &chart)?;
                report.charts_rendered += 1;
            }
            Err(e) => {
                log::warn!("Could not build {} for {}: {e}", outcome.kind, detector.label);
                presenter.present_failure(&Failure::new(
                    &detector.label,
                    outcome.kind.name(),
                    &e,
                ))?;
                report.charts_failed += 1;
            }
        }
    }
    Ok(())
}

/// The main loop of muon_analyzer.
///
/// Takes in a config and derives every chart for every detector, reporting progress after each
/// detector. Parsed files stay cached in the session, so calling this again with different
/// thresholds or bin widths does not re-parse.
pub fn process(
    config: &Config,
    session: &mut Session,
    presenter: &mut dyn SeriesPresenter,
    mut on_status: impl FnMut(ProcessStatus),
) -> Result<ProcessReport, ProcessorError> {
    config.validate()?;
    let mode = config.detector_mode()?;
    log::info!("Analyzing {:?} detector(s)", mode);

    let mut report = ProcessReport::default();
    let n_detectors = config.detectors.len();
    for (idx, detector) in config.detectors.iter().enumerate() {
        on_status(ProcessStatus::new(
            idx as f32 / n_detectors as f32,
            idx,
            &detector.label,
        ));
        log::info!(
            "Processing detector {} from {}...",
            detector.label,
            detector.path.display()
        );
        process_detector(config, detector, session, presenter, &mut report)?;
        log::info!("Finished processing detector {}.", detector.label);
    }
    on_status(ProcessStatus::new(
        1.0,
        n_detectors.saturating_sub(1),
        "done",
    ));

    presenter.finish()?;
    Ok(report)
}
