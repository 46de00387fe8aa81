//! # muon_analyzer_cli
//!
//! Part of the muon_analyzer crate family.
//!
//! Command line front end which derives chart series from muon detector event logs.
//!
//! ## Use
//!
//! Make a template configuration with
//!
//! ```bash
//! muon_analyzer_cli -p config.yml new
//! ```
//!
//! then edit it and run the analysis with
//!
//! ```bash
//! muon_analyzer_cli -p config.yml
//! ```
//!
//! Derived series are written as YAML documents to the configured output directory. A log
//! is written to `muon_analyzer.log` in the working directory.
use clap::{Arg, Command};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use std::fs::File;
use std::path::{Path, PathBuf};

use libmuon_analyzer::config::Config;
use libmuon_analyzer::presenter::YamlPresenter;
use libmuon_analyzer::process::process;
use libmuon_analyzer::session::Session;

const LOG_FILE: &str = "muon_analyzer.log";

fn make_template_config(path: &Path) {
    match Config::default().write_config_file(path) {
        Ok(()) => log::info!("Done."),
        Err(e) => log::error!("Could not write template config: {e}"),
    }
}

fn main() {
    // Create a cli
    let matches = Command::new("muon_analyzer_cli")
        .arg_required_else_help(true)
        .subcommand(Command::new("new").about("Make a template configuration yaml file"))
        .arg(
            Arg::new("path")
                .short('p')
                .long("path")
                .required(true)
                .help("Path to the configuration file"),
        )
        .get_matches();

    // Initialize feedback
    let term_logger = simplelog::TermLogger::new(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    let mut loggers: Vec<Box<dyn simplelog::SharedLogger>> = vec![term_logger];
    match File::create(LOG_FILE) {
        Ok(file) => loggers.push(simplelog::WriteLogger::new(
            simplelog::LevelFilter::Debug,
            simplelog::Config::default(),
            file,
        )),
        Err(e) => eprintln!("Could not create log file {LOG_FILE}: {e}"),
    }
    let logger = simplelog::CombinedLogger::new(loggers);

    let pb_manager = MultiProgress::new();
    if let Err(e) = LogWrapper::new(pb_manager.clone(), logger).try_init() {
        eprintln!("Could not create logging/progress: {e}");
        return;
    }
    log::set_max_level(log::LevelFilter::Debug);

    // Parse the cli
    let config_path = match matches.get_one::<String>("path") {
        Some(p) => PathBuf::from(p),
        None => {
            log::error!("A configuration path is required");
            return;
        }
    };

    if let Some(("new", _)) = matches.subcommand() {
        log::info!(
            "Making a template config at {}...",
            config_path.to_string_lossy()
        );
        make_template_config(&config_path);
        return;
    }

    // Load our config
    log::info!("Loading config from {}...", config_path.to_string_lossy());
    let config = match Config::read_config_file(&config_path) {
        Ok(c) => c,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    log::info!("Config successfully loaded.");
    for detector in config.detectors.iter() {
        log::info!(
            "Detector {}: {} (dark count threshold {} mV)",
            detector.label,
            detector.path.to_string_lossy(),
            detector.dark_count_threshold
        );
    }
    log::info!("Output Path: {}", config.output_path.to_string_lossy());
    log::info!("First Row Policy: {:?}", config.first_row_policy);

    let output_path = match config.get_output_directory() {
        Ok(p) => p,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };
    let mut presenter = match YamlPresenter::new(output_path) {
        Ok(p) => p,
        Err(e) => {
            log::error!("{e}");
            return;
        }
    };

    // Setup the progress bar
    let pb = pb_manager.add(ProgressBar::new(100));
    let mut session = Session::new();
    let result = process(&config, &mut session, &mut presenter, |status| {
        pb.set_message(status.label.clone());
        pb.set_position((status.progress * 100.0) as u64);
    });
    pb.finish();

    match result {
        Ok(report) => {
            log::info!(
                "Loaded {} detector(s), rendered {} chart(s).",
                report.detectors_loaded,
                report.charts_rendered
            );
            if report.has_failures() {
                log::warn!(
                    "{} detector(s) and {} chart(s) failed. Check the log file {LOG_FILE} for more information.",
                    report.detectors_failed,
                    report.charts_failed
                );
            }
        }
        Err(e) => log::error!("Analysis failed with error: {e}"),
    }

    log::info!("Done.");
}
