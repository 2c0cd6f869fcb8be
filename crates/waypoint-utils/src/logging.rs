/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Waypoint Logging Module
//!
//! A `log` facade backend shared by the Waypoint crates.
//!
//! ## Usage
//!
//! 1. Initialize the logger once, early in `main`:
//!    ```
//!    waypoint_utils::logging::init("info").expect("Failed to initialize logger");
//!    ```
//!
//! 2. Use the log macros from the prelude:
//!    ```
//!    use waypoint_utils::logging::prelude::*;
//!    info!("resolved broker endpoint");
//!    ```
//!
//! 3. Adjust the level at runtime if needed:
//!    ```
//!    waypoint_utils::logging::update_log_level("debug").expect("Failed to update log level");
//!    ```
//!
//! ## Log Levels
//!
//! "off", "error", "warn", "info" (default), "debug", "trace". Unknown strings fall back to "info".
//!
//! ## Output
//!
//! Records go to stderr, either as `<timestamp> - <LEVEL>: <message>` lines or, with the
//! "json" format, as one JSON object per line.

use log::{LevelFilter, Metadata, Record, SetLoggerError};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub use log::{debug, error, info, trace, warn};

static LOGGER: WaypointLogger = WaypointLogger;
static CURRENT_LEVEL: AtomicUsize = AtomicUsize::new(LevelFilter::Info as usize);
static JSON_FORMAT: AtomicBool = AtomicBool::new(false);
static INIT: OnceCell<()> = OnceCell::new();

/// Stderr logger behind the `log` facade
pub struct WaypointLogger;

impl log::Log for WaypointLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= level_filter_from_usize(CURRENT_LEVEL.load(Ordering::Relaxed))
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if JSON_FORMAT.load(Ordering::Relaxed) {
            let log_entry = serde_json::json!({
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "level": record.level().to_string().to_lowercase(),
                "target": record.target(),
                "message": format!("{}", record.args()),
                "module": record.module_path(),
                "file": record.file(),
                "line": record.line()
            });
            eprintln!("{}", log_entry);
        } else {
            eprintln!(
                "{} - {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

/// Initializes the logging system with the specified log level and the text format.
///
/// Calling it again only changes the level; the logger itself is installed once.
///
/// # Arguments
/// * `level` - String representation of the log level ("debug", "info", "warn", "error")
pub fn init(level: &str) -> Result<(), SetLoggerError> {
    init_with_format(level, "text")
}

/// Initializes the logging system with the specified log level and format.
///
/// # Arguments
/// * `level` - String representation of the log level ("debug", "info", "warn", "error")
/// * `format` - Log output format ("text" for human-readable, "json" for structured JSON)
///
/// # Returns
/// * `Result<(), SetLoggerError>` - Fails if another logger was installed first
pub fn init_with_format(level: &str, format: &str) -> Result<(), SetLoggerError> {
    let level_filter = str_to_level_filter(level);
    let use_json = format.eq_ignore_ascii_case("json");

    INIT.get_or_try_init(|| log::set_logger(&LOGGER))?;

    JSON_FORMAT.store(use_json, Ordering::Relaxed);
    CURRENT_LEVEL.store(level_filter as usize, Ordering::Relaxed);
    log::set_max_level(level_filter);
    Ok(())
}

/// Updates the current log level.
///
/// # Arguments
///
/// * `level` - A string slice that holds the new desired log level.
pub fn update_log_level(level: &str) -> Result<(), String> {
    let new_level = str_to_level_filter(level);
    CURRENT_LEVEL.store(new_level as usize, Ordering::Relaxed);
    log::set_max_level(new_level);
    Ok(())
}

fn str_to_level_filter(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn level_filter_from_usize(v: usize) -> LevelFilter {
    match v {
        0 => LevelFilter::Off,
        1 => LevelFilter::Error,
        2 => LevelFilter::Warn,
        3 => LevelFilter::Info,
        4 => LevelFilter::Debug,
        5 => LevelFilter::Trace,
        _ => LevelFilter::Off,
    }
}

pub mod prelude {
    pub use log::{debug, error, info, trace, warn};
}
