//! File logging.
//!
//! The terminal belongs to the UI, so log records go to `nightsky.log` in
//! the platform data directory instead of stderr.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Local;
use log::{LevelFilter, Log, Metadata, Record};

/// Name of the log file in the data directory.
pub const LOG_FILE: &str = "nightsky.log";

/// Appends formatted records to a file.
#[derive(Debug)]
pub struct FileLogger {
    level: LevelFilter,
    file: Mutex<File>,
}

impl FileLogger {
    /// Open (or create) `path` for appending.
    pub fn open(path: &Path, level: LevelFilter) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            level,
            file: Mutex::new(file),
        })
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(
                file,
                "{} {:<5} {}: {}",
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Install the file logger. Returns the log path, or `None` when logging is off.
pub fn init(level: LevelFilter) -> color_eyre::Result<Option<PathBuf>> {
    if level == LevelFilter::Off {
        return Ok(None);
    }
    let Some(dirs) = nightsky_config::project_dirs() else {
        return Ok(None);
    };
    let path = dirs.data_dir().join(LOG_FILE);
    let logger = FileLogger::open(&path, level)?;
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(level);
    Ok(Some(path))
}
