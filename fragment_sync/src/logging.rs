//! Run log: `HH:MM:SS - [LEVEL] - message` to stdout and `<folder>/latest.log`.

use chrono::Local;
use fern::Dispatch;
use log::{info, LevelFilter};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

use crate::config::LogConfig;
use crate::error::{Result, SyncError};

const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const LOG_FILE_NAME: &str = "latest.log";

/// Install the global logger. The log file is truncated on every run.
///
/// Returns the path of the log file, if one was opened.
pub fn init_logging(config: &LogConfig) -> Result<Option<PathBuf>> {
    let level = LevelFilter::from(config.level);
    let mut logger = base_dispatch(level);

    if config.console {
        logger = logger.chain(std::io::stdout());
    }

    let log_file_path = match &config.folder {
        Some(folder) => {
            fs::create_dir_all(folder).map_err(|e| SyncError::io(folder, e))?;
            let path = folder.join(LOG_FILE_NAME);
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&path)
                .map_err(|e| SyncError::io(&path, e))?;
            logger = logger.chain(file);
            Some(path)
        }
        None => None,
    };

    logger.apply()?;

    info!("{} v{}", CRATE_NAME, CRATE_VERSION);
    if let Some(path) = &log_file_path {
        info!("logging to {}", path.display());
    }
    Ok(log_file_path)
}

fn base_dispatch(level: LevelFilter) -> Dispatch {
    Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} - [{}] - {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                message
            ))
        })
        .level(level)
}
