//! File logging for the terminal UI.
//!
//! Log output goes to a file in the cache directory so it never draws over
//! the interface.

use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::cache::CacheManager;

pub const LOG_FILE: &str = "hockey-stats.log";

/// Filter used when `RUST_LOG` is not set.
pub fn default_filter(level: &str) -> String {
    format!("hockey_stats={}", level.to_lowercase())
}

/// Install the global subscriber writing to the cache log file.
///
/// `RUST_LOG` overrides `level`. Returns the log file path.
pub fn init(cache: &CacheManager, level: &str) -> Result<PathBuf> {
    cache.ensure_cache_dir()?;
    let path = cache.cache_file(LOG_FILE);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| eyre!("Could not open log file {}: {}", path.display(), e))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(level)))
        .map_err(|e| eyre!("Invalid log filter: {}", e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| eyre!("Could not install logger: {}", e))?;

    Ok(path)
}
