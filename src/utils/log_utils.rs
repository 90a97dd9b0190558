// src/utils/log_utils.rs
use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::Path;

pub const FAILURE_LOG: &str = "chart_failures.log";

/// Append a timestamped line to `{log_dir}/chart_failures.log`
pub fn log_to_file(log_dir: &Path, message: &str) -> Result<()> {
    if !log_dir.exists() {
        create_dir_all(log_dir)
            .context(format!("Failed to create log directory {}", log_dir.display()))?;
    }

    let log_file = log_dir.join(FAILURE_LOG);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .context(format!("Failed to open {}", log_file.display()))?;

    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
    writeln!(file, "[{}] {}", timestamp, message)?;

    Ok(())
}
