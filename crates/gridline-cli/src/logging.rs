// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::OpenOptions;
use std::path::Path;

/// Sends log records to `path`. The terminal belongs to the grid, so nothing
/// is logged to stdout or stderr.
pub fn init(level: LevelFilter, path: &Path) -> Result<()> {
    if level == LevelFilter::Off {
        return Ok(());
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open log file {}", path.display()))?;
    let config = ConfigBuilder::new()
        .add_filter_allow_str("gridline")
        .build();
    WriteLogger::init(level, config, file).context("install logger")?;
    log::info!("logging at {level} to {}", path.display());
    Ok(())
}
