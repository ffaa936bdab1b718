// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use gridline_app::{CsvExport, Row};
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

/// Saves exports as files under one directory.
pub struct FileRuntime {
    export_dir: PathBuf,
}

impl FileRuntime {
    pub fn new(export_dir: PathBuf) -> Self {
        Self { export_dir }
    }
}

impl gridline_tui::GridRuntime for FileRuntime {
    fn save_export(&mut self, export: &CsvExport) -> Result<PathBuf> {
        fs::create_dir_all(&self.export_dir).with_context(|| {
            format!("create export directory {}", self.export_dir.display())
        })?;
        let path = self.export_dir.join(&export.file_name);
        write_export(&path, export)?;
        Ok(path)
    }

    fn selection_changed(&mut self, rows: &[&Row]) -> Result<()> {
        debug!("selection now holds {} rows", rows.len());
        Ok(())
    }
}

pub fn write_export(path: &Path, export: &CsvExport) -> Result<()> {
    fs::write(path, &export.body).with_context(|| format!("write export {}", path.display()))?;
    info!(
        "exported {} rows ({}) to {}",
        export.rows,
        export.mime,
        path.display()
    );
    Ok(())
}
