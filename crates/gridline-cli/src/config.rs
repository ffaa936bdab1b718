// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use gridline_app::{Column, FilterOption, FilterType, GridOptions, TreeFields};
use log::LevelFilter;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "gridline";
const LOG_LEVEL_ENV: &str = "GRIDLINE_LOG";
const CONFIG_PATH_ENV: &str = "GRIDLINE_CONFIG_PATH";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub grid: GridSection,
    #[serde(default)]
    pub tree: TreeSection,
    #[serde(default)]
    pub export: ExportSection,
    #[serde(default)]
    pub log: LogSection,
    #[serde(default)]
    pub columns: Vec<ColumnSection>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            grid: GridSection::default(),
            tree: TreeSection::default(),
            export: ExportSection::default(),
            log: LogSection::default(),
            columns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GridSection {
    pub title: Option<String>,
    pub page_size: Option<usize>,
    pub searchable: Option<bool>,
    pub selectable: Option<bool>,
    pub exportable: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeSection {
    pub id_field: Option<String>,
    pub parent_id_field: Option<String>,
    pub default_expanded_levels: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportSection {
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogSection {
    pub level: Option<String>,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnSection {
    pub key: String,
    pub header: Option<String>,
    pub path: Option<String>,
    pub filter: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub sortable: bool,
    pub width: Option<u16>,
    #[serde(default)]
    pub tree_column: bool,
}

impl ColumnSection {
    fn to_column(&self) -> Column {
        let mut column = Column::new(
            self.key.clone(),
            self.header.clone().unwrap_or_else(|| self.key.clone()),
        );
        if let Some(path) = &self.path {
            column = column.path(path.clone());
        }
        if !self.options.is_empty() {
            column = column.options(
                self.options
                    .iter()
                    .map(|option| FilterOption::new(option.clone(), option.clone())),
            );
        } else if let Some(filter_type) = self.filter.as_deref().and_then(FilterType::parse) {
            column = column.filterable(filter_type);
        }
        if self.sortable {
            column = column.sortable();
        }
        if let Some(width) = self.width {
            column = column.width(width);
        }
        if self.tree_column {
            column = column.tree_column();
        }
        column
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set {CONFIG_PATH_ENV} to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` at the top",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(page_size) = self.grid.page_size
            && page_size == 0
        {
            bail!("grid.page_size in {} must be positive", path.display());
        }

        for (name, field) in [
            ("tree.id_field", &self.tree.id_field),
            ("tree.parent_id_field", &self.tree.parent_id_field),
        ] {
            if field.as_deref().is_some_and(|value| value.trim().is_empty()) {
                bail!("{name} in {} must not be empty", path.display());
            }
        }
        let fields = self.tree_fields();
        if fields.id_field == fields.parent_id_field {
            bail!(
                "tree.id_field and tree.parent_id_field in {} must differ, both are {:?}",
                path.display(),
                fields.id_field
            );
        }

        if let Some(level) = &self.log.level {
            parse_level(level)
                .with_context(|| format!("invalid log.level in {}", path.display()))?;
        }

        let mut keys = BTreeSet::new();
        for column in &self.columns {
            if column.key.trim().is_empty() {
                bail!("[[columns]] in {} has an empty key", path.display());
            }
            if !keys.insert(column.key.as_str()) {
                bail!(
                    "[[columns]] in {} repeats key {:?}",
                    path.display(),
                    column.key
                );
            }
            if let Some(filter) = &column.filter
                && FilterType::parse(filter).is_none()
            {
                bail!(
                    "column {:?} in {} has filter {:?}; use text, boolean or select",
                    column.key,
                    path.display(),
                    filter
                );
            }
        }

        Ok(())
    }

    /// Layers the `[grid]` section over a grid kind's defaults.
    pub fn grid_options(&self, base: GridOptions) -> GridOptions {
        let mut options = base;
        if let Some(title) = &self.grid.title {
            options = options.title(title.clone());
        }
        if let Some(page_size) = self.grid.page_size {
            options = options.page_size(page_size);
        }
        if let Some(searchable) = self.grid.searchable {
            options = options.searchable(searchable);
        }
        if let Some(selectable) = self.grid.selectable {
            options = options.selectable(selectable);
        }
        if let Some(exportable) = self.grid.exportable {
            options = options.exportable(exportable);
        }
        options
    }

    pub fn tree_fields(&self) -> TreeFields {
        let defaults = TreeFields::default();
        TreeFields {
            id_field: self.tree.id_field.clone().unwrap_or(defaults.id_field),
            parent_id_field: self
                .tree
                .parent_id_field
                .clone()
                .unwrap_or(defaults.parent_id_field),
            default_expanded_levels: self
                .tree
                .default_expanded_levels
                .unwrap_or(defaults.default_expanded_levels),
        }
    }

    /// Configured columns, or `None` when they should be inferred from data.
    pub fn columns(&self) -> Option<Vec<Column>> {
        if self.columns.is_empty() {
            return None;
        }
        Some(self.columns.iter().map(ColumnSection::to_column).collect())
    }

    pub fn export_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.export.dir {
            return Ok(PathBuf::from(dir));
        }
        if let Some(dir) = dirs::download_dir() {
            return Ok(dir);
        }
        env::current_dir().context("resolve current directory for exports")
    }

    /// `GRIDLINE_LOG` wins over `[log].level`; the default is `warn`.
    pub fn log_level(&self) -> Result<LevelFilter> {
        if let Ok(level) = env::var(LOG_LEVEL_ENV) {
            return parse_level(&level).with_context(|| format!("invalid {LOG_LEVEL_ENV}"));
        }
        match &self.log.level {
            Some(level) => parse_level(level),
            None => Ok(LevelFilter::Warn),
        }
    }

    pub fn log_file(&self) -> Result<PathBuf> {
        if let Some(file) = &self.log.file {
            return Ok(PathBuf::from(file));
        }
        let cache_root = dirs::cache_dir()
            .ok_or_else(|| anyhow!("cannot resolve cache directory; set [log].file"))?;
        let app_dir = cache_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create log directory {}", app_dir.display()))?;
        Ok(app_dir.join("gridline.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# gridline config\n# Place this file at: {}\n\nversion = 1\n\n[grid]\n# title = \"Data Grid\"\npage_size = 10\nsearchable = true\nselectable = true\nexportable = true\n\n[tree]\nid_field = \"id\"\nparent_id_field = \"parentId\"\ndefault_expanded_levels = 1\n\n[export]\n# Optional. Default is the platform downloads dir.\n# dir = \"/absolute/path/to/exports\"\n\n[log]\n# off, error, warn, info, debug or trace. GRIDLINE_LOG overrides.\nlevel = \"warn\"\n# file = \"/absolute/path/to/gridline.log\"\n\n# Optional. Without [[columns]] every top-level field becomes a column.\n# [[columns]]\n# key = \"name\"\n# header = \"Name\"\n# filter = \"text\"\n# sortable = true\n#\n# [[columns]]\n# key = \"team\"\n# header = \"Team\"\n# path = \"owner.team\"\n# options = [\"core\", \"edge\"]\n",
            path.display(),
        )
    }
}

fn parse_level(raw: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(raw.trim()).map_err(|_| {
        anyhow!("unknown log level {raw:?}; use one of: off, error, warn, info, debug, trace")
    })
}

#[cfg(test)]
mod tests {
    use super::{Config, parse_level};
    use anyhow::Result;
    use gridline_app::{FilterType, GridOptions};
    use log::LevelFilter;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    fn write_config(content: &str) -> Result<(tempfile::TempDir, PathBuf)> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        std::fs::write(&path, content)?;
        Ok((temp, path))
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn missing_config_uses_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let config = Config::load(&temp.path().join("missing.toml"))?;
        assert_eq!(config.version, 1);
        assert_eq!(config.grid_options(GridOptions::flat()), GridOptions::flat());
        assert_eq!(config.tree_fields().parent_id_field, "parentId");
        assert!(config.columns().is_none());
        Ok(())
    }

    #[test]
    fn unversioned_config_is_rejected_with_actionable_message() -> Result<()> {
        let (_temp, path) = write_config("[grid]\npage_size = 20\n")?;
        let error = Config::load(&path).expect_err("unversioned config should fail");
        assert!(error.to_string().contains("version = 1"));
        Ok(())
    }

    #[test]
    fn unsupported_config_version_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 7\n")?;
        let error = Config::load(&path).expect_err("v7 config should fail");
        assert!(error.to_string().contains("unsupported config version 7"));
        Ok(())
    }

    #[test]
    fn malformed_config_returns_parse_error() -> Result<()> {
        let (_temp, path) = write_config("{{not toml")?;
        let error = Config::load(&path).expect_err("malformed config should fail");
        assert!(error.to_string().contains("parse TOML config"));
        Ok(())
    }

    #[test]
    fn v1_config_overrides_grid_and_tree_defaults() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[grid]\ntitle = \"Org Chart\"\npage_size = 20\nselectable = false\n[tree]\nid_field = \"key\"\nparent_id_field = \"parent\"\ndefault_expanded_levels = 2\n",
        )?;
        let config = Config::load(&path)?;
        let options = config.grid_options(GridOptions::tree());
        assert_eq!(options.title, "Org Chart");
        assert_eq!(options.page_size, 20);
        assert!(!options.selectable);
        assert!(options.searchable);

        let fields = config.tree_fields();
        assert_eq!(fields.id_field, "key");
        assert_eq!(fields.parent_id_field, "parent");
        assert_eq!(fields.default_expanded_levels, 2);
        Ok(())
    }

    #[test]
    fn zero_page_size_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[grid]\npage_size = 0\n")?;
        let error = Config::load(&path).expect_err("zero page size should fail");
        assert!(error.to_string().contains("must be positive"));
        Ok(())
    }

    #[test]
    fn identical_tree_fields_are_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[tree]\nparent_id_field = \"id\"\n")?;
        let error = Config::load(&path).expect_err("same field twice should fail");
        assert!(error.to_string().contains("must differ"));
        Ok(())
    }

    #[test]
    fn columns_table_builds_column_set() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[[columns]]\nkey = \"name\"\nheader = \"Name\"\nfilter = \"text\"\nsortable = true\n[[columns]]\nkey = \"team\"\npath = \"owner.team\"\noptions = [\"core\", \"edge\"]\n",
        )?;
        let config = Config::load(&path)?;
        let columns = config.columns().expect("configured columns");
        assert_eq!(columns.len(), 2);
        assert!(columns[0].sortable);
        assert_eq!(columns[0].filter_type, FilterType::Text);
        assert_eq!(columns[1].header, "team");
        assert_eq!(columns[1].filter_type, FilterType::Select);
        assert_eq!(columns[1].filter_options.len(), 2);
        Ok(())
    }

    #[test]
    fn bad_column_definitions_are_rejected() -> Result<()> {
        let (_temp, path) = write_config(
            "version = 1\n[[columns]]\nkey = \"a\"\n[[columns]]\nkey = \"a\"\n",
        )?;
        let error = Config::load(&path).expect_err("duplicate key should fail");
        assert!(error.to_string().contains("repeats key"));

        let (_temp, path) =
            write_config("version = 1\n[[columns]]\nkey = \"a\"\nfilter = \"fuzzy\"\n")?;
        let error = Config::load(&path).expect_err("unknown filter should fail");
        assert!(error.to_string().contains("text, boolean or select"));
        Ok(())
    }

    #[test]
    fn log_level_env_overrides_config() -> Result<()> {
        let _guard = env_lock();
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"info\"\n")?;
        let config = Config::load(&path)?;
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::remove_var("GRIDLINE_LOG");
        }
        assert_eq!(config.log_level()?, LevelFilter::Info);
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("GRIDLINE_LOG", "trace");
        }
        let level = config.log_level();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("GRIDLINE_LOG");
        }
        assert_eq!(level?, LevelFilter::Trace);
        Ok(())
    }

    #[test]
    fn invalid_log_level_is_rejected() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[log]\nlevel = \"loud\"\n")?;
        let error = Config::load(&path).expect_err("unknown level should fail");
        assert!(format!("{error:#}").contains("unknown log level"));
        assert_eq!(parse_level("DEBUG")?, LevelFilter::Debug);
        Ok(())
    }

    #[test]
    fn default_path_honors_env_override() -> Result<()> {
        let _guard = env_lock();
        let temp = tempfile::tempdir()?;
        let override_path = temp.path().join("custom-config.toml");
        // SAFETY: test-only process-local env mutation.
        unsafe {
            std::env::set_var("GRIDLINE_CONFIG_PATH", &override_path);
        }
        let resolved = Config::default_path();
        // SAFETY: test cleanup for process-local env mutation.
        unsafe {
            std::env::remove_var("GRIDLINE_CONFIG_PATH");
        }
        assert_eq!(resolved?, override_path);
        Ok(())
    }

    #[test]
    fn export_dir_prefers_configured_value() -> Result<()> {
        let (_temp, path) = write_config("version = 1\n[export]\ndir = \"/srv/exports\"\n")?;
        let config = Config::load(&path)?;
        assert_eq!(config.export_dir()?, PathBuf::from("/srv/exports"));
        Ok(())
    }

    #[test]
    fn example_config_round_trips() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        let example = Config::example_config(&path);
        assert!(example.contains("version = 1"));
        assert!(example.contains("[grid]"));
        assert!(example.contains("[tree]"));
        assert!(example.contains("[log]"));
        std::fs::write(&path, example)?;
        let config = Config::load(&path)?;
        assert_eq!(config.log.level.as_deref(), Some("warn"));
        Ok(())
    }
}
