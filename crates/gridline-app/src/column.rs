// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::{Row, Value};

pub type Extractor = Arc<dyn Fn(&Row) -> Value + Send + Sync>;
pub type CellRenderer = Arc<dyn Fn(&Value, &Row) -> String + Send + Sync>;

/// Where a column reads its value from.
#[derive(Clone)]
pub enum Accessor {
    /// Field name, or a dotted path into nested records.
    Field(String),
    Extract(Extractor),
}

impl Accessor {
    pub fn field(path: impl Into<String>) -> Self {
        Self::Field(path.into())
    }

    pub fn extract<F>(extract: F) -> Self
    where
        F: Fn(&Row) -> Value + Send + Sync + 'static,
    {
        Self::Extract(Arc::new(extract))
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(path) => f.debug_tuple("Field").field(path).finish(),
            Self::Extract(_) => f.write_str("Extract(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    Text,
    Boolean,
    Select,
}

impl FilterType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Select => "select",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "boolean" => Some(Self::Boolean),
            "select" => Some(Self::Select),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption {
    pub label: String,
    pub value: Value,
}

impl FilterOption {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone)]
pub struct Column {
    pub key: String,
    pub header: String,
    pub accessor: Accessor,
    pub filterable: bool,
    pub filter_type: FilterType,
    pub filter_options: Vec<FilterOption>,
    pub sortable: bool,
    pub width: Option<u16>,
    pub tree_column: bool,
    pub render: Option<CellRenderer>,
}

impl Column {
    /// A text column reading the field named by `key`.
    pub fn new(key: impl Into<String>, header: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            accessor: Accessor::Field(key.clone()),
            key,
            header: header.into(),
            filterable: false,
            filter_type: FilterType::Text,
            filter_options: Vec::new(),
            sortable: false,
            width: None,
            tree_column: false,
            render: None,
        }
    }

    pub fn accessor(mut self, accessor: Accessor) -> Self {
        self.accessor = accessor;
        self
    }

    pub fn path(self, path: impl Into<String>) -> Self {
        self.accessor(Accessor::field(path))
    }

    pub fn extract<F>(self, extract: F) -> Self
    where
        F: Fn(&Row) -> Value + Send + Sync + 'static,
    {
        self.accessor(Accessor::extract(extract))
    }

    pub fn filterable(mut self, filter_type: FilterType) -> Self {
        self.filterable = true;
        self.filter_type = filter_type;
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = FilterOption>) -> Self {
        self.filterable = true;
        self.filter_type = FilterType::Select;
        self.filter_options = options.into_iter().collect();
        self
    }

    pub const fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub const fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub const fn tree_column(mut self) -> Self {
        self.tree_column = true;
        self
    }

    pub fn render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Value, &Row) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    /// Display text for one row, honouring a custom renderer.
    pub fn display(&self, row: &Row) -> String {
        let value = crate::filter::resolve_value(row, &self.accessor);
        match &self.render {
            Some(render) => render(&value, row),
            None => value.display_text(),
        }
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("accessor", &self.accessor)
            .field("filterable", &self.filterable)
            .field("filter_type", &self.filter_type)
            .field("filter_options", &self.filter_options)
            .field("sortable", &self.sortable)
            .field("width", &self.width)
            .field("tree_column", &self.tree_column)
            .field("render", &self.render.as_ref().map(|_| ".."))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnError {
    #[error("column set is empty")]
    Empty,
    #[error("duplicate column key {0:?}")]
    DuplicateKey(String),
}

pub fn validate_columns(columns: &[Column]) -> Result<(), ColumnError> {
    if columns.is_empty() {
        return Err(ColumnError::Empty);
    }
    let mut seen = BTreeSet::new();
    for column in columns {
        if !seen.insert(column.key.as_str()) {
            return Err(ColumnError::DuplicateKey(column.key.clone()));
        }
    }
    Ok(())
}
