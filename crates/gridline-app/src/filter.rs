// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Search and per-column filtering.
//!
//! A row passes when the search term matches any column and every set column
//! filter matches. Text matching is a case-insensitive substring test on the
//! display text; boolean and select filters compare resolved values exactly.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::{Accessor, Column, FilterType, Row, RowIndex, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Text(String),
    Bool(bool),
    Choice(Value),
}

impl FilterValue {
    /// Empty text is kept around as an entry but never constrains rows.
    pub fn is_set(&self) -> bool {
        match self {
            Self::Text(text) => !text.is_empty(),
            Self::Bool(_) => true,
            Self::Choice(value) => !value.is_null() && value.as_text() != Some(""),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Text(text) => Value::Text(text.clone()),
            Self::Bool(value) => Value::Bool(*value),
            Self::Choice(value) => value.clone(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Bool(value) => value.to_string(),
            Self::Choice(value) => value.display_text(),
        }
    }
}

/// Active column filters keyed by column key. A missing key means unset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ColumnFilters {
    entries: BTreeMap<String, FilterValue>,
}

impl ColumnFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: Option<FilterValue>) {
        let key = key.into();
        match value {
            Some(value) => {
                self.entries.insert(key, value);
            }
            None => {
                self.entries.remove(&key);
            }
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: FilterValue) -> Self {
        self.set(key, Some(value));
        self
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.entries.iter()
    }

    /// Entries that actually constrain rows.
    pub fn active(&self) -> impl Iterator<Item = (&String, &FilterValue)> {
        self.entries.iter().filter(|(_, value)| value.is_set())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

pub fn resolve_value<'a>(row: &'a Row, accessor: &Accessor) -> Cow<'a, Value> {
    match accessor {
        Accessor::Field(path) => match row.get_path(path) {
            Some(value) => Cow::Borrowed(value),
            None => Cow::Owned(Value::Null),
        },
        Accessor::Extract(extract) => Cow::Owned(extract(row)),
    }
}

fn contains_folded(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

pub fn row_matches_search(row: &Row, columns: &[Column], term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    columns.iter().any(|column| {
        contains_folded(
            &resolve_value(row, &column.accessor).display_text(),
            &needle,
        )
    })
}

pub fn column_filter_matches(row: &Row, column: &Column, filter: &FilterValue) -> bool {
    let value = resolve_value(row, &column.accessor);
    match column.filter_type {
        FilterType::Boolean | FilterType::Select => *value == filter.to_value(),
        FilterType::Text => contains_folded(&value.display_text(), &filter.label().to_lowercase()),
    }
}

pub fn row_matches_filters(row: &Row, columns: &[Column], filters: &ColumnFilters) -> bool {
    filters.active().all(|(key, filter)| {
        match columns.iter().find(|column| column.key == *key) {
            Some(column) => column_filter_matches(row, column, filter),
            None => true,
        }
    })
}

pub fn row_matches(row: &Row, columns: &[Column], search: &str, filters: &ColumnFilters) -> bool {
    row_matches_search(row, columns, search) && row_matches_filters(row, columns, filters)
}

/// Indices of matching rows, in source order.
pub fn filter_rows(
    rows: &[Row],
    columns: &[Column],
    search: &str,
    filters: &ColumnFilters,
) -> Vec<RowIndex> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row_matches(row, columns, search, filters))
        .map(|(index, _)| RowIndex::new(index))
        .collect()
}
