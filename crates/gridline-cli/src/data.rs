// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use gridline_app::{Column, FilterType, Row, Value};
use gridline_catalog::{Catalog, parse_catalog_lines};
use log::debug;
use std::fs;
use std::path::Path;

/// Reads a JSON array of objects into rows.
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("read data file {}", path.display()))?;
    let rows = parse_rows(&raw).with_context(|| format!("parse JSON rows {}", path.display()))?;
    debug!("loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn parse_rows(raw: &str) -> Result<Vec<Row>> {
    let value: serde_json::Value = serde_json::from_str(raw).context("invalid JSON")?;
    let serde_json::Value::Array(items) = value else {
        return Err(anyhow!("expected a JSON array of objects"));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            serde_json::Value::Object(fields) => Ok(row_from_object(fields)),
            other => Err(anyhow!(
                "item {index} is {}, expected an object",
                json_kind(&other)
            )),
        })
        .collect()
}

fn row_from_object(fields: serde_json::Map<String, serde_json::Value>) -> Row {
    let mut row = Row::new();
    for (key, value) in fields {
        row.insert(key, to_value(value));
    }
    row
}

fn to_value(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(value) => Value::Bool(value),
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(value) => Value::Int(value),
            None => number.as_f64().map_or(Value::Null, Value::Float),
        },
        serde_json::Value::String(text) => Value::Text(text),
        serde_json::Value::Array(items) => Value::List(items.into_iter().map(to_value).collect()),
        serde_json::Value::Object(fields) => Value::Record(row_from_object(fields)),
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// One sortable column per top-level field, skipping `exclude`. Rows keep
/// their fields sorted by name, so columns come out alphabetical within a row
/// and in first-seen order across rows. Fields holding only booleans get a
/// boolean filter; the rest filter as text.
pub fn infer_columns(rows: &[Row], exclude: &[&str]) -> Vec<Column> {
    let mut keys: Vec<&String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !exclude.contains(&key.as_str()) && !keys.contains(&key) {
                keys.push(key);
            }
        }
    }

    keys.into_iter()
        .map(|key| {
            let boolean = rows
                .iter()
                .filter_map(|row| row.get(key))
                .filter(|value| !value.is_null())
                .all(|value| matches!(value, Value::Bool(_)));
            let filter_type = if boolean && rows.iter().any(|row| row.get(key).is_some()) {
                FilterType::Boolean
            } else {
                FilterType::Text
            };
            Column::new(key.clone(), key.clone())
                .filterable(filter_type)
                .sortable()
        })
        .collect()
}

/// `.json` files hold the nested catalog; anything else is the line format.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read catalog file {}", path.display()))?;
    if path.extension().is_some_and(|extension| extension == "json") {
        return serde_json::from_str(&raw)
            .with_context(|| format!("parse JSON catalog {}", path.display()));
    }
    parse_catalog_lines(raw.lines()).with_context(|| format!("parse catalog {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::{infer_columns, load_catalog, parse_rows};
    use anyhow::Result;
    use gridline_app::{FilterType, Value};

    #[test]
    fn json_objects_become_rows() -> Result<()> {
        let rows = parse_rows(
            r#"[
                {"id": 1, "name": "Acme", "score": 1.5, "active": true, "tags": ["a", "b"]},
                {"id": 2, "parentId": 1, "owner": {"team": "core"}, "active": null}
            ]"#,
        )?;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("id"), Some(&Value::Int(1)));
        assert_eq!(rows[0].get("score"), Some(&Value::Float(1.5)));
        assert_eq!(rows[0].get("tags").map(Value::display_text), Some("a,b".to_owned()));
        assert_eq!(
            rows[1].get_path("owner.team"),
            Some(&Value::Text("core".to_owned()))
        );
        assert_eq!(rows[1].get("active"), Some(&Value::Null));
        Ok(())
    }

    #[test]
    fn non_array_and_non_object_items_are_rejected() {
        let error = parse_rows(r#"{"id": 1}"#).expect_err("object root should fail");
        assert!(error.to_string().contains("JSON array"));

        let error = parse_rows(r#"[{"id": 1}, 5]"#).expect_err("number item should fail");
        assert!(error.to_string().contains("item 1 is a number"));
    }

    #[test]
    fn inferred_columns_sort_within_a_row_and_append_later_keys() -> Result<()> {
        let rows = parse_rows(
            r#"[
                {"zone": "x", "id": 1, "name": "a", "active": true},
                {"id": 2, "active": false, "city": "y", "parentId": 1}
            ]"#,
        )?;
        let columns = infer_columns(&rows, &["id", "parentId"]);
        let keys = columns
            .iter()
            .map(|column| column.key.as_str())
            .collect::<Vec<_>>();
        assert_eq!(keys, vec!["active", "name", "zone", "city"]);
        assert_eq!(columns[0].filter_type, FilterType::Boolean);
        assert_eq!(columns[1].filter_type, FilterType::Text);
        assert!(columns.iter().all(|column| column.sortable));
        Ok(())
    }

    #[test]
    fn catalog_files_load_by_extension() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let lines = temp.path().join("catalog.txt");
        std::fs::write(&lines, "# repo, service, endpoint\nr, s, GET /x\n")?;
        assert_eq!(load_catalog(&lines)?.endpoint_count(), 1);

        let json = temp.path().join("catalog.json");
        std::fs::write(
            &json,
            r#"[{"id": "r", "services": [{"serviceName": "s", "endpoints": [{"path": "/x", "method": "post"}]}]}]"#,
        )?;
        assert_eq!(load_catalog(&json)?.endpoint_count(), 1);

        std::fs::write(&lines, "r, s\n")?;
        let error = load_catalog(&lines).expect_err("short line should fail");
        assert!(format!("{error:#}").contains("line 1"));
        Ok(())
    }
}
