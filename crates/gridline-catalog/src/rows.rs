// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use gridline_app::{Column, FilterOption, FilterType, Row, Value};

use crate::{Catalog, Method, truncate_label};

const NAME_WIDTH: usize = 44;

/// Flattens a catalog into id/parent-id rows: repository, service, endpoint,
/// then one row per operation.
pub fn catalog_rows(catalog: &Catalog) -> Vec<Row> {
    let mut rows = Vec::new();
    for repo in &catalog.repositories {
        rows.push(node(&repo.id, None, "repository", &repo.id));
        for service in &repo.services {
            let service_id = format!("{}/{}", repo.id, service.name);
            rows.push(node(&service_id, Some(repo.id.as_str()), "service", &service.name));
            for endpoint in &service.endpoints {
                let endpoint_id = format!(
                    "{service_id}/{} {}",
                    endpoint.method.as_str().to_uppercase(),
                    endpoint.path
                );
                rows.push(
                    node(&endpoint_id, Some(service_id.as_str()), "endpoint", &endpoint.path)
                        .with("method", endpoint.method.as_str())
                        .with("operations", endpoint.operations.len() as i64),
                );
                for operation in &endpoint.operations {
                    rows.push(
                        node(
                            &format!("{endpoint_id}#{operation}"),
                            Some(endpoint_id.as_str()),
                            "operation",
                            operation,
                        )
                        .with("method", endpoint.method.as_str()),
                    );
                }
            }
        }
    }
    rows
}

fn node(id: &str, parent: Option<&str>, kind: &str, name: &str) -> Row {
    Row::new()
        .with("id", id)
        .with("parentId", parent)
        .with("kind", kind)
        .with("name", name)
        .with("method", Value::Null)
        .with("operations", Value::Null)
}

pub fn catalog_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Name")
            .filterable(FilterType::Text)
            .tree_column()
            .width(52)
            .render(|value, _| truncate_label(&value.display_text(), NAME_WIDTH)),
        Column::new("kind", "Kind")
            .options(
                ["repository", "service", "endpoint", "operation"]
                    .into_iter()
                    .map(|kind| FilterOption::new(capitalize(kind), kind)),
            )
            .width(12),
        Column::new("method", "Method")
            .options(Method::ALL.into_iter().map(|method| {
                FilterOption::new(method.as_str().to_uppercase(), method.as_str())
            }))
            .render(|value, _| value.display_text().to_uppercase())
            .width(8),
        Column::new("operations", "Operations").width(10),
    ]
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
