// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::filter::resolve_value;
use crate::{Column, Row};

pub const CSV_MIME: &str = "text/csv;charset=utf-8;";

/// An in-memory CSV file ready to be handed to whoever saves it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub mime: &'static str,
    pub body: String,
    pub rows: usize,
}

impl CsvExport {
    pub fn new<'a, I>(title: &str, rows: I, columns: &[&Column]) -> Self
    where
        I: IntoIterator<Item = &'a Row>,
    {
        let rows = rows.into_iter().collect::<Vec<_>>();
        Self {
            file_name: format!("{}.csv", slugify(title)),
            mime: CSV_MIME,
            body: to_csv(rows.iter().copied(), columns),
            rows: rows.len(),
        }
    }
}

/// Header line of raw column headers, then one line per row with every field
/// quoted. Null values become empty fields.
pub fn to_csv<'a, I>(rows: I, columns: &[&Column]) -> String
where
    I: IntoIterator<Item = &'a Row>,
{
    let mut lines = vec![
        columns
            .iter()
            .map(|column| column.header.as_str())
            .collect::<Vec<_>>()
            .join(","),
    ];
    for row in rows {
        let fields = columns
            .iter()
            .map(|column| quote(&resolve_value(row, &column.accessor).display_text()))
            .collect::<Vec<_>>();
        lines.push(fields.join(","));
    }
    lines.join("\n")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

/// Lowercases and joins whitespace-separated words with hyphens.
pub fn slugify(title: &str) -> String {
    title
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{CSV_MIME, CsvExport, slugify, to_csv};
    use crate::{Column, Row, Value};

    #[test]
    fn fields_are_quoted_and_inner_quotes_doubled() {
        let columns = [Column::new("note", "Note"), Column::new("n", "N")];
        let refs = columns.iter().collect::<Vec<_>>();
        let rows = vec![Row::new().with("note", "He said \"hi\", ok").with("n", 3)];
        assert_eq!(
            to_csv(&rows, &refs),
            "Note,N\n\"He said \"\"hi\"\", ok\",\"3\""
        );
    }

    #[test]
    fn nulls_export_as_empty_fields() {
        let columns = [Column::new("a", "A"), Column::new("b", "B")];
        let refs = columns.iter().collect::<Vec<_>>();
        let rows = vec![Row::new().with("a", Value::Null)];
        assert_eq!(to_csv(&rows, &refs), "A,B\n\"\",\"\"");
    }

    #[test]
    fn nested_paths_are_resolved() {
        let columns = [Column::new("owner", "Owner").path("owner.name")];
        let refs = columns.iter().collect::<Vec<_>>();
        let rows = vec![Row::new().with("owner", Row::new().with("name", "core"))];
        assert_eq!(to_csv(&rows, &refs), "Owner\n\"core\"");
    }

    #[test]
    fn file_name_is_slugified_title() {
        assert_eq!(slugify("Tree Data Grid"), "tree-data-grid");
        assert_eq!(slugify("  API   Endpoints "), "api-endpoints");

        let columns = [Column::new("a", "A")];
        let refs = columns.iter().collect::<Vec<_>>();
        let rows = vec![Row::new().with("a", 1), Row::new().with("a", 2)];
        let export = CsvExport::new("Data Grid", &rows, &refs);
        assert_eq!(export.file_name, "data-grid.csv");
        assert_eq!(export.mime, CSV_MIME);
        assert_eq!(export.rows, 2);
    }
}
