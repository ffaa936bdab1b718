// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use crate::filter::resolve_value;
use crate::{Column, Row, RowIndex, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

/// Advances one column through none -> asc -> desc -> none and returns the
/// column's new direction.
pub fn cycle_sort(sorts: &mut Vec<SortSpec>, column: &str) -> Option<SortDirection> {
    if let Some(index) = sorts.iter().position(|sort| sort.column == column) {
        match sorts[index].direction {
            SortDirection::Asc => {
                sorts[index].direction = SortDirection::Desc;
                Some(SortDirection::Desc)
            }
            SortDirection::Desc => {
                sorts.remove(index);
                None
            }
        }
    } else {
        sorts.push(SortSpec {
            column: column.to_owned(),
            direction: SortDirection::Asc,
        });
        Some(SortDirection::Asc)
    }
}

pub fn compare_values(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(left), Value::Bool(right)) => left.cmp(right),
        (Value::Int(left), Value::Int(right)) => left.cmp(right),
        (Value::Float(left), Value::Float(right)) => left.total_cmp(right),
        (Value::Int(left), Value::Float(right)) => (*left as f64).total_cmp(right),
        (Value::Float(left), Value::Int(right)) => left.total_cmp(&(*right as f64)),
        (Value::Date(left), Value::Date(right)) => left.cmp(right),
        (Value::Text(left), Value::Text(right)) => {
            left.to_lowercase().cmp(&right.to_lowercase())
        }
        _ => left
            .display_text()
            .to_lowercase()
            .cmp(&right.display_text().to_lowercase()),
    }
}

/// Stable multi-column sort of row indices. Nulls sink to the bottom in
/// either direction; full ties keep source order.
pub fn sort_indices(rows: &[Row], columns: &[Column], sorts: &[SortSpec], indices: &mut [RowIndex]) {
    let keyed = sorts
        .iter()
        .filter_map(|sort| {
            columns
                .iter()
                .find(|column| column.key == sort.column)
                .map(|column| (column, sort.direction))
        })
        .collect::<Vec<_>>();
    if keyed.is_empty() {
        return;
    }

    indices.sort_by(|left, right| {
        let (Some(left_row), Some(right_row)) = (rows.get(left.get()), rows.get(right.get()))
        else {
            return left.cmp(right);
        };
        for (column, direction) in &keyed {
            let left_value = resolve_value(left_row, &column.accessor);
            let right_value = resolve_value(right_row, &column.accessor);
            match (left_value.is_null(), right_value.is_null()) {
                (true, true) => continue,
                (true, false) => return Ordering::Greater,
                (false, true) => return Ordering::Less,
                (false, false) => {}
            }
            let order = match direction {
                SortDirection::Asc => compare_values(&left_value, &right_value),
                SortDirection::Desc => compare_values(&left_value, &right_value).reverse(),
            };
            if order != Ordering::Equal {
                return order;
            }
        }
        left.cmp(right)
    });
}

#[cfg(test)]
mod tests {
    use super::{SortDirection, SortSpec, cycle_sort, sort_indices};
    use crate::{Column, Row, RowIndex, Value};

    #[test]
    fn cycle_goes_asc_desc_then_off() {
        let mut sorts = Vec::new();
        assert_eq!(cycle_sort(&mut sorts, "name"), Some(SortDirection::Asc));
        assert_eq!(cycle_sort(&mut sorts, "name"), Some(SortDirection::Desc));
        assert_eq!(cycle_sort(&mut sorts, "name"), None);
        assert!(sorts.is_empty());
    }

    #[test]
    fn nulls_sort_last_in_both_directions() {
        let rows = vec![
            Row::new().with("n", 2),
            Row::new().with("n", Value::Null),
            Row::new().with("n", 1),
        ];
        let columns = vec![Column::new("n", "N")];
        let mut indices = (0..3).map(RowIndex::new).collect::<Vec<_>>();

        let asc = vec![SortSpec {
            column: "n".to_owned(),
            direction: SortDirection::Asc,
        }];
        sort_indices(&rows, &columns, &asc, &mut indices);
        assert_eq!(indices, vec![RowIndex::new(2), RowIndex::new(0), RowIndex::new(1)]);

        let desc = vec![SortSpec {
            column: "n".to_owned(),
            direction: SortDirection::Desc,
        }];
        sort_indices(&rows, &columns, &desc, &mut indices);
        assert_eq!(indices, vec![RowIndex::new(0), RowIndex::new(2), RowIndex::new(1)]);
    }

    #[test]
    fn secondary_sort_breaks_ties_and_source_order_breaks_the_rest() {
        let rows = vec![
            Row::new().with("team", "b").with("name", "zed"),
            Row::new().with("team", "a").with("name", "Yan"),
            Row::new().with("team", "B").with("name", "amy"),
            Row::new().with("team", "a").with("name", "yan"),
        ];
        let columns = vec![Column::new("team", "Team"), Column::new("name", "Name")];
        let sorts = vec![
            SortSpec {
                column: "team".to_owned(),
                direction: SortDirection::Asc,
            },
            SortSpec {
                column: "name".to_owned(),
                direction: SortDirection::Asc,
            },
        ];
        let mut indices = (0..4).map(RowIndex::new).collect::<Vec<_>>();
        sort_indices(&rows, &columns, &sorts, &mut indices);
        assert_eq!(
            indices,
            vec![RowIndex::new(1), RowIndex::new(3), RowIndex::new(2), RowIndex::new(0)]
        );
    }
}
