// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use gridline_app::{Column, FilterOption, FilterType, Row, Value};
use time::{Date, Duration, Month};

const SERVICES: [&str; 10] = [
    "accounts",
    "billing",
    "catalog",
    "checkout",
    "customers",
    "inventory",
    "orders",
    "payments",
    "shipping",
    "users",
];

const ACTIONS: [&str; 8] = [
    "list", "create", "update", "delete", "search", "export", "import", "sync",
];

const METHODS: [&str; 5] = ["get", "post", "put", "delete", "soap"];

const TEAMS: [&str; 6] = ["core", "commerce", "identity", "platform", "growth", "data"];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Seeded generator of endpoint-shaped rows. Same seed, same rows.
#[derive(Debug, Clone)]
pub struct EndpointFaker {
    rng: DeterministicRng,
}

impl EndpointFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    /// One row: `id`, `name`, `method`, `active`, `latency_ms`, `deployed`
    /// and a nested `owner.team`. Roughly one row in eight has no `active`
    /// field at all.
    pub fn endpoint(&mut self, id: i64) -> Row {
        let service = self.pick(&SERVICES);
        let action = self.pick(&ACTIONS);
        let mut row = Row::new()
            .with("id", id)
            .with("name", format!("/{service}/{action}"))
            .with("method", self.pick(&METHODS))
            .with("latency_ms", self.latency())
            .with("deployed", self.deployed())
            .with("owner", Row::new().with("team", self.pick(&TEAMS)));
        if self.rng.int_n(8) != 0 {
            row.insert("active", self.rng.bool());
        }
        row
    }

    pub fn endpoints(&mut self, count: usize) -> Vec<Row> {
        (0..count).map(|n| self.endpoint(n as i64 + 1)).collect()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn latency(&mut self) -> f64 {
        let tenths = 5 + self.rng.int_n(5_000);
        tenths as f64 / 10.0
    }

    fn deployed(&mut self) -> Date {
        fixture_date() + Duration::days(self.rng.int_n(365) as i64)
    }
}

/// Columns matching [`EndpointFaker`] rows: text, select, boolean and a
/// nested path.
pub fn endpoint_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Endpoint")
            .filterable(FilterType::Text)
            .sortable(),
        Column::new("method", "Method")
            .options(METHODS.iter().map(|method| {
                FilterOption::new(method.to_uppercase(), Value::from(*method))
            }))
            .sortable(),
        Column::new("active", "Active").filterable(FilterType::Boolean),
        Column::new("latency_ms", "Latency").sortable(),
        Column::new("deployed", "Deployed").sortable(),
        Column::new("team", "Team")
            .path("owner.team")
            .filterable(FilterType::Text),
    ]
}

/// `count` rows named `row 01`, `row 02`, ... with an `n` column.
pub fn numbered_rows(count: usize) -> Vec<Row> {
    (1..=count)
        .map(|n| {
            Row::new()
                .with("n", n as i64)
                .with("name", format!("row {n:02}"))
        })
        .collect()
}

pub fn numbered_columns() -> Vec<Column> {
    vec![
        Column::new("n", "N").sortable(),
        Column::new("name", "Name").filterable(FilterType::Text),
    ]
}

/// A small organisation chart with two roots, three levels under the first
/// and one row whose parent does not exist.
pub fn org_rows() -> Vec<Row> {
    let rows: [(i64, Option<i64>, &str, &str); 9] = [
        (1, None, "Acme", "company"),
        (2, Some(1), "Engineering", "department"),
        (3, Some(2), "Platform", "team"),
        (4, Some(2), "Frontend", "team"),
        (5, Some(1), "Sales", "department"),
        (6, Some(5), "Field Sales", "team"),
        (7, None, "Globex", "company"),
        (8, Some(7), "Research", "department"),
        (9, Some(42), "Orphaned Team", "team"),
    ];
    rows.into_iter()
        .map(|(id, parent, name, kind)| {
            Row::new()
                .with("id", id)
                .with("parentId", parent)
                .with("name", name)
                .with("kind", kind)
        })
        .collect()
}

pub fn org_columns() -> Vec<Column> {
    vec![
        Column::new("name", "Name")
            .filterable(FilterType::Text)
            .tree_column(),
        Column::new("kind", "Kind").options([
            FilterOption::new("Company", "company"),
            FilterOption::new("Department", "department"),
            FilterOption::new("Team", "team"),
        ]),
    ]
}

pub fn fixture_date() -> Date {
    Date::from_calendar_date(REFERENCE_YEAR, Month::January, 1).unwrap_or(Date::MIN)
}

#[cfg(test)]
mod tests {
    use super::{EndpointFaker, endpoint_columns, numbered_rows, org_rows};
    use gridline_app::validate_columns;
    use std::collections::BTreeSet;

    #[test]
    fn same_seed_same_rows() {
        let first = EndpointFaker::new(7).endpoints(20);
        let second = EndpointFaker::new(7).endpoints(20);
        assert_eq!(first, second);
    }

    #[test]
    fn variety_across_seeds() {
        let mut names = BTreeSet::new();
        for seed in 0_u64..20_u64 {
            let row = EndpointFaker::new(seed).endpoint(1);
            names.insert(row.get("name").map(|value| value.display_text()));
        }
        assert!(names.len() >= 10, "got {}", names.len());
    }

    #[test]
    fn some_rows_lack_the_active_field() {
        let rows = EndpointFaker::new(3).endpoints(200);
        assert!(rows.iter().any(|row| row.get("active").is_none()));
        assert!(rows.iter().any(|row| row.get("active").is_some()));
    }

    #[test]
    fn fixture_columns_are_valid() {
        assert!(validate_columns(&endpoint_columns()).is_ok());
        assert_eq!(numbered_rows(25).len(), 25);
        assert_eq!(org_rows().len(), 9);
    }
}
