// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod model;
pub mod parse;
pub mod query;
pub mod rows;
pub mod sample;

pub use model::*;
pub use parse::{CatalogError, parse_catalog_lines};
pub use query::{OPERATIONS_PER_PAGE, OperationQuery, OperationRef, search_repositories, truncate_label};
pub use rows::{catalog_columns, catalog_rows};
pub use sample::sample_catalog;
