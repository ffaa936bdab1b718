// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod column;
pub mod export;
pub mod filter;
pub mod flat;
pub mod grid;
pub mod ids;
pub mod page;
pub mod selection;
pub mod sort;
pub mod tree;
pub mod tree_grid;
pub mod value;

pub use column::*;
pub use export::{CSV_MIME, CsvExport};
pub use filter::{ColumnFilters, FilterValue};
pub use flat::FlatGrid;
pub use grid::*;
pub use ids::*;
pub use page::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS, Pagination};
pub use selection::{CheckState, Selection};
pub use sort::{SortDirection, SortSpec};
pub use tree::{FilteredForest, Tree, TreeError, TreeNode, VisibleNode, flatten};
pub use tree_grid::{TreeFields, TreeGrid, TreeGridError};
pub use value::*;
