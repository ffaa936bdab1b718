// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! State, commands and view types shared by the flat and tree grids.

use std::collections::BTreeSet;
use std::fmt::Debug;

use crate::page::{page_window, showing_label, shows_pager};
use crate::sort::cycle_sort;
use crate::{
    CheckState, Column, ColumnFilters, CsvExport, FilterValue, Pagination, Row, RowIndex,
    Selection, SortDirection, SortSpec,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridOptions {
    pub title: String,
    pub searchable: bool,
    pub exportable: bool,
    pub selectable: bool,
    pub page_size: usize,
}

impl GridOptions {
    pub fn flat() -> Self {
        Self::titled("Data Grid")
    }

    pub fn tree() -> Self {
        Self::titled("Tree Data Grid")
    }

    fn titled(title: &str) -> Self {
        Self {
            title: title.to_owned(),
            searchable: true,
            exportable: true,
            selectable: true,
            page_size: crate::DEFAULT_PAGE_SIZE,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub const fn searchable(mut self, searchable: bool) -> Self {
        self.searchable = searchable;
        self
    }

    pub const fn exportable(mut self, exportable: bool) -> Self {
        self.exportable = exportable;
        self
    }

    pub const fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    pub const fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// User intents. `K` is the row identity: [`RowIndex`] for the flat grid,
/// [`crate::NodeKey`] for the tree grid.
#[derive(Debug, Clone, PartialEq)]
pub enum GridCommand<K> {
    SetSearch(String),
    SetColumnFilter { key: String, value: FilterValue },
    ClearColumnFilter(String),
    ClearAllFilters,
    ToggleColumn(String),
    ShowAllColumns,
    CycleSort(String),
    ClearSort,
    GoToPage(usize),
    FirstPage,
    PrevPage,
    NextPage,
    LastPage,
    SetPageSize(usize),
    ToggleRow(K),
    SelectPage(bool),
    ClearSelection,
    ToggleExpanded(K),
    ExpandAll,
    CollapseAll,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent<K> {
    SearchChanged(String),
    FiltersChanged,
    ColumnsChanged,
    SortChanged,
    PageChanged(usize),
    PageSizeChanged(usize),
    /// Every selected id after the change.
    SelectionChanged(Vec<K>),
    ExpansionChanged,
    Rejected(String),
}

/// Mutable view state owned by one grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridState<K: Ord + Clone> {
    pub search: String,
    pub filters: ColumnFilters,
    pub hidden_columns: BTreeSet<String>,
    pub sorts: Vec<SortSpec>,
    pub pagination: Pagination,
    pub selection: Selection<K>,
}

impl<K: Ord + Clone + Debug> GridState<K> {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            filters: ColumnFilters::new(),
            hidden_columns: BTreeSet::new(),
            sorts: Vec::new(),
            pagination: Pagination::new(page_size),
            selection: Selection::new(),
        }
    }

    pub fn visible_columns<'a>(&self, columns: &'a [Column]) -> Vec<&'a Column> {
        columns
            .iter()
            .filter(|column| !self.hidden_columns.contains(&column.key))
            .collect()
    }

    fn reset_page(&mut self, events: &mut Vec<GridEvent<K>>) {
        if self.pagination.page != 1 {
            self.pagination.reset();
            events.push(GridEvent::PageChanged(1));
        }
    }

    fn move_to(&mut self, page: usize) -> Vec<GridEvent<K>> {
        if page == self.pagination.page {
            return Vec::new();
        }
        self.pagination.page = page;
        vec![GridEvent::PageChanged(page)]
    }

    pub(crate) fn selection_changed(&self) -> GridEvent<K> {
        GridEvent::SelectionChanged(self.selection.ids())
    }

    /// Applies the commands both grids handle the same way. `count` is the
    /// number of rows the pager currently spans. Commands that depend on the
    /// grid kind are handed back unchanged.
    pub(crate) fn apply(
        &mut self,
        command: GridCommand<K>,
        columns: &[Column],
        options: &GridOptions,
        count: usize,
    ) -> Result<Vec<GridEvent<K>>, GridCommand<K>> {
        let mut events = Vec::new();
        match command {
            GridCommand::SetSearch(term) => {
                if !options.searchable {
                    return Ok(rejected("search is disabled"));
                }
                if term == self.search {
                    return Ok(events);
                }
                self.search = term.clone();
                events.push(GridEvent::SearchChanged(term));
                self.reset_page(&mut events);
            }
            GridCommand::SetColumnFilter { key, value } => {
                match columns.iter().find(|column| column.key == key) {
                    Some(column) if column.filterable => {}
                    Some(_) => return Ok(rejected(format!("column {key:?} is not filterable"))),
                    None => return Ok(rejected(format!("unknown column {key:?}"))),
                }
                if self.filters.get(&key) == Some(&value) {
                    return Ok(events);
                }
                self.filters.set(key, Some(value));
                events.push(GridEvent::FiltersChanged);
                self.reset_page(&mut events);
            }
            GridCommand::ClearColumnFilter(key) => {
                if self.filters.remove(&key) {
                    events.push(GridEvent::FiltersChanged);
                    self.reset_page(&mut events);
                }
            }
            GridCommand::ClearAllFilters => {
                if !self.filters.is_empty() {
                    self.filters.clear();
                    events.push(GridEvent::FiltersChanged);
                    self.reset_page(&mut events);
                }
            }
            GridCommand::ToggleColumn(key) => {
                if !columns.iter().any(|column| column.key == key) {
                    return Ok(rejected(format!("unknown column {key:?}")));
                }
                if !self.hidden_columns.remove(&key) {
                    if self.visible_columns(columns).len() <= 1 {
                        return Ok(rejected("at least one column must stay visible"));
                    }
                    self.hidden_columns.insert(key);
                }
                events.push(GridEvent::ColumnsChanged);
            }
            GridCommand::ShowAllColumns => {
                if !self.hidden_columns.is_empty() {
                    self.hidden_columns.clear();
                    events.push(GridEvent::ColumnsChanged);
                }
            }
            GridCommand::CycleSort(key) => {
                match columns.iter().find(|column| column.key == key) {
                    Some(column) if column.sortable => {}
                    Some(_) => return Ok(rejected(format!("column {key:?} is not sortable"))),
                    None => return Ok(rejected(format!("unknown column {key:?}"))),
                }
                cycle_sort(&mut self.sorts, &key);
                events.push(GridEvent::SortChanged);
            }
            GridCommand::ClearSort => {
                if !self.sorts.is_empty() {
                    self.sorts.clear();
                    events.push(GridEvent::SortChanged);
                }
            }
            GridCommand::GoToPage(page) => {
                let last = self.pagination.total_pages(count).max(1);
                if page == 0 || page > last {
                    return Ok(rejected(format!("page {page} is out of range 1..={last}")));
                }
                return Ok(self.move_to(page));
            }
            GridCommand::FirstPage => return Ok(self.move_to(1)),
            GridCommand::PrevPage => {
                let page = self.pagination.page.saturating_sub(1).max(1);
                return Ok(self.move_to(page));
            }
            GridCommand::NextPage => {
                let last = self.pagination.total_pages(count).max(1);
                let page = (self.pagination.page + 1).min(last);
                return Ok(self.move_to(page));
            }
            GridCommand::LastPage => {
                let last = self.pagination.total_pages(count).max(1);
                return Ok(self.move_to(last));
            }
            GridCommand::SetPageSize(size) => {
                let page = self.pagination.page;
                let before = self.pagination.page_size;
                self.pagination.set_page_size(size);
                if self.pagination.page_size != before {
                    events.push(GridEvent::PageSizeChanged(self.pagination.page_size));
                }
                if page != 1 {
                    events.push(GridEvent::PageChanged(1));
                }
            }
            GridCommand::ClearSelection => {
                if self.selection.clear() {
                    events.push(self.selection_changed());
                }
            }
            other => return Err(other),
        }
        Ok(events)
    }

    pub(crate) fn column_views(&self, columns: &[Column]) -> Vec<ColumnView> {
        self.visible_columns(columns)
            .into_iter()
            .map(|column| ColumnView {
                key: column.key.clone(),
                header: column.header.clone(),
                width: column.width,
                tree_column: column.tree_column,
                sortable: column.sortable,
                sort: self
                    .sorts
                    .iter()
                    .position(|sort| sort.column == column.key)
                    .map(|rank| (self.sorts[rank].direction, rank + 1)),
                filter: self.filters.get(&column.key).map(FilterValue::label),
            })
            .collect()
    }

    /// Active filter badges, in column-key order.
    pub(crate) fn filter_badges(&self, columns: &[Column]) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|(key, value)| {
                let header = columns
                    .iter()
                    .find(|column| column.key == *key)
                    .map_or_else(|| key.clone(), |column| column.header.clone());
                (header, value.label())
            })
            .collect()
    }
}

pub(crate) fn rejected<K>(reason: impl Into<String>) -> Vec<GridEvent<K>> {
    vec![GridEvent::Rejected(reason.into())]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnView {
    pub key: String,
    pub header: String,
    pub width: Option<u16>,
    pub tree_column: bool,
    pub sortable: bool,
    /// Direction and 1-based priority when the column is sorted.
    pub sort: Option<(SortDirection, usize)>,
    pub filter: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeMarker {
    pub level: usize,
    pub has_children: bool,
    pub expanded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow<K> {
    pub id: K,
    pub row: RowIndex,
    pub cells: Vec<String>,
    pub selected: bool,
    pub tree: Option<TreeMarker>,
}

/// Everything needed to draw the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridView<K> {
    pub title: String,
    pub search: String,
    pub filters: Vec<(String, String)>,
    pub columns: Vec<ColumnView>,
    pub rows: Vec<ViewRow<K>>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub page_window: Vec<usize>,
    pub show_pager: bool,
    pub showing: String,
    /// Rows the pager spans.
    pub matched: usize,
    pub total: usize,
    pub selected: usize,
    pub check_state: CheckState,
    pub searchable: bool,
    pub selectable: bool,
    pub exportable: bool,
}

impl<K: Ord + Clone + Debug> GridView<K> {
    pub(crate) fn assemble(
        state: &GridState<K>,
        options: &GridOptions,
        columns: &[Column],
        rows: Vec<ViewRow<K>>,
        matched: usize,
        total: usize,
        check_state: CheckState,
    ) -> Self {
        let pagination = state.pagination;
        let total_pages = pagination.total_pages(matched);
        // Collapsed tree rows are not filtered out, so only narrowing earns the suffix.
        let narrowed = !state.search.is_empty() || state.filters.active().next().is_some();
        let unfiltered = if narrowed { total } else { matched };
        Self {
            title: options.title.clone(),
            search: state.search.clone(),
            filters: state.filter_badges(columns),
            columns: state.column_views(columns),
            rows,
            page: pagination.page,
            page_size: pagination.page_size,
            total_pages,
            page_window: page_window(pagination.page, total_pages),
            show_pager: shows_pager(matched, pagination.page_size),
            showing: showing_label(&pagination.range(matched), matched, unfiltered),
            matched,
            total,
            selected: state.selection.len(),
            check_state,
            searchable: options.searchable,
            selectable: options.selectable,
            exportable: options.exportable,
        }
    }
}

/// The operations a presentation layer needs from either grid.
pub trait Grid {
    type Id: Ord + Clone + Debug;

    fn dispatch(&mut self, command: GridCommand<Self::Id>) -> Vec<GridEvent<Self::Id>>;
    fn view(&self) -> GridView<Self::Id>;
    fn export(&self) -> Option<CsvExport>;
    fn columns(&self) -> &[Column];
    fn options(&self) -> &GridOptions;
    fn state(&self) -> &GridState<Self::Id>;
    fn selected_rows(&self) -> Vec<&Row>;
}
