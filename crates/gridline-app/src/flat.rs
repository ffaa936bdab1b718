// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use log::debug;

use crate::filter::filter_rows;
use crate::grid::rejected;
use crate::sort::sort_indices;
use crate::{
    Column, ColumnError, CsvExport, Grid, GridCommand, GridEvent, GridOptions, GridState,
    GridView, Row, RowIndex, ViewRow, validate_columns,
};

/// A flat table. Rows are identified by their position in the source data,
/// so selections survive filtering and sorting.
#[derive(Debug, Clone)]
pub struct FlatGrid {
    rows: Vec<Row>,
    columns: Vec<Column>,
    options: GridOptions,
    state: GridState<RowIndex>,
}

impl FlatGrid {
    pub fn new(rows: Vec<Row>, columns: Vec<Column>, options: GridOptions) -> Result<Self, ColumnError> {
        validate_columns(&columns)?;
        let state = GridState::new(options.page_size);
        Ok(Self {
            rows,
            columns,
            options,
            state,
        })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Rows passing search and filters, in sorted order.
    pub fn matching(&self) -> Vec<RowIndex> {
        let mut indices = filter_rows(
            &self.rows,
            &self.columns,
            &self.state.search,
            &self.state.filters,
        );
        sort_indices(&self.rows, &self.columns, &self.state.sorts, &mut indices);
        indices
    }

    pub fn page_ids(&self) -> Vec<RowIndex> {
        self.state.pagination.slice(&self.matching()).to_vec()
    }

    /// Swaps the data and keeps search, filters and paging as they are.
    /// Selected positions past the end of the new data are dropped.
    pub fn replace_rows(&mut self, rows: Vec<Row>) -> Vec<GridEvent<RowIndex>> {
        self.rows = rows;
        let len = self.rows.len();
        if self.state.selection.retain(|index| index.get() < len) {
            vec![self.state.selection_changed()]
        } else {
            Vec::new()
        }
    }

    fn apply_row_command(&mut self, command: GridCommand<RowIndex>) -> Vec<GridEvent<RowIndex>> {
        match command {
            GridCommand::ToggleRow(index) => {
                if !self.options.selectable {
                    return rejected("selection is disabled");
                }
                if index.get() >= self.rows.len() {
                    return rejected(format!("row {} does not exist", index.get()));
                }
                self.state.selection.toggle(index);
                vec![self.state.selection_changed()]
            }
            GridCommand::SelectPage(checked) => {
                if !self.options.selectable {
                    return rejected("selection is disabled");
                }
                let page = self.page_ids();
                if self.state.selection.select_page(&page, checked) {
                    vec![self.state.selection_changed()]
                } else {
                    Vec::new()
                }
            }
            GridCommand::ToggleExpanded(_) | GridCommand::ExpandAll | GridCommand::CollapseAll => {
                rejected("flat grid rows do not expand")
            }
            other => rejected(format!("unsupported command {other:?}")),
        }
    }
}

impl Grid for FlatGrid {
    type Id = RowIndex;

    fn dispatch(&mut self, command: GridCommand<RowIndex>) -> Vec<GridEvent<RowIndex>> {
        debug!("flat grid command: {command:?}");
        let count = self.matching().len();
        match self
            .state
            .apply(command, &self.columns, &self.options, count)
        {
            Ok(events) => events,
            Err(command) => self.apply_row_command(command),
        }
    }

    fn view(&self) -> GridView<RowIndex> {
        let matching = self.matching();
        let page = self.state.pagination.slice(&matching);
        let columns = self.state.visible_columns(&self.columns);
        let rows = page
            .iter()
            .filter_map(|index| {
                let row = self.rows.get(index.get())?;
                Some(ViewRow {
                    id: *index,
                    row: *index,
                    cells: columns.iter().map(|column| column.display(row)).collect(),
                    selected: self.state.selection.contains(index),
                    tree: None,
                })
            })
            .collect();
        let check_state = self.state.selection.page_state(page);
        GridView::assemble(
            &self.state,
            &self.options,
            &self.columns,
            rows,
            matching.len(),
            self.rows.len(),
            check_state,
        )
    }

    /// Selected rows when anything is selected, else every matching row.
    fn export(&self) -> Option<CsvExport> {
        if !self.options.exportable {
            return None;
        }
        let columns = self.state.visible_columns(&self.columns);
        let rows: Vec<&Row> = if self.state.selection.is_empty() {
            self.matching()
                .into_iter()
                .filter_map(|index| self.rows.get(index.get()))
                .collect()
        } else {
            self.selected_rows()
        };
        Some(CsvExport::new(&self.options.title, rows, &columns))
    }

    fn columns(&self) -> &[Column] {
        &self.columns
    }

    fn options(&self) -> &GridOptions {
        &self.options
    }

    fn state(&self) -> &GridState<RowIndex> {
        &self.state
    }

    /// Selected rows from the full data set, in source order.
    fn selected_rows(&self) -> Vec<&Row> {
        self.state
            .selection
            .iter()
            .filter_map(|index| self.rows.get(index.get()))
            .collect()
    }
}
