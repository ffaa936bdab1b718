// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use log::debug;
use std::collections::BTreeSet;

use crate::filter::row_matches;
use crate::grid::rejected;
use crate::tree::flatten;
use crate::{
    Column, ColumnError, CsvExport, FilteredForest, Grid, GridCommand, GridEvent, GridOptions,
    GridState, GridView, NodeKey, Row, Tree, TreeError, TreeMarker, ViewRow, VisibleNode,
    validate_columns,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeFields {
    pub id_field: String,
    pub parent_id_field: String,
    pub default_expanded_levels: usize,
}

impl Default for TreeFields {
    fn default() -> Self {
        Self {
            id_field: "id".to_owned(),
            parent_id_field: "parentId".to_owned(),
            default_expanded_levels: 1,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TreeGridError {
    #[error(transparent)]
    Columns(#[from] ColumnError),
    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// A grid over parent/child rows. Rows are identified by their id field;
/// paging runs over the flattened, expansion-aware list.
#[derive(Debug, Clone)]
pub struct TreeGrid {
    rows: Vec<Row>,
    columns: Vec<Column>,
    options: GridOptions,
    fields: TreeFields,
    tree: Tree,
    expanded: BTreeSet<NodeKey>,
    state: GridState<NodeKey>,
}

impl TreeGrid {
    pub fn new(
        rows: Vec<Row>,
        columns: Vec<Column>,
        options: GridOptions,
        fields: TreeFields,
    ) -> Result<Self, TreeGridError> {
        validate_columns(&columns)?;
        let tree = Tree::build(
            &rows,
            &fields.id_field,
            &fields.parent_id_field,
            fields.default_expanded_levels,
        )?;
        let expanded = tree.default_expanded();
        let state = GridState::new(options.page_size);
        Ok(Self {
            rows,
            columns,
            options,
            fields,
            tree,
            expanded,
            state,
        })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn expanded(&self) -> &BTreeSet<NodeKey> {
        &self.expanded
    }

    pub fn fields(&self) -> &TreeFields {
        &self.fields
    }

    /// Nodes matching search and filters, plus their ancestors.
    pub fn filtered(&self) -> FilteredForest {
        self.tree.filter(|node| {
            self.rows.get(node.row.get()).is_some_and(|row| {
                row_matches(row, &self.columns, &self.state.search, &self.state.filters)
            })
        })
    }

    /// Rows as displayed across all pages.
    pub fn visible(&self) -> Vec<VisibleNode> {
        flatten(&self.tree, &self.filtered(), &self.expanded)
    }

    pub fn page_keys(&self) -> Vec<NodeKey> {
        self.state
            .pagination
            .slice(&self.visible())
            .iter()
            .map(|node| node.key.clone())
            .collect()
    }

    /// Rebuilds the tree from new rows and restores default expansion.
    /// Selected ids that no longer exist are dropped.
    pub fn replace_rows(&mut self, rows: Vec<Row>) -> Result<Vec<GridEvent<NodeKey>>, TreeError> {
        let tree = Tree::build(
            &rows,
            &self.fields.id_field,
            &self.fields.parent_id_field,
            self.fields.default_expanded_levels,
        )?;
        self.rows = rows;
        self.expanded = tree.default_expanded();
        self.tree = tree;

        let mut events = vec![GridEvent::ExpansionChanged];
        let tree = &self.tree;
        if self.state.selection.retain(|key| tree.get(key).is_some()) {
            events.push(self.state.selection_changed());
        }
        Ok(events)
    }

    fn apply_node_command(&mut self, command: GridCommand<NodeKey>) -> Vec<GridEvent<NodeKey>> {
        match command {
            GridCommand::ToggleRow(key) => {
                if !self.options.selectable {
                    return rejected("selection is disabled");
                }
                if self.tree.get(&key).is_none() {
                    return rejected(format!("no row with id {key}"));
                }
                self.state.selection.toggle(key);
                vec![self.state.selection_changed()]
            }
            GridCommand::SelectPage(checked) => {
                if !self.options.selectable {
                    return rejected("selection is disabled");
                }
                let page = self.page_keys();
                if self.state.selection.select_page(&page, checked) {
                    vec![self.state.selection_changed()]
                } else {
                    Vec::new()
                }
            }
            GridCommand::ToggleExpanded(key) => match self.tree.get(&key) {
                None => rejected(format!("no row with id {key}")),
                Some(node) if node.is_leaf() => rejected(format!("row {key} has no children")),
                Some(_) => {
                    if !self.expanded.remove(&key) {
                        self.expanded.insert(key);
                    }
                    vec![GridEvent::ExpansionChanged]
                }
            },
            GridCommand::ExpandAll => {
                let all = self.tree.branch_keys();
                if all.is_subset(&self.expanded) {
                    return Vec::new();
                }
                self.expanded.extend(all);
                vec![GridEvent::ExpansionChanged]
            }
            GridCommand::CollapseAll => {
                if self.expanded.is_empty() {
                    return Vec::new();
                }
                self.expanded.clear();
                vec![GridEvent::ExpansionChanged]
            }
            other => rejected(format!("unsupported command {other:?}")),
        }
    }
}

impl Grid for TreeGrid {
    type Id = NodeKey;

    fn dispatch(&mut self, command: GridCommand<NodeKey>) -> Vec<GridEvent<NodeKey>> {
        debug!("tree grid command: {command:?}");
        if matches!(command, GridCommand::CycleSort(_) | GridCommand::ClearSort) {
            return rejected("tree rows keep their hierarchy order");
        }
        let count = self.visible().len();
        match self
            .state
            .apply(command, &self.columns, &self.options, count)
        {
            Ok(events) => events,
            Err(command) => self.apply_node_command(command),
        }
    }

    fn view(&self) -> GridView<NodeKey> {
        let visible = self.visible();
        let page = self.state.pagination.slice(&visible);
        let columns = self.state.visible_columns(&self.columns);
        let rows = page
            .iter()
            .filter_map(|node| {
                let row = self.rows.get(node.row.get())?;
                Some(ViewRow {
                    id: node.key.clone(),
                    row: node.row,
                    cells: columns.iter().map(|column| column.display(row)).collect(),
                    selected: self.state.selection.contains(&node.key),
                    tree: Some(TreeMarker {
                        level: node.level,
                        has_children: node.has_children,
                        expanded: node.expanded,
                    }),
                })
            })
            .collect();
        let check_state = self
            .state
            .selection
            .page_state(page.iter().map(|node| &node.key));
        GridView::assemble(
            &self.state,
            &self.options,
            &self.columns,
            rows,
            visible.len(),
            self.tree.len(),
            check_state,
        )
    }

    /// Selected rows when anything is selected, else every displayed row
    /// across all pages.
    fn export(&self) -> Option<CsvExport> {
        if !self.options.exportable {
            return None;
        }
        let columns = self.state.visible_columns(&self.columns);
        let rows: Vec<&Row> = if self.state.selection.is_empty() {
            self.visible()
                .iter()
                .filter_map(|node| self.rows.get(node.row.get()))
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

    fn state(&self) -> &GridState<NodeKey> {
        &self.state
    }

    fn selected_rows(&self) -> Vec<&Row> {
        self.state
            .selection
            .iter()
            .filter_map(|key| self.tree.row_for(key))
            .filter_map(|index| self.rows.get(index.get()))
            .collect()
    }
}
