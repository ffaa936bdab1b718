// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use gridline_app::filter::filter_rows;
use gridline_app::{
    CheckState, Column, ColumnFilters, FilterValue, FlatGrid, Grid, GridCommand, GridEvent,
    GridOptions, NodeKey, RowIndex, Tree, TreeFields, TreeGrid, Value, flatten,
};
use gridline_testkit::{
    EndpointFaker, endpoint_columns, numbered_columns, numbered_rows, org_columns, org_rows,
};
use std::collections::BTreeSet;

#[test]
fn filtering_yields_an_ordered_subset() {
    let rows = EndpointFaker::new(11).endpoints(120);
    let columns = endpoint_columns();
    let cases = [
        ("", ColumnFilters::new()),
        ("orders", ColumnFilters::new()),
        (
            "",
            ColumnFilters::new().with("method", FilterValue::Choice(Value::from("soap"))),
        ),
        (
            "a",
            ColumnFilters::new()
                .with("active", FilterValue::Bool(true))
                .with("team", FilterValue::Text("co".to_owned())),
        ),
    ];
    for (search, filters) in cases {
        let matched = filter_rows(&rows, &columns, search, &filters);
        assert!(matched.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(matched.iter().all(|index| index.get() < rows.len()));
    }
}

#[test]
fn boolean_false_filter_does_not_match_missing_fields() {
    let rows = EndpointFaker::new(5).endpoints(200);
    let columns = endpoint_columns();
    let filters = ColumnFilters::new().with("active", FilterValue::Bool(false));
    let matched = filter_rows(&rows, &columns, "", &filters);
    assert!(!matched.is_empty());
    assert!(
        matched
            .iter()
            .all(|index| rows[index.get()].get("active") == Some(&Value::Bool(false)))
    );
}

#[test]
fn twenty_five_rows_paginate_into_three_pages() -> Result<()> {
    let mut grid = FlatGrid::new(numbered_rows(25), numbered_columns(), GridOptions::flat())?;
    assert_eq!(grid.view().total_pages, 3);

    grid.dispatch(GridCommand::GoToPage(3));
    let view = grid.view();
    assert_eq!(view.rows.len(), 5);
    assert_eq!(view.showing, "Showing 21 to 25 of 25 entries");
    assert_eq!(view.page_window, vec![1, 2, 3]);

    assert!(matches!(
        grid.dispatch(GridCommand::GoToPage(4)).as_slice(),
        [GridEvent::Rejected(_)]
    ));
    Ok(())
}

#[test]
fn page_past_the_end_after_data_shrinks_is_empty() -> Result<()> {
    let mut grid = FlatGrid::new(numbered_rows(25), numbered_columns(), GridOptions::flat())?;
    grid.dispatch(GridCommand::LastPage);
    grid.replace_rows(numbered_rows(12));
    let view = grid.view();
    assert_eq!(view.page, 3);
    assert_eq!(view.total_pages, 2);
    assert!(view.rows.is_empty());
    Ok(())
}

#[test]
fn csv_export_escapes_quotes() -> Result<()> {
    let rows = vec![gridline_app::Row::new().with("note", "He said \"hi\", ok")];
    let grid = FlatGrid::new(rows, vec![Column::new("note", "Note")], GridOptions::flat())?;
    let export = grid.export().expect("export enabled");
    assert_eq!(export.body, "Note\n\"He said \"\"hi\"\", ok\"");
    assert_eq!(export.mime, "text/csv;charset=utf-8;");
    Ok(())
}

#[test]
fn selection_survives_filters_that_hide_it() -> Result<()> {
    let mut grid = FlatGrid::new(numbered_rows(25), numbered_columns(), GridOptions::flat())?;
    let target = RowIndex::new(3);
    grid.dispatch(GridCommand::ToggleRow(target));

    grid.dispatch(GridCommand::SetColumnFilter {
        key: "name".to_owned(),
        value: FilterValue::Text("row 2".to_owned()),
    });
    assert!(grid.view().rows.iter().all(|row| row.id != target));
    assert!(grid.state().selection.contains(&target));

    grid.dispatch(GridCommand::ClearColumnFilter("name".to_owned()));
    let view = grid.view();
    let row = view
        .rows
        .iter()
        .find(|row| row.id == target)
        .expect("row visible again");
    assert!(row.selected);
    Ok(())
}

#[test]
fn select_all_only_covers_the_current_page() -> Result<()> {
    let mut grid = FlatGrid::new(numbered_rows(15), numbered_columns(), GridOptions::flat())?;
    grid.dispatch(GridCommand::SetColumnFilter {
        key: "name".to_owned(),
        value: FilterValue::Text("row".to_owned()),
    });
    assert_eq!(grid.view().matched, 15);

    let events = grid.dispatch(GridCommand::SelectPage(true));
    let expected = (0..10).map(RowIndex::new).collect::<Vec<_>>();
    assert_eq!(events, vec![GridEvent::SelectionChanged(expected)]);
    assert_eq!(grid.view().check_state, CheckState::Checked);

    grid.dispatch(GridCommand::NextPage);
    assert_eq!(grid.view().check_state, CheckState::Unchecked);
    Ok(())
}

#[test]
fn select_all_with_filter_keeps_off_page_selections() -> Result<()> {
    let mut grid = FlatGrid::new(numbered_rows(30), numbered_columns(), GridOptions::flat())?;
    grid.dispatch(GridCommand::ToggleRow(RowIndex::new(29)));
    grid.dispatch(GridCommand::SetColumnFilter {
        key: "name".to_owned(),
        value: FilterValue::Text("row 1".to_owned()),
    });
    assert_eq!(grid.view().matched, 10);

    grid.dispatch(GridCommand::SelectPage(true));
    assert_eq!(grid.selected_rows().len(), 11);

    grid.dispatch(GridCommand::SelectPage(false));
    assert_eq!(grid.state().selection.ids(), vec![RowIndex::new(29)]);
    Ok(())
}

#[test]
fn tree_filter_keeps_the_path_to_a_deep_match() -> Result<()> {
    let rows = vec![
        gridline_app::Row::new().with("id", 1),
        gridline_app::Row::new().with("id", 2).with("parentId", 1),
        gridline_app::Row::new().with("id", 3).with("parentId", 2),
    ];
    let tree = Tree::build(&rows, "id", "parentId", 1)?;
    let forest = tree.filter(|node| node.key == NodeKey::Int(3));

    assert_eq!(forest.roots().len(), 1);
    let root = forest.roots()[0];
    assert_eq!(tree.node(root).key, NodeKey::Int(1));
    let middle = forest.children(root)[0];
    assert_eq!(tree.node(middle).key, NodeKey::Int(2));
    assert_eq!(tree.node(forest.children(middle)[0]).key, NodeKey::Int(3));
    Ok(())
}

#[test]
fn fully_expanded_tree_reaches_every_row() -> Result<()> {
    let rows = org_rows();
    let tree = Tree::build(&rows, "id", "parentId", 0)?;
    let visible = flatten(&tree, &tree.unfiltered(), &tree.branch_keys());
    let reached = visible
        .iter()
        .map(|node| node.row.get())
        .collect::<BTreeSet<_>>();
    assert_eq!(reached, (0..rows.len()).collect::<BTreeSet<_>>());
    Ok(())
}

#[test]
fn tree_grid_pages_over_flattened_rows() -> Result<()> {
    let options = GridOptions::tree().page_size(5);
    let mut grid = TreeGrid::new(org_rows(), org_columns(), options, TreeFields::default())?;
    grid.dispatch(GridCommand::ExpandAll);

    let view = grid.view();
    assert_eq!(view.matched, 9);
    assert_eq!(view.total_pages, 2);
    let first_page = view
        .rows
        .iter()
        .map(|row| (row.cells[0].clone(), row.tree.map(|marker| marker.level)))
        .collect::<Vec<_>>();
    assert_eq!(
        first_page,
        vec![
            ("Acme".to_owned(), Some(0)),
            ("Engineering".to_owned(), Some(1)),
            ("Platform".to_owned(), Some(2)),
            ("Frontend".to_owned(), Some(2)),
            ("Sales".to_owned(), Some(1)),
        ]
    );

    grid.dispatch(GridCommand::SelectPage(true));
    grid.dispatch(GridCommand::NextPage);
    assert_eq!(grid.view().check_state, CheckState::Unchecked);
    assert_eq!(grid.selected_rows().len(), 5);
    Ok(())
}

#[test]
fn tree_grid_select_filter_keeps_ancestors_visible() -> Result<()> {
    let mut grid = TreeGrid::new(
        org_rows(),
        org_columns(),
        GridOptions::tree(),
        TreeFields::default(),
    )?;
    grid.dispatch(GridCommand::ExpandAll);
    grid.dispatch(GridCommand::SetColumnFilter {
        key: "kind".to_owned(),
        value: FilterValue::Choice(Value::from("team")),
    });
    let names = grid
        .view()
        .rows
        .into_iter()
        .map(|row| row.cells[0].clone())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            "Acme",
            "Engineering",
            "Platform",
            "Frontend",
            "Sales",
            "Field Sales",
            "Orphaned Team"
        ]
    );
    Ok(())
}
