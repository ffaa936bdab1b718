// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use gridline_app::{
    CheckState, ColumnView, CsvExport, FilterType, FilterValue, Grid, GridCommand, GridEvent,
    GridView, PAGE_SIZE_OPTIONS, SortDirection, Value, ViewRow,
};
use log::debug;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

const HALF_PAGE_ROWS: isize = 5;
const FILTER_MARK: &str = "▼";
const EXPANDED_MARK: &str = "▾";
const COLLAPSED_MARK: &str = "▸";
const TREE_INDENT: &str = "  ";

/// Side effects the terminal front end cannot perform on its own.
pub trait GridRuntime {
    /// Writes an export somewhere durable and returns where it went.
    fn save_export(&mut self, export: &CsvExport) -> Result<PathBuf>;

    /// Receives the full selected rows after every selection change.
    fn selection_changed(&mut self, _rows: &[&gridline_app::Row]) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PromptKind {
    Search,
    ColumnFilter { key: String, header: String },
}

/// Line editor for search and text filters. `original` is restored on esc.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Prompt {
    kind: PromptKind,
    input: String,
    original: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    selected_row: usize,
    selected_col: usize,
    prompt: Option<Prompt>,
    help_visible: bool,
    status_line: Option<String>,
    status_token: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableCommand {
    MoveRow(isize),
    MoveColumn(isize),
    MoveHalfPageDown,
    MoveHalfPageUp,
    JumpFirstRow,
    JumpLastRow,
    JumpFirstColumn,
    JumpLastColumn,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    CyclePageSize,
    CycleSort,
    ClearSort,
    HideCurrentColumn,
    ShowAllColumns,
    ToggleRow,
    TogglePageSelection,
    ClearSelection,
    ToggleExpanded,
    ExpandAll,
    CollapseAll,
    OpenSearch,
    EditColumnFilter,
    ClearColumnFilter,
    ClearAllFilters,
    Export,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TableStatus {
    NoRows,
    NoColumns,
    SearchUnavailable,
    ColumnNotFilterable(String),
    ExportUnavailable,
    Exported { rows: usize, path: PathBuf },
    ExportFailed(String),
    SelectionCallbackFailed(String),
}

impl TableStatus {
    fn message(&self) -> String {
        match self {
            Self::NoRows => "no rows on this page".to_owned(),
            Self::NoColumns => "no visible columns".to_owned(),
            Self::SearchUnavailable => "search unavailable".to_owned(),
            Self::ColumnNotFilterable(header) => format!("{header} is not filterable"),
            Self::ExportUnavailable => "export unavailable".to_owned(),
            Self::Exported { rows, path } => {
                format!("exported {rows} rows to {}", path.display())
            }
            Self::ExportFailed(error) => format!("export failed: {error}"),
            Self::SelectionCallbackFailed(error) => format!("selection hook failed: {error}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TableEvent<K> {
    CursorUpdated,
    PromptOpened,
    Grid(Vec<GridEvent<K>>),
    Status(TableStatus),
}

pub fn run_app<G: Grid, R: GridRuntime>(grid: &mut G, runtime: &mut R) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let mut result = Ok(());
    loop {
        process_internal_events(&mut view_data, &internal_rx);

        let view = grid.view();
        if let Err(error) = terminal.draw(|frame| render(frame, &view, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) => {
                    if handle_key_event(grid, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events(view_data: &mut ViewData, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status_line = None;
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status_line = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Returns true when the app should quit.
fn handle_key_event<G: Grid, R: GridRuntime>(
    grid: &mut G,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
            emit_status(view_data, internal_tx, "help hidden");
        }
        return false;
    }

    if view_data.prompt.is_some() {
        handle_prompt_key(grid, runtime, view_data, internal_tx, key);
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => return true,
        (KeyCode::Char('?'), _) => {
            view_data.help_visible = true;
            return false;
        }
        _ => {}
    }

    handle_table_key(grid, runtime, view_data, internal_tx, key);
    false
}

fn handle_table_key<G: Grid, R: GridRuntime>(
    grid: &mut G,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    let Some(command) = table_command_for_key(key) else {
        return false;
    };

    match apply_table_command(grid, runtime, view_data, command) {
        TableEvent::CursorUpdated | TableEvent::PromptOpened => {}
        TableEvent::Grid(events) => {
            report_grid_events(grid, runtime, view_data, internal_tx, events);
        }
        TableEvent::Status(status) => emit_status(view_data, internal_tx, status.message()),
    }
    true
}

fn table_command_for_key(key: KeyEvent) -> Option<TableCommand> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('d'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(TableCommand::MoveHalfPageDown)
        }
        (KeyCode::Char('u'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Some(TableCommand::MoveHalfPageUp)
        }
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(TableCommand::MoveRow(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(TableCommand::MoveRow(-1)),
        (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(TableCommand::MoveColumn(-1)),
        (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(TableCommand::MoveColumn(1)),
        (KeyCode::Char('g'), _) => Some(TableCommand::JumpFirstRow),
        (KeyCode::Char('G'), _) => Some(TableCommand::JumpLastRow),
        (KeyCode::Char('^'), _) => Some(TableCommand::JumpFirstColumn),
        (KeyCode::Char('$'), _) => Some(TableCommand::JumpLastColumn),
        (KeyCode::Char('n'), _) | (KeyCode::PageDown, _) => Some(TableCommand::NextPage),
        (KeyCode::Char('p'), _) | (KeyCode::PageUp, _) => Some(TableCommand::PrevPage),
        (KeyCode::Char('<'), _) | (KeyCode::Home, _) => Some(TableCommand::FirstPage),
        (KeyCode::Char('>'), _) | (KeyCode::End, _) => Some(TableCommand::LastPage),
        (KeyCode::Char('z'), _) => Some(TableCommand::CyclePageSize),
        (KeyCode::Char('s'), KeyModifiers::NONE) => Some(TableCommand::CycleSort),
        (KeyCode::Char('S'), _) => Some(TableCommand::ClearSort),
        (KeyCode::Char('c'), KeyModifiers::NONE) => Some(TableCommand::HideCurrentColumn),
        (KeyCode::Char('C'), _) => Some(TableCommand::ShowAllColumns),
        (KeyCode::Char(' '), _) => Some(TableCommand::ToggleRow),
        (KeyCode::Char('a'), KeyModifiers::NONE) => Some(TableCommand::TogglePageSelection),
        (KeyCode::Char('x'), KeyModifiers::NONE) => Some(TableCommand::ClearSelection),
        (KeyCode::Enter, _) => Some(TableCommand::ToggleExpanded),
        (KeyCode::Char('+'), _) => Some(TableCommand::ExpandAll),
        (KeyCode::Char('-'), _) => Some(TableCommand::CollapseAll),
        (KeyCode::Char('/'), _) => Some(TableCommand::OpenSearch),
        (KeyCode::Char('f'), KeyModifiers::NONE) => Some(TableCommand::EditColumnFilter),
        (KeyCode::Char('F'), _) => Some(TableCommand::ClearColumnFilter),
        (KeyCode::Char('R'), _) => Some(TableCommand::ClearAllFilters),
        (KeyCode::Char('e'), KeyModifiers::NONE) => Some(TableCommand::Export),
        _ => None,
    }
}

fn apply_table_command<G: Grid, R: GridRuntime>(
    grid: &mut G,
    runtime: &mut R,
    view_data: &mut ViewData,
    command: TableCommand,
) -> TableEvent<G::Id> {
    let view = grid.view();
    match command {
        TableCommand::MoveRow(delta) => {
            move_row(view_data, view.rows.len(), delta);
            TableEvent::CursorUpdated
        }
        TableCommand::MoveColumn(delta) => {
            move_col(view_data, view.columns.len(), delta);
            TableEvent::CursorUpdated
        }
        TableCommand::MoveHalfPageDown => {
            move_row(view_data, view.rows.len(), HALF_PAGE_ROWS);
            TableEvent::CursorUpdated
        }
        TableCommand::MoveHalfPageUp => {
            move_row(view_data, view.rows.len(), -HALF_PAGE_ROWS);
            TableEvent::CursorUpdated
        }
        TableCommand::JumpFirstRow => {
            view_data.selected_row = 0;
            TableEvent::CursorUpdated
        }
        TableCommand::JumpLastRow => {
            view_data.selected_row = view.rows.len().saturating_sub(1);
            TableEvent::CursorUpdated
        }
        TableCommand::JumpFirstColumn => {
            view_data.selected_col = 0;
            TableEvent::CursorUpdated
        }
        TableCommand::JumpLastColumn => {
            view_data.selected_col = view.columns.len().saturating_sub(1);
            TableEvent::CursorUpdated
        }
        TableCommand::NextPage => TableEvent::Grid(grid.dispatch(GridCommand::NextPage)),
        TableCommand::PrevPage => TableEvent::Grid(grid.dispatch(GridCommand::PrevPage)),
        TableCommand::FirstPage => TableEvent::Grid(grid.dispatch(GridCommand::FirstPage)),
        TableCommand::LastPage => TableEvent::Grid(grid.dispatch(GridCommand::LastPage)),
        TableCommand::CyclePageSize => TableEvent::Grid(
            grid.dispatch(GridCommand::SetPageSize(next_page_size(view.page_size))),
        ),
        TableCommand::CycleSort => match current_column(&view, view_data) {
            Some(column) => TableEvent::Grid(grid.dispatch(GridCommand::CycleSort(column.key.clone()))),
            None => TableEvent::Status(TableStatus::NoColumns),
        },
        TableCommand::ClearSort => TableEvent::Grid(grid.dispatch(GridCommand::ClearSort)),
        TableCommand::HideCurrentColumn => match current_column(&view, view_data) {
            Some(column) => {
                TableEvent::Grid(grid.dispatch(GridCommand::ToggleColumn(column.key.clone())))
            }
            None => TableEvent::Status(TableStatus::NoColumns),
        },
        TableCommand::ShowAllColumns => TableEvent::Grid(grid.dispatch(GridCommand::ShowAllColumns)),
        TableCommand::ToggleRow => match current_row(&view, view_data) {
            Some(row) => TableEvent::Grid(grid.dispatch(GridCommand::ToggleRow(row.id.clone()))),
            None => TableEvent::Status(TableStatus::NoRows),
        },
        TableCommand::TogglePageSelection => {
            if view.rows.is_empty() {
                return TableEvent::Status(TableStatus::NoRows);
            }
            let checked = view.check_state != CheckState::Checked;
            TableEvent::Grid(grid.dispatch(GridCommand::SelectPage(checked)))
        }
        TableCommand::ClearSelection => TableEvent::Grid(grid.dispatch(GridCommand::ClearSelection)),
        TableCommand::ToggleExpanded => match current_row(&view, view_data) {
            Some(row) => {
                TableEvent::Grid(grid.dispatch(GridCommand::ToggleExpanded(row.id.clone())))
            }
            None => TableEvent::Status(TableStatus::NoRows),
        },
        TableCommand::ExpandAll => TableEvent::Grid(grid.dispatch(GridCommand::ExpandAll)),
        TableCommand::CollapseAll => TableEvent::Grid(grid.dispatch(GridCommand::CollapseAll)),
        TableCommand::OpenSearch => {
            if !view.searchable {
                return TableEvent::Status(TableStatus::SearchUnavailable);
            }
            view_data.prompt = Some(Prompt {
                kind: PromptKind::Search,
                input: view.search.clone(),
                original: view.search.clone(),
            });
            TableEvent::PromptOpened
        }
        TableCommand::EditColumnFilter => edit_column_filter(grid, view_data, &view),
        TableCommand::ClearColumnFilter => match current_column(&view, view_data) {
            Some(column) => TableEvent::Grid(
                grid.dispatch(GridCommand::ClearColumnFilter(column.key.clone())),
            ),
            None => TableEvent::Status(TableStatus::NoColumns),
        },
        TableCommand::ClearAllFilters => {
            TableEvent::Grid(grid.dispatch(GridCommand::ClearAllFilters))
        }
        TableCommand::Export => TableEvent::Status(export_grid(grid, runtime)),
    }
}

fn move_row(view_data: &mut ViewData, rows: usize, delta: isize) {
    let last = rows.saturating_sub(1);
    view_data.selected_row = view_data
        .selected_row
        .saturating_add_signed(delta)
        .min(last);
}

fn move_col(view_data: &mut ViewData, columns: usize, delta: isize) {
    let last = columns.saturating_sub(1);
    view_data.selected_col = view_data
        .selected_col
        .saturating_add_signed(delta)
        .min(last);
}

fn current_row<'a, K>(view: &'a GridView<K>, view_data: &ViewData) -> Option<&'a ViewRow<K>> {
    view.rows.get(view_data.selected_row)
}

fn current_column<'a, K>(view: &'a GridView<K>, view_data: &ViewData) -> Option<&'a ColumnView> {
    view.columns.get(view_data.selected_col)
}

/// The offered size after `current`, wrapping to the smallest.
fn next_page_size(current: usize) -> usize {
    PAGE_SIZE_OPTIONS
        .iter()
        .copied()
        .find(|size| *size > current)
        .unwrap_or(PAGE_SIZE_OPTIONS[0])
}

/// Text filters open a prompt; boolean and select filters cycle through
/// their values and back to unset.
fn edit_column_filter<G: Grid>(
    grid: &mut G,
    view_data: &mut ViewData,
    view: &GridView<G::Id>,
) -> TableEvent<G::Id> {
    let Some(column) = current_column(view, view_data) else {
        return TableEvent::Status(TableStatus::NoColumns);
    };
    let Some(definition) = grid.columns().iter().find(|entry| entry.key == column.key) else {
        return TableEvent::Status(TableStatus::NoColumns);
    };
    if !definition.filterable {
        return TableEvent::Status(TableStatus::ColumnNotFilterable(column.header.clone()));
    }
    let filter_type = definition.filter_type;
    let choices = definition
        .filter_options
        .iter()
        .map(|option| option.value.clone())
        .collect::<Vec<Value>>();
    let current = grid.state().filters.get(&column.key).cloned();
    let key = column.key.clone();

    let next = match filter_type {
        FilterType::Text => {
            let input = match current {
                Some(FilterValue::Text(text)) => text,
                _ => String::new(),
            };
            view_data.prompt = Some(Prompt {
                kind: PromptKind::ColumnFilter {
                    key,
                    header: column.header.clone(),
                },
                input: input.clone(),
                original: input,
            });
            return TableEvent::PromptOpened;
        }
        FilterType::Boolean => match current {
            None => Some(FilterValue::Bool(true)),
            Some(FilterValue::Bool(true)) => Some(FilterValue::Bool(false)),
            Some(_) => None,
        },
        FilterType::Select => {
            let position = match &current {
                Some(FilterValue::Choice(value)) => {
                    choices.iter().position(|choice| choice == value)
                }
                _ => None,
            };
            let next = match position {
                Some(index) => choices.get(index + 1),
                None => choices.first(),
            };
            next.cloned().map(FilterValue::Choice)
        }
    };
    TableEvent::Grid(set_column_filter(grid, key, next))
}

fn set_column_filter<G: Grid>(
    grid: &mut G,
    key: String,
    value: Option<FilterValue>,
) -> Vec<GridEvent<G::Id>> {
    match value {
        Some(value) => grid.dispatch(GridCommand::SetColumnFilter { key, value }),
        None => grid.dispatch(GridCommand::ClearColumnFilter(key)),
    }
}

/// Search applies as the user types; text filters apply on enter.
fn handle_prompt_key<G: Grid, R: GridRuntime>(
    grid: &mut G,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(mut prompt) = view_data.prompt.take() else {
        return;
    };

    let events = match key.code {
        KeyCode::Esc => match prompt.kind {
            PromptKind::Search if grid.state().search != prompt.original => {
                grid.dispatch(GridCommand::SetSearch(prompt.original))
            }
            _ => Vec::new(),
        },
        KeyCode::Enter => match prompt.kind {
            PromptKind::Search => Vec::new(),
            PromptKind::ColumnFilter { key, .. } => {
                let value = (!prompt.input.is_empty()).then(|| FilterValue::Text(prompt.input));
                set_column_filter(grid, key, value)
            }
        },
        KeyCode::Backspace => {
            prompt.input.pop();
            let events = live_search(grid, &prompt);
            view_data.prompt = Some(prompt);
            events
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            prompt.input.push(ch);
            let events = live_search(grid, &prompt);
            view_data.prompt = Some(prompt);
            events
        }
        _ => {
            view_data.prompt = Some(prompt);
            Vec::new()
        }
    };
    report_grid_events(grid, runtime, view_data, internal_tx, events);
}

fn live_search<G: Grid>(grid: &mut G, prompt: &Prompt) -> Vec<GridEvent<G::Id>> {
    match prompt.kind {
        PromptKind::Search => grid.dispatch(GridCommand::SetSearch(prompt.input.clone())),
        PromptKind::ColumnFilter { .. } => Vec::new(),
    }
}

fn export_grid<G: Grid, R: GridRuntime>(grid: &G, runtime: &mut R) -> TableStatus {
    let Some(export) = grid.export() else {
        return TableStatus::ExportUnavailable;
    };
    match runtime.save_export(&export) {
        Ok(path) => TableStatus::Exported {
            rows: export.rows,
            path,
        },
        Err(error) => TableStatus::ExportFailed(format!("{error:#}")),
    }
}

/// Notifies the runtime of selection changes, keeps the cursor on the page
/// and summarises the events on the status line.
fn report_grid_events<G: Grid, R: GridRuntime>(
    grid: &G,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    events: Vec<GridEvent<G::Id>>,
) {
    clamp_cursor(&grid.view(), view_data);
    if events.is_empty() {
        return;
    }

    let mut messages = Vec::with_capacity(events.len());
    for event in &events {
        debug!("grid event: {event:?}");
        if matches!(event, GridEvent::SelectionChanged(_)) {
            let rows = grid.selected_rows();
            if let Err(error) = runtime.selection_changed(&rows) {
                messages.push(TableStatus::SelectionCallbackFailed(format!("{error:#}")).message());
            }
        }
        messages.push(grid_event_message(event));
    }
    emit_status(view_data, internal_tx, messages.join("; "));
}

fn grid_event_message<K>(event: &GridEvent<K>) -> String {
    match event {
        GridEvent::SearchChanged(term) if term.is_empty() => "search cleared".to_owned(),
        GridEvent::SearchChanged(term) => format!("search {term:?}"),
        GridEvent::FiltersChanged => "filters updated".to_owned(),
        GridEvent::ColumnsChanged => "columns updated".to_owned(),
        GridEvent::SortChanged => "sort updated".to_owned(),
        GridEvent::PageChanged(page) => format!("page {page}"),
        GridEvent::PageSizeChanged(size) => format!("{size} per page"),
        GridEvent::SelectionChanged(ids) => format!("{} selected", ids.len()),
        GridEvent::ExpansionChanged => "expansion updated".to_owned(),
        GridEvent::Rejected(reason) => reason.clone(),
    }
}

fn clamp_cursor<K>(view: &GridView<K>, view_data: &mut ViewData) {
    view_data.selected_row = view_data
        .selected_row
        .min(view.rows.len().saturating_sub(1));
    view_data.selected_col = view_data
        .selected_col
        .min(view.columns.len().saturating_sub(1));
}

fn render<K>(frame: &mut ratatui::Frame<'_>, view: &GridView<K>, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(view, view_data))
        .block(Block::default().title("gridline").borders(Borders::ALL));
    frame.render_widget(header, layout[0]);

    render_table(frame, layout[1], view, view_data);

    let footer = Paragraph::new(format!("{}\n{}", pager_text(view), status_text(view_data)))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, layout[2]);

    if view_data.help_visible {
        let area = centered_rect(80, 60, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table<K>(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    view: &GridView<K>,
    view_data: &ViewData,
) {
    let tree_index = tree_column_index(view);
    let sorted = view
        .columns
        .iter()
        .filter(|column| column.sort.is_some())
        .count();

    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let mut widths = Vec::with_capacity(view.columns.len() + 1);
    let mut header_cells = Vec::with_capacity(view.columns.len() + 1);
    if view.selectable {
        widths.push(Constraint::Length(3));
        header_cells.push(Cell::from(check_label(view.check_state)).style(header_style));
    }
    for column in &view.columns {
        widths.push(column.width.map_or(Constraint::Min(8), Constraint::Length));
        header_cells.push(Cell::from(header_label(column, sorted)).style(header_style));
    }

    let rows = view.rows.iter().enumerate().map(|(row_index, row)| {
        let selected_row = row_index == view_data.selected_row;
        let row_style = if selected_row {
            Style::default().bg(Color::DarkGray)
        } else {
            Style::default()
        };
        let mut cells = Vec::with_capacity(view.columns.len() + 1);
        if view.selectable {
            let mark = if row.selected { "[x]" } else { "[ ]" };
            cells.push(Cell::from(mark).style(row_style));
        }
        for column_index in 0..view.columns.len() {
            let style = if selected_row && column_index == view_data.selected_col {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                row_style
            };
            let text = cell_text(row, column_index, Some(column_index) == tree_index);
            cells.push(Cell::from(text).style(style));
        }
        Row::new(cells)
    });

    let table = Table::new(rows, widths)
        .header(Row::new(header_cells))
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(view))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

/// Where tree markers go: the flagged tree column, else the first column.
/// `None` for flat grids.
fn tree_column_index<K>(view: &GridView<K>) -> Option<usize> {
    if view.rows.iter().all(|row| row.tree.is_none()) {
        return None;
    }
    Some(
        view.columns
            .iter()
            .position(|column| column.tree_column)
            .unwrap_or(0),
    )
}

fn cell_text<K>(row: &ViewRow<K>, column_index: usize, tree_column: bool) -> String {
    let text = row.cells.get(column_index).cloned().unwrap_or_default();
    let Some(marker) = row.tree.filter(|_| tree_column) else {
        return text;
    };
    let mark = if !marker.has_children {
        " "
    } else if marker.expanded {
        EXPANDED_MARK
    } else {
        COLLAPSED_MARK
    };
    format!("{}{mark} {text}", TREE_INDENT.repeat(marker.level))
}

fn header_label(column: &ColumnView, sorted_columns: usize) -> String {
    let mut label = column.header.clone();
    if let Some((direction, rank)) = column.sort {
        if sorted_columns == 1 {
            label.push_str(match direction {
                SortDirection::Asc => " ↑",
                SortDirection::Desc => " ↓",
            });
        } else {
            label.push_str(match direction {
                SortDirection::Asc => " ▲",
                SortDirection::Desc => " ▼",
            });
            label.push_str(&rank.to_string());
        }
    }
    if column.filter.is_some() {
        label.push(' ');
        label.push_str(FILTER_MARK);
    }
    label
}

fn check_label(state: CheckState) -> &'static str {
    match state {
        CheckState::Unchecked => "[ ]",
        CheckState::Indeterminate => "[-]",
        CheckState::Checked => "[x]",
    }
}

fn table_title<K>(view: &GridView<K>) -> String {
    format!(
        " {} | page {}/{} ",
        view.title,
        view.page,
        view.total_pages.max(1)
    )
}

fn header_text<K>(view: &GridView<K>, view_data: &ViewData) -> String {
    let mut parts = Vec::new();
    match &view_data.prompt {
        Some(Prompt {
            kind: PromptKind::Search,
            input,
            ..
        }) => parts.push(format!("search> {input}_")),
        _ if view.searchable && !view.search.is_empty() => {
            parts.push(format!("search: {}", view.search));
        }
        _ => {}
    }
    if let Some(Prompt {
        kind: PromptKind::ColumnFilter { header, .. },
        input,
        ..
    }) = &view_data.prompt
    {
        parts.push(format!("{header}> {input}_"));
    }
    if !view.filters.is_empty() {
        let badges = view
            .filters
            .iter()
            .map(|(header, value)| format!("{header}={value}"))
            .collect::<Vec<_>>();
        parts.push(format!("filters: {}", badges.join(", ")));
    }
    if view.selectable && view.selected > 0 {
        parts.push(format!("{} selected", view.selected));
    }
    if parts.is_empty() {
        return view.title.clone();
    }
    parts.join(" | ")
}

/// Showing label, page buttons and page size. Edge buttons drop out at the
/// first and last page.
fn pager_text<K>(view: &GridView<K>) -> String {
    let mut parts = vec![view.showing.clone()];
    if view.show_pager {
        let buttons = view
            .page_window
            .iter()
            .map(|page| {
                if *page == view.page {
                    format!("[{page}]")
                } else {
                    page.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        let back = if view.page > 1 { "« ‹ " } else { "" };
        let forward = if view.page < view.total_pages {
            " › »"
        } else {
            ""
        };
        parts.push(format!("{back}{buttons}{forward}"));
    }
    parts.push(format!("{} per page", view.page_size));
    parts.join(" | ")
}

fn status_text(view_data: &ViewData) -> String {
    let (mode, hints) = match &view_data.prompt {
        None => (
            "NAV",
            "j/k/h/l g/G ^/$ | n/p </> z page | / search f/F/R filter | s/S sort | c/C cols | space/a/x select | enter/+/- tree | e export | ? help | q quit",
        ),
        Some(Prompt {
            kind: PromptKind::Search,
            ..
        }) => ("SEARCH", "type to search | enter keep | esc restore"),
        Some(Prompt {
            kind: PromptKind::ColumnFilter { .. },
            ..
        }) => ("FILTER", "type value | enter apply | esc cancel"),
    };
    match &view_data.status_line {
        Some(status) => format!("{mode} | {status} | {hints}"),
        None => format!("{mode} | {hints}"),
    }
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q or q quit | ? help\n\
move: j/k/h/l arrows | g/G first/last row | ^/$ first/last column | ctrl+d/u half page\n\
pages: n/p or pgdn/pgup next/prev | </> or home/end first/last | z page size\n\
search: / type to search | enter keep | esc restore\n\
filter: f edit column filter (text prompts, boolean and select cycle) | F clear column | R clear all\n\
sort: s cycle column asc/desc/off | S clear\n\
columns: c hide current | C show all\n\
select: space row | a current page | x clear\n\
tree: enter expand/collapse | + expand all | - collapse all\n\
export: e write csv of selected rows, else all matching rows"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
