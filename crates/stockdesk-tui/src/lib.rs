// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs, Wrap};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use stockdesk_app::{
    AddField, AddForm, AppCommand, AppState, Backend, CategoryList, ConfirmStatus, DismissTicket,
    EditField, Editor, FormController, Notice, Severity, TabKind, VIEW_COLUMNS, ViewRow,
    confirm_view, edit_view,
};
use tracing::{debug, info};

const STATUS_CLEAR_DELAY: Duration = Duration::from_secs(4);
const FIELD_LABEL_WIDTH: usize = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    DismissEditor { token: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct TableUiState {
    edit_row: usize,
    confirm_row: usize,
}

impl TableUiState {
    fn selected(&self, tab: TabKind) -> usize {
        match tab {
            TabKind::Confirm => self.confirm_row,
            TabKind::Add | TabKind::Edit => self.edit_row,
        }
    }

    fn select(&mut self, tab: TabKind, row: usize) {
        match tab {
            TabKind::Confirm => self.confirm_row = row,
            TabKind::Add | TabKind::Edit => self.edit_row = row,
        }
    }

    fn clamp(&mut self, len: usize) {
        let last = len.saturating_sub(1);
        self.edit_row = self.edit_row.min(last);
        self.confirm_row = self.confirm_row.min(last);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ViewData {
    tables: TableUiState,
    editor_field: EditField,
    status_token: u64,
}

impl Default for ViewData {
    fn default() -> Self {
        Self {
            tables: TableUiState::default(),
            editor_field: EditField::MainOffice,
            status_token: 0,
        }
    }
}

pub fn run_app<B: Backend>(state: &mut AppState, controller: &mut FormController<B>) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    controller.load_all();
    info!(
        records = controller.records().len(),
        categories = controller.categories().codes().len(),
        "initial load finished"
    );

    let mut result = Ok(());
    loop {
        process_internal_events(state, controller, &mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, controller, &view_data)) {
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
                    if handle_key_event(state, controller, &mut view_data, &internal_tx, key) {
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

fn process_internal_events<B: Backend>(
    state: &mut AppState,
    controller: &mut FormController<B>,
    view_data: &mut ViewData,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                state.dispatch(AppCommand::ClearStatus);
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::DismissEditor { token } => {
                if controller.dismiss_editor(token) {
                    debug!(token, "editor dismissed");
                    view_data.tables.clamp(controller.records().len());
                }
            }
        }
    }
}

fn schedule(internal_tx: &Sender<InternalEvent>, delay: Duration, event: InternalEvent) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(delay);
        let _ = sender.send(event);
    });
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    schedule(
        internal_tx,
        STATUS_CLEAR_DELAY,
        InternalEvent::ClearStatus { token },
    );
}

fn schedule_editor_dismiss(internal_tx: &Sender<InternalEvent>, ticket: DismissTicket) {
    schedule(
        internal_tx,
        ticket.delay,
        InternalEvent::DismissEditor {
            token: ticket.token,
        },
    );
}

fn emit_status(
    state: &mut AppState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(AppCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Returns true when the app should quit.
fn handle_key_event<B: Backend>(
    state: &mut AppState,
    controller: &mut FormController<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    // The alert blocks everything until acknowledged.
    if controller.alert().is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            controller.acknowledge_alert();
        }
        return false;
    }

    if controller.editor().is_some() {
        handle_editor_key(controller, view_data, internal_tx, key);
        return false;
    }

    if let Some(tab) = tab_for_function_key(key.code) {
        state.dispatch(AppCommand::SelectTab(tab));
        return false;
    }

    match state.active_tab {
        TabKind::Add => handle_add_key(state, controller, key),
        TabKind::Edit | TabKind::Confirm => {
            handle_table_key(state, controller, view_data, internal_tx, key);
        }
    }
    false
}

fn tab_for_function_key(code: KeyCode) -> Option<TabKind> {
    match code {
        KeyCode::F(1) => Some(TabKind::Add),
        KeyCode::F(2) => Some(TabKind::Edit),
        KeyCode::F(3) => Some(TabKind::Confirm),
        _ => None,
    }
}

fn handle_add_key<B: Backend>(
    state: &mut AppState,
    controller: &mut FormController<B>,
    key: KeyEvent,
) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('n') if ctrl => {
            if controller.toggle_new_category() {
                state.dispatch(AppCommand::FocusField(AddField::NewCategory));
            }
        }
        KeyCode::Char('p') if ctrl => {
            if controller.toggle_new_product() {
                state.dispatch(AppCommand::FocusField(AddField::NewProduct));
            }
        }
        KeyCode::Down | KeyCode::Tab => move_add_focus(state, controller.add_form(), 1),
        KeyCode::Up | KeyCode::BackTab => move_add_focus(state, controller.add_form(), -1),
        KeyCode::Left if state.add_focus == AddField::Category => controller.cycle_category(-1),
        KeyCode::Right if state.add_focus == AddField::Category => controller.cycle_category(1),
        KeyCode::Enter => {
            if controller.submit_add() {
                state.dispatch(AppCommand::FocusField(AddField::MainOffice));
            }
        }
        KeyCode::Esc => controller.clear_add_notice(),
        KeyCode::Backspace => {
            if let Some(text) = controller.add_form_mut().text_mut(state.add_focus) {
                text.pop();
            }
        }
        KeyCode::Char(ch) if !ctrl => {
            if let Some(text) = controller.add_form_mut().text_mut(state.add_focus) {
                text.push(ch);
            }
        }
        _ => {}
    }
    sync_add_focus(state, controller.add_form());
}

fn move_add_focus(state: &mut AppState, form: &AddForm, delta: isize) {
    let fields = form.active_fields();
    if fields.is_empty() {
        return;
    }
    let current = fields
        .iter()
        .position(|field| *field == state.add_focus)
        .unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(fields.len() as isize) as usize;
    state.dispatch(AppCommand::FocusField(fields[next]));
}

/// Keeps focus on a reachable field after a panel opens or closes.
fn sync_add_focus(state: &mut AppState, form: &AddForm) {
    let fields = form.active_fields();
    if fields.contains(&state.add_focus) {
        return;
    }
    let sibling = match state.add_focus {
        AddField::Category => AddField::NewCategory,
        AddField::NewCategory => AddField::Category,
        AddField::Product => AddField::NewProduct,
        AddField::NewProduct => AddField::Product,
        other => other,
    };
    let focus = if fields.contains(&sibling) {
        sibling
    } else {
        AddField::MainOffice
    };
    state.dispatch(AppCommand::FocusField(focus));
}

fn table_rows<B: Backend>(tab: TabKind, controller: &FormController<B>) -> Vec<ViewRow> {
    let records = controller.records().records();
    match tab {
        TabKind::Confirm => confirm_view(records),
        TabKind::Add | TabKind::Edit => edit_view(records),
    }
}

fn handle_table_key<B: Backend>(
    state: &mut AppState,
    controller: &mut FormController<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let tab = state.active_tab;
    let rows = table_rows(tab, controller);
    let selected = view_data.tables.selected(tab);

    match key.code {
        KeyCode::Tab => {
            state.dispatch(AppCommand::NextTab);
        }
        KeyCode::BackTab => {
            state.dispatch(AppCommand::PrevTab);
        }
        KeyCode::Char('j') | KeyCode::Down => move_selection(view_data, tab, rows.len(), 1),
        KeyCode::Char('k') | KeyCode::Up => move_selection(view_data, tab, rows.len(), -1),
        KeyCode::Char('g') | KeyCode::Home => view_data.tables.select(tab, 0),
        KeyCode::Char('G') | KeyCode::End => {
            view_data.tables.select(tab, rows.len().saturating_sub(1));
        }
        KeyCode::Esc => controller.clear_tables_notice(),
        KeyCode::Char('r') => {
            if controller.refresh_records() {
                let message = format!("{} entries loaded", controller.records().len());
                emit_status(state, view_data, internal_tx, message);
            }
        }
        KeyCode::Enter | KeyCode::Char('e') if tab == TabKind::Edit => {
            if let Some(row) = rows.get(selected)
                && controller.open_editor(row.key)
            {
                view_data.editor_field = EditField::MainOffice;
            }
        }
        KeyCode::Enter | KeyCode::Char('c') if tab == TabKind::Confirm => {
            if let Some(row) = rows.get(selected)
                && let Some(status) = row.action.target_status()
                && controller.set_confirm(row.key, status)
            {
                let message = format!("entry {} {}", row.key, status.label());
                emit_status(state, view_data, internal_tx, message);
            }
        }
        _ => {}
    }
    view_data.tables.clamp(controller.records().len());
}

fn move_selection(view_data: &mut ViewData, tab: TabKind, len: usize, delta: isize) {
    if len == 0 {
        return;
    }
    let current = view_data.tables.selected(tab) as isize;
    let next = (current + delta).clamp(0, len as isize - 1) as usize;
    view_data.tables.select(tab, next);
}

fn handle_editor_key<B: Backend>(
    controller: &mut FormController<B>,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    if key.code == KeyCode::Esc {
        controller.close_editor();
        return;
    }
    let Some(editor) = controller.editor_mut() else {
        return;
    };
    // Saved; waiting for the timed close.
    if editor.dismiss_pending {
        return;
    }

    let field = view_data.editor_field;
    match key.code {
        KeyCode::Tab | KeyCode::Down => view_data.editor_field = step_edit_field(field, 1),
        KeyCode::BackTab | KeyCode::Up => view_data.editor_field = step_edit_field(field, -1),
        KeyCode::Left | KeyCode::Right | KeyCode::Char(' ') if field == EditField::Confirm => {
            editor.form.confirm = editor.form.confirm.toggled();
        }
        KeyCode::Enter => {
            if let Some(ticket) = controller.submit_update() {
                schedule_editor_dismiss(internal_tx, ticket);
            }
        }
        KeyCode::Backspace => {
            if let Some(text) = editor.form.text_mut(field) {
                text.pop();
            }
        }
        KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            if let Some(text) = editor.form.text_mut(field) {
                text.push(ch);
            }
        }
        _ => {}
    }
}

fn step_edit_field(field: EditField, delta: isize) -> EditField {
    let fields = EditField::ALL;
    let current = fields
        .iter()
        .position(|candidate| *candidate == field)
        .unwrap_or(0) as isize;
    let next = (current + delta).rem_euclid(fields.len() as isize) as usize;
    fields[next]
}

fn render<B: Backend>(
    frame: &mut ratatui::Frame<'_>,
    state: &AppState,
    controller: &FormController<B>,
    view_data: &ViewData,
) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = TabKind::ALL
        .iter()
        .position(|tab| *tab == state.active_tab)
        .unwrap_or(0);
    let tab_titles = TabKind::ALL
        .iter()
        .map(|tab| tab_title(*tab, controller))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("stockdesk").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(layout[1]);
    match state.active_tab {
        TabKind::Add => {
            let form = Paragraph::new(
                add_form_lines(controller.add_form(), controller.categories(), state.add_focus)
                    .join("\n"),
            )
            .block(
                Block::default()
                    .title(TabKind::Add.label())
                    .borders(Borders::ALL),
            );
            frame.render_widget(form, body[0]);
            render_notice(frame, body[1], controller.add_notice());
        }
        TabKind::Edit | TabKind::Confirm => {
            let rows = table_rows(state.active_tab, controller);
            render_records_table(
                frame,
                body[0],
                state.active_tab,
                &rows,
                view_data.tables.selected(state.active_tab),
            );
            render_notice(frame, body[1], controller.tables_notice());
        }
    }

    let status_widget = Paragraph::new(status_text(state, controller))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if let Some(editor) = controller.editor() {
        let area = centered_rect(60, 50, frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default()
            .title(format!("edit entry {}", editor.form.key))
            .borders(Borders::ALL)
            .style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let parts = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);
        let fields = Paragraph::new(editor_lines(editor, view_data.editor_field).join("\n"));
        frame.render_widget(fields, parts[0]);
        render_notice(frame, parts[1], editor.notice.as_ref());
    }

    if let Some(alert) = controller.alert() {
        let area = centered_rect(50, 25, frame.area());
        frame.render_widget(Clear, area);
        let alert = Paragraph::new(format!("{alert}\n\nenter to dismiss"))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title("error")
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Red)),
            );
        frame.render_widget(alert, area);
    }
}

fn tab_title<B: Backend>(tab: TabKind, controller: &FormController<B>) -> String {
    let records = controller.records();
    match tab {
        TabKind::Add => format!("F1 {}", tab.label()),
        TabKind::Edit => format!("F2 {} ({})", tab.label(), records.len()),
        TabKind::Confirm => format!(
            "F3 {} ({} pending)",
            tab.label(),
            records.pending_count()
        ),
    }
}

fn add_form_lines(form: &AddForm, categories: &CategoryList, focus: AddField) -> Vec<String> {
    let mut lines = Vec::new();
    for field in AddField::ALL {
        let value = match field {
            AddField::NewCategory if !form.category.new_panel_open => continue,
            AddField::NewProduct if !form.product.new_panel_open => continue,
            AddField::Product if form.product.new_panel_open => continue,
            AddField::Category if form.category.selector_locked() => {
                "(locked while adding a new category)".to_owned()
            }
            AddField::Category => format!(
                "< {} >",
                form.category
                    .selected
                    .as_deref()
                    .unwrap_or("select a category")
            ),
            AddField::NewCategory => {
                format!("{}{}", categories.next_prefix(), form.category.new_name)
            }
            AddField::Product => format!("{}{}", form.product.prefix, form.product.value),
            AddField::NewProduct => {
                format!("{}{}", form.product.new_prefix, form.product.new_name)
            }
            other => form.text(other).to_owned(),
        };
        let marker = if field == focus { ">" } else { " " };
        lines.push(format!(
            "{marker} {:<width$} {value}",
            field.label(),
            width = FIELD_LABEL_WIDTH
        ));
    }
    lines
}

fn editor_lines(editor: &Editor, focus: EditField) -> Vec<String> {
    let mut lines = EditField::ALL
        .iter()
        .map(|field| {
            let value = match field {
                EditField::Confirm => match editor.form.confirm {
                    ConfirmStatus::Confirmed => "[x] Yes".to_owned(),
                    ConfirmStatus::Pending => "[ ] No".to_owned(),
                },
                other => editor.form.text(*other).to_owned(),
            };
            let marker = if *field == focus { ">" } else { " " };
            format!(
                "{marker} {:<width$} {value}",
                field.label(),
                width = FIELD_LABEL_WIDTH
            )
        })
        .collect::<Vec<_>>();
    lines.push(String::new());
    lines.push(if editor.dismiss_pending {
        "saved, closing".to_owned()
    } else {
        "enter save | esc cancel".to_owned()
    });
    lines
}

fn render_records_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    tab: TabKind,
    rows: &[ViewRow],
    selected: usize,
) {
    let header = Row::new(VIEW_COLUMNS.iter().map(|label| {
        Cell::from(*label).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
    }));

    let body = rows.iter().enumerate().map(|(index, row)| {
        let mut style = Style::default();
        if row.status == ConfirmStatus::Pending {
            style = style.fg(Color::Yellow);
        }
        if index == selected {
            style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        }
        Row::new(row.cells().into_iter().map(Cell::from)).style(style)
    });

    let widths = [Constraint::Min(8); VIEW_COLUMNS.len()];
    let table = Table::new(body, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(tab.label()).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_notice(frame: &mut ratatui::Frame<'_>, area: Rect, notice: Option<&Notice>) {
    let Some(notice) = notice else {
        return;
    };
    let color = match notice.severity {
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Danger => Color::Red,
    };
    let widget = Paragraph::new(notice.text.as_str()).style(Style::default().fg(color));
    frame.render_widget(widget, area);
}

fn status_text<B: Backend>(state: &AppState, controller: &FormController<B>) -> String {
    let hints = if controller.alert().is_some() {
        "enter dismiss"
    } else if controller.editor().is_some() {
        "tab field | space toggle confirmed | enter save | esc close"
    } else {
        match state.active_tab {
            TabKind::Add => {
                "tab field | ←/→ category | ctrl+n new category | ctrl+p new product | enter submit | F1-F3 | ctrl+q"
            }
            TabKind::Edit => "j/k move | enter edit | r refresh | esc clear | tab/F1-F3 | ctrl+q",
            TabKind::Confirm => "j/k move | enter confirm/reverse | r refresh | esc clear | tab/F1-F3 | ctrl+q",
        }
    };
    match &state.status_line {
        Some(status) => format!("{status} | {hints}"),
        None => hints.to_owned(),
    }
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
