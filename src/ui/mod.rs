use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
};

use crate::app::{App, FormField, InputMode, PersistState, StatusLevel};
use crate::repo::TaskRepository;
use crate::store::TaskRow;
use crate::validate::validate_date;

pub fn run<R: TaskRepository>(mut app: App<R>, tick_rate: Duration) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut last_tick = Instant::now();
    let res = loop {
        if let Err(e) = terminal.draw(|f| draw(f, &app)) {
            break Err(e.into());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        match poll_key(timeout) {
            Ok(Some(code)) if handle_key(&mut app, code) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e),
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }
    };

    cleanup_terminal(&mut terminal)?;
    res
}

fn poll_key(timeout: Duration) -> Result<Option<KeyCode>> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind == KeyEventKind::Press
    {
        return Ok(Some(key.code));
    }
    Ok(None)
}

/// Applies one key press. Returns true when the user asked to quit.
fn handle_key<R: TaskRepository>(app: &mut App<R>, code: KeyCode) -> bool {
    match app.mode {
        InputMode::Normal => match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('j') | KeyCode::Down => app.select_next(),
            KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
            KeyCode::Char('a') | KeyCode::Char('n') => app.start_editing(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
            KeyCode::Char('s') => {
                app.save();
            }
            KeyCode::Char('r') => app.reload(),
            _ => {}
        },
        InputMode::Editing => match code {
            KeyCode::Esc => app.cancel_editing(),
            KeyCode::Enter => app.add_task(),
            KeyCode::Tab => app.form.focus = app.form.focus.next(),
            KeyCode::BackTab => app.form.focus = app.form.focus.previous(),
            KeyCode::Left if app.form.focus == FormField::Priority => {
                app.form.cycle_priority(false)
            }
            KeyCode::Right if app.form.focus == FormField::Priority => {
                app.form.cycle_priority(true)
            }
            KeyCode::Backspace => app.form.pop_char(),
            KeyCode::Char(c) => app.form.push_char(c),
            _ => {}
        },
    }

    false
}

fn draw<R: TaskRepository>(f: &mut ratatui::Frame, app: &App<R>) {
    let size = f.area();

    let form_height = match app.mode {
        InputMode::Normal => 3,
        InputMode::Editing => 5,
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(form_height),
        ])
        .split(size);

    f.render_widget(render_header(app), chunks[0]);

    let mut table_state = TableState::default();
    if !app.rows.is_empty() {
        table_state.select(Some(app.selected));
    }
    f.render_stateful_widget(render_table(&app.rows), chunks[1], &mut table_state);

    f.render_widget(render_footer(app), chunks[2]);
}

fn render_header<R: TaskRepository>(app: &App<R>) -> Paragraph<'static> {
    let mut spans = vec![
        Span::styled("taskman", Style::default().fg(Color::Cyan)),
        Span::raw("  |  "),
        Span::styled(
            format!("Tasks: {}", app.rows.len()),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  |  "),
        Span::raw(app.location()),
    ];
    let persist = match app.persist {
        PersistState::Idle => None,
        PersistState::Loaded => Some(("loaded", Color::Green)),
        PersistState::Saved => Some(("saved", Color::Green)),
        PersistState::LoadFailed => Some(("load failed", Color::Red)),
        PersistState::SaveFailed => Some(("save failed", Color::Red)),
    };
    if let Some((label, color)) = persist {
        spans.push(Span::raw("  |  "));
        spans.push(Span::styled(label, Style::default().fg(color)));
    }
    if app.dirty {
        spans.push(Span::styled(
            "  [unsaved]",
            Style::default().fg(Color::Magenta),
        ));
    }
    Paragraph::new(Line::from(spans))
        .block(Block::default().title("Overview").borders(Borders::ALL))
        .wrap(Wrap { trim: true })
}

fn priority_color(priority: &str) -> Color {
    match priority {
        "High" => Color::Red,
        "Medium" => Color::Yellow,
        "Low" => Color::Green,
        _ => Color::Gray,
    }
}

fn render_table(rows: &[TaskRow]) -> Table<'_> {
    let body = rows.iter().map(|row| {
        Row::new(vec![
            Cell::from(row.name.as_str()),
            Cell::from(Span::styled(
                row.priority.as_str(),
                Style::default().fg(priority_color(&row.priority)),
            )),
            Cell::from(row.due_date.as_str()),
        ])
    });

    Table::new(
        body,
        [
            Constraint::Min(20),
            Constraint::Length(10),
            Constraint::Length(12),
        ],
    )
    .header(
        Row::new(vec!["Task Name", "Priority", "Due Date"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(
        Block::default()
            .title("Tasks (j/k move ; a/n add ; d delete ; s save ; r reload ; q quit)")
            .borders(Borders::ALL),
    )
    .row_highlight_style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
    )
    .highlight_symbol("➤ ")
}

fn status_style(level: StatusLevel) -> Style {
    match level {
        StatusLevel::Info => Style::default(),
        StatusLevel::Warning => Style::default().fg(Color::Yellow),
        StatusLevel::Error => Style::default().fg(Color::Red),
    }
}

fn render_footer<R: TaskRepository>(app: &App<R>) -> Paragraph<'_> {
    match app.mode {
        InputMode::Normal => {
            let line = match &app.status {
                Some(status) => Line::styled(status.message.as_str(), status_style(status.level)),
                None => Line::raw("q quit ; a add ; s save ; r reload"),
            };
            Paragraph::new(line).block(Block::default().title("Normal").borders(Borders::ALL))
        }
        InputMode::Editing => {
            let form = &app.form;
            let field = |label: &'static str, value: &str, which: FormField| {
                let focused = form.focus == which;
                let style = if focused {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };
                let mut spans = vec![
                    Span::raw(label),
                    Span::styled(value.to_string(), style),
                ];
                if focused {
                    spans.push(Span::raw("█"));
                }
                Line::from(spans)
            };
            let priority = form
                .priority
                .map(|p| p.as_str())
                .unwrap_or("(←/→ or l/m/h)");
            let mut lines = vec![
                field("Task Name: ", &form.name, FormField::Name),
                field("Priority:  ", priority, FormField::Priority),
                field("Due Date:  ", &form.due_date, FormField::DueDate),
            ];
            if !form.due_date.is_empty() && !validate_date(form.due_date.trim()) {
                lines[2].spans.push(Span::styled(
                    "  (yyyy-mm-dd)",
                    Style::default().fg(Color::Red),
                ));
            }
            if let Some(status) = &app.status
                && status.level != StatusLevel::Info
            {
                lines[0].spans.push(Span::styled(
                    format!("   {}", status.message),
                    status_style(status.level),
                ));
            }
            Paragraph::new(lines).block(
                Block::default()
                    .title("New task (Tab next field ; Enter add ; Esc cancel)")
                    .borders(Borders::ALL),
            )
        }
    }
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
