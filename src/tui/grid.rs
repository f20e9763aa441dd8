use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};

use super::app::{AddField, App, Mode};
use crate::model::Column;

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    render_grid(frame, app, chunks[0]);
    render_status(frame, app, chunks[1]);

    match app.mode {
        Mode::Help => render_help(frame),
        Mode::ConfirmQuit => render_confirm_quit(frame),
        Mode::Normal => {}
    }
    if app.add_form.is_some() {
        render_add_dialog(frame, app);
    }
}

fn render_grid(frame: &mut Frame, app: &mut App, area: Rect) {
    let header = Row::new(
        Column::ALL
            .iter()
            .map(|c| Cell::from(c.title()).style(Style::default().bold())),
    )
    .style(Style::default().fg(Color::Cyan));

    let rows: Vec<Row> = app
        .rows
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let row_style = if app.is_done(task) {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            let cells = Column::ALL.iter().map(|&column| {
                let selected = i == app.cursor && column == app.column;
                match (&app.edit, selected) {
                    (Some(edit), true) => Cell::from(format!("{}_", flatten(&edit.buffer)))
                        .style(Style::default().fg(Color::Black).bg(Color::Yellow)),
                    (None, true) => Cell::from(flatten(&task.cell(column)))
                        .style(Style::default().add_modifier(Modifier::REVERSED)),
                    _ => Cell::from(flatten(&task.cell(column))),
                }
            });
            Row::new(cells).style(row_style)
        })
        .collect();

    let widths = [
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Length(16),
        Constraint::Length(12),
    ];
    let title = if app.dirty {
        " Tasks [modified] "
    } else {
        " Tasks "
    };
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().bg(Color::DarkGray));

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

const EDIT_HINT: &str = "Enter: commit  Esc: cancel  C-u: clear  C-e: editor (task)";
const NORMAL_HINT: &str =
    "a: add  Enter: edit  o: new row  x: delete  s: save  r: reload  ?: help  q: quit";

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let hint_style = Style::default().fg(Color::DarkGray);
    let paragraph = match &app.notice {
        Some(n) if n.is_error => {
            Paragraph::new(n.text.as_str()).style(Style::default().fg(Color::Red))
        }
        Some(n) => Paragraph::new(n.text.as_str()).style(Style::default().fg(Color::Green)),
        None if app.edit.is_some() => Paragraph::new(EDIT_HINT).style(hint_style),
        None => Paragraph::new(NORMAL_HINT).style(hint_style),
    };
    frame.render_widget(paragraph, area);
}

/// Grid cells are one line high.
fn flatten(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn render_field(
    frame: &mut Frame,
    label: &str,
    value: &str,
    focused: bool,
    chunks: &[Rect],
    idx: &mut usize,
) {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).bold()
    } else {
        Style::default()
    };
    frame.render_widget(Paragraph::new(label).style(label_style), chunks[*idx]);
    *idx += 1;

    let cursor = if focused { "_" } else { "" };
    frame.render_widget(
        Paragraph::new(format!("  {}{cursor}", flatten(value)))
            .style(Style::default().fg(Color::White)),
        chunks[*idx],
    );
    *idx += 1;
}

fn render_add_dialog(frame: &mut Frame, app: &App) {
    let form = match &app.add_form {
        Some(f) => f,
        None => return,
    };

    let term = frame.area();
    let width = 60.min(term.width.saturating_sub(4));
    let content_rows: u16 = 9 + u16::from(form.error.is_some()); // 4*(label+input) + hint
    let height = (content_rows + 2).min(term.height.saturating_sub(2));
    let area = centered_rect(width, height, term);

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Add / Update Task ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut constraints = vec![Constraint::Length(1); 8];
    if form.error.is_some() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1)); // hint
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    let mut idx = 0;
    render_field(
        frame,
        "Date (YYYY-MM-DD):",
        &form.date,
        form.focused == AddField::Date,
        &chunks,
        &mut idx,
    );
    render_field(
        frame,
        "Task description:",
        &form.task,
        form.focused == AddField::Task,
        &chunks,
        &mut idx,
    );
    render_field(
        frame,
        "Status:",
        &format!("< {} >", form.status()),
        form.focused == AddField::Status,
        &chunks,
        &mut idx,
    );
    render_field(
        frame,
        "Deadline (YYYY-MM-DD):",
        &form.deadline,
        form.focused == AddField::Deadline,
        &chunks,
        &mut idx,
    );

    if let Some(err) = &form.error {
        frame.render_widget(
            Paragraph::new(err.as_str()).style(Style::default().fg(Color::Red)),
            chunks[idx],
        );
        idx += 1;
    }

    frame.render_widget(
        Paragraph::new("Enter: save  Tab: fields  Up/Down: +/-1 day, status  Esc: cancel")
            .style(Style::default().fg(Color::DarkGray)),
        chunks[idx],
    );
}

fn render_confirm_quit(frame: &mut Frame) {
    let term = frame.area();
    let width = 50.min(term.width.saturating_sub(4));
    let height = 5.min(term.height.saturating_sub(2));
    let area = centered_rect(width, height, term);
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Quit ")
        .border_style(Style::default().fg(Color::Yellow));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text = vec![
        Line::raw("The grid has unsaved changes."),
        Line::raw(""),
        Line::from(vec![
            Span::raw("Discard them and quit? "),
            Span::styled("y", Style::default().fg(Color::Green).bold()),
            Span::raw("/"),
            Span::styled("n", Style::default().fg(Color::Red).bold()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

fn render_help(frame: &mut Frame) {
    let term = frame.area();
    let width = 52.min(term.width.saturating_sub(4));
    let height = 22.min(term.height.saturating_sub(2));
    let area = centered_rect(width, height, term);

    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(k, Style::default().fg(Color::Cyan)),
            Span::raw(desc),
        ])
    };
    let help_text = vec![
        key("j/k     ", "Move down/up"),
        key("h/l     ", "Move left/right"),
        key("Enter/e ", "Edit cell"),
        key("o       ", "Insert blank row"),
        key("x       ", "Delete row"),
        key("s       ", "Save grid to file"),
        key("a       ", "Add / update task"),
        key("r       ", "Reload from file"),
        key("?       ", "Toggle help"),
        key("q/Esc   ", "Quit"),
        Line::raw(""),
        Line::from(vec![Span::styled("Editing a cell:", Style::default().bold())]),
        key("  Enter     ", "Commit"),
        key("  Esc       ", "Cancel"),
        key("  C-u       ", "Clear"),
        key("  C-e       ", "Open $VISUAL/$EDITOR (task column)"),
        Line::raw(""),
        Line::from(vec![Span::styled("Add dialog:", Style::default().bold())]),
        key("  Tab/S-Tab ", "Next/prev field"),
        key("  Up/Down   ", "Step date / cycle status"),
    ];

    frame.render_widget(Paragraph::new(help_text), inner);
}
