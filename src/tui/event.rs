use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{AddField, App, Mode};
use crate::model::Column;

/// Result of handling a key press.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Save,
    Submit,
    Reload,
    OpenEditor,
    Continue,
}

/// Handle a key press. Returns an action indicating what the event loop should do.
pub fn handle_key(app: &mut App, key: KeyEvent) -> KeyAction {
    if app.add_form.is_some() {
        return handle_add(app, key);
    }
    if app.edit.is_some() {
        return handle_edit(app, key);
    }

    match app.mode {
        Mode::Help => {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
                app.mode = Mode::Normal;
            }
            return KeyAction::Continue;
        }
        Mode::ConfirmQuit => {
            app.mode = Mode::Normal;
            return if matches!(key.code, KeyCode::Char('y') | KeyCode::Enter) {
                KeyAction::Quit
            } else {
                KeyAction::Continue
            };
        }
        Mode::Normal => {}
    }

    app.notice = None;
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => {
            if app.request_quit() {
                return KeyAction::Quit;
            }
        }
        KeyCode::Char('j') | KeyCode::Down => app.move_down(),
        KeyCode::Char('k') | KeyCode::Up => app.move_up(),
        KeyCode::Char('h') | KeyCode::Left | KeyCode::BackTab => app.move_left(),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Tab => app.move_right(),
        KeyCode::Enter | KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Char('o') => app.insert_row(),
        KeyCode::Char('x') => app.delete_row(),
        KeyCode::Char('s') => return KeyAction::Save,
        KeyCode::Char('a') => app.enter_add_mode(),
        KeyCode::Char('r') => return KeyAction::Reload,
        KeyCode::Char('?') => app.toggle_help(),
        _ => {}
    }
    KeyAction::Continue
}

fn handle_edit(app: &mut App, key: KeyEvent) -> KeyAction {
    let Some(edit) = app.edit.as_mut() else {
        return KeyAction::Continue;
    };
    match key.code {
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Enter => app.commit_edit(),
        KeyCode::Backspace => {
            edit.buffer.pop();
        }
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => match c {
            'u' => edit.buffer.clear(),
            'e' if edit.column == Column::Task => return KeyAction::OpenEditor,
            _ => {}
        },
        KeyCode::Char(c) => edit.buffer.push(c),
        _ => {}
    }
    KeyAction::Continue
}

fn handle_add(app: &mut App, key: KeyEvent) -> KeyAction {
    let Some(form) = app.add_form.as_mut() else {
        return KeyAction::Continue;
    };
    match key.code {
        KeyCode::Esc => {
            app.cancel_add_mode();
            return KeyAction::Continue;
        }
        KeyCode::Enter => return KeyAction::Submit,
        KeyCode::Tab => form.next_field(),
        KeyCode::BackTab => form.prev_field(),
        KeyCode::Up | KeyCode::Down => {
            let forward = key.code == KeyCode::Up;
            match form.focused {
                AddField::Status => form.cycle_status(forward),
                AddField::Date | AddField::Deadline => form.step_date(if forward { 1 } else { -1 }),
                AddField::Task => {}
            }
        }
        KeyCode::Left | KeyCode::Right if form.focused == AddField::Status => {
            form.cycle_status(key.code == KeyCode::Right);
        }
        KeyCode::Backspace => {
            if let Some(buf) = form.focused_buf_mut() {
                buf.pop();
            }
        }
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => match c {
            'u' => {
                if let Some(buf) = form.focused_buf_mut() {
                    buf.clear();
                }
            }
            'e' if form.focused == AddField::Task => return KeyAction::OpenEditor,
            _ => {}
        },
        KeyCode::Char(' ') if form.focused == AddField::Status => form.cycle_status(true),
        KeyCode::Char(c) => {
            if form.accepts(c) {
                if let Some(buf) = form.focused_buf_mut() {
                    buf.push(c);
                }
            }
        }
        _ => {}
    }
    form.error = None;
    KeyAction::Continue
}
