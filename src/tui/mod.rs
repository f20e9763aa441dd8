mod app;
mod editor;
mod event;
mod grid;

use std::io;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use crossterm::event::{self as ct_event, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;

use crate::store::TaskStore;
use crate::watch;
use app::App;
use event::KeyAction;

pub fn run(store: &TaskStore, done_statuses: Vec<String>, poll_interval: u64) -> Result<()> {
    let today = Local::now().date_naive();
    let mut app = App::new(store, done_statuses, today);

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, store, poll_interval);

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    store: &TaskStore,
    poll_interval: u64,
) -> Result<()> {
    let poll_duration = Duration::from_millis(poll_interval);

    let (_watcher, rx) = watch::watch_file(store.path())?;

    loop {
        terminal.draw(|frame| grid::render(frame, app))?;

        if ct_event::poll(poll_duration)? {
            if let Event::Key(key) = ct_event::read()? {
                if key.kind == KeyEventKind::Press {
                    match event::handle_key(app, key) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::Save => app.save(store),
                        KeyAction::Submit => app.submit_add(store),
                        KeyAction::Reload => match app.reload(store) {
                            Ok(()) => app.set_info("Reloaded"),
                            Err(e) => app.set_error(format!("{e:#}")),
                        },
                        KeyAction::OpenEditor => open_editor_for_focus(terminal, app),
                        KeyAction::Continue => {}
                    }
                }
            }
        }

        // Check for file changes (non-blocking)
        if watch::wait_for_change(&rx, Duration::ZERO) {
            watch::drain_events(&rx);
            app.on_external_change(store);
        }
    }
}

/// External editor for whichever task text is being edited: the add
/// form's task field or a grid cell in the task column.
fn open_editor_for_focus(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) {
    let (about, initial) = if let Some(form) = &app.add_form {
        (format!("a new task on {}", form.date), form.task.clone())
    } else if let Some(edit) = &app.edit {
        let date = app
            .rows
            .get(app.cursor)
            .map(|t| t.date.to_string())
            .unwrap_or_default();
        (format!("row {} ({date})", app.cursor + 1), edit.buffer.clone())
    } else {
        return;
    };

    match editor::edit_description(terminal, &about, &initial) {
        Ok(Some(content)) => {
            if let Some(form) = app.add_form.as_mut() {
                form.task = content;
                form.error = None;
            } else if let Some(edit) = app.edit.as_mut() {
                edit.buffer = content;
            }
        }
        Ok(None) => log::info!("editor returned an empty description; keeping the old text"),
        Err(e) => {
            log::warn!("external editor failed: {e:#}");
            if let Some(form) = app.add_form.as_mut() {
                form.error = Some(format!("{e:#}"));
            } else {
                app.set_error(format!("{e:#}"));
            }
        }
    }
}
