//! Long task descriptions are easier to write in a real editor. The text
//! goes out with a short `#` comment footer and comes back with comments
//! and surrounding blank lines removed. Embedded newlines are kept; the
//! CSV quotes them and the grid shows them flattened.

use std::io::{self, Write as _};
use std::path::Path;
use std::process::{Command, ExitStatus};

use anyhow::{bail, Context, Result};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::prelude::*;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

const COMMENT: char = '#';

/// `$VISUAL`, falling back to `$EDITOR`.
fn editor_command() -> Result<String> {
    ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|cmd| !cmd.trim().is_empty())
        .context("neither $VISUAL nor $EDITOR is set")
}

fn compose_buffer(about: &str, text: &str) -> String {
    let mut buf = String::from(text);
    buf.push_str("\n\n");
    buf.push_str(&format!("{COMMENT} Task description for {about}.\n"));
    buf.push_str(&format!("{COMMENT} Lines starting with '{COMMENT}' are ignored.\n"));
    buf.push_str(&format!("{COMMENT} Save an empty description to keep the old text.\n"));
    buf
}

/// The description the user left in the buffer, or `None` if nothing but
/// comments and whitespace remains.
fn parse_buffer(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw
        .lines()
        .filter(|l| !l.trim_start().starts_with(COMMENT))
        .map(str::trim_end)
        .collect();
    let first = lines.iter().position(|l| !l.is_empty())?;
    let last = lines.iter().rposition(|l| !l.is_empty())?;
    Some(lines[first..=last].join("\n"))
}

/// Leave the alternate screen for the editor and come back whatever the
/// editor did.
fn run_suspended(terminal: &mut Term, editor: &str, path: &Path) -> Result<ExitStatus> {
    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    let status = Command::new(editor)
        .arg(path)
        .status()
        .with_context(|| format!("failed to run editor '{editor}'"));

    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal::enable_raw_mode()?;
    terminal.clear()?;
    status
}

/// Edit `text` in an external editor. `about` names the row being edited
/// in the comment footer. Returns `None` when the result is empty.
pub fn edit_description(terminal: &mut Term, about: &str, text: &str) -> Result<Option<String>> {
    let editor = editor_command()?;

    let mut tmp = tempfile::Builder::new()
        .prefix("dailytask-task-")
        .suffix(".txt")
        .tempfile()
        .context("failed to create temp file")?;
    tmp.write_all(compose_buffer(about, text).as_bytes())
        .and_then(|()| tmp.flush())
        .context("failed to write temp file")?;

    let status = run_suspended(terminal, &editor, tmp.path())?;
    if !status.success() {
        bail!("editor exited with status {status}");
    }

    let raw = std::fs::read_to_string(tmp.path())
        .context("failed to read temp file after editor closed")?;
    Ok(parse_buffer(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_buffer_returns_original_text() {
        let buf = compose_buffer("2024-05-01", "write report");
        assert_eq!(parse_buffer(&buf).as_deref(), Some("write report"));
    }

    #[test]
    fn footer_names_the_row() {
        let buf = compose_buffer("2024-05-01", "x");
        assert!(buf.contains("# Task description for 2024-05-01."));
    }

    #[test]
    fn comments_and_blank_edges_are_dropped() {
        let raw = "\n\n# note to self\nfirst line   \n\nsecond line\n\n# footer\n";
        assert_eq!(
            parse_buffer(raw).as_deref(),
            Some("first line\n\nsecond line")
        );
    }

    #[test]
    fn only_comments_is_none() {
        assert_eq!(parse_buffer("# a\n   \n  # b\n"), None);
        assert_eq!(parse_buffer(&compose_buffer("x", "")), None);
    }
}
