use crate::model::{Column, Task};

fn icon(task: &Task, done_statuses: &[String]) -> &'static str {
    if task.is_done(done_statuses) {
        "x"
    } else {
        "."
    }
}

/// Plain-text table for `dailytask list`, columns padded to the widest cell.
pub fn format_task_list(tasks: &[Task], done_statuses: &[String]) -> String {
    if tasks.is_empty() {
        return String::new();
    }

    let mut widths = [0usize; 4];
    for task in tasks {
        for column in Column::ALL {
            let len = task.cell(column).chars().count();
            widths[column.index()] = widths[column.index()].max(len);
        }
    }

    let mut out = String::new();
    for task in tasks {
        let mut line = format!("{} ", icon(task, done_statuses));
        for column in Column::ALL {
            let cell = single_line(&task.cell(column));
            if column == Column::Deadline {
                line.push_str(&cell);
            } else {
                let pad = widths[column.index()].saturating_sub(cell.chars().count());
                line.push_str(&cell);
                line.push_str(&" ".repeat(pad + 2));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}
