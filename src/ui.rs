use std::io::{self, Write};

use colored::*;
use jiff::civil::Date;

use crate::models::{store::Store, task::Task};
use crate::views::CompletedEntry;

/// Get the terminal width, defaulting to 80 if unavailable
fn get_terminal_width() -> usize {
    term_size::dimensions().map(|(w, _)| w).unwrap_or(80)
}

/// Get the appropriate status glyph for a task
pub fn get_status_glyph(task: &Task, is_overdue: bool) -> ColoredString {
    if task.completed_at.is_some() {
        "✓".dimmed()
    } else if is_overdue {
        "●".red()
    } else {
        "○".normal()
    }
}

/// Build the context string for a task: project, due date, assignee.
/// Unresolvable references simply drop out of the line.
pub fn get_task_context(task: &Task, store: &Store, today: Date) -> String {
    let mut parts = vec![];

    if let Some(project) = store.get_project(task.project_id) {
        parts.push(project.name.clone());
    }

    parts.push(format!("due {}", format_date(task.due_date, today)));

    if let Some(assignee) = task.assignee_id.and_then(|id| store.get_user(id)) {
        parts.push(assignee.name.clone());
    }

    parts.join("  ·  ")
}

/// Render a single task line with glyph, title, and right-aligned context
pub fn render_task_line(task: &Task, store: &Store, today: Date, is_overdue: bool) {
    let terminal_width = get_terminal_width();

    let glyph = get_status_glyph(task, is_overdue);
    let title = &task.title;

    let left_section = format!("  {}  {}", glyph, title);

    let styled_left = if task.completed_at.is_some() {
        left_section.dimmed()
    } else {
        left_section.bold()
    };

    let right_section = get_task_context(task, store, today);

    if !right_section.is_empty() {
        let left_visible_len = format!("  {}  {}", " ", title).len();
        let right_visible_len = right_section.chars().count();
        let total_content = left_visible_len + right_visible_len;

        if total_content + 4 < terminal_width {
            let padding = terminal_width - total_content - 2;
            println!("{}{}{}", styled_left, " ".repeat(padding), right_section.dimmed());
        } else {
            // Not enough space for right alignment, just print normally
            println!("{}", styled_left);
        }
    } else {
        println!("{}", styled_left);
    }
}

/// Render one completed-report entry. An unresolved assignee prints the
/// literal "N/A" marker, as does a missing completion stamp.
pub fn render_report_entry(entry: &CompletedEntry<'_>, today: Date) {
    let completed_on = entry
        .task
        .completed_at
        .map(|at| format_completion_date(at, today))
        .unwrap_or_else(|| String::from("N/A"));

    println!("  {}  {}", "✓".green(), entry.task.title.bold());
    println!(
        "     {}",
        format!(
            "Completed by: {} on {}",
            entry.completed_by.unwrap_or("N/A"),
            completed_on
        )
        .dimmed()
    );
}

/// Format a date relative to today (e.g., "Today", "Yesterday", "Feb 15")
pub fn format_date(date: Date, today: Date) -> String {
    if date == today {
        "Today".to_string()
    } else if date == today.yesterday().expect("yesterday should be valid") {
        "Yesterday".to_string()
    } else if date == today.tomorrow().expect("tomorrow should be valid") {
        "Tomorrow".to_string()
    } else {
        date.strftime("%b %d").to_string()
    }
}

/// Format a completion timestamp for display
pub fn format_completion_date(timestamp: jiff::Timestamp, today: Date) -> String {
    let zoned = jiff::Zoned::new(timestamp, jiff::tz::TimeZone::system());
    format_date(zoned.date(), today)
}

/// Render a view header with title and count
pub fn render_view_header(title: &str, count: usize) {
    let task_word = if count == 1 { "task" } else { "tasks" };
    println!("\n  {} ({} {})\n", title.cyan().bold(), count, task_word);
}

/// Render a section header (e.g., "Overdue", "Due Today")
pub fn render_section_header(title: &str) {
    println!("\n  ─── {} ───\n", title.bold());
}

/// Check if a task should render as overdue
pub fn is_overdue(task: &Task, today: Date) -> bool {
    task.completed_at.is_none() && task.due_date < today
}

/// Interactive y/N gate in front of every destructive operation. Anything
/// but an explicit "y" declines.
pub fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    input.trim().eq_ignore_ascii_case("y")
}
