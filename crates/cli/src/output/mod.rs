//! Output formatting module for todoql
//!
//! Provides table formatting and display utilities for CLI output.

use chrono::{DateTime, Utc};
use todoql_db::{Comment, OwnerCount, Todo, TodoConnection, TodoStats};

/// Maximum width for the title column before truncation
const MAX_TITLE_WIDTH: usize = 40;

/// Maximum width for the owner column before truncation
const MAX_OWNER_WIDTH: usize = 16;

/// Maximum width for comment text before truncation
const MAX_COMMENT_WIDTH: usize = 60;

/// Truncate a string to the specified maximum width, adding ellipsis if needed.
fn truncate(s: &str, max_width: usize) -> String {
    let len = s.chars().count();
    if len <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let head: String = s.chars().take(max_width - 3).collect();
        format!("{}...", head)
    }
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(|| "-".to_string(), |d| d.format("%Y-%m-%d").to_string())
}

/// Format todos into an aligned table string.
///
/// Produces output in the format:
/// ```text
/// ID                Done  Priority  Due         Owner  Title
/// ----------------  ----  --------  ----------  -----  ------------------
/// 0193a4c2e1000000  no    HIGH      2024-12-20  john   Complete tutorial
/// ```
///
/// Returns "No todos found." for an empty slice.
pub fn format_todo_table(todos: &[Todo]) -> String {
    if todos.is_empty() {
        return "No todos found.".to_string();
    }

    let headers = ["ID", "Done", "Priority", "Due", "Owner", "Title"];

    let rows: Vec<[String; 6]> = todos
        .iter()
        .map(|t| {
            [
                t.id.to_string(),
                if t.completed { "yes" } else { "no" }.to_string(),
                t.priority.as_str().to_string(),
                format_date(t.due_date),
                truncate(&t.owner_id, MAX_OWNER_WIDTH),
                truncate(&t.title, MAX_TITLE_WIDTH),
            ]
        })
        .collect();

    // Calculate column widths based on content
    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_row(&mut output, &headers, &widths);

    let separator = widths.map(|w| "-".repeat(w));
    let separator: Vec<&str> = separator.iter().map(String::as_str).collect();
    push_row(&mut output, &separator, &widths);

    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_row(&mut output, &cells, &widths);
    }

    // Remove trailing newline
    output.pop();

    output
}

/// Append one left-aligned row; the last column is not padded.
fn push_row(output: &mut String, cells: &[&str], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i == last {
            output.push_str(cell);
        } else {
            output.push_str(&format!("{:<width$}  ", cell, width = width));
        }
    }
    output.push('\n');
}

/// Format a page of todos with its pagination summary.
pub fn format_connection(page: &TodoConnection) -> String {
    let todos: Vec<Todo> = page.nodes().cloned().collect();
    let mut output = format_todo_table(&todos);

    output.push_str(&format!(
        "\n\nShowing {} of {} todos.",
        page.edges.len(),
        page.total_count
    ));
    if page.page_info.has_next_page
        && let Some(cursor) = &page.page_info.end_cursor
    {
        output.push_str(&format!(" Next page: --after {}", cursor));
    }

    output
}

/// Format a single todo as labelled fields.
pub fn format_todo_detail(todo: &Todo) -> String {
    let mut output = String::new();
    output.push_str(&format!("ID:        {}\n", todo.id));
    output.push_str(&format!("Title:     {}\n", todo.title));
    output.push_str(&format!(
        "Status:    {}\n",
        if todo.completed { "done" } else { "pending" }
    ));
    output.push_str(&format!("Priority:  {}\n", todo.priority));
    output.push_str(&format!("Due:       {}\n", format_date(todo.due_date)));
    output.push_str(&format!("Owner:     {}\n", todo.owner_id));
    output.push_str(&format!(
        "Created:   {}",
        todo.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output
}

/// Detail view followed by the number of comments on the todo.
pub fn format_todo_detail_with_comments(todo: &Todo, comment_count: u64) -> String {
    let mut output = format_todo_detail(todo);
    output.push_str(&format!("\nComments:  {}", comment_count));
    output
}

/// Format comments as an aligned table, oldest first.
///
/// Returns "No comments found." for an empty slice.
pub fn format_comment_table(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return "No comments found.".to_string();
    }

    let headers = ["ID", "User", "Created", "Text"];
    let rows: Vec<[String; 4]> = comments
        .iter()
        .map(|c| {
            [
                c.id.to_string(),
                truncate(&c.user_id, MAX_OWNER_WIDTH),
                c.created_at.format("%Y-%m-%d %H:%M").to_string(),
                truncate(&c.text, MAX_COMMENT_WIDTH),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut output = String::new();
    push_row(&mut output, &headers, &widths);
    let separator = widths.map(|w| "-".repeat(w));
    let separator: Vec<&str> = separator.iter().map(String::as_str).collect();
    push_row(&mut output, &separator, &widths);
    for row in &rows {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        push_row(&mut output, &cells, &widths);
    }
    output.pop();
    output
}

/// One line per owner with its todo count
pub fn format_owner_counts(counts: &[OwnerCount]) -> String {
    if counts.is_empty() {
        return "No todos found.".to_string();
    }
    let width = counts
        .iter()
        .map(|c| c.owner_id.chars().count())
        .max()
        .unwrap_or(0);
    counts
        .iter()
        .map(|c| format!("{:<width$}  {}", c.owner_id, c.count, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format statistics as a summary block followed by a priority breakdown.
pub fn format_stats(stats: &TodoStats) -> String {
    let mut output = String::new();
    output.push_str(&format!("Total:      {}\n", stats.total));
    output.push_str(&format!("Completed:  {}\n", stats.completed));
    output.push_str(&format!("Pending:    {}\n", stats.pending));
    output.push_str(&format!("Overdue:    {}\n", stats.overdue));
    output.push_str("\nBy priority:");
    for pc in &stats.by_priority {
        output.push_str(&format!("\n  {:<8}  {}", pc.priority.as_str(), pc.count));
    }
    output
}
