//! Console rendering: headers, panels, tables, menus.
//!
//! Purely presentational. Panels wrap body text to a fixed 80-column width;
//! table columns are sized to the widest of header and cells plus padding.
//! Widths are measured with unicode-width so CJK and emoji content lines up.

pub mod spinner;

use crossterm::style::Stylize;
use std::io::{self, BufRead, Write};
use unicode_width::UnicodeWidthStr;

/// Fixed wrap width for panels.
pub const PANEL_WIDTH: usize = 80;

/// Spaces appended to each table column beyond its content width.
const CELL_PADDING: usize = 2;

pub fn print_header(title: &str) {
    let rule = "━".repeat(PANEL_WIDTH);
    println!("{}", rule.as_str().dark_grey());
    println!("{}", title.bold().cyan());
    println!("{}", rule.as_str().dark_grey());
}

/// Word-wrap `text` to `width` columns. Words wider than the full width are
/// hard-split; blank lines are preserved.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw_line in text.lines() {
        if raw_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            let word_width = UnicodeWidthStr::width(word);
            let current_width = UnicodeWidthStr::width(current.as_str());
            if current.is_empty() {
                if word_width <= width {
                    current.push_str(word);
                } else {
                    hard_split(word, width, &mut lines, &mut current);
                }
            } else if current_width + 1 + word_width <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                if word_width <= width {
                    current.push_str(word);
                } else {
                    hard_split(word, width, &mut lines, &mut current);
                }
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Split an over-wide word into full-width chunks; the remainder becomes the
/// new current line.
fn hard_split(word: &str, width: usize, lines: &mut Vec<String>, current: &mut String) {
    let mut chunk = String::new();
    for c in word.chars() {
        let next_width = UnicodeWidthStr::width(chunk.as_str())
            + unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if next_width > width && !chunk.is_empty() {
            lines.push(std::mem::take(&mut chunk));
        }
        chunk.push(c);
    }
    *current = chunk;
}

/// Truncate a panel title to at most `width` columns, ending with an
/// ellipsis when cut.
fn fit_title(title: &str, width: usize) -> String {
    if UnicodeWidthStr::width(title) <= width {
        return title.to_string();
    }
    let mut out = String::new();
    for c in title.chars() {
        let next = UnicodeWidthStr::width(out.as_str())
            + unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if next > width.saturating_sub(1) {
            break;
        }
        out.push(c);
    }
    out.push('…');
    out
}

/// Render a bordered, fixed-width panel with wrapped body text.
pub fn print_panel(title: &str, body: &str) {
    let inner = PANEL_WIDTH;
    let title = fit_title(title, inner);
    println!("┌{}┐", "─".repeat(inner + 2));
    let title_pad = inner.saturating_sub(UnicodeWidthStr::width(title.as_str()));
    println!("│ {}{} │", title.as_str().bold(), " ".repeat(title_pad));
    println!("├{}┤", "─".repeat(inner + 2));
    for line in wrap_text(body, inner) {
        let pad = inner.saturating_sub(UnicodeWidthStr::width(line.as_str()));
        println!("│ {line}{} │", " ".repeat(pad));
    }
    println!("└{}┘", "─".repeat(inner + 2));
}

/// Width of each column: the widest of header and all cells, plus padding.
pub fn column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let cell_max = rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| UnicodeWidthStr::width(cell.as_str()))
                .max()
                .unwrap_or(0);
            UnicodeWidthStr::width(*header).max(cell_max) + CELL_PADDING
        })
        .collect()
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = column_widths(headers, rows);

    let mut header_line = String::new();
    for (header, width) in headers.iter().zip(&widths) {
        let pad = width.saturating_sub(UnicodeWidthStr::width(*header));
        header_line.push_str(header);
        header_line.push_str(&" ".repeat(pad));
    }
    println!("{}", header_line.as_str().bold());
    println!("{}", "─".repeat(widths.iter().sum::<usize>()).dark_grey());

    for row in rows {
        let mut line = String::new();
        for (i, width) in widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(UnicodeWidthStr::width(cell));
            line.push_str(cell);
            line.push_str(&" ".repeat(pad));
        }
        println!("{line}");
    }
}

/// Print a numbered menu of (choice, description) entries.
pub fn print_menu(title: &str, entries: &[(&str, &str)]) {
    println!();
    println!("{}", title.bold().cyan());
    for (i, (choice, description)) in entries.iter().enumerate() {
        println!("  {} {}  {description}", format!("{}.", i + 1).dark_grey(), choice.bold());
    }
}

/// Prompt on stdout and read one trimmed line from stdin. `None` on EOF.
pub fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{} ", prompt.bold().green());
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
