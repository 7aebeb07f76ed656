//! Terminal output for API responses.

use std::fmt::Write as _;

use colored::{ColoredString, Colorize};

use nssp_client::{ApiResponse, Table, status};

/// Colors a status line by class: green for 2xx, yellow for 3xx/4xx, red
/// otherwise.
pub fn status_line(code: u16) -> ColoredString {
    let line = format!("{code} {}", status::describe(code));
    match code {
        200..=299 => line.green().bold(),
        300..=499 => line.yellow().bold(),
        _ => line.red().bold(),
    }
}

pub fn print_response(response: &ApiResponse) {
    println!("{}", status_line(response.status));
    println!("{} {}", "url:".dimmed(), response.url);

    let mut headers: Vec<_> = response.headers.iter().collect();
    headers.sort();
    for (name, value) in headers {
        println!("{} {value}", format!("{name}:").cyan());
    }

    println!("{} {} bytes", "body:".dimmed(), response.body.len());
}

pub fn print_absent(url: &str) {
    eprintln!("{} {url}", "no data from".yellow());
}

/// Renders `table` as aligned columns, showing at most `limit` rows.
pub fn render_table(table: &Table, limit: Option<usize>) -> String {
    let shown = limit.map_or(table.len(), |limit| limit.min(table.len()));
    let rows = &table.rows[..shown];

    let columns = table
        .headers
        .len()
        .max(rows.iter().map(Vec::len).max().unwrap_or(0));
    let mut widths = vec![0; columns];
    for (i, header) in table.headers.iter().enumerate() {
        widths[i] = header.chars().count();
    }
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let mut out = String::new();
    if !table.headers.is_empty() {
        let _ = writeln!(out, "{}", join_padded(&table.headers, &widths));
    }
    for row in rows {
        let _ = writeln!(out, "{}", join_padded(row, &widths));
    }
    if shown < table.len() {
        let _ = writeln!(out, "... {} more rows", table.len() - shown);
    }
    out
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn table() -> Table {
        Table::new(
            vec!["date".to_string(), "count".to_string()],
            vec![
                vec!["2024-01-01".to_string(), "3".to_string()],
                vec!["2024-01-02".to_string(), "12".to_string()],
                vec!["2024-01-03".to_string(), "7".to_string()],
            ],
        )
    }

    #[test]
    fn test_render_aligns_columns() {
        let out = render_table(&table(), None);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "date        count");
        assert_eq!(lines[1], "2024-01-01  3");
        assert_eq!(lines[2], "2024-01-02  12");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_render_respects_limit() {
        let out = render_table(&table(), Some(1));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "... 2 more rows");
    }

    #[test]
    fn test_render_ragged_rows() {
        let table = Table::new(
            vec!["a".to_string()],
            vec![vec!["1".to_string(), "extra".to_string()]],
        );
        let out = render_table(&table, None);
        assert_eq!(out.lines().nth(1).unwrap(), "1  extra");
    }

    #[test]
    fn test_status_line_text() {
        colored::control::set_override(false);
        assert_eq!(status_line(404).to_string(), "404 Not Found");
        assert_eq!(status_line(799).to_string(), "799 unknown");
    }
}
