//! Terminal output helpers.
//!
//! `Table` renders `resbuild list` output with box-drawing borders, fitting
//! the widest column to the terminal when needed.

use colored::*;
use console::{Term, measure_text_width, truncate_str};

pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        if row.len() == self.headers.len() {
            self.rows.push(row);
        }
    }

    fn column_widths(&self, max_width: usize) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(measure_text_width(cell));
            }
        }

        // borders + one space of padding on each side of every cell
        let overhead = 3 + 3 * widths.len();
        while overhead + widths.iter().sum::<usize>() > max_width {
            let (idx, &widest) = match widths.iter().enumerate().max_by_key(|(_, w)| **w) {
                Some(found) => found,
                None => break,
            };
            if widest <= 8 {
                break;
            }
            widths[idx] -= 1;
        }
        widths
    }

    pub fn render(&self, max_width: usize) -> String {
        if self.headers.is_empty() {
            return String::new();
        }
        let widths = self.column_widths(max_width);

        let sep = |left: &str, mid: &str, right: &str| -> String {
            let cells: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("  {}{}{}\n", left, cells.join(mid), right)
        };
        let line = |cells: &[String], bold: bool| -> String {
            let mut s = String::from("  │");
            for (cell, &width) in cells.iter().zip(&widths) {
                let text = truncate_str(cell, width, "...").to_string();
                let pad = width.saturating_sub(measure_text_width(&text));
                let text = if bold { text.bold().to_string() } else { text };
                s.push_str(&format!(" {}{} │", text, " ".repeat(pad)));
            }
            s.push('\n');
            s
        };

        let mut out = sep("┌", "┬", "┐");
        out.push_str(&line(&self.headers, true));
        out.push_str(&sep("├", "┼", "┤"));
        for row in &self.rows {
            out.push_str(&line(row, false));
        }
        out.push_str(&sep("└", "┴", "┘"));
        out
    }

    pub fn print(&self) {
        let (_, term_width) = Term::stdout().size();
        print!("{}", self.render(term_width as usize));
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_table() {
        colored::control::set_override(false);
        let mut table = Table::new(&["ID", "Path"]);
        table.add_row(vec!["0".to_string(), "icons/a.svg".to_string()]);
        table.add_row(vec!["bad".to_string()]);

        let text = table.render(80);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "  │ ID │ Path        │");
        assert_eq!(lines[3], "  │ 0  │ icons/a.svg │");
    }

    #[test]
    fn test_render_shrinks_to_width() {
        colored::control::set_override(false);
        let mut table = Table::new(&["Path"]);
        table.add_row(vec!["x".repeat(60)]);
        let text = table.render(30);
        assert!(text.lines().all(|l| measure_text_width(l) <= 30));
        assert!(text.contains("..."));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(20), "20 B");
        assert_eq!(format_size(2048), "2.0 KiB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MiB");
    }
}
