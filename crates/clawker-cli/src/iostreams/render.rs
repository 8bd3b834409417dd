//! List and detail output formatting.
//!
//! Column-aligned, borderless tables for `clawker ... list` commands plus
//! small helpers for headers, dividers, and key/value detail views. On a
//! TTY rows are space-padded and truncated to the terminal width; piped
//! output falls back to tab-separated fields so `cut -f` keeps working.

use super::color::ColorScheme;
use super::{IoStreams, StreamHandle};

/// Truncate to `width` display columns, ending in `...` when cut.
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    if width <= 3 {
        return s.chars().take(width).collect();
    }
    let head: String = s.chars().take(width - 3).collect();
    format!("{head}...")
}

type CellPainter = fn(&ColorScheme, &str) -> String;

struct Cell {
    text: String,
    painter: Option<CellPainter>,
}

/// Borderless table writer bound to `Out`.
pub struct TablePrinter {
    out: StreamHandle,
    scheme: ColorScheme,
    tty: bool,
    max_width: usize,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
    current: Vec<Cell>,
}

impl TablePrinter {
    fn new(out: StreamHandle, scheme: ColorScheme, tty: bool, max_width: usize) -> Self {
        Self {
            out,
            scheme,
            tty,
            max_width,
            headers: Vec::new(),
            rows: Vec::new(),
            current: Vec::new(),
        }
    }

    /// Set column headers, shown muted and uppercased on a TTY only.
    /// Piped output stays header-free so `cut -f` keeps working.
    ///
    /// Headers declare the table's columns; a table that never sets them
    /// renders nothing at all.
    pub fn header(&mut self, names: &[&str]) -> &mut Self {
        self.headers = names.iter().map(|n| n.to_uppercase()).collect();
        self
    }

    /// Append a plain field to the current row.
    pub fn field(&mut self, text: impl Into<String>) -> &mut Self {
        self.current.push(Cell {
            text: text.into(),
            painter: None,
        });
        self
    }

    /// Append a field painted with `painter` (only applied on a TTY).
    pub fn colored_field(&mut self, text: impl Into<String>, painter: CellPainter) -> &mut Self {
        self.current.push(Cell {
            text: text.into(),
            painter: Some(painter),
        });
        self
    }

    /// Terminate the current row.
    pub fn end_row(&mut self) -> &mut Self {
        self.rows.push(std::mem::take(&mut self.current));
        self
    }

    /// Render all rows.
    ///
    /// # Errors
    ///
    /// Returns the first write error from `Out`.
    pub fn render(&mut self) -> std::io::Result<()> {
        if !self.current.is_empty() {
            self.end_row();
        }
        // No declared columns means no output, rows or not.
        if self.headers.is_empty() || self.rows.is_empty() {
            return Ok(());
        }
        if !self.tty {
            for row in &self.rows {
                let line: Vec<&str> = row.iter().map(|c| c.text.as_str()).collect();
                self.out.write_line(&line.join("\t"))?;
            }
            return Ok(());
        }

        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(self.headers.len());
        let mut widths = vec![0usize; columns];
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.text.chars().count());
            }
        }
        for (i, header) in self.headers.iter().enumerate() {
            widths[i] = widths[i].max(header.chars().count());
        }
        // Let the last column absorb whatever space remains.
        let fixed: usize = widths[..columns.saturating_sub(1)]
            .iter()
            .map(|w| w + 2)
            .sum();
        let last_width = self.max_width.saturating_sub(fixed).max(3);

        let mut parts = Vec::with_capacity(self.headers.len());
        for (i, header) in self.headers.iter().enumerate() {
            let width = if i == columns - 1 {
                last_width
            } else {
                widths[i]
            };
            let text = truncate(header, width);
            parts.push(if i == columns - 1 {
                text
            } else {
                format!("{text:<width$}")
            });
        }
        self.out
            .write_line(&self.scheme.muted(parts.join("  ").trim_end()))?;

        for row in &self.rows {
            let mut parts = Vec::with_capacity(row.len());
            for (i, cell) in row.iter().enumerate() {
                let width = if i == columns - 1 {
                    last_width
                } else {
                    widths[i]
                };
                let text = truncate(&cell.text, width);
                let padded = if i == columns - 1 {
                    text
                } else {
                    format!("{text:<width$}")
                };
                parts.push(match cell.painter {
                    Some(paint) => paint(&self.scheme, &padded),
                    None => padded,
                });
            }
            self.out.write_line(parts.join("  ").trim_end())?;
        }
        Ok(())
    }
}

impl IoStreams {
    /// A table writer sized to the current terminal.
    pub fn table_printer(&self) -> TablePrinter {
        let (width, _) = self.terminal_size();
        TablePrinter::new(
            self.out().clone(),
            self.color_scheme(),
            self.is_output_tty(),
            width as usize,
        )
    }

    /// Bold section header on `Out`, with an optional muted subtitle line.
    pub fn print_header(&self, title: &str, subtitle: Option<&str>) {
        let scheme = self.color_scheme();
        let _ = self.out().write_line(&scheme.bold(title));
        if let Some(subtitle) = subtitle {
            let _ = self.out().write_line(&scheme.muted(subtitle));
        }
    }

    /// Muted horizontal divider, optionally labeled, on `Out`.
    pub fn print_divider(&self, label: Option<&str>) {
        let scheme = self.color_scheme();
        let (width, _) = self.terminal_size();
        let width = (width as usize).min(60);
        let line = match label {
            Some(label) => {
                let rest = width.saturating_sub(label.chars().count() + 3);
                format!("- {label} {}", "-".repeat(rest))
            }
            None => "-".repeat(width),
        };
        let _ = self.out().write_line(&scheme.muted(&line));
    }

    /// Aligned `key: value` block on `Out`.
    pub fn print_fields(&self, fields: &[(&str, String)]) {
        let scheme = self.color_scheme();
        let key_width = fields
            .iter()
            .map(|(k, _)| k.chars().count())
            .max()
            .unwrap_or(0);
        for (key, value) in fields {
            let padded = format!("{key:<key_width$}");
            let _ = self
                .out()
                .write_line(&format!("{}  {value}", scheme.muted(&padded)));
        }
    }

    /// One-line `BADGE  detail` state summary on `Out`.
    pub fn render_status(&self, state: &str, detail: &str) {
        let _ = self
            .out()
            .write_line(&format!("{}  {detail}", self.badge(state)));
    }

    /// `✗ message` on `ErrOut`, followed by muted remediation hints.
    pub fn render_error(&self, message: impl std::fmt::Display, hints: &[String]) {
        self.print_failure(message);
        let scheme = self.color_scheme();
        for hint in hints {
            let _ = self.err().write_line(&scheme.muted(hint));
        }
    }

    /// Short uppercase state badge, colored by meaning.
    pub fn badge(&self, state: &str) -> String {
        let scheme = self.color_scheme();
        let upper = state.to_uppercase();
        match state.to_lowercase().as_str() {
            "running" | "ready" | "up" => scheme.success(upper),
            "paused" | "restarting" | "pending" => scheme.warning(upper),
            "exited" | "dead" | "down" | "error" => scheme.error(upper),
            _ => scheme.muted(upper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::IoStreams;
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly-10", 10), "exactly-10");
        assert_eq!(truncate("much-too-long", 10), "much-to...");
        assert_eq!(truncate("abc", 2), "ab");
    }

    #[test]
    fn test_piped_table_is_tab_separated() {
        let (ios, handles) = IoStreams::test();
        let mut table = ios.table_printer();
        table
            .header(&["Name", "State"])
            .field("web")
            .field("running")
            .end_row()
            .field("db")
            .field("exited")
            .end_row();
        table.render().unwrap();
        assert_eq!(handles.out_string(), "web\trunning\ndb\texited\n");
    }

    #[test]
    fn test_tty_table_is_aligned() {
        let (ios, handles) = IoStreams::test();
        ios.probe().set_stdout_tty(true);
        ios.probe().set_terminal_size(80, 24);
        let mut table = ios.table_printer();
        table
            .header(&["Name", "State"])
            .field("web")
            .field("running")
            .end_row()
            .field("database")
            .field("exited")
            .end_row();
        table.render().unwrap();
        assert_eq!(
            handles.out_string(),
            "NAME      STATE\nweb       running\ndatabase  exited\n"
        );
    }

    #[test]
    fn test_tty_table_truncates_last_column() {
        let (ios, handles) = IoStreams::test();
        ios.probe().set_stdout_tty(true);
        ios.probe().set_terminal_size(20, 24);
        let mut table = ios.table_printer();
        table
            .header(&["Name", "Description"])
            .field("name")
            .field("a-description-that-cannot-possibly-fit")
            .end_row();
        table.render().unwrap();
        let out = handles.out_string();
        for line in out.lines() {
            assert!(line.chars().count() <= 20);
        }
        assert!(out.contains("..."));
    }

    #[test]
    fn test_headers_only_on_tty() {
        let (ios, handles) = IoStreams::test();
        let mut table = ios.table_printer();
        table
            .header(&["Name", "State"])
            .field("web")
            .field("running")
            .end_row();
        table.render().unwrap();
        // Piped output is header-free.
        assert_eq!(handles.out_string(), "web\trunning\n");

        let (ios, handles) = IoStreams::test();
        ios.probe().set_stdout_tty(true);
        ios.probe().set_terminal_size(80, 24);
        let mut table = ios.table_printer();
        table
            .header(&["Name", "State"])
            .field("web")
            .field("running")
            .end_row();
        table.render().unwrap();
        assert_eq!(handles.out_string(), "NAME  STATE\nweb   running\n");
    }

    #[test]
    fn test_table_without_headers_renders_nothing() {
        let (ios, handles) = IoStreams::test();
        let mut table = ios.table_printer();
        table.field("web").field("running").end_row();
        table.render().unwrap();
        assert_eq!(handles.out_string(), "");

        let (ios, handles) = IoStreams::test();
        ios.probe().set_stdout_tty(true);
        ios.probe().set_terminal_size(80, 24);
        let mut table = ios.table_printer();
        table.field("web").field("running").end_row();
        table.render().unwrap();
        assert_eq!(handles.out_string(), "");
    }

    #[test]
    fn test_print_fields_alignment() {
        let (ios, handles) = IoStreams::test();
        ios.print_fields(&[
            ("Name", "web".to_string()),
            ("Image", "clawker/agent:latest".to_string()),
        ]);
        assert_eq!(
            handles.out_string(),
            "Name   web\nImage  clawker/agent:latest\n"
        );
    }

    #[test]
    fn test_empty_fields_print_nothing() {
        let (ios, handles) = IoStreams::test();
        ios.print_fields(&[]);
        let mut table = ios.table_printer();
        table.render().unwrap();
        assert_eq!(handles.out_string(), "");
    }

    #[test]
    fn test_header_and_divider_plain() {
        let (ios, handles) = IoStreams::test();
        ios.print_header("Containers", None);
        ios.print_divider(Some("details"));
        ios.print_divider(None);
        let out = handles.out_string();
        assert!(out.starts_with("Containers\n- details -"));
        assert!(!out.contains('\u{1b}'));
    }

    #[test]
    fn test_header_with_subtitle() {
        let (ios, handles) = IoStreams::test();
        ios.print_header("Containers", Some("2 running, 1 exited"));
        assert_eq!(handles.out_string(), "Containers\n2 running, 1 exited\n");
    }

    #[test]
    fn test_render_status_line() {
        let (ios, handles) = IoStreams::test();
        ios.render_status("running", "monitor stack is up");
        assert_eq!(handles.out_string(), "RUNNING  monitor stack is up\n");
    }

    #[test]
    fn test_render_error_with_hints() {
        let (ios, handles) = IoStreams::test();
        ios.render_error(
            "no such container",
            &["Run 'clawker container list' to see names.".to_string()],
        );
        assert_eq!(
            handles.err_string(),
            "[error] no such container\nRun 'clawker container list' to see names.\n"
        );
        assert_eq!(handles.out_string(), "");
    }

    #[test]
    fn test_badge_uppercases() {
        let (ios, _handles) = IoStreams::test();
        assert_eq!(ios.badge("running"), "RUNNING");
        assert_eq!(ios.badge("exited"), "EXITED");
        assert_eq!(ios.badge("weird"), "WEIRD");
    }
}
