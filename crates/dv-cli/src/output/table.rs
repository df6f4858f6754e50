#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

impl TableOptions {
    /// Width from `COLUMNS`, color only when stdout is a terminal and
    /// `NO_COLOR` is unset.
    pub fn detect() -> Self {
        use std::io::IsTerminal;

        let max_width = std::env::var("COLUMNS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|width| *width > 0);
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self { max_width, color }
    }
}

/// Render a simple aligned table for string rows.
#[must_use]
pub fn render_rows(headers: &[&str], rows: &[Vec<String>], options: TableOptions) -> String {
    let mut widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
                .max(4)
        })
        .collect();

    fit_widths(&mut widths, headers, options.max_width);

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| format_cell(&truncate_text(header, *width), *width, false, 0))
        .collect::<Vec<_>>()
        .join("  ");

    let divider = "-".repeat(header_line.chars().count());

    let row_lines = rows.iter().map(|row| {
        widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let value = row.get(index).map_or("-", String::as_str);
                let truncated = truncate_text(value, *width);
                let numeric = looks_numeric(&truncated);
                let visible = truncated.chars().count();
                let cell = if options.color {
                    colorize_status(&truncated)
                } else {
                    truncated
                };
                format_cell(&cell, *width, numeric, visible)
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    });

    let mut lines = vec![header_line.trim_end().to_string(), divider];
    lines.extend(row_lines);
    lines.join("\n")
}

fn fit_widths(widths: &mut [usize], headers: &[&str], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };

    let separators = widths.len().saturating_sub(1) * 2;
    while widths.iter().sum::<usize>() + separators > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(idx, width)| **width > headers[*idx].len().max(4))
            .max_by_key(|(_, width)| **width)
            .map(|(idx, _)| idx);

        let Some(idx) = widest else {
            break;
        };
        widths[idx] -= 1;
    }
}

fn truncate_text(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }

    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn looks_numeric(value: &str) -> bool {
    let trimmed = value.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.'))
}

/// Pad `value` to `width` using its visible length (0 means "count it").
fn format_cell(value: &str, width: usize, numeric: bool, visible: usize) -> String {
    let visible = if visible == 0 {
        value.chars().count()
    } else {
        visible
    };
    let pad = " ".repeat(width.saturating_sub(visible));
    if numeric {
        format!("{pad}{value}")
    } else {
        format!("{value}{pad}")
    }
}

fn colorize_status(value: &str) -> String {
    let code = match value {
        "valid" | "applied" | "accepted" => Some("32"),
        "unknown" | "unchanged" | "noted" => Some("33"),
        "invalid" | "blocked" | "skipped" | "rejected" => Some("31"),
        _ => None,
    };

    match code {
        Some(code) => format!("\u{1b}[{code}m{value}\u{1b}[0m"),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{TableOptions, render_rows};

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[test]
    fn columns_align_across_rows() {
        let headers = ["id", "label", "status"];
        let rows = vec![
            vec!["4".into(), "Hunt".into(), "valid".into()],
            vec!["1200".into(), "Samuel Bamford".into(), "blocked".into()],
        ];

        let table = render_rows(&headers, &rows, PLAIN);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[1].chars().all(|c| c == '-'));
        let status_col = lines[0].find("status").expect("status header");
        assert_eq!(lines[3].find("blocked"), Some(status_col));
        assert!(lines[2].starts_with("   4"));
    }

    #[test]
    fn narrow_terminal_truncates_widest_column() {
        let headers = ["id", "label"];
        let rows = vec![vec!["1".into(), "a very long label that will not fit".into()]];

        let table = render_rows(
            &headers,
            &rows,
            TableOptions {
                max_width: Some(20),
                color: false,
            },
        );
        let row = table.lines().nth(2).expect("row line");
        assert!(row.chars().count() <= 20);
        assert!(row.ends_with('…'));
    }

    #[test]
    fn color_wraps_status_words_only() {
        let table = render_rows(
            &["status"],
            &[vec!["invalid".into()], vec!["other".into()]],
            TableOptions {
                max_width: None,
                color: true,
            },
        );
        assert!(table.contains("\u{1b}[31minvalid\u{1b}[0m"));
        assert!(table.contains("other"));
        assert!(!table.contains("\u{1b}[31mother"));
    }
}
