//! Aligned text rendering of query results.

use std::fmt::Write as _;
use std::time::Duration;

use crate::{QueryOutcome, ResultSet};

/// Text shown for SQL NULL cells.
pub const NULL_TEXT: &str = "None";

fn cell_text(cell: Option<&String>) -> &str {
    cell.map_or(NULL_TEXT, String::as_str)
}

/// Display width of every column: the longest of the header and each cell.
#[must_use]
pub fn column_widths(set: &ResultSet) -> Vec<usize> {
    set.columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            set.rows
                .iter()
                .map(|row| cell_text(row.get(i).and_then(Option::as_ref)).chars().count())
                .fold(header.chars().count(), usize::max)
        })
        .collect()
}

fn separator(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line
}

fn padded_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = String::from("|");
    for (cell, width) in cells.zip(widths) {
        let _ = write!(line, " {cell:<width$} |");
    }
    line
}

/// Render a bordered table. Empty result sets render as an empty string.
#[must_use]
pub fn render_table(set: &ResultSet) -> String {
    if set.rows.is_empty() || set.columns.is_empty() {
        return String::new();
    }

    let widths = column_widths(set);
    let separator = separator(&widths);
    let mut out = String::new();

    out.push_str(&separator);
    out.push('\n');
    out.push_str(&padded_line(set.columns.iter().map(String::as_str), &widths));
    out.push('\n');
    out.push_str(&separator);
    out.push('\n');
    for row in &set.rows {
        let cells = (0..set.columns.len()).map(|i| cell_text(row.get(i).and_then(Option::as_ref)));
        out.push_str(&padded_line(cells, &widths));
        out.push('\n');
    }
    out.push_str(&separator);
    out.push('\n');
    out
}

/// One-line summary with row count and elapsed time.
#[must_use]
pub fn summary_line(outcome: &QueryOutcome, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    match outcome {
        QueryOutcome::Rows(set) if set.is_empty() => format!("Empty set ({secs:.3} sec)"),
        QueryOutcome::Rows(set) if set.len() == 1 => format!("1 row in set ({secs:.3} sec)"),
        QueryOutcome::Rows(set) => format!("{} rows in set ({secs:.3} sec)", set.len()),
        QueryOutcome::Affected { rows } => {
            format!("Query OK, {rows} rows affected ({secs:.3} sec)")
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(columns: &[&str], rows: Vec<Vec<Option<&str>>>) -> ResultSet {
        ResultSet::new(
            columns.iter().map(|c| (*c).to_owned()).collect(),
            rows.into_iter()
                .map(|r| r.into_iter().map(|c| c.map(str::to_owned)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_null_renders_as_none() {
        let result = set(&["a", "b"], vec![vec![Some("1"), None]]);
        let table = render_table(&result);
        assert_eq!(
            table,
            "+---+------+\n| a | b    |\n+---+------+\n| 1 | None |\n+---+------+\n"
        );
    }

    #[test]
    fn test_width_is_max_of_header_and_cells() {
        let result = set(&["id", "name"], vec![vec![Some("12345"), Some("x")], vec![None, None]]);
        assert_eq!(column_widths(&result), vec![5, 4]);
    }

    #[test]
    fn test_width_counts_chars_not_bytes() {
        let result = set(&["c"], vec![vec![Some("héllo")]]);
        assert_eq!(column_widths(&result), vec![5]);
    }

    #[test]
    fn test_rows_keep_result_order() {
        let result = set(&["n"], vec![vec![Some("3")], vec![Some("1")], vec![Some("2")]]);
        let table = render_table(&result);
        let body: Vec<&str> = table.lines().filter(|l| l.starts_with("| ") && !l.contains('n')).collect();
        assert_eq!(body, vec!["| 3 |", "| 1 |", "| 2 |"]);
    }

    #[test]
    fn test_empty_result_renders_nothing() {
        let result = set(&["a"], vec![]);
        assert_eq!(render_table(&result), "");
        assert_eq!(
            summary_line(&QueryOutcome::Rows(result), Duration::from_millis(4)),
            "Empty set (0.004 sec)"
        );
    }

    #[test]
    fn test_summary_lines() {
        let one = set(&["a"], vec![vec![Some("1")]]);
        let two = set(&["a"], vec![vec![Some("1")], vec![Some("2")]]);
        let elapsed = Duration::from_millis(1500);
        assert_eq!(summary_line(&QueryOutcome::Rows(one), elapsed), "1 row in set (1.500 sec)");
        assert_eq!(summary_line(&QueryOutcome::Rows(two), elapsed), "2 rows in set (1.500 sec)");
        assert_eq!(
            summary_line(&QueryOutcome::Affected { rows: 7 }, elapsed),
            "Query OK, 7 rows affected (1.500 sec)"
        );
    }
}
