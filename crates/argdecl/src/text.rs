//! Plain-text layout helpers for help output.

pub const INDENT: &str = "    ";
pub const DELIMITER: &str = "    ";

/// Prefix every line with [`INDENT`].
pub fn indent<I>(lines: I) -> impl Iterator<Item = String>
where
    I: IntoIterator<Item = String>,
{
    lines.into_iter().map(|line| format!("{INDENT}{line}"))
}

/// Two-column table: the left column is padded to its widest cell.
pub fn table(rows: &[(String, String)]) -> Vec<String> {
    let width = rows
        .iter()
        .map(|(left, _)| left.chars().count())
        .max()
        .unwrap_or(0);
    rows.iter()
        .map(|(left, right)| {
            format!("{left:<width$}{DELIMITER}{right}")
                .trim_end()
                .to_string()
        })
        .collect()
}
