//! Plain-text rendering of a view, used by `--print`.

use crate::schema::{CellFormat, ValueType};
use crate::table::CellValue;
use crate::view::TableView;

pub const LOADING_PLACEHOLDER: &str = "Loading results...";
pub const EMPTY_PLACEHOLDER: &str = "No matching rows";

/// Cell text as displayed, honoring the percent suffix setting.
pub fn cell_text(cell: &CellValue, format: CellFormat, percent_suffix: bool) -> String {
    if percent_suffix {
        cell.formatted(format)
    } else {
        cell.display()
    }
}

/// Render the visible rows as an aligned text table.
///
/// Numeric columns are right aligned. Columns are separated by two spaces
/// and lines carry no trailing whitespace.
pub fn render_text(view: &TableView, percent_suffix: bool) -> String {
    let headers = view.headers();
    let columns = &view.schema().columns;

    let body: Vec<Vec<String>> = view
        .rows()
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(i, c)| cell_text(row.cell(i), c.format, percent_suffix))
                .collect()
        })
        .collect();

    let titles: Vec<String> = headers.iter().map(|h| h.title()).collect();
    let widths: Vec<usize> = titles
        .iter()
        .enumerate()
        .map(|(i, t)| {
            body.iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(t.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_line = |cells: &[String]| -> String {
        let parts: Vec<String> = cells
            .iter()
            .zip(columns)
            .zip(&widths)
            .map(|((text, column), &width)| match column.value_type {
                ValueType::Numeric => format!("{:>width$}", text, width = width),
                ValueType::Text => format!("{:<width$}", text, width = width),
            })
            .collect();
        parts.join("  ").trim_end().to_string()
    };

    let mut out = format_line(&titles);
    out.push('\n');
    if view.is_loading() {
        out.push_str(LOADING_PLACEHOLDER);
        out.push('\n');
    } else if body.is_empty() {
        out.push_str(EMPTY_PLACEHOLDER);
        out.push('\n');
    } else {
        for row in &body {
            out.push_str(&format_line(row));
            out.push('\n');
        }
    }
    out
}
