//! Case-insensitive substring search over a table's searchable columns.

use crate::table::{CellValue, Table};

/// Indices of the rows matching `query`, in table order.
///
/// A row matches when the lowercased query occurs in the lowercased display
/// text of any searchable column. An empty query keeps every row; missing
/// cells never match. Unknown column identifiers are ignored.
pub fn filter(table: &Table, query: &str, searchable: &[&str]) -> Vec<usize> {
    if query.is_empty() {
        return (0..table.len()).collect();
    }
    let needle = query.to_lowercase();
    let columns: Vec<usize> = searchable
        .iter()
        .filter_map(|id| table.column_index(id).ok())
        .collect();

    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            columns.iter().any(|&c| match row.cell(c) {
                CellValue::Missing => false,
                cell => cell.display().to_lowercase().contains(&needle),
            })
        })
        .map(|(i, _)| i)
        .collect()
}
