//! Type-aware stable ordering of table rows on a single column.

use feruca::Collator;
use std::cell::RefCell;
use std::cmp::Ordering;
use tracing::trace;

use crate::error::ViewError;
use crate::table::{CellValue, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    /// Header indicator for the active column.
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Rank used when the two cells are of different kinds.
fn kind_rank(cell: &CellValue) -> u8 {
    match cell {
        CellValue::Number(_) => 0,
        CellValue::Text(_) => 1,
        CellValue::Missing => 2,
    }
}

thread_local! {
    // Collation tables are built on first use and reused by every compare
    static COLLATOR: RefCell<Collator> = RefCell::new(Collator::default());
}

/// Locale-aware text ordering using the Unicode Collation Algorithm with
/// the CLDR root tailoring. Accents and case are secondary to the base
/// letters; strings that still tie put lowercase first.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    COLLATOR
        .with(|collator| collator.borrow_mut().collate(a, b))
        .then_with(|| b.cmp(a))
}

/// Ascending comparison of two cells.
///
/// Numbers compare numerically and text by [`compare_text`]. Any other pair
/// orders by kind: numbers, then text, then missing cells.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Number(x), CellValue::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (CellValue::Text(x), CellValue::Text(y)) => compare_text(x, y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

/// Order `rows` (indices into `table`) by `column`.
///
/// The sort is stable, so rows with equal keys keep their relative input
/// order in both directions.
pub fn sort(
    table: &Table,
    rows: &[usize],
    column: &str,
    direction: SortDirection,
) -> Result<Vec<usize>, ViewError> {
    let col = table.column_index(column)?;
    let mut sorted = rows.to_vec();
    sorted.sort_by(|&a, &b| {
        let ord = compare_cells(table.cell(a, col), table.cell(b, col));
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    trace!(column, ?direction, rows = sorted.len(), "sorted rows");
    Ok(sorted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableSchema;
    use serde_json::json;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_toggle() {
        assert_eq!(SortDirection::Ascending.toggle(), SortDirection::Descending);
        assert_eq!(SortDirection::Descending.toggle(), SortDirection::Ascending);
        assert_eq!(SortDirection::default(), SortDirection::Ascending);
    }

    #[test]
    fn test_compare_numbers() {
        assert_eq!(
            compare_cells(&CellValue::Number(2.0), &CellValue::Number(10.0)),
            Ordering::Less
        );
        assert_eq!(
            compare_cells(&CellValue::Number(-1.5), &CellValue::Number(-1.5)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_compare_text_is_case_insensitive() {
        assert_eq!(compare_cells(&text("amy"), &text("Bob")), Ordering::Less);
        assert_eq!(compare_cells(&text("Zed"), &text("adam")), Ordering::Greater);
        assert_eq!(compare_cells(&text("a"), &text("A")), Ordering::Less);
        assert_eq!(compare_cells(&text("Amy"), &text("Amy")), Ordering::Equal);
    }

    #[test]
    fn test_compare_text_accents_follow_base_letter() {
        assert_eq!(compare_text("Édmonton", "Florida"), Ordering::Less);
        assert_eq!(compare_text("Zurich", "Édmonton"), Ordering::Greater);
        assert_eq!(compare_text("Ellis", "Élise"), Ordering::Greater);
    }

    #[test]
    fn test_mixed_kinds_total_order() {
        assert_eq!(compare_cells(&CellValue::Number(99.0), &text("1")), Ordering::Less);
        assert_eq!(compare_cells(&text("x"), &CellValue::Missing), Ordering::Less);
        assert_eq!(
            compare_cells(&CellValue::Missing, &CellValue::Number(0.0)),
            Ordering::Greater
        );
        assert_eq!(
            compare_cells(&CellValue::Missing, &CellValue::Missing),
            Ordering::Equal
        );
    }

    #[test]
    fn test_sort_stable_on_ties() {
        let values = vec![
            vec![json!("team"), json!("wins")],
            vec![json!("A"), json!("2")],
            vec![json!("B"), json!("1")],
            vec![json!("C"), json!("2")],
            vec![json!("D"), json!("1")],
        ];
        let table = Table::from_values(&TableSchema::teams(), &values);
        let rows: Vec<usize> = (0..table.len()).collect();

        let asc = sort(&table, &rows, "wins", SortDirection::Ascending).unwrap();
        assert_eq!(asc, vec![1, 3, 0, 2]);
        let desc = sort(&table, &rows, "wins", SortDirection::Descending).unwrap();
        assert_eq!(desc, vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_sort_unknown_column() {
        let table = Table::empty(&TableSchema::teams());
        assert_eq!(
            sort(&table, &[], "bogus", SortDirection::Ascending),
            Err(ViewError::InvalidColumn("bogus".to_string()))
        );
    }
}
