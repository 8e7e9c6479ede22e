//! Normalized in-memory tables.
//!
//! Both source formats (keyed JSON records and positional value rows) end up
//! in the same [`Table`] shape: one cell per schema column, typed by the
//! schema's value type.

use serde_json::{Map, Value};

use crate::error::ViewError;
use crate::schema::{CellFormat, ColumnSchema, TableSchema, ValueType};

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Always finite
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Normalize a raw JSON value for a column.
    pub fn from_json(column: &ColumnSchema, value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Missing,
            Value::Number(n) => match column.value_type {
                ValueType::Numeric => n
                    .as_f64()
                    .filter(|f| f.is_finite())
                    .map(CellValue::Number)
                    .unwrap_or_else(|| CellValue::Text(n.to_string())),
                ValueType::Text => CellValue::Text(n.to_string()),
            },
            Value::String(s) => Self::from_raw(column, s),
            Value::Bool(b) => CellValue::Text(b.to_string()),
            other => CellValue::Text(other.to_string()),
        }
    }

    /// Normalize a raw string for a column. Blank strings are missing.
    pub fn from_raw(column: &ColumnSchema, raw: &str) -> Self {
        if raw.trim().is_empty() {
            return CellValue::Missing;
        }
        match column.value_type {
            ValueType::Numeric => parse_number(raw)
                .map(CellValue::Number)
                .unwrap_or_else(|| CellValue::Text(raw.to_string())),
            ValueType::Text => CellValue::Text(raw.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Plain display text, without any column formatting.
    pub fn display(&self) -> String {
        match self {
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
            CellValue::Missing => String::new(),
        }
    }

    /// Display text with the column format applied.
    pub fn formatted(&self, format: CellFormat) -> String {
        match (self, format) {
            (CellValue::Missing, _) => String::new(),
            (_, CellFormat::Percent) => format!("{}%", self.display()),
            (_, CellFormat::Plain) => self.display(),
        }
    }
}

/// Parse a numeric cell. Accepts surrounding whitespace and a trailing `%`.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

static MISSING: CellValue = CellValue::Missing;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub cells: Vec<CellValue>,
}

impl Row {
    pub fn new(cells: Vec<CellValue>) -> Self {
        Self { cells }
    }

    pub fn cell(&self, index: usize) -> &CellValue {
        self.cells.get(index).unwrap_or(&MISSING)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Column identifiers, in schema order
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Table {
    /// A table with the schema's header and no rows.
    pub fn empty(schema: &TableSchema) -> Self {
        Self {
            columns: schema.columns.iter().map(|c| c.id.clone()).collect(),
            rows: Vec::new(),
        }
    }

    /// Build from keyed records (`{column id: value}`).
    ///
    /// Keys not in the schema are ignored; schema columns absent from a
    /// record are missing.
    pub fn from_records(schema: &TableSchema, records: &[Map<String, Value>]) -> Self {
        let rows = records
            .iter()
            .map(|record| {
                Row::new(
                    schema
                        .columns
                        .iter()
                        .map(|column| {
                            record
                                .get(&column.id)
                                .map(|v| CellValue::from_json(column, v))
                                .unwrap_or(CellValue::Missing)
                        })
                        .collect(),
                )
            })
            .collect();
        Self {
            rows,
            ..Self::empty(schema)
        }
    }

    /// Build from positional rows whose first row is the header.
    ///
    /// Columns are matched by header name, so the upstream column order does
    /// not matter. Short rows are padded with missing cells and extra
    /// cells are dropped.
    pub fn from_values(schema: &TableSchema, values: &[Vec<Value>]) -> Self {
        let Some((header, body)) = values.split_first() else {
            return Self::empty(schema);
        };
        let positions: Vec<Option<usize>> = schema
            .columns
            .iter()
            .map(|column| {
                header
                    .iter()
                    .position(|h| h.as_str().map(str::trim) == Some(column.id.as_str()))
            })
            .collect();

        let rows = body
            .iter()
            .map(|raw| {
                Row::new(
                    schema
                        .columns
                        .iter()
                        .zip(&positions)
                        .map(|(column, pos)| {
                            pos.and_then(|p| raw.get(p))
                                .map(|v| CellValue::from_json(column, v))
                                .unwrap_or(CellValue::Missing)
                        })
                        .collect(),
                )
            })
            .collect();
        Self {
            rows,
            ..Self::empty(schema)
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column, or `InvalidColumn` when it is not in the header.
    pub fn column_index(&self, id: &str) -> Result<usize, ViewError> {
        self.columns
            .iter()
            .position(|c| c == id)
            .ok_or_else(|| ViewError::InvalidColumn(id.to_string()))
    }

    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        self.rows
            .get(row)
            .map(|r| r.cell(column))
            .unwrap_or(&MISSING)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> TableSchema {
        TableSchema::teams()
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12"), Some(12.0));
        assert_eq!(parse_number(" 12.5 "), Some(12.5));
        assert_eq!(parse_number("12.5%"), Some(12.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn test_cell_normalization() {
        let s = TableSchema::skaters();
        let goals = s.column("goals").unwrap();
        let player = s.column("player").unwrap();

        assert_eq!(CellValue::from_json(goals, &json!(7)), CellValue::Number(7.0));
        assert_eq!(CellValue::from_json(goals, &json!("7")), CellValue::Number(7.0));
        assert_eq!(
            CellValue::from_json(goals, &json!("n/a")),
            CellValue::Text("n/a".to_string())
        );
        assert_eq!(CellValue::from_json(goals, &json!(null)), CellValue::Missing);
        assert_eq!(CellValue::from_json(goals, &json!("  ")), CellValue::Missing);
        assert_eq!(
            CellValue::from_json(player, &json!(19)),
            CellValue::Text("19".to_string())
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Number(12.0).display(), "12");
        assert_eq!(CellValue::Number(0.75).display(), "0.75");
        assert_eq!(CellValue::Number(-2.0).display(), "-2");
        assert_eq!(CellValue::Missing.display(), "");
        assert_eq!(CellValue::Number(12.5).formatted(CellFormat::Percent), "12.5%");
        assert_eq!(CellValue::Missing.formatted(CellFormat::Percent), "");
    }

    #[test]
    fn test_from_records_uses_schema_order() {
        let records = vec![json!({"wins": 3, "team": "A", "extra": true})]
            .into_iter()
            .filter_map(|v| v.as_object().cloned())
            .collect::<Vec<_>>();
        let table = Table::from_records(&schema(), &records);

        assert_eq!(table.columns[0], "team");
        assert_eq!(table.len(), 1);
        assert_eq!(table.cell(0, 0), &CellValue::Text("A".to_string()));
        let wins = table.column_index("wins").unwrap();
        assert_eq!(table.cell(0, wins), &CellValue::Number(3.0));
        let losses = table.column_index("losses").unwrap();
        assert!(table.cell(0, losses).is_missing());
    }

    #[test]
    fn test_from_values_maps_by_header() {
        let values = vec![
            vec![json!("wins"), json!("team")],
            vec![json!("5"), json!("A")],
            vec![json!("7")],
            vec![json!("1"), json!("C"), json!("extra")],
        ];
        let table = Table::from_values(&schema(), &values);
        let wins = table.column_index("wins").unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.cell(0, 0), &CellValue::Text("A".to_string()));
        assert_eq!(table.cell(0, wins), &CellValue::Number(5.0));
        assert!(table.cell(1, 0).is_missing());
        assert_eq!(table.rows[2].cells.len(), table.columns.len());
    }

    #[test]
    fn test_record_and_value_forms_match() {
        let records = vec![
            json!({"team": "A", "wins": 5}),
            json!({"team": "B", "wins": 3}),
        ]
        .into_iter()
        .filter_map(|v| v.as_object().cloned())
        .collect::<Vec<_>>();
        let values = vec![
            vec![json!("team"), json!("wins")],
            vec![json!("A"), json!("5")],
            vec![json!("B"), json!("3")],
        ];
        assert_eq!(
            Table::from_records(&schema(), &records),
            Table::from_values(&schema(), &values)
        );
    }

    #[test]
    fn test_empty_values() {
        let table = Table::from_values(&schema(), &[]);
        assert!(table.is_empty());
        assert_eq!(table.columns.len(), schema().columns.len());
    }

    #[test]
    fn test_invalid_column() {
        let table = Table::empty(&schema());
        assert_eq!(
            table.column_index("nope"),
            Err(ViewError::InvalidColumn("nope".to_string()))
        );
    }
}
