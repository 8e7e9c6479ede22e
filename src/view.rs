//! Schema-driven table view: owns one table plus its sort state and derives
//! the visible rows from the current search query.

use std::time::Instant;
use tracing::{debug, error, warn};

use crate::error::{SourceError, ViewError};
use crate::filter::filter;
use crate::schema::{CellFormat, TableSchema};
use crate::sort::{sort, SortDirection};
use crate::table::{Row, Table};

/// Active sort column and direction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SortState {
    pub active: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Clicking the active column reverses the direction; any other column
    /// becomes active in ascending order.
    pub fn click(&mut self, column: &str) {
        if self.active.as_deref() == Some(column) {
            self.direction = self.direction.toggle();
        } else {
            self.active = Some(column.to_string());
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn is_active(&self, column: &str) -> bool {
        self.active.as_deref() == Some(column)
    }
}

/// Render metadata for one column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub id: String,
    pub label: String,
    pub hover: String,
    pub active: bool,
    /// `▲`/`▼` on the active column
    pub indicator: Option<&'static str>,
    pub format: CellFormat,
}

impl HeaderView {
    /// Label followed by the sort indicator, if any.
    pub fn title(&self) -> String {
        match self.indicator {
            Some(arrow) => format!("{} {}", self.label, arrow),
            None => self.label.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TableView {
    schema: TableSchema,
    table: Table,
    sort: SortState,
    query: String,
    filtered: Vec<usize>,
    visible: Vec<usize>,
    loaded: bool,
    last_error: Option<SourceError>,
}

impl TableView {
    /// An empty view waiting for its first load.
    pub fn new(schema: TableSchema) -> Self {
        let table = Table::empty(&schema);
        Self {
            schema,
            table,
            sort: SortState::default(),
            query: String::new(),
            filtered: Vec::new(),
            visible: Vec::new(),
            loaded: false,
            last_error: None,
        }
    }

    /// Apply the outcome of a load. On failure the previous table stays in
    /// place and the error is kept for display.
    pub fn on_load(&mut self, result: Result<Table, SourceError>, query: &str) {
        match result {
            Ok(table) => self.set_table(table, query),
            Err(e) => {
                error!(entity = self.schema.entity.name(), error = %e, "failed to load table");
                self.last_error = Some(e);
            }
        }
    }

    /// Replace the table and re-derive the visible rows.
    pub fn set_table(&mut self, table: Table, query: &str) {
        debug!(
            entity = self.schema.entity.name(),
            rows = table.len(),
            "table loaded"
        );
        self.table = table;
        self.loaded = true;
        self.last_error = None;
        self.on_query_change(query);
    }

    /// Re-filter from the full table, then re-apply the current sort.
    pub fn on_query_change(&mut self, query: &str) {
        let start = Instant::now();
        self.query = query.to_string();
        self.filtered = filter(&self.table, query, &self.schema.searchable_columns());
        self.resort();
        debug!(
            entity = self.schema.entity.name(),
            query,
            matched = self.visible.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "filtered rows"
        );
    }

    /// Sort on a header click. Unknown columns leave the view unchanged.
    pub fn on_header_click(&mut self, column: &str) -> Result<(), ViewError> {
        self.check_column(column)?;
        self.sort.click(column);
        self.resort();
        Ok(())
    }

    /// Set the sort column and direction directly.
    pub fn set_sort(&mut self, column: &str, direction: SortDirection) -> Result<(), ViewError> {
        self.check_column(column)?;
        self.sort = SortState {
            active: Some(column.to_string()),
            direction,
        };
        self.resort();
        Ok(())
    }

    fn check_column(&self, column: &str) -> Result<(), ViewError> {
        if self.schema.column(column).is_none() {
            warn!(
                entity = self.schema.entity.name(),
                column, "sort requested on unknown column"
            );
            return Err(ViewError::InvalidColumn(column.to_string()));
        }
        Ok(())
    }

    fn resort(&mut self) {
        self.visible = match &self.sort.active {
            Some(column) => match sort(&self.table, &self.filtered, column, self.sort.direction) {
                Ok(rows) => rows,
                Err(e) => {
                    warn!(error = %e, "keeping unsorted rows");
                    self.filtered.clone()
                }
            },
            None => self.filtered.clone(),
        };
    }

    /// Rows to render, in display order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.visible.iter().filter_map(|&i| self.table.rows.get(i))
    }

    /// Indices into [`TableView::table`] of the rows to render.
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    pub fn row_count(&self) -> usize {
        self.visible.len()
    }

    pub fn headers(&self) -> Vec<HeaderView> {
        self.schema
            .columns
            .iter()
            .map(|c| {
                let active = self.sort.is_active(&c.id);
                HeaderView {
                    id: c.id.clone(),
                    label: c.label.clone(),
                    hover: c.hover.clone(),
                    active,
                    indicator: active.then(|| self.sort.direction.arrow()),
                    format: c.format,
                }
            })
            .collect()
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// True until the first successful load.
    pub fn is_loading(&self) -> bool {
        !self.loaded
    }

    pub fn last_error(&self) -> Option<&SourceError> {
        self.last_error.as_ref()
    }
}
