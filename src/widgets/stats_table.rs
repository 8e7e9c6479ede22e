use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, Widget},
};

use crate::config::Theme;
use crate::print::{cell_text, EMPTY_PLACEHOLDER, LOADING_PLACEHOLDER};
use crate::schema::ValueType;
use crate::view::TableView;

/// Screen position of one rendered header cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderHit {
    /// Index into the schema columns
    pub column: usize,
    pub x: u16,
    pub width: u16,
}

impl HeaderHit {
    pub fn contains(&self, x: u16) -> bool {
        x >= self.x && x < self.x.saturating_add(self.width)
    }
}

/// Renders a [`TableView`]: sortable header, alternating rows and a
/// placeholder while loading or when nothing matches.
pub struct StatsTable<'a> {
    view: &'a TableView,
    pub header_bg: Color,
    pub header_fg: Color,
    pub active_header: Color,
    pub header_cursor: Color,
    pub sorted_column: Color,
    pub dimmed: Color,
    pub alternate_row_bg: Option<Color>,
    pub percent_suffix: bool,
    pub column_spacing: u16,
    /// Keyboard-focused header
    pub cursor: Option<usize>,
    /// First rendered row (display order)
    pub scroll: usize,
    /// First rendered column
    pub column_offset: usize,
}

impl<'a> StatsTable<'a> {
    pub fn new(view: &'a TableView) -> Self {
        Self {
            view,
            header_bg: Color::Indexed(236),
            header_fg: Color::White,
            active_header: Color::Yellow,
            header_cursor: Color::Cyan,
            sorted_column: Color::White,
            dimmed: Color::DarkGray,
            alternate_row_bg: None,
            percent_suffix: true,
            column_spacing: 2,
            cursor: None,
            scroll: 0,
            column_offset: 0,
        }
    }

    pub fn with_theme(mut self, theme: &Theme) -> Self {
        self.header_bg = theme.get("header_bg");
        self.header_fg = theme.get("header_fg");
        self.active_header = theme.get("active_header");
        self.header_cursor = theme.get("header_cursor");
        self.sorted_column = theme.get("sorted_column");
        self.dimmed = theme.get("dimmed");
        self
    }

    pub fn with_alternate_row_bg(mut self, color: Option<Color>) -> Self {
        self.alternate_row_bg = color;
        self
    }

    pub fn with_percent_suffix(mut self, percent_suffix: bool) -> Self {
        self.percent_suffix = percent_suffix;
        self
    }

    pub fn with_cursor(mut self, cursor: Option<usize>) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn with_scroll(mut self, scroll: usize, column_offset: usize) -> Self {
        self.scroll = scroll;
        self.column_offset = column_offset;
        self
    }

    fn cell_strings(&self) -> Vec<Vec<String>> {
        let columns = &self.view.schema().columns;
        self.view
            .rows()
            .map(|row| {
                columns
                    .iter()
                    .enumerate()
                    .map(|(i, c)| cell_text(row.cell(i), c.format, self.percent_suffix))
                    .collect()
            })
            .collect()
    }

    /// Content width of every column: the widest of its title and cells.
    fn column_widths(&self, body: &[Vec<String>]) -> Vec<u16> {
        self.view
            .headers()
            .iter()
            .enumerate()
            .map(|(i, h)| {
                body.iter()
                    .map(|r| r[i].chars().count())
                    .chain(std::iter::once(h.title().chars().count()))
                    .max()
                    .unwrap_or(0) as u16
            })
            .collect()
    }

    /// Header cells that fit in `area`, starting at the column offset.
    pub fn header_hits(&self, area: Rect) -> Vec<HeaderHit> {
        let widths = self.column_widths(&self.cell_strings());
        fit_columns(&widths, self.column_offset, self.column_spacing, area)
    }

    /// Column offset that brings `column` into `area`: the column itself
    /// when it lies left of the current offset, otherwise the smallest
    /// offset from the current one that renders it.
    pub fn offset_revealing(&self, column: usize, area: Rect) -> usize {
        if column <= self.column_offset {
            return column;
        }
        let widths = self.column_widths(&self.cell_strings());
        (self.column_offset..column)
            .find(|&offset| {
                fit_columns(&widths, offset, self.column_spacing, area)
                    .iter()
                    .any(|hit| hit.column == column)
            })
            .unwrap_or(column)
    }
}

/// Lay out columns left to right from `offset` until `area` is full.
fn fit_columns(widths: &[u16], offset: usize, spacing: u16, area: Rect) -> Vec<HeaderHit> {
    let mut hits = Vec::new();
    let mut x = area.x;
    let right = area.x.saturating_add(area.width);
    for (column, &width) in widths.iter().enumerate().skip(offset) {
        if x >= right {
            break;
        }
        let available = right - x;
        if width > available {
            // Only the first column is cut to fit; others are left off
            if hits.is_empty() {
                hits.push(HeaderHit {
                    column,
                    x,
                    width: available,
                });
            }
            break;
        }
        hits.push(HeaderHit { column, x, width });
        x = x.saturating_add(width).saturating_add(spacing);
    }
    hits
}

impl Widget for &StatsTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let headers = self.view.headers();
        let columns = &self.view.schema().columns;
        let body = self.cell_strings();
        let widths = self.column_widths(&body);
        let hits = fit_columns(&widths, self.column_offset, self.column_spacing, area);

        let header_style = if self.header_bg == Color::Reset {
            Style::default().fg(self.header_fg)
        } else {
            Style::default().bg(self.header_bg).fg(self.header_fg)
        };

        let header_cells: Vec<Cell> = hits
            .iter()
            .map(|hit| {
                let header = &headers[hit.column];
                let mut style = Style::default();
                if header.active {
                    style = style.fg(self.active_header).add_modifier(Modifier::BOLD);
                }
                if self.cursor == Some(hit.column) {
                    style = style.fg(self.header_cursor).add_modifier(Modifier::REVERSED);
                }
                let line = Line::from(Span::styled(header.title(), style));
                let line = match columns[hit.column].value_type {
                    ValueType::Numeric => line.right_aligned(),
                    ValueType::Text => line,
                };
                Cell::from(line)
            })
            .collect();

        let visible_rows = area.height.saturating_sub(1) as usize;
        let rows: Vec<Row> = body
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(visible_rows)
            .map(|(row_index, cells)| {
                let row_style = if row_index % 2 == 1 {
                    self.alternate_row_bg
                        .map(|c| Style::default().bg(c))
                        .unwrap_or_default()
                } else {
                    Style::default()
                };
                let cells: Vec<Cell> = hits
                    .iter()
                    .map(|hit| {
                        let text = cells[hit.column].clone();
                        let line = match columns[hit.column].value_type {
                            ValueType::Numeric => Line::from(text).right_aligned(),
                            ValueType::Text => Line::from(text),
                        };
                        if headers[hit.column].active {
                            Cell::from(line).style(
                                Style::default()
                                    .fg(self.sorted_column)
                                    .add_modifier(Modifier::BOLD),
                            )
                        } else {
                            Cell::from(line)
                        }
                    })
                    .collect();
                Row::new(cells).style(row_style)
            })
            .collect();

        let constraints: Vec<Constraint> = hits.iter().map(|h| Constraint::Length(h.width)).collect();
        Widget::render(
            Table::new(rows, constraints)
                .column_spacing(self.column_spacing)
                .flex(Flex::Start)
                .header(Row::new(header_cells).style(header_style)),
            area,
            buf,
        );

        let placeholder = if self.view.is_loading() {
            Some(LOADING_PLACEHOLDER)
        } else if body.is_empty() {
            Some(EMPTY_PLACEHOLDER)
        } else {
            None
        };
        if let (Some(text), true) = (placeholder, area.height > 2) {
            let [_, middle, _] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .areas(Rect {
                y: area.y + 1,
                height: area.height - 1,
                ..area
            });
            Paragraph::new(text)
                .style(Style::default().fg(self.dimmed))
                .centered()
                .render(middle, buf);
        }
    }
}
