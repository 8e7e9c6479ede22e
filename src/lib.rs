use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Widget},
};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod logging;
pub mod print;
pub mod schema;
pub mod sort;
pub mod source;
pub mod table;
pub mod view;
pub mod widgets;

pub use cache::CacheManager;
pub use config::{AppConfig, ConfigManager, Theme};
pub use hockey_stats_cli::{Args, Entity, SourceKind};

use error::{user_message, SourceError, ViewError};
use schema::TableSchema;
use sort::SortDirection;
use source::DataSource;
use table::Table;
use view::TableView;
use widgets::controls::Controls;
use widgets::search_input::{SearchInput, SearchInputEvent};
use widgets::stats_table::{HeaderHit, StatsTable};

/// Application name used for config and cache directories
pub const APP_NAME: &str = "hockey-stats";

const SEARCH_PLACEHOLDER: &str = "Search By Player or Team...";
const MOUSE_SCROLL_ROWS: usize = 3;

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    /// Start loading every view in the background
    Load,
    /// A background load finished
    Loaded(Entity, Result<Table, SourceError>),
    Resize(u16, u16), // resized (width, height)
    Exit,
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum InputMode {
    #[default]
    Normal,
    Search,
}

/// Keyboard and scroll position of one view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ViewPosition {
    /// Focused header (schema column index)
    pub column: usize,
    /// First visible row
    pub scroll: usize,
    /// First visible column
    pub column_offset: usize,
}

pub struct App {
    events: Sender<AppEvent>,
    source: Arc<dyn DataSource>,
    config: AppConfig,
    theme: Theme,
    views: Vec<TableView>,
    positions: Vec<ViewPosition>,
    active: Entity,
    query: String,
    search: SearchInput,
    pub input_mode: InputMode,
    status: Option<String>,
    // Filled in by render, used for mouse hit testing and paging
    header_hits: Vec<HeaderHit>,
    header_row: Option<u16>,
    search_area: Rect,
    table_rows: usize,
}

impl App {
    pub fn new(events: Sender<AppEvent>, source: Arc<dyn DataSource>) -> App {
        let theme = Theme::from_config(&AppConfig::default().theme).unwrap_or_else(|e| {
            warn!(error = %e, "default theme failed to build, using fallback");
            Theme::default()
        });
        Self::new_with_config(events, source, theme, AppConfig::default())
    }

    pub fn new_with_config(
        events: Sender<AppEvent>,
        source: Arc<dyn DataSource>,
        theme: Theme,
        config: AppConfig,
    ) -> App {
        let active = config.initial_view().unwrap_or_default();
        let views = Entity::ALL
            .iter()
            .map(|e| TableView::new(TableSchema::for_entity(*e)))
            .collect();
        let search = SearchInput::new()
            .with_placeholder(SEARCH_PLACEHOLDER)
            .with_theme(&theme);
        Self {
            events,
            source,
            config,
            theme,
            views,
            positions: vec![ViewPosition::default(); Entity::ALL.len()],
            active,
            query: String::new(),
            search,
            input_mode: InputMode::Normal,
            status: None,
            header_hits: Vec::new(),
            header_row: None,
            search_area: Rect::default(),
            table_rows: 0,
        }
    }

    fn color(&self, name: &str) -> Color {
        self.theme.get(name)
    }

    pub fn active_entity(&self) -> Entity {
        self.active
    }

    pub fn view(&self, entity: Entity) -> &TableView {
        &self.views[entity.index()]
    }

    pub fn active_view(&self) -> &TableView {
        self.view(self.active)
    }

    pub fn position(&self, entity: Entity) -> ViewPosition {
        self.positions[entity.index()]
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_active(&mut self, entity: Entity) {
        if self.active != entity {
            debug!(view = entity.name(), "switching view");
            self.active = entity;
            self.status = None;
        }
    }

    /// Set the shared search text and re-filter every view.
    pub fn set_query(&mut self, query: &str) {
        if self.search.value() != query {
            self.search.set_value(query);
        }
        self.apply_query(query);
    }

    fn apply_query(&mut self, query: &str) {
        self.query = query.to_string();
        for view in &mut self.views {
            view.on_query_change(query);
        }
        for position in &mut self.positions {
            position.scroll = 0;
        }
    }

    /// Sort a view by a column in a fixed direction.
    pub fn set_sort(
        &mut self,
        entity: Entity,
        column: &str,
        direction: SortDirection,
    ) -> Result<(), ViewError> {
        let view = &mut self.views[entity.index()];
        view.set_sort(column, direction)?;
        if let Some(index) = view.schema().columns.iter().position(|c| c.id == column) {
            self.positions[entity.index()].column = index;
        }
        Ok(())
    }

    /// Click the header at a schema column index of the active view.
    pub fn click_header(&mut self, column: usize) {
        let index = self.active.index();
        let Some(id) = self.views[index]
            .schema()
            .columns
            .get(column)
            .map(|c| c.id.clone())
        else {
            return;
        };
        self.positions[index].column = column;
        match self.views[index].on_header_click(&id) {
            Ok(()) => {
                let state = self.views[index].sort_state();
                debug!(view = self.active.name(), column = %id, direction = ?state.direction, "sorted");
                self.positions[index].scroll = 0;
                self.status = None;
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    /// Spawn one loader thread per view. Results come back as [`AppEvent::Loaded`].
    fn start_loading(&mut self) {
        info!(source = %self.source.describe(), "loading tables");
        for entity in Entity::ALL {
            let source = Arc::clone(&self.source);
            let events = self.events.clone();
            let schema = self.views[entity.index()].schema().clone();
            std::thread::spawn(move || {
                let result = source.load(&schema);
                // The receiver is gone when the app already exited
                let _ = events.send(AppEvent::Loaded(entity, result));
            });
        }
    }

    fn on_loaded(&mut self, entity: Entity, result: &Result<Table, SourceError>) {
        let query = self.query.clone();
        if let Err(e) = result {
            if entity == self.active {
                self.status = Some(user_message(e));
            }
        }
        self.views[entity.index()].on_load(result.clone(), &query);
        self.clamp_scroll(entity);
    }

    fn max_scroll(&self, entity: Entity) -> usize {
        self.view(entity)
            .row_count()
            .saturating_sub(self.table_rows.max(1))
    }

    fn clamp_scroll(&mut self, entity: Entity) {
        let max = self.max_scroll(entity);
        let position = &mut self.positions[entity.index()];
        position.scroll = position.scroll.min(max);
    }

    fn scroll_by(&mut self, delta: isize) {
        let max = self.max_scroll(self.active);
        let position = &mut self.positions[self.active.index()];
        position.scroll = position.scroll.saturating_add_signed(delta).min(max);
    }

    fn scroll_to(&mut self, row: usize) {
        let max = self.max_scroll(self.active);
        self.positions[self.active.index()].scroll = row.min(max);
    }

    fn move_cursor(&mut self, delta: isize) {
        let columns = self.active_view().schema().columns.len();
        let position = &mut self.positions[self.active.index()];
        position.column = position
            .column
            .saturating_add_signed(delta)
            .min(columns.saturating_sub(1));
    }

    fn page(&self) -> isize {
        self.table_rows.max(1) as isize
    }

    fn enter_search(&mut self) {
        self.input_mode = InputMode::Search;
        self.search.set_focused(true);
    }

    fn leave_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.search.set_focused(false);
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if event.kind == KeyEventKind::Release {
            return None;
        }
        if event.code == KeyCode::Char('c') && event.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppEvent::Exit);
        }

        if self.input_mode == InputMode::Search {
            match self.search.handle_key(event) {
                SearchInputEvent::Changed => {
                    let query = self.search.value().to_string();
                    self.apply_query(&query);
                }
                SearchInputEvent::Submit | SearchInputEvent::Cancel => self.leave_search(),
                SearchInputEvent::None => {}
            }
            return None;
        }

        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('/') => self.enter_search(),
            KeyCode::Tab => self.set_active(self.active.next()),
            KeyCode::BackTab => self.set_active(self.active.previous()),
            KeyCode::Char(c @ '1'..='3') => {
                let index = c as usize - '1' as usize;
                self.set_active(Entity::ALL[index]);
            }
            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(-1),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(1),
            KeyCode::Enter | KeyCode::Char('s') => {
                let column = self.positions[self.active.index()].column;
                self.click_header(column);
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll_by(-1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-self.page()),
            KeyCode::PageDown => self.scroll_by(self.page()),
            KeyCode::Home => self.scroll_to(0),
            KeyCode::End => self.scroll_to(usize::MAX),
            _ => {}
        }
        None
    }

    fn mouse(&mut self, event: &MouseEvent) -> Option<AppEvent> {
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.header_row == Some(event.row) {
                    let hit = self
                        .header_hits
                        .iter()
                        .find(|h| h.contains(event.column))
                        .map(|h| h.column);
                    if let Some(column) = hit {
                        self.click_header(column);
                    }
                } else if contains(self.search_area, event.column, event.row) {
                    self.enter_search();
                } else if self.input_mode == InputMode::Search {
                    self.leave_search();
                }
            }
            MouseEventKind::ScrollDown => self.scroll_by(MOUSE_SCROLL_ROWS as isize),
            MouseEventKind::ScrollUp => self.scroll_by(-(MOUSE_SCROLL_ROWS as isize)),
            _ => {}
        }
        None
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Mouse(mouse) => self.mouse(mouse),
            AppEvent::Load => {
                self.start_loading();
                None
            }
            AppEvent::Loaded(entity, result) => {
                self.on_loaded(*entity, result);
                None
            }
            AppEvent::Resize(_, _) => {
                for entity in Entity::ALL {
                    self.clamp_scroll(entity);
                }
                None
            }
            AppEvent::Exit => None,
        }
    }

    /// Status line text: the last error, or the hover text of the focused header.
    fn status_line(&self) -> (String, bool) {
        if let Some(status) = &self.status {
            return (status.clone(), true);
        }
        if let Some(e) = self.active_view().last_error() {
            return (user_message(e), true);
        }
        let position = self.position(self.active);
        let hover = self
            .active_view()
            .schema()
            .columns
            .get(position.column)
            .map(|c| c.hover.clone())
            .unwrap_or_default();
        (hover, false)
    }

    /// Shift the column offset so the focused header is rendered.
    fn reveal_cursor(&mut self, area: Rect) {
        let index = self.active.index();
        let position = self.positions[index];
        self.positions[index].column_offset = StatsTable::new(&self.views[index])
            .with_percent_suffix(self.config.display.percent_suffix)
            .with_scroll(position.scroll, position.column_offset)
            .offset_revealing(position.column, area);
    }
}

fn contains(area: Rect, x: u16, y: u16) -> bool {
    x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let background_color = self.color("background");
        Block::default()
            .style(Style::default().bg(background_color))
            .render(area, buf);

        let [tabs_area, search_area, table_area, status_area, controls_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        Tabs::new(Entity::ALL.iter().map(|e| e.title()))
            .style(Style::default().fg(self.color("dimmed")))
            .highlight_style(
                Style::default()
                    .fg(self.color("active_header"))
                    .add_modifier(Modifier::BOLD),
            )
            .select(self.active.index())
            .render(tabs_area, buf);

        let border_color = if self.input_mode == InputMode::Search {
            self.color("header_cursor")
        } else {
            self.color("dimmed")
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title("Search");
        let inner = block.inner(search_area);
        block.render(search_area, buf);
        (&self.search).render(inner, buf);
        self.search_area = search_area;

        self.table_rows = table_area.height.saturating_sub(1) as usize;
        for entity in Entity::ALL {
            self.clamp_scroll(entity);
        }
        self.reveal_cursor(table_area);

        let position = self.position(self.active);
        let alternate_row_bg = if self.config.display.alternate_rows {
            self.theme.get_optional("alternate_row")
        } else {
            None
        };
        let table = StatsTable::new(self.active_view())
            .with_theme(&self.theme)
            .with_alternate_row_bg(alternate_row_bg)
            .with_percent_suffix(self.config.display.percent_suffix)
            .with_cursor(Some(position.column))
            .with_scroll(position.scroll, position.column_offset);
        let hits = table.header_hits(table_area);
        (&table).render(table_area, buf);
        self.header_hits = hits;
        self.header_row = (table_area.height > 0).then_some(table_area.y);

        let (status, is_error) = self.status_line();
        let status_style = if is_error {
            Style::default().fg(self.color("error"))
        } else {
            Style::default().fg(self.color("dimmed"))
        };
        Paragraph::new(Line::from(Span::styled(status, status_style))).render(status_area, buf);

        let row_count = (!self.active_view().is_loading()).then(|| self.active_view().row_count());
        let controls = Controls::new()
            .with_row_count(row_count)
            .with_searching(self.input_mode == InputMode::Search)
            .with_colors(self.color("keybind_hints"), self.color("controls_bg"));
        (&controls).render(controls_area, buf);
    }
}
