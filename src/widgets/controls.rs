use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    widgets::{Paragraph, Widget},
};

const NORMAL_CONTROLS: [(&str, &str); 6] = [
    ("/", "Search"),
    ("Tab", "View"),
    ("←→", "Column"),
    ("Enter", "Sort"),
    ("↑↓", "Scroll"),
    ("q", "Quit"),
];

const SEARCH_CONTROLS: [(&str, &str); 2] = [("Enter", "Done"), ("Esc", "Done")];

/// Key hint bar with the visible row count on the right
pub struct Controls {
    pub row_count: Option<usize>,
    pub searching: bool,
    pub key_color: Color,
    pub bar_bg: Color,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            row_count: None,
            searching: false,
            key_color: Color::Cyan,
            bar_bg: Color::DarkGray,
        }
    }
}

impl Controls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_row_count(mut self, row_count: Option<usize>) -> Self {
        self.row_count = row_count;
        self
    }

    pub fn with_searching(mut self, searching: bool) -> Self {
        self.searching = searching;
        self
    }

    pub fn with_colors(mut self, key_color: Color, bar_bg: Color) -> Self {
        self.key_color = key_color;
        self.bar_bg = bar_bg;
        self
    }

    fn controls(&self) -> &'static [(&'static str, &'static str)] {
        if self.searching {
            &SEARCH_CONTROLS
        } else {
            &NORMAL_CONTROLS
        }
    }
}

impl Widget for &Controls {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let controls = self.controls();
        let mut constraints = controls.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        if self.row_count.is_some() {
            constraints.push(Constraint::Length(15));
        }
        constraints.insert(constraints.len() - usize::from(self.row_count.is_some()), Constraint::Fill(1));

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);
        let bar = Style::default().bg(self.bar_bg);

        for (i, (key, action)) in controls.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(Style::default().fg(self.key_color).bold())
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action).style(bar).render(layout[j + 1], buf);
        }

        let fill_idx = controls.len() * 2;
        Paragraph::new("").style(bar).render(layout[fill_idx], buf);

        if let Some(count) = self.row_count {
            Paragraph::new(format!("Rows: {}", count))
                .style(bar.fg(Color::White))
                .right_aligned()
                .render(layout[fill_idx + 1], buf);
        }
    }
}
