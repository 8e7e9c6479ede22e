//! Shared CLI definitions for hockey-stats.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};

/// Where table data is loaded from.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// JSON files: the bundled sample data, or `--data-dir` when given
    #[default]
    Static,
    /// Spreadsheet values API (requires a spreadsheet id and API key)
    Remote,
}

impl SourceKind {
    /// Parse the name used in the config file ("static" or "remote").
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "static" => Some(Self::Static),
            "remote" => Some(Self::Remote),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Remote => "remote",
        }
    }
}

/// The statistics table being viewed.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash, Default)]
pub enum Entity {
    /// Skater statistics
    #[default]
    Skaters,
    /// Goalie statistics
    Goalies,
    /// Team standings
    Teams,
}

impl Entity {
    /// All entities in tab order.
    pub const ALL: [Entity; 3] = [Entity::Skaters, Entity::Goalies, Entity::Teams];

    /// Parse the name used in the config file.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "skaters" => Some(Self::Skaters),
            "goalies" => Some(Self::Goalies),
            "teams" => Some(Self::Teams),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Skaters => "skaters",
            Self::Goalies => "goalies",
            Self::Teams => "teams",
        }
    }

    /// Title shown on the view tab.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Skaters => "Skaters",
            Self::Goalies => "Goalies",
            Self::Teams => "Teams",
        }
    }

    /// Position in [`Entity::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Self::Skaters => 0,
            Self::Goalies => 1,
            Self::Teams => 2,
        }
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Command-line arguments for hockey-stats
#[derive(Clone, Parser, Debug, Default)]
#[command(
    name = "hockey-stats",
    version,
    about = "Hockey statistics tables in the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Data source to load tables from (overrides config [source] kind)
    #[arg(long = "source", value_enum)]
    pub source: Option<SourceKind>,

    /// Directory holding skaters.json, goalies.json and teams.json (static source only)
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<std::path::PathBuf>,

    /// Spreadsheet id for the remote source (overrides config)
    #[arg(long = "spreadsheet-id", value_name = "ID")]
    pub spreadsheet_id: Option<String>,

    /// API key for the remote source (overrides config)
    #[arg(long = "api-key", value_name = "KEY")]
    pub api_key: Option<String>,

    /// View to show first (or the view printed with --print)
    #[arg(long = "view", value_enum)]
    pub view: Option<Entity>,

    /// Initial search text, matched against player and team names
    #[arg(long = "query", value_name = "TEXT")]
    pub query: Option<String>,

    /// Column identifier to sort the initial view by (e.g. goals, wins, points)
    #[arg(long = "sort", value_name = "COLUMN")]
    pub sort: Option<String>,

    /// Sort the initial view in descending order (requires --sort)
    #[arg(long = "descending", requires = "sort", action)]
    pub descending: bool,

    /// Print the selected view as plain text and exit
    #[arg(long = "print", action)]
    pub print: bool,

    /// Enable debug logging
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Clear all cache data and exit
    #[arg(long = "clear-cache", action)]
    pub clear_cache: bool,

    /// Generate default configuration file at ~/.config/hockey-stats/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

/// Render command-line options as markdown.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    let usage = cmd.render_usage();
    out.push_str(&usage.to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_ref().to_string();
        if id == "help" || id == "version" {
            continue;
        }

        let mut parts = Vec::new();
        if let Some(s) = arg.get_short() {
            parts.push(format!("-{s}"));
        }
        if let Some(l) = arg.get_long() {
            parts.push(format!("--{l}"));
        }
        let op = parts.join(", ");
        let placeholder: String = if arg.get_action().takes_values() {
            arg.get_value_names()
                .map(|names| {
                    names
                        .iter()
                        .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .unwrap_or_default()
        } else {
            String::new()
        };
        let option_str = if placeholder.is_empty() {
            op
        } else {
            format!("{op} {placeholder}")
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}
