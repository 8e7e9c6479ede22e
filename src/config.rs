use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::source::DEFAULT_BASE_URL;
use crate::{Args, Entity, SourceKind};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub source: SourceConfig,
    pub display: DisplayConfig,
    pub performance: PerformanceConfig,
    pub theme: ThemeConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// "static" or "remote"
    pub kind: String,
    /// Directory of static JSON files; bundled sample data when unset
    pub data_dir: Option<PathBuf>,
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub spreadsheet_id: Option<String>,
    pub api_key: Option<String>,
    pub skaters_range: String,
    pub goalies_range: String,
    pub teams_range: String,
    /// No timeout when unset
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// View shown at startup: "skaters", "goalies" or "teams"
    pub initial_view: String,
    pub alternate_rows: bool,
    /// Append `%` to percentage columns
    pub percent_suffix: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    pub event_poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    pub background: String,
    pub text_primary: String,
    pub header_fg: String,
    pub header_bg: String,
    pub active_header: String,
    pub header_cursor: String,
    pub sorted_column: String,
    pub alternate_row: String,
    pub keybind_hints: String,
    pub controls_bg: String,
    pub cursor_focused: String,
    pub error: String,
    pub dimmed: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            source: SourceConfig::default(),
            display: DisplayConfig::default(),
            performance: PerformanceConfig::default(),
            theme: ThemeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: "static".to_string(),
            data_dir: None,
            remote: RemoteConfig::default(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            spreadsheet_id: None,
            api_key: None,
            skaters_range: "Skaters".to_string(),
            goalies_range: "Goalies".to_string(),
            teams_range: "Teams".to_string(),
            timeout_secs: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            initial_view: "skaters".to_string(),
            alternate_rows: true,
            percent_suffix: true,
        }
    }
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: "reset".to_string(),
            text_primary: "white".to_string(),
            header_fg: "white".to_string(),
            header_bg: "indexed(236)".to_string(),
            active_header: "yellow".to_string(),
            header_cursor: "cyan".to_string(),
            sorted_column: "bright_white".to_string(),
            alternate_row: "indexed(234)".to_string(),
            keybind_hints: "cyan".to_string(),
            controls_bg: "dark_gray".to_string(),
            cursor_focused: "reset".to_string(),
            error: "red".to_string(),
            dimmed: "dark_gray".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        Self::load_from(&ConfigManager::new(app_name)?)
    }

    /// Load configuration using the given config directory
    pub fn load_from(config_manager: &ConfigManager) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(Self::load_user_config(config_manager)?);
        config.validate()?;
        Ok(config)
    }

    fn load_user_config(config_manager: &ConfigManager) -> Result<AppConfig> {
        let config_path = config_manager.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.source.merge(other.source);
        self.display.merge(other.display);
        self.performance.merge(other.performance);
        self.theme.merge(other.theme);
        self.logging.merge(other.logging);
    }

    /// Apply command-line overrides (highest precedence)
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(kind) = args.source {
            self.source.kind = kind.name().to_string();
        }
        if let Some(dir) = &args.data_dir {
            self.source.data_dir = Some(dir.clone());
        }
        if let Some(id) = &args.spreadsheet_id {
            self.source.remote.spreadsheet_id = Some(id.clone());
        }
        if let Some(key) = &args.api_key {
            self.source.remote.api_key = Some(key.clone());
        }
        if let Some(view) = args.view {
            self.display.initial_view = view.name().to_string();
        }
        if args.debug {
            self.logging.level = "debug".to_string();
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if SourceKind::from_name(&self.source.kind).is_none() {
            return Err(eyre!(
                "Invalid source kind: {}. Must be 'static' or 'remote'",
                self.source.kind
            ));
        }

        if self.source.remote.timeout_secs == Some(0) {
            return Err(eyre!("timeout_secs must be greater than 0"));
        }

        if self.initial_view().is_none() {
            return Err(eyre!(
                "Invalid initial_view: {}. Must be 'skaters', 'goalies' or 'teams'",
                self.display.initial_view
            ));
        }

        if self.performance.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(eyre!(
                    "Invalid log level: {}. Must be trace, debug, info, warn or error",
                    self.logging.level
                ))
            }
        }

        let parser = ColorParser::new();
        self.theme.colors.validate(&parser)?;

        Ok(())
    }

    pub fn initial_view(&self) -> Option<Entity> {
        Entity::from_name(&self.display.initial_view)
    }
}

// Merge implementations for each config section
impl SourceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = SourceConfig::default();
        if other.kind != default.kind {
            self.kind = other.kind;
        }
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        self.remote.merge(other.remote);
    }
}

impl RemoteConfig {
    pub fn merge(&mut self, other: Self) {
        let default = RemoteConfig::default();
        if other.base_url != default.base_url {
            self.base_url = other.base_url;
        }
        if other.spreadsheet_id.is_some() {
            self.spreadsheet_id = other.spreadsheet_id;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.skaters_range != default.skaters_range {
            self.skaters_range = other.skaters_range;
        }
        if other.goalies_range != default.goalies_range {
            self.goalies_range = other.goalies_range;
        }
        if other.teams_range != default.teams_range {
            self.teams_range = other.teams_range;
        }
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
    }
}

impl DisplayConfig {
    pub fn merge(&mut self, other: Self) {
        let default = DisplayConfig::default();
        if other.initial_view != default.initial_view {
            self.initial_view = other.initial_view;
        }
        if other.alternate_rows != default.alternate_rows {
            self.alternate_rows = other.alternate_rows;
        }
        if other.percent_suffix != default.percent_suffix {
            self.percent_suffix = other.percent_suffix;
        }
    }
}

impl PerformanceConfig {
    pub fn merge(&mut self, other: Self) {
        let default = PerformanceConfig::default();
        if other.event_poll_interval_ms != default.event_poll_interval_ms {
            self.event_poll_interval_ms = other.event_poll_interval_ms;
        }
    }
}

impl ThemeConfig {
    pub fn merge(&mut self, other: Self) {
        self.colors.merge(other.colors);
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        let default = LoggingConfig::default();
        if other.level != default.level {
            self.level = other.level;
        }
    }
}

impl ColorConfig {
    /// Every color setting with its name
    fn entries(&self) -> [(&'static str, &str); 13] {
        [
            ("background", self.background.as_str()),
            ("text_primary", self.text_primary.as_str()),
            ("header_fg", self.header_fg.as_str()),
            ("header_bg", self.header_bg.as_str()),
            ("active_header", self.active_header.as_str()),
            ("header_cursor", self.header_cursor.as_str()),
            ("sorted_column", self.sorted_column.as_str()),
            ("alternate_row", self.alternate_row.as_str()),
            ("keybind_hints", self.keybind_hints.as_str()),
            ("controls_bg", self.controls_bg.as_str()),
            ("cursor_focused", self.cursor_focused.as_str()),
            ("error", self.error.as_str()),
            ("dimmed", self.dimmed.as_str()),
        ]
    }

    /// Validate all color strings can be parsed
    fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("Invalid color value for '{}': {}", name, e))?;
        }
        Ok(())
    }

    pub fn merge(&mut self, other: Self) {
        let default = ColorConfig::default();

        macro_rules! merge_color {
            ($($field:ident),*) => {
                $(
                    if other.$field != default.$field {
                        self.$field = other.$field;
                    }
                )*
            };
        }

        merge_color!(
            background,
            text_primary,
            header_fg,
            header_bg,
            active_header,
            header_cursor,
            sorted_column,
            alternate_row,
            keybind_hints,
            controls_bg,
            cursor_focused,
            error,
            dimmed
        );
    }
}

/// Color names accepted in `[theme.colors]`. Lookups lowercase the value,
/// turn spaces into underscores and read "grey" as "gray".
const NAMED_COLORS: &[(&str, Color)] = &[
    ("black", Color::Black),
    ("red", Color::Red),
    ("green", Color::Green),
    ("yellow", Color::Yellow),
    ("blue", Color::Blue),
    ("magenta", Color::Magenta),
    ("cyan", Color::Cyan),
    ("white", Color::White),
    ("gray", Color::Indexed(8)),
    ("dark_gray", Color::Indexed(8)),
    ("bright_white", Color::Indexed(15)),
    ("reset", Color::Reset),
    ("default", Color::Reset),
];

/// Turns theme color strings into terminal colors
pub struct ColorParser {
    true_color: bool,
    no_color: bool,
}

impl ColorParser {
    pub fn new() -> Self {
        Self {
            true_color: supports_color::on(Stream::Stdout).is_some_and(|level| level.has_16m),
            no_color: std::env::var("NO_COLOR").is_ok(),
        }
    }

    /// Parse `#rrggbb`, `indexed(n)` or one of the named colors.
    /// Everything parses to `Reset` when `NO_COLOR` is set.
    pub fn parse(&self, s: &str) -> Result<Color> {
        let value = s.trim().to_lowercase();

        let color = if let Some(hex) = value.strip_prefix('#') {
            let (r, g, b) = parse_hex(hex).ok_or_else(|| {
                eyre!("Invalid hex color: '{}'. Expected format: #rrggbb", s.trim())
            })?;
            if self.true_color {
                Color::Rgb(r, g, b)
            } else {
                Color::Indexed(cube_index(r, g, b))
            }
        } else if let Some(index) = value
            .strip_prefix("indexed(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let index = index.trim().parse::<u8>().map_err(|_| {
                eyre!("Invalid indexed color: '{}'. Expected format: indexed(0-255)", s.trim())
            })?;
            Color::Indexed(index)
        } else {
            let name = value.replace(' ', "_").replace("grey", "gray");
            NAMED_COLORS
                .iter()
                .find(|(known, _)| *known == name)
                .map(|(_, color)| *color)
                .ok_or_else(|| {
                    let known: Vec<&str> = NAMED_COLORS.iter().map(|(n, _)| *n).collect();
                    eyre!(
                        "Unknown color name: '{}'. Use #rrggbb, indexed(n) or one of: {}",
                        s.trim(),
                        known.join(", ")
                    )
                })?
        };

        Ok(if self.no_color { Color::Reset } else { color })
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Channel intensities of the xterm 6x6x6 color cube
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// Nearest entry in the color cube (palette 16-231)
fn cube_index(r: u8, g: u8, b: u8) -> u8 {
    let level = |c: u8| {
        (0u8..6)
            .min_by_key(|&i| CUBE_LEVELS[usize::from(i)].abs_diff(c))
            .unwrap_or(0)
    };
    16 + 36 * level(r) + 6 * level(g) + level(b)
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone, Default)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
}

impl Theme {
    /// Create a Theme from a ThemeConfig by parsing all color strings
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let colors = config
            .colors
            .entries()
            .into_iter()
            .map(|(name, value)| parser.parse(value).map(|c| (name.to_string(), c)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { colors })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    pub fn get_optional(&self, name: &str) -> Option<Color> {
        self.colors.get(name).copied()
    }
}

// Default configuration template
const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
