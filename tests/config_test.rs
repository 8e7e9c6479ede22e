use hockey_stats::config::{AppConfig, ColorParser, ConfigManager, Theme};
use hockey_stats::{Args, Entity, SourceKind};
use ratatui::style::Color;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

fn write_config(config_manager: &ConfigManager, content: &str) {
    config_manager.ensure_config_dir().unwrap();
    fs::write(config_manager.config_path("config.toml"), content).expect("Failed to write config");
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");

    assert_eq!(config.source.kind, "static");
    assert!(config.source.data_dir.is_none());
    assert_eq!(config.source.remote.skaters_range, "Skaters");
    assert!(config.source.remote.timeout_secs.is_none());

    assert_eq!(config.display.initial_view, "skaters");
    assert!(config.display.alternate_rows);
    assert!(config.display.percent_suffix);

    assert_eq!(config.performance.event_poll_interval_ms, 25);

    assert_eq!(config.theme.colors.keybind_hints, "cyan");
    assert_eq!(config.theme.colors.alternate_row, "indexed(234)");

    assert_eq!(config.logging.level, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[source]"));
    assert!(template.contains("[source.remote]"));
    assert!(template.contains("[display]"));
    assert!(template.contains("[performance]"));
    assert!(template.contains("[theme.colors]"));
    assert!(template.contains("[logging]"));
    assert!(template.contains("version = \"0.1\""));
}

#[test]
fn test_default_template_parses_to_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config: AppConfig =
        toml::from_str(&config_manager.generate_default_config()).expect("Template must parse");
    assert!(config.validate().is_ok());
    assert_eq!(config.display.initial_view, AppConfig::default().display.initial_view);
    assert_eq!(config.theme.colors.header_bg, AppConfig::default().theme.colors.header_bg);
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");

    assert!(config_path.exists());
    let content = fs::read_to_string(&config_path).expect("Failed to read config");
    assert!(content.contains("[display]"));
}

#[test]
fn test_write_config_without_force_fails_if_exists() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_config(&config_manager, "version = \"0.1\"\n");

    let result = config_manager.write_default_config(false);
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("--force"));
}

#[test]
fn test_write_config_with_force_overwrites() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_config(&config_manager, "# custom\n");

    let path = config_manager
        .write_default_config(true)
        .expect("Failed to overwrite config");
    let content = fs::read_to_string(path).unwrap();
    assert!(content.contains("[source]"));
}

#[test]
fn test_load_config_with_no_file() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let config = AppConfig::load_from(&config_manager).expect("Missing file is not an error");
    assert_eq!(config.display.initial_view, "skaters");
}

#[test]
fn test_load_partial_config_keeps_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_config(
        &config_manager,
        r#"
[display]
initial_view = "teams"

[theme.colors]
active_header = "magenta"
"#,
    );

    let config = AppConfig::load_from(&config_manager).unwrap();
    assert_eq!(config.initial_view(), Some(Entity::Teams));
    assert!(config.display.alternate_rows);
    assert_eq!(config.theme.colors.active_header, "magenta");
    assert_eq!(config.theme.colors.header_fg, "white");
    assert_eq!(config.performance.event_poll_interval_ms, 25);
}

#[test]
fn test_load_invalid_toml_is_error() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_config(&config_manager, "[display\ninitial_view = ");
    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_load_invalid_value_is_error() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    write_config(&config_manager, "[source]\nkind = \"ftp\"\n");
    assert!(AppConfig::load_from(&config_manager).is_err());
}

#[test]
fn test_merge_remote_settings() {
    let mut base = AppConfig::default();
    let mut other = AppConfig::default();
    other.source.kind = "remote".to_string();
    other.source.remote.spreadsheet_id = Some("sheet-1".to_string());
    other.source.remote.teams_range = "Standings!A1:I40".to_string();
    other.source.remote.timeout_secs = Some(10);

    base.merge(other);
    assert_eq!(base.source.kind, "remote");
    assert_eq!(base.source.remote.spreadsheet_id.as_deref(), Some("sheet-1"));
    assert_eq!(base.source.remote.teams_range, "Standings!A1:I40");
    assert_eq!(base.source.remote.skaters_range, "Skaters");
    assert_eq!(base.source.remote.timeout_secs, Some(10));
}

#[test]
fn test_merge_does_not_override_with_defaults() {
    let mut base = AppConfig::default();
    base.display.initial_view = "goalies".to_string();
    base.logging.level = "warn".to_string();

    base.merge(AppConfig::default());
    assert_eq!(base.display.initial_view, "goalies");
    assert_eq!(base.logging.level, "warn");
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = AppConfig::default();
    config.version = "2.0".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.display.initial_view = "referees".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.performance.event_poll_interval_ms = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.source.remote.timeout_secs = Some(0);
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.logging.level = "loud".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.theme.colors.error = "not-a-color".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("error"));
}

#[test]
fn test_cli_args_override_config() {
    let mut config = AppConfig::default();
    let args = Args {
        source: Some(SourceKind::Remote),
        data_dir: Some(PathBuf::from("/tmp/stats")),
        spreadsheet_id: Some("sheet-9".to_string()),
        api_key: Some("key".to_string()),
        view: Some(Entity::Goalies),
        debug: true,
        ..Args::default()
    };

    config.apply_args(&args);
    assert_eq!(config.source.kind, "remote");
    assert_eq!(config.source.data_dir, Some(PathBuf::from("/tmp/stats")));
    assert_eq!(config.source.remote.spreadsheet_id.as_deref(), Some("sheet-9"));
    assert_eq!(config.source.remote.api_key.as_deref(), Some("key"));
    assert_eq!(config.initial_view(), Some(Entity::Goalies));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_theme_from_default_config() {
    std::env::remove_var("NO_COLOR");
    let theme = Theme::from_config(&AppConfig::default().theme).unwrap();
    assert_eq!(theme.get("active_header"), Color::Yellow);
    assert_eq!(theme.get("header_bg"), Color::Indexed(236));
    assert_eq!(theme.get("background"), Color::Reset);
    assert_eq!(theme.get("no_such_color"), Color::Reset);
    assert!(theme.get_optional("no_such_color").is_none());
}

#[test]
fn test_color_parser_formats() {
    std::env::remove_var("NO_COLOR");
    let parser = ColorParser::new();
    assert_eq!(parser.parse("red").unwrap(), Color::Red);
    assert_eq!(parser.parse("bright_white").unwrap(), Color::Indexed(15));
    assert_eq!(parser.parse("dark gray").unwrap(), Color::Indexed(8));
    assert_eq!(parser.parse("indexed(42)").unwrap(), Color::Indexed(42));
    assert_eq!(parser.parse("Default").unwrap(), Color::Reset);
    assert!(parser.parse("indexed(256)").is_err());
    assert!(parser.parse("#12345").is_err());
    assert!(parser.parse("chartreuse").is_err());
}
