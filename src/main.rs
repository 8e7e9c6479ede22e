use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use hockey_stats::error::user_message;
use hockey_stats::print::render_text;
use hockey_stats::schema::TableSchema;
use hockey_stats::sort::SortDirection;
use hockey_stats::source::{self, DataSource};
use hockey_stats::view::TableView;
use hockey_stats::{logging, App, AppConfig, AppEvent, Args, CacheManager, Theme, APP_NAME};
use ratatui::DefaultTerminal;
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

fn render(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    terminal.draw(|frame| frame.render_widget(app, frame.area()))?;
    Ok(())
}

fn sort_direction(args: &Args) -> SortDirection {
    if args.descending {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    }
}

fn run(
    mut terminal: DefaultTerminal,
    args: &Args,
    config: AppConfig,
    theme: Theme,
    source: Arc<dyn DataSource>,
) -> Result<()> {
    let (tx, rx) = channel::<AppEvent>();
    let poll_interval = Duration::from_millis(config.performance.event_poll_interval_ms);
    let mut app = App::new_with_config(tx.clone(), source, theme, config);

    if let Some(query) = &args.query {
        app.set_query(query);
    }
    if let Some(column) = &args.sort {
        app.set_sort(app.active_entity(), column, sort_direction(args))?;
    }

    render(&mut terminal, &mut app)?;
    tx.send(AppEvent::Load)?;

    loop {
        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                crossterm::event::Event::Key(key) => tx.send(AppEvent::Key(key))?,
                crossterm::event::Event::Mouse(mouse) => tx.send(AppEvent::Mouse(mouse))?,
                crossterm::event::Event::Resize(cols, rows) => {
                    tx.send(AppEvent::Resize(cols, rows))?
                }
                _ => {}
            }
        }

        let updated = match rx.recv_timeout(Duration::from_millis(0)) {
            Ok(event) => {
                match event {
                    AppEvent::Exit => break,
                    event => {
                        if let Some(event) = app.event(&event) {
                            tx.send(event)?;
                        }
                    }
                }
                true
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => false,
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break,
        };

        if updated {
            render(&mut terminal, &mut app)?;
        }
    }
    Ok(())
}

/// Load one view synchronously and print it as text.
fn print_view(args: &Args, config: &AppConfig, source: &dyn DataSource) -> Result<()> {
    let entity = config.initial_view().unwrap_or_default();
    let schema = TableSchema::for_entity(entity);
    let mut view = TableView::new(schema.clone());
    if let Some(column) = &args.sort {
        view.set_sort(column, sort_direction(args))?;
    }

    let table = source
        .load(&schema)
        .map_err(|e| eyre!("{}", user_message(&e)))?;
    view.set_table(table, args.query.as_deref().unwrap_or(""));
    print!("{}", render_text(&view, config.display.percent_suffix));
    Ok(())
}

fn handle_early_exit_flags(args: &Args) -> Result<Option<()>> {
    if args.clear_cache {
        match CacheManager::new(APP_NAME) {
            Ok(cache) => {
                if let Err(e) = cache.clear_all() {
                    eprintln!("Error clearing cache: {}", e);
                    std::process::exit(1);
                }
                println!("Cache cleared successfully");
                return Ok(Some(()));
            }
            Err(_e) => {
                println!("No cache to clear");
                return Ok(Some(()));
            }
        }
    }

    if args.generate_config {
        match hockey_stats::ConfigManager::new(APP_NAME) {
            Ok(config) => match config.write_default_config(args.force) {
                Ok(path) => {
                    println!("Configuration written to {}", path.display());
                    return Ok(Some(()));
                }
                Err(e) => {
                    eprintln!("Error writing config: {}", e);
                    std::process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error initializing config manager: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(None)
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(()) = handle_early_exit_flags(&args)? {
        return Ok(());
    }

    color_eyre::install()?;

    let mut config = AppConfig::load(APP_NAME)?;
    config.apply_args(&args);
    config.validate()?;

    match CacheManager::new(APP_NAME).and_then(|cache| logging::init(&cache, &config.logging.level)) {
        Ok(path) => info!(log = %path.display(), version = env!("CARGO_PKG_VERSION"), "starting"),
        Err(e) => eprintln!("Warning: logging disabled: {}", e),
    }

    let theme = Theme::from_config(&config.theme)?;
    let source: Arc<dyn DataSource> = Arc::from(source::from_config(&config.source)?);

    if args.print {
        return print_view(&args, &config, source.as_ref());
    }

    let terminal = ratatui::init();
    if let Err(e) = crossterm::execute!(std::io::stdout(), EnableMouseCapture) {
        warn!(error = %e, "mouse capture unavailable");
    }
    let result = run(terminal, &args, config, theme, source);
    let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
