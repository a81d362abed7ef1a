mod app;
mod event;
mod input_map;
mod ui;

use std::fs::{self, File};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{
    DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use devtype::config::Config;
use devtype::engine::PracticeEngine;
use devtype::keyboard::catalog::{self, DEFAULT_LAYOUT_ID};
use devtype::keyboard::LayoutRegistry;
use devtype::store::JsonStore;
use devtype::text::{PassageSource, TextSource};

use app::{App, AppScreen};
use event::{AppEvent, EventHandler};
use ui::components::dashboard::Dashboard;
use ui::components::keyboard_diagram::KeyboardDiagram;
use ui::components::stats_sidebar::{StatsSidebar, accuracy_color, format_remaining};
use ui::components::typing_area::TypingArea;
use ui::layout::PracticeRegions;
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "devtype", version, about = "Terminal Devanagari typing tutor")]
struct Cli {
    #[arg(short, long, help = "Keyboard layout id (remington-gail, inscript, ...)")]
    layout: Option<String>,

    #[arg(short, long, help = "Time limit in seconds, 0 for untimed")]
    time_limit: Option<u64>,

    #[arg(long, help = "Practice text file, one passage per line")]
    text: Option<PathBuf>,

    #[arg(long, help = "Directory of extra layout files")]
    layouts_dir: Option<PathBuf>,

    #[arg(long, help = "Log filter, e.g. debug or devtype=trace")]
    log_level: Option<String>,

    #[arg(long, help = "List available layouts and exit")]
    list_layouts: bool,
}

/// Logs go to a file in the data dir; the terminal belongs to the UI.
fn init_logging(level: Option<&str>) -> Result<PathBuf> {
    let dir = JsonStore::default_dir();
    fs::create_dir_all(&dir)?;
    let path = dir.join("devtype.log");
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;

    let filter = match level {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("devtype=info")),
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(path)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_path = init_logging(cli.log_level.as_deref())?;

    let user_dir = cli.layouts_dir.clone().unwrap_or_else(catalog::user_layout_dir);
    let layouts = catalog::load_catalog(Some(user_dir.as_path()))?;

    if cli.list_layouts {
        for layout in &layouts {
            println!("{:<20} {}", layout.id(), layout.name());
        }
        return Ok(());
    }

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("config unreadable, using defaults: {e:#}");
        Config::default()
    });
    let known: Vec<&str> = layouts.iter().map(|l| l.id()).collect();
    config.normalize_layout(&known);
    if let Some(layout) = cli.layout {
        config.keyboard_layout = layout;
    }
    if let Some(secs) = cli.time_limit {
        config.time_limit_secs = secs;
    }

    let registry = LayoutRegistry::new(layouts, &config.keyboard_layout, DEFAULT_LAYOUT_ID)
        .context("no keyboard layouts available")?;
    if registry.current_layout().id() != config.keyboard_layout {
        warn!(
            "layout '{}' not found, using '{}'",
            config.keyboard_layout,
            registry.current_layout().id()
        );
        config.keyboard_layout = registry.current_layout().id().to_string();
    }

    let source = match cli.text {
        Some(path) => TextSource::File(path),
        None => config.text_source(),
    };
    let passages = PassageSource::load(&source, SmallRng::from_entropy())?;

    let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
    let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

    let store = match JsonStore::new() {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("history disabled: {e:#}");
            None
        }
    };

    let engine = PracticeEngine::new(registry, config.time_limit());
    let mut app = App::new(engine, config, theme, passages, store);
    info!("devtype started, logging to {}", log_path.display());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Tick => app.tick(Instant::now()),
            AppEvent::FocusLost => app.engine.pause(Instant::now()),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('l') => app.cycle_layout(),
            KeyCode::Char('n') => app.next_passage(),
            KeyCode::Char('r') => app.retry(),
            KeyCode::Char('p') => app.engine.pause(Instant::now()),
            _ => {}
        }
        return;
    }

    match app.screen {
        AppScreen::Practice => {
            if key.code == KeyCode::Esc {
                app.should_quit = true;
                return;
            }
            if let Some(press) = input_map::map_key_event(&key) {
                app.handle_press(press, Instant::now());
            }
        }
        AppScreen::SessionResult => match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => app.next_passage(),
            KeyCode::Char('r') => app.retry(),
            KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
            _ => {}
        },
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.surface));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Practice => render_practice(frame, app),
        AppScreen::SessionResult => render_result(frame, app),
    }
}

fn render_practice(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let now = Instant::now();
    let snapshot = app.engine.snapshot(now);
    let guidance = app.engine.guidance();
    let layout = app.engine.registry().current_layout();

    let regions = PracticeRegions::split(area, layout.rows().len());

    let mut header_spans = vec![Span::styled(
        format!(" devtype | {} ", layout.name()),
        Style::default()
            .fg(colors.banner_fg)
            .bg(colors.banner_bg)
            .add_modifier(Modifier::BOLD),
    )];
    if !regions.density.shows_sidebar() {
        let stats = &snapshot.stats;
        let mut text = format!(
            "| WPM {:.0} | Acc {:.1}% | Err {} ",
            stats.wpm, stats.accuracy, stats.errors
        );
        if let Some(remaining) = format_remaining(&snapshot) {
            text.push_str(&format!("| {remaining} "));
        }
        header_spans.push(Span::styled(
            text,
            Style::default()
                .fg(accuracy_color(colors, stats.accuracy))
                .bg(colors.banner_bg),
        ));
    }
    frame.render_widget(
        Paragraph::new(Line::from(header_spans)).style(Style::default().bg(colors.banner_bg)),
        regions.header,
    );

    if let Some(session) = app.engine.session() {
        frame.render_widget(TypingArea::new(session, app.theme), regions.text);
    }

    if let Some(keyboard_area) = regions.keyboard {
        let kbd = KeyboardDiagram::new(
            layout,
            snapshot.modifier_state,
            guidance.as_ref().map(|g| g.candidate.key),
            app.last_pressed,
            app.theme,
        );
        frame.render_widget(kbd, keyboard_area);
    }

    if let Some(sidebar_area) = regions.sidebar {
        let sidebar = StatsSidebar::new(&snapshot, guidance.as_ref(), app.benchmarks(), app.theme);
        frame.render_widget(sidebar, sidebar_area);
    }

    let footer = Paragraph::new(Line::from(Span::styled(
        " [Esc] Quit  [^L] Layout  [^N] New text  [^R] Restart  [^P] Pause  Alt = AltGr ",
        Style::default().fg(colors.muted),
    )));
    frame.render_widget(footer, regions.footer);
}

fn render_result(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    if let Some(ref summary) = app.last_summary {
        let panel = ui::layout::result_panel(area);
        frame.render_widget(Dashboard::new(summary, app.theme), panel);
    }
}
