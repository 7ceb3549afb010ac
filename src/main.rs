mod app;
mod event;
mod ui;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    self as term, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::Style;
use ratatui::widgets::Block;

use suspense::config::Config;
use suspense::keymap::KeyMap;
use suspense::session::experiment::Experiment;
use suspense::session::navigator::Action;
use suspense::store::json_store::JsonStore;
use suspense::store::schema::SessionMeta;
use suspense::text::layout::line_dump;
use suspense::text::metrics::CellMetrics;
use suspense::text::source::{bundled_training_rows, load_rows};

use app::App;
use event::{AppEvent, EventHandler};
use ui::components::draw_canvas::DrawCanvas;
use ui::components::memory_recap::MemoryRecap;
use ui::components::status_bar::StatusBar;
use ui::components::text_box::TextBox;
use ui::layout::{ScreenLayout, experiment_area};
use ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "suspense",
    version,
    about = "Read a text screen by screen and draw how suspenseful it feels"
)]
struct Cli {
    #[arg(short, long, help = "Main text: JSON array of rows or plain text, one paragraph per line")]
    text: Option<PathBuf>,

    #[arg(long, help = "Training text replacing the bundled one")]
    training: Option<PathBuf>,

    #[arg(long, help = "Go straight to the main text")]
    skip_training: bool,

    #[arg(short, long, default_value = "anonymous", help = "Participant id")]
    participant: String,

    #[arg(short, long, default_value_t = 1, help = "Position of this text in the experiment")]
    round: u32,

    #[arg(long = "meta", value_parser = parse_meta, help = "Extra metadata as key=value, repeatable")]
    meta: Vec<(String, String)>,

    #[arg(long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Directory results are written to")]
    results_dir: Option<PathBuf>,

    #[arg(
        short,
        long,
        help = "Lines per screen (default 10). Each line needs a text row, so 10 lines want a terminal about 30 rows tall"
    )]
    lines: Option<usize>,

    #[arg(long, help = "Write the default config file and exit")]
    init_config: bool,
}

fn parse_meta(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{s}`"))?;
    if key.trim().is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((key.trim().to_string(), value.trim().to_string()))
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging() -> Result<PathBuf> {
    let dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("suspense");
    fs::create_dir_all(&dir)?;
    let path = dir.join("suspense.log");
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("suspense=info".parse()?),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(path)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if cli.init_config {
        config.save()?;
        println!("Wrote default config to {}", Config::config_path().display());
        return Ok(());
    }
    let Some(text_path) = cli.text.as_deref() else {
        bail!("no text given, pass one with --text <FILE>");
    };

    let log_path = init_logging()?;

    if let Some(lines) = cli.lines {
        config.lines_per_screen = lines;
    }
    if let Some(dir) = &cli.results_dir {
        config.results_dir = dir.to_string_lossy().to_string();
    }
    if let Some(theme) = &cli.theme {
        config.theme = theme.clone();
    }
    if cli.skip_training {
        config.training_enabled = false;
    }
    config.validate();

    let main_rows = load_rows(text_path).with_context(|| format!("reading {}", text_path.display()))?;
    let training_rows = if !config.training_enabled {
        None
    } else if let Some(path) = &cli.training {
        Some(load_rows(path).with_context(|| format!("reading {}", path.display()))?)
    } else {
        Some(bundled_training_rows()?)
    };

    let keymap = KeyMap::from_config(&config.keys)?;
    let theme = Theme::load(&config.theme).unwrap_or_else(|| {
        tracing::warn!(
            "Unknown theme {}, bundled themes: {}",
            config.theme,
            Theme::available_themes().join(", ")
        );
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(theme));
    let store = JsonStore::with_base_dir(PathBuf::from(&config.results_dir))?;
    let mut meta = SessionMeta::new(&cli.participant, cli.round);
    meta.extra.extend(cli.meta);

    let (columns, rows) = term::size()?;
    let area = experiment_area(ratatui::layout::Rect::new(0, 0, columns, rows));
    let experiment = Experiment::build(
        &main_rows,
        training_rows.as_deref(),
        &config,
        (f64::from(area.width), f64::from(area.height)),
        &CellMetrics,
    )
    .with_context(|| {
        format!(
            "laying out {} lines per screen on a {columns}x{rows} terminal; \
             use a taller terminal or fewer lines with --lines",
            config.lines_per_screen
        )
    })?;

    store.save_lines(&meta, &line_dump(&experiment.main.screens))?;
    tracing::info!(
        "Session for {} round {} on a {}x{} terminal",
        meta.participant,
        meta.round,
        columns,
        rows
    );

    let mut app = App::new(experiment, keymap, theme, meta, store);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(Duration::from_millis(100));

    app.start();
    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }
    report(&app, &log_path);

    Ok(())
}

fn report(app: &App, log_path: &Path) {
    if app.exported.is_empty() {
        println!("No results written. See {}", log_path.display());
        return;
    }
    println!("Results for {}:", app.meta.participant);
    for path in &app.exported {
        println!("  {}", path.display());
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;
        if app.bell {
            app.bell = false;
            let mut out = io::stdout();
            out.write_all(b"\x07")?;
            out.flush()?;
        }

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Mouse(mouse) => app.handle_draw(mouse.column, mouse.row),
            // Redraw to expire the cue flash.
            AppEvent::Tick => {}
            // Geometry is fixed for the whole session.
            AppEvent::Resize(_, _) => {}
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

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        tracing::warn!("Session aborted with Ctrl-C");
        app.finish();
        return;
    }

    if let Some(action) = app.keymap.action_for(&key) {
        app.handle_action(action);
    }
}

fn hints(app: &App) -> Vec<(String, &'static str)> {
    let screen = app.experiment.screen();
    [
        (Action::Forward, "next"),
        (Action::Backward, "back"),
        (Action::Delete, "erase"),
        (Action::ZoomIn, "zoom in"),
        (Action::ZoomOut, "zoom out"),
        (Action::Quit, "quit"),
    ]
    .into_iter()
    .filter(|(action, _)| screen.allows(*action))
    .map(|(action, what)| (app.keymap.label(action), what))
    .collect()
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;
    let experiment = &app.experiment;
    let layout = ScreenLayout::new(area, &experiment.geometry);

    frame.render_widget(
        Block::default().style(Style::default().fg(colors.fg()).bg(colors.bg())),
        area,
    );

    let nav = experiment.navigator();
    let screen = nav.screen();
    frame.render_widget(TextBox::new(screen, app.theme), layout.text);
    frame.render_widget(DrawCanvas::new(screen, &experiment.zoom, app.theme), layout.draw);
    if !experiment.is_training() {
        frame.render_widget(MemoryRecap::new(&experiment.memory, app.theme, app.recap_highlighted()), layout.memory);
    }

    let phase = if experiment.is_training() { "Training" } else { "Reading" };
    let position = format!("{phase} {}/{}", nav.current + 1, nav.screen_count());
    frame.render_widget(
        StatusBar::new(position, hints(app), app.active_cue(), app.theme),
        layout.status,
    );
}
