mod app;
mod catalog;
mod config;
mod engine;
mod event;
mod session;
mod store;
mod ui;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};
use tracing_subscriber::EnvFilter;

use app::{App, AppScreen, SETUP_FIELDS};
use config::Config;
use engine::shuffle::ShuffleMode;
use event::{AppEvent, EventHandler};
use ui::grid::KanaGrid;
use ui::summary::SummaryCard;

#[derive(Parser)]
#[command(name = "kanadr", version, about = "Terminal kana drill with adaptive progression")]
struct Cli {
    #[arg(short, long, help = "Script track (hiragana, katakana, both)")]
    script: Option<String>,

    #[arg(long, help = "Shuffle mode (none, rows, columns, both)")]
    shuffle: Option<String>,

    #[arg(long, help = "Override the data directory")]
    data_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(script) = cli.script {
        config.default_script = script;
    }
    if let Some(shuffle) = &cli.shuffle {
        config.shuffle = shuffle.clone();
    }
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir.to_string_lossy().to_string();
    }
    config.normalize();

    init_logging(&config.data_dir())?;

    let mut app = App::new(config);
    if let Some(shuffle) = cli.shuffle {
        app.settings.options.shuffle = ShuffleMode::from_key(&shuffle);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(app.config.tick_interval());

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Log to a file in the data dir; stdout belongs to the TUI.
fn init_logging(data_dir: &Path) -> Result<()> {
    fs::create_dir_all(data_dir)?;
    let file = fs::File::create(data_dir.join("kanadr.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
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
            AppEvent::Tick => app.tick(),
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
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Game => handle_game_key(app, key),
        AppScreen::Summary => handle_summary_key(app, key),
        AppScreen::Setup => handle_setup_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('1') => app.start_round(),
        KeyCode::Char('2') => app.go_to_setup(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.menu_selected = app.menu_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.menu_selected = (app.menu_selected + 1).min(2);
        }
        KeyCode::Enter => match app.menu_selected {
            0 => app.start_round(),
            1 => app.go_to_setup(),
            _ => app.should_quit = true,
        },
        _ => {}
    }
}

fn handle_game_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.go_to_menu(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Enter => app.submit_input(),
        KeyCode::Char(ch) => app.push_char(ch),
        _ => {}
    }
}

fn handle_summary_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('r') => app.start_round(),
        KeyCode::Char('q') | KeyCode::Esc => app.go_to_menu(),
        _ => {}
    }
}

fn handle_setup_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.go_to_menu(),
        KeyCode::Up | KeyCode::Char('k') => {
            app.setup_selected = app.setup_selected.saturating_sub(1);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.setup_selected = (app.setup_selected + 1).min(SETUP_FIELDS - 1);
        }
        KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Right | KeyCode::Left => {
            app.setup_toggle();
        }
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Game => render_game(frame, app),
        AppScreen::Summary => render_summary(frame, app),
        AppScreen::Setup => render_setup(frame, app),
    }
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let streak_text = if app.stats.daily_streak > 0 {
        format!(" | {} day streak", app.stats.daily_streak)
    } else {
        String::new()
    };
    let best_text = app
        .stats
        .best_time_secs
        .map(|secs| format!(" | best {secs:.1}s"))
        .unwrap_or_default();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " kanadr ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" {}{streak_text}{best_text}", app.level.key())),
    ]));
    frame.render_widget(header, layout[0]);

    let entries = ["Start round", "Setup", "Quit"];
    let lines: Vec<Line> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let marker = if i == app.menu_selected { " > " } else { "   " };
            let style = if i == app.menu_selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Line::from(Span::styled(format!("{marker}{}", entry), style))
        })
        .collect();
    let menu = Paragraph::new(lines).block(Block::bordered().title(" Menu "));
    frame.render_widget(menu, ui::centered_rect(40, 50, layout[1]));

    let footer = Paragraph::new(Span::styled(
        " [1] Play  [2] Setup  [q] Quit ",
        Style::default().fg(Color::DarkGray),
    ));
    frame.render_widget(footer, layout[2]);
}

fn render_game(frame: &mut ratatui::Frame, app: &App) {
    if let Some(round) = &app.round {
        let grid = KanaGrid::new(round, &app.input, app.rejected);
        frame.render_widget(grid, frame.area());
    }
}

fn render_summary(frame: &mut ratatui::Frame, app: &App) {
    if let Some(summary) = &app.last_summary {
        let centered = ui::centered_rect(60, 60, frame.area());
        frame.render_widget(SummaryCard::new(summary, &app.stats), centered);
    }
}

fn render_setup(frame: &mut ratatui::Frame, app: &App) {
    let area = ui::centered_rect(60, 70, frame.area());
    let block = Block::bordered().title(" Setup ");
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let on_off = |enabled: bool| if enabled { "on" } else { "off" };
    let scripts = &app.settings.filters.character_types;
    let modifiers = &app.settings.filters.modifier_group;
    let fields = [
        ("Hiragana", on_off(scripts.hiragana).to_string()),
        ("Katakana", on_off(scripts.katakana).to_string()),
        ("Romaji", on_off(scripts.romaji).to_string()),
        ("Dakuten", on_off(modifiers.dakuten).to_string()),
        ("Handakuten", on_off(modifiers.handakuten).to_string()),
        (
            "Shuffle",
            app.settings.options.shuffle.to_key().to_string(),
        ),
    ];

    let mut lines = vec![
        Line::from(Span::styled(
            " arrows to navigate, Enter to change, ESC to go back",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    for (i, (label, value)) in fields.iter().enumerate() {
        let selected = i == app.setup_selected;
        let marker = if selected { " > " } else { "   " };
        let style = if selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{marker}{label:<12}< {value} >"),
            style,
        )));
    }

    Paragraph::new(lines).render(inner, frame.buffer_mut());
}
