mod card;
mod host;
mod logging;
mod stats;
mod surface;

use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEvent, MouseEventKind,
};
use log::{info, warn};
use nightsky_config::{Config, ConfigError};
use nightsky_core::AnimationSpeed;
use nightsky_starfield::{StarfieldLayer, StarfieldSettings};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Layout, Size},
    style::{Color, Stylize},
    text::Line,
    widgets::{Block, Clear, Paragraph},
};

use crate::host::{TerminalHost, viewport_for};
use crate::stats::StatsMonitor;
use crate::surface::CanvasSurface;

/// Pixels scrolled per key press or wheel notch; one card line.
const SCROLL_STEP_PX: f32 = 120.0;

/// Widest the profile card gets, in cells.
const CARD_WIDTH: u16 = 64;

const ACCENT: Color = Color::Cyan;

/// A portfolio card floating over an animated night sky.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for the sky, for a reproducible layout.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of background stars.
    #[arg(long)]
    stars: Option<usize>,
    /// Do not fetch coding statistics.
    #[arg(long)]
    no_stats: bool,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => match Config::load() {
            Ok(config) => config,
            Err(ConfigError::NoConfigDir) => Config::default(),
            Err(e) => return Err(e.into()),
        },
    };
    if cli.seed.is_some() {
        config.starfield.seed = cli.seed;
    }
    if let Some(stars) = cli.stars {
        config.starfield.star_count = stars;
    }
    if cli.no_stats {
        config.stats.enabled = false;
    }

    if let Some(path) = logging::init(config.log_level_filter())? {
        info!("logging to {}", path.display());
    }

    let terminal = ratatui::init();
    let result = App::new(config).run(terminal);
    let _ = crossterm::execute!(stdout(), DisableMouseCapture);
    ratatui::restore();
    result
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    config: Config,
    host: TerminalHost,
    /// Background sky; `None` while switched off.
    sky: Option<StarfieldLayer<CanvasSurface>>,
    stats: Option<StatsMonitor>,
    speed: AnimationSpeed,
    /// Terminal size in cells.
    size: Size,
    /// Page scroll offset in sky pixels.
    scroll_px: f32,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config) -> Self {
        let speed = config.starfield.speed;
        Self {
            running: false,
            config,
            host: TerminalHost::new(),
            sky: None,
            stats: None,
            speed,
            size: Size::default(),
            scroll_px: 0.0,
        }
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        crossterm::execute!(stdout(), EnableMouseCapture)?;
        self.size = terminal.size()?;
        self.mount_sky();
        self.start_stats();

        self.running = true;
        while self.running {
            if let (Some(sky), Some(handle)) = (self.sky.as_mut(), self.host.take_frame()) {
                sky.on_frame(handle, self.host.now_ms(), self.scroll_px, &mut self.host);
            }
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
        }

        self.unmount_sky();
        if let Some(stats) = self.stats.take() {
            stats.stop();
        }
        Ok(())
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        if let Some(surface) = self.sky.as_ref().and_then(|sky| sky.surface()) {
            frame.render_widget(surface.widget(), area);
        }

        let snapshot = self.stats.as_ref().map(StatsMonitor::snapshot);
        let max_age = self.refresh_interval();
        let lines = card::card_lines(&self.config.profile, snapshot.as_ref(), max_age, ACCENT);
        let card_height = (lines.len() as u16 + 2).min(area.height.saturating_sub(1));

        let rows = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(card_height),
            Constraint::Fill(1),
            Constraint::Length(1), // Help text
        ])
        .split(area);
        let columns = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(CARD_WIDTH.min(area.width)),
            Constraint::Fill(1),
        ])
        .split(rows[1]);
        let card_area = columns[1];

        // Scroll the card within its box
        let max_scroll = (lines.len() as u16).saturating_sub(card_height.saturating_sub(2));
        let scroll = ((self.scroll_px / SCROLL_STEP_PX) as u16).min(max_scroll);

        let card = Paragraph::new(lines).scroll((scroll, 0)).block(
            Block::bordered()
                .border_style(ACCENT)
                .title(Line::from(self.config.profile.name.clone().bold()).centered()),
        );
        frame.render_widget(Clear, card_area);
        frame.render_widget(card, card_area);

        let mut help = vec![
            "q".bold().fg(ACCENT),
            " quit  ".dark_gray(),
            "j/k".bold().fg(ACCENT),
            " scroll  ".dark_gray(),
            "s".bold().fg(ACCENT),
            " sky  ".dark_gray(),
            "f".bold().fg(ACCENT),
            format!(" speed ({})", self.speed.name()).dark_gray(),
        ];
        if self.stats.is_some() {
            help.push("  r".bold().fg(ACCENT));
            help.push(" refresh".dark_gray());
        }
        frame.render_widget(Line::from(help).centered(), rows[3]);
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Polls with the frame interval as timeout so the sky keeps moving.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        if event::poll(Duration::from_millis(self.speed.frame_interval_ms()))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Mouse(mouse) => self.on_mouse_event(mouse),
                Event::Resize(width, height) => self.on_resize(Size::new(width, height)),
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char('j') | KeyCode::Down) => self.scroll_by(SCROLL_STEP_PX),
            (_, KeyCode::Char('k') | KeyCode::Up) => self.scroll_by(-SCROLL_STEP_PX),
            (_, KeyCode::Char('s')) => self.toggle_sky(),
            (_, KeyCode::Char('f')) => self.cycle_speed(),
            (_, KeyCode::Char('r')) => self.refresh_stats(),
            _ => {}
        }
    }

    fn on_mouse_event(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.scroll_by(SCROLL_STEP_PX),
            MouseEventKind::ScrollUp => self.scroll_by(-SCROLL_STEP_PX),
            _ => {}
        }
    }

    fn on_resize(&mut self, size: Size) {
        self.size = size;
        if !self.host.wants_resize() {
            return;
        }
        if let Some(sky) = self.sky.as_mut() {
            sky.on_resize(viewport_for(size));
        }
    }

    fn scroll_by(&mut self, delta_px: f32) {
        self.scroll_px = (self.scroll_px + delta_px).max(0.0);
    }

    /// Mount the background sky at the current terminal size.
    fn mount_sky(&mut self) {
        let settings = StarfieldSettings {
            speed: self.speed,
            ..self.config.starfield.settings()
        };
        let sky = StarfieldLayer::mount(
            CanvasSurface::acquire(self.size),
            viewport_for(self.size),
            settings,
            &mut self.host,
        );
        self.sky = Some(sky);
    }

    fn unmount_sky(&mut self) {
        if let Some(mut sky) = self.sky.take() {
            sky.teardown(&mut self.host);
        }
    }

    /// Switch the sky off, or remount it with a fresh population.
    fn toggle_sky(&mut self) {
        let was_running = self.sky.as_ref().is_some_and(|sky| sky.is_running());
        self.unmount_sky();
        if !was_running {
            self.mount_sky();
        }
    }

    fn cycle_speed(&mut self) {
        self.speed = self.speed.next();
        if let Some(starfield) = self.sky.as_mut().and_then(|sky| sky.starfield_mut()) {
            starfield.set_speed(self.speed);
        }
    }

    fn start_stats(&mut self) {
        let stats = &self.config.stats;
        if !stats.enabled {
            return;
        }
        if stats.username.trim().is_empty() {
            warn!("stats enabled without a username, skipping");
            return;
        }
        let monitor = StatsMonitor::new(
            stats.username.clone(),
            self.refresh_interval(),
            StatsMonitor::default_cache_path(),
        );
        monitor.start();
        self.stats = Some(monitor);
    }

    fn refresh_stats(&mut self) {
        if let Some(stats) = &self.stats {
            stats.request_refresh();
        }
    }

    fn refresh_interval(&self) -> Duration {
        self.config.stats.refresh_interval()
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}
