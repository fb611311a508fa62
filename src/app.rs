//! Terminal front end: raw-mode setup and the single UI loop.
//!
//! The loop is the only place session state changes. Each iteration drains
//! socket events, advances timers, fits panes to the current layout, draws,
//! then waits briefly for keyboard input.

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use par_mux_config::Config;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use tokio::runtime::Runtime;

use crate::cli::RuntimeOptions;
use crate::cli::commands::{config_path, finalize_config};
use crate::credentials::Credentials;
use crate::layout::{FileStore, LayoutPersistence};
use crate::multiplexer::{KeyOutcome, Multiplexer, render};
use crate::session::WsConnector;

/// Input poll interval; also bounds timer resolution for history capture
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Restores the user's terminal on every exit path
struct TerminalGuard;

impl TerminalGuard {
    fn enter(stdout: &mut Stdout) -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let guard = TerminalGuard;
        execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
            .context("Failed to enter alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Main application state
pub struct App {
    config: Config,
    credentials: Arc<Credentials>,
    runtime: Arc<Runtime>,
    runtime_options: RuntimeOptions,
}

impl App {
    /// Create a new application
    pub fn new(runtime: Arc<Runtime>, runtime_options: RuntimeOptions) -> Result<Self> {
        let path = config_path(runtime_options.config_path.as_deref());
        let config = Config::load_from(&path)
            .with_context(|| format!("Failed to load config from {:?}", path))?;

        // CLI flag, RUST_LOG and DEBUG_LEVEL all outrank the config file
        crate::debug::init_log_bridge(crate::debug::resolve_level(
            runtime_options.log_level,
            config.log_level.map(|l| l.to_level_filter()),
        ));

        let config = finalize_config(config, runtime_options.bridge_url.as_deref())?;

        let credentials = Arc::new(resolve_credentials(&runtime_options, &config)?);
        log::info!("Session target {}", credentials.label());

        Ok(Self {
            config,
            credentials,
            runtime,
            runtime_options,
        })
    }

    /// Run the application until the user quits
    pub fn run(self) -> Result<()> {
        let connector = Arc::new(WsConnector::new(Arc::clone(&self.runtime)));
        let store = FileStore::for_session(&self.runtime_options.session);
        log::info!("Layout store {:?}", store.path());
        let layout = LayoutPersistence::new(
            Box::new(store),
            Duration::from_secs(self.config.layout_expiry_secs),
        );

        let mut stdout = io::stdout();
        let _guard = TerminalGuard::enter(&mut stdout)?;
        let mut terminal =
            Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")?;

        let (mut mux, mut events) = Multiplexer::new(
            self.config,
            self.credentials,
            connector,
            layout,
            self.runtime_options.fresh,
        );

        loop {
            let now = Instant::now();
            while let Ok(event) = events.try_recv() {
                mux.handle_session_event(event, now);
            }
            mux.tick(now);

            let size = terminal.size()?;
            let (panes_area, _) = render::split_screen(Rect::new(0, 0, size.width, size.height));
            let rects = render::pane_rects(mux.root(), panes_area);
            for (id, rect) in rects {
                let (cols, rows) = render::inner_size(rect);
                mux.resize_pane(id, cols, rows);
            }

            terminal.draw(|frame| render::draw(frame, &mux))?;

            if !event::poll(FRAME_INTERVAL)? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if mux.handle_key(key, Instant::now()) == KeyOutcome::Quit {
                        break;
                    }
                }
                Event::Paste(text) => {
                    mux.send_input(text.as_bytes());
                }
                _ => {}
            }
        }

        log::info!("Quit requested, closing {} sessions", mux.session_count());
        mux.shutdown();
        Ok(())
    }
}

/// Build credentials from CLI flags, checking the secret size before any connection
fn resolve_credentials(options: &RuntimeOptions, config: &Config) -> Result<Credentials> {
    let host = options
        .host
        .clone()
        .context("--host is required to start a session")?;
    let user = options
        .user
        .clone()
        .context("--user is required to start a session")?;

    match options.key_file {
        Some(ref path) => Credentials::from_key_file(host, user, path, config.max_secret_bytes)
            .with_context(|| format!("Failed to load key file {:?}", path)),
        None => {
            log::warn!("No --key-file given, connecting without a secret");
            Ok(Credentials::new(host, user, String::new()))
        }
    }
}
