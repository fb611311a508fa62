//! Terminal multiplexer composition root.
//!
//! Owns the pane tree (through [`PaneManager`]) and a map of live sessions
//! keyed by leaf id. Sessions are never stored in the tree: every tree
//! mutation is followed by a reconciliation pass that connects new leaves
//! and drops sessions whose leaf disappeared, then the layout is persisted.
//!
//! Sub-modules:
//! - [`keys`]: prefix key, shortcut table, keystroke encoding
//! - [`render`]: ratatui drawing of the tree

pub mod keys;
pub mod render;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use crossterm::event::KeyEvent;
use par_mux_config::Config;
use tokio::sync::mpsc;

use crate::credentials::Credentials;
use crate::layout::LayoutPersistence;
use crate::pane::{PaneId, PaneManager, PaneTree, SplitDirection};
use crate::session::{
    BridgeConnector, SessionConnection, SessionError, SessionEvent, VtSurface,
};
use keys::{MuxCommand, PrefixKey, command_for, encode_key};

/// What the front end should do after a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

pub struct Multiplexer {
    config: Config,
    panes: PaneManager,
    sessions: HashMap<PaneId, SessionConnection<VtSurface>>,
    connector: Arc<dyn BridgeConnector>,
    events: mpsc::UnboundedSender<SessionEvent>,
    layout: LayoutPersistence,
    prefix: PrefixKey,
    prefix_armed: bool,
}

impl Multiplexer {
    /// Mount the multiplexer.
    ///
    /// Restores the stored layout unless `fresh` is set or none is usable,
    /// then connects every leaf. Returns the receiver the caller must drain
    /// into [`handle_session_event`](Self::handle_session_event).
    pub fn new(
        config: Config,
        credentials: Arc<Credentials>,
        connector: Arc<dyn BridgeConnector>,
        mut layout: LayoutPersistence,
        fresh: bool,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();

        let restored = if fresh {
            None
        } else {
            layout.restore(&credentials)
        };
        let panes = match restored.and_then(PaneManager::from_tree) {
            Some(panes) => panes,
            None => PaneManager::new(credentials),
        };

        let prefix = PrefixKey::parse(&config.prefix_key).unwrap_or_else(|err| {
            log::warn!("{}, using ctrl-a", err);
            PrefixKey::default()
        });

        let mut mux = Self {
            config,
            panes,
            sessions: HashMap::new(),
            connector,
            events: tx,
            layout,
            prefix,
            prefix_armed: false,
        };
        mux.after_mutation();
        (mux, rx)
    }

    /// Split `target`; the new pane is connected and focused
    pub fn split(&mut self, target: PaneId, direction: SplitDirection) -> Option<PaneId> {
        let new_id = self.panes.split(target, direction)?;
        self.after_mutation();
        Some(new_id)
    }

    pub fn split_focused(&mut self, direction: SplitDirection) -> Option<PaneId> {
        self.split(self.panes.focused_pane_id(), direction)
    }

    /// Close `target` and release its session. Returns the new focus.
    pub fn close(&mut self, target: PaneId) -> Option<PaneId> {
        let focus = self.panes.close_pane(target)?;
        self.after_mutation();
        Some(focus)
    }

    pub fn close_focused(&mut self) -> Option<PaneId> {
        self.close(self.panes.focused_pane_id())
    }

    pub fn focus(&mut self, id: PaneId) -> bool {
        let changed = self.panes.focus_pane(id);
        self.sync_focus();
        changed
    }

    pub fn focus_next(&mut self) -> PaneId {
        let id = self.panes.focus_next();
        self.sync_focus();
        id
    }

    pub fn focus_prev(&mut self) -> PaneId {
        let id = self.panes.focus_prev();
        self.sync_focus();
        id
    }

    /// Manually reconnect `id`, closing any stale socket first
    pub fn reconnect(&mut self, id: PaneId) -> Result<(), SessionError> {
        let Some(session) = self.sessions.get_mut(&id) else {
            log::debug!("reconnect ignored: no session for pane {}", id);
            return Ok(());
        };
        session.connect(self.connector.as_ref(), &self.events)
    }

    /// Start a history capture on `id`
    pub fn capture_history(&mut self, id: PaneId, now: Instant) -> Result<(), SessionError> {
        let Some(session) = self.sessions.get_mut(&id) else {
            log::debug!("capture ignored: no session for pane {}", id);
            return Ok(());
        };
        session.start_capture(now)
    }

    /// Route a socket event to its session. Events for closed panes are dropped.
    pub fn handle_session_event(&mut self, event: SessionEvent, now: Instant) {
        match self.sessions.get_mut(&event.pane_id) {
            Some(session) => session.handle_event(event.epoch, event.kind, now),
            None => crate::debug_log!(
                "MUX",
                "dropping event for closed pane {}",
                event.pane_id
            ),
        }
    }

    /// Advance per-session timers. Returns panes whose history was just published.
    pub fn tick(&mut self, now: Instant) -> Vec<PaneId> {
        let mut published = Vec::new();
        for (id, session) in &mut self.sessions {
            if session.tick(now).is_some() {
                published.push(*id);
            }
        }
        published
    }

    /// Forward bytes to the focused pane
    pub fn send_input(&mut self, bytes: &[u8]) -> bool {
        let id = self.panes.focused_pane_id();
        self.sessions
            .get(&id)
            .is_some_and(|session| session.send_input(bytes))
    }

    pub fn resize_pane(&mut self, id: PaneId, cols: u16, rows: u16) {
        if let Some(session) = self.sessions.get_mut(&id) {
            session.resize(cols, rows);
        }
    }

    /// Handle one key press from the front end
    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> KeyOutcome {
        if !self.prefix_armed {
            if self.prefix.matches(&key) {
                self.prefix_armed = true;
            } else if let Some(bytes) = encode_key(&key) {
                self.send_input(&bytes);
            }
            return KeyOutcome::Continue;
        }

        self.prefix_armed = false;
        if self.prefix.matches(&key) {
            let bytes = self.prefix.as_bytes();
            self.send_input(&bytes);
            return KeyOutcome::Continue;
        }
        let Some(command) = command_for(&key) else {
            return KeyOutcome::Continue;
        };
        self.run_command(command, now)
    }

    pub fn run_command(&mut self, command: MuxCommand, now: Instant) -> KeyOutcome {
        let focused = self.panes.focused_pane_id();
        match command {
            MuxCommand::Split(direction) => {
                self.split(focused, direction);
            }
            MuxCommand::Close => {
                self.close(focused);
            }
            MuxCommand::FocusNext => {
                self.focus_next();
            }
            MuxCommand::FocusPrev => {
                self.focus_prev();
            }
            MuxCommand::Reconnect => {
                if let Err(err) = self.reconnect(focused) {
                    log::warn!("reconnect of pane {} failed: {}", focused, err);
                }
            }
            MuxCommand::CaptureHistory => {
                if let Err(err) = self.capture_history(focused, now) {
                    log::info!("history capture on pane {} not started: {}", focused, err);
                }
            }
            MuxCommand::Quit => return KeyOutcome::Quit,
        }
        KeyOutcome::Continue
    }

    fn after_mutation(&mut self) {
        self.sync_sessions();
        self.sync_focus();
        if let Err(err) = self.layout.save(self.panes.root()) {
            log::warn!("Failed to persist layout: {}", err);
        }
    }

    /// Connect sessions for new leaves and drop sessions of removed ones.
    fn sync_sessions(&mut self) {
        let live: HashSet<PaneId> = self.panes.pane_ids().into_iter().collect();

        self.sessions.retain(|id, _| {
            let keep = live.contains(id);
            if !keep {
                crate::debug_info!("MUX", "releasing session for pane {}", id);
            }
            keep
        });

        for pane in self.panes.all_panes() {
            if self.sessions.contains_key(&pane.id) {
                continue;
            }
            let surface = VtSurface::new(
                self.config.cols,
                self.config.rows,
                self.config.scrollback_lines,
            );
            let mut session = SessionConnection::new(
                pane.id,
                Arc::clone(&pane.credentials),
                self.config.bridge_url.clone(),
                surface,
                self.config.history_capture.clone(),
            );
            if let Err(err) = session.connect(self.connector.as_ref(), &self.events) {
                log::warn!("pane {} failed to connect: {}", pane.id, err);
            }
            self.sessions.insert(pane.id, session);
        }
    }

    fn sync_focus(&mut self) {
        let focused = self.panes.focused_pane_id();
        for (id, session) in &mut self.sessions {
            session.set_focused(*id == focused);
        }
    }

    /// Drop every session (closes all sockets)
    pub fn shutdown(&mut self) {
        self.sessions.clear();
    }

    pub fn root(&self) -> &PaneTree {
        self.panes.root()
    }

    pub fn panes(&self) -> &PaneManager {
        &self.panes
    }

    pub fn focused_pane_id(&self) -> PaneId {
        self.panes.focused_pane_id()
    }

    pub fn session(&self, id: PaneId) -> Option<&SessionConnection<VtSurface>> {
        self.sessions.get(&id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_prefix_armed(&self) -> bool {
        self.prefix_armed
    }
}
