//! Per-pane session connection to the SSH bridge.
//!
//! A [`SessionConnection`] owns one pane's socket link, its terminal surface
//! and the per-pane [`SessionInfo`]. It is driven entirely from the UI loop:
//! socket tasks post [`SessionEvent`]s, the loop routes them here with
//! [`SessionConnection::handle_event`] and calls [`SessionConnection::tick`]
//! to advance history-capture deadlines.
//!
//! Sub-modules:
//! - [`protocol`]: handshake, resize and input frames
//! - [`transport`]: connector trait and the WebSocket implementation
//! - [`inbound`]: the inbound handler slot used by history capture
//! - [`surface`]: terminal surface trait and the `vt100` implementation

mod inbound;
mod protocol;
mod surface;
mod transport;

pub use inbound::{InboundHandler, InboundSlot};
pub use protocol::{HandshakeFrame, OutboundFrame, ResizeFrame, WirePayload};
pub use surface::{TerminalSurface, VtSurface};
pub use transport::{
    BridgeConnector, BridgeLink, OpenRequest, SessionEvent, SessionEventKind, WsConnector,
    validate_bridge_url,
};

use std::sync::Arc;
use std::time::{Duration, Instant};

use par_mux_config::HistoryCaptureConfig;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::credentials::Credentials;
use crate::cwd_tracker::track_directory;
use crate::history::{CaptureStatus, HISTORY_COMMAND, HistoryCapture};
use crate::pane::PaneId;

/// Errors from the session layer
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("bridge URL must start with ws:// or wss://, got {0:?}")]
    InvalidUrl(String),

    #[error("authentication secret is {size} bytes, limit is {max}")]
    SecretTooLarge { size: usize, max: usize },

    #[error("session is not connected")]
    NotConnected,

    #[error("a history capture is already running")]
    CaptureInProgress,

    #[error("bridge connection task is gone")]
    SendFailed,

    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionState {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
        }
    }
}

/// Per-pane information derived from the session (not persisted)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionInfo {
    /// Most-recent-first, de-duplicated, bounded
    pub command_history: Vec<String>,
    pub current_working_directory: Option<String>,
    pub focused: bool,
}

const CLOSED_NOTICE: &str = "\r\n\x1b[31m[connection closed]\x1b[0m\r\n";

/// One pane's live session
pub struct SessionConnection<S: TerminalSurface> {
    pane_id: PaneId,
    credentials: Arc<Credentials>,
    bridge_url: String,
    state: ConnectionState,
    epoch: u64,
    link: Option<BridgeLink>,
    surface: S,
    inbound: InboundSlot,
    info: SessionInfo,
    connected_at: Option<Instant>,
    captured_once: bool,
    resize_pending: bool,
    capture_config: HistoryCaptureConfig,
}

impl<S: TerminalSurface> SessionConnection<S> {
    pub fn new(
        pane_id: PaneId,
        credentials: Arc<Credentials>,
        bridge_url: impl Into<String>,
        surface: S,
        capture_config: HistoryCaptureConfig,
    ) -> Self {
        Self {
            pane_id,
            credentials,
            bridge_url: bridge_url.into(),
            state: ConnectionState::Disconnected,
            epoch: 0,
            link: None,
            surface,
            inbound: InboundSlot::new(),
            info: SessionInfo::default(),
            connected_at: None,
            captured_once: false,
            resize_pending: false,
            capture_config,
        }
    }

    /// Open a fresh connection, closing any previous one first.
    ///
    /// Also used for manual reconnect from any state. Events from the
    /// previous connection are ignored from here on.
    pub fn connect(
        &mut self,
        connector: &dyn BridgeConnector,
        events: &mpsc::UnboundedSender<SessionEvent>,
    ) -> Result<(), SessionError> {
        self.teardown();
        self.epoch += 1;
        self.state = ConnectionState::Connecting;
        self.resize_pending = false;
        // A new shell has its own history
        self.captured_once = false;

        let (cols, rows) = self.surface.size();
        let request = OpenRequest {
            pane_id: self.pane_id,
            epoch: self.epoch,
            url: self.bridge_url.clone(),
            handshake: HandshakeFrame::new(&self.credentials, cols, rows),
            events: events.clone(),
        };
        match connector.open(request) {
            Ok(link) => {
                crate::debug_info!(
                    "SESSION",
                    "pane {} connect epoch {} ({}x{})",
                    self.pane_id,
                    self.epoch,
                    cols,
                    rows
                );
                self.link = Some(link);
                Ok(())
            }
            Err(err) => {
                log::warn!("pane {}: connect failed: {}", self.pane_id, err);
                self.state = ConnectionState::Disconnected;
                self.surface
                    .write(format!("\r\n\x1b[31m[connect failed: {err}]\x1b[0m\r\n").as_bytes());
                Err(err)
            }
        }
    }

    /// Close the socket and stop any capture. Idempotent.
    pub fn disconnect(&mut self) {
        self.teardown();
        self.state = ConnectionState::Disconnected;
    }

    fn teardown(&mut self) {
        self.abort_capture();
        self.link = None;
        self.connected_at = None;
    }

    /// Apply an event from the socket task.
    pub fn handle_event(&mut self, epoch: u64, kind: SessionEventKind, now: Instant) {
        if epoch != self.epoch || self.link.is_none() {
            crate::debug_log!(
                "SESSION",
                "pane {} ignoring stale event from epoch {} (current {})",
                self.pane_id,
                epoch,
                self.epoch
            );
            return;
        }
        match kind {
            SessionEventKind::Opened => self.on_open(now),
            SessionEventKind::Data(bytes) => self.on_data(&bytes, now),
            SessionEventKind::Closed { error } => self.on_close(error),
        }
    }

    fn on_open(&mut self, now: Instant) {
        self.state = ConnectionState::Connected;
        self.connected_at = Some(now);
        log::info!("pane {} connected to {}", self.pane_id, self.credentials.label());
        // The handshake carried the size at connect time; a reconnection or a
        // resize while connecting still needs an explicit fit.
        if self.epoch > 1 || self.resize_pending {
            self.resize_pending = false;
            let (cols, rows) = self.surface.size();
            self.send_frame(OutboundFrame::Resize(ResizeFrame::new(cols, rows)));
        }
    }

    fn on_data(&mut self, bytes: &[u8], now: Instant) {
        match self.inbound.active_mut() {
            InboundHandler::Capture(capture) => capture.feed(bytes, now),
            InboundHandler::Relay => {
                self.surface.write(bytes);
                let text = String::from_utf8_lossy(bytes);
                let home = self.credentials.home_dir();
                if let Some(dir) = track_directory(
                    &text,
                    &home,
                    self.info.current_working_directory.as_deref(),
                ) {
                    crate::debug_log!("SESSION", "pane {} cwd -> {}", self.pane_id, dir);
                    self.info.current_working_directory = Some(dir);
                }
            }
        }
    }

    fn on_close(&mut self, error: Option<String>) {
        match &error {
            Some(err) => log::warn!("pane {} connection lost: {}", self.pane_id, err),
            None => log::info!("pane {} connection closed", self.pane_id),
        }
        self.disconnect();
        self.surface.write(CLOSED_NOTICE.as_bytes());
    }

    fn send_frame(&self, frame: OutboundFrame) -> bool {
        if self.state != ConnectionState::Connected {
            log::warn!(
                "pane {}: dropping {:?} while {}",
                self.pane_id,
                frame,
                self.state.label()
            );
            return false;
        }
        let Some(link) = &self.link else {
            return false;
        };
        match link.send(frame) {
            Ok(()) => true,
            Err(err) => {
                log::warn!("pane {}: {}", self.pane_id, err);
                false
            }
        }
    }

    /// Forward keystrokes. Dropped, never queued, unless connected.
    pub fn send_input(&self, bytes: &[u8]) -> bool {
        self.send_frame(OutboundFrame::Input(bytes.to_vec()))
    }

    /// Re-fit the surface and tell the bridge about the new size.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if self.surface.size() == (cols, rows) {
            return;
        }
        self.surface.fit(cols, rows);
        match self.state {
            ConnectionState::Connected => {
                self.send_frame(OutboundFrame::Resize(ResizeFrame::new(cols, rows)));
            }
            ConnectionState::Connecting => self.resize_pending = true,
            ConnectionState::Disconnected => {}
        }
    }

    /// Start a silent history capture.
    pub fn start_capture(&mut self, now: Instant) -> Result<(), SessionError> {
        if self.state != ConnectionState::Connected {
            return Err(SessionError::NotConnected);
        }
        let capture = HistoryCapture::new(&self.capture_config, now);
        if self.inbound.push(InboundHandler::Capture(capture)).is_err() {
            return Err(SessionError::CaptureInProgress);
        }
        if !self.send_frame(OutboundFrame::Input(HISTORY_COMMAND.to_vec())) {
            self.inbound.pop();
            return Err(SessionError::SendFailed);
        }
        crate::debug_info!("HISTORY", "pane {} capture started", self.pane_id);
        Ok(())
    }

    /// Drop an in-flight capture without publishing anything.
    fn abort_capture(&mut self) {
        if let Some(InboundHandler::Capture(capture)) = self.inbound.pop() {
            crate::debug_info!(
                "HISTORY",
                "pane {} capture aborted with {} bytes buffered",
                self.pane_id,
                capture.buffered_len()
            );
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.inbound.is_overridden()
    }

    /// Advance timers: finish a due capture, or start the automatic one.
    ///
    /// Returns the newly published history when a capture finished.
    pub fn tick(&mut self, now: Instant) -> Option<Vec<String>> {
        if let InboundHandler::Capture(capture) = self.inbound.active() {
            let status = capture.poll(now);
            if status == CaptureStatus::Pending {
                return None;
            }
            if status == CaptureStatus::TimedOut {
                log::debug!("pane {}: history capture timed out", self.pane_id);
            }
            let Some(InboundHandler::Capture(capture)) = self.inbound.pop() else {
                return None;
            };
            let history = capture.finish();
            crate::debug_info!(
                "HISTORY",
                "pane {} captured {} commands ({:?})",
                self.pane_id,
                history.len(),
                status
            );
            self.captured_once = true;
            self.info.command_history = history.clone();
            return Some(history);
        }

        if self.auto_capture_due(now) {
            self.captured_once = true;
            if let Err(err) = self.start_capture(now) {
                log::debug!("pane {}: automatic capture skipped: {}", self.pane_id, err);
            }
        }
        None
    }

    fn auto_capture_due(&self, now: Instant) -> bool {
        let delay = self.capture_config.auto_capture_delay_ms;
        if delay == 0 || self.captured_once || self.state != ConnectionState::Connected {
            return false;
        }
        self.connected_at
            .is_some_and(|at| now.duration_since(at) >= Duration::from_millis(delay))
    }

    pub fn pane_id(&self) -> PaneId {
        self.pane_id
    }

    pub fn credentials(&self) -> &Arc<Credentials> {
        &self.credentials
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.info.focused = focused;
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: TerminalSurface> Drop for SessionConnection<S> {
    fn drop(&mut self) {
        crate::debug_info!(
            "SESSION",
            "pane {} session released (state={})",
            self.pane_id,
            self.state.label()
        );
    }
}
