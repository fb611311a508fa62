//! Shared integration test helpers for par-mux.
//!
//! # Usage
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{RecordingConnector, test_credentials};
//! ```
//!
//! Note: Rust integration tests use `mod common;` (not `use`) to bring in
//! helpers from `tests/common/mod.rs`. The `#[allow(dead_code)]` attributes
//! suppress warnings when only a subset of helpers are used per file.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use par_mux::credentials::Credentials;
use par_mux::layout::{LayoutPersistence, MemoryStore};
use par_mux::session::{
    BridgeConnector, BridgeLink, HandshakeFrame, OpenRequest, OutboundFrame, SessionError,
    SessionEvent, SessionEventKind,
};
use par_mux::{Config, HistoryCaptureConfig, PaneId};
use parking_lot::Mutex;
use tokio::sync::mpsc;

/// Credentials shared by most tests
pub fn test_credentials() -> Arc<Credentials> {
    Arc::new(Credentials::new("10.0.0.7", "ubuntu", "test-key"))
}

/// Config with automatic history capture disabled
pub fn test_config() -> Config {
    let mut config = Config::new();
    config.history_capture.auto_capture_delay_ms = 0;
    config
}

pub fn capture_config(settle_ms: u64, timeout_ms: u64) -> HistoryCaptureConfig {
    HistoryCaptureConfig {
        settle_ms,
        timeout_ms,
        max_entries: 50,
        auto_capture_delay_ms: 0,
    }
}

/// Layout persistence backed by memory
pub fn memory_layout() -> LayoutPersistence {
    LayoutPersistence::new(Box::new(MemoryStore::new()), Duration::from_secs(3600))
}

pub fn event(pane_id: PaneId, epoch: u64, kind: SessionEventKind) -> SessionEvent {
    SessionEvent {
        pane_id,
        epoch,
        kind,
    }
}

struct OpenedLink {
    pane_id: PaneId,
    epoch: u64,
    handshake: HandshakeFrame,
    outbound: mpsc::UnboundedReceiver<OutboundFrame>,
}

/// Connector that records every open and keeps each link's outbound queue
#[derive(Default)]
pub struct RecordingConnector {
    links: Mutex<Vec<OpenedLink>>,
    fail_opens: Mutex<bool>,
}

impl RecordingConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every following open fail
    pub fn fail_opens(&self, fail: bool) {
        *self.fail_opens.lock() = fail;
    }

    /// Number of opens performed
    pub fn open_count(&self) -> usize {
        self.links.lock().len()
    }

    /// `(pane_id, epoch)` of every open, in order
    pub fn opens(&self) -> Vec<(PaneId, u64)> {
        self.links
            .lock()
            .iter()
            .map(|l| (l.pane_id, l.epoch))
            .collect()
    }

    pub fn handshake(&self, pane_id: PaneId) -> Option<HandshakeFrame> {
        self.links
            .lock()
            .iter()
            .rev()
            .find(|l| l.pane_id == pane_id)
            .map(|l| l.handshake.clone())
    }

    /// Drain frames queued on the newest link of `pane_id`
    pub fn frames(&self, pane_id: PaneId) -> Vec<OutboundFrame> {
        let mut links = self.links.lock();
        let Some(link) = links.iter_mut().rev().find(|l| l.pane_id == pane_id) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        while let Ok(frame) = link.outbound.try_recv() {
            out.push(frame);
        }
        out
    }

    /// True once the session side of the newest link for `pane_id` is gone
    pub fn link_closed(&self, pane_id: PaneId) -> bool {
        let links = self.links.lock();
        links
            .iter()
            .rev()
            .find(|l| l.pane_id == pane_id)
            .is_none_or(|l| l.outbound.is_closed())
    }
}

impl BridgeConnector for RecordingConnector {
    fn open(&self, request: OpenRequest) -> Result<BridgeLink, SessionError> {
        if *self.fail_opens.lock() {
            return Err(SessionError::InvalidUrl(request.url));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.links.lock().push(OpenedLink {
            pane_id: request.pane_id,
            epoch: request.epoch,
            handshake: request.handshake,
            outbound: rx,
        });
        Ok(BridgeLink::new(tx, None))
    }
}

/// Input frames flattened to bytes
pub fn input_bytes(frames: &[OutboundFrame]) -> Vec<Vec<u8>> {
    frames
        .iter()
        .filter_map(|f| match f {
            OutboundFrame::Input(bytes) => Some(bytes.clone()),
            _ => None,
        })
        .collect()
}
