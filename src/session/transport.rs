//! Bridge socket transport.
//!
//! A [`BridgeConnector`] opens one connection per `connect()` and returns a
//! [`BridgeLink`]: the outbound queue plus the task driving the socket.
//! The task reports back through [`SessionEvent`]s tagged with the pane id
//! and connect epoch. Dropping the link aborts the task, which closes the
//! socket on every exit path.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::SessionError;
use super::protocol::{HandshakeFrame, OutboundFrame, WirePayload};
use crate::pane::PaneId;

/// Something that happened on a pane's socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEventKind {
    /// Socket open and handshake sent
    Opened,
    /// Terminal output from the remote shell
    Data(Vec<u8>),
    /// Socket closed, with the error if it closed abnormally
    Closed { error: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub pane_id: PaneId,
    /// Connect generation the event belongs to; stale generations are ignored
    pub epoch: u64,
    pub kind: SessionEventKind,
}

/// Everything a connector needs to open one connection
pub struct OpenRequest {
    pub pane_id: PaneId,
    pub epoch: u64,
    pub url: String,
    pub handshake: HandshakeFrame,
    pub events: mpsc::UnboundedSender<SessionEvent>,
}

/// Live connection handle owned by a session
pub struct BridgeLink {
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    task: Option<JoinHandle<()>>,
}

impl BridgeLink {
    pub fn new(outbound: mpsc::UnboundedSender<OutboundFrame>, task: Option<JoinHandle<()>>) -> Self {
        Self { outbound, task }
    }

    /// Queue a frame for the socket task.
    pub fn send(&self, frame: OutboundFrame) -> Result<(), SessionError> {
        self.outbound
            .send(frame)
            .map_err(|_| SessionError::SendFailed)
    }
}

impl Drop for BridgeLink {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Opens bridge connections
pub trait BridgeConnector: Send + Sync {
    fn open(&self, request: OpenRequest) -> Result<BridgeLink, SessionError>;
}

/// Reject anything that is not a `ws://` or `wss://` URL before touching the network.
pub fn validate_bridge_url(url: &str) -> Result<(), SessionError> {
    if url.starts_with("ws://") || url.starts_with("wss://") {
        Ok(())
    } else {
        Err(SessionError::InvalidUrl(url.to_string()))
    }
}

/// WebSocket connector running each socket as a task on the shared runtime
pub struct WsConnector {
    runtime: Arc<Runtime>,
}

impl WsConnector {
    pub fn new(runtime: Arc<Runtime>) -> Self {
        Self { runtime }
    }
}

impl BridgeConnector for WsConnector {
    fn open(&self, request: OpenRequest) -> Result<BridgeLink, SessionError> {
        validate_bridge_url(&request.url)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let task = self.runtime.spawn(run_socket(request, rx));
        Ok(BridgeLink::new(tx, Some(task)))
    }
}

fn to_message(frame: &OutboundFrame) -> Result<Message, SessionError> {
    Ok(match frame.encode()? {
        WirePayload::Text(text) => Message::Text(text.into()),
        WirePayload::Binary(bytes) => Message::Binary(bytes.into()),
    })
}

async fn run_socket(request: OpenRequest, mut outbound: mpsc::UnboundedReceiver<OutboundFrame>) {
    let OpenRequest {
        pane_id,
        epoch,
        url,
        handshake,
        events,
    } = request;
    let emit = |kind: SessionEventKind| {
        let _ = events.send(SessionEvent {
            pane_id,
            epoch,
            kind,
        });
    };

    crate::debug_info!("SESSION", "pane {} connecting to {}", pane_id, url);
    let ws = match connect_async(url.as_str()).await {
        Ok((ws, _response)) => ws,
        Err(err) => {
            log::warn!("pane {pane_id}: bridge connect failed: {err}");
            emit(SessionEventKind::Closed {
                error: Some(err.to_string()),
            });
            return;
        }
    };
    let (mut sink, mut stream) = ws.split();

    let hello = match to_message(&OutboundFrame::Handshake(handshake)) {
        Ok(msg) => msg,
        Err(err) => {
            emit(SessionEventKind::Closed {
                error: Some(err.to_string()),
            });
            return;
        }
    };
    if let Err(err) = sink.send(hello).await {
        emit(SessionEventKind::Closed {
            error: Some(err.to_string()),
        });
        return;
    }
    emit(SessionEventKind::Opened);

    let error = loop {
        tokio::select! {
            frame = outbound.recv() => {
                let Some(frame) = frame else {
                    // Session dropped its link
                    let _ = sink.close().await;
                    break None;
                };
                crate::debug_trace!("SESSION", "pane {} -> {:?}", pane_id, frame);
                let msg = match to_message(&frame) {
                    Ok(msg) => msg,
                    Err(err) => {
                        log::warn!("pane {pane_id}: dropping unencodable frame: {err}");
                        continue;
                    }
                };
                if let Err(err) = sink.send(msg).await {
                    break Some(err.to_string());
                }
            }
            incoming = stream.next() => {
                match incoming {
                    Some(Ok(Message::Binary(bytes))) => emit(SessionEventKind::Data(bytes.to_vec())),
                    Some(Ok(Message::Text(text))) => {
                        emit(SessionEventKind::Data(text.as_str().as_bytes().to_vec()))
                    }
                    Some(Ok(Message::Close(_))) | None => break None,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => break Some(err.to_string()),
                }
            }
        }
    };

    crate::debug_info!("SESSION", "pane {} socket closed ({:?})", pane_id, error);
    emit(SessionEventKind::Closed { error });
}
