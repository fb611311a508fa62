//! Wire frames exchanged with the SSH bridge.
//!
//! Text frames carry JSON control messages (handshake, resize); binary
//! frames carry raw keystrokes. Server output arrives unwrapped in either
//! frame type and is treated as terminal bytes.

use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;

/// First frame on every connection: who to log in as and the initial size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandshakeFrame {
    pub ip: String,
    pub username: String,
    #[serde(rename = "sshKey")]
    pub ssh_key: String,
    pub cols: u16,
    pub rows: u16,
}

impl HandshakeFrame {
    pub fn new(credentials: &Credentials, cols: u16, rows: u16) -> Self {
        Self {
            ip: credentials.host.clone(),
            username: credentials.username.clone(),
            ssh_key: credentials.auth_secret.clone(),
            cols,
            rows,
        }
    }
}

/// Terminal size change, `{"resize": true, "cols": .., "rows": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeFrame {
    pub resize: bool,
    pub cols: u16,
    pub rows: u16,
}

impl ResizeFrame {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            resize: true,
            cols,
            rows,
        }
    }
}

/// One outbound message, before it is mapped onto a WebSocket frame type.
#[derive(Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    Handshake(HandshakeFrame),
    Resize(ResizeFrame),
    Input(Vec<u8>),
}

/// Encoded payload and whether it goes out as a text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WirePayload {
    Text(String),
    Binary(Vec<u8>),
}

impl OutboundFrame {
    pub fn encode(&self) -> Result<WirePayload, serde_json::Error> {
        Ok(match self {
            OutboundFrame::Handshake(frame) => WirePayload::Text(serde_json::to_string(frame)?),
            OutboundFrame::Resize(frame) => WirePayload::Text(serde_json::to_string(frame)?),
            OutboundFrame::Input(bytes) => WirePayload::Binary(bytes.clone()),
        })
    }
}

impl std::fmt::Debug for OutboundFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutboundFrame::Handshake(frame) => f
                .debug_struct("Handshake")
                .field("ip", &frame.ip)
                .field("username", &frame.username)
                .field("cols", &frame.cols)
                .field("rows", &frame.rows)
                .finish_non_exhaustive(),
            OutboundFrame::Resize(frame) => f.debug_tuple("Resize").field(frame).finish(),
            OutboundFrame::Input(bytes) => write!(f, "Input({} bytes)", bytes.len()),
        }
    }
}
