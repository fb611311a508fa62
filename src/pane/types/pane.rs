//! `Pane`: the payload of a leaf node.

use std::sync::Arc;

use crate::credentials::Credentials;

use super::common::PaneId;

/// A single remote-shell pane.
///
/// Only identity and credentials live in the tree. The live connection is
/// owned by the multiplexer and looked up by `id`, so rebuilding tree paths
/// never touches a socket.
#[derive(Debug, Clone)]
pub struct Pane {
    /// Unique identifier for this pane
    pub id: PaneId,
    /// Login used by this pane's session
    pub credentials: Arc<Credentials>,
}

impl Pane {
    pub fn new(id: PaneId, credentials: Arc<Credentials>) -> Self {
        Self { id, credentials }
    }
}
