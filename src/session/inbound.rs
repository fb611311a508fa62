//! Single-slot register for a session's inbound-data consumer.
//!
//! Normally inbound bytes are relayed to the terminal surface. A history
//! capture temporarily takes the slot with [`InboundSlot::push`] and gives it
//! back with [`InboundSlot::pop`]; only one override may be active at a time.

use crate::history::HistoryCapture;

/// Consumer of inbound terminal bytes
#[derive(Debug)]
pub enum InboundHandler {
    /// Write to the terminal surface and run the directory tracker
    Relay,
    /// Swallow into a history capture buffer
    Capture(HistoryCapture),
}

#[derive(Debug)]
pub struct InboundSlot {
    active: InboundHandler,
    saved: Option<InboundHandler>,
}

impl Default for InboundSlot {
    fn default() -> Self {
        Self {
            active: InboundHandler::Relay,
            saved: None,
        }
    }
}

impl InboundSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handler`, saving the current one.
    ///
    /// Fails, handing `handler` back, when an override is already installed.
    pub fn push(&mut self, handler: InboundHandler) -> Result<(), InboundHandler> {
        if self.saved.is_some() {
            return Err(handler);
        }
        self.saved = Some(std::mem::replace(&mut self.active, handler));
        Ok(())
    }

    /// Restore the saved handler, returning the one that was active.
    pub fn pop(&mut self) -> Option<InboundHandler> {
        let saved = self.saved.take()?;
        Some(std::mem::replace(&mut self.active, saved))
    }

    pub fn active(&self) -> &InboundHandler {
        &self.active
    }

    pub fn active_mut(&mut self) -> &mut InboundHandler {
        &mut self.active
    }

    /// True while an override is installed.
    pub fn is_overridden(&self) -> bool {
        self.saved.is_some()
    }
}
