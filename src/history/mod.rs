//! Silent shell-history harvesting.
//!
//! A [`HistoryCapture`] is installed in a session's inbound slot (see
//! [`crate::session::InboundSlot`]). While installed it swallows every inbound
//! byte instead of letting it reach the terminal surface. Completion is
//! detected heuristically: the first prompt-like terminator (`$`, `#`, `>`)
//! starts a short settle delay; a hard timeout finalizes regardless.
//!
//! Deadlines are plain [`Instant`]s checked by the owner on every tick, so a
//! capture never blocks and becomes inert as soon as its session is dropped.

mod parser;

pub use parser::parse_history;

use std::time::{Duration, Instant};

use par_mux_config::HistoryCaptureConfig;

/// Bytes sent to the remote shell to start a capture.
pub const HISTORY_COMMAND: &[u8] = b"history\r";

/// Characters treated as the end of a shell prompt.
const PROMPT_TERMINATORS: [u8; 3] = [b'$', b'#', b'>'];

/// Outcome of polling a capture's deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    /// Still collecting.
    Pending,
    /// A terminator was seen and the settle delay has elapsed.
    Settled,
    /// No terminator arrived before the hard timeout.
    TimedOut,
}

/// In-progress capture of one `history` reply.
#[derive(Debug)]
pub struct HistoryCapture {
    buffer: Vec<u8>,
    terminators: usize,
    settle: Duration,
    settle_deadline: Option<Instant>,
    hard_deadline: Instant,
    max_entries: usize,
}

impl HistoryCapture {
    pub fn new(config: &HistoryCaptureConfig, now: Instant) -> Self {
        Self {
            buffer: Vec::new(),
            terminators: 0,
            settle: Duration::from_millis(config.settle_ms),
            settle_deadline: None,
            hard_deadline: now + Duration::from_millis(config.timeout_ms),
            max_entries: config.max_entries,
        }
    }

    /// Collect an inbound chunk.
    pub fn feed(&mut self, bytes: &[u8], now: Instant) {
        self.buffer.extend_from_slice(bytes);
        let found = bytes
            .iter()
            .filter(|b| PROMPT_TERMINATORS.contains(b))
            .count();
        if found > 0 {
            if self.terminators == 0 {
                self.settle_deadline = Some(now + self.settle);
                crate::debug_log!("HISTORY", "first prompt terminator seen, settling");
            }
            self.terminators += found;
        }
    }

    /// Number of prompt terminators seen so far.
    pub fn terminator_count(&self) -> usize {
        self.terminators
    }

    /// Bytes collected so far.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn poll(&self, now: Instant) -> CaptureStatus {
        match self.settle_deadline {
            Some(deadline) if now >= deadline => CaptureStatus::Settled,
            _ if now >= self.hard_deadline => CaptureStatus::TimedOut,
            _ => CaptureStatus::Pending,
        }
    }

    /// Parse the collected buffer into a most-recent-first command list.
    pub fn finish(self) -> Vec<String> {
        let text = String::from_utf8_lossy(&self.buffer);
        parse_history(&text, self.max_entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HistoryCaptureConfig {
        HistoryCaptureConfig {
            settle_ms: 100,
            timeout_ms: 1000,
            max_entries: 10,
            auto_capture_delay_ms: 0,
        }
    }

    #[test]
    fn settles_after_first_terminator() {
        let start = Instant::now();
        let mut cap = HistoryCapture::new(&config(), start);
        cap.feed(b"    1  ls\r\n", start);
        assert_eq!(cap.poll(start + Duration::from_millis(500)), CaptureStatus::Pending);

        let seen = start + Duration::from_millis(200);
        cap.feed(b"user@h:~$ ", seen);
        assert_eq!(cap.terminator_count(), 1);
        assert_eq!(cap.poll(seen + Duration::from_millis(50)), CaptureStatus::Pending);
        assert_eq!(cap.poll(seen + Duration::from_millis(100)), CaptureStatus::Settled);
    }

    #[test]
    fn settle_deadline_not_extended_by_later_terminators() {
        let start = Instant::now();
        let mut cap = HistoryCapture::new(&config(), start);
        cap.feed(b"$", start);
        cap.feed(b"# >", start + Duration::from_millis(90));
        assert_eq!(cap.terminator_count(), 3);
        assert_eq!(cap.poll(start + Duration::from_millis(100)), CaptureStatus::Settled);
    }

    #[test]
    fn times_out_without_terminator() {
        let start = Instant::now();
        let mut cap = HistoryCapture::new(&config(), start);
        cap.feed(b"    1  ls\r\n", start);
        assert_eq!(cap.poll(start + Duration::from_millis(1000)), CaptureStatus::TimedOut);
        assert_eq!(cap.finish(), vec!["ls"]);
    }
}
