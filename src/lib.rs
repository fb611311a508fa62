// Library exports for testing and potential library use
//
// # Concurrency model
//
// par-mux runs one UI loop that owns every pane, session and the layout
// store. Bridge sockets run as tokio tasks and talk to the loop only through
// channels:
//
//   - `tokio::sync::mpsc` (unbounded): socket task -> UI loop `SessionEvent`s,
//     and UI loop -> socket task outbound frames.
//
//   - `parking_lot::Mutex`: the debug log sink, written from both the
//     UI loop and socket tasks.
//
// No other state is shared across threads.

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[macro_use]
pub mod debug;

pub mod ansi;
pub mod app;
pub mod cli;
pub mod credentials;
pub mod cwd_tracker;
pub mod history;
pub mod layout;
pub mod multiplexer;
pub mod pane;
pub mod session;

pub use par_mux_config::{Config, HistoryCaptureConfig, PaneId};
