//! Configuration system for the par-mux terminal multiplexer.
//!
//! This crate provides configuration loading, saving, and default values
//! shared by the multiplexer and its session layer. It includes:
//!
//! - The [`Config`] struct and its YAML persistence
//! - History-capture tuning ([`HistoryCaptureConfig`])
//! - Typed errors for config I/O and validation ([`ConfigError`])
//! - The shared pane identifier type ([`PaneId`])

pub mod config;
pub mod defaults;
mod error;
mod types;

pub use config::{Config, HistoryCaptureConfig};
pub use error::ConfigError;
pub use types::{LogLevel, PaneId};
