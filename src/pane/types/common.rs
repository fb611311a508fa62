//! Shared enums for the pane system.

// Re-export PaneId from par-mux-config for shared access across crates
pub use par_mux_config::PaneId;

/// Direction of a split
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitDirection {
    /// Panes are stacked vertically (split creates top/bottom panes)
    Horizontal,
    /// Panes are side by side (split creates left/right panes)
    Vertical,
}
