//! Default values for configuration fields.
//!
//! Each function backs a `#[serde(default = "...")]` attribute so partially
//! written config files still load.

pub fn bridge_url() -> String {
    "ws://127.0.0.1:8022/ssh".to_string()
}

pub fn cols() -> u16 {
    80
}

pub fn rows() -> u16 {
    24
}

pub fn scrollback_lines() -> usize {
    1000
}

pub fn layout_expiry_secs() -> u64 {
    3600 // one hour
}

pub fn prefix_key() -> String {
    "ctrl-a".to_string()
}

pub fn history_settle_ms() -> u64 {
    400
}

pub fn history_timeout_ms() -> u64 {
    5000
}

pub fn history_max_entries() -> usize {
    50
}

pub fn history_auto_capture_delay_ms() -> u64 {
    1500 // 0 disables automatic capture
}

pub fn max_secret_bytes() -> usize {
    64 * 1024
}
