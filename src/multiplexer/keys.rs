//! Prefix-key handling and keystroke encoding.
//!
//! Shortcuts are two-stroke: the prefix (default `ctrl-a`) followed by a
//! command key. Everything else is encoded to terminal bytes and sent to the
//! focused pane.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use thiserror::Error;

use crate::pane::SplitDirection;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid prefix key {0:?}")]
pub struct PrefixKeyError(String);

/// The key that arms multiplexer shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixKey {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl PrefixKey {
    /// Parse `ctrl-a`, `Ctrl+B`, `alt-x`, `f12`, ...
    pub fn parse(s: &str) -> Result<Self, PrefixKeyError> {
        let err = || PrefixKeyError(s.to_string());
        let parts: Vec<&str> = s
            .split(['-', '+'])
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();
        let (key, mods) = parts.split_last().ok_or_else(err)?;

        let mut modifiers = KeyModifiers::NONE;
        for part in mods {
            modifiers |= match part.to_lowercase().as_str() {
                "ctrl" | "control" | "c" => KeyModifiers::CONTROL,
                "alt" | "option" | "meta" | "m" => KeyModifiers::ALT,
                "shift" | "s" => KeyModifiers::SHIFT,
                _ => return Err(err()),
            };
        }

        let lower = key.to_lowercase();
        let code = match lower.as_str() {
            "space" => KeyCode::Char(' '),
            "esc" | "escape" => KeyCode::Esc,
            "tab" => KeyCode::Tab,
            f if f.len() > 1 && f.starts_with('f') => {
                KeyCode::F(f[1..].parse().map_err(|_| err())?)
            }
            _ => {
                let mut chars = lower.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => KeyCode::Char(c),
                    _ => return Err(err()),
                }
            }
        };
        Ok(Self { code, modifiers })
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        let code = match key.code {
            KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
            other => other,
        };
        code == self.code && key.modifiers == self.modifiers
    }

    /// Bytes sent when the prefix is pressed twice
    pub fn as_bytes(&self) -> Vec<u8> {
        encode_key(&KeyEvent::new(self.code, self.modifiers)).unwrap_or_default()
    }
}

impl Default for PrefixKey {
    fn default() -> Self {
        Self {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::CONTROL,
        }
    }
}

/// Action bound to the key following the prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MuxCommand {
    Split(SplitDirection),
    Close,
    FocusNext,
    FocusPrev,
    Reconnect,
    CaptureHistory,
    Quit,
}

/// Command for the key pressed after the prefix
pub fn command_for(key: &KeyEvent) -> Option<MuxCommand> {
    let KeyCode::Char(c) = key.code else {
        return None;
    };
    Some(match c {
        '"' | '-' => MuxCommand::Split(SplitDirection::Horizontal),
        '%' | '|' => MuxCommand::Split(SplitDirection::Vertical),
        'x' => MuxCommand::Close,
        'o' | 'n' => MuxCommand::FocusNext,
        'p' => MuxCommand::FocusPrev,
        'r' => MuxCommand::Reconnect,
        'h' => MuxCommand::CaptureHistory,
        'q' => MuxCommand::Quit,
        _ => return None,
    })
}

/// Encode a key press as the bytes a terminal would send
pub fn encode_key(key: &KeyEvent) -> Option<Vec<u8>> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let bytes = match key.code {
        KeyCode::Char(c) if ctrl => {
            let ctrl_char = control_byte(c)?;
            if alt {
                vec![0x1b, ctrl_char]
            } else {
                vec![ctrl_char]
            }
        }
        KeyCode::Char(c) if alt => format!("\x1b{c}").into_bytes(),
        KeyCode::Char(c) => c.to_string().into_bytes(),
        KeyCode::Enter => b"\r".to_vec(),
        KeyCode::Tab => b"\t".to_vec(),
        KeyCode::BackTab => b"\x1b[Z".to_vec(),
        KeyCode::Backspace => b"\x7f".to_vec(),
        KeyCode::Esc => b"\x1b".to_vec(),
        KeyCode::Left => b"\x1b[D".to_vec(),
        KeyCode::Right => b"\x1b[C".to_vec(),
        KeyCode::Up => b"\x1b[A".to_vec(),
        KeyCode::Down => b"\x1b[B".to_vec(),
        KeyCode::Home => b"\x1b[H".to_vec(),
        KeyCode::End => b"\x1b[F".to_vec(),
        KeyCode::PageUp => b"\x1b[5~".to_vec(),
        KeyCode::PageDown => b"\x1b[6~".to_vec(),
        KeyCode::Delete => b"\x1b[3~".to_vec(),
        KeyCode::Insert => b"\x1b[2~".to_vec(),
        KeyCode::F(n @ 1..=4) => vec![0x1b, b'O', b'P' + (n - 1)],
        KeyCode::F(n @ 5..=12) => {
            let code = [15, 17, 18, 19, 20, 21, 23, 24][(n - 5) as usize];
            format!("\x1b[{code}~").into_bytes()
        }
        _ => return None,
    };
    Some(bytes)
}

/// Control byte for Ctrl plus `c`, if the terminal defines one
fn control_byte(c: char) -> Option<u8> {
    if !c.is_ascii() {
        return None;
    }
    match c.to_ascii_lowercase() as u8 {
        b' ' | b'@' | b'2' => Some(0),
        b @ b'a'..=b'z' => Some(b - b'a' + 1),
        b @ b'['..=b'_' => Some(b - b'@'),
        b'?' => Some(0x7f),
        _ => None,
    }
}
