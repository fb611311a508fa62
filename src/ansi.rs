//! Escape-sequence stripping for the text heuristics (prompt and history parsing).

use regex::Regex;
use std::sync::OnceLock;

static ANSI_REGEX: OnceLock<Regex> = OnceLock::new();

/// CSI sequences, OSC sequences (BEL or ST terminated) and lone two-byte escapes.
fn ansi_regex() -> &'static Regex {
    ANSI_REGEX.get_or_init(|| {
        Regex::new(
            r"\x1b\[[0-9;?<=>!]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)|\x1b[()][0-9A-Za-z]|\x1b[@-Z\\-_]",
        )
        .expect("Failed to compile ANSI regex")
    })
}

/// Remove terminal escape sequences from `text`.
pub fn strip_ansi(text: &str) -> String {
    ansi_regex().replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_color_codes() {
        assert_eq!(strip_ansi("\x1b[01;32mubuntu\x1b[00m$ "), "ubuntu$ ");
    }

    #[test]
    fn strips_title_osc() {
        assert_eq!(strip_ansi("\x1b]0;ubuntu@host: ~\x07prompt"), "prompt");
        assert_eq!(strip_ansi("\x1b]2;title\x1b\\x"), "x");
    }

    #[test]
    fn strips_private_modes() {
        assert_eq!(strip_ansi("\x1b[?2004hls\x1b[?2004l"), "ls");
    }

    #[test]
    fn plain_text_untouched() {
        assert_eq!(strip_ansi("total 0\ndrwxr-xr-x"), "total 0\ndrwxr-xr-x");
    }
}
