//! Working-directory inference from prompt text.
//!
//! Best effort only: a chunk that contains no `user@host:<path>$` prompt
//! leaves the tracked directory alone.

use regex::Regex;
use std::sync::OnceLock;

use crate::ansi::strip_ansi;

static PROMPT_REGEX: OnceLock<Regex> = OnceLock::new();

fn prompt_regex() -> &'static Regex {
    PROMPT_REGEX.get_or_init(|| {
        Regex::new(r"[\w.-]+@[\w.-]+:([~/][^\s$#]*)\s*[$#]")
            .expect("Failed to compile prompt regex")
    })
}

/// Extract the directory from the last prompt in `chunk`, with `~` expanded to `home`.
pub fn extract_directory(chunk: &str, home: &str) -> Option<String> {
    let clean = strip_ansi(chunk);
    let caps = prompt_regex().captures_iter(&clean).last()?;
    let raw = caps.get(1)?.as_str();
    Some(expand_home(raw, home))
}

fn expand_home(path: &str, home: &str) -> String {
    match path.strip_prefix('~') {
        Some("") => home.to_string(),
        Some(rest) if rest.starts_with('/') => format!("{home}{rest}"),
        // `~other/...` names another user's home; keep it verbatim.
        Some(_) => path.to_string(),
        None => path.to_string(),
    }
}

/// Returns the new directory only when it differs from `current`.
pub fn track_directory(chunk: &str, home: &str, current: Option<&str>) -> Option<String> {
    let dir = extract_directory(chunk, home)?;
    if current == Some(dir.as_str()) {
        return None;
    }
    Some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_tilde_path() {
        let dir = track_directory("ubuntu@ip-172-31-1-1:~/app$ ", "/home/ubuntu", None);
        assert_eq!(dir.as_deref(), Some("/home/ubuntu/app"));
    }

    #[test]
    fn bare_tilde_is_home() {
        let dir = extract_directory("root@box:~# ", "/root");
        assert_eq!(dir.as_deref(), Some("/root"));
    }

    #[test]
    fn absolute_path_and_colors() {
        let chunk = "\x1b[01;32mdev@web-1\x1b[00m:\x1b[01;34m/var/log\x1b[00m$ ";
        assert_eq!(
            extract_directory(chunk, "/home/dev").as_deref(),
            Some("/var/log")
        );
    }

    #[test]
    fn unrelated_output_leaves_directory() {
        let chunk = "total 8\ndrwxr-xr-x 2 ubuntu ubuntu 4096 app\n";
        assert_eq!(track_directory(chunk, "/home/ubuntu", Some("/home/ubuntu/app")), None);
    }

    #[test]
    fn unchanged_directory_reports_nothing() {
        let chunk = "ubuntu@h:/tmp$ ";
        assert_eq!(track_directory(chunk, "/home/ubuntu", Some("/tmp")), None);
    }

    #[test]
    fn last_prompt_wins() {
        let chunk = "u@h:/a$ cd /b\r\nu@h:/b$ ";
        assert_eq!(extract_directory(chunk, "/home/u").as_deref(), Some("/b"));
    }
}
