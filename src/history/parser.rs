//! Parser for the output of the shell `history` builtin.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::ansi::strip_ansi;

static HISTORY_LINE_REGEX: OnceLock<Regex> = OnceLock::new();

/// `  <index>[*]  <command>` as printed by bash/zsh `history`.
fn history_line_regex() -> &'static Regex {
    HISTORY_LINE_REGEX.get_or_init(|| {
        Regex::new(r"^\s*\d+\*?\s+(.*\S)\s*$").expect("Failed to compile history line regex")
    })
}

/// Extract the command list from a raw captured buffer.
///
/// Lines that do not look like `history` output are skipped, as is the
/// `history` invocation itself. The result is most-recent-first, each
/// command kept once at its most recent position, and at most `max_entries`
/// long. Garbage in yields an empty list, never an error.
pub fn parse_history(raw: &str, max_entries: usize) -> Vec<String> {
    let clean = strip_ansi(raw).replace('\r', "");

    let commands: Vec<&str> = clean
        .lines()
        .filter_map(|line| history_line_regex().captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .filter(|cmd| *cmd != "history")
        .collect();

    let mut seen = HashSet::new();
    commands
        .into_iter()
        .rev()
        .filter(|cmd| seen.insert(*cmd))
        .take(max_entries)
        .map(str::to_string)
        .collect()
}
