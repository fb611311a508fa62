//! Offline subcommands.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use par_mux_config::Config;

use crate::history::parse_history;
use crate::layout::{FileStore, LayoutPersistence};

/// Print the commands found in a captured buffer
pub fn parse_history_cli(file: &Path, max: usize) -> Result<()> {
    let raw = std::fs::read(file).with_context(|| format!("Failed to read {:?}", file))?;
    let text = String::from_utf8_lossy(&raw);
    for command in parse_history(&text, max) {
        println!("{command}");
    }
    Ok(())
}

/// Remove the stored layout of `session`
pub fn clear_layout_cli(session: &str) -> Result<()> {
    let store = FileStore::for_session(session);
    let path = store.path().to_path_buf();
    let mut persistence = LayoutPersistence::new(Box::new(store), Duration::ZERO);
    persistence
        .clear()
        .with_context(|| format!("Failed to clear layout at {:?}", path))?;
    println!("Cleared layout for session '{}' ({})", session, path.display());
    Ok(())
}

/// Config path in use: the `--config` override or the default location
pub fn config_path(override_path: Option<&Path>) -> PathBuf {
    override_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::config_path)
}

/// Apply command-line overrides, then validate the merged config
pub fn finalize_config(mut config: Config, bridge_url: Option<&str>) -> Result<Config> {
    if let Some(url) = bridge_url {
        log::info!("CLI override: bridge URL {}", url);
        config.bridge_url = url.to_string();
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Map a subcommand result to an exit code, reporting the error
pub fn exit_code(result: Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("par-mux: error: {e:#}");
            1
        }
    }
}
