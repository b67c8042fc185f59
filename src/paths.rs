//! Common paths for Ignite Gym data storage
//!
//! Everything lives under ~/.config/ignite-gym/ on all platforms:
//! - config.toml - User configuration
//! - session.enc - Encrypted session (user + token)

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the data directory (~/.config/ignite-gym/)
pub fn app_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let dir = home.join(".config").join("ignite-gym");
    fs::create_dir_all(&dir).context("Failed to create ignite-gym directory")?;
    Ok(dir)
}

/// Get the config file path (~/.config/ignite-gym/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(app_dir()?.join("config.toml"))
}

/// Get the session file path (~/.config/ignite-gym/session.enc)
pub fn session_path() -> Result<PathBuf> {
    Ok(app_dir()?.join("session.enc"))
}
