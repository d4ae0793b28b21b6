//! Configuration and log locations
//!
//! Uses the directories crate for platform-appropriate locations:
//! - Linux: `~/.config/ztf/`
//! - macOS: `~/Library/Application Support/ztf/`
//! - Windows: `%APPDATA%\ztf\`

use std::io;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "ztf";

/// Get the configuration directory path
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the configuration file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Directory a run's report is written to: `<base>/logs/<unix-seconds>`
pub fn run_log_dir(base: &Path) -> PathBuf {
    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    base.join("logs").join(stamp.to_string())
}

/// Make a path absolute against the current directory without touching the filesystem
pub fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Ensure a directory exists
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_is_toml() {
        if let Some(path) = config_path() {
            assert_eq!(path.extension().and_then(|e| e.to_str()), Some("toml"));
        }
    }

    #[test]
    fn test_run_log_dir_under_logs() {
        let dir = run_log_dir(Path::new("/work"));
        assert!(dir.starts_with("/work/logs"));
    }

    #[test]
    fn test_absolute_keeps_absolute() {
        let p = Path::new("/already/absolute");
        assert_eq!(absolute(p), p.to_path_buf());
        assert!(absolute(Path::new("rel")).is_absolute());
    }
}
