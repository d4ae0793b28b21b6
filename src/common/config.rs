//! Configuration file handling

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::paths::config_path;
use super::Result;

/// Interpreter value that marks a language as disabled
pub const DISABLED_INTERPRETER: &str = "-";

/// Main configuration structure
#[derive(Debug, Deserialize, Default, Clone)]
pub struct Config {
    /// Base URL of the test-management server, e.g. `http://zentao.local/`
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub account: String,

    #[serde(default)]
    pub password: String,

    /// Fixed cookie string attached to every request
    #[serde(default)]
    pub auth_cookie: Option<String>,

    /// Directory holding the scripts when ztf runs on the server side
    #[serde(default)]
    pub project_dir: Option<PathBuf>,

    /// Interpreter per script language (`-` disables the language)
    #[serde(default)]
    pub interpreters: HashMap<String, String>,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| super::Error::file_read(path, e))?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| super::Error::ConfigParse(e.to_string()))
    }

    /// Base URL with a guaranteed trailing slash
    pub fn base_url(&self) -> String {
        let url = self.url.trim();
        if url.ends_with('/') {
            url.to_string()
        } else {
            format!("{}/", url)
        }
    }

    /// Whether enough is configured to talk to the server
    pub fn check_request_config(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(super::Error::Config(
                "No server url configured. Set 'url', 'account' and 'password' in the config file"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Configured interpreter for a language, empty when not configured
    pub fn interpreter(&self, lang: &str) -> &str {
        self.interpreters
            .get(lang)
            .map(|s| s.trim())
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(
            r#"
url = "http://zentao.local"
account = "admin"
password = "secret"
auth_cookie = "lang=zh-cn; device=desktop"

[interpreters]
python = "C:\\Python39\\python.exe"
php = "-"
"#,
        )
        .unwrap();

        assert_eq!(config.base_url(), "http://zentao.local/");
        assert_eq!(config.account, "admin");
        assert_eq!(config.interpreter("python"), "C:\\Python39\\python.exe");
        assert_eq!(config.interpreter("php"), DISABLED_INTERPRETER);
        assert_eq!(config.interpreter("ruby"), "");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.url.is_empty());
        assert!(config.project_dir.is_none());
        assert!(config.check_request_config().is_err());
    }

    #[test]
    fn test_malformed_config() {
        let err = Config::parse("url = ").unwrap_err();
        assert!(matches!(err, super::super::Error::ConfigParse(_)));
    }
}
