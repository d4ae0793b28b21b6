//! Common utilities shared by the remote client, resolver and runner

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Host platform family, as far as script selection cares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Host {
    Windows,
    Unix,
}

impl Host {
    /// Get the current host
    pub fn current() -> Self {
        if cfg!(windows) {
            Host::Windows
        } else {
            Host::Unix
        }
    }

    pub fn is_windows(self) -> bool {
        self == Host::Windows
    }

    /// OS name recorded in reports
    pub fn os_name(self) -> &'static str {
        match self {
            Host::Windows => "windows",
            Host::Unix if cfg!(target_os = "macos") => "mac",
            Host::Unix => "linux",
        }
    }
}
