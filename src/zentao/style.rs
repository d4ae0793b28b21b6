//! URL construction styles and the negotiated session
//!
//! The server answers the same API under two URL schemes. Which one applies
//! is decided once by `getconfig` and fixed for the rest of the run:
//!
//! - path-info: `testcase-view-12-0-testcase-0.json?zentaosid=...`
//! - query:     `index.php?m=testcase&f=view&caseID=12&...&t=json&zentaosid=...`

use std::fmt;

use super::types::SessionConfig;

/// `requestType` value announcing path-info URLs
pub const REQUEST_TYPE_PATH_INFO: &str = "PATH_INFO";

/// Kind of URL scheme the server expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestType {
    PathInfo,
    Query,
}

impl RequestType {
    pub fn parse(value: &str) -> Self {
        if value == REQUEST_TYPE_PATH_INFO {
            RequestType::PathInfo
        } else {
            RequestType::Query
        }
    }
}

/// Strategy for building API URLs
pub trait RequestStyle: Send + Sync + fmt::Debug {
    /// Relative URI of `module.method(params)`; params are named, in signature order
    fn api_uri(&self, module: &str, method: &str, params: &[(&str, &str)]) -> String;

    /// Relative URI of the login endpoint
    fn login_uri(&self) -> String;

    /// Character that joins the session parameter onto a built URI
    fn session_separator(&self) -> char;
}

/// `{module}{fix}{method}{fix}{v1}{fix}{v2}.json`
#[derive(Debug, Clone)]
pub struct PathInfoStyle {
    fix: String,
}

impl PathInfoStyle {
    pub fn new(fix: &str) -> Self {
        let fix = if fix.is_empty() { "-" } else { fix };
        Self {
            fix: fix.to_string(),
        }
    }
}

impl RequestStyle for PathInfoStyle {
    fn api_uri(&self, module: &str, method: &str, params: &[(&str, &str)]) -> String {
        let mut parts = vec![module, method];
        parts.extend(params.iter().map(|(_, v)| *v));
        format!("{}.json", parts.join(&self.fix))
    }

    fn login_uri(&self) -> String {
        format!("user{}login.json", self.fix)
    }

    fn session_separator(&self) -> char {
        '?'
    }
}

/// `index.php?m={module}&f={method}&k1=v1&...&t=json`
#[derive(Debug, Clone, Default)]
pub struct QueryStyle;

impl RequestStyle for QueryStyle {
    fn api_uri(&self, module: &str, method: &str, params: &[(&str, &str)]) -> String {
        let mut uri = format!("index.php?m={}&f={}", module, method);
        for (name, value) in params {
            uri.push('&');
            uri.push_str(name);
            uri.push('=');
            uri.push_str(&urlencoding::encode(value));
        }
        uri.push_str("&t=json");
        uri
    }

    fn login_uri(&self) -> String {
        "index.php?m=user&f=login&t=json".to_string()
    }

    fn session_separator(&self) -> char {
        '&'
    }
}

/// An established session with the server
pub struct Session {
    pub session_id: String,
    pub session_var: String,
    pub request_type: RequestType,
    pub request_fix: String,
    style: Box<dyn RequestStyle>,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let request_type = RequestType::parse(&config.request_type);
        let style: Box<dyn RequestStyle> = match request_type {
            RequestType::PathInfo => Box::new(PathInfoStyle::new(&config.request_fix)),
            RequestType::Query => Box::new(QueryStyle),
        };
        Self {
            session_id: config.session_id,
            session_var: config.session_var,
            request_type,
            request_fix: config.request_fix,
            style,
        }
    }

    pub fn style(&self) -> &dyn RequestStyle {
        self.style.as_ref()
    }

    /// Append the session parameter to a built URL
    pub fn with_session(&self, url: &str) -> String {
        format!(
            "{}{}{}={}",
            url,
            self.style.session_separator(),
            self.session_var,
            self.session_id
        )
    }

    /// `{sessionVar}={sessionId}` cookie pair
    pub fn cookie(&self) -> String {
        format!("{}={}", self.session_var, self.session_id)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("session_var", &self.session_var)
            .field("request_type", &self.request_type)
            .field("request_fix", &self.request_fix)
            .finish_non_exhaustive()
    }
}
