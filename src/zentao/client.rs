//! HTTP client for the test-management server
//!
//! Handles session negotiation, the two URL schemes and the
//! `{status, data}` response envelope. Every call is awaited to completion
//! before the next one is issued; nothing is retried.

use reqwest::header::{CONTENT_TYPE, COOKIE};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::common::config::Config;
use crate::common::logging::preview;
use crate::common::{Error, Result};

use super::form;
use super::style::Session;
use super::types::SessionConfig;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Envelope wrapping most API responses
#[derive(Debug, Default, Deserialize)]
struct Envelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Client for the test-management API
pub struct ZentaoClient {
    http: reqwest::Client,
    base_url: String,
    auth_cookie: Option<String>,
    session: Option<Session>,
}

impl ZentaoClient {
    /// Create a client for a base URL such as `http://zentao.local/`
    pub fn new(base_url: &str, auth_cookie: Option<String>) -> Self {
        let base_url = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        Self {
            http: reqwest::Client::new(),
            base_url,
            auth_cookie: auth_cookie.filter(|c| !c.trim().is_empty()),
            session: None,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.base_url(), config.auth_cookie.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The negotiated session, if `getconfig` has succeeded
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Negotiate the session with `?mode=getconfig`
    ///
    /// A no-op once a session exists; it is never renegotiated.
    pub async fn establish_session(&mut self) -> Result<&Session> {
        if self.session.is_none() {
            let url = format!("{}?mode=getconfig", self.base_url);
            let body = self
                .get(&url)
                .await
                .map_err(|e| Error::Session(format!("{}: {}", self.base_url, e)))?;

            let config: SessionConfig = serde_json::from_str(&body)
                .map_err(|e| Error::Session(format!("{}: {}", self.base_url, e)))?;
            let session = Session::new(config);
            debug!(?session, "session established");
            self.session = Some(session);
        }

        self.session
            .as_ref()
            .ok_or_else(|| Error::Session(self.base_url.clone()))
    }

    /// Establish the session and log in with account credentials
    pub async fn login(&mut self, account: &str, password: &str) -> Result<()> {
        let uri = match self.establish_session().await {
            Ok(session) => session.style().login_uri(),
            Err(e) => {
                warn!("{}", e);
                return Err(Error::LoginFailed);
            }
        };
        let url = format!("{}{}", self.base_url, uri);
        let body = form::encode_pairs(&[("account", account), ("password", password)]);

        debug!(%url, "login");
        let response = self
            .request(self.http.post(&url))
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await;

        let text = match response {
            Ok(resp) => resp.text().await.unwrap_or_default(),
            Err(e) => {
                warn!("{}", Error::transport(&url, e));
                return Err(Error::LoginFailed);
            }
        };
        debug!(body = preview(&text), "login response");

        let envelope: Envelope = serde_json::from_str(&text).unwrap_or_default();
        if envelope.status.as_deref() == Some("success") {
            Ok(())
        } else {
            Err(Error::LoginFailed)
        }
    }

    /// Build an absolute API URL for `module.method(params)`
    pub fn api_url(&self, module: &str, method: &str, params: &[(&str, &str)]) -> Result<String> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| Error::Session(self.base_url.clone()))?;
        Ok(format!(
            "{}{}",
            self.base_url,
            session.style().api_uri(module, method, params)
        ))
    }

    /// GET a URL and unwrap the response envelope
    pub async fn get(&self, url: &str) -> Result<String> {
        let url = self.with_session(url);
        debug!(%url, "GET");

        let response = self
            .request(self.http.get(&url))
            .send()
            .await
            .map_err(|e| Error::transport(&url, e))?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(&url, e))?;
        debug!(body = preview(&body), "server returned");

        unwrap_envelope(&url, &body)
    }

    /// POST parameters and unwrap the response envelope
    ///
    /// With `use_form_encoding` the body is form-encoded with keys rewritten
    /// to bracket notation; otherwise it is sent as JSON.
    pub async fn post_form(
        &self,
        url: &str,
        params: &Value,
        use_form_encoding: bool,
    ) -> Result<String> {
        let url = self.with_session(url);
        debug!(%url, params = %params, "POST");

        let (body, content_type) = if use_form_encoding {
            (form::encode_for_binding(params), FORM_CONTENT_TYPE)
        } else {
            (serde_json::to_string(params)?, "application/json")
        };

        let response = self
            .request(self.http.post(&url))
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::transport(&url, e))?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(&url, e))?;
        debug!(body = preview(&body), "server returned");

        unwrap_envelope(&url, &body)
    }

    fn with_session(&self, url: &str) -> String {
        match &self.session {
            Some(session) => session.with_session(url),
            None => url.to_string(),
        }
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.cookie_header() {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        }
    }

    fn cookie_header(&self) -> Option<String> {
        let parts: Vec<String> = self
            .session
            .iter()
            .map(Session::cookie)
            .chain(self.auth_cookie.iter().cloned())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

/// Extract the payload from a response body
///
/// A body without `status` is the payload itself; with `status` the payload
/// is `data` and only `success` counts. HTML pages (login redirects, error
/// pages) and other non-JSON bodies are failures.
pub fn unwrap_envelope(url: &str, body: &str) -> Result<String> {
    let value: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            if body.to_ascii_lowercase().contains("<html") {
                return Err(Error::HtmlResponse(url.to_string()));
            }
            return Err(Error::decode(url, e));
        }
    };

    let envelope: Envelope = match value {
        Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => Envelope::default(),
    };

    match envelope.status.as_deref() {
        None | Some("") => Ok(body.to_string()),
        Some("success") => Ok(match envelope.data {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        }),
        Some(status) => Err(Error::RemoteStatus {
            url: url.to_string(),
            status: status.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://zentao.local/x.json";

    #[test]
    fn test_bare_body_is_payload() {
        let body = r#"{"sessionID":"abc","requestType":"PATH_INFO"}"#;
        assert_eq!(unwrap_envelope(URL, body).unwrap(), body);
    }

    #[test]
    fn test_nested_data_string() {
        let body = r#"{"status":"success","data":"{\"cases\":[]}"}"#;
        assert_eq!(unwrap_envelope(URL, body).unwrap(), r#"{"cases":[]}"#);
    }

    #[test]
    fn test_nested_data_object_reserialized() {
        let body = r#"{"status":"success","data":{"cases":[]}}"#;
        assert_eq!(unwrap_envelope(URL, body).unwrap(), r#"{"cases":[]}"#);
    }

    #[test]
    fn test_failed_status() {
        let body = r#"{"status":"fail","data":"denied"}"#;
        assert!(matches!(
            unwrap_envelope(URL, body),
            Err(Error::RemoteStatus { status, .. }) if status == "fail"
        ));
    }

    #[test]
    fn test_html_page_is_failure() {
        let body = "<html><body>Please log in</body></html>";
        assert!(matches!(
            unwrap_envelope(URL, body),
            Err(Error::HtmlResponse(_))
        ));
    }

    #[test]
    fn test_garbage_is_decode_failure() {
        assert!(matches!(
            unwrap_envelope(URL, "not json"),
            Err(Error::Decode { .. })
        ));
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ZentaoClient::new("http://zentao.local", None);
        assert_eq!(client.base_url(), "http://zentao.local/");
        assert!(client.session().is_none());
        assert!(client.api_url("testcase", "view", &[]).is_err());
    }

    #[test]
    fn test_cookie_header_without_session() {
        let client = ZentaoClient::new("http://zentao.local/", Some("lang=en".into()));
        assert_eq!(client.cookie_header().as_deref(), Some("lang=en"));
        let client = ZentaoClient::new("http://zentao.local/", Some("  ".into()));
        assert_eq!(client.cookie_header(), None);
    }
}
