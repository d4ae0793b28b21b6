//! Form encoding for POST bodies
//!
//! Nested parameters are flattened to dotted keys (`steps.1=open`) and then
//! rewritten to the bracket notation the server binds arrays from
//! (`steps[1]=open`). The rewrite only touches the key of each `key=` match:
//! the first character is lower-cased, every `.` becomes `[` and the `=`
//! becomes `]=`. Values are percent-encoded first, so they never match.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

/// Encode parameters the way the server binds them
pub fn encode_for_binding(params: &Value) -> String {
    rewrite_keys(&encode(params))
}

/// Flatten parameters to `a.b=v&c=w` with percent-encoded values
pub fn encode(params: &Value) -> String {
    let mut pairs = Vec::new();
    flatten("", params, &mut pairs);
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(&v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Plain `k=v&...` body with percent-encoded values, no key rewriting
pub fn encode_pairs(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Rewrite every `key=` of an encoded body into bracket notation
pub fn rewrite_keys(encoded: &str) -> String {
    static KEY: OnceLock<Regex> = OnceLock::new();
    let re = KEY.get_or_init(|| Regex::new(r"([^&]*?)=").expect("valid key pattern"));

    re.replace_all(encoded, |caps: &Captures| rewrite_key(&caps[0]))
        .into_owned()
}

fn rewrite_key(matched: &str) -> String {
    let mut chars = matched.chars();
    let mut key = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect::<String>(),
        None => return String::new(),
    };

    if key.contains('.') {
        key = key.replace('.', "[").replace('=', "]=");
    }
    key
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    let join = |key: &str| {
        let key = urlencoding::encode(key).into_owned();
        if prefix.is_empty() {
            key
        } else {
            format!("{}.{}", prefix, key)
        }
    };

    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (k, v) in entries {
                flatten(&join(k), v, out);
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                flatten(&join(&i.to_string()), v, out);
            }
        }
        Value::Null => out.push((prefix.to_string(), String::new())),
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}
