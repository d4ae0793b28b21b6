//! Wire and domain types for the test-management API
//!
//! The server is PHP, so collections keyed by id arrive as JSON objects when
//! populated and as `[]` when empty, and ids may be strings or numbers. The
//! helpers in [`de`] absorb both shapes.

use serde::{Deserialize, Serialize};

/// Step type marking a step nested under a group
pub const STEP_TYPE_ITEM: &str = "item";
/// Step type of a parent step that only holds children
pub const STEP_TYPE_GROUP: &str = "group";
/// Step type of an ordinary top-level step
pub const STEP_TYPE_STEP: &str = "step";

/// One description/expectation pair of a test case
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestStep {
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub parent: String,
    #[serde(rename = "type", default, deserialize_with = "de::string_or_number")]
    pub step_type: String,
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub desc: String,
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub expect: String,
}

impl TestStep {
    pub fn new(desc: &str, expect: &str) -> Self {
        Self {
            desc: desc.to_string(),
            expect: expect.to_string(),
            ..Default::default()
        }
    }

    pub fn child(desc: &str, expect: &str) -> Self {
        Self {
            step_type: STEP_TYPE_ITEM.to_string(),
            ..Self::new(desc, expect)
        }
    }

    /// Whether this step is nested under a group step
    pub fn is_child(&self) -> bool {
        self.step_type == STEP_TYPE_ITEM
    }

    /// Step type with the server default applied
    pub fn kind(&self) -> &str {
        if self.step_type.is_empty() {
            STEP_TYPE_STEP
        } else {
            &self.step_type
        }
    }
}

/// A test case with its steps in authoritative order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub id: String,
    pub product: String,
    pub module: String,
    pub title: String,
    pub steps: Vec<TestStep>,
}

impl TestCase {
    /// Numeric case id, if the server sent a usable one
    pub fn numeric_id(&self) -> Option<i64> {
        self.id.trim().parse().ok()
    }
}

/// A case as it appears in listing and detail payloads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaseRecord {
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub product: String,
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub module: String,
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub title: String,
    #[serde(default, deserialize_with = "de::keyed")]
    pub steps: Vec<(String, TestStep)>,
}

impl CaseRecord {
    /// Steps sorted by their numeric key
    pub fn ordered_steps(&self) -> Vec<TestStep> {
        de::sort_by_numeric_key(self.steps.clone())
    }
}

/// A run inside a test task; `case` is the id of the case it executes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunRecord {
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub case: String,
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub product: String,
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub module: String,
    #[serde(default, deserialize_with = "de::string_or_number")]
    pub title: String,
}

/// Shallow case container returned by product, module and suite listings
#[derive(Debug, Default, Deserialize)]
pub struct CaseList {
    #[serde(default, deserialize_with = "de::keyed")]
    pub cases: Vec<(String, CaseRecord)>,
}

/// Shallow run container returned by the task listing
#[derive(Debug, Default, Deserialize)]
pub struct TaskRuns {
    #[serde(default, deserialize_with = "de::keyed")]
    pub runs: Vec<(String, RunRecord)>,
}

/// Detail payload of a single case
#[derive(Debug, Default, Deserialize)]
pub struct CaseDetail {
    #[serde(default)]
    pub case: CaseRecord,
}

/// Session parameters returned by `?mode=getconfig`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    #[serde(rename = "sessionID", default)]
    pub session_id: String,
    #[serde(rename = "sessionVar", default)]
    pub session_var: String,
    #[serde(rename = "requestType", default)]
    pub request_type: String,
    #[serde(rename = "requestFix", default)]
    pub request_fix: String,
}

pub mod de {
    use serde::de::{DeserializeOwned, Error as _};
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Accept a string, a number or null as a string field
    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(other) => other.to_string(),
        })
    }

    /// Accept either an id-keyed object or a list (keyed by 1-based position)
    pub fn keyed<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Vec::new()),
            Value::Object(map) => map
                .into_iter()
                .map(|(k, v)| serde_json::from_value(v).map(|t| (k, t)))
                .collect::<Result<_, _>>()
                .map_err(D::Error::custom),
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| serde_json::from_value(v).map(|t| ((i + 1).to_string(), t)))
                .collect::<Result<_, _>>()
                .map_err(D::Error::custom),
            other => Err(D::Error::custom(format!(
                "expected an object or a list, got {}",
                other
            ))),
        }
    }

    /// Order entries by numeric key; non-numeric keys go last, by text
    pub fn sort_by_numeric_key<T>(mut entries: Vec<(String, T)>) -> Vec<T> {
        entries.sort_by(|(a, _), (b, _)| {
            let na = a.trim().parse::<i64>().ok();
            let nb = b.trim().parse::<i64>().ok();
            match (na, nb) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => a.cmp(b),
            }
        });
        entries.into_iter().map(|(_, t)| t).collect()
    }
}
