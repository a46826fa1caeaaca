//! The uniform skill envelope.
//!
//! Every skill invoked by the agent runtime receives a parameter object and a
//! [`SkillContext`] and answers with a [`SkillResponse`]:
//!
//! ```json
//! { "result": "human readable summary", "metadata": { "success": true, ... } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::OrchestrationError;

/// Per-invocation context supplied by the hosting runtime.
///
/// Skills that talk to providers read gateway handles from here; the
/// orchestration skill ignores it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    /// Anything else the host chose to pass along.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response envelope returned by every skill invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillResponse {
    /// Human-readable summary derived from `metadata`.
    pub result: String,
    /// Machine-readable payload. Always an object carrying `success`.
    pub metadata: Value,
}

impl SkillResponse {
    /// Build a success envelope. `success` and `action` are merged into the
    /// given metadata object.
    pub fn success(action: &str, result: impl Into<String>, metadata: Value) -> Self {
        let mut map = match metadata {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert("success".to_string(), Value::Bool(true));
        map.insert("action".to_string(), Value::String(action.to_string()));

        Self {
            result: result.into(),
            metadata: Value::Object(map),
        }
    }

    /// Build a failure envelope for `error`.
    pub fn failure(action: Option<&str>, error: &OrchestrationError) -> Self {
        let mut metadata = json!({
            "success": false,
            "error": error.code(),
        });
        if let Some(action) = action {
            metadata["action"] = Value::String(action.to_string());
        }

        Self {
            result: format!("Error: {error}"),
            metadata,
        }
    }

    pub fn is_success(&self) -> bool {
        self.metadata
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The error code of a failed response.
    pub fn error_code(&self) -> Option<&str> {
        self.metadata.get("error").and_then(Value::as_str)
    }
}
