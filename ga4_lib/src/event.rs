//! Measurement Protocol wire types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One analytics event: a name plus optional free-form params.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
        }
    }

    /// Add (or replace) a single param.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Request body posted to the collection endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Payload {
    pub client_id: String,
    pub user_id: String,
    pub timestamp_micros: i64,
    pub events: Vec<Event>,
}

/// Body returned by the validation (debug) endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResponse {
    #[serde(default)]
    pub validation_messages: Vec<ValidationMessage>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationMessage {
    #[serde(default)]
    pub field_path: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub validation_code: String,
}
