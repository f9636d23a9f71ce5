//! Decoded debug adapter protocol messages, as observed by the bridge.

use crate::error::Error;
use crate::muted_error;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// DAP message envelope. Only the fields the bridge reacts on are kept,
/// everything else (`seq`, `request_seq`, ...) is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProtocolMessage {
    Event {
        event: String,
        #[serde(default)]
        body: Value,
    },
    Response {
        command: String,
        #[serde(default = "default_success")]
        success: bool,
        #[serde(default)]
        body: Value,
    },
    Request {
        command: String,
        #[serde(default)]
        arguments: Value,
    },
}

fn default_success() -> bool {
    true
}

impl ProtocolMessage {
    pub fn from_value(value: Value) -> Result<Self, Error> {
        serde_json::from_value(value).map_err(|e| Error::MalformedMessage(e.to_string()))
    }

    pub fn from_slice(data: &[u8]) -> Result<Self, Error> {
        serde_json::from_slice(data).map_err(|e| Error::MalformedMessage(e.to_string()))
    }

    /// Return true if this is the event `name`.
    pub fn is_event(&self, name: &str) -> bool {
        matches!(self, ProtocolMessage::Event { event, .. } if event == name)
    }

    /// Return command name if this is a response.
    pub fn response_command(&self) -> Option<&str> {
        match self {
            ProtocolMessage::Response { command, .. } => Some(command.as_str()),
            _ => None,
        }
    }

    /// Variables carried by a `variables` response body. Entries that are not
    /// variable-shaped are skipped.
    pub fn variables(&self) -> Vec<VariableRecord> {
        let ProtocolMessage::Response { command, body, .. } = self else {
            return vec![];
        };
        if command != "variables" {
            return vec![];
        }
        let Some(variables) = body.get("variables").and_then(Value::as_array) else {
            return vec![];
        };

        variables
            .iter()
            .filter_map(|v| muted_error!(VariableRecord::deserialize(v), "skip variable:"))
            .collect()
    }
}

/// Variable as reported by the debug adapter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VariableRecord {
    pub name: String,
    #[serde(
        rename = "memoryReference",
        default,
        deserialize_with = "string_or_number"
    )]
    pub memory_reference: Option<String>,
}

impl VariableRecord {
    pub fn new(name: impl Into<String>, memory_reference: Option<&str>) -> Self {
        Self {
            name: name.into(),
            memory_reference: memory_reference.map(ToString::to_string),
        }
    }
}

/// Some adapters send memory references as plain numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Reference {
        Text(String),
        Number(u64),
    }

    Ok(
        Option::<Reference>::deserialize(deserializer)?.map(|r| match r {
            Reference::Text(text) => text,
            Reference::Number(n) => n.to_string(),
        }),
    )
}
