//! Listener of the debug adapter message stream.
//!
//! The interceptor decides when editor views are stale and collects the variables
//! the adapter reported since the last stop. It never talks back to the adapter.

use crate::config::BridgeConfig;
use crate::muted_error;
use crate::protocol::{ProtocolMessage, VariableRecord};
use crate::registry::EditorRegistry;
use serde_json::Value;

/// Variables fetched since the debuggee last stopped, in arrival order.
#[derive(Debug, Default, Clone)]
pub struct VariableCache {
    records: Vec<VariableRecord>,
}

impl VariableCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = VariableRecord>) {
        self.records.extend(records);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[VariableRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Effect of one protocol message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Debuggee stopped: editors refreshed, variable cache cleared.
    Stopped,
    /// Debuggee memory may have changed: editors refreshed.
    MemoryChanged,
    /// Variables appended to the cache.
    VariablesAdded(usize),
    Ignored,
}

/// Protocol message interceptor of a single debug session.
///
/// Owns the session variable cache, so a new session always starts with an empty one.
pub struct SessionInterceptor {
    session_id: String,
    refresh_commands: Vec<String>,
    variables: VariableCache,
}

impl SessionInterceptor {
    pub fn new(session_id: impl Into<String>, config: &BridgeConfig) -> Self {
        Self {
            session_id: session_id.into(),
            refresh_commands: config.refresh_commands.clone(),
            variables: VariableCache::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn variables(&self) -> &VariableCache {
        &self.variables
    }

    /// Apply a decoded message. Effects are applied completely before return.
    pub fn on_message(&mut self, message: &ProtocolMessage, registry: &EditorRegistry) -> Effect {
        let effect = match message {
            ProtocolMessage::Event { event, .. } if event == "stopped" => {
                registry.refresh_all_editors();
                self.variables.clear();
                Effect::Stopped
            }
            ProtocolMessage::Response { command, .. } if self.is_refresh_command(command) => {
                registry.refresh_all_editors();
                Effect::MemoryChanged
            }
            ProtocolMessage::Response { command, .. } if command == "variables" => {
                let records = message.variables();
                let count = records.len();
                self.variables.extend(records);
                Effect::VariablesAdded(count)
            }
            _ => Effect::Ignored,
        };

        if effect != Effect::Ignored {
            log::debug!(target: "bridge", "session {}: {effect:?}", self.session_id);
        }
        effect
    }

    /// Apply a raw JSON message. Messages that are not events or responses are ignored.
    pub fn on_raw_message(&mut self, message: Value, registry: &EditorRegistry) -> Effect {
        match muted_error!(ProtocolMessage::from_value(message)) {
            Some(message) => self.on_message(&message, registry),
            None => Effect::Ignored,
        }
    }

    fn is_refresh_command(&self, command: &str) -> bool {
        self.refresh_commands.iter().any(|c| c == command)
    }
}
