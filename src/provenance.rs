//! Provenance log of the operations that produced a stack

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One recorded operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique id of this entry
    pub id: Uuid,

    /// Operation name, e.g. `build` or `sel`
    pub operation: String,

    /// Operation arguments
    pub arguments: serde_json::Value,

    /// Version of this crate that recorded the entry
    pub version: String,

    /// When the operation ran
    pub timestamp: DateTime<Utc>,
}

/// Ordered record of operations applied to a stack and its ancestors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProvenanceLog {
    entries: Vec<LogEntry>,
}

impl ProvenanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry and return its id
    pub fn add_entry(
        &mut self,
        operation: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Uuid {
        let entry = LogEntry {
            id: Uuid::new_v4(),
            operation: operation.into(),
            arguments,
            version: crate::TILESTACK_VERSION.to_string(),
            timestamp: Utc::now(),
        };
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the recorded operations, oldest first
    pub fn operations(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.operation.as_str())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
