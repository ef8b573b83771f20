//! Best-effort analytics tracking.
//!
//! Tracking is never critical: callers log failures and move on. System
//! identifiers are anonymized before they leave the process.

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Payload of a tracker event.
#[derive(Debug, Clone, Default)]
pub struct TrackerEvent {
    data: BTreeMap<String, Value>,
}

impl TrackerEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a data field.
    pub fn add_data(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.data.insert(key.to_string(), value.into());
        self
    }

    /// Collected data fields.
    pub fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }
}

/// Analytics capability.
#[async_trait]
pub trait Tracker: Send + Sync {
    /// Send one event under a category. Best-effort: errors are caught and
    /// logged by callers, never escalated.
    async fn send_event(&self, category: &str, event: TrackerEvent) -> Result<()>;
}

/// Tracker that drops every event. Default for embeddings with telemetry
/// disabled.
#[derive(Debug, Clone, Default)]
pub struct NullTracker;

#[async_trait]
impl Tracker for NullTracker {
    async fn send_event(&self, _category: &str, _event: TrackerEvent) -> Result<()> {
        Ok(())
    }
}

/// Short anonymized identifier for a system within a manifest.
pub fn system_hash(manifest_id: &str, system: &str) -> String {
    let digest = Sha256::digest(format!("{}{}", manifest_id, system).as_bytes());
    hex::encode(digest)[..8].to_string()
}
