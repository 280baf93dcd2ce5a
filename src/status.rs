//! Outbound status reporting.
//!
//! After every turn and at game end the orchestrator publishes a compact
//! record to whatever monitoring surface is attached. Publishing is fire
//! and forget: sinks must never block the decision loop, and failures
//! are swallowed (at most logged).

use serde::{Deserialize, Serialize};

/// Compact progress record for external monitoring.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Whether a game is currently in progress.
    pub active: bool,
    pub opponent: String,
    pub games_played: u32,
    pub games_total: u32,
    /// Current score estimate, positive when the bot leads.
    pub score_diff: f64,
    pub move_count: usize,
}

/// Monitoring surface. Implementations must not block.
pub trait StatusSink {
    fn publish(&mut self, record: &StatusRecord);
}

/// Discards every record.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl StatusSink for NullSink {
    fn publish(&mut self, _record: &StatusRecord) {}
}

/// Emits records on the log at debug level, serialized as one JSON
/// object per line. Serialization failures are swallowed.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl StatusSink for LogSink {
    fn publish(&mut self, record: &StatusRecord) {
        match serde_json::to_string(record) {
            Ok(line) => log::debug!("status {line}"),
            Err(e) => log::debug!("status record not serializable: {e}"),
        }
    }
}

/// Collects records in memory; used by tests to observe reporting.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    pub records: Vec<StatusRecord>,
}

impl StatusSink for MemorySink {
    fn publish(&mut self, record: &StatusRecord) {
        self.records.push(record.clone());
    }
}
