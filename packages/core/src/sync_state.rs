// ABOUTME: Per-entity sync health state machine
// ABOUTME: not_synced -> pending_sync -> synced | sync_failed, with error capture

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::UnknownVariant;
use crate::validation::truncate;

/// Message recorded when a failure is reported without any text
pub const UNKNOWN_SYNC_ERROR: &str = "unknown sync error";

/// Longest error message kept in `last_sync_error`
pub const MAX_SYNC_ERROR_LEN: usize = 1000;

/// Sync health of a Project or Task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    NotSynced,
    PendingSync,
    Synced,
    SyncFailed,
}

impl Default for SyncStatus {
    fn default() -> Self {
        SyncStatus::NotSynced
    }
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::NotSynced => "not_synced",
            SyncStatus::PendingSync => "pending_sync",
            SyncStatus::Synced => "synced",
            SyncStatus::SyncFailed => "sync_failed",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_synced" => Ok(SyncStatus::NotSynced),
            "pending_sync" => Ok(SyncStatus::PendingSync),
            "synced" => Ok(SyncStatus::Synced),
            "sync_failed" => Ok(SyncStatus::SyncFailed),
            other => Err(UnknownVariant::new("sync status", other)),
        }
    }
}

/// Sync status plus the bookkeeping that must move with it.
///
/// Fields are private so that the invariants hold for every value:
/// `last_sync_error` is present exactly when the status is `sync_failed`,
/// and `last_synced_at` only moves when entering `synced`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "SyncStateRecord")]
pub struct SyncState {
    #[serde(rename = "syncStatus")]
    status: SyncStatus,
    last_synced_at: Option<DateTime<Utc>>,
    last_sync_error: Option<String>,
}

/// Unchecked wire/storage form of [`SyncState`]
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncStateRecord {
    #[serde(rename = "syncStatus", default)]
    status: SyncStatus,
    #[serde(default)]
    last_synced_at: Option<DateTime<Utc>>,
    #[serde(default)]
    last_sync_error: Option<String>,
}

impl From<SyncStateRecord> for SyncState {
    fn from(record: SyncStateRecord) -> Self {
        SyncState::restore(record.status, record.last_synced_at, record.last_sync_error)
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncState {
    /// Initial state of a locally created entity
    pub fn new() -> Self {
        Self {
            status: SyncStatus::NotSynced,
            last_synced_at: None,
            last_sync_error: None,
        }
    }

    /// State of an entity materialized from the remote source of truth
    pub fn synced_at(now: DateTime<Utc>) -> Self {
        Self {
            status: SyncStatus::Synced,
            last_synced_at: Some(now),
            last_sync_error: None,
        }
    }

    /// Rebuild a state from persisted columns, repairing rows that break the
    /// error invariant.
    pub fn restore(
        status: SyncStatus,
        last_synced_at: Option<DateTime<Utc>>,
        last_sync_error: Option<String>,
    ) -> Self {
        let last_sync_error = match status {
            SyncStatus::SyncFailed => Some(normalize_error(last_sync_error.as_deref())),
            _ => None,
        };
        Self {
            status,
            last_synced_at,
            last_sync_error,
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn last_synced_at(&self) -> Option<DateTime<Utc>> {
        self.last_synced_at
    }

    pub fn last_sync_error(&self) -> Option<&str> {
        self.last_sync_error.as_deref()
    }

    pub fn is_synced(&self) -> bool {
        self.status == SyncStatus::Synced
    }

    pub fn is_failed(&self) -> bool {
        self.status == SyncStatus::SyncFailed
    }

    /// Work has been queued but not attempted yet
    pub fn mark_pending(&mut self) {
        self.status = SyncStatus::PendingSync;
        self.last_sync_error = None;
    }

    pub fn mark_synced(&mut self, now: DateTime<Utc>) {
        self.status = SyncStatus::Synced;
        self.last_synced_at = Some(now);
        self.last_sync_error = None;
    }

    /// Record a failed attempt. `last_synced_at` keeps the last success.
    pub fn mark_failed(&mut self, message: impl AsRef<str>) {
        self.status = SyncStatus::SyncFailed;
        self.last_sync_error = Some(normalize_error(Some(message.as_ref())));
    }
}

fn normalize_error(message: Option<&str>) -> String {
    match message.map(str::trim) {
        Some(msg) if !msg.is_empty() => truncate(msg, MAX_SYNC_ERROR_LEN),
        _ => UNKNOWN_SYNC_ERROR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_state_is_not_synced() {
        let state = SyncState::new();
        assert_eq!(state.status(), SyncStatus::NotSynced);
        assert!(state.last_synced_at().is_none());
        assert!(state.last_sync_error().is_none());
    }

    #[test]
    fn test_failed_then_synced_clears_error() {
        let mut state = SyncState::new();
        state.mark_failed("connection refused");
        assert!(state.is_failed());
        assert_eq!(state.last_sync_error(), Some("connection refused"));
        assert!(state.last_synced_at().is_none());

        let now = Utc::now();
        state.mark_synced(now);
        assert!(state.is_synced());
        assert!(state.last_sync_error().is_none());
        assert_eq!(state.last_synced_at(), Some(now));
    }

    #[test]
    fn test_repeated_failure_updates_message_and_keeps_timestamp() {
        let earlier = Utc::now() - Duration::hours(2);
        let mut state = SyncState::synced_at(earlier);

        state.mark_failed("timeout");
        state.mark_failed("rate limited");

        assert_eq!(state.status(), SyncStatus::SyncFailed);
        assert_eq!(state.last_sync_error(), Some("rate limited"));
        assert_eq!(state.last_synced_at(), Some(earlier));
    }

    #[test]
    fn test_blank_failure_message_is_replaced() {
        let mut state = SyncState::new();
        state.mark_failed("   ");
        assert_eq!(state.last_sync_error(), Some(UNKNOWN_SYNC_ERROR));
    }

    #[test]
    fn test_long_failure_message_is_truncated() {
        let mut state = SyncState::new();
        state.mark_failed("x".repeat(MAX_SYNC_ERROR_LEN * 2));
        let stored = state.last_sync_error().unwrap_or_default();
        assert!(stored.chars().count() <= MAX_SYNC_ERROR_LEN);
    }

    #[test]
    fn test_pending_clears_previous_error() {
        let mut state = SyncState::new();
        state.mark_failed("boom");
        state.mark_pending();
        assert_eq!(state.status(), SyncStatus::PendingSync);
        assert!(state.last_sync_error().is_none());
    }

    #[test]
    fn test_restore_repairs_inconsistent_rows() {
        let synced_with_error =
            SyncState::restore(SyncStatus::Synced, Some(Utc::now()), Some("stale".into()));
        assert!(synced_with_error.last_sync_error().is_none());

        let failed_without_error = SyncState::restore(SyncStatus::SyncFailed, None, None);
        assert_eq!(
            failed_without_error.last_sync_error(),
            Some(UNKNOWN_SYNC_ERROR)
        );
    }

    #[test]
    fn test_deserialize_goes_through_restore() {
        let json = r#"{"syncStatus":"synced","lastSyncError":"leftover"}"#;
        let state: SyncState = serde_json::from_str(json).unwrap();
        assert!(state.is_synced());
        assert!(state.last_sync_error().is_none());
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            SyncStatus::NotSynced,
            SyncStatus::PendingSync,
            SyncStatus::Synced,
            SyncStatus::SyncFailed,
        ] {
            assert_eq!(status.as_str().parse::<SyncStatus>().unwrap(), status);
        }
        assert!("exploded".parse::<SyncStatus>().is_err());
    }
}
