//! Account snapshots and activity log lines.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Activity category for account-lifecycle events (registration,
/// enable/disable, password changes).
pub const ACTIVITY_ACCOUNT: &str = "account";

/// One activity log entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// Epoch seconds when the event happened.
    pub ts: i64,
    /// Origin IP of the request that caused the event.
    pub ip: String,
    /// Log category, duplicated into each line for self-contained
    /// entries.
    #[serde(rename = "type")]
    pub kind: String,
    /// Free-text description.
    pub desc: String,
}

/// One account, as an immutable snapshot of its stored record.
///
/// Snapshots carry no interior mutability; every mutation goes through
/// [`AccountStore`](crate::AccountStore), which reloads the latest
/// stored record under a per-id lock, applies the change, and persists
/// the full item. A snapshot held by a caller is never invalidated by
/// later mutations — re-fetch to observe them.
#[derive(Debug, Clone)]
pub struct Account {
    pub(crate) uid: String,
    /// Credential digest, never a plaintext password.
    pub(crate) key: String,
    pub(crate) enabled: bool,
    pub(crate) reg_ts: i64,
    pub(crate) reg_ip: String,
    /// Per-category, insertion-ordered, append-only activity log.
    pub(crate) logs: HashMap<String, Vec<LogLine>>,
}

impl Account {
    /// The account id (the table's hash key).
    pub fn uid(&self) -> &str {
        &self.uid
    }

    /// Whether the account may authenticate.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Registration timestamp, epoch seconds.
    pub fn reg_ts(&self) -> i64 {
        self.reg_ts
    }

    /// Origin IP recorded at registration.
    pub fn reg_ip(&self) -> &str {
        &self.reg_ip
    }

    /// The activity log as held by this snapshot; no re-read from
    /// storage.
    pub fn activity(&self) -> &HashMap<String, Vec<LogLine>> {
        &self.logs
    }
}
