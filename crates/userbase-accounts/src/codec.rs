//! Serialization boundary between [`Account`] and the stored item.
//!
//! The table row is flat strings; the nested structure (public fields,
//! log map) lives in two JSON blobs. Keeping the encoding in one place
//! lets the storage format version independently of the in-memory
//! shape.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::account::{Account, LogLine};
use crate::error::{AccountError, AccountResult};
use crate::table::AccountItem;

const ENABLED: &str = "1";
const DISABLED: &str = "0";

/// The `info` blob: public fields of an account.
#[derive(Serialize, Deserialize)]
struct PublicFields {
    reg_ts: i64,
    reg_ip: String,
}

/// Encode an account into a full table item. Both JSON blobs are always
/// rewritten, even when only one logically changed.
pub(crate) fn encode(account: &Account) -> AccountResult<AccountItem> {
    let info = serde_json::to_string(&PublicFields {
        reg_ts: account.reg_ts,
        reg_ip: account.reg_ip.clone(),
    })?;
    let logs = serde_json::to_string(&account.logs)?;

    Ok(AccountItem {
        uid: account.uid.clone(),
        key: account.key.clone(),
        info,
        logs,
        enabled: if account.enabled { ENABLED } else { DISABLED }.to_string(),
    })
}

/// Decode a stored item back into an account snapshot.
///
/// A JSON decode failure on either blob is [`AccountError::Corrupt`].
/// Any enabled flag other than `"1"` decodes as disabled (fail closed).
pub(crate) fn decode(item: AccountItem) -> AccountResult<Account> {
    let info: PublicFields = serde_json::from_str(&item.info).map_err(|source| {
        AccountError::Corrupt {
            uid: item.uid.clone(),
            source,
        }
    })?;
    let logs: HashMap<String, Vec<LogLine>> =
        serde_json::from_str(&item.logs).map_err(|source| AccountError::Corrupt {
            uid: item.uid.clone(),
            source,
        })?;

    Ok(Account {
        uid: item.uid,
        key: item.key,
        enabled: item.enabled == ENABLED,
        reg_ts: info.reg_ts,
        reg_ip: info.reg_ip,
        logs,
    })
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        let mut logs = HashMap::new();
        logs.insert(
            "account".to_string(),
            vec![LogLine {
                ts: 1_700_000_000,
                ip: "10.0.0.1".to_string(),
                kind: "account".to_string(),
                desc: "registered".to_string(),
            }],
        );
        Account {
            uid: "alice@example.com".to_string(),
            key: "ZGlnZXN0".to_string(),
            enabled: true,
            reg_ts: 1_700_000_000,
            reg_ip: "10.0.0.1".to_string(),
            logs,
        }
    }

    #[test]
    fn encode_decode_round_trip() {
        let original = account();
        let decoded = decode(encode(&original).unwrap()).unwrap();

        assert_eq!(decoded.uid, original.uid);
        assert_eq!(decoded.key, original.key);
        assert_eq!(decoded.enabled, original.enabled);
        assert_eq!(decoded.reg_ts, original.reg_ts);
        assert_eq!(decoded.reg_ip, original.reg_ip);
        assert_eq!(decoded.logs, original.logs);
    }

    #[test]
    fn enabled_flag_encodes_as_strings() {
        let mut acct = account();
        assert_eq!(encode(&acct).unwrap().enabled, "1");
        acct.enabled = false;
        assert_eq!(encode(&acct).unwrap().enabled, "0");
    }

    #[test]
    fn unknown_enabled_value_decodes_as_disabled() {
        let mut item = encode(&account()).unwrap();
        item.enabled = "maybe".to_string();
        assert!(!decode(item).unwrap().enabled);
    }

    #[test]
    fn log_line_wire_names_are_stable() {
        // The stored format uses "type", not "kind".
        let item = encode(&account()).unwrap();
        assert!(item.logs.contains(r#""type":"account""#), "got: {}", item.logs);
        assert!(item.info.contains(r#""reg_ip":"10.0.0.1""#), "got: {}", item.info);
    }

    #[test]
    fn corrupt_info_blob_is_reported() {
        let mut item = encode(&account()).unwrap();
        item.info = "not json".to_string();
        match decode(item).unwrap_err() {
            AccountError::Corrupt { uid, .. } => assert_eq!(uid, "alice@example.com"),
            other => panic!("expected Corrupt, got: {other}"),
        }
    }

    #[test]
    fn corrupt_logs_blob_is_reported() {
        let mut item = encode(&account()).unwrap();
        item.logs = "[oops".to_string();
        assert!(matches!(
            decode(item).unwrap_err(),
            AccountError::Corrupt { .. }
        ));
    }
}
