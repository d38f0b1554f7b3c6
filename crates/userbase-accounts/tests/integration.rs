//! Integration tests for the userbase-accounts crate.
//!
//! These tests exercise the full store lifecycle — table creation,
//! registration, authentication, mutation, and listing — against a real
//! SQLite database on disk (via tempfile), including reconnecting to an
//! existing table.

use std::path::Path;

use userbase_accounts::{ACTIVITY_ACCOUNT, AccountError, AccountStore, StoreConfig, StoreLocation};

async fn connect(prefix: &str, path: &Path) -> AccountStore {
    let config = StoreConfig::new(
        prefix,
        b"integration-secret".to_vec(),
        StoreLocation::Disk(path.to_path_buf()),
    )
    .unwrap();
    AccountStore::connect(config).await.unwrap()
}

#[tokio::test]
async fn full_account_lifecycle_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("accounts.db");

    let store = connect("prod", &db_path).await;
    assert!(db_path.exists());

    // Register and authenticate.
    let account = store
        .register_with_password("alice@example.com", "pw1", "192.0.2.10")
        .await
        .unwrap();
    assert!(account.is_enabled());

    let signed_in = store.authenticate("alice@example.com", "pw1").await.unwrap();
    assert_eq!(signed_in.uid(), "alice@example.com");

    // Duplicate registration fails and leaves the account intact.
    let dup = store
        .register_with_password("alice@example.com", "other", "192.0.2.11")
        .await;
    assert!(matches!(dup.unwrap_err(), AccountError::AlreadyExists(_)));
    assert_eq!(
        store.get_by_id("alice@example.com").await.unwrap().reg_ip(),
        "192.0.2.10"
    );

    // Mutate: activity, disable/enable, password change.
    assert!(
        store
            .append_activity("alice@example.com", ACTIVITY_ACCOUNT, "signed up", "192.0.2.10")
            .await
    );
    assert!(store.disable("alice@example.com").await);
    assert!(store.authenticate("alice@example.com", "pw1").await.is_none());
    assert!(store.enable("alice@example.com").await);
    assert!(store.change_password("alice@example.com", "pw2").await);
    assert!(store.authenticate("alice@example.com", "pw1").await.is_none());
    assert!(store.authenticate("alice@example.com", "pw2").await.is_some());
}

#[tokio::test]
async fn state_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("accounts.db");

    {
        let store = connect("prod", &db_path).await;
        store
            .register_with_password("bob@example.com", "pw1", "192.0.2.20")
            .await
            .unwrap();
        for n in 0..3 {
            assert!(
                store
                    .append_activity("bob@example.com", ACTIVITY_ACCOUNT, &format!("event-{n}"), "192.0.2.20")
                    .await
            );
        }
    }

    // A second store over the same file attaches to the existing table.
    let store = connect("prod", &db_path).await;
    let account = store.authenticate("bob@example.com", "pw1").await.unwrap();
    assert_eq!(account.reg_ip(), "192.0.2.20");

    let lines = &account.activity()[ACTIVITY_ACCOUNT];
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines.iter().map(|l| l.desc.as_str()).collect::<Vec<_>>(),
        ["event-0", "event-1", "event-2"]
    );
}

#[tokio::test]
async fn prefixes_isolate_tables() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("accounts.db");

    let staging = connect("staging", &db_path).await;
    let prod = connect("prod", &db_path).await;

    staging
        .register_with_password("carol@example.com", "pw1", "192.0.2.30")
        .await
        .unwrap();

    assert!(prod.get_by_id("carol@example.com").await.is_none());
    assert!(staging.get_by_id("carol@example.com").await.is_some());
}

#[tokio::test]
async fn list_all_across_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("accounts.db");

    {
        let store = connect("prod", &db_path).await;
        for uid in ["a@x.com", "b@x.com"] {
            store
                .register_with_password(uid, "pw", "192.0.2.40")
                .await
                .unwrap();
        }
    }

    let store = connect("prod", &db_path).await;
    let accounts = store.list_all().await.unwrap();
    assert_eq!(accounts.len(), 2);
    assert!(accounts.contains_key("a@x.com"));
    assert!(accounts.contains_key("b@x.com"));
}

#[tokio::test]
async fn delete_table_teardown() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("accounts.db");

    let store = connect("prod", &db_path).await;
    store
        .register_with_password("dave@example.com", "pw", "192.0.2.50")
        .await
        .unwrap();

    store.delete_table().await.unwrap();

    // A fresh connect recreates an empty table.
    let store = connect("prod", &db_path).await;
    assert!(store.get_by_id("dave@example.com").await.is_none());
}
