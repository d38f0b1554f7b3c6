//! # userbase-accounts
//!
//! Account store for Userbase: a durable, key-addressed repository of
//! user identities, credentials, and per-account activity history.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  AccountStore (register / lookup /       │
//! │  authenticate / list / mutate)           │
//! ├──────────────────────────────────────────┤
//! │  CredentialHasher (PBKDF2-HMAC-SHA256)   │
//! │  codec (Account ⇄ stored item JSON)      │
//! ├──────────────────────────────────────────┤
//! │  AccountTable (hash-key table over       │
//! │  rusqlite, spawn_blocking dispatch)      │
//! └──────────────────────────────────────────┘
//! ```
//!
//! One store instance per process. The table is named `<prefix>_users`
//! and holds one row per account: the `uid` hash key plus four string
//! attributes (credential digest, public-fields JSON, activity-log
//! JSON, enabled flag). Persists are always full-item overwrites.
//!
//! This crate is a library consumed by a server process; it defines no
//! network protocol and no CLI.
//!
//! ## Quick start
//!
//! ```ignore
//! use userbase_accounts::{AccountStore, StoreConfig, StoreLocation};
//!
//! let config = StoreConfig::from_env("prod", StoreLocation::Disk("data/accounts.db".into()))?;
//! let store = AccountStore::connect(config).await?;
//!
//! let account = store.register_with_password("alice@example.com", "pw", "10.0.0.1").await?;
//! let signed_in = store.authenticate("alice@example.com", "pw").await;
//! ```

pub mod account;
mod codec;
pub mod config;
pub mod crypto;
pub mod error;
pub mod store;
pub mod table;

// ── re-exports ───────────────────────────────────────────────────────

pub use account::{ACTIVITY_ACCOUNT, Account, LogLine};
pub use config::{SECRET_ENV_VAR, StoreConfig, StoreLocation};
pub use crypto::CredentialHasher;
pub use error::{AccountError, AccountResult};
pub use store::AccountStore;
pub use table::{AccountItem, AccountTable};
