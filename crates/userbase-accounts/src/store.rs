//! The account store: registration, lookup, listing, and mutation.
//!
//! One [`AccountStore`] per process. Callers get immutable [`Account`]
//! snapshots; every mutation is a read-modify-persist cycle executed by
//! the store under a per-id lock, so concurrent mutation of the same
//! account from multiple tasks serializes in-process. Across processes
//! persistence stays unconditional last-writer-wins.
//!
//! Error surface: registration returns structured errors; lookup,
//! authentication and listing return `Option`; mutations return `bool`.
//! The structured cause is always logged before flattening.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, error, info, instrument};

use crate::account::{Account, LogLine};
use crate::codec;
use crate::config::StoreConfig;
use crate::crypto::CredentialHasher;
use crate::error::{AccountError, AccountResult};
use crate::table::AccountTable;

/// Durable, key-addressed repository of accounts.
pub struct AccountStore {
    table: AccountTable,
    hasher: CredentialHasher,
    /// Per-uid locks serializing read-modify-persist cycles.
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AccountStore {
    /// Connect to the backing table, creating it if necessary.
    ///
    /// Table creation polls until the table is active and blocks
    /// indefinitely on persistent failure; see
    /// [`AccountTable::attach`].
    pub async fn connect(config: StoreConfig) -> AccountResult<Self> {
        let hasher = CredentialHasher::new(config.secret.clone());
        let table = AccountTable::attach(&config).await?;

        info!(table = %table.name(), "account store ready");
        Ok(Self {
            table,
            hasher,
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// The store's credential hasher.
    pub fn hasher(&self) -> &CredentialHasher {
        &self.hasher
    }

    // ── registration ─────────────────────────────────────────────────

    /// Register a new account from a pre-computed credential digest.
    ///
    /// The id is normalized by stripping every `+` before the
    /// uniqueness check and storage, so `a+b@x` and `ab@x` collide by
    /// design (plus-addressing abuse guard). Fails with
    /// [`AccountError::AlreadyExists`] on a duplicate normalized id and
    /// [`AccountError::PersistFailed`] on a rejected write.
    #[instrument(skip(self, digest))]
    pub async fn register_with_digest(
        &self,
        uid: &str,
        digest: &str,
        ip: &str,
    ) -> AccountResult<Account> {
        let uid = normalize_uid(uid);

        if self.get_by_id(&uid).await.is_some() {
            return Err(AccountError::AlreadyExists(uid));
        }

        let account = Account {
            uid: uid.clone(),
            key: digest.to_string(),
            enabled: true,
            reg_ts: Utc::now().timestamp(),
            reg_ip: ip.to_string(),
            logs: HashMap::new(),
        };
        self.persist(&account).await?;

        debug!(uid = %account.uid, "account registered");
        Ok(account)
    }

    /// Register a new account from a plaintext password; hashes it,
    /// then delegates to [`register_with_digest`](Self::register_with_digest).
    #[instrument(skip(self, password))]
    pub async fn register_with_password(
        &self,
        uid: &str,
        password: &str,
        ip: &str,
    ) -> AccountResult<Account> {
        self.register_with_digest(uid, &self.hasher.hash(password), ip)
            .await
    }

    // ── lookup ───────────────────────────────────────────────────────

    /// Fetch an account by raw id — no normalization is applied, unlike
    /// registration.
    ///
    /// Returns `None` for not-found, for a corrupt stored record, and
    /// for a read error alike; the cause is logged, not surfaced.
    #[instrument(skip(self))]
    pub async fn get_by_id(&self, uid: &str) -> Option<Account> {
        match self.load(uid).await {
            Ok(found) => found,
            Err(err) => {
                error!(uid, %err, "account lookup failed");
                None
            }
        }
    }

    /// Authenticate by id and plaintext password.
    ///
    /// Succeeds only when the account exists, its stored digest matches
    /// the password's digest, and it is enabled. Wrong password,
    /// disabled account, and no such account are indistinguishable to
    /// the caller (fail closed).
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, uid: &str, password: &str) -> Option<Account> {
        let account = self.get_by_id(uid).await?;
        if account.key != self.hasher.hash(password) || !account.enabled {
            return None;
        }
        Some(account)
    }

    /// List every registered account, keyed by uid.
    ///
    /// Unbounded, unpaginated full-table scan. All-or-nothing: if any
    /// single record fails to decode, the whole listing aborts and
    /// returns `None`.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Option<HashMap<String, Account>> {
        let items = match self.table.scan().await {
            Ok(items) => items,
            Err(err) => {
                error!(%err, "account scan failed");
                return None;
            }
        };

        let mut accounts = HashMap::with_capacity(items.len());
        for item in items {
            match codec::decode(item) {
                Ok(account) => {
                    accounts.insert(account.uid.clone(), account);
                }
                Err(err) => {
                    error!(%err, "listing aborted by undecodable record");
                    return None;
                }
            }
        }
        Some(accounts)
    }

    // ── mutation ─────────────────────────────────────────────────────

    /// Disable an account, blocking authentication until re-enabled.
    pub async fn disable(&self, uid: &str) -> bool {
        let result = self.mutate(uid, |account| account.enabled = false).await;
        flatten(uid, "disable", result)
    }

    /// Re-enable a disabled account.
    pub async fn enable(&self, uid: &str) -> bool {
        let result = self.mutate(uid, |account| account.enabled = true).await;
        flatten(uid, "enable", result)
    }

    /// Replace the stored credential digest with the digest of
    /// `new_password`.
    pub async fn change_password(&self, uid: &str, new_password: &str) -> bool {
        let digest = self.hasher.hash(new_password);
        let result = self.mutate(uid, move |account| account.key = digest).await;
        flatten(uid, "change_password", result)
    }

    /// Append one activity log line to `category`, creating the
    /// category's sequence if absent. Insertion order is preserved; the
    /// full item (both JSON blobs) is rewritten on persist.
    pub async fn append_activity(&self, uid: &str, category: &str, desc: &str, ip: &str) -> bool {
        let line = LogLine {
            ts: Utc::now().timestamp(),
            ip: ip.to_string(),
            kind: category.to_string(),
            desc: desc.to_string(),
        };
        let category = category.to_string();
        let result = self
            .mutate(uid, move |account| {
                account.logs.entry(category).or_default().push(line);
            })
            .await;
        flatten(uid, "append_activity", result)
    }

    /// Drop the backing table. Administrative/test use only.
    pub async fn delete_table(&self) -> AccountResult<()> {
        self.table.delete_table().await
    }

    // ── internals ────────────────────────────────────────────────────

    /// Structured-error lookup by raw id; the public surface flattens
    /// this to `Option`.
    async fn load(&self, uid: &str) -> AccountResult<Option<Account>> {
        match self.table.get_item(uid).await? {
            Some(item) => codec::decode(item).map(Some),
            None => Ok(None),
        }
    }

    /// Full-item persist; never a partial update.
    async fn persist(&self, account: &Account) -> AccountResult<()> {
        let item =
            codec::encode(account).map_err(|e| AccountError::PersistFailed(e.to_string()))?;
        self.table.put_item(item).await
    }

    /// One read-modify-persist cycle under the account's lock: reload
    /// the latest stored record, apply the change, persist the full
    /// item.
    async fn mutate<F>(&self, uid: &str, apply: F) -> AccountResult<Account>
    where
        F: FnOnce(&mut Account),
    {
        let lock = self.lock_for(uid);
        let _guard = lock.lock().await;

        let mut account = self
            .load(uid)
            .await?
            .ok_or_else(|| AccountError::NotFound(uid.to_string()))?;
        apply(&mut account);
        self.persist(&account).await?;
        Ok(account)
    }

    fn lock_for(&self, uid: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(uid.to_string()).or_default())
    }
}

/// Strip every `+` from a caller-supplied id.
fn normalize_uid(uid: &str) -> String {
    uid.replace('+', "")
}

/// Convert a mutation outcome to the boolean persisted/not-persisted
/// contract, logging the structured cause on failure.
fn flatten(uid: &str, op: &str, result: AccountResult<Account>) -> bool {
    match result {
        Ok(_) => true,
        Err(err) => {
            error!(uid, op, %err, "account mutation failed");
            false
        }
    }
}

// ── tests ────────────────────────────────────────────────────────────
