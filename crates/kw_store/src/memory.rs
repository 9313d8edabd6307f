//! In-memory engine.
//!
//! Backs tests and embedded setups that do not want a database file. The
//! record maps are keyed by `(owner, id)`, so owner scoping is the shape
//! of the data rather than a predicate bolted onto each query.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use kw_proto::{Account, Cipher, Folder, ObjectKind};

use crate::db::{refresh_token_matches, Database};
use crate::error::StoreError;

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    ciphers: BTreeMap<(String, String), Cipher>,
    folders: BTreeMap<(String, String), Folder>,
}

impl Inner {
    fn require_owner(&self, owner: &str) -> Result<(), StoreError> {
        if self.accounts.contains_key(owner) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("account {owner}")))
        }
    }
}

/// Volatile [`Database`] engine. Cloning yields another handle onto the
/// same records.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    /// A fresh, empty store.
    pub fn open() -> Self {
        Self::default()
    }
}

fn owner_range<'a, T>(
    map: &'a BTreeMap<(String, String), T>,
    owner: &'a str,
) -> impl Iterator<Item = &'a T> + 'a {
    map.range((owner.to_string(), String::new())..)
        .take_while(move |(key, _)| key.0 == owner)
        .map(|(_, value)| value)
}

#[async_trait]
impl Database for MemoryStore {
    async fn init(&self) -> Result<(), StoreError> {
        debug!("in-memory store ready");
        Ok(())
    }

    async fn close(&self) {
        let mut inner = self.inner.write().await;
        *inner = Inner::default();
    }

    async fn add_account(&self, account: Account) -> Result<Account, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.accounts.contains_key(&account.id) {
            return Err(StoreError::Conflict(format!("account id {}", account.id)));
        }
        if inner
            .accounts
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&account.email))
        {
            return Err(StoreError::Conflict(format!("email {}", account.email)));
        }
        inner.accounts.insert(account.id.clone(), account.clone());
        Ok(account)
    }

    async fn get_account(
        &self,
        username: &str,
        refresh_token: &str,
    ) -> Result<Account, StoreError> {
        let inner = self.inner.read().await;
        let account = inner
            .accounts
            .values()
            .find(|candidate| candidate.email.eq_ignore_ascii_case(username))
            .ok_or_else(|| StoreError::NotFound(format!("account {username}")))?;
        if !refresh_token_matches(refresh_token, &account.refresh_token) {
            return Err(StoreError::Unauthorized);
        }
        Ok(account.clone())
    }

    async fn update_account_info(&self, account: Account) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.accounts.contains_key(&account.id) {
            return Err(StoreError::NotFound(format!("account {}", account.id)));
        }
        if inner.accounts.values().any(|existing| {
            existing.id != account.id && existing.email.eq_ignore_ascii_case(&account.email)
        }) {
            return Err(StoreError::Conflict(format!("email {}", account.email)));
        }
        inner.accounts.insert(account.id.clone(), account);
        Ok(())
    }

    async fn new_cipher(&self, cipher: Cipher, owner: &str) -> Result<Cipher, StoreError> {
        let mut inner = self.inner.write().await;
        inner.require_owner(owner)?;
        let mut stored = cipher;
        stored.id = Uuid::new_v4().to_string();
        stored.revision_date = Utc::now();
        inner
            .ciphers
            .insert((owner.to_string(), stored.id.clone()), stored.clone());
        Ok(stored)
    }

    async fn get_cipher(&self, owner: &str, cipher_id: &str) -> Result<Cipher, StoreError> {
        let inner = self.inner.read().await;
        inner
            .ciphers
            .get(&(owner.to_string(), cipher_id.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("cipher {cipher_id}")))
    }

    async fn get_ciphers(&self, owner: &str) -> Result<Vec<Cipher>, StoreError> {
        let inner = self.inner.read().await;
        Ok(owner_range(&inner.ciphers, owner).cloned().collect())
    }

    async fn update_cipher(
        &self,
        new_data: Cipher,
        owner: &str,
        cipher_id: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .ciphers
            .get_mut(&(owner.to_string(), cipher_id.to_string()))
            .ok_or_else(|| StoreError::NotFound(format!("cipher {cipher_id}")))?;
        stored.r#type = new_data.r#type;
        stored.folder_id = new_data.folder_id;
        stored.favorite = new_data.favorite;
        stored.data = new_data.data;
        stored.attachments = new_data.attachments;
        stored.collection_ids = new_data.collection_ids;
        stored.revision_date = Utc::now();
        Ok(())
    }

    async fn delete_cipher(&self, owner: &str, cipher_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .ciphers
            .remove(&(owner.to_string(), cipher_id.to_string()))
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("cipher {cipher_id}")))
    }

    async fn add_folder(&self, name: &str, owner: &str) -> Result<Folder, StoreError> {
        let mut inner = self.inner.write().await;
        inner.require_owner(owner)?;
        let folder = Folder {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            object: ObjectKind::Folder,
            revision_date: Utc::now(),
        };
        inner
            .folders
            .insert((owner.to_string(), folder.id.clone()), folder.clone());
        Ok(folder)
    }

    async fn get_folders(&self, owner: &str) -> Result<Vec<Folder>, StoreError> {
        let inner = self.inner.read().await;
        Ok(owner_range(&inner.folders, owner).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use kw_proto::{cipher_type, Cipher};

    use super::MemoryStore;
    use crate::db::{contract, Database};

    #[tokio::test]
    async fn accounts_follow_contract() {
        contract::account_lifecycle(&MemoryStore::open()).await;
    }

    #[tokio::test]
    async fn ciphers_follow_contract() {
        contract::cipher_crud(&MemoryStore::open()).await;
    }

    #[tokio::test]
    async fn owners_are_isolated() {
        contract::owner_isolation(&MemoryStore::open()).await;
    }

    #[tokio::test]
    async fn folders_follow_contract() {
        contract::folder_roundtrip(&MemoryStore::open()).await;
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        contract::init_is_idempotent(&MemoryStore::open()).await;
    }

    #[tokio::test]
    async fn clones_share_state() {
        let db = MemoryStore::open();
        db.init().await.expect("init");
        db.add_account(contract::account("u1", "a@x.com"))
            .await
            .expect("add account");

        let other = db.clone();
        other
            .get_account("a@x.com", "rt-u1")
            .await
            .expect("visible through clone");
    }

    #[tokio::test]
    async fn close_drops_state() {
        let db = MemoryStore::open();
        db.init().await.expect("init");
        db.add_account(contract::account("u1", "a@x.com"))
            .await
            .expect("add account");

        db.close().await;
        assert!(db
            .get_account("a@x.com", "rt-u1")
            .await
            .expect_err("closed store is empty")
            .is_not_found());
    }

    #[tokio::test]
    async fn concurrent_writers_do_not_lose_records() {
        let db = MemoryStore::open();
        db.init().await.expect("init");
        db.add_account(contract::account("u1", "a@x.com"))
            .await
            .expect("add owner");

        let mut tasks = Vec::new();
        for n in 0..16 {
            let db = db.clone();
            tasks.push(tokio::spawn(async move {
                let data = contract::login_data(&format!("2.enc-{n}"));
                db.new_cipher(Cipher::new(cipher_type::LOGIN, data), "u1")
                    .await
                    .expect("insert");
            }));
        }
        for task in tasks {
            task.await.expect("writer task");
        }

        assert_eq!(db.get_ciphers("u1").await.expect("list").len(), 16);
    }
}
