//! kw_sync — Full-vault snapshot assembly for Keywarden
//!
//! Clients do not fetch records piecemeal: one sync request replaces
//! their entire local state. [`Syncer`] turns "who is asking" into that
//! complete response (profile, folders, ciphers, equivalent-domain
//! table) against any [`Database`] engine. Strictly read-only, and
//! all-or-nothing: a snapshot either composes completely or the request
//! fails with the underlying error.

use std::sync::Arc;

use tracing::debug;

use kw_proto::{Account, Domains, ObjectKind, SyncData};
use kw_store::{Database, StoreError};

/// Assembles full-vault snapshots.
///
/// Cheap to clone; holds the storage handle and the domains table to
/// attach to every snapshot.
#[derive(Clone)]
pub struct Syncer {
    db: Arc<dyn Database>,
    domains: Domains,
}

impl Syncer {
    /// A syncer over `db` carrying the built-in equivalent-domain table.
    pub fn new(db: Arc<dyn Database>) -> Self {
        Syncer {
            db,
            domains: Domains::default(),
        }
    }

    /// Replace the domains table attached to snapshots, for deployments
    /// with tenant-defined groupings or a different global list.
    pub fn with_domains(mut self, domains: Domains) -> Self {
        self.domains = domains;
        self
    }

    /// Authenticate and assemble in one step.
    ///
    /// Resolves `username` via the store's refresh-token check, so an
    /// unknown username surfaces as `NotFound` and a stale or foreign
    /// token as `Unauthorized` before any vault data is touched.
    pub async fn snapshot(
        &self,
        username: &str,
        refresh_token: &str,
    ) -> Result<SyncData, StoreError> {
        let account = self.db.get_account(username, refresh_token).await?;
        self.snapshot_for(&account).await
    }

    /// Assemble the snapshot for an account something else already
    /// authenticated.
    ///
    /// Fetches only within `account`'s scope. Any fetch error fails the
    /// whole request; there is no partial snapshot.
    pub async fn snapshot_for(&self, account: &Account) -> Result<SyncData, StoreError> {
        let folders = self.db.get_folders(&account.id).await?;
        let ciphers = self.db.get_ciphers(&account.id).await?;

        debug!(
            owner = %account.id,
            folders = folders.len(),
            ciphers = ciphers.len(),
            "assembled sync snapshot"
        );

        Ok(SyncData {
            profile: account.profile(),
            folders,
            ciphers,
            domains: self.domains.clone(),
            object: ObjectKind::Sync,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use kw_proto::{cipher_type, Account, Cipher, CipherData, Domains, Folder, KeyPair};
    use kw_store::{Database, MemoryStore, SqliteConfig, SqliteStore, StoreError};

    use super::Syncer;

    fn sample_account(id: &str, email: &str) -> Account {
        Account {
            id: id.to_string(),
            name: format!("user {id}"),
            email: email.to_string(),
            master_password_hash: format!("hash-{id}"),
            master_password_hint: None,
            key: format!("0.key-{id}"),
            key_pair: KeyPair {
                encrypted_private_key: format!("2.priv-{id}"),
                public_key: format!("pub-{id}"),
            },
            refresh_token: format!("rt-{id}"),
        }
    }

    fn login(name: &str) -> CipherData {
        CipherData {
            uri: "2.enc-uri".into(),
            username: "2.enc-user".into(),
            password: "2.enc-pass".into(),
            totp: None,
            name: name.to_string(),
            notes: None,
            fields: Vec::new(),
        }
    }

    async fn seeded_memory() -> MemoryStore {
        let db = MemoryStore::open();
        db.init().await.expect("init");
        db.add_account(sample_account("u1", "a@x.com"))
            .await
            .expect("add u1");
        db.add_account(sample_account("u2", "b@x.com"))
            .await
            .expect("add u2");

        let folder = db.add_folder("2.enc-work", "u1").await.expect("u1 folder");
        let mut filed = Cipher::new(cipher_type::LOGIN, login("2.enc-mail"));
        filed.folder_id = Some(folder.id);
        db.new_cipher(filed, "u1").await.expect("u1 filed cipher");
        db.new_cipher(Cipher::new(cipher_type::SECURE_NOTE, login("2.enc-note")), "u1")
            .await
            .expect("u1 loose cipher");

        db.new_cipher(Cipher::new(cipher_type::LOGIN, login("2.enc-other")), "u2")
            .await
            .expect("u2 cipher");
        db
    }

    #[tokio::test]
    async fn snapshot_composes_the_whole_vault() {
        let syncer = Syncer::new(Arc::new(seeded_memory().await));

        let sync = syncer.snapshot("a@x.com", "rt-u1").await.expect("snapshot");
        assert_eq!(sync.profile.id, "u1");
        assert_eq!(sync.profile.email, "a@x.com");
        assert_eq!(sync.folders.len(), 1);
        assert_eq!(sync.ciphers.len(), 2);
        assert!(!sync.domains.global_equivalent_domains.is_empty());

        // Filed cipher points at the folder that travels in the same
        // snapshot.
        let filed = sync
            .ciphers
            .iter()
            .find(|c| c.folder_id.is_some())
            .expect("filed cipher");
        assert_eq!(filed.folder_id.as_deref(), Some(sync.folders[0].id.as_str()));
    }

    #[tokio::test]
    async fn snapshot_stays_within_the_owner() {
        let syncer = Syncer::new(Arc::new(seeded_memory().await));

        let sync = syncer.snapshot("b@x.com", "rt-u2").await.expect("snapshot");
        assert_eq!(sync.profile.id, "u2");
        assert!(sync.folders.is_empty());
        assert_eq!(sync.ciphers.len(), 1);
        assert_eq!(sync.ciphers[0].data.name, "2.enc-other");
    }

    #[tokio::test]
    async fn authentication_failures_propagate() {
        let syncer = Syncer::new(Arc::new(seeded_memory().await));

        assert!(matches!(
            syncer.snapshot("a@x.com", "rt-u2").await,
            Err(StoreError::Unauthorized)
        ));
        assert!(syncer
            .snapshot("nobody@x.com", "rt-u1")
            .await
            .expect_err("unknown username")
            .is_not_found());
    }

    #[tokio::test]
    async fn snapshot_wire_shape_is_the_client_contract() {
        let syncer = Syncer::new(Arc::new(seeded_memory().await));
        let sync = syncer.snapshot("a@x.com", "rt-u1").await.expect("snapshot");

        let encoded = serde_json::to_value(&sync).expect("encode snapshot");
        assert_eq!(encoded["object"], "sync");
        assert_eq!(encoded["profile"]["object"], "profile");
        assert!(encoded.get("profile").is_some());
        assert!(encoded["folders"].is_array());
        assert!(encoded["ciphers"].is_array());
        assert!(encoded["domains"]["globalEquivalentDomains"].is_array());

        // The loose cipher carries folderId as explicit null, never a
        // missing key.
        let loose = encoded["ciphers"]
            .as_array()
            .expect("ciphers array")
            .iter()
            .find(|c| c["folderId"].is_null())
            .expect("folderless cipher");
        assert!(loose.get("folderId").is_some());

        // And nothing in the whole snapshot leaks credentials.
        let rendered = encoded.to_string();
        assert!(!rendered.contains("hash-u1"));
        assert!(!rendered.contains("rt-u1"));
    }

    #[tokio::test]
    async fn domains_table_can_be_replaced() {
        let mut domains = Domains::default();
        domains.equivalent_domains = vec![vec!["corp.example".into(), "example.com".into()]];
        let syncer = Syncer::new(Arc::new(seeded_memory().await)).with_domains(domains);

        let sync = syncer.snapshot("a@x.com", "rt-u1").await.expect("snapshot");
        assert_eq!(sync.domains.equivalent_domains.len(), 1);
        assert_eq!(sync.domains.equivalent_domains[0][0], "corp.example");
    }

    #[tokio::test]
    async fn snapshot_works_over_sqlite() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteStore::open(SqliteConfig::new(dir.path().join("vault.db")))
            .await
            .expect("open store");
        store.init().await.expect("init");
        store
            .add_account(sample_account("u1", "a@x.com"))
            .await
            .expect("add account");
        store
            .new_cipher(Cipher::new(cipher_type::LOGIN, login("2.enc-site")), "u1")
            .await
            .expect("new cipher");

        let syncer = Syncer::new(Arc::new(store));
        let sync = syncer.snapshot("A@X.com", "rt-u1").await.expect("snapshot");
        assert_eq!(sync.profile.id, "u1");
        assert_eq!(sync.ciphers.len(), 1);
    }

    /// Engine whose cipher listing always fails, for exercising the
    /// all-or-nothing path.
    struct DetachedCiphers {
        inner: MemoryStore,
    }

    #[async_trait]
    impl Database for DetachedCiphers {
        async fn init(&self) -> Result<(), StoreError> {
            self.inner.init().await
        }

        async fn close(&self) {
            self.inner.close().await;
        }

        async fn add_account(&self, account: Account) -> Result<Account, StoreError> {
            self.inner.add_account(account).await
        }

        async fn get_account(
            &self,
            username: &str,
            refresh_token: &str,
        ) -> Result<Account, StoreError> {
            self.inner.get_account(username, refresh_token).await
        }

        async fn update_account_info(&self, account: Account) -> Result<(), StoreError> {
            self.inner.update_account_info(account).await
        }

        async fn new_cipher(&self, cipher: Cipher, owner: &str) -> Result<Cipher, StoreError> {
            self.inner.new_cipher(cipher, owner).await
        }

        async fn get_cipher(&self, owner: &str, cipher_id: &str) -> Result<Cipher, StoreError> {
            self.inner.get_cipher(owner, cipher_id).await
        }

        async fn get_ciphers(&self, _owner: &str) -> Result<Vec<Cipher>, StoreError> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "cipher table unreachable",
            )))
        }

        async fn update_cipher(
            &self,
            new_data: Cipher,
            owner: &str,
            cipher_id: &str,
        ) -> Result<(), StoreError> {
            self.inner.update_cipher(new_data, owner, cipher_id).await
        }

        async fn delete_cipher(&self, owner: &str, cipher_id: &str) -> Result<(), StoreError> {
            self.inner.delete_cipher(owner, cipher_id).await
        }

        async fn add_folder(&self, name: &str, owner: &str) -> Result<Folder, StoreError> {
            self.inner.add_folder(name, owner).await
        }

        async fn get_folders(&self, owner: &str) -> Result<Vec<Folder>, StoreError> {
            self.inner.get_folders(owner).await
        }
    }

    #[tokio::test]
    async fn failed_fetch_yields_no_partial_snapshot() {
        let inner = seeded_memory().await;
        let syncer = Syncer::new(Arc::new(DetachedCiphers { inner }));

        // Folders fetch succeeds first; the cipher failure still fails
        // the whole request.
        let err = syncer
            .snapshot("a@x.com", "rt-u1")
            .await
            .expect_err("snapshot must fail");
        assert!(matches!(err, StoreError::Io(_)));
    }
}
