//! SQLite engine over sqlx.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteQueryResult,
};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use kw_proto::{Account, Cipher, Folder, ObjectKind};

use crate::db::{refresh_token_matches, Database};
use crate::error::StoreError;
use crate::rows::{AccountRow, CipherRow, FolderRow};

/// Connection settings for [`SqliteStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Database file; created on first open when missing.
    pub path: PathBuf,
    /// Upper bound on pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl SqliteConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteConfig {
            path: path.into(),
            max_connections: default_max_connections(),
        }
    }
}

/// Durable [`Database`] engine. Cheap to clone (the pool is Arc
/// internally); one handle serves concurrent callers.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file named in `config`.
    ///
    /// Journal mode and foreign-key enforcement are set on the connection,
    /// not in a migration: sqlx runs each migration inside a transaction,
    /// and SQLite refuses to switch `journal_mode` within one.
    pub async fn open(config: SqliteConfig) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(opts)
            .await?;

        debug!(path = %config.path.display(), "sqlite store opened");
        Ok(Self { pool })
    }
}

/// Constraint failures surface as domain errors: a unique-index hit is a
/// `Conflict`, a missing foreign owner is a plain `NotFound`.
fn write_error(context: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(format!("{context}: {}", db.message()))
        }
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            StoreError::NotFound(context.to_string())
        }
        other => StoreError::Database(other),
    }
}

/// The one ownership guard for mutations: every UPDATE/DELETE carries an
/// `owner_id = ?` predicate, so zero affected rows means "absent or not
/// yours" and both read as the same `NotFound`.
fn ensure_hit(done: SqliteQueryResult, what: String) -> Result<(), StoreError> {
    if done.rows_affected() == 0 {
        return Err(StoreError::NotFound(what));
    }
    Ok(())
}

#[async_trait]
impl Database for SqliteStore {
    async fn init(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Migration(e.to_string()))?;
        debug!("sqlite schema ready");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }

    async fn add_account(&self, account: Account) -> Result<Account, StoreError> {
        sqlx::query(
            "INSERT INTO accounts (id, name, email, master_password_hash, master_password_hint, key, encrypted_private_key, public_key, refresh_token) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.master_password_hash)
        .bind(&account.master_password_hint)
        .bind(&account.key)
        .bind(&account.key_pair.encrypted_private_key)
        .bind(&account.key_pair.public_key)
        .bind(&account.refresh_token)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("account already registered", e))?;
        Ok(account)
    }

    async fn get_account(
        &self,
        username: &str,
        refresh_token: &str,
    ) -> Result<Account, StoreError> {
        // `email` carries COLLATE NOCASE, so equality here is already
        // case-insensitive.
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, name, email, master_password_hash, master_password_hint, key, encrypted_private_key, public_key, refresh_token \
             FROM accounts WHERE email = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        let account: Account = row
            .ok_or_else(|| StoreError::NotFound(format!("account {username}")))?
            .into();
        if !refresh_token_matches(refresh_token, &account.refresh_token) {
            return Err(StoreError::Unauthorized);
        }
        Ok(account)
    }

    async fn update_account_info(&self, account: Account) -> Result<(), StoreError> {
        let done = sqlx::query(
            "UPDATE accounts SET name = ?, email = ?, master_password_hash = ?, master_password_hint = ?, key = ?, encrypted_private_key = ?, public_key = ?, refresh_token = ? \
             WHERE id = ?",
        )
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.master_password_hash)
        .bind(&account.master_password_hint)
        .bind(&account.key)
        .bind(&account.key_pair.encrypted_private_key)
        .bind(&account.key_pair.public_key)
        .bind(&account.refresh_token)
        .bind(&account.id)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error("email already registered", e))?;

        ensure_hit(done, format!("account {}", account.id))
    }

    async fn new_cipher(&self, cipher: Cipher, owner: &str) -> Result<Cipher, StoreError> {
        let mut stored = cipher;
        stored.id = Uuid::new_v4().to_string();
        stored.revision_date = Utc::now();

        sqlx::query(
            "INSERT INTO ciphers (owner_id, id, type, folder_id, organization_id, favorite, edit, data, attachments, organization_use_totp, collection_ids, revision_date) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(owner)
        .bind(&stored.id)
        .bind(stored.r#type)
        .bind(&stored.folder_id)
        .bind(&stored.organization_id)
        .bind(stored.favorite)
        .bind(stored.edit)
        .bind(serde_json::to_string(&stored.data)?)
        .bind(serde_json::to_string(&stored.attachments)?)
        .bind(stored.organization_use_totp)
        .bind(serde_json::to_string(&stored.collection_ids)?)
        .bind(stored.revision_date)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(&format!("account {owner}"), e))?;

        Ok(stored)
    }

    async fn get_cipher(&self, owner: &str, cipher_id: &str) -> Result<Cipher, StoreError> {
        let row: Option<CipherRow> = sqlx::query_as(
            "SELECT id, type, folder_id, organization_id, favorite, edit, data, attachments, organization_use_totp, collection_ids, revision_date \
             FROM ciphers WHERE owner_id = ? AND id = ?",
        )
        .bind(owner)
        .bind(cipher_id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| StoreError::NotFound(format!("cipher {cipher_id}")))?
            .into_cipher()
    }

    async fn get_ciphers(&self, owner: &str) -> Result<Vec<Cipher>, StoreError> {
        let rows: Vec<CipherRow> = sqlx::query_as(
            "SELECT id, type, folder_id, organization_id, favorite, edit, data, attachments, organization_use_totp, collection_ids, revision_date \
             FROM ciphers WHERE owner_id = ? ORDER BY id",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(CipherRow::into_cipher).collect()
    }

    async fn update_cipher(
        &self,
        new_data: Cipher,
        owner: &str,
        cipher_id: &str,
    ) -> Result<(), StoreError> {
        let done = sqlx::query(
            "UPDATE ciphers SET type = ?, folder_id = ?, favorite = ?, data = ?, attachments = ?, collection_ids = ?, revision_date = ? \
             WHERE owner_id = ? AND id = ?",
        )
        .bind(new_data.r#type)
        .bind(&new_data.folder_id)
        .bind(new_data.favorite)
        .bind(serde_json::to_string(&new_data.data)?)
        .bind(serde_json::to_string(&new_data.attachments)?)
        .bind(serde_json::to_string(&new_data.collection_ids)?)
        .bind(Utc::now())
        .bind(owner)
        .bind(cipher_id)
        .execute(&self.pool)
        .await?;

        ensure_hit(done, format!("cipher {cipher_id}"))
    }

    async fn delete_cipher(&self, owner: &str, cipher_id: &str) -> Result<(), StoreError> {
        let done = sqlx::query("DELETE FROM ciphers WHERE owner_id = ? AND id = ?")
            .bind(owner)
            .bind(cipher_id)
            .execute(&self.pool)
            .await?;

        ensure_hit(done, format!("cipher {cipher_id}"))
    }

    async fn add_folder(&self, name: &str, owner: &str) -> Result<Folder, StoreError> {
        let folder = Folder {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            object: ObjectKind::Folder,
            revision_date: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO folders (owner_id, id, name, revision_date) VALUES (?, ?, ?, ?)",
        )
        .bind(owner)
        .bind(&folder.id)
        .bind(&folder.name)
        .bind(folder.revision_date)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(&format!("account {owner}"), e))?;

        Ok(folder)
    }

    async fn get_folders(&self, owner: &str) -> Result<Vec<Folder>, StoreError> {
        let rows: Vec<FolderRow> = sqlx::query_as(
            "SELECT id, name, revision_date FROM folders WHERE owner_id = ? ORDER BY id",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Folder::from).collect())
    }
}
