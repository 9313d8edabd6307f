//! Row models for the SQLite engine.
//!
//! Rows are a private concern of the engine; the public surface speaks
//! `kw_proto` types only. The JSON columns (`data`, `attachments`,
//! `collection_ids`) hold the client-encrypted payload exactly as the
//! wire types serialise it.

use chrono::{DateTime, Utc};

use kw_proto::{Account, Cipher, Folder, KeyPair, ObjectKind};

use crate::error::StoreError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct AccountRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub master_password_hash: String,
    pub master_password_hint: Option<String>,
    pub key: String,
    pub encrypted_private_key: String,
    pub public_key: String,
    pub refresh_token: String,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: row.id,
            name: row.name,
            email: row.email,
            master_password_hash: row.master_password_hash,
            master_password_hint: row.master_password_hint,
            key: row.key,
            key_pair: KeyPair {
                encrypted_private_key: row.encrypted_private_key,
                public_key: row.public_key,
            },
            refresh_token: row.refresh_token,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct CipherRow {
    pub id: String,
    #[sqlx(rename = "type")]
    pub kind: i32,
    pub folder_id: Option<String>,
    pub organization_id: Option<String>,
    pub favorite: bool,
    pub edit: bool,
    /// JSON of `CipherData`.
    pub data: String,
    /// JSON array of attachment references.
    pub attachments: String,
    pub organization_use_totp: bool,
    /// JSON array of collection ids.
    pub collection_ids: String,
    pub revision_date: DateTime<Utc>,
}

impl CipherRow {
    pub fn into_cipher(self) -> Result<Cipher, StoreError> {
        Ok(Cipher {
            r#type: self.kind,
            folder_id: self.folder_id,
            organization_id: self.organization_id,
            favorite: self.favorite,
            edit: self.edit,
            id: self.id,
            data: serde_json::from_str(&self.data)?,
            attachments: serde_json::from_str(&self.attachments)?,
            organization_use_totp: self.organization_use_totp,
            revision_date: self.revision_date,
            object: ObjectKind::Cipher,
            collection_ids: serde_json::from_str(&self.collection_ids)?,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub(crate) struct FolderRow {
    pub id: String,
    pub name: String,
    pub revision_date: DateTime<Utc>,
}

impl From<FolderRow> for Folder {
    fn from(row: FolderRow) -> Self {
        Folder {
            id: row.id,
            name: row.name,
            object: ObjectKind::Folder,
            revision_date: row.revision_date,
        }
    }
}
