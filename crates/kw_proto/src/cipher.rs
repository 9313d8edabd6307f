//! Encrypted vault items.
//!
//! A cipher's payload fields (`uri`, `username`, `password`, …) are
//! ciphertext produced by the client; the server stores and echoes them
//! byte-for-byte. Only the scoping fields (`id`, `folderId`, timestamps,
//! flags) are plaintext.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wire::ObjectKind;

/// Numeric item discriminators from the upstream client protocol.
pub mod cipher_type {
    pub const LOGIN: i32 = 1;
    pub const SECURE_NOTE: i32 = 2;
    pub const CARD: i32 = 3;
    pub const IDENTITY: i32 = 4;
}

/// One encrypted vault entry.
///
/// `folderId` and `organizationId` are null-present on the wire (see
/// `wire::NULL_PRESENT_FIELDS`): shipped mobile clients crash when the
/// key is omitted instead of null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cipher {
    #[serde(rename = "type")]
    pub r#type: i32,
    pub folder_id: Option<String>,
    /// Org sharing is not modelled by this core; always `None` here.
    pub organization_id: Option<String>,
    pub favorite: bool,
    pub edit: bool,
    /// Assigned by the store on creation; unique within the owner's scope.
    pub id: String,
    pub data: CipherData,
    pub attachments: Vec<String>,
    pub organization_use_totp: bool,
    /// Refreshed by the store on every mutation; clients use it for
    /// change detection.
    pub revision_date: DateTime<Utc>,
    pub object: ObjectKind,
    pub collection_ids: Vec<String>,
}

impl Cipher {
    /// A fresh, unshared cipher. The store assigns `id` and the definitive
    /// `revisionDate` when the cipher is first persisted.
    pub fn new(r#type: i32, data: CipherData) -> Self {
        Cipher {
            r#type,
            folder_id: None,
            organization_id: None,
            favorite: false,
            edit: true,
            id: String::new(),
            data,
            attachments: Vec::new(),
            organization_use_totp: false,
            revision_date: Utc::now(),
            object: ObjectKind::Cipher,
            collection_ids: Vec::new(),
        }
    }
}

/// The encrypted payload envelope inside a cipher.
///
/// `totp` and `notes` are null-present on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CipherData {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub totp: Option<String>,
    pub name: String,
    pub notes: Option<String>,
    pub fields: Vec<String>,
}
