//! Account record, asymmetric key material, and the client-visible Profile.

use serde::{Deserialize, Serialize};

use crate::wire::ObjectKind;

/// Culture reported to clients. Nothing in this server localises, so every
/// profile carries the same value.
pub const DEFAULT_CULTURE: &str = "en-US";

/// Client-generated asymmetric key material. Both halves are opaque to the
/// server; the private key arrives already encrypted under the user's key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    pub encrypted_private_key: String,
    pub public_key: String,
}

/// One registered account.
///
/// `master_password_hash` is an opaque verifier the server never
/// interprets, and `key` is the client-encrypted symmetric key blob.
/// `refresh_token` is session material: it is serde-skipped so that no
/// serialisation path (logging included) can ever hand it to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Immutable after registration.
    pub id: String,
    pub name: String,
    /// Unique per tenant, matched case-insensitively.
    pub email: String,
    pub master_password_hash: String,
    pub master_password_hint: Option<String>,
    pub key: String,
    #[serde(rename = "keys")]
    pub key_pair: KeyPair,
    /// Rotated on session renewal. Never serialised.
    #[serde(skip)]
    pub refresh_token: String,
}

impl Account {
    /// Derive the client-visible view of this account.
    ///
    /// Pure; no I/O. Strips `master_password_hash` entirely and never
    /// touches `refresh_token`. Fields this server does not track
    /// (`emailVerified`, `premium`, `twoFactorEnabled`, `organizations`)
    /// are fixed to safe defaults, and `name` / `masterPasswordHint` /
    /// `securityStamp` stay `None` so they encode as explicit null for
    /// strict client parsers.
    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id.clone(),
            name: None,
            email: self.email.clone(),
            email_verified: false,
            premium: false,
            master_password_hint: None,
            culture: DEFAULT_CULTURE.to_string(),
            two_factor_enabled: false,
            key: self.key.clone(),
            private_key: self.key_pair.encrypted_private_key.clone(),
            security_stamp: None,
            organizations: Vec::new(),
            object: ObjectKind::Profile,
        }
    }
}

/// What a client learns about its own account on sync.
///
/// Derived from [`Account`] via [`Account::profile`]; has no field that
/// could hold the master-password hash or a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    /// Always null-present in this core — see `wire::NULL_PRESENT_FIELDS`.
    pub name: Option<String>,
    pub email: String,
    pub email_verified: bool,
    pub premium: bool,
    /// Always null-present in this core.
    pub master_password_hint: Option<String>,
    pub culture: String,
    pub two_factor_enabled: bool,
    pub key: String,
    pub private_key: String,
    /// Always null-present in this core.
    pub security_stamp: Option<String>,
    pub organizations: Vec<String>,
    pub object: ObjectKind,
}
