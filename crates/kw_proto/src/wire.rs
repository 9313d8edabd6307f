//! Object discriminators and the null-encoding policy table.
//!
//! # Null-encoding policy
//! Shipped clients crash on a *missing* key where they expect a
//! *null-valued* key. Every optional field a client actively parses for
//! null therefore serialises as an explicit `null`, never by omitting the
//! key. In serde terms: those fields are `Option<T>` **without**
//! `skip_serializing_if`, so `None` becomes `null` on the wire.
//!
//! The full set of such fields is [`NULL_PRESENT_FIELDS`]. The table does
//! not drive serialisation (the serde attributes on the entities do); it
//! exists so the policy can be audited and regression-tested in one place
//! instead of being scattered across struct definitions.

use serde::{Deserialize, Serialize};

/// Fixed `object` type-discriminator carried by every client-facing shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    Profile,
    Cipher,
    Folder,
    Domains,
    Sync,
}

impl ObjectKind {
    /// The wire string for this discriminator (`"profile"`, `"cipher"`, …).
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Profile => "profile",
            ObjectKind::Cipher => "cipher",
            ObjectKind::Folder => "folder",
            ObjectKind::Domains => "domains",
            ObjectKind::Sync => "sync",
        }
    }
}

/// Fields that must encode as explicit `null` when absent, keyed by the
/// object kind they appear under. Dotted paths descend into nested
/// payloads (`data.totp` is `totp` inside a cipher's `data`).
///
/// Extend this table and the entity's serde attributes together.
pub const NULL_PRESENT_FIELDS: &[(ObjectKind, &str)] = &[
    (ObjectKind::Cipher, "folderId"),
    (ObjectKind::Cipher, "organizationId"),
    (ObjectKind::Cipher, "data.totp"),
    (ObjectKind::Cipher, "data.notes"),
    (ObjectKind::Profile, "name"),
    (ObjectKind::Profile, "masterPasswordHint"),
    (ObjectKind::Profile, "securityStamp"),
];
