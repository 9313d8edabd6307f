//! The composed full-vault snapshot and the response payload union.

use serde::{Deserialize, Serialize};

use crate::account::Profile;
use crate::cipher::Cipher;
use crate::domains::Domains;
use crate::folder::Folder;
use crate::wire::ObjectKind;

/// A client's complete vault state, assembled per sync request: its
/// profile, every folder and cipher it owns, and the domains table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncData {
    pub profile: Profile,
    pub folders: Vec<Folder>,
    pub ciphers: Vec<Cipher>,
    pub domains: Domains,
    pub object: ObjectKind,
}

/// One wire shape for heterogeneous response payloads.
///
/// Untagged: every inner shape already carries its own `object`
/// discriminator, so the serialised bytes are exactly what a
/// stringly-typed envelope would produce while the payload stays
/// statically checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Data {
    Profile(Profile),
    Cipher(Cipher),
    Folder(Folder),
    Domains(Domains),
    Sync(Box<SyncData>),
}

impl Data {
    pub fn object(&self) -> ObjectKind {
        match self {
            Data::Profile(_) => ObjectKind::Profile,
            Data::Cipher(_) => ObjectKind::Cipher,
            Data::Folder(_) => ObjectKind::Folder,
            Data::Domains(_) => ObjectKind::Domains,
            Data::Sync(_) => ObjectKind::Sync,
        }
    }
}

impl From<Profile> for Data {
    fn from(profile: Profile) -> Self {
        Data::Profile(profile)
    }
}

impl From<Cipher> for Data {
    fn from(cipher: Cipher) -> Self {
        Data::Cipher(cipher)
    }
}

impl From<Folder> for Data {
    fn from(folder: Folder) -> Self {
        Data::Folder(folder)
    }
}

impl From<Domains> for Data {
    fn from(domains: Domains) -> Self {
        Data::Domains(domains)
    }
}

impl From<SyncData> for Data {
    fn from(sync: SyncData) -> Self {
        Data::Sync(Box::new(sync))
    }
}
