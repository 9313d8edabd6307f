//! kw_proto — Vault entity model and client wire encoding for Keywarden
//!
//! Everything the server stores is already encrypted by the client; the
//! types here carry opaque ciphertext strings and the handful of plaintext
//! fields (ids, timestamps, flags) the server needs for bookkeeping.
//!
//! The JSON shapes are a fixed external contract. Shipped client apps
//! parse them strictly, down to the difference between a key that is
//! present-as-null and a key that is missing — see [`wire`] for the
//! null-encoding policy and the one table that makes it auditable.
//!
//! # Modules
//! - `account` — Account record, key pair, and the Profile derivation
//! - `cipher`  — Encrypted vault items and their payload envelope
//! - `folder`  — Folder records
//! - `domains` — Equivalent-domain reference table for autofill matching
//! - `sync`    — The composed full-vault snapshot and the response payload union
//! - `wire`    — Object discriminators and the null-encoding policy table

pub mod account;
pub mod cipher;
pub mod domains;
pub mod folder;
pub mod sync;
pub mod wire;

pub use account::{Account, KeyPair, Profile};
pub use cipher::{cipher_type, Cipher, CipherData};
pub use domains::{Domains, GlobalEquivalentDomains};
pub use folder::Folder;
pub use sync::{Data, SyncData};
pub use wire::ObjectKind;
