//! kw_store — Owner-scoped vault storage for Keywarden
//!
//! # Trust model
//! The store never sees plaintext vault data: cipher payloads, folder
//! names and key blobs arrive from the client already encrypted and are
//! persisted verbatim. What the store DOES enforce is scoping: every
//! cipher and folder operation is keyed by `(owner, id)`, so one
//! account's records are structurally invisible to another's, and a
//! cross-account probe is indistinguishable from a miss.
//!
//! # Engines
//! - [`MemoryStore`] — volatile maps behind an async lock; tests and
//!   embedded setups.
//! - [`SqliteStore`] — sqlx over SQLite (WAL, foreign keys); schema via
//!   migrations in `migrations/`, run by [`Database::init`].
//!
//! Both are exercised by one shared contract-test suite so they cannot
//! drift apart.

pub mod db;
pub mod error;
pub mod memory;
mod rows;
pub mod sqlite;

pub use db::Database;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use sqlite::{SqliteConfig, SqliteStore};
