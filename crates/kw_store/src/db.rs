//! The storage contract every engine implements.
//!
//! All cipher/folder operations are owner-scoped: a lookup that would land
//! on another account's record is a miss, full stop. Engines make that
//! structural (records are keyed by `(owner, id)`) rather than checking
//! ownership per method.

use async_trait::async_trait;
use subtle::ConstantTimeEq;

use kw_proto::{Account, Cipher, Folder};

use crate::error::StoreError;

/// Capability contract for vault storage.
///
/// Engines are `Send + Sync` and cheap to clone; one handle may serve
/// concurrent callers across accounts and sessions. Within one owner a
/// successful write is visible to every subsequent read (read-your-writes);
/// ordering across owners is unconstrained.
///
/// Acquisition is each engine's `open` constructor (a handle that exists
/// is an open resource); [`Database::close`] releases it.
#[async_trait]
pub trait Database: Send + Sync {
    /// Prepare persistent structures. Must be called once before any other
    /// operation; idempotent, so calling it again is a no-op.
    async fn init(&self) -> Result<(), StoreError>;

    /// Release the underlying resource. Pairs with the engine's `open`.
    async fn close(&self);

    /// Store a new account exactly as given (the caller assigns the id).
    /// `Conflict` when the id or the email, matched case-insensitively,
    /// is already registered.
    async fn add_account(&self, account: Account) -> Result<Account, StoreError>;

    /// Look up an account by username (email, case-insensitive) and verify
    /// its refresh token. `NotFound` for an unknown username,
    /// `Unauthorized` when the token does not match the stored value.
    async fn get_account(&self, username: &str, refresh_token: &str)
        -> Result<Account, StoreError>;

    /// Replace a stored account's fields, the refresh token included;
    /// this is the session-renewal path. `NotFound` when the id is absent.
    async fn update_account_info(&self, account: Account) -> Result<(), StoreError>;

    /// Persist a cipher under `owner`, assigning its id and revision date.
    /// `NotFound` when the owner account does not exist.
    async fn new_cipher(&self, cipher: Cipher, owner: &str) -> Result<Cipher, StoreError>;

    /// Fetch one cipher in `owner`'s scope.
    async fn get_cipher(&self, owner: &str, cipher_id: &str) -> Result<Cipher, StoreError>;

    /// Every cipher `owner` has; empty when there are none.
    async fn get_ciphers(&self, owner: &str) -> Result<Vec<Cipher>, StoreError>;

    /// Replace a stored cipher's mutable fields (`type`, `folderId`,
    /// `favorite`, `data`, `attachments`, `collectionIds`) and refresh its
    /// revision date. Identity fields stay as stored.
    async fn update_cipher(
        &self,
        new_data: Cipher,
        owner: &str,
        cipher_id: &str,
    ) -> Result<(), StoreError>;

    /// Delete one cipher in `owner`'s scope.
    async fn delete_cipher(&self, owner: &str, cipher_id: &str) -> Result<(), StoreError>;

    /// Create a folder named `name` (ciphertext) under `owner`, assigning
    /// its id and revision date. `NotFound` when the owner is absent.
    async fn add_folder(&self, name: &str, owner: &str) -> Result<Folder, StoreError>;

    /// Every folder `owner` has; empty when there are none.
    async fn get_folders(&self, owner: &str) -> Result<Vec<Folder>, StoreError>;
}

/// Refresh-token check shared by every engine. Constant-time over the
/// token bytes; unequal lengths compare unequal.
pub(crate) fn refresh_token_matches(provided: &str, stored: &str) -> bool {
    provided.as_bytes().ct_eq(stored.as_bytes()).into()
}
