//! Folder records. The name is ciphertext like everything else the user
//! typed; only the id and revision date are plaintext.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::wire::ObjectKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    /// Assigned by the store on creation; unique within the owner's scope.
    pub id: String,
    pub name: String,
    pub object: ObjectKind,
    pub revision_date: DateTime<Utc>,
}
