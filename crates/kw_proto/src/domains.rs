//! Equivalent-domain reference table.
//!
//! Clients use these groupings to treat credentials for one domain as
//! valid for its equivalents during autofill. The table is configuration
//! data, not owner-scoped vault state: `equivalentDomains` holds
//! tenant-defined groupings and `globalEquivalentDomains` the predefined
//! ones, each tagged with the upstream client's numeric group id so a
//! tenant opt-out (`excluded`) survives client round-trips.

use serde::{Deserialize, Serialize};

use crate::wire::ObjectKind;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domains {
    pub equivalent_domains: Vec<Vec<String>>,
    pub global_equivalent_domains: Vec<GlobalEquivalentDomains>,
    pub object: ObjectKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalEquivalentDomains {
    #[serde(rename = "type")]
    pub r#type: i32,
    pub domains: Vec<String>,
    pub excluded: bool,
}

impl Default for Domains {
    /// No tenant-defined groupings, the built-in global table, nothing
    /// excluded.
    fn default() -> Self {
        Domains {
            equivalent_domains: Vec::new(),
            global_equivalent_domains: builtin_global_domains(),
            object: ObjectKind::Domains,
        }
    }
}

/// The built-in global groupings.
///
/// A trimmed seed of the upstream list: the well-known groupings with
/// their upstream numeric tags. Deployments wanting the complete upstream
/// table can swap in their own via `Syncer::with_domains`.
pub fn builtin_global_domains() -> Vec<GlobalEquivalentDomains> {
    fn group(r#type: i32, domains: &[&str]) -> GlobalEquivalentDomains {
        GlobalEquivalentDomains {
            r#type,
            domains: domains.iter().map(|d| d.to_string()).collect(),
            excluded: false,
        }
    }

    vec![
        group(3, &["wellsfargo.com", "wf.com"]),
        group(8, &["google.com", "youtube.com", "gmail.com", "googlemail.com"]),
        group(9, &["apple.com", "icloud.com"]),
        group(
            14,
            &["amazon.com", "amazon.co.uk", "amazon.de", "amazon.fr", "amazon.ca"],
        ),
        group(22, &["steampowered.com", "steamcommunity.com", "steamgames.com"]),
        group(35, &["dropbox.com", "getdropbox.com"]),
        group(47, &["facebook.com", "messenger.com"]),
    ]
}
