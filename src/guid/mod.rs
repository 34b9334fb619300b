// src/guid/mod.rs

//! Stable GUID assignment
//!
//! Installer components are identified by GUID, and changing a component's
//! GUID between builds breaks upgrade and uninstall. Every GUID handed out
//! here is therefore tied to a key that is derived deterministically from
//! the template: either a `autowix:guid:` reference written by the author,
//! or the accumulated path of a file picked up by a tree expansion.
//!
//! A [`GuidMap`] is loaded from the persistence file at start, consulted and
//! extended while the template is transformed, and written back once the run
//! has succeeded.
//!
//! # Key namespaces
//!
//! Author-written keys always start with [`GUID_REFERENCE_PREFIX`] and have
//! their spaces rewritten to [`REFERENCE_SPACE_MARKER`]. Path-derived keys
//! never carry the prefix and have their spaces rewritten to
//! [`PATH_SPACE_MARKER`], a character Windows does not allow in file names.

pub mod persistence;

use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::debug;
use uuid::Uuid;

/// Attribute-value prefix marking a GUID reference
pub const GUID_REFERENCE_PREFIX: &str = "autowix:guid:";

/// Replacement for spaces in author-written reference keys
pub const REFERENCE_SPACE_MARKER: char = '_';

/// Replacement for spaces in path-derived keys
pub const PATH_SPACE_MARKER: char = '|';

/// Mapping from GUID key to canonical GUID string
///
/// Once a key has a value it keeps it for the lifetime of the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuidMap {
    entries: BTreeMap<String, String>,
}

impl GuidMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys with an assigned GUID
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the GUID assigned to `key`, if any
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate over `(key, guid)` pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Return the GUID for `key`, minting and recording a new one on first use
    pub fn resolve(&mut self, key: &str) -> String {
        if let Some(existing) = self.entries.get(key) {
            return existing.clone();
        }

        let guid = new_guid();
        debug!("Assigned new GUID {} to {}", guid, key);
        self.entries.insert(key.to_string(), guid.clone());
        guid
    }

    /// Record a persisted entry; a later record for the same key replaces it
    pub(crate) fn insert_persisted(&mut self, key: String, guid: String) {
        self.entries.insert(key, guid);
    }
}

impl FromIterator<(String, String)> for GuidMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Generate a random GUID in canonical form: uppercase, hyphenated, no braces
pub fn new_guid() -> String {
    Uuid::new_v4().hyphenated().to_string().to_uppercase()
}

/// Whether an attribute value is a GUID reference
pub fn is_guid_reference(value: &str) -> bool {
    value.starts_with(GUID_REFERENCE_PREFIX)
}

/// Rewrite spaces in an author-written reference key
///
/// Returns `Cow::Borrowed` when the key needed no change, so callers can
/// tell whether a warning is due.
pub fn sanitize_reference_key(key: &str) -> Cow<'_, str> {
    if key.contains(' ') {
        Cow::Owned(key.replace(' ', &REFERENCE_SPACE_MARKER.to_string()))
    } else {
        Cow::Borrowed(key)
    }
}

/// Build the GUID key for a file found by a tree expansion
pub fn path_key(accumulated_path: &str) -> String {
    accumulated_path.replace(' ', &PATH_SPACE_MARKER.to_string())
}
