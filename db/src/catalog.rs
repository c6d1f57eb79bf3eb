//! The tool catalog: one cache record per known executable.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cache record for one tool.
///
/// `version` is the version seen on the last scan; `generated_version` and
/// `content_hash` describe the tree the current scripts were generated from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Binary name.
    pub name: String,
    /// Full path to the binary.
    pub path: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub generated_version: String,
    /// Fingerprint of the tree the scripts were generated from.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content_hash: String,
    #[serde(default)]
    pub generated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scan: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_help: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub has_man_page: bool,
}

impl CatalogEntry {
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            ..Self::default()
        }
    }

    /// Records a successful generation from a tree with the given version and
    /// fingerprint.
    pub fn mark_generated(&mut self, version: &str, content_hash: &str) {
        self.version = version.to_string();
        self.generated_version = version.to_string();
        self.content_hash = content_hash.to_string();
        self.generated = true;
        self.last_scan = Some(Utc::now());
    }
}

/// Every known tool, keyed by name.
///
/// # Examples
///
/// ```
/// use tabgen_db::{Catalog, CatalogEntry};
///
/// let mut catalog = Catalog::default();
/// catalog.insert(CatalogEntry::new("git", "/usr/bin/git"));
/// catalog.entry_mut("git").unwrap().mark_generated("2.43.0", "abc123");
///
/// let git = catalog.get("git").unwrap();
/// assert!(git.generated);
/// assert_eq!(git.generated_version, "2.43.0");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scan: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tools: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn get(&self, name: &str) -> Option<&CatalogEntry> {
        self.tools.get(name)
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut CatalogEntry> {
        self.tools.get_mut(name)
    }

    /// Inserts or replaces the entry keyed by its name.
    pub fn insert(&mut self, entry: CatalogEntry) {
        self.tools.insert(entry.name.clone(), entry);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.tools.values()
    }

    pub fn touch(&mut self) {
        self.last_scan = Some(Utc::now());
    }
}
