//! Skip-or-regenerate decision for one tool.

use tabgen_db::CatalogEntry;

/// What to do with a freshly extracted tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Scripts on disk already match this tree.
    Skip,
    /// No previous generation on record, or regeneration was forced.
    Generate,
    VersionChanged { from: String, to: String },
    /// Same version, different extracted tree.
    HashChanged,
}

/// Compares a fresh extraction against the cached record.
///
/// A tool is skipped only when it was generated before with a non-empty
/// version equal to `version` and a non-empty fingerprint equal to
/// `fingerprint`. A tool that never reports a version therefore always
/// regenerates.
///
/// # Examples
///
/// ```
/// use tabgen_db::CatalogEntry;
/// use tabgen_pipeline::{Decision, decide};
///
/// let mut entry = CatalogEntry::new("git", "/usr/bin/git");
/// entry.mark_generated("2.43.0", "abc");
///
/// assert_eq!(decide(Some(&entry), "2.43.0", "abc", false), Decision::Skip);
/// assert_eq!(decide(Some(&entry), "2.43.0", "abc", true), Decision::Generate);
/// assert_eq!(decide(Some(&entry), "2.43.0", "def", false), Decision::HashChanged);
/// ```
pub fn decide(cached: Option<&CatalogEntry>, version: &str, fingerprint: &str, force: bool) -> Decision {
    let entry = match cached {
        Some(entry) if !force && entry.generated && !entry.generated_version.is_empty() => entry,
        _ => return Decision::Generate,
    };

    let version_match = entry.generated_version == version;
    let hash_match = !entry.content_hash.is_empty() && entry.content_hash == fingerprint;

    match (version_match, hash_match) {
        (true, true) => Decision::Skip,
        (false, _) => Decision::VersionChanged {
            from: entry.generated_version.clone(),
            to: version.to_string(),
        },
        (true, false) => Decision::HashChanged,
    }
}
