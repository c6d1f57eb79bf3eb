//! Content fingerprinting for extracted trees.
//!
//! The fingerprint covers exactly a tool's subcommands and global flags, in
//! list order. Name, path, version, timestamp and source are excluded, so two
//! passes over unchanged help text agree even when the binary moved or the
//! version string changed.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::{Command, Flag, Tool};

/// Hex-encoded SHA-256 digest of a tool's extracted structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Full 64-character lowercase hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 16 hex characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..16]
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize)]
struct HashedContent<'a> {
    subcommands: &'a [Command],
    global_flags: &'a [Flag],
}

/// Computes the content fingerprint of a tool.
///
/// # Examples
///
/// ```
/// use tabgen_core::{Flag, Tool, fingerprint};
///
/// let mut a = Tool::new("tool", "/usr/bin/tool");
/// a.global_flags.push(Flag::new("--verbose"));
///
/// let mut b = a.clone();
/// b.name = "renamed".to_string();
/// b.version = Some("2.0".to_string());
/// assert_eq!(fingerprint(&a), fingerprint(&b));
///
/// b.global_flags[0].description = Some("Be loud".to_string());
/// assert_ne!(fingerprint(&a), fingerprint(&b));
/// ```
pub fn fingerprint(tool: &Tool) -> Fingerprint {
    fingerprint_parts(&tool.subcommands, &tool.global_flags)
}

/// Computes the fingerprint of a subcommand list and a flag list.
pub fn fingerprint_parts(subcommands: &[Command], global_flags: &[Flag]) -> Fingerprint {
    let content = HashedContent {
        subcommands,
        global_flags,
    };
    // Serializing plain structs and vectors into memory cannot fail.
    let bytes = serde_json::to_vec(&content).unwrap_or_default();
    let hash = Sha256::digest(&bytes);
    Fingerprint(format!("{:x}", hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SourceTag;

    fn sample() -> Tool {
        let mut tool = Tool::new("kubectl", "/usr/bin/kubectl");
        tool.subcommands.push(
            Command::new("get")
                .with_description("Display resources")
                .with_flag(Flag::new("--output").with_choices("value", ["json", "yaml"])),
        );
        tool.global_flags.push(Flag::new("--namespace").with_short("-n"));
        tool
    }

    #[test]
    fn test_fingerprint_is_hex_sha256() {
        let fp = fingerprint(&sample());
        assert_eq!(fp.as_str().len(), 64);
        assert!(fp.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(fp.short().len(), 16);
    }

    #[test]
    fn test_fingerprint_ignores_identity_fields() {
        let a = sample();
        let mut b = sample();
        b.name = "kubectl2".to_string();
        b.path = "/opt/bin/kubectl".to_string();
        b.version = Some("1.30.0".to_string());
        b.source = SourceTag::Both;
        b.parsed_at = a.parsed_at + chrono::Duration::hours(3);

        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_changes_with_nested_choices() {
        let a = sample();
        let mut b = sample();
        b.subcommands[0].flags[0].argument_values.push("wide".to_string());

        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_changes_with_nested_flag_name() {
        let a = sample();
        let mut b = sample();
        b.subcommands[0].flags[0].name = "--out".to_string();

        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn test_fingerprint_is_order_sensitive() {
        let mut a = Tool::new("t", "/t");
        a.global_flags.push(Flag::new("--a"));
        a.global_flags.push(Flag::new("--b"));
        let mut b = a.clone();
        b.global_flags.reverse();

        assert_ne!(fingerprint(&a), fingerprint(&b));
    }
}
