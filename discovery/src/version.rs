//! Version detection from `--version`-style probes.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, trace};

use crate::config::ExtractConfig;
use crate::probe::{ProbeRequest, ProbeRunner};

/// Version patterns in priority order; each captures the version in group 1.
static VERSION_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        // "version 1.2.3", "v1.2.3-rc1", "tool 1.2.3+build.4"
        Regex::new(r"(?i)(?:version\s+)?v?(\d+\.\d+(?:\.\d+)?(?:[-+][a-zA-Z0-9.]+)?)")
            .expect("labeled version regex"),
        // bare "1.2.3" at line start
        Regex::new(r"(?m)^(\d+\.\d+(?:\.\d+)?)").expect("bare version regex"),
    ]
});

/// Longest first line accepted verbatim when no pattern matches.
const MAX_FALLBACK_LEN: usize = 50;

/// Extracts a version from the first line of probe output.
///
/// Tries the version patterns in order; if none match, a short first line
/// is returned as-is. Returns `None` when nothing usable is found.
///
/// # Examples
///
/// ```
/// use tabgen_discovery::extract_version;
///
/// assert_eq!(extract_version("git version 2.39.2").as_deref(), Some("2.39.2"));
/// assert_eq!(extract_version("v1.2.3-beta.1").as_deref(), Some("1.2.3-beta.1"));
/// assert_eq!(extract_version("unknown").as_deref(), Some("unknown"));
/// assert_eq!(extract_version("   "), None);
/// ```
pub fn extract_version(output: &str) -> Option<String> {
    let first_line = output.trim().lines().next()?;

    for pattern in VERSION_PATTERNS.iter() {
        if let Some(found) = pattern.captures(first_line).and_then(|caps| caps.get(1)) {
            return Some(found.as_str().to_string());
        }
    }

    let first_line = first_line.trim();
    (!first_line.is_empty() && first_line.len() < MAX_FALLBACK_LEN).then(|| first_line.to_string())
}

/// Probes `path` with each configured version flag until one yields a version.
///
/// A probe counts only when it exits successfully; failures, timeouts and
/// spawn errors move on to the next flag.
pub fn detect_version(runner: &dyn ProbeRunner, path: &str, config: &ExtractConfig) -> Option<String> {
    for flag in &config.version_flags {
        let request = ProbeRequest::new(path, [flag.as_str()], config.version_timeout());
        let output = match runner.run(&request) {
            Ok(output) if output.success() => output,
            Ok(_) => continue,
            Err(e) => {
                trace!(path = path, flag = %flag, error = %e, "Version probe failed");
                continue;
            }
        };
        if let Some(version) = extract_version(&output.text) {
            debug!(path = path, flag = %flag, version = %version, "Detected version");
            return Some(version);
        }
    }
    None
}
