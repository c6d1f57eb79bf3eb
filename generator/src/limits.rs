//! Size and complexity guards applied around script generation.

use std::borrow::Cow;

use tabgen_core::{Command, Tool};

/// Largest script written, in bytes.
pub const MAX_OUTPUT_SIZE: usize = 1024 * 1024;
/// Most top-level subcommands kept.
pub const MAX_SUBCOMMANDS: usize = 500;
/// Most flags kept in any single flag list.
pub const MAX_FLAGS: usize = 200;
/// Most subcommands plus flags, counted through the whole tree.
pub const MAX_TOTAL_ITEMS: usize = 2000;

/// Appended to a script cut by [`cap_output`].
pub const TRUNCATION_MARKER: &str = "\n# WARNING: Script truncated due to size limits\n";

/// Caps applied by [`crate::generate_with_limits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_output_size: usize,
    pub max_subcommands: usize,
    pub max_flags: usize,
    pub max_total_items: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_output_size: MAX_OUTPUT_SIZE,
            max_subcommands: MAX_SUBCOMMANDS,
            max_flags: MAX_FLAGS,
            max_total_items: MAX_TOTAL_ITEMS,
        }
    }
}

/// Truncates oversized lists, returning the tool to generate from and one
/// warning per cut.
///
/// A tool within every limit is borrowed unchanged. Flag lists are cut at
/// every level; only the top-level command list is cut. When the recursive
/// total still exceeds `max_total_items` after that, a warning records it
/// and nothing further is removed.
///
/// # Examples
///
/// ```
/// use std::borrow::Cow;
/// use tabgen_core::{Command, Tool};
/// use tabgen_generator::{Limits, truncate_tool};
///
/// let mut tool = Tool::new("big", "/bin/big");
/// tool.subcommands = (0..4).map(|i| Command::new(&format!("c{i}"))).collect();
///
/// let limits = Limits { max_subcommands: 3, ..Limits::default() };
/// let (guarded, warnings) = truncate_tool(&tool, &limits);
/// assert_eq!(guarded.subcommands.len(), 3);
/// assert_eq!(warnings, vec!["truncated subcommands from 4 to 3"]);
///
/// let (guarded, warnings) = truncate_tool(&tool, &Limits::default());
/// assert!(matches!(guarded, Cow::Borrowed(_)));
/// assert!(warnings.is_empty());
/// ```
pub fn truncate_tool<'a>(tool: &'a Tool, limits: &Limits) -> (Cow<'a, Tool>, Vec<String>) {
    let (subs, flags) = tool.count_items();
    let needs_cut = subs > limits.max_subcommands
        || tool.global_flags.len() > limits.max_flags
        || subs + flags > limits.max_total_items
        || tool.subcommands.iter().any(|cmd| has_long_flag_list(cmd, limits.max_flags));
    if !needs_cut {
        return (Cow::Borrowed(tool), Vec::new());
    }

    let mut warnings = Vec::new();
    let mut cut = tool.clone();

    if cut.global_flags.len() > limits.max_flags {
        warnings.push(format!(
            "truncated global flags from {} to {}",
            cut.global_flags.len(),
            limits.max_flags
        ));
        cut.global_flags.truncate(limits.max_flags);
    }

    if cut.subcommands.len() > limits.max_subcommands {
        warnings.push(format!(
            "truncated subcommands from {} to {}",
            cut.subcommands.len(),
            limits.max_subcommands
        ));
        cut.subcommands.truncate(limits.max_subcommands);
    }

    truncate_command_flags(&mut cut.subcommands, limits.max_flags, &mut warnings);

    let (subs, flags) = cut.count_items();
    if subs + flags > limits.max_total_items {
        warnings.push(format!(
            "tool still has {} items after truncation (max {})",
            subs + flags,
            limits.max_total_items
        ));
    }

    (Cow::Owned(cut), warnings)
}

fn has_long_flag_list(cmd: &Command, max_flags: usize) -> bool {
    cmd.flags.len() > max_flags
        || cmd
            .subcommands
            .iter()
            .any(|sub| has_long_flag_list(sub, max_flags))
}

fn truncate_command_flags(commands: &mut [Command], max_flags: usize, warnings: &mut Vec<String>) {
    for cmd in commands {
        if cmd.flags.len() > max_flags {
            warnings.push(format!(
                "truncated flags for '{}' from {} to {}",
                cmd.name,
                cmd.flags.len(),
                max_flags
            ));
            cmd.flags.truncate(max_flags);
        }
        truncate_command_flags(&mut cmd.subcommands, max_flags, warnings);
    }
}

/// Cuts a script that exceeds `max_bytes`.
///
/// The cut ends on the last line break when one exists in the second half of
/// the kept text, never splits a UTF-8 character, and is followed by
/// [`TRUNCATION_MARKER`].
///
/// # Examples
///
/// ```
/// use tabgen_generator::{TRUNCATION_MARKER, cap_output};
///
/// let script = "line one\nline two\nline three\n".to_string();
/// let (capped, warning) = cap_output(script, "tool", 20);
/// assert_eq!(capped, format!("line one\nline two\n{TRUNCATION_MARKER}"));
/// assert!(warning.unwrap().contains("exceeds 20 bytes"));
/// ```
pub fn cap_output(script: String, tool_name: &str, max_bytes: usize) -> (String, Option<String>) {
    if script.len() <= max_bytes {
        return (script, None);
    }

    let warning = format!(
        "generated script for '{}' exceeds {} bytes ({} bytes), truncating",
        tool_name,
        max_bytes,
        script.len()
    );

    let mut end = max_bytes;
    while !script.is_char_boundary(end) {
        end -= 1;
    }
    let mut cut = &script[..end];
    if let Some(newline) = cut.rfind('\n') {
        if newline >= max_bytes / 2 {
            cut = &cut[..=newline];
        }
    }

    let mut capped = String::with_capacity(cut.len() + TRUNCATION_MARKER.len());
    capped.push_str(cut);
    capped.push_str(TRUNCATION_MARKER);
    (capped, Some(warning))
}
