//! Shared helpers for line parsing and man page text.

/// Splits a trimmed line at the first run of two spaces into the name part
/// and an optional (trimmed, non-empty) description.
pub fn split_description(trimmed: &str) -> (&str, Option<String>) {
    match trimmed.split_once("  ") {
        Some((head, rest)) => {
            let rest = rest.trim();
            (head.trim(), (!rest.is_empty()).then(|| rest.to_string()))
        }
        None => (trimmed, None),
    }
}

/// Returns `true` for 1–30 characters of ASCII letters, digits, `-` or `_`.
pub fn is_valid_command_name(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 30
        && s
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))
}

const MAN_SECTION_HEADERS: &[&str] = &[
    "NAME",
    "SYNOPSIS",
    "DESCRIPTION",
    "OPTIONS",
    "ARGUMENTS",
    "COMMANDS",
    "EXIT STATUS",
    "ENVIRONMENT",
    "FILES",
    "EXAMPLES",
    "SEE ALSO",
    "BUGS",
    "AUTHOR",
    "AUTHORS",
    "HISTORY",
    "NOTES",
    "CAVEATS",
    "DIAGNOSTICS",
];

/// Returns `true` if `trimmed` is a known man page section header, either
/// exactly or followed by a space.
pub fn is_man_section_header(trimmed: &str) -> bool {
    MAN_SECTION_HEADERS.iter().any(|header| {
        trimmed == *header
            || trimmed
                .strip_prefix(header)
                .is_some_and(|rest| rest.starts_with(' '))
    })
}

/// Removes terminal overstrike sequences (`X\bX` bold, `_\bX` underline)
/// left by man when its output is not a tty.
pub fn strip_overstrike(text: &str) -> String {
    if !text.contains('\u{8}') {
        return text.to_string();
    }
    let mut out: Vec<char> = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if ch == '\u{8}' {
            out.pop();
        } else {
            out.push(ch);
        }
    }
    out.into_iter().collect()
}

/// First `max_lines` lines of `text`, with a trailer counting the rest.
pub fn snippet(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= max_lines {
        return lines.join("\n");
    }
    format!(
        "{}\n... ({} more lines)",
        lines[..max_lines].join("\n"),
        lines.len() - max_lines
    )
}
