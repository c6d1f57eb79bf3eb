//! Quoting helpers for text that ends up inside generated shell code.

/// Longest description emitted into a script, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 200;

/// Escapes text for use inside a double-quoted shell string.
///
/// # Examples
///
/// ```
/// use tabgen_generator::escape_string;
///
/// assert_eq!(escape_string(r#"say "hi" $USER"#), r#"say \"hi\" \$USER"#);
/// assert_eq!(escape_string("a`b`\\c"), "a\\`b\\`\\\\c");
/// ```
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Punctuation that is literal in every unquoted shell context.
const PLAIN_PUNCTUATION: &str = "-_.,=+/@%:";

fn is_plain(c: char) -> bool {
    c.is_ascii_alphanumeric() || PLAIN_PUNCTUATION.contains(c)
}

/// Escapes text for use as an unquoted `case` label.
///
/// Glob characters (`*`, `?`, `[`, `]`, `|`, `)`) are escaped along with
/// every other character that could quote, expand or split the word, so the
/// label only matches the literal text.
///
/// # Examples
///
/// ```
/// use tabgen_generator::escape_pattern;
///
/// assert_eq!(escape_pattern("--color[=WHEN]"), r"--color\[=WHEN\]");
/// assert_eq!(escape_pattern("a|b)"), r"a\|b\)");
/// assert_eq!(escape_pattern("x;$(id)"), r"x\;\$\(id\)");
/// ```
pub fn escape_pattern(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii() && !is_plain(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes text for use inside a single-quoted shell word.
pub fn escape_single_quoted(s: &str) -> String {
    s.replace('\'', r"'\''")
}

/// Wraps text in single quotes; the result is always one literal word.
///
/// # Examples
///
/// ```
/// use tabgen_generator::single_quote;
///
/// assert_eq!(single_quote("$(id)"), "'$(id)'");
/// assert_eq!(single_quote("it's"), r"'it'\''s'");
/// ```
pub fn single_quote(s: &str) -> String {
    format!("'{}'", escape_single_quoted(s))
}

/// Escapes a word that a shell will run through `eval`, as zsh does with
/// `_arguments` choice lists. Colons are escaped too since they separate
/// spec fields.
pub fn escape_eval_word(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c == ':' || (c.is_ascii() && !is_plain(c)) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Shell function name for a tool: `_tabgen_` followed by the name with every
/// non-alphanumeric character replaced by `_`.
///
/// # Examples
///
/// ```
/// use tabgen_generator::func_name;
///
/// assert_eq!(func_name("my-tool"), "_tabgen_my_tool");
/// assert_eq!(func_name("python3.12"), "_tabgen_python3_12");
/// ```
pub fn func_name(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("_tabgen_{sanitized}")
}

/// Name of a helper belonging to the generated function `func`.
///
/// Every [`func_name`] result starts with `_tabgen_`, so the extra leading
/// underscore keeps helpers from colliding with any command function.
///
/// # Examples
///
/// ```
/// use tabgen_generator::{func_name, helper_func_name};
///
/// assert_eq!(helper_func_name(&func_name("cli")), "__tabgen_cli");
/// assert_ne!(helper_func_name(&func_name("cli")), func_name("cli commands"));
/// ```
pub fn helper_func_name(func: &str) -> String {
    format!("_{func}")
}

/// Collapses a description onto one line and caps its length.
pub fn one_line(desc: &str) -> String {
    let collapsed = desc.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= MAX_DESCRIPTION_CHARS {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(MAX_DESCRIPTION_CHARS - 3).collect();
    cut.truncate(cut.trim_end().len());
    cut.push_str("...");
    cut
}
