//! Line classification rules.
//!
//! Help output is classified one line at a time against an ordered list of
//! named [`LineRule`]s. Header and blank rules stop evaluation; the remaining
//! rules all run, so a flag line inside a "Commands:" block is still picked up
//! by the inline flag rule.

use tabgen_core::{Command, Flag};

use super::util::{is_valid_command_name, split_description};

/// Section the parser is currently inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SectionMode {
    #[default]
    None,
    Commands,
    Options,
}

/// What a rule recognized on a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    CommandsHeader,
    OptionsHeader,
    Blank,
    Flag(Flag),
    Command(Command),
}

/// A rule match: the rule's name and what it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub rule: &'static str,
    pub class: LineClass,
}

/// Per-line input shared by every rule.
#[derive(Debug)]
pub struct LineContext<'a> {
    pub raw: &'a str,
    pub trimmed: &'a str,
    pub lower: String,
    pub mode: SectionMode,
}

impl<'a> LineContext<'a> {
    pub fn new(raw: &'a str, mode: SectionMode) -> Self {
        let trimmed = raw.trim();
        Self {
            raw,
            trimmed,
            lower: trimmed.to_lowercase(),
            mode,
        }
    }

    fn is_indented(&self) -> bool {
        self.raw.len() > 3 && (self.raw.starts_with(' ') || self.raw.starts_with('\t'))
    }
}

/// A named classification rule.
pub struct LineRule {
    pub name: &'static str,
    /// Stop evaluating later rules when this one matches.
    pub terminal: bool,
    applies: fn(&LineContext<'_>) -> bool,
    parse: fn(&LineContext<'_>) -> Option<LineClass>,
}

const COMMAND_HEADER_PREFIXES: &[&str] = &["commands:", "available commands:", "subcommands:"];
const OPTION_HEADER_PREFIXES: &[&str] = &["options:", "flags:", "global options:", "global flags:"];

/// Help-text rules in evaluation order.
pub static HELP_RULES: &[LineRule] = &[
    LineRule {
        name: "commands-header",
        terminal: true,
        applies: |_| true,
        parse: |ctx| is_commands_header(&ctx.lower).then_some(LineClass::CommandsHeader),
    },
    LineRule {
        name: "options-header",
        terminal: true,
        applies: |_| true,
        parse: |ctx| is_options_header(&ctx.lower).then_some(LineClass::OptionsHeader),
    },
    LineRule {
        name: "blank",
        terminal: true,
        applies: |ctx| ctx.trimmed.is_empty(),
        parse: |_| Some(LineClass::Blank),
    },
    LineRule {
        name: "section-command",
        terminal: false,
        applies: |ctx| ctx.mode == SectionMode::Commands,
        parse: |ctx| parse_command_line(ctx.raw).map(LineClass::Command),
    },
    LineRule {
        name: "section-flag",
        terminal: false,
        applies: |ctx| ctx.mode == SectionMode::Options,
        parse: |ctx| parse_flag_line(ctx.raw).map(LineClass::Flag),
    },
    LineRule {
        name: "inline-flag",
        terminal: false,
        applies: |ctx| ctx.mode != SectionMode::Options && ctx.trimmed.starts_with('-'),
        parse: |ctx| parse_flag_line(ctx.raw).map(LineClass::Flag),
    },
    LineRule {
        name: "indented-command",
        terminal: false,
        applies: |ctx| ctx.mode == SectionMode::None && ctx.is_indented(),
        parse: |ctx| parse_indented_command(ctx.raw).map(LineClass::Command),
    },
];

/// Runs [`HELP_RULES`] against one line.
///
/// An empty result means the line is noise.
///
/// # Examples
///
/// ```
/// use tabgen_discovery::parser::{LineClass, SectionMode, classify_line};
///
/// let hits = classify_line("Available Commands:", SectionMode::None);
/// assert_eq!(hits[0].class, LineClass::CommandsHeader);
///
/// let hits = classify_line("  build   Build it", SectionMode::Commands);
/// assert_eq!(hits[0].rule, "section-command");
///
/// assert!(classify_line("Usage: tool [OPTIONS]", SectionMode::None).is_empty());
/// ```
pub fn classify_line(line: &str, mode: SectionMode) -> Vec<Classification> {
    let ctx = LineContext::new(line, mode);
    let mut hits = Vec::new();
    for rule in HELP_RULES {
        if !(rule.applies)(&ctx) {
            continue;
        }
        if let Some(class) = (rule.parse)(&ctx) {
            hits.push(Classification {
                rule: rule.name,
                class,
            });
            if rule.terminal {
                break;
            }
        }
    }
    hits
}

pub fn is_commands_header(lower: &str) -> bool {
    COMMAND_HEADER_PREFIXES.iter().any(|p| lower.starts_with(p)) || lower == "commands"
}

pub fn is_options_header(lower: &str) -> bool {
    OPTION_HEADER_PREFIXES.iter().any(|p| lower.starts_with(p)) || lower == "options" || lower == "flags"
}

/// Parses a flag definition line.
///
/// Handles `-f, --flag`, `--flag=VALUE`, `--flag <value>`, short-only flags,
/// and choice lists written as `a|b`, `[a|b]`, `<a|b>`, `{a,b}` or `(a|b)`.
/// When choices are found the argument placeholder becomes `value`.
///
/// # Examples
///
/// ```
/// use tabgen_discovery::parser::parse_flag_line;
///
/// let flag = parse_flag_line("  --format=json|yaml   Output format").unwrap();
/// assert_eq!(flag.name, "--format");
/// assert_eq!(flag.arg.as_deref(), Some("value"));
/// assert_eq!(flag.argument_values, vec!["json", "yaml"]);
///
/// let flag = parse_flag_line("  -h            Show help").unwrap();
/// assert_eq!(flag.name, "-h");
/// assert_eq!(flag.short, None);
/// ```
pub fn parse_flag_line(line: &str) -> Option<Flag> {
    let trimmed = line.trim();
    if !trimmed.starts_with('-') {
        return None;
    }

    let (flag_part, description) = split_description(trimmed);
    let mut long: Option<String> = None;
    let mut short: Option<String> = None;
    let mut placeholder: Option<Placeholder> = None;

    for token in flag_part.split_whitespace() {
        let token = token.strip_suffix(',').unwrap_or(token);

        if token.starts_with("--") {
            let (name, value) = match token.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (token, None),
            };
            let name = name.trim_end_matches('[');
            if name.len() <= 2 {
                continue;
            }
            long = Some(name.to_string());
            if let Some(value) = value {
                placeholder = parse_placeholder(value, true);
            }
        } else if token.starts_with('-') && token.len() == 2 {
            short = Some(token.to_string());
        } else if let Some(parsed) = parse_placeholder(token, false) {
            placeholder = Some(parsed);
        }
    }

    let (name, short) = match (long, short) {
        (Some(long), short) => (long, short),
        (None, Some(short)) => (short, None),
        (None, None) => return None,
    };

    let mut flag = Flag {
        name,
        short,
        description,
        ..Flag::default()
    };
    if let Some(placeholder) = placeholder {
        flag.arg = Some(placeholder.arg);
        flag.argument_values = placeholder.choices;
    }
    Some(flag)
}

#[derive(Debug, PartialEq, Eq)]
struct Placeholder {
    arg: String,
    choices: Vec<String>,
}

/// Reads an argument placeholder token.
///
/// `inline` is set for the text after `=`, which is a placeholder even
/// without enclosing brackets.
fn parse_placeholder(token: &str, inline: bool) -> Option<Placeholder> {
    let (open, inner) = match token.chars().next() {
        Some(open @ ('<' | '[' | '{' | '(')) => {
            let inner = token[1..].trim_end_matches(['>', ']', '}', ')']);
            (Some(open), inner)
        }
        _ if inline => (None, token),
        _ => return None,
    };

    let separators: &[char] = match open {
        Some('{') | Some('(') => &['|', ','],
        _ => &['|'],
    };
    if inner.contains(separators) {
        let choices: Vec<String> = inner
            .split(separators)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        if choices.len() >= 2 {
            return Some(Placeholder {
                arg: "value".to_string(),
                choices,
            });
        }
    }

    match open {
        // Parenthesized or braced text without choices is prose, not an argument.
        Some('{') | Some('(') => None,
        _ => {
            let arg = inner.trim_matches(['<', '>', '[', ']']);
            (!arg.is_empty()).then(|| Placeholder {
                arg: arg.to_string(),
                choices: Vec::new(),
            })
        }
    }
}

/// Parses a line inside a "Commands:" section.
///
/// The name part may list several comma-separated names; the longest valid
/// one is the command name (first listed wins a tie) and the rest become
/// aliases in listed order.
///
/// # Examples
///
/// ```
/// use tabgen_discovery::parser::parse_command_line;
///
/// let cmd = parse_command_line("  b, build   Build it").unwrap();
/// assert_eq!(cmd.name, "build");
/// assert_eq!(cmd.aliases, vec!["b"]);
/// assert_eq!(cmd.description.as_deref(), Some("Build it"));
/// ```
pub fn parse_command_line(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') {
        return None;
    }

    let (name_part, description) = split_description(trimmed);
    let mut names = name_part.split(',').map(str::trim);
    let first = names.next()?;
    if !is_valid_command_name(first) {
        return None;
    }

    let mut all: Vec<&str> = vec![first];
    all.extend(names.filter(|n| is_valid_command_name(n)));

    let mut primary = 0;
    for (i, name) in all.iter().enumerate() {
        if name.len() > all[primary].len() {
            primary = i;
        }
    }

    let name = all[primary];
    let aliases = all
        .iter()
        .enumerate()
        .filter(|&(i, alias)| i != primary && *alias != name)
        .map(|(_, alias)| alias.to_string())
        .collect();

    Some(Command {
        name: name.to_string(),
        aliases,
        description,
        ..Command::default()
    })
}

/// Parses a git-style indented command outside any recognized section.
///
/// Requires a valid name and a non-empty description after the separator.
pub fn parse_indented_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('-') || trimmed.starts_with('(') {
        return None;
    }

    let (name, description) = split_description(trimmed);
    let description = description?;
    if !is_valid_command_name(name) {
        return None;
    }

    Some(Command::new(name).with_description(&description))
}
