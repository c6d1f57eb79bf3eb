//! Tool model definitions.
//!
//! A [`Tool`] is the result of one extraction pass over a command's help and
//! man output. It owns an ordered tree of [`Command`]s and a list of global
//! [`Flag`]s. The types serialize with [`serde`] using the field names of the
//! on-disk tool files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where a tool's structure was read from.
///
/// # Examples
///
/// ```
/// use tabgen_core::SourceTag;
///
/// assert_eq!(SourceTag::default(), SourceTag::None);
/// assert_eq!(serde_json::to_string(&SourceTag::HelpOnly).unwrap(), "\"help-only\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SourceTag {
    /// Neither help nor man output was obtained.
    #[default]
    None,
    /// Parsed from `--help` (or `-h`) output only.
    Help,
    /// Parsed from the man page only.
    Man,
    /// Both help output and man page contributed.
    Both,
    /// Help output was parsed; the man probe was denied by the OS.
    HelpOnly,
}

impl SourceTag {
    /// Returns the tag as written in tool files and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceTag::None => "none",
            SourceTag::Help => "help",
            SourceTag::Man => "man",
            SourceTag::Both => "both",
            SourceTag::HelpOnly => "help-only",
        }
    }

    /// True when help output was parsed.
    pub fn includes_help(self) -> bool {
        matches!(self, SourceTag::Help | SourceTag::Both | SourceTag::HelpOnly)
    }

    pub fn includes_man(self) -> bool {
        matches!(self, SourceTag::Man | SourceTag::Both)
    }
}

impl std::fmt::Display for SourceTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A command-line flag.
///
/// `name` holds the long form (e.g. `--output`). A flag that only has a
/// short form stores it in `name` and leaves `short` empty, so `name` is
/// always the identity key.
///
/// # Examples
///
/// ```
/// use tabgen_core::Flag;
///
/// let flag = Flag::new("--format")
///     .with_short("-f")
///     .with_choices("value", ["json", "yaml"]);
/// assert_eq!(flag.identity(), "--format");
/// assert_eq!(flag.names().collect::<Vec<_>>(), vec!["--format", "-f"]);
/// assert!(flag.has_choices());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Flag {
    /// Long form, or the short form when no long form exists.
    pub name: String,
    /// Short form (e.g. `-o`) when both forms exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,
    /// Argument placeholder name (e.g. `file`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    /// Allowed argument values, in the order they were listed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub argument_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,
}

impl Flag {
    /// Creates a flag with the given identity name and nothing else.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_short(mut self, short: &str) -> Self {
        self.short = Some(short.to_string());
        self
    }

    pub fn with_arg(mut self, arg: &str) -> Self {
        self.arg = Some(arg.to_string());
        self
    }

    /// Sets the argument placeholder and its allowed values.
    pub fn with_choices<I, S>(mut self, arg: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arg = Some(arg.to_string());
        self.argument_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Identity key used for duplicate suppression.
    pub fn identity(&self) -> &str {
        &self.name
    }

    /// All spellings of this flag: long (identity) first, then short.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.short.as_deref())
    }

    /// Returns `true` if `s` is one of this flag's spellings.
    pub fn matches(&self, s: &str) -> bool {
        self.names().any(|name| name == s)
    }

    pub fn has_choices(&self) -> bool {
        !self.argument_values.is_empty()
    }
}

/// A command or subcommand with its own nested commands and flags.
///
/// # Examples
///
/// ```
/// use tabgen_core::{Command, Flag};
///
/// let remote = Command::new("remote")
///     .with_alias("rm")
///     .with_subcommand(Command::new("add"))
///     .with_flag(Flag::new("--verbose"));
/// assert!(remote.matches("rm"));
/// assert!(remote.find_subcommand("add").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Command {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<Command>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<Flag>,
}

impl Command {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_subcommand(mut self, sub: Command) -> Self {
        self.subcommands.push(sub);
        self
    }

    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.push(flag);
        self
    }

    /// The name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Returns `true` if `s` is the command name or one of its aliases.
    pub fn matches(&self, s: &str) -> bool {
        self.names().any(|name| name == s)
    }

    /// Finds a direct child by name or alias.
    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.iter().find(|sub| sub.matches(name))
    }

    /// Counts this command's descendants and flags at every level.
    ///
    /// Returns `(subcommands, flags)`; the command itself is not counted.
    pub fn count_items(&self) -> (usize, usize) {
        count_items(&self.subcommands, &self.flags)
    }
}

/// A parsed CLI tool.
///
/// # Examples
///
/// ```
/// use tabgen_core::{Command, Flag, SourceTag, Tool};
///
/// let mut tool = Tool::new("git", "/usr/bin/git");
/// tool.source = SourceTag::Help;
/// tool.subcommands.push(Command::new("commit"));
/// tool.global_flags.push(Flag::new("--version"));
///
/// assert!(tool.has_content());
/// assert!(tool.find_subcommand("commit").is_some());
/// assert!(tool.find_global_flag("--version").is_some());
/// assert_eq!(tool.count_items(), (1, 1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    /// Binary name.
    pub name: String,
    /// Full path to the binary.
    pub path: String,
    /// Detected version, if any probe reported one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub parsed_at: DateTime<Utc>,
    #[serde(default)]
    pub source: SourceTag,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<Command>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub global_flags: Vec<Flag>,
}

impl Tool {
    /// Creates an empty tool stamped with the current time.
    pub fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            version: None,
            parsed_at: Utc::now(),
            source: SourceTag::None,
            subcommands: Vec::new(),
            global_flags: Vec::new(),
        }
    }

    /// Returns the detected version or `""`.
    pub fn version_str(&self) -> &str {
        self.version.as_deref().unwrap_or("")
    }

    /// Returns `true` if any help or man output was obtained.
    pub fn has_content(&self) -> bool {
        self.source != SourceTag::None
    }

    pub fn find_subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.iter().find(|sub| sub.matches(name))
    }

    pub fn find_global_flag(&self, flag: &str) -> Option<&Flag> {
        self.global_flags.iter().find(|f| f.matches(flag))
    }

    /// Recursive `(subcommands, flags)` totals for the whole tree.
    pub fn count_items(&self) -> (usize, usize) {
        count_items(&self.subcommands, &self.global_flags)
    }
}

fn count_items(commands: &[Command], flags: &[Flag]) -> (usize, usize) {
    commands
        .iter()
        .fold((commands.len(), flags.len()), |(subs, flags), cmd| {
            let (nested_subs, nested_flags) = cmd.count_items();
            (subs + nested_subs, flags + nested_flags)
        })
}
