//! Owned builders for command and flag lists.
//!
//! Extraction passes insert into a builder while they scan text; the builder
//! drops later duplicates (by command name or flag identity) and yields a
//! finished list once the pass is over. Nodes are never shared between
//! builders, so a finished tree has a single owner.

use std::collections::HashSet;

use crate::{Command, Flag};

/// Accumulates flags, discarding later duplicates by [`Flag::identity`].
///
/// # Examples
///
/// ```
/// use tabgen_core::{Flag, FlagListBuilder};
///
/// let mut flags = FlagListBuilder::new();
/// assert!(flags.insert(Flag::new("--verbose").with_description("first")));
/// assert!(!flags.insert(Flag::new("--verbose").with_description("second")));
///
/// let flags = flags.finish();
/// assert_eq!(flags.len(), 1);
/// assert_eq!(flags[0].description.as_deref(), Some("first"));
/// ```
#[derive(Debug, Default)]
pub struct FlagListBuilder {
    seen: HashSet<String>,
    flags: Vec<Flag>,
}

impl FlagListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the builder with an existing list, keeping its order.
    pub fn from_existing(flags: Vec<Flag>) -> Self {
        let mut builder = Self::new();
        for flag in flags {
            builder.insert(flag);
        }
        builder
    }

    /// Appends `flag` unless its identity was already seen.
    ///
    /// Returns `true` if the flag was added.
    pub fn insert(&mut self, flag: Flag) -> bool {
        if !self.seen.insert(flag.identity().to_string()) {
            return false;
        }
        self.flags.push(flag);
        true
    }

    /// Mutable access to the most recently added flag.
    pub fn last_mut(&mut self) -> Option<&mut Flag> {
        self.flags.last_mut()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn finish(self) -> Vec<Flag> {
        self.flags
    }
}

/// Accumulates commands, discarding later duplicates by name.
#[derive(Debug, Default)]
pub struct CommandListBuilder {
    seen: HashSet<String>,
    commands: Vec<Command>,
}

impl CommandListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_existing(commands: Vec<Command>) -> Self {
        let mut builder = Self::new();
        for cmd in commands {
            builder.insert(cmd);
        }
        builder
    }

    /// Appends `cmd` unless a command of the same name was already seen.
    pub fn insert(&mut self, cmd: Command) -> bool {
        if !self.seen.insert(cmd.name.clone()) {
            return false;
        }
        self.commands.push(cmd);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn finish(self) -> Vec<Command> {
        self.commands
    }
}

/// Builds one [`Command`] from its header fields plus collected children.
///
/// # Examples
///
/// ```
/// use tabgen_core::{Command, CommandBuilder, Flag};
///
/// let mut builder = CommandBuilder::from_command(Command::new("remote"));
/// builder.add_subcommand(Command::new("add"));
/// builder.add_subcommand(Command::new("add"));
/// builder.add_flag(Flag::new("--verbose"));
///
/// let remote = builder.build();
/// assert_eq!(remote.subcommands.len(), 1);
/// assert_eq!(remote.flags.len(), 1);
/// ```
#[derive(Debug)]
pub struct CommandBuilder {
    name: String,
    aliases: Vec<String>,
    description: Option<String>,
    subcommands: CommandListBuilder,
    flags: FlagListBuilder,
}

impl CommandBuilder {
    /// Starts from an existing command, keeping its current children.
    pub fn from_command(cmd: Command) -> Self {
        Self {
            name: cmd.name,
            aliases: cmd.aliases,
            description: cmd.description,
            subcommands: CommandListBuilder::from_existing(cmd.subcommands),
            flags: FlagListBuilder::from_existing(cmd.flags),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_subcommand(&mut self, cmd: Command) -> bool {
        self.subcommands.insert(cmd)
    }

    pub fn add_flag(&mut self, flag: Flag) -> bool {
        self.flags.insert(flag)
    }

    /// Replaces the collected subcommands with an already-finished list.
    pub fn set_subcommands(&mut self, subcommands: Vec<Command>) {
        self.subcommands = CommandListBuilder::from_existing(subcommands);
    }

    /// Takes the subcommands collected so far, leaving the builder empty.
    pub fn take_subcommands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.subcommands).finish()
    }

    pub fn build(self) -> Command {
        Command {
            name: self.name,
            aliases: self.aliases,
            description: self.description,
            subcommands: self.subcommands.finish(),
            flags: self.flags.finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_list_first_wins() {
        let mut commands = CommandListBuilder::new();
        commands.insert(Command::new("build").with_description("Build it"));
        commands.insert(Command::new("test"));
        commands.insert(Command::new("build").with_description("Again"));

        let commands = commands.finish();
        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].description.as_deref(), Some("Build it"));
    }

    #[test]
    fn test_from_existing_drops_duplicates() {
        let builder =
            FlagListBuilder::from_existing(vec![Flag::new("-v"), Flag::new("-v"), Flag::new("-q")]);
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_last_mut_targets_latest_insert() {
        let mut flags = FlagListBuilder::new();
        flags.insert(Flag::new("--a"));
        flags.insert(Flag::new("--b"));
        flags.insert(Flag::new("--a"));

        assert_eq!(flags.last_mut().map(|f| f.name.clone()), Some("--b".to_string()));
    }

    #[test]
    fn test_command_builder_keeps_header_fields() {
        let cmd = Command::new("build")
            .with_alias("b")
            .with_description("Compile")
            .with_flag(Flag::new("--release"));

        let mut builder = CommandBuilder::from_command(cmd);
        assert!(!builder.add_flag(Flag::new("--release")));
        assert!(builder.add_flag(Flag::new("--target")));
        let cmd = builder.build();

        assert_eq!(cmd.aliases, vec!["b"]);
        assert_eq!(cmd.description.as_deref(), Some("Compile"));
        assert_eq!(cmd.flags.len(), 2);
    }
}
