//! Depth-limited subcommand exploration.
//!
//! The tool itself is depth 0 and its top-level commands are probed at
//! depth 1. A command at depth `d` is probed only while `d < max_depth`, so the
//! default of 2 probes top-level commands and records (but never probes) the
//! children they list.

use tabgen_core::{Command, CommandBuilder};
use tracing::{debug, trace};

use crate::config::ExtractConfig;
use crate::parser::{parse_help_text, snippet};
use crate::probe::{ProbeRequest, ProbeRunner};

/// Commands whose help never describes a real subtree.
const SKIPPED_SUBCOMMANDS: &[&str] = &["help", "version", "completion", "completions"];

pub fn should_skip_subcommand(name: &str) -> bool {
    SKIPPED_SUBCOMMANDS.contains(&name)
}

/// Re-probes help for each discovered command and fills in its children.
///
/// # Examples
///
/// ```
/// use tabgen_core::Command;
/// use tabgen_discovery::{ExtractConfig, Explorer, ScriptedRunner};
///
/// let runner = ScriptedRunner::new().with_text(
///     "/bin/tool remote --help",
///     "Commands:\n  add   Add a remote\n\nOptions:\n  -v, --verbose   Be loud\n",
/// );
/// let config = ExtractConfig::default();
/// let explorer = Explorer::new(&runner, &config, "/bin/tool");
///
/// let commands = explorer.explore(vec![Command::new("remote")]);
/// assert_eq!(commands[0].subcommands[0].name, "add");
/// assert_eq!(commands[0].flags[0].name, "--verbose");
/// ```
pub struct Explorer<'a> {
    runner: &'a dyn ProbeRunner,
    config: &'a ExtractConfig,
    path: &'a str,
}

impl<'a> Explorer<'a> {
    pub fn new(runner: &'a dyn ProbeRunner, config: &'a ExtractConfig, path: &'a str) -> Self {
        Self {
            runner,
            config,
            path,
        }
    }

    /// Explores a finished top-level command list and returns the expanded one.
    pub fn explore(&self, commands: Vec<Command>) -> Vec<Command> {
        self.explore_level(&[], commands, 1)
    }

    fn explore_level(&self, parents: &[&str], commands: Vec<Command>, depth: usize) -> Vec<Command> {
        if depth >= self.config.max_depth {
            return commands;
        }
        commands
            .into_iter()
            .map(|cmd| self.explore_command(parents, cmd, depth))
            .collect()
    }

    fn explore_command(&self, parents: &[&str], cmd: Command, depth: usize) -> Command {
        if should_skip_subcommand(&cmd.name) {
            return cmd;
        }

        let output = self.probe_help(parents, &cmd.name);
        if output.trim().is_empty() {
            trace!(command = %cmd.name, depth = depth, "No subcommand help");
            return cmd;
        }

        let sections = parse_help_text(&output);
        let mut builder = CommandBuilder::from_command(cmd);
        for flag in sections.flags {
            builder.add_flag(flag);
        }
        for sub in sections.subcommands {
            if sub.name == builder.name() {
                debug!(command = %builder.name(), "Skipping self-referencing nested command");
                continue;
            }
            builder.add_subcommand(sub);
        }

        let name = builder.name().to_string();
        let mut path: Vec<&str> = parents.to_vec();
        path.push(&name);
        let children = builder.take_subcommands();
        let children = self.explore_level(&path, children, depth + 1);
        builder.set_subcommands(children);
        builder.build()
    }

    /// Runs `<tool> <parents..> <name> --help`, falling back to
    /// `<tool> <parents..> help <name>` when the first probe prints nothing.
    fn probe_help(&self, parents: &[&str], name: &str) -> String {
        let timeout = self.config.help_timeout();
        let base = || parents.iter().map(|p| p.to_string());

        let request = ProbeRequest::new(
            self.path,
            base().chain([name.to_string(), "--help".to_string()]),
            timeout,
        );
        debug!(command = %request.command_line(), "Probing subcommand help");
        let first = match self.runner.run(&request) {
            Ok(output) if output.timed_out => return String::new(),
            Ok(output) => output.text,
            Err(e) => {
                debug!(command = %request.command_line(), error = %e, "Subcommand probe failed");
                String::new()
            }
        };
        if !first.trim().is_empty() {
            trace!(command = %request.command_line(), help = %snippet(&first, 20), "Subcommand help");
            return first;
        }

        let request = ProbeRequest::new(
            self.path,
            base().chain(["help".to_string(), name.to_string()]),
            timeout,
        );
        debug!(command = %request.command_line(), "Probing help subcommand");
        match self.runner.run(&request) {
            Ok(output) if !output.timed_out => output.text,
            Ok(_) => String::new(),
            Err(e) => {
                debug!(command = %request.command_line(), error = %e, "Subcommand probe failed");
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{ProbeOutput, ScriptedRunner};

    fn config(max_depth: usize) -> ExtractConfig {
        ExtractConfig {
            max_depth,
            ..ExtractConfig::default()
        }
    }

    fn nested_runner() -> ScriptedRunner {
        ScriptedRunner::new()
            .with_text("/bin/git remote --help", "Commands:\n  add   Add a remote\n  remove   Remove\n")
            .with_text("/bin/git remote add --help", "Options:\n  -f, --fetch   Fetch after adding\n\nCommands:\n  deep   Too deep\n")
            .with_text("/bin/git remote add deep --help", "Options:\n  --deeper   x\n")
    }

    #[test]
    fn test_default_depth_probes_only_top_level() {
        let runner = nested_runner();
        let config = config(2);
        let explorer = Explorer::new(&runner, &config, "/bin/git");

        let commands = explorer.explore(vec![Command::new("remote")]);
        let remote = &commands[0];
        assert_eq!(remote.subcommands.len(), 2);
        assert!(remote.subcommands[0].flags.is_empty());
        assert!(runner.calls().iter().all(|call| call.split(' ').count() <= 3));
    }

    #[test]
    fn test_deeper_limit_probes_one_more_level() {
        let runner = nested_runner();
        let config = config(3);
        let explorer = Explorer::new(&runner, &config, "/bin/git");

        let commands = explorer.explore(vec![Command::new("remote")]);
        let add = commands[0].find_subcommand("add").unwrap();
        assert_eq!(add.flags[0].name, "--fetch");
        assert_eq!(add.subcommands[0].name, "deep");
        assert!(add.subcommands[0].flags.is_empty());
        assert!(!runner.calls().contains(&"/bin/git remote add deep --help".to_string()));
    }

    #[test]
    fn test_falls_back_to_help_subcommand() {
        let runner = ScriptedRunner::new().with_text("/bin/tool help build", "Options:\n  --release   Optimized\n");
        let config = config(2);
        let explorer = Explorer::new(&runner, &config, "/bin/tool");

        let commands = explorer.explore(vec![Command::new("build")]);
        assert_eq!(commands[0].flags[0].name, "--release");
        assert_eq!(runner.calls(), vec!["/bin/tool build --help", "/bin/tool help build"]);
    }

    #[test]
    fn test_timeout_stops_branch_without_retry() {
        let runner = ScriptedRunner::new().with_output("/bin/tool build --help", ProbeOutput::timed_out());
        let config = config(2);
        let explorer = Explorer::new(&runner, &config, "/bin/tool");

        let commands = explorer.explore(vec![Command::new("build").with_description("Build it")]);
        assert_eq!(commands[0], Command::new("build").with_description("Build it"));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_skips_help_like_commands_and_self_cycles() {
        let runner = ScriptedRunner::new()
            .with_text("/bin/tool run --help", "Commands:\n  run   Same command again\n  fast   Quick\n");
        let config = config(3);
        let explorer = Explorer::new(&runner, &config, "/bin/tool");

        let commands = explorer.explore(vec![Command::new("help"), Command::new("run")]);
        assert!(commands[0].subcommands.is_empty());
        assert_eq!(commands[1].subcommands.len(), 1);
        assert_eq!(commands[1].subcommands[0].name, "fast");
        assert!(!runner.calls().iter().any(|call| call.contains("help --help")));
    }

    #[test]
    fn test_keeps_description_from_parent_listing() {
        let runner = ScriptedRunner::new().with_text("/bin/tool run --help", "Options:\n  --watch   Rerun\n");
        let config = config(2);
        let explorer = Explorer::new(&runner, &config, "/bin/tool");

        let commands = explorer.explore(vec![Command::new("run").with_alias("r").with_description("Run it")]);
        assert_eq!(commands[0].description.as_deref(), Some("Run it"));
        assert_eq!(commands[0].aliases, vec!["r"]);
        assert_eq!(commands[0].flags.len(), 1);
    }
}
