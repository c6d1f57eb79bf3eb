//! Shell completion script generation.
//!
//! A [`CompletionGenerator`] turns a finished [`Tool`] tree into script text
//! for one [`Shell`]. [`generate_with_limits`] wraps generation in the size
//! guards from [`limits`]: oversized lists are truncated first, and the
//! finished script is capped in bytes.
//!
//! # Example
//!
//! ```
//! use tabgen_core::{Command, Flag, Tool};
//! use tabgen_generator::{Limits, Shell, generate_with_limits};
//!
//! let mut tool = Tool::new("mycli", "/usr/local/bin/mycli");
//! tool.global_flags.push(Flag::new("--format").with_choices("value", ["json", "yaml"]));
//! tool.subcommands.push(Command::new("build").with_description("Build it"));
//!
//! let bash = generate_with_limits(&tool, Shell::Bash, &Limits::default());
//! assert!(bash.script.contains("complete -o default -o bashdefault -F _tabgen_mycli"));
//! assert!(bash.warnings.is_empty());
//!
//! let zsh = generate_with_limits(&tool, Shell::Zsh, &Limits::default());
//! assert!(zsh.script.starts_with("#compdef mycli\n"));
//! ```

mod bash;
mod escape;
pub mod limits;
mod zsh;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tabgen_core::{Command, Tool};
use thiserror::Error;
use tracing::debug;

pub use bash::BashGenerator;
pub use escape::{
    MAX_DESCRIPTION_CHARS, escape_eval_word, escape_pattern, escape_single_quoted, escape_string,
    func_name, helper_func_name, one_line, single_quote,
};
pub use limits::{Limits, TRUNCATION_MARKER, cap_output, truncate_tool};
pub use zsh::ZshGenerator;

/// Target shell of a completion script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shell {
    Bash,
    Zsh,
}

impl Shell {
    pub const ALL: [Shell; 2] = [Shell::Bash, Shell::Zsh];

    pub fn as_str(self) -> &'static str {
        match self {
            Shell::Bash => "bash",
            Shell::Zsh => "zsh",
        }
    }

    /// File name of a tool's script for this shell: `git` for bash,
    /// `_git` for zsh.
    pub fn script_file_name(self, tool: &str) -> String {
        match self {
            Shell::Bash => tool.to_string(),
            Shell::Zsh => format!("_{tool}"),
        }
    }

    pub fn generator(self) -> &'static dyn CompletionGenerator {
        match self {
            Shell::Bash => &BashGenerator,
            Shell::Zsh => &ZshGenerator,
        }
    }
}

impl fmt::Display for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unsupported shell '{0}' (expected bash or zsh)")]
pub struct UnknownShell(pub String);

impl FromStr for Shell {
    type Err = UnknownShell;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bash" => Ok(Shell::Bash),
            "zsh" => Ok(Shell::Zsh),
            _ => Err(UnknownShell(s.to_string())),
        }
    }
}

/// Renders a tool tree as a completion script for one shell.
pub trait CompletionGenerator: Send + Sync {
    fn shell(&self) -> Shell;

    /// Renders the whole tree with no size guards.
    fn generate(&self, tool: &Tool) -> String;
}

/// A generated script and the truncation warnings collected on the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateResult {
    pub script: String,
    pub warnings: Vec<String>,
}

/// Truncates oversized lists, generates the script, then caps its size.
pub fn generate_with_limits(tool: &Tool, shell: Shell, limits: &Limits) -> GenerateResult {
    let (guarded, mut warnings) = truncate_tool(tool, limits);
    let script = shell.generator().generate(&guarded);
    let (script, size_warning) = cap_output(script, &tool.name, limits.max_output_size);
    warnings.extend(size_warning);
    debug!(
        tool = %tool.name,
        shell = %shell,
        bytes = script.len(),
        warnings = warnings.len(),
        "Generated completion script"
    );
    GenerateResult { script, warnings }
}

/// A command reached through the tree, with its space-separated canonical
/// path and the path of its parent (empty for top-level commands).
#[derive(Debug)]
pub(crate) struct CommandPath<'a> {
    pub path: String,
    pub parent: String,
    pub command: &'a Command,
}

/// Every command in the tree, parents before children.
pub(crate) fn command_paths(commands: &[Command]) -> Vec<CommandPath<'_>> {
    let mut out = Vec::new();
    collect_paths(commands, "", &mut out);
    out
}

fn collect_paths<'a>(commands: &'a [Command], parent: &str, out: &mut Vec<CommandPath<'a>>) {
    for cmd in commands {
        let path = if parent.is_empty() {
            cmd.name.clone()
        } else {
            format!("{parent} {}", cmd.name)
        };
        out.push(CommandPath {
            path: path.clone(),
            parent: parent.to_string(),
            command: cmd,
        });
        collect_paths(&cmd.subcommands, &path, out);
    }
}

/// Line-oriented script buffer with four-space indentation.
#[derive(Debug, Default)]
pub(crate) struct ScriptWriter {
    out: String,
}

impl ScriptWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, indent: usize, text: impl AsRef<str>) {
        for _ in 0..indent {
            self.out.push_str("    ");
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    pub fn finish(self) -> String {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabgen_core::Flag;

    #[test]
    fn test_shell_names_and_files() {
        assert_eq!("bash".parse::<Shell>().unwrap(), Shell::Bash);
        assert_eq!("ZSH".parse::<Shell>().unwrap(), Shell::Zsh);
        assert!("fish".parse::<Shell>().is_err());
        assert_eq!(Shell::Bash.script_file_name("git"), "git");
        assert_eq!(Shell::Zsh.script_file_name("git"), "_git");
        assert_eq!(serde_json::to_string(&Shell::Zsh).unwrap(), "\"zsh\"");
    }

    #[test]
    fn test_command_paths_are_parent_first() {
        let commands = vec![
            Command::new("remote").with_subcommand(Command::new("add")),
            Command::new("log"),
        ];
        let paths: Vec<_> = command_paths(&commands)
            .into_iter()
            .map(|p| (p.parent, p.path))
            .collect();
        assert_eq!(
            paths,
            vec![
                (String::new(), "remote".to_string()),
                ("remote".to_string(), "remote add".to_string()),
                (String::new(), "log".to_string()),
            ]
        );
    }

    #[test]
    fn test_generate_with_limits_collects_warnings() {
        let mut tool = Tool::new("big", "/bin/big");
        tool.global_flags = (0..5).map(|i| Flag::new(&format!("--f{i}"))).collect();
        let limits = Limits {
            max_flags: 3,
            ..Limits::default()
        };

        let result = generate_with_limits(&tool, Shell::Bash, &limits);
        assert_eq!(result.warnings, vec!["truncated global flags from 5 to 3"]);
        assert!(result.script.contains("--f2"));
        assert!(!result.script.contains("--f3"));
    }

    #[test]
    fn test_generate_with_limits_caps_bytes() {
        let mut tool = Tool::new("big", "/bin/big");
        tool.subcommands = (0..100)
            .map(|i| Command::new(&format!("command-number-{i}")))
            .collect();
        let limits = Limits {
            max_output_size: 512,
            ..Limits::default()
        };

        for shell in Shell::ALL {
            let result = generate_with_limits(&tool, shell, &limits);
            assert!(result.script.ends_with(TRUNCATION_MARKER), "{shell}");
            assert!(result.script.len() <= 512 + TRUNCATION_MARKER.len());
            assert_eq!(result.warnings.len(), 1);
            assert!(result.warnings[0].starts_with("generated script for 'big' exceeds 512 bytes"));
        }
    }
}
