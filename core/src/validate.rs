//! Structural validation of tool trees.
//!
//! The extractor never produces duplicate siblings, but tool files can be
//! edited by hand or written by an older release. Validation catches empty
//! names, malformed flag names and duplicate siblings before such a tree
//! reaches the script generators.
//!
//! # Examples
//!
//! ```
//! use tabgen_core::*;
//!
//! let mut tool = Tool::new("git", "/usr/bin/git");
//! tool.global_flags.push(Flag::new("--verbose").with_short("-v"));
//! assert!(validate_tool(&tool).is_empty());
//!
//! tool.global_flags.push(Flag::new("verbose"));
//! assert!(!validate_tool(&tool).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{Command, Flag, Tool};

/// Tree validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Tool name is empty or whitespace-only.
    #[error("tool name cannot be empty")]
    EmptyToolName,
    /// A command in the tree has an empty name.
    #[error("empty command name under '{0}'")]
    EmptyCommandName(String),
    /// A flag name does not start with `-`.
    #[error("invalid flag name: {0}")]
    InvalidFlagName(String),
    /// Two flags in the same scope share an identity.
    #[error("duplicate flag in scope '{scope}': {flag}")]
    DuplicateFlag { scope: String, flag: String },
    /// Two commands in the same scope share a name.
    #[error("duplicate command in scope '{scope}': {command}")]
    DuplicateCommand { scope: String, command: String },
}

/// Validates a tool tree, returning every problem found.
pub fn validate_tool(tool: &Tool) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if tool.name.trim().is_empty() {
        errors.push(ValidationError::EmptyToolName);
        return errors;
    }

    let mut path = vec![tool.name.clone()];
    validate_flags(&tool.global_flags, &path, &mut errors);
    validate_commands(&tool.subcommands, &mut path, &mut errors);
    errors
}

fn validate_commands(
    commands: &[Command],
    path: &mut Vec<String>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen: HashSet<&str> = HashSet::new();

    for cmd in commands {
        let name = cmd.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::EmptyCommandName(path.join(" ")));
            continue;
        }
        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateCommand {
                scope: path.join(" "),
                command: name.to_string(),
            });
            continue;
        }

        path.push(name.to_string());
        validate_flags(&cmd.flags, path, errors);
        validate_commands(&cmd.subcommands, path, errors);
        path.pop();
    }
}

fn validate_flags(flags: &[Flag], path: &[String], errors: &mut Vec<ValidationError>) {
    let mut seen: HashSet<&str> = HashSet::new();

    for flag in flags {
        for name in flag.names() {
            if !name.starts_with('-') || name.len() < 2 {
                errors.push(ValidationError::InvalidFlagName(name.to_string()));
            }
        }
        if !seen.insert(flag.identity()) {
            errors.push(ValidationError::DuplicateFlag {
                scope: path.join(" "),
                flag: flag.identity().to_string(),
            });
        }
    }
}
