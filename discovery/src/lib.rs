//! Command tree discovery from `--help` and man page output.
//!
//! This crate turns the freeform text that command-line tools print for
//! `--help` and `man` into a [`Tool`](tabgen_core::Tool) tree of commands,
//! aliases, flags and flag-argument choices. Parsing is best effort and line
//! oriented: every line is run through an ordered list of named rules (see
//! [`parser::HELP_RULES`]).
//!
//! # Main entry points
//!
//! - [`parser::parse_help_text`] parses captured help text without running
//!   anything.
//! - [`tool_from_text`] builds a whole tool from captured help and man text.
//! - [`Extractor::extract`] probes an installed executable and builds its tree.
//! - [`extract_version`] and [`detect_version`] find version strings.
//!
//! Every process goes through a [`ProbeRunner`]. [`SystemRunner`] spawns real
//! processes with a timeout; [`ScriptedRunner`] replays canned output.
//!
//! # Example
//!
//! ```
//! use tabgen_core::SourceTag;
//! use tabgen_discovery::{ExtractConfig, Extractor, ScriptedRunner};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let dir = tempfile::tempdir()?;
//! # let path = dir.path().join("mycli");
//! # std::fs::write(&path, "")?;
//! # #[cfg(unix)]
//! # {
//! # use std::os::unix::fs::PermissionsExt;
//! # std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
//! # }
//! # let path = path.to_str().unwrap();
//! let help = "\
//! Usage: mycli [OPTIONS] <COMMAND>
//!
//! Commands:
//!   init     Initialize a new project
//!   build    Build the project
//!
//! Options:
//!   -v, --verbose          Enable verbose output
//!   -f, --format=json|yaml  Output format
//! ";
//! let runner = ScriptedRunner::new()
//!     .with_text(&format!("{path} --version"), "mycli 0.4.1")
//!     .with_text(&format!("{path} --help"), help);
//!
//! let extractor = Extractor::new(&runner, ExtractConfig::default());
//! let tool = extractor.extract("mycli", path)?;
//!
//! assert_eq!(tool.version.as_deref(), Some("0.4.1"));
//! assert_eq!(tool.source, SourceTag::Help);
//! assert_eq!(tool.subcommands.len(), 2);
//! assert_eq!(tool.find_global_flag("-v").unwrap().name, "--verbose");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod explorer;
pub mod extractor;
pub mod parser;
pub mod probe;
pub mod version;

pub use config::ExtractConfig;
pub use error::ExtractError;
pub use explorer::Explorer;
pub use extractor::{Extractor, source_tag, tool_from_text, validate_target};
pub use probe::{ProbeError, ProbeOutput, ProbeRequest, ProbeRunner, ScriptedRunner, SystemRunner};
pub use version::{detect_version, extract_version};
