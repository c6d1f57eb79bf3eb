//! Core model types for tabgen.
//!
//! This crate defines the tree that the extractor produces and the script
//! generators consume:
//!
//! - [`Tool`] is one parsed executable with its top-level commands and
//!   global flags.
//! - [`Command`] has aliases and its own nested commands and flags.
//! - [`Flag`] has long and short names, an argument placeholder and the
//!   allowed argument values.
//!
//! [`fingerprint`] digests the extracted structure so unchanged tools can be
//! skipped. The builders ([`CommandListBuilder`], [`FlagListBuilder`],
//! [`CommandBuilder`]) drop duplicate siblings while a tree is assembled, and
//! [`validate_tool`] checks trees loaded from disk.
//!
//! # Example
//!
//! ```
//! use tabgen_core::*;
//!
//! let mut tool = Tool::new("mycli", "/usr/local/bin/mycli");
//! tool.source = SourceTag::Help;
//! tool.global_flags.push(Flag::new("--verbose").with_short("-v"));
//! tool.subcommands.push(
//!     Command::new("run").with_flag(Flag::new("--format").with_choices("value", ["json", "text"])),
//! );
//!
//! assert!(validate_tool(&tool).is_empty());
//! assert_eq!(fingerprint(&tool).as_str().len(), 64);
//! ```

mod builder;
mod fingerprint;
mod types;
mod validate;

pub use builder::{CommandBuilder, CommandListBuilder, FlagListBuilder};
pub use fingerprint::{Fingerprint, fingerprint, fingerprint_parts};
pub use types::*;
pub use validate::{ValidationError, validate_tool};
