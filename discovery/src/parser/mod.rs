//! Help and man page text extraction.
//!
//! [`HelpParser`] walks help output line by line, tracks the current section,
//! and feeds every line through the [`HELP_RULES`]. Commands and flags go
//! into deduplicating builders, so a name seen twice keeps its first
//! definition. [`parse_man_page`] reads the `OPTIONS` section of rendered man
//! output into the same flag list.

mod classify;
mod util;

pub use classify::{
    Classification, HELP_RULES, LineClass, LineContext, LineRule, SectionMode, classify_line,
    is_commands_header, is_options_header, parse_command_line, parse_flag_line,
    parse_indented_command,
};
pub use util::{is_man_section_header, is_valid_command_name, snippet, split_description, strip_overstrike};

use tabgen_core::{Command, CommandListBuilder, Flag, FlagListBuilder};
use tracing::{debug, trace};

/// Commands and flags recovered from one block of help text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HelpSections {
    pub subcommands: Vec<Command>,
    pub flags: Vec<Flag>,
}

/// One line of an [`explain_help_text`] trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTrace {
    pub line_no: usize,
    pub text: String,
    pub mode: SectionMode,
    pub hits: Vec<Classification>,
}

/// Section-aware help text parser.
///
/// # Examples
///
/// ```
/// use tabgen_discovery::parser::HelpParser;
///
/// let help = "\
/// Usage: tool [command]
///
/// Commands:
///   build   Build it
///   test    Run it
///
/// Options:
///   -v, --verbose   Be loud
/// ";
///
/// let mut parser = HelpParser::new();
/// parser.feed(help);
/// let sections = parser.finish();
/// assert_eq!(sections.subcommands.len(), 2);
/// assert_eq!(sections.flags[0].name, "--verbose");
/// ```
#[derive(Debug, Default)]
pub struct HelpParser {
    mode: SectionMode,
    commands: CommandListBuilder,
    flags: FlagListBuilder,
}

impl HelpParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues from lists that already hold entries, e.g. a command's
    /// children recorded by its parent's help.
    pub fn with_existing(commands: Vec<Command>, flags: Vec<Flag>) -> Self {
        Self {
            mode: SectionMode::None,
            commands: CommandListBuilder::from_existing(commands),
            flags: FlagListBuilder::from_existing(flags),
        }
    }

    /// Feeds a block of help text. Section mode carries across calls.
    pub fn feed(&mut self, text: &str) {
        for line in text.lines() {
            self.feed_line(line);
        }
    }

    /// Classifies one line and applies the result; returns the rule hits.
    pub fn feed_line(&mut self, line: &str) -> Vec<Classification> {
        let hits = classify_line(line, self.mode);
        for hit in &hits {
            match &hit.class {
                LineClass::CommandsHeader => {
                    debug!(header = line.trim(), "Detected commands section");
                    self.mode = SectionMode::Commands;
                }
                LineClass::OptionsHeader => {
                    debug!(header = line.trim(), "Detected options section");
                    self.mode = SectionMode::Options;
                }
                LineClass::Blank => {}
                LineClass::Flag(flag) => {
                    if !self.flags.insert(flag.clone()) {
                        trace!(flag = %flag.name, "Dropped duplicate flag");
                    }
                }
                LineClass::Command(cmd) => {
                    if !self.commands.insert(cmd.clone()) {
                        trace!(command = %cmd.name, "Dropped duplicate command");
                    }
                }
            }
        }
        hits
    }

    pub fn mode(&self) -> SectionMode {
        self.mode
    }

    pub fn finish(self) -> HelpSections {
        HelpSections {
            subcommands: self.commands.finish(),
            flags: self.flags.finish(),
        }
    }
}

/// Parses a complete block of help text.
///
/// # Examples
///
/// ```
/// use tabgen_discovery::parser::parse_help_text;
///
/// let sections = parse_help_text("Commands:\n  build   Build it\n  test    Run it\n");
/// let names: Vec<_> = sections.subcommands.iter().map(|c| c.name.as_str()).collect();
/// assert_eq!(names, vec!["build", "test"]);
/// assert_eq!(sections.subcommands[1].description.as_deref(), Some("Run it"));
/// ```
pub fn parse_help_text(text: &str) -> HelpSections {
    let mut parser = HelpParser::new();
    parser.feed(text);
    parser.finish()
}

/// Classifies every line and reports which rules fired.
pub fn explain_help_text(text: &str) -> Vec<LineTrace> {
    let mut parser = HelpParser::new();
    text.lines()
        .enumerate()
        .map(|(idx, line)| {
            let mode = parser.mode();
            let hits = parser.feed_line(line);
            LineTrace {
                line_no: idx + 1,
                text: line.to_string(),
                mode,
                hits,
            }
        })
        .collect()
}

/// Adds flags from the `OPTIONS` section of rendered man output.
///
/// The section starts at a line beginning with `OPTIONS` and ends at the next
/// unindented man section header. A non-flag line right after a newly added
/// flag that has no description becomes its description.
///
/// # Examples
///
/// ```
/// use tabgen_core::FlagListBuilder;
/// use tabgen_discovery::parser::parse_man_page;
///
/// let man = "OPTIONS\n       --verbose\n              Enable verbose mode\n\nSEE ALSO\n       --other   Not an option\n";
/// let mut flags = FlagListBuilder::new();
/// parse_man_page(man, &mut flags);
/// let flags = flags.finish();
/// assert_eq!(flags.len(), 1);
/// assert_eq!(flags[0].description.as_deref(), Some("Enable verbose mode"));
/// ```
pub fn parse_man_page(text: &str, flags: &mut FlagListBuilder) {
    let text = strip_overstrike(text);
    let mut in_options = false;
    let mut has_current = false;

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("OPTIONS") {
            in_options = true;
            continue;
        }

        if in_options
            && !line.is_empty()
            && !line.starts_with([' ', '\t'])
            && is_man_section_header(trimmed)
        {
            in_options = false;
            continue;
        }

        if !in_options {
            continue;
        }

        if trimmed.starts_with('-') {
            if let Some(flag) = parse_flag_line(line) {
                has_current |= flags.insert(flag);
            }
        } else if has_current && !trimmed.is_empty() {
            if let Some(current) = flags.last_mut() {
                if current.description.is_none() {
                    current.description = Some(trimmed.to_string());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(commands: &[Command]) -> Vec<&str> {
        commands.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_commands_and_options_sections() {
        let help = "\
Usage: mycli [OPTIONS] <COMMAND>

Commands:
  init     Initialize a new project
  b, build    Build the project
  deploy   Deploy to production

Options:
  -v, --verbose          Enable verbose output
  -c, --config <FILE>    Path to config file
  -f, --format=json|yaml  Output format
";
        let sections = parse_help_text(help);
        assert_eq!(names(&sections.subcommands), vec!["init", "build", "deploy"]);
        assert_eq!(sections.subcommands[1].aliases, vec!["b"]);
        assert_eq!(sections.flags.len(), 3);
        assert_eq!(sections.flags[1].arg.as_deref(), Some("FILE"));
        assert_eq!(sections.flags[2].argument_values, vec!["json", "yaml"]);
    }

    #[test]
    fn test_section_headers_variants() {
        let cases = [
            ("Available commands:\n  start   Start it\n  stop    Stop it\n", 2, 0),
            ("Subcommands:\n  run   Run the app\n  test  Test the app\n", 2, 0),
            ("COMMANDS\n  run   Run the app\n", 1, 0),
            ("Flags:\n  --debug     Enable debug mode\n  --quiet     Quiet mode\n", 0, 2),
            ("Global Options:\n  --config    Config file\n  --env       Environment\n", 0, 2),
            ("Global Flags:\n  --verbose   Be verbose\n", 0, 1),
        ];
        for (help, commands, flags) in cases {
            let sections = parse_help_text(help);
            assert_eq!(sections.subcommands.len(), commands, "{help}");
            assert_eq!(sections.flags.len(), flags, "{help}");
        }
    }

    #[test]
    fn test_blank_lines_do_not_end_a_section() {
        let help = "Commands:\n  build   Build it\n\n  test    Run it\n";
        let sections = parse_help_text(help);
        assert_eq!(names(&sections.subcommands), vec!["build", "test"]);
    }

    #[test]
    fn test_git_style_indented_commands() {
        let help = "\
usage: git [--version] [--help] <command> [<args>]

These are common Git commands used in various situations:

start a working area
   clone      Clone a repository into a new directory
   init       Create an empty Git repository

   --verbose  Be verbose
";
        let sections = parse_help_text(help);
        assert_eq!(names(&sections.subcommands), vec!["clone", "init"]);
        assert_eq!(sections.flags.len(), 1);
        assert_eq!(sections.flags[0].name, "--verbose");
    }

    #[test]
    fn test_duplicates_are_dropped() {
        let help = "\
Options:
  --force     Force it
  --verbose   Verbose

Commands:
  action     First detection
  action     Duplicate
  --verbose  Inline duplicate
";
        let sections = parse_help_text(help);
        assert_eq!(sections.flags.len(), 2);
        assert_eq!(sections.flags[0].description.as_deref(), Some("Force it"));
        assert_eq!(sections.subcommands.len(), 1);
        assert_eq!(sections.subcommands[0].description.as_deref(), Some("First detection"));
    }

    #[test]
    fn test_inline_flags_outside_sections() {
        let help = "Usage: tool subcmd\n\n  --direct-flag     A flag appearing directly\n";
        let sections = parse_help_text(help);
        assert_eq!(sections.flags[0].name, "--direct-flag");
        assert!(sections.subcommands.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_help_text(""), HelpSections::default());
    }

    #[test]
    fn test_with_existing_keeps_prior_entries() {
        let mut parser = HelpParser::with_existing(
            vec![Command::new("add")],
            vec![Flag::new("--verbose").with_description("from parent")],
        );
        parser.feed("Options:\n  --verbose   from child\n  --dry-run   Preview\n\nCommands:\n  add   Again\n  rm    Remove\n");
        let sections = parser.finish();
        assert_eq!(names(&sections.subcommands), vec!["add", "rm"]);
        assert_eq!(sections.flags[0].description.as_deref(), Some("from parent"));
        assert_eq!(sections.flags.len(), 2);
    }

    #[test]
    fn test_explain_reports_rules_and_modes() {
        let trace = explain_help_text("Options:\n  -q   Quiet\nnoise\n");
        assert_eq!(trace.len(), 3);
        assert_eq!(trace[0].hits[0].rule, "options-header");
        assert_eq!(trace[1].mode, SectionMode::Options);
        assert_eq!(trace[1].hits[0].rule, "section-flag");
        assert!(trace[2].hits.is_empty());
    }

    #[test]
    fn test_man_page_end_of_section() {
        let man = "\
OPTIONS
       --flag1    First flag

EXAMPLES
       Example usage here
       --notaflag    This looks like a flag but is in EXAMPLES section
";
        let mut flags = FlagListBuilder::new();
        parse_man_page(man, &mut flags);
        let flags = flags.finish();
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].name, "--flag1");
    }

    #[test]
    fn test_man_page_continuation_fills_only_empty_description() {
        let man = "\
OPTIONS
       -a, --all
              do not ignore entries starting with .
              second line is ignored
       -l     use a long listing format
              continuation ignored because -l has a description
";
        let mut flags = FlagListBuilder::new();
        parse_man_page(man, &mut flags);
        let flags = flags.finish();
        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].description.as_deref(), Some("do not ignore entries starting with ."));
        assert_eq!(flags[1].description.as_deref(), Some("use a long listing format"));
    }

    #[test]
    fn test_man_page_merges_with_help_flags() {
        let mut flags = FlagListBuilder::from_existing(vec![Flag::new("--all").with_description("from help")]);
        parse_man_page("OPTIONS\n       --all   from man\n       --color   Colorize\n", &mut flags);
        let flags = flags.finish();
        assert_eq!(flags.len(), 2);
        assert_eq!(flags[0].description.as_deref(), Some("from help"));
    }

    #[test]
    fn test_man_page_strips_overstrike() {
        let bold = |s: &str| s.chars().map(|c| format!("{c}\u{8}{c}")).collect::<String>();
        let man = format!("{}\n       {}   Be quiet\n", bold("OPTIONS"), bold("--quiet"));
        let mut flags = FlagListBuilder::new();
        parse_man_page(&man, &mut flags);
        assert_eq!(flags.finish()[0].name, "--quiet");
    }
}
