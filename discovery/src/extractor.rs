//! Per-tool extraction: validate the target, detect its version, probe help
//! and man output, parse both, then explore subcommands.

use std::path::Path;

use tabgen_core::{FlagListBuilder, SourceTag, Tool};
use tracing::{debug, info, info_span, trace, warn};

use crate::config::ExtractConfig;
use crate::error::ExtractError;
use crate::explorer::Explorer;
use crate::parser::{parse_help_text, parse_man_page, snippet};
use crate::probe::{ProbeRequest, ProbeRunner};
use crate::version::detect_version;

/// Lines of help output echoed at trace level.
const SNIPPET_LINES: usize = 20;

/// Checks that `name` and `path` describe a runnable file.
///
/// Runs before any probe so bad input fails fast.
pub fn validate_target(name: &str, path: &str) -> Result<(), ExtractError> {
    if name.trim().is_empty() {
        return Err(ExtractError::EmptyName);
    }
    if path.trim().is_empty() {
        return Err(ExtractError::EmptyPath);
    }

    let path_buf = Path::new(path).to_path_buf();
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ExtractError::PathMissing(path_buf));
        }
        Err(e) => {
            return Err(ExtractError::Inaccessible {
                path: path_buf,
                source: e,
            });
        }
    };

    if metadata.is_dir() {
        return Err(ExtractError::IsDirectory(path_buf));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(ExtractError::NotExecutable(path_buf));
        }
    }

    Ok(())
}

/// Decides the source tag from what the probes produced.
pub fn source_tag(has_help: bool, has_man: bool, man_denied: bool) -> SourceTag {
    match (has_help, has_man) {
        (true, true) => SourceTag::Both,
        (true, false) if man_denied => SourceTag::HelpOnly,
        (true, false) => SourceTag::Help,
        (false, true) => SourceTag::Man,
        (false, false) => SourceTag::None,
    }
}

/// Builds a tool from already-captured help and man text.
///
/// No process is run and no subcommand is explored.
///
/// # Examples
///
/// ```
/// use tabgen_core::SourceTag;
/// use tabgen_discovery::tool_from_text;
///
/// let tool = tool_from_text("mycli", "/usr/bin/mycli", "Options:\n  -q, --quiet   Be quiet\n", None);
/// assert_eq!(tool.source, SourceTag::Help);
/// assert_eq!(tool.global_flags[0].short.as_deref(), Some("-q"));
/// ```
pub fn tool_from_text(name: &str, path: &str, help: &str, man: Option<&str>) -> Tool {
    let man = man.unwrap_or("");
    let mut tool = Tool::new(name, path);
    tool.source = source_tag(!help.trim().is_empty(), !man.trim().is_empty(), false);
    fill_from_text(&mut tool, help, man);
    tool
}

fn fill_from_text(tool: &mut Tool, help: &str, man: &str) {
    let sections = parse_help_text(help);
    let mut flags = FlagListBuilder::from_existing(sections.flags);
    if !man.trim().is_empty() {
        let before = flags.len();
        parse_man_page(man, &mut flags);
        debug!(added = flags.len() - before, "Merged man page flags");
    }
    tool.subcommands = sections.subcommands;
    tool.global_flags = flags.finish();
}

enum ManPage {
    Text(String),
    Missing,
    Denied,
}

/// Runs probes for one tool at a time.
///
/// Each pipeline worker owns its own `Extractor`; the runner is shared and
/// stateless.
pub struct Extractor<'a> {
    runner: &'a dyn ProbeRunner,
    config: ExtractConfig,
}

impl<'a> Extractor<'a> {
    pub fn new(runner: &'a dyn ProbeRunner, config: ExtractConfig) -> Self {
        Self {
            runner,
            config: config.normalized(),
        }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Extracts the command tree of the executable at `path`.
    ///
    /// A tool that prints nothing comes back with [`SourceTag::None`]; only bad
    /// input and a permission-denied help probe are errors.
    pub fn extract(&self, name: &str, path: &str) -> Result<Tool, ExtractError> {
        validate_target(name, path)?;

        let span = info_span!("extract", tool = %name);
        let _enter = span.enter();
        debug!(path = path, quick = self.config.quick, "Parsing tool");

        let mut tool = Tool::new(name, path);
        tool.version = detect_version(self.runner, path, &self.config);
        if tool.version.is_none() {
            debug!("No version detected");
        }

        let help = self.probe_help(path)?;
        if help.trim().is_empty() {
            debug!("Help probes returned no output");
        } else {
            debug!(bytes = help.len(), "Captured help output");
            trace!(help = %snippet(&help, SNIPPET_LINES), "Help output");
        }

        let man = if self.config.quick {
            ManPage::Missing
        } else {
            self.probe_man(name)
        };
        let (man_text, man_denied) = match man {
            ManPage::Text(text) => (text, false),
            ManPage::Missing => (String::new(), false),
            ManPage::Denied => (String::new(), true),
        };

        tool.source = source_tag(
            !help.trim().is_empty(),
            !man_text.trim().is_empty(),
            man_denied,
        );
        if !tool.has_content() {
            info!(source = %tool.source, "No help or man page found");
            return Ok(tool);
        }

        fill_from_text(&mut tool, &help, &man_text);

        if !self.config.quick && !tool.subcommands.is_empty() {
            debug!(max_depth = self.config.max_depth, "Exploring subcommands");
            let explorer = Explorer::new(self.runner, &self.config, path);
            tool.subcommands = explorer.explore(std::mem::take(&mut tool.subcommands));
        }

        let (subcommands, flags) = tool.count_items();
        info!(
            source = %tool.source,
            version = tool.version_str(),
            subcommands = subcommands,
            flags = flags,
            "Extracted tool"
        );
        Ok(tool)
    }

    /// Runs `--help`, then `-h` when `--help` fails without printing.
    fn probe_help(&self, path: &str) -> Result<String, ExtractError> {
        for flag in ["--help", "-h"] {
            let request = ProbeRequest::new(path, [flag], self.config.help_timeout());
            match self.runner.run(&request) {
                Ok(output) if !output.is_empty() => return Ok(output.text),
                Ok(output) if output.timed_out || output.success() => return Ok(String::new()),
                Ok(_) => debug!(flag = flag, "Help probe failed without output"),
                Err(e) if e.is_permission_denied() => {
                    return Err(ExtractError::PermissionDenied {
                        command: request.command_line(),
                        source: e,
                    });
                }
                Err(e) => {
                    debug!(flag = flag, error = %e, "Help probe could not run");
                    return Ok(String::new());
                }
            }
        }
        Ok(String::new())
    }

    fn probe_man(&self, name: &str) -> ManPage {
        let request = ProbeRequest::new("man", [name], self.config.help_timeout())
            .with_env("MANWIDTH", "120")
            .with_env("LC_ALL", "C")
            .stdout_only();
        match self.runner.run(&request) {
            Ok(output) if output.success() && !output.is_empty() => {
                debug!(bytes = output.text.len(), "Captured man page");
                ManPage::Text(output.text)
            }
            Ok(_) => ManPage::Missing,
            Err(e) if e.is_permission_denied() => {
                warn!(error = %e, "Man page probe denied");
                ManPage::Denied
            }
            Err(e) => {
                debug!(error = %e, "Man page probe could not run");
                ManPage::Missing
            }
        }
    }
}
