//! Process execution for help, man and version probes.
//!
//! Every probe goes through the [`ProbeRunner`] trait. [`SystemRunner`]
//! spawns real processes with a timeout; [`ScriptedRunner`] answers from an
//! in-memory table so extraction can be tested without installed binaries.

use std::collections::HashMap;
use std::io::{ErrorKind, Read};
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use wait_timeout::ChildExt;

/// One process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
    /// Extra environment on top of the non-interactive defaults.
    pub env: Vec<(String, String)>,
    /// Capture stdout only (man probes); otherwise stdout and stderr.
    pub stdout_only: bool,
}

impl ProbeRequest {
    pub fn new<I, S>(program: &str, args: I, timeout: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            timeout,
            env: Vec::new(),
            stdout_only: false,
        }
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn stdout_only(mut self) -> Self {
        self.stdout_only = true;
        self
    }

    /// Program and arguments joined by single spaces.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a probe that ran (or was killed).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutput {
    pub text: String,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

impl ProbeOutput {
    /// Output of a process that exited with status 0.
    pub fn ok(text: &str) -> Self {
        Self {
            text: text.to_string(),
            exit_code: Some(0),
            timed_out: false,
        }
    }

    pub fn failed(text: &str, code: i32) -> Self {
        Self {
            text: text.to_string(),
            exit_code: Some(code),
            timed_out: false,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            text: String::new(),
            exit_code: None,
            timed_out: true,
        }
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// A probe that could not produce output at all.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("command not found: {program}")]
    NotFound { program: String },

    #[error("permission denied: {program}: {message}")]
    PermissionDenied { program: String, message: String },

    #[error("failed to run {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl ProbeError {
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, ProbeError::PermissionDenied { .. })
    }

    /// Classifies a spawn error by kind, then by message.
    pub fn from_io(program: &str, err: std::io::Error) -> Self {
        match err.kind() {
            ErrorKind::NotFound => ProbeError::NotFound {
                program: program.to_string(),
            },
            ErrorKind::PermissionDenied => ProbeError::PermissionDenied {
                program: program.to_string(),
                message: err.to_string(),
            },
            _ if is_permission_message(&err.to_string()) => ProbeError::PermissionDenied {
                program: program.to_string(),
                message: err.to_string(),
            },
            _ => ProbeError::Io {
                program: program.to_string(),
                source: err,
            },
        }
    }
}

fn is_permission_message(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("permission denied")
        || message.contains("EACCES")
        || lower.contains("operation not permitted")
}

/// Runs probe processes.
pub trait ProbeRunner: Send + Sync {
    fn run(&self, request: &ProbeRequest) -> Result<ProbeOutput, ProbeError>;
}

impl<R: ProbeRunner + ?Sized> ProbeRunner for &R {
    fn run(&self, request: &ProbeRequest) -> Result<ProbeOutput, ProbeError> {
        (**self).run(request)
    }
}

impl<R: ProbeRunner + ?Sized> ProbeRunner for std::sync::Arc<R> {
    fn run(&self, request: &ProbeRequest) -> Result<ProbeOutput, ProbeError> {
        (**self).run(request)
    }
}

/// Environment applied to every real probe so tools stay non-interactive.
fn default_probe_env() -> Vec<(&'static str, &'static str)> {
    vec![
        ("DISPLAY", ""),
        ("WAYLAND_DISPLAY", ""),
        ("BROWSER", "true"),
        ("DEBIAN_FRONTEND", "noninteractive"),
        ("TERM", "dumb"),
        ("NO_COLOR", "1"),
        ("PAGER", "cat"),
        ("MANPAGER", "cat"),
        ("SYSTEMD_PAGER", "cat"),
        ("GIT_PAGER", "cat"),
    ]
}

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProbeRunner for SystemRunner {
    fn run(&self, request: &ProbeRequest) -> Result<ProbeOutput, ProbeError> {
        let mut command = Command::new(&request.program);
        command
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(if request.stdout_only {
                Stdio::null()
            } else {
                Stdio::piped()
            });
        for (key, value) in default_probe_env() {
            command.env(key, value);
        }
        for (key, value) in &request.env {
            command.env(key, value);
        }

        let mut child = command
            .spawn()
            .map_err(|e| ProbeError::from_io(&request.program, e))?;

        // Drain both pipes on helper threads so a chatty child cannot block
        // on a full pipe buffer before it exits.
        let stdout_thread = child.stdout.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });
        let stderr_thread = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                buf
            })
        });

        let status = match child.wait_timeout(request.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                debug!(
                    command = %request.command_line(),
                    timeout_ms = request.timeout.as_millis() as u64,
                    "Probe timed out, killing process"
                );
                let _ = child.kill();
                let _ = child.wait();
                return Ok(ProbeOutput::timed_out());
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProbeError::Io {
                    program: request.program.clone(),
                    source: e,
                });
            }
        };

        let stdout = stdout_thread
            .and_then(|t| t.join().ok())
            .unwrap_or_default();
        let stderr = stderr_thread
            .and_then(|t| t.join().ok())
            .unwrap_or_default();

        let mut text = String::from_utf8_lossy(&stdout).into_owned();
        if !stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&String::from_utf8_lossy(&stderr));
        }

        Ok(ProbeOutput {
            text,
            exit_code: status.code(),
            timed_out: false,
        })
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Output(ProbeOutput),
    PermissionDenied,
    NotFound,
}

/// In-memory runner keyed by [`ProbeRequest::command_line`].
///
/// Unscripted command lines behave like a tool that exits 1 with no output.
/// Every request is recorded so tests can assert which probes ran.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tabgen_discovery::{ProbeOutput, ProbeRequest, ProbeRunner, ScriptedRunner};
///
/// let runner = ScriptedRunner::new().with_output("/bin/tool --version", ProbeOutput::ok("tool 1.2.3"));
/// let request = ProbeRequest::new("/bin/tool", ["--version"], Duration::from_secs(1));
/// assert_eq!(runner.run(&request).unwrap().text, "tool 1.2.3");
/// assert_eq!(runner.calls(), vec!["/bin/tool --version"]);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: HashMap<String, Scripted>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, command_line: &str, output: ProbeOutput) -> Self {
        self.responses
            .insert(command_line.to_string(), Scripted::Output(output));
        self
    }

    /// Shorthand for a successful probe printing `text`.
    pub fn with_text(self, command_line: &str, text: &str) -> Self {
        self.with_output(command_line, ProbeOutput::ok(text))
    }

    pub fn with_permission_denied(mut self, command_line: &str) -> Self {
        self.responses
            .insert(command_line.to_string(), Scripted::PermissionDenied);
        self
    }

    pub fn with_not_found(mut self, command_line: &str) -> Self {
        self.responses
            .insert(command_line.to_string(), Scripted::NotFound);
        self
    }

    /// Command lines requested so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl ProbeRunner for ScriptedRunner {
    fn run(&self, request: &ProbeRequest) -> Result<ProbeOutput, ProbeError> {
        let line = request.command_line();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(line.clone());
        }
        match self.responses.get(&line) {
            Some(Scripted::Output(output)) => Ok(output.clone()),
            Some(Scripted::PermissionDenied) => Err(ProbeError::PermissionDenied {
                program: request.program.clone(),
                message: "permission denied".to_string(),
            }),
            Some(Scripted::NotFound) => Err(ProbeError::NotFound {
                program: request.program.clone(),
            }),
            None => Ok(ProbeOutput::failed("", 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_joins_args() {
        let request = ProbeRequest::new("git", ["remote", "--help"], Duration::from_secs(1));
        assert_eq!(request.command_line(), "git remote --help");
    }

    #[test]
    fn test_classifies_spawn_errors() {
        let err = ProbeError::from_io("x", std::io::Error::from(ErrorKind::PermissionDenied));
        assert!(err.is_permission_denied());

        let err = ProbeError::from_io("x", std::io::Error::from(ErrorKind::NotFound));
        assert!(matches!(err, ProbeError::NotFound { .. }));

        let err = ProbeError::from_io("x", std::io::Error::other("exec failed: EACCES"));
        assert!(err.is_permission_denied());

        let err = ProbeError::from_io("x", std::io::Error::other("broken pipe"));
        assert!(matches!(err, ProbeError::Io { .. }));
    }

    #[test]
    fn test_output_success_requires_zero_exit() {
        assert!(ProbeOutput::ok("x").success());
        assert!(!ProbeOutput::failed("x", 2).success());
        assert!(!ProbeOutput::timed_out().success());
        assert!(ProbeOutput::ok("  \n").is_empty());
    }

    #[test]
    fn test_scripted_runner_defaults_to_empty_failure() {
        let runner = ScriptedRunner::new();
        let request = ProbeRequest::new("tool", ["--help"], Duration::from_secs(1));
        let output = runner.run(&request).unwrap();
        assert!(output.is_empty());
        assert!(!output.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_captures_output() {
        let request = ProbeRequest::new("sh", ["-c", "echo out; echo err >&2; exit 3"], Duration::from_secs(5));
        let output = SystemRunner.run(&request).unwrap();
        assert_eq!(output.exit_code, Some(3));
        assert!(output.text.contains("out"));
        assert!(output.text.contains("err"));
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_kills_on_timeout() {
        let request = ProbeRequest::new("sleep", ["5"], Duration::from_millis(100));
        let output = SystemRunner.run(&request).unwrap();
        assert!(output.timed_out);
        assert!(output.is_empty());
    }

    #[test]
    fn test_system_runner_reports_missing_program() {
        let request = ProbeRequest::new("/nonexistent/tabgen-probe", ["--help"], Duration::from_secs(1));
        let err = SystemRunner.run(&request).unwrap_err();
        assert!(matches!(err, ProbeError::NotFound { .. }));
    }
}
