//! Generated scripts loaded by the shells themselves.
//!
//! Tests that need a shell return early when it is not installed.

use std::collections::BTreeSet;
use std::path::Path;
use std::process::Command as Process;

use tabgen_core::{Command, Flag, Tool};
use tabgen_generator::{BashGenerator, CompletionGenerator, ZshGenerator};

/// Feeds the words after the script path to the completion function as
/// `COMP_WORDS` and prints `COMPREPLY`, one entry per line.
const BASH_DRIVER: &str = r#"
source "$1" || exit 90
shift
COMP_WORDS=("$@")
COMP_CWORD=$(( $# - 1 ))
COMPREPLY=()
_tabgen_hostile
printf '%s\n' "${COMPREPLY[@]}"
"#;

fn has_shell(shell: &str) -> bool {
    Process::new(shell)
        .args(["-c", "true"])
        .output()
        .is_ok_and(|out| out.status.success())
}

/// Every text field carries shell syntax that must stay inert. Anything
/// that runs creates a file in the working directory.
fn hostile_tool(name: &str) -> Tool {
    let mut tool = Tool::new(name, "/usr/bin/hostile");
    tool.global_flags.push(
        Flag::new("--mode")
            .with_short("-m")
            .with_choices(
                "how`touch arg-name`",
                ["plain", "$(touch choice)", "`touch tick`", r#"q"\"#, "it's"],
            )
            .with_description(r#""quoted" $(touch desc) `touch desc-tick` \n [x]"#),
    );
    tool.global_flags.push(Flag::new("--fo(r)mat;$x"));
    tool.global_flags.push(Flag::new("--[no-]verify").with_description("Run hooks"));
    tool.subcommands.push(
        Command::new("deploy")
            .with_alias("d$(touch alias)")
            .with_description("Ship it; $(touch cmd-desc)")
            .with_flag(Flag::new("--target").with_choices("env", ["prod", "$(touch target)"]))
            .with_subcommand(Command::new("status").with_flag(Flag::new("--watch"))),
    );
    tool.subcommands.push(Command::new("b`touch cmd`").with_description(r"back\slash"));
    tool.subcommands.push(Command::new("commands").with_flag(Flag::new("--all")));
    tool
}

/// Runs `bash <script> <words>` from an empty directory and returns the
/// completions together with whatever files the run left behind.
fn complete_bash(script: &Path, words: &[&str]) -> (BTreeSet<String>, Vec<String>) {
    let cwd = tempfile::tempdir().unwrap();
    let out = Process::new("bash")
        .args(["--noprofile", "--norc", "-c", BASH_DRIVER, "driver"])
        .arg(script)
        .args(words)
        .current_dir(cwd.path())
        .env_remove("BASH_ENV")
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let replies = String::from_utf8(out.stdout)
        .unwrap()
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    let created = std::fs::read_dir(cwd.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    (replies, created)
}

fn set(words: &[&str]) -> BTreeSet<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[test]
fn test_bash_script_passes_syntax_check() {
    if !has_shell("bash") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    for name in ["hostile", "evil$(touch name)\"`x`\\", "two\nlines"] {
        let path = dir.path().join("completion.bash");
        std::fs::write(&path, BashGenerator.generate(&hostile_tool(name))).unwrap();

        let out = Process::new("bash").arg("-n").arg(&path).output().unwrap();
        assert!(out.status.success(), "{name:?}: {}", String::from_utf8_lossy(&out.stderr));
    }
}

#[test]
fn test_zsh_script_passes_syntax_check() {
    if !has_shell("zsh") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    for name in ["hostile", "evil$(touch name)\"`x`\\"] {
        let path = dir.path().join("_hostile");
        std::fs::write(&path, ZshGenerator.generate(&hostile_tool(name))).unwrap();

        let out = Process::new("zsh").arg("-n").arg(&path).output().unwrap();
        assert!(out.status.success(), "{name:?}: {}", String::from_utf8_lossy(&out.stderr));
    }
}

#[test]
fn test_bash_completions_are_literal() {
    if !has_shell("bash") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("hostile.bash");
    std::fs::write(&script, BashGenerator.generate(&hostile_tool("hostile"))).unwrap();

    let cases: &[(&[&str], &[&str])] = &[
        (
            &["hostile", "--mode", ""],
            &["plain", "$(touch choice)", "`touch tick`", r#"q"\"#, "it's"],
        ),
        (&["hostile", "-m", "$"], &["$(touch choice)"]),
        (&["hostile", "--mode", "`"], &["`touch tick`"]),
        (&["hostile", "--mode", "q"], &[r#"q"\"#]),
        (&["hostile", "-"], &["--mode", "-m", "--fo(r)mat;$x", "--[no-]verify"]),
        (&["hostile", "--f"], &["--fo(r)mat;$x"]),
        (&["hostile", ""], &["deploy", "b`touch cmd`", "commands"]),
        (&["hostile", "b"], &["b`touch cmd`"]),
        (&["hostile", "deploy", "--target", ""], &["prod", "$(touch target)"]),
        (&["hostile", "d$(touch alias)", "-"], &["--target"]),
        (&["hostile", "d$(touch alias)", "status", "-"], &["--watch"]),
        (&["hostile", "commands", "-"], &["--all"]),
        (&["hostile", "commands", ""], &[]),
    ];
    for (words, want) in cases {
        let (replies, created) = complete_bash(&script, words);
        assert_eq!(replies, set(want), "{words:?}");
        assert!(created.is_empty(), "{words:?} ran {created:?}");
    }
}

#[test]
fn test_bash_sourcing_with_hostile_tool_name_runs_nothing() {
    if !has_shell("bash") {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("evil.bash");
    // The driver calls the function of the second tool.
    let mut text = BashGenerator.generate(&hostile_tool("evil$(touch name)`touch name-tick`"));
    text.push_str(&BashGenerator.generate(&hostile_tool("hostile")));
    std::fs::write(&script, text).unwrap();

    let (replies, created) = complete_bash(&script, &["hostile", "commands", "-"]);
    assert_eq!(replies, set(&["--all"]));
    assert!(created.is_empty(), "{created:?}");
}
