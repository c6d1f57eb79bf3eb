//! Bash completion scripts.
//!
//! The generated function completes flag argument choices from `$prev`,
//! walks the typed words to find the current command path, then offers that
//! command's flags or subcommands. Candidate words are passed to a helper as
//! single-quoted arguments and filtered against `$cur` without further
//! expansion. Registration uses `-o default -o bashdefault` so bash falls back
//! to its own completion when nothing matches.

use std::collections::HashSet;

use tabgen_core::{Command, Flag, Tool};

use crate::escape::{
    escape_pattern, escape_string, func_name, helper_func_name, one_line, single_quote,
};
use crate::{CommandPath, CompletionGenerator, ScriptWriter, Shell, command_paths};

#[derive(Debug, Default, Clone, Copy)]
pub struct BashGenerator;

impl CompletionGenerator for BashGenerator {
    fn shell(&self) -> Shell {
        Shell::Bash
    }

    fn generate(&self, tool: &Tool) -> String {
        let func = func_name(&tool.name);
        let reply = helper_func_name(&func);
        let name = escape_string(&tool.name);
        let mut w = ScriptWriter::new();

        w.line(0, format!("# Bash completion for {}", escape_string(&one_line(&tool.name))));
        w.line(0, "# Generated by tabgen; edits are overwritten on the next run.");
        w.blank();
        reply_function(&mut w, &reply);

        w.line(0, format!("{func}() {{"));
        w.line(1, "local cur prev words cword");
        w.line(1, "if declare -F _init_completion >/dev/null 2>&1; then");
        w.line(2, "_init_completion || return");
        w.line(1, "else");
        w.line(2, "COMPREPLY=()");
        w.line(2, r#"words=("${COMP_WORDS[@]}")"#);
        w.line(2, "cword=$COMP_CWORD");
        w.line(2, r#"cur="${COMP_WORDS[COMP_CWORD]}""#);
        w.line(2, r#"prev="${COMP_WORDS[COMP_CWORD-1]}""#);
        w.line(1, "fi");
        w.blank();

        flag_value_completions(&mut w, &reply, &tool.global_flags, &tool.subcommands);

        if tool.subcommands.is_empty() {
            offer(&mut w, &reply, 1, &tool.global_flags, &[]);
        } else {
            let paths = command_paths(&tool.subcommands);
            command_path_walk(&mut w, &paths);
            w.line(1, r#"case "$cmd_path" in"#);
            w.line(2, r#""")"#);
            offer(&mut w, &reply, 3, &tool.global_flags, &tool.subcommands);
            w.line(3, ";;");
            for path in &paths {
                if path.command.flags.is_empty() && path.command.subcommands.is_empty() {
                    continue;
                }
                w.line(2, format!("\"{}\")", escape_string(&path.path)));
                offer(&mut w, &reply, 3, &path.command.flags, &path.command.subcommands);
                w.line(3, ";;");
            }
            w.line(1, "esac");
        }

        w.line(0, "}");
        w.blank();
        w.line(0, format!("complete -o default -o bashdefault -F {func} \"{name}\""));
        w.finish()
    }
}

/// Emits the helper that appends each argument starting with `$cur` to
/// `COMPREPLY`. `$cur` is the caller's local.
fn reply_function(w: &mut ScriptWriter, reply: &str) {
    w.line(0, format!("{reply}() {{"));
    w.line(1, "local word");
    w.line(1, r#"for word in "$@"; do"#);
    w.line(2, r#"[[ $word == "$cur"* ]] && COMPREPLY+=("$word")"#);
    w.line(1, "done");
    w.line(1, "return 0");
    w.line(0, "}");
    w.blank();
}

/// Every spelling of every flag, long name first.
pub(crate) fn collect_flags(flags: &[Flag]) -> Vec<&str> {
    flags.iter().flat_map(|f| f.names()).collect()
}

/// Emits the `case "$prev"` block for flags with argument choices, covering
/// global flags and the flags of every nested command. Emits nothing when no
/// flag has choices.
fn flag_value_completions(
    w: &mut ScriptWriter,
    reply: &str,
    global_flags: &[Flag],
    commands: &[Command],
) {
    let mut flags: Vec<&Flag> = global_flags.iter().filter(|f| f.has_choices()).collect();
    collect_choice_flags(commands, &mut flags);
    if flags.is_empty() {
        return;
    }

    let mut seen = HashSet::new();
    w.line(1, r#"case "$prev" in"#);
    for flag in flags {
        let labels: Vec<String> = flag
            .names()
            .filter(|name| seen.insert(*name))
            .map(escape_pattern)
            .collect();
        if labels.is_empty() {
            continue;
        }
        w.line(2, format!("{})", labels.join("|")));
        w.line(3, reply_call(reply, flag.argument_values.iter().map(String::as_str)));
        w.line(3, "return");
        w.line(3, ";;");
    }
    w.line(1, "esac");
    w.blank();
}

fn collect_choice_flags<'a>(commands: &'a [Command], out: &mut Vec<&'a Flag>) {
    for cmd in commands {
        out.extend(cmd.flags.iter().filter(|f| f.has_choices()));
        collect_choice_flags(&cmd.subcommands, out);
    }
}

/// Emits the loop that turns the words before the cursor into `cmd_path`,
/// the space-separated canonical names of the commands typed so far.
fn command_path_walk(w: &mut ScriptWriter, paths: &[CommandPath<'_>]) {
    w.line(1, r#"local cmd_path="" word i"#);
    w.line(1, "for ((i = 1; i < cword; i++)); do");
    w.line(2, r#"word="${words[i]}""#);
    w.line(2, r#"case "$cmd_path:$word" in"#);
    for path in paths {
        let labels: Vec<String> = path
            .command
            .names()
            .map(|name| format!("\"{}:{}\"", escape_string(&path.parent), escape_string(name)))
            .collect();
        w.line(
            3,
            format!("{}) cmd_path=\"{}\" ;;", labels.join("|"), escape_string(&path.path)),
        );
    }
    w.line(2, "esac");
    w.line(1, "done");
    w.blank();
}

fn offer(w: &mut ScriptWriter, reply: &str, indent: usize, flags: &[Flag], commands: &[Command]) {
    let flag_call = reply_call(reply, collect_flags(flags));
    let command_call = reply_call(reply, commands.iter().map(|c| c.name.as_str()));
    match (flags.is_empty(), commands.is_empty()) {
        (false, false) => {
            w.line(indent, r#"if [[ "$cur" == -* ]]; then"#);
            w.line(indent + 1, flag_call);
            w.line(indent, "else");
            w.line(indent + 1, command_call);
            w.line(indent, "fi");
        }
        (false, true) => {
            w.line(indent, r#"if [[ "$cur" == -* ]]; then"#);
            w.line(indent + 1, flag_call);
            w.line(indent, "fi");
        }
        (true, false) => w.line(indent, command_call),
        (true, true) => w.line(indent, ":"),
    }
}

/// A call to the reply helper with every word as one single-quoted argument.
fn reply_call<'a>(reply: &str, words: impl IntoIterator<Item = &'a str>) -> String {
    let mut call = reply.to_string();
    for word in words {
        call.push(' ');
        call.push_str(&single_quote(word));
    }
    call
}
