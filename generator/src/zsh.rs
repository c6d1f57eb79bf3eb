//! Zsh completion scripts.
//!
//! Every command with flags or subcommands gets its own function built on
//! `_arguments -C`; subcommand names are offered with `_describe` and the
//! chosen one is dispatched through `case $line[1]`. The script registers
//! itself with `compdef` only when sourced, so an autoloaded copy on `$fpath`
//! behaves like any other completion function.

use tabgen_core::{Command, Flag, Tool};

use crate::escape::{
    escape_eval_word, escape_pattern, escape_single_quoted, escape_string, func_name,
    helper_func_name, one_line,
};
use crate::{CompletionGenerator, ScriptWriter, Shell, command_paths};

#[derive(Debug, Default, Clone, Copy)]
pub struct ZshGenerator;

impl CompletionGenerator for ZshGenerator {
    fn shell(&self) -> Shell {
        Shell::Zsh
    }

    fn generate(&self, tool: &Tool) -> String {
        let func = func_name(&tool.name);
        let name = escape_string(&tool.name);
        let mut w = ScriptWriter::new();

        let header = escape_string(&one_line(&tool.name));
        w.line(0, format!("#compdef {header}"));
        w.line(0, format!("# Zsh completion for {header}"));
        w.line(0, "# Generated by tabgen; edits are overwritten on the next run.");
        w.blank();

        command_function(&mut w, &tool.name, "", &func, &tool.global_flags, &tool.subcommands);
        for path in command_paths(&tool.subcommands) {
            if !has_function(path.command) {
                continue;
            }
            command_function(
                &mut w,
                &tool.name,
                &path.path,
                &path_func_name(&tool.name, &path.path),
                &path.command.flags,
                &path.command.subcommands,
            );
        }

        w.line(0, "if [[ $zsh_eval_context[-1] == loadautofunc ]]; then");
        w.line(1, format!("{func} \"$@\""));
        w.line(0, "else");
        w.line(1, format!("compdef {func} \"{name}\""));
        w.line(0, "fi");
        w.finish()
    }
}

fn has_function(cmd: &Command) -> bool {
    !cmd.flags.is_empty() || !cmd.subcommands.is_empty()
}

fn path_func_name(tool: &str, path: &str) -> String {
    func_name(&format!("{tool} {path}"))
}

/// Emits the completion function for the tool itself (`path` empty) or one
/// command, followed by its `_describe` helper when it has subcommands.
fn command_function(
    w: &mut ScriptWriter,
    tool: &str,
    path: &str,
    func: &str,
    flags: &[Flag],
    commands: &[Command],
) {
    let mut specs: Vec<String> = flags.iter().map(format_flag_spec).collect();
    if commands.is_empty() {
        specs.push("'*: :_default'".to_string());
    } else {
        specs.push(format!("'1: :{}'", helper_func_name(func)));
        specs.push("'*:: :->args'".to_string());
    }

    w.line(0, format!("{func}() {{"));
    w.line(1, "local context state state_descr line");
    w.line(1, "typeset -A opt_args");
    w.blank();
    w.line(1, "_arguments -C \\");
    let last = specs.len() - 1;
    for (i, spec) in specs.iter().enumerate() {
        if i == last {
            w.line(2, spec);
        } else {
            w.line(2, format!("{spec} \\"));
        }
    }

    let dispatch: Vec<&Command> = commands.iter().filter(|cmd| has_function(cmd)).collect();
    if !dispatch.is_empty() {
        w.blank();
        w.line(1, "case $state in");
        w.line(2, "args)");
        w.line(3, "case $line[1] in");
        for cmd in dispatch {
            let labels: Vec<String> = cmd.names().map(escape_pattern).collect();
            let child_path = if path.is_empty() {
                cmd.name.clone()
            } else {
                format!("{path} {}", cmd.name)
            };
            w.line(4, format!("{})", labels.join("|")));
            w.line(5, path_func_name(tool, &child_path));
            w.line(5, ";;");
        }
        w.line(3, "esac");
        w.line(3, ";;");
        w.line(1, "esac");
    }
    w.line(0, "}");
    w.blank();

    if !commands.is_empty() {
        describe_function(w, tool, path, func, commands);
    }
}

fn describe_function(
    w: &mut ScriptWriter,
    tool: &str,
    path: &str,
    func: &str,
    commands: &[Command],
) {
    let label = if path.is_empty() {
        format!("{tool} command")
    } else {
        format!("{tool} {path} command")
    };

    w.line(0, format!("{}() {{", helper_func_name(func)));
    w.line(1, "local -a commands");
    w.line(1, "commands=(");
    for cmd in commands {
        w.line(2, format!("'{}'", describe_entry(cmd)));
    }
    w.line(1, ")");
    w.line(
        1,
        format!("_describe -t commands '{}' commands", escape_single_quoted(&label)),
    );
    w.line(0, "}");
    w.blank();
}

fn describe_entry(cmd: &Command) -> String {
    let name = cmd.name.replace(':', r"\:");
    let entry = match cmd.description.as_deref().map(one_line) {
        Some(desc) if !desc.is_empty() => format!("{name}:{desc}"),
        _ => name,
    };
    escape_single_quoted(&entry)
}

/// Renders one `_arguments` spec for a flag, quoted and ready to emit.
///
/// Flags with both spellings use brace expansion with a shared exclusion
/// group: `'(-v --verbose)'{-v,--verbose}'[Be verbose]'`. When either
/// spelling needs escaping the two spellings get separate specs instead.
pub(crate) fn format_flag_spec(flag: &Flag) -> String {
    let desc = flag
        .description
        .as_deref()
        .map(one_line)
        .filter(|d| !d.is_empty())
        .map(|d| format!("[{}]", escape_single_quoted(&escape_brackets(&d))))
        .unwrap_or_default();
    let arg = format_arg_completion(flag);
    let single =
        |name: &str| format!("'{}{desc}{arg}'", escape_single_quoted(&escape_option_name(name)));

    match flag.short.as_deref() {
        Some(short) if is_plain_option(short) && is_plain_option(&flag.name) => format!(
            "'({short} {long})'{{{short},{long}}}'{desc}{arg}'",
            long = flag.name,
        ),
        Some(short) => format!("{} {}", single(short), single(&flag.name)),
        None => single(&flag.name),
    }
}

/// The `:message:action` part of a flag spec; empty for flags that take no
/// argument. Choices without a placeholder name use `value`.
pub(crate) fn format_arg_completion(flag: &Flag) -> String {
    let message = flag
        .arg
        .as_deref()
        .filter(|arg| !arg.is_empty())
        .unwrap_or("value");
    let message = escape_single_quoted(&message.replace(':', r"\:"));

    if flag.has_choices() {
        // _arguments evals the choice list.
        let values: Vec<String> = flag
            .argument_values
            .iter()
            .map(|v| escape_single_quoted(&escape_eval_word(v)))
            .collect();
        format!(":{message}:({})", values.join(" "))
    } else if flag.arg.as_deref().is_some_and(|arg| !arg.is_empty()) {
        format!(":{message}:")
    } else {
        String::new()
    }
}

fn escape_brackets(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '[' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escapes the characters `_arguments` treats as spec syntax in an option
/// name.
fn escape_option_name(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '[' | ']' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Names that can go unquoted into `(a b){a,b}` without any escaping.
fn is_plain_option(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || "-_.".contains(c))
}
