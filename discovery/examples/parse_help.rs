//! Parses captured help text and prints the tree and the rule trace.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p tabgen-discovery --example parse_help
//! ```

use tabgen_discovery::parser::explain_help_text;
use tabgen_discovery::tool_from_text;

fn main() {
    let help_text = r#"
Usage: mycli [OPTIONS] <COMMAND>

A fictional CLI tool for demonstration

Commands:
  init       Initialize a new project
  b, build   Build the project
  deploy     Deploy to production
  help       Print this message or the help of the given subcommand(s)

Options:
  -v, --verbose               Enable verbose output
  -c, --config <FILE>         Path to config file
  -f, --format=json|yaml      Output format
      --color {auto,always,never}  When to use colors
  -h, --help                  Print help
"#;

    let tool = tool_from_text("mycli", "/usr/local/bin/mycli", help_text, None);
    println!("Source: {}", tool.source);

    println!("\nGlobal flags ({}):", tool.global_flags.len());
    for flag in &tool.global_flags {
        let short = flag.short.as_deref().map(|s| format!("{s}, ")).unwrap_or_default();
        let arg = flag.arg.as_deref().map(|a| format!(" <{a}>")).unwrap_or_default();
        let desc = flag.description.as_deref().unwrap_or("(no description)");
        println!("  {short}{}{arg}: {desc}", flag.name);
        if !flag.argument_values.is_empty() {
            println!("      choices: {}", flag.argument_values.join(", "));
        }
    }

    println!("\nSubcommands ({}):", tool.subcommands.len());
    for cmd in &tool.subcommands {
        let desc = cmd.description.as_deref().unwrap_or("(no description)");
        if cmd.aliases.is_empty() {
            println!("  {}: {desc}", cmd.name);
        } else {
            println!("  {} ({}): {desc}", cmd.name, cmd.aliases.join(", "));
        }
    }

    println!("\nRule trace:");
    for line in explain_help_text(help_text) {
        let rules: Vec<_> = line.hits.iter().map(|h| h.rule).collect();
        println!("  {:>3} {:<10?} {:<32} {}", line.line_no, line.mode, rules.join(","), line.text);
    }
}
