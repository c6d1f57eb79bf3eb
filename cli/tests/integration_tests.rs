use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const HELP: &str = "\
Usage: mycli [OPTIONS] <COMMAND>

Commands:
  init       Initialize a project
  b, build   Build the project

Options:
  -v, --verbose            Enable verbose output
  -f, --format=json|yaml   Output format
";

const MAN: &str = "\
OPTIONS
       --color
              colorize the output

SEE ALSO
       mycli-init(1)
";

fn tabgen(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tabgen"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run tabgen")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("failed to write test file");
    path
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

#[test]
fn test_parse_prints_tool_json() {
    let dir = TempDir::new().unwrap();
    let help = write(&dir, "help.txt", HELP);

    let output = tabgen(&["parse", "--name", "mycli", "--input", s(&help)]);
    assert!(output.status.success(), "{}", stderr(&output));

    let tool: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(tool["name"], "mycli");
    assert_eq!(tool["source"], "help");
    assert_eq!(tool["subcommands"].as_array().unwrap().len(), 2);
    assert_eq!(tool["subcommands"][1]["aliases"][0], "b");
    assert_eq!(tool["global_flags"][1]["argument_values"][1], "yaml");
}

#[test]
fn test_parse_merges_man_page_as_yaml() {
    let dir = TempDir::new().unwrap();
    let help = write(&dir, "help.txt", HELP);
    let man = write(&dir, "man.txt", MAN);

    let output = tabgen(&[
        "parse", "--name", "mycli", "--input", s(&help), "--man", s(&man), "--format", "yaml",
    ]);
    assert!(output.status.success(), "{}", stderr(&output));

    let text = stdout(&output);
    assert!(text.contains("source: both"), "{text}");
    assert!(text.contains("--color"), "{text}");
}

#[test]
fn test_parse_explain_shows_rules() {
    let dir = TempDir::new().unwrap();
    let help = write(&dir, "help.txt", HELP);

    let output = tabgen(&["parse", "--name", "mycli", "--input", s(&help), "--explain"]);
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("commands-header"), "{text}");
    assert!(text.contains("section-flag"), "{text}");
}

#[test]
fn test_parse_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.txt");

    let output = tabgen(&["parse", "--name", "mycli", "--input", s(&missing)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error: Failed to read"));
}

// ---------------------------------------------------------------------------
// script
// ---------------------------------------------------------------------------

fn parsed_tool_file(dir: &TempDir) -> PathBuf {
    let help = write(dir, "help.txt", HELP);
    let output = tabgen(&["parse", "--name", "mycli", "--input", s(&help)]);
    assert!(output.status.success(), "{}", stderr(&output));
    write(dir, "mycli.json", &stdout(&output))
}

#[test]
fn test_script_renders_bash_and_zsh() {
    let dir = TempDir::new().unwrap();
    let tool = parsed_tool_file(&dir);

    let bash = tabgen(&["script", "--shell", "bash", "--input", s(&tool)]);
    assert!(bash.status.success(), "{}", stderr(&bash));
    let text = stdout(&bash);
    assert!(text.starts_with("# Bash completion for mycli"));
    assert!(text.contains("complete -o default -o bashdefault -F _tabgen_mycli \"mycli\""));

    let zsh = tabgen(&["script", "--shell", "zsh", "--input", s(&tool)]);
    assert!(zsh.status.success(), "{}", stderr(&zsh));
    let text = stdout(&zsh);
    assert!(text.starts_with("#compdef mycli"));
    assert!(text.contains("(json yaml)"), "{text}");
}

#[test]
fn test_script_rejects_invalid_tool_file() {
    let dir = TempDir::new().unwrap();
    let tool = write(
        &dir,
        "bad.json",
        r#"{"name":"bad","path":"","parsed_at":"2024-01-01T00:00:00Z","global_flags":[{"name":"verbose"}]}"#,
    );

    let output = tabgen(&["script", "--shell", "bash", "--input", s(&tool)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid tool file"), "{}", stderr(&output));
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

#[test]
fn test_generate_unknown_tool_fails() {
    let dir = TempDir::new().unwrap();
    let catalog = dir.path().join("catalog");

    let output = tabgen(&["generate", "nope", "--catalog-dir", s(&catalog)]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("not in the catalog"), "{}", stderr(&output));
}

#[test]
fn test_generate_empty_catalog_reports_nothing() {
    let dir = TempDir::new().unwrap();
    let catalog = dir.path().join("catalog");

    let output = tabgen(&["generate", "--catalog-dir", s(&catalog)]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Generated: 0  Skipped: 0  Failed: 0"));
    assert!(catalog.join("completions").join("bash").is_dir());
}

#[test]
fn test_generate_rejects_bad_config() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "tabgen.yml", "extraction:\n  max_depth: 20\n");

    let output = tabgen(&[
        "generate",
        "--catalog-dir",
        s(&dir.path().join("catalog")),
        "--config",
        s(&config),
    ]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to load config"), "{}", stderr(&output));
}

#[cfg(unix)]
#[test]
fn test_generate_from_executable_path_then_skip() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let script = format!(
        "#!/bin/sh\ncase \"$1\" in\n  --version) echo 'mycli 1.2.0' ;;\n  --help) cat <<'EOF'\n{HELP}EOF\n  ;;\n  *) exit 1 ;;\nesac\n"
    );
    let exe = write(&dir, "mycli", &script);
    fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
    let catalog = dir.path().join("catalog");

    let first = tabgen(&["generate", s(&exe), "--catalog-dir", s(&catalog), "--quick"]);
    assert!(first.status.success(), "{}", stderr(&first));
    let text = stdout(&first);
    assert!(text.contains("Generated: 1"), "{text}");
    assert!(text.contains("first generation"), "{text}");

    let bash = fs::read_to_string(catalog.join("completions/bash/mycli")).unwrap();
    assert!(bash.contains("__tabgen_mycli 'init' 'build'\n"), "{bash}");
    assert!(bash.contains(r#"":b") cmd_path="build""#), "{bash}");
    assert!(catalog.join("completions/zsh/_mycli").is_file());
    assert!(catalog.join("tools/mycli.json").is_file());
    assert!(!catalog.join("tools/mycli.json.tmp").exists());

    let second = tabgen(&["generate", "mycli", "--catalog-dir", s(&catalog), "--quick"]);
    assert!(second.status.success(), "{}", stderr(&second));
    assert!(stdout(&second).contains("Skipped: 1"), "{}", stdout(&second));
}
