use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tabgen_core::{Tool, validate_tool};
use tabgen_db::{CatalogEntry, CatalogStore, FileStore, TabgenConfig};
use tabgen_discovery::parser::explain_help_text;
use tabgen_discovery::{SystemRunner, tool_from_text};
use tabgen_generator::{Limits, Shell, generate_with_limits};
use tabgen_pipeline::{OutcomeStatus, Pipeline, PipelineOptions, PipelineSummary};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliShell {
    Bash,
    Zsh,
}

impl From<CliShell> for Shell {
    fn from(shell: CliShell) -> Self {
        match shell {
            CliShell::Bash => Shell::Bash,
            CliShell::Zsh => Shell::Zsh,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "tabgen", version)]
#[command(about = "Generate bash and zsh completions from --help and man output")]
struct Cli {
    /// Log debug output to stderr (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract catalog tools and write completion scripts for changed ones.
    Generate(GenerateArgs),
    /// Parse captured help (and man) text without executing anything.
    Parse(ParseArgs),
    /// Render a completion script from a saved tool file.
    Script(ScriptArgs),
}

#[derive(Debug, Args)]
struct GenerateArgs {
    /// Catalog tool names, or executable paths to add to the catalog first.
    /// Every catalog tool is processed when none are given.
    tools: Vec<String>,
    /// Catalog directory (defaults to the configured base dir or ~/.tabgen).
    #[arg(long)]
    catalog_dir: Option<PathBuf>,
    /// YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Regenerate even when version and fingerprint are unchanged.
    #[arg(long)]
    force: bool,
    /// Worker threads (0 = one per CPU).
    #[arg(long)]
    workers: Option<usize>,
    /// Skip man pages and subcommand exploration.
    #[arg(long)]
    quick: bool,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Tool name recorded in the output.
    #[arg(long)]
    name: String,
    /// File holding captured help output.
    #[arg(long)]
    input: PathBuf,
    /// File holding rendered man page output.
    #[arg(long)]
    man: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "json")]
    format: CliOutputFormat,
    /// Print the rule trace for every help line instead of the tool.
    #[arg(long)]
    explain: bool,
}

#[derive(Debug, Args)]
struct ScriptArgs {
    #[arg(long, value_enum)]
    shell: CliShell,
    /// Tool JSON file as written under `tools/`.
    #[arg(long)]
    input: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Parse(args) => run_parse(args),
        Command::Script(args) => run_script(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_generate(args: GenerateArgs) -> Result<(), String> {
    let config = match &args.config {
        Some(path) => TabgenConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => TabgenConfig::default(),
    };

    let base_dir = args
        .catalog_dir
        .clone()
        .or_else(|| config.base_dir())
        .ok_or_else(|| "No catalog directory: pass --catalog-dir or set HOME".to_string())?;
    let store = FileStore::open(&base_dir)
        .map_err(|err| format!("Failed to open catalog '{}': {err}", base_dir.display()))?;

    let names = register_paths(&store, &args.tools)?;

    let mut extract = config.extraction.clone();
    if args.quick {
        extract = extract.quick();
    }
    let options = PipelineOptions {
        workers: args.workers.unwrap_or(config.generation.workers),
        force: args.force || config.generation.force,
        extract,
        limits: Limits::default(),
    };

    let runner = SystemRunner;
    let summary = Pipeline::new(&runner, &store, options)
        .run(&names)
        .map_err(|err| err.to_string())?;

    print_summary(&summary);
    println!("\nBash completions: {}", store.completion_dir(Shell::Bash).display());
    println!("Zsh completions:  {}", store.completion_dir(Shell::Zsh).display());
    Ok(())
}

/// Adds arguments that look like paths to the catalog and returns the tool
/// names to process.
fn register_paths(store: &FileStore, tools: &[String]) -> Result<Vec<String>, String> {
    if !tools.iter().any(|tool| tool.contains('/')) {
        return Ok(tools.to_vec());
    }

    let mut catalog = store
        .load_catalog()
        .map_err(|err| format!("Failed to load catalog: {err}"))?;
    let mut names = Vec::with_capacity(tools.len());
    for tool in tools {
        if !tool.contains('/') {
            names.push(tool.clone());
            continue;
        }
        let name = Path::new(tool)
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| format!("Cannot derive a tool name from '{tool}'"))?
            .to_string();
        match catalog.entry_mut(&name) {
            Some(entry) => entry.path = tool.clone(),
            None => catalog.insert(CatalogEntry::new(&name, tool)),
        }
        names.push(name);
    }

    store
        .save_catalog(&catalog)
        .map_err(|err| format!("Failed to save catalog: {err}"))?;
    Ok(names)
}

fn print_summary(summary: &PipelineSummary) {
    println!(
        "Generated: {}  Skipped: {}  Failed: {}",
        summary.generated, summary.skipped, summary.failed
    );
    for outcome in &summary.outcomes {
        if outcome.status == OutcomeStatus::Skipped {
            println!("  {:<24} {}", outcome.name, outcome.status);
        } else {
            println!("  {:<24} {} ({})", outcome.name, outcome.status, outcome.reason);
        }
        for warning in &outcome.warnings {
            println!("      warning: {warning}");
        }
    }

    if summary.failed > 0 {
        eprintln!("\nFailures:");
        for outcome in summary.outcomes.iter().filter(|o| o.status == OutcomeStatus::Failed) {
            eprintln!("  {}: {}", outcome.name, outcome.reason);
        }
    }
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let help = fs::read_to_string(&args.input)
        .map_err(|err| format!("Failed to read '{}': {err}", args.input.display()))?;

    if args.explain {
        for line in explain_help_text(&help) {
            let rules: Vec<&str> = line.hits.iter().map(|hit| hit.rule).collect();
            let rules = if rules.is_empty() { "-".to_string() } else { rules.join(",") };
            println!("{:>4} {:<10} {:<28} {}", line.line_no, format!("{:?}", line.mode), rules, line.text);
        }
        return Ok(());
    }

    let man = match &args.man {
        Some(path) => Some(
            fs::read_to_string(path)
                .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?,
        ),
        None => None,
    };

    let tool = tool_from_text(&args.name, "", &help, man.as_deref());
    let rendered = match args.format {
        CliOutputFormat::Json => serde_json::to_string_pretty(&tool)
            .map_err(|err| format!("Failed to serialize tool: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(&tool)
            .map_err(|err| format!("Failed to serialize tool: {err}"))?,
    };
    println!("{rendered}");
    Ok(())
}

fn run_script(args: ScriptArgs) -> Result<(), String> {
    let file = fs::File::open(&args.input)
        .map_err(|err| format!("Failed to open '{}': {err}", args.input.display()))?;
    let tool: Tool = serde_json::from_reader(BufReader::new(file))
        .map_err(|err| format!("Failed to parse '{}': {err}", args.input.display()))?;

    let problems = validate_tool(&tool);
    if !problems.is_empty() {
        let problems: Vec<String> = problems.iter().map(|p| p.to_string()).collect();
        return Err(format!("Invalid tool file '{}': {}", args.input.display(), problems.join("; ")));
    }

    let result = generate_with_limits(&tool, args.shell.into(), &Limits::default());
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    print!("{}", result.script);
    Ok(())
}
