//! api-tools: binary compatibility and API use analysis for component baselines

#![allow(clippy::struct_excessive_bools)]

use anyhow::{Context, Result};
use api_tools::{
    cli::{self, UseScanPaths},
    config::{AppConfig, Validatable},
    pipeline::exit_codes,
    reports::ReportFormat,
    search::CancelToken,
};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "api-tools")]
#[command(version)]
#[command(about = "Binary compatibility checks and API use scans for component baselines", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Success
    1  Breaking changes detected (with --fail-on-breaking)
    3  Error occurred
    4  Search cancelled

EXAMPLES:
    # Compare two baselines and fail the build on breaking changes
    api-tools compare old-platform.json new-platform.json --fail-on-breaking

    # JSON report for further processing
    api-tools compare old.json new.json -o json -O compat.json

    # Find internal API use of the core components by the ui components
    api-tools use-scan workspace.json --report-dir use-report --targets core --scope ui --internal")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `compare` subcommand
#[derive(Parser)]
struct CompareArgs {
    /// Path to the reference (old) baseline manifest
    old: PathBuf,

    /// Path to the component (new) baseline manifest
    new: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "summary")]
    output: ReportFormat,

    /// Output file path (stdout if not specified)
    #[arg(short = 'O', long)]
    output_file: Option<PathBuf>,

    /// Exit with code 1 if breaking changes are found
    #[arg(long)]
    fail_on_breaking: bool,

    /// Skip the component version checks
    #[arg(long)]
    no_check_versions: bool,

    /// Compare components in parallel
    #[arg(long)]
    parallel: bool,
}

/// Arguments for the `use-scan` subcommand
#[derive(Parser)]
struct UseScanArgs {
    /// Baseline manifest whose components are searched
    baseline: PathBuf,

    /// Directory the use report is written to
    #[arg(long)]
    report_dir: PathBuf,

    /// Components to search (comma-separated, default: all)
    #[arg(long, value_delimiter = ',')]
    scope: Vec<String>,

    /// Components whose elements are reported (comma-separated, default: all)
    #[arg(long, value_delimiter = ',')]
    targets: Vec<String>,

    /// Baseline used to resolve references instead of the searched one
    #[arg(long)]
    scope_baseline: Option<PathBuf>,

    /// Report references to API elements only
    #[arg(long, conflicts_with = "internal")]
    api: bool,

    /// Report references to internal elements only
    #[arg(long)]
    internal: bool,

    /// Also report references that violate restriction tags
    #[arg(long)]
    illegal: bool,

    /// Report references within the referencing component
    #[arg(long)]
    local: bool,

    /// Reference kinds to extract (comma-separated, e.g. extends,static-method)
    #[arg(long, value_delimiter = ',')]
    kinds: Vec<String>,

    /// File listing components never searched
    #[arg(long)]
    exclude_file: Option<PathBuf>,

    /// Search components in parallel
    #[arg(long)]
    parallel: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two baselines for binary compatibility
    Compare(CompareArgs),

    /// Search a baseline for references to API and internal elements
    UseScan(UseScanArgs),

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print the discovered config file
    Path,
    /// Generate an example .api-tools.yaml in the current directory
    Init,
    /// Print the JSON Schema of the config file format
    Schema,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(io::stderr))
        .init();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::ERROR
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let no_color = cli.no_color || std::env::var_os("NO_COLOR").is_some();

    match cli.command {
        Commands::Compare(args) => {
            let overrides = AppConfig::builder()
                .output_format(args.output)
                .output_file(args.output_file)
                .no_color(no_color)
                .fail_on_breaking(args.fail_on_breaking)
                .check_versions(!args.no_check_versions)
                .parallel(args.parallel)
                .build();
            let config = effective_config(cli.config.as_deref(), &overrides)?;
            cli::run_compare(&args.old, &args.new, &config, cli.quiet)
        }

        Commands::UseScan(args) => {
            // --api and --internal narrow the default of keeping both
            let (api, internal) = match (args.api, args.internal) {
                (true, false) => (true, false),
                (false, true) => (false, true),
                _ => (true, true),
            };
            let overrides = AppConfig::builder()
                .search_visibility(api, internal)
                .include_illegal_use(args.illegal)
                .include_local_references(args.local)
                .reference_kinds(args.kinds)
                .exclusion_file(args.exclude_file)
                .parallel(args.parallel)
                .build();
            let config = effective_config(cli.config.as_deref(), &overrides)?;
            let paths = UseScanPaths {
                baseline: args.baseline,
                scope_baseline: args.scope_baseline,
                report_dir: args.report_dir,
                sources: args.scope,
                targets: args.targets,
            };
            cli::run_use_scan(&paths, &config, &CancelToken::new(), cli.quiet)
        }

        Commands::Config { action } => {
            run_config(action, cli.config.as_deref())?;
            Ok(exit_codes::SUCCESS)
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "api-tools", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }
    }
}

/// Layer CLI values over the config file and validate the result.
fn effective_config(config_path: Option<&std::path::Path>, overrides: &AppConfig) -> Result<AppConfig> {
    let (config, loaded_from) = AppConfig::from_file_with_overrides(config_path, overrides);
    if let Some(path) = loaded_from {
        tracing::debug!("Using config file {}", path.display());
    }
    let errors = config.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("Invalid configuration:\n  {}", messages.join("\n  "));
    }
    Ok(config)
}

fn run_config(action: ConfigAction, explicit: Option<&std::path::Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let (config, loaded_from) = api_tools::config::load_or_default(explicit);
            if let Some(path) = &loaded_from {
                eprintln!("# Loaded from: {}", path.display());
            } else {
                eprintln!("# No config file found; showing defaults");
            }
            let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
            print!("{yaml}");
        }
        ConfigAction::Path => match api_tools::config::discover_config_file(explicit) {
            Some(path) => println!("{}", path.display()),
            None => eprintln!("No config file found."),
        },
        ConfigAction::Init => {
            let target = std::env::current_dir()
                .context("cannot determine current directory")?
                .join(".api-tools.yaml");
            if target.exists() {
                anyhow::bail!("{} already exists. Remove it first to re-initialize.", target.display());
            }
            std::fs::write(&target, api_tools::config::generate_example_config())
                .with_context(|| format!("failed to write {}", target.display()))?;
            eprintln!("Created {}", target.display());
        }
        ConfigAction::Schema => {
            println!("{}", api_tools::config::generate_json_schema()?);
        }
    }
    Ok(())
}
