use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use lint_todo_core::run_formatter;
use lint_todo_domain::TodoLedger;
use lint_todo_ledger::FileLedger;
use lint_todo_types::{ENGINE_STYLELINT, LintResult};

mod settings;

use settings::{Invocation, Settings};

#[derive(Parser)]
#[command(name = "lint-todo")]
#[command(about = "Todo-aware post-processing for stylelint results", long_about = None)]
struct Cli {
    /// Enable verbose (info-level) logging to stderr.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Enable debug-level logging to stderr.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile stylelint JSON results with the todo ledger and print a report.
    Format(FormatArgs),

    /// Print the effective todo decay configuration.
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
struct FormatArgs {
    /// Stylelint JSON results; `-` or omitted reads stdin.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Directory holding the ledger and its configuration.
    ///
    /// Defaults to STYLELINT_TODO_DIR, else the current directory.
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Remove todos that no longer reproduce, even on CI.
    #[arg(long)]
    fix: bool,

    /// Alternate output format (sarif, json, compact, unix, github).
    ///
    /// Overrides FORMAT_TODO_AS.
    #[arg(long)]
    format: Option<String>,
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Directory holding the todo configuration.
    #[arg(long)]
    base_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ConfigFormat::Toml)]
    format: ConfigFormat,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ConfigFormat {
    Toml,
    Json,
}

fn main() -> std::process::ExitCode {
    match run_with_args(std::env::args_os()) {
        Ok(code) => std::process::ExitCode::from(code as u8),
        Err(err) => {
            eprintln!("{err:?}");
            std::process::ExitCode::from(1)
        }
    }
}

fn run_with_args<I, T>(args: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    init_logging(cli.verbose, cli.debug);

    match cli.command {
        Commands::Format(args) => cmd_format(args),
        Commands::Config(args) => {
            cmd_config(args)?;
            Ok(0)
        }
    }
}

/// Initialize tracing/logging based on CLI flags.
fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    debug!("Logging initialized at level: {}", level);
}

fn resolve_settings(invocation: Invocation) -> Result<Settings> {
    Settings::resolve(|name| std::env::var(name).ok(), invocation)
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("resolve current directory")
}

/// Columns of the attached terminal, when the size can be queried.
fn terminal_columns() -> Option<usize> {
    match crossterm::terminal::size() {
        Ok((width, _)) if width > 0 => Some(usize::from(width)),
        Ok(_) => None,
        Err(err) => {
            debug!("Terminal size unavailable: {}", err);
            None
        }
    }
}

fn cmd_format(args: FormatArgs) -> Result<i32> {
    let stdout_is_tty = io::stdout().is_terminal();
    let settings = resolve_settings(Invocation {
        fix: args.fix,
        format: args.format,
        base_dir: args.base_dir,
        cwd: current_dir()?,
        stdout_is_tty,
        terminal_columns: if stdout_is_tty { terminal_columns() } else { None },
    })?;

    let results = if settings.compact_only {
        Vec::new()
    } else {
        read_results(args.input.as_ref())?
    };
    info!(
        "Formatting {} results against '{}'",
        results.len(),
        settings.base_dir.display()
    );

    let mut ledger = FileLedger::open(&settings.base_dir);
    let run = run_formatter(
        results,
        &mut ledger,
        &settings.formatter_options(),
        |path| std::fs::read_to_string(path).ok(),
    )?;

    debug!("Todo tally: {:?}", run.tally);
    print!("{}", run.output);

    Ok(if run.errored { 2 } else { 0 })
}

fn read_results(input: Option<&PathBuf>) -> Result<Vec<LintResult>> {
    let text = match input.filter(|p| p.as_os_str() != "-") {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read results {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("read results from stdin")?;
            buf
        }
    };

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&text).context("parse stylelint results")
}

fn cmd_config(args: ConfigArgs) -> Result<()> {
    let settings = resolve_settings(Invocation {
        base_dir: args.base_dir,
        cwd: current_dir()?,
        ..Invocation::default()
    })?;

    let ledger = FileLedger::open(&settings.base_dir);
    let validation = ledger.validate_config();
    if !validation.is_valid {
        bail!("{}", validation.message.unwrap_or_default());
    }
    let config = ledger.todo_config(ENGINE_STYLELINT, &settings.decay_overrides)?;

    match args.format {
        ConfigFormat::Toml => {
            let s = toml::to_string_pretty(&config).context("render toml")?;
            print!("{s}");
        }
        ConfigFormat::Json => {
            let s = serde_json::to_string_pretty(&config).context("render json")?;
            println!("{s}");
        }
    }

    Ok(())
}
