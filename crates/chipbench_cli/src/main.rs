//! chipbench CLI: build the design, run a test entrypoint, report the verdict.
//!
//! Provides `chipbench run` to build and run one test, `chipbench sources`
//! to print the resolved compile list, and `chipbench list` to show the
//! registered test entrypoints.

#![warn(missing_docs)]

mod list;
mod pipeline;
mod run;
mod sources;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// chipbench: build the chip-top design and run its testbenches.
#[derive(Parser, Debug)]
#[command(name = "chipbench", version, about = "Chip-top verification harness")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `chipbench.toml` file or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the design and run one test entrypoint.
    Run(RunArgs),
    /// Print the resolved source files, defines, and includes.
    Sources(SourcesArgs),
    /// List the registered test entrypoints.
    List,
}

/// Arguments for `chipbench run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Simulate the gate-level netlist instead of the RTL.
    #[arg(long)]
    pub gl: bool,

    /// Test entrypoint to run (default: `scenario.test`).
    #[arg(short, long)]
    pub test: Option<String>,

    /// Extra `+key=value` arguments passed to the test.
    #[arg(long = "plusarg", value_name = "+KEY=VALUE", allow_hyphen_values = true)]
    pub plusargs: Vec<String>,

    /// Report format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for `chipbench sources`.
#[derive(Parser, Debug)]
pub struct SourcesArgs {
    /// Resolve the gate-level source set.
    #[arg(long)]
    pub gl: bool,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Color when stderr is a terminal.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Run report format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON on stdout.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Run(ref args) => run::run(args, &global),
        Command::Sources(ref args) => sources::run(args, &global),
        Command::List => list::run(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Level used when `RUST_LOG` is unset.
fn default_filter(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "info"
    }
}

fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(global)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(global.color)
        .with_writer(std::io::stderr)
        .init();
}
