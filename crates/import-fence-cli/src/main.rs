//! import-fence CLI tool.
//!
//! Usage:
//! ```bash
//! import-fence check [OPTIONS] [TARGET]...
//! import-fence explain <PACKAGE>
//! import-fence init [DIR]
//! ```
//!
//! Exit codes: 0 = no violations, 1 = violations found, 2 = configuration or
//! inspection error.

use clap::{Parser, Subcommand};
use import_fence_core::{ConfigError, ExitStatus};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Import-boundary checker: keeps packages free of disallowed dependencies
#[derive(Parser)]
#[command(name = "import-fence")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the import graphs of root packages against directory rules
    Check(commands::check::CheckArgs),

    /// Show the effective rule set of a package
    Explain {
        /// Package path relative to the repository root
        package: String,

        /// Repository root
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Name of the per-directory rule file
        #[arg(long)]
        rule_file: Option<String>,
    },

    /// Write a rule declaration template
    Init {
        /// Directory to write the rule file into
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Overwrite an existing rule file
        #[arg(long)]
        force: bool,
    },
}

/// Output format for check results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-finding compact format.
    Compact,
}

impl From<OutputFormat> for import_fence_core::Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Self::Text,
            OutputFormat::Json => Self::Json,
            OutputFormat::Compact => Self::Compact,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Check(args) => commands::check::run(&args, config),
        Commands::Explain {
            package,
            root,
            rule_file,
        } => commands::explain::run(&package, &root, rule_file, config),
        Commands::Init { dir, force } => commands::init::run(&dir, force),
    };

    match result {
        Ok(status) => ExitCode::from(status.code()),
        Err(err) => {
            report_error(err);
            ExitCode::from(ExitStatus::Error.code())
        }
    }
}

/// Prints `err` to stderr; rule file errors get a source snippet.
fn report_error(err: anyhow::Error) {
    match err.downcast::<ConfigError>() {
        Ok(config_err) => eprintln!("{:?}", miette::Report::new(config_err)),
        Err(other) => eprintln!("error: {other:#}"),
    }
}
