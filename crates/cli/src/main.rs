// Registrum CLI - reconcile business-entity records collected from registries

mod exit_codes;
mod recon;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_codes::{EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "registrum")]
#[command(about = "Reconcile business-entity records from multiple registries")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Log debug detail to stderr (default level comes from RUST_LOG, else warn)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a source bundle and score every field
    #[command(after_help = "\
Examples:
  registrum run bundle.json
  registrum run bundle.json --json
  registrum run bundle.json --postcodes postcodes.csv --output result.json
  registrum run - --config aliases.toml < bundle.json")]
    Run {
        /// Path to the bundle JSON (`-` reads stdin)
        bundle: PathBuf,

        /// Alias config (defaults to the built-in ABR alias table)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Postcode reference CSV with Pcode and Locality columns
        #[arg(long, env = "REGISTRUM_POSTCODES")]
        postcodes: Option<PathBuf>,

        /// Also file unmatched keys containing "name" as Legal Name observations
        #[arg(long)]
        capture_name_keys: bool,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Validate an alias config without running
    #[command(after_help = "\
Examples:
  registrum validate aliases.toml")]
    Validate {
        /// Path to the alias .toml file
        config: PathBuf,
    },

    /// List canonical fields, their reviewer actions and configured aliases
    Fields {
        /// Alias config (defaults to the built-in ABR alias table)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Also forwards `log` records from the engine crate.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        None => {
            // No subcommand = show usage
            eprintln!("Usage: registrum <command> [options]");
            eprintln!("       registrum --help for more information");
            Err(CliError::new(EXIT_USAGE, ""))
        }
        Some(Commands::Run {
            bundle,
            config,
            postcodes,
            capture_name_keys,
            json,
            output,
        }) => recon::cmd_run(recon::RunArgs {
            bundle,
            config,
            postcodes,
            capture_name_keys,
            json,
            output,
        }),
        Some(Commands::Validate { config }) => recon::cmd_validate(config),
        Some(Commands::Fields { config }) => recon::cmd_fields(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
