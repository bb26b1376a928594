//! sdvgen CLI - ARXML service interfaces to Franca IDL and Android bridges
//!
//! Commands:
//! - `sdvgen convert` - Generate Franca FIDL and FDEPL files
//! - `sdvgen generate` - Generate the JNI bridge, Java classes, and AIDL
//! - `sdvgen check` - Build interface models and report errors
//! - `sdvgen dump` - Print resolved interface models as JSON

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod document;

use commands::Inputs;
use config::Config;

#[derive(Parser)]
#[command(name = "sdvgen")]
#[command(author, version, about = "ARXML to Franca IDL and JNI/AIDL bridge generator", long_about = None)]
struct Cli {
    /// Path to sdvgen.toml (default: ./sdvgen.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Input ARXML file(s)
    #[arg(required = true)]
    arxml: Vec<PathBuf>,

    /// ARXML holding the SOME/IP deployment (default: each input file)
    #[arg(short, long)]
    deployment: Option<PathBuf>,

    /// Package of the generated interfaces, overriding the ARXML namespace
    #[arg(short = 'P', long)]
    package: Option<String>,
}

impl From<InputArgs> for Inputs {
    fn from(args: InputArgs) -> Self {
        Self {
            arxml: args.arxml,
            deployment: args.deployment,
            package: args.package,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert ARXML to Franca FIDL and FDEPL
    Convert {
        #[command(flatten)]
        inputs: InputArgs,

        /// Output directory (default: outputs)
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,
    },

    /// Generate the JNI bridge, Java classes, and AIDL files
    Generate {
        #[command(flatten)]
        inputs: InputArgs,

        /// Package of the generated Java classes
        #[arg(short, long)]
        java_package: Option<String>,

        /// Output directory (default: outputs)
        #[arg(short = 'O', long)]
        output: Option<PathBuf>,
    },

    /// Build interface models and report errors without writing files
    Check {
        #[command(flatten)]
        inputs: InputArgs,
    },

    /// Print resolved interface models as JSON
    Dump {
        #[command(flatten)]
        inputs: InputArgs,
    },
}

fn init_tracing(verbose: bool, level: &str) {
    let fallback = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::discover(cli.config.as_deref(), Path::new("."))?;
    init_tracing(cli.verbose, &config.output.log_level);

    match cli.command {
        Commands::Convert { inputs, output } => {
            commands::convert(&config, &inputs.into(), output.as_deref())?;
        }
        Commands::Generate {
            inputs,
            java_package,
            output,
        } => {
            commands::generate(&config, &inputs.into(), java_package.as_deref(), output.as_deref())?;
        }
        Commands::Check { inputs } => {
            commands::check(&config, &inputs.into())?;
        }
        Commands::Dump { inputs } => {
            commands::dump(&config, &inputs.into())?;
        }
    }

    Ok(())
}
