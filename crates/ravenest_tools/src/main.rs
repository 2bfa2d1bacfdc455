//! Ravenest - Development Tools

use std::io;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ravenest_tools::check::{self, CheckArgs};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "ravenest-tools")]
#[command(about = "Development tools for Ravenest")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate content config files and the images directory
    CheckConfigs(CheckArgs),
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose {
        "warn,ravenest_core=debug,ravenest_tools=debug"
    } else {
        "warn"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let Commands::CheckConfigs(args) = cli.command;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(env_filter(args.verbose))
        .init();

    let stdout = io::stdout();
    let stderr = io::stderr();
    match check::execute(&args, &mut stdout.lock(), &mut stderr.lock()) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(_) => {
            tracing::info!("Config check failed");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!("Config check could not run: {e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
