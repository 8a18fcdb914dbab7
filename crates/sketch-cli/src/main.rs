use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    generate::{self, GenerateArgs},
    version::{self, VersionArgs},
    workload::{self, WorkloadArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "sketch-cli", about = "Schedule sketch generation CLI")]
struct Cli {
    /// Raise the default log filter to `debug`; `RUST_LOG` still takes precedence.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate sketches for a tuning task and write them with a manifest.
    Generate(GenerateArgs),
    /// Write a built-in workload as a task JSON file.
    Workload(WorkloadArgs),
    /// Print the package version.
    Version(VersionArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
    match cli.command {
        Command::Generate(args) => generate::run(&args),
        Command::Workload(args) => workload::run(&args),
        Command::Version(args) => version::run(&args),
    }
}
