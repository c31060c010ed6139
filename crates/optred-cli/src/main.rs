mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "optred", about = "Bias and flat field calibration for CCD frames")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show FITS header summary and pixel statistics
    Info(commands::info::InfoArgs),
    /// Sort frames into bias, dark, flat and object
    Classify(commands::classify::ClassifyArgs),
    /// Combine frames into a master bias or master flat
    Combine(commands::combine::CombineArgs),
    /// Bias subtract and flat field science frames
    Correct(commands::correct::CorrectArgs),
    /// Run the full reduction
    Run(commands::pipeline::RunArgs),
    /// Print or save the default reduction config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Classify(args) => commands::classify::run(args),
        Commands::Combine(args) => commands::combine::run(args),
        Commands::Correct(args) => commands::correct::run(args),
        Commands::Run(args) => commands::pipeline::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
