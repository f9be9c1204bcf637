//! voltseq CLI - patterns, envelopes and CV routing from the command line.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "voltseq")]
#[command(author, version, about = "voltseq CV sequencer CLI", long_about = None)]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate and transform Euclidean rhythms
    Euclid(commands::euclid::EuclidArgs),

    /// Render an envelope curve
    Envelope(commands::envelope::EnvelopeArgs),

    /// Snap MIDI notes to a scale
    Quantize(commands::quantize::QuantizeArgs),

    /// List, show and export presets
    Presets(commands::presets::PresetsArgs),

    /// Check a preset for out-of-range values and broken references
    Validate(commands::validate::ValidateArgs),

    /// Run a preset offline and write channel voltages
    Simulate(commands::simulate::SimulateArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Euclid(args) => commands::euclid::run(args),
        Commands::Envelope(args) => commands::envelope::run(args),
        Commands::Quantize(args) => commands::quantize::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Simulate(args) => commands::simulate::run(args),
    }
}
