//! Preset validation command.

use clap::Args;
use voltseq_config::{ValidationError, validate_preset};

use super::common::load_preset;

#[derive(Args)]
pub struct ValidateArgs {
    /// Preset names or paths
    #[arg(required = true)]
    presets: Vec<String>,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let mut failed = 0usize;

    for name in &args.presets {
        let preset = load_preset(name)?;
        match validate_preset(&preset) {
            Ok(()) => println!("{name}: ok"),
            Err(ValidationError::Multiple(errors)) => {
                failed += 1;
                println!("{name}: {} problems", errors.len());
                for e in errors {
                    println!("  - {e}");
                }
            }
            Err(e) => {
                failed += 1;
                println!("{name}: 1 problem");
                println!("  - {e}");
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} presets failed validation", args.presets.len());
    }
    Ok(())
}
