//! Euclidean rhythm command.

use clap::{Args, ValueEnum};
use serde::Serialize;
use voltseq_core::euclid;

use super::common::{OutputFormat, pattern_string};

/// Pattern transforms, applied in the order given.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Transform {
    Reverse,
    Invert,
    Double,
    Halve,
}

#[derive(Args)]
pub struct EuclidArgs {
    /// Pattern length
    steps: usize,

    /// Number of onsets (clamped to 0..=steps)
    pulses: i32,

    /// Left rotation in steps
    #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
    rotation: i32,

    /// Accent the first and every n-th onset after it
    #[arg(long, default_value = "0")]
    accent_every: usize,

    /// Velocity of accented onsets
    #[arg(long, default_value = "1.0")]
    accent_velocity: f32,

    /// Velocity of the other onsets
    #[arg(long, default_value = "0.8")]
    base_velocity: f32,

    /// Transform to apply (repeatable)
    #[arg(short, long = "transform", value_enum)]
    transforms: Vec<Transform>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Serialize)]
struct StepRow {
    step: usize,
    on: bool,
    velocity: Option<f32>,
}

/// Apply transforms left to right.
fn apply(mut pattern: Vec<bool>, transforms: &[Transform]) -> Vec<bool> {
    for t in transforms {
        pattern = match t {
            Transform::Reverse => euclid::reverse(&pattern),
            Transform::Invert => euclid::invert(&pattern),
            Transform::Double => euclid::double(&pattern),
            Transform::Halve => euclid::halve(&pattern),
        };
    }
    pattern
}

pub fn run(args: EuclidArgs) -> anyhow::Result<()> {
    let pattern = apply(
        euclid::generate(args.steps, args.pulses, args.rotation),
        &args.transforms,
    );
    let velocities = euclid::accent(
        &pattern,
        args.accent_every,
        args.accent_velocity,
        args.base_velocity,
    );

    match args.format {
        OutputFormat::Table => {
            println!("{}", pattern_string(&pattern));
            println!(
                "{} steps, {} onsets",
                pattern.len(),
                euclid::pulse_count(&pattern)
            );
            if args.accent_every > 0 {
                let line: Vec<String> = velocities
                    .iter()
                    .map(|v| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}")))
                    .collect();
                println!("velocities: {}", line.join(" "));
            }
        }
        OutputFormat::Csv => {
            println!("step,on,velocity");
            for (step, v) in velocities.iter().enumerate() {
                let vel = v.map(|v| v.to_string()).unwrap_or_default();
                println!("{step},{},{vel}", u8::from(v.is_some()));
            }
        }
        OutputFormat::Json => {
            let rows: Vec<StepRow> = velocities
                .iter()
                .enumerate()
                .map(|(step, &velocity)| StepRow {
                    step,
                    on: velocity.is_some(),
                    velocity,
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transforms_apply_in_order() {
        let base = euclid::generate(8, 3, 0);
        assert_eq!(apply(base.clone(), &[Transform::Double, Transform::Halve]), base);
        assert_eq!(
            pattern_string(&apply(base, &[Transform::Invert])),
            ".xx.xx.x"
        );
    }
}
