//! Offline simulation command.

use anyhow::Context;
use clap::Args;
use std::fmt::Write as _;
use std::path::PathBuf;
use voltseq_config::{Frame, render, validate_preset};

use super::common::{OutputFormat, load_preset};

#[derive(Args)]
pub struct SimulateArgs {
    /// Preset name or path
    preset: String,

    /// Length to simulate in milliseconds (default: one cycle of the longest lane)
    #[arg(short, long)]
    duration_ms: Option<f64>,

    /// Emit every n-th tick only
    #[arg(short, long, default_value = "1")]
    every: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run even if the preset fails validation
    #[arg(long)]
    force: bool,
}

fn csv(frames: &[Frame]) -> String {
    let mut out = String::from("time_ms");
    if let Some(first) = frames.first() {
        for v in &first.voltages {
            let _ = write!(out, ",ch{}_{}", v.channel, v.output_type.name());
        }
    }
    out.push('\n');
    for frame in frames {
        let _ = write!(out, "{}", frame.time_ms);
        for v in &frame.voltages {
            let _ = write!(out, ",{}", v.volts);
        }
        out.push('\n');
    }
    out
}

fn table(frames: &[Frame]) -> String {
    let mut out = String::new();
    if let Some(first) = frames.first() {
        let _ = write!(out, "{:>10}", "ms");
        for v in &first.voltages {
            let _ = write!(out, "  {:>12}", format!("{}:{}", v.channel, v.output_type.name()));
        }
        out.push('\n');
    }
    for frame in frames {
        let _ = write!(out, "{:>10.2}", frame.time_ms);
        for v in &frame.voltages {
            let _ = write!(out, "  {:>+12.4}", v.volts);
        }
        out.push('\n');
    }
    out
}

pub fn run(args: SimulateArgs) -> anyhow::Result<()> {
    let preset = load_preset(&args.preset)?;
    if let Err(e) = validate_preset(&preset) {
        if args.force {
            tracing::warn!("preset '{}' failed validation: {e}", preset.name);
        } else {
            return Err(e).with_context(|| {
                format!("preset '{}' failed validation (use --force to run anyway)", preset.name)
            });
        }
    }

    let duration_ms = args.duration_ms.unwrap_or_else(|| {
        let cycle = preset.cycle_steps() as f64 * preset.step_ms();
        if cycle > 0.0 { cycle } else { 1000.0 }
    });
    let frames: Vec<Frame> = render(&preset, duration_ms)?
        .into_iter()
        .step_by(args.every.max(1))
        .collect();
    tracing::info!(
        preset = %preset.name,
        duration_ms,
        frames = frames.len(),
        "simulation finished"
    );

    let text = match args.format {
        OutputFormat::Csv => csv(&frames),
        OutputFormat::Json => serde_json::to_string_pretty(&frames)? + "\n",
        OutputFormat::Table => table(&frames),
    };

    match args.output {
        Some(path) => std::fs::write(&path, text)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}
