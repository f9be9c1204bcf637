//! Scale quantization command.

use clap::Args;
use serde::Serialize;
use voltseq_core::{Scale, ScaleQuantizer, note_to_volts};

use super::common::{CliScale, OutputFormat, note_name, parse_note};

#[derive(Args)]
pub struct QuantizeArgs {
    /// Notes to quantize, as MIDI numbers or names (C4 = 60)
    #[arg(required = true, value_parser = parse_note)]
    notes: Vec<u8>,

    /// Scale to snap to
    #[arg(short, long, value_enum, default_value_t)]
    scale: CliScale,

    /// Custom scale as comma-separated semitone intervals (overrides --scale)
    #[arg(short, long, value_delimiter = ',')]
    intervals: Option<Vec<u8>>,

    /// Root note
    #[arg(long, default_value = "C4", value_parser = parse_note)]
    root: u8,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
}

#[derive(Serialize)]
struct Row {
    input: u8,
    output: u8,
    name: String,
    volts: f32,
}

pub fn run(args: QuantizeArgs) -> anyhow::Result<()> {
    let quantizer = match &args.intervals {
        Some(intervals) => ScaleQuantizer::from_intervals(intervals),
        None => ScaleQuantizer::new(Scale::from(args.scale)),
    };
    tracing::debug!(intervals = ?quantizer.intervals(), root = args.root, "quantizing");

    let rows: Vec<Row> = args
        .notes
        .iter()
        .map(|&input| {
            let output = quantizer.quantize(input, args.root);
            Row {
                input,
                output,
                name: note_name(output),
                volts: note_to_volts(output),
            }
        })
        .collect();

    match args.format {
        OutputFormat::Table => {
            println!("{:>5}  {:>6}  {:>5}  {:>8}", "in", "out", "name", "volts");
            for r in &rows {
                println!("{:>5}  {:>6}  {:>5}  {:>+8.4}", r.input, r.output, r.name, r.volts);
            }
        }
        OutputFormat::Csv => {
            println!("input,output,name,volts");
            for r in &rows {
                println!("{},{},{},{}", r.input, r.output, r.name, r.volts);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
    }
    Ok(())
}
