//! Envelope rendering command.

use clap::{Args, ValueEnum};
use voltseq_core::{Envelope, EnvelopePoint, EnvelopeVoice, LoopPoint, RetriggerMode};
use voltseq_routing::TrackId;

use super::common::{CliCurve, OutputFormat, load_preset};

/// Loop points for CLI
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CliLoop {
    Sustain,
    Release,
    Decay,
}

impl From<CliLoop> for LoopPoint {
    fn from(l: CliLoop) -> Self {
        match l {
            CliLoop::Sustain => LoopPoint::Sustain,
            CliLoop::Release => LoopPoint::Release,
            CliLoop::Decay => LoopPoint::Decay,
        }
    }
}

#[derive(Args)]
pub struct EnvelopeArgs {
    /// Take the envelope from this preset instead of the flags below
    #[arg(long)]
    preset: Option<String>,

    /// Track id within the preset (default: first track)
    #[arg(long, requires = "preset")]
    track: Option<u32>,

    /// Attack time in milliseconds
    #[arg(short, long, default_value = "10")]
    attack: f32,

    /// Decay time in milliseconds
    #[arg(short, long, default_value = "100")]
    decay: f32,

    /// Sustain level (0-1)
    #[arg(short, long, default_value = "0.7")]
    sustain: f32,

    /// Release time in milliseconds
    #[arg(short, long, default_value = "200")]
    release: f32,

    /// Peak level (0-1)
    #[arg(long, default_value = "1.0")]
    peak: f32,

    /// Attack curve
    #[arg(long, value_enum, default_value_t)]
    attack_curve: CliCurve,

    /// Decay curve
    #[arg(long, value_enum, default_value_t)]
    decay_curve: CliCurve,

    /// Release curve
    #[arg(long, value_enum, default_value_t)]
    release_curve: CliCurve,

    /// Loop point (enables looping)
    #[arg(long = "loop", value_enum)]
    loop_point: Option<CliLoop>,

    /// Hold the gate for this long and render through a voice, unrolling loops
    #[arg(long)]
    gate_ms: Option<f64>,

    /// Velocity used with --gate-ms
    #[arg(long, default_value = "1.0")]
    velocity: f32,

    /// Number of segments to sample
    #[arg(short = 'n', long, default_value = "50")]
    resolution: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value_t)]
    format: OutputFormat,
}

fn envelope_from_args(args: &EnvelopeArgs) -> anyhow::Result<Envelope> {
    if let Some(name) = &args.preset {
        let preset = load_preset(name)?;
        let track = match args.track {
            Some(id) => preset.track(TrackId(id)),
            None => preset.tracks.first(),
        };
        let track = track.ok_or_else(|| {
            anyhow::anyhow!("preset '{}' has no track {:?}", preset.name, args.track)
        })?;
        tracing::debug!(preset = %preset.name, track = %track.id, "using preset envelope");
        return Ok(track.envelope.clamped());
    }

    let mut env = Envelope::adsr(args.attack, args.decay, args.sustain, args.release)
        .with_peak_level(args.peak)
        .with_attack_curve(args.attack_curve.into())
        .with_decay_curve(args.decay_curve.into())
        .with_release_curve(args.release_curve.into())
        .with_retrigger_mode(RetriggerMode::Reset);
    if let Some(point) = args.loop_point {
        env = env.with_loop(point.into());
    }
    Ok(env)
}

/// Sample a triggered voice: gate held for `gate_ms`, then released.
fn render_voice(env: &Envelope, gate_ms: f64, velocity: f32, resolution: usize) -> Vec<EnvelopePoint> {
    let gate_ms = gate_ms.max(0.0);
    let total = gate_ms + f64::from(env.release_ms);
    let steps = resolution.max(1);
    let mut voice = EnvelopeVoice::default();
    voice.trigger(env, 0.0, velocity);
    let mut released = false;

    (0..=steps)
        .map(|i| {
            let now = total * i as f64 / steps as f64;
            if !released && now >= gate_ms {
                voice.release(env, gate_ms);
                released = true;
            }
            EnvelopePoint {
                time_ms: now as f32,
                level: voice.value_at(env, now),
            }
        })
        .collect()
}

pub fn run(args: EnvelopeArgs) -> anyhow::Result<()> {
    let env = envelope_from_args(&args)?;
    let points = match args.gate_ms {
        Some(gate_ms) => render_voice(&env, gate_ms, args.velocity, args.resolution),
        None => env.generate_points(args.resolution),
    };

    match args.format {
        OutputFormat::Table => {
            const WIDTH: usize = 50;
            for p in &points {
                let bar = (p.level.clamp(0.0, 1.0) * WIDTH as f32).round() as usize;
                println!("{:>9.2} ms  {:.4}  {}", p.time_ms, p.level, "#".repeat(bar));
            }
        }
        OutputFormat::Csv => {
            println!("time_ms,level");
            for p in &points {
                println!("{},{}", p.time_ms, p.level);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&points)?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voice_rendering_ends_at_zero() {
        let env = Envelope::adsr(10.0, 20.0, 0.5, 30.0);
        let points = render_voice(&env, 100.0, 1.0, 130);
        assert_eq!(points.len(), 131);
        assert_eq!(points[0].level, 0.0);
        assert!((points[10].level - 1.0).abs() < 1e-5);
        assert!((points[99].level - 0.5).abs() < 1e-5);
        assert!(points[130].level.abs() < 1e-5);
    }

    #[test]
    fn voice_rendering_unrolls_loops() {
        let env = Envelope::adsr(10.0, 10.0, 0.0, 10.0).with_loop(LoopPoint::Sustain);
        let points = render_voice(&env, 100.0, 1.0, 110);
        assert!((points[10].level - points[30].level).abs() < 1e-5);
        assert!((points[50].level - 1.0).abs() < 1e-5);
    }
}
