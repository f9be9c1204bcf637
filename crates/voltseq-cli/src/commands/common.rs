//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use clap::ValueEnum;
use voltseq_config::{SequencerPreset, resolve_preset};
use voltseq_core::{Curve, Scale};

/// Scales for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliScale {
    #[default]
    Chromatic,
    Major,
    Minor,
    Dorian,
    Mixolydian,
    PentatonicMajor,
    PentatonicMinor,
    Blues,
}

impl From<CliScale> for Scale {
    fn from(s: CliScale) -> Self {
        match s {
            CliScale::Chromatic => Scale::Chromatic,
            CliScale::Major => Scale::Major,
            CliScale::Minor => Scale::Minor,
            CliScale::Dorian => Scale::Dorian,
            CliScale::Mixolydian => Scale::Mixolydian,
            CliScale::PentatonicMajor => Scale::PentatonicMajor,
            CliScale::PentatonicMinor => Scale::PentatonicMinor,
            CliScale::Blues => Scale::Blues,
        }
    }
}

/// Curve shapes for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliCurve {
    #[default]
    Linear,
    Exponential,
    Logarithmic,
    SCurve,
}

impl From<CliCurve> for Curve {
    fn from(c: CliCurve) -> Self {
        match c {
            CliCurve::Linear => Curve::Linear,
            CliCurve::Exponential => Curve::Exponential,
            CliCurve::Logarithmic => Curve::Logarithmic,
            CliCurve::SCurve => Curve::SCurve,
        }
    }
}

/// Tabular output formats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// Comma-separated values with a header row
    Csv,
    /// JSON array
    Json,
}

/// Load a preset by path, user preset name or factory preset name.
pub fn load_preset(name: &str) -> anyhow::Result<SequencerPreset> {
    resolve_preset(name).with_context(|| {
        format!("could not load preset '{name}'. Use 'voltseq presets list' to see available presets")
    })
}

/// Parse a MIDI note given as a number (`60`) or a name (`C4`, `F#3`, `Bb-1`).
///
/// Names use C4 = 60. The result must lie in `0..=127`.
pub fn parse_note(s: &str) -> Result<u8, String> {
    if let Ok(n) = s.parse::<u8>() {
        return if n <= 127 {
            Ok(n)
        } else {
            Err(format!("note {n} out of range 0..=127"))
        };
    }

    let mut chars = s.chars();
    let pitch_class: i32 = match chars.next().map(|c| c.to_ascii_uppercase()) {
        Some('C') => 0,
        Some('D') => 2,
        Some('E') => 4,
        Some('F') => 5,
        Some('G') => 7,
        Some('A') => 9,
        Some('B') => 11,
        _ => return Err(format!("invalid note '{s}' (expected e.g. 60, C4 or F#3)")),
    };
    let rest = chars.as_str();
    let (accidental, octave) = match rest.strip_prefix('#') {
        Some(r) => (1, r),
        None => match rest.strip_prefix('b') {
            Some(r) => (-1, r),
            None => (0, rest),
        },
    };
    let octave: i32 = octave
        .parse()
        .map_err(|_| format!("invalid octave in note '{s}'"))?;
    let midi = (octave + 1) * 12 + pitch_class + accidental;
    u8::try_from(midi)
        .ok()
        .filter(|n| *n <= 127)
        .ok_or_else(|| format!("note '{s}' out of range 0..=127"))
}

/// Note name for display, C4 = 60.
pub fn note_name(note: u8) -> String {
    const NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    let octave = i32::from(note / 12) - 1;
    format!("{}{}", NAMES[usize::from(note % 12)], octave)
}

/// Render a step pattern as `x` for onsets and `.` for rests.
pub fn pattern_string(pattern: &[bool]) -> String {
    pattern.iter().map(|&on| if on { 'x' } else { '.' }).collect()
}
