//! Factory presets bundled with the library.
//!
//! Always available without files on disk, and a starting point for user
//! presets (`voltseq presets export <name>`).

use crate::SequencerPreset;

/// Identifiers of the factory presets.
pub static FACTORY_PRESET_NAMES: &[&str] = &["four-on-the-floor", "tresillo-pluck", "lfo-loop"];

/// TOML content for factory presets, embedded at compile time.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("four-on-the-floor", FOUR_ON_THE_FLOOR_PRESET),
    ("tresillo-pluck", TRESILLO_PLUCK_PRESET),
    ("lfo-loop", LFO_LOOP_PRESET),
];

/// Kick on every beat and offbeat hats, with trigger and velocity outputs.
const FOUR_ON_THE_FLOOR_PRESET: &str = r#"
name = "Four on the Floor"
description = "Kick on every beat with offbeat hats"
tick_rate_hz = 1000
bpm = 124.0

[interface]
name = "Generic DC-coupled"
output_count = 8
voltage_min = -10.0
voltage_max = 10.0

[[tracks]]
id = 0
name = "Kick"
output_channel = 0
[tracks.envelope]
attack_ms = 1.0
decay_ms = 180.0
sustain = 0.0
release_ms = 60.0
decay_curve = "exponential"

[[tracks]]
id = 1
name = "Hat"
output_channel = 2
[tracks.envelope]
attack_ms = 1.0
decay_ms = 40.0
sustain = 0.0
release_ms = 20.0
decay_curve = "exponential"
velocity_sensitivity = 1.0

[[channels]]
output_channel = 0
output_type = "envelope"
track_id = 0
voltage_scale = 8.0

[[channels]]
output_channel = 1
output_type = "trigger"
track_id = 0
voltage_scale = 5.0

[[channels]]
output_channel = 2
output_type = "envelope"
track_id = 1
voltage_scale = 5.0

[[channels]]
output_channel = 3
output_type = "velocity"
track_id = 1
voltage_scale = 5.0

[[lanes]]
track_id = 0
steps = [true, false, false, false]
gate_fraction = 0.25

[[lanes]]
track_id = 1
steps = [false, false, true, false]
accent_every = 2
accent_velocity = 1.0
base_velocity = 0.6
gate_fraction = 0.25
"#;

/// 3-in-8 pluck with an accented filter envelope and a pitch line.
const TRESILLO_PLUCK_PRESET: &str = r#"
name = "Tresillo Pluck"
description = "3-in-8 Euclidean pluck driving VCA, VCF and a quantized pitch line"
tick_rate_hz = 1000
bpm = 110.0

[interface]
name = "Generic DC-coupled"
output_count = 8
voltage_min = -10.0
voltage_max = 10.0

[[tracks]]
id = 0
name = "Pluck"
output_channel = 0
[tracks.envelope]
attack_ms = 2.0
decay_ms = 220.0
sustain = 0.0
release_ms = 80.0
decay_curve = "exponential"
velocity_sensitivity = 0.8

[[tracks]]
id = 1
name = "Pluck filter"
output_channel = 1
source_track_id = 0
modulation_destination = "vcf"
modulation_amount = 0.6
[tracks.envelope]
attack_ms = 5.0
decay_ms = 120.0
sustain = 0.2
release_ms = 150.0
attack_curve = "logarithmic"
decay_curve = "exponential"

[[channels]]
output_channel = 0
output_type = "envelope"
track_id = 0
voltage_scale = 8.0

[[channels]]
output_channel = 1
output_type = "modulation"
track_id = 1
voltage_scale = 10.0

[[channels]]
output_channel = 2
output_type = "pitch"
track_id = 0
voltage_scale = 1.0
slew = 0.01
[channels.quantize]
scale = "pentatonic_minor"
root = 57

[[lanes]]
track_id = 0
euclid = { steps = 8, pulses = 3, rotation = 0 }
accent_every = 3
accent_velocity = 1.0
base_velocity = 0.7
gate_fraction = 0.5
notes = [45, 48, 52, 55]
"#;

/// Looping S-curve envelope used as a bipolar LFO.
const LFO_LOOP_PRESET: &str = r#"
name = "LFO Loop"
description = "Sustain-looped S-curve envelope as a bipolar LFO, regated every two seconds"
tick_rate_hz = 1000
bpm = 30.0
steps_per_beat = 1

[interface]
name = "Generic DC-coupled"
output_count = 8
voltage_min = -10.0
voltage_max = 10.0

[[tracks]]
id = 0
name = "LFO"
output_channel = 0
modulation_destination = "pwm"
[tracks.envelope]
attack_ms = 250.0
decay_ms = 250.0
sustain = 0.0
release_ms = 100.0
attack_curve = "s_curve"
decay_curve = "s_curve"
velocity_sensitivity = 0.0
loop_enabled = true
loop_point = "sustain"

[[channels]]
output_channel = 0
output_type = "lfo"
track_id = 0
voltage_scale = 10.0
voltage_offset = -5.0

[[lanes]]
track_id = 0
steps = [true]
gate_fraction = 1.0
"#;

/// Get all factory presets.
pub fn factory_presets() -> Vec<SequencerPreset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| SequencerPreset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by identifier or display name, case-insensitively.
pub fn get_factory_preset(name: &str) -> Option<SequencerPreset> {
    let name_lower = name.to_lowercase();

    if let Some((_, toml)) = FACTORY_PRESETS_TOML
        .iter()
        .find(|(id, _)| id.to_lowercase() == name_lower)
    {
        return SequencerPreset::from_toml(toml).ok();
    }

    factory_presets()
        .into_iter()
        .find(|preset| preset.name.to_lowercase() == name_lower)
}

/// Identifiers of all factory presets.
pub fn factory_preset_names() -> Vec<&'static str> {
    FACTORY_PRESETS_TOML.iter().map(|(name, _)| *name).collect()
}

/// Whether `name` matches a factory preset (case-insensitive).
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}
