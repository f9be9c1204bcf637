//! Preset validation.
//!
//! Evaluation clamps everything, so a preset with odd values still plays.
//! Validation is the configuration-time check that tells the user which
//! values would be clamped and which references are broken, before the
//! preset reaches a router.
//!
//! # Example
//!
//! ```rust
//! use voltseq_config::{SequencerPreset, validate_preset};
//!
//! let preset = SequencerPreset::new("Empty");
//! assert!(validate_preset(&preset).is_ok());
//! ```

use std::collections::HashSet;
use thiserror::Error;

use voltseq_core::{Envelope, MAX_PHASE_MS, MIN_PHASE_MS};
use voltseq_routing::{AudioInterface, TrackId};

use crate::preset::{
    MAX_BPM, MAX_STEPS_PER_BEAT, MAX_TICK_RATE_HZ, MIN_BPM, SequencerPreset, StepLane,
};

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Parameter value out of range.
    #[error("parameter '{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the parameter, e.g. `tracks[0].envelope.sustain`.
        param: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Output channel not provided by the interface.
    #[error("{context}: output channel {channel} out of range: interface has {output_count} outputs")]
    ChannelOutOfRange {
        /// Where the channel number appears.
        context: String,
        /// Requested channel (zero-based).
        channel: u16,
        /// Outputs available on the interface.
        output_count: u16,
    },

    /// A track follows a source that does not exist.
    #[error("track {track} follows unknown source track {source_track}")]
    UnknownSourceTrack {
        /// The following track.
        track: TrackId,
        /// The missing source.
        source_track: TrackId,
    },

    /// A channel or lane refers to a track that does not exist.
    #[error("{context} refers to unknown track {track}")]
    UnknownTrack {
        /// Where the reference appears.
        context: String,
        /// The missing track.
        track: TrackId,
    },

    /// Two tracks share an id.
    #[error("duplicate track id {0}")]
    DuplicateTrackId(TrackId),

    /// Two outputs are bound to the same channel.
    #[error("output channel {0} is bound more than once")]
    DuplicateChannel(u16),

    /// A lane has no usable pattern.
    #[error("lane {index}: {reason}")]
    InvalidLane {
        /// Index of the lane in the preset.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check that `value` lies in `[min, max]`. NaN is always out of range.
pub fn check_range(param: impl Into<String>, value: f32, min: f32, max: f32) -> ValidationResult<()> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            param: param.into(),
            value,
            min,
            max,
        })
    }
}

/// Validate an envelope's fields. All problems are reported.
pub fn validate_envelope(prefix: &str, env: &Envelope) -> Vec<ValidationError> {
    let checks = [
        ("attack_ms", env.attack_ms, MIN_PHASE_MS, MAX_PHASE_MS),
        ("decay_ms", env.decay_ms, MIN_PHASE_MS, MAX_PHASE_MS),
        ("release_ms", env.release_ms, MIN_PHASE_MS, MAX_PHASE_MS),
        ("sustain", env.sustain, 0.0, 1.0),
        ("peak_level", env.peak_level, 0.0, 1.0),
        ("velocity_sensitivity", env.velocity_sensitivity, 0.0, 1.0),
    ];
    checks
        .into_iter()
        .filter_map(|(name, value, min, max)| {
            check_range(format!("{prefix}.{name}"), value, min, max).err()
        })
        .collect()
}

/// Validate the interface description.
pub fn validate_interface(interface: &AudioInterface) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if interface.output_count == 0 {
        errors.push(ValidationError::OutOfRange {
            param: "interface.output_count".to_string(),
            value: 0.0,
            min: 1.0,
            max: f32::from(u16::MAX),
        });
    }
    if !interface.voltage_min.is_finite() || !interface.voltage_max.is_finite() {
        errors.push(ValidationError::OutOfRange {
            param: "interface.voltage_min".to_string(),
            value: interface.voltage_min,
            min: f32::MIN,
            max: interface.voltage_max,
        });
    } else if interface.voltage_min >= interface.voltage_max {
        errors.push(ValidationError::OutOfRange {
            param: "interface.voltage_max".to_string(),
            value: interface.voltage_max,
            min: interface.voltage_min,
            max: f32::MAX,
        });
    }
    errors
}

fn validate_lane(index: usize, lane: &StepLane, known: &HashSet<TrackId>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let prefix = format!("lanes[{index}]");

    if !known.contains(&lane.track_id) {
        errors.push(ValidationError::UnknownTrack {
            context: prefix.clone(),
            track: lane.track_id,
        });
    }

    match (&lane.steps, &lane.euclid) {
        (None, None) => errors.push(ValidationError::InvalidLane {
            index,
            reason: "needs either `steps` or `euclid`".to_string(),
        }),
        (Some(_), Some(_)) => errors.push(ValidationError::InvalidLane {
            index,
            reason: "has both `steps` and `euclid`".to_string(),
        }),
        (Some(steps), None) if steps.is_empty() => errors.push(ValidationError::InvalidLane {
            index,
            reason: "`steps` is empty".to_string(),
        }),
        (None, Some(e)) => {
            if e.steps == 0 {
                errors.push(ValidationError::InvalidLane {
                    index,
                    reason: "`euclid.steps` must be positive".to_string(),
                });
            }
            if !usize::try_from(e.pulses).is_ok_and(|p| p <= e.steps) {
                errors.push(ValidationError::OutOfRange {
                    param: format!("{prefix}.euclid.pulses"),
                    value: e.pulses as f32,
                    min: 0.0,
                    max: e.steps as f32,
                });
            }
        }
        (Some(_), None) => {}
    }

    let checks = [
        ("accent_velocity", lane.accent_velocity, 0.0, 1.0),
        ("base_velocity", lane.base_velocity, 0.0, 1.0),
        ("gate_fraction", lane.gate_fraction, 0.0, 1.0),
    ];
    errors.extend(checks.into_iter().filter_map(|(name, value, min, max)| {
        check_range(format!("{prefix}.{name}"), value, min, max).err()
    }));
    for (i, &note) in lane.notes.iter().enumerate() {
        if note > 127 {
            errors.push(ValidationError::OutOfRange {
                param: format!("{prefix}.notes[{i}]"),
                value: f32::from(note),
                min: 0.0,
                max: 127.0,
            });
        }
    }
    errors
}

/// Validate a whole preset.
///
/// Every problem is collected. A single problem is returned as itself,
/// several as [`ValidationError::Multiple`].
pub fn validate_preset(preset: &SequencerPreset) -> ValidationResult<()> {
    let mut errors = Vec::new();
    let iface = &preset.interface;

    if let Err(e) = check_range(
        "tick_rate_hz",
        preset.tick_rate_hz as f32,
        1.0,
        MAX_TICK_RATE_HZ as f32,
    ) {
        errors.push(e);
    }
    if let Err(e) = check_range("bpm", preset.bpm, MIN_BPM, MAX_BPM) {
        errors.push(e);
    }
    if let Err(e) = check_range(
        "steps_per_beat",
        preset.steps_per_beat as f32,
        1.0,
        MAX_STEPS_PER_BEAT as f32,
    ) {
        errors.push(e);
    }
    errors.extend(validate_interface(iface));

    let mut known = HashSet::new();
    for (i, track) in preset.tracks.iter().enumerate() {
        if !known.insert(track.id) {
            errors.push(ValidationError::DuplicateTrackId(track.id));
        }
        if !iface.has_channel(track.output_channel) {
            errors.push(ValidationError::ChannelOutOfRange {
                context: format!("tracks[{i}]"),
                channel: track.output_channel,
                output_count: iface.output_count,
            });
        }
        if let Err(e) = check_range(
            format!("tracks[{i}].modulation_amount"),
            track.modulation_amount,
            -1.0,
            1.0,
        ) {
            errors.push(e);
        }
        errors.extend(validate_envelope(&format!("tracks[{i}].envelope"), &track.envelope));
    }

    for track in &preset.tracks {
        if let Some(source) = track.source_track_id
            && !known.contains(&source)
        {
            errors.push(ValidationError::UnknownSourceTrack {
                track: track.id,
                source_track: source,
            });
        }
    }

    let mut bound = HashSet::new();
    for (i, channel) in preset.channels.iter().enumerate() {
        let context = format!("channels[{i}]");
        if !iface.has_channel(channel.output_channel) {
            errors.push(ValidationError::ChannelOutOfRange {
                context: context.clone(),
                channel: channel.output_channel,
                output_count: iface.output_count,
            });
        }
        if !bound.insert(channel.output_channel) {
            errors.push(ValidationError::DuplicateChannel(channel.output_channel));
        }
        if let Some(track) = channel.track_id
            && !known.contains(&track)
        {
            errors.push(ValidationError::UnknownTrack {
                context: context.clone(),
                track,
            });
        }
        if !channel.voltage_scale.is_finite() {
            errors.push(ValidationError::OutOfRange {
                param: format!("{context}.voltage_scale"),
                value: channel.voltage_scale,
                min: f32::MIN,
                max: f32::MAX,
            });
        }
        if let Err(e) = check_range(
            format!("{context}.voltage_offset"),
            channel.voltage_offset,
            iface.voltage_min,
            iface.voltage_max,
        ) {
            errors.push(e);
        }
        if let Err(e) = check_range(format!("{context}.slew"), channel.slew, 0.0, f32::MAX) {
            errors.push(e);
        }
    }

    for (i, lane) in preset.lanes.iter().enumerate() {
        errors.extend(validate_lane(i, lane, &known));
    }

    match errors.len() {
        0 => Ok(()),
        1 => match errors.pop() {
            Some(e) => Err(e),
            None => Ok(()),
        },
        _ => Err(ValidationError::Multiple(errors)),
    }
}
