//! Preset file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use voltseq_core::{EuclideanPattern, euclid};
use voltseq_routing::{AudioInterface, CvOutputChannel, CvRouter, CvTrack, RoutingSnapshot, TrackId};

use crate::error::{ConfigError, FileOp};

/// A complete sequencer setup: interface, tracks, outputs and step lanes.
///
/// Presets are stored as TOML files. Every field round-trips unchanged
/// through [`to_toml`](Self::to_toml) and [`from_toml`](Self::from_toml).
///
/// # TOML Format
///
/// ```toml
/// name = "Tresillo Pluck"
/// description = "3-in-8 pluck on a filter envelope"
/// tick_rate_hz = 1000
/// bpm = 110.0
///
/// [interface]
/// name = "ES-8"
/// output_count = 8
/// voltage_min = -10.0
/// voltage_max = 10.0
///
/// [[tracks]]
/// id = 0
/// name = "Pluck"
/// output_channel = 0
/// [tracks.envelope]
/// attack_ms = 2.0
/// decay_ms = 180.0
/// sustain = 0.0
///
/// [[channels]]
/// output_channel = 0
/// output_type = "envelope"
/// track_id = 0
/// voltage_scale = 8.0
///
/// [[lanes]]
/// track_id = 0
/// euclid = { steps = 8, pulses = 3 }
/// accent_every = 3
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SequencerPreset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Control rate the router is ticked at.
    #[serde(default = "default_tick_rate")]
    pub tick_rate_hz: u32,

    /// Tempo in beats per minute.
    #[serde(default = "default_bpm")]
    pub bpm: f32,

    /// Lane steps per beat (4 = sixteenth notes).
    #[serde(default = "default_steps_per_beat")]
    pub steps_per_beat: u32,

    /// Interface the outputs are validated against.
    #[serde(default)]
    pub interface: AudioInterface,

    /// CV tracks, in routing order.
    #[serde(default)]
    pub tracks: Vec<CvTrack>,

    /// Bound output channels.
    #[serde(default)]
    pub channels: Vec<CvOutputChannel>,

    /// Step patterns that fire the tracks.
    #[serde(default)]
    pub lanes: Vec<StepLane>,
}

fn default_tick_rate() -> u32 {
    1000
}

fn default_bpm() -> f32 {
    120.0
}

/// Slowest tempo a preset plays at.
pub const MIN_BPM: f32 = 20.0;
/// Fastest tempo a preset plays at.
pub const MAX_BPM: f32 = 300.0;
/// Finest step subdivision.
pub const MAX_STEPS_PER_BEAT: u32 = 16;
/// Highest router tick rate.
pub const MAX_TICK_RATE_HZ: u32 = 48_000;

fn default_steps_per_beat() -> u32 {
    4
}

impl SequencerPreset {
    /// Create an empty preset on the default interface.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tick_rate_hz: default_tick_rate(),
            bpm: default_bpm(),
            steps_per_beat: default_steps_per_beat(),
            interface: AudioInterface::default(),
            tracks: Vec::new(),
            channels: Vec::new(),
            lanes: Vec::new(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the tempo.
    pub fn with_bpm(mut self, bpm: f32) -> Self {
        self.bpm = bpm;
        self
    }

    /// Set the control rate.
    pub fn with_tick_rate(mut self, tick_rate_hz: u32) -> Self {
        self.tick_rate_hz = tick_rate_hz;
        self
    }

    /// Replace the interface.
    pub fn with_interface(mut self, interface: AudioInterface) -> Self {
        self.interface = interface;
        self
    }

    /// Add a track.
    pub fn with_track(mut self, track: CvTrack) -> Self {
        self.tracks.push(track);
        self
    }

    /// Add an output channel.
    pub fn with_channel(mut self, channel: CvOutputChannel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Add a step lane.
    pub fn with_lane(mut self, lane: StepLane) -> Self {
        self.lanes.push(lane);
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::io(FileOp::Read, path, e))?;
        let preset: SequencerPreset = toml::from_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            name = %preset.name,
            tracks = preset.tracks.len(),
            channels = preset.channels.len(),
            "preset loaded"
        );
        Ok(preset)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file, creating the parent directory.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::io(FileOp::CreateDir, parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::io(FileOp::Write, path, e))?;
        tracing::debug!(path = %path.display(), name = %self.name, "preset saved");
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Look up a track by id.
    pub fn track(&self, id: TrackId) -> Option<&CvTrack> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Duration of one lane step in milliseconds.
    ///
    /// Tempo and steps per beat are clamped to their valid ranges first.
    pub fn step_ms(&self) -> f64 {
        let bpm = if self.bpm.is_finite() {
            self.bpm.clamp(MIN_BPM, MAX_BPM)
        } else {
            default_bpm()
        };
        let steps_per_beat = self.steps_per_beat.clamp(1, MAX_STEPS_PER_BEAT);
        60_000.0 / f64::from(bpm) / f64::from(steps_per_beat)
    }

    /// Duration of one router tick in milliseconds, with the tick rate
    /// clamped to `1..=MAX_TICK_RATE_HZ`.
    pub fn tick_ms(&self) -> f64 {
        1000.0 / f64::from(self.tick_rate_hz.clamp(1, MAX_TICK_RATE_HZ))
    }

    /// Length in steps of the longest lane.
    pub fn cycle_steps(&self) -> usize {
        self.lanes.iter().map(StepLane::len).max().unwrap_or(0)
    }

    /// Owned copy of the routing part of the preset.
    pub fn routing_snapshot(&self) -> RoutingSnapshot {
        RoutingSnapshot {
            interface: self.interface.clone(),
            tracks: self.tracks.clone(),
            channels: self.channels.clone(),
        }
    }

    /// Build a router with every track added and every channel bound.
    pub fn build_router(&self) -> Result<CvRouter, ConfigError> {
        Ok(CvRouter::from_snapshot(self.routing_snapshot())?)
    }
}

impl Default for SequencerPreset {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Step pattern that fires one track.
///
/// The pattern is given either explicitly as `steps` or as a Euclidean
/// rhythm in `euclid`. When both are present `euclid` wins; validation
/// reports the conflict.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepLane {
    /// Track the gate events are sent as.
    pub track_id: TrackId,

    /// Hand-written pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<bool>>,

    /// Generated pattern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub euclid: Option<EuclideanPattern>,

    /// Accent the first and every n-th onset after it. `0` = no accents.
    #[serde(default)]
    pub accent_every: usize,

    /// Velocity of accented onsets.
    #[serde(default = "default_accent_velocity")]
    pub accent_velocity: f32,

    /// Velocity of the other onsets.
    #[serde(default = "default_base_velocity")]
    pub base_velocity: f32,

    /// Fraction of a step the gate stays high.
    #[serde(default = "default_gate_fraction")]
    pub gate_fraction: f32,

    /// MIDI notes attached to successive onsets, cycling. Empty = no pitch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<u8>,
}

fn default_accent_velocity() -> f32 {
    1.0
}

fn default_base_velocity() -> f32 {
    0.8
}

fn default_gate_fraction() -> f32 {
    0.5
}

impl StepLane {
    /// Lane with a hand-written pattern.
    pub fn from_steps(track_id: TrackId, steps: impl Into<Vec<bool>>) -> Self {
        Self::empty(track_id, Some(steps.into()), None)
    }

    /// Lane with a Euclidean pattern.
    pub fn euclidean(track_id: TrackId, steps: usize, pulses: i32, rotation: i32) -> Self {
        Self::empty(
            track_id,
            None,
            Some(EuclideanPattern::new(steps, pulses, rotation)),
        )
    }

    fn empty(track_id: TrackId, steps: Option<Vec<bool>>, euclid: Option<EuclideanPattern>) -> Self {
        Self {
            track_id,
            steps,
            euclid,
            accent_every: 0,
            accent_velocity: default_accent_velocity(),
            base_velocity: default_base_velocity(),
            gate_fraction: default_gate_fraction(),
            notes: Vec::new(),
        }
    }

    /// Set the accent rule.
    pub fn with_accents(mut self, every: usize, accent_velocity: f32, base_velocity: f32) -> Self {
        self.accent_every = every;
        self.accent_velocity = accent_velocity;
        self.base_velocity = base_velocity;
        self
    }

    /// Set the gate length as a fraction of a step.
    pub fn with_gate_fraction(mut self, fraction: f32) -> Self {
        self.gate_fraction = fraction;
        self
    }

    /// Attach a note cycle.
    pub fn with_notes(mut self, notes: impl Into<Vec<u8>>) -> Self {
        self.notes = notes.into();
        self
    }

    /// The on/off pattern.
    pub fn pattern(&self) -> Vec<bool> {
        match (&self.euclid, &self.steps) {
            (Some(e), _) => e.generate(),
            (None, Some(steps)) => steps.clone(),
            (None, None) => Vec::new(),
        }
    }

    /// Pattern length in steps.
    pub fn len(&self) -> usize {
        match (&self.euclid, &self.steps) {
            (Some(e), _) => e.steps,
            (None, Some(steps)) => steps.len(),
            (None, None) => 0,
        }
    }

    /// Whether the lane has no steps.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Velocity per step; `None` is a rest.
    pub fn velocities(&self) -> Vec<Option<f32>> {
        euclid::accent(
            &self.pattern(),
            self.accent_every,
            self.accent_velocity,
            self.base_velocity,
        )
    }

    /// Note for the `onset`-th onset since playback started.
    pub fn note_for_onset(&self, onset: usize) -> Option<u8> {
        if self.notes.is_empty() {
            None
        } else {
            Some(self.notes[onset % self.notes.len()])
        }
    }
}
