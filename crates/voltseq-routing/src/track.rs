//! CV tracks: trigger source, envelope and modulation destination.
//!
//! A [`CvTrack`] is a plain value. Edits go through the `with_*` methods,
//! which consume the record and return the updated copy; the router swaps the
//! whole record in with [`CvRouter::replace_track`](crate::CvRouter::replace_track).
//! Tracks refer to each other by [`TrackId`] only, never by reference.

use core::fmt;

use voltseq_core::{Envelope, clamp_bipolar};

/// Stable track identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TrackId(pub u32);

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrackId({})", self.0)
    }
}

/// What a track's CV is patched into on the synth.
///
/// Descriptive only: the router scales every destination the same way.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ModDestination {
    /// Amplifier level
    #[default]
    Vca,
    /// Filter cutoff
    Vcf,
    /// Oscillator pitch
    Vco,
    /// Pulse width
    Pwm,
    /// Stereo position
    Pan,
    /// Anything else
    Custom,
}

impl ModDestination {
    /// All destinations, in display order.
    pub const ALL: [ModDestination; 6] = [
        ModDestination::Vca,
        ModDestination::Vcf,
        ModDestination::Vco,
        ModDestination::Pwm,
        ModDestination::Pan,
        ModDestination::Custom,
    ];

    /// Short panel label.
    pub fn label(self) -> &'static str {
        match self {
            ModDestination::Vca => "VCA",
            ModDestination::Vcf => "VCF",
            ModDestination::Vco => "VCO",
            ModDestination::Pwm => "PWM",
            ModDestination::Pan => "PAN",
            ModDestination::Custom => "Custom",
        }
    }
}

/// Routing record binding a trigger source to an envelope and a destination.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CvTrack {
    /// Identifier, unique within a router.
    pub id: TrackId,
    /// Display name.
    pub name: String,
    /// Default output channel (zero-based).
    pub output_channel: u16,
    /// Envelope evaluated on every tick. Owned by the track.
    pub envelope: Envelope,
    /// Track whose triggers this one follows. `None` means its own id.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source_track_id: Option<TrackId>,
    /// Soft-disable: a disabled track stays configured but outputs 0 V.
    #[cfg_attr(feature = "serde", serde(default = "enabled_default"))]
    pub is_enabled: bool,
    /// What the CV is patched into.
    #[cfg_attr(feature = "serde", serde(default))]
    pub modulation_destination: ModDestination,
    /// Depth in `[-1, 1]`; negative values invert.
    #[cfg_attr(feature = "serde", serde(default = "amount_default"))]
    pub modulation_amount: f32,
}

#[cfg(feature = "serde")]
fn enabled_default() -> bool {
    true
}

#[cfg(feature = "serde")]
fn amount_default() -> f32 {
    1.0
}

impl CvTrack {
    /// Create an enabled track with a default envelope at full depth on the VCA.
    pub fn new(id: TrackId, name: impl Into<String>, output_channel: u16) -> Self {
        Self {
            id,
            name: name.into(),
            output_channel,
            envelope: Envelope::default(),
            source_track_id: None,
            is_enabled: true,
            modulation_destination: ModDestination::Vca,
            modulation_amount: 1.0,
        }
    }

    /// Follow another track's triggers (`None` = this track's own).
    pub fn with_source_track(mut self, source: Option<TrackId>) -> Self {
        self.source_track_id = source;
        self
    }

    /// Change the modulation destination.
    pub fn with_destination(mut self, destination: ModDestination) -> Self {
        self.modulation_destination = destination;
        self
    }

    /// Replace the envelope.
    pub fn with_envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    /// Set the depth, clamped to `[-1, 1]`.
    pub fn with_modulation_amount(mut self, amount: f32) -> Self {
        self.modulation_amount = clamp_bipolar(amount);
        self
    }

    /// Enable or soft-disable the track.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.is_enabled = enabled;
        self
    }

    /// Rename the track.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Move the track to another default output.
    pub fn with_output_channel(mut self, channel: u16) -> Self {
        self.output_channel = channel;
        self
    }

    /// Copy with every numeric field pulled into range.
    pub fn clamped(self) -> Self {
        let envelope = self.envelope.clamped();
        let amount = self.modulation_amount;
        self.with_envelope(envelope).with_modulation_amount(amount)
    }

    /// Id whose triggers drive this track.
    #[inline]
    pub fn trigger_source(&self) -> TrackId {
        self.source_track_id.unwrap_or(self.id)
    }

    /// Whether a gate-on from `track_id` should trigger this track.
    #[inline]
    pub fn listens_to(&self, track_id: TrackId) -> bool {
        self.is_enabled && self.trigger_source() == track_id
    }
}
