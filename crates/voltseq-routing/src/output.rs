//! Output channels: mapping abstract levels onto interface voltages.
//!
//! ```text
//! final_voltage(raw) = clamp(raw · voltage_scale + voltage_offset, min, max)
//! ```
//!
//! where `[min, max]` is the [`AudioInterface`] voltage range. Channel numbers
//! are validated against the interface when a channel is created or bound;
//! evaluation itself never fails.

use voltseq_core::{Scale, ScaleQuantizer, clamp_range, note_to_volts};

use crate::error::RoutingError;
use crate::track::TrackId;

/// DC-coupled audio interface used for CV output.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AudioInterface {
    /// Device name, for display.
    pub name: String,
    /// Number of outputs. Valid channels are `0..output_count`.
    pub output_count: u16,
    /// Lowest voltage the interface can produce.
    pub voltage_min: f32,
    /// Highest voltage the interface can produce.
    pub voltage_max: f32,
}

impl Default for AudioInterface {
    fn default() -> Self {
        Self {
            name: "Generic DC-coupled".to_string(),
            output_count: 8,
            voltage_min: -10.0,
            voltage_max: 10.0,
        }
    }
}

impl AudioInterface {
    /// Create an interface description. Voltage bounds may be given in either order.
    pub fn new(name: impl Into<String>, output_count: u16, voltage_min: f32, voltage_max: f32) -> Self {
        let (lo, hi) = if voltage_min <= voltage_max {
            (voltage_min, voltage_max)
        } else {
            (voltage_max, voltage_min)
        };
        Self {
            name: name.into(),
            output_count,
            voltage_min: lo,
            voltage_max: hi,
        }
    }

    /// Clamp a voltage into the interface range.
    #[inline]
    pub fn clamp_voltage(&self, volts: f32) -> f32 {
        clamp_range(volts, self.voltage_min, self.voltage_max)
    }

    /// Whether `channel` exists on this interface.
    #[inline]
    pub fn has_channel(&self, channel: u16) -> bool {
        channel < self.output_count
    }

    /// Reject channels the interface does not provide.
    pub fn check_channel(&self, channel: u16) -> Result<(), RoutingError> {
        if self.has_channel(channel) {
            Ok(())
        } else {
            Err(RoutingError::ChannelOutOfRange {
                channel,
                output_count: self.output_count,
            })
        }
    }
}

/// Signal kind carried by an output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OutputType {
    /// 1 V/octave pitch from the last note.
    Pitch,
    /// High while the gate is held.
    Gate,
    /// Last trigger velocity.
    Velocity,
    /// Envelope scaled by the track's depth.
    Modulation,
    /// High while the gate is held, for clock inputs.
    Clock,
    /// Short pulse on every gate-on.
    Trigger,
    /// Envelope scaled by the track's depth.
    #[default]
    Envelope,
    /// Looping envelope scaled by the track's depth.
    Lfo,
}

impl OutputType {
    /// All output types, in display order.
    pub const ALL: [OutputType; 8] = [
        OutputType::Pitch,
        OutputType::Gate,
        OutputType::Velocity,
        OutputType::Modulation,
        OutputType::Clock,
        OutputType::Trigger,
        OutputType::Envelope,
        OutputType::Lfo,
    ];

    /// Volts per unit of raw level used by a freshly created channel.
    ///
    /// Pitch is already in volts; everything else maps `1.0` to 5 V.
    pub fn default_scale(self) -> f32 {
        match self {
            OutputType::Pitch => 1.0,
            _ => 5.0,
        }
    }

    /// Whether the raw level is a held on/off signal.
    pub fn is_gate_like(self) -> bool {
        matches!(self, OutputType::Gate | OutputType::Clock | OutputType::Trigger)
    }

    /// Lowercase name, as used in presets.
    pub fn name(self) -> &'static str {
        match self {
            OutputType::Pitch => "pitch",
            OutputType::Gate => "gate",
            OutputType::Velocity => "velocity",
            OutputType::Modulation => "modulation",
            OutputType::Clock => "clock",
            OutputType::Trigger => "trigger",
            OutputType::Envelope => "envelope",
            OutputType::Lfo => "lfo",
        }
    }
}

/// Scale and root applied to pitch outputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PitchQuantize {
    /// Scale to snap to.
    pub scale: Scale,
    /// Root note (MIDI number; only the pitch class matters).
    pub root: u8,
}

impl PitchQuantize {
    /// Snap a note and convert it to volts.
    pub fn note_volts(&self, note: u8) -> f32 {
        note_to_volts(ScaleQuantizer::new(self.scale).quantize(note, self.root))
    }
}

/// One physical output and how raw levels map onto it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CvOutputChannel {
    /// Zero-based channel on the interface.
    pub output_channel: u16,
    /// Signal kind.
    #[cfg_attr(feature = "serde", serde(default))]
    pub output_type: OutputType,
    /// Track driving this output. `None` selects the track whose
    /// `output_channel` matches.
    #[cfg_attr(feature = "serde", serde(default))]
    pub track_id: Option<TrackId>,
    /// Volts per unit of raw level.
    pub voltage_scale: f32,
    /// Added after scaling, in volts.
    #[cfg_attr(feature = "serde", serde(default))]
    pub voltage_offset: f32,
    /// Maximum rate of change in volts per millisecond. `0` = instant.
    #[cfg_attr(feature = "serde", serde(default))]
    pub slew: f32,
    /// Pitch quantization, for [`OutputType::Pitch`] outputs.
    #[cfg_attr(feature = "serde", serde(default))]
    pub quantize: Option<PitchQuantize>,
}

impl CvOutputChannel {
    /// Create a channel, rejecting channel numbers the interface lacks.
    pub fn new(
        output_channel: u16,
        output_type: OutputType,
        interface: &AudioInterface,
    ) -> Result<Self, RoutingError> {
        interface.check_channel(output_channel)?;
        Ok(Self {
            output_channel,
            output_type,
            track_id: None,
            voltage_scale: output_type.default_scale(),
            voltage_offset: 0.0,
            slew: 0.0,
            quantize: None,
        })
    }

    /// Drive this output from a specific track.
    pub fn with_track(mut self, track_id: Option<TrackId>) -> Self {
        self.track_id = track_id;
        self
    }

    /// Set volts per unit. Non-finite values fall back to `0`.
    pub fn with_voltage_scale(mut self, scale: f32) -> Self {
        self.voltage_scale = if scale.is_finite() { scale } else { 0.0 };
        self
    }

    /// Set the offset in volts. Non-finite values fall back to `0`.
    pub fn with_voltage_offset(mut self, offset: f32) -> Self {
        self.voltage_offset = if offset.is_finite() { offset } else { 0.0 };
        self
    }

    /// Set the slew rate in volts per millisecond. Negative or NaN means none.
    pub fn with_slew(mut self, slew: f32) -> Self {
        self.slew = if slew.is_nan() { 0.0 } else { slew.max(0.0) };
        self
    }

    /// Quantize pitch output to a scale.
    pub fn with_quantize(mut self, quantize: Option<PitchQuantize>) -> Self {
        self.quantize = quantize;
        self
    }

    /// Check the channel number against an interface.
    pub fn validate(&self, interface: &AudioInterface) -> Result<(), RoutingError> {
        interface.check_channel(self.output_channel)
    }

    /// Copy with offset bounded by the interface range and scale/slew sanitized.
    pub fn clamped(self, interface: &AudioInterface) -> Self {
        let offset = interface.clamp_voltage(self.voltage_offset);
        let scale = self.voltage_scale;
        let slew = self.slew;
        self.with_voltage_scale(scale)
            .with_voltage_offset(offset)
            .with_slew(slew)
    }

    /// Map a raw level to the voltage sent to the interface.
    ///
    /// The result always lies within the interface's voltage range.
    #[inline]
    pub fn final_voltage(&self, raw: f32, interface: &AudioInterface) -> f32 {
        interface.clamp_voltage(raw * self.voltage_scale + self.voltage_offset)
    }

    /// Raw pitch level for `note`: volts per octave, quantized if configured.
    pub fn pitch_level(&self, note: u8) -> f32 {
        match &self.quantize {
            Some(q) => q.note_volts(note),
            None => note_to_volts(note),
        }
    }
}

/// One channel's voltage for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelVoltage {
    /// Zero-based channel.
    pub channel: u16,
    /// Signal kind.
    pub output_type: OutputType,
    /// Output voltage after scaling, clamping and slew.
    pub volts: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interface() -> AudioInterface {
        AudioInterface::new("Test", 4, -5.0, 5.0)
    }

    #[test]
    fn rejects_channels_beyond_interface() {
        let iface = interface();
        assert!(CvOutputChannel::new(3, OutputType::Gate, &iface).is_ok());
        assert_eq!(
            CvOutputChannel::new(4, OutputType::Gate, &iface),
            Err(RoutingError::ChannelOutOfRange {
                channel: 4,
                output_count: 4
            })
        );
    }

    #[test]
    fn final_voltage_scales_offsets_and_clamps() {
        let iface = interface();
        let ch = CvOutputChannel::new(0, OutputType::Envelope, &iface)
            .unwrap()
            .with_voltage_scale(4.0)
            .with_voltage_offset(-1.0);
        assert_eq!(ch.final_voltage(0.5, &iface), 1.0);
        assert_eq!(ch.final_voltage(10.0, &iface), 5.0);
        assert_eq!(ch.final_voltage(-10.0, &iface), -5.0);
    }

    #[test]
    fn interface_bounds_are_ordered() {
        let iface = AudioInterface::new("Flipped", 2, 8.0, -3.0);
        assert_eq!(iface.voltage_min, -3.0);
        assert_eq!(iface.voltage_max, 8.0);
    }

    #[test]
    fn clamped_bounds_offset_and_slew() {
        let iface = interface();
        let mut ch = CvOutputChannel::new(1, OutputType::Lfo, &iface).unwrap();
        ch.voltage_offset = 40.0;
        ch.slew = -2.0;
        let ch = ch.clamped(&iface);
        assert_eq!(ch.voltage_offset, 5.0);
        assert_eq!(ch.slew, 0.0);
    }

    #[test]
    fn pitch_level_quantizes_when_configured() {
        let iface = interface();
        let ch = CvOutputChannel::new(0, OutputType::Pitch, &iface).unwrap();
        assert!((ch.pitch_level(61) - 1.0 / 12.0).abs() < 1e-6);

        let ch = ch.with_quantize(Some(PitchQuantize {
            scale: Scale::Major,
            root: 60,
        }));
        assert_eq!(ch.pitch_level(61), 0.0);
        assert_eq!(ch.pitch_level(72), 1.0);
    }

    #[test]
    fn default_scales() {
        assert_eq!(OutputType::Pitch.default_scale(), 1.0);
        assert_eq!(OutputType::Gate.default_scale(), 5.0);
        assert!(OutputType::Trigger.is_gate_like());
        assert!(!OutputType::Lfo.is_gate_like());
    }
}
