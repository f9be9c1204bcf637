//! Per-tick CV routing.
//!
//! [`CvRouter`] owns the routing configuration (tracks and bound output
//! channels) together with the runtime state that goes with it: one
//! [`EnvelopeVoice`] per track and one [`SlewLimiter`] per channel.
//!
//! The sequencer clock drives it with two calls:
//!
//! - [`handle`](CvRouter::handle) for every [`TriggerEvent`] the transport produces,
//! - [`tick`](CvRouter::tick) once per control period, returning one
//!   [`ChannelVoltage`] per bound channel in ascending channel order.
//!
//! Configuration edits (`add_track`, `replace_track`, `bind_channel`, ...)
//! are validated and may fail; `handle` and `tick` never fail and do not
//! allocate once the router is configured.
//!
//! # Channel evaluation
//!
//! | Output type | Raw level |
//! |-------------|-----------|
//! | `Envelope`, `Modulation`, `Lfo` | envelope · modulation amount |
//! | `Velocity` | last trigger velocity · modulation amount |
//! | `Gate`, `Clock` | 1 while the gate is held, else 0 |
//! | `Trigger` | 1 for [`TRIGGER_PULSE_MS`] after each gate-on, else 0 |
//! | `Pitch` | last note in V/oct (quantized if configured) |
//!
//! The raw level then goes through [`CvOutputChannel::final_voltage`] and the
//! channel's slew limiter. A disabled track, a missing track, or an unbound
//! channel produces 0 V (clamped into the interface range).
//!
//! # Example
//!
//! ```rust
//! use voltseq_core::Envelope;
//! use voltseq_routing::{
//!     AudioInterface, CvOutputChannel, CvRouter, CvTrack, OutputType, TrackId, TriggerEvent,
//! };
//!
//! let interface = AudioInterface::default();
//! let mut router = CvRouter::new(interface.clone());
//!
//! let track = CvTrack::new(TrackId(0), "Kick", 0)
//!     .with_envelope(Envelope::adsr(1.0, 10.0, 0.5, 20.0));
//! router.add_track(track).unwrap();
//! router
//!     .bind_channel(CvOutputChannel::new(0, OutputType::Envelope, &interface).unwrap())
//!     .unwrap();
//!
//! router.handle(TriggerEvent::gate_on(TrackId(0), 1.0, 0.0));
//! let out = router.tick(1.0);
//! assert_eq!(out[0].volts, 5.0); // peak level at 5 V per unit
//! ```

use voltseq_core::{EnvelopeVoice, SlewLimiter};

use crate::error::RoutingError;
use crate::output::{AudioInterface, ChannelVoltage, CvOutputChannel, OutputType};
use crate::track::{CvTrack, TrackId};
use crate::trigger::TriggerEvent;

/// Length of the pulse emitted by [`OutputType::Trigger`] outputs, in milliseconds.
pub const TRIGGER_PULSE_MS: f64 = 5.0;

#[derive(Debug, Clone)]
struct TrackSlot {
    track: CvTrack,
    voice: EnvelopeVoice,
    level: f32,
    velocity: f32,
    note: Option<u8>,
    last_gate_on_ms: Option<f64>,
}

impl TrackSlot {
    fn new(track: CvTrack) -> Self {
        Self {
            track,
            voice: EnvelopeVoice::new(),
            level: 0.0,
            velocity: 0.0,
            note: None,
            last_gate_on_ms: None,
        }
    }
}

#[derive(Debug, Clone)]
struct ChannelSlot {
    channel: CvOutputChannel,
    slew: SlewLimiter,
}

/// Owned copy of a router's configuration.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RoutingSnapshot {
    /// Interface the channels are validated against.
    pub interface: AudioInterface,
    /// Tracks in insertion order.
    pub tracks: Vec<CvTrack>,
    /// Bound channels in ascending channel order.
    pub channels: Vec<CvOutputChannel>,
}

/// Turns trigger events into per-channel voltages.
#[derive(Debug, Clone)]
pub struct CvRouter {
    interface: AudioInterface,
    tracks: Vec<TrackSlot>,
    channels: Vec<ChannelSlot>,
    outputs: Vec<ChannelVoltage>,
    last_tick_ms: Option<f64>,
}

impl CvRouter {
    /// Create an empty router for an interface.
    pub fn new(interface: AudioInterface) -> Self {
        Self {
            interface,
            tracks: Vec::new(),
            channels: Vec::new(),
            outputs: Vec::new(),
            last_tick_ms: None,
        }
    }

    /// Build a router from a full configuration.
    ///
    /// Fails on the first duplicate track, duplicate channel, out-of-range
    /// channel or channel naming an unknown track.
    pub fn from_snapshot(snapshot: RoutingSnapshot) -> Result<Self, RoutingError> {
        let mut router = Self::new(snapshot.interface);
        for track in snapshot.tracks {
            router.add_track(track)?;
        }
        for channel in snapshot.channels {
            router.bind_channel(channel)?;
        }
        Ok(router)
    }

    /// Interface the router outputs to.
    pub fn interface(&self) -> &AudioInterface {
        &self.interface
    }

    /// Number of configured tracks.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Number of bound channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Look up a track.
    pub fn track(&self, id: TrackId) -> Option<&CvTrack> {
        self.slot(id).map(|slot| &slot.track)
    }

    /// Iterate over tracks in insertion order.
    pub fn tracks(&self) -> impl Iterator<Item = &CvTrack> {
        self.tracks.iter().map(|slot| &slot.track)
    }

    /// Look up a bound channel.
    pub fn channel(&self, channel: u16) -> Option<&CvOutputChannel> {
        self.channel_index(channel)
            .ok()
            .map(|i| &self.channels[i].channel)
    }

    /// Iterate over bound channels in ascending channel order.
    pub fn channels(&self) -> impl Iterator<Item = &CvOutputChannel> {
        self.channels.iter().map(|slot| &slot.channel)
    }

    /// Envelope timing state of a track.
    pub fn voice(&self, id: TrackId) -> Option<&EnvelopeVoice> {
        self.slot(id).map(|slot| &slot.voice)
    }

    /// Add a track. Numeric fields are clamped into range.
    pub fn add_track(&mut self, track: CvTrack) -> Result<(), RoutingError> {
        if self.slot(track.id).is_some() {
            return Err(RoutingError::DuplicateTrack(track.id));
        }
        #[cfg(feature = "tracing")]
        tracing::debug!("router_add: track {} '{}'", track.id, track.name);
        self.tracks.push(TrackSlot::new(track.clamped()));
        Ok(())
    }

    /// Remove a track and return it.
    ///
    /// Channels that named the track stay bound with their `track_id`
    /// cleared, so they fall back to whichever track uses their output
    /// channel (0 V if none) and the configuration stays rebuildable.
    pub fn remove_track(&mut self, id: TrackId) -> Result<CvTrack, RoutingError> {
        let index = self
            .tracks
            .iter()
            .position(|slot| slot.track.id == id)
            .ok_or(RoutingError::UnknownTrack(id))?;
        #[cfg(feature = "tracing")]
        tracing::debug!("router_remove: track {id}");
        for ch in &mut self.channels {
            if ch.channel.track_id == Some(id) {
                ch.channel.track_id = None;
            }
        }
        Ok(self.tracks.remove(index).track)
    }

    /// Swap in a new version of an existing track (matched by id).
    ///
    /// The running voice is kept, so an edit does not cut a sounding note.
    /// Returns the previous record.
    pub fn replace_track(&mut self, track: CvTrack) -> Result<CvTrack, RoutingError> {
        let id = track.id;
        let slot = self
            .tracks
            .iter_mut()
            .find(|slot| slot.track.id == id)
            .ok_or(RoutingError::UnknownTrack(id))?;
        #[cfg(feature = "tracing")]
        tracing::debug!("router_replace: track {id}");
        Ok(core::mem::replace(&mut slot.track, track.clamped()))
    }

    /// Bind an output channel.
    ///
    /// The channel must exist on the interface and not be bound already, and
    /// a `track_id`, if set, must name a configured track.
    pub fn bind_channel(&mut self, channel: CvOutputChannel) -> Result<(), RoutingError> {
        channel.validate(&self.interface)?;
        if let Some(id) = channel.track_id {
            if self.slot(id).is_none() {
                return Err(RoutingError::UnknownTrack(id));
            }
        }
        let index = match self.channel_index(channel.output_channel) {
            Ok(_) => return Err(RoutingError::DuplicateChannel(channel.output_channel)),
            Err(index) => index,
        };

        let channel = channel.clamped(&self.interface);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "router_bind: channel {} as {} (slew {} V/ms)",
            channel.output_channel,
            channel.output_type.name(),
            channel.slew
        );
        let slew = SlewLimiter::new(channel.slew);
        self.channels.insert(index, ChannelSlot { channel, slew });
        self.outputs.reserve(1);
        Ok(())
    }

    /// Unbind a channel and return its configuration.
    pub fn unbind_channel(&mut self, channel: u16) -> Result<CvOutputChannel, RoutingError> {
        let index = self
            .channel_index(channel)
            .map_err(|_| RoutingError::UnboundChannel(channel))?;
        #[cfg(feature = "tracing")]
        tracing::debug!("router_unbind: channel {channel}");
        Ok(self.channels.remove(index).channel)
    }

    /// Route a trigger event to every track that follows its source.
    ///
    /// Gate-on only reaches enabled tracks. Gate-off reaches disabled tracks
    /// too, so a voice held when its track was disabled still releases.
    ///
    /// Returns how many tracks accepted the event. Gate-on events ignored
    /// because of [`RetriggerMode::None`](voltseq_core::RetriggerMode::None)
    /// are not counted.
    pub fn handle(&mut self, event: TriggerEvent) -> usize {
        let mut accepted = 0;
        for slot in &mut self.tracks {
            if slot.track.trigger_source() != event.track_id {
                continue;
            }
            let env = &slot.track.envelope;

            if event.gate_on {
                if !slot.track.is_enabled {
                    continue;
                }
                if slot.voice.trigger(env, event.timestamp_ms, event.velocity) {
                    slot.velocity = slot.voice.velocity();
                    if event.note.is_some() {
                        slot.note = event.note;
                    }
                    slot.last_gate_on_ms = Some(event.timestamp_ms);
                    accepted += 1;
                } else {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(
                        "router_trigger: {} ignored at {} ms (retrigger none)",
                        slot.track.id,
                        event.timestamp_ms
                    );
                }
            } else if slot.voice.is_gate_held() {
                slot.voice.release(env, event.timestamp_ms);
                accepted += 1;
            }
        }
        accepted
    }

    /// Evaluate every bound channel at `now_ms`.
    ///
    /// Slew is applied over the time since the previous tick. The returned
    /// slice holds one entry per bound channel in ascending channel order.
    pub fn tick(&mut self, now_ms: f64) -> &[ChannelVoltage] {
        let dt_ms = self
            .last_tick_ms
            .map_or(0.0, |last| (now_ms - last).max(0.0)) as f32;
        self.last_tick_ms = Some(now_ms);

        for slot in &mut self.tracks {
            slot.level = if slot.track.is_enabled {
                slot.voice.value_at(&slot.track.envelope, now_ms)
            } else {
                0.0
            };
        }

        self.outputs.clear();
        for ch in &mut self.channels {
            let source = match ch.channel.track_id {
                Some(id) => self.tracks.iter().find(|slot| slot.track.id == id),
                None => self
                    .tracks
                    .iter()
                    .find(|slot| slot.track.output_channel == ch.channel.output_channel),
            };

            let target = match source.filter(|slot| slot.track.is_enabled) {
                Some(slot) => {
                    let raw = raw_level(slot, &ch.channel, now_ms);
                    ch.channel.final_voltage(raw, &self.interface)
                }
                None => self.interface.clamp_voltage(0.0),
            };

            self.outputs.push(ChannelVoltage {
                channel: ch.channel.output_channel,
                output_type: ch.channel.output_type,
                volts: ch.slew.advance(target, dt_ms),
            });
        }
        &self.outputs
    }

    /// Voltages produced by the most recent [`tick`](Self::tick).
    pub fn last_outputs(&self) -> &[ChannelVoltage] {
        &self.outputs
    }

    /// Return every voice to idle and forget slew history.
    pub fn reset(&mut self) {
        for slot in &mut self.tracks {
            slot.voice.reset();
            slot.level = 0.0;
            slot.velocity = 0.0;
            slot.note = None;
            slot.last_gate_on_ms = None;
        }
        for ch in &mut self.channels {
            ch.slew = SlewLimiter::new(ch.channel.slew);
        }
        self.outputs.clear();
        self.last_tick_ms = None;
    }

    /// Owned copy of the configuration.
    pub fn snapshot(&self) -> RoutingSnapshot {
        RoutingSnapshot {
            interface: self.interface.clone(),
            tracks: self.tracks().cloned().collect(),
            channels: self.channels().cloned().collect(),
        }
    }

    fn slot(&self, id: TrackId) -> Option<&TrackSlot> {
        self.tracks.iter().find(|slot| slot.track.id == id)
    }

    fn channel_index(&self, channel: u16) -> Result<usize, usize> {
        self.channels
            .binary_search_by_key(&channel, |slot| slot.channel.output_channel)
    }
}

fn raw_level(slot: &TrackSlot, channel: &CvOutputChannel, now_ms: f64) -> f32 {
    let amount = slot.track.modulation_amount;
    match channel.output_type {
        OutputType::Envelope | OutputType::Modulation | OutputType::Lfo => slot.level * amount,
        OutputType::Velocity => slot.velocity * amount,
        OutputType::Gate | OutputType::Clock => {
            if slot.voice.is_gate_held() { 1.0 } else { 0.0 }
        }
        OutputType::Trigger => match slot.last_gate_on_ms {
            Some(start) if (0.0..TRIGGER_PULSE_MS).contains(&(now_ms - start)) => 1.0,
            _ => 0.0,
        },
        OutputType::Pitch => slot.note.map_or(0.0, |note| channel.pitch_level(note)),
    }
}
