//! Voltseq Routing - CV tracks, output channels and the per-tick router
//!
//! This crate connects trigger events from the sequencer transport to the
//! envelope and pitch primitives in `voltseq-core`, and maps the results onto
//! the outputs of a DC-coupled audio interface.
//!
//! # Core Components
//!
//! ## Records
//!
//! Plain values, edited by whole-record replacement:
//!
//! - [`CvTrack`] - Trigger source, envelope, destination and depth
//! - [`CvOutputChannel`] - Channel number, output type, scale, offset, slew
//! - [`AudioInterface`] - Output count and voltage range
//! - [`TriggerEvent`] - Ephemeral gate change from the transport
//!
//! ## Router
//!
//! - [`CvRouter`] - Owns tracks, channels, voices and slew state; turns
//!   [`TriggerEvent`]s into [`ChannelVoltage`]s once per tick
//!
//! ```rust
//! use voltseq_routing::{AudioInterface, CvOutputChannel, OutputType, RoutingError};
//!
//! let interface = AudioInterface::new("ES-8", 8, -10.0, 10.0);
//! let gate = CvOutputChannel::new(3, OutputType::Gate, &interface).unwrap();
//! assert_eq!(gate.final_voltage(1.0, &interface), 5.0);
//!
//! // Channel numbers are checked when the channel is configured.
//! assert!(matches!(
//!     CvOutputChannel::new(8, OutputType::Gate, &interface),
//!     Err(RoutingError::ChannelOutOfRange { .. })
//! ));
//! ```
//!
//! # Features
//!
//! - `serde` - Serialize/Deserialize for every record (and for `voltseq-core` types)
//! - `tracing` - Debug logs for configuration edits, trace logs for ignored triggers

pub mod error;
pub mod output;
pub mod router;
pub mod track;
pub mod trigger;

// Re-export main types at crate root
pub use error::RoutingError;
pub use output::{AudioInterface, ChannelVoltage, CvOutputChannel, OutputType, PitchQuantize};
pub use router::{CvRouter, RoutingSnapshot, TRIGGER_PULSE_MS};
pub use track::{CvTrack, ModDestination, TrackId};
pub use trigger::TriggerEvent;
