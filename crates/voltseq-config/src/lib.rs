//! Presets and configuration-time checks for voltseq.
//!
//! A [`SequencerPreset`] is one TOML file holding everything needed to run
//! the sequencer offline: the audio interface, CV tracks, bound output
//! channels and the step lanes that fire the tracks.
//!
//! - **Presets**: load and save [`SequencerPreset`]s as TOML
//! - **Validation**: report out-of-range values and broken references
//! - **Playback**: expand lanes into trigger events and render router output
//! - **Paths**: platform-specific preset directories
//! - **Factory presets**: built-in starting points
//!
//! # Example
//!
//! ```rust,no_run
//! use voltseq_config::{SequencerPreset, StepLane, user_presets_dir, validate_preset};
//! use voltseq_routing::{CvOutputChannel, CvTrack, OutputType, TrackId};
//!
//! let preset = SequencerPreset::new("Kick");
//! let gate = CvOutputChannel::new(0, OutputType::Gate, &preset.interface)
//!     .unwrap()
//!     .with_track(Some(TrackId(0)));
//! let preset = preset
//!     .with_track(CvTrack::new(TrackId(0), "Kick", 0))
//!     .with_channel(gate)
//!     .with_lane(StepLane::euclidean(TrackId(0), 16, 4, 0));
//!
//! validate_preset(&preset).unwrap();
//! preset.save(user_presets_dir().join("kick.toml")).unwrap();
//! ```

mod error;
mod preset;

/// Platform-specific paths for presets.
pub mod paths;

/// Preset validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

/// Offline playback.
pub mod playback;

pub use error::{ConfigError, FileOp};
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use paths::{
    ensure_user_presets_dir, find_preset, list_user_presets, preset_name_from_path,
    resolve_preset, user_config_dir, user_presets_dir,
};
pub use playback::{Frame, render, schedule};
pub use preset::{
    MAX_BPM, MAX_STEPS_PER_BEAT, MAX_TICK_RATE_HZ, MIN_BPM, SequencerPreset, StepLane,
};
pub use validation::{ValidationError, ValidationResult, validate_preset};
