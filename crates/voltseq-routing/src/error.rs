//! Error types for routing configuration.

use thiserror::Error;

use crate::track::TrackId;

/// Errors raised while editing the routing configuration.
///
/// These are configuration-time errors only. [`CvRouter::tick`](crate::CvRouter::tick)
/// and [`CvRouter::handle`](crate::CvRouter::handle) never fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// Channel number is not provided by the audio interface.
    #[error("output channel {channel} out of range: interface has {output_count} outputs")]
    ChannelOutOfRange {
        /// Requested channel (zero-based).
        channel: u16,
        /// Outputs available on the interface.
        output_count: u16,
    },

    /// No track with this id is configured.
    #[error("unknown track: {0}")]
    UnknownTrack(TrackId),

    /// A track with this id already exists.
    #[error("duplicate track: {0}")]
    DuplicateTrack(TrackId),

    /// Another output is already bound to this channel.
    #[error("output channel {0} is already bound")]
    DuplicateChannel(u16),

    /// No output is bound to this channel.
    #[error("output channel {0} is not bound")]
    UnboundChannel(u16),
}
