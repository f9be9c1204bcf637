//! Error types for preset loading, saving and routing setup.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use voltseq_routing::RoutingError;

use crate::validation::ValidationError;

/// File system operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    /// Reading a preset file.
    Read,
    /// Writing a preset file.
    Write,
    /// Creating the directory a preset lives in.
    CreateDir,
}

impl fmt::Display for FileOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileOp::Read => "read",
            FileOp::Write => "write",
            FileOp::CreateDir => "create directory",
        })
    }
}

/// Errors from the configuration layer.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O on a preset path failed.
    #[error("cannot {op} '{path}': {source}")]
    Io {
        /// What was being attempted.
        op: FileOp,
        /// Path involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid preset.
    #[error("invalid preset TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The preset could not be encoded.
    #[error("cannot encode preset as TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// No file, user preset or factory preset matched the name.
    #[error("no preset named '{0}'")]
    PresetNotFound(String),

    /// The preset failed validation.
    #[error("preset is invalid: {0}")]
    Validation(#[from] ValidationError),

    /// The router rejected the preset's tracks or channels.
    #[error("preset routing rejected: {0}")]
    Routing(#[from] RoutingError),
}

impl ConfigError {
    /// Wrap an I/O error with the operation and path it came from.
    pub fn io(op: FileOp, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use voltseq_routing::TrackId;

    #[test]
    fn io_error_names_operation_and_path() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ConfigError::io(FileOp::CreateDir, "/presets", source);
        assert_eq!(err.to_string(), "cannot create directory '/presets': denied");
        assert!(err.source().is_some());
    }

    #[test]
    fn routing_and_validation_convert() {
        let err: ConfigError = RoutingError::UnknownTrack(TrackId(9)).into();
        assert!(matches!(err, ConfigError::Routing(_)));

        let err: ConfigError = ValidationError::DuplicateTrackId(TrackId(1)).into();
        assert!(err.to_string().starts_with("preset is invalid:"), "got: {err}");
    }
}
