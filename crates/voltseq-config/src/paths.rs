//! Where presets live on disk.
//!
//! User presets go in the platform config directory:
//!
//! - Linux: `~/.config/voltseq/presets/`
//! - macOS: `~/Library/Application Support/voltseq/presets/`
//! - Windows: `%APPDATA%\voltseq\presets\`
//!
//! [`resolve_preset`] is the lookup used by the CLI: a path, then a user
//! preset by name, then a factory preset by name.

use std::path::{Path, PathBuf};

use crate::error::{ConfigError, FileOp};
use crate::factory_presets::get_factory_preset;
use crate::preset::SequencerPreset;

const APP_NAME: &str = "voltseq";
const PRESETS_SUBDIR: &str = "presets";

/// Per-user configuration directory. Falls back to `./voltseq`.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Per-user presets directory.
pub fn user_presets_dir() -> PathBuf {
    user_config_dir().join(PRESETS_SUBDIR)
}

/// Create the user presets directory if needed and return it.
pub fn ensure_user_presets_dir() -> Result<PathBuf, ConfigError> {
    let dir = user_presets_dir();
    if !dir.exists() {
        std::fs::create_dir_all(&dir)
            .map_err(|e| ConfigError::io(FileOp::CreateDir, &dir, e))?;
    }
    Ok(dir)
}

/// Find a preset file.
///
/// `name` may be a path to an existing file, or a preset name with or
/// without the `.toml` extension, looked up in `dir`.
pub fn find_preset_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };
    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// Find a preset file by path or in the user presets directory.
pub fn find_preset(name: &str) -> Option<PathBuf> {
    find_preset_in(&user_presets_dir(), name)
}

/// Load a preset by path, user preset name, or factory preset name.
pub fn resolve_preset(name: &str) -> Result<SequencerPreset, ConfigError> {
    resolve_preset_in(&user_presets_dir(), name)
}

/// [`resolve_preset`] with an explicit user presets directory.
pub fn resolve_preset_in(dir: &Path, name: &str) -> Result<SequencerPreset, ConfigError> {
    if let Some(path) = find_preset_in(dir, name) {
        return SequencerPreset::load(path);
    }
    get_factory_preset(name).ok_or_else(|| ConfigError::PresetNotFound(name.to_string()))
}

/// `.toml` files in `dir`, sorted. Missing or unreadable directories yield nothing.
pub fn list_presets_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut presets: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    presets.sort();
    presets
}

/// Preset files in the user presets directory.
pub fn list_user_presets() -> Vec<PathBuf> {
    list_presets_in_dir(&user_presets_dir())
}

/// Preset name from a file path (the file stem).
pub fn preset_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}
