use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collection::ActionAfterTrack;
use crate::settings::PlaybackDefaults;

use super::defaults::{
    MAX_BATCH_SIZE, clamp_pause, clamp_volume, default_backoff_base_ms, default_batch_size,
    default_copy_attempts, default_history_depth, default_volume,
};

/// Errors that may occur while loading or saving `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No suitable config directory found")]
    NoConfigDir,
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config to TOML at {path}: {source}")]
    SerializeToml {
        path: PathBuf,
        source: toml::ser::Error,
    },
}

/// Application settings persisted as TOML. Missing keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub history: HistoryOptions,
    #[serde(default)]
    pub durations: DurationOptions,
    #[serde(default)]
    pub export: ExportOptions,
    #[serde(default)]
    pub playback: PlaybackOptions,
}

impl AppConfig {
    /// Clamp every value into its supported range.
    pub fn normalized(mut self) -> Self {
        self.history.max_depth = self.history.max_depth.max(1);
        self.durations.batch_size = self.durations.batch_size.clamp(1, MAX_BATCH_SIZE);
        self.export.copy_attempts = self.export.copy_attempts.max(1);
        self.playback.pause_between_tracks = clamp_pause(self.playback.pause_between_tracks);
        self.playback.volume = clamp_volume(self.playback.volume);
        self
    }

    pub fn playback_defaults(&self) -> PlaybackDefaults {
        PlaybackDefaults {
            action_after_track: self.playback.action_after_track,
            pause_between_tracks: self.playback.pause_between_tracks,
        }
    }
}

/// Config key: `history.max_depth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryOptions {
    #[serde(default = "default_history_depth")]
    pub max_depth: usize,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self {
            max_depth: default_history_depth(),
        }
    }
}

/// Config key: `durations.batch_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationOptions {
    /// Concurrent metadata requests per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for DurationOptions {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

/// Config keys: `export.copy_attempts`, `export.backoff_base_ms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportOptions {
    #[serde(default = "default_copy_attempts")]
    pub copy_attempts: u32,
    /// First retry delay; doubles on every further attempt.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            copy_attempts: default_copy_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

/// Config keys: `playback.action_after_track`, `playback.pause_between_tracks`,
/// `playback.volume`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackOptions {
    #[serde(default)]
    pub action_after_track: ActionAfterTrack,
    #[serde(default)]
    pub pause_between_tracks: f64,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            action_after_track: ActionAfterTrack::default(),
            pause_between_tracks: 0.0,
            volume: default_volume(),
        }
    }
}
