use std::io::ErrorKind;
use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by host bridge calls.
#[derive(Debug, Error)]
pub enum HostError {
    /// Path contains parent-directory segments that escape the allowed base.
    #[error("Refusing path outside the allowed folder: {0}")]
    PathTraversal(PathBuf),
    /// Failed to read a file or directory.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to write a file.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to copy a file.
    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    /// The audio file could not be probed for its duration.
    #[error("Audio probe failed for {path}: {message}")]
    Probe { path: PathBuf, message: String },
    /// Playlist JSON could not be parsed.
    #[error("Invalid playlist at {path}: {source}")]
    ParsePlaylist {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Playlist could not be serialized.
    #[error("Failed to serialize playlist {path}: {source}")]
    SerializePlaylist {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Playlist parsed but its contents are unusable.
    #[error("Malformed playlist: {0}")]
    MalformedPlaylist(String),
}

impl HostError {
    /// True for failures worth retrying (busy files, interrupted copies).
    pub fn is_transient(&self) -> bool {
        let kind = match self {
            HostError::Io { source, .. }
            | HostError::Write { source, .. }
            | HostError::Copy { source, .. } => source.kind(),
            _ => return false,
        };
        !matches!(
            kind,
            ErrorKind::NotFound
                | ErrorKind::PermissionDenied
                | ErrorKind::InvalidInput
                | ErrorKind::Unsupported
        )
    }

    /// True for failures rejected before any I/O happened.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            HostError::PathTraversal(_) | HostError::MalformedPlaylist(_)
        )
    }
}
