//! Copying a collection's files into a folder.

mod retry;

#[cfg(test)]
mod tests;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::{info, warn};

use crate::collection::{CollectionState, TrackDraft};
use crate::host::{HostBridge, HostError};
use crate::playlist::PlaylistFile;

pub use retry::{RetryPolicy, copy_with_retry};

pub const PLAYLIST_FILE_NAME: &str = "playlist.json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unknown export strategy '{0}' (expected flat, numbered or playlist)")]
    UnsupportedStrategy(String),
    #[error("Export destination {0} is not a folder")]
    NotAFolder(PathBuf),
    #[error("Export destination rejected: {0}")]
    Destination(#[source] HostError),
}

/// How exported files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStrategy {
    /// Original file names; collisions get ` (2)`, ` (3)` and so on.
    Flat,
    /// `NN - name` in collection order.
    Numbered,
    /// Numbered copies plus a `playlist.json` pointing at them.
    Playlist,
}

impl ExportStrategy {
    pub const ALL: [ExportStrategy; 3] = [Self::Flat, Self::Numbered, Self::Playlist];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Numbered => "numbered",
            Self::Playlist => "playlist",
        }
    }
}

impl FromStr for ExportStrategy {
    type Err = ExportError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ExportError::UnsupportedStrategy(name.to_string()))
    }
}

/// One planned copy.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedCopy {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub draft: TrackDraft,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExportFailure {
    pub source: PathBuf,
    pub message: String,
}

/// Successes and failures of one export; a failed copy never aborts the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportReport {
    pub copied: Vec<PathBuf>,
    pub failed: Vec<ExportFailure>,
    pub playlist: Option<PathBuf>,
}

impl ExportReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Destination names for every track, in document order.
pub fn plan(state: &CollectionState, dest_dir: &Path, strategy: ExportStrategy) -> Vec<PlannedCopy> {
    let tracks = state.tracks();
    let width = tracks.len().to_string().len().max(2);
    let mut taken: HashSet<String> = HashSet::new();
    tracks
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let file_name = track
                .path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| format!("{}.audio", track.name));
            let target = match strategy {
                ExportStrategy::Flat => unique_name(&file_name, &mut taken),
                ExportStrategy::Numbered | ExportStrategy::Playlist => {
                    format!("{:0width$} - {file_name}", index + 1)
                }
            };
            let destination = dest_dir.join(&target);
            PlannedCopy {
                source: track.path.clone(),
                draft: TrackDraft::new(destination.clone(), track.name.clone())
                    .with_duration(track.duration),
                destination,
            }
        })
        .collect()
}

fn unique_name(file_name: &str, taken: &mut HashSet<String>) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let extension = path
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    let mut candidate = file_name.to_string();
    let mut counter = 2;
    while !taken.insert(candidate.to_lowercase()) {
        candidate = format!("{stem} ({counter}){extension}");
        counter += 1;
    }
    candidate
}

/// Export every track of `state` into `dest_dir` using the named strategy.
pub fn export_collection(
    host: &dyn HostBridge,
    state: &CollectionState,
    dest_dir: &Path,
    strategy_name: &str,
    policy: &RetryPolicy,
) -> Result<ExportReport, ExportError> {
    let strategy: ExportStrategy = strategy_name.parse()?;
    match host.stat_file(dest_dir) {
        Ok(stat) if !stat.is_directory => return Err(ExportError::NotAFolder(dest_dir.to_path_buf())),
        Err(err) if err.is_validation() => return Err(ExportError::Destination(err)),
        _ => {}
    }
    let planned = plan(state, dest_dir, strategy);
    info!(
        "Exporting {} tracks from '{}' to {} ({})",
        planned.len(),
        state.name(),
        dest_dir.display(),
        strategy.as_str()
    );
    let mut report = ExportReport::default();
    let mut exported = Vec::new();
    for copy in planned {
        match copy_with_retry(host, &copy.source, &copy.destination, policy) {
            Ok(_) => {
                report.copied.push(copy.destination);
                exported.push(copy.draft);
            }
            Err(err) => {
                warn!("Export failed for {}: {err}", copy.source.display());
                report.failed.push(ExportFailure {
                    source: copy.source,
                    message: err.to_string(),
                });
            }
        }
    }
    if strategy == ExportStrategy::Playlist {
        let playlist = PlaylistFile {
            name: state.name().to_string(),
            tracks: exported,
        };
        let path = dest_dir.join(PLAYLIST_FILE_NAME);
        match host.save_playlist(&path, &playlist) {
            Ok(()) => report.playlist = Some(path),
            Err(err) => {
                warn!("Failed to write exported playlist {}: {err}", path.display());
                report.failed.push(ExportFailure {
                    source: path,
                    message: err.to_string(),
                });
            }
        }
    }
    info!(
        "Export finished: {} copied, {} failed",
        report.copied.len(),
        report.failed.len()
    );
    Ok(report)
}
