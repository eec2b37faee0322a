//! In-memory host bridge shared by unit tests.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::host::{
    DialogOptions, DirEntry, FileStat, HostBridge, HostError, is_supported_audio, validate_path,
};
use crate::playlist::PlaylistFile;

/// Files and folders are declared up front; copies and saves are recorded.
#[derive(Default)]
pub(crate) struct FakeHost {
    durations: HashMap<PathBuf, f64>,
    folders: HashMap<PathBuf, Vec<DirEntry>>,
    copy_failures: Mutex<HashMap<PathBuf, (usize, ErrorKind)>>,
    pub(crate) copies: Mutex<Vec<(PathBuf, PathBuf)>>,
    pub(crate) saved: Mutex<Vec<(PathBuf, PlaylistFile)>>,
    save_failures: Vec<PathBuf>,
    playlists: HashMap<PathBuf, PlaylistFile>,
    open_dialog: Option<Vec<PathBuf>>,
    save_dialog: Option<PathBuf>,
    pub(crate) duration_calls: AtomicUsize,
}

impl FakeHost {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_duration(mut self, path: &str, seconds: f64) -> Self {
        self.durations.insert(PathBuf::from(path), seconds);
        self
    }

    /// Declare a folder with its direct children; names ending in `/` are folders.
    pub(crate) fn with_folder(mut self, path: &str, children: &[&str]) -> Self {
        let dir = PathBuf::from(path);
        let entries = children
            .iter()
            .map(|child| {
                let is_directory = child.ends_with('/');
                let name = child.trim_end_matches('/').to_string();
                DirEntry {
                    path: dir.join(&name),
                    name,
                    is_directory,
                    size: (!is_directory).then_some(1024),
                }
            })
            .collect();
        self.folders.insert(dir, entries);
        self
    }

    /// Fail the next `times` copies of `from` with `kind`.
    pub(crate) fn failing_copy(self, from: &str, times: usize, kind: ErrorKind) -> Self {
        if let Ok(mut failures) = self.copy_failures.lock() {
            failures.insert(PathBuf::from(from), (times, kind));
        }
        self
    }

    /// Every save to `path` fails with a write error.
    pub(crate) fn failing_save(mut self, path: &str) -> Self {
        self.save_failures.push(PathBuf::from(path));
        self
    }

    pub(crate) fn with_playlist(mut self, path: &str, playlist: PlaylistFile) -> Self {
        self.playlists.insert(PathBuf::from(path), playlist);
        self
    }

    pub(crate) fn with_open_dialog(mut self, paths: &[&str]) -> Self {
        self.open_dialog = Some(paths.iter().map(PathBuf::from).collect());
        self
    }

    pub(crate) fn with_save_dialog(mut self, path: &str) -> Self {
        self.save_dialog = Some(PathBuf::from(path));
        self
    }

    pub(crate) fn copied(&self) -> Vec<(PathBuf, PathBuf)> {
        self.copies.lock().map(|copies| copies.clone()).unwrap_or_default()
    }

    fn not_found(path: &Path) -> HostError {
        HostError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::from(ErrorKind::NotFound),
        }
    }
}

impl HostBridge for FakeHost {
    fn audio_duration(&self, path: &Path) -> Result<f64, HostError> {
        self.duration_calls.fetch_add(1, Ordering::SeqCst);
        self.durations.get(path).copied().ok_or(HostError::Probe {
            path: path.to_path_buf(),
            message: "unreadable".into(),
        })
    }

    fn find_audio_files_recursive(&self, path: &Path) -> Result<Vec<PathBuf>, HostError> {
        let path = validate_path(path, None)?;
        let mut found = Vec::new();
        let mut stack = vec![path];
        while let Some(dir) = stack.pop() {
            let Some(entries) = self.folders.get(&dir) else {
                continue;
            };
            for entry in entries.iter().rev() {
                if entry.is_directory {
                    stack.push(entry.path.clone());
                } else if is_supported_audio(&entry.path) {
                    found.push(entry.path.clone());
                }
            }
        }
        Ok(found)
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<DirEntry>, HostError> {
        let path = validate_path(path, None)?;
        self.folders
            .get(&path)
            .cloned()
            .ok_or_else(|| Self::not_found(&path))
    }

    fn stat_file(&self, path: &Path) -> Result<FileStat, HostError> {
        let path = validate_path(path, None)?;
        if self.folders.contains_key(&path) {
            return Ok(FileStat {
                size: 0,
                modified: None,
                is_directory: true,
            });
        }
        let listed = self
            .folders
            .values()
            .flatten()
            .any(|entry| entry.path == path && !entry.is_directory);
        if listed || self.durations.contains_key(&path) {
            return Ok(FileStat {
                size: 1024,
                modified: None,
                is_directory: false,
            });
        }
        Err(Self::not_found(&path))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), HostError> {
        let from = validate_path(from, None)?;
        let to = validate_path(to, None)?;
        if let Ok(mut failures) = self.copy_failures.lock()
            && let Some((remaining, kind)) = failures.get_mut(&from)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(HostError::Copy {
                from,
                to,
                source: std::io::Error::from(*kind),
            });
        }
        if let Ok(mut copies) = self.copies.lock() {
            copies.push((from, to));
        }
        Ok(())
    }

    fn save_playlist(&self, path: &Path, playlist: &PlaylistFile) -> Result<(), HostError> {
        let path = validate_path(path, None)?;
        playlist.validate()?;
        if self.save_failures.contains(&path) {
            return Err(HostError::Write {
                path,
                source: std::io::Error::from(ErrorKind::PermissionDenied),
            });
        }
        if let Ok(mut saved) = self.saved.lock() {
            saved.push((path, playlist.clone()));
        }
        Ok(())
    }

    fn load_playlist(&self, path: &Path) -> Result<PlaylistFile, HostError> {
        let path = validate_path(path, None)?;
        let saved = self.saved.lock().ok().and_then(|saved| {
            saved
                .iter()
                .rev()
                .find(|(saved_path, _)| *saved_path == path)
                .map(|(_, playlist)| playlist.clone())
        });
        saved
            .or_else(|| self.playlists.get(&path).cloned())
            .ok_or_else(|| Self::not_found(&path))
    }

    fn show_open_dialog(&self, _options: &DialogOptions) -> Option<Vec<PathBuf>> {
        self.open_dialog.clone()
    }

    fn show_save_dialog(&self, _options: &DialogOptions) -> Option<PathBuf> {
        self.save_dialog.clone()
    }

    fn show_folder_dialog(&self, _options: &DialogOptions) -> Option<PathBuf> {
        self.save_dialog.clone()
    }
}
