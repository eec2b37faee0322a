//! Lazy recursive search for audio files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::audio_support::is_supported_audio;

/// Depth-first iterator over audio files below a root.
///
/// Directories are read one at a time as the iterator advances. Entries that
/// cannot be read are logged and skipped. Files within a directory come out in
/// name order, before the files of its subdirectories.
#[derive(Debug, Clone)]
pub struct AudioWalk {
    root: PathBuf,
    pending_dirs: Vec<PathBuf>,
    pending_files: Vec<PathBuf>,
}

impl AudioWalk {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            pending_dirs: vec![root.clone()],
            pending_files: Vec::new(),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start over from the root.
    pub fn restart(&mut self) {
        self.pending_dirs = vec![self.root.clone()];
        self.pending_files.clear();
    }

    fn read_next_dir(&mut self) -> bool {
        let Some(dir) = self.pending_dirs.pop() else {
            return false;
        };
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Skipping unreadable folder {}: {err}", dir.display());
                return true;
            }
        };
        let mut files = Vec::new();
        let mut dirs = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!("Skipping unreadable entry in {}: {err}", dir.display());
                    continue;
                }
            };
            let path = entry.path();
            match entry.file_type() {
                Ok(kind) if kind.is_dir() => dirs.push(path),
                Ok(_) if is_supported_audio(&path) => files.push(path),
                Ok(_) => {}
                Err(err) => warn!("Skipping {}: {err}", path.display()),
            }
        }
        files.sort();
        files.reverse();
        dirs.sort();
        dirs.reverse();
        self.pending_files = files;
        self.pending_dirs.extend(dirs);
        true
    }
}

impl Iterator for AudioWalk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            if let Some(file) = self.pending_files.pop() {
                return Some(file);
            }
            if !self.read_next_dir() {
                return None;
            }
        }
    }
}
