use std::fs;
use std::path::{Path, PathBuf};

use rfd::FileDialog;
use tracing::{debug, info};

use crate::playlist::PlaylistFile;

use super::path_guard::validate_path;
use super::walk::AudioWalk;
use super::{DialogOptions, DirEntry, FileStat, HostBridge, HostError, probe};

/// Host bridge backed by the local filesystem and native dialogs.
#[derive(Debug, Clone, Default)]
pub struct FsHost {
    base: Option<PathBuf>,
}

impl FsHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope relative paths (and `..` segments) to `base`.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn checked(&self, path: &Path) -> Result<PathBuf, HostError> {
        validate_path(path, self.base.as_deref())
    }
}

impl HostBridge for FsHost {
    fn audio_duration(&self, path: &Path) -> Result<f64, HostError> {
        let path = self.checked(path)?;
        probe::probe_duration(&path)
    }

    fn find_audio_files_recursive(&self, path: &Path) -> Result<Vec<PathBuf>, HostError> {
        let path = self.checked(path)?;
        let found: Vec<PathBuf> = AudioWalk::new(&path).collect();
        debug!("Found {} audio files under {}", found.len(), path.display());
        Ok(found)
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<DirEntry>, HostError> {
        let path = self.checked(path)?;
        let io_error = |source| HostError::Io {
            path: path.clone(),
            source,
        };
        let mut entries = Vec::new();
        for entry in fs::read_dir(&path).map_err(io_error)? {
            let Ok(entry) = entry else {
                continue;
            };
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().trim().to_string(),
                path: entry.path(),
                is_directory: meta.is_dir(),
                size: meta.is_file().then(|| meta.len()),
            });
        }
        Ok(entries)
    }

    fn stat_file(&self, path: &Path) -> Result<FileStat, HostError> {
        let path = self.checked(path)?;
        let meta = fs::metadata(&path).map_err(|source| HostError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(FileStat {
            size: meta.len(),
            modified: meta.modified().ok(),
            is_directory: meta.is_dir(),
        })
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), HostError> {
        let from = self.checked(from)?;
        let to = self.checked(to)?;
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).map_err(|source| HostError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::copy(&from, &to).map_err(|source| HostError::Copy {
            from: from.clone(),
            to: to.clone(),
            source,
        })?;
        Ok(())
    }

    fn save_playlist(&self, path: &Path, playlist: &PlaylistFile) -> Result<(), HostError> {
        let path = self.checked(path)?;
        playlist.validate()?;
        let text = playlist
            .to_json()
            .map_err(|source| HostError::SerializePlaylist {
                path: path.clone(),
                source,
            })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| HostError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, text).map_err(|source| HostError::Write {
            path: path.clone(),
            source,
        })?;
        info!(
            "Saved playlist '{}' ({} tracks) to {}",
            playlist.name,
            playlist.tracks.len(),
            path.display()
        );
        Ok(())
    }

    fn load_playlist(&self, path: &Path) -> Result<PlaylistFile, HostError> {
        let path = self.checked(path)?;
        let text = fs::read_to_string(&path).map_err(|source| HostError::Io {
            path: path.clone(),
            source,
        })?;
        let playlist =
            PlaylistFile::from_json(&text).map_err(|source| HostError::ParsePlaylist {
                path: path.clone(),
                source,
            })?;
        playlist.validate()?;
        Ok(playlist)
    }

    fn show_open_dialog(&self, options: &DialogOptions) -> Option<Vec<PathBuf>> {
        let dialog = dialog_from(options);
        if options.multiple {
            dialog.pick_files()
        } else {
            dialog.pick_file().map(|path| vec![path])
        }
    }

    fn show_save_dialog(&self, options: &DialogOptions) -> Option<PathBuf> {
        dialog_from(options).save_file()
    }

    fn show_folder_dialog(&self, options: &DialogOptions) -> Option<PathBuf> {
        dialog_from(options).pick_folder()
    }
}

fn dialog_from(options: &DialogOptions) -> FileDialog {
    let mut dialog = FileDialog::new();
    if let Some(title) = options.title.as_deref() {
        dialog = dialog.set_title(title);
    }
    for filter in &options.filters {
        dialog = dialog.add_filter(filter.name.as_str(), &filter.extensions);
    }
    if let Some(path) = options.default_path.as_deref() {
        dialog = dialog.set_directory(path);
    }
    if let Some(name) = options.file_name.as_deref() {
        dialog = dialog.set_file_name(name);
    }
    dialog
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::TrackDraft;
    use tempfile::tempdir;

    #[test]
    fn playlist_save_then_load() {
        let dir = tempdir().unwrap();
        let host = FsHost::new();
        let path = dir.path().join("lists/friday.json");
        let playlist = PlaylistFile {
            name: "Friday".into(),
            tracks: vec![TrackDraft::new("/m/a.wav", "A").with_duration(Some(1.0))],
        };
        host.save_playlist(&path, &playlist).unwrap();
        assert_eq!(host.load_playlist(&path).unwrap(), playlist);
    }

    #[test]
    fn garbage_playlist_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let err = FsHost::new().load_playlist(&path).unwrap_err();
        assert!(matches!(err, HostError::ParsePlaylist { .. }));
    }

    #[test]
    fn listing_reports_sizes_for_files_only() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.wav"), b"1234").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let mut entries = FsHost::new().list_directory(dir.path()).unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(entries[0].size, Some(4));
        assert!(entries[1].is_directory);
        assert_eq!(entries[1].size, None);
    }

    #[test]
    fn scoped_host_rejects_escaping_paths() {
        let dir = tempdir().unwrap();
        let host = FsHost::with_base(dir.path());
        let err = host.stat_file(Path::new("../outside.wav")).unwrap_err();
        assert!(matches!(err, HostError::PathTraversal(_)));
    }

    #[test]
    fn copy_creates_destination_folders() {
        let dir = tempdir().unwrap();
        let from = dir.path().join("a.wav");
        fs::write(&from, b"data").unwrap();
        let to = dir.path().join("out/nested/a.wav");
        FsHost::new().copy_file(&from, &to).unwrap();
        assert_eq!(fs::read(&to).unwrap(), b"data");
    }
}
