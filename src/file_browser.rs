//! Folder browser workspace used to pick audio files for a collection.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::collection::TrackDraft;
use crate::host::{DirEntry, HostBridge, HostError, is_supported_audio, validate_path};

/// Result of activating an entry.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryAction {
    OpenDir(PathBuf),
    /// An audio file, ready to add to a collection or preview.
    Track(TrackDraft),
}

/// Lists one folder at a time through the host: folders first, then audio
/// files, both in case-insensitive name order.
#[derive(Debug, Clone)]
pub struct FileBrowser {
    current_dir: PathBuf,
    entries: Vec<DirEntry>,
}

impl FileBrowser {
    pub fn new(start: impl Into<PathBuf>) -> Self {
        Self {
            current_dir: start.into(),
            entries: Vec::new(),
        }
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// Entries from the last refresh.
    pub fn entries(&self) -> &[DirEntry] {
        &self.entries
    }

    /// Re-read the current folder.
    pub fn refresh(&mut self, host: &dyn HostBridge) -> Result<&[DirEntry], HostError> {
        let dir = validate_path(&self.current_dir, None)?;
        let mut entries: Vec<DirEntry> = host
            .list_directory(&dir)?
            .into_iter()
            .filter(|entry| entry.is_directory || is_supported_audio(&entry.path))
            .collect();
        entries.sort_by(compare_entries);
        debug!("Listed {} entries in {}", entries.len(), dir.display());
        self.entries = entries;
        Ok(&self.entries)
    }

    /// Switch folders. The current folder only changes if listing succeeds.
    pub fn navigate(&mut self, host: &dyn HostBridge, dir: &Path) -> Result<(), HostError> {
        let previous = std::mem::replace(&mut self.current_dir, validate_path(dir, None)?);
        if let Err(err) = self.refresh(host) {
            self.current_dir = previous;
            return Err(err);
        }
        Ok(())
    }

    /// Move to the parent folder. `false` at the filesystem root.
    pub fn go_up(&mut self, host: &dyn HostBridge) -> Result<bool, HostError> {
        let Some(parent) = self.current_dir.parent().map(Path::to_path_buf) else {
            return Ok(false);
        };
        self.navigate(host, &parent)?;
        Ok(true)
    }

    pub fn open(&mut self, host: &dyn HostBridge, entry: &DirEntry) -> Result<EntryAction, HostError> {
        if entry.is_directory {
            self.navigate(host, &entry.path)?;
            return Ok(EntryAction::OpenDir(self.current_dir.clone()));
        }
        let path = validate_path(&entry.path, None)?;
        Ok(EntryAction::Track(TrackDraft::from_path(path)))
    }

    /// Drafts for every audio file in the current listing.
    pub fn audio_drafts(&self) -> Vec<TrackDraft> {
        self.entries
            .iter()
            .filter(|entry| !entry.is_directory)
            .map(|entry| TrackDraft::from_path(entry.path.clone()))
            .collect()
    }
}

fn compare_entries(a: &DirEntry, b: &DirEntry) -> Ordering {
    match (a.is_directory, b.is_directory) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeHost;

    fn host() -> FakeHost {
        FakeHost::new()
            .with_folder("/music", &["b.wav", "notes.txt", "Zed/", "A.flac", "drums/"])
            .with_folder("/music/drums", &["kick.wav"])
            .with_folder("/", &["music/"])
    }

    fn names(browser: &FileBrowser) -> Vec<&str> {
        browser.entries().iter().map(|entry| entry.name.as_str()).collect()
    }

    #[test]
    fn folders_first_then_audio_by_name() {
        let host = host();
        let mut browser = FileBrowser::new("/music");
        browser.refresh(&host).unwrap();
        assert_eq!(names(&browser), ["drums", "Zed", "A.flac", "b.wav"]);
        assert_eq!(browser.audio_drafts().len(), 2);
    }

    #[test]
    fn open_navigates_folders_and_yields_drafts_for_files() {
        let host = host();
        let mut browser = FileBrowser::new("/music");
        browser.refresh(&host).unwrap();
        let drums = browser.entries()[0].clone();
        assert_eq!(
            browser.open(&host, &drums).unwrap(),
            EntryAction::OpenDir(PathBuf::from("/music/drums"))
        );
        assert_eq!(names(&browser), ["kick.wav"]);

        let kick = browser.entries()[0].clone();
        match browser.open(&host, &kick).unwrap() {
            EntryAction::Track(draft) => assert_eq!(draft.name, "kick"),
            other => panic!("expected track, got {other:?}"),
        }

        assert!(browser.go_up(&host).unwrap());
        assert_eq!(browser.current_dir(), Path::new("/music"));
    }

    #[test]
    fn failed_navigation_keeps_current_folder() {
        let host = host();
        let mut browser = FileBrowser::new("/music");
        browser.refresh(&host).unwrap();
        assert!(browser.navigate(&host, Path::new("/missing")).is_err());
        assert_eq!(browser.current_dir(), Path::new("/music"));
        assert!(matches!(
            browser.navigate(&host, Path::new("/music/../etc")),
            Err(HostError::PathTraversal(_))
        ));
    }
}
