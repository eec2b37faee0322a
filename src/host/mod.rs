//! Boundary to the privileged host: filesystem, metadata, dialogs.
//!
//! The core only talks to the host through [`HostBridge`]. [`FsHost`] is the
//! local implementation; tests substitute their own.

mod audio_support;
mod error;
mod fs_host;
mod path_guard;
mod probe;
mod walk;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::playlist::PlaylistFile;

pub use audio_support::{SUPPORTED_AUDIO_EXTENSIONS, is_supported_audio};
pub use error::HostError;
pub use fs_host::FsHost;
pub use path_guard::validate_path;
pub use walk::AudioWalk;

/// Directory listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub modified: Option<SystemTime>,
    pub is_directory: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl DialogFilter {
    pub fn audio() -> Self {
        Self {
            name: "Audio".to_string(),
            extensions: SUPPORTED_AUDIO_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }

    pub fn playlist() -> Self {
        Self {
            name: "Playlist".to_string(),
            extensions: vec!["json".to_string()],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogOptions {
    pub title: Option<String>,
    pub filters: Vec<DialogFilter>,
    pub default_path: Option<PathBuf>,
    pub file_name: Option<String>,
    pub multiple: bool,
}

/// Capabilities the core consumes from the host process.
///
/// Calls may run on background threads; implementations must be shareable.
pub trait HostBridge: Send + Sync {
    fn audio_duration(&self, path: &Path) -> Result<f64, HostError>;
    fn find_audio_files_recursive(&self, path: &Path) -> Result<Vec<PathBuf>, HostError>;
    fn list_directory(&self, path: &Path) -> Result<Vec<DirEntry>, HostError>;
    fn stat_file(&self, path: &Path) -> Result<FileStat, HostError>;
    fn copy_file(&self, from: &Path, to: &Path) -> Result<(), HostError>;
    fn save_playlist(&self, path: &Path, playlist: &PlaylistFile) -> Result<(), HostError>;
    fn load_playlist(&self, path: &Path) -> Result<PlaylistFile, HostError>;
    /// `None` when the user cancels.
    fn show_open_dialog(&self, options: &DialogOptions) -> Option<Vec<PathBuf>>;
    fn show_save_dialog(&self, options: &DialogOptions) -> Option<PathBuf>;
    fn show_folder_dialog(&self, options: &DialogOptions) -> Option<PathBuf>;
}
