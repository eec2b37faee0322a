//! Playlist management core: ordered collections with undo, drag-and-drop
//! reconciliation, background duration probing and settings inheritance.
/// Per-user application folders.
pub mod app_dirs;
/// Ordered, selectable, groupable track collections.
pub mod collection;
/// TOML-backed application settings.
pub mod config;
/// Application controller tying workspaces to the host.
pub mod controller;
/// Drop resolution and drag feedback.
pub mod drag_drop;
/// Background duration probing.
pub mod duration;
/// Copying collections to disk.
pub mod export;
/// Audio-only directory browsing.
pub mod file_browser;
pub mod history;
/// Filesystem and dialog boundary.
pub mod host;
pub mod logging;
/// Persisted playlist format.
pub mod playlist;
/// Single-track preview playback.
pub mod preview;
pub mod settings;
pub mod workspace;

#[cfg(test)]
mod test_support;
