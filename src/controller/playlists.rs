use std::path::{Path, PathBuf};

use tracing::info;

use crate::collection::{ItemId, WorkspaceId};
use crate::host::{DialogFilter, DialogOptions};
use crate::playlist::PlaylistFile;

use super::{AppController, ControllerError, log_loaded, playlist_file_name};

impl AppController {
    /// Write the workspace as a playlist file.
    pub fn save_workspace(&self, workspace: &WorkspaceId, path: &Path) -> Result<(), ControllerError> {
        let store = self.store(workspace)?;
        let playlist = PlaylistFile::from_state(store.state());
        self.host.save_playlist(path, &playlist)?;
        Ok(())
    }

    /// Replace the workspace's items with a playlist file. Recorded in history,
    /// so the load itself can be undone.
    pub fn load_workspace(
        &mut self,
        workspace: &WorkspaceId,
        path: &Path,
    ) -> Result<Vec<ItemId>, ControllerError> {
        let playlist = self.host.load_playlist(path)?;
        let (name, drafts) = playlist.into_drafts();
        let ids = self.workspace_mut(workspace).replace_all(name, drafts);
        log_loaded(workspace, path, ids.len());
        Ok(ids)
    }

    /// Ask for a playlist file and load it. `Ok(None)` when cancelled.
    pub fn pick_and_load_playlist(
        &mut self,
        workspace: &WorkspaceId,
    ) -> Result<Option<Vec<ItemId>>, ControllerError> {
        let options = DialogOptions {
            title: Some("Open playlist".into()),
            filters: vec![DialogFilter::playlist()],
            ..DialogOptions::default()
        };
        let Some(path) = self
            .host
            .show_open_dialog(&options)
            .and_then(|paths| paths.into_iter().next())
        else {
            return Ok(None);
        };
        self.load_workspace(workspace, &path).map(Some)
    }

    /// Ask for a destination and save. `Ok(None)` when cancelled.
    pub fn pick_and_save_playlist(
        &self,
        workspace: &WorkspaceId,
    ) -> Result<Option<PathBuf>, ControllerError> {
        let store = self.store(workspace)?;
        let options = DialogOptions {
            title: Some("Save playlist".into()),
            filters: vec![DialogFilter::playlist()],
            file_name: Some(playlist_file_name(store.state().name())),
            ..DialogOptions::default()
        };
        let Some(path) = self.host.show_save_dialog(&options) else {
            return Ok(None);
        };
        self.save_workspace(workspace, &path)?;
        Ok(Some(path))
    }

    /// Ask for audio files or folders and append them. `Ok(None)` when cancelled.
    pub fn pick_and_add_files(
        &mut self,
        workspace: &WorkspaceId,
    ) -> Result<Option<Vec<ItemId>>, ControllerError> {
        let options = DialogOptions {
            title: Some("Add audio files".into()),
            filters: vec![DialogFilter::audio()],
            multiple: true,
            ..DialogOptions::default()
        };
        let Some(paths) = self.host.show_open_dialog(&options) else {
            return Ok(None);
        };
        let drafts = self.expand_paths(&paths);
        let store = self.store_mut(workspace)?;
        let ids = store.add_tracks(drafts, None);
        info!("Added {} tracks to '{workspace}'", ids.len());
        Ok(Some(ids))
    }
}
