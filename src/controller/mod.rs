//! Application core: workspaces, background durations, preview and the
//! host-facing operations the UI calls into.

mod drag_drop;
mod export;
mod playlists;


use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::collection::{CollectionStore, ItemId, TrackDraft, WorkspaceId};
use crate::config::AppConfig;
use crate::drag_drop::DragFeedback;
use crate::duration::{DurationPipeline, PollSummary};
use crate::export::ExportError;
use crate::host::{HostBridge, HostError, is_supported_audio};
use crate::preview::{PlayerEvent, PreviewError, PreviewOutput, PreviewPlayer, SilentOutput};
use crate::settings::{self, EffectiveSettings, PlaybackDefaults};
use crate::workspace::Workspaces;

pub use drag_drop::{DragDropController, DropOutcome};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Workspace '{0}' is not open")]
    UnknownWorkspace(WorkspaceId),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Preview(#[from] PreviewError),
}

/// What one [`AppController::tick`] did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickSummary {
    pub durations: PollSummary,
    pub scheduled: usize,
    pub preview_started: bool,
}

pub struct AppController {
    config: AppConfig,
    host: Arc<dyn HostBridge>,
    workspaces: Workspaces,
    durations: DurationPipeline,
    preview: PreviewPlayer,
    drag: DragFeedback,
}

impl AppController {
    pub fn new(config: AppConfig, host: Arc<dyn HostBridge>, output: Box<dyn PreviewOutput>) -> Self {
        let config = config.normalized();
        Self {
            workspaces: Workspaces::new(config.history.max_depth),
            durations: DurationPipeline::new(Arc::clone(&host), config.durations.batch_size),
            preview: PreviewPlayer::new(output, config.playback.volume),
            drag: DragFeedback::default(),
            host,
            config,
        }
    }

    /// Controller without audio output, for the CLI and tests.
    pub fn headless(config: AppConfig, host: Arc<dyn HostBridge>) -> Self {
        Self::new(config, host, Box::new(SilentOutput::default()))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn host(&self) -> &dyn HostBridge {
        self.host.as_ref()
    }

    pub fn workspaces(&self) -> &Workspaces {
        &self.workspaces
    }

    pub fn workspace(&self, id: &WorkspaceId) -> Option<&CollectionStore> {
        self.workspaces.get(id)
    }

    /// Open (or fetch) a workspace for mutation.
    pub fn workspace_mut(&mut self, id: &WorkspaceId) -> &mut CollectionStore {
        self.workspaces.get_or_create(id)
    }

    pub fn close_workspace(&mut self, id: &WorkspaceId) -> bool {
        self.durations.cancel(id);
        if self.preview.workspace() == Some(id) {
            self.preview.stop();
        }
        self.workspaces.close(id).is_some()
    }

    pub fn durations(&self) -> &DurationPipeline {
        &self.durations
    }

    pub fn preview(&self) -> &PreviewPlayer {
        &self.preview
    }

    pub fn drag_feedback(&self) -> &DragFeedback {
        &self.drag
    }

    pub fn playback_defaults(&self) -> PlaybackDefaults {
        self.config.playback_defaults()
    }

    pub fn effective_settings(
        &self,
        workspace: &WorkspaceId,
        track: &ItemId,
    ) -> Option<EffectiveSettings> {
        let store = self.workspaces.get(workspace)?;
        settings::resolve(store.state(), track, &self.playback_defaults())
    }

    /// Apply finished background work and schedule durations for workspaces
    /// whose track list changed. Call once per frame or event-loop turn.
    pub fn tick(&mut self, now: Instant) -> TickSummary {
        let mut summary = TickSummary {
            durations: self.durations.poll(&mut self.workspaces),
            ..TickSummary::default()
        };
        for (id, store) in self.workspaces.iter() {
            summary.scheduled += self.durations.schedule(id, store);
        }
        let defaults = self.playback_defaults();
        if let Some(workspace) = self.preview.workspace().cloned()
            && let Some(store) = self.workspaces.get(&workspace)
        {
            summary.preview_started = self.preview.tick(store.state(), &defaults, now);
        }
        summary
    }

    /// Tick until no duration work is outstanding for `workspace`.
    /// Returns false if `timeout` elapsed first.
    pub fn resolve_durations_blocking(&mut self, workspace: &WorkspaceId, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.tick(Instant::now());
            if !self.durations.is_busy(workspace) {
                return true;
            }
            if Instant::now() >= deadline {
                warn!("Timed out resolving durations for '{workspace}'");
                return false;
            }
            thread::sleep(Duration::from_millis(10));
        }
    }

    pub fn play_preview(&mut self, workspace: &WorkspaceId, track: &ItemId) -> Result<(), ControllerError> {
        let store = self
            .workspaces
            .get(workspace)
            .ok_or_else(|| ControllerError::UnknownWorkspace(workspace.clone()))?;
        self.preview.play_track(workspace, store.state(), track)?;
        Ok(())
    }

    pub fn toggle_preview_pause(&mut self) {
        self.preview.toggle_pause();
    }

    pub fn stop_preview(&mut self) {
        self.preview.stop();
    }

    pub fn seek_preview(&mut self, seconds: f64) -> Result<(), ControllerError> {
        self.preview.seek(seconds)?;
        Ok(())
    }

    pub fn set_preview_volume(&mut self, volume: f32) {
        self.preview.set_volume(volume);
        self.config.playback.volume = self.preview.volume();
    }

    /// Forward an output event for the previewed workspace.
    pub fn handle_preview_event(&mut self, event: PlayerEvent, now: Instant) {
        let defaults = self.playback_defaults();
        let Some(workspace) = self.preview.workspace().cloned() else {
            return;
        };
        match self.workspaces.get(&workspace) {
            Some(store) => self.preview.handle_event(event, store.state(), &defaults, now),
            None => self.preview.stop(),
        }
    }

    /// Turn dropped or picked paths into drafts: audio files are kept,
    /// folders are searched recursively, everything else is skipped.
    pub fn expand_paths(&self, paths: &[PathBuf]) -> Vec<TrackDraft> {
        let mut drafts = Vec::new();
        for path in paths {
            if is_supported_audio(path) {
                drafts.push(TrackDraft::from_path(path.clone()));
                continue;
            }
            match self.host.stat_file(path) {
                Ok(stat) if stat.is_directory => match self.host.find_audio_files_recursive(path) {
                    Ok(found) => {
                        debug!("Expanded {} into {} files", path.display(), found.len());
                        drafts.extend(found.into_iter().map(TrackDraft::from_path));
                    }
                    Err(err) => warn!("Skipping folder {}: {err}", path.display()),
                },
                Ok(_) => debug!("Skipping non-audio file {}", path.display()),
                Err(err) => warn!("Skipping {}: {err}", path.display()),
            }
        }
        drafts
    }

    fn store_mut(&mut self, id: &WorkspaceId) -> Result<&mut CollectionStore, ControllerError> {
        self.workspaces
            .get_mut(id)
            .ok_or_else(|| ControllerError::UnknownWorkspace(id.clone()))
    }

    fn store(&self, id: &WorkspaceId) -> Result<&CollectionStore, ControllerError> {
        self.workspaces
            .get(id)
            .ok_or_else(|| ControllerError::UnknownWorkspace(id.clone()))
    }
}

impl std::fmt::Debug for AppController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppController")
            .field("workspaces", &self.workspaces.len())
            .field("durations", &self.durations)
            .field("preview", &self.preview)
            .finish()
    }
}

fn playlist_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        "playlist.json".to_string()
    } else {
        format!("{cleaned}.json")
    }
}

fn log_loaded(workspace: &WorkspaceId, path: &Path, count: usize) {
    info!(
        "Loaded {count} tracks into '{workspace}' from {}",
        path.display()
    );
}
