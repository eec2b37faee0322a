//! Single-track preview playback that follows each track's effective
//! after-track action.

mod output;

#[cfg(test)]
mod tests;

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::collection::{ActionAfterTrack, CollectionState, ItemId, WorkspaceId};
use crate::settings::{self, PlaybackDefaults};

pub use output::{PreviewError, PreviewOutput, RodioOutput, SilentOutput};

/// Notifications from the audio output.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Loaded,
    Position(f64),
    Ended,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Idle,
    Loading,
    Playing,
    Paused,
    /// Silence between tracks; the next track starts at the deadline.
    Waiting,
}

pub struct PreviewPlayer {
    output: Box<dyn PreviewOutput>,
    status: PlaybackStatus,
    workspace: Option<WorkspaceId>,
    current: Option<ItemId>,
    position: f64,
    volume: f32,
    pending: Option<(Instant, ItemId)>,
    last_error: Option<String>,
}

impl PreviewPlayer {
    pub fn new(output: Box<dyn PreviewOutput>, volume: f32) -> Self {
        let mut player = Self {
            output,
            status: PlaybackStatus::Idle,
            workspace: None,
            current: None,
            position: 0.0,
            volume: 1.0,
            pending: None,
            last_error: None,
        };
        player.set_volume(volume);
        player
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn current(&self) -> Option<&ItemId> {
        self.current.as_ref()
    }

    pub fn workspace(&self) -> Option<&WorkspaceId> {
        self.workspace.as_ref()
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Track scheduled to start after the current pause, with its start time.
    pub fn pending(&self) -> Option<(Instant, &ItemId)> {
        self.pending.as_ref().map(|(at, id)| (*at, id))
    }

    pub fn play_track(
        &mut self,
        workspace: &WorkspaceId,
        state: &CollectionState,
        id: &ItemId,
    ) -> Result<(), PreviewError> {
        let track = state
            .track(id)
            .ok_or_else(|| PreviewError::UnknownTrack(id.to_string()))?;
        self.pending = None;
        self.status = PlaybackStatus::Loading;
        if let Err(err) = self.output.load(&track.path) {
            self.fail(err.to_string());
            return Err(err);
        }
        self.output.set_volume(self.volume);
        self.output.play();
        self.status = PlaybackStatus::Playing;
        info!("Previewing '{}' from '{workspace}'", track.name);
        self.workspace = Some(workspace.clone());
        self.current = Some(id.clone());
        self.position = 0.0;
        self.last_error = None;
        Ok(())
    }

    /// Pause or resume. Returns the resulting status.
    pub fn toggle_pause(&mut self) -> PlaybackStatus {
        match self.status {
            PlaybackStatus::Playing | PlaybackStatus::Loading => {
                self.output.pause();
                self.status = PlaybackStatus::Paused;
            }
            PlaybackStatus::Paused => {
                self.output.play();
                self.status = PlaybackStatus::Playing;
            }
            PlaybackStatus::Idle | PlaybackStatus::Waiting => {}
        }
        self.status
    }

    pub fn stop(&mut self) {
        self.output.stop();
        self.status = PlaybackStatus::Idle;
        self.current = None;
        self.pending = None;
        self.position = 0.0;
    }

    pub fn seek(&mut self, seconds: f64) -> Result<(), PreviewError> {
        if self.current.is_none() {
            return Err(PreviewError::NothingLoaded);
        }
        let seconds = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        self.output.seek(seconds)?;
        self.position = seconds;
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.output.set_volume(self.volume);
    }

    /// React to an output event against the workspace's live state.
    pub fn handle_event(
        &mut self,
        event: PlayerEvent,
        state: &CollectionState,
        defaults: &PlaybackDefaults,
        now: Instant,
    ) {
        let Some(current) = self.current.clone() else {
            return;
        };
        if state.track(&current).is_none() {
            debug!("Previewed track {current} was removed; stopping");
            self.stop();
            return;
        }
        match event {
            PlayerEvent::Loaded => {
                if self.status == PlaybackStatus::Loading {
                    self.status = PlaybackStatus::Playing;
                }
            }
            PlayerEvent::Position(seconds) => self.position = seconds,
            PlayerEvent::Error(message) => {
                warn!("Preview error on {current}: {message}");
                self.fail(message);
            }
            PlayerEvent::Ended => self.advance(&current, state, defaults, now),
        }
    }

    /// Start a scheduled track once its pause has elapsed, and turn output
    /// progress into events. Returns true when a new track started.
    pub fn tick(
        &mut self,
        state: &CollectionState,
        defaults: &PlaybackDefaults,
        now: Instant,
    ) -> bool {
        if let Some((due, id)) = self.pending.clone() {
            if now < due {
                return false;
            }
            self.pending = None;
            let Some(workspace) = self.workspace.clone() else {
                return false;
            };
            if self.play_track(&workspace, state, &id).is_ok() {
                return true;
            }
            self.stop();
            return false;
        }
        if matches!(self.status, PlaybackStatus::Playing) {
            if let Some(position) = self.output.position() {
                self.handle_event(PlayerEvent::Position(position), state, defaults, now);
            }
            if self.output.finished() {
                self.handle_event(PlayerEvent::Ended, state, defaults, now);
                return self.status == PlaybackStatus::Playing;
            }
        }
        false
    }

    fn advance(
        &mut self,
        current: &ItemId,
        state: &CollectionState,
        defaults: &PlaybackDefaults,
        now: Instant,
    ) {
        let Some(effective) = settings::resolve(state, current, defaults) else {
            self.stop();
            return;
        };
        let next = match effective.action_after_track {
            ActionAfterTrack::Stop => None,
            ActionAfterTrack::Repeat => Some(current.clone()),
            ActionAfterTrack::Next => track_after(state, current, false),
            ActionAfterTrack::Loop => track_after(state, current, true),
        };
        let Some(next) = next else {
            debug!("Preview finished after {current}");
            self.stop();
            return;
        };
        let pause = effective.pause_between_tracks;
        if pause > 0.0 && pause.is_finite() {
            self.output.stop();
            self.status = PlaybackStatus::Waiting;
            self.pending = Some((now + Duration::from_secs_f64(pause), next));
            return;
        }
        if let Some(workspace) = self.workspace.clone() {
            let _ = self.play_track(&workspace, state, &next);
        }
    }

    fn fail(&mut self, message: String) {
        self.output.stop();
        self.status = PlaybackStatus::Idle;
        self.current = None;
        self.pending = None;
        self.last_error = Some(message);
    }
}

impl std::fmt::Debug for PreviewPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewPlayer")
            .field("status", &self.status)
            .field("current", &self.current)
            .field("volume", &self.volume)
            .finish()
    }
}

/// Next track in document order; wraps to the first when `wrap` is set.
fn track_after(state: &CollectionState, current: &ItemId, wrap: bool) -> Option<ItemId> {
    let tracks = state.tracks();
    let index = tracks.iter().position(|track| &track.id == current)?;
    match tracks.get(index + 1) {
        Some(next) => Some(next.id.clone()),
        None if wrap => tracks.first().map(|track| track.id.clone()),
        None => None,
    }
}
