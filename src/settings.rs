//! Effective per-track playback settings.
//!
//! Resolution walks track → enclosing groups (innermost first) → global
//! default and stops at the first scope that sets `action_after_track`.
//! Nothing is cached: settings and group membership change independently.

use serde::{Deserialize, Serialize};

use crate::collection::{ActionAfterTrack, CollectionState, ItemId};

/// Global fallback used when no track or group overrides the action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackDefaults {
    #[serde(default)]
    pub action_after_track: ActionAfterTrack,
    /// Seconds of silence inserted before advancing.
    #[serde(default)]
    pub pause_between_tracks: f64,
}

impl Default for PlaybackDefaults {
    fn default() -> Self {
        Self {
            action_after_track: ActionAfterTrack::Next,
            pause_between_tracks: 0.0,
        }
    }
}

/// Fully resolved settings for one track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveSettings {
    pub action_after_track: ActionAfterTrack,
    pub pause_between_tracks: f64,
}

/// Where the resolved action came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    Track,
    Group(ItemId),
    Default,
}

/// Resolve the effective settings of `track_id`, or `None` if it is not a live track.
pub fn resolve(
    state: &CollectionState,
    track_id: &ItemId,
    defaults: &PlaybackDefaults,
) -> Option<EffectiveSettings> {
    resolve_with_source(state, track_id, defaults).map(|(settings, _)| settings)
}

pub fn resolve_with_source(
    state: &CollectionState,
    track_id: &ItemId,
    defaults: &PlaybackDefaults,
) -> Option<(EffectiveSettings, SettingsSource)> {
    let track = state.track(track_id)?;
    let own_pause = track.settings.pause_between_tracks;
    let fallback_pause = own_pause.unwrap_or(defaults.pause_between_tracks);

    if let Some(action) = track.settings.action_after_track {
        return Some((
            EffectiveSettings {
                action_after_track: action,
                pause_between_tracks: fallback_pause,
            },
            SettingsSource::Track,
        ));
    }

    let groups = state.enclosing_groups(track_id)?;
    for group in groups {
        if let Some(action) = group.settings.action_after_track {
            let pause = group
                .settings
                .pause_between_tracks
                .or(own_pause)
                .unwrap_or(defaults.pause_between_tracks);
            return Some((
                EffectiveSettings {
                    action_after_track: action,
                    pause_between_tracks: pause,
                },
                SettingsSource::Group(group.id.clone()),
            ));
        }
    }

    Some((
        EffectiveSettings {
            action_after_track: defaults.action_after_track,
            pause_between_tracks: fallback_pause,
        },
        SettingsSource::Default,
    ))
}
