//! Persisted playlist format: `{ name, tracks: [{ path, name, duration? }] }`.
//!
//! Ids are never written; loading mints fresh ones. Groups are flattened into
//! their tracks in document order.

use serde::{Deserialize, Serialize};

use crate::collection::{CollectionState, TrackDraft};
use crate::host::HostError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistFile {
    pub name: String,
    pub tracks: Vec<TrackDraft>,
}

impl PlaylistFile {
    pub fn from_state(state: &CollectionState) -> Self {
        Self {
            name: state.name().to_string(),
            tracks: state.tracks().iter().map(|track| track.to_draft()).collect(),
        }
    }

    /// Parse playlist JSON. Call [`PlaylistFile::validate`] before trusting the contents.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reject structurally valid JSON whose contents cannot become tracks.
    pub fn validate(&self) -> Result<(), HostError> {
        for (index, track) in self.tracks.iter().enumerate() {
            if track.path.as_os_str().is_empty() {
                return Err(HostError::MalformedPlaylist(format!(
                    "track {} has an empty path",
                    index + 1
                )));
            }
            if let Some(duration) = track.duration
                && (!duration.is_finite() || duration < 0.0)
            {
                return Err(HostError::MalformedPlaylist(format!(
                    "track {} has an invalid duration {duration}",
                    index + 1
                )));
            }
        }
        Ok(())
    }

    /// Drafts ready for insertion; blank names fall back to the file name.
    pub fn into_drafts(self) -> (String, Vec<TrackDraft>) {
        let tracks = self
            .tracks
            .into_iter()
            .map(|draft| {
                if draft.name.trim().is_empty() {
                    TrackDraft::from_path(draft.path).with_duration(draft.duration)
                } else {
                    draft
                }
            })
            .collect();
        (self.name, tracks)
    }
}
