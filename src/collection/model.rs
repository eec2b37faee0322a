use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ids::ItemId;

/// What the preview player does once a track finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionAfterTrack {
    /// Advance to the following track, stopping after the last one.
    #[default]
    Next,
    /// Stop playback.
    Stop,
    /// Play the same track again.
    Repeat,
    /// Advance, wrapping around to the first track.
    Loop,
}

impl ActionAfterTrack {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionAfterTrack::Next => "next",
            ActionAfterTrack::Stop => "stop",
            ActionAfterTrack::Repeat => "repeat",
            ActionAfterTrack::Loop => "loop",
        }
    }
}

/// Partial playback settings attached to a track or group.
///
/// A `None` field means "inherit from the enclosing scope".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsOverride {
    #[serde(default)]
    pub action_after_track: Option<ActionAfterTrack>,
    #[serde(default)]
    pub pause_between_tracks: Option<f64>,
}

impl SettingsOverride {
    pub fn action(action: ActionAfterTrack) -> Self {
        Self {
            action_after_track: Some(action),
            pause_between_tracks: None,
        }
    }

    pub fn with_pause(mut self, seconds: f64) -> Self {
        self.pause_between_tracks = Some(seconds.max(0.0));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.action_after_track.is_none() && self.pause_between_tracks.is_none()
    }
}

/// Description of a track before it receives an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDraft {
    pub path: PathBuf,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl TrackDraft {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            duration: None,
        }
    }

    /// Build a draft named after the file stem of `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = display_name_for(&path);
        Self {
            path,
            name,
            duration: None,
        }
    }

    pub fn with_duration(mut self, seconds: Option<f64>) -> Self {
        self.duration = seconds;
        self
    }
}

/// Derive a human-readable name from a file path.
pub fn display_name_for(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|name| name.to_string_lossy().trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| path.display().to_string())
}

/// A single audio entry owned by one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub id: ItemId,
    pub path: PathBuf,
    pub name: String,
    /// Seconds; filled lazily by the duration pipeline.
    pub duration: Option<f64>,
    pub settings: SettingsOverride,
}

impl Track {
    pub(crate) fn from_draft(draft: TrackDraft) -> Self {
        Self {
            id: ItemId::new(),
            path: draft.path,
            name: draft.name,
            duration: draft.duration,
            settings: SettingsOverride::default(),
        }
    }

    /// Draft carrying this track's path, name and duration (but not its id).
    pub fn to_draft(&self) -> TrackDraft {
        TrackDraft {
            path: self.path.clone(),
            name: self.name.clone(),
            duration: self.duration,
        }
    }
}

/// Named, ordered container of tracks and nested groups.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: ItemId,
    pub name: String,
    pub members: Vec<Item>,
    pub collapsed: bool,
    pub settings: SettingsOverride,
}

impl Group {
    pub(crate) fn new(name: impl Into<String>, members: Vec<Item>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            members,
            collapsed: false,
            settings: SettingsOverride::default(),
        }
    }
}

/// Entry of a collection's ordered item list.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Track(Track),
    Group(Group),
}

impl Item {
    pub fn id(&self) -> &ItemId {
        match self {
            Item::Track(track) => &track.id,
            Item::Group(group) => &group.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Item::Track(track) => &track.name,
            Item::Group(group) => &group.name,
        }
    }

    pub fn as_track(&self) -> Option<&Track> {
        match self {
            Item::Track(track) => Some(track),
            Item::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Item::Group(group) => Some(group),
            Item::Track(_) => None,
        }
    }

    pub fn settings(&self) -> &SettingsOverride {
        match self {
            Item::Track(track) => &track.settings,
            Item::Group(group) => &group.settings,
        }
    }

    /// Number of group levels below this item (0 for tracks and empty groups).
    pub(crate) fn nested_depth(&self) -> usize {
        match self {
            Item::Track(_) => 0,
            Item::Group(group) => {
                1 + group
                    .members
                    .iter()
                    .map(Item::nested_depth)
                    .max()
                    .unwrap_or(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_name_uses_file_stem() {
        let draft = TrackDraft::from_path("/music/set/01 Intro.flac");
        assert_eq!(draft.name, "01 Intro");
        assert_eq!(draft.duration, None);
    }

    #[test]
    fn empty_override_means_inherit() {
        assert!(SettingsOverride::default().is_empty());
        assert!(!SettingsOverride::action(ActionAfterTrack::Stop).is_empty());
    }

    #[test]
    fn nested_depth_counts_group_levels() {
        let leaf = Item::Track(Track::from_draft(TrackDraft::from_path("a.wav")));
        let inner = Item::Group(Group::new("inner", vec![leaf.clone()]));
        let outer = Item::Group(Group::new("outer", vec![inner, leaf.clone()]));
        assert_eq!(leaf.nested_depth(), 0);
        assert_eq!(outer.nested_depth(), 2);
    }
}
