//! Mutation authority for one collection: atomic transitions, history, notifications.

use std::path::Path;

use tracing::debug;

use crate::history::History;

use super::ids::ItemId;
use super::model::{SettingsOverride, Track, TrackDraft};
use super::state::{CollectionState, Snapshot};

/// What caused a committed state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeKind {
    /// A recorded mutation, labelled for the undo menu.
    Mutation(&'static str),
    Undo,
    Redo,
    Selection,
    /// Lazily resolved metadata or display flags; never recorded.
    Metadata,
}

/// Notification sent to subscribers after every committed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    /// Increments on every committed change.
    pub revision: u64,
    /// Increments only when the ordered set of tracks changes.
    pub items_version: u64,
    pub kind: ChangeKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StateChange)>;

/// Owns a [`CollectionState`] and funnels every write through one commit path.
pub struct CollectionStore {
    state: CollectionState,
    history: History<Snapshot>,
    revision: u64,
    items_version: u64,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl CollectionStore {
    pub fn new(name: impl Into<String>, history_depth: usize) -> Self {
        Self {
            state: CollectionState::new(name),
            history: History::new(history_depth),
            revision: 0,
            items_version: 0,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn state(&self) -> &CollectionState {
        &self.state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn items_version(&self) -> u64 {
        self.items_version
    }

    pub fn history(&self) -> &History<Snapshot> {
        &self.history
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&StateChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        before != self.subscribers.len()
    }

    /// Insert tracks for `drafts` at a top-level index (end when `None`).
    pub fn add_tracks(&mut self, drafts: Vec<TrackDraft>, at: Option<usize>) -> Vec<ItemId> {
        if drafts.is_empty() {
            return Vec::new();
        }
        self.mutate("Add tracks", |state| Some(state.insert_drafts(drafts, at)))
            .unwrap_or_default()
    }

    /// Insert tracks into a group. `None` when the group is missing or too deep.
    pub fn add_tracks_to_group(
        &mut self,
        group_id: &ItemId,
        drafts: Vec<TrackDraft>,
        at: Option<usize>,
    ) -> Option<Vec<ItemId>> {
        self.mutate("Add tracks", |state| {
            state.insert_drafts_into_group(group_id, drafts, at)
        })
    }

    /// Remove an item (track or group) by id. Absent ids are ignored.
    pub fn remove_track(&mut self, id: &ItemId) -> bool {
        self.remove_items(std::slice::from_ref(id)) > 0
    }

    pub fn remove_items(&mut self, ids: &[ItemId]) -> usize {
        self.mutate("Remove tracks", |state| {
            let removed = state.remove_items(ids);
            (removed > 0).then_some(removed)
        })
        .unwrap_or(0)
    }

    pub fn remove_selected_tracks(&mut self) -> usize {
        let ids = self.state.selection().ids().to_vec();
        self.remove_items(&ids)
    }

    /// Move one top-level item; both indices are clamped.
    pub fn move_track(&mut self, from: usize, to: usize) -> bool {
        self.mutate("Move track", |state| state.move_one(from, to).then_some(()))
            .is_some()
    }

    /// Move the whole selection as one block before `to` (post-removal index).
    pub fn move_selected_tracks(&mut self, to: usize) -> bool {
        let ids = self.state.selection().ids().to_vec();
        self.move_items(&ids, to)
    }

    pub fn move_items(&mut self, ids: &[ItemId], to: usize) -> bool {
        self.mutate("Move tracks", |state| state.move_items(ids, to).then_some(()))
            .is_some()
    }

    pub fn move_items_into_group(
        &mut self,
        ids: &[ItemId],
        group_id: &ItemId,
        at: Option<usize>,
    ) -> bool {
        self.mutate("Move into group", |state| {
            state.move_items_into_group(ids, group_id, at).then_some(())
        })
        .is_some()
    }

    pub fn move_selected_into_group(&mut self, group_id: &ItemId) -> bool {
        let ids = self.state.selection().ids().to_vec();
        self.move_items_into_group(&ids, group_id, None)
    }

    /// Wrap the selection into a new group; the new group becomes the selection.
    pub fn group_selected(&mut self, name: impl Into<String>) -> Option<ItemId> {
        let ids = self.state.selection().ids().to_vec();
        let name = name.into();
        let group_id = self.mutate("Group tracks", |state| {
            let group_id = state.group_items(&ids, name)?;
            state.select_range(&group_id, &group_id);
            Some(group_id)
        })?;
        Some(group_id)
    }

    pub fn ungroup(&mut self, id: &ItemId) -> bool {
        self.mutate("Ungroup", |state| state.ungroup(id).then_some(()))
            .is_some()
    }

    pub fn rename_item(&mut self, id: &ItemId, name: impl Into<String>) -> bool {
        let name = name.into();
        self.mutate("Rename", |state| state.rename_item(id, name).then_some(()))
            .is_some()
    }

    pub fn set_track_settings(&mut self, id: &ItemId, settings: SettingsOverride) -> bool {
        if self.state.track(id).is_none() {
            return false;
        }
        self.mutate("Track settings", |state| {
            state.set_settings(id, settings).then_some(())
        })
        .is_some()
    }

    pub fn set_group_settings(&mut self, id: &ItemId, settings: SettingsOverride) -> bool {
        if self.state.group(id).is_none() {
            return false;
        }
        self.mutate("Group settings", |state| {
            state.set_settings(id, settings).then_some(())
        })
        .is_some()
    }

    /// Rename the collection itself.
    pub fn set_name(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        self.mutate("Rename collection", |state| {
            state.set_name(name);
            Some(())
        })
        .is_some()
    }

    /// Replace the whole collection, e.g. after loading a playlist file.
    pub fn replace_all(&mut self, name: impl Into<String>, drafts: Vec<TrackDraft>) -> Vec<ItemId> {
        let name = name.into();
        self.mutate("Load playlist", |state| Some(state.replace_with(name, drafts)))
            .unwrap_or_default()
    }

    pub fn set_group_collapsed(&mut self, id: &ItemId, collapsed: bool) -> bool {
        self.update_unrecorded(ChangeKind::Metadata, |state| {
            state.set_collapsed(id, collapsed)
        })
    }

    /// Set a track's duration if the track still exists. Not recorded in history.
    pub fn update_track_duration(&mut self, id: &ItemId, seconds: f64) -> bool {
        if !seconds.is_finite() || seconds < 0.0 {
            return false;
        }
        self.update_unrecorded(ChangeKind::Metadata, |state| state.set_duration(id, seconds))
    }

    pub fn toggle_track_selection(&mut self, id: &ItemId) -> bool {
        self.update_unrecorded(ChangeKind::Selection, |state| state.toggle_selection(id))
    }

    pub fn select_range(&mut self, anchor: &ItemId, target: &ItemId) -> bool {
        self.update_unrecorded(ChangeKind::Selection, |state| {
            state.select_range(anchor, target)
        })
    }

    pub fn select_all(&mut self) -> bool {
        self.update_unrecorded(ChangeKind::Selection, |state| {
            state.select_all();
            true
        })
    }

    pub fn deselect_all(&mut self) -> bool {
        self.update_unrecorded(ChangeKind::Selection, |state| {
            state.deselect_all();
            true
        })
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        let Some(entry) = self.history.undo(self.state.snapshot()) else {
            return false;
        };
        debug!("Undo '{}' on '{}'", entry.label, self.state.name());
        self.apply_snapshot(entry.state, ChangeKind::Undo);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(entry) = self.history.redo(self.state.snapshot()) else {
            return false;
        };
        debug!("Redo '{}' on '{}'", entry.label, self.state.name());
        self.apply_snapshot(entry.state, ChangeKind::Redo);
        true
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot, kind: ChangeKind) {
        let mut next = self.state.clone();
        next.restore(snapshot);
        next.prune_selection();
        self.history.set_applying(true);
        self.commit(next, kind);
        self.history.set_applying(false);
    }

    /// Run `apply` on a scratch copy; commit only if it succeeds and changed something.
    fn mutate<R>(
        &mut self,
        label: &'static str,
        apply: impl FnOnce(&mut CollectionState) -> Option<R>,
    ) -> Option<R> {
        let mut next = self.state.clone();
        let result = apply(&mut next)?;
        next.prune_selection();
        if next.structure_eq(&self.state) {
            if next.selection() != self.state.selection() {
                self.commit(next, ChangeKind::Selection);
            }
            return Some(result);
        }
        self.commit(next, ChangeKind::Mutation(label));
        Some(result)
    }

    fn update_unrecorded(
        &mut self,
        kind: ChangeKind,
        apply: impl FnOnce(&mut CollectionState) -> bool,
    ) -> bool {
        let mut next = self.state.clone();
        if !apply(&mut next) || next == self.state {
            return false;
        }
        self.replace_state(next, kind);
        true
    }

    fn commit(&mut self, next: CollectionState, kind: ChangeKind) {
        if let ChangeKind::Mutation(label) = &kind {
            self.history.record(*label, self.state.snapshot());
        }
        self.replace_state(next, kind);
    }

    fn replace_state(&mut self, next: CollectionState, kind: ChangeKind) {
        let tracks_changed = next.track_signature() != self.state.track_signature();
        self.state = next;
        self.revision += 1;
        if tracks_changed {
            self.items_version += 1;
        }
        let change = StateChange {
            revision: self.revision,
            items_version: self.items_version,
            kind,
        };
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(&change);
        }
    }

    /// Tracks that share `path`, used to revalidate late metadata.
    pub fn tracks_at_path(&self, path: &Path) -> Vec<&Track> {
        self.state.tracks_with_path(path)
    }
}

impl std::fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionStore")
            .field("state", &self.state)
            .field("revision", &self.revision)
            .field("items_version", &self.items_version)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
