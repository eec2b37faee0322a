//! Collection state and its pure transition logic.
//!
//! Nothing here records history or notifies anyone; [`super::CollectionStore`]
//! runs every transition against a scratch copy and commits the result.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::ids::ItemId;
use super::model::{Group, Item, SettingsOverride, Track, TrackDraft};
use super::reorder;
use super::selection::Selection;
use super::tree;

/// Maximum number of nested group levels in a collection.
pub const MAX_GROUP_DEPTH: usize = 4;

/// Row of the flattened, display-ready item list.
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleRow {
    pub id: ItemId,
    /// Number of enclosing groups.
    pub depth: usize,
    pub is_group: bool,
}

/// Items, selection and name of one collection workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState {
    name: String,
    items: Vec<Item>,
    selection: Selection,
}

/// The recorded part of a collection: everything except the selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub(crate) name: String,
    pub(crate) items: Vec<Item>,
}

impl CollectionState {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
            selection: Selection::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level items in user order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: &ItemId) -> Option<&Item> {
        tree::find(&self.items, id)
    }

    pub fn track(&self, id: &ItemId) -> Option<&Track> {
        self.find(id).and_then(Item::as_track)
    }

    pub fn group(&self, id: &ItemId) -> Option<&Group> {
        self.find(id).and_then(Item::as_group)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.find(id).is_some()
    }

    /// Index of the top-level item that is, or encloses, `id`.
    pub fn top_level_index(&self, id: &ItemId) -> Option<usize> {
        tree::top_level_index(&self.items, id)
    }

    /// Parent group (`None` at top level) and index among its siblings.
    pub fn position_of(&self, id: &ItemId) -> Option<(Option<ItemId>, usize)> {
        tree::locate(&self.items, id)
    }

    /// Groups enclosing `id`, innermost first.
    pub fn enclosing_groups(&self, id: &ItemId) -> Option<Vec<&Group>> {
        tree::ancestors(&self.items, id)
    }

    pub fn is_descendant_of(&self, descendant: &ItemId, ancestor: &ItemId) -> bool {
        tree::is_descendant_of(&self.items, descendant, ancestor)
    }

    /// Every track in document order, including group members.
    pub fn tracks(&self) -> Vec<&Track> {
        tree::tracks(&self.items)
    }

    pub fn tracks_with_path(&self, path: &Path) -> Vec<&Track> {
        tree::tracks_with_path(&self.items, path)
    }

    pub fn track_count(&self) -> usize {
        self.tracks().len()
    }

    /// Sum of all known durations, in seconds.
    pub fn total_duration(&self) -> f64 {
        self.tracks().iter().filter_map(|track| track.duration).sum()
    }

    /// Sum of known member durations, recomputed from the members on every call.
    pub fn group_duration(&self, id: &ItemId) -> Option<f64> {
        let group = self.group(id)?;
        Some(
            tree::tracks(&group.members)
                .iter()
                .filter_map(|track| track.duration)
                .sum(),
        )
    }

    pub fn group_track_count(&self, id: &ItemId) -> Option<usize> {
        let group = self.group(id)?;
        Some(tree::tracks(&group.members).len())
    }

    /// Flattened rows; members of collapsed groups are hidden.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        let mut rows = Vec::new();
        push_rows(&self.items, 0, &mut rows);
        rows
    }

    /// Drafts for the given ids in document order. Groups contribute their tracks.
    pub fn drafts_for(&self, ids: &[ItemId]) -> Vec<TrackDraft> {
        let selected: HashSet<ItemId> = ids.iter().cloned().collect();
        tree::block_order(&self.items, &selected)
            .iter()
            .filter_map(|id| self.find(id))
            .flat_map(|item| match item {
                Item::Track(track) => vec![track.to_draft()],
                Item::Group(group) => tree::tracks(&group.members)
                    .into_iter()
                    .map(Track::to_draft)
                    .collect(),
            })
            .collect()
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            name: self.name.clone(),
            items: self.items.clone(),
        }
    }

    /// Restore a recorded snapshot, keeping durations resolved since it was
    /// taken and the current collapsed flag of every group that survives.
    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        let collapsed: Vec<(ItemId, bool)> = tree::groups(&self.items)
            .into_iter()
            .map(|group| (group.id.clone(), group.collapsed))
            .collect();
        let known: Vec<(ItemId, PathBuf, f64)> = self
            .tracks()
            .iter()
            .filter_map(|track| {
                track
                    .duration
                    .map(|duration| (track.id.clone(), track.path.clone(), duration))
            })
            .collect();
        self.name = snapshot.name;
        self.items = snapshot.items;
        for (id, path, duration) in known {
            if let Some(Item::Track(track)) = tree::find_mut(&mut self.items, &id)
                && track.path == path
                && track.duration.is_none()
            {
                track.duration = Some(duration);
            }
        }
        for (id, flag) in collapsed {
            if let Some(Item::Group(group)) = tree::find_mut(&mut self.items, &id) {
                group.collapsed = flag;
            }
        }
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Insert fresh tracks among the top-level items; `None` appends.
    pub(crate) fn insert_drafts(&mut self, drafts: Vec<TrackDraft>, at: Option<usize>) -> Vec<ItemId> {
        let at = at.unwrap_or(self.items.len()).min(self.items.len());
        let tracks: Vec<Item> = drafts
            .into_iter()
            .map(|draft| Item::Track(Track::from_draft(draft)))
            .collect();
        let ids = tracks.iter().map(|item| item.id().clone()).collect();
        self.items.splice(at..at, tracks);
        ids
    }

    pub(crate) fn insert_drafts_into_group(
        &mut self,
        group_id: &ItemId,
        drafts: Vec<TrackDraft>,
        at: Option<usize>,
    ) -> Option<Vec<ItemId>> {
        let level = tree::level_of(&self.items, group_id)?;
        if level + 1 > MAX_GROUP_DEPTH {
            return None;
        }
        let members = tree::members_mut(&mut self.items, Some(group_id))?;
        let at = at.unwrap_or(members.len()).min(members.len());
        let tracks: Vec<Item> = drafts
            .into_iter()
            .map(|draft| Item::Track(Track::from_draft(draft)))
            .collect();
        let ids = tracks.iter().map(|item| item.id().clone()).collect();
        members.splice(at..at, tracks);
        Some(ids)
    }

    /// Replace every item with tracks built from `drafts`.
    pub(crate) fn replace_with(&mut self, name: String, drafts: Vec<TrackDraft>) -> Vec<ItemId> {
        self.name = name;
        self.items.clear();
        self.insert_drafts(drafts, None)
    }

    pub(crate) fn remove_items(&mut self, ids: &[ItemId]) -> usize {
        let removed = ids
            .iter()
            .filter(|id| tree::take(&mut self.items, id).is_some())
            .count();
        self.prune_selection();
        removed
    }

    pub(crate) fn move_one(&mut self, from: usize, to: usize) -> bool {
        reorder::move_one(&mut self.items, from, to)
    }

    /// Pull `ids` out of the tree and reinsert them as one block among the
    /// top-level items at `target` (post-removal index space).
    pub(crate) fn move_items(&mut self, ids: &[ItemId], target: usize) -> bool {
        let selected: HashSet<ItemId> = ids.iter().cloned().collect();
        let order = tree::block_order(&self.items, &selected);
        if order.is_empty() {
            return false;
        }
        if order
            .iter()
            .all(|id| self.items.iter().any(|item| item.id() == id))
        {
            let indices: Vec<usize> = self
                .items
                .iter()
                .enumerate()
                .filter(|(_, item)| selected.contains(item.id()))
                .map(|(index, _)| index)
                .collect();
            return reorder::move_block(&mut self.items, &indices, target);
        }
        let block: Vec<Item> = order
            .iter()
            .filter_map(|id| tree::take(&mut self.items, id))
            .collect();
        let target = target.min(self.items.len());
        self.items.splice(target..target, block);
        true
    }

    /// Move `ids` into `group_id`, appending or inserting at `at`.
    pub(crate) fn move_items_into_group(
        &mut self,
        ids: &[ItemId],
        group_id: &ItemId,
        at: Option<usize>,
    ) -> bool {
        if self.group(group_id).is_none() {
            return false;
        }
        let selected: HashSet<ItemId> = ids.iter().cloned().collect();
        if selected.contains(group_id)
            || selected
                .iter()
                .any(|id| self.is_descendant_of(group_id, id))
        {
            return false;
        }
        let order = tree::block_order(&self.items, &selected);
        if order.is_empty() {
            return false;
        }
        let Some(level) = tree::level_of(&self.items, group_id) else {
            return false;
        };
        let deepest = order
            .iter()
            .filter_map(|id| self.find(id))
            .map(Item::nested_depth)
            .max()
            .unwrap_or(0);
        if level + 1 + deepest > MAX_GROUP_DEPTH {
            return false;
        }
        let block: Vec<Item> = order
            .iter()
            .filter_map(|id| tree::take(&mut self.items, id))
            .collect();
        let Some(members) = tree::members_mut(&mut self.items, Some(group_id)) else {
            return false;
        };
        let at = at.unwrap_or(members.len()).min(members.len());
        members.splice(at..at, block);
        true
    }

    /// Wrap `ids` into a new group placed where the first of them was.
    pub(crate) fn group_items(&mut self, ids: &[ItemId], name: String) -> Option<ItemId> {
        let selected: HashSet<ItemId> = ids.iter().cloned().collect();
        let order = tree::block_order(&self.items, &selected);
        let first = order.first()?;
        let (parent, _) = tree::locate(&self.items, first)?;
        let level = tree::level_of(&self.items, first)?;
        let deepest = order
            .iter()
            .filter_map(|id| self.find(id))
            .map(Item::nested_depth)
            .max()
            .unwrap_or(0);
        if level + 1 + deepest > MAX_GROUP_DEPTH {
            return None;
        }
        let siblings = match &parent {
            None => &self.items,
            Some(parent_id) => &self.group(parent_id)?.members,
        };
        let insert_at = siblings
            .iter()
            .take_while(|item| item.id() != first)
            .filter(|item| !selected.contains(item.id()))
            .count();
        let block: Vec<Item> = order
            .iter()
            .filter_map(|id| tree::take(&mut self.items, id))
            .collect();
        let group = Group::new(name, block);
        let group_id = group.id.clone();
        let members = tree::members_mut(&mut self.items, parent.as_ref())?;
        let insert_at = insert_at.min(members.len());
        members.insert(insert_at, Item::Group(group));
        Some(group_id)
    }

    /// Dissolve a group, splicing its members into its place.
    pub(crate) fn ungroup(&mut self, id: &ItemId) -> bool {
        if self.group(id).is_none() {
            return false;
        }
        let Some((parent, index)) = tree::locate(&self.items, id) else {
            return false;
        };
        let Some(Item::Group(group)) = tree::take(&mut self.items, id) else {
            return false;
        };
        let Some(members) = tree::members_mut(&mut self.items, parent.as_ref()) else {
            return false;
        };
        let index = index.min(members.len());
        members.splice(index..index, group.members);
        self.prune_selection();
        true
    }

    pub(crate) fn rename_item(&mut self, id: &ItemId, name: String) -> bool {
        match tree::find_mut(&mut self.items, id) {
            Some(Item::Track(track)) => {
                track.name = name;
                true
            }
            Some(Item::Group(group)) => {
                group.name = name;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_settings(&mut self, id: &ItemId, settings: SettingsOverride) -> bool {
        match tree::find_mut(&mut self.items, id) {
            Some(Item::Track(track)) => {
                track.settings = settings;
                true
            }
            Some(Item::Group(group)) => {
                group.settings = settings;
                true
            }
            None => false,
        }
    }

    pub(crate) fn set_collapsed(&mut self, id: &ItemId, collapsed: bool) -> bool {
        match tree::find_mut(&mut self.items, id) {
            Some(Item::Group(group)) if group.collapsed != collapsed => {
                group.collapsed = collapsed;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_duration(&mut self, id: &ItemId, seconds: f64) -> bool {
        match tree::find_mut(&mut self.items, id) {
            Some(Item::Track(track)) if track.duration != Some(seconds) => {
                track.duration = Some(seconds);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn toggle_selection(&mut self, id: &ItemId) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.selection.toggle(id.clone());
        true
    }

    /// Select the inclusive document-order range between two ids.
    pub(crate) fn select_range(&mut self, anchor: &ItemId, target: &ItemId) -> bool {
        let order = tree::document_ids(&self.items);
        let Some(start) = order.iter().position(|id| id == anchor) else {
            return false;
        };
        let Some(end) = order.iter().position(|id| id == target) else {
            return false;
        };
        let (low, high) = if start <= end { (start, end) } else { (end, start) };
        self.selection
            .replace(order[low..=high].iter().cloned(), Some(anchor.clone()));
        true
    }

    pub(crate) fn select_all(&mut self) {
        let anchor = self.selection.anchor().cloned();
        self.selection
            .replace(tree::document_ids(&self.items), anchor);
    }

    pub(crate) fn deselect_all(&mut self) {
        self.selection.clear();
    }

    pub(crate) fn prune_selection(&mut self) {
        let live = tree::id_set(&self.items);
        self.selection.retain(|id| live.contains(id));
    }

    /// Ids and paths of every track, in order; changes whenever the track list does.
    pub(crate) fn track_signature(&self) -> Vec<(ItemId, PathBuf)> {
        self.tracks()
            .iter()
            .map(|track| (track.id.clone(), track.path.clone()))
            .collect()
    }

    pub(crate) fn structure_eq(&self, other: &CollectionState) -> bool {
        self.name == other.name && self.items == other.items
    }
}

fn push_rows(items: &[Item], depth: usize, rows: &mut Vec<VisibleRow>) {
    for item in items {
        match item {
            Item::Track(track) => rows.push(VisibleRow {
                id: track.id.clone(),
                depth,
                is_group: false,
            }),
            Item::Group(group) => {
                rows.push(VisibleRow {
                    id: group.id.clone(),
                    depth,
                    is_group: true,
                });
                if !group.collapsed {
                    push_rows(&group.members, depth + 1, rows);
                }
            }
        }
    }
}
