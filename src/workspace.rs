//! Registry of open collection workspaces.

use std::collections::BTreeMap;

use tracing::info;

use crate::collection::{CollectionState, CollectionStore, WorkspaceId};
use crate::drag_drop::WorkspaceView;

/// Open workspaces keyed by id. Each store keeps its own history.
#[derive(Debug)]
pub struct Workspaces {
    stores: BTreeMap<WorkspaceId, CollectionStore>,
    history_depth: usize,
}

impl Workspaces {
    pub fn new(history_depth: usize) -> Self {
        Self {
            stores: BTreeMap::new(),
            history_depth: history_depth.max(1),
        }
    }

    pub fn get(&self, id: &WorkspaceId) -> Option<&CollectionStore> {
        self.stores.get(id)
    }

    pub fn get_mut(&mut self, id: &WorkspaceId) -> Option<&mut CollectionStore> {
        self.stores.get_mut(id)
    }

    /// Fetch a workspace, creating an empty collection named after the id.
    pub fn get_or_create(&mut self, id: &WorkspaceId) -> &mut CollectionStore {
        let depth = self.history_depth;
        self.stores.entry(id.clone()).or_insert_with(|| {
            info!("Opened workspace '{id}'");
            CollectionStore::new(id.as_str(), depth)
        })
    }

    pub fn close(&mut self, id: &WorkspaceId) -> Option<CollectionStore> {
        let closed = self.stores.remove(id);
        if closed.is_some() {
            info!("Closed workspace '{id}'");
        }
        closed
    }

    pub fn contains(&self, id: &WorkspaceId) -> bool {
        self.stores.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &WorkspaceId> {
        self.stores.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WorkspaceId, &CollectionStore)> {
        self.stores.iter()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn history_depth(&self) -> usize {
        self.history_depth
    }
}

impl WorkspaceView for Workspaces {
    fn collection(&self, id: &WorkspaceId) -> Option<&CollectionState> {
        self.get(id).map(CollectionStore::state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::TrackDraft;

    #[test]
    fn workspaces_keep_independent_histories() {
        let mut workspaces = Workspaces::new(10);
        let left = WorkspaceId::from("left");
        let right = WorkspaceId::from("right");
        workspaces
            .get_or_create(&left)
            .add_tracks(vec![TrackDraft::from_path("/m/a.wav")], None);
        workspaces.get_or_create(&right);

        assert!(workspaces.get(&left).unwrap().can_undo());
        assert!(!workspaces.get(&right).unwrap().can_undo());
        assert_eq!(workspaces.get(&right).unwrap().state().name(), "right");
        assert_eq!(workspaces.len(), 2);
    }

    #[test]
    fn get_or_create_reuses_existing_store() {
        let mut workspaces = Workspaces::new(10);
        let id = WorkspaceId::from("main");
        workspaces
            .get_or_create(&id)
            .add_tracks(vec![TrackDraft::from_path("/m/a.wav")], None);
        assert_eq!(workspaces.get_or_create(&id).state().len(), 1);
        assert!(workspaces.close(&id).is_some());
        assert!(workspaces.close(&id).is_none());
        assert!(workspaces.collection(&id).is_none());
    }
}
