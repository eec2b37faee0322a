use std::collections::HashSet;
use std::path::PathBuf;

use tracing::debug;

use crate::collection::{CollectionState, ItemId, WorkspaceId};

use super::{
    DragSource, DropContext, DropIntent, DropTarget, DropZone, InsertPosition, NoopReason,
    WorkspaceView,
};

/// Resolve a drop into the single mutation it stands for.
///
/// Pure: reads the current collections and never mutates. Directory expansion
/// of external files happens when the intent is applied.
pub fn resolve(source: &DragSource, ctx: &DropContext, view: &dyn WorkspaceView) -> DropIntent {
    let Some(destination) = view.collection(&ctx.workspace) else {
        return DropIntent::Noop(NoopReason::UnknownWorkspace);
    };
    let intent = match source {
        DragSource::Files { paths } => resolve_files(paths, ctx, destination),
        DragSource::Tracks { ids, origin, .. } if *origin == ctx.workspace => {
            resolve_reorder(ids, ctx, destination)
        }
        DragSource::Tracks { ids, origin, copy } => match view.collection(origin) {
            Some(origin_state) => resolve_transfer(ids, origin, *copy, ctx, origin_state, destination),
            None => DropIntent::Noop(NoopReason::UnknownWorkspace),
        },
    };
    debug!("Drop on '{}' resolved to {:?}", ctx.workspace, intent);
    intent
}

fn resolve_files(
    paths: &[PathBuf],
    ctx: &DropContext,
    destination: &CollectionState,
) -> DropIntent {
    if paths.is_empty() {
        return DropIntent::Noop(NoopReason::EmptyPayload);
    }
    match placement(ctx, destination) {
        Ok((group, index)) => DropIntent::AddFiles {
            workspace: ctx.workspace.clone(),
            group,
            index,
            paths: paths.to_vec(),
        },
        Err(reason) => DropIntent::Noop(reason),
    }
}

fn resolve_reorder(ids: &[ItemId], ctx: &DropContext, state: &CollectionState) -> DropIntent {
    let dragged = live_ids(ids, state);
    if dragged.is_empty() {
        return DropIntent::Noop(NoopReason::EmptyPayload);
    }
    let dragged_set: HashSet<ItemId> = dragged.iter().cloned().collect();
    if let DropTarget::Item { id, .. } = &ctx.target {
        if !state.contains(id) {
            return DropIntent::Noop(NoopReason::UnknownTarget);
        }
        if lands_inside(id, &dragged_set, state) {
            return DropIntent::Noop(NoopReason::SelfDrop);
        }
    }
    let to_index = match (&ctx.zone, &ctx.target) {
        (DropZone::Group(group), DropTarget::Container) => {
            if state.group(group).is_none() {
                return DropIntent::Noop(NoopReason::UnknownTarget);
            }
            if lands_inside(group, &dragged_set, state) {
                return DropIntent::Noop(NoopReason::GroupCycle);
            }
            return DropIntent::MoveIntoGroup {
                workspace: ctx.workspace.clone(),
                ids: dragged,
                group: group.clone(),
                at: None,
            };
        }
        (_, DropTarget::Container) => remaining_before(state, state.len(), &dragged_set),
        (_, DropTarget::Item { id, position }) => {
            let Some((parent, index)) = state.position_of(id) else {
                return DropIntent::Noop(NoopReason::UnknownTarget);
            };
            if let Some(group) = parent {
                let Some(members) = state.group(&group).map(|group| &group.members) else {
                    return DropIntent::Noop(NoopReason::UnknownTarget);
                };
                let before = members[..index.min(members.len())]
                    .iter()
                    .filter(|item| !dragged_set.contains(item.id()))
                    .count();
                return DropIntent::MoveIntoGroup {
                    workspace: ctx.workspace.clone(),
                    ids: dragged,
                    group,
                    at: Some(match position {
                        InsertPosition::Above => before,
                        InsertPosition::Below => before + 1,
                    }),
                };
            }
            let before = remaining_before(state, index, &dragged_set);
            match position {
                InsertPosition::Above => before,
                InsertPosition::Below => before + 1,
            }
        }
    };
    if *state.selection().as_set() == dragged_set {
        DropIntent::MoveSelection {
            workspace: ctx.workspace.clone(),
            to_index,
        }
    } else {
        DropIntent::MoveItems {
            workspace: ctx.workspace.clone(),
            ids: dragged,
            to_index,
        }
    }
}

fn resolve_transfer(
    ids: &[ItemId],
    origin: &WorkspaceId,
    copy: bool,
    ctx: &DropContext,
    origin_state: &CollectionState,
    destination: &CollectionState,
) -> DropIntent {
    let dragged = live_ids(ids, origin_state);
    if dragged.is_empty() {
        return DropIntent::Noop(NoopReason::EmptyPayload);
    }
    match placement(ctx, destination) {
        Ok((group, index)) => DropIntent::Transfer {
            origin: origin.clone(),
            destination: ctx.workspace.clone(),
            ids: dragged,
            group,
            index,
            copy,
        },
        Err(reason) => DropIntent::Noop(reason),
    }
}

/// Where new items land in the destination: parent group and sibling index.
fn placement(
    ctx: &DropContext,
    destination: &CollectionState,
) -> Result<(Option<ItemId>, Option<usize>), NoopReason> {
    match (&ctx.target, &ctx.zone) {
        (DropTarget::Container, DropZone::List) => Ok((None, None)),
        (DropTarget::Container, DropZone::Group(group)) => destination
            .group(group)
            .map(|_| (Some(group.clone()), None))
            .ok_or(NoopReason::UnknownTarget),
        (DropTarget::Item { id, position }, _) => {
            let (parent, index) = destination
                .position_of(id)
                .ok_or(NoopReason::UnknownTarget)?;
            let index = match position {
                InsertPosition::Above => index,
                InsertPosition::Below => index + 1,
            };
            Ok((parent, Some(index)))
        }
    }
}

fn live_ids(ids: &[ItemId], state: &CollectionState) -> Vec<ItemId> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| state.contains(id) && seen.insert((*id).clone()))
        .cloned()
        .collect()
}

/// True when `target` is dragged itself or sits inside a dragged group.
fn lands_inside(target: &ItemId, dragged: &HashSet<ItemId>, state: &CollectionState) -> bool {
    dragged.contains(target)
        || dragged
            .iter()
            .any(|ancestor| state.is_descendant_of(target, ancestor))
}

/// Top-level items before `end` that stay in place while the block moves.
fn remaining_before(state: &CollectionState, end: usize, dragged: &HashSet<ItemId>) -> usize {
    state.items()[..end.min(state.len())]
        .iter()
        .filter(|item| !dragged.contains(item.id()))
        .count()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::collection::{CollectionStore, TrackDraft};

    struct Views(HashMap<WorkspaceId, CollectionStore>);

    impl WorkspaceView for Views {
        fn collection(&self, id: &WorkspaceId) -> Option<&CollectionState> {
            self.0.get(id).map(CollectionStore::state)
        }
    }

    fn abcd() -> (CollectionStore, Vec<ItemId>) {
        let mut store = CollectionStore::new("Set", 20);
        let ids = store.add_tracks(
            ["A", "B", "C", "D"]
                .iter()
                .map(|name| TrackDraft::new(format!("/m/{name}.wav"), *name))
                .collect(),
            None,
        );
        (store, ids)
    }

    fn names(store: &CollectionStore) -> Vec<String> {
        store
            .state()
            .items()
            .iter()
            .map(|item| item.name().to_string())
            .collect()
    }

    fn on_item(workspace: &str, id: &ItemId, position: InsertPosition) -> DropContext {
        DropContext {
            target: DropTarget::Item {
                id: id.clone(),
                position,
            },
            workspace: WorkspaceId::from(workspace),
            zone: DropZone::List,
        }
    }

    fn tracks(ids: &[ItemId], origin: &str) -> DragSource {
        DragSource::Tracks {
            ids: ids.to_vec(),
            origin: WorkspaceId::from(origin),
            copy: false,
        }
    }

    fn single(store: CollectionStore) -> Views {
        Views(HashMap::from([(WorkspaceId::from("main"), store)]))
    }

    #[test]
    fn dropping_selection_above_first_row_moves_block_to_front() {
        let (mut store, ids) = abcd();
        store.toggle_track_selection(&ids[1]);
        store.toggle_track_selection(&ids[3]);
        let dragged = vec![ids[1].clone(), ids[3].clone()];
        let views = single(store);
        let intent = resolve(
            &tracks(&dragged, "main"),
            &on_item("main", &ids[0], InsertPosition::Above),
            &views,
        );
        assert_eq!(
            intent,
            DropIntent::MoveSelection {
                workspace: WorkspaceId::from("main"),
                to_index: 0
            }
        );
        let mut store = views.0.into_values().next().unwrap();
        store.move_selected_tracks(0);
        assert_eq!(names(&store), ["B", "D", "A", "C"]);
    }

    #[test]
    fn below_target_excludes_dragged_rows_from_index() {
        let (store, ids) = abcd();
        let views = single(store);
        let intent = resolve(
            &tracks(&ids[..1], "main"),
            &on_item("main", &ids[2], InsertPosition::Below),
            &views,
        );
        assert_eq!(
            intent,
            DropIntent::MoveItems {
                workspace: WorkspaceId::from("main"),
                ids: vec![ids[0].clone()],
                to_index: 2
            }
        );
        let mut store = views.0.into_values().next().unwrap();
        store.move_items(&ids[..1], 2);
        assert_eq!(names(&store), ["B", "C", "A", "D"]);
    }

    #[test]
    fn dropping_onto_a_dragged_row_is_a_noop() {
        let (mut store, ids) = abcd();
        store.toggle_track_selection(&ids[1]);
        store.toggle_track_selection(&ids[2]);
        let before = store.state().clone();
        let views = single(store);
        let intent = resolve(
            &tracks(&ids[1..3], "main"),
            &on_item("main", &ids[2], InsertPosition::Below),
            &views,
        );
        assert_eq!(intent, DropIntent::Noop(NoopReason::SelfDrop));
        assert_eq!(views.0[&WorkspaceId::from("main")].state(), &before);
    }

    #[test]
    fn dropping_into_own_group_is_rejected() {
        let (mut store, ids) = abcd();
        store.toggle_track_selection(&ids[0]);
        store.toggle_track_selection(&ids[1]);
        let group = store.group_selected("Intro").unwrap();
        let views = single(store);

        let onto_member = resolve(
            &tracks(std::slice::from_ref(&group), "main"),
            &on_item("main", &ids[0], InsertPosition::Above),
            &views,
        );
        assert_eq!(onto_member, DropIntent::Noop(NoopReason::SelfDrop));

        let into_body = resolve(
            &tracks(std::slice::from_ref(&group), "main"),
            &DropContext {
                target: DropTarget::Container,
                workspace: WorkspaceId::from("main"),
                zone: DropZone::Group(group.clone()),
            },
            &views,
        );
        assert_eq!(into_body, DropIntent::Noop(NoopReason::GroupCycle));
    }

    fn grouped_abc_plus_d() -> (CollectionStore, Vec<ItemId>, ItemId) {
        let (mut store, ids) = abcd();
        for id in &ids[..3] {
            store.toggle_track_selection(id);
        }
        let group = store.group_selected("Intro").unwrap();
        store.deselect_all();
        (store, ids, group)
    }

    fn member_names(store: &CollectionStore, group: &ItemId) -> Vec<String> {
        store
            .state()
            .group(group)
            .unwrap()
            .members
            .iter()
            .map(|item| item.name().to_string())
            .collect()
    }

    #[test]
    fn dropping_on_grouped_row_reorders_inside_group() {
        let (store, ids, group) = grouped_abc_plus_d();
        let views = single(store);
        let intent = resolve(
            &tracks(&ids[2..3], "main"),
            &DropContext {
                target: DropTarget::Item {
                    id: ids[0].clone(),
                    position: InsertPosition::Above,
                },
                workspace: WorkspaceId::from("main"),
                zone: DropZone::Group(group.clone()),
            },
            &views,
        );
        assert_eq!(
            intent,
            DropIntent::MoveIntoGroup {
                workspace: WorkspaceId::from("main"),
                ids: vec![ids[2].clone()],
                group: group.clone(),
                at: Some(0),
            }
        );
        let mut store = views.0.into_values().next().unwrap();
        assert!(store.move_items_into_group(&ids[2..3], &group, Some(0)));
        assert_eq!(member_names(&store, &group), ["C", "A", "B"]);
        assert_eq!(names(&store), ["Intro", "D"]);
    }

    #[test]
    fn grouped_target_index_skips_dragged_siblings() {
        let (store, ids, group) = grouped_abc_plus_d();
        let views = single(store);
        // A dragged below C: B and C stay, so A lands after them.
        let intent = resolve(
            &tracks(&ids[..1], "main"),
            &on_item("main", &ids[2], InsertPosition::Below),
            &views,
        );
        let DropIntent::MoveIntoGroup { at, .. } = &intent else {
            panic!("expected a move into the group, got {intent:?}");
        };
        assert_eq!(*at, Some(2));

        // A top-level row dropped onto a member joins the group.
        let intent = resolve(
            &tracks(&ids[3..], "main"),
            &on_item("main", &ids[1], InsertPosition::Below),
            &views,
        );
        let mut store = views.0.into_values().next().unwrap();
        let DropIntent::MoveIntoGroup { ids: moved, at, .. } = intent else {
            panic!("expected a move into the group");
        };
        assert!(store.move_items_into_group(&moved, &group, at));
        assert_eq!(member_names(&store, &group), ["A", "B", "D", "C"]);
    }

    #[test]
    fn container_drop_targets_end_of_list() {
        let (store, ids) = abcd();
        let views = single(store);
        let intent = resolve(
            &tracks(&ids[..2], "main"),
            &DropContext {
                target: DropTarget::Container,
                workspace: WorkspaceId::from("main"),
                zone: DropZone::List,
            },
            &views,
        );
        assert_eq!(
            intent,
            DropIntent::MoveItems {
                workspace: WorkspaceId::from("main"),
                ids: ids[..2].to_vec(),
                to_index: 2
            }
        );
    }

    #[test]
    fn cross_workspace_drop_is_a_transfer() {
        let (origin, ids) = abcd();
        let (destination, dest_ids) = abcd();
        let views = Views(HashMap::from([
            (WorkspaceId::from("left"), origin),
            (WorkspaceId::from("right"), destination),
        ]));
        let source = DragSource::Tracks {
            ids: vec![ids[3].clone(), ItemId::from_string("gone")],
            origin: WorkspaceId::from("left"),
            copy: true,
        };
        let intent = resolve(
            &source,
            &on_item("right", &dest_ids[1], InsertPosition::Below),
            &views,
        );
        assert_eq!(
            intent,
            DropIntent::Transfer {
                origin: WorkspaceId::from("left"),
                destination: WorkspaceId::from("right"),
                ids: vec![ids[3].clone()],
                group: None,
                index: Some(2),
                copy: true,
            }
        );
    }

    #[test]
    fn external_files_resolve_to_add_intent() {
        let (store, ids) = abcd();
        let views = single(store);
        let source = DragSource::Files {
            paths: vec![PathBuf::from("/drop/new.wav")],
        };
        let intent = resolve(&source, &on_item("main", &ids[0], InsertPosition::Above), &views);
        assert_eq!(
            intent,
            DropIntent::AddFiles {
                workspace: WorkspaceId::from("main"),
                group: None,
                index: Some(0),
                paths: vec![PathBuf::from("/drop/new.wav")],
            }
        );
        let empty = resolve(
            &DragSource::Files { paths: Vec::new() },
            &on_item("main", &ids[0], InsertPosition::Above),
            &views,
        );
        assert_eq!(empty, DropIntent::Noop(NoopReason::EmptyPayload));
    }

    #[test]
    fn unknown_workspace_or_target_is_a_noop() {
        let (store, ids) = abcd();
        let views = single(store);
        let missing_workspace = resolve(
            &tracks(&ids[..1], "main"),
            &on_item("elsewhere", &ids[0], InsertPosition::Above),
            &views,
        );
        assert_eq!(missing_workspace, DropIntent::Noop(NoopReason::UnknownWorkspace));
        let missing_target = resolve(
            &tracks(&ids[..1], "main"),
            &on_item("main", &ItemId::from_string("nope"), InsertPosition::Above),
            &views,
        );
        assert_eq!(missing_target, DropIntent::Noop(NoopReason::UnknownTarget));
    }
}
