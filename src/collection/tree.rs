//! Lookups over the owned item tree.
//!
//! Groups own their members, so every helper here walks the tree depth-first in
//! document order (a group comes before its members).

use std::collections::HashSet;
use std::path::Path;

use super::ids::ItemId;
use super::model::{Group, Item, Track};

pub(crate) fn find<'a>(items: &'a [Item], id: &ItemId) -> Option<&'a Item> {
    for item in items {
        if item.id() == id {
            return Some(item);
        }
        if let Item::Group(group) = item
            && let Some(found) = find(&group.members, id)
        {
            return Some(found);
        }
    }
    None
}

pub(crate) fn find_mut<'a>(items: &'a mut [Item], id: &ItemId) -> Option<&'a mut Item> {
    for item in items.iter_mut() {
        if item.id() == id {
            return Some(item);
        }
        if let Item::Group(group) = item
            && let Some(found) = find_mut(&mut group.members, id)
        {
            return Some(found);
        }
    }
    None
}

/// Groups enclosing `id`, innermost first. `None` when the id is absent.
pub(crate) fn ancestors<'a>(items: &'a [Item], id: &ItemId) -> Option<Vec<&'a Group>> {
    for item in items {
        if item.id() == id {
            return Some(Vec::new());
        }
        if let Item::Group(group) = item
            && let Some(mut chain) = ancestors(&group.members, id)
        {
            chain.push(group);
            return Some(chain);
        }
    }
    None
}

/// Number of groups enclosing `id`.
pub(crate) fn level_of(items: &[Item], id: &ItemId) -> Option<usize> {
    ancestors(items, id).map(|chain| chain.len())
}

/// Parent group id (or `None` for top level) and index within that parent.
pub(crate) fn locate(items: &[Item], id: &ItemId) -> Option<(Option<ItemId>, usize)> {
    if let Some(index) = items.iter().position(|item| item.id() == id) {
        return Some((None, index));
    }
    for item in items {
        if let Item::Group(group) = item
            && let Some((parent, index)) = locate(&group.members, id)
        {
            return Some((parent.or_else(|| Some(group.id.clone())), index));
        }
    }
    None
}

/// Index of the top-level item that is or contains `id`.
pub(crate) fn top_level_index(items: &[Item], id: &ItemId) -> Option<usize> {
    items
        .iter()
        .position(|item| item.id() == id || contains_descendant(item, id))
}

fn contains_descendant(item: &Item, id: &ItemId) -> bool {
    match item {
        Item::Track(_) => false,
        Item::Group(group) => find(&group.members, id).is_some(),
    }
}

/// True when `descendant` sits somewhere below the group `ancestor`.
pub(crate) fn is_descendant_of(items: &[Item], descendant: &ItemId, ancestor: &ItemId) -> bool {
    find(items, ancestor).is_some_and(|item| contains_descendant(item, descendant))
}

pub(crate) fn members_mut<'a>(
    items: &'a mut Vec<Item>,
    parent: Option<&ItemId>,
) -> Option<&'a mut Vec<Item>> {
    match parent {
        None => Some(items),
        Some(id) => match find_mut(items, id) {
            Some(Item::Group(group)) => Some(&mut group.members),
            _ => None,
        },
    }
}

/// Remove the item with `id` from wherever it lives in the tree.
pub(crate) fn take(items: &mut Vec<Item>, id: &ItemId) -> Option<Item> {
    if let Some(index) = items.iter().position(|item| item.id() == id) {
        return Some(items.remove(index));
    }
    for item in items.iter_mut() {
        if let Item::Group(group) = item
            && let Some(taken) = take(&mut group.members, id)
        {
            return Some(taken);
        }
    }
    None
}

pub(crate) fn document_ids(items: &[Item]) -> Vec<ItemId> {
    let mut ids = Vec::new();
    collect_ids(items, &mut ids);
    ids
}

fn collect_ids(items: &[Item], out: &mut Vec<ItemId>) {
    for item in items {
        out.push(item.id().clone());
        if let Item::Group(group) = item {
            collect_ids(&group.members, out);
        }
    }
}

pub(crate) fn id_set(items: &[Item]) -> HashSet<ItemId> {
    document_ids(items).into_iter().collect()
}

pub(crate) fn tracks(items: &[Item]) -> Vec<&Track> {
    let mut out = Vec::new();
    collect_tracks(items, &mut out);
    out
}

fn collect_tracks<'a>(items: &'a [Item], out: &mut Vec<&'a Track>) {
    for item in items {
        match item {
            Item::Track(track) => out.push(track),
            Item::Group(group) => collect_tracks(&group.members, out),
        }
    }
}

pub(crate) fn groups(items: &[Item]) -> Vec<&Group> {
    let mut out = Vec::new();
    collect_groups(items, &mut out);
    out
}

fn collect_groups<'a>(items: &'a [Item], out: &mut Vec<&'a Group>) {
    for item in items {
        if let Item::Group(group) = item {
            out.push(group);
            collect_groups(&group.members, out);
        }
    }
}

pub(crate) fn tracks_with_path<'a>(items: &'a [Item], path: &Path) -> Vec<&'a Track> {
    tracks(items)
        .into_iter()
        .filter(|track| track.path == path)
        .collect()
}

/// Selected ids in document order, skipping ids already carried by a selected group.
pub(crate) fn block_order(items: &[Item], selected: &HashSet<ItemId>) -> Vec<ItemId> {
    let mut out = Vec::new();
    collect_block(items, selected, &mut out);
    out
}

fn collect_block(items: &[Item], selected: &HashSet<ItemId>, out: &mut Vec<ItemId>) {
    for item in items {
        if selected.contains(item.id()) {
            out.push(item.id().clone());
            continue;
        }
        if let Item::Group(group) = item {
            collect_block(&group.members, selected, out);
        }
    }
}
