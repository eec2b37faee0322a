use std::collections::HashSet;

use super::ids::ItemId;

/// Multi-selection over collection items.
///
/// Membership has set semantics; insertion order is kept separately so the UI
/// can anchor shift-range selections on the first picked row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    members: HashSet<ItemId>,
    order: Vec<ItemId>,
    anchor: Option<ItemId>,
}

impl Selection {
    pub fn contains(&self, id: &ItemId) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Selected ids in the order they were picked.
    pub fn ids(&self) -> &[ItemId] {
        &self.order
    }

    pub fn as_set(&self) -> &HashSet<ItemId> {
        &self.members
    }

    /// Anchor for range selection: the last explicitly toggled or range-start id.
    pub fn anchor(&self) -> Option<&ItemId> {
        self.anchor.as_ref()
    }

    pub(crate) fn toggle(&mut self, id: ItemId) {
        if self.members.remove(&id) {
            self.order.retain(|existing| existing != &id);
            if self.anchor.as_ref() == Some(&id) {
                self.anchor = self.order.last().cloned();
            }
        } else {
            self.members.insert(id.clone());
            self.order.push(id.clone());
            self.anchor = Some(id);
        }
    }

    pub(crate) fn replace(&mut self, ids: impl IntoIterator<Item = ItemId>, anchor: Option<ItemId>) {
        self.members.clear();
        self.order.clear();
        for id in ids {
            if self.members.insert(id.clone()) {
                self.order.push(id);
            }
        }
        self.anchor = anchor.filter(|id| self.members.contains(id));
    }

    pub(crate) fn clear(&mut self) {
        self.members.clear();
        self.order.clear();
        self.anchor = None;
    }

    /// Drop every id not accepted by `keep`.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(&ItemId) -> bool) {
        self.order.retain(|id| keep(id));
        self.members.retain(|id| self.order.contains(id));
        if self
            .anchor
            .as_ref()
            .is_some_and(|anchor| !self.members.contains(anchor))
        {
            self.anchor = None;
        }
    }
}
