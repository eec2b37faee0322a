use crate::collection::ItemId;

use super::InsertPosition;

/// Hover indicator shown while dragging. Never part of committed state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragFeedback {
    hovered: Option<(ItemId, InsertPosition)>,
    over_container: bool,
    active: bool,
}

impl DragFeedback {
    pub fn start(&mut self) {
        *self = Self {
            active: true,
            ..Self::default()
        };
    }

    /// Record the latest drag-over event on a row.
    pub fn hover_row(&mut self, id: ItemId, fraction: f32) {
        if !self.active {
            return;
        }
        self.hovered = Some((id, InsertPosition::from_pointer(fraction)));
        self.over_container = false;
    }

    pub fn hover_container(&mut self) {
        if !self.active {
            return;
        }
        self.hovered = None;
        self.over_container = true;
    }

    /// Drop or cancel.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn hovered(&self) -> Option<(&ItemId, InsertPosition)> {
        self.hovered.as_ref().map(|(id, position)| (id, *position))
    }

    /// True when the insert line should be drawn for `id` at `position`.
    pub fn shows_line(&self, id: &ItemId, position: InsertPosition) -> bool {
        matches!(&self.hovered, Some((hovered, pos)) if hovered == id && *pos == position)
    }

    pub fn over_container(&self) -> bool {
        self.over_container
    }
}
