//! Drag-and-drop payloads, drop contexts and their resolution into one
//! collection mutation.

mod feedback;
mod resolve;

use std::path::PathBuf;

use crate::collection::{CollectionState, ItemId, WorkspaceId};

pub use feedback::DragFeedback;
pub use resolve::resolve;

/// What is being dragged.
#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    /// Items dragged out of a collection workspace.
    Tracks {
        ids: Vec<ItemId>,
        origin: WorkspaceId,
        /// Keep the originals when dropping into another workspace.
        copy: bool,
    },
    /// Files or folders dropped in from outside the collection.
    Files { paths: Vec<PathBuf> },
}

/// Which half of the hovered row the pointer is over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Above,
    Below,
}

impl InsertPosition {
    /// `fraction` is the pointer offset within the row, 0.0 at the top edge.
    pub fn from_pointer(fraction: f32) -> Self {
        if fraction < 0.5 {
            InsertPosition::Above
        } else {
            InsertPosition::Below
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropTarget {
    Item {
        id: ItemId,
        position: InsertPosition,
    },
    /// Empty space or footer of the list.
    Container,
}

/// Region of the destination workspace that received the drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropZone {
    List,
    /// The body of an expanded group.
    Group(ItemId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropContext {
    pub target: DropTarget,
    pub workspace: WorkspaceId,
    pub zone: DropZone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoopReason {
    EmptyPayload,
    SelfDrop,
    UnknownTarget,
    UnknownWorkspace,
    GroupCycle,
}

/// Mutation a drop resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum DropIntent {
    Noop(NoopReason),
    /// Expand `paths` into audio drafts and insert them.
    AddFiles {
        workspace: WorkspaceId,
        group: Option<ItemId>,
        index: Option<usize>,
        paths: Vec<PathBuf>,
    },
    /// Reorder the whole current selection.
    MoveSelection {
        workspace: WorkspaceId,
        to_index: usize,
    },
    MoveItems {
        workspace: WorkspaceId,
        ids: Vec<ItemId>,
        to_index: usize,
    },
    /// Move items into `group` before member `at` (post-removal); `None` appends.
    MoveIntoGroup {
        workspace: WorkspaceId,
        ids: Vec<ItemId>,
        group: ItemId,
        at: Option<usize>,
    },
    Transfer {
        origin: WorkspaceId,
        destination: WorkspaceId,
        ids: Vec<ItemId>,
        group: Option<ItemId>,
        index: Option<usize>,
        copy: bool,
    },
}

impl DropIntent {
    pub fn is_noop(&self) -> bool {
        matches!(self, DropIntent::Noop(_))
    }
}

/// Read access to workspace collections while resolving a drop.
pub trait WorkspaceView {
    fn collection(&self, id: &WorkspaceId) -> Option<&CollectionState>;
}
