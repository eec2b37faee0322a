//! Ordered track collections: items, groups, selection and undoable mutations.

mod ids;
mod model;
mod reorder;
mod selection;
mod state;
mod store;
mod tree;


pub use ids::{ItemId, WorkspaceId};
pub use model::{
    ActionAfterTrack, Group, Item, SettingsOverride, Track, TrackDraft, display_name_for,
};
pub use selection::Selection;
pub use state::{CollectionState, MAX_GROUP_DEPTH, Snapshot, VisibleRow};
pub use store::{ChangeKind, CollectionStore, StateChange, SubscriptionId};
