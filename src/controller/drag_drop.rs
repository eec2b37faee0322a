use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::collection::{ItemId, WorkspaceId};
use crate::drag_drop::{DragSource, DropContext, DropIntent, resolve};

use super::{AppController, ControllerError};

/// What a drop did to the collections.
#[derive(Debug, Clone, PartialEq)]
pub struct DropOutcome {
    pub intent: DropIntent,
    /// Ids created in the destination (added files or transferred copies).
    pub added: Vec<ItemId>,
    /// Items removed from the origin by a move transfer.
    pub removed: usize,
    pub changed: bool,
}

impl DropOutcome {
    fn unchanged(intent: DropIntent) -> Self {
        Self {
            intent,
            added: Vec::new(),
            removed: 0,
            changed: false,
        }
    }
}

/// Drag-and-drop operations over the controller's workspaces.
pub struct DragDropController<'a> {
    controller: &'a mut AppController,
}

impl<'a> DragDropController<'a> {
    pub(crate) fn new(controller: &'a mut AppController) -> Self {
        Self { controller }
    }
}

impl std::ops::Deref for DragDropController<'_> {
    type Target = AppController;

    fn deref(&self) -> &Self::Target {
        self.controller
    }
}

impl std::ops::DerefMut for DragDropController<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.controller
    }
}

impl AppController {
    pub fn drag_drop(&mut self) -> DragDropController<'_> {
        DragDropController::new(self)
    }
}

impl DragDropController<'_> {
    pub fn start_drag(&mut self) {
        self.drag.start();
    }

    pub fn drag_over_row(&mut self, id: ItemId, fraction: f32) {
        self.drag.hover_row(id, fraction);
    }

    pub fn drag_over_container(&mut self) {
        self.drag.hover_container();
    }

    pub fn cancel_drag(&mut self) {
        self.drag.clear();
    }

    /// Resolve and apply a drop. Feedback is cleared whatever the outcome.
    pub fn drop_on(
        &mut self,
        source: &DragSource,
        ctx: &DropContext,
    ) -> Result<DropOutcome, ControllerError> {
        self.drag.clear();
        let intent = resolve(source, ctx, &self.workspaces);
        self.apply(intent)
    }

    fn apply(&mut self, intent: DropIntent) -> Result<DropOutcome, ControllerError> {
        match &intent {
            DropIntent::Noop(reason) => {
                debug!("Drop ignored: {reason:?}");
                Ok(DropOutcome::unchanged(intent))
            }
            DropIntent::AddFiles {
                workspace,
                group,
                index,
                paths,
            } => {
                let added = self.add_files(workspace, group.as_ref(), *index, paths)?;
                Ok(DropOutcome {
                    changed: !added.is_empty(),
                    added,
                    removed: 0,
                    intent,
                })
            }
            DropIntent::MoveSelection {
                workspace,
                to_index,
            } => {
                let changed = self.store_mut(workspace)?.move_selected_tracks(*to_index);
                Ok(DropOutcome {
                    changed,
                    ..DropOutcome::unchanged(intent)
                })
            }
            DropIntent::MoveItems {
                workspace,
                ids,
                to_index,
            } => {
                let changed = self.store_mut(workspace)?.move_items(ids, *to_index);
                Ok(DropOutcome {
                    changed,
                    ..DropOutcome::unchanged(intent)
                })
            }
            DropIntent::MoveIntoGroup {
                workspace,
                ids,
                group,
                at,
            } => {
                let changed = self
                    .store_mut(workspace)?
                    .move_items_into_group(ids, group, *at);
                Ok(DropOutcome {
                    changed,
                    ..DropOutcome::unchanged(intent)
                })
            }
            DropIntent::Transfer {
                origin,
                destination,
                ids,
                group,
                index,
                copy,
            } => {
                let (added, removed) =
                    self.transfer(origin, destination, ids, group.as_ref(), *index, *copy)?;
                Ok(DropOutcome {
                    changed: !added.is_empty(),
                    added,
                    removed,
                    intent,
                })
            }
        }
    }

    fn add_files(
        &mut self,
        workspace: &WorkspaceId,
        group: Option<&ItemId>,
        index: Option<usize>,
        paths: &[PathBuf],
    ) -> Result<Vec<ItemId>, ControllerError> {
        let drafts = self.expand_paths(paths);
        if drafts.is_empty() {
            debug!("Dropped paths contained no audio files");
            return Ok(Vec::new());
        }
        let store = self.store_mut(workspace)?;
        let added = match group {
            Some(group) => store.add_tracks_to_group(group, drafts, index).unwrap_or_default(),
            None => store.add_tracks(drafts, index),
        };
        info!("Dropped {} files into '{workspace}'", added.len());
        Ok(added)
    }

    /// Insert copies into the destination first; remove originals only once
    /// the insert went through.
    fn transfer(
        &mut self,
        origin: &WorkspaceId,
        destination: &WorkspaceId,
        ids: &[ItemId],
        group: Option<&ItemId>,
        index: Option<usize>,
        copy: bool,
    ) -> Result<(Vec<ItemId>, usize), ControllerError> {
        let drafts = self.store(origin)?.state().drafts_for(ids);
        if drafts.is_empty() {
            return Ok((Vec::new(), 0));
        }
        let target = self.store_mut(destination)?;
        let added = match group {
            Some(group) => target.add_tracks_to_group(group, drafts, index),
            None => Some(target.add_tracks(drafts, index)),
        };
        let Some(added) = added.filter(|added| !added.is_empty()) else {
            warn!("Transfer into '{destination}' was rejected; origin left untouched");
            return Ok((Vec::new(), 0));
        };
        let removed = if copy {
            0
        } else {
            self.store_mut(origin)?.remove_items(ids)
        };
        info!(
            "{} {} tracks from '{origin}' to '{destination}'",
            if copy { "Copied" } else { "Moved" },
            added.len()
        );
        Ok((added, removed))
    }
}
