//! Background resolution of missing track durations.
//!
//! Requests run on worker threads in bounded batches; results come back over a
//! channel and are applied on the caller's thread in [`DurationPipeline::poll`].
//! Every batch carries the `items_version` it was scheduled for, and a result
//! is written only if that version is still the active one and the track it
//! was requested for still sits at the same path without a duration.

mod jobs;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::collection::{CollectionState, CollectionStore, ItemId, WorkspaceId};
use crate::host::{HostBridge, is_supported_audio};
use crate::workspace::Workspaces;

pub(crate) use jobs::DurationMessage;

/// Default number of concurrent host requests per batch.
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// One host request covering every track that shares `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationRequest {
    pub path: PathBuf,
    pub track_ids: Vec<ItemId>,
}

/// Tracks that still need a duration, grouped by path in document order.
///
/// Paths that already failed once are skipped so a broken file is not probed
/// on every list change.
pub fn pending_requests(state: &CollectionState, failed: &HashSet<PathBuf>) -> Vec<DurationRequest> {
    let mut requests: Vec<DurationRequest> = Vec::new();
    let mut by_path: HashMap<&Path, usize> = HashMap::new();
    for track in state.tracks() {
        if track.duration.is_some()
            || !is_supported_audio(&track.path)
            || failed.contains(&track.path)
        {
            continue;
        }
        match by_path.get(track.path.as_path()) {
            Some(&index) => requests[index].track_ids.push(track.id.clone()),
            None => {
                by_path.insert(track.path.as_path(), requests.len());
                requests.push(DurationRequest {
                    path: track.path.clone(),
                    track_ids: vec![track.id.clone()],
                });
            }
        }
    }
    requests
}

#[derive(Debug)]
struct ActiveBatch {
    version: u64,
    cancel: Arc<AtomicBool>,
    finished: bool,
}

/// Result counts from one [`DurationPipeline::poll`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    pub applied: usize,
    pub discarded: usize,
    pub failed: usize,
}

pub struct DurationPipeline {
    host: Arc<dyn HostBridge>,
    batch_size: usize,
    tx: Sender<DurationMessage>,
    rx: Receiver<DurationMessage>,
    active: HashMap<WorkspaceId, ActiveBatch>,
    failed: HashSet<PathBuf>,
}

impl DurationPipeline {
    pub fn new(host: Arc<dyn HostBridge>, batch_size: usize) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            host,
            batch_size: batch_size.max(1),
            tx,
            rx,
            active: HashMap::new(),
            failed: HashSet::new(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Version currently being resolved for `workspace`.
    pub fn active_version(&self, workspace: &WorkspaceId) -> Option<u64> {
        self.active.get(workspace).map(|batch| batch.version)
    }

    /// True while a scheduled batch for `workspace` has not reported back.
    pub fn is_busy(&self, workspace: &WorkspaceId) -> bool {
        self.active
            .get(workspace)
            .is_some_and(|batch| !batch.finished)
    }

    pub fn failed_paths(&self) -> &HashSet<PathBuf> {
        &self.failed
    }

    /// Start resolving missing durations for the store's current track list.
    ///
    /// A no-op when the same `items_version` is already scheduled. Otherwise
    /// the previous batch is cancelled and its late results will be dropped.
    /// Returns the number of host requests issued.
    pub fn schedule(&mut self, workspace: &WorkspaceId, store: &CollectionStore) -> usize {
        let version = store.items_version();
        if self.active_version(workspace) == Some(version) {
            return 0;
        }
        self.cancel(workspace);
        let requests = pending_requests(store.state(), &self.failed);
        let cancel = Arc::new(AtomicBool::new(false));
        let count = requests.len();
        self.active.insert(
            workspace.clone(),
            ActiveBatch {
                version,
                cancel: Arc::clone(&cancel),
                finished: requests.is_empty(),
            },
        );
        if requests.is_empty() {
            return 0;
        }
        info!(
            "Resolving {count} durations for '{workspace}' (version {version}, batch size {})",
            self.batch_size
        );
        jobs::spawn_batches(
            Arc::clone(&self.host),
            self.tx.clone(),
            workspace.clone(),
            version,
            requests,
            self.batch_size,
            cancel,
        );
        count
    }

    /// Cancel outstanding work for `workspace`, e.g. when it is closed.
    pub fn cancel(&mut self, workspace: &WorkspaceId) {
        if let Some(batch) = self.active.remove(workspace)
            && !batch.finished
        {
            batch.cancel.store(true, Ordering::Relaxed);
            debug!(
                "Cancelled duration batch for '{workspace}' (version {})",
                batch.version
            );
        }
    }

    /// Forget failures so the next schedule retries those paths.
    pub fn clear_failures(&mut self) {
        self.failed.clear();
    }

    /// Apply every result that arrived since the last poll.
    pub fn poll(&mut self, workspaces: &mut Workspaces) -> PollSummary {
        let mut summary = PollSummary::default();
        loop {
            let message = match self.rx.try_recv() {
                Ok(message) => message,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            };
            match message {
                DurationMessage::Finished { workspace, version } => {
                    if let Some(batch) = self.active.get_mut(&workspace)
                        && batch.version == version
                    {
                        batch.finished = true;
                    }
                }
                DurationMessage::Resolved {
                    workspace,
                    version,
                    path,
                    track_ids,
                    result,
                } => {
                    if self.active_version(&workspace) != Some(version) {
                        debug!(
                            "Dropping stale duration for {} (version {version})",
                            path.display()
                        );
                        summary.discarded += track_ids.len();
                        continue;
                    }
                    match result {
                        Ok(seconds) => {
                            let Some(store) = workspaces.get_mut(&workspace) else {
                                summary.discarded += track_ids.len();
                                continue;
                            };
                            let (applied, discarded) =
                                apply_duration(store, &path, &track_ids, seconds);
                            summary.applied += applied;
                            summary.discarded += discarded;
                        }
                        Err(err) => {
                            warn!("Duration lookup failed for {}: {err}", path.display());
                            self.failed.insert(path);
                            summary.failed += 1;
                        }
                    }
                }
            }
        }
        summary
    }

    #[cfg(test)]
    pub(crate) fn sender(&self) -> Sender<DurationMessage> {
        self.tx.clone()
    }
}

impl std::fmt::Debug for DurationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DurationPipeline")
            .field("batch_size", &self.batch_size)
            .field("active", &self.active)
            .field("failed", &self.failed.len())
            .finish()
    }
}

/// Write `seconds` to each requested track that is still live at `path` and
/// has no duration yet. Returns (applied, discarded).
fn apply_duration(
    store: &mut CollectionStore,
    path: &Path,
    track_ids: &[ItemId],
    seconds: f64,
) -> (usize, usize) {
    let live: Vec<ItemId> = store
        .tracks_at_path(path)
        .into_iter()
        .filter(|track| track.duration.is_none() && track_ids.contains(&track.id))
        .map(|track| track.id.clone())
        .collect();
    let mut applied = 0;
    for id in &live {
        if store.update_track_duration(id, seconds) {
            applied += 1;
        }
    }
    let discarded = track_ids.len().saturating_sub(applied);
    if discarded > 0 {
        debug!(
            "Discarded {discarded} stale duration results for {}",
            path.display()
        );
    }
    (applied, discarded)
}
