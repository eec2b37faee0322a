use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::collection::{ItemId, WorkspaceId};
use crate::host::{HostBridge, HostError};

use super::DurationRequest;

/// Messages sent from duration workers back to the pipeline.
#[derive(Debug)]
pub(crate) enum DurationMessage {
    Resolved {
        workspace: WorkspaceId,
        version: u64,
        path: PathBuf,
        track_ids: Vec<ItemId>,
        result: Result<f64, HostError>,
    },
    /// Sent once after the last batch, or after cancellation is observed.
    Finished { workspace: WorkspaceId, version: u64 },
}

/// Run `requests` in chunks of `batch_size`, each chunk fully concurrent.
/// The cancel flag is checked between chunks.
pub(super) fn spawn_batches(
    host: Arc<dyn HostBridge>,
    tx: Sender<DurationMessage>,
    workspace: WorkspaceId,
    version: u64,
    requests: Vec<DurationRequest>,
    batch_size: usize,
    cancel: Arc<AtomicBool>,
) {
    thread::spawn(move || {
        for batch in requests.chunks(batch_size.max(1)) {
            if cancel.load(Ordering::Relaxed) {
                debug!("Duration batch for '{workspace}' cancelled (version {version})");
                break;
            }
            thread::scope(|scope| {
                for request in batch {
                    let host = &host;
                    let tx = tx.clone();
                    let workspace = workspace.clone();
                    scope.spawn(move || {
                        let result = host.audio_duration(&request.path);
                        let _ = tx.send(DurationMessage::Resolved {
                            workspace,
                            version,
                            path: request.path.clone(),
                            track_ids: request.track_ids.clone(),
                            result,
                        });
                    });
                }
            });
        }
        let _ = tx.send(DurationMessage::Finished { workspace, version });
    });
}
