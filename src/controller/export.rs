use std::path::{Path, PathBuf};

use crate::collection::WorkspaceId;
use crate::export::{ExportReport, RetryPolicy, export_collection};
use crate::host::DialogOptions;

use super::{AppController, ControllerError};

impl AppController {
    pub fn export_workspace(
        &self,
        workspace: &WorkspaceId,
        dest_dir: &Path,
        strategy: &str,
    ) -> Result<ExportReport, ControllerError> {
        let store = self.store(workspace)?;
        let policy = RetryPolicy::from(&self.config.export);
        Ok(export_collection(
            self.host.as_ref(),
            store.state(),
            dest_dir,
            strategy,
            &policy,
        )?)
    }

    /// Ask for a folder and export into it. `Ok(None)` when cancelled.
    pub fn pick_and_export(
        &self,
        workspace: &WorkspaceId,
        strategy: &str,
    ) -> Result<Option<(PathBuf, ExportReport)>, ControllerError> {
        self.store(workspace)?;
        let options = DialogOptions {
            title: Some("Export to folder".into()),
            ..DialogOptions::default()
        };
        let Some(dest) = self.host.show_folder_dialog(&options) else {
            return Ok(None);
        };
        let report = self.export_workspace(workspace, &dest, strategy)?;
        Ok(Some((dest, report)))
    }
}
