//! Where playdeck keeps its config and logs.
//!
//! Everything lives in one `.playdeck` folder under the OS config directory.
//! `PLAYDECK_CONFIG_HOME` replaces the OS directory for portable setups and tests.

#[cfg(test)]
use std::path::Path;
use std::path::PathBuf;
use std::sync::{LazyLock, Mutex};

use directories::BaseDirs;
use thiserror::Error;

pub const APP_DIR_NAME: &str = ".playdeck";
pub const CONFIG_HOME_ENV: &str = "PLAYDECK_CONFIG_HOME";
pub const CONFIG_FILE_NAME: &str = "config.toml";

static BASE_OVERRIDE: LazyLock<Mutex<Option<PathBuf>>> = LazyLock::new(|| Mutex::new(None));

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No suitable base config directory available for application files")]
    NoBaseDir,
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// The `.playdeck` folder, created on first use.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    let base = config_base_dir().ok_or(AppDirError::NoBaseDir)?;
    ensure_dir(base.join(APP_DIR_NAME))
}

pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    ensure_dir(app_root_dir()?.join("logs"))
}

pub fn config_file() -> Result<PathBuf, AppDirError> {
    Ok(app_root_dir()?.join(CONFIG_FILE_NAME))
}

fn ensure_dir(path: PathBuf) -> Result<PathBuf, AppDirError> {
    std::fs::create_dir_all(&path).map_err(|source| AppDirError::CreateDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn config_base_dir() -> Option<PathBuf> {
    if let Some(path) = BASE_OVERRIDE.lock().ok().and_then(|guard| guard.clone()) {
        return Some(path);
    }
    if let Some(path) = std::env::var_os(CONFIG_HOME_ENV).filter(|value| !value.is_empty()) {
        return Some(PathBuf::from(path));
    }
    BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf())
}

/// Points the app directory at a scratch folder for the guard's lifetime.
///
/// Guards are serialized so tests touching the app directory never overlap.
#[cfg(test)]
pub(crate) struct BaseDirGuard {
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[cfg(test)]
static GUARD_LOCK: Mutex<()> = Mutex::new(());

#[cfg(test)]
impl BaseDirGuard {
    pub(crate) fn set(path: &Path) -> Self {
        let lock = GUARD_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *BASE_OVERRIDE.lock().expect("base override mutex poisoned") = Some(path.to_path_buf());
        Self { _lock: lock }
    }
}

#[cfg(test)]
impl Drop for BaseDirGuard {
    fn drop(&mut self) {
        if let Ok(mut guard) = BASE_OVERRIDE.lock() {
            *guard = None;
        }
    }
}
