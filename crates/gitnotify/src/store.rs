use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use gitnotify_std::fs::WriteFile;
use tracing::info;

use crate::config::{Config, ConfigError, ValidationError};

/// The active configuration plus the file it is persisted to.
///
/// Readers take an `Arc<Config>` snapshot and keep using it for the rest of
/// the request. [`ConfigStore::replace`] persists first and swaps second, so
/// a rejected or unsaved config never becomes active.
pub struct ConfigStore {
    current: RwLock<Arc<Config>>,
    update: Mutex<()>,
    path: PathBuf,
    fs: Arc<dyn WriteFile + Send + Sync>,
}

#[derive(Debug, thiserror::Error)]
pub enum ReplaceError {
    #[error("invalid config: {0}")]
    Invalid(#[from] ValidationError),

    #[error("failed to save config: {0}")]
    Persist(#[from] ConfigError),
}

impl ConfigStore {
    pub fn new(
        config: Config,
        path: impl Into<PathBuf>,
        fs: Arc<dyn WriteFile + Send + Sync>,
    ) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
            update: Mutex::new(()),
            path: path.into(),
            fs,
        }
    }

    pub fn snapshot(&self) -> Arc<Config> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validates, persists and activates `config`.
    pub fn replace(&self, config: Config) -> Result<Arc<Config>, ReplaceError> {
        config.validate()?;

        let _guard = self.update.lock().unwrap_or_else(PoisonError::into_inner);
        config.save(self.fs.as_ref(), &self.path)?;

        let config = Arc::new(config);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&config);

        info!(
            path = %self.path.display(),
            organization = %config.organization,
            rules = config.notifications.len(),
            "Configuration replaced"
        );
        Ok(config)
    }
}
