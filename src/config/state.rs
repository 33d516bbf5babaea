// Application state module
// Holds the immutable configuration and the components built from it

use std::io;
use std::path::PathBuf;

use super::types::Config;
use crate::intake::IntakeStore;

/// Application state shared by every connection
pub struct AppState {
    pub config: Config,
    /// Canonical site root, resolved once at startup
    pub site_root: PathBuf,
    pub store: IntakeStore,
}

impl AppState {
    /// Build state from configuration
    ///
    /// Fails if the site root does not exist.
    pub fn new(config: Config) -> io::Result<Self> {
        let site_root = config.site.root.canonicalize().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("site root '{}': {e}", config.site.root.display()),
            )
        })?;
        let store = IntakeStore::new(config.store.file.clone());

        Ok(Self {
            config,
            site_root,
            store,
        })
    }

    pub const fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
