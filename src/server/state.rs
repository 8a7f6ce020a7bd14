//! Shared state handed to every request handler.

use crate::analysis::{ContainerCache, DocumentManager};
use crate::server::config::ConfigManager;
use crate::server::locator::ContainerLocator;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Clone)]
pub struct ServerState {
    /// Documents currently open in the editor.
    pub document_manager: Arc<DocumentManager>,
    /// Effective configuration.
    pub config: Arc<ConfigManager>,
    /// Resolves the configured pattern to the container file.
    pub locator: Arc<ContainerLocator>,
    /// Analyses keyed by container path and content hash.
    pub cache: Arc<ContainerCache>,
}

impl ServerState {
    pub fn new(config: Arc<ConfigManager>, workspace_root: PathBuf) -> Self {
        Self {
            document_manager: Arc::new(DocumentManager::new()),
            config,
            locator: Arc::new(ContainerLocator::new(workspace_root)),
            cache: Arc::new(ContainerCache::new()),
        }
    }

    pub fn workspace_root(&self) -> PathBuf {
        self.locator.root()
    }

    /// Forget the located container and every cached analysis.
    pub fn reset_container(&self) {
        self.locator.invalidate();
        self.cache.clear();
    }
}
