pub mod config;
pub mod error;
pub mod handlers;
pub mod locator;
pub mod state;

pub use error::LspError;

use crate::constants::CONFIG_FILE_NAME;
use crate::server::config::ConfigManager;
use crate::server::state::ServerState;
use std::path::PathBuf;
use std::sync::Arc;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};
use tracing::info;

pub struct LspServer {
    pub client: Client,
    pub state: ServerState,
}

impl LspServer {
    pub fn new(client: Client, config: Arc<ConfigManager>, workspace_root: PathBuf) -> Self {
        Self {
            client,
            state: ServerState::new(config, workspace_root),
        }
    }

    pub async fn register_watched_files(&self) {
        let container_file = self.state.config.container_file().await;
        let Some(registration) = watcher_registration(&container_file) else {
            return;
        };
        if let Err(e) = self.client.register_capability(vec![registration]).await {
            self.client
                .log_message(
                    MessageType::ERROR,
                    format!("Failed to register watcher: {}", e),
                )
                .await;
        }
    }

    async fn reregister_watched_files(&self) {
        let unregistration = Unregistration {
            id: WATCHER_ID.to_string(),
            method: WATCHED_FILES_METHOD.to_string(),
        };
        if let Err(e) = self.client.unregister_capability(vec![unregistration]).await {
            tracing::debug!("Failed to unregister watcher: {}", e);
        }
        self.register_watched_files().await;
    }

    /// Returns whether the container file pattern changed.
    async fn reload_config(&self) -> bool {
        let before = self.state.config.container_file().await;
        let root = self.state.workspace_root();
        if let Err(e) = self.state.config.load_from_workspace(&root).await {
            self.client
                .log_message(MessageType::WARNING, format!("Invalid configuration: {}", e))
                .await;
        }
        self.state.reset_container();
        self.state.config.container_file().await != before
    }
}

const WATCHER_ID: &str = "awilix-file-watcher";
const WATCHED_FILES_METHOD: &str = "workspace/didChangeWatchedFiles";

/// Watchers for the config file and the configured container pattern.
fn watcher_registration(container_file: &str) -> Option<Registration> {
    let watchers = vec![
        FileSystemWatcher {
            glob_pattern: GlobPattern::String(format!("**/{}", CONFIG_FILE_NAME)),
            kind: None,
        },
        FileSystemWatcher {
            glob_pattern: GlobPattern::String(format!("**/{}", container_file)),
            kind: None,
        },
    ];

    let register_options =
        match serde_json::to_value(DidChangeWatchedFilesRegistrationOptions { watchers }) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to encode watcher registration: {}", e);
                return None;
            }
        };

    Some(Registration {
        id: WATCHER_ID.to_string(),
        method: WATCHED_FILES_METHOD.to_string(),
        register_options: Some(register_options),
    })
}

fn workspace_root(params: &InitializeParams) -> Option<PathBuf> {
    #[allow(deprecated)]
    let root_uri = params.root_uri.as_ref();

    params
        .workspace_folders
        .as_ref()
        .and_then(|folders| folders.first())
        .map(|folder| &folder.uri)
        .or(root_uri)
        .and_then(|uri| uri.to_file_path().ok())
}

#[tower_lsp::async_trait]
impl LanguageServer for LspServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(root) = workspace_root(&params) {
            info!("Workspace root: {}", root.display());
            self.state.locator.set_root(root);
        }
        self.state
            .config
            .set_init_settings(params.initialization_options)
            .await;

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                definition_provider: Some(OneOf::Left(true)),
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.reload_config().await;

        let root = self.state.workspace_root();
        self.client
            .log_message(
                MessageType::INFO,
                format!(
                    "awilix-lsp initialized, container definitions active under {}",
                    root.display()
                ),
            )
            .await;

        self.register_watched_files().await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.state.document_manager.open(
            params.text_document.uri,
            params.text_document.text,
            params.text_document.version,
        );
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        self.state.document_manager.change(
            &params.text_document.uri,
            params.content_changes,
            params.text_document.version,
        );
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.state
            .document_manager
            .close(&params.text_document.uri);
    }

    async fn did_change_watched_files(&self, params: DidChangeWatchedFilesParams) {
        for change in params.changes {
            let Ok(path) = change.uri.to_file_path() else {
                continue;
            };

            if path.ends_with(CONFIG_FILE_NAME) {
                self.client
                    .log_message(MessageType::INFO, "Reloading configuration...")
                    .await;
                if self.reload_config().await {
                    self.reregister_watched_files().await;
                }
                continue;
            }

            self.state.cache.invalidate(&path);
            if matches!(change.typ, FileChangeType::CREATED | FileChangeType::DELETED) {
                self.state.locator.invalidate();
            }
        }
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        Ok(handlers::handle_definition(params, &self.state).await)
    }
}
