#![allow(dead_code)]

use awilix_lsp::server::config::ConfigManager;
use awilix_lsp::server::state::ServerState;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tower_lsp::lsp_types::{
    GotoDefinitionParams, Position, TextDocumentIdentifier, TextDocumentPositionParams, Url,
};

pub struct TestFixture {
    pub temp_dir: TempDir,
    pub state: ServerState,
}

impl TestFixture {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config = Arc::new(ConfigManager::new());
        config.load_from_workspace(temp_dir.path()).await.unwrap();

        let state = ServerState::new(config, temp_dir.path().to_path_buf());
        Self { temp_dir, state }
    }

    pub fn create_file(&self, name: &str, content: &str) -> Url {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        Url::from_file_path(&path).unwrap()
    }

    /// Write the file and open it in the document manager with the same text.
    pub fn open_file(&self, name: &str, content: &str) -> Url {
        let uri = self.create_file(name, content);
        self.state
            .document_manager
            .open(uri.clone(), content.into(), 1);
        uri
    }
}

pub fn make_params(uri: Url, line: u32, character: u32) -> GotoDefinitionParams {
    GotoDefinitionParams {
        text_document_position_params: TextDocumentPositionParams {
            text_document: TextDocumentIdentifier { uri },
            position: Position::new(line, character),
        },
        work_done_progress_params: Default::default(),
        partial_result_params: Default::default(),
    }
}
