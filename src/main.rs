use awilix_lsp::server::config::ConfigManager;
use awilix_lsp::server::LspServer;
use std::sync::Arc;
use tower_lsp::{LspService, Server};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // stdout carries the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let root = std::env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    let config = Arc::new(ConfigManager::new());

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) =
        LspService::new(move |client| LspServer::new(client, Arc::clone(&config), root.clone()));
    Server::new(stdin, stdout, socket).serve(service).await;
}
