use crate::server::error::LspError;
use crate::server::handlers::util::{same_file, span_to_range, word_at_position};
use crate::server::state::ServerState;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tower_lsp::lsp_types::{GotoDefinitionParams, GotoDefinitionResponse, Location, Url};

pub async fn handle_definition(
    params: GotoDefinitionParams,
    state: &ServerState,
) -> Option<GotoDefinitionResponse> {
    let uri = &params.text_document_position_params.text_document.uri;
    let position = params.text_document_position_params.position;
    tracing::debug!(
        "[HANDLE_DEFINITION_ENTER] uri={} pos={}:{}",
        uri,
        position.line,
        position.character
    );
    let start = Instant::now();

    if !state.config.is_definition_enabled().await {
        LspError::feature_disabled("definition").log_debug();
        return None;
    }

    let Some(content) = state.document_manager.content(uri) else {
        LspError::document_not_found(uri).log_debug();
        return None;
    };
    let (symbol, _) = word_at_position(&content, position)?;

    let locations = match resolve_definitions(state, uri, &symbol).await {
        Ok(locations) => locations,
        Err(e) => {
            e.log();
            return None;
        }
    };

    let elapsed = start.elapsed();
    if elapsed.as_millis() > crate::constants::SLOW_DEFINITION_MS {
        tracing::warn!("Slow definition lookup for '{}' took {:?}", symbol, elapsed);
    }
    tracing::debug!(
        "[HANDLE_DEFINITION_EXIT] symbol={} found={} elapsed_ms={}",
        symbol,
        locations.len(),
        elapsed.as_millis()
    );

    (!locations.is_empty()).then_some(GotoDefinitionResponse::Array(locations))
}

/// Definition sites of `symbol` in the workspace container, registration
/// first. Requests made from inside the container itself resolve to nothing.
pub async fn resolve_definitions(
    state: &ServerState,
    requesting: &Url,
    symbol: &str,
) -> Result<Vec<Location>, LspError> {
    let pattern = state.config.container_file().await;
    let container_path = locate(state, pattern).await?;

    if let Ok(requesting_path) = requesting.to_file_path() {
        if same_file(&requesting_path, &container_path) {
            tracing::debug!("Definition requested from the container itself");
            return Ok(Vec::new());
        }
    }

    let container_uri = Url::from_file_path(&container_path).map_err(|_| {
        LspError::Internal(format!("not an absolute path: {}", container_path.display()))
    })?;
    let text = load_text(state, &container_uri, &container_path).await?;

    let options = state.config.analyzer_options().await;
    let analysis = state.cache.get_or_analyze(&container_path, &text, &options);

    Ok(analysis
        .lookup(symbol)
        .iter()
        .map(|definition| Location {
            uri: container_uri.clone(),
            range: span_to_range(definition.span),
        })
        .collect())
}

async fn locate(state: &ServerState, pattern: String) -> Result<PathBuf, LspError> {
    let locator = Arc::clone(&state.locator);
    tokio::task::spawn_blocking(move || locator.locate(&pattern))
        .await
        .map_err(|e| LspError::Internal(format!("container search task failed: {}", e)))?
}

/// Open editor content wins over the file on disk.
async fn load_text(state: &ServerState, uri: &Url, path: &Path) -> Result<String, LspError> {
    if let Some(content) = state.document_manager.content(uri) {
        return Ok(content);
    }
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LspError::Io {
            path: path.to_path_buf(),
            source,
        })
}
