//! Errors raised while answering editor requests.
//!
//! None of these reach the client as JSON-RPC errors. A failed definition
//! request answers with no locations and the error is logged.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LspError {
    #[error("Document not found: {uri}")]
    DocumentNotFound { uri: String },

    #[error("No container file matching {pattern} under {}", .root.display())]
    ContainerNotFound { pattern: String, root: PathBuf },

    #[error("Invalid container file pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Feature disabled: {feature}")]
    FeatureDisabled { feature: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LspError {
    pub fn log_debug(&self) {
        tracing::debug!("LSP Error: {}", self);
    }

    pub fn log_warn(&self) {
        tracing::warn!("LSP Error: {}", self);
    }

    pub fn document_not_found(uri: &tower_lsp::lsp_types::Url) -> Self {
        Self::DocumentNotFound {
            uri: uri.to_string(),
        }
    }

    pub fn feature_disabled(feature: &str) -> Self {
        Self::FeatureDisabled {
            feature: feature.to_string(),
        }
    }

    /// Missing files and disabled features are routine; everything else is
    /// worth a warning.
    pub fn log(&self) {
        match self {
            Self::ContainerNotFound { .. }
            | Self::DocumentNotFound { .. }
            | Self::FeatureDisabled { .. } => self.log_debug(),
            _ => self.log_warn(),
        }
    }
}
