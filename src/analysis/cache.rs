//! Per-file memo of container analyses.
//!
//! An entry is reused only while both the source text and the analyzer
//! options hash to the same value they had when it was computed.

use crate::analysis::container::{analyze_with, AnalyzerOptions};
use crate::types::AnalysisResult;
use dashmap::DashMap;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug)]
struct CachedAnalysis {
    fingerprint: u64,
    result: Arc<AnalysisResult>,
}

#[derive(Debug, Default)]
pub struct ContainerCache {
    entries: DashMap<PathBuf, CachedAnalysis>,
}

impl ContainerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached analysis for `path`, re-analyzing when the content
    /// or the options changed.
    pub fn get_or_analyze(
        &self,
        path: &Path,
        content: &str,
        options: &AnalyzerOptions,
    ) -> Arc<AnalysisResult> {
        let fingerprint = fingerprint(content, options);

        if let Some(entry) = self.entries.get(path) {
            if entry.fingerprint == fingerprint {
                tracing::debug!(path = %path.display(), "Container analysis cache hit");
                return Arc::clone(&entry.result);
            }
        }

        let result = Arc::new(analyze_with(content, options));
        tracing::debug!(
            path = %path.display(),
            cached = self.len(),
            "Container analyzed"
        );
        self.entries.insert(
            path.to_path_buf(),
            CachedAnalysis {
                fingerprint,
                result: Arc::clone(&result),
            },
        );
        result
    }

    pub fn invalidate(&self, path: &Path) {
        self.entries.remove(path);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn fingerprint(content: &str, options: &AnalyzerOptions) -> u64 {
    let mut hasher = FxHasher::default();
    content.hash(&mut hasher);
    options.hash(&mut hasher);
    hasher.finish()
}
