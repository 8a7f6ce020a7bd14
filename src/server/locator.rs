//! Finding the container file in the workspace.

use crate::server::error::LspError;
use anyhow::Context;
use glob::MatchOptions;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
struct Located {
    pattern: String,
    path: PathBuf,
}

/// Resolves the configured container pattern to a single file and remembers
/// the answer until [`ContainerLocator::invalidate`] is called.
#[derive(Debug)]
pub struct ContainerLocator {
    root: RwLock<PathBuf>,
    located: RwLock<Option<Located>>,
}

impl ContainerLocator {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root: RwLock::new(root),
            located: RwLock::new(None),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.root.read().clone()
    }

    pub fn set_root(&self, root: PathBuf) {
        *self.root.write() = root;
        self.invalidate();
    }

    pub fn invalidate(&self) {
        *self.located.write() = None;
    }

    /// Blocking: walks the workspace on a cache miss.
    pub fn locate(&self, pattern: &str) -> Result<PathBuf, LspError> {
        if let Some(located) = self.located.read().as_ref() {
            if located.pattern == pattern && located.path.is_file() {
                return Ok(located.path.clone());
            }
        }

        let root = self.root();
        let found = find_container(&root, pattern).map_err(|e| LspError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: format!("{:#}", e),
        })?;

        let Some(path) = found else {
            return Err(LspError::ContainerNotFound {
                pattern: pattern.to_string(),
                root,
            });
        };

        debug!(path = %path.display(), "Located container file");
        *self.located.write() = Some(Located {
            pattern: pattern.to_string(),
            path: path.clone(),
        });
        Ok(path)
    }
}

/// Shallowest file under `root` matching `**/<pattern>`, honoring ignore
/// files. Ties are broken by path order.
pub fn find_container(root: &Path, pattern: &str) -> anyhow::Result<Option<PathBuf>> {
    let glob = glob::Pattern::new(&format!("**/{}", pattern.trim_start_matches("./")))
        .with_context(|| format!("cannot compile glob for {}", pattern))?;
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let walker = ignore::WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .require_git(false)
        .filter_entry(|entry| entry.file_name() != "node_modules")
        .build();

    let mut best: Option<(usize, PathBuf)> = None;
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        if !glob.matches_path_with(relative, options) {
            continue;
        }

        let depth = relative.components().count();
        let better = match &best {
            Some((best_depth, best_path)) => {
                (depth, entry.path()) < (*best_depth, best_path.as_path())
            }
            None => true,
        };
        if better {
            best = Some((depth, entry.path().to_path_buf()));
        }
    }

    Ok(best.map(|(_, path)| path))
}
