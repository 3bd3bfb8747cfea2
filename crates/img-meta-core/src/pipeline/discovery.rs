//! File discovery for finding images under a root directory.

use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{ExtractionError, ExtractionResult};

/// Discovers image files by extension.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    extensions: Vec<String>,
}

impl FileDiscovery {
    /// Create a discovery instance for the given extensions (case-insensitive,
    /// without the leading dot).
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Recursively find all supported files under `root`, sorted by path.
    ///
    /// Fails only if `root` itself is missing, not a directory, or cannot be
    /// listed. Unreadable entries below the root are skipped with a warning.
    pub fn discover(&self, root: &Path) -> ExtractionResult<Vec<PathBuf>> {
        let unreadable = |reason: String| ExtractionError::RootUnreadable {
            path: root.to_path_buf(),
            reason,
        };

        let meta = std::fs::metadata(root).map_err(|e| unreadable(e.to_string()))?;
        if !meta.is_dir() {
            return Err(unreadable("not a directory".to_string()));
        }
        std::fs::read_dir(root).map_err(|e| unreadable(e.to_string()))?;

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            let entry_path = entry.path();
            if entry.file_type().is_file() && self.is_supported(entry_path) {
                files.push(entry_path.to_path_buf());
            }
        }

        // Byte-wise, so keys come out in plain string order
        files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        Ok(files)
    }

    /// Check if a file has a supported extension.
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.extensions.iter().any(|fmt| *fmt == ext_lower)
            })
            .unwrap_or(false)
    }
}

/// Report key for `path` under `root`: `/`-rooted with forward slashes.
///
/// `root/blog/cat.jpg` becomes `/blog/cat.jpg` on every platform.
pub fn relative_key(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let mut key = String::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            key.push('/');
            key.push_str(&part.to_string_lossy());
        }
    }
    if key.is_empty() {
        key.push('/');
    }
    key
}
