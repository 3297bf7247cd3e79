// batch.rs - Input filtering and concurrent batch compression

use crate::compression::{self, ProcessedImage};
use crate::config::ACCEPTED_EXTENSIONS;
use crate::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// Paths from one drop gesture or picker selection, split by whether we
/// will try to compress them.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Selection {
    pub accepted: Vec<PathBuf>,
    pub rejected: Vec<PathBuf>,
}

/// Result of compressing one file of a batch.
#[derive(Debug, Clone)]
pub struct ItemOutcome {
    pub name: String,
    pub result: Result<ProcessedImage, Arc<Error>>,
}

/// Keep files with an accepted image extension. Directories are walked and
/// contribute their accepted image files in path order.
pub fn accept_paths(paths: impl IntoIterator<Item = PathBuf>) -> Selection {
    let mut selection = Selection::default();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(&path)
                .into_iter()
                .filter_map(|e| e.ok())
                .map(|entry| entry.into_path())
                .filter(|p| p.is_file() && is_accepted_image(p))
                .collect();
            found.sort();
            selection.accepted.extend(found);
        } else if path.is_file() && is_accepted_image(&path) {
            selection.accepted.push(path);
        } else {
            tracing::warn!(path = %path.display(), "rejected input, not a supported image file");
            selection.rejected.push(path);
        }
    }

    selection
}

pub fn is_accepted_image(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext = ext.to_string_lossy().to_lowercase();
            ACCEPTED_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Compress every file concurrently, one blocking task per file.
///
/// Outcomes come back in the same order as `paths`; a failing file does not
/// affect the others.
pub async fn compress_batch(paths: Vec<PathBuf>) -> Vec<ItemOutcome> {
    tracing::info!(count = paths.len(), "compressing batch");

    let tasks: Vec<_> = paths
        .into_iter()
        .map(|path| {
            let name = path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let task = tokio::task::spawn_blocking(move || compression::compress_file(&path));
            (name, task)
        })
        .collect();

    let mut outcomes = Vec::with_capacity(tasks.len());
    for (name, task) in tasks {
        let result = match task.await {
            Ok(result) => result,
            Err(e) => Err(Error::Task(e.to_string())),
        };

        outcomes.push(ItemOutcome {
            name,
            result: result.map_err(Arc::new),
        });
    }

    outcomes
}
