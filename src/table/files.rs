//! table::files
//!
//! Discovery of decision-table files and folders inside a working copy.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Extension of the workbook files shown as decision tables.
pub const TABLE_EXTENSION: &str = "xlsx";

/// Errors from listing a working copy.
#[derive(Debug, Error)]
pub enum FilesError {
    #[error("repository not cloned yet: {}", path.display())]
    NotCloned { path: PathBuf },

    #[error("failed to read '{}': {source}", path.display())]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

fn walk_err(root: &Path) -> impl Fn(walkdir::Error) -> FilesError + '_ {
    move |source| FilesError::Walk {
        path: source.path().unwrap_or(root).to_path_buf(),
        source,
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// List the `.xlsx` files directly inside `rules_dir`, sorted by name.
///
/// A missing directory yields an empty list. Symbolic links are not
/// listed.
pub fn list_table_files(rules_dir: &Path) -> Result<Vec<String>, FilesError> {
    if !rules_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(rules_dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(walk_err(rules_dir))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let is_table = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(TABLE_EXTENSION));
        if is_table {
            files.push(name.to_string());
        }
    }
    files.sort();
    Ok(files)
}

/// List `/` plus every non-hidden directory under `repo_dir` as
/// `/relative/path`, sorted.
///
/// Hidden directories are not descended into and symbolic links are not
/// followed.
pub fn list_folders(repo_dir: &Path) -> Result<Vec<String>, FilesError> {
    if !repo_dir.is_dir() {
        return Err(FilesError::NotCloned {
            path: repo_dir.to_path_buf(),
        });
    }

    let mut folders = vec!["/".to_string()];
    let walker = WalkDir::new(repo_dir)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));
    for entry in walker {
        let entry = entry.map_err(walk_err(repo_dir))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(repo_dir) {
            let parts: Vec<String> = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            folders.push(format!("/{}", parts.join("/")));
        }
    }
    folders.sort();
    Ok(folders)
}
