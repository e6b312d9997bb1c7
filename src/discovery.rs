use crate::error::{CompressionError, Result};
use crate::task::Task;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

/// Walks `input_dir` and builds one [`Task`] per file whose extension is in
/// `extensions`, mirroring its relative location under `output_dir`.
///
/// # Arguments
/// * `input_dir` - Root of the tree to scan; must be an existing directory
/// * `output_dir` - Root of the mirrored tree; created if missing
/// * `extensions` - Lowercase extensions without the leading dot
///
/// # Returns
/// * `Ok(tasks)` - Tasks in traversal order (sorted by file name per directory)
/// * `Err(CompressionError)` - If the input is missing or any directory cannot be read
///
/// Output subdirectories are created as tasks are found, so every task's
/// parent directory exists once this returns. If `output_dir` sits inside
/// `input_dir`, that subtree is not scanned; if the two are the same
/// directory, every image is compressed in place.
///
/// Directory symlinks are not followed. Symlinks to files are picked up
/// like regular files.
pub fn enumerate_tasks(
    input_dir: &Path,
    output_dir: &Path,
    extensions: &BTreeSet<String>,
) -> Result<Vec<Task>> {
    if !input_dir.exists() {
        return Err(CompressionError::FileNotFound(input_dir.to_path_buf()));
    }
    if !input_dir.is_dir() {
        return Err(CompressionError::NotADirectory(input_dir.to_path_buf()));
    }

    let input_root = input_dir.canonicalize()?;
    ensure_dir(output_dir)?;
    let output_root = output_dir.canonicalize()?;

    info!(
        "Scanning {} for {:?}",
        input_root.display(),
        extensions.iter().collect::<Vec<_>>()
    );

    let mut tasks = Vec::new();
    let walker = WalkDir::new(&input_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.path() != output_root);

    for entry in walker {
        let entry = entry?;
        if !is_file_entry(&entry) || !is_allowed_extension(entry.path(), extensions) {
            continue;
        }

        let output_path = mirror_output_path(entry.path(), &input_root, &output_root)?;
        if let Some(parent) = output_path.parent() {
            ensure_dir(parent)?;
        }

        debug!("Queued {}", entry.path().display());
        tasks.push(Task::new(entry.path(), output_path));
    }

    info!("Found {} matching files", tasks.len());
    Ok(tasks)
}

/// Case-insensitive extension check against an allow-list.
pub fn is_allowed_extension(path: &Path, extensions: &BTreeSet<String>) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase()))
        .unwrap_or(false)
}

/// Maps a file under `input_root` to the same relative location under `output_root`.
pub fn mirror_output_path(
    input_path: &Path,
    input_root: &Path,
    output_root: &Path,
) -> Result<PathBuf> {
    let relative = input_path
        .strip_prefix(input_root)
        .map_err(|_| CompressionError::FileNotFound(input_path.to_path_buf()))?;
    Ok(output_root.join(relative))
}

fn is_file_entry(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|e| CompressionError::DirectoryCreationFailed(dir.to_path_buf(), e))
}
