//! Directory tree copies and walks.
//!
//! These run on the blocking pool: they touch an unbounded number of files
//! and `walkdir` is synchronous.

use atlas_core::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

pub(crate) async fn run_blocking<T, F>(f: F) -> Result<T, StoreError>
where
    F: FnOnce() -> io::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| StoreError::Generic(format!("blocking task failed: {e}")))?
        .map_err(StoreError::Io)
}

/// Copies every top-level entry of `src` into `dest`, replacing same-named
/// entries. `dest` is created if needed. Returns the copied entry names.
pub(crate) async fn merge_entries(src: PathBuf, dest: PathBuf) -> Result<Vec<String>, StoreError> {
    run_blocking(move || merge_entries_blocking(&src, &dest)).await
}

/// Replaces `dest` with a deep copy of `src`. Returns the number of files copied.
pub(crate) async fn replace_tree(src: PathBuf, dest: PathBuf) -> Result<u64, StoreError> {
    run_blocking(move || {
        remove_entry(&dest)?;
        copy_dir(&src, &dest)
    })
    .await
}

/// All regular files below `root`, with `/` separated relative paths.
pub(crate) async fn list_files(root: PathBuf) -> Result<Vec<StagedFile>, StoreError> {
    run_blocking(move || list_files_blocking(&root)).await
}

fn merge_entries_blocking(src: &Path, dest: &Path) -> io::Result<Vec<String>> {
    fs::create_dir_all(dest)?;

    let mut entries = fs::read_dir(src)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.file_name());

    let mut names = Vec::with_capacity(entries.len());
    for entry in entries {
        let target = dest.join(entry.file_name());
        remove_entry(&target)?;
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

fn remove_entry(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

fn copy_dir(src: &Path, dest: &Path) -> io::Result<u64> {
    let mut files = 0;
    for entry in WalkDir::new(src) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            files += 1;
        }
    }
    Ok(files)
}

fn list_files_blocking(root: &Path) -> io::Result<Vec<StagedFile>> {
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(io::Error::other)?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        let meta = entry.metadata()?;
        let modified = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map_err(io::Error::other)?
            .as_secs_f64();

        files.push(StagedFile {
            name,
            size: meta.len(),
            modified,
        });
    }
    Ok(files)
}
