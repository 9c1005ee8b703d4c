//! All-or-nothing file replacement
//!
//! Content goes to a temporary sibling of the target, is synced, and is then
//! renamed over the target. On any failure the temporary file is removed and
//! the target keeps its previous content (or stays absent).

use sealwright_core::{Error, Result};
use std::fs;
use std::io::Write;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Atomically replace `path` with `content`
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    write_atomic_validated(path, content, |_| Ok(()))
}

/// Atomically replace `path` with `content` once `validate` accepts it
///
/// Empty content and rejected content fail before the filesystem is touched.
/// Missing parent directories are created, and removed again if the write
/// fails.
pub fn write_atomic_validated<F>(path: &Path, content: &[u8], validate: F) -> Result<()>
where
    F: FnOnce(&[u8]) -> Result<()>,
{
    if content.is_empty() {
        return Err(Error::validation(
            path.display().to_string(),
            "refusing to write empty content",
        ));
    }
    validate(content)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| Error::validation(path.display().to_string(), "path has no file name"))?;
    let created = first_missing_ancestor(dir);
    let result = fs::create_dir_all(dir)
        .map_err(Error::from)
        .and_then(|()| replace(dir, path, file_name, content));
    if let Err(e) = result {
        if let Some(created) = created {
            remove_created_dirs(dir, &created);
        }
        return Err(e);
    }

    debug!("Atomically wrote {} ({} bytes)", path.display(), content.len());
    Ok(())
}

fn replace(dir: &Path, path: &Path, file_name: &OsStr, content: &[u8]) -> Result<()> {
    let mut temp = tempfile::Builder::new()
        .prefix(&format!(".{}.", file_name.to_string_lossy()))
        .suffix(".tmp")
        .tempfile_in(dir)?;
    write_and_sync(&mut temp, content)?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    sync_dir(dir);
    Ok(())
}

/// Outermost ancestor of `dir` that does not exist yet
fn first_missing_ancestor(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .take_while(|a| !a.as_os_str().is_empty() && !a.exists())
        .last()
        .map(Path::to_path_buf)
}

/// Remove the directories a failed write created, innermost first
fn remove_created_dirs(dir: &Path, created: &Path) {
    for ancestor in dir.ancestors() {
        if fs::remove_dir(ancestor).is_err() || ancestor == created {
            break;
        }
    }
}

fn write_and_sync(temp: &mut NamedTempFile, content: &[u8]) -> Result<()> {
    temp.write_all(content)?;
    temp.flush()?;
    temp.as_file().sync_all()?;
    Ok(())
}

/// Persist the rename itself; not every platform can open a directory
fn sync_dir(dir: &Path) {
    if let Ok(handle) = fs::File::open(dir) {
        let _ = handle.sync_all();
    }
}
