//! Zip extraction for downloaded dependencies.

use std::fs::File;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Archive errors.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("archive entry {0:?} escapes the target directory")]
    UnsafeEntry(String),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Where an entry named `name` lands under `target`.
///
/// Returns `None` for names with parent, root or drive components.
pub fn entry_destination(target: &Path, name: &str) -> Option<PathBuf> {
    let mut dest = target.to_path_buf();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => dest.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(dest)
}

/// Extract `zip_path` into `target`, entry by entry.
///
/// Returns the number of files written. Fails on the first entry that would
/// land outside `target`; entries extracted before it are left in place.
pub fn extract(zip_path: &Path, target: &Path) -> Result<usize, ArchiveError> {
    std::fs::create_dir_all(target).map_err(io_error(target))?;

    let file = File::open(zip_path).map_err(io_error(zip_path))?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut written = 0;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        let dest = entry_destination(target, &name).ok_or(ArchiveError::UnsafeEntry(name))?;

        if entry.is_dir() {
            std::fs::create_dir_all(&dest).map_err(io_error(&dest))?;
            continue;
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let mut out = File::create(&dest).map_err(io_error(&dest))?;
        std::io::copy(&mut entry, &mut out).map_err(io_error(&dest))?;
        written += 1;
    }

    debug!(
        "Extracted {written} files from {} into {}",
        zip_path.display(),
        target.display()
    );
    Ok(written)
}

/// Recursively delete `path` if it exists.
pub fn remove_dir_if_exists(path: &Path) -> Result<(), ArchiveError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ArchiveError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
