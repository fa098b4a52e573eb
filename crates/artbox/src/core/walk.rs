//! Directory walking for the batch tools
//!
//! Hidden entries (names starting with `.`, including `.git` and `.thumb`)
//! are never visited. Results are sorted so every run sees the same order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use tracing::warn;

use super::error::ArtboxError;
use super::raster::extension_of;

/// Extensions the raster tools pick up
pub const RASTER_EXTENSIONS: &[&str] = &["png", "jpg"];

fn require_dir(dir: &Path) -> Result<(), ArtboxError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("not a directory: {}", dir.display()),
        )
        .into())
    }
}

/// Recursively collect files under `dir` accepted by `keep`, sorted by path
pub fn collect_files<F>(dir: &Path, keep: F) -> Result<Vec<PathBuf>, ArtboxError>
where
    F: Fn(&Path) -> bool,
{
    require_dir(dir)?;

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .skip_hidden(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.path())
        .filter(|path| keep(path))
        .collect();

    files.sort();
    Ok(files)
}

/// Recursively collect files under `dir` whose extension is one of `extensions`
pub fn collect_with_extensions(
    dir: &Path,
    extensions: &[&str],
) -> Result<Vec<PathBuf>, ArtboxError> {
    collect_files(dir, |path| {
        let ext = extension_of(path);
        extensions.iter().any(|wanted| *wanted == ext)
    })
}

/// Immediate entries of `dir`, sorted by file name
pub fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, ArtboxError> {
    require_dir(dir)?;

    let mut entries = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, io::Error>>()?;
    entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(entries)
}

/// Name of the last path component as UTF-8, lossy
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
