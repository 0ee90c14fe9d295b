//! Writing directory trees into zip archives.
//!
//! Traversal is sorted by file name and never follows symlinks, so the same
//! tree always yields the same entries in the same order. Entries carry a
//! fixed timestamp so repeated runs produce byte-identical archives.

use crate::error::{ErrorExt, PluginError, Result};
use std::io::{Cursor, Seek, Write};
use std::path::{Component, Path};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Options applied to every archive entry.
pub fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
}

/// Converts a relative path into a `/`-separated archive entry name.
///
/// Names that are not valid UTF-8 are rejected; rewriting them could make two
/// files share one entry.
fn entry_name(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part
                .to_str()
                .ok_or_else(|| PluginError::NonUtf8Path(relative.to_path_buf()))?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}

/// Writes every regular file under `source_dir` into `archive`.
///
/// Entry names are the file paths relative to `base_dir`, which may be an
/// ancestor of `source_dir`. Directories, symlinks and special files are
/// skipped. Existing entries are never touched.
///
/// Returns the number of files written.
///
/// # Errors
///
/// Fails if the tree cannot be walked or read, if a file does not live
/// under `base_dir`, or if a file name is not valid UTF-8.
pub fn write_tree<W: Write + Seek>(
    source_dir: &Path,
    base_dir: &Path,
    archive: &mut ZipWriter<W>,
) -> Result<usize> {
    let options = entry_options();
    let mut written = 0;

    for entry in WalkDir::new(source_dir)
        .follow_links(false)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(base_dir)
            .map_err(|_| PluginError::PathOutsideBase {
                path: entry.path().to_path_buf(),
                base: base_dir.to_path_buf(),
            })?;

        let contents =
            std::fs::read(entry.path()).fs_context("reading file for archive", entry.path())?;

        archive.start_file(entry_name(relative)?, options)?;
        archive
            .write_all(&contents)
            .fs_context("writing archive entry", entry.path())?;
        written += 1;
    }

    Ok(written)
}

/// Zips the tree rooted at `dir` into an in-memory archive.
///
/// Entry names are relative to `dir` itself.
pub fn zip_tree(dir: &Path) -> Result<Vec<u8>> {
    let mut archive = ZipWriter::new(Cursor::new(Vec::new()));
    write_tree(dir, dir, &mut archive)?;
    Ok(archive.finish()?.into_inner())
}
