//! On-disk patching with all-or-nothing replacement.
//!
//! The target is read in full, patched in memory, written to a temporary
//! file beside it and renamed over it. The target keeps its old content
//! until the rename, so any failure before that point leaves it as it
//! was. A symlinked target is resolved first, so the link survives and
//! the file it points to is replaced.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use salesbot_route::Point;
use tempfile::NamedTempFile;

use crate::table::{TableError, patch_table};

/// Errors from patching a program file on disk.
#[derive(Debug, thiserror::Error)]
pub enum PatchFileError {
    /// The target file does not exist.
    #[error("{} not found", .path.display())]
    NotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Reading or writing the target failed.
    #[error("{}: {source}", .path.display())]
    Io {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// The target's coordinate table is malformed.
    #[error("{}: {source}", .path.display())]
    Malformed {
        /// The file being patched.
        path: PathBuf,
        /// What is wrong with its table.
        #[source]
        source: TableError,
    },
}

impl PatchFileError {
    /// Short name of the error kind, for reporting.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "FileNotFound",
            Self::Io { .. } => "Io",
            Self::Malformed { .. } => "MalformedTable",
        }
    }
}

/// What a successful patch changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchSummary {
    /// Number of old table body lines discarded.
    pub replaced_lines: usize,
    /// Number of waypoint entries written.
    pub entries: usize,
    /// Size of the new file in bytes.
    pub bytes: usize,
}

/// Read `path`, patch its coordinate table with `waypoints`, and replace
/// it atomically.
///
/// # Errors
///
/// Returns [`PatchFileError::NotFound`] if `path` does not exist,
/// [`PatchFileError::Malformed`] if its table cannot be patched, and
/// [`PatchFileError::Io`] for any other read or write failure. The file is
/// unchanged on every error.
pub fn patch_file(path: &Path, waypoints: &[Point]) -> Result<PatchSummary, PatchFileError> {
    let source = read_program(path)?;
    let patched = patch_table(&source, waypoints).map_err(|source| PatchFileError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    replace_atomically(path, &patched.content).map_err(|source| PatchFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!(
        "patched {}: {} old table lines replaced by {} entries",
        path.display(),
        patched.replaced_lines,
        patched.entries
    );

    Ok(PatchSummary {
        replaced_lines: patched.replaced_lines,
        entries: patched.entries,
        bytes: patched.content.len(),
    })
}

/// Read the whole program as bytes. The text need not be UTF-8.
///
/// # Errors
///
/// Returns [`PatchFileError::NotFound`] if `path` does not exist and
/// [`PatchFileError::Io`] for other failures.
pub fn read_program(path: &Path) -> Result<Vec<u8>, PatchFileError> {
    fs::read(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            PatchFileError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            PatchFileError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Write `content` to a temporary file beside the resolved target, then
/// rename it over the target, keeping the original permissions.
fn replace_atomically(path: &Path, content: &[u8]) -> io::Result<()> {
    let target = fs::canonicalize(path)?;
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let permissions = fs::metadata(&target)?.permissions();

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    fs::set_permissions(tmp.path(), permissions)?;

    tmp.persist(&target).map_err(|e| e.error)?;
    log::debug!("replaced {} ({} bytes)", target.display(), content.len());
    Ok(())
}
