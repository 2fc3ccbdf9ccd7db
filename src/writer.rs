//! Markdown output writers.
//!
//! Section filenames originate in formatter code today, but the writer
//! treats every name as untrusted and validates it against path traversal
//! before touching the filesystem. Validation is layered: cheap string
//! checks first, then a canonical-path containment check that also catches
//! symlink tricks the string checks cannot see.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::debug;

/// Writer failures. Filename rejections signal a programming error in the
/// calling formatter, not transient input noise.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Invalid filename: contains null byte")]
    NullByte,

    #[error("Invalid filename {0:?}: contains '..'")]
    Traversal(String),

    #[error("Invalid filename {0:?}: absolute path")]
    AbsolutePath(String),

    #[error("Invalid filename {0:?}: Windows path prefix")]
    WindowsPath(String),

    #[error("Filename {0:?} resolves outside the output directory")]
    OutsideRoot(String),

    #[error("Cannot create output directory {}: {source}", path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("Cannot write {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// Capability that persists one rendered section.
pub trait OutputWriter {
    /// Write `content` under `filename` (a bare name, `.md` optional) and
    /// return the final location.
    fn write(&self, filename: &str, content: &str) -> Result<PathBuf, WriteError>;
}

/// Writes sections as files in a flat output directory.
pub struct MarkdownWriter {
    dir: PathBuf,
    /// Canonical form of `dir`, the containment boundary for every write.
    root: PathBuf,
}

impl MarkdownWriter {
    /// Create the output directory (and parents) and fix the containment
    /// root. Failure here is fatal for the run.
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self, WriteError> {
        let dir = output_dir.into();
        fs::create_dir_all(&dir).map_err(|source| WriteError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        let root = dir.canonicalize().map_err(|source| WriteError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir, root })
    }

    /// Validation rules, in order. The raw filename is checked before any
    /// `.md` extension is appended.
    fn validate(&self, filename: &str) -> Result<(), WriteError> {
        if filename.contains('\0') {
            return Err(WriteError::NullByte);
        }
        if filename.contains("..") {
            return Err(WriteError::Traversal(filename.to_string()));
        }
        if filename.starts_with('/') {
            return Err(WriteError::AbsolutePath(filename.to_string()));
        }
        if filename.starts_with('\\') || filename.chars().nth(1) == Some(':') {
            return Err(WriteError::WindowsPath(filename.to_string()));
        }

        let candidate = self.dir.join(filename);
        if !resolve_lenient(&candidate).starts_with(&self.root) {
            return Err(WriteError::OutsideRoot(filename.to_string()));
        }
        Ok(())
    }
}

impl OutputWriter for MarkdownWriter {
    fn write(&self, filename: &str, content: &str) -> Result<PathBuf, WriteError> {
        self.validate(filename)?;

        let path = self.dir.join(ensure_md(filename));
        fs::write(&path, content).map_err(|source| WriteError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("Wrote {}", path.display());
        Ok(path)
    }
}

/// Writer that keeps rendered sections in memory, keyed by final filename.
/// The test-double counterpart of [`MarkdownWriter`].
#[derive(Default)]
pub struct MemoryWriter {
    files: Mutex<BTreeMap<String, String>>,
}

impl MemoryWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    #[must_use]
    pub fn files(&self) -> BTreeMap<String, String> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl OutputWriter for MemoryWriter {
    fn write(&self, filename: &str, content: &str) -> Result<PathBuf, WriteError> {
        let final_name = ensure_md(filename);
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(final_name.clone(), content.to_string());
        Ok(PathBuf::from(final_name))
    }
}

fn ensure_md(filename: &str) -> String {
    if filename.ends_with(".md") {
        filename.to_string()
    } else {
        format!("{filename}.md")
    }
}

/// Canonicalize a path that may not exist yet: resolve the deepest existing
/// ancestor, then reattach the components below it. A path with no existing
/// anchor comes back unresolved, which the containment check then rejects.
fn resolve_lenient(path: &Path) -> PathBuf {
    let mut current = path.to_path_buf();
    let mut pending: Vec<OsString> = Vec::new();

    loop {
        match current.canonicalize() {
            Ok(mut resolved) => {
                for name in pending.iter().rev() {
                    resolved.push(name);
                }
                return resolved;
            }
            Err(_) => match (current.file_name(), current.parent()) {
                (Some(name), Some(parent)) if !parent.as_os_str().is_empty() => {
                    pending.push(name.to_os_string());
                    current = parent.to_path_buf();
                }
                _ => return path.to_path_buf(),
            },
        }
    }
}
