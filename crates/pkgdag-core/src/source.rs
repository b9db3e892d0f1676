//! Document enumeration.
//!
//! The graph builder never touches the filesystem directly; it asks a
//! [`DocumentSource`] for every document up front. Sources must return
//! documents in lexical path order so that repeated builds see the same
//! discovery order.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::error::GraphError;

/// Default suffix of package documents.
pub const DEFAULT_SUFFIX: &str = ".yaml";

/// One raw document and the path it was found at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path relative to the source root.
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Something that can enumerate package documents.
pub trait DocumentSource {
    /// Return every document, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Io`] if enumeration or reading fails.
    fn documents(&self) -> Result<Vec<Document>, GraphError>;
}

// ---------------------------------------------------------------------------
// DirSource
// ---------------------------------------------------------------------------

/// Documents read from a directory on disk.
///
/// By default only regular files directly inside `root` whose name ends in
/// `.yaml` are read; subdirectories and symlinks are skipped.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
    suffix: String,
    recursive: bool,
}

impl DirSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            suffix: DEFAULT_SUFFIX.to_string(),
            recursive: false,
        }
    }

    /// Only read files whose name ends with `suffix`.
    #[must_use]
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Descend into subdirectories.
    #[must_use]
    pub const fn recursive(mut self) -> Self {
        self.recursive = true;
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl DocumentSource for DirSource {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn documents(&self) -> Result<Vec<Document>, GraphError> {
        let max_depth = if self.recursive { usize::MAX } else { 1 };
        let mut docs = Vec::new();

        for entry in WalkDir::new(&self.root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| GraphError::Io {
                path: e
                    .path()
                    .map_or_else(|| self.root.clone(), Path::to_path_buf),
                source: io::Error::from(e),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            let is_match = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.ends_with(&self.suffix));
            if !is_match {
                continue;
            }

            let bytes = fs::read(entry.path()).map_err(|source| GraphError::Io {
                path: entry.path().to_path_buf(),
                source,
            })?;
            let path = entry
                .path()
                .strip_prefix(&self.root)
                .unwrap_or_else(|_| entry.path())
                .to_path_buf();
            docs.push(Document { path, bytes });
        }

        docs.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(count = docs.len(), "enumerated documents");
        Ok(docs)
    }
}

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

/// Documents held in memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    docs: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the document at `path`.
    pub fn insert(&mut self, path: impl Into<PathBuf>, doc: impl Into<Vec<u8>>) {
        self.docs.insert(path.into(), doc.into());
    }

    /// Builder-style [`MemorySource::insert`].
    #[must_use]
    pub fn with(mut self, path: impl Into<PathBuf>, doc: impl Into<Vec<u8>>) -> Self {
        self.insert(path, doc);
        self
    }
}

impl<P, D> FromIterator<(P, D)> for MemorySource
where
    P: Into<PathBuf>,
    D: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (P, D)>>(iter: I) -> Self {
        let mut source = Self::new();
        for (path, doc) in iter {
            source.insert(path, doc);
        }
        source
    }
}

impl DocumentSource for MemorySource {
    fn documents(&self) -> Result<Vec<Document>, GraphError> {
        Ok(self
            .docs
            .iter()
            .map(|(path, bytes)| Document {
                path: path.clone(),
                bytes: bytes.clone(),
            })
            .collect())
    }
}
