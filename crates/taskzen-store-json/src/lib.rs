//! File-backed storage for taskzen task collections.
//!
//! Each namespace key maps to one pretty-printed JSON array at
//! `<dir>/<namespace>.json`. Writes go through a temporary file in the same
//! directory that is renamed over the previous document.

mod error;

pub use error::JsonStoreError;

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use taskzen_core::Task;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, JsonStoreError>;

const DOCUMENT_EXTENSION: &str = "json";

/// Returns true when `namespace` can be used as a storage key.
///
/// Keys are non-empty, made of ASCII alphanumerics, `-`, `_`, or `.`, and must
/// not start with `.`.
#[must_use]
pub fn is_valid_namespace(namespace: &str) -> bool {
    !namespace.is_empty()
        && !namespace.starts_with('.')
        && namespace
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
}

/// Storage based on one JSON document per namespace inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) the data directory.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for a namespace.
    ///
    /// # Errors
    /// Returns an error if the namespace is not a valid key.
    pub fn document_path(&self, namespace: &str) -> Result<PathBuf> {
        if !is_valid_namespace(namespace) {
            return Err(JsonStoreError::InvalidNamespace(namespace.to_owned()));
        }
        Ok(self.dir.join(format!("{namespace}.{DOCUMENT_EXTENSION}")))
    }

    /// Load the collection stored under `namespace`.
    ///
    /// Returns `Ok(None)` when nothing has been saved yet.
    ///
    /// # Errors
    /// Returns an error if the document cannot be read or is not a valid task list.
    pub fn load(&self, namespace: &str) -> Result<Option<Vec<Task>>> {
        let path = self.document_path(namespace)?;
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No stored collection");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        let tasks: Vec<Task> =
            serde_json::from_str(&contents).map_err(|source| JsonStoreError::Parse { path: path.clone(), source })?;
        info!(path = %path.display(), count = tasks.len(), "Loaded collection");
        Ok(Some(tasks))
    }

    /// Replace the collection stored under `namespace`.
    ///
    /// # Errors
    /// Returns an error if serialization or any file operation fails. The
    /// previous document is left untouched in that case.
    pub fn save(&self, namespace: &str, tasks: &[Task]) -> Result<()> {
        let path = self.document_path(namespace)?;
        let mut staged = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(staged.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, tasks).map_err(JsonStoreError::Serialize)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
        }
        staged.as_file().sync_all()?;
        staged
            .persist(&path)
            .map_err(|err| JsonStoreError::Persist {
                path: path.clone(),
                source: err.error,
            })?;
        info!(path = %path.display(), count = tasks.len(), "Saved collection");
        Ok(())
    }
}
