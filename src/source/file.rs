//! File-based tree source.
//!
//! Polls a JSON file holding a serialized status tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use fleetwatch_types::StatusTree;

use super::{SourceError, TreeSource};

/// A source that reads status trees from a JSON file.
///
/// The collector rewrites the file; this source tracks the modification time
/// and only returns a tree when the file has changed since the last read.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<SourceError>,
    last_modified: Option<SystemTime>,
}

impl FileSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file once, regardless of its modification time.
    pub fn load(&self) -> Result<StatusTree, SourceError> {
        let content = fs::read_to_string(&self.path).map_err(|source| SourceError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }
}

impl TreeSource for FileSource {
    fn poll(&mut self) -> Option<StatusTree> {
        let current_modified = self.modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,
            // file disappeared, keep serving the last tree
            (Some(_), None) => false,
            (Some(last), Some(current)) => current > last,
        };
        if !file_changed {
            return None;
        }

        match self.load() {
            Ok(tree) => {
                self.last_error = None;
                self.last_modified = current_modified;
                Some(tree)
            }
            Err(err) => {
                self.last_error = Some(err);
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&SourceError> {
        self.last_error.as_ref()
    }
}
