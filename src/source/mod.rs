//! Sources of status trees.
//!
//! Whatever collects alarm results publishes whole trees; a [`TreeSource`]
//! hands them to the [`Ingestor`](crate::Ingestor) which swaps them into the
//! store.

mod channel;
mod file;

pub use channel::ChannelSource;
pub use file::FileSource;

use std::fmt::Debug;
use std::path::PathBuf;

use fleetwatch_types::StatusTree;
use thiserror::Error;

/// Errors a source can record while polling.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Read error: {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Channel closed: {0}")]
    Closed(String),
}

/// Trait for receiving status trees from various sources.
///
/// # Example
///
/// ```
/// use fleetwatch::{FileSource, TreeSource};
///
/// let mut source = FileSource::new("status.json");
/// if let Some(tree) = source.poll() {
///     println!("Got {} namespaces", tree.len());
/// }
/// ```
pub trait TreeSource: Send + Debug {
    /// Poll for the latest tree.
    ///
    /// Returns `Some(tree)` if new data is available, `None` otherwise.
    /// Never blocks.
    fn poll(&mut self) -> Option<StatusTree>;

    /// Human-readable description of the source.
    fn description(&self) -> &str;

    /// The error from the last poll, if it failed.
    fn error(&self) -> Option<&SourceError>;
}
