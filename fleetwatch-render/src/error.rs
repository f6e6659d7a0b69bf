//! Error types for rendering.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when rendering a chart.
///
/// The variants are kept apart so callers can pick a retry policy: a
/// timeout is worth retrying, a failed exit may not be, and a failed start
/// means the renderer is misconfigured.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A configured path could not be resolved.
    #[error("Failed to resolve path {path}: {source}")]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The renderer binary could not be started.
    #[error("Failed to start renderer {binary}: {source}")]
    Start {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The renderer exited with a non-zero status.
    #[error("Renderer exited with {0}")]
    Exit(ExitStatus),

    /// Waiting on the renderer failed.
    #[error("Failed waiting for renderer: {0}")]
    Wait(#[source] std::io::Error),

    /// The renderer did not finish in time and was killed.
    #[error("Render timed out (>{0:?})")]
    Timeout(Duration),
}

impl RenderError {
    /// Whether trying the same render again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, RenderError::Timeout(_) | RenderError::Wait(_))
    }

    /// Whether the error points at renderer configuration rather than a
    /// single bad render.
    pub fn is_configuration(&self) -> bool {
        matches!(self, RenderError::Path { .. } | RenderError::Start { .. })
    }
}
