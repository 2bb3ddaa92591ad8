//! Resource errors

use std::path::PathBuf;

use thiserror::Error;

use crate::graphics::GraphicsError;

/// Resource cache errors
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A handler for this type tag is already registered
    #[error("Resource type handler '{0}' already exists")]
    DuplicateHandler(String),

    /// No handler was registered for this type tag
    #[error("No resource handler found for type '{0}'")]
    UnknownType(String),

    /// Caller passed an argument the operation does not accept
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// File could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Cached value is not of the requested type
    #[error("Resource at {} is not a {expected}", .path.display())]
    TypeMismatch {
        /// Resolved path of the cached entry
        path: PathBuf,
        /// Requested Rust type
        expected: &'static str,
    },

    /// Graphics backend rejected the resource
    #[error("Graphics error: {0}")]
    Graphics(#[from] GraphicsError),

    /// Loader-specific failure
    #[error("Loader error: {0}")]
    Loader(String),

    /// One or more cleaners failed; every entry was still evicted
    #[error("Cleanup failed for {} resource(s): {}", .0.len(), .0.join(", "))]
    CleanupFailed(Vec<String>),
}
