//! File reading for loaders

use std::path::Path;

use super::{ResourceError, TypeHandler};

/// Read a UTF-8 text file
///
/// Missing, unreadable or non-UTF-8 files fail with [`ResourceError::Io`].
pub fn read_text(path: impl AsRef<Path>) -> Result<String, ResourceError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|source| ResourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Handler for plain text resources
pub fn text_handler() -> TypeHandler {
    TypeHandler::new(|path, _| read_text(path))
}
