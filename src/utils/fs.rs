use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{map_io_err, Result};

/// Read a file's contents as a UTF-8 string
pub fn read_file_to_string(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    debug!("Reading file: {}", path.display());

    fs::read_to_string(path).map_err(map_io_err(path))
}

/// Write string content to a file, truncating any existing content
pub fn write_file_sync(path: impl AsRef<Path>, content: &str) -> Result<()> {
    let path = path.as_ref();
    debug!("Writing {} bytes to file: {}", content.len(), path.display());

    fs::write(path, content).map_err(map_io_err(path))
}

/// Check if a file exists
pub fn file_exists(path: impl AsRef<Path>) -> bool {
    let path = path.as_ref();
    path.exists() && path.is_file()
}
