use std::path::PathBuf;
use thiserror::Error;

/// Main error type for convpatch
///
/// The only failure the tool recognizes is file access going wrong.
/// A pattern that fails to match is deliberately not an error; the
/// outcome is surfaced through [`crate::patch::PatchOutcome`] instead.
#[derive(Error, Debug)]
pub enum PatchError {
    #[error("IO error: {source} (path: {path})", path = .path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },
}

impl PatchError {
    /// Create a new IO error with path context
    pub fn io_error(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source: err,
            path: path.into(),
        }
    }
}

/// Result type alias using PatchError
pub type Result<T> = std::result::Result<T, PatchError>;

/// Contextual error mapping function
pub fn map_io_err<P: Into<PathBuf>>(path: P) -> impl FnOnce(std::io::Error) -> PatchError {
    let path = path.into();
    move |err| PatchError::io_error(err, path)
}
