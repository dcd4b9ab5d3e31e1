//! Build error types.

use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by build stages.
///
/// Stages propagate these through `anyhow`, adding the node or step as context.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("could not read `{0}`")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("could not write `{0}`")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("{engine} failed: {message}")]
    Preprocess { engine: String, message: String },

    #[error("could not render template `{path}`: {message}")]
    Render { path: PathBuf, message: String },

    #[error("refusing to delete filesystem root `{0}`")]
    Path(PathBuf),
}
