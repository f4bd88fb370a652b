use std::path::PathBuf;
use thiserror::Error;

pub type UploadResult<T> = Result<T, UploadError>;

/// Everything that can stop a folder upload.
///
/// Directory creation failures are deliberately absent: they are logged and
/// swallowed by the uploader.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("{} is not located under the upload root {}", path.display(), root.display())]
    OutsideRoot { root: PathBuf, path: PathBuf },

    #[error("local i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to upload file. Returned status {status}")]
    UploadRejected { status: String },

    #[error("ftp transport error: {0}")]
    Transport(#[source] anyhow::Error),
}

impl UploadError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors raised before any filesystem or network activity.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration(_))
    }
}
