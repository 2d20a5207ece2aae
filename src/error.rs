use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Per-document failures. The batch driver logs these and moves on.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no identifier mapped for {}", path.display())]
    MissingIdentifier { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },
}

/// Failures inside the image-transfer collaborator. Never leaves
/// `ImageStore::resolve`; the original reference is kept instead.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("io: {0}")]
    Io(#[from] io::Error),
}
