use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: String, source: io::Error },

    #[error("address record not found at {path}")]
    RecordNotFound { path: PathBuf },

    #[error("address record at {path} is corrupt: {reason}")]
    CorruptRecord { path: PathBuf, reason: String },

    #[error("connection error: {0}")]
    Connection(#[source] io::Error),

    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLarge { len: usize, max: usize },

    #[error(transparent)]
    Io(#[from] io::Error),
}
