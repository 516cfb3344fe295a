use std::io;
use std::path::PathBuf;

use morsefeed_core::{BufferError, OptionError, RecordError, TokenizeError};
use thiserror::Error;

use crate::persist::PersistError;
use crate::types::{FailureKind, FetchError};

/// Coarse classification of a [`FeedError`], used for exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    Fetch,
    OutOfMemory,
    Pipe,
    ProcessSpawn,
    InternalInvariantViolation,
    UnknownLabel,
    InvalidValue,
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },
    #[error("fetching {url} failed: {source}")]
    Fetch { url: String, source: FetchError },
    #[error("out of memory allocating {requested} bytes")]
    OutOfMemory { requested: usize },
    #[error("player pipe error: {0}")]
    Pipe(String),
    #[error("cannot start player {program}: {source}")]
    Spawn { program: String, source: io::Error },
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error("no saved options under label {0:?}")]
    UnknownLabel(String),
    #[error("state file: {0}")]
    Persist(#[from] PersistError),
    #[error("state file record: {0}")]
    Record(#[from] RecordError),
    #[error(transparent)]
    InvalidOption(#[from] OptionError),
    #[error("{0}")]
    InvalidValue(String),
}

impl FeedError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FeedError::Io(_) | FeedError::Open { .. } | FeedError::Persist(_) => ErrorKind::Io,
            FeedError::Fetch { source, .. } if source.kind == FailureKind::OutOfMemory => {
                ErrorKind::OutOfMemory
            }
            FeedError::Fetch { .. } => ErrorKind::Fetch,
            FeedError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            FeedError::Pipe(_) => ErrorKind::Pipe,
            FeedError::Spawn { .. } => ErrorKind::ProcessSpawn,
            FeedError::Tokenize(_) => ErrorKind::InternalInvariantViolation,
            FeedError::UnknownLabel(_) => ErrorKind::UnknownLabel,
            FeedError::Record(_) | FeedError::InvalidOption(_) | FeedError::InvalidValue(_) => {
                ErrorKind::InvalidValue
            }
        }
    }
}

impl From<BufferError> for FeedError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::OutOfMemory { requested } => FeedError::OutOfMemory { requested },
            BufferError::Io(err) => FeedError::Io(err),
        }
    }
}
