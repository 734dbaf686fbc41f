use chrono::NaiveTime;
use thiserror::Error;

use crate::alarm::AlarmId;

/// Failures raised by a [`crate::blob::BlobStore`] implementation.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("blob key `{0}` is not a valid storage key")]
    InvalidKey(String),
    #[error("i/o failure on blob `{key}`")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to encode alarm collection")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode alarm collection")]
    Decode(#[source] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum AlarmError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("start time {start} is not before end time {end}")]
    InvalidRange { start: NaiveTime, end: NaiveTime },
    #[error("no alarm with id {0}")]
    NotFound(AlarmId),
}

pub type AlarmResult<T> = Result<T, AlarmError>;
