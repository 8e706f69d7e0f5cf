use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid bundle entry: {0}")]
    InvalidEntry(String),

    #[error("missing field: {0}")]
    MissingField(String),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
