use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("malformed record batch: {0}")]
    MalformedBatch(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
