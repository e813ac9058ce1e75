use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChunksError {
    #[error("chunk span {start}..{end} is out of bounds for {file_path} ({len} bytes)")]
    SpanOutOfBounds {
        file_path: String,
        start: usize,
        end: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, ChunksError>;
