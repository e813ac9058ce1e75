use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypeServerError {
    #[error("failed to spawn type server subprocess: {0}")]
    SpawnFailed(String),

    #[error("type server subprocess missing {0} pipe")]
    MissingPipe(&'static str),

    #[error("type server protocol error: {0}")]
    Protocol(String),

    #[error("type server request channel closed")]
    ChannelClosed,

    #[error("type server request timed out: {0}")]
    Timeout(String),
}
