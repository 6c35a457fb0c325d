use tracing::subscriber::SetGlobalDefaultError;

/// Error returned when a record could not be written.
#[derive(thiserror::Error, Debug)]
pub enum HandleError {
    #[error("failed to write log record: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Error returned when installing the global `tracing` subscriber.
#[derive(thiserror::Error, Debug)]
pub enum InitError {
    #[error("global subscriber already set: {0}")]
    SetGlobal(#[from] SetGlobalDefaultError),
}
