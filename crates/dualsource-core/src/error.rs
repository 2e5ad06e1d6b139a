//! Error types for DualSource.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Worker pool closed: {0}")]
    PoolClosed(String),

    #[error("Gate timer stopped")]
    TimerStopped,

    #[error("Task failed: {0}")]
    Task(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
