//! Unified error type of the runtime.
use thiserror::Error;
use tokio::sync::oneshot;

pub use travel_graph::StoreError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("bot state store lock was poisoned")]
    LockPoisoned,

    #[error("maintenance worker command channel closed")]
    CommandChannelClosed,

    #[error("maintenance worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("maintenance task join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("failed to initialize logging: {0}")]
    Logging(String),
}
