//! Error handling

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use crate::logic::forecast::ForecastError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    // Startup errors (fatal)
    #[error("failed to bind/listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("forecast model error: {0}")]
    Model(#[from] ForecastError),

    // Connection errors
    #[error("failed to accept peer: {0}")]
    Accept(#[source] io::Error),

    /// Peer went away. Ends the stream, never retried.
    #[error("peer write failed: {0}")]
    PeerWrite(#[source] io::Error),

    #[error("snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl AppError {
    /// Whether this error means the connected peer is gone
    pub fn is_disconnect(&self) -> bool {
        matches!(self, AppError::PeerWrite(_))
    }
}
