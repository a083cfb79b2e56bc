//! Domain-specific error types for the slate replication protocol.
//!
//! All fallible operations return `Result<T, SlateError>`.
//! Network-layer errors are recovered at connection granularity; none of
//! them is allowed to take the host process down.

use std::net::SocketAddr;

use thiserror::Error;

use crate::network::ConnectionId;

/// The canonical error type for the slate protocol.
#[derive(Debug, Error)]
pub enum SlateError {
    // ── Protocol Errors ──────────────────────────────────────────
    /// A frame did not hold a structurally valid command.
    #[error("malformed command: {0}")]
    MalformedCommand(String),

    /// A frame grew past the codec limit without a terminating newline.
    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// The stream ended in the middle of a frame.
    #[error("stream ended inside a frame ({len} bytes buffered)")]
    IncompleteFrame { len: usize },

    // ── Connection Errors ────────────────────────────────────────
    /// The client could not reach the host at startup.
    #[error("failed to connect to {addr}: {source}")]
    ConnectFailure {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// The peer closed the stream.
    #[error("peer disconnected")]
    PeerDisconnected,

    /// Writing to one registered connection failed.
    #[error("send to connection {0} failed")]
    SendFailure(ConnectionId),

    /// The TCP/IO layer reported an error.
    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    // ── Application Errors ───────────────────────────────────────
    /// Configuration could not be parsed or serialised.
    #[error("config error: {0}")]
    Config(String),
}

impl SlateError {
    /// Returns `true` for errors that mean the byte stream itself can no
    /// longer be trusted.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            SlateError::MalformedCommand(_)
                | SlateError::FrameTooLarge { .. }
                | SlateError::IncompleteFrame { .. }
        )
    }
}

// ── Convenient From implementations ──────────────────────────────

impl From<serde_json::Error> for SlateError {
    fn from(e: serde_json::Error) -> Self {
        SlateError::MalformedCommand(e.to_string())
    }
}
