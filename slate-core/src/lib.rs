//! # slate-core
//!
//! Replication protocol for the slate shared whiteboard.
//!
//! This crate contains:
//! - **Command**: the closed set of replicated drawing operations
//! - **Codec**: `CommandCodec`, newline-delimited JSON framing via `tokio_util`
//! - **Render**: the `Renderer` seam and the deterministic software `Raster`
//! - **Network**: `ConnectionRegistry`, `Acceptor`, receive loop, `HostLink`
//! - **Dispatch**: `Dispatcher`, local apply followed by broadcast
//! - **Error**: `SlateError`, a `thiserror`-based error hierarchy

pub mod codec;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod network;
pub mod render;

// ── Re-exports for ergonomic usage ───────────────────────────────

pub use codec::{CommandCodec, DEFAULT_MAX_FRAME_LEN, decode_frame, encode_frame};
pub use command::Command;
pub use dispatch::Dispatcher;
pub use error::SlateError;
pub use network::{
    Acceptor, BroadcastReport, ConnectionId, ConnectionRegistry, FeedSummary, FrameSink,
    HostLink, LinkOptions, PeerInfo, PeerWriter, receive_loop,
};
pub use render::{CANVAS_HEIGHT, CANVAS_WIDTH, Raster, Renderer, Rgb};
