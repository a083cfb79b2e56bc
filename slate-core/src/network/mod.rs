//! TCP plumbing for both roles.
//!
//! Host: [`Acceptor`] → [`ConnectionRegistry`] → per-connection writer and
//! receiver tasks. Client: [`HostLink`] → [`receive_loop`].

pub mod acceptor;
pub mod client;
pub mod connection;
pub mod receiver;
pub mod registry;

pub use acceptor::{Acceptor, LinkOptions};
pub use client::HostLink;
pub use connection::{DEFAULT_WRITER_QUEUE, PeerWriter};
pub use receiver::{FeedSummary, receive_loop};
pub use registry::{BroadcastReport, ConnectionId, ConnectionRegistry, FrameSink, PeerInfo};
