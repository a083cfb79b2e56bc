//! Host-side accept loop.
//!
//! ```text
//!  Listening ──(accept)──► register ──► spawn writer + receiver ──► Listening
//! ```
//!
//! A connection is registered before its tasks start, so a broadcast can
//! never race ahead of the registry. The loop itself never awaits any
//! client's I/O.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::codec::{CommandCodec, DEFAULT_MAX_FRAME_LEN};
use crate::error::SlateError;
use crate::network::connection::{DEFAULT_WRITER_QUEUE, PeerWriter, write_loop};
use crate::network::receiver::receive_loop;
use crate::network::{ConnectionId, ConnectionRegistry};

/// Per-connection tuning applied by the acceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkOptions {
    /// Frame size limit for inbound data; `None` disables it.
    pub max_frame_len: Option<usize>,
    /// Outbound queue depth per connection, in frames.
    pub writer_queue: usize,
}

impl Default for LinkOptions {
    fn default() -> Self {
        Self {
            max_frame_len: Some(DEFAULT_MAX_FRAME_LEN),
            writer_queue: DEFAULT_WRITER_QUEUE,
        }
    }
}

/// Accepts clients and attaches them to a [`ConnectionRegistry`].
#[derive(Debug)]
pub struct Acceptor {
    listener: TcpListener,
    registry: Arc<ConnectionRegistry>,
    options: LinkOptions,
}

impl Acceptor {
    /// Bind a listener on `addr`.
    pub async fn bind<A: ToSocketAddrs>(
        addr: A,
        registry: Arc<ConnectionRegistry>,
        options: LinkOptions,
    ) -> Result<Self, SlateError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self::new(listener, registry, options))
    }

    pub fn new(listener: TcpListener, registry: Arc<ConnectionRegistry>, options: LinkOptions) -> Self {
        Self {
            listener,
            registry,
            options,
        }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SlateError> {
        Ok(self.listener.local_addr()?)
    }

    /// The registry new connections are attached to.
    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Accept connections until the task is dropped or aborted.
    pub async fn run(self) {
        if let Ok(addr) = self.listener.local_addr() {
            info!("listening on {addr}");
        }
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    self.attach(stream, peer).await;
                }
                Err(e) => {
                    warn!("accept error: {e}");
                }
            }
        }
    }

    /// Run the accept loop on its own task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Register one accepted stream and start its writer and receiver.
    async fn attach(&self, stream: TcpStream, peer: SocketAddr) -> ConnectionId {
        if let Err(e) = stream.set_nodelay(true) {
            debug!(%peer, "set_nodelay failed: {e}");
        }
        let (read_half, write_half) = stream.into_split();

        let (writer, queue) = PeerWriter::channel(self.options.writer_queue);
        let id = self.registry.register(peer, Arc::new(writer)).await;

        tokio::spawn(write_loop(id, write_half, queue, Arc::clone(&self.registry)));

        // Clients have nothing meaningful to send upstream; the reader
        // only exists to notice when the peer goes away.
        let registry = Arc::clone(&self.registry);
        let codec = CommandCodec::with_max_frame_len(self.options.max_frame_len);
        tokio::spawn(async move {
            let summary = receive_loop(read_half, codec, |command| {
                debug!(%id, "ignoring upstream {command}");
            })
            .await;
            if summary.is_clean() {
                info!(%id, "client closed the connection");
            } else {
                warn!(%id, "dropping client: {}", summary.reason);
            }
            registry.unregister(id).await;
        });

        id
    }
}
