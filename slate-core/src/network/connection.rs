//! Per-connection writer: a bounded queue in front of the socket write half.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::error::SlateError;
use crate::network::{ConnectionId, ConnectionRegistry, FrameSink};

/// Default depth of a connection's outbound queue, in frames.
pub const DEFAULT_WRITER_QUEUE: usize = 1024;

/// Registry-facing handle to a connection's background writer task.
///
/// Sends never wait on the socket: a frame is queued or the send fails.
/// A full queue means the peer has stopped draining, which is treated
/// the same as a dead socket.
#[derive(Debug, Clone)]
pub struct PeerWriter {
    tx: mpsc::Sender<Bytes>,
}

/// Receiving end of a [`PeerWriter`], consumed by [`write_loop`].
pub type WriterQueue = mpsc::Receiver<Bytes>;

impl PeerWriter {
    pub fn channel(capacity: usize) -> (Self, WriterQueue) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl FrameSink for PeerWriter {
    async fn send_frame(&self, frame: Bytes) -> Result<(), SlateError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => SlateError::Io(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "outbound queue full",
            )),
            TrySendError::Closed(_) => SlateError::PeerDisconnected,
        })
    }
}

/// Writer task: registry → network.
///
/// Drains `queue` into `writer` until every sender is gone (the
/// connection was unregistered) or a write fails, in which case the
/// connection is unregistered here. Either way the socket's write side
/// is shut down on exit, after everything queued has been flushed.
pub async fn write_loop<W>(
    id: ConnectionId,
    mut writer: W,
    mut queue: WriterQueue,
    registry: Arc<ConnectionRegistry>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(frame) = queue.recv().await {
        if let Err(e) = writer.write_all(&frame).await {
            warn!(%id, "network write error: {e}");
            registry.unregister(id).await;
            return;
        }
    }
    if let Err(e) = writer.shutdown().await {
        debug!(%id, "shutdown after drain failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    fn addr() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 4000))
    }

    #[tokio::test]
    async fn full_queue_is_a_send_failure() {
        let (writer, _queue) = PeerWriter::channel(1);
        writer.send_frame(Bytes::from_static(b"a\n")).await.unwrap();
        let err = writer.send_frame(Bytes::from_static(b"b\n")).await.unwrap_err();
        assert!(matches!(err, SlateError::Io(_)));
    }

    #[tokio::test]
    async fn closed_queue_is_a_disconnect() {
        let (writer, queue) = PeerWriter::channel(4);
        drop(queue);
        let err = writer.send_frame(Bytes::from_static(b"a\n")).await.unwrap_err();
        assert!(matches!(err, SlateError::PeerDisconnected));
    }

    #[tokio::test]
    async fn write_loop_flushes_in_order_then_stops() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (writer, queue) = PeerWriter::channel(8);
        let id = registry.register(addr(), Arc::new(writer.clone())).await;

        let mock = tokio_test::io::Builder::new()
            .write(b"first\n")
            .write(b"second\n")
            .build();

        writer.send_frame(Bytes::from_static(b"first\n")).await.unwrap();
        writer.send_frame(Bytes::from_static(b"second\n")).await.unwrap();
        drop(writer);
        registry.unregister(id).await;

        write_loop(id, mock, queue, registry.clone()).await;
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn write_error_unregisters() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (writer, queue) = PeerWriter::channel(8);
        let id = registry.register(addr(), Arc::new(writer.clone())).await;

        let mock = tokio_test::io::Builder::new()
            .write_error(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            ))
            .build();

        writer.send_frame(Bytes::from_static(b"doomed\n")).await.unwrap();
        write_loop(id, mock, queue, registry.clone()).await;

        assert!(!registry.contains(id).await);
        let err = writer.send_frame(Bytes::from_static(b"late\n")).await.unwrap_err();
        assert!(matches!(err, SlateError::PeerDisconnected));
    }
}
