//! Client side of the link: one connection to the host, one receive loop.

use std::net::SocketAddr;

use tokio::net::TcpStream;
use tracing::info;

use crate::codec::CommandCodec;
use crate::command::Command;
use crate::error::SlateError;
use crate::network::receiver::{FeedSummary, receive_loop};
use crate::render::Renderer;

/// A live feed from the host.
#[derive(Debug)]
pub struct HostLink {
    stream: TcpStream,
    peer: SocketAddr,
    codec: CommandCodec,
}

impl HostLink {
    /// Connect once. Failure is final: there is no retry.
    pub async fn connect(addr: SocketAddr, codec: CommandCodec) -> Result<Self, SlateError> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| SlateError::ConnectFailure { addr, source })?;
        stream.set_nodelay(true)?;
        info!("connected to host at {addr}");
        Ok(Self {
            stream,
            peer: addr,
            codec,
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Hand every received command to `on_command` until the feed ends.
    pub async fn run<F>(self, on_command: F) -> FeedSummary
    where
        F: FnMut(Command),
    {
        receive_loop(self.stream, self.codec, on_command).await
    }

    /// Apply the feed to `renderer` until it ends.
    ///
    /// Whatever was rendered before the feed ended stays untouched.
    pub async fn mirror<R: Renderer + ?Sized>(self, renderer: &mut R) -> FeedSummary {
        self.run(|command| command.apply(&mut *renderer)).await
    }
}
