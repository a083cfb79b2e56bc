//! One session with the host: connect, then mirror until the feed ends.

use std::net::SocketAddr;
use std::time::Duration;

use tracing::{debug, info, warn};

use slate_core::{FeedSummary, HostLink, Raster, SlateError};

use crate::config::ClientConfig;

/// A connected client with its local replica.
#[derive(Debug)]
pub struct Session {
    link: HostLink,
    raster: Raster,
}

/// How a session ended.
#[derive(Debug)]
pub struct SessionEnd {
    /// The replica as it stood when the feed stopped.
    pub raster: Raster,
    pub summary: FeedSummary,
}

impl Session {
    /// Resolve the host address and connect once, within the timeout.
    pub async fn connect(config: &ClientConfig) -> Result<Self, SlateError> {
        let addr = resolve(&config.network.host_address).await?;
        let timeout = Duration::from_millis(config.network.timeout_ms.max(1));

        info!("connecting to host at {addr}");
        let link = match tokio::time::timeout(timeout, HostLink::connect(addr, config.codec())).await {
            Ok(link) => link?,
            Err(_) => {
                return Err(SlateError::ConnectFailure {
                    addr,
                    source: std::io::Error::new(
                        std::io::ErrorKind::TimedOut,
                        format!("no answer within {}ms", timeout.as_millis()),
                    ),
                });
            }
        };

        Ok(Self {
            link,
            raster: config.new_raster(),
        })
    }

    pub fn host_addr(&self) -> SocketAddr {
        self.link.peer_addr()
    }

    /// Apply every command from the host until the feed ends.
    pub async fn mirror(self) -> SessionEnd {
        let Self { link, mut raster } = self;
        let summary = link
            .run(|command| {
                debug!("{command}");
                command.apply(&mut raster);
            })
            .await;

        if summary.is_clean() {
            info!("host closed the feed after {} command(s)", summary.applied);
        } else {
            warn!(
                "feed stopped after {} command(s): {}",
                summary.applied, summary.reason
            );
        }
        SessionEnd { raster, summary }
    }
}

async fn resolve(address: &str) -> Result<SocketAddr, SlateError> {
    tokio::net::lookup_host(address)
        .await
        .map_err(|e| SlateError::Config(format!("bad host address '{address}': {e}")))?
        .next()
        .ok_or_else(|| SlateError::Config(format!("host address '{address}' did not resolve")))
}
