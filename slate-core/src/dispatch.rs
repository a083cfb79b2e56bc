//! Host-side broadcast dispatcher.
//!
//! The host raster is the ground truth. A command is drawn locally first
//! and only then handed to the registry; nothing that happens on the
//! network side can undo or delay the local draw.
//!
//! A command is refused before the local draw if any replica would refuse
//! it, which includes frames over the link's size limit.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::codec::{DEFAULT_MAX_FRAME_LEN, encode_frame};
use crate::command::Command;
use crate::error::SlateError;
use crate::network::{BroadcastReport, ConnectionRegistry};
use crate::render::{Raster, Renderer};

/// Owns the host raster and fans commands out to every client.
#[derive(Debug)]
pub struct Dispatcher<R = Raster> {
    raster: R,
    registry: Arc<ConnectionRegistry>,
    max_frame_len: Option<usize>,
}

impl<R: Renderer> Dispatcher<R> {
    /// Dispatcher with the default frame limit.
    pub fn new(raster: R, registry: Arc<ConnectionRegistry>) -> Self {
        Self {
            raster,
            registry,
            max_frame_len: Some(DEFAULT_MAX_FRAME_LEN),
        }
    }

    /// Use the frame limit the clients decode with; `None` disables it.
    pub fn with_max_frame_len(mut self, max_frame_len: Option<usize>) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    pub fn raster(&self) -> &R {
        &self.raster
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Apply `command` to the host raster, then broadcast it.
    ///
    /// Fails when the command is invalid or its frame is over the limit,
    /// in which case no replica (local or remote) is touched.
    pub async fn dispatch(&mut self, command: Command) -> Result<BroadcastReport, SlateError> {
        let frame = encode_frame(&command)?;
        let size = frame.len() - 1;
        if let Some(max) = self.max_frame_len.filter(|max| size > *max) {
            return Err(SlateError::FrameTooLarge { size, max });
        }
        command.apply(&mut self.raster);

        let report = self.registry.broadcast(frame).await;
        if !report.dropped.is_empty() {
            warn!(
                "{} delivered to {}, {} connection(s) dropped",
                command,
                report.delivered,
                report.dropped.len()
            );
        } else {
            debug!("{} delivered to {}", command, report.delivered);
        }
        Ok(report)
    }

    pub fn into_raster(self) -> R {
        self.raster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::Rgb;

    #[tokio::test]
    async fn local_apply_happens_without_clients() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut dispatcher = Dispatcher::new(Raster::blank(), registry);

        let report = dispatcher
            .dispatch(Command::Line {
                x1: 0.0,
                y1: 0.0,
                x2: 10.0,
                y2: 10.0,
                color: "black".into(),
                width: 2,
            })
            .await
            .unwrap();

        assert_eq!(report.delivered, 0);
        assert_eq!(dispatcher.raster().pixel(5, 5), Some(Rgb::BLACK));
    }

    #[tokio::test]
    async fn invalid_command_touches_nothing() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut dispatcher = Dispatcher::new(Raster::blank(), registry);

        let result = dispatcher
            .dispatch(Command::Rectangle {
                x1: 0.0,
                y1: 0.0,
                x2: 10.0,
                y2: 10.0,
                color: "red".into(),
                width: 0,
            })
            .await;

        assert!(matches!(result, Err(SlateError::MalformedCommand(_))));
        assert!(dispatcher.raster().is_blank());
    }

    fn long_label(len: usize) -> Command {
        Command::Text {
            x: 10.0,
            y: 10.0,
            text: "x".repeat(len),
            color: "black".into(),
            size: 10,
        }
    }

    #[tokio::test]
    async fn oversized_frame_touches_nothing() {
        let registry = Arc::new(ConnectionRegistry::new());
        let (writer, mut queue) = crate::network::PeerWriter::channel(4);
        registry
            .register(([127, 0, 0, 1], 4000).into(), Arc::new(writer))
            .await;
        let mut dispatcher = Dispatcher::new(Raster::blank(), registry);

        let result = dispatcher.dispatch(long_label(70_000)).await;

        assert!(matches!(
            result,
            Err(SlateError::FrameTooLarge { max, .. }) if max == DEFAULT_MAX_FRAME_LEN
        ));
        assert!(dispatcher.raster().is_blank());
        assert!(queue.try_recv().is_err());

        // The connection is still usable afterwards.
        let report = dispatcher.dispatch(Command::Clear).await.unwrap();
        assert_eq!(report.delivered, 1);
        assert!(queue.try_recv().is_ok());
    }

    #[tokio::test]
    async fn frame_limit_follows_the_link() {
        let registry = Arc::new(ConnectionRegistry::new());
        let mut bounded = Dispatcher::new(Raster::blank(), Arc::clone(&registry))
            .with_max_frame_len(Some(64));
        assert!(matches!(
            bounded.dispatch(long_label(100)).await,
            Err(SlateError::FrameTooLarge { max: 64, .. })
        ));

        let mut unbounded =
            Dispatcher::new(Raster::blank(), registry).with_max_frame_len(None);
        unbounded.dispatch(long_label(70_000)).await.unwrap();
        assert!(!unbounded.raster().is_blank());
    }
}
