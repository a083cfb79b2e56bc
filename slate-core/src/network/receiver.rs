//! The receive loop shared by both roles.
//!
//! Bytes are appended to `FramedRead`'s buffer as they arrive and
//! [`CommandCodec`] pulls complete frames out of it, leaving any partial
//! tail in place for the next read.

use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;

use crate::codec::CommandCodec;
use crate::command::Command;
use crate::error::SlateError;

/// How a receive loop ended.
#[derive(Debug)]
pub struct FeedSummary {
    /// Commands decoded and handed to the handler.
    pub applied: u64,
    /// Why the loop stopped. A clean close is [`SlateError::PeerDisconnected`].
    pub reason: SlateError,
}

impl FeedSummary {
    /// `true` when the peer simply closed the stream.
    pub fn is_clean(&self) -> bool {
        matches!(self.reason, SlateError::PeerDisconnected)
    }
}

/// Read frames from `reader` until the stream ends or turns bad.
///
/// Every decoded command goes to `on_command`, in arrival order. The
/// first malformed frame ends the loop: the stream is not resynchronised.
pub async fn receive_loop<R, F>(reader: R, codec: CommandCodec, mut on_command: F) -> FeedSummary
where
    R: AsyncRead + Unpin,
    F: FnMut(Command),
{
    let mut frames = FramedRead::new(reader, codec);
    let mut applied = 0;

    let reason = loop {
        match frames.next().await {
            Some(Ok(command)) => {
                on_command(command);
                applied += 1;
            }
            Some(Err(e)) => break e,
            None => break SlateError::PeerDisconnected,
        }
    };

    FeedSummary { applied, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_frame;
    use crate::render::{Raster, Renderer};

    fn scenario() -> Vec<Command> {
        vec![
            Command::Line {
                x1: 0.0,
                y1: 0.0,
                x2: 10.0,
                y2: 10.0,
                color: "black".into(),
                width: 2,
            },
            Command::Clear,
            Command::Rectangle {
                x1: 5.0,
                y1: 5.0,
                x2: 50.0,
                y2: 50.0,
                color: "red".into(),
                width: 3,
            },
        ]
    }

    fn wire(commands: &[Command]) -> Vec<u8> {
        commands
            .iter()
            .flat_map(|c| encode_frame(c).unwrap().to_vec())
            .collect()
    }

    #[tokio::test]
    async fn reads_split_across_frame_boundaries() {
        let bytes = wire(&scenario());
        let mut builder = tokio_test::io::Builder::new();
        for chunk in bytes.chunks(7) {
            builder.read(chunk);
        }

        let mut seen = Vec::new();
        let summary = receive_loop(builder.build(), CommandCodec::new(), |c| seen.push(c)).await;

        assert!(summary.is_clean());
        assert_eq!(summary.applied, 3);
        assert_eq!(seen, scenario());
    }

    #[tokio::test]
    async fn applying_the_feed_converges_with_local_apply() {
        let bytes = wire(&scenario());
        let mut builder = tokio_test::io::Builder::new();
        for chunk in bytes.chunks(1) {
            builder.read(chunk);
        }

        let mut replica = Raster::blank();
        receive_loop(builder.build(), CommandCodec::new(), |c| c.apply(&mut replica)).await;

        let mut local = Raster::blank();
        for c in scenario() {
            c.apply(&mut local);
        }
        assert_eq!(replica.fingerprint(), local.fingerprint());

        let mut rect_only = Raster::blank();
        rect_only.draw_rectangle((5.0, 5.0), (50.0, 50.0), "red", 3);
        assert_eq!(replica, rect_only);
    }

    #[tokio::test]
    async fn malformed_frame_poisons_the_stream() {
        let mut bytes = wire(&[Command::Clear]);
        bytes.extend_from_slice(b"{\"action\":\"triangle\"}\n");
        bytes.extend_from_slice(&wire(&[Command::Clear]));
        let reader = tokio_test::io::Builder::new().read(&bytes).build();

        let mut seen = Vec::new();
        let summary = receive_loop(reader, CommandCodec::new(), |c| seen.push(c)).await;

        assert_eq!(seen, vec![Command::Clear]);
        assert!(matches!(summary.reason, SlateError::MalformedCommand(_)));
        assert!(!summary.is_clean());
    }

    #[tokio::test]
    async fn truncated_tail_is_reported() {
        let mut bytes = wire(&[Command::Clear]);
        bytes.extend_from_slice(b"{\"action\":\"cl");
        let reader = tokio_test::io::Builder::new().read(&bytes).build();

        let summary = receive_loop(reader, CommandCodec::new(), |_| {}).await;
        assert_eq!(summary.applied, 1);
        assert!(matches!(
            summary.reason,
            SlateError::IncompleteFrame { len: 13 }
        ));
    }

    #[tokio::test]
    async fn reset_ends_the_feed() {
        let reader = tokio_test::io::Builder::new()
            .read(&wire(&[Command::Clear]))
            .read_error(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            ))
            .build();

        let summary = receive_loop(reader, CommandCodec::new(), |_| {}).await;
        assert_eq!(summary.applied, 1);
        assert!(matches!(summary.reason, SlateError::Io(_)));
    }
}
