//! Newline-delimited JSON framing for [`Command`]s.
//!
//! Each frame is one JSON object followed by `\n`. JSON string escaping
//! guarantees the delimiter never appears inside a payload, so a text
//! label containing a line break travels as the two-byte escape `\n`.
//!
//! Network reads do not line up with frames. [`CommandCodec`] keeps the
//! unconsumed tail in the `BytesMut` owned by `FramedRead` and only
//! decodes once a full line is buffered.

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::command::Command;
use crate::error::SlateError;

/// Frame boundary marker.
pub const FRAME_DELIMITER: u8 = b'\n';

/// Default cap on a single buffered frame (64 KiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 64 * 1024;

/// Encode a command as one complete frame, delimiter included.
pub fn encode_frame(command: &Command) -> Result<Bytes, SlateError> {
    command.validate()?;
    let mut buf = serde_json::to_vec(command)?;
    buf.push(FRAME_DELIMITER);
    Ok(Bytes::from(buf))
}

/// Decode the body of one frame (delimiter already stripped).
pub fn decode_frame(frame: &[u8]) -> Result<Command, SlateError> {
    let command: Command = serde_json::from_slice(frame)?;
    command.validate()?;
    Ok(command)
}

// ── CommandCodec ─────────────────────────────────────────────────

/// `tokio_util` codec for the slate wire format.
#[derive(Debug, Clone)]
pub struct CommandCodec {
    max_frame_len: Option<usize>,
    /// Where the next delimiter scan resumes, so a slowly arriving frame
    /// is not rescanned from the start on every read.
    next_index: usize,
}

impl CommandCodec {
    /// Codec with the default frame limit.
    pub fn new() -> Self {
        Self::with_max_frame_len(Some(DEFAULT_MAX_FRAME_LEN))
    }

    /// Codec with an explicit frame limit; `None` buffers without bound.
    pub fn with_max_frame_len(max_frame_len: Option<usize>) -> Self {
        Self {
            max_frame_len,
            next_index: 0,
        }
    }

    pub fn max_frame_len(&self) -> Option<usize> {
        self.max_frame_len
    }

    fn check_len(&self, size: usize) -> Result<(), SlateError> {
        match self.max_frame_len {
            Some(max) if size > max => Err(SlateError::FrameTooLarge { size, max }),
            _ => Ok(()),
        }
    }
}

impl Default for CommandCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for CommandCodec {
    type Item = Command;
    type Error = SlateError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let scan_from = self.next_index.min(src.len());
            let Some(offset) = src[scan_from..]
                .iter()
                .position(|b| *b == FRAME_DELIMITER)
            else {
                self.check_len(src.len())?;
                self.next_index = src.len();
                return Ok(None);
            };

            let end = scan_from + offset;
            self.next_index = 0;
            let frame = src.split_to(end + 1);
            let body = strip_carriage_return(&frame[..end]);

            if body.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            self.check_len(body.len())?;
            return decode_frame(body).map(Some);
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(command) = self.decode(src)? {
            return Ok(Some(command));
        }
        if src.iter().all(u8::is_ascii_whitespace) {
            src.clear();
            self.next_index = 0;
            return Ok(None);
        }
        Err(SlateError::IncompleteFrame { len: src.len() })
    }
}

impl Encoder<Command> for CommandCodec {
    type Error = SlateError;

    fn encode(&mut self, item: Command, dst: &mut BytesMut) -> Result<(), Self::Error> {
        item.validate()?;
        serde_json::to_writer(dst.writer(), &item)?;
        dst.put_u8(FRAME_DELIMITER);
        Ok(())
    }
}

fn strip_carriage_return(line: &[u8]) -> &[u8] {
    match line.split_last() {
        Some((b'\r', rest)) => rest,
        _ => line,
    }
}
