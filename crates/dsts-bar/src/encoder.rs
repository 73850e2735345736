//! i3bar streaming encoder.
//!
//! See <https://i3wm.org/docs/i3bar-protocol.html>. The output is an
//! infinite JSON array: a header, an opening `[` with an empty first
//! element, then one `,`-prefixed array of blocks per refresh.

use crate::error::BarResult;
use dsts_core::StatusBlock;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

/// Protocol header followed by the opening of the never-closed outer array.
pub const HEADER: &str = r#"{"version":1}[[]"#;

/// Writes status line frames. Single writer: callers serialize access.
///
/// A write future dropped halfway leaves a partial frame behind, so only
/// drop one when the stream is being abandoned.
#[derive(Debug)]
pub struct StreamEncoder<W: AsyncWrite + Unpin> {
    writer: W,
    header_written: bool,
    frames: u64,
}

impl<W: AsyncWrite + Unpin> StreamEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
            frames: 0,
        }
    }

    /// Write the header unless it was already written.
    pub async fn write_header(&mut self) -> BarResult<()> {
        if self.header_written {
            return Ok(());
        }
        self.writer.write_all(HEADER.as_bytes()).await?;
        self.writer.flush().await?;
        self.header_written = true;
        Ok(())
    }

    /// Write one refresh.
    ///
    /// Returns `Ok(false)` when the frame couldn't be serialized; the frame
    /// is skipped and the stream stays valid. I/O errors are returned.
    pub async fn encode(&mut self, blocks: &[StatusBlock]) -> BarResult<bool> {
        self.write_header().await?;

        let json = match serde_json::to_vec(blocks) {
            Ok(json) => json,
            Err(e) => {
                debug!(error = %e, "Failed to serialize status line, skipping frame");
                return Ok(false);
            }
        };

        let mut frame = Vec::with_capacity(json.len() + 2);
        frame.push(b',');
        frame.extend_from_slice(&json);
        frame.push(b'\n');

        self.writer.write_all(&frame).await?;
        self.writer.flush().await?;
        self.frames += 1;
        trace!(frames = self.frames, blocks = blocks.len(), "Frame written");
        Ok(true)
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
