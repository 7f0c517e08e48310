//! SSE decoding (Bytes -> JSON frames)

use crate::{BoxStream, Error};
use bytes::{Bytes, BytesMut};
use futures::{stream, StreamExt};
use serde_json::Value;
use tracing::warn;

const DATA_PREFIX: &str = "data:";
const DONE_SIGNAL: &str = "[DONE]";

/// One decoded server-sent event.
#[derive(Debug, Clone, PartialEq)]
pub enum SseFrame {
    Data(Value),
    /// `data: [DONE]`; nothing is emitted after it.
    Done,
}

/// Line-oriented decoder for `data: <json>` event streams.
///
/// Lines without the `data:` prefix (comments, `event:` fields, blank
/// separators) are ignored. A payload that is not valid JSON is logged and
/// skipped. Transport errors from the byte stream are passed through.
#[derive(Debug, Default, Clone)]
pub struct SseDecoder;

impl SseDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Classify a single line. `None` means the line carries no frame.
    pub fn parse_line(line: &str) -> Option<SseFrame> {
        let line = line.trim();
        let payload = line.strip_prefix(DATA_PREFIX)?.trim_start();
        if payload.is_empty() {
            return None;
        }
        if payload == DONE_SIGNAL {
            return Some(SseFrame::Done);
        }
        match serde_json::from_str::<Value>(payload) {
            Ok(v) => Some(SseFrame::Data(v)),
            Err(e) => {
                warn!(error = %e, payload, "skipping malformed stream frame");
                None
            }
        }
    }

    /// Decode one buffered line; lines that are not valid UTF-8 are skipped.
    fn parse_raw_line(line: &[u8]) -> Option<SseFrame> {
        match std::str::from_utf8(line) {
            Ok(text) => Self::parse_line(text),
            Err(e) => {
                warn!(error = %e, "skipping stream line with invalid utf-8");
                None
            }
        }
    }

    pub fn decode_stream(&self, input: BoxStream<'static, Bytes>) -> BoxStream<'static, SseFrame> {
        // State: (input, pending bytes, finished). Raw bytes are buffered until
        // a full line is available, so neither frames nor multibyte characters
        // split across reads are broken.
        let stream = stream::unfold(
            (input, BytesMut::new(), false),
            |(mut input, mut buf, finished)| async move {
                if finished {
                    return None;
                }
                loop {
                    if let Some(idx) = buf.iter().position(|b| *b == b'\n') {
                        let line = buf.split_to(idx + 1);
                        match Self::parse_raw_line(&line) {
                            Some(SseFrame::Done) => {
                                return Some((Ok(SseFrame::Done), (input, BytesMut::new(), true)))
                            }
                            Some(frame) => return Some((Ok(frame), (input, buf, false))),
                            None => continue,
                        }
                    }

                    match input.next().await {
                        Some(Ok(bytes)) => buf.extend_from_slice(&bytes),
                        Some(Err(e)) => return Some((Err(e), (input, buf, true))),
                        None => {
                            // EOF: the last line may lack a terminator.
                            let rest = buf.split();
                            return Self::parse_raw_line(&rest)
                                .map(|frame| (Ok(frame), (input, BytesMut::new(), true)));
                        }
                    }
                }
            },
        );
        Box::pin(stream)
    }
}

/// Convenience for tests and benches: decode an in-memory body.
pub fn decode_bytes(chunks: Vec<Bytes>) -> BoxStream<'static, SseFrame> {
    let input = stream::iter(chunks.into_iter().map(Ok::<Bytes, Error>));
    SseDecoder::new().decode_stream(Box::pin(input))
}
