//! Incremental frame decoding
//!
//! Bytes arrive in arbitrary increments. The decoder carries both a partial
//! UTF-8 sequence and any text after the last frame boundary across calls, so
//! the payloads produced do not depend on where the transport split the body.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use futures_util::stream::{self, StreamExt};

use crate::error::HttpError;

/// Frame boundary: a blank line.
const FRAME_BOUNDARY: &str = "\n\n";

/// Prefix of the one meaningful line in a frame.
const DATA_PREFIX: &str = "data: ";

/// Lazy sequence of frame payloads. A transport error is yielded once and ends
/// the sequence.
pub type PayloadStream = Pin<Box<dyn Stream<Item = Result<String, HttpError>> + Send>>;

/// Stateful decoder from raw body bytes to `data:` payload strings.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes of a multi-byte character split across increments
    pending: Vec<u8>,
    /// Decoded text not yet terminated by a frame boundary
    buffer: String,
}

impl FrameDecoder {
    /// Create a new decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next increment and return every payload it completes.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<String> {
        self.decode_utf8(bytes);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.find(FRAME_BOUNDARY) {
            let block: String = self.buffer.drain(..pos + FRAME_BOUNDARY.len()).collect();
            match extract_payload(&block[..pos]) {
                Some(payload) => payloads.push(payload),
                None => tracing::trace!("Skipping frame without a data line"),
            }
        }
        payloads
    }

    /// Number of bytes currently held back awaiting a boundary.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len() + self.pending.len()
    }

    /// End of stream. Content that never reached a boundary is discarded, not
    /// emitted; returns how many bytes were dropped.
    pub fn finish(&mut self) -> usize {
        let dropped = self.buffered_len();
        if dropped > 0 {
            tracing::debug!("Discarding {} trailing bytes without a frame boundary", dropped);
        }
        self.buffer.clear();
        self.pending.clear();
        dropped
    }

    fn decode_utf8(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);

        let mut rest: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, tail) = rest.split_at(e.valid_up_to());
                    // valid_up_to guarantees this slice is well-formed
                    self.buffer.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match e.error_len() {
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[len..];
                        }
                        // Incomplete sequence at the end: wait for more bytes
                        None => {
                            rest = tail;
                            break;
                        }
                    }
                }
            }
        }

        let carried = rest.len();
        let start = self.pending.len() - carried;
        self.pending.drain(..start);
    }
}

/// First line of the block starting with `data: `, minus the prefix.
fn extract_payload(block: &str) -> Option<String> {
    block
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .find_map(|line| line.strip_prefix(DATA_PREFIX))
        .map(str::to_string)
}

/// Adapt a body byte stream into a lazy stream of frame payloads.
pub fn decode_stream<S>(bytes: S) -> PayloadStream
where
    S: Stream<Item = Result<Bytes, HttpError>> + Send + 'static,
{
    let state = (Box::pin(bytes), FrameDecoder::new(), VecDeque::new(), false);

    let payloads = stream::unfold(
        state,
        |(mut bytes, mut decoder, mut ready, finished)| async move {
            loop {
                if let Some(payload) = ready.pop_front() {
                    return Some((Ok(payload), (bytes, decoder, ready, finished)));
                }
                if finished {
                    return None;
                }

                match bytes.next().await {
                    Some(Ok(chunk)) => ready.extend(decoder.feed(&chunk)),
                    Some(Err(e)) => {
                        return Some((Err(e), (bytes, decoder, ready, true)));
                    }
                    None => {
                        decoder.finish();
                        return None;
                    }
                }
            }
        },
    );

    Box::pin(payloads)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STREAM: &str = concat!(
        "data: {\"type\":\"chunk\",\"content\":\"Hé\"}\n\n",
        ": keep-alive\n\n",
        "event: message\ndata: {\"type\":\"chunk\",\"content\":\"llo ✓\"}\n\n",
        "data: {\"type\":\"done\",\"metadata\":{},\"sources\":[],\"conversation_id\":\"c1\"}\n\n",
    );

    fn decode_all(increments: &[&[u8]]) -> Vec<String> {
        let mut decoder = FrameDecoder::new();
        increments
            .iter()
            .flat_map(|bytes| decoder.feed(bytes))
            .collect()
    }

    #[test]
    fn test_single_increment() {
        let payloads = decode_all(&[STREAM.as_bytes()]);
        assert_eq!(payloads.len(), 3);
        assert_eq!(payloads[0], r#"{"type":"chunk","content":"Hé"}"#);
        assert_eq!(payloads[1], r#"{"type":"chunk","content":"llo ✓"}"#);
    }

    #[test]
    fn test_rechunking_invariance_every_split_point() {
        let bytes = STREAM.as_bytes();
        let expected = decode_all(&[bytes]);
        for split in 0..=bytes.len() {
            let (a, b) = bytes.split_at(split);
            assert_eq!(decode_all(&[a, b]), expected, "split at byte {}", split);
        }
    }

    #[test]
    fn test_rechunking_invariance_byte_at_a_time() {
        let bytes = STREAM.as_bytes();
        let increments: Vec<&[u8]> = bytes.chunks(1).collect();
        assert_eq!(decode_all(&increments), decode_all(&[bytes]));
    }

    #[test]
    fn test_multibyte_split_is_carried_over() {
        let bytes = "data: é\n\n".as_bytes();
        // 'é' is two bytes; split between them
        let split = "data: ".len() + 1;
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(&bytes[..split]).is_empty());
        assert_eq!(decoder.buffered_len(), split);
        assert_eq!(decoder.feed(&bytes[split..]), vec!["é".to_string()]);
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let mut decoder = FrameDecoder::new();
        let payloads = decoder.feed(b"data: a\xffb\n\n");
        assert_eq!(payloads, vec!["a\u{FFFD}b".to_string()]);
    }

    #[test]
    fn test_block_without_data_line_is_skipped() {
        let payloads = decode_all(&[b"event: ping\nid: 3\n\ndata: x\n\n"]);
        assert_eq!(payloads, vec!["x".to_string()]);
    }

    #[test]
    fn test_data_prefix_requires_space() {
        let payloads = decode_all(&[b"data:x\n\n"]);
        assert!(payloads.is_empty());
    }

    #[test]
    fn test_first_data_line_wins() {
        let payloads = decode_all(&[b"data: one\ndata: two\n\n"]);
        assert_eq!(payloads, vec!["one".to_string()]);
    }

    #[test]
    fn test_crlf_lines() {
        let payloads = decode_all(&[b"data: x\r\n\n"]);
        assert_eq!(payloads, vec!["x".to_string()]);
    }

    #[test]
    fn test_trailing_content_is_discarded() {
        let mut decoder = FrameDecoder::new();
        let payloads = decoder.feed(b"data: a\n\ndata: {\"type\":\"done\"}");
        assert_eq!(payloads, vec!["a".to_string()]);
        assert_eq!(decoder.finish(), "data: {\"type\":\"done\"}".len());
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn test_single_newline_is_not_a_boundary() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.feed(b"data: a\n").is_empty());
        assert_eq!(decoder.feed(b"\n"), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_decode_stream_yields_payloads_lazily() {
        let chunks: Vec<Result<Bytes, HttpError>> = vec![
            Ok(Bytes::from_static(b"data: one\n")),
            Ok(Bytes::from_static(b"\ndata: two\n\ndata: tr")),
            Ok(Bytes::from_static(b"uncated")),
        ];
        let payloads: Vec<_> = decode_stream(stream::iter(chunks)).collect().await;
        let payloads: Vec<String> = payloads.into_iter().map(Result::unwrap).collect();
        assert_eq!(payloads, vec!["one".to_string(), "two".to_string()]);
    }

    #[tokio::test]
    async fn test_decode_stream_transport_error_ends_sequence() {
        let chunks: Vec<Result<Bytes, HttpError>> = vec![
            Ok(Bytes::from_static(b"data: one\n\n")),
            Err(HttpError::Io("reset by peer".to_string())),
            Ok(Bytes::from_static(b"data: never\n\n")),
        ];
        let items: Vec<_> = decode_stream(stream::iter(chunks)).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_deref().ok(), Some("one"));
        assert!(matches!(items[1], Err(HttpError::Io(_))));
    }
}
