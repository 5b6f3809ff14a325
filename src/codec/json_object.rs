//! JSON object codec for undelimited telemetry streams
//!
//! The simulator writes JSON objects back to back with no delimiter,
//! length prefix or newline. Boundaries are recovered from brace nesting:
//! a document starts at `{` and ends when the matching `}` brings the depth
//! back to zero.
//!
//! String literals are tracked so that braces and escaped quotes inside
//! values (`"Event":"a}b"`, `"x\"{"`) never move the depth counter.

use super::{Codec, Frame, FramingError};
use bytes::BytesMut;

/// Lexical position inside the current document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lexer {
    /// Structural JSON (outside any string literal)
    Structure,
    /// Inside a string literal
    String,
    /// Inside a string literal, right after a backslash
    Escape,
}

/// Incremental framer for back-to-back JSON objects
///
/// All state lives in the instance, so independent streams can be framed
/// side by side with one codec each.
///
/// # Example
///
/// ```
/// use sim_telemetry::codec::{Codec, Frame, JsonObjectCodec};
///
/// let mut codec = JsonObjectCodec::default();
/// let mut docs = Vec::new();
///
/// codec.decode(br#"{"a":1}{"b"#, |f| docs.push(f));
/// codec.decode(br#"":2}"#, |f| docs.push(f));
///
/// assert_eq!(docs.len(), 2);
/// assert!(matches!(&docs[1], Frame::Document(d) if d.as_ref() == br#"{"b":2}"#));
/// ```
pub struct JsonObjectCodec {
    buffer: BytesMut,
    /// Unmatched `{` count of the current document
    depth: usize,
    lexer: Lexer,
    /// Bytes seen for the current document (kept counting once oversized)
    size: usize,
    /// Set once the current document exceeded `max_size`
    overflowed: bool,
    /// Non-whitespace bytes seen between documents, reported lazily
    stray: usize,
    max_size: usize,
}

impl JsonObjectCodec {
    /// Create a codec that drops documents larger than `max_size` bytes
    pub fn new(max_size: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(max_size.min(4096)),
            depth: 0,
            lexer: Lexer::Structure,
            size: 0,
            overflowed: false,
            stray: 0,
            max_size,
        }
    }

    /// True when no document is in progress
    pub fn is_idle(&self) -> bool {
        self.depth == 0
    }

    /// Number of bytes buffered for the document in progress
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Handle a byte while no document is open
    fn idle_byte(&mut self, byte: u8, on_frame: &mut impl FnMut(Frame)) {
        match byte {
            b'{' => {
                if self.stray > 0 {
                    on_frame(Frame::Error(FramingError::StrayBytes { count: self.stray }));
                    self.stray = 0;
                }
                self.depth = 1;
                self.size = 0;
                self.overflowed = false;
                self.push(byte);
            }
            b'}' => on_frame(Frame::Error(FramingError::UnbalancedClose)),
            b' ' | b'\t' | b'\r' | b'\n' => {}
            _ => self.stray += 1,
        }
    }

    /// Handle a byte of an open document
    fn document_byte(&mut self, byte: u8, on_frame: &mut impl FnMut(Frame)) {
        self.push(byte);

        self.lexer = match (self.lexer, byte) {
            (Lexer::Structure, b'"') => Lexer::String,
            (Lexer::Structure, b'{') => {
                self.depth += 1;
                Lexer::Structure
            }
            (Lexer::Structure, b'}') => {
                self.depth -= 1;
                Lexer::Structure
            }
            (Lexer::String, b'\\') => Lexer::Escape,
            (Lexer::String, b'"') => Lexer::Structure,
            (Lexer::Escape, _) => Lexer::String,
            (state, _) => state,
        };

        if self.depth == 0 {
            self.emit(on_frame);
        }
    }

    fn push(&mut self, byte: u8) {
        self.size += 1;
        if self.overflowed {
            return;
        }
        if self.size > self.max_size {
            self.overflowed = true;
            self.buffer.clear();
            return;
        }
        self.buffer.extend_from_slice(&[byte]);
    }

    fn emit(&mut self, on_frame: &mut impl FnMut(Frame)) {
        if self.overflowed {
            on_frame(Frame::Error(FramingError::Oversized {
                size: self.size,
                limit: self.max_size,
            }));
            self.buffer.clear();
        } else {
            // split() leaves the buffer empty for the next document
            on_frame(Frame::Document(self.buffer.split().freeze()));
        }
        self.size = 0;
        self.overflowed = false;
    }
}

impl Default for JsonObjectCodec {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_MAX_DOCUMENT_SIZE)
    }
}

impl Codec for JsonObjectCodec {
    fn decode(&mut self, data: &[u8], mut on_frame: impl FnMut(Frame)) {
        for &byte in data {
            if self.depth == 0 {
                self.idle_byte(byte, &mut on_frame);
            } else {
                self.document_byte(byte, &mut on_frame);
            }
        }
    }

    fn finish(&mut self, mut on_frame: impl FnMut(Frame)) {
        if self.depth > 0 {
            on_frame(Frame::Error(FramingError::Truncated { pending: self.size }));
        }
        if self.stray > 0 {
            on_frame(Frame::Error(FramingError::StrayBytes { count: self.stray }));
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.buffer.clear();
        self.depth = 0;
        self.lexer = Lexer::Structure;
        self.size = 0;
        self.overflowed = false;
        self.stray = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EVENT: &[u8] = br#"{"Type":"Event","Timestamp":{"Hour":1,"Minute":2,"Second":3,"Millisecond":4},"Event":"Speeding"}"#;
    const END: &[u8] = br#"{"Type":"ExerciseEnd","Timestamp":{"Hour":0,"Minute":0,"Second":0,"Millisecond":0}}"#;

    fn feed_all(codec: &mut JsonObjectCodec, chunks: &[&[u8]]) -> Vec<Frame> {
        let mut frames = Vec::new();
        for chunk in chunks {
            codec.decode(chunk, |f| frames.push(f));
        }
        frames
    }

    fn documents(frames: &[Frame]) -> Vec<&[u8]> {
        frames
            .iter()
            .filter_map(|f| match f {
                Frame::Document(d) => Some(d.as_ref()),
                Frame::Error(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_single_document() {
        let mut codec = JsonObjectCodec::default();
        let frames = feed_all(&mut codec, &[EVENT]);
        assert_eq!(frames, vec![Frame::Document(bytes::Bytes::from_static(EVENT))]);
        assert!(codec.is_idle());
        assert_eq!(codec.pending_len(), 0);
    }

    #[test]
    fn test_document_split_in_two_chunks() {
        let mut codec = JsonObjectCodec::default();
        let (a, b) = EVENT.split_at(37);

        let first = feed_all(&mut codec, &[a]);
        assert!(first.is_empty());
        assert!(!codec.is_idle());

        let second = feed_all(&mut codec, &[b]);
        assert_eq!(documents(&second), vec![EVENT]);
    }

    #[test]
    fn test_back_to_back_documents_in_one_chunk() {
        let mut codec = JsonObjectCodec::default();
        let mut stream = END.to_vec();
        stream.extend_from_slice(END);

        let frames = feed_all(&mut codec, &[&stream]);
        assert_eq!(documents(&frames), vec![END, END]);
    }

    #[test]
    fn test_empty_chunk_is_noop() {
        let mut codec = JsonObjectCodec::default();
        let (a, b) = END.split_at(10);

        feed_all(&mut codec, &[a]);
        let pending = codec.pending_len();
        let frames = feed_all(&mut codec, &[b""]);
        assert!(frames.is_empty());
        assert_eq!(codec.pending_len(), pending);

        let frames = feed_all(&mut codec, &[b]);
        assert_eq!(documents(&frames), vec![END]);
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let doc = br#"{"Type":"Event","Event":"odd } name {{"}"#;
        let mut codec = JsonObjectCodec::default();
        let frames = feed_all(&mut codec, &[doc, END]);
        assert_eq!(documents(&frames), vec![&doc[..], END]);
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        let doc = br#"{"Event":"say \"}\" now","Path":"C:\\"}"#;
        let mut codec = JsonObjectCodec::default();
        let frames = feed_all(&mut codec, &[doc, END]);
        assert_eq!(documents(&frames), vec![&doc[..], END]);
    }

    #[test]
    fn test_whitespace_between_documents_is_skipped() {
        let mut codec = JsonObjectCodec::default();
        let frames = feed_all(&mut codec, &[END, b"\r\n  \t", END, b"\n"]);
        assert_eq!(frames.len(), 2);
        assert_eq!(documents(&frames), vec![END, END]);
    }

    #[test]
    fn test_unbalanced_close_reports_and_recovers() {
        let mut codec = JsonObjectCodec::default();
        let frames = feed_all(&mut codec, &[b"}", END]);
        assert_eq!(frames[0], Frame::Error(FramingError::UnbalancedClose));
        assert_eq!(documents(&frames), vec![END]);
    }

    #[test]
    fn test_stray_bytes_reported_before_next_document() {
        let mut codec = JsonObjectCodec::default();
        let frames = feed_all(&mut codec, &[b"garbage", END]);
        assert_eq!(frames[0], Frame::Error(FramingError::StrayBytes { count: 7 }));
        assert_eq!(documents(&frames), vec![END]);
    }

    #[test]
    fn test_oversized_document_dropped_and_stream_resyncs() {
        let mut codec = JsonObjectCodec::new(16);
        let big = br#"{"Event":"this is a very long value {with braces}"}"#;
        let small = br#"{"a":1}"#;

        let frames = feed_all(&mut codec, &[big, small]);
        assert_eq!(
            frames[0],
            Frame::Error(FramingError::Oversized {
                size: big.len(),
                limit: 16
            })
        );
        assert_eq!(documents(&frames), vec![&small[..]]);
    }

    #[test]
    fn test_reset_discards_partial_document() {
        let mut codec = JsonObjectCodec::default();
        feed_all(&mut codec, &[br#"{"Type":"Ev"#]);
        codec.reset();
        assert!(codec.is_idle());
        assert_eq!(codec.pending_len(), 0);

        let frames = feed_all(&mut codec, &[END]);
        assert_eq!(documents(&frames), vec![END]);
    }

    #[test]
    fn test_finish_reports_truncated_document() {
        let mut codec = JsonObjectCodec::default();
        let partial = br#"{"Type":"Event","Times"#;
        feed_all(&mut codec, &[END, partial]);

        let mut frames = Vec::new();
        codec.finish(|f| frames.push(f));
        assert_eq!(
            frames,
            vec![Frame::Error(FramingError::Truncated {
                pending: partial.len()
            })]
        );
        assert!(codec.is_idle());
        assert_eq!(codec.pending_len(), 0);

        let frames = feed_all(&mut codec, &[END]);
        assert_eq!(documents(&frames), vec![END]);
    }

    #[test]
    fn test_finish_reports_trailing_stray_bytes() {
        let mut codec = JsonObjectCodec::default();
        feed_all(&mut codec, &[END, b"\r\nxyz"]);

        let mut frames = Vec::new();
        codec.finish(|f| frames.push(f));
        assert_eq!(frames, vec![Frame::Error(FramingError::StrayBytes { count: 3 })]);

        // Nothing left to report after a clean end
        let mut frames = Vec::new();
        codec.finish(|f| frames.push(f));
        assert!(frames.is_empty());
    }

    #[test]
    fn test_byte_by_byte_feed() {
        let mut codec = JsonObjectCodec::default();
        let mut frames = Vec::new();
        for byte in EVENT.iter().chain(END.iter()) {
            codec.decode(std::slice::from_ref(byte), |f| frames.push(f));
        }
        assert_eq!(documents(&frames), vec![EVENT, END]);
    }

    fn json_object() -> impl Strategy<Value = Vec<u8>> {
        // Strings deliberately include braces, quotes and backslashes
        let text = "[a-zA-Z0-9 {}\\\\\"]{0,12}";
        (text, 0i64..100_000, proptest::bool::ANY).prop_map(|(s, n, nested)| {
            let value = serde_json::Value::String(s);
            let doc = if nested {
                serde_json::json!({"Type": "Stream", "Text": value, "Inner": {"N": n, "Deep": {}}})
            } else {
                serde_json::json!({"Type": "Event", "Event": value, "N": n})
            };
            serde_json::to_vec(&doc).expect("serialize")
        })
    }

    proptest! {
        #[test]
        fn prop_chunking_does_not_change_documents(
            docs in proptest::collection::vec(json_object(), 1..8),
            cuts in proptest::collection::vec(0usize..2048, 0..16),
        ) {
            let stream: Vec<u8> = docs.concat();

            let mut cuts: Vec<usize> = cuts.into_iter().map(|c| c % (stream.len() + 1)).collect();
            cuts.sort_unstable();
            cuts.dedup();

            let mut chunks = Vec::new();
            let mut start = 0;
            for cut in cuts {
                chunks.push(&stream[start..cut]);
                start = cut;
            }
            chunks.push(&stream[start..]);

            let mut codec = JsonObjectCodec::default();
            let frames = feed_all(&mut codec, &chunks);

            let expected: Vec<&[u8]> = docs.iter().map(|d| d.as_slice()).collect();
            prop_assert_eq!(documents(&frames), expected);
            prop_assert_eq!(frames.len(), docs.len());
            prop_assert!(codec.is_idle());
        }
    }
}
