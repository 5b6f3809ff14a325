//! Monitor session - the read loop of one connection
//!
//! The session handles:
//! - Feeding received chunks to the codec
//! - Decoding each framed document into a record
//! - Rendering records to the output sink, in arrival order
//! - Applying the decode error policy
//! - Statistics tracking
//!
//! The session does NOT handle:
//! - Transport lifecycle (that's the caller's responsibility)
//! - Reconnection logic (handled by the runner)
//! - Non-blocking output: the sink is a blocking `Write` called from the
//!   async loop, so a stalled stdout pipe stalls this connection's task

use super::stats::Stats;
use crate::codec::{Codec, Frame};
use crate::config::DecodeErrorPolicy;
use crate::constants::SHUTDOWN_POLL_INTERVAL_MS;
use crate::error::{MonitorError, Result};
use crate::render::Renderer;
use crate::telemetry::Decoder;
use crate::transport::TransportChannels;
use bytes::Bytes;
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Why a session returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Shutdown was requested
    Shutdown,
    /// The transport closed its channel (peer closed the connection)
    Disconnected,
}

/// Framing, decoding and rendering for one byte stream
///
/// The codec is owned here. When a connection ends, [`MonitorSession::end_stream`]
/// reports anything it left unfinished and leaves the codec ready for the
/// next connection.
///
/// # Example
///
/// ```ignore
/// let mut session = MonitorSession::new(
///     JsonObjectCodec::default(),
///     Decoder::default(),
///     Renderer::default(),
///     DecodeErrorPolicy::Skip,
///     std::io::stdout().lock(),
///     stats,
/// );
/// session.run(channels, shutdown).await?;
/// ```
pub struct MonitorSession<C: Codec, W: Write> {
    codec: C,
    decoder: Decoder,
    renderer: Renderer,
    policy: DecodeErrorPolicy,
    sink: W,
    stats: Arc<Stats>,
}

impl<C: Codec, W: Write> MonitorSession<C, W> {
    pub fn new(
        codec: C,
        decoder: Decoder,
        renderer: Renderer,
        policy: DecodeErrorPolicy,
        sink: W,
        stats: Arc<Stats>,
    ) -> Self {
        Self {
            codec,
            decoder,
            renderer,
            policy,
            sink,
            stats,
        }
    }

    /// Consume chunks until shutdown, disconnect or a fatal error
    pub async fn run(
        &mut self,
        mut channels: TransportChannels,
        shutdown: Arc<AtomicBool>,
    ) -> Result<SessionEnd> {
        loop {
            tokio::select! {
                biased;

                // Periodic shutdown check
                _ = tokio::time::sleep(Duration::from_millis(SHUTDOWN_POLL_INTERVAL_MS)) => {
                    if shutdown.load(Ordering::Relaxed) {
                        return Ok(SessionEnd::Shutdown);
                    }
                }

                msg = channels.rx.recv() => {
                    match msg {
                        Some(Ok(data)) => self.handle_chunk(data)?,
                        Some(Err(e)) => {
                            self.end_stream()?;
                            return Err(e);
                        }
                        None => {
                            // Channel closed = transport stopped
                            self.end_stream()?;
                            return Ok(if shutdown.load(Ordering::Relaxed) {
                                SessionEnd::Shutdown
                            } else {
                                SessionEnd::Disconnected
                            });
                        }
                    }
                }
            }
        }
    }

    /// Feed one received chunk through framing, decoding and rendering
    pub fn handle_chunk(&mut self, data: Bytes) -> Result<()> {
        self.stats.add_bytes(data.len());

        let mut frames = Vec::new();
        self.codec.decode(&data, |frame| frames.push(frame));

        for frame in frames {
            self.handle_frame(frame)?;
        }

        self.sink
            .flush()
            .map_err(|source| MonitorError::Output { source })
    }

    fn handle_frame(&mut self, frame: Frame) -> Result<()> {
        match frame {
            Frame::Document(document) => {
                self.stats.add_document();

                let dispatch = match self.decoder.dispatch(&document) {
                    Ok(dispatch) => dispatch,
                    Err(e) => {
                        self.stats.add_decode_error();
                        return match self.policy {
                            DecodeErrorPolicy::Skip => {
                                warn!("{}; skipping message: {}", e, e.preview());
                                Ok(())
                            }
                            DecodeErrorPolicy::Abort => Err(e.into()),
                        };
                    }
                };

                if dispatch.fallback_tag.is_some() {
                    self.stats.add_unknown_kind();
                }
                if dispatch.unknown_event {
                    self.stats.add_unknown_event();
                }

                self.renderer
                    .render(&dispatch.record, &mut self.sink)
                    .map_err(|source| MonitorError::Output { source })?;
                self.stats.add_record();
            }
            Frame::Error(e) => {
                self.stats.add_framing_error();
                warn!("Framing error: {}", e);
            }
        }
        Ok(())
    }

    /// Report and drop what the last connection left unfinished
    pub fn end_stream(&mut self) -> Result<()> {
        let mut frames = Vec::new();
        self.codec.finish(|frame| frames.push(frame));

        for frame in frames {
            self.handle_frame(frame)?;
        }
        Ok(())
    }

    /// Give back the output sink
    pub fn into_sink(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonObjectCodec;
    use crate::telemetry::DecodeCause;
    use tokio::sync::mpsc;

    const END: &str = r#"{"Type":"ExerciseEnd","Timestamp":{"Hour":0,"Minute":0,"Second":0,"Millisecond":0}}"#;
    const EVENT: &str = r#"{"Type":"Event","Timestamp":{"Hour":1,"Minute":2,"Second":3,"Millisecond":4},"Event":"Speeding"}"#;

    fn session(policy: DecodeErrorPolicy) -> MonitorSession<JsonObjectCodec, Vec<u8>> {
        MonitorSession::new(
            JsonObjectCodec::default(),
            Decoder::default(),
            Renderer::default(),
            policy,
            Vec::new(),
            Arc::new(Stats::new()),
        )
    }

    fn output(session: MonitorSession<JsonObjectCodec, Vec<u8>>) -> String {
        String::from_utf8(session.into_sink()).unwrap()
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut session = session(DecodeErrorPolicy::Skip);
        let (a, b) = EVENT.split_at(50);

        session.handle_chunk(Bytes::from(a)).unwrap();
        session.handle_chunk(Bytes::from(b)).unwrap();

        assert_eq!(output(session), "Time: 1:2:3.4\tEvent: Speeding\n");
    }

    #[test]
    fn test_two_documents_in_one_chunk() {
        let mut session = session(DecodeErrorPolicy::Skip);
        session
            .handle_chunk(Bytes::from(format!("{}{}", END, END)))
            .unwrap();

        assert_eq!(output(session), "Time: 0:0:0.0\t ExerciseEnd\n".repeat(2));
    }

    #[test]
    fn test_skip_policy_drops_bad_message() {
        let stats = Arc::new(Stats::new());
        let mut session = MonitorSession::new(
            JsonObjectCodec::default(),
            Decoder::default(),
            Renderer::default(),
            DecodeErrorPolicy::Skip,
            Vec::new(),
            stats.clone(),
        );

        let stream = format!(r#"{}{{"Type":"Stream","Speed":}}{}"#, EVENT, END);
        session.handle_chunk(Bytes::from(stream)).unwrap();

        let text = output(session);
        assert_eq!(text.lines().count(), 2);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.documents, 3);
        assert_eq!(snapshot.records, 2);
        assert_eq!(snapshot.decode_errors, 1);
    }

    #[test]
    fn test_abort_policy_returns_decode_error() {
        let mut session = session(DecodeErrorPolicy::Abort);
        let err = session
            .handle_chunk(Bytes::from_static(br#"{"Type":"Event"}"#))
            .unwrap_err();

        match err {
            MonitorError::Decode(e) => assert_eq!(e.cause(), &DecodeCause::Payload {
                kind: crate::telemetry::Kind::Event
            }),
            other => panic!("Expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_framing_errors_are_counted_not_fatal() {
        let stats = Arc::new(Stats::new());
        let mut session = MonitorSession::new(
            JsonObjectCodec::default(),
            Decoder::default(),
            Renderer::default(),
            DecodeErrorPolicy::Abort,
            Vec::new(),
            stats.clone(),
        );

        session.handle_chunk(Bytes::from(format!("}}{}", END))).unwrap();

        assert_eq!(stats.snapshot().framing_errors, 1);
        assert_eq!(output(session).lines().count(), 1);
    }

    #[test]
    fn test_end_stream_reports_partial_document() {
        let stats = Arc::new(Stats::new());
        let mut session = MonitorSession::new(
            JsonObjectCodec::default(),
            Decoder::default(),
            Renderer::default(),
            DecodeErrorPolicy::Abort,
            Vec::new(),
            stats.clone(),
        );

        session.handle_chunk(Bytes::from(&EVENT[..20])).unwrap();
        session.end_stream().unwrap();
        session.handle_chunk(Bytes::from(END)).unwrap();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.framing_errors, 1);
        assert_eq!(snapshot.decode_errors, 0);
        assert_eq!(output(session), "Time: 0:0:0.0\t ExerciseEnd\n");
    }

    #[tokio::test]
    async fn test_run_reports_partial_document_at_disconnect() {
        let (tx, rx) = mpsc::channel(16);
        let channels = TransportChannels { rx };
        let stats = Arc::new(Stats::new());

        tx.send(Ok(Bytes::from(format!("{}{}", END, &EVENT[..30]))))
            .await
            .unwrap();
        drop(tx);

        let mut session = MonitorSession::new(
            JsonObjectCodec::default(),
            Decoder::default(),
            Renderer::default(),
            DecodeErrorPolicy::Skip,
            Vec::new(),
            stats.clone(),
        );
        let end = session
            .run(channels, Arc::new(AtomicBool::new(false)))
            .await
            .unwrap();

        assert_eq!(end, SessionEnd::Disconnected);
        assert_eq!(stats.snapshot().framing_errors, 1);
        assert_eq!(output(session), "Time: 0:0:0.0\t ExerciseEnd\n");
    }

    #[tokio::test]
    async fn test_run_until_disconnect() {
        let (tx, rx) = mpsc::channel(16);
        let channels = TransportChannels { rx };
        let shutdown = Arc::new(AtomicBool::new(false));

        tx.send(Ok(Bytes::from(&EVENT[..30]))).await.unwrap();
        tx.send(Ok(Bytes::from(&EVENT[30..]))).await.unwrap();
        drop(tx);

        let mut session = session(DecodeErrorPolicy::Skip);
        let end = session.run(channels, shutdown).await.unwrap();

        assert_eq!(end, SessionEnd::Disconnected);
        assert_eq!(output(session), "Time: 1:2:3.4\tEvent: Speeding\n");
    }

    #[tokio::test]
    async fn test_run_returns_read_error() {
        let (tx, rx) = mpsc::channel(16);
        let channels = TransportChannels { rx };
        let shutdown = Arc::new(AtomicBool::new(false));

        tx.send(Err(MonitorError::Read {
            source: std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
        }))
        .await
        .unwrap();

        let mut session = session(DecodeErrorPolicy::Skip);
        let err = session.run(channels, shutdown).await.unwrap_err();
        assert!(matches!(err, MonitorError::Read { .. }));
    }

    #[tokio::test]
    async fn test_run_shutdown() {
        let (_tx, rx) = mpsc::channel(16);
        let channels = TransportChannels { rx };
        let shutdown = Arc::new(AtomicBool::new(false));

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            shutdown_clone.store(true, Ordering::SeqCst);
        });

        let mut session = session(DecodeErrorPolicy::Skip);
        let end = session.run(channels, shutdown).await.unwrap();
        assert_eq!(end, SessionEnd::Shutdown);
    }
}
