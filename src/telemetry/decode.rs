//! Record dispatch and decoding
//!
//! Decoding is two-pass: the envelope is read first to get the `Type` tag,
//! then the whole document is decoded into the schema selected by that tag.

use super::{
    ControlInput, EventData, EventVocabulary, ExerciseEnd, ExerciseStart, Kind, Record,
    StreamData, Timestamp, TurnIndicator,
};
use crate::constants::ERROR_PREVIEW_LEN;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use tracing::debug;

/// What to do with a `Type` tag outside the known set
///
/// Falling back absorbs protocol additions: a new message kind is decoded as
/// a stream sample, with stream fields it does not carry left at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnknownKindPolicy {
    /// Decode as [`Kind::Stream`]
    #[default]
    #[serde(rename = "stream")]
    FallbackToStream,
    /// Fail with [`DecodeCause::UnknownKind`]
    #[serde(rename = "reject")]
    Reject,
}

/// Stage at which decoding failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeCause {
    /// Not JSON, or no readable `Type` string
    Envelope,
    /// Envelope fine, but the kind's fields did not decode
    Payload { kind: Kind },
    /// Tag rejected by [`UnknownKindPolicy::Reject`]
    UnknownKind { tag: String },
}

/// A document that could not be turned into a [`Record`]
#[derive(Debug)]
pub struct DecodeError {
    cause: DecodeCause,
    document: Bytes,
    source: Option<serde_json::Error>,
}

impl DecodeError {
    fn new(cause: DecodeCause, document: &[u8], source: Option<serde_json::Error>) -> Self {
        Self {
            cause,
            document: Bytes::copy_from_slice(document),
            source,
        }
    }

    pub fn cause(&self) -> &DecodeCause {
        &self.cause
    }

    /// Raw document as received
    pub fn document(&self) -> &Bytes {
        &self.document
    }

    /// Start of the document as lossy UTF-8, for logs
    pub fn preview(&self) -> String {
        let end = self.document.len().min(ERROR_PREVIEW_LEN);
        let mut text = String::from_utf8_lossy(&self.document[..end]).into_owned();
        if self.document.len() > ERROR_PREVIEW_LEN {
            text.push_str("...");
        }
        text
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cause {
            DecodeCause::Envelope => write!(f, "Cannot decode message envelope")?,
            DecodeCause::Payload { kind } => write!(f, "Cannot decode {} message", kind)?,
            DecodeCause::UnknownKind { tag } => write!(f, "Unknown message type {:?}", tag)?,
        }
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Fields common to every message; only the tag is needed for dispatch
#[derive(Deserialize)]
struct Envelope<'a> {
    #[serde(rename = "Type", borrow)]
    kind: Cow<'a, str>,
}

/// A decoded record plus what the decoder had to tolerate to get it
#[derive(Debug, Clone, PartialEq)]
pub struct Dispatch {
    pub record: Record,
    /// Original tag when it was unknown and the stream fallback applied
    pub fallback_tag: Option<String>,
    /// Event name outside the vocabulary
    pub unknown_event: bool,
}

/// Tag-dispatching decoder
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    unknown_kind: UnknownKindPolicy,
    vocabulary: EventVocabulary,
}

impl Decoder {
    pub fn new(unknown_kind: UnknownKindPolicy, vocabulary: EventVocabulary) -> Self {
        Self {
            unknown_kind,
            vocabulary,
        }
    }

    pub fn vocabulary(&self) -> &EventVocabulary {
        &self.vocabulary
    }

    /// Decode one complete JSON document
    pub fn decode(&self, document: &[u8]) -> Result<Record, DecodeError> {
        self.dispatch(document).map(|d| d.record)
    }

    /// Decode one complete JSON document, reporting tolerated anomalies
    pub fn dispatch(&self, document: &[u8]) -> Result<Dispatch, DecodeError> {
        let envelope: Envelope<'_> = serde_json::from_slice(document)
            .map_err(|e| DecodeError::new(DecodeCause::Envelope, document, Some(e)))?;

        let (kind, fallback_tag) = match Kind::from_tag(&envelope.kind) {
            Some(kind) => (kind, None),
            None => match self.unknown_kind {
                UnknownKindPolicy::FallbackToStream => {
                    debug!("Unknown message type {:?}, decoding as Stream", envelope.kind);
                    (Kind::Stream, Some(envelope.kind.into_owned()))
                }
                UnknownKindPolicy::Reject => {
                    let tag = envelope.kind.into_owned();
                    return Err(DecodeError::new(
                        DecodeCause::UnknownKind { tag },
                        document,
                        None,
                    ));
                }
            },
        };

        let decoded = if fallback_tag.is_some() {
            decode_fallback(document)
        } else {
            decode_payload(kind, document)
        };
        let record = decoded
            .map_err(|e| DecodeError::new(DecodeCause::Payload { kind }, document, Some(e)))?;

        let unknown_event = match &record {
            Record::Event(event) if !self.vocabulary.contains(&event.event) => {
                debug!("Event {:?} is not in the known vocabulary", event.event);
                true
            }
            _ => false,
        };

        Ok(Dispatch {
            record,
            fallback_tag,
            unknown_event,
        })
    }
}

/// Stream schema for messages whose tag is unknown
///
/// Only the envelope is required; payload fields default to zero.
#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FallbackStream {
    timestamp: Timestamp,
    #[serde(default)]
    speed: i32,
    #[serde(default)]
    speed_limit: i32,
    #[serde(default)]
    fuel_consumption: f32,
    #[serde(default)]
    turn_indicator: Option<TurnIndicator>,
    #[serde(default)]
    input: Option<ControlInput>,
}

impl From<FallbackStream> for StreamData {
    fn from(fallback: FallbackStream) -> Self {
        Self {
            timestamp: fallback.timestamp,
            speed: fallback.speed,
            speed_limit: fallback.speed_limit,
            fuel_consumption: fallback.fuel_consumption,
            turn_indicator: fallback.turn_indicator,
            input: fallback.input,
        }
    }
}

fn decode_fallback(document: &[u8]) -> serde_json::Result<Record> {
    let stream: FallbackStream = serde_json::from_slice(document)?;
    Ok(Record::Stream(stream.into()))
}

fn decode_payload(kind: Kind, document: &[u8]) -> serde_json::Result<Record> {
    Ok(match kind {
        Kind::Stream => Record::Stream(serde_json::from_slice::<StreamData>(document)?),
        Kind::Event => Record::Event(serde_json::from_slice::<EventData>(document)?),
        Kind::ExerciseStart => {
            Record::ExerciseStart(serde_json::from_slice::<ExerciseStart>(document)?)
        }
        Kind::ExerciseEnd => Record::ExerciseEnd(serde_json::from_slice::<ExerciseEnd>(document)?),
    })
}
