//! Telemetry record types
//!
//! Every message from the simulator shares an envelope (`Type` and
//! `Timestamp`) followed by a kind-specific payload. Field names on the wire
//! are PascalCase.

pub mod decode;
pub mod events;

pub use decode::{DecodeCause, DecodeError, Decoder, Dispatch, UnknownKindPolicy};
pub use events::EventVocabulary;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation time of day
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Timestamp {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub millisecond: u32,
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}.{}",
            self.hour, self.minute, self.second, self.millisecond
        )
    }
}

/// Message discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Stream,
    Event,
    ExerciseStart,
    ExerciseEnd,
}

impl Kind {
    pub const ALL: [Kind; 4] = [
        Kind::Stream,
        Kind::Event,
        Kind::ExerciseStart,
        Kind::ExerciseEnd,
    ];

    /// Wire tag of this kind
    pub fn tag(self) -> &'static str {
        match self {
            Kind::Stream => "Stream",
            Kind::Event => "Event",
            Kind::ExerciseStart => "ExerciseStart",
            Kind::ExerciseEnd => "ExerciseEnd",
        }
    }

    /// Exact match of a wire tag, `None` for tags outside the known set
    pub fn from_tag(tag: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Turn signal state, wire-encoded as an integer code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum TurnIndicator {
    Off,
    Left,
    Right,
    /// Warning signals (all indicators)
    Hazard,
    /// Code not defined by the known protocol revisions
    Unknown(i32),
}

impl From<i32> for TurnIndicator {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::Off,
            -1 => Self::Left,
            1 => Self::Right,
            2 => Self::Hazard,
            other => Self::Unknown(other),
        }
    }
}

impl From<TurnIndicator> for i32 {
    fn from(indicator: TurnIndicator) -> Self {
        match indicator {
            TurnIndicator::Off => 0,
            TurnIndicator::Left => -1,
            TurnIndicator::Right => 1,
            TurnIndicator::Hazard => 2,
            TurnIndicator::Unknown(code) => code,
        }
    }
}

impl fmt::Display for TurnIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("off"),
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
            Self::Hazard => f.write_str("hazard"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// Driver controls. Ranges are documented by the simulator, not validated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ControlInput {
    /// -1.0 (full left) to 1.0 (full right)
    pub steering: f32,
    /// 0.0 to 1.0
    pub throttle: f32,
    /// 0.0 to 1.0
    pub brake: f32,
    /// 0.0 to 1.0
    pub clutch: f32,
}

/// `Type == "Stream"`: periodic vehicle state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StreamData {
    pub timestamp: Timestamp,
    /// km/h
    pub speed: i32,
    /// km/h
    pub speed_limit: i32,
    /// l/100km
    pub fuel_consumption: f32,
    /// Absent in older protocol revisions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_indicator: Option<TurnIndicator>,
    /// Absent in older protocol revisions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<ControlInput>,
}

/// `Type == "Event"`: a named driving event or infraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventData {
    pub timestamp: Timestamp,
    /// Opaque name; see [`EventVocabulary`] for the known set
    pub event: String,
}

/// `Type == "ExerciseStart"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExerciseStart {
    pub timestamp: Timestamp,
    pub exercise_name: String,
}

/// `Type == "ExerciseEnd"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExerciseEnd {
    pub timestamp: Timestamp,
}

/// A decoded message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "Type")]
pub enum Record {
    Stream(StreamData),
    Event(EventData),
    ExerciseStart(ExerciseStart),
    ExerciseEnd(ExerciseEnd),
}

impl Record {
    pub fn kind(&self) -> Kind {
        match self {
            Record::Stream(_) => Kind::Stream,
            Record::Event(_) => Kind::Event,
            Record::ExerciseStart(_) => Kind::ExerciseStart,
            Record::ExerciseEnd(_) => Kind::ExerciseEnd,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            Record::Stream(r) => r.timestamp,
            Record::Event(r) => r.timestamp,
            Record::ExerciseStart(r) => r.timestamp,
            Record::ExerciseEnd(r) => r.timestamp,
        }
    }
}
