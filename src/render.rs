//! Record rendering
//!
//! Turns each decoded record into exactly one newline-terminated line.

use crate::telemetry::{ControlInput, Record, StreamData};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::io::{self, Write};

/// Output line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `Time: h:m:s.ms` followed by the kind's main fields
    #[default]
    Text,
    /// Text, plus turn indicator and control input on stream lines
    Detailed,
    /// One JSON object per line
    Json,
}

/// Formats records as display lines
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    format: OutputFormat,
    wall_clock: bool,
}

impl Renderer {
    /// `wall_clock` prefixes each line with the local receive time
    pub fn new(format: OutputFormat, wall_clock: bool) -> Self {
        Self { format, wall_clock }
    }

    /// Render a record as a line, without the trailing newline
    pub fn line(&self, record: &Record) -> String {
        let mut line = String::new();
        if self.wall_clock {
            let _ = write!(
                line,
                "[{}] ",
                chrono::Local::now().format("%H:%M:%S%.3f")
            );
        }

        match self.format {
            OutputFormat::Text => {
                let _ = text_line(&mut line, record, false);
            }
            OutputFormat::Detailed => {
                let _ = text_line(&mut line, record, true);
            }
            // Records only hold strings, integers and floats
            OutputFormat::Json => match serde_json::to_string(record) {
                Ok(json) => line.push_str(&json),
                Err(e) => {
                    let _ = write!(line, "{{\"error\":{:?}}}", e.to_string());
                }
            },
        }
        line
    }

    /// Write one newline-terminated line for `record`
    pub fn render<W: Write>(&self, record: &Record, out: &mut W) -> io::Result<()> {
        let mut line = self.line(record);
        line.push('\n');
        out.write_all(line.as_bytes())
    }
}

fn text_line(line: &mut String, record: &Record, detailed: bool) -> fmt::Result {
    write!(line, "Time: {}\t", record.timestamp())?;
    match record {
        Record::Stream(stream) => {
            write!(
                line,
                "Speed: {}/{}\tFuelConsumption: {:.6}",
                stream.speed, stream.speed_limit, stream.fuel_consumption
            )?;
            if detailed {
                stream_details(line, stream)?;
            }
            Ok(())
        }
        Record::Event(event) => {
            line.push_str("Event: ");
            push_name(line, &event.event)
        }
        Record::ExerciseStart(start) => {
            line.push_str("ExerciseStart: ");
            push_name(line, &start.exercise_name)
        }
        Record::ExerciseEnd(_) => write!(line, " ExerciseEnd"),
    }
}

/// Append a simulator-provided name, escaping control characters so a
/// record always stays on one line
fn push_name(line: &mut String, name: &str) -> fmt::Result {
    for c in name.chars() {
        if c.is_control() {
            write!(line, "{}", c.escape_default())?;
        } else {
            line.push(c);
        }
    }
    Ok(())
}

fn stream_details(line: &mut String, stream: &StreamData) -> fmt::Result {
    if let Some(indicator) = stream.turn_indicator {
        write!(line, "\tTurn: {}", indicator)?;
    }
    if let Some(ControlInput {
        steering,
        throttle,
        brake,
        clutch,
    }) = stream.input
    {
        write!(
            line,
            "\tInput: S{:.2} T{:.2} B{:.2} C{:.2}",
            steering, throttle, brake, clutch
        )?;
    }
    Ok(())
}
