//! Timing point lines.
//!
//! A line reads `time,beatLength,meter,sampleSet,sampleIndex,volume,uninherited,effects`; every
//! field after the beat length may be omitted. Uninherited points store the beat duration in
//! milliseconds, inherited points store `-100 / slider velocity`.
use std::{fmt, rc::Rc};

use bitflags::bitflags;
use kiai_core::timing::{
    AbsoluteTimestamp, InheritedTimingPoint, TimingPoint, UninheritedTimingPoint,
};
use serde::Serialize;
use tracing::debug;

use crate::error::{field, parse_optional_field, parse_value, Error, LineError};

bitflags! {
    /// Effects toggled by a timing point.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct Effects : u32 {
        /// Kiai time is active.
        const KIAI = 1;
        /// The first barline of the section is hidden in osu!taiko and osu!mania.
        const OMIT_FIRST_BARLINE = 1 << 3;
    }
}

/// A parsed timing point line.
///
/// The beat length and meter are kept as written so that the line can be reproduced exactly;
/// [`point`](Self::point) holds the resolved timing.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingPointEntry {
    /// The timing point. Inherited points share their parent with the entry that defined it.
    pub point: Rc<TimingPoint>,
    /// The raw beat length field.
    pub beat_length: f64,
    /// The raw meter field.
    pub meter: u32,
    /// Default sample set of the objects in this section.
    pub sample_set: i32,
    /// Custom sample index; `0` means the default samples.
    pub sample_index: i32,
    /// Volume from 0 to 100.
    pub volume: i32,
    /// Effects enabled from this point on.
    pub effects: Effects,
}

impl TimingPointEntry {
    /// Returns the timestamp when the point takes effect.
    #[inline]
    pub fn timestamp(&self) -> AbsoluteTimestamp {
        self.point.timestamp()
    }

    /// Returns `true` if the point borrows its tempo from an earlier one.
    #[inline]
    pub fn is_inherited(&self) -> bool {
        self.point.is_inherited()
    }

    /// Parses a line. `parent` is the most recent uninherited point, needed for inherited points.
    fn parse(line: &str, parent: Option<&Rc<TimingPoint>>) -> Result<Self, Error> {
        let fields: Vec<&str> = line.split(',').collect();

        let timestamp = parse_time(field(&fields, 0, "time")?)?;
        let beat_length: f64 = parse_value(field(&fields, 1, "beat length")?, "beat length")?;
        let meter = parse_optional_field(&fields, 2, "meter")?.unwrap_or(4);
        let sample_set = parse_optional_field(&fields, 3, "sample set")?.unwrap_or(0);
        let sample_index = parse_optional_field(&fields, 4, "sample index")?.unwrap_or(0);
        let volume = parse_optional_field(&fields, 5, "volume")?.unwrap_or(100);
        let uninherited = match fields.get(6).copied() {
            None | Some("1") => true,
            Some("0") => false,
            Some(value) => {
                return Err(Error::MalformedField {
                    field: "uninherited",
                    value: value.to_owned(),
                })
            }
        };
        let effects = Effects::from_bits_retain(
            parse_optional_field(&fields, 7, "effects")?.unwrap_or(0),
        );

        let point: TimingPoint = if uninherited {
            if !(beat_length > 0.) || !beat_length.is_finite() {
                return Err(Error::InvalidBeatLength(beat_length));
            }

            UninheritedTimingPoint::new(timestamp, 60_000. / beat_length, meter)?.into()
        } else {
            // Positive values are unusual but encode a negative slider velocity.
            if beat_length == 0. || !beat_length.is_finite() {
                return Err(Error::InvalidBeatLength(beat_length));
            }

            let parent = parent.ok_or(Error::OrphanInheritedPoint(timestamp.0))?;
            InheritedTimingPoint {
                parent: Rc::clone(parent),
                timestamp,
                slider_velocity: -100. / beat_length,
            }
            .into()
        };

        Ok(Self {
            point: Rc::new(point),
            beat_length,
            meter,
            sample_set,
            sample_index,
            volume,
            effects,
        })
    }
}

/// Older files write times as floats; those are truncated.
fn parse_time(value: &str) -> Result<AbsoluteTimestamp, Error> {
    if let Ok(millis) = value.parse() {
        return Ok(AbsoluteTimestamp(millis));
    }

    let millis: f64 = parse_value(value, "time")?;
    if !millis.is_finite() || millis < f64::from(i32::MIN) || millis > f64::from(i32::MAX) {
        return Err(Error::MalformedField {
            field: "time",
            value: value.to_owned(),
        });
    }

    Ok(AbsoluteTimestamp(millis.trunc() as i32))
}

impl fmt::Display for TimingPointEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{},{},{}",
            self.timestamp(),
            self.beat_length,
            self.meter,
            self.sample_set,
            self.sample_index,
            self.volume,
            if self.is_inherited() { 0 } else { 1 },
            self.effects.bits(),
        )
    }
}

/// Parses timing point lines in file order, skipping blank ones.
///
/// Each inherited point becomes a child of the closest uninherited point above it.
pub fn parse_timing_points<'a, I>(lines: I) -> Result<Vec<TimingPointEntry>, LineError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut entries = Vec::new();
    let mut parent: Option<Rc<TimingPoint>> = None;

    for (index, line) in lines.into_iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let entry = TimingPointEntry::parse(line, parent.as_ref()).map_err(|source| LineError {
            line: index + 1,
            source,
        })?;

        if !entry.is_inherited() {
            parent = Some(Rc::clone(&entry.point));
        }
        entries.push(entry);
    }

    debug!(count = entries.len(), "parsed timing points");
    Ok(entries)
}

/// Returns the uninherited entry whose grid applies at `timestamp`.
///
/// That is the last uninherited entry starting at or before `timestamp`, or the first
/// uninherited entry if `timestamp` precedes all of them.
pub fn governing_entry(
    entries: &[TimingPointEntry],
    timestamp: AbsoluteTimestamp,
) -> Option<&TimingPointEntry> {
    let mut uninherited = entries.iter().filter(|entry| !entry.is_inherited());
    let first = uninherited.clone().next();

    uninherited
        .filter(|entry| entry.timestamp() <= timestamp)
        .last()
        .or(first)
}
