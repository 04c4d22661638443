//! The per-object sample override record.
//!
//! The record is the last field of a hit object line:
//! `sampleSet:additionSet[:customIndex[:volume[:filename]]]`. It is optional as a whole, and so
//! are its trailing fields.
use std::{fmt, str::FromStr};

use serde::Serialize;

use crate::{
    error::{parse_value, Error},
    hitsound::SampleSet,
};

/// Sample overrides of a single hit object.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Extras {
    /// Sample set of the normal sound.
    pub sample_set: i32,
    /// Sample set of the whistle, finish and clap sounds.
    pub addition_set: i32,
    /// Index of the custom sample set; `0` means the one from the timing point.
    pub custom_index: i32,
    /// Sample volume from 0 to 100; `0` means the one from the timing point.
    pub volume: i32,
    /// Custom sample file that replaces the normal sound, or empty.
    pub filename: String,
}

impl Extras {
    /// Returns `true` if no field is overridden.
    #[inline]
    pub fn is_default(&self) -> bool {
        *self == Extras::default()
    }

    /// Returns the sample set of the normal sound, if the id is a known one.
    #[inline]
    pub fn normal_set(&self) -> Option<SampleSet> {
        SampleSet::from_id(self.sample_set)
    }

    /// Returns the sample set of the additions, if the id is a known one.
    #[inline]
    pub fn addition_set(&self) -> Option<SampleSet> {
        SampleSet::from_id(self.addition_set)
    }
}

impl FromStr for Extras {
    type Err = Error;

    /// Parses the record. A string without any `:` (including the empty string) yields the
    /// default record.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.contains(':') {
            return Ok(Extras::default());
        }

        // The filename is last and may itself contain colons.
        let parts: Vec<&str> = s.splitn(5, ':').collect();

        let mut extras = Extras {
            sample_set: parse_value(parts[0], "sample set")?,
            addition_set: parse_value(parts[1], "addition set")?,
            ..Extras::default()
        };

        if let Some(custom_index) = parts.get(2) {
            extras.custom_index = parse_value(custom_index, "custom sample index")?;
        }
        if let Some(volume) = parts.get(3) {
            extras.volume = parse_value(volume, "sample volume")?;
        }
        if let Some(filename) = parts.get(4) {
            extras.filename = (*filename).to_owned();
        }

        Ok(extras)
    }
}

/// Writes all five fields.
impl fmt::Display for Extras {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.sample_set, self.addition_set, self.custom_index, self.volume, self.filename
        )
    }
}
