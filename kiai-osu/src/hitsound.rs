//! Hitsound and sample set encodings.
use std::{fmt, str::FromStr};

use bitflags::bitflags;
use serde::Serialize;

use crate::error::Error;

bitflags! {
    /// Sounds played when an object is hit.
    ///
    /// The normal sound is always played by the game; the bit is kept for round-tripping.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct Hitsound : u32 {
        /// The normal sound.
        const NORMAL = 1;
        /// The whistle addition.
        const WHISTLE = 1 << 1;
        /// The finish addition.
        const FINISH = 1 << 2;
        /// The clap addition.
        const CLAP = 1 << 3;
    }
}

/// A set of hitsound samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SampleSet {
    /// Inherit the sample set from the timing point or the map.
    Auto,
    /// The "normal" samples.
    Normal,
    /// The "soft" samples.
    Soft,
    /// The "drum" samples.
    Drum,
}

impl SampleSet {
    /// Returns the sample set with the given numeric id, as used in hit objects and timing
    /// points.
    #[inline]
    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(SampleSet::Auto),
            1 => Some(SampleSet::Normal),
            2 => Some(SampleSet::Soft),
            3 => Some(SampleSet::Drum),
            _ => None,
        }
    }

    /// Returns the numeric id of the sample set.
    #[inline]
    pub fn id(self) -> i32 {
        match self {
            SampleSet::Auto => 0,
            SampleSet::Normal => 1,
            SampleSet::Soft => 2,
            SampleSet::Drum => 3,
        }
    }
}

/// Writes the name used in the `[General]` section.
impl fmt::Display for SampleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SampleSet::Auto => "Auto",
            SampleSet::Normal => "Normal",
            SampleSet::Soft => "Soft",
            SampleSet::Drum => "Drum",
        })
    }
}

/// Parses the name used in the `[General]` section, ignoring case.
impl FromStr for SampleSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(SampleSet::Auto),
            "normal" => Ok(SampleSet::Normal),
            "soft" => Ok(SampleSet::Soft),
            "drum" => Ok(SampleSet::Drum),
            _ => Err(Error::MalformedField {
                field: "sample set",
                value: s.to_owned(),
            }),
        }
    }
}
