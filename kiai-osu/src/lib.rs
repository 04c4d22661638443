//! `kiai-osu` reads and writes the hit object and timing point lines of osu! `.osu` map files.
//!
//! Splitting a file into sections is left to the caller; the parsers here take the lines of a
//! single section.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod error;
pub mod extras;
pub mod hit_object;
pub mod hitsound;
pub mod timing_point;

pub use error::{Error, LineError};
pub use extras::Extras;
pub use hit_object::{parse_hit_objects, HitObject, HitObjectKind, ObjectId, Slider, Spinner};
pub use hitsound::{Hitsound, SampleSet};
pub use timing_point::{governing_entry, parse_timing_points, Effects, TimingPointEntry};
