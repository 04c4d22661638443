//! `kiai-core` provides the format-independent building blocks of a rhythm game map editor: beat
//! snapping and timing points, point geometry and slider curve synthesis.

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod macros;

pub mod curve;
pub mod geometry;
pub mod timing;
