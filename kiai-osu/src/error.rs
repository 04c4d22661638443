//! Errors produced by the `.osu` line codecs.
use kiai_core::{curve::CurveError, geometry::IntPoint, timing};
use thiserror::Error;

/// An error in a single line or field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A required field is absent.
    #[error("missing {0}")]
    MissingField(&'static str),
    /// A field is present but could not be parsed.
    #[error("malformed {field}: {value:?}")]
    MalformedField {
        /// Name of the field.
        field: &'static str,
        /// The offending text.
        value: String,
    },
    /// A slider control point is not of the form `x:y`.
    #[error("malformed control point: {0:?}")]
    MalformedControlPoint(String),
    /// The type mask has none of the circle, slider or spinner bits set.
    #[error("unknown hit object type: {0}")]
    UnknownObjectType(u32),
    /// A slider does not start at the position of its hit object.
    #[error("slider starts at {anchor:?} instead of the object position {position:?}")]
    SliderAnchorMismatch {
        /// Position of the hit object.
        position: IntPoint,
        /// First control point of the slider.
        anchor: IntPoint,
    },
    /// The slider curve could not be built.
    #[error(transparent)]
    Curve(#[from] CurveError),
    /// A timing point has an invalid beat length.
    #[error("invalid beat length: {0}")]
    InvalidBeatLength(f64),
    /// An inherited timing point appears before any uninherited one.
    #[error("inherited timing point at {0} ms has no uninherited parent")]
    OrphanInheritedPoint(i32),
    /// A timing point has an invalid BPM or meter.
    #[error(transparent)]
    Timing(#[from] timing::Error),
}

/// An [`Error`] along with the line it occurred on.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {source}")]
pub struct LineError {
    /// One-based line number within the parsed sequence.
    pub line: usize,
    /// The underlying error.
    #[source]
    pub source: Error,
}

pub(crate) fn field<'a>(
    fields: &[&'a str],
    index: usize,
    name: &'static str,
) -> Result<&'a str, Error> {
    fields.get(index).copied().ok_or(Error::MissingField(name))
}

pub(crate) fn parse_value<T: std::str::FromStr>(
    value: &str,
    name: &'static str,
) -> Result<T, Error> {
    value.parse().map_err(|_| Error::MalformedField {
        field: name,
        value: value.to_owned(),
    })
}

pub(crate) fn parse_field<T: std::str::FromStr>(
    fields: &[&str],
    index: usize,
    name: &'static str,
) -> Result<T, Error> {
    parse_value(field(fields, index, name)?, name)
}

/// Parses a field that may be absent; a present but malformed field is still an error.
pub(crate) fn parse_optional_field<T: std::str::FromStr>(
    fields: &[&str],
    index: usize,
    name: &'static str,
) -> Result<Option<T>, Error> {
    fields
        .get(index)
        .map(|value| parse_value(value, name))
        .transpose()
}
