//! Slider curve synthesis.
//!
//! A slider is described by a curve kind, a list of control points and a target length. The
//! target length is authoritative: the synthesized curve is shortened or extended to match it,
//! regardless of where the last control point lies.
use core::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::geometry::{IntPoint, Vec2};

/// Interpolation family of a slider curve.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
pub enum CurveKind {
    /// A straight line between two points.
    Linear,
    /// A circular arc through three points.
    Perfect,
    /// A piecewise Bézier curve.
    Bezier,
    /// A Catmull-Rom spline. Deprecated, but still found in older maps.
    Catmull,
}

/// Errors that can occur while building a curve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    /// The kind letter does not correspond to any curve kind.
    #[error("unknown curve kind: {0:?}")]
    UnknownKind(char),
    /// Synthesis for this curve kind is not implemented.
    #[error("{0} curves are not supported yet")]
    Unsupported(CurveKind),
    /// Fewer control points than the curve kind requires.
    #[error("not enough points for a {kind} curve: got {count}")]
    NotEnoughPoints {
        /// The curve kind.
        kind: CurveKind,
        /// Number of control points given.
        count: usize,
    },
    /// More control points than the curve kind accepts.
    #[error("too many points for a {kind} curve: got {count}")]
    TooManyPoints {
        /// The curve kind.
        kind: CurveKind,
        /// Number of control points given.
        count: usize,
    },
    /// The control points coincide, so the curve has no direction.
    #[error("control points of a {0} curve coincide")]
    DegenerateSegment(CurveKind),
}

impl CurveKind {
    /// Returns the letter used for this kind in map files.
    #[inline]
    pub fn as_char(self) -> char {
        match self {
            CurveKind::Linear => 'L',
            CurveKind::Perfect => 'P',
            CurveKind::Bezier => 'B',
            CurveKind::Catmull => 'C',
        }
    }
}

impl TryFrom<char> for CurveKind {
    type Error = CurveError;

    #[inline]
    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'L' => Ok(CurveKind::Linear),
            'P' => Ok(CurveKind::Perfect),
            'B' => Ok(CurveKind::Bezier),
            'C' => Ok(CurveKind::Catmull),
            _ => Err(CurveError::UnknownKind(value)),
        }
    }
}

impl fmt::Display for CurveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CurveKind::Linear => "linear",
            CurveKind::Perfect => "perfect",
            CurveKind::Bezier => "bezier",
            CurveKind::Catmull => "catmull",
        })
    }
}

/// Builds the point sequence of a curve.
///
/// `control_points` must start with the slider's own position. `length` is the target arc
/// length in osu!pixels.
///
/// Only linear curves are synthesized at the moment; every other kind returns
/// [`CurveError::Unsupported`] rather than an approximation.
pub fn build(
    kind: CurveKind,
    control_points: &[IntPoint],
    length: f64,
) -> Result<Vec<Vec2>, CurveError> {
    match kind {
        CurveKind::Linear => linear(control_points, length),
        CurveKind::Perfect | CurveKind::Bezier | CurveKind::Catmull => {
            Err(CurveError::Unsupported(kind))
        }
    }
}

fn linear(control_points: &[IntPoint], length: f64) -> Result<Vec<Vec2>, CurveError> {
    let (a, b) = match *control_points {
        [a, b] => (a.to_vec2(), b.to_vec2()),
        [] | [_] => {
            return Err(CurveError::NotEnoughPoints {
                kind: CurveKind::Linear,
                count: control_points.len(),
            })
        }
        _ => {
            return Err(CurveError::TooManyPoints {
                kind: CurveKind::Linear,
                count: control_points.len(),
            })
        }
    };

    // Lines can be drawn directly, so the endpoints are all we need. The end is placed along the
    // direction of the control points at the target length.
    let direction = (b - a)
        .normalize()
        .ok_or(CurveError::DegenerateSegment(CurveKind::Linear))?;

    tracing::trace!(?a, ?b, length, "built linear curve");

    Ok(vec![a, a + direction * length])
}
