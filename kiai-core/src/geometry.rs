//! Points on the playfield.
use core::ops::{Add, Mul, Neg, Sub};

#[cfg(test)]
use proptest_derive::Arbitrary;
use serde::Serialize;

/// A point with integer coordinates, as stored in map files.
///
/// Playfield coordinates are in osu!pixels, with the origin at the top left corner.
#[derive(Debug, Default, Clone, Copy, Hash, Eq, PartialEq, Serialize)]
#[cfg_attr(test, derive(Arbitrary))]
pub struct IntPoint {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

/// A point (or a vector) with floating-point coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct Vec2 {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

crate::impl_point_ops!(IntPoint, i32);
crate::impl_point_ops!(Vec2, f64);

impl IntPoint {
    /// Creates a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Converts the point to floating-point coordinates.
    #[inline]
    pub fn to_vec2(self) -> Vec2 {
        Vec2 {
            x: f64::from(self.x),
            y: f64::from(self.y),
        }
    }
}

impl Vec2 {
    /// Creates a new vector.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the Euclidean length of the vector.
    #[inline]
    pub fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Returns a vector of length `1` pointing in the same direction.
    ///
    /// Returns `None` for the zero vector, which has no direction.
    #[inline]
    pub fn normalize(self) -> Option<Vec2> {
        let magnitude = self.magnitude();
        if magnitude == 0. || !magnitude.is_finite() {
            return None;
        }

        Some(Vec2 {
            x: self.x / magnitude,
            y: self.y / magnitude,
        })
    }

    /// Converts the vector to integer coordinates, truncating towards zero.
    #[inline]
    pub fn to_int_point(self) -> IntPoint {
        IntPoint {
            x: self.x as i32,
            y: self.y as i32,
        }
    }
}

impl From<IntPoint> for Vec2 {
    #[inline]
    fn from(point: IntPoint) -> Self {
        point.to_vec2()
    }
}
