//! Types and utilities related to timing.
//!
//! Map files store every timestamp as an absolute number of milliseconds. Editors, however,
//! reason in terms of the musical grid: "the third quarter of the second measure after this
//! timing point". [`AbsoluteTimestamp::to_relative`] finds the grid point closest to an absolute
//! timestamp and [`RelativeTimestamp::to_absolute`] goes back.
use core::fmt;
use std::rc::Rc;

use serde::Serialize;
use thiserror::Error;

/// Largest distance, in milliseconds, between a timestamp and the grid point it snaps to.
pub const SNAP_THRESHOLD_MS: f64 = 2.;

/// Beat subdivisions offered by the editor, in search order.
pub const SNAP_DENOMINATORS: [u32; 8] = [1, 2, 3, 4, 6, 8, 12, 16];

/// Errors related to timing computations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// No grid point lies within [`SNAP_THRESHOLD_MS`] of the timestamp.
    #[error("could not find an accurate snap (closest grid point is {error_ms:.3} ms away)")]
    NoAccurateSnap {
        /// Distance to the closest grid point.
        error_ms: f64,
    },
    /// BPM must be positive and finite, and large enough for a finite beat length.
    #[error("invalid BPM: {0}")]
    InvalidBpm(f64),
    /// Meter must be positive.
    #[error("invalid meter: {0}")]
    InvalidMeter(u32),
    /// Denominator is not one of [`SNAP_DENOMINATORS`].
    #[error("invalid snap denominator: {0}")]
    InvalidDenominator(u32),
}

/// Anything that resolves to a point in time.
pub trait Timestamp: fmt::Debug {
    /// Returns the number of milliseconds since the start of the audio track.
    fn milliseconds(&self) -> i32;
}

/// A point in time, in milliseconds since the start of the audio track.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct AbsoluteTimestamp(pub i32);

/// A point in time relative to an anchor timestamp, expressed on the musical grid.
///
/// The time is `measures` whole measures plus `numerator / denominator` of a measure after the
/// anchor. The numerator may exceed the denominator: the snapping search also considers points
/// one measure ahead, which catches timestamps that land right before a measure boundary.
///
/// The anchor is borrowed and must outlive the relative timestamp.
#[derive(Debug, Clone, Copy)]
pub struct RelativeTimestamp<'a> {
    anchor: &'a dyn Timestamp,
    bpm: f64,
    meter: u32,
    measures: i32,
    numerator: u32,
    denominator: u32,
}

#[inline]
fn ms_per_measure(bpm: f64, meter: u32) -> f64 {
    60_000. / bpm * f64::from(meter)
}

/// Returns the distance in milliseconds from the anchor to a grid point.
///
/// The whole product is divided once, so grid points that fall on a whole millisecond come out
/// as exact integers.
#[inline]
fn grid_offset(bpm: f64, meter: u32, measures: i64, numerator: u32, denominator: u32) -> f64 {
    let steps = measures * i64::from(denominator) + i64::from(numerator);
    f64::from(meter) * 60_000. * steps as f64 / (bpm * f64::from(denominator))
}

fn check_bpm_and_meter(bpm: f64, meter: u32) -> Result<(), Error> {
    if !(bpm > 0.) || !bpm.is_finite() || !ms_per_measure(bpm, meter).is_finite() {
        return Err(Error::InvalidBpm(bpm));
    }
    if meter == 0 {
        return Err(Error::InvalidMeter(meter));
    }
    Ok(())
}

impl AbsoluteTimestamp {
    /// Creates a timestamp from milliseconds.
    #[inline]
    pub const fn from_millis(millis: i32) -> Self {
        Self(millis)
    }

    /// Returns the timestamp in milliseconds.
    #[inline]
    pub const fn as_millis(self) -> i32 {
        self.0
    }

    /// Finds the grid point closest to this timestamp.
    ///
    /// The grid starts at `anchor` and is defined by `bpm` and `meter`. Every subdivision from
    /// [`SNAP_DENOMINATORS`] is tried in order; on equal distances the earlier candidate wins, so
    /// simpler fractions are preferred.
    ///
    /// Measures are counted with floored division, so timestamps before the anchor get a negative
    /// measure count and a non-negative numerator.
    pub fn to_relative<'a>(
        self,
        anchor: &'a dyn Timestamp,
        bpm: f64,
        meter: u32,
    ) -> Result<RelativeTimestamp<'a>, Error> {
        check_bpm_and_meter(bpm, meter)?;

        let elapsed = f64::from(self.0) - f64::from(anchor.milliseconds());
        let measures = (elapsed / ms_per_measure(bpm, meter)).floor() as i64;
        let delta_to = |numerator, denominator| {
            (elapsed - grid_offset(bpm, meter, measures, numerator, denominator)).abs()
        };

        // Start from the anchor of the measure itself, which is also the first candidate below.
        let mut best = (0, 1, delta_to(0, 1));
        for &denominator in &SNAP_DENOMINATORS {
            for i in 0..denominator {
                for numerator in [i, i + denominator] {
                    let delta = delta_to(numerator, denominator);
                    if delta < best.2 {
                        best = (numerator, denominator, delta);
                    }
                }
            }
        }

        let (numerator, denominator, delta) = best;
        if !(delta <= SNAP_THRESHOLD_MS) {
            tracing::debug!(timestamp = self.0, delta, "no accurate snap");
            return Err(Error::NoAccurateSnap { error_ms: delta });
        }

        Ok(RelativeTimestamp {
            anchor,
            bpm,
            meter,
            measures: measures as i32,
            numerator,
            denominator,
        })
    }
}

impl Timestamp for AbsoluteTimestamp {
    #[inline]
    fn milliseconds(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for AbsoluteTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for AbsoluteTimestamp {
    #[inline]
    fn from(millis: i32) -> Self {
        Self(millis)
    }
}

impl<'a> RelativeTimestamp<'a> {
    /// Creates a relative timestamp, validating its fields.
    pub fn new(
        anchor: &'a dyn Timestamp,
        bpm: f64,
        meter: u32,
        measures: i32,
        numerator: u32,
        denominator: u32,
    ) -> Result<Self, Error> {
        check_bpm_and_meter(bpm, meter)?;
        if !SNAP_DENOMINATORS.contains(&denominator) {
            return Err(Error::InvalidDenominator(denominator));
        }

        Ok(Self {
            anchor,
            bpm,
            meter,
            measures,
            numerator,
            denominator,
        })
    }

    /// Returns the anchor this timestamp is relative to.
    #[inline]
    pub fn anchor(&self) -> &'a dyn Timestamp {
        self.anchor
    }

    /// Returns the BPM of the grid.
    #[inline]
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Returns the number of beats per measure.
    #[inline]
    pub fn meter(&self) -> u32 {
        self.meter
    }

    /// Returns the number of whole measures after the anchor.
    #[inline]
    pub fn measures(&self) -> i32 {
        self.measures
    }

    /// Returns the numerator of the measure fraction.
    #[inline]
    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    /// Returns the denominator of the measure fraction.
    #[inline]
    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// Converts back to an absolute timestamp, truncating fractional milliseconds.
    pub fn to_absolute(&self) -> AbsoluteTimestamp {
        let offset = grid_offset(
            self.bpm,
            self.meter,
            i64::from(self.measures),
            self.numerator,
            self.denominator,
        );

        AbsoluteTimestamp((f64::from(self.anchor.milliseconds()) + offset) as i32)
    }
}

impl Timestamp for RelativeTimestamp<'_> {
    #[inline]
    fn milliseconds(&self) -> i32 {
        self.to_absolute().0
    }
}

impl PartialEq for RelativeTimestamp<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.anchor.milliseconds() == other.anchor.milliseconds()
            && self.bpm == other.bpm
            && self.meter == other.meter
            && self.measures == other.measures
            && self.numerator == other.numerator
            && self.denominator == other.denominator
    }
}

impl fmt::Display for RelativeTimestamp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} + {}/{}",
            self.measures, self.numerator, self.denominator
        )
    }
}

/// A timing point that defines its own tempo.
#[derive(Debug, Clone, PartialEq)]
pub struct UninheritedTimingPoint {
    /// Timestamp when this point takes effect.
    pub timestamp: AbsoluteTimestamp,
    /// Beats per minute.
    pub bpm: f64,
    /// Beats per measure.
    pub meter: u32,
}

/// A timing point that borrows the tempo of an earlier point and overrides the slider velocity.
#[derive(Debug, Clone, PartialEq)]
pub struct InheritedTimingPoint {
    /// The point the tempo is taken from.
    ///
    /// Several inherited points usually share one parent.
    pub parent: Rc<TimingPoint>,
    /// Timestamp when this point takes effect.
    pub timestamp: AbsoluteTimestamp,
    /// Slider velocity multiplier.
    ///
    /// Normally positive; negative values can technically be encoded and are kept as is.
    pub slider_velocity: f64,
}

/// A timing point.
#[derive(Debug, Clone, PartialEq)]
pub enum TimingPoint {
    /// A point with its own BPM and meter.
    Uninherited(UninheritedTimingPoint),
    /// A point resolving BPM and meter through its parent.
    Inherited(InheritedTimingPoint),
}

impl UninheritedTimingPoint {
    /// Creates an uninherited timing point, validating BPM and meter.
    pub fn new(timestamp: AbsoluteTimestamp, bpm: f64, meter: u32) -> Result<Self, Error> {
        check_bpm_and_meter(bpm, meter)?;
        Ok(Self {
            timestamp,
            bpm,
            meter,
        })
    }

    /// Returns the duration of one beat in milliseconds.
    #[inline]
    pub fn beat_length(&self) -> f64 {
        60_000. / self.bpm
    }
}

impl TimingPoint {
    /// Returns the timestamp when this point takes effect.
    #[inline]
    pub fn timestamp(&self) -> AbsoluteTimestamp {
        match self {
            TimingPoint::Uninherited(point) => point.timestamp,
            TimingPoint::Inherited(point) => point.timestamp,
        }
    }

    /// Returns the uninherited point at the root of the parent chain.
    pub fn root(&self) -> &UninheritedTimingPoint {
        let mut point = self;
        loop {
            match point {
                TimingPoint::Uninherited(root) => return root,
                TimingPoint::Inherited(inherited) => point = inherited.parent.as_ref(),
            }
        }
    }

    /// Returns the BPM in effect at this point.
    #[inline]
    pub fn bpm(&self) -> f64 {
        self.root().bpm
    }

    /// Returns the meter in effect at this point.
    #[inline]
    pub fn meter(&self) -> u32 {
        self.root().meter
    }

    /// Returns the slider velocity multiplier; `1.0` for uninherited points.
    #[inline]
    pub fn slider_velocity(&self) -> f64 {
        match self {
            TimingPoint::Uninherited(_) => 1.,
            TimingPoint::Inherited(point) => point.slider_velocity,
        }
    }

    /// Returns `true` if this point borrows its tempo from a parent.
    #[inline]
    pub fn is_inherited(&self) -> bool {
        matches!(self, TimingPoint::Inherited(_))
    }

    /// Snaps `timestamp` to the grid defined by this point.
    pub fn to_relative(&self, timestamp: AbsoluteTimestamp) -> Result<RelativeTimestamp<'_>, Error> {
        let anchor = match self {
            TimingPoint::Uninherited(point) => &point.timestamp,
            TimingPoint::Inherited(point) => &point.timestamp,
        };

        timestamp.to_relative(anchor, self.bpm(), self.meter())
    }
}

impl From<UninheritedTimingPoint> for TimingPoint {
    #[inline]
    fn from(point: UninheritedTimingPoint) -> Self {
        TimingPoint::Uninherited(point)
    }
}

impl From<InheritedTimingPoint> for TimingPoint {
    #[inline]
    fn from(point: InheritedTimingPoint) -> Self {
        TimingPoint::Inherited(point)
    }
}
