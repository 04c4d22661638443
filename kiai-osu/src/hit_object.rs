//! Hit object lines.
//!
//! Every hit object line starts with `x,y,time,type,hitsound`. The type mask selects the variant,
//! which determines how the remaining fields are read.
use std::{fmt, str::FromStr};

use bitflags::bitflags;
use kiai_core::{
    curve::{self, CurveKind},
    geometry::{IntPoint, Vec2},
    timing::AbsoluteTimestamp,
};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{field, parse_field, parse_optional_field, Error, LineError},
    extras::Extras,
    hitsound::Hitsound,
};

bitflags! {
    /// The type mask of a hit object line.
    ///
    /// Bits 4 to 6 (combo colour skip) and bit 7 (osu!mania hold) are retained when parsing but
    /// not interpreted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
    pub struct HitObjectType : u32 {
        /// A hit circle.
        const CIRCLE = 1;
        /// A slider.
        const SLIDER = 1 << 1;
        /// The object starts a new combo.
        const NEW_COMBO = 1 << 2;
        /// A spinner.
        const SPINNER = 1 << 3;
    }
}

/// Opaque identity of a hit object.
///
/// Identities are generated when an object is created and are not stored in map files, so two
/// parses of the same line yield different identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(Uuid);

impl ObjectId {
    /// Generates a new random identity.
    #[inline]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[inline]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ObjectId {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A hit object.
///
/// Equality compares everything but the identity.
#[derive(Debug, Clone, Serialize)]
pub struct HitObject {
    #[serde(skip)]
    id: ObjectId,
    position: IntPoint,
    start_time: AbsoluteTimestamp,
    new_combo: bool,
    hitsound: Hitsound,
    extras: Extras,
    kind: HitObjectKind,
}

/// Variant-specific part of a hit object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum HitObjectKind {
    /// A single tap.
    Circle,
    /// A path to follow.
    Slider(Slider),
    /// A spinner held until its end time.
    Spinner(Spinner),
}

/// Slider payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slider {
    curve_kind: CurveKind,
    control_points: Vec<IntPoint>,
    curve: Vec<Vec2>,
    repeat_count: u32,
    length: f64,
    edge_hitsounds: Option<String>,
    edge_additions: Option<String>,
}

/// Spinner payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Spinner {
    /// Timestamp when the spinner ends.
    pub end_time: AbsoluteTimestamp,
}

impl HitObject {
    /// Creates a hit object with a fresh identity, no hitsound and default extras.
    ///
    /// A slider must start at `position`: its first control point is not stored in map files, so
    /// any other anchor would be lost when writing the object out.
    pub fn new(
        position: IntPoint,
        start_time: AbsoluteTimestamp,
        kind: HitObjectKind,
    ) -> Result<Self, Error> {
        if let HitObjectKind::Slider(slider) = &kind {
            if let Some(&anchor) = slider.control_points.first() {
                if anchor != position {
                    return Err(Error::SliderAnchorMismatch { position, anchor });
                }
            }
        }

        Ok(Self {
            id: ObjectId::new(),
            position,
            start_time,
            new_combo: false,
            hitsound: Hitsound::empty(),
            extras: Extras::default(),
            kind,
        })
    }

    /// Sets the new combo flag.
    #[inline]
    pub fn with_new_combo(mut self, new_combo: bool) -> Self {
        self.new_combo = new_combo;
        self
    }

    /// Sets the hitsound.
    #[inline]
    pub fn with_hitsound(mut self, hitsound: Hitsound) -> Self {
        self.hitsound = hitsound;
        self
    }

    /// Sets the sample overrides.
    #[inline]
    pub fn with_extras(mut self, extras: Extras) -> Self {
        self.extras = extras;
        self
    }

    /// Returns the identity of the object.
    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Returns the position on the playfield in osu!pixels.
    #[inline]
    pub fn position(&self) -> IntPoint {
        self.position
    }

    /// Returns the timestamp when the object has to be hit.
    #[inline]
    pub fn start_time(&self) -> AbsoluteTimestamp {
        self.start_time
    }

    /// Returns the timestamp when the object ends.
    ///
    /// Only spinners have a duration; the duration of a slider depends on the slider velocity at
    /// its start and is not computed here.
    #[inline]
    pub fn end_time(&self) -> AbsoluteTimestamp {
        match &self.kind {
            HitObjectKind::Spinner(spinner) => spinner.end_time,
            HitObjectKind::Circle | HitObjectKind::Slider(_) => self.start_time,
        }
    }

    /// Returns `true` if the object starts a new combo.
    #[inline]
    pub fn new_combo(&self) -> bool {
        self.new_combo
    }

    /// Returns the hitsound flags.
    #[inline]
    pub fn hitsound(&self) -> Hitsound {
        self.hitsound
    }

    /// Returns the sample overrides.
    #[inline]
    pub fn extras(&self) -> &Extras {
        &self.extras
    }

    /// Returns the variant-specific part of the object.
    #[inline]
    pub fn kind(&self) -> &HitObjectKind {
        &self.kind
    }

    /// Returns `true` for hit circles.
    #[inline]
    pub fn is_circle(&self) -> bool {
        matches!(self.kind, HitObjectKind::Circle)
    }

    /// Returns `true` for sliders.
    #[inline]
    pub fn is_slider(&self) -> bool {
        matches!(self.kind, HitObjectKind::Slider(_))
    }

    /// Returns `true` for spinners.
    #[inline]
    pub fn is_spinner(&self) -> bool {
        matches!(self.kind, HitObjectKind::Spinner(_))
    }

    /// Returns the type mask written to map files.
    pub fn object_type(&self) -> HitObjectType {
        let mut object_type = match self.kind {
            HitObjectKind::Circle => HitObjectType::CIRCLE,
            HitObjectKind::Slider(_) => HitObjectType::SLIDER,
            HitObjectKind::Spinner(_) => HitObjectType::SPINNER,
        };
        object_type.set(HitObjectType::NEW_COMBO, self.new_combo);
        object_type
    }
}

impl PartialEq for HitObject {
    fn eq(&self, other: &Self) -> bool {
        self.position == other.position
            && self.start_time == other.start_time
            && self.new_combo == other.new_combo
            && self.hitsound == other.hitsound
            && self.extras == other.extras
            && self.kind == other.kind
    }
}

impl Slider {
    /// Creates a slider and builds its curve.
    ///
    /// `control_points` must start with the position of the slider.
    pub fn new(
        curve_kind: CurveKind,
        control_points: Vec<IntPoint>,
        repeat_count: u32,
        length: f64,
    ) -> Result<Self, Error> {
        if !length.is_finite() {
            return Err(Error::MalformedField {
                field: "slider length",
                value: length.to_string(),
            });
        }

        let curve = curve::build(curve_kind, &control_points, length)?;

        Ok(Self {
            curve_kind,
            control_points,
            curve,
            repeat_count,
            length,
            edge_hitsounds: None,
            edge_additions: None,
        })
    }

    /// Returns the interpolation family of the curve.
    #[inline]
    pub fn curve_kind(&self) -> CurveKind {
        self.curve_kind
    }

    /// Returns the control points, starting with the position of the slider.
    #[inline]
    pub fn control_points(&self) -> &[IntPoint] {
        &self.control_points
    }

    /// Returns the points of the synthesized curve.
    #[inline]
    pub fn curve(&self) -> &[Vec2] {
        &self.curve
    }

    /// Returns the number of times the slider is traversed, the first pass included.
    #[inline]
    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// Returns the target length in osu!pixels.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Returns the hitsounds of the slider edges, `|`-separated, as written in the map.
    #[inline]
    pub fn edge_hitsounds(&self) -> Option<&str> {
        self.edge_hitsounds.as_deref()
    }

    /// Returns the sample sets of the slider edges, `|`-separated, as written in the map.
    #[inline]
    pub fn edge_additions(&self) -> Option<&str> {
        self.edge_additions.as_deref()
    }

    fn parse(position: IntPoint, fields: &[&str]) -> Result<Self, Error> {
        let (curve_kind, control_points) = parse_path(position, field(fields, 5, "slider path")?)?;
        let repeat_count = parse_optional_field(fields, 6, "slider repeat count")?.unwrap_or(1);
        let length = parse_optional_field(fields, 7, "slider length")?.unwrap_or(0.);

        let mut slider = Slider::new(curve_kind, control_points, repeat_count, length)?;
        slider.edge_hitsounds = edge_field(fields, 8);
        slider.edge_additions = edge_field(fields, 9);
        Ok(slider)
    }
}

/// Empty edge fields are written as placeholders when only the extras are set.
fn edge_field(fields: &[&str], index: usize) -> Option<String> {
    fields
        .get(index)
        .filter(|s| !s.is_empty())
        .map(|&s| s.to_owned())
}

/// Parses `K|x:y|x:y...` and prepends `position` to the points.
fn parse_path(position: IntPoint, path: &str) -> Result<(CurveKind, Vec<IntPoint>), Error> {
    let mut parts = path.split('|');

    // split() always yields at least one item.
    let kind = parts.next().unwrap_or_default();
    let mut chars = kind.chars();
    let kind = match (chars.next(), chars.next()) {
        (Some(c), None) => CurveKind::try_from(c)?,
        _ => {
            return Err(Error::MalformedField {
                field: "curve kind",
                value: kind.to_owned(),
            })
        }
    };

    let mut points = vec![position];
    for point in parts {
        let (x, y) = point
            .split_once(':')
            .ok_or_else(|| Error::MalformedControlPoint(point.to_owned()))?;
        let x = x
            .parse()
            .map_err(|_| Error::MalformedControlPoint(point.to_owned()))?;
        let y = y
            .parse()
            .map_err(|_| Error::MalformedControlPoint(point.to_owned()))?;
        points.push(IntPoint::new(x, y));
    }

    Ok((kind, points))
}

fn parse_extras(fields: &[&str], index: usize) -> Result<Extras, Error> {
    fields
        .get(index)
        .map(|s| s.parse())
        .transpose()
        .map(Option::unwrap_or_default)
}

impl FromStr for HitObject {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').collect();

        let position = IntPoint::new(parse_field(&fields, 0, "x")?, parse_field(&fields, 1, "y")?);
        let start_time = AbsoluteTimestamp(parse_field(&fields, 2, "time")?);
        let object_type = HitObjectType::from_bits_retain(parse_field(&fields, 3, "type")?);
        let hitsound = Hitsound::from_bits_retain(parse_field(&fields, 4, "hitsound")?);

        let (kind, extras) = if object_type.contains(HitObjectType::CIRCLE) {
            (HitObjectKind::Circle, parse_extras(&fields, 5)?)
        } else if object_type.contains(HitObjectType::SLIDER) {
            let slider = Slider::parse(position, &fields)?;
            (HitObjectKind::Slider(slider), parse_extras(&fields, 10)?)
        } else if object_type.contains(HitObjectType::SPINNER) {
            let end_time = AbsoluteTimestamp(parse_field(&fields, 5, "spinner end time")?);
            let extras = field(&fields, 6, "extras")?.parse::<Extras>()?;
            (HitObjectKind::Spinner(Spinner { end_time }), extras)
        } else {
            return Err(Error::UnknownObjectType(object_type.bits()));
        };

        Ok(Self {
            id: ObjectId::new(),
            position,
            start_time,
            new_combo: object_type.contains(HitObjectType::NEW_COMBO),
            hitsound,
            extras,
            kind,
        })
    }
}

impl fmt::Display for HitObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{},{}",
            self.position.x,
            self.position.y,
            self.start_time,
            self.object_type().bits(),
            self.hitsound.bits(),
        )?;

        match &self.kind {
            HitObjectKind::Circle => write!(f, ",{}", self.extras),
            HitObjectKind::Spinner(spinner) => write!(f, ",{},{}", spinner.end_time, self.extras),
            HitObjectKind::Slider(slider) => {
                write!(f, ",{}", slider.curve_kind.as_char())?;
                for point in slider.control_points.iter().skip(1) {
                    write!(f, "|{}:{}", point.x, point.y)?;
                }
                write!(f, ",{},{}", slider.repeat_count, slider.length)?;

                let hitsounds = slider.edge_hitsounds();
                let additions = slider.edge_additions();
                if additions.is_some() || !self.extras.is_default() {
                    write!(
                        f,
                        ",{},{},{}",
                        hitsounds.unwrap_or_default(),
                        additions.unwrap_or_default(),
                        self.extras
                    )
                } else if let Some(hitsounds) = hitsounds {
                    write!(f, ",{}", hitsounds)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Parses hit object lines, skipping blank ones.
///
/// Line numbers in errors are one-based and count the blank lines too.
pub fn parse_hit_objects<'a, I>(lines: I) -> Result<Vec<HitObject>, LineError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut objects = Vec::new();

    for (index, line) in lines.into_iter().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let object = line.parse().map_err(|source| LineError {
            line: index + 1,
            source,
        })?;
        objects.push(object);
    }

    debug!(count = objects.len(), "parsed hit objects");
    Ok(objects)
}
