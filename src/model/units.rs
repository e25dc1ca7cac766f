//! Fixed-point and integer unit types used throughout the router.
//!
//! Coordinates, distances, durations, and generalized costs are all kept as
//! integers so that two searches over the same inputs are bit-for-bit
//! reproducible; floating point is only used transiently inside a single
//! calculation (e.g. the Haversine-style heuristic) before being rounded back
//! into one of these types.

use derive_more::{Add, AddAssign, Display, Div, Mul, Neg, Sub, Sum};
use serde::{Deserialize, Serialize};

/// latitude or longitude in degrees, scaled by [`FIXED_DEGREE_FACTOR`] and
/// truncated to an `i32`. this is the on-disk and in-memory representation
/// for every coordinate in the graph.
pub type FixedDegrees = i32;

/// scale factor between a floating point degree value and its [`FixedDegrees`]
/// representation. matches common OSM-derived graph encodings (7 decimal
/// digits of precision, about 1cm at the equator).
pub const FIXED_DEGREE_FACTOR: f64 = 1.0e7;

pub fn to_fixed_degrees(degrees: f64) -> FixedDegrees {
    (degrees * FIXED_DEGREE_FACTOR).round() as FixedDegrees
}

pub fn from_fixed_degrees(fixed: FixedDegrees) -> f64 {
    fixed as f64 / FIXED_DEGREE_FACTOR
}

/// mean circumference of the earth, used to derive a flat-projection scale
/// factor for the admissible heuristic. see [`mm_per_fixed_deg_lat`].
pub const EARTH_CIRCUMFERENCE_METERS: f64 = 40_075_017.0;

/// millimeters of north/south travel per unit of [`FixedDegrees`] latitude.
/// longitude must additionally be scaled by `cos(latitude)` since meridians
/// converge at the poles; see [`crate::algorithm::heuristic`].
pub fn mm_per_fixed_deg_lat() -> f64 {
    (EARTH_CIRCUMFERENCE_METERS * 1000.0) / (360.0 * FIXED_DEGREE_FACTOR)
}

/// a length in millimeters. millimeter precision avoids the rounding error
/// that meter- or centimeter-scale floats would accumulate over a large
/// search tree.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, Add, AddAssign, Sub, Mul, Div, Sum, Neg, Display,
)]
pub struct Millimeters(pub i64);

impl Millimeters {
    pub const ZERO: Millimeters = Millimeters(0);

    pub fn from_meters(meters: f64) -> Millimeters {
        Millimeters((meters * 1000.0).round() as i64)
    }

    pub fn as_meters(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

/// a duration in whole seconds.
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, Add, AddAssign, Sub, Mul, Div, Sum, Neg, Display,
)]
pub struct Seconds(pub i64);

impl Seconds {
    pub const ZERO: Seconds = Seconds(0);

    /// rounds a continuous time-of-travel value (e.g. length / speed) to the
    /// nearest whole second. negative values are clamped to zero and the
    /// caller is expected to treat that as the "negative time increment"
    /// diagnostic described in the specification rather than propagate it.
    pub fn from_travel_time(seconds: f64) -> Seconds {
        Seconds(seconds.max(0.0).round() as i64)
    }
}

/// a generalized cost. shares the representation of [`Seconds`] and
/// [`Millimeters`] but carries no fixed unit of its own -- its scale is
/// defined by whichever [`crate::model::dominance::DominanceVariable::Weight`]
/// traversal rule produced it (e.g. seconds times a mode reluctance factor).
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, Add, AddAssign, Sub, Mul, Div, Sum, Neg, Display,
)]
pub struct Weight(pub i64);

impl Weight {
    pub const ZERO: Weight = Weight(0);

    pub fn from_f64(value: f64) -> Weight {
        Weight(value.round() as i64)
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}
