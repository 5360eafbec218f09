//! Acceptance criteria for region growing.
//!
//! A [`Criterion`] decides whether a candidate medial point may join the region
//! of the point that admitted it into the frontier. Exactly one criterion is
//! active per growth run; [`Method`] is the selector used by configuration and
//! the command line.
//!
//! Every geometric comparison treats NaN as a rejection, so degenerate medial
//! points (undefined bisector, zero-length spokes) never join a region through
//! a geometric criterion.

use std::fmt;
use std::str::FromStr;

use crate::error::{MatError, Result};
use crate::medial::MedialPoint;

/// Region growing criterion selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// Angle between the bisectors of neighboring medial points.
    #[default]
    BisectorAngle,
    /// Difference between separation angles.
    SeparationAngle,
    /// Overlap of the medial balls.
    BallOverlap,
    /// Fixed cap on the region size, independent of geometry.
    Count,
}

impl Method {
    /// All methods in selector order.
    pub const ALL: [Method; 4] = [
        Method::BisectorAngle,
        Method::SeparationAngle,
        Method::BallOverlap,
        Method::Count,
    ];

    /// Short name, as accepted by [`Method::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            Method::BisectorAngle => "bisector",
            Method::SeparationAngle => "sepangle",
            Method::BallOverlap => "balloverlap",
            Method::Count => "count",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = MatError;

    /// Parse a method by name or by numeric selector (`0` to `3`).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "0" | "bisector" | "bisector-angle" | "bisector_angle" => Ok(Method::BisectorAngle),
            "1" | "sepangle" | "separation-angle" | "separation_angle" => {
                Ok(Method::SeparationAngle)
            }
            "2" | "balloverlap" | "ball-overlap" | "ball_overlap" => Ok(Method::BallOverlap),
            "3" | "count" | "shape-count" | "shape_count" => Ok(Method::Count),
            _ => Err(MatError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl TryFrom<i64> for Method {
    type Error = MatError;

    fn try_from(selector: i64) -> Result<Self> {
        usize::try_from(selector)
            .ok()
            .and_then(|i| Method::ALL.get(i).copied())
            .ok_or_else(|| MatError::UnsupportedMethod(selector.to_string()))
    }
}

/// The active acceptance predicate together with its threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Criterion {
    /// Accept if the angle between bisectors is at most `max_degrees`.
    BisectorAngle {
        /// Maximum bisector angle in degrees.
        max_degrees: f64,
    },
    /// Accept if the separation angles differ by at most `max_degrees`.
    SeparationAngle {
        /// Maximum separation angle difference in degrees.
        max_degrees: f64,
    },
    /// Accept if the center distance is at most `factor` times the sum of radii.
    ///
    /// Smaller factors require deeper overlap.
    BallOverlap {
        /// Overlap factor, typically in `(0, 2]`.
        factor: f64,
    },
    /// Accept anything while the region has fewer than `max_region_size` members.
    Count {
        /// Region size cap.
        max_region_size: usize,
    },
}

impl Criterion {
    /// The selector of this criterion.
    pub fn method(&self) -> Method {
        match self {
            Criterion::BisectorAngle { .. } => Method::BisectorAngle,
            Criterion::SeparationAngle { .. } => Method::SeparationAngle,
            Criterion::BallOverlap { .. } => Method::BallOverlap,
            Criterion::Count { .. } => Method::Count,
        }
    }

    /// Reject thresholds that can never produce a meaningful comparison.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Criterion::BisectorAngle { max_degrees } => check_threshold("bisector_angle", max_degrees),
            Criterion::SeparationAngle { max_degrees } => {
                check_threshold("separation_angle", max_degrees)
            }
            Criterion::BallOverlap { factor } => check_threshold("ball_overlap", factor),
            Criterion::Count { .. } => Ok(()),
        }
    }

    /// Whether `candidate` may join the region that `admitter` belongs to.
    ///
    /// `region_len` is the current member count of that region; only
    /// [`Criterion::Count`] looks at it.
    pub fn accepts(&self, admitter: &MedialPoint, candidate: &MedialPoint, region_len: usize) -> bool {
        match *self {
            Criterion::BisectorAngle { max_degrees } => {
                let (a, b) = (&admitter.bisector, &candidate.bisector);
                // Stable near zero, unlike acos of the dot product.
                let angle = a.cross(b).norm().atan2(a.dot(b));
                at_most(angle.to_degrees(), max_degrees)
            }
            Criterion::SeparationAngle { max_degrees } => {
                let diff = (admitter.separation_angle - candidate.separation_angle).abs();
                at_most(diff.to_degrees(), max_degrees)
            }
            Criterion::BallOverlap { factor } => {
                let distance = (candidate.coordinate - admitter.coordinate).norm();
                at_most(distance, factor * (admitter.radius + candidate.radius))
            }
            Criterion::Count { max_region_size } => region_len < max_region_size,
        }
    }
}

/// `value <= limit`, false if either side is NaN.
#[inline]
fn at_most(value: f64, limit: f64) -> bool {
    if value.is_nan() || limit.is_nan() {
        return false;
    }
    value <= limit
}

fn check_threshold(name: &'static str, value: f64) -> Result<()> {
    if value.is_nan() || value < 0.0 {
        return Err(MatError::invalid_param(name, value, "must be a non-negative number"));
    }
    Ok(())
}
