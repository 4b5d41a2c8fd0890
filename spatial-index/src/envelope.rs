use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{IndexError, IndexResult};

/// An axis-aligned bounding box in D dimensions.
///
/// `Envelope` holds a lower and an upper corner with `lower[i] <= upper[i]`
/// on every axis. It is an immutable value: every operation that combines
/// envelopes returns a new one. An optional coordinate system tag travels
/// with the envelope but the index never interprets it; callers are expected
/// to normalize envelopes to one coordinate system before comparing them.
///
/// Intervals are closed, so boxes that merely touch on an edge or corner
/// intersect.
///
/// # Examples
///
/// ```rust
/// use spatial_index::Envelope;
///
/// let a = Envelope::new_2d(0.0, 0.0, 10.0, 10.0).unwrap();
/// let b = Envelope::new_2d(5.0, 5.0, 15.0, 15.0).unwrap();
///
/// assert!(a.intersects(&b));
/// assert_eq!(a.union(&b).area(), 225.0);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "RawEnvelope")]
pub struct Envelope {
    lower: Vec<f64>,
    upper: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    crs: Option<Arc<str>>,
}

/// Unvalidated wire shape; deserialization goes through [`Envelope::new`].
#[derive(Deserialize)]
struct RawEnvelope {
    lower: Vec<f64>,
    upper: Vec<f64>,
    #[serde(default)]
    crs: Option<Arc<str>>,
}

impl TryFrom<RawEnvelope> for Envelope {
    type Error = IndexError;

    fn try_from(raw: RawEnvelope) -> IndexResult<Self> {
        let envelope = Envelope::new(raw.lower, raw.upper)?;
        Ok(match raw.crs {
            Some(crs) => envelope.with_crs(crs),
            None => envelope,
        })
    }
}

impl Envelope {
    /// Creates an envelope from its lower and upper corners.
    ///
    /// Fails with [`IndexError::InvalidEnvelope`] if the corners have
    /// different lengths, zero dimensions, NaN coordinates, or
    /// `lower[i] > upper[i]` on some axis.
    pub fn new(lower: Vec<f64>, upper: Vec<f64>) -> IndexResult<Self> {
        if lower.len() != upper.len() {
            return Err(IndexError::InvalidEnvelope(format!(
                "corner dimensions differ ({} vs {})",
                lower.len(),
                upper.len()
            )));
        }
        if lower.is_empty() {
            return Err(IndexError::InvalidEnvelope(
                "envelope must have at least one dimension".into(),
            ));
        }
        if lower.len() > u16::MAX as usize {
            return Err(IndexError::InvalidEnvelope(format!(
                "too many dimensions: {}",
                lower.len()
            )));
        }
        for (axis, (lo, hi)) in lower.iter().zip(&upper).enumerate() {
            if lo.is_nan() || hi.is_nan() {
                return Err(IndexError::InvalidEnvelope(format!(
                    "NaN coordinate on axis {}",
                    axis
                )));
            }
            if lo > hi {
                return Err(IndexError::InvalidEnvelope(format!(
                    "lower bound {} exceeds upper bound {} on axis {}",
                    lo, hi, axis
                )));
            }
        }

        Ok(Self {
            lower,
            upper,
            crs: None,
        })
    }

    /// Creates a 2D envelope from `(min_x, min_y)` and `(max_x, max_y)`.
    pub fn new_2d(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> IndexResult<Self> {
        Self::new(vec![min_x, min_y], vec![max_x, max_y])
    }

    /// Creates a degenerate envelope covering a single point.
    pub fn point(coords: Vec<f64>) -> IndexResult<Self> {
        Self::new(coords.clone(), coords)
    }

    /// Returns a copy of this envelope tagged with a coordinate system id.
    #[must_use]
    pub fn with_crs(mut self, crs: impl Into<Arc<str>>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    /// Returns a copy of this envelope with the given tag, or untagged.
    #[must_use]
    pub(crate) fn retagged(mut self, crs: Option<&Arc<str>>) -> Self {
        self.crs = crs.cloned();
        self
    }

    pub fn dimension(&self) -> usize {
        self.lower.len()
    }

    pub fn lower(&self) -> &[f64] {
        &self.lower
    }

    pub fn upper(&self) -> &[f64] {
        &self.upper
    }

    /// The coordinate system tag, if any.
    pub fn crs(&self) -> Option<&str> {
        self.crs.as_deref()
    }

    /// Extent along one axis.
    pub fn span(&self, axis: usize) -> f64 {
        self.upper[axis] - self.lower[axis]
    }

    /// Product of the per-axis spans.
    pub fn area(&self) -> f64 {
        (0..self.dimension()).map(|axis| self.span(axis)).product()
    }

    /// Sum of the per-axis spans (the R*-tree "margin").
    pub fn perimeter(&self) -> f64 {
        (0..self.dimension()).map(|axis| self.span(axis)).sum()
    }

    /// Midpoint of each axis.
    pub fn center(&self) -> Vec<f64> {
        self.lower
            .iter()
            .zip(&self.upper)
            .map(|(lo, hi)| (lo + hi) / 2.0)
            .collect()
    }

    /// Returns true if no axis separates the two envelopes.
    pub fn intersects(&self, other: &Envelope) -> bool {
        debug_assert_eq!(self.dimension(), other.dimension());
        self.lower
            .iter()
            .zip(&self.upper)
            .zip(other.lower.iter().zip(&other.upper))
            .all(|((lo, hi), (olo, ohi))| hi >= olo && ohi >= lo)
    }

    /// Returns true if `other` lies entirely inside this envelope.
    pub fn contains(&self, other: &Envelope) -> bool {
        debug_assert_eq!(self.dimension(), other.dimension());
        self.lower
            .iter()
            .zip(&self.upper)
            .zip(other.lower.iter().zip(&other.upper))
            .all(|((lo, hi), (olo, ohi))| lo <= olo && hi >= ohi)
    }

    pub fn contains_point(&self, point: &[f64]) -> bool {
        debug_assert_eq!(self.dimension(), point.len());
        point
            .iter()
            .enumerate()
            .all(|(axis, p)| *p >= self.lower[axis] && *p <= self.upper[axis])
    }

    /// Component-wise min/max of the two envelopes. The coordinate system tag
    /// of `self` is kept.
    #[must_use]
    pub fn union(&self, other: &Envelope) -> Envelope {
        debug_assert_eq!(self.dimension(), other.dimension());
        Envelope {
            lower: self
                .lower
                .iter()
                .zip(&other.lower)
                .map(|(a, b)| a.min(*b))
                .collect(),
            upper: self
                .upper
                .iter()
                .zip(&other.upper)
                .map(|(a, b)| a.max(*b))
                .collect(),
            crs: self.crs.clone(),
        }
    }

    /// Grows this envelope in place to cover `other`.
    pub(crate) fn expand(&mut self, other: &Envelope) {
        for axis in 0..self.dimension() {
            self.lower[axis] = self.lower[axis].min(other.lower[axis]);
            self.upper[axis] = self.upper[axis].max(other.upper[axis]);
        }
    }

    /// The overlapping region, if the envelopes intersect.
    pub fn intersection(&self, other: &Envelope) -> Option<Envelope> {
        if !self.intersects(other) {
            return None;
        }
        Some(Envelope {
            lower: self
                .lower
                .iter()
                .zip(&other.lower)
                .map(|(a, b)| a.max(*b))
                .collect(),
            upper: self
                .upper
                .iter()
                .zip(&other.upper)
                .map(|(a, b)| a.min(*b))
                .collect(),
            crs: self.crs.clone(),
        })
    }

    /// Area of the intersection, zero when disjoint.
    pub fn overlap_area(&self, other: &Envelope) -> f64 {
        let mut area = 1.0;
        for axis in 0..self.dimension() {
            let lo = self.lower[axis].max(other.lower[axis]);
            let hi = self.upper[axis].min(other.upper[axis]);
            if hi < lo {
                return 0.0;
            }
            area *= hi - lo;
        }
        area
    }

    /// Area growth needed for this envelope to also cover `other`.
    pub fn enlargement(&self, other: &Envelope) -> f64 {
        let mut enlarged = 1.0;
        for axis in 0..self.dimension() {
            let lo = self.lower[axis].min(other.lower[axis]);
            let hi = self.upper[axis].max(other.upper[axis]);
            enlarged *= hi - lo;
        }
        enlarged - self.area()
    }

    /// Squared Euclidean distance from a point to the nearest point of this
    /// envelope; zero when the point is inside.
    pub fn min_distance_sq(&self, point: &[f64]) -> f64 {
        debug_assert_eq!(self.dimension(), point.len());
        point
            .iter()
            .enumerate()
            .map(|(axis, &p)| {
                let closest = p.clamp(self.lower[axis], self.upper[axis]);
                (p - closest) * (p - closest)
            })
            .sum()
    }

    pub fn is_point(&self) -> bool {
        self.lower == self.upper
    }

    /// Compares corners only, ignoring the coordinate system tag.
    pub fn same_bounds(&self, other: &Envelope) -> bool {
        self.lower == other.lower && self.upper == other.upper
    }

    /// Builds the smallest envelope covering all of `envelopes`.
    pub fn union_all<'a, I>(envelopes: I) -> Option<Envelope>
    where
        I: IntoIterator<Item = &'a Envelope>,
    {
        let mut iter = envelopes.into_iter();
        let mut bounds = iter.next()?.clone();
        for envelope in iter {
            bounds.expand(envelope);
        }
        Some(bounds)
    }

    /// Validates that this envelope has `dimension` axes.
    pub(crate) fn check_dimension(&self, dimension: usize) -> IndexResult<()> {
        if self.dimension() != dimension {
            return Err(IndexError::dimension_mismatch(dimension, self.dimension()));
        }
        Ok(())
    }
}

impl PartialEq for Envelope {
    fn eq(&self, other: &Self) -> bool {
        self.same_bounds(other) && self.crs == other.crs
    }
}

// NaN coordinates are rejected at construction, so equality is total.
impl Eq for Envelope {}

impl Hash for Envelope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for value in self.lower.iter().chain(&self.upper) {
            // +0.0 and -0.0 compare equal, so they must hash equally
            let normalized = if *value == 0.0 { 0.0f64 } else { *value };
            normalized.to_bits().hash(state);
        }
        self.crs.hash(state);
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |values: &[f64]| {
            values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(f, "Envelope(({}) - ({}))", join(&self.lower), join(&self.upper))?;
        if let Some(crs) = &self.crs {
            write!(f, " [{}]", crs)?;
        }
        Ok(())
    }
}
