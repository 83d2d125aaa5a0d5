//! Axis-aligned bounding boxes
//!
//! Boxes keep `min <= max` on every axis. Anything that rotates a box
//! re-derives both corners from the eight transformed vertices instead of
//! transforming `min` and `max` directly.

use crate::foundation::math::{max_components, min_components, Mat4, Point3, Vec3};

/// One of the six faces of a box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitSide {
    /// Face at `min.x`
    NegativeX,
    /// Face at `max.x`
    PositiveX,
    /// Face at `min.y`
    NegativeY,
    /// Face at `max.y`
    PositiveY,
    /// Face at `min.z`
    NegativeZ,
    /// Face at `max.z`
    PositiveZ,
}

impl HitSide {
    /// All faces, in the order ties are resolved
    pub const ALL: [Self; 6] = [
        Self::NegativeX,
        Self::PositiveX,
        Self::NegativeY,
        Self::PositiveY,
        Self::NegativeZ,
        Self::PositiveZ,
    ];

    /// Outward unit normal of this face
    pub fn normal(self) -> Vec3 {
        match self {
            Self::NegativeX => Vec3::new(-1.0, 0.0, 0.0),
            Self::PositiveX => Vec3::new(1.0, 0.0, 0.0),
            Self::NegativeY => Vec3::new(0.0, -1.0, 0.0),
            Self::PositiveY => Vec3::new(0.0, 1.0, 0.0),
            Self::NegativeZ => Vec3::new(0.0, 0.0, -1.0),
            Self::PositiveZ => Vec3::new(0.0, 0.0, 1.0),
        }
    }

    /// Axis index (0 = X, 1 = Y, 2 = Z) this face is perpendicular to
    pub const fn axis(self) -> usize {
        match self {
            Self::NegativeX | Self::PositiveX => 0,
            Self::NegativeY | Self::PositiveY => 1,
            Self::NegativeZ | Self::PositiveZ => 2,
        }
    }

    /// Whether this face sits on the `max` side of its axis
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::PositiveX | Self::PositiveY | Self::PositiveZ)
    }

    /// Face crossed when entering along `axis` with the given direction sign
    const fn entered(axis: usize, positive_direction: bool) -> Self {
        match (axis, positive_direction) {
            (0, true) => Self::NegativeX,
            (0, false) => Self::PositiveX,
            (1, true) => Self::NegativeY,
            (1, false) => Self::PositiveY,
            (2, true) => Self::NegativeZ,
            _ => Self::PositiveZ,
        }
    }
}

/// Result of a slab test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlabHit {
    /// Entry parameter along the ray (negative when the origin is inside)
    pub t_enter: f32,
    /// Exit parameter along the ray
    pub t_exit: f32,
    /// Face the ray enters through
    pub side: HitSide,
}

/// Axis-Aligned Bounding Box for spatial queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            min: Vec3::zeros(),
            max: Vec3::zeros(),
        }
    }
}

impl Aabb {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB from any two opposite corners
    pub fn from_corners(a: Vec3, b: Vec3) -> Self {
        Self {
            min: min_components(&a, &b),
            max: max_components(&a, &b),
        }
    }

    /// Create an AABB centered at a point with given half extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Tightest box around a set of points, `None` if the set is empty
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |acc, p| acc.grow(&p)))
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Full edge lengths
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Half edge lengths
    pub fn half_extents(&self) -> Vec3 {
        self.size() * 0.5
    }

    /// Surface area, `2 * (dx*dy + dy*dz + dx*dz)`
    pub fn surface_area(&self) -> f32 {
        let d = self.size();
        2.0 * (d.x * d.y + d.y * d.z + d.x * d.z)
    }

    /// Whether `min <= max` on every axis and both corners are finite
    pub fn is_valid(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|v| v.is_finite())
            && self.min.x <= self.max.x
            && self.min.y <= self.max.y
            && self.min.z <= self.max.z
    }

    /// Smallest box containing both
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: min_components(&self.min, &other.min),
            max: max_components(&self.max, &other.max),
        }
    }

    /// Smallest box containing this box and `point`
    #[must_use]
    pub fn grow(&self, point: &Vec3) -> Self {
        Self {
            min: min_components(&self.min, point),
            max: max_components(&self.max, point),
        }
    }

    /// This box moved by `offset`
    #[must_use]
    pub fn translated(&self, offset: &Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// The eight corner points
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Axis-aligned box around this box after an affine transform
    #[must_use]
    pub fn transformed(&self, matrix: &Mat4) -> Self {
        let corners = self
            .corners()
            .map(|c| matrix.transform_point(&Point3::from(c)).coords);
        Self::from_points(corners).unwrap_or(*self)
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB (touching counts)
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Point of this box closest to `point`
    pub fn closest_point(&self, point: &Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Face nearest to `point`, with the distance to that face
    ///
    /// Distances are measured to the face rectangle, so points outside the
    /// box pick the face they actually sit against. Ties go to the first
    /// face in [`HitSide::ALL`] order.
    pub fn nearest_face(&self, point: &Vec3) -> (HitSide, f32) {
        let clamped = self.closest_point(point);
        let mut best = (HitSide::NegativeX, f32::INFINITY);

        for side in HitSide::ALL {
            let axis = side.axis();
            let mut on_face = clamped;
            on_face[axis] = if side.is_positive() { self.max[axis] } else { self.min[axis] };

            let distance = (point - on_face).norm();
            if distance < best.1 {
                best = (side, distance);
            }
        }
        best
    }

    /// Slab test against a ray
    ///
    /// `inv_direction` is the component-wise reciprocal of the ray
    /// direction. Axes the ray runs parallel to only reject when the
    /// origin lies outside that slab. Returns `None` unless
    /// `t_exit >= max(0, t_enter)`.
    pub fn slab_test(&self, origin: &Vec3, direction: &Vec3, inv_direction: &Vec3) -> Option<SlabHit> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut side = None;

        for axis in 0..3 {
            if direction[axis] == 0.0 {
                if origin[axis] < self.min[axis] || origin[axis] > self.max[axis] {
                    return None;
                }
                continue;
            }

            let t1 = (self.min[axis] - origin[axis]) * inv_direction[axis];
            let t2 = (self.max[axis] - origin[axis]) * inv_direction[axis];
            let positive = direction[axis] > 0.0;
            let (near, far) = if positive { (t1, t2) } else { (t2, t1) };

            if near > t_enter {
                t_enter = near;
                side = Some(HitSide::entered(axis, positive));
            }
            if far < t_exit {
                t_exit = far;
            }
        }

        let side = side?;
        if t_exit >= t_enter.max(0.0) {
            Some(SlabHit { t_enter, t_exit, side })
        } else {
            None
        }
    }
}
