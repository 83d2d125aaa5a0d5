//! Rays and ray hits

use crate::ecs::Entity;
use crate::foundation::math::Vec3;

/// A ray for ray casting and picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray (normalized)
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    ///
    /// `direction` must be non-zero; it is normalized here.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    /// Like [`Ray::new`], but `None` for a (near) zero direction
    pub fn try_new(origin: Vec3, direction: Vec3) -> Option<Self> {
        direction
            .try_normalize(f32::EPSILON)
            .map(|direction| Self { origin, direction })
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Component-wise reciprocal of the direction used by slab tests
    pub fn inverse_direction(&self) -> Vec3 {
        self.direction.map(|d| 1.0 / d)
    }
}

/// Result of a ray intersection test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// The entity that was hit
    pub entity: Entity,
    /// The distance from the ray origin to the hit point
    pub distance: f32,
    /// The point of intersection in world space
    pub point: Vec3,
    /// The surface normal at the intersection point
    pub normal: Vec3,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ray_normalizes_direction() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 4.0));
        assert_relative_eq!(ray.direction.norm(), 1.0);
        assert_relative_eq!(ray.point_at(5.0), Vec3::new(1.0, 3.0, 4.0), epsilon = 1e-5);
    }

    #[test]
    fn test_zero_direction_rejected() {
        assert!(Ray::try_new(Vec3::zeros(), Vec3::zeros()).is_none());
    }
}
