//! Bounding volume hierarchy over entity AABBs
//!
//! A binary tree built top-down with the surface area heuristic. Nodes live
//! in one flat array; a node is appended only after both of its children,
//! so every [`BvhSlot::BoundingVolume`] index is smaller than the index of
//! the node holding it and the root is always the last node.
//!
//! Raycasts walk the tree recursively and always return the globally
//! nearest hit, not merely the first box encountered.

use log::trace;

use super::{Aabb, HitSide, Ray, SlabHit, SpatialError};
use crate::ecs::Entity;
use crate::foundation::math::Vec3;

/// One child slot of a [`BiTreeNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BvhSlot {
    /// Index of a child node in the node array
    BoundingVolume(usize),
    /// A primitive, identified by its entity
    Entity(Entity),
    /// Unused slot (only in a tree built from a single primitive)
    Empty,
}

/// Binary BVH node
#[derive(Debug, Clone, PartialEq)]
pub struct BiTreeNode {
    /// The two child slots
    pub slots: [BvhSlot; 2],
    /// Bounds of each slot; meaningless for [`BvhSlot::Empty`]
    pub bounds: [Aabb; 2],
}

impl BiTreeNode {
    /// Bounds enclosing every non-empty slot
    pub fn aabb(&self) -> Aabb {
        match self.slots {
            [_, BvhSlot::Empty] => self.bounds[0],
            [BvhSlot::Empty, _] => self.bounds[1],
            _ => self.bounds[0].union(&self.bounds[1]),
        }
    }
}

/// Nearest primitive hit found by [`Bvh::raycast`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BvhHit {
    /// Entity whose box was hit
    pub entity: Entity,
    /// Distance along the ray to the entry point (0 when starting inside)
    pub t: f32,
    /// Face the ray entered through
    pub side: HitSide,
}

/// Primitive as seen by the builder
#[derive(Debug, Clone, Copy)]
struct Primitive {
    entity: Entity,
    bounds: Aabb,
    centroid: Vec3,
}

/// Winning split of a SAH sweep
#[derive(Debug, Clone, Copy)]
struct Split {
    axis: usize,
    /// Number of primitives going to the first child
    left_count: usize,
    cost: f32,
}

/// A slot that survived its box test during traversal
#[derive(Debug, Clone, Copy)]
enum Candidate {
    Leaf(BvhHit),
    Volume { node: usize, t: f32 },
}

/// Bounding volume hierarchy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bvh {
    nodes: Vec<BiTreeNode>,
}

impl Bvh {
    /// Build a tree over `primitives`
    ///
    /// Fails on an empty list or on a primitive with malformed bounds.
    pub fn build(primitives: &[(Entity, Aabb)]) -> Result<Self, SpatialError> {
        if primitives.is_empty() {
            return Err(SpatialError::EmptyPrimitiveList);
        }

        let mut scratch = Vec::with_capacity(primitives.len());
        for (entity, bounds) in primitives {
            if !bounds.is_valid() {
                return Err(SpatialError::InvalidBounds(*entity));
            }
            scratch.push(Primitive {
                entity: *entity,
                bounds: *bounds,
                centroid: bounds.center(),
            });
        }

        let mut bvh = Self {
            nodes: Vec::with_capacity(primitives.len()),
        };
        bvh.build_node(&mut scratch)?;
        trace!("Built BVH: {} primitives, {} nodes", primitives.len(), bvh.nodes.len());
        Ok(bvh)
    }

    /// Node array, children before parents
    pub fn nodes(&self) -> &[BiTreeNode] {
        &self.nodes
    }

    /// Index of the root node (the last one), `None` for an empty tree
    pub fn root(&self) -> Option<usize> {
        self.nodes.len().checked_sub(1)
    }

    /// Bounds of the whole tree
    pub fn bounds(&self) -> Option<Aabb> {
        self.nodes.last().map(BiTreeNode::aabb)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of entity slots across the whole tree
    pub fn entity_slot_count(&self) -> usize {
        self.nodes
            .iter()
            .flat_map(|node| node.slots.iter())
            .filter(|slot| matches!(slot, BvhSlot::Entity(_)))
            .count()
    }

    /// Build the node for `prims` and return its index
    ///
    /// `prims` is reordered in place; each child recurses on its own
    /// sub-slice of the same buffer.
    fn build_node(&mut self, prims: &mut [Primitive]) -> Result<usize, SpatialError> {
        let node = match prims {
            [] => return Err(SpatialError::EmptyPrimitiveList),
            [only] => BiTreeNode {
                slots: [BvhSlot::Entity(only.entity), BvhSlot::Empty],
                bounds: [only.bounds, only.bounds],
            },
            [a, b] => BiTreeNode {
                slots: [BvhSlot::Entity(a.entity), BvhSlot::Entity(b.entity)],
                bounds: [a.bounds, b.bounds],
            },
            _ => {
                let split = find_best_split(prims);
                sort_by_axis(prims, split.axis);

                let (left, right) = prims.split_at_mut(split.left_count);
                let (left_slot, left_bounds) = self.child_slot(left)?;
                let (right_slot, right_bounds) = self.child_slot(right)?;
                BiTreeNode {
                    slots: [left_slot, right_slot],
                    bounds: [left_bounds, right_bounds],
                }
            }
        };

        self.nodes.push(node);
        Ok(self.nodes.len() - 1)
    }

    /// Slot for one half of a split; single primitives are stored inline
    fn child_slot(&mut self, prims: &mut [Primitive]) -> Result<(BvhSlot, Aabb), SpatialError> {
        if let [only] = prims {
            return Ok((BvhSlot::Entity(only.entity), only.bounds));
        }
        let index = self.build_node(prims)?;
        Ok((BvhSlot::BoundingVolume(index), self.nodes[index].aabb()))
    }

    /// Recompute slot bounds without changing the topology
    ///
    /// `bounds_of` supplies the current box of each entity; entities it
    /// returns `None` for keep their previous bounds.
    pub fn refit(&mut self, bounds_of: impl Fn(Entity) -> Option<Aabb>) {
        for index in 0..self.nodes.len() {
            let (children, rest) = self.nodes.split_at_mut(index);
            let node = &mut rest[0];

            for slot in 0..2 {
                match node.slots[slot] {
                    BvhSlot::Entity(entity) => {
                        if let Some(bounds) = bounds_of(entity) {
                            node.bounds[slot] = bounds;
                        }
                    }
                    BvhSlot::BoundingVolume(child) => {
                        node.bounds[slot] = children[child].aabb();
                    }
                    BvhSlot::Empty => {}
                }
            }
        }
    }

    /// Nearest entity box hit by `ray` closer than `max_distance`
    pub fn raycast(&self, ray: &Ray, max_distance: f32) -> Option<BvhHit> {
        let root = self.root()?;
        let inv_direction = ray.inverse_direction();
        self.raycast_node(root, ray, &inv_direction, max_distance)
    }

    /// Resolve the nearest hit below `index` that is strictly closer than `best_t`
    fn raycast_node(&self, index: usize, ray: &Ray, inv_direction: &Vec3, best_t: f32) -> Option<BvhHit> {
        let node = self.nodes.get(index)?;
        let first = Self::test_slot(node, 0, ray, inv_direction, best_t);
        let second = Self::test_slot(node, 1, ray, inv_direction, best_t);

        match (first, second) {
            (None, None) => None,
            (Some(only), None) | (None, Some(only)) => self.expand(only, ray, inv_direction, best_t),
            (Some(Candidate::Leaf(a)), Some(Candidate::Leaf(b))) => {
                Some(if b.t < a.t { b } else { a })
            }
            (Some(Candidate::Leaf(leaf)), Some(Candidate::Volume { node, t }))
            | (Some(Candidate::Volume { node, t }), Some(Candidate::Leaf(leaf))) => {
                // Nothing inside the volume can be closer than its own entry point
                if leaf.t < t {
                    return Some(leaf);
                }
                match self.raycast_node(node, ray, inv_direction, leaf.t) {
                    Some(inner) if inner.t < leaf.t => Some(inner),
                    _ => Some(leaf),
                }
            }
            (Some(a @ Candidate::Volume { .. }), Some(b @ Candidate::Volume { .. })) => {
                let near = self.expand(a, ray, inv_direction, best_t);
                let bound = near.map_or(best_t, |hit| hit.t.min(best_t));
                match self.expand(b, ray, inv_direction, bound) {
                    Some(far) if near.map_or(true, |hit| far.t < hit.t) => Some(far),
                    _ => near,
                }
            }
        }
    }

    fn expand(&self, candidate: Candidate, ray: &Ray, inv_direction: &Vec3, best_t: f32) -> Option<BvhHit> {
        match candidate {
            Candidate::Leaf(hit) => Some(hit),
            Candidate::Volume { node, .. } => self.raycast_node(node, ray, inv_direction, best_t),
        }
    }

    /// Box test for one slot; passes only if entered before `best_t`
    fn test_slot(
        node: &BiTreeNode,
        slot: usize,
        ray: &Ray,
        inv_direction: &Vec3,
        best_t: f32,
    ) -> Option<Candidate> {
        if node.slots[slot] == BvhSlot::Empty {
            return None;
        }

        let SlabHit { t_enter, side, .. } =
            node.bounds[slot].slab_test(&ray.origin, &ray.direction, inv_direction)?;
        let t = t_enter.max(0.0);
        if t >= best_t {
            return None;
        }

        match node.slots[slot] {
            BvhSlot::Entity(entity) => Some(Candidate::Leaf(BvhHit { entity, t, side })),
            BvhSlot::BoundingVolume(child) => Some(Candidate::Volume { node: child, t }),
            BvhSlot::Empty => None,
        }
    }
}

/// Stable sort by centroid along `axis`
fn sort_by_axis(prims: &mut [Primitive], axis: usize) {
    prims.sort_by(|a, b| a.centroid[axis].total_cmp(&b.centroid[axis]));
}

/// Sweep every axis and split position for the lowest SAH cost
///
/// Cost of a split is `area(left) * |left| + area(right) * |right|`. The
/// first minimum encountered wins. Leaves `prims` sorted along the last axis
/// swept; the caller re-sorts along the winning axis.
fn find_best_split(prims: &mut [Primitive]) -> Split {
    let count = prims.len();
    let mut best = Split {
        axis: 0,
        left_count: count / 2,
        cost: f32::INFINITY,
    };
    let mut suffix = vec![Aabb::default(); count];

    for axis in 0..3 {
        sort_by_axis(prims, axis);

        // suffix[i] bounds prims[i..]
        suffix[count - 1] = prims[count - 1].bounds;
        for i in (0..count - 1).rev() {
            suffix[i] = prims[i].bounds.union(&suffix[i + 1]);
        }

        let mut prefix = prims[0].bounds;
        for split in 1..count {
            let cost = prefix.surface_area() * split as f32
                + suffix[split].surface_area() * (count - split) as f32;
            if cost < best.cost {
                best = Split {
                    axis,
                    left_count: split,
                    cost,
                };
            }
            prefix = prefix.union(&prims[split].bounds);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box(x: f32, y: f32, z: f32) -> Aabb {
        Aabb::from_center_half_extents(Vec3::new(x, y, z), Vec3::new(0.5, 0.5, 0.5))
    }

    fn row_of_boxes(count: u64) -> Vec<(Entity, Aabb)> {
        (1..=count)
            .map(|i| (Entity::from_raw(i), unit_box(i as f32 * 3.0, 0.0, 0.0)))
            .collect()
    }

    #[test]
    fn test_empty_build_fails() {
        assert_eq!(Bvh::build(&[]), Err(SpatialError::EmptyPrimitiveList));
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        let inverted = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::zeros());
        assert_eq!(
            Bvh::build(&[(Entity::from_raw(4), inverted)]),
            Err(SpatialError::InvalidBounds(Entity::from_raw(4)))
        );
    }

    #[test]
    fn test_single_primitive_leaf() {
        let bvh = Bvh::build(&[(Entity::from_raw(1), unit_box(0.0, 0.0, 0.0))]).unwrap();
        assert_eq!(bvh.len(), 1);
        assert_eq!(bvh.nodes()[0].slots, [BvhSlot::Entity(Entity::from_raw(1)), BvhSlot::Empty]);
    }

    #[test]
    fn test_two_primitive_leaf() {
        let bvh = Bvh::build(&row_of_boxes(2)).unwrap();
        assert_eq!(bvh.len(), 1);
        assert_eq!(
            bvh.nodes()[0].slots,
            [BvhSlot::Entity(Entity::from_raw(1)), BvhSlot::Entity(Entity::from_raw(2))]
        );
    }

    #[test]
    fn test_three_primitives_split_into_volume_and_entity() {
        let bvh = Bvh::build(&row_of_boxes(3)).unwrap();
        let root = &bvh.nodes()[bvh.root().unwrap()];

        let volumes = root.slots.iter().filter(|s| matches!(s, BvhSlot::BoundingVolume(_))).count();
        let entities = root.slots.iter().filter(|s| matches!(s, BvhSlot::Entity(_))).count();
        assert_eq!((volumes, entities), (1, 1));
        assert_eq!(bvh.entity_slot_count(), 3);
    }

    #[test]
    fn test_children_precede_parents() {
        let bvh = Bvh::build(&row_of_boxes(17)).unwrap();
        for (index, node) in bvh.nodes().iter().enumerate() {
            for slot in node.slots {
                if let BvhSlot::BoundingVolume(child) = slot {
                    assert!(child < index, "node {index} points forward to {child}");
                }
            }
        }
        assert_eq!(bvh.entity_slot_count(), 17);
    }

    #[test]
    fn test_sah_separates_clusters() {
        // Two tight clusters far apart: the root split must not mix them
        let mut prims = Vec::new();
        for i in 0..4u64 {
            prims.push((Entity::from_raw(i + 1), unit_box(i as f32 * 0.1, 0.0, 0.0)));
            prims.push((Entity::from_raw(i + 11), unit_box(100.0 + i as f32 * 0.1, 0.0, 0.0)));
        }
        let bvh = Bvh::build(&prims).unwrap();
        let root = &bvh.nodes()[bvh.root().unwrap()];

        assert!(root.bounds[0].max.x < 50.0);
        assert!(root.bounds[1].min.x > 50.0);
    }

    #[test]
    fn test_raycast_picks_nearest_along_row() {
        let bvh = Bvh::build(&row_of_boxes(9)).unwrap();
        let ray = Ray::new(Vec3::new(100.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));

        let hit = bvh.raycast(&ray, f32::INFINITY).unwrap();
        assert_eq!(hit.entity, Entity::from_raw(9));
        assert_relative_eq!(hit.t, 100.0 - 27.5);
        assert_eq!(hit.side, HitSide::PositiveX);
    }

    #[test]
    fn test_raycast_respects_max_distance() {
        let bvh = Bvh::build(&row_of_boxes(3)).unwrap();
        let ray = Ray::new(Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0));

        assert!(bvh.raycast(&ray, 2.0).is_none());
        assert_eq!(bvh.raycast(&ray, 3.0).unwrap().entity, Entity::from_raw(1));
    }

    #[test]
    fn test_raycast_miss() {
        let bvh = Bvh::build(&row_of_boxes(5)).unwrap();
        let ray = Ray::new(Vec3::zeros(), Vec3::new(0.0, 1.0, 0.0));
        assert!(bvh.raycast(&ray, f32::INFINITY).is_none());
        assert!(Bvh::default().raycast(&ray, f32::INFINITY).is_none());
    }

    #[test]
    fn test_refit_moves_bounds() {
        let mut bvh = Bvh::build(&row_of_boxes(6)).unwrap();
        let moved = Entity::from_raw(2);
        bvh.refit(|entity| (entity == moved).then(|| unit_box(0.0, 50.0, 0.0)));

        assert!(bvh.bounds().unwrap().max.y >= 50.5);

        let ray = Ray::new(Vec3::new(0.0, 100.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let hit = bvh.raycast(&ray, f32::INFINITY).unwrap();
        assert_eq!(hit.entity, moved);
        assert_eq!(hit.side, HitSide::PositiveY);
    }
}
