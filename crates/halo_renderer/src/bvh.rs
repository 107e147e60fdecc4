//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A strict binary tree over the scene's primitives. Every node's box
//! encloses everything beneath it, so a ray that misses a node's box can
//! skip the whole subtree.

use crate::{HitRecord, Hittable};
use halo_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};
use std::time::Instant;
use thiserror::Error;

/// Errors from building a hierarchy.
#[derive(Error, Debug)]
pub enum BvhError {
    #[error("cannot build a BVH over an empty scene")]
    EmptyScene,
}

/// Shape summary of a built hierarchy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BvhStats {
    /// Interior and leaf nodes together
    pub nodes: usize,
    /// Nodes holding primitives directly
    pub leaves: usize,
    /// Primitives referenced by the tree
    pub primitives: usize,
    /// Longest root-to-node path, counting the root as 1
    pub depth: usize,
}

/// BVH node.
///
/// Leaves hold primitives directly. A lone primitive gets a single-child
/// leaf so that the tree stays binary everywhere else.
pub enum BvhNode {
    /// A single primitive.
    Leaf {
        object: Box<dyn Hittable>,
        bbox: Aabb,
    },
    /// Two primitives, no further subdivision needed.
    Pair {
        left: Box<dyn Hittable>,
        right: Box<dyn Hittable>,
        bbox: Aabb,
    },
    /// Internal node with two subtrees.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
}

/// How each interior node picks the axis it sorts along.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SplitAxis {
    /// Axis of greatest centroid spread.
    #[default]
    Longest,
    /// Uniformly random axis per node.
    Random,
}

enum Splitter<'r> {
    Longest,
    Random(&'r mut dyn RngCore),
}

impl Splitter<'_> {
    fn axis(&mut self, objects: &[Box<dyn Hittable>]) -> usize {
        match self {
            Splitter::Longest => {
                let centroid_bounds = objects.iter().fold(Aabb::EMPTY, |acc, obj| {
                    let c = obj.bounding_box().centroid();
                    acc.union(&Aabb::new(c, c))
                });
                centroid_bounds.longest_axis()
            }
            Splitter::Random(rng) => rng.gen_range(0..3),
        }
    }
}

impl BvhNode {
    /// Create a BVH from a list of hittable objects.
    ///
    /// Each interior node sorts by centroid along the axis of greatest
    /// centroid spread and splits at the median.
    pub fn new(objects: Vec<Box<dyn Hittable>>) -> Result<Self, BvhError> {
        Self::build_logged(objects, Splitter::Longest)
    }

    /// Create a BVH with an explicit split-axis policy.
    ///
    /// `rng` is only drawn from for [`SplitAxis::Random`]. Query results
    /// are identical to [`BvhNode::new`], only the tree shape (and so the
    /// speed) differs.
    pub fn with_split(
        objects: Vec<Box<dyn Hittable>>,
        split: SplitAxis,
        rng: &mut dyn RngCore,
    ) -> Result<Self, BvhError> {
        let splitter = match split {
            SplitAxis::Longest => Splitter::Longest,
            SplitAxis::Random => Splitter::Random(rng),
        };
        Self::build_logged(objects, splitter)
    }

    fn build_logged(
        objects: Vec<Box<dyn Hittable>>,
        mut splitter: Splitter<'_>,
    ) -> Result<Self, BvhError> {
        let start = Instant::now();
        let node = Self::build(objects, &mut splitter)?;
        let stats = node.stats();
        log::info!(
            "Built BVH over {} primitives: {} nodes ({} leaves), depth {} in {:.2?}",
            stats.primitives,
            stats.nodes,
            stats.leaves,
            stats.depth,
            start.elapsed()
        );
        Ok(node)
    }

    /// Recursive BVH construction: sort by centroid, split in half, recurse.
    fn build(
        mut objects: Vec<Box<dyn Hittable>>,
        splitter: &mut Splitter<'_>,
    ) -> Result<Self, BvhError> {
        match objects.len() {
            0 => Err(BvhError::EmptyScene),
            1 => {
                let object = objects.remove(0);
                let bbox = object.bounding_box();
                Ok(BvhNode::Leaf { object, bbox })
            }
            2 => {
                let right = objects.remove(1);
                let left = objects.remove(0);
                let bbox = left.bounding_box().union(&right.bounding_box());
                Ok(BvhNode::Pair { left, right, bbox })
            }
            n => {
                let axis = splitter.axis(&objects);
                objects.sort_unstable_by(|a, b| {
                    let a_val = a.bounding_box().centroid()[axis];
                    let b_val = b.bounding_box().centroid()[axis];
                    a_val.total_cmp(&b_val)
                });

                // Split at midpoint
                let right_objects = objects.split_off(n / 2);
                let left = Self::build(objects, splitter)?;
                let right = Self::build(right_objects, splitter)?;
                let bbox = left.bounding_box().union(&right.bounding_box());

                Ok(BvhNode::Branch {
                    left: Box::new(left),
                    right: Box::new(right),
                    bbox,
                })
            }
        }
    }

    /// Count nodes, primitives and depth.
    pub fn stats(&self) -> BvhStats {
        match self {
            BvhNode::Leaf { .. } => BvhStats {
                nodes: 1,
                leaves: 1,
                primitives: 1,
                depth: 1,
            },
            BvhNode::Pair { .. } => BvhStats {
                nodes: 1,
                leaves: 1,
                primitives: 2,
                depth: 1,
            },
            BvhNode::Branch { left, right, .. } => {
                let l = left.stats();
                let r = right.stats();
                BvhStats {
                    nodes: 1 + l.nodes + r.nodes,
                    leaves: l.leaves + r.leaves,
                    primitives: l.primitives + r.primitives,
                    depth: 1 + l.depth.max(r.depth),
                }
            }
        }
    }
}

/// Query `left` over the full interval, then `right` only up to the
/// closest hit so far. The later candidate wins ties.
fn closest_of<'a>(
    left: &'a dyn Hittable,
    right: &'a dyn Hittable,
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let hit_left = left.hit(ray, ray_t);
    let right_t = hit_left.map_or(ray_t, |rec| ray_t.with_max(rec.t));
    right.hit(ray, right_t).or(hit_left)
}

impl Hittable for BvhNode {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        if !self.bounding_box().hit(ray, ray_t) {
            return None;
        }

        match self {
            BvhNode::Leaf { object, .. } => object.hit(ray, ray_t),
            BvhNode::Pair { left, right, .. } => closest_of(&**left, &**right, ray, ray_t),
            BvhNode::Branch { left, right, .. } => closest_of(&**left, &**right, ray, ray_t),
        }
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. }
            | BvhNode::Pair { bbox, .. }
            | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}
