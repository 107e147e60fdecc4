use crate::{Interval, Point3, Ray};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Defined by its minimum and maximum corners. Every box built through
/// [`Aabb::new`] satisfies `min <= max` component-wise.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    /// Create an AABB from two opposite corners, in any order.
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB that surrounds this box and `other`.
    ///
    /// Total: the union of two valid boxes is always valid, and
    /// [`Aabb::EMPTY`] is its identity.
    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        Interval::new(self.min[n], self.max[n])
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method: the per-axis parameter ranges are intersected with
    /// `ray_t`. Touching a face, edge or corner counts as a hit. A ray
    /// parallel to an axis misses unless its origin lies inside that
    /// axis's slab.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let orig = r.origin[axis];
            let dir = r.direction[axis];

            if dir == 0.0 {
                if !slab.contains(orig) {
                    return false;
                }
                continue;
            }

            let inv_d = 1.0 / dir;
            let mut t0 = (slab.min - orig) * inv_d;
            let mut t1 = (slab.max - orig) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }

            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.is_empty() {
                return false;
            }
        }

        true
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let x_size = self.axis_interval(0).size();
        let y_size = self.axis_interval(1).size();
        let z_size = self.axis_interval(2).size();

        if x_size > y_size && x_size > z_size {
            0
        } else if y_size > z_size {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    /// True if `other` lies entirely inside this box (boundaries included).
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    /// The box containing nothing; `EMPTY.union(b) == b`.
    pub const EMPTY: Aabb = Aabb {
        min: Point3::splat(f64::INFINITY),
        max: Point3::splat(f64::NEG_INFINITY),
    };
}
