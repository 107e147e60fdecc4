// Vector utilities for ray tracing
//
// Checked arithmetic and predicates on top of glam::DVec3. Plain `/`
// yields inf/NaN on a zero divisor, the checked forms panic.

use glam::DVec3;

/// Components below this magnitude count as zero for `near_zero`.
const NEAR_ZERO: f64 = 1e-8;

/// Extension trait for DVec3 to provide checked division and predicates
pub trait Vec3Ext {
    /// Divide every component by a scalar.
    ///
    /// # Panics
    /// Panics if `t` is zero.
    fn div_checked(self, t: f64) -> Self;

    /// Divide component-wise by another vector.
    ///
    /// # Panics
    /// Panics if any component of `other` is zero.
    fn div_components_checked(self, other: Self) -> Self;

    /// Unit vector in the same direction.
    ///
    /// # Panics
    /// Panics on a zero-length vector.
    fn unit(self) -> Self;

    /// True if every component is smaller than 1e-8 in magnitude.
    fn near_zero(&self) -> bool;

    /// Sum of the three components.
    fn sum(&self) -> f64;
}

impl Vec3Ext for DVec3 {
    fn div_checked(self, t: f64) -> Self {
        assert!(t != 0.0, "Vec3::div_checked: division by zero");
        DVec3::new(self.x / t, self.y / t, self.z / t)
    }

    fn div_components_checked(self, other: Self) -> Self {
        assert!(
            other.x != 0.0 && other.y != 0.0 && other.z != 0.0,
            "Vec3::div_components_checked: division by zero component in {other}"
        );
        self / other
    }

    fn unit(self) -> Self {
        self.div_checked(self.length())
    }

    fn near_zero(&self) -> bool {
        self.abs().max_element() < NEAR_ZERO
    }

    fn sum(&self) -> f64 {
        self.element_sum()
    }
}
