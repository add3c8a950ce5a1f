mod vector;
mod rotation;
mod aabb;
pub mod roots;

pub use vector::Vector3;
pub use rotation::Quaternion;
pub use aabb::Aabb;

/// Constant for a very small number, used for comparisons
pub const EPSILON: f64 = 1.0e-12;

/// Distance tolerance when deciding whether two surfaces touch
pub const CONTACT_TOLERANCE: f64 = 1.0e-9;

/// The table normal; the slate is the `xy` plane and `+z` points up
pub const TABLE_NORMAL: Vector3 = Vector3 { x: 0.0, y: 0.0, z: 1.0 };

/// Returns true if the value is approximately zero
#[inline]
pub fn approx_zero(a: f64) -> bool {
    a.abs() < EPSILON
}

/// Snaps a value to exactly zero when its magnitude is below `epsilon`
#[inline]
pub fn snap_to_zero(value: f64, epsilon: f64) -> f64 {
    if value.abs() < epsilon {
        0.0
    } else {
        value
    }
}

/// `numerator / denominator`, or infinity when the denominator vanishes
#[inline]
pub fn duration(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() <= EPSILON {
        f64::INFINITY
    } else {
        numerator / denominator
    }
}
