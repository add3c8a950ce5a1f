//! Real roots of low-order polynomials, used by the time-of-impact solvers.

use crate::math::EPSILON;

/// Real roots of `a·t² + b·t + c = 0`, in ascending order.
///
/// Degenerates to the linear equation when `a` vanishes. A constant equation
/// has no isolated roots and yields none.
pub fn quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() <= EPSILON {
        if b.abs() <= EPSILON {
            return Vec::new();
        }
        return vec![-c / b];
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return Vec::new();
    }

    // Citardauq form avoids cancellation when b² >> 4ac
    let sqrt_d = discriminant.sqrt();
    let q = -0.5 * (b + b.signum() * sqrt_d);
    let (t1, t2) = if q.abs() <= EPSILON {
        let t = -b / (2.0 * a);
        (t, t)
    } else {
        (q / a, c / q)
    };

    if t1 <= t2 {
        vec![t1, t2]
    } else {
        vec![t2, t1]
    }
}

/// Smallest root of `a·t² + b·t + c = 0` satisfying `lower < t < upper`
/// (or `lower <= t` when `inclusive_lower`), if any.
pub fn smallest_root_in(
    a: f64,
    b: f64,
    c: f64,
    lower: f64,
    upper: f64,
    inclusive_lower: bool,
) -> Option<f64> {
    quadratic(a, b, c).into_iter().find(|&t| {
        let above = if inclusive_lower { t >= lower } else { t > lower };
        above && t < upper
    })
}
