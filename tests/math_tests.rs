use approx::assert_relative_eq;
use billiard_physics::math::roots::{quadratic, smallest_root_in};
use billiard_physics::math::{Aabb, Quaternion, Vector3};
use nalgebra::UnitQuaternion;
use std::f64::consts::PI;

#[test]
fn test_vector3_operations() {
    let v1 = Vector3::new(1.0, 2.0, 3.0);
    let v2 = Vector3::new(4.0, 5.0, 6.0);

    assert_eq!(v1 + v2, Vector3::new(5.0, 7.0, 9.0));
    assert_eq!(v2 - v1, Vector3::new(3.0, 3.0, 3.0));
    assert_eq!(v1 * 2.0, Vector3::new(2.0, 4.0, 6.0));
    assert_eq!(2.0 * v1, v1 * 2.0);
    assert_eq!(-v1, Vector3::new(-1.0, -2.0, -3.0));

    assert_eq!(v1.dot(&v2), 32.0);

    let cross = v1.cross(&v2);
    assert_eq!(cross, Vector3::new(-3.0, 6.0, -3.0));
    assert_relative_eq!(cross.dot(&v1), 0.0);
    assert_relative_eq!(cross.dot(&v2), 0.0);

    let length = v1.length();
    assert_relative_eq!(length, 14.0f64.sqrt());
    let normalized = v1.normalize();
    assert_relative_eq!(normalized.length(), 1.0);
    assert_relative_eq!(normalized, v1 / length);
}

#[test]
fn test_vector3_table_helpers() {
    let v = Vector3::new(3.0, -4.0, 2.5);
    assert_eq!(v.horizontal(), Vector3::new(3.0, -4.0, 0.0));

    let tiny = Vector3::new(1e-9, 0.5, -1e-8);
    assert_eq!(tiny.minimize(1e-6), Vector3::new(0.0, 0.5, 0.0));

    assert!(Vector3::ZERO.is_zero());
    assert_eq!(Vector3::ZERO.normalize(), Vector3::ZERO);

    assert_relative_eq!(v.distance(&v.horizontal()), 2.5);
}

#[test]
fn test_vector3_nalgebra_bridge() {
    let v = Vector3::new(0.25, -1.5, 7.0);
    let n = v.to_nalgebra();
    assert_eq!(Vector3::from_nalgebra(&n), v);

    let w = Vector3::new(-2.0, 0.5, 1.0);
    let expected = Vector3::from_nalgebra(&n.cross(&w.to_nalgebra()));
    assert_relative_eq!(v.cross(&w), expected, epsilon = 1e-12);
}

/// Rotates `v` by `q` through nalgebra
fn rotate(q: Quaternion, v: Vector3) -> Vector3 {
    let unit = UnitQuaternion::from_quaternion(q.to_nalgebra());
    Vector3::from_nalgebra(&(unit * v.to_nalgebra()))
}

#[test]
fn test_quaternion_operations() {
    let q = Quaternion::from_axis_angle(Vector3::unit_y(), PI / 2.0);
    assert_relative_eq!(q.length(), 1.0, epsilon = 1e-12);
    assert_eq!(Quaternion::from_nalgebra(&q.to_nalgebra()), q);

    // x rotated 90 degrees about y lands on -z
    assert_relative_eq!(rotate(q, Vector3::unit_x()), Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);

    let q1 = Quaternion::from_axis_angle(Vector3::unit_x(), PI / 4.0);
    let q2 = Quaternion::from_axis_angle(Vector3::unit_y(), PI / 4.0);
    let v = Vector3::unit_z();
    assert_relative_eq!(rotate(q2 * q1, v), rotate(q2, rotate(q1, v)), epsilon = 1e-12);

    let scaled = Quaternion::new(2.0, 0.0, 0.0, 0.0);
    assert_eq!(scaled.normalize(), Quaternion::identity());
}

#[test]
fn test_quaternion_integration() {
    // One second at pi rad/s about z is a half turn
    let q = Quaternion::identity().integrate(Vector3::new(0.0, 0.0, PI), 1.0);
    assert_relative_eq!(rotate(q, Vector3::unit_x()), -Vector3::unit_x(), epsilon = 1e-12);
    assert_relative_eq!(q.length(), 1.0, epsilon = 1e-12);

    let still = Quaternion::identity().integrate(Vector3::ZERO, 10.0);
    assert_eq!(still, Quaternion::identity());

    // Two half steps equal one full step for a constant spin
    let w = Vector3::new(0.3, -1.2, 4.0);
    let once = Quaternion::identity().integrate(w, 0.5);
    let twice = Quaternion::identity().integrate(w, 0.25).integrate(w, 0.25);
    let p = Vector3::new(0.2, 0.7, -0.4);
    assert_relative_eq!(rotate(once, p), rotate(twice, p), epsilon = 1e-12);
}

#[test]
fn test_aabb_operations() {
    let aabb = Aabb::new(Vector3::new(-1.0, -2.0, 0.0), Vector3::new(1.0, 2.0, 0.0));

    // Height is ignored for footprint tests
    assert!(aabb.contains_xy(Vector3::new(0.5, 1.0, 3.0)));
    assert!(!aabb.contains_xy(Vector3::new(2.0, 0.0, 0.0)));

    let grown = aabb.expand(0.5);
    assert!(grown.contains_xy(Vector3::new(1.4, -2.4, 0.0)));
    assert!(!grown.contains_xy(Vector3::new(1.6, 0.0, 0.0)));

    let bounds = Aabb::from_points(&[Vector3::new(5.0, 0.0, 0.0), Vector3::new(-1.0, 2.0, 0.1)]).unwrap();
    assert_eq!(bounds.min, Vector3::new(-1.0, 0.0, 0.0));
    assert_eq!(bounds.max, Vector3::new(5.0, 2.0, 0.1));
}

#[test]
fn test_quadratic_roots() {
    // 2(t - 0.5)(t - 2) = 2t² - 5t + 2
    let roots = quadratic(2.0, -5.0, 2.0);
    assert_eq!(roots.len(), 2);
    assert_relative_eq!(roots[0], 0.5, epsilon = 1e-12);
    assert_relative_eq!(roots[1], 2.0, epsilon = 1e-12);

    // Large b with tiny c still yields an accurate small root
    let roots = quadratic(1.0, -1e8, 1.0);
    assert_relative_eq!(roots[0], 1e-8, max_relative = 1e-9);

    assert_eq!(smallest_root_in(2.0, -5.0, 2.0, 0.0, 1.0, true), Some(0.5));
    assert_eq!(smallest_root_in(2.0, -5.0, 2.0, 0.5, 1.0, false), None);
    assert_eq!(smallest_root_in(2.0, -5.0, 2.0, 0.5, 3.0, false), Some(2.0));
}
