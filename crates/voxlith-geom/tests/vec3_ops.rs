use proptest::prelude::*;
use voxlith_geom::Vec3;

fn vec3() -> impl Strategy<Value = Vec3> {
    (-64.0f32..64.0, -64.0f32..64.0, -64.0f32..64.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

#[test]
fn quad_edges_give_outward_normal() {
    // Counter-clockwise seen from above, like a top face.
    let a = Vec3::new(0.0, 1.0, 0.0);
    let b = Vec3::new(0.0, 1.0, 1.0);
    let c = Vec3::new(1.0, 1.0, 1.0);
    assert_eq!((b - a).cross(c - a).normalized(), Vec3::UP);
}

#[test]
fn zero_vector_normalizes_to_zero() {
    assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
}

#[test]
fn add_assign_matches_add() {
    let mut p = Vec3::new(1.0, 2.0, 3.0);
    p += Vec3::new(0.5, -2.0, 1.0);
    assert_eq!(p, Vec3::new(1.5, 0.0, 4.0));
}

proptest! {
    #[test]
    fn cross_is_orthogonal_to_inputs(a in vec3(), b in vec3()) {
        let c = a.cross(b);
        let tol = 1e-3 * (1.0 + a.length() * b.length() * (a.length() + b.length()));
        prop_assert!(c.dot(a).abs() <= tol);
        prop_assert!(c.dot(b).abs() <= tol);
    }

    #[test]
    fn normalized_has_unit_length(v in vec3()) {
        prop_assume!(v.length() > 1e-3);
        prop_assert!((v.normalized().length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn sub_undoes_add(a in vec3(), b in vec3()) {
        let r = (a + b) - b;
        prop_assert!((r - a).length() < 1e-3);
    }
}

#[test]
fn scaling_then_dividing_restores_vector() {
    let v = Vec3::new(0.25, -0.5, 1.0);
    assert_eq!((v * 4.0) / 4.0, v);
}
