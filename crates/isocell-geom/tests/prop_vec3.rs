use isocell_geom::{Aabb, Vec3};
use proptest::prelude::*;

fn approx_abs_rel(a: f32, b: f32, atol: f32, rtol: f32) -> bool {
    let diff = (a - b).abs();
    let scale = a.abs().max(b.abs());
    diff <= atol + rtol * scale
}

fn vapprox_abs_rel(a: Vec3, b: Vec3, atol: f32, rtol: f32) -> bool {
    approx_abs_rel(a.x, b.x, atol, rtol)
        && approx_abs_rel(a.y, b.y, atol, rtol)
        && approx_abs_rel(a.z, b.z, atol, rtol)
}

fn coord() -> impl Strategy<Value = f32> {
    -1_000.0f32..1_000.0
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    // a + b == b + a
    #[test]
    fn vec3_add_commutative(a in arb_vec3(), b in arb_vec3()) {
        prop_assert_eq!(a + b, b + a);
    }

    // Cross product is orthogonal to both inputs
    #[test]
    fn vec3_cross_orthogonal(a in arb_vec3(), b in arb_vec3()) {
        let c = a.cross(b);
        let scale = a.length() * b.length() * a.length().max(b.length()).max(1.0);
        prop_assert!(a.dot(c).abs() <= 1e-3 + 1e-5 * scale);
        prop_assert!(b.dot(c).abs() <= 1e-3 + 1e-5 * scale);
    }

    // lerp stays inside the box spanned by its endpoints for t in [0, 1]
    #[test]
    fn vec3_lerp_is_bounded(a in arb_vec3(), b in arb_vec3(), t in 0.0f32..=1.0) {
        let p = a.lerp(b, t);
        let bounds = Aabb::new(a.min(b), a.max(b));
        let slack = Vec3::splat(1e-3);
        let padded = Aabb::new(bounds.min - slack, bounds.max + slack);
        prop_assert!(padded.contains(p), "{:?} not within {:?}", p, bounds);
    }

    // lerp at t = 0 is exact
    #[test]
    fn vec3_lerp_zero_is_exact(a in arb_vec3(), b in arb_vec3()) {
        prop_assert_eq!(a.lerp(b, 0.0), a);
    }

    // Normalized non-zero vectors have unit length
    #[test]
    fn vec3_normalized_length(v in arb_vec3()) {
        prop_assume!(v.length() > 1e-3);
        prop_assert!(approx_abs_rel(v.normalized().length(), 1.0, 1e-4, 0.0));
    }

    // k*(a + b) = k*a + k*b
    #[test]
    fn vec3_scalar_distributivity(a in arb_vec3(), b in arb_vec3(), k in -100.0f32..100.0) {
        prop_assert!(vapprox_abs_rel((a + b) * k, (a * k) + (b * k), 1e-2, 1e-5));
    }

    // Every point used to build a box is contained in it
    #[test]
    fn aabb_contains_its_points(pts in prop::collection::vec(arb_vec3(), 1..16)) {
        let b = Aabb::from_points(&pts).unwrap();
        for p in &pts {
            prop_assert!(b.contains(*p));
        }
    }
}
