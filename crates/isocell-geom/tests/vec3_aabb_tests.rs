use isocell_geom::{Aabb, Vec3};

fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn vec3_approx_eq(a: Vec3, b: Vec3, eps: f32) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps) && approx_eq(a.z, b.z, eps)
}

#[test]
fn vec3_constants() {
    assert!(vec3_approx_eq(Vec3::ZERO, Vec3::new(0.0, 0.0, 0.0), 1e-6));
    assert!(vec3_approx_eq(Vec3::ONE, Vec3::splat(1.0), 1e-6));
    assert!(vec3_approx_eq(Vec3::UP, Vec3::new(0.0, 1.0, 0.0), 1e-6));
}

#[test]
fn vec3_add_sub_neg() {
    let a = Vec3::new(1.0, 2.0, 3.0);
    let b = Vec3::new(-4.0, 5.0, -6.0);
    let c = a + b;
    assert!(vec3_approx_eq(c, Vec3::new(-3.0, 7.0, -3.0), 1e-6));
    assert!(vec3_approx_eq(c - a, b, 1e-6));
    assert!(vec3_approx_eq(-a, Vec3::new(-1.0, -2.0, -3.0), 1e-6));

    let mut v = Vec3::ONE;
    v += Vec3::new(2.0, 3.0, 4.0);
    v -= Vec3::new(1.0, 2.0, 3.0);
    assert!(vec3_approx_eq(v, Vec3::splat(2.0), 1e-6));
}

#[test]
fn vec3_dot_length_normalized() {
    let v = Vec3::new(3.0, 4.0, 0.0);
    assert!(approx_eq(v.dot(v), 25.0, 1e-6));
    assert!(approx_eq(v.length(), 5.0, 1e-6));
    assert!(vec3_approx_eq(v.normalized(), Vec3::new(0.6, 0.8, 0.0), 1e-6));

    // Zero vector normalization is a no-op, not NaN
    assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
}

#[test]
fn vec3_cross_basis() {
    let i = Vec3::new(1.0, 0.0, 0.0);
    let j = Vec3::new(0.0, 1.0, 0.0);
    let k = Vec3::new(0.0, 0.0, 1.0);
    assert_eq!(i.cross(j), k);
    assert_eq!(j.cross(k), i);
    assert_eq!(k.cross(i), j);
}

#[test]
fn vec3_lerp_midpoint_and_endpoints() {
    let a = Vec3::new(0.0, 0.0, 0.0);
    let b = Vec3::new(2.0, -4.0, 8.0);
    assert_eq!(a.lerp(b, 0.0), a);
    assert_eq!(a.lerp(b, 1.0), b);
    assert_eq!(a.lerp(b, 0.5), Vec3::new(1.0, -2.0, 4.0));
}

#[test]
fn vec3_min_max_componentwise() {
    let a = Vec3::new(1.0, 5.0, -2.0);
    let b = Vec3::new(3.0, -1.0, -2.5);
    assert_eq!(a.min(b), Vec3::new(1.0, -1.0, -2.5));
    assert_eq!(a.max(b), Vec3::new(3.0, 5.0, -2.0));
    assert_eq!(Vec3::from([1.0, 2.0, 3.0]).to_array(), [1.0, 2.0, 3.0]);
}

#[test]
fn aabb_from_points_and_contains() {
    let pts = [
        Vec3::new(-1.0, 0.0, 1.0),
        Vec3::new(2.0, 3.0, 4.0),
        Vec3::new(0.5, -2.0, 0.0),
    ];
    let aabb = Aabb::from_points(&pts).unwrap();
    assert_eq!(aabb.min, Vec3::new(-1.0, -2.0, 0.0));
    assert_eq!(aabb.max, Vec3::new(2.0, 3.0, 4.0));
    assert_eq!(aabb.size(), Vec3::new(3.0, 5.0, 4.0));
    assert_eq!(aabb.center(), Vec3::new(0.5, 0.5, 2.0));
    for p in pts {
        assert!(aabb.contains(p));
    }
    assert!(!aabb.contains(Vec3::new(2.1, 0.0, 0.0)));
}

#[test]
fn aabb_union() {
    let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
    let b = Aabb::new(Vec3::splat(-1.0), Vec3::splat(0.5));
    let u = a.union(b);
    assert_eq!(u, Aabb::new(Vec3::splat(-1.0), Vec3::ONE));
}
