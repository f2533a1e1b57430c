//! Shape-pair dispatch for the narrow phase
//!
//! Maps a pair of posed [`ColliderShape`]s onto the matching test in
//! [`collision`](crate::collision). Each unordered pair has one canonical
//! test; the reversed ordering runs the same test with swapped arguments and
//! flips the resulting normal, so `test_collision(a, b)` and
//! `test_collision(b, a)` always report opposite normals and equal depths.
//! Pairs of the same kind are put into a fixed order by comparing the shapes'
//! parameters, since their tests fall back to a fixed axis when the shapes
//! are concentric.

use crate::collision::{
    aabb_vs_aabb, aabb_vs_capsule, aabb_vs_mesh, aabb_vs_sphere, capsule_vs_capsule, sphere_vs_capsule,
    sphere_vs_mesh, sphere_vs_sphere, CollisionManifold, Contact,
};
use crate::shapes::{self, ColliderShape, Pose};
use std::cmp::Ordering;

/// Test two shapes for collision after placing each with its pose
///
/// The returned normal points from `a` toward `b`. Capsule/mesh and
/// mesh/mesh pairs are not supported and report no collision.
pub fn test_collision(a: &ColliderShape, pose_a: &Pose, b: &ColliderShape, pose_b: &Pose) -> CollisionManifold {
    let a = a.transformed(pose_a);
    let b = b.transformed(pose_b);
    test_world_shapes(&a, &b)
}

/// Test two shapes that are already in world space
pub fn test_world_shapes(a: &ColliderShape, b: &ColliderShape) -> CollisionManifold {
    use ColliderShape::{Aabb, Capsule, Mesh, Sphere};

    match (a, b) {
        (Aabb(a), Aabb(b)) => in_order(a, b, aabb_key, aabb_vs_aabb),
        (Aabb(a), Sphere(b)) => aabb_vs_sphere(a, b),
        (Aabb(a), Capsule(b)) => aabb_vs_capsule(a, b),
        (Aabb(a), Mesh(b)) => aabb_vs_mesh(a, b),

        (Sphere(a), Aabb(b)) => aabb_vs_sphere(b, a).map(Contact::flipped),
        (Sphere(a), Sphere(b)) => in_order(a, b, sphere_key, sphere_vs_sphere),
        (Sphere(a), Capsule(b)) => sphere_vs_capsule(a, b),
        (Sphere(a), Mesh(b)) => sphere_vs_mesh(a, b),

        (Capsule(a), Aabb(b)) => aabb_vs_capsule(b, a).map(Contact::flipped),
        (Capsule(a), Sphere(b)) => sphere_vs_capsule(b, a).map(Contact::flipped),
        (Capsule(a), Capsule(b)) => in_order(a, b, capsule_key, capsule_vs_capsule),
        (Capsule(_), Mesh(_)) => None,

        (Mesh(a), Aabb(b)) => aabb_vs_mesh(b, a).map(Contact::flipped),
        (Mesh(a), Sphere(b)) => sphere_vs_mesh(b, a).map(Contact::flipped),
        (Mesh(_), Capsule(_)) => None,
        (Mesh(_), Mesh(_)) => None,
    }
}

/// Run a same-kind test with the lesser shape first, flipping if swapped
fn in_order<S, const N: usize>(
    a: &S,
    b: &S,
    key: fn(&S) -> [f32; N],
    test: fn(&S, &S) -> CollisionManifold,
) -> CollisionManifold {
    let ordering = key(a)
        .iter()
        .zip(key(b).iter())
        .map(|(x, y)| x.total_cmp(y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal);
    match ordering {
        Ordering::Greater => test(b, a).map(Contact::flipped),
        _ => test(a, b),
    }
}

fn aabb_key(aabb: &shapes::Aabb) -> [f32; 6] {
    let (min, max) = (aabb.min, aabb.max);
    [min.x, min.y, min.z, max.x, max.y, max.z]
}

fn sphere_key(sphere: &shapes::BoundingSphere) -> [f32; 4] {
    let c = sphere.center;
    [c.x, c.y, c.z, sphere.radius]
}

fn capsule_key(capsule: &shapes::BoundingCapsule) -> [f32; 6] {
    let c = capsule.center;
    [
        c.x,
        c.y,
        c.z,
        capsule.radius,
        capsule.half_height,
        capsule.axis.index() as f32,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Aabb, BoundingCapsule, BoundingSphere, TriangleMesh};
    use broadleaf_math::{Axis, Vec3};
    use proptest::prelude::*;

    fn unit_box() -> ColliderShape {
        Aabb::from_center_half_extents(Vec3::ZERO, Vec3::splat(0.5)).into()
    }

    fn ball(radius: f32) -> ColliderShape {
        BoundingSphere::new(Vec3::ZERO, radius).into()
    }

    fn pill() -> ColliderShape {
        BoundingCapsule::new(Vec3::ZERO, 0.5, 1.0, Axis::Y).into()
    }

    fn floor() -> ColliderShape {
        TriangleMesh::quad_xz(0.0, 10.0).into()
    }

    fn assert_symmetric(a: &ColliderShape, pa: &Pose, b: &ColliderShape, pb: &Pose) {
        let ab = test_collision(a, pa, b, pb).expect("a vs b should collide");
        let ba = test_collision(b, pb, a, pa).expect("b vs a should collide");
        assert!((ab.normal + ba.normal).length() < 1e-4, "{:?} vs {:?}", ab.normal, ba.normal);
        assert!((ab.penetration - ba.penetration).abs() < 1e-4);
    }

    #[test]
    fn test_box_box_via_poses() {
        let contact = test_collision(
            &unit_box(),
            &Pose::at(Vec3::ZERO),
            &unit_box(),
            &Pose::at(Vec3::new(0.8, 0.0, 0.0)),
        )
        .expect("Should collide");
        assert_eq!(contact.normal, Vec3::X);
        assert!((contact.penetration - 0.2).abs() < 1e-5);
    }

    #[test]
    fn test_pose_scale_applies() {
        // Scaled by 2 the box reaches x = 1.0 and overlaps a sphere at 1.3
        let scaled = Pose::new(Vec3::ZERO, Vec3::splat(2.0));
        let contact = test_collision(&unit_box(), &scaled, &ball(0.5), &Pose::at(Vec3::new(1.3, 0.0, 0.0)))
            .expect("Should collide");
        assert!((contact.penetration - 0.2).abs() < 1e-5);

        assert!(test_collision(&unit_box(), &Pose::identity(), &ball(0.5), &Pose::at(Vec3::new(1.3, 0.0, 0.0))).is_none());
    }

    #[test]
    fn test_touching_boxes_do_not_collide() {
        assert!(test_collision(&unit_box(), &Pose::identity(), &unit_box(), &Pose::at(Vec3::X)).is_none());
    }

    #[test]
    fn test_box_sphere_symmetry() {
        assert_symmetric(
            &unit_box(),
            &Pose::identity(),
            &ball(0.5),
            &Pose::at(Vec3::new(0.3, 0.8, 0.1)),
        );
    }

    #[test]
    fn test_box_box_symmetry() {
        assert_symmetric(
            &unit_box(),
            &Pose::identity(),
            &unit_box(),
            &Pose::at(Vec3::new(0.2, 0.7, 0.1)),
        );
    }

    #[test]
    fn test_concentric_boxes_flip_with_order() {
        let big: ColliderShape = Aabb::from_center_half_extents(Vec3::ZERO, Vec3::ONE).into();
        assert_symmetric(&big, &Pose::identity(), &unit_box(), &Pose::identity());

        let ab = test_collision(&big, &Pose::identity(), &unit_box(), &Pose::identity()).unwrap();
        assert!((ab.penetration - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_concentric_spheres_and_capsules_flip_with_order() {
        assert_symmetric(&ball(1.0), &Pose::identity(), &ball(0.5), &Pose::identity());

        let thin: ColliderShape = BoundingCapsule::new(Vec3::ZERO, 0.25, 1.0, Axis::Y).into();
        assert_symmetric(&pill(), &Pose::identity(), &thin, &Pose::identity());
    }

    #[test]
    fn test_identical_shapes_are_deterministic() {
        let at = Pose::at(Vec3::new(1.0, 2.0, 3.0));
        let first = test_collision(&unit_box(), &at, &unit_box(), &at).expect("Should collide");
        let second = test_collision(&unit_box(), &at, &unit_box(), &at).expect("Should collide");
        assert_eq!(first, second);
        assert!((first.penetration - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_capsule_symmetry() {
        assert_symmetric(&ball(0.5), &Pose::at(Vec3::new(0.8, 0.5, 0.0)), &pill(), &Pose::identity());
    }

    #[test]
    fn test_box_capsule_symmetry() {
        assert_symmetric(&unit_box(), &Pose::at(Vec3::new(0.9, 0.2, 0.0)), &pill(), &Pose::identity());
    }

    #[test]
    fn test_capsule_capsule_symmetry() {
        let lying: ColliderShape = BoundingCapsule::new(Vec3::ZERO, 0.5, 1.0, Axis::X).into();
        assert_symmetric(&pill(), &Pose::identity(), &lying, &Pose::at(Vec3::new(0.0, 0.3, 0.7)));
    }

    #[test]
    fn test_sphere_mesh_symmetry() {
        assert_symmetric(&ball(0.5), &Pose::at(Vec3::new(1.0, 0.3, 2.0)), &floor(), &Pose::identity());
    }

    #[test]
    fn test_box_mesh_symmetry() {
        assert_symmetric(&unit_box(), &Pose::at(Vec3::new(0.0, 0.5, 0.0)), &floor(), &Pose::identity());
    }

    #[test]
    fn test_sphere_resting_on_floor_normal() {
        // Sphere above the floor: normal from sphere toward the mesh is down
        let contact = test_collision(&ball(0.5), &Pose::at(Vec3::new(0.0, 0.4, 0.0)), &floor(), &Pose::identity())
            .expect("Should collide");
        assert!((contact.normal - (-Vec3::Y)).length() < 1e-5);
        assert!((contact.penetration - 0.1).abs() < 1e-5);

        // From the mesh's side the normal points up at the sphere
        let flipped = test_collision(&floor(), &Pose::identity(), &ball(0.5), &Pose::at(Vec3::new(0.0, 0.4, 0.0)))
            .expect("Should collide");
        assert!((flipped.normal - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_unsupported_pairs_report_nothing() {
        let overlapping = Pose::identity();
        assert!(test_collision(&pill(), &overlapping, &floor(), &overlapping).is_none());
        assert!(test_collision(&floor(), &overlapping, &pill(), &overlapping).is_none());
        assert!(test_collision(&floor(), &overlapping, &floor(), &overlapping).is_none());
    }

    #[test]
    fn test_local_offsets_inside_shapes() {
        // A sphere whose local center is offset upward by 2 misses a box at the origin
        let offset_ball: ColliderShape = BoundingSphere::new(Vec3::new(0.0, 2.0, 0.0), 0.5).into();
        assert!(test_collision(&unit_box(), &Pose::identity(), &offset_ball, &Pose::identity()).is_none());
        assert!(test_collision(&unit_box(), &Pose::identity(), &offset_ball, &Pose::at(Vec3::new(0.0, -1.2, 0.0))).is_some());
    }

    fn shape_strategy() -> impl Strategy<Value = ColliderShape> {
        prop_oneof![
            (0.1f32..1.5, 0.1f32..1.5, 0.1f32..1.5).prop_map(|(x, y, z)| {
                ColliderShape::from(Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(x, y, z)))
            }),
            (0.1f32..1.5).prop_map(|r| ColliderShape::from(BoundingSphere::new(Vec3::ZERO, r))),
            (0.1f32..1.0, 0.0f32..1.5, 0usize..3).prop_map(|(r, h, i)| {
                ColliderShape::from(BoundingCapsule::new(Vec3::ZERO, r, h, Axis::ALL[i]))
            }),
            (-0.5f32..0.5, 1.0f32..5.0).prop_map(|(y, size)| ColliderShape::from(TriangleMesh::quad_xz(y, size))),
        ]
    }

    fn vec3_strategy(range: f32) -> impl Strategy<Value = Vec3> {
        (-range..range, -range..range, -range..range).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    fn offset_strategy() -> impl Strategy<Value = Vec3> {
        prop_oneof![
            3 => vec3_strategy(2.0),
            1 => Just(Vec3::ZERO),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn prop_reversed_order_flips_normal(
            a in shape_strategy(),
            b in shape_strategy(),
            origin in vec3_strategy(5.0),
            offset in offset_strategy(),
            identical in prop::bool::weighted(0.1),
        ) {
            let (b, offset) = if identical { (a.clone(), Vec3::ZERO) } else { (b, offset) };
            let pose_a = Pose::at(origin);
            let pose_b = Pose::at(origin + offset);

            let ab = test_collision(&a, &pose_a, &b, &pose_b);
            let ba = test_collision(&b, &pose_b, &a, &pose_a);
            prop_assert_eq!(ab.is_some(), ba.is_some());

            if let (Some(ab), Some(ba)) = (ab, ba) {
                prop_assert!((ab.penetration - ba.penetration).abs() < 1e-5);
                if a == b && offset == Vec3::ZERO {
                    // Both orders are the same call
                    prop_assert_eq!(ab, ba);
                } else {
                    prop_assert!(
                        (ab.normal + ba.normal).length() < 1e-5,
                        "{:?} vs {:?}: {:?} / {:?}", a, b, ab.normal, ba.normal
                    );
                }
            }
        }
    }
}
