//! Narrow-phase collision tests
//!
//! One exact test per pair of primitive shapes. Every test follows the same
//! convention: the contact normal points from the first argument toward the
//! second, and a pair that merely touches (zero penetration) is reported as
//! no collision. The [`dispatch`](crate::dispatch) module resolves
//! [`ColliderShape`](crate::shapes::ColliderShape) pairs onto these functions.
//!
//! Also provides collision filtering via layer masks.

use bitflags::bitflags;

use crate::shapes::{Aabb, BoundingCapsule, BoundingSphere, Triangle, TriangleMesh};
use broadleaf_math::Vec3;

/// Distances below this are treated as zero when deriving a normal
const DEGENERATE_EPSILON: f32 = 1e-6;

bitflags! {
    /// Collision layers for filtering which objects can collide
    ///
    /// Each layer is a bit in a 32-bit mask. Objects can belong to multiple layers
    /// and can define which layers they collide with via a collision mask.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct CollisionLayer: u32 {
        /// Default layer for most objects
        const DEFAULT = 1 << 0;
        /// Player character layer
        const PLAYER = 1 << 1;
        /// Enemy/NPC layer
        const ENEMY = 1 << 2;
        /// Static world geometry (floors, walls)
        const STATIC = 1 << 3;
        /// Trigger zones (detect but don't push)
        const TRIGGER = 1 << 4;
        /// Projectiles (bullets, spells)
        const PROJECTILE = 1 << 5;
        /// Collectible items (coins, powerups)
        const PICKUP = 1 << 6;
        /// All layers (collide with everything)
        const ALL = 0xFFFFFFFF;
    }
}

/// Collision filter determining what an object collides with
///
/// Two objects A and B collide if `(A.layer & B.mask) != 0` and
/// `(B.layer & A.mask) != 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionFilter {
    /// Which layer(s) this object belongs to
    pub layer: CollisionLayer,
    /// Which layer(s) this object can collide with
    pub mask: CollisionLayer,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            layer: CollisionLayer::DEFAULT,
            mask: CollisionLayer::ALL,
        }
    }
}

impl CollisionFilter {
    /// Create a new collision filter with specified layer and mask
    pub fn new(layer: CollisionLayer, mask: CollisionLayer) -> Self {
        Self { layer, mask }
    }

    /// Check if this filter allows collision with another filter
    pub fn collides_with(&self, other: &Self) -> bool {
        self.layer.intersects(other.mask) && other.layer.intersects(self.mask)
    }

    /// Check whether this object is visible to a query restricted to `mask`
    pub fn matches_query(&self, mask: CollisionLayer) -> bool {
        self.layer.intersects(mask)
    }

    /// Players collide with everything except other players and projectiles
    pub fn player() -> Self {
        Self {
            layer: CollisionLayer::PLAYER,
            mask: CollisionLayer::ALL & !CollisionLayer::PLAYER & !CollisionLayer::PROJECTILE,
        }
    }

    /// Enemies collide with everything except other enemies
    pub fn enemy() -> Self {
        Self {
            layer: CollisionLayer::ENEMY,
            mask: CollisionLayer::ALL & !CollisionLayer::ENEMY,
        }
    }

    /// Static world geometry
    pub fn static_world() -> Self {
        Self {
            layer: CollisionLayer::STATIC,
            mask: CollisionLayer::ALL,
        }
    }

    /// Trigger zone detecting the given layers
    pub fn trigger(detects: CollisionLayer) -> Self {
        Self {
            layer: CollisionLayer::TRIGGER,
            mask: detects,
        }
    }

    /// Player projectiles hit enemies and static geometry only
    pub fn player_projectile() -> Self {
        Self {
            layer: CollisionLayer::PROJECTILE,
            mask: CollisionLayer::ENEMY | CollisionLayer::STATIC,
        }
    }
}

/// Contact information from a collision
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Representative point of contact
    pub point: Vec3,
    /// Unit normal pointing from the first shape toward the second
    pub normal: Vec3,
    /// Penetration depth (always positive for a reported contact)
    pub penetration: f32,
}

/// Result of a narrow-phase test: `None` means no collision
pub type CollisionManifold = Option<Contact>;

impl Contact {
    /// Create a new contact
    pub fn new(point: Vec3, normal: Vec3, penetration: f32) -> Self {
        Self {
            point,
            normal,
            penetration,
        }
    }

    /// The same contact seen from the other shape
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            ..self
        }
    }
}

/// Test AABB vs AABB collision
///
/// Picks the smallest of the six half-axis overlap depths as the resolving
/// axis. This is the minimum-translation heuristic rather than a full SAT.
pub fn aabb_vs_aabb(a: &Aabb, b: &Aabb) -> CollisionManifold {
    for i in 0..3 {
        if a.max[i] <= b.min[i] || b.max[i] <= a.min[i] {
            return None;
        }
    }

    let mut best_depth = f32::INFINITY;
    let mut normal = Vec3::Y;
    for i in 0..3 {
        // Depth if B is pushed toward +axis, and toward -axis
        let push_positive = a.max[i] - b.min[i];
        let push_negative = b.max[i] - a.min[i];
        let (depth, sign) = if push_negative < push_positive {
            (push_negative, -1.0)
        } else {
            (push_positive, 1.0)
        };
        if depth < best_depth {
            best_depth = depth;
            normal = Vec3::ZERO;
            normal[i] = sign;
        }
    }

    // Contact point is at the center of the overlap region
    let overlap_min = a.min.max_components(b.min);
    let overlap_max = a.max.min_components(b.max);
    let point = (overlap_min + overlap_max) * 0.5;

    Some(Contact::new(point, normal, best_depth))
}

/// Test sphere vs sphere collision
///
/// Coincident centers fall back to a +Y normal.
pub fn sphere_vs_sphere(a: &BoundingSphere, b: &BoundingSphere) -> CollisionManifold {
    let delta = b.center - a.center;
    let dist_sq = delta.length_squared();
    let sum = a.radius + b.radius;

    if dist_sq >= sum * sum {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = delta.normalized_or(Vec3::Y, DEGENERATE_EPSILON);
    let penetration = sum - dist;
    // Midway through the overlapping region
    let point = a.center + normal * (a.radius - penetration * 0.5);

    Some(Contact::new(point, normal, penetration))
}

/// Test AABB vs sphere collision
///
/// The normal runs from the closest point on the box toward the sphere
/// center. A center inside the box escapes through the nearest face.
pub fn aabb_vs_sphere(aabb: &Aabb, sphere: &BoundingSphere) -> CollisionManifold {
    let closest = aabb.closest_point(sphere.center);
    let delta = sphere.center - closest;
    let dist_sq = delta.length_squared();

    if dist_sq > DEGENERATE_EPSILON * DEGENERATE_EPSILON {
        if dist_sq >= sphere.radius * sphere.radius {
            return None;
        }
        let dist = dist_sq.sqrt();
        return Some(Contact::new(closest, delta / dist, sphere.radius - dist));
    }

    // Center inside (or on) the box: shortest way out
    let to_min = sphere.center - aabb.min;
    let to_max = aabb.max - sphere.center;
    let mut face_dist = f32::INFINITY;
    let mut normal = Vec3::Y;
    for i in 0..3 {
        if to_max[i] < face_dist {
            face_dist = to_max[i];
            normal = Vec3::ZERO;
            normal[i] = 1.0;
        }
        if to_min[i] < face_dist {
            face_dist = to_min[i];
            normal = Vec3::ZERO;
            normal[i] = -1.0;
        }
    }

    let point = sphere.center + normal * face_dist;
    Some(Contact::new(point, normal, sphere.radius + face_dist))
}

/// Test sphere vs capsule collision via the closest point on the capsule's core segment
pub fn sphere_vs_capsule(sphere: &BoundingSphere, capsule: &BoundingCapsule) -> CollisionManifold {
    let core = capsule.closest_point_on_segment(sphere.center);
    sphere_vs_sphere(sphere, &BoundingSphere::new(core, capsule.radius))
}

/// Test AABB vs capsule collision
///
/// Alternates between clamping onto the box and projecting onto the segment
/// to find the segment point nearest the box, then runs the sphere test there.
pub fn aabb_vs_capsule(aabb: &Aabb, capsule: &BoundingCapsule) -> CollisionManifold {
    let mut core = capsule.closest_point_on_segment(aabb.center());
    for _ in 0..3 {
        let on_box = aabb.closest_point(core);
        core = capsule.closest_point_on_segment(on_box);
    }
    aabb_vs_sphere(aabb, &BoundingSphere::new(core, capsule.radius))
}

/// Test capsule vs capsule collision using the closest points between the core segments
pub fn capsule_vs_capsule(a: &BoundingCapsule, b: &BoundingCapsule) -> CollisionManifold {
    let (a0, a1) = a.endpoints();
    let (b0, b1) = b.endpoints();
    let (p, q) = closest_points_between_segments(a0, a1, b0, b1);
    sphere_vs_sphere(
        &BoundingSphere::new(p, a.radius),
        &BoundingSphere::new(q, b.radius),
    )
}

/// Closest points between segments `[p0, p1]` and `[q0, q1]`
///
/// Handles either or both segments degenerating to a point and parallel segments.
pub fn closest_points_between_segments(p0: Vec3, p1: Vec3, q0: Vec3, q1: Vec3) -> (Vec3, Vec3) {
    const EPS: f32 = 1e-12;

    let d1 = p1 - p0;
    let d2 = q1 - q0;
    let r = p0 - q0;
    let a = d1.dot(d1);
    let e = d2.dot(d2);
    let f = d2.dot(r);

    if a <= EPS && e <= EPS {
        return (p0, q0);
    }

    let (s, t);
    if a <= EPS {
        s = 0.0;
        t = (f / e).clamp(0.0, 1.0);
    } else {
        let c = d1.dot(r);
        if e <= EPS {
            t = 0.0;
            s = (-c / a).clamp(0.0, 1.0);
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;
            let s0 = if denom > EPS {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                // Parallel: any s works, pick the start
                0.0
            };
            let t0 = (b * s0 + f) / e;
            if t0 < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t0 > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            } else {
                t = t0;
                s = s0;
            }
        }
    }

    (p0 + d1 * s, q0 + d2 * t)
}

/// Test sphere vs triangle collision
///
/// The normal points from the sphere toward the triangle. A sphere center
/// lying on the triangle uses the reversed face normal.
pub fn sphere_vs_triangle(sphere: &BoundingSphere, triangle: &Triangle) -> CollisionManifold {
    let closest = triangle.closest_point(sphere.center);
    let delta = closest - sphere.center;
    let dist_sq = delta.length_squared();

    if dist_sq >= sphere.radius * sphere.radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > DEGENERATE_EPSILON {
        delta / dist
    } else {
        -triangle.normal().unwrap_or(Vec3::Y)
    };

    Some(Contact::new(closest, normal, sphere.radius - dist))
}

/// Test sphere vs triangle mesh, keeping only the deepest triangle contact
pub fn sphere_vs_mesh(sphere: &BoundingSphere, mesh: &TriangleMesh) -> CollisionManifold {
    if !mesh.bounds().overlaps(&sphere.bounds()) {
        return None;
    }

    let mut deepest: CollisionManifold = None;
    for triangle in mesh.triangles() {
        if let Some(contact) = sphere_vs_triangle(sphere, &triangle) {
            let deeper = deepest.map_or(true, |d| contact.penetration > d.penetration);
            if deeper {
                deepest = Some(contact);
            }
        }
    }
    deepest
}

/// Test AABB vs triangle mesh using the box's enclosing sphere
pub fn aabb_vs_mesh(aabb: &Aabb, mesh: &TriangleMesh) -> CollisionManifold {
    let enclosing = BoundingSphere::new(aabb.center(), aabb.half_extents().length());
    sphere_vs_mesh(&enclosing, mesh)
}
