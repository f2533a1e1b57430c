//! Collision shapes
//!
//! Lightweight value types used by the broad phase (only [`Aabb`]) and the
//! narrow phase (every variant of [`ColliderShape`]). Shapes are stored in
//! collider-local space; [`Pose`] maps them into world space.

use broadleaf_math::{Axis, Vec3};

/// World placement applied to a local-space shape: per-axis scale, then translation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl Pose {
    pub const fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub const fn new(position: Vec3, scale: Vec3) -> Self {
        Self { position, scale }
    }

    /// Pose with unit scale
    pub const fn at(position: Vec3) -> Self {
        Self::new(position, Vec3::ONE)
    }

    /// Map a local point into world space
    #[inline]
    pub fn apply(&self, p: Vec3) -> Vec3 {
        p.component_mul(self.scale) + self.position
    }

    /// Largest absolute scale component, used to scale radii
    #[inline]
    pub fn uniform_scale(&self) -> f32 {
        self.scale.abs().max_element()
    }
}

/// An axis-aligned bounding box
///
/// Invariant: `min <= max` componentwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner (all components are minimums)
    pub min: Vec3,
    /// Maximum corner (all components are maximums)
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from min and max corners
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an AABB centered at a position with given half-extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Smallest AABB containing both points
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self::new(a.min_components(b), a.max_components(b))
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half-extents (half the size in each dimension)
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Get the full size in each dimension
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Total surface area, the cost metric of the tree's insertion heuristic
    pub fn surface_area(&self) -> f32 {
        let d = self.size();
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }

    /// Check if a point is inside or on the AABB
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Check if `other` lies entirely inside this AABB (shared faces count as inside)
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && self.min.z <= other.min.z
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
            && other.max.z <= self.max.z
    }

    /// Inclusive overlap test: boxes sharing only a face, edge or corner overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Smallest AABB enclosing both boxes
    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min_components(other.min),
            max: self.max.max_components(other.max),
        }
    }

    /// Inflate symmetrically by `margin` on every side
    pub fn fattened(&self, margin: f32) -> Aabb {
        let m = Vec3::splat(margin);
        Aabb {
            min: self.min - m,
            max: self.max + m,
        }
    }

    /// Extend the box in the direction of `displacement` only
    pub fn extended_toward(&self, displacement: Vec3) -> Aabb {
        let mut out = *self;
        for i in 0..3 {
            if displacement[i] < 0.0 {
                out.min[i] += displacement[i];
            } else {
                out.max[i] += displacement[i];
            }
        }
        out
    }

    /// Get the closest point inside or on the AABB to a given point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp_components(self.min, self.max)
    }

    /// Translate the AABB by a delta
    pub fn translated(&self, delta: Vec3) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }

    /// Map the box through a pose. Negative scale components flip the corners.
    pub fn transformed(&self, pose: &Pose) -> Self {
        Self::from_points(pose.apply(self.min), pose.apply(self.max))
    }

    /// Slab test against a ray
    ///
    /// Returns the entry distance along `direction` (which need not be unit
    /// length; distances are in units of `direction`'s length). A ray starting
    /// inside the box hits at distance 0.
    pub fn ray_intersection(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = max_distance;

        for i in 0..3 {
            let o = origin[i];
            let d = direction[i];
            if d.abs() < 1e-8 {
                if o < self.min[i] || o > self.max[i] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (self.min[i] - o) * inv;
            let mut t1 = (self.max[i] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

/// A sphere defined by center and radius
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    /// Create a new sphere; negative radii are clamped to zero
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Check if a point is inside or on the sphere
    pub fn contains(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center_half_extents(self.center, Vec3::splat(self.radius))
    }

    pub fn transformed(&self, pose: &Pose) -> Self {
        Self::new(pose.apply(self.center), self.radius * pose.uniform_scale())
    }
}

/// A capsule: a line segment swept by a sphere
///
/// The core segment runs from `center - axis * half_height` to
/// `center + axis * half_height`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingCapsule {
    pub center: Vec3,
    pub radius: f32,
    pub half_height: f32,
    pub axis: Axis,
}

impl BoundingCapsule {
    pub fn new(center: Vec3, radius: f32, half_height: f32, axis: Axis) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            half_height: half_height.max(0.0),
            axis,
        }
    }

    /// Endpoints of the core segment
    pub fn endpoints(&self) -> (Vec3, Vec3) {
        let offset = self.axis.unit() * self.half_height;
        (self.center - offset, self.center + offset)
    }

    /// Closest point on the core segment to `point`
    pub fn closest_point_on_segment(&self, point: Vec3) -> Vec3 {
        let (a, b) = self.endpoints();
        closest_point_on_segment(a, b, point)
    }

    pub fn bounds(&self) -> Aabb {
        let half = Vec3::splat(self.radius) + self.axis.unit() * self.half_height;
        Aabb::from_center_half_extents(self.center, half)
    }

    /// Radius scales by the largest scale component, half-height by the
    /// scale along the capsule's own axis.
    pub fn transformed(&self, pose: &Pose) -> Self {
        Self::new(
            pose.apply(self.center),
            self.radius * pose.uniform_scale(),
            self.half_height * pose.scale.get(self.axis).abs(),
            self.axis,
        )
    }
}

/// Closest point on segment `[a, b]` to `p`; a zero-length segment yields `a`
pub fn closest_point_on_segment(a: Vec3, b: Vec3, p: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// A single triangle, used while iterating a [`TriangleMesh`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Unit face normal (counter-clockwise winding), or `None` for a zero-area triangle
    pub fn normal(&self) -> Option<Vec3> {
        let n = (self.b - self.a).cross(self.c - self.a);
        let len = n.length();
        if len > 1e-12 {
            Some(n / len)
        } else {
            None
        }
    }

    /// Closest point on the triangle to `p`
    ///
    /// Projects `p` onto the triangle plane and keeps the projection when its
    /// barycentric coordinates are all inside; otherwise takes the nearest of
    /// the three edge candidates.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        if let Some(n) = self.normal() {
            let projected = p - n * (p - self.a).dot(n);
            if let Some((u, v, w)) = self.barycentric(projected) {
                if u >= 0.0 && v >= 0.0 && w >= 0.0 {
                    return projected;
                }
            }
        }

        let candidates = [
            closest_point_on_segment(self.a, self.b, p),
            closest_point_on_segment(self.b, self.c, p),
            closest_point_on_segment(self.c, self.a, p),
        ];
        let mut best = candidates[0];
        let mut best_dist = (best - p).length_squared();
        for &q in &candidates[1..] {
            let d = (q - p).length_squared();
            if d < best_dist {
                best = q;
                best_dist = d;
            }
        }
        best
    }

    /// Barycentric coordinates `(u, v, w)` of a point in the triangle's plane
    fn barycentric(&self, p: Vec3) -> Option<(f32, f32, f32)> {
        let v0 = self.b - self.a;
        let v1 = self.c - self.a;
        let v2 = p - self.a;
        let d00 = v0.dot(v0);
        let d01 = v0.dot(v1);
        let d11 = v1.dot(v1);
        let d20 = v2.dot(v0);
        let d21 = v2.dot(v1);
        let denom = d00 * d11 - d01 * d01;
        if denom.abs() < 1e-12 {
            return None;
        }
        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        Some((1.0 - v - w, v, w))
    }
}

/// A flat triangle soup: vertices plus a stride-3 index list
#[derive(Clone, Debug, PartialEq)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    bounds: Aabb,
}

impl TriangleMesh {
    /// Build a mesh, computing its bounds. Trailing indices that do not form
    /// a full triangle are ignored by [`TriangleMesh::triangles`].
    pub fn new(vertices: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = Self::compute_bounds(&vertices);
        Self {
            vertices,
            indices,
            bounds,
        }
    }

    /// A single axis-aligned quad on the XZ plane at height `y`, facing +Y
    pub fn quad_xz(y: f32, half_size: f32) -> Self {
        let h = half_size;
        Self::new(
            vec![
                Vec3::new(-h, y, -h),
                Vec3::new(h, y, -h),
                Vec3::new(h, y, h),
                Vec3::new(-h, y, h),
            ],
            vec![0, 2, 1, 0, 3, 2],
        )
    }

    fn compute_bounds(vertices: &[Vec3]) -> Aabb {
        let mut iter = vertices.iter();
        let Some(&first) = iter.next() else {
            return Aabb::new(Vec3::ZERO, Vec3::ZERO);
        };
        iter.fold(Aabb::new(first, first), |acc, &v| {
            Aabb::new(acc.min.min_components(v), acc.max.max_components(v))
        })
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Vertex data as raw bytes, for upload by debug-draw collaborators
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate triangles; index triples pointing outside the vertex list are skipped
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).filter_map(move |tri| {
            let a = *self.vertices.get(tri[0] as usize)?;
            let b = *self.vertices.get(tri[1] as usize)?;
            let c = *self.vertices.get(tri[2] as usize)?;
            Some(Triangle::new(a, b, c))
        })
    }

    /// Transform every vertex through `pose`
    pub fn transformed(&self, pose: &Pose) -> Self {
        Self {
            vertices: self.vertices.iter().map(|&v| pose.apply(v)).collect(),
            indices: self.indices.clone(),
            bounds: self.bounds.transformed(pose),
        }
    }
}

/// The shape attached to a collider: exactly one of four primitive kinds
#[derive(Clone, Debug, PartialEq)]
pub enum ColliderShape {
    Aabb(Aabb),
    Sphere(BoundingSphere),
    Capsule(BoundingCapsule),
    Mesh(TriangleMesh),
}

impl ColliderShape {
    /// Short name of the active variant, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            ColliderShape::Aabb(_) => "aabb",
            ColliderShape::Sphere(_) => "sphere",
            ColliderShape::Capsule(_) => "capsule",
            ColliderShape::Mesh(_) => "mesh",
        }
    }

    /// Bounds in local space
    pub fn local_bounds(&self) -> Aabb {
        match self {
            ColliderShape::Aabb(b) => *b,
            ColliderShape::Sphere(s) => s.bounds(),
            ColliderShape::Capsule(c) => c.bounds(),
            ColliderShape::Mesh(m) => m.bounds(),
        }
    }

    /// Bounds after applying `pose`, without materialising transformed mesh vertices
    pub fn world_bounds(&self, pose: &Pose) -> Aabb {
        match self {
            ColliderShape::Aabb(b) => b.transformed(pose),
            ColliderShape::Sphere(s) => s.transformed(pose).bounds(),
            ColliderShape::Capsule(c) => c.transformed(pose).bounds(),
            ColliderShape::Mesh(m) => m.bounds().transformed(pose),
        }
    }

    /// The shape mapped into world space
    pub fn transformed(&self, pose: &Pose) -> ColliderShape {
        match self {
            ColliderShape::Aabb(b) => ColliderShape::Aabb(b.transformed(pose)),
            ColliderShape::Sphere(s) => ColliderShape::Sphere(s.transformed(pose)),
            ColliderShape::Capsule(c) => ColliderShape::Capsule(c.transformed(pose)),
            ColliderShape::Mesh(m) => ColliderShape::Mesh(m.transformed(pose)),
        }
    }
}

impl From<Aabb> for ColliderShape {
    fn from(b: Aabb) -> Self {
        ColliderShape::Aabb(b)
    }
}

impl From<BoundingSphere> for ColliderShape {
    fn from(s: BoundingSphere) -> Self {
        ColliderShape::Sphere(s)
    }
}

impl From<BoundingCapsule> for ColliderShape {
    fn from(c: BoundingCapsule) -> Self {
        ColliderShape::Capsule(c)
    }
}

impl From<TriangleMesh> for ColliderShape {
    fn from(m: TriangleMesh) -> Self {
        ColliderShape::Mesh(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_aabb_from_center_half_extents() {
        let aabb = Aabb::from_center_half_extents(Vec3::new(1.0, 2.0, 3.0), Vec3::splat(0.5));
        assert_eq!(aabb.min, Vec3::new(0.5, 1.5, 2.5));
        assert_eq!(aabb.max, Vec3::new(1.5, 2.5, 3.5));
        assert_eq!(aabb.center(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.half_extents(), Vec3::splat(0.5));
    }

    #[test]
    fn test_aabb_surface_area() {
        let aabb = Aabb::new(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        // 2 * (2 + 6 + 3)
        assert_eq!(aabb.surface_area(), 22.0);
    }

    #[test]
    fn test_aabb_contains() {
        let outer = unit_box();
        assert!(outer.contains(&Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5))));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&Aabb::new(Vec3::splat(0.5), Vec3::splat(1.5))));
        assert!(outer.contains_point(Vec3::splat(1.0))); // corner
        assert!(!outer.contains_point(Vec3::new(1.1, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_overlaps_is_inclusive() {
        let a = unit_box();
        let touching = Aabb::new(Vec3::new(1.0, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0));
        let apart = Aabb::new(Vec3::new(1.5, -1.0, -1.0), Vec3::new(3.0, 1.0, 1.0));
        assert!(a.overlaps(&touching));
        assert!(!a.overlaps(&apart));
    }

    #[test]
    fn test_aabb_merge_and_fatten() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::splat(2.0), Vec3::splat(3.0));
        let m = a.merge(&b);
        assert_eq!(m.min, Vec3::ZERO);
        assert_eq!(m.max, Vec3::splat(3.0));

        let fat = a.fattened(0.1);
        assert_eq!(fat.min, Vec3::splat(-0.1));
        assert_eq!(fat.max, Vec3::splat(1.1));
    }

    #[test]
    fn test_aabb_extended_toward() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let e = a.extended_toward(Vec3::new(2.0, -1.0, 0.0));
        assert_eq!(e.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(e.max, Vec3::new(3.0, 1.0, 1.0));
    }

    #[test]
    fn test_aabb_transformed_negative_scale() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let t = a.transformed(&Pose::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(-2.0, 1.0, 1.0)));
        assert_eq!(t.min, Vec3::new(8.0, 0.0, 0.0));
        assert_eq!(t.max, Vec3::new(10.0, 1.0, 1.0));
    }

    #[test]
    fn test_ray_intersection() {
        let b = unit_box();
        let hit = b.ray_intersection(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 10.0);
        assert!((hit.unwrap() - 4.0).abs() < 1e-5);

        // Too short
        assert!(b.ray_intersection(Vec3::new(0.0, 0.0, -5.0), Vec3::Z, 3.0).is_none());
        // Pointing away
        assert!(b.ray_intersection(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z, 10.0).is_none());
        // Parallel outside slab
        assert!(b.ray_intersection(Vec3::new(2.0, 0.0, -5.0), Vec3::Z, 10.0).is_none());
        // Starting inside
        assert_eq!(b.ray_intersection(Vec3::ZERO, Vec3::X, 10.0), Some(0.0));
    }

    #[test]
    fn test_sphere_transformed_uses_max_scale() {
        let s = BoundingSphere::new(Vec3::new(1.0, 0.0, 0.0), 1.0);
        let t = s.transformed(&Pose::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(2.0, 3.0, 1.0)));
        assert_eq!(t.center, Vec3::new(2.0, 5.0, 0.0));
        assert_eq!(t.radius, 3.0);
    }

    #[test]
    fn test_capsule_endpoints_and_transform() {
        let c = BoundingCapsule::new(Vec3::ZERO, 0.5, 1.0, Axis::Y);
        let (a, b) = c.endpoints();
        assert_eq!(a, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(b, Vec3::new(0.0, 1.0, 0.0));

        let t = c.transformed(&Pose::new(Vec3::ZERO, Vec3::new(2.0, 3.0, 1.0)));
        assert_eq!(t.radius, 1.5);
        assert_eq!(t.half_height, 3.0);

        let bounds = c.bounds();
        assert_eq!(bounds.min, Vec3::new(-0.5, -1.5, -0.5));
        assert_eq!(bounds.max, Vec3::new(0.5, 1.5, 0.5));
    }

    #[test]
    fn test_closest_point_on_degenerate_segment() {
        let p = closest_point_on_segment(Vec3::ONE, Vec3::ONE, Vec3::ZERO);
        assert_eq!(p, Vec3::ONE);
    }

    #[test]
    fn test_triangle_closest_point_inside() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), Vec3::new(2.0, 0.0, 0.0));
        let q = tri.closest_point(Vec3::new(0.5, 3.0, 0.5));
        assert!((q - Vec3::new(0.5, 0.0, 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_triangle_closest_point_edge() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0), Vec3::new(2.0, 0.0, 0.0));
        let q = tri.closest_point(Vec3::new(-1.0, 1.0, 1.0));
        assert!((q - Vec3::new(0.0, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_triangle_degenerate_normal() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert!(tri.normal().is_none());
        // Still resolves to the nearest edge point
        let q = tri.closest_point(Vec3::new(1.0, 1.0, 0.0));
        assert!((q - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_mesh_bounds_and_triangles() {
        let mesh = TriangleMesh::quad_xz(0.0, 5.0);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles().count(), 2);
        assert_eq!(mesh.bounds().min, Vec3::new(-5.0, 0.0, -5.0));
        assert_eq!(mesh.bounds().max, Vec3::new(5.0, 0.0, 5.0));
        assert_eq!(mesh.vertex_bytes().len(), 4 * 3 * 4);

        let up = mesh.triangles().next().and_then(|t| t.normal()).unwrap();
        assert!((up - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_mesh_skips_out_of_range_indices() {
        let mesh = TriangleMesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Z], vec![0, 1, 2, 0, 1, 9, 1]);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.triangles().count(), 1);
    }

    #[test]
    fn test_shape_world_bounds() {
        let pose = Pose::new(Vec3::new(0.0, 10.0, 0.0), Vec3::splat(2.0));
        let mesh: ColliderShape = TriangleMesh::quad_xz(0.0, 1.0).into();
        let b = mesh.world_bounds(&pose);
        assert_eq!(b.min, Vec3::new(-2.0, 10.0, -2.0));
        assert_eq!(b.max, Vec3::new(2.0, 10.0, 2.0));
        assert_eq!(mesh.kind(), "mesh");
    }
}
