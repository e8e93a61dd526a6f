//! Render output: local-space vertices, vertex normals, and bounds.

use crate::float::Float;
use crate::particle::Particle;
use crate::transform::Transform;
use crate::vec::{Vec, Vec2, Vec3};
use alloc::vec;
use alloc::vec::Vec as AllocVec;

/// Axis-aligned bounding box in the cloth's local space.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Bounds<F: Float> {
    pub min: Vec3<F>,
    pub max: Vec3<F>,
}

impl<F: Float> Bounds<F> {
    /// Smallest box containing every point; an empty slice gives a zero box.
    pub fn from_points(points: &[Vec3<F>]) -> Self {
        let Some(&first) = points.first() else {
            return Bounds::default();
        };
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)));
        Bounds { min, max }
    }

    pub fn center(&self) -> Vec3<F> {
        (self.min + self.max).scale(F::half())
    }

    pub fn extents(&self) -> Vec3<F> {
        (self.max - self.min).scale(F::half())
    }

    pub fn contains(&self, p: Vec3<F>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x
            && p.y >= self.min.y && p.y <= self.max.y
            && p.z >= self.min.z && p.z <= self.max.z
    }
}

/// The triangle mesh a renderer draws. UVs and indices are fixed per
/// rebuild; vertices, normals and bounds are rewritten every tick.
#[derive(Clone, Debug, Default)]
pub struct ClothMesh<F: Float> {
    pub vertices: AllocVec<Vec3<F>>,
    pub normals: AllocVec<Vec3<F>>,
    pub uvs: AllocVec<Vec2<F>>,
    pub indices: AllocVec<u32>,
    pub bounds: Bounds<F>,
}

impl<F: Float> ClothMesh<F> {
    /// A mesh over fixed topology, with its first vertex/normal/bounds pass done.
    pub fn new(vertices: AllocVec<Vec3<F>>, uvs: AllocVec<Vec2<F>>, indices: AllocVec<u32>) -> Self {
        let mut mesh = ClothMesh {
            normals: vec![Vec3::zero(); vertices.len()],
            vertices,
            uvs,
            indices,
            bounds: Bounds::default(),
        };
        mesh.recalculate_normals();
        mesh.recalculate_bounds();
        mesh
    }

    /// Copy particle positions into local space and refresh normals and bounds.
    pub fn sync(&mut self, particles: &[Particle<F>], transform: &Transform<F>) {
        for (v, p) in self.vertices.iter_mut().zip(particles) {
            *v = transform.inverse_transform_point(p.pos);
        }
        self.recalculate_normals();
        self.recalculate_bounds();
    }

    /// Area-weighted vertex normals: each triangle adds its unnormalized face
    /// normal to its three corners.
    pub fn recalculate_normals(&mut self) {
        self.normals.clear();
        self.normals.resize(self.vertices.len(), Vec3::zero());
        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let pa = self.vertices[a];
            let face = (self.vertices[b] - pa).cross(self.vertices[c] - pa);
            for i in [a, b, c] {
                self.normals[i] = self.normals[i] + face;
            }
        }
        for n in self.normals.iter_mut() {
            *n = n.normalize();
        }
    }

    pub fn recalculate_bounds(&mut self) {
        self.bounds = Bounds::from_points(&self.vertices);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flat `[x0, y0, z0, x1, ...]` vertex buffer.
    pub fn flat_vertices(&self) -> AllocVec<F> {
        self.vertices.iter().flat_map(|v| [v.x, v.y, v.z]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> ClothMesh<f32> {
        let vertices = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
        ];
        let uvs = vec![Vec2::zero(); 4];
        ClothMesh::new(vertices, uvs, vec![0, 3, 2, 0, 1, 3])
    }

    #[test]
    fn flat_quad_normals_agree() {
        let mesh = quad();
        for n in &mesh.normals {
            assert!((n.length() - 1.0).abs() < 1e-6);
            assert!((n.z + 1.0).abs() < 1e-6, "normal {:?}", n);
        }
    }

    #[test]
    fn bounds_cover_vertices() {
        let mesh = quad();
        assert_eq!(mesh.bounds.min, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(mesh.bounds.max, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.bounds.center(), Vec3::new(0.5, -0.5, 0.0));
        assert!(mesh.vertices.iter().all(|&v| mesh.bounds.contains(v)));
    }

    #[test]
    fn sync_maps_world_to_local() {
        let mut mesh = quad();
        let t = Transform::from_translation(Vec3::new(10.0f32, 0.0, 0.0));
        let particles: vec::Vec<_> = mesh
            .vertices
            .iter()
            .map(|&v| Particle::new(t.transform_point(v + Vec3::new(0.0, 0.0, 0.5))))
            .collect();
        mesh.sync(&particles, &t);
        assert_eq!(mesh.vertices[3], Vec3::new(1.0, -1.0, 0.5));
        assert_eq!(mesh.bounds.min.z, 0.5);
    }

    #[test]
    fn empty_bounds_are_zero() {
        let b = Bounds::<f32>::from_points(&[]);
        assert_eq!(b, Bounds::default());
    }
}
