#![warn(missing_docs)]

//! Indexed triangle meshes and the geometric operations applied to them.
//!
//! [`TriangleMesh`] is the exchange type between extraction, repair,
//! analysis, and export. Derived quantities such as area, volume, and
//! edge topology are computed on demand from the vertex and face lists and
//! never cached, so a mesh is always safe to mutate directly.

pub mod decimate;
pub mod displace;
pub mod error;
pub mod quadric;
pub mod shapes;
pub mod smooth;
pub mod subdivide;
pub mod topology;

use fieldmesh_math::{triangle_area, triangle_cross, Point3, Vec3};
use serde::{Deserialize, Serialize};

pub use decimate::decimate;
pub use displace::{apply_displacement, Displacement};
pub use error::{MeshError, Result};
pub use shapes::{cuboid, unit_cube};
pub use smooth::smooth_laplacian;
pub use subdivide::{remesh_to_face_count, subdivide_midpoint};
pub use topology::{EdgeTopology, VertexAdjacency};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Point3,
    /// Maximum corner.
    pub max: Point3,
}

impl Bounds {
    /// Extent along each axis.
    pub fn dimensions(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center point.
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangles as counter-clockwise (outward) vertex index triples.
    pub faces: Vec<[u32; 3]>,
    /// Optional per-vertex unit normals, same length as `vertices`.
    pub normals: Option<Vec<Vec3>>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertices and faces, without normals.
    pub fn from_parts(vertices: Vec<Point3>, faces: Vec<[u32; 3]>) -> Self {
        Self {
            vertices,
            faces,
            normals: None,
        }
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// True when the mesh has no faces.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Check that every face index refers to an existing vertex.
    pub fn check_indices(&self) -> Result<()> {
        let n = self.vertices.len();
        for (face, tri) in self.faces.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= n) {
                return Err(MeshError::InvalidIndex {
                    face,
                    index,
                    num_vertices: n,
                });
            }
        }
        Ok(())
    }

    /// Corner positions of face `i`.
    #[inline]
    pub fn triangle(&self, i: usize) -> [Point3; 3] {
        let [a, b, c] = self.faces[i];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Unit normal per face. Zero-area faces get a zero vector.
    pub fn face_normals(&self) -> Vec<Vec3> {
        (0..self.faces.len())
            .map(|i| {
                let [a, b, c] = self.triangle(i);
                let n = triangle_cross(&a, &b, &c);
                let len = n.norm();
                if len > 0.0 {
                    n / len
                } else {
                    Vec3::zeros()
                }
            })
            .collect()
    }

    /// Area per face.
    pub fn face_areas(&self) -> Vec<f64> {
        (0..self.faces.len())
            .map(|i| {
                let [a, b, c] = self.triangle(i);
                triangle_area(&a, &b, &c)
            })
            .collect()
    }

    /// Total surface area.
    pub fn surface_area(&self) -> f64 {
        self.face_areas().iter().sum()
    }

    /// Signed enclosed volume (divergence theorem).
    ///
    /// Positive for a closed mesh with outward-facing triangles. Meaningless
    /// for open meshes.
    pub fn signed_volume(&self) -> f64 {
        let six_v: f64 = (0..self.faces.len())
            .map(|i| {
                let [a, b, c] = self.triangle(i);
                a.coords.dot(&b.coords.cross(&c.coords))
            })
            .sum();
        six_v / 6.0
    }

    /// Axis-aligned bounds of the vertex set, `None` when there are no vertices.
    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.vertices.first()?;
        let (min, max) = self.vertices.iter().fold((first, first), |(lo, hi), p| {
            (
                Point3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z)),
                Point3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z)),
            )
        });
        Some(Bounds { min, max })
    }

    /// Recompute area-weighted per-vertex normals.
    ///
    /// Vertices not used by any non-degenerate face get a zero normal.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::zeros(); self.vertices.len()];
        for i in 0..self.faces.len() {
            let [a, b, c] = self.triangle(i);
            // cross product length is twice the area, which is the weight
            let n = triangle_cross(&a, &b, &c);
            for &v in &self.faces[i] {
                normals[v as usize] += n;
            }
        }
        for n in &mut normals {
            let len = n.norm();
            if len > 0.0 {
                *n /= len;
            }
        }
        self.normals = Some(normals);
    }

    /// Builder form of [`compute_vertex_normals`](Self::compute_vertex_normals).
    pub fn with_vertex_normals(mut self) -> Self {
        self.compute_vertex_normals();
        self
    }

    /// Reverse the winding of face `i`.
    pub fn flip_face(&mut self, i: usize) {
        self.faces[i].swap(1, 2);
    }

    /// Reverse the winding of every face and negate any stored normals.
    pub fn invert(&mut self) {
        for f in &mut self.faces {
            f.swap(1, 2);
        }
        if let Some(normals) = &mut self.normals {
            for n in normals.iter_mut() {
                *n = -*n;
            }
        }
    }

    /// Append another mesh, offsetting its indices.
    ///
    /// Normals are kept only if both meshes carry them.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len() as u32;
        self.normals = match (self.normals.take(), &other.normals) {
            (Some(mut a), Some(b)) => {
                a.extend_from_slice(b);
                Some(a)
            }
            _ => None,
        };
        self.vertices.extend_from_slice(&other.vertices);
        self.faces
            .extend(other.faces.iter().map(|f| f.map(|i| i + offset)));
    }
}
