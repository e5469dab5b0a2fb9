//! Marching tetrahedra over the Freudenthal split of each lattice cell.
//!
//! Every cube is cut into six tetrahedra that all share the main diagonal
//! from corner 0 to corner 7. Neighbouring cubes then cut their shared face
//! along the same diagonal, and each tetrahedron has an unambiguous
//! triangulation, so a closed level set always yields a closed surface.

use std::collections::HashMap;

use fieldmesh_field::ScalarField;
use fieldmesh_math::{Point3, Vec3};
use fieldmesh_mesh::TriangleMesh;

/// Cube corner `c` sits at offset `(c & 1, (c >> 1) & 1, (c >> 2) & 1)`.
/// Each row walks 0 → 7 one axis at a time.
const TETS: [[usize; 4]; 6] = [
    [0, 1, 3, 7],
    [0, 1, 5, 7],
    [0, 2, 3, 7],
    [0, 2, 6, 7],
    [0, 4, 5, 7],
    [0, 4, 6, 7],
];

type Lattice = [usize; 3];

fn corner(base: Lattice, c: usize) -> Lattice {
    [base[0] + (c & 1), base[1] + ((c >> 1) & 1), base[2] + ((c >> 2) & 1)]
}

fn to_vec(p: Lattice) -> Vec3 {
    Vec3::new(p[0] as f64, p[1] as f64, p[2] as f64)
}

pub(crate) struct Extractor<'a> {
    field: &'a ScalarField,
    isovalue: f64,
    spacing: Vec3,
    vertices: Vec<Point3>,
    faces: Vec<[u32; 3]>,
    edge_vertex: HashMap<(usize, usize), u32>,
}

impl<'a> Extractor<'a> {
    pub(crate) fn new(field: &'a ScalarField, isovalue: f64, spacing: [f64; 3]) -> Self {
        Self {
            field,
            isovalue,
            spacing: Vec3::from(spacing),
            vertices: Vec::new(),
            faces: Vec::new(),
            edge_vertex: HashMap::new(),
        }
    }

    pub(crate) fn run(mut self) -> TriangleMesh {
        let [nx, ny, nz] = self.field.shape();
        let inside: Vec<bool> = self
            .field
            .as_slice()
            .iter()
            .map(|&v| v > self.isovalue)
            .collect();

        for x in 0..nx - 1 {
            for y in 0..ny - 1 {
                for z in 0..nz - 1 {
                    let base = [x, y, z];
                    let corners: [Lattice; 8] = std::array::from_fn(|c| corner(base, c));
                    let flags = corners.map(|p| inside[self.field.offset(p[0], p[1], p[2])]);
                    if flags.iter().all(|&f| f) || !flags.iter().any(|&f| f) {
                        continue;
                    }
                    for tet in &TETS {
                        self.polygonize(tet.map(|c| corners[c]), tet.map(|c| flags[c]));
                    }
                }
            }
        }

        TriangleMesh::from_parts(self.vertices, self.faces)
    }

    fn polygonize(&mut self, pts: [Lattice; 4], inside: [bool; 4]) {
        let mut inn: Vec<Lattice> = Vec::with_capacity(4);
        let mut out: Vec<Lattice> = Vec::with_capacity(4);
        for (p, &i) in pts.iter().zip(&inside) {
            if i {
                inn.push(*p);
            } else {
                out.push(*p);
            }
        }

        let tris: Vec<[(Lattice, Lattice); 3]> = match (inn.as_slice(), out.as_slice()) {
            ([a], [b, c, d]) => vec![[(*a, *b), (*a, *c), (*a, *d)]],
            ([a, b, c], [d]) => vec![[(*a, *d), (*b, *d), (*c, *d)]],
            ([a, b], [c, d]) => vec![
                [(*a, *c), (*a, *d), (*b, *d)],
                [(*a, *c), (*b, *d), (*b, *c)],
            ],
            _ => return,
        };

        // normals must run from the high side to the low side
        let centroid = |ps: &[Lattice]| {
            ps.iter().fold(Vec3::zeros(), |acc, &p| acc + to_vec(p)) / ps.len() as f64
        };
        let outward = centroid(&out) - centroid(&inn);

        for tri in tris {
            // orient on edge midpoints, which never degenerate
            let m = tri.map(|(a, b)| (to_vec(a) + to_vec(b)) * 0.5);
            let n = (m[1] - m[0]).cross(&(m[2] - m[0]));
            let tri = if n.dot(&outward) < 0.0 {
                [tri[0], tri[2], tri[1]]
            } else {
                tri
            };
            let face = tri.map(|(a, b)| self.vertex_on_edge(a, b));
            self.faces.push(face);
        }
    }

    /// Shared vertex where the level set crosses lattice edge `a`–`b`.
    fn vertex_on_edge(&mut self, a: Lattice, b: Lattice) -> u32 {
        let ia = self.field.offset(a[0], a[1], a[2]);
        let ib = self.field.offset(b[0], b[1], b[2]);
        // interpolate from the lower index so the result is order independent
        let (a, b, key) = if ia < ib {
            (a, b, (ia, ib))
        } else {
            (b, a, (ib, ia))
        };
        if let Some(&v) = self.edge_vertex.get(&key) {
            return v;
        }

        let va = self.field.as_slice()[key.0];
        let vb = self.field.as_slice()[key.1];
        let t = (self.isovalue - va) / (vb - va);
        let pa = to_vec(a);
        let p = pa + (to_vec(b) - pa) * t;
        // in range: extract_isosurface caps the lattice edge count at u32::MAX
        let idx = self.vertices.len() as u32;
        self.vertices.push(Point3::from(p.component_mul(&self.spacing)));
        self.edge_vertex.insert(key, idx);
        idx
    }
}
