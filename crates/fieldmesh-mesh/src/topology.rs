//! Derived connectivity indices.
//!
//! Both structures are rebuilt from a face list whenever they are needed and
//! never stored on the mesh, so they cannot go stale.

use std::collections::HashMap;

/// Undirected edge key with the smaller index first.
#[inline]
pub fn edge_key(a: u32, b: u32) -> (u32, u32) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Edge usage counts for a face list.
#[derive(Debug, Clone, Default)]
pub struct EdgeTopology {
    /// Undirected edge → indices of the faces using it.
    edge_faces: HashMap<(u32, u32), Vec<usize>>,
    /// Directed edge → number of faces traversing it in that direction.
    directed: HashMap<(u32, u32), usize>,
}

impl EdgeTopology {
    /// Index every edge of `faces`.
    pub fn build(faces: &[[u32; 3]]) -> Self {
        let mut edge_faces: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
        for (fi, f) in faces.iter().enumerate() {
            for k in 0..3 {
                let (a, b) = (f[k], f[(k + 1) % 3]);
                edge_faces.entry(edge_key(a, b)).or_default().push(fi);
                *directed.entry((a, b)).or_insert(0) += 1;
            }
        }
        Self {
            edge_faces,
            directed,
        }
    }

    /// Number of distinct undirected edges.
    pub fn num_edges(&self) -> usize {
        self.edge_faces.len()
    }

    /// Every undirected edge is shared by exactly two faces.
    ///
    /// A face list with no edges is not watertight.
    pub fn is_watertight(&self) -> bool {
        !self.edge_faces.is_empty() && self.edge_faces.values().all(|f| f.len() == 2)
    }

    /// No directed edge is traversed by more than one face.
    pub fn is_winding_consistent(&self) -> bool {
        self.directed.values().all(|&n| n == 1)
    }

    /// Faces using the undirected edge `(a, b)`.
    pub fn faces_of_edge(&self, a: u32, b: u32) -> &[usize] {
        self.edge_faces
            .get(&edge_key(a, b))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// How many faces traverse `a → b` in that direction.
    pub fn directed_count(&self, a: u32, b: u32) -> usize {
        self.directed.get(&(a, b)).copied().unwrap_or(0)
    }

    /// Undirected edges used by exactly one face, sorted.
    pub fn boundary_edges(&self) -> Vec<(u32, u32)> {
        let mut edges: Vec<_> = self
            .edge_faces
            .iter()
            .filter(|(_, f)| f.len() == 1)
            .map(|(&e, _)| e)
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Number of edges used by more than two faces.
    pub fn non_manifold_edges(&self) -> usize {
        self.edge_faces.values().filter(|f| f.len() > 2).count()
    }

    /// Iterate undirected edges with their incident faces.
    pub fn iter(&self) -> impl Iterator<Item = ((u32, u32), &[usize])> {
        self.edge_faces.iter().map(|(&e, f)| (e, f.as_slice()))
    }
}

/// Vertex → neighbouring vertices, sorted and deduplicated.
#[derive(Debug, Clone)]
pub struct VertexAdjacency {
    neighbors: Vec<Vec<u32>>,
}

impl VertexAdjacency {
    /// Build from a face list over `num_vertices` vertices.
    pub fn build(num_vertices: usize, faces: &[[u32; 3]]) -> Self {
        let mut neighbors = vec![Vec::new(); num_vertices];
        for f in faces {
            for k in 0..3 {
                let (a, b) = (f[k], f[(k + 1) % 3]);
                if a != b {
                    neighbors[a as usize].push(b);
                    neighbors[b as usize].push(a);
                }
            }
        }
        for n in &mut neighbors {
            n.sort_unstable();
            n.dedup();
        }
        Self { neighbors }
    }

    /// Neighbours of vertex `v`.
    pub fn neighbors(&self, v: usize) -> &[u32] {
        &self.neighbors[v]
    }

    /// Number of vertices indexed.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    /// True when no vertices are indexed.
    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_cube;

    #[test]
    fn test_closed_cube() {
        let cube = unit_cube();
        let topo = EdgeTopology::build(&cube.faces);
        assert_eq!(topo.num_edges(), 18);
        assert!(topo.is_watertight());
        assert!(topo.is_winding_consistent());
        assert!(topo.boundary_edges().is_empty());
        assert_eq!(topo.non_manifold_edges(), 0);
    }

    #[test]
    fn test_open_cube_has_boundary() {
        let mut cube = unit_cube();
        cube.faces.truncate(10);
        let topo = EdgeTopology::build(&cube.faces);
        assert!(!topo.is_watertight());
        // removing two triangles of one quad leaves its four sides open
        assert_eq!(topo.boundary_edges().len(), 4);
    }

    #[test]
    fn test_flipped_face_breaks_winding() {
        let mut cube = unit_cube();
        cube.flip_face(3);
        let topo = EdgeTopology::build(&cube.faces);
        assert!(topo.is_watertight());
        assert!(!topo.is_winding_consistent());
    }

    #[test]
    fn test_empty_faces_not_watertight() {
        let topo = EdgeTopology::build(&[]);
        assert!(!topo.is_watertight());
        assert!(topo.is_winding_consistent());
    }

    #[test]
    fn test_vertex_adjacency() {
        let adj = VertexAdjacency::build(4, &[[0, 1, 2], [0, 2, 3]]);
        assert_eq!(adj.neighbors(0), &[1, 2, 3]);
        assert_eq!(adj.neighbors(1), &[0, 2]);
        assert_eq!(adj.neighbors(3), &[0, 2]);
    }
}
