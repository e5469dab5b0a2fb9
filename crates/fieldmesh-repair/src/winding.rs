//! Winding repair.

use std::collections::VecDeque;

use fieldmesh_mesh::{EdgeTopology, TriangleMesh};
use tracing::debug;

fn traverses(face: &[u32; 3], a: u32, b: u32) -> bool {
    (0..3).any(|k| face[k] == a && face[(k + 1) % 3] == b)
}

/// Make face orientation consistent within each connected component.
///
/// Faces are walked breadth-first across manifold edges and flipped to agree
/// with the face they were reached from. Closed components that end up with
/// negative volume are then inverted so they face outward. Returns how many
/// faces changed orientation.
pub fn fix_winding(mesh: &mut TriangleMesh) -> usize {
    let topo = EdgeTopology::build(&mesh.faces);
    let original = mesh.faces.clone();
    let mut visited = vec![false; mesh.faces.len()];
    let mut components = 0usize;

    for seed in 0..mesh.faces.len() {
        if visited[seed] {
            continue;
        }
        components += 1;
        visited[seed] = true;
        let mut component = vec![seed];
        let mut queue = VecDeque::from([seed]);

        while let Some(f) = queue.pop_front() {
            let face = mesh.faces[f];
            for k in 0..3 {
                let (a, b) = (face[k], face[(k + 1) % 3]);
                let incident = topo.faces_of_edge(a, b);
                if incident.len() != 2 {
                    continue;
                }
                let g = if incident[0] == f { incident[1] } else { incident[0] };
                if visited[g] {
                    continue;
                }
                // a neighbour must run the shared edge the other way
                if traverses(&mesh.faces[g], a, b) {
                    mesh.flip_face(g);
                }
                visited[g] = true;
                component.push(g);
                queue.push_back(g);
            }
        }

        let closed = component.iter().all(|&f| {
            let face = mesh.faces[f];
            (0..3).all(|k| topo.faces_of_edge(face[k], face[(k + 1) % 3]).len() == 2)
        });
        if closed {
            let volume: f64 = component
                .iter()
                .map(|&f| {
                    let [a, b, c] = mesh.triangle(f);
                    a.coords.dot(&b.coords.cross(&c.coords))
                })
                .sum();
            if volume < 0.0 {
                for &f in &component {
                    mesh.flip_face(f);
                }
            }
        }
    }

    let flipped = mesh
        .faces
        .iter()
        .zip(&original)
        .filter(|(now, before)| now != before)
        .count();
    debug!(components, flipped, "winding fixed");
    flipped
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fieldmesh_math::Point3;
    use fieldmesh_mesh::{cuboid, unit_cube};

    #[test]
    fn test_single_flipped_face() {
        let mut cube = unit_cube();
        cube.flip_face(5);
        assert_eq!(fix_winding(&mut cube), 1);
        let topo = EdgeTopology::build(&cube.faces);
        assert!(topo.is_winding_consistent());
        assert_relative_eq!(cube.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_majority_flipped() {
        let mut cube = unit_cube();
        for f in 0..9 {
            cube.flip_face(f);
        }
        fix_winding(&mut cube);
        assert!(EdgeTopology::build(&cube.faces).is_winding_consistent());
        assert_relative_eq!(cube.signed_volume(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_inverted_components_outward() {
        let mut mesh = unit_cube();
        let mut other = cuboid(Point3::new(3.0, 0.0, 0.0), Point3::new(4.0, 2.0, 1.0));
        other.invert();
        mesh.merge(&other);
        assert_eq!(fix_winding(&mut mesh), 12);
        assert_relative_eq!(mesh.signed_volume(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_consistent_mesh_untouched() {
        let mut cube = unit_cube();
        assert_eq!(fix_winding(&mut cube), 0);
        assert_eq!(cube, unit_cube());
    }
}
