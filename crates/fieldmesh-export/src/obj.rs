//! Wavefront OBJ writer.

use std::io::Write;

use fieldmesh_mesh::TriangleMesh;

/// Write vertices, optional vertex normals, and 1-based faces.
pub fn write_obj(mesh: &TriangleMesh, writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer, "# fieldmesh")?;
    writeln!(
        writer,
        "# {} vertices, {} faces",
        mesh.num_vertices(),
        mesh.num_faces()
    )?;
    for v in &mesh.vertices {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }

    let normals = mesh
        .normals
        .as_ref()
        .filter(|n| n.len() == mesh.num_vertices());
    if let Some(normals) = normals {
        for n in normals {
            writeln!(writer, "vn {} {} {}", n.x, n.y, n.z)?;
        }
    }

    for f in &mesh.faces {
        let [a, b, c] = f.map(|i| i + 1);
        if normals.is_some() {
            writeln!(writer, "f {a}//{a} {b}//{b} {c}//{c}")?;
        } else {
            writeln!(writer, "f {a} {b} {c}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmesh_mesh::unit_cube;

    #[test]
    fn test_plain_faces() {
        let mut buf = Vec::new();
        write_obj(&unit_cube(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 8);
        assert!(!text.contains("vn "));
        assert!(text.contains("\nf 1 3 2\n"));
    }

    #[test]
    fn test_faces_reference_normals() {
        let mut buf = Vec::new();
        write_obj(&unit_cube().with_vertex_normals(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 8);
        assert!(text.contains("\nf 1//1 3//3 2//2\n"));
    }
}
