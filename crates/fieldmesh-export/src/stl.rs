//! STL writers.

use std::io::Write;

use fieldmesh_math::Vec3;
use fieldmesh_mesh::TriangleMesh;

const HEADER: &[u8] = b"fieldmesh binary STL";

/// Write little-endian binary STL: 80-byte header, triangle count, then
/// 50 bytes per facet.
///
/// Fails with [`std::io::ErrorKind::InvalidInput`] before writing anything
/// when the face count does not fit the format's 32-bit counter.
pub fn write_binary(mesh: &TriangleMesh, writer: &mut impl Write) -> std::io::Result<()> {
    let count = facet_count(mesh.num_faces())?;
    let mut header = [0u8; 80];
    header[..HEADER.len()].copy_from_slice(HEADER);
    writer.write_all(&header)?;
    writer.write_all(&count.to_le_bytes())?;

    let mut facet = [0u8; 50];
    for (i, normal) in facet_normals(mesh).iter().enumerate() {
        let coords = std::iter::once([normal.x, normal.y, normal.z])
            .chain(mesh.triangle(i).into_iter().map(|p| [p.x, p.y, p.z]));
        for (slot, xyz) in coords.enumerate() {
            for (axis, value) in xyz.iter().enumerate() {
                let at = (slot * 3 + axis) * 4;
                facet[at..at + 4].copy_from_slice(&(*value as f32).to_le_bytes());
            }
        }
        // attribute byte count stays zero
        writer.write_all(&facet)?;
    }
    Ok(())
}

fn facet_count(faces: usize) -> std::io::Result<u32> {
    u32::try_from(faces).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("{faces} faces exceed the binary STL facet limit"),
        )
    })
}

/// Write ASCII STL.
pub fn write_ascii(mesh: &TriangleMesh, writer: &mut impl Write) -> std::io::Result<()> {
    writeln!(writer, "solid fieldmesh")?;
    for (i, n) in facet_normals(mesh).iter().enumerate() {
        writeln!(writer, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(writer, "    outer loop")?;
        for p in mesh.triangle(i) {
            writeln!(writer, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z)?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }
    writeln!(writer, "endsolid fieldmesh")?;
    Ok(())
}

/// Unit face normals; STL readers expect `+z` rather than zero for slivers.
fn facet_normals(mesh: &TriangleMesh) -> Vec<Vec3> {
    mesh.face_normals()
        .into_iter()
        .map(|n| if n == Vec3::zeros() { Vec3::z() } else { n })
        .collect()
}
