//! Wavefront OBJ loading through `tobj`.

use glam::Vec3;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::LoadError;
use crate::geometry::TriangleMesh;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

pub fn load_obj(path: &Path) -> Result<TriangleMesh, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_obj(&mut BufReader::new(file), path)
}

/// Parses OBJ text, merging every object into one mesh. Material
/// libraries are not followed.
pub fn parse_obj<R: BufRead>(reader: &mut R, path: &Path) -> Result<TriangleMesh, LoadError> {
    let (models, _materials) =
        tobj::load_obj_buf(reader, &load_options(), |_| Err(tobj::LoadError::OpenFileFailed))
            .map_err(|e| LoadError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

    let mut merged = TriangleMesh::default();
    for model in &models {
        merged.append(&convert_model(model));
    }

    if merged.is_empty() {
        return Err(LoadError::Empty(path.to_path_buf()));
    }

    log::debug!(
        "parsed {} object(s) from {}: {} vertices, {} triangles",
        models.len(),
        path.display(),
        merged.positions.len(),
        merged.triangle_count()
    );

    Ok(merged)
}

fn convert_model(model: &tobj::Model) -> TriangleMesh {
    let mesh = &model.mesh;

    let positions: Vec<Vec3> = mesh
        .positions
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect();

    let normals: Vec<Vec3> = mesh
        .normals
        .chunks_exact(3)
        .map(|c| Vec3::new(c[0], c[1], c[2]))
        .collect();

    let mut out = TriangleMesh {
        indices: mesh.indices.clone(),
        positions,
        normals,
    };

    if out.normals.len() != out.positions.len() {
        out.compute_vertex_normals();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const QUAD: &str = "\
o quad
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
f 1 2 3 4
";

    #[test]
    fn test_quad_is_triangulated_with_generated_normals() {
        let mesh = parse_obj(&mut Cursor::new(QUAD), Path::new("quad.obj")).unwrap();

        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.normals.len(), 4);
        for n in &mesh.normals {
            assert!((*n - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn test_objects_are_merged() {
        let two = format!("{QUAD}o second\nv 0 0 1\nv 1 0 1\nv 0 1 1\nf 5 6 7\n");
        let mesh = parse_obj(&mut Cursor::new(two), Path::new("two.obj")).unwrap();

        assert_eq!(mesh.triangle_count(), 3);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.positions.len()));
    }

    #[test]
    fn test_file_without_faces_is_empty() {
        let err = parse_obj(&mut Cursor::new("v 0 0 0\n"), Path::new("pts.obj"));
        assert!(matches!(err, Err(LoadError::Empty(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_obj(Path::new("/definitely/not/here/sphere.obj"));
        assert!(matches!(err, Err(LoadError::Io { .. })));
    }
}
