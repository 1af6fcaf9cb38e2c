//! STL loading into a flat triangle list.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use meshbatch_core::error::AppError;
use meshbatch_core::result::AppResult;

/// A triangle soup in model coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Triangles as three `[x, y, z]` corners.
    pub triangles: Vec<[[f32; 3]; 3]>,
}

impl TriangleMesh {
    /// Load an STL file (ASCII or binary).
    pub fn load_stl(path: &Path) -> AppResult<Self> {
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::not_found(format!("Mesh file not found: {}", path.display()))
            } else {
                AppError::from(e)
            }
        })?;

        let mut reader = BufReader::new(file);
        let stl = stl_io::read_stl(&mut reader).map_err(|e| {
            AppError::render(format!("Failed to parse STL {}: {e}", path.display()))
        })?;

        let triangles = stl
            .faces
            .iter()
            .map(|face| {
                face.vertices.map(|idx| {
                    let v = &stl.vertices[idx];
                    [v[0], v[1], v[2]]
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            path = %path.display(),
            vertices = stl.vertices.len(),
            triangles = triangles.len(),
            "Loaded STL mesh"
        );

        Ok(Self { triangles })
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Whether the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` when empty.
    pub fn bounds(&self) -> Option<([f32; 3], [f32; 3])> {
        let mut corners = self.triangles.iter().flatten();
        let first = *corners.next()?;
        Some(corners.fold((first, first), |(mut lo, mut hi), p| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(p[axis]);
                hi[axis] = hi[axis].max(p[axis]);
            }
            (lo, hi)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshbatch_core::error::ErrorKind;

    const ASCII_TETRA: &str = "solid tetra
facet normal 0 0 -1
 outer loop
  vertex 0 0 0
  vertex 0.2 0 0
  vertex 0 0.2 0
 endloop
endfacet
facet normal 0 -1 0
 outer loop
  vertex 0 0 0
  vertex 0 0 0.2
  vertex 0.2 0 0
 endloop
endfacet
endsolid tetra
";

    #[test]
    fn test_load_ascii_stl() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("tetra.stl");
        std::fs::write(&path, ASCII_TETRA).expect("write");

        let mesh = TriangleMesh::load_stl(&path).expect("load");
        assert_eq!(mesh.len(), 2);
        let (lo, hi) = mesh.bounds().expect("bounds");
        assert_eq!(lo, [0.0, 0.0, 0.0]);
        assert_eq!(hi, [0.2, 0.2, 0.2]);
    }

    #[test]
    fn test_missing_mesh_is_not_found() {
        let err = TriangleMesh::load_stl(Path::new("/nonexistent/part.stl")).expect_err("missing");
        assert!(err.is(ErrorKind::NotFound));
    }

    #[test]
    fn test_garbage_is_render_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("bad.stl");
        std::fs::write(&path, "solid x\nfacet banana\n").expect("write");
        let err = TriangleMesh::load_stl(&path).expect_err("bad");
        assert!(err.is(ErrorKind::Render));
    }

    #[test]
    fn test_empty_mesh_has_no_bounds() {
        assert!(TriangleMesh::default().bounds().is_none());
    }
}
