//! Flattening a solid into display buffers.

use panel_kernel::{FaceTriangulation, Kernel, KernelShapeHandle};
use panel_types::MeshBuffers;

use crate::types::BuildError;

/// Tessellate a shape into one mesh. The empty shape yields an empty mesh.
pub fn tessellate(
    kernel: &mut dyn Kernel,
    shape: Option<&KernelShapeHandle>,
    tolerance: f64,
) -> Result<MeshBuffers, BuildError> {
    let Some(shape) = shape else {
        return Ok(MeshBuffers::default());
    };
    let faces = kernel.triangulate_faces(shape, tolerance)?;
    Ok(concat_faces(&faces))
}

/// Concatenate per-face triangulations, offsetting each face's indices by the
/// number of vertices emitted before it.
///
/// Normals are kept only when every face has them, so the normal buffer always
/// lines up with the position buffer.
pub fn concat_faces(faces: &[FaceTriangulation]) -> MeshBuffers {
    let vertex_total: usize = faces.iter().map(|f| f.positions.len()).sum();
    let triangle_total: usize = faces.iter().map(|f| f.triangles.len()).sum();
    let with_normals = !faces.is_empty() && faces.iter().all(|f| f.normals.is_some());

    let mut positions = Vec::with_capacity(vertex_total * 3);
    let mut indices = Vec::with_capacity(triangle_total * 3);
    let mut normals = with_normals.then(|| Vec::with_capacity(vertex_total * 3));

    let mut offset: u32 = 0;
    for face in faces {
        positions.extend(face.positions.iter().flatten().map(|&c| c as f32));
        indices.extend(face.triangles.iter().flatten().map(|&i| i + offset));
        if let (Some(out), Some(face_normals)) = (normals.as_mut(), face.normals.as_ref()) {
            out.extend(face_normals.iter().flatten().map(|&c| c as f32));
        }
        offset += face.positions.len() as u32;
    }

    MeshBuffers {
        positions,
        indices,
        normals,
    }
}
