//! Per-face triangulation of truck solids.
//!
//! Wraps truck-meshalgo and hands back one `FaceTriangulation` per face so the
//! caller decides how to concatenate them.

use crate::types::*;
use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::MeshableShape;

type TruckSolid = truck_modeling::Solid;

/// Triangulate every face of a truck Solid.
///
/// Faces are visited shell by shell in boundary order, which is stable for a
/// given solid. Inverted faces have their winding flipped so all triangles face
/// outward.
pub fn triangulate_solid(
    solid: &TruckSolid,
    tolerance: f64,
) -> std::result::Result<Vec<FaceTriangulation>, KernelError> {
    if !(tolerance.is_finite() && tolerance > 0.0) {
        return Err(KernelError::InvalidParameter {
            reason: format!("tessellation tolerance must be positive, got {tolerance}"),
        });
    }

    let meshed_solid = solid.triangulation(tolerance);
    let mut faces = Vec::new();

    for shell in meshed_solid.boundaries().iter() {
        for face in shell.face_iter() {
            let maybe_mesh: Option<PolygonMesh> = face.surface();
            let Some(face_mesh) = maybe_mesh else {
                continue;
            };

            let face_mesh = if !face.orientation() {
                let mut m = face_mesh;
                m.invert();
                m
            } else {
                face_mesh
            };

            let positions: Vec<[f64; 3]> = face_mesh
                .positions()
                .iter()
                .map(|p| [p[0], p[1], p[2]])
                .collect();

            // Normals are indexed separately from positions; re-key them by position.
            let source_normals = face_mesh.normals();
            let mut normals = vec![[0.0, 0.0, 0.0]; positions.len()];
            let mut has_normals = !source_normals.is_empty();

            let mut triangles = Vec::with_capacity(face_mesh.tri_faces().len());
            for tri in face_mesh.tri_faces() {
                for v in tri.iter() {
                    match v.nor.and_then(|n| source_normals.get(n)) {
                        Some(n) => normals[v.pos] = [n[0], n[1], n[2]],
                        None => has_normals = false,
                    }
                }
                triangles.push([tri[0].pos as u32, tri[1].pos as u32, tri[2].pos as u32]);
            }

            if triangles.is_empty() {
                continue;
            }

            faces.push(FaceTriangulation {
                positions,
                normals: has_normals.then_some(normals),
                triangles,
            });
        }
    }

    if faces.is_empty() {
        return Err(KernelError::TessellationFailed {
            reason: "no face produced any triangles".to_string(),
        });
    }

    Ok(faces)
}
