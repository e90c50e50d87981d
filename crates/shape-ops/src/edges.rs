//! Wireframe extraction from a triangle index buffer.

use std::collections::HashSet;

use panel_types::{Edge, EdgePair, MeshBuffers};

use crate::types::BuildError;

/// Unique triangle edges in first-discovery order.
///
/// Each triangle `(a, b, c)` contributes `(a, b)`, `(b, c)`, `(c, a)`. An edge
/// shared by two triangles is kept once, with the orientation of the triangle
/// that introduced it. A trailing partial triangle is ignored.
pub fn extract_edge_pairs(indices: &[u32]) -> Vec<EdgePair> {
    let mut seen: HashSet<(u32, u32)> = HashSet::with_capacity(indices.len());
    let mut pairs = Vec::new();

    for tri in indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            if seen.insert((a.min(b), a.max(b))) {
                pairs.push([a, b]);
            }
        }
    }

    pairs
}

/// Resolve index pairs to endpoint coordinates. Ids follow the pair order.
pub fn resolve_edges(pairs: &[EdgePair], mesh: &MeshBuffers) -> Result<Vec<Edge>, BuildError> {
    let lookup = |index: u32| {
        mesh.position(index).ok_or(BuildError::EdgeIndexOutOfRange {
            index,
            vertex_count: mesh.vertex_count(),
        })
    };

    pairs
        .iter()
        .enumerate()
        .map(|(id, &[a, b])| -> Result<Edge, BuildError> {
            Ok(Edge {
                id: id as u32,
                start: lookup(a)?,
                end: lookup(b)?,
            })
        })
        .collect()
}

/// Extract and resolve the wireframe of a mesh in one go.
pub fn edges_from_indices(mesh: &MeshBuffers) -> Result<Vec<Edge>, BuildError> {
    resolve_edges(&extract_edge_pairs(&mesh.indices), mesh)
}
