use serde::{Deserialize, Serialize};

/// Flat triangle mesh buffers, ready for a GPU vertex/index buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffers {
    /// Vertex positions [x0, y0, z0, x1, y1, z1, ...].
    pub positions: Vec<f32>,
    /// Triangle indices into the position array, three per triangle.
    pub indices: Vec<u32>,
    /// Per-vertex normals laid out like `positions`, when the kernel supplied them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<f32>>,
}

impl MeshBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Position of vertex `index`, if it exists.
    pub fn position(&self, index: u32) -> Option<[f32; 3]> {
        let base = index as usize * 3;
        let p = self.positions.get(base..base + 3)?;
        Some([p[0], p[1], p[2]])
    }

    /// Axis-aligned bounds as `(min, max)`, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<([f32; 3], [f32; 3])> {
        if self.positions.len() < 3 {
            return None;
        }
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for p in self.positions.chunks_exact(3) {
            for i in 0..3 {
                min[i] = min[i].min(p[i]);
                max[i] = max[i].max(p[i]);
            }
        }
        Some((min, max))
    }
}

/// Wire form of a wireframe edge: two vertex indices into the mesh positions.
pub type EdgePair = [u32; 2];

/// A wireframe edge resolved to coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Ordinal in first-discovery order.
    pub id: u32,
    pub start: [f32; 3],
    pub end: [f32; 3],
}

impl Edge {
    pub fn length(&self) -> f32 {
        let d = [
            self.end[0] - self.start[0],
            self.end[1] - self.start[1],
            self.end[2] - self.start[2],
        ];
        (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt()
    }
}
