pub mod builder;
pub mod edges;
pub mod tessellate;
pub mod types;

pub use builder::{apply_op, build_shape};
pub use edges::{edges_from_indices, extract_edge_pairs, resolve_edges};
pub use tessellate::{concat_faces, tessellate};
pub use types::*;
