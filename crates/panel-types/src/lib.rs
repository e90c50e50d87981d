pub mod mesh;
pub mod operation;

pub use mesh::*;
pub use operation::*;
