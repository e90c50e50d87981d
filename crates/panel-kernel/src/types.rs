/// Opaque handle to a shape held by a kernel.
/// Valid only until the kernel's shapes are released.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KernelShapeHandle(pub(crate) u64);

impl KernelShapeHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("tessellation failed: {reason}")]
    TessellationFailed { reason: String },

    #[error("shape not found: #{handle}")]
    ShapeNotFound { handle: u64 },

    #[error("invalid parameter: {reason}")]
    InvalidParameter { reason: String },

    #[error("kernel initialization failed: {reason}")]
    InitFailed { reason: String },

    #[error("kernel error: {message}")]
    Other { message: String },
}

impl KernelError {
    pub(crate) fn not_found(handle: &KernelShapeHandle) -> Self {
        KernelError::ShapeNotFound {
            handle: handle.id(),
        }
    }
}

/// Triangulation of one face. Vertex indices are local to the face.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaceTriangulation {
    /// Vertex positions.
    pub positions: Vec<[f64; 3]>,
    /// Per-vertex normals, parallel to `positions`, if the kernel computed them.
    pub normals: Option<Vec<[f64; 3]>>,
    /// Triangles as triples of indices into `positions`.
    pub triangles: Vec<[u32; 3]>,
}

impl FaceTriangulation {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

/// Reject zero, negative, and non-finite dimensions.
pub(crate) fn check_positive(name: &str, value: f64) -> Result<(), KernelError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(KernelError::InvalidParameter {
            reason: format!("{name} must be positive and finite, got {value}"),
        })
    }
}
