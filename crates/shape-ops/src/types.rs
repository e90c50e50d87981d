use panel_kernel::KernelError;

/// Chordal tolerance used when no other value is configured.
pub const DEFAULT_TESSELLATION_TOLERANCE: f64 = 0.5;

/// Depth used for cuts that do not specify one. Large enough to pass
/// through any realistic panel; tools are trimmed to the panel before use.
pub const DEFAULT_THROUGH_CUT_DEPTH: f64 = 1e6;

/// How far a cutting tool extends past each panel face it breaks through.
/// Keeps tool faces off the panel's faces.
pub const CUT_OVERSHOOT: f64 = 1.0;

/// Knobs for building and tessellating a panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    pub tessellation_tolerance: f64,
    pub through_cut_depth: f64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            tessellation_tolerance: DEFAULT_TESSELLATION_TOLERANCE,
            through_cut_depth: DEFAULT_THROUGH_CUT_DEPTH,
        }
    }
}

/// Errors from building or meshing a shape.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BuildError {
    #[error("kernel error: {0}")]
    Kernel(#[from] KernelError),

    #[error("cut depth must be positive and finite, got {depth}")]
    InvalidCutDepth { depth: f64 },

    #[error("edge references vertex {index} but the mesh has {vertex_count} vertices")]
    EdgeIndexOutOfRange { index: u32, vertex_count: usize },
}
