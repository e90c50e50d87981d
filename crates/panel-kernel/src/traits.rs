use crate::types::*;

/// Geometry kernel contract consumed by the shape builder and tessellator.
/// Implemented by TruckKernel (wraps real truck) and MockKernel (deterministic test double).
///
/// A kernel is a single mutable resource: every call takes `&mut self`, and a kernel
/// is owned by exactly one compute context.
pub trait Kernel {
    /// Axis-aligned box with one corner at the origin, extending to (w, h, d).
    fn make_box(&mut self, w: f64, h: f64, d: f64) -> Result<KernelShapeHandle, KernelError>;

    /// Cylinder along +Z with its base centered at the origin.
    fn make_cylinder(&mut self, radius: f64, height: f64)
        -> Result<KernelShapeHandle, KernelError>;

    /// Rigid translation. Returns a new shape; the input is left untouched.
    fn translate(
        &mut self,
        shape: &KernelShapeHandle,
        offset: [f64; 3],
    ) -> Result<KernelShapeHandle, KernelError>;

    /// Boolean subtraction: a minus b.
    fn boolean_subtract(
        &mut self,
        a: &KernelShapeHandle,
        b: &KernelShapeHandle,
    ) -> Result<KernelShapeHandle, KernelError>;

    /// Lowest and highest z reached by the shape's vertices.
    fn z_extent(&self, shape: &KernelShapeHandle) -> Result<(f64, f64), KernelError>;

    /// Triangulate every face of a shape at the given tolerance.
    ///
    /// Faces are returned in a deterministic order for a given shape.
    fn triangulate_faces(
        &mut self,
        shape: &KernelShapeHandle,
        tolerance: f64,
    ) -> Result<Vec<FaceTriangulation>, KernelError>;

    /// Drop every stored shape. All outstanding handles become invalid.
    fn release_all(&mut self);

    /// Number of shapes currently stored.
    fn shape_count(&self) -> usize;
}

/// A kernel that can be moved into a compute thread.
pub type BoxedKernel = Box<dyn Kernel + Send>;
