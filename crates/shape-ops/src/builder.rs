//! Folding the operation history into a single solid.

use panel_kernel::{Kernel, KernelShapeHandle};
use panel_types::{Operation, OperationKind};

use crate::types::{BuildError, BuildOptions, CUT_OVERSHOOT};

/// Apply one operation to the current shape.
///
/// `None` is the empty shape. `Resize` replaces whatever was built so far;
/// cuts subtract a tool rising from `z = 0` at `(x, y)` and leave the empty
/// shape empty. Unsupported operations return the shape unchanged.
pub fn apply_op(
    kernel: &mut dyn Kernel,
    shape: Option<KernelShapeHandle>,
    op: &Operation,
    options: &BuildOptions,
) -> Result<Option<KernelShapeHandle>, BuildError> {
    match &op.kind {
        OperationKind::Resize { w, h, t } => Ok(Some(kernel.make_box(*w, *h, *t)?)),

        OperationKind::RectCut { x, y, w, h, depth } => {
            let Some(base) = shape else {
                tracing::warn!(op = %op.id, "rect cut applied to empty shape, skipped");
                return Ok(None);
            };
            let (bottom, top) = tool_span(kernel, &base, *depth, options)?;
            let tool = kernel.make_box(*w, *h, top - bottom)?;
            let tool = kernel.translate(&tool, [*x, *y, bottom])?;
            Ok(Some(kernel.boolean_subtract(&base, &tool)?))
        }

        OperationKind::CircleCut { cx, cy, r, depth } => {
            let Some(base) = shape else {
                tracing::warn!(op = %op.id, "circle cut applied to empty shape, skipped");
                return Ok(None);
            };
            let (bottom, top) = tool_span(kernel, &base, *depth, options)?;
            let tool = kernel.make_cylinder(*r, top - bottom)?;
            let tool = kernel.translate(&tool, [*cx, *cy, bottom])?;
            Ok(Some(kernel.boolean_subtract(&base, &tool)?))
        }

        OperationKind::Unsupported => {
            tracing::warn!(op = %op.id, "unsupported operation, skipped");
            Ok(shape)
        }
    }
}

/// Vertical span of a cutting tool for `base`.
///
/// The tool starts `CUT_OVERSHOOT` below the panel. A depth that reaches the
/// top face is trimmed to `CUT_OVERSHOOT` above it; anything shallower is a
/// pocket ending at `z = depth`.
fn tool_span(
    kernel: &dyn Kernel,
    base: &KernelShapeHandle,
    depth: Option<f64>,
    options: &BuildOptions,
) -> Result<(f64, f64), BuildError> {
    let depth = depth.unwrap_or(options.through_cut_depth);
    if !(depth.is_finite() && depth > 0.0) {
        return Err(BuildError::InvalidCutDepth { depth });
    }

    let (z_min, z_max) = kernel.z_extent(base)?;
    let bottom = z_min.min(0.0) - CUT_OVERSHOOT;
    let top = if depth >= z_max {
        z_max + CUT_OVERSHOOT
    } else {
        depth
    };
    Ok((bottom, top))
}

/// Fold `ops` left to right starting from the empty shape.
pub fn build_shape(
    kernel: &mut dyn Kernel,
    ops: &[Operation],
    options: &BuildOptions,
) -> Result<Option<KernelShapeHandle>, BuildError> {
    ops.iter().try_fold(None, |shape, op| {
        tracing::debug!(op = %op.id, kind = op.kind.name(), "applying operation");
        apply_op(kernel, shape, op, options)
    })
}
