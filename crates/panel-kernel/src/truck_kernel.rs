//! TruckKernel: real geometry kernel wrapping the truck API.

use crate::primitives;
use crate::tessellation;
use crate::traits::Kernel;
use crate::types::*;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use truck_modeling::builder;
use truck_modeling::topology::Solid;
use truck_modeling::Vector3;

/// Tolerance handed to truck's boolean operations.
const BOOLEAN_TOLERANCE: f64 = 0.05;

/// Real geometry kernel backed by the truck BREP library.
pub struct TruckKernel {
    next_handle: u64,
    solids: HashMap<u64, Solid>,
}

impl TruckKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            solids: HashMap::new(),
        }
    }

    fn alloc_handle(&mut self) -> KernelShapeHandle {
        let h = KernelShapeHandle(self.next_handle);
        self.next_handle += 1;
        h
    }

    pub(crate) fn store_solid(&mut self, solid: Solid) -> KernelShapeHandle {
        let handle = self.alloc_handle();
        self.solids.insert(handle.id(), solid);
        handle
    }

    pub(crate) fn get_solid(&self, handle: &KernelShapeHandle) -> Result<&Solid, KernelError> {
        self.solids
            .get(&handle.id())
            .ok_or_else(|| KernelError::not_found(handle))
    }
}

impl Default for TruckKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl Kernel for TruckKernel {
    fn make_box(&mut self, w: f64, h: f64, d: f64) -> Result<KernelShapeHandle, KernelError> {
        check_positive("box width", w)?;
        check_positive("box height", h)?;
        check_positive("box depth", d)?;
        Ok(self.store_solid(primitives::make_box(w, h, d)))
    }

    fn make_cylinder(
        &mut self,
        radius: f64,
        height: f64,
    ) -> Result<KernelShapeHandle, KernelError> {
        check_positive("cylinder radius", radius)?;
        check_positive("cylinder height", height)?;
        let solid = primitives::make_cylinder(radius, height)?;
        Ok(self.store_solid(solid))
    }

    fn translate(
        &mut self,
        shape: &KernelShapeHandle,
        offset: [f64; 3],
    ) -> Result<KernelShapeHandle, KernelError> {
        let solid = self.get_solid(shape)?;
        let moved = builder::translated(solid, Vector3::new(offset[0], offset[1], offset[2]));
        Ok(self.store_solid(moved))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelShapeHandle,
        b: &KernelShapeHandle,
    ) -> Result<KernelShapeHandle, KernelError> {
        let solid_a = self.get_solid(a)?.clone();
        let mut solid_b = self.get_solid(b)?.clone();

        // Subtraction = A ∩ ¬B. not() mutates in place.
        solid_b.not();
        // Tools that leave a closed cavity can panic inside truck's topology checks.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            truck_shapeops::and(&solid_a, &solid_b, BOOLEAN_TOLERANCE)
        }))
        .map_err(|_| KernelError::BooleanFailed {
            reason: "truck panicked during subtraction".to_string(),
        })?
        .ok_or_else(|| KernelError::BooleanFailed {
            reason: "truck and() returned None for subtraction".to_string(),
        })?;
        tracing::debug!(a = a.id(), b = b.id(), "truck subtraction succeeded");
        Ok(self.store_solid(result))
    }

    fn z_extent(&self, shape: &KernelShapeHandle) -> Result<(f64, f64), KernelError> {
        let solid = self.get_solid(shape)?;
        solid
            .boundaries()
            .iter()
            .flat_map(|shell| shell.vertex_iter())
            .map(|v| v.point().z)
            .fold(None, |acc: Option<(f64, f64)>, z| match acc {
                Some((lo, hi)) => Some((lo.min(z), hi.max(z))),
                None => Some((z, z)),
            })
            .ok_or_else(|| KernelError::Other {
                message: format!("shape #{} has no vertices", shape.id()),
            })
    }

    fn triangulate_faces(
        &mut self,
        shape: &KernelShapeHandle,
        tolerance: f64,
    ) -> Result<Vec<FaceTriangulation>, KernelError> {
        let solid = self.get_solid(shape)?;
        tessellation::triangulate_solid(solid, tolerance)
    }

    fn release_all(&mut self) {
        self.solids.clear();
    }

    fn shape_count(&self) -> usize {
        self.solids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truck_kernel_triangulates_box_per_face() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.make_box(1.0, 1.0, 1.0).unwrap();

        let faces = kernel.triangulate_faces(&handle, 0.1).unwrap();

        assert_eq!(faces.len(), 6, "Box should triangulate to 6 faces");
        for face in &faces {
            assert!(!face.triangles.is_empty(), "Every face should have triangles");
            let n = face.positions.len() as u32;
            assert!(
                face.triangles.iter().flatten().all(|&i| i < n),
                "Face-local indices must stay in range"
            );
        }
    }

    #[test]
    fn test_translate_moves_solid_and_keeps_original() {
        let mut kernel = TruckKernel::new();
        let base = kernel.make_box(1.0, 1.0, 1.0).unwrap();
        let moved = kernel.translate(&base, [5.0, 0.0, 0.0]).unwrap();

        assert_eq!(kernel.shape_count(), 2);

        let faces = kernel.triangulate_faces(&moved, 0.1).unwrap();
        let min_x = faces
            .iter()
            .flat_map(|f| f.positions.iter())
            .map(|p| p[0])
            .fold(f64::MAX, f64::min);
        assert!((min_x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_z_extent_of_translated_box() {
        let mut kernel = TruckKernel::new();
        let base = kernel.make_box(4.0, 4.0, 10.0).unwrap();
        let moved = kernel.translate(&base, [0.0, 0.0, -1.0]).unwrap();

        let (lo, hi) = kernel.z_extent(&moved).unwrap();
        assert!((lo + 1.0).abs() < 1e-9);
        assert!((hi - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_through_tool_is_subtracted() {
        let mut kernel = TruckKernel::new();
        let panel = kernel.make_box(100.0, 50.0, 10.0).unwrap();
        let tool = kernel.make_box(20.0, 20.0, 12.0).unwrap();
        let tool = kernel.translate(&tool, [10.0, 10.0, -1.0]).unwrap();

        let cut = kernel.boolean_subtract(&panel, &tool).unwrap();

        let faces = kernel.triangulate_faces(&cut, 0.5).unwrap();
        assert!(faces.len() > 6, "Hole walls add faces to the panel");
    }

    #[test]
    fn test_enclosed_cavity_is_an_error_not_a_panic() {
        let mut kernel = TruckKernel::new();
        let panel = kernel.make_box(100.0, 50.0, 10.0).unwrap();
        let tool = kernel.make_box(20.0, 20.0, 5.0).unwrap();
        let tool = kernel.translate(&tool, [10.0, 10.0, 2.0]).unwrap();

        let err = kernel.boolean_subtract(&panel, &tool).unwrap_err();

        assert!(matches!(err, KernelError::BooleanFailed { .. }));
        assert!(kernel.z_extent(&panel).is_ok(), "Kernel stays usable");
    }

    #[test]
    fn test_degenerate_box_is_rejected() {
        let mut kernel = TruckKernel::new();
        let err = kernel.make_box(0.0, 1.0, 1.0).unwrap_err();
        assert!(matches!(err, KernelError::InvalidParameter { .. }));
    }

    #[test]
    fn test_release_all_invalidates_handles() {
        let mut kernel = TruckKernel::new();
        let handle = kernel.make_box(1.0, 1.0, 1.0).unwrap();
        kernel.release_all();

        assert_eq!(kernel.shape_count(), 0);
        let err = kernel.triangulate_faces(&handle, 0.1).unwrap_err();
        assert!(matches!(err, KernelError::ShapeNotFound { .. }));
    }
}
