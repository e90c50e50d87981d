//! MockKernel: deterministic test double implementing Kernel.
//!
//! Produces synthetic per-face triangulations with predictable counts and
//! coordinates. Booleans do not carve geometry: a subtraction keeps the base
//! shape's faces, appends the tool's faces clamped into the base's bounds and
//! turned inside out, and bumps its cut counter. That is enough to test the
//! fold and the recompute plumbing without a B-rep library.

use crate::traits::Kernel;
use crate::types::*;
use std::collections::HashMap;
use std::f64::consts::PI;
use std::time::Duration;

/// Segments around a mock cylinder.
const CYLINDER_SEGMENTS: usize = 16;

/// A call the mock received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum KernelCall {
    MakeBox { w: f64, h: f64, d: f64 },
    MakeCylinder { radius: f64, height: f64 },
    Translate { offset: [f64; 3] },
    Subtract,
    Triangulate { tolerance: f64 },
    ReleaseAll,
}

#[derive(Debug, Clone)]
struct MockShape {
    faces: Vec<FaceTriangulation>,
    cuts: usize,
}

/// Deterministic test double for the geometry kernel.
pub struct MockKernel {
    next_handle: u64,
    shapes: HashMap<u64, MockShape>,
    calls: Vec<KernelCall>,
    subtract_failure: Option<String>,
    panic_on_subtract: bool,
    triangulate_delay: Option<Duration>,
}

impl MockKernel {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            shapes: HashMap::new(),
            calls: Vec::new(),
            subtract_failure: None,
            panic_on_subtract: false,
            triangulate_delay: None,
        }
    }

    /// Make every subsequent `boolean_subtract` fail with `reason`.
    pub fn fail_subtract_with(mut self, reason: impl Into<String>) -> Self {
        self.subtract_failure = Some(reason.into());
        self
    }

    /// Make every subsequent `boolean_subtract` panic.
    pub fn panic_on_subtract(mut self) -> Self {
        self.panic_on_subtract = true;
        self
    }

    /// Sleep this long inside every `triangulate_faces` call.
    pub fn with_triangulate_delay(mut self, delay: Duration) -> Self {
        self.triangulate_delay = Some(delay);
        self
    }

    /// Every call received so far.
    pub fn calls(&self) -> &[KernelCall] {
        &self.calls
    }

    /// Number of subtractions folded into a shape.
    pub fn cut_count(&self, handle: &KernelShapeHandle) -> Option<usize> {
        self.shapes.get(&handle.id()).map(|s| s.cuts)
    }

    fn store(&mut self, shape: MockShape) -> KernelShapeHandle {
        let h = KernelShapeHandle(self.next_handle);
        self.next_handle += 1;
        self.shapes.insert(h.id(), shape);
        h
    }

    fn get(&self, handle: &KernelShapeHandle) -> Result<&MockShape, KernelError> {
        self.shapes
            .get(&handle.id())
            .ok_or_else(|| KernelError::not_found(handle))
    }
}

impl Default for MockKernel {
    fn default() -> Self {
        Self::new()
    }
}

/// One planar quad split into two triangles.
fn quad(corners: [[f64; 3]; 4], normal: [f64; 3]) -> FaceTriangulation {
    FaceTriangulation {
        positions: corners.to_vec(),
        normals: Some(vec![normal; 4]),
        triangles: vec![[0, 1, 2], [0, 2, 3]],
    }
}

fn box_faces(w: f64, h: f64, d: f64) -> Vec<FaceTriangulation> {
    vec![
        quad(
            [[0.0, 0.0, 0.0], [0.0, h, 0.0], [w, h, 0.0], [w, 0.0, 0.0]],
            [0.0, 0.0, -1.0],
        ),
        quad(
            [[0.0, 0.0, d], [w, 0.0, d], [w, h, d], [0.0, h, d]],
            [0.0, 0.0, 1.0],
        ),
        quad(
            [[0.0, 0.0, 0.0], [w, 0.0, 0.0], [w, 0.0, d], [0.0, 0.0, d]],
            [0.0, -1.0, 0.0],
        ),
        quad(
            [[0.0, h, 0.0], [0.0, h, d], [w, h, d], [w, h, 0.0]],
            [0.0, 1.0, 0.0],
        ),
        quad(
            [[0.0, 0.0, 0.0], [0.0, 0.0, d], [0.0, h, d], [0.0, h, 0.0]],
            [-1.0, 0.0, 0.0],
        ),
        quad(
            [[w, 0.0, 0.0], [w, h, 0.0], [w, h, d], [w, 0.0, d]],
            [1.0, 0.0, 0.0],
        ),
    ]
}

/// Axis-aligned bounds of every face position.
fn bounds(faces: &[FaceTriangulation]) -> Option<([f64; 3], [f64; 3])> {
    faces
        .iter()
        .flat_map(|f| f.positions.iter())
        .fold(None, |acc: Option<([f64; 3], [f64; 3])>, p| {
            let (mut lo, mut hi) = acc.unwrap_or((*p, *p));
            for i in 0..3 {
                lo[i] = lo[i].min(p[i]);
                hi[i] = hi[i].max(p[i]);
            }
            Some((lo, hi))
        })
}

/// Prism approximation of a cylinder: one side face and two cap fans.
fn cylinder_faces(radius: f64, height: f64) -> Vec<FaceTriangulation> {
    let n = CYLINDER_SEGMENTS;
    let angle = |i: usize| 2.0 * PI * (i as f64) / (n as f64);

    let mut side = FaceTriangulation::default();
    let mut side_normals = Vec::with_capacity(2 * (n + 1));
    for i in 0..=n {
        let (s, c) = angle(i).sin_cos();
        side.positions.push([radius * c, radius * s, 0.0]);
        side.positions.push([radius * c, radius * s, height]);
        side_normals.push([c, s, 0.0]);
        side_normals.push([c, s, 0.0]);
    }
    for i in 0..n as u32 {
        let (b, t, nb, nt) = (2 * i, 2 * i + 1, 2 * i + 2, 2 * i + 3);
        side.triangles.push([b, nb, nt]);
        side.triangles.push([b, nt, t]);
    }
    side.normals = Some(side_normals);

    let cap = |z: f64, up: bool| {
        let mut face = FaceTriangulation::default();
        face.positions.push([0.0, 0.0, z]);
        for i in 0..n {
            let (s, c) = angle(i).sin_cos();
            face.positions.push([radius * c, radius * s, z]);
        }
        for i in 0..n as u32 {
            let a = 1 + i;
            let b = 1 + (i + 1) % n as u32;
            face.triangles.push(if up { [0, a, b] } else { [0, b, a] });
        }
        let nz = if up { 1.0 } else { -1.0 };
        face.normals = Some(vec![[0.0, 0.0, nz]; n + 1]);
        face
    };

    vec![side, cap(0.0, false), cap(height, true)]
}

impl Kernel for MockKernel {
    fn make_box(&mut self, w: f64, h: f64, d: f64) -> Result<KernelShapeHandle, KernelError> {
        self.calls.push(KernelCall::MakeBox { w, h, d });
        check_positive("box width", w)?;
        check_positive("box height", h)?;
        check_positive("box depth", d)?;
        Ok(self.store(MockShape {
            faces: box_faces(w, h, d),
            cuts: 0,
        }))
    }

    fn make_cylinder(
        &mut self,
        radius: f64,
        height: f64,
    ) -> Result<KernelShapeHandle, KernelError> {
        self.calls.push(KernelCall::MakeCylinder { radius, height });
        check_positive("cylinder radius", radius)?;
        check_positive("cylinder height", height)?;
        Ok(self.store(MockShape {
            faces: cylinder_faces(radius, height),
            cuts: 0,
        }))
    }

    fn translate(
        &mut self,
        shape: &KernelShapeHandle,
        offset: [f64; 3],
    ) -> Result<KernelShapeHandle, KernelError> {
        self.calls.push(KernelCall::Translate { offset });
        let mut moved = self.get(shape)?.clone();
        for face in &mut moved.faces {
            for p in &mut face.positions {
                p[0] += offset[0];
                p[1] += offset[1];
                p[2] += offset[2];
            }
        }
        Ok(self.store(moved))
    }

    fn boolean_subtract(
        &mut self,
        a: &KernelShapeHandle,
        b: &KernelShapeHandle,
    ) -> Result<KernelShapeHandle, KernelError> {
        self.calls.push(KernelCall::Subtract);
        if self.panic_on_subtract {
            panic!("mock kernel aborted during subtraction");
        }
        if let Some(reason) = &self.subtract_failure {
            return Err(KernelError::BooleanFailed {
                reason: reason.clone(),
            });
        }
        let tool = self.get(b)?.clone();
        let mut result = self.get(a)?.clone();
        if let Some((lo, hi)) = bounds(&result.faces) {
            for mut face in tool.faces {
                for p in &mut face.positions {
                    for i in 0..3 {
                        p[i] = p[i].clamp(lo[i], hi[i]);
                    }
                }
                for tri in &mut face.triangles {
                    tri.swap(1, 2);
                }
                if let Some(normals) = &mut face.normals {
                    for n in normals.iter_mut() {
                        *n = n.map(|c| -c);
                    }
                }
                result.faces.push(face);
            }
        }
        result.cuts += 1;
        Ok(self.store(result))
    }

    fn z_extent(&self, shape: &KernelShapeHandle) -> Result<(f64, f64), KernelError> {
        bounds(&self.get(shape)?.faces)
            .map(|(lo, hi)| (lo[2], hi[2]))
            .ok_or_else(|| KernelError::Other {
                message: format!("shape #{} has no vertices", shape.id()),
            })
    }

    fn triangulate_faces(
        &mut self,
        shape: &KernelShapeHandle,
        tolerance: f64,
    ) -> Result<Vec<FaceTriangulation>, KernelError> {
        self.calls.push(KernelCall::Triangulate { tolerance });
        if let Some(delay) = self.triangulate_delay {
            std::thread::sleep(delay);
        }
        Ok(self.get(shape)?.faces.clone())
    }

    fn release_all(&mut self) {
        self.calls.push(KernelCall::ReleaseAll);
        self.shapes.clear();
    }

    fn shape_count(&self) -> usize {
        self.shapes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mock_box_has_six_quad_faces() {
        let mut mk = MockKernel::new();
        let h = mk.make_box(2.0, 3.0, 4.0).unwrap();
        let faces = mk.triangulate_faces(&h, 0.5).unwrap();

        assert_eq!(faces.len(), 6);
        assert!(faces.iter().all(|f| f.positions.len() == 4));
        assert!(faces.iter().all(|f| f.triangles.len() == 2));
        assert!(faces.iter().all(|f| f.normals.is_some()));
    }

    #[test]
    fn test_mock_cylinder_ring_sits_on_radius() {
        let mut mk = MockKernel::new();
        let h = mk.make_cylinder(5.0, 2.0).unwrap();
        let faces = mk.triangulate_faces(&h, 0.5).unwrap();

        assert_eq!(faces.len(), 3);
        for p in &faces[0].positions {
            assert_relative_eq!((p[0] * p[0] + p[1] * p[1]).sqrt(), 5.0, epsilon = 1e-9);
        }
        assert_eq!(faces[1].triangles.len(), CYLINDER_SEGMENTS);
    }

    #[test]
    fn test_mock_translate_offsets_positions() {
        let mut mk = MockKernel::new();
        let base = mk.make_box(1.0, 1.0, 1.0).unwrap();
        let moved = mk.translate(&base, [10.0, 20.0, 0.0]).unwrap();
        let faces = mk.triangulate_faces(&moved, 0.5).unwrap();

        assert_eq!(faces[0].positions[0], [10.0, 20.0, 0.0]);
        assert_eq!(mk.shape_count(), 2);
    }

    #[test]
    fn test_mock_subtract_counts_cuts_and_records_calls() {
        let mut mk = MockKernel::new();
        let base = mk.make_box(1.0, 1.0, 1.0).unwrap();
        let tool = mk.make_cylinder(0.1, 1.0).unwrap();
        let cut = mk.boolean_subtract(&base, &tool).unwrap();

        assert_eq!(mk.cut_count(&cut), Some(1));
        assert_eq!(mk.cut_count(&base), Some(0));
        assert_eq!(mk.calls().last(), Some(&KernelCall::Subtract));
    }

    #[test]
    fn test_mock_subtract_adds_tool_faces_inside_base() {
        let mut mk = MockKernel::new();
        let base = mk.make_box(10.0, 10.0, 2.0).unwrap();
        let tool = mk.make_box(2.0, 2.0, 4.0).unwrap();
        let tool = mk.translate(&tool, [4.0, 4.0, -1.0]).unwrap();
        let cut = mk.boolean_subtract(&base, &tool).unwrap();

        let faces = mk.triangulate_faces(&cut, 0.5).unwrap();
        assert_eq!(faces.len(), 12);
        assert_eq!(mk.z_extent(&cut).unwrap(), (0.0, 2.0));
        // Tool faces point into the removed material.
        assert_eq!(faces[6].normals.as_ref().unwrap()[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_mock_z_extent_follows_translation() {
        let mut mk = MockKernel::new();
        let h = mk.make_cylinder(1.0, 3.0).unwrap();
        let moved = mk.translate(&h, [0.0, 0.0, -1.0]).unwrap();

        assert_eq!(mk.z_extent(&moved).unwrap(), (-1.0, 2.0));
        assert!(mk.z_extent(&KernelShapeHandle(99)).is_err());
    }

    #[test]
    fn test_mock_injected_subtract_failure() {
        let mut mk = MockKernel::new().fail_subtract_with("coplanar faces");
        let base = mk.make_box(1.0, 1.0, 1.0).unwrap();
        let tool = mk.make_box(0.5, 0.5, 0.5).unwrap();

        let err = mk.boolean_subtract(&base, &tool).unwrap_err();
        assert!(err.to_string().contains("coplanar faces"));
    }

    #[test]
    fn test_mock_release_all_drops_shapes() {
        let mut mk = MockKernel::new();
        let h = mk.make_box(1.0, 1.0, 1.0).unwrap();
        mk.release_all();

        assert_eq!(mk.shape_count(), 0);
        assert!(mk.triangulate_faces(&h, 0.5).is_err());
    }
}
