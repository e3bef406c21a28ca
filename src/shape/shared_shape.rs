use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::math::{Point, Real, VertexIndex};
use crate::shape::{Geometry, MeshBuildError, ShapeError, TriMesh, TriMeshBuilder};

struct ShapeData {
    geometry: Geometry,
    locks: AtomicUsize,
}

/// A reference-counted, shareable geometric shape.
///
/// Cloning a `SharedShape` increments the atomic reference count, dropping it decrements the
/// count. The geometry is destroyed when the last handle is dropped. Shapes are immutable:
/// editing operations such as mesh subtraction produce a new `SharedShape`.
#[derive(Clone)]
pub struct SharedShape(Arc<ShapeData>);

impl Deref for SharedShape {
    type Target = Geometry;
    fn deref(&self) -> &Geometry {
        &self.0.geometry
    }
}

impl AsRef<Geometry> for SharedShape {
    fn as_ref(&self) -> &Geometry {
        &self.0.geometry
    }
}

impl fmt::Debug for SharedShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SharedShape({:?})", self.0.geometry)
    }
}

impl From<TriMesh> for SharedShape {
    fn from(mesh: TriMesh) -> Self {
        Self::wrap(Geometry::TriMesh(mesh))
    }
}

impl SharedShape {
    fn wrap(geometry: Geometry) -> Self {
        SharedShape(Arc::new(ShapeData {
            geometry,
            locks: AtomicUsize::new(0),
        }))
    }

    /// Wraps a geometry after checking its dimensions.
    pub fn new(geometry: Geometry) -> Result<Self, ShapeError> {
        geometry.validate()?;
        Ok(Self::wrap(geometry))
    }

    /// Builds a shape from a validated mesh builder.
    ///
    /// The result may be a primitive if the builder requests approximations.
    pub fn from_builder(builder: TriMeshBuilder) -> Result<Self, MeshBuildError> {
        builder.build().map(Self::wrap)
    }

    /// Initialize a triangle mesh shape with default flags and parameters.
    pub fn trimesh(
        vertices: Vec<Point<Real>>,
        indices: Vec<[VertexIndex; 3]>,
    ) -> Result<Self, MeshBuildError> {
        TriMesh::new(vertices, indices).map(Self::from)
    }

    /// The geometry of this shape.
    pub fn geometry(&self) -> &Geometry {
        &self.0.geometry
    }

    /// Do both handles refer to the same shape?
    pub fn ptr_eq(a: &SharedShape, b: &SharedShape) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// A stable identifier of the underlying shape, valid while any handle is alive.
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }

    /// The number of live handles to this shape.
    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Locks the shape for direct reads of its internal arrays.
    ///
    /// The lock is released when the returned guard is dropped, so it is released on every exit
    /// path.
    pub fn lock(&self) -> ShapeLock<'_> {
        let _ = self.0.locks.fetch_add(1, Ordering::AcqRel);
        ShapeLock { shape: self }
    }

    /// The number of outstanding locks on this shape.
    pub fn lock_count(&self) -> usize {
        self.0.locks.load(Ordering::Acquire)
    }
}

/// A guard granting direct access to the arrays of a locked shape.
pub struct ShapeLock<'a> {
    shape: &'a SharedShape,
}

impl ShapeLock<'_> {
    /// The vertex buffer, if the shape is a triangle mesh.
    pub fn vertices(&self) -> Option<&[Point<Real>]> {
        self.shape.as_trimesh().map(TriMesh::vertices)
    }

    /// The index buffer, if the shape is a triangle mesh.
    pub fn indices(&self) -> Option<&[[VertexIndex; 3]]> {
        self.shape.as_trimesh().map(TriMesh::indices)
    }

    /// The per-triangle materials, if the shape is a triangle mesh with materials.
    pub fn materials(&self) -> Option<&[u8]> {
        self.shape.as_trimesh().and_then(TriMesh::materials)
    }
}

impl Deref for ShapeLock<'_> {
    type Target = Geometry;
    fn deref(&self) -> &Geometry {
        self.shape.geometry()
    }
}

impl Drop for ShapeLock<'_> {
    fn drop(&mut self) {
        let prev = self.shape.0.locks.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "Unbalanced shape lock.");
    }
}

#[cfg(test)]
mod test {
    use super::SharedShape;
    use crate::math::Point;
    use crate::shape::{Ball, Geometry};

    #[test]
    fn shared_shape_reference_count_round_trip() {
        let shape = SharedShape::new(Geometry::Ball(Ball::new(Point::origin(), 1.0))).unwrap();
        let clones: Vec<_> = (0..5).map(|_| shape.clone()).collect();
        assert_eq!(shape.reference_count(), 6);
        drop(clones);
        assert_eq!(shape.reference_count(), 1);
    }

    #[test]
    fn shape_lock_is_released_on_drop() {
        let shape = SharedShape::new(Geometry::Ball(Ball::new(Point::origin(), 1.0))).unwrap();
        {
            let guard = shape.lock();
            let _second = shape.lock();
            assert_eq!(shape.lock_count(), 2);
            assert!(guard.vertices().is_none());
        }
        assert_eq!(shape.lock_count(), 0);
    }

    #[test]
    fn invalid_primitive_is_rejected() {
        assert!(SharedShape::new(Geometry::Ball(Ball::new(Point::origin(), 0.0))).is_err());
    }
}
