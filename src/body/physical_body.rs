use crate::mass_properties::MassProperties;
use crate::math::{Point, PrincipalAngularInertia, Real, Rotation};
use crate::shape::SharedShape;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A shape bound to a surface type, an optional material mapping, and its mass properties.
///
/// Bodies are owned by a [`PhysicalBodyRegistry`](super::PhysicalBodyRegistry) and accessed
/// through a [`BodyHandle`](super::BodyHandle).
#[derive(Debug)]
pub struct PhysicalBody {
    pub(super) shape: Option<SharedShape>,
    pub(super) surface: u32,
    pub(super) material_mapping: Option<Vec<u32>>,
    pub(super) mass_properties: MassProperties,
    pub(super) volume: Real,
    pub(super) reference_count: AtomicUsize,
}

impl PhysicalBody {
    pub(super) fn new(
        shape: Option<SharedShape>,
        surface: u32,
        material_mapping: Option<Vec<u32>>,
        mass_properties: MassProperties,
        volume: Real,
    ) -> Self {
        Self {
            shape,
            surface,
            material_mapping,
            mass_properties,
            volume,
            reference_count: AtomicUsize::new(1),
        }
    }

    /// The shape of this body, or `None` if it was registered without one.
    #[inline]
    pub fn shape(&self) -> Option<&SharedShape> {
        self.shape.as_ref()
    }

    /// The default surface type of this body.
    #[inline]
    pub fn surface(&self) -> u32 {
        self.surface
    }

    /// The table mapping per-triangle material ids to surface types.
    #[inline]
    pub fn material_mapping(&self) -> Option<&[u32]> {
        self.material_mapping.as_deref()
    }

    /// The mass properties of this body, computed with a unit density.
    #[inline]
    pub fn mass_properties(&self) -> &MassProperties {
        &self.mass_properties
    }

    /// The principal moments of inertia, in the body frame.
    pub fn inertia(&self) -> PrincipalAngularInertia<Real> {
        self.mass_properties.principal_inertia()
    }

    /// The orientation of the principal inertia axes relative to the shape's local frame.
    pub fn orientation(&self) -> Rotation<Real> {
        self.mass_properties.principal_inertia_local_frame
    }

    /// The center of mass, in the shape's local frame.
    pub fn centroid(&self) -> Point<Real> {
        self.mass_properties.local_com
    }

    /// The volume enclosed by the shape.
    #[inline]
    pub fn volume(&self) -> Real {
        self.volume
    }

    /// The current number of references to this body.
    pub fn reference_count(&self) -> usize {
        self.reference_count.load(Ordering::Acquire)
    }

    /// The surface type associated to a material id.
    ///
    /// The material mapping is consulted first. Ids it does not cover are returned as is.
    pub fn surface_for_material(&self, material_id: u32) -> u32 {
        self.material_mapping
            .as_ref()
            .and_then(|mapping| mapping.get(material_id as usize))
            .copied()
            .unwrap_or(material_id)
    }

    /// The surface type of the given triangle of the body's mesh.
    ///
    /// Triangles without a material, and shapes that are not meshes, use the body's default
    /// surface.
    pub fn surface_for_triangle(&self, triangle: u32) -> u32 {
        match self
            .shape
            .as_ref()
            .and_then(|s| s.as_trimesh())
            .and_then(|m| m.material(triangle))
        {
            Some(material) => self.surface_for_material(material as u32),
            None => self.surface,
        }
    }
}
