use super::PhysicalBody;
use crate::mass_properties::MassProperties;
use crate::math::Real;
use crate::shape::SharedShape;
use num::Zero;
use slab::Slab;
use std::collections::HashMap;
use std::sync::atomic::Ordering;

/// The density used to compute the mass properties of registered bodies.
///
/// With a unit density, the mass of a body equals its volume.
pub const BODY_DENSITY: Real = 1.0;

/// A generation-checked handle to a body of a [`PhysicalBodyRegistry`].
///
/// The default handle is invalid. A handle becomes invalid too once the reference count of its
/// body reaches zero, even if its slot is reused by another body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    /// A handle that never refers to any body.
    pub const fn invalid() -> Self {
        Self {
            index: u32::MAX,
            generation: u32::MAX,
        }
    }

    /// Is this the invalid handle?
    pub fn is_invalid(&self) -> bool {
        *self == Self::invalid()
    }

    /// The slot index and generation of this handle.
    pub fn into_raw_parts(self) -> (u32, u32) {
        (self.index, self.generation)
    }

    /// Rebuilds a handle from its slot index and generation.
    pub fn from_raw_parts(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl Default for BodyHandle {
    fn default() -> Self {
        Self::invalid()
    }
}

/// Error returned when an operation is given a handle that refers to no live body.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
#[error("invalid or released body handle {0:?}")]
pub struct InvalidHandle(pub BodyHandle);

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct BodyKey {
    shape: usize,
    surface: u32,
    material_mapping: Option<Vec<u32>>,
}

#[derive(Debug)]
struct BodySlot {
    body: PhysicalBody,
    key: Option<BodyKey>,
}

/// A reference-counted cache of physical bodies.
///
/// Registering the same shape twice with the same surface and material mapping returns the same
/// body, with its reference count incremented.
///
/// Reference counts are atomic: [`Self::increment_reference_count`] only needs a shared
/// reference and may run concurrently with lookups. Registering and releasing bodies change the
/// slot table and need exclusive access, so a registry shared between threads is wrapped in a
/// lock taken for writing by [`Self::register`] and [`Self::decrement_reference_count`].
#[derive(Debug, Default)]
pub struct PhysicalBodyRegistry {
    bodies: Slab<BodySlot>,
    generations: Vec<u32>,
    shared: HashMap<BodyKey, usize>,
}

impl PhysicalBodyRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of bodies currently alive.
    pub fn live_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// Registers a body, or takes a new reference to an identical one.
    ///
    /// Without a shape, or with an empty mesh, the body has zero mass properties and is never
    /// shared: its mass properties can be filled later with [`Self::populate`]. Meshes flagged
    /// as always static skip the mass computation.
    pub fn register(
        &mut self,
        shape: Option<SharedShape>,
        surface: u32,
        material_mapping: Option<Vec<u32>>,
    ) -> BodyHandle {
        let shape = shape.filter(|s| !s.is_empty());

        let key = shape.as_ref().map(|s| BodyKey {
            shape: s.id(),
            surface,
            material_mapping: material_mapping.clone(),
        });

        if let Some(index) = key.as_ref().and_then(|k| self.shared.get(k)).copied() {
            if let Some(slot) = self.bodies.get(index) {
                let _ = slot.body.reference_count.fetch_add(1, Ordering::AcqRel);
                return self.handle_for(index);
            }
        }

        let (mass_properties, volume) = match &shape {
            Some(s) if s.as_trimesh().is_some_and(|m| m.flags().is_always_static()) => {
                (MassProperties::zero(), 0.0)
            }
            Some(s) => {
                let mprops = MassProperties::from_geometry(s, BODY_DENSITY);
                let volume = mprops.mass() / BODY_DENSITY;
                (mprops, volume)
            }
            None => (MassProperties::zero(), 0.0),
        };

        let body = PhysicalBody::new(shape, surface, material_mapping, mass_properties, volume);
        let index = self.bodies.insert(BodySlot {
            body,
            key: key.clone(),
        });

        if index >= self.generations.len() {
            self.generations.resize(index + 1, 0);
        }

        if let Some(key) = key {
            let _ = self.shared.insert(key, index);
        }

        self.handle_for(index)
    }

    fn handle_for(&self, index: usize) -> BodyHandle {
        BodyHandle {
            index: index as u32,
            generation: self.generations[index],
        }
    }

    fn slot_index(&self, handle: BodyHandle) -> Option<usize> {
        let index = handle.index as usize;
        if self.bodies.contains(index) && self.generations.get(index) == Some(&handle.generation) {
            Some(index)
        } else {
            None
        }
    }

    /// The body referred to by `handle`, if it is still alive.
    pub fn get(&self, handle: BodyHandle) -> Option<&PhysicalBody> {
        self.slot_index(handle)
            .and_then(|index| self.bodies.get(index))
            .map(|slot| &slot.body)
    }

    /// Is `handle` referring to a live body?
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.slot_index(handle).is_some()
    }

    /// Takes one more reference to a body and returns the new reference count.
    ///
    /// This may be called from several threads holding a shared reference to the registry.
    /// Using an invalid handle is a programming error: it panics in debug builds.
    pub fn increment_reference_count(&self, handle: BodyHandle) -> Result<usize, InvalidHandle> {
        let body = self.checked_body(handle)?;
        Ok(body.reference_count.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Releases one reference to a body and returns the remaining reference count.
    ///
    /// The body, and its reference to the shape, are destroyed when the count reaches zero, so
    /// this needs exclusive access to the registry. Releasing a body past zero is a programming
    /// error: it panics in debug builds, and is reported as an [`InvalidHandle`] otherwise.
    pub fn decrement_reference_count(&mut self, handle: BodyHandle) -> Result<usize, InvalidHandle> {
        let remaining = {
            let body = self.checked_body(handle).map_err(|e| {
                log::warn!("Body reference count decremented past zero: {:?}.", handle);
                e
            })?;
            body.reference_count.fetch_sub(1, Ordering::AcqRel) - 1
        };

        if remaining == 0 {
            let index = handle.index as usize;
            let slot = self.bodies.remove(index);
            self.generations[index] = self.generations[index].wrapping_add(1);

            if let Some(key) = slot.key {
                let _ = self.shared.remove(&key);
            }
        }

        Ok(remaining)
    }

    /// Overwrites the mass properties and volume of a body.
    ///
    /// This is how a body registered without a shape gets its mass distribution.
    pub fn populate(
        &mut self,
        handle: BodyHandle,
        mass_properties: MassProperties,
        volume: Real,
    ) -> Result<(), InvalidHandle> {
        let valid = self.slot_index(handle);
        debug_assert!(valid.is_some(), "invalid body handle {:?}", handle);
        let slot = valid
            .and_then(|index| self.bodies.get_mut(index))
            .ok_or(InvalidHandle(handle))?;
        slot.body.mass_properties = mass_properties;
        slot.body.volume = volume;
        Ok(())
    }

    /// The surface type associated to a material id of the given body.
    pub fn surface_for_material(
        &self,
        handle: BodyHandle,
        material_id: u32,
    ) -> Result<u32, InvalidHandle> {
        self.checked_body(handle)
            .map(|body| body.surface_for_material(material_id))
    }

    /// An iterator through all the live bodies and their handles.
    pub fn iter(&self) -> impl Iterator<Item = (BodyHandle, &PhysicalBody)> + '_ {
        self.bodies
            .iter()
            .map(|(index, slot)| (self.handle_for(index), &slot.body))
    }

    fn checked_body(&self, handle: BodyHandle) -> Result<&PhysicalBody, InvalidHandle> {
        let body = self.get(handle);
        debug_assert!(body.is_some(), "invalid body handle {:?}", handle);
        body.ok_or(InvalidHandle(handle))
    }
}

#[cfg(test)]
mod test {
    use super::{BodyHandle, PhysicalBodyRegistry};
    use crate::mass_properties::MassProperties;
    use crate::math::{Point, Vector};
    use crate::shape::{Ball, Geometry, MeshFlags, SharedShape, TriMeshBuilder};
    use crate::transformation::to_trimesh::cuboid_mesh;

    fn cube(flags: MeshFlags) -> SharedShape {
        let (vtx, idx) = cuboid_mesh(Vector::repeat(0.5));
        let idx = idx.iter().flat_map(|t| t.iter().copied()).collect();
        SharedShape::from_builder(TriMeshBuilder::new(vtx, idx).flags(flags)).unwrap()
    }

    #[test]
    fn identical_registrations_share_a_body() {
        let shape = cube(MeshFlags::default());
        let mut registry = PhysicalBodyRegistry::new();

        let h1 = registry.register(Some(shape.clone()), 3, None);
        let h2 = registry.register(Some(shape.clone()), 3, None);
        let h3 = registry.register(Some(shape.clone()), 4, None);
        let h4 = registry.register(Some(shape.clone()), 3, Some(vec![7, 8]));

        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
        assert_ne!(h1, h4);
        assert_eq!(registry.live_bodies(), 3);
        assert_eq!(registry.get(h1).unwrap().reference_count(), 2);

        let body = registry.get(h1).unwrap();
        assert_relative_eq!(body.volume(), 1.0, epsilon = 1.0e-5);
        assert_relative_eq!(body.centroid(), Point::origin(), epsilon = 1.0e-5);
        assert_relative_eq!(body.inertia(), Vector::repeat(1.0 / 6.0), epsilon = 1.0e-5);
    }

    #[test]
    fn shared_references_from_several_threads() {
        let shape = cube(MeshFlags::default());
        let registry = std::sync::RwLock::new(PhysicalBodyRegistry::new());
        let handle = registry.write().unwrap().register(Some(shape), 0, None);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let _ = scope.spawn(|| {
                    let registry = registry.read().unwrap();
                    for _ in 0..100 {
                        let _ = registry.increment_reference_count(handle).unwrap();
                    }
                });
            }
        });

        let mut registry = registry.write().unwrap();
        assert_eq!(registry.get(handle).unwrap().reference_count(), 401);
        for _ in 0..401 {
            let _ = registry.decrement_reference_count(handle).unwrap();
        }
        assert!(!registry.contains(handle));
    }

    #[test]
    fn body_is_destroyed_with_its_last_reference() {
        let shape = cube(MeshFlags::default());
        let mut registry = PhysicalBodyRegistry::new();

        let handle = registry.register(Some(shape.clone()), 0, None);
        assert_eq!(shape.reference_count(), 2);
        assert_eq!(registry.increment_reference_count(handle), Ok(2));
        assert_eq!(registry.decrement_reference_count(handle), Ok(1));
        assert!(registry.contains(handle));
        assert_eq!(registry.decrement_reference_count(handle), Ok(0));

        assert!(!registry.contains(handle));
        assert!(registry.get(handle).is_none());
        assert_eq!(registry.live_bodies(), 0);
        assert_eq!(shape.reference_count(), 1);

        // The slot is reused, but the old handle stays invalid.
        let other = registry.register(Some(shape), 0, None);
        assert_eq!(other.into_raw_parts().0, handle.into_raw_parts().0);
        assert_ne!(other, handle);
        assert!(registry.get(handle).is_none());
    }

    #[test]
    fn empty_bodies_are_populated_later() {
        let mut registry = PhysicalBodyRegistry::new();
        let h1 = registry.register(None, 1, None);
        let h2 = registry.register(None, 1, None);
        assert_ne!(h1, h2);

        let body = registry.get(h1).unwrap();
        assert_eq!(body.volume(), 0.0);
        assert_eq!(body.mass_properties().inv_mass, 0.0);

        let mprops = MassProperties::from_radius(1.0, 1.0);
        registry.populate(h1, mprops, mprops.mass()).unwrap();
        assert_eq!(*registry.get(h1).unwrap().mass_properties(), mprops);
        assert_eq!(registry.get(h2).unwrap().volume(), 0.0);
    }

    #[test]
    fn static_meshes_skip_mass_computation() {
        let shape = cube(MeshFlags::default() | MeshFlags::ALWAYS_STATIC);
        let mut registry = PhysicalBodyRegistry::new();
        let handle = registry.register(Some(shape), 0, None);
        assert_eq!(registry.get(handle).unwrap().mass_properties().inv_mass, 0.0);
    }

    #[test]
    fn surfaces_go_through_the_material_mapping() {
        let ball = SharedShape::new(Geometry::Ball(Ball::new(Point::origin(), 1.0))).unwrap();
        let mut registry = PhysicalBodyRegistry::new();
        let handle = registry.register(Some(ball), 5, Some(vec![10, 11]));

        assert_eq!(registry.surface_for_material(handle, 1), Ok(11));
        assert_eq!(registry.surface_for_material(handle, 2), Ok(2));
        let body = registry.get(handle).unwrap();
        assert_eq!(body.surface(), 5);
        assert_eq!(body.surface_for_triangle(0), 5);
    }

    #[test]
    fn triangle_surfaces_use_mesh_materials() {
        let (vtx, idx) = cuboid_mesh(Vector::repeat(0.5));
        let idx = idx.iter().flat_map(|t| t.iter().copied()).collect();
        let materials = (0..12).map(|i| (i % 2) as u8).collect();
        let shape =
            SharedShape::from_builder(TriMeshBuilder::new(vtx, idx).materials(materials)).unwrap();
        let mut registry = PhysicalBodyRegistry::new();
        let handle = registry.register(Some(shape), 9, Some(vec![20, 21]));

        let body = registry.get(handle).unwrap();
        assert_eq!(body.surface_for_triangle(0), 20);
        assert_eq!(body.surface_for_triangle(1), 21);
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic)]
    fn released_handles_are_rejected() {
        let mut registry = PhysicalBodyRegistry::new();
        let handle = registry.register(None, 0, None);
        assert_eq!(registry.decrement_reference_count(handle), Ok(0));
        assert!(registry.decrement_reference_count(handle).is_err());
        assert!(registry
            .increment_reference_count(BodyHandle::default())
            .is_err());
    }
}
