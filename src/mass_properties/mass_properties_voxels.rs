use crate::mass_properties::MassProperties;
use crate::math::{Matrix, Point, Real, Vector};
use crate::shape::Voxels;
use num::Zero;

impl MassProperties {
    /// Computes the mass properties of a set of voxels.
    ///
    /// Every occupied cell is a cube of uniform density.
    pub fn from_voxels(density: Real, voxels: &Voxels) -> Self {
        let num_not_empty = voxels.num_occupied();

        if num_not_empty == 0 {
            return Self::zero();
        }

        let half_cell = Vector::repeat(voxels.cell_size() / 2.0);
        let block_ref_mprops =
            MassProperties::from_cuboid_parts(density, Point::origin(), Matrix::identity(), half_cell);
        let cell_center = |cell: [u32; 3]| voxels.cell_aabb(cell).center();

        let mut com = Point::origin();
        for (_, cell) in voxels.occupied_cells() {
            com += cell_center(cell).coords;
        }
        com.coords /= num_not_empty as Real;

        let mut angular_inertia = Matrix::zeros();
        for (_, cell) in voxels.occupied_cells() {
            angular_inertia += block_ref_mprops.construct_shifted_inertia_matrix(cell_center(cell) - com);
        }

        let mass = block_ref_mprops.mass() * num_not_empty as Real;
        Self::with_inertia_matrix(com, mass, angular_inertia)
    }
}
