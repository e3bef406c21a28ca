use crate::math::{Isometry, Matrix, Point, PrincipalAngularInertia, Real, Rotation, Vector};
use crate::utils;
use approx::{AbsDiffEq, RelativeEq};
use na::ComplexField;
use num::Zero;
use std::iter::Sum;
use std::ops::{Add, AddAssign, MulAssign};

const EPSILON: Real = f32::EPSILON as Real;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
/// The local mass properties of a body.
pub struct MassProperties {
    /// The center of mass of the body expressed in its local-space.
    pub local_com: Point<Real>,
    /// The inverse of the mass of the body.
    ///
    /// If this is zero, the body is assumed to have infinite mass.
    pub inv_mass: Real,
    /// The inverse of the square root of the principal angular inertia of the body.
    ///
    /// Components set to zero are assumed to be infinite along the corresponding principal axis.
    pub inv_principal_inertia_sqrt: PrincipalAngularInertia<Real>,
    /// The principal vectors of the local angular inertia tensor of the body.
    pub principal_inertia_local_frame: Rotation<Real>,
}

impl MassProperties {
    /// Initializes the mass properties from the given center-of-mass, mass, and principal angular inertia.
    ///
    /// The center-of-mass is specified in the local-space of the body.
    /// The principal angular inertia are the angular inertia along the coordinate axes in the local-space
    /// of the body.
    pub fn new(
        local_com: Point<Real>,
        mass: Real,
        principal_inertia: PrincipalAngularInertia<Real>,
    ) -> Self {
        Self::with_principal_inertia_frame(local_com, mass, principal_inertia, Rotation::identity())
    }

    /// Initializes the mass properties from the given center-of-mass, mass, and principal angular inertia.
    ///
    /// The principal angular inertia are the angular inertia along the coordinate axes defined by
    /// the `principal_inertia_local_frame` expressed in the local-space of the body.
    pub fn with_principal_inertia_frame(
        local_com: Point<Real>,
        mass: Real,
        principal_inertia: PrincipalAngularInertia<Real>,
        principal_inertia_local_frame: Rotation<Real>,
    ) -> Self {
        let inv_mass = utils::inv(mass);
        let inv_principal_inertia_sqrt =
            principal_inertia.map(|e| utils::inv(ComplexField::sqrt(e)));
        Self {
            local_com,
            inv_mass,
            inv_principal_inertia_sqrt,
            principal_inertia_local_frame,
        }
    }

    /// Initialize a new `MassProperties` from a given center-of-mass, mass, and angular inertia matrix.
    ///
    /// The angular inertia matrix is diagonalized in order to extract the principal inertia
    /// values and principal inertia frame.
    pub fn with_inertia_matrix(local_com: Point<Real>, mass: Real, inertia: Matrix<Real>) -> Self {
        let eigen = inertia.symmetric_eigen();
        let mut axes = eigen.eigenvectors;

        // The eigenvectors may form a reflection.
        if axes.determinant() < 0.0 {
            axes.column_mut(2).mul_assign(-1.0);
        }

        let principal_inertia_local_frame =
            Rotation::from_matrix_eps(&axes, 1.0e-6, 10, na::one());
        // Drop negative eigenvalues.
        let principal_inertia = eigen.eigenvalues.map(|e| if e < EPSILON { 0.0 } else { e });

        Self::with_principal_inertia_frame(
            local_com,
            mass,
            principal_inertia,
            principal_inertia_local_frame,
        )
    }

    /// The mass of the body.
    pub fn mass(&self) -> Real {
        utils::inv(self.inv_mass)
    }

    /// The angular inertia along the principal inertia axes of the body.
    pub fn principal_inertia(&self) -> PrincipalAngularInertia<Real> {
        self.inv_principal_inertia_sqrt.map(|e| utils::inv(e * e))
    }

    /// The world-space center of mass of the body.
    pub fn world_com(&self, pos: &Isometry<Real>) -> Point<Real> {
        pos * self.local_com
    }

    /// Reconstructs the angular inertia tensor of the body from its principal inertia values and axes.
    pub fn reconstruct_inertia_matrix(&self) -> Matrix<Real> {
        let frame = self.principal_inertia_local_frame.to_rotation_matrix();
        frame.matrix()
            * Matrix::from_diagonal(&self.principal_inertia())
            * frame.inverse().matrix()
    }

    /// The angular inertia tensor of this body, relative to a point `shift` away from its
    /// center of mass (parallel axis theorem).
    pub(crate) fn construct_shifted_inertia_matrix(&self, shift: Vector<Real>) -> Matrix<Real> {
        let matrix = self.reconstruct_inertia_matrix();

        if self.inv_mass != 0.0 {
            let mass = 1.0 / self.inv_mass;
            let diag = shift.norm_squared();
            let diagm = Matrix::from_diagonal_element(diag);
            matrix + (diagm - shift * shift.transpose()) * mass
        } else {
            matrix
        }
    }

    /// Transform each element of the mass properties.
    pub fn transform_by(&self, m: &Isometry<Real>) -> Self {
        // NOTE: we don't apply the parallel axis theorem here
        // because the center of mass is also transformed.
        Self {
            local_com: m * self.local_com,
            inv_mass: self.inv_mass,
            inv_principal_inertia_sqrt: self.inv_principal_inertia_sqrt,
            principal_inertia_local_frame: m.rotation * self.principal_inertia_local_frame,
        }
    }

    /// Changes the mass on these mass-properties.
    ///
    /// Setting `adjust_angular_inertia` to `true` scales the angular inertia by
    /// `new_mass / prev_mass`. Setting it to `false` leaves the angular inertia untouched.
    pub fn set_mass(&mut self, new_mass: Real, adjust_angular_inertia: bool) {
        let new_inv_mass = utils::inv(new_mass);

        if adjust_angular_inertia {
            let curr_mass = utils::inv(self.inv_mass);
            self.inv_principal_inertia_sqrt *= new_inv_mass.sqrt() * curr_mass.sqrt();
        }

        self.inv_mass = new_inv_mass;
    }
}

/// The rotation mapping the local `y` axis to `axis`, with the same complementary axes as the
/// tessellation of revolution shapes.
pub(crate) fn y_aligned_frame(axis: &Vector<Real>) -> Rotation<Real> {
    let e1 = utils::orthonormal_basis(axis)[0];
    let e2 = e1.cross(axis);
    let basis = Matrix::from_columns(&[e1, *axis, e2]);
    Rotation::from_rotation_matrix(&na::Rotation3::from_matrix_unchecked(basis))
}

impl Zero for MassProperties {
    fn zero() -> Self {
        Self {
            inv_mass: 0.0,
            inv_principal_inertia_sqrt: na::zero(),
            principal_inertia_local_frame: Rotation::identity(),
            local_com: Point::origin(),
        }
    }

    fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
}

impl Add<MassProperties> for MassProperties {
    type Output = Self;

    fn add(self, other: MassProperties) -> Self {
        if self.is_zero() {
            return other;
        } else if other.is_zero() {
            return self;
        }

        let m1 = utils::inv(self.inv_mass);
        let m2 = utils::inv(other.inv_mass);
        let inv_mass = utils::inv(m1 + m2);
        let local_com = (self.local_com * m1 + other.local_com.coords * m2) * inv_mass;
        let i1 = self.construct_shifted_inertia_matrix(local_com - self.local_com);
        let i2 = other.construct_shifted_inertia_matrix(local_com - other.local_com);
        let inertia = i1 + i2;

        Self::with_inertia_matrix(local_com, m1 + m2, inertia)
    }
}

impl AddAssign<MassProperties> for MassProperties {
    fn add_assign(&mut self, rhs: MassProperties) {
        *self = *self + rhs
    }
}

impl Sum<MassProperties> for MassProperties {
    fn sum<I>(iter: I) -> Self
    where
        I: Iterator<Item = Self>,
    {
        let mut total_mass = 0.0;
        let mut total_com = Point::origin();
        let mut total_inertia = Matrix::zeros();
        // This is needed because we iterate twice.
        let mut all_props = Vec::new();

        for props in iter {
            let mass = utils::inv(props.inv_mass);
            total_mass += mass;
            total_com += props.local_com.coords * mass;
            all_props.push(props);
        }

        if total_mass > 0.0 {
            total_com /= total_mass;
        }

        for props in all_props {
            total_inertia += props.construct_shifted_inertia_matrix(total_com - props.local_com);
        }

        Self::with_inertia_matrix(total_com, total_mass, total_inertia)
    }
}

impl AbsDiffEq for MassProperties {
    type Epsilon = Real;
    fn default_epsilon() -> Self::Epsilon {
        <Real as AbsDiffEq>::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.reconstruct_inertia_matrix()
            .abs_diff_eq(&other.reconstruct_inertia_matrix(), epsilon)
            && self.local_com.abs_diff_eq(&other.local_com, epsilon)
            && self.mass().abs_diff_eq(&other.mass(), epsilon)
    }
}

impl RelativeEq for MassProperties {
    fn default_max_relative() -> Self::Epsilon {
        <Real as RelativeEq>::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.reconstruct_inertia_matrix().relative_eq(
            &other.reconstruct_inertia_matrix(),
            epsilon,
            max_relative,
        ) && self
            .local_com
            .relative_eq(&other.local_com, epsilon, max_relative)
            && self.mass().relative_eq(&other.mass(), epsilon, max_relative)
    }
}

#[cfg(test)]
mod test {
    use super::MassProperties;
    use crate::math::{Matrix, Point, Rotation, Vector};
    use approx::assert_relative_eq;
    use num::Zero;

    #[test]
    fn mass_properties_add_partial_zero() {
        let m1 = MassProperties {
            local_com: Point::origin(),
            inv_mass: 2.0,
            inv_principal_inertia_sqrt: na::zero(),
            principal_inertia_local_frame: Rotation::identity(),
        };
        let m2 = MassProperties::zero();

        assert_eq!(m1 + m2, m1);
        assert_eq!(m2 + m1, m1);
    }

    #[test]
    fn sum_of_two_halves_is_the_whole() {
        let whole = MassProperties::from_cuboid_parts(
            2.0,
            Point::origin(),
            Matrix::identity(),
            Vector::new(1.0, 0.5, 0.5),
        );
        let left = MassProperties::from_cuboid_parts(
            2.0,
            Point::new(-0.5, 0.0, 0.0),
            Matrix::identity(),
            Vector::new(0.5, 0.5, 0.5),
        );
        let right = MassProperties::from_cuboid_parts(
            2.0,
            Point::new(0.5, 0.0, 0.0),
            Matrix::identity(),
            Vector::new(0.5, 0.5, 0.5),
        );

        let sum: MassProperties = [left, right].into_iter().sum();
        assert_relative_eq!(sum, whole, epsilon = 1.0e-5);
        assert_relative_eq!(left + right, whole, epsilon = 1.0e-5);
    }

    #[test]
    fn inertia_matrix_roundtrip() {
        let inertia = Matrix::new(3.0, 0.5, 0.0, 0.5, 2.0, 0.0, 0.0, 0.0, 1.0);
        let mprops = MassProperties::with_inertia_matrix(Point::origin(), 1.0, inertia);
        assert_relative_eq!(mprops.reconstruct_inertia_matrix(), inertia, epsilon = 1.0e-5);
    }

    #[test]
    fn set_mass_scales_inertia() {
        let mut mprops = MassProperties::new(Point::origin(), 2.0, Vector::new(1.0, 2.0, 3.0));
        mprops.set_mass(4.0, true);
        assert_relative_eq!(mprops.mass(), 4.0, epsilon = 1.0e-6);
        assert_relative_eq!(
            mprops.principal_inertia(),
            Vector::new(2.0, 4.0, 6.0),
            epsilon = 1.0e-5
        );
    }
}
