use crate::math::{Point, Real, Vector};

bitflags::bitflags! {
    /// Flags controlling which results an intersection query produces.
    #[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct IntersectionFlags: u32 {
        /// Stop at the first contact found.
        const SINGLE_CONTACT = 1 << 0;
        /// Never merge point contacts into areal contacts.
        const NO_AREA_CONTACTS = 1 << 1;
        /// Do not trace the borders of intersection areas.
        const NO_CONTACT_BORDER = 1 << 2;
        /// Only chain border segments coming from topologically adjacent triangles.
        const EXACT_BORDER = 1 << 3;
    }
}

/// How the unprojection separating two overlapping shapes is computed.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum UnprojectionMode {
    /// Translate the first shape, along its relative velocity if fast enough, or along
    /// the contact normal otherwise.
    #[default]
    Linear,
    /// Rotate the first shape around the world-space axis passing through `center`.
    Rotational {
        /// A point of the rotation axis.
        center: Point<Real>,
        /// The direction of the rotation axis.
        axis: Vector<Real>,
    },
}

/// Parameters of an intersection query.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct IntersectionParameters {
    /// The unprojection mode.
    pub unprojection_mode: UnprojectionMode,
    /// Relative speeds below this fall back to unprojecting along the contact normal.
    pub minimal_relative_speed: Real,
    /// Point contacts whose normals differ by less than this angle (in radians) are
    /// merged into a single areal contact.
    pub max_surface_gap_angle: Real,
    /// Unprojections longer than this are clamped.
    pub max_unprojection_distance: Real,
    /// Contacts on the positive side of the plane with this normal, passing through the
    /// center of mass of the first shape, are discarded.
    pub clipping_plane: Option<Vector<Real>>,
    /// If set, the first shape is swept along its velocity during this amount of time.
    pub sweep_step: Option<Real>,
    /// Result flags.
    pub flags: IntersectionFlags,
}

impl Default for IntersectionParameters {
    fn default() -> Self {
        Self {
            unprojection_mode: UnprojectionMode::Linear,
            minimal_relative_speed: 1.0e-3,
            max_surface_gap_angle: 0.2,
            max_unprojection_distance: Real::MAX,
            clipping_plane: None,
            sweep_step: None,
            flags: IntersectionFlags::empty(),
        }
    }
}

impl IntersectionParameters {
    /// Sets the unprojection mode.
    pub fn with_unprojection_mode(mut self, mode: UnprojectionMode) -> Self {
        self.unprojection_mode = mode;
        self
    }

    /// Sets the minimal relative speed.
    pub fn with_minimal_relative_speed(mut self, speed: Real) -> Self {
        self.minimal_relative_speed = speed;
        self
    }

    /// Sets the maximum surface gap angle.
    pub fn with_max_surface_gap_angle(mut self, angle: Real) -> Self {
        self.max_surface_gap_angle = angle;
        self
    }

    /// Sets the maximum unprojection distance.
    pub fn with_max_unprojection_distance(mut self, distance: Real) -> Self {
        self.max_unprojection_distance = distance;
        self
    }

    /// Sets the clipping plane normal.
    pub fn with_clipping_plane(mut self, normal: Vector<Real>) -> Self {
        self.clipping_plane = Some(normal);
        self
    }

    /// Enables the sweep test over the given time step.
    pub fn with_sweep_step(mut self, step: Real) -> Self {
        self.sweep_step = Some(step);
        self
    }

    /// Sets the flags.
    pub fn with_flags(mut self, flags: IntersectionFlags) -> Self {
        self.flags = flags;
        self
    }
}
