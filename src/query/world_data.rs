use crate::math::{Matrix, Point, Pose, Real, Vector};

/// The placement and motion of a shape instance in world-space.
///
/// World data are only read by intersection queries, and never stored by shapes.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct WorldData {
    /// The world-space translation of the shape.
    pub offset: Vector<Real>,
    /// The world-space rotation of the shape.
    pub rotation: Matrix<Real>,
    /// The uniform scale of the shape.
    pub scale: Real,
    /// The linear velocity of the center of mass.
    pub velocity: Vector<Real>,
    /// The angular velocity around the center of mass.
    pub angular_velocity: Vector<Real>,
    /// The center of mass, in the local frame of the shape.
    pub center_of_mass: Point<Real>,
    /// The bounding volume tree node the traversal starts from. The root if `None`.
    pub start_node: Option<u32>,
}

impl Default for WorldData {
    fn default() -> Self {
        Self {
            offset: Vector::zeros(),
            rotation: Matrix::identity(),
            scale: 1.0,
            velocity: Vector::zeros(),
            angular_velocity: Vector::zeros(),
            center_of_mass: Point::origin(),
            start_node: None,
        }
    }
}

impl WorldData {
    /// A motionless shape translated by `offset`.
    pub fn at(offset: Vector<Real>) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    /// Sets the rotation.
    pub fn with_rotation(mut self, rotation: Matrix<Real>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Sets the uniform scale.
    pub fn with_scale(mut self, scale: Real) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the linear velocity.
    pub fn with_velocity(mut self, velocity: Vector<Real>) -> Self {
        self.velocity = velocity;
        self
    }

    /// Sets the angular velocity.
    pub fn with_angular_velocity(mut self, angular_velocity: Vector<Real>) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    /// Sets the local center of mass.
    pub fn with_center_of_mass(mut self, center_of_mass: Point<Real>) -> Self {
        self.center_of_mass = center_of_mass;
        self
    }

    /// Sets the traversal start node.
    pub fn with_start_node(mut self, node: u32) -> Self {
        self.start_node = Some(node);
        self
    }

    /// The pose mapping the local frame of the shape to world-space.
    pub fn pose(&self) -> Pose {
        Pose::new(self.rotation, self.offset, self.scale)
    }

    /// The center of mass in world-space.
    pub fn world_center_of_mass(&self) -> Point<Real> {
        self.pose().transform_point(&self.center_of_mass)
    }

    /// The velocity of the world-space point `pt`, assumed rigidly attached to the shape.
    pub fn velocity_at(&self, pt: &Point<Real>) -> Vector<Real> {
        self.velocity + self.angular_velocity.cross(&(pt - self.world_center_of_mass()))
    }
}
