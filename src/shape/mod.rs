//! Shapes supported by physgeom.

pub use self::ball::Ball;
pub use self::capsule::Capsule;
pub use self::cuboid::Cuboid;
pub use self::cylinder::Cylinder;
pub use self::feature_id::FeatureId;
pub use self::heightfield::HeightField;
pub use self::ray::Ray;
pub use self::shape::{Geometry, ShapeError, ShapeType};
pub use self::shared_shape::{ShapeLock, SharedShape};
pub use self::support_map::SupportMap;
pub use self::topology::{compute_adjacency, connected_components, Island, TopologyInfo, NO_NEIGHBOR};
pub use self::triangle::Triangle;
pub use self::trimesh::{MeshBuildError, MeshFlags, TriMesh, TriMeshBuilder};
pub use self::voxels::Voxels;

pub mod approximation;
mod ball;
mod capsule;
mod cuboid;
mod cylinder;
mod feature_id;
mod heightfield;
mod ray;
mod shape;
mod shared_shape;
mod support_map;
mod topology;
mod triangle;
mod trimesh;
mod voxels;
