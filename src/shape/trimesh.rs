use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

use crate::bounding_volume::Aabb;
use crate::math::{Point, Real, Vector, VertexIndex, MAX_MESH_VERTICES};
use crate::partitioning::{BvParameters, BvParametersError, BvTree};
use crate::shape::{approximation, Geometry, TopologyInfo, Triangle};
use crate::utils::{PointKey, StridedPoints};

/// Indicated an inconsistency while building a triangle mesh.
#[derive(thiserror::Error, Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeshBuildError {
    /// A triangle mesh must contain at least three vertices.
    #[error("a triangle mesh must contain at least three vertices")]
    TooFewVertices,
    /// The vertex count does not fit in 16-bit indices.
    #[error("a triangle mesh cannot contain more than 65535 vertices")]
    TooManyVertices,
    /// The index buffer length is not a multiple of three.
    #[error("the index buffer length is not a multiple of three")]
    IndexCountNotMultipleOfThree,
    /// A triangle mesh must contain at least one triangle.
    #[error("a triangle mesh must contain at least one triangle")]
    EmptyIndices,
    /// A triangle references a vertex that does not exist.
    #[error("the triangle {triangle} references the missing vertex {index}")]
    IndexOutOfBounds {
        /// The faulty triangle.
        triangle: u32,
        /// The out-of-bounds vertex index.
        index: u32,
    },
    /// The material array does not contain one entry per triangle.
    #[error("expected {expected} materials (one per triangle), found {found}")]
    MaterialCountMismatch {
        /// The number of triangles.
        expected: usize,
        /// The length of the material array.
        found: usize,
    },
    /// The bounding-volume parameters are invalid.
    #[error("invalid bounding-volume parameters: {0}")]
    InvalidParameters(#[from] BvParametersError),
}

#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
/// Controls how a [`TriMesh`] is built.
pub struct MeshFlags(u32);

bitflags::bitflags! {
    impl MeshFlags: u32 {
        /// Build an axis-aligned bounding-box tree candidate.
        const AABB = 1;
        /// Build an oriented bounding-box tree candidate.
        const OBB = 1 << 1;
        /// Build a single-box candidate: one oriented box around the whole mesh.
        const SINGLE_BOX = 1 << 2;
        /// Build an axis-aligned tree in the principal frame of the mesh.
        const ROTATED_AABB = 1 << 3;
        /// Build a voxel-grid candidate.
        const VOXEL_GRID = 1 << 4;
        /// Replace the mesh by a box if it fits one.
        const APPROX_BOX = 1 << 5;
        /// Replace the mesh by a sphere if it fits one.
        const APPROX_SPHERE = 1 << 6;
        /// Replace the mesh by a cylinder if it fits one.
        const APPROX_CYLINDER = 1 << 7;
        /// Replace the mesh by a capsule if it fits one.
        const APPROX_CAPSULE = 1 << 8;
        /// Do not merge vertices sharing the exact same position.
        const NO_VERTEX_MERGE = 1 << 9;
        /// The mesh never moves: mass properties are not computed for it.
        const ALWAYS_STATIC = 1 << 10;
        /// Compute the triangle adjacency and islands.
        const TOPOLOGY = 1 << 11;
        /// All the bounding-volume candidate flavors.
        const BV_KINDS = Self::AABB.bits()
            | Self::OBB.bits()
            | Self::SINGLE_BOX.bits()
            | Self::ROTATED_AABB.bits()
            | Self::VOXEL_GRID.bits();
        /// All the primitive approximations.
        const APPROXIMATIONS = Self::APPROX_BOX.bits()
            | Self::APPROX_SPHERE.bits()
            | Self::APPROX_CYLINDER.bits()
            | Self::APPROX_CAPSULE.bits();
    }
}

impl Default for MeshFlags {
    fn default() -> Self {
        MeshFlags::AABB | MeshFlags::OBB | MeshFlags::TOPOLOGY
    }
}

impl MeshFlags {
    /// Does this flag set request at least one primitive approximation?
    pub fn wants_approximation(self) -> bool {
        self.intersects(MeshFlags::APPROXIMATIONS)
    }

    /// Should identical vertices be merged?
    pub fn merges_vertices(self) -> bool {
        !self.contains(MeshFlags::NO_VERTEX_MERGE)
    }

    /// Is the shape flagged as never moving?
    pub fn is_always_static(self) -> bool {
        self.contains(MeshFlags::ALWAYS_STATIC)
    }

    /// Should the topology be computed?
    pub fn wants_topology(self) -> bool {
        self.contains(MeshFlags::TOPOLOGY)
    }
}

/// Validating builder of triangle meshes.
#[derive(Clone, Debug)]
pub struct TriMeshBuilder {
    vertices: Vec<Point<Real>>,
    indices: Vec<VertexIndex>,
    materials: Option<Vec<u8>>,
    flags: MeshFlags,
    bv_parameters: BvParameters,
    approximation_tolerance: Real,
    island_split_threshold: usize,
}

impl TriMeshBuilder {
    /// The default relative tolerance used when testing primitive approximations.
    pub const DEFAULT_APPROXIMATION_TOLERANCE: Real = 0.05;
    /// The default triangle count above which islands are split hierarchically.
    pub const DEFAULT_ISLAND_SPLIT_THRESHOLD: usize = 4096;

    /// Starts building a mesh from a vertex buffer and a flat index buffer.
    pub fn new(vertices: Vec<Point<Real>>, indices: Vec<VertexIndex>) -> Self {
        Self {
            vertices,
            indices,
            materials: None,
            flags: MeshFlags::default(),
            bv_parameters: BvParameters::default(),
            approximation_tolerance: Self::DEFAULT_APPROXIMATION_TOLERANCE,
            island_split_threshold: Self::DEFAULT_ISLAND_SPLIT_THRESHOLD,
        }
    }

    /// Starts building a mesh from interleaved vertex data.
    pub fn from_strided(points: StridedPoints, indices: Vec<VertexIndex>) -> Self {
        Self::new(points.to_vec(), indices)
    }

    /// Sets the per-triangle material identifiers.
    pub fn materials(mut self, materials: Vec<u8>) -> Self {
        self.materials = Some(materials);
        self
    }

    /// Sets the mesh flags.
    pub fn flags(mut self, flags: MeshFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the bounding-volume tree parameters.
    pub fn bv_parameters(mut self, params: impl Into<BvParameters>) -> Self {
        self.bv_parameters = params.into();
        self
    }

    /// Sets the relative tolerance of primitive approximations.
    pub fn approximation_tolerance(mut self, tolerance: Real) -> Self {
        self.approximation_tolerance = tolerance;
        self
    }

    /// Sets the triangle count above which islands are split.
    pub fn island_split_threshold(mut self, threshold: usize) -> Self {
        self.island_split_threshold = threshold;
        self
    }

    /// Checks the structural constraints of the mesh buffers.
    pub fn validate(&self) -> Result<(), MeshBuildError> {
        if self.vertices.len() < 3 {
            return Err(MeshBuildError::TooFewVertices);
        }

        if self.vertices.len() > MAX_MESH_VERTICES {
            return Err(MeshBuildError::TooManyVertices);
        }

        if self.indices.is_empty() {
            return Err(MeshBuildError::EmptyIndices);
        }

        if self.indices.len() % 3 != 0 {
            return Err(MeshBuildError::IndexCountNotMultipleOfThree);
        }

        if let Some(pos) = self
            .indices
            .iter()
            .position(|i| *i as usize >= self.vertices.len())
        {
            return Err(MeshBuildError::IndexOutOfBounds {
                triangle: (pos / 3) as u32,
                index: self.indices[pos] as u32,
            });
        }

        if let Some(materials) = &self.materials {
            let expected = self.indices.len() / 3;
            if materials.len() != expected {
                return Err(MeshBuildError::MaterialCountMismatch {
                    expected,
                    found: materials.len(),
                });
            }
        }

        self.bv_parameters.validate()?;
        Ok(())
    }

    /// Builds the triangle mesh, ignoring the approximation flags.
    pub fn build_mesh(self) -> Result<TriMesh, MeshBuildError> {
        self.validate()?;

        let indices = self
            .indices
            .chunks_exact(3)
            .map(|t| [t[0], t[1], t[2]])
            .collect();

        Ok(TriMesh::assemble(
            self.vertices,
            indices,
            self.materials,
            self.flags,
            self.bv_parameters,
            self.island_split_threshold,
        ))
    }

    /// Builds the shape geometry.
    ///
    /// If an approximation flag is set and the mesh fits the corresponding primitive within the
    /// approximation tolerance, the primitive is returned instead of the mesh.
    pub fn build(self) -> Result<Geometry, MeshBuildError> {
        let tolerance = self.approximation_tolerance;
        let mesh = self.build_mesh()?;

        if mesh.flags().wants_approximation() {
            if let Some(primitive) = approximation::approximate(&mesh, tolerance) {
                return Ok(primitive);
            }
        }

        Ok(Geometry::TriMesh(mesh))
    }
}

/// A triangle mesh with 16-bit indices, its bounding-volume tree and its optional topology.
#[derive(Clone)]
pub struct TriMesh {
    vertices: Vec<Point<Real>>,
    indices: Vec<[VertexIndex; 3]>,
    materials: Option<Vec<u8>>,
    normals: Vec<Vector<Real>>,
    flags: MeshFlags,
    bv_parameters: BvParameters,
    island_split_threshold: usize,
    bv_tree: BvTree,
    topology: Option<TopologyInfo>,
}

impl fmt::Debug for TriMesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TriMesh {{ vertices: {}, triangles: {}, flags: {:?} }}",
            self.vertices.len(),
            self.indices.len(),
            self.flags
        )
    }
}

impl TriMesh {
    /// Creates a new triangle mesh with default flags and parameters.
    pub fn new(
        vertices: Vec<Point<Real>>,
        indices: Vec<[VertexIndex; 3]>,
    ) -> Result<Self, MeshBuildError> {
        TriMeshBuilder::new(vertices, indices.into_iter().flatten().collect()).build_mesh()
    }

    /// Assembles a mesh from already validated buffers.
    ///
    /// The buffers may be empty, which is how a fully carved mesh is represented.
    pub(crate) fn assemble(
        vertices: Vec<Point<Real>>,
        indices: Vec<[VertexIndex; 3]>,
        materials: Option<Vec<u8>>,
        flags: MeshFlags,
        bv_parameters: BvParameters,
        island_split_threshold: usize,
    ) -> Self {
        let (vertices, indices, materials) = if flags.merges_vertices() {
            merge_duplicate_vertices(vertices, indices, materials)
        } else {
            (vertices, indices, materials)
        };

        let normals = indices
            .iter()
            .map(|idx| {
                let tri = Triangle::new(
                    vertices[idx[0] as usize],
                    vertices[idx[1] as usize],
                    vertices[idx[2] as usize],
                );
                tri.normal().unwrap_or_else(Vector::zeros)
            })
            .collect();

        let bv_tree = BvTree::build(&vertices, &indices, flags, &bv_parameters);
        let topology = flags
            .wants_topology()
            .then(|| TopologyInfo::compute(&vertices, &indices, island_split_threshold));

        Self {
            vertices,
            indices,
            materials,
            normals,
            flags,
            bv_parameters,
            island_split_threshold,
            bv_tree,
            topology,
        }
    }

    /// Builds a new mesh with the same flags and parameters as `self`.
    ///
    /// Unlike [`TriMeshBuilder`], this accepts empty buffers. Vertices are never merged.
    pub(crate) fn with_same_settings(
        &self,
        vertices: Vec<Point<Real>>,
        indices: Vec<[VertexIndex; 3]>,
        materials: Option<Vec<u8>>,
    ) -> Result<Self, MeshBuildError> {
        if vertices.len() > MAX_MESH_VERTICES {
            return Err(MeshBuildError::TooManyVertices);
        }

        for (triangle, idx) in indices.iter().enumerate() {
            if let Some(index) = idx.iter().find(|i| **i as usize >= vertices.len()) {
                return Err(MeshBuildError::IndexOutOfBounds {
                    triangle: triangle as u32,
                    index: *index as u32,
                });
            }
        }

        if let Some(materials) = &materials {
            if materials.len() != indices.len() {
                return Err(MeshBuildError::MaterialCountMismatch {
                    expected: indices.len(),
                    found: materials.len(),
                });
            }
        }

        Ok(Self::assemble(
            vertices,
            indices,
            materials,
            self.flags | MeshFlags::NO_VERTEX_MERGE,
            self.bv_parameters,
            self.island_split_threshold,
        ))
    }

    /// The vertex buffer of this mesh.
    pub fn vertices(&self) -> &[Point<Real>] {
        &self.vertices
    }

    /// The index buffer of this mesh.
    pub fn indices(&self) -> &[[VertexIndex; 3]] {
        &self.indices
    }

    /// The per-triangle material identifiers, if any.
    pub fn materials(&self) -> Option<&[u8]> {
        self.materials.as_deref()
    }

    /// The material identifier of the given triangle, if the mesh has materials.
    pub fn material(&self, tri: u32) -> Option<u8> {
        self.materials.as_ref()?.get(tri as usize).copied()
    }

    /// The unit normal of each triangle (zero for degenerate triangles).
    pub fn normals(&self) -> &[Vector<Real>] {
        &self.normals
    }

    /// The flags this mesh was built with.
    pub fn flags(&self) -> MeshFlags {
        self.flags
    }

    /// The parameters the bounding-volume tree was built with.
    pub fn bv_parameters(&self) -> &BvParameters {
        &self.bv_parameters
    }

    /// The bounding-volume tree of this mesh.
    pub fn bv_tree(&self) -> &BvTree {
        &self.bv_tree
    }

    /// The adjacency and islands of this mesh, if they were computed.
    pub fn topology(&self) -> Option<&TopologyInfo> {
        self.topology.as_ref()
    }

    /// The number of triangles of this mesh.
    pub fn num_triangles(&self) -> usize {
        self.indices.len()
    }

    /// Does this mesh have no triangle?
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The `i`-th triangle of this mesh.
    pub fn triangle(&self, i: u32) -> Triangle {
        let idx = self.indices[i as usize];
        Triangle::new(
            self.vertices[idx[0] as usize],
            self.vertices[idx[1] as usize],
            self.vertices[idx[2] as usize],
        )
    }

    /// An iterator through all the triangles of this mesh.
    pub fn triangles(&self) -> impl ExactSizeIterator<Item = Triangle> + '_ {
        (0..self.indices.len() as u32).map(move |i| self.triangle(i))
    }

    /// The local-space bounding box of this mesh (invalid if the mesh is empty).
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }

    /// The signed volume enclosed by this mesh, positive for outward-facing triangles.
    pub fn signed_volume(&self) -> Real {
        self.triangles()
            .map(|t| t.a.coords.dot(&t.b.coords.cross(&t.c.coords)) / 6.0)
            .sum()
    }
}

/// Merges the vertices sharing the exact same position and deletes triangles that become
/// degenerate, together with their material.
fn merge_duplicate_vertices(
    vertices: Vec<Point<Real>>,
    indices: Vec<[VertexIndex; 3]>,
    materials: Option<Vec<u8>>,
) -> (Vec<Point<Real>>, Vec<[VertexIndex; 3]>, Option<Vec<u8>>) {
    let mut vtx_to_id = HashMap::new();
    let mut remap = Vec::with_capacity(vertices.len());
    let mut new_vertices = Vec::with_capacity(vertices.len());

    for pt in &vertices {
        let id = match vtx_to_id.entry(PointKey(*pt)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let id = new_vertices.len() as VertexIndex;
                new_vertices.push(*pt);
                *entry.insert(id)
            }
        };
        remap.push(id);
    }

    let mut new_indices = Vec::with_capacity(indices.len());
    let mut new_materials = materials.as_ref().map(|m| Vec::with_capacity(m.len()));

    for (tid, idx) in indices.iter().enumerate() {
        let [va, vb, vc] = idx.map(|i| remap[i as usize]);
        if va == vb || va == vc || vb == vc {
            continue;
        }

        new_indices.push([va, vb, vc]);
        if let (Some(out), Some(mats)) = (&mut new_materials, &materials) {
            out.push(mats[tid]);
        }
    }

    new_vertices.shrink_to_fit();
    (new_vertices, new_indices, new_materials)
}

#[cfg(test)]
mod test {
    use crate::math::{Point, Real};
    use crate::partitioning::BoundingVolumeParameters;
    use crate::shape::{MeshBuildError, MeshFlags, TriMesh, TriMeshBuilder};

    fn quad() -> Vec<Point<Real>> {
        vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn trimesh_error_empty_indices() {
        assert_eq!(
            TriMeshBuilder::new(quad(), vec![]).build_mesh().unwrap_err(),
            MeshBuildError::EmptyIndices
        );
    }

    #[test]
    fn trimesh_rejects_malformed_buffers() {
        assert_eq!(
            TriMeshBuilder::new(quad(), vec![0, 1]).validate(),
            Err(MeshBuildError::IndexCountNotMultipleOfThree)
        );
        assert_eq!(
            TriMeshBuilder::new(quad(), vec![0, 1, 2, 0, 2, 9]).validate(),
            Err(MeshBuildError::IndexOutOfBounds {
                triangle: 1,
                index: 9
            })
        );
        assert_eq!(
            TriMeshBuilder::new(quad(), vec![0, 1, 2])
                .materials(vec![0, 1])
                .validate(),
            Err(MeshBuildError::MaterialCountMismatch {
                expected: 1,
                found: 2
            })
        );
        assert_eq!(
            TriMeshBuilder::new(quad()[..2].to_vec(), vec![0, 1, 0]).validate(),
            Err(MeshBuildError::TooFewVertices)
        );
        assert!(BoundingVolumeParameters::new(0, 4, 1.0).is_err());
    }

    #[test]
    fn trimesh_merges_split_vertices() {
        let mut vtx = quad();
        vtx.push(Point::new(0.0, 0.0, 0.0));
        vtx.push(Point::new(1.0, 1.0, 0.0));
        let mesh = TriMeshBuilder::new(vtx.clone(), vec![0, 1, 2, 4, 5, 3])
            .materials(vec![3, 7])
            .build_mesh()
            .unwrap();
        assert_eq!(mesh.vertices().len(), 4);
        assert_eq!(mesh.topology().unwrap().neighbor(0, 2), Some(1));
        assert_eq!(mesh.material(1), Some(7));

        let split = TriMeshBuilder::new(vtx, vec![0, 1, 2, 4, 5, 3])
            .flags(MeshFlags::default() | MeshFlags::NO_VERTEX_MERGE)
            .build_mesh()
            .unwrap();
        assert_eq!(split.vertices().len(), 6);
        assert_eq!(split.topology().unwrap().neighbor(0, 2), None);
    }

    #[test]
    fn trimesh_normals_follow_winding() {
        let mesh = TriMesh::new(quad(), vec![[0, 1, 2], [0, 2, 3]]).unwrap();
        assert!(mesh.normals().iter().all(|n| n.z > 0.99));
        assert_eq!(mesh.num_triangles(), 2);
    }
}
