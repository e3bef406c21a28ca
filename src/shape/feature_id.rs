/// An identifier of a feature of a shape.
///
/// This identifier is local to the primitive that was hit: for a triangle, vertex and edge
/// identifiers are in `0..3`, with edge `k` joining the vertices `k` and `(k + 1) % 3`.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, Default)]
pub enum FeatureId {
    /// Shape-dependent identifier of a vertex.
    Vertex(u32),
    /// Shape-dependent identifier of an edge.
    Edge(u32),
    /// Shape-dependent identifier of a face.
    Face(u32),
    /// Unknown identifier.
    #[default]
    Unknown,
}

impl FeatureId {
    /// Retrieves the value of the identifier if `self` is a vertex.
    pub fn vertex(self) -> Option<u32> {
        match self {
            FeatureId::Vertex(id) => Some(id),
            _ => None,
        }
    }

    /// Retrieves the value of the identifier if `self` is an edge.
    pub fn edge(self) -> Option<u32> {
        match self {
            FeatureId::Edge(id) => Some(id),
            _ => None,
        }
    }

    /// Retrieves the value of the identifier if `self` is a face.
    pub fn face(self) -> Option<u32> {
        match self {
            FeatureId::Face(id) => Some(id),
            _ => None,
        }
    }
}
