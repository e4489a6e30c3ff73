//! Error types of the mesh operations.

use failure::Fail;

use crate::handle::{Element, FaceHandle};


/// Reasons a local edit operation refuses to run. Whenever an operation
/// returns one of these, the mesh was not modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Fail)]
pub enum EditError {
    /// The handle does not refer to a live element of this mesh (anymore).
    #[fail(display = "{} does not exist in this mesh", _0)]
    Stale(Element),

    /// The operation is not defined for boundary elements.
    #[fail(display = "{} lies on the boundary", _0)]
    Boundary(Element),

    /// Executing the operation would make the mesh non-manifold.
    #[fail(display = "editing {} would make the mesh non-manifold", _0)]
    NonManifold(Element),

    /// The result would contain a face with fewer than three sides, a
    /// dangling vertex or a similar degenerate configuration.
    #[fail(display = "editing {} would create degenerate elements", _0)]
    Degenerate(Element),
}

impl EditError {
    /// The element the refused operation was applied to.
    pub fn element(&self) -> Element {
        match *self {
            EditError::Stale(e)
            | EditError::Boundary(e)
            | EditError::NonManifold(e)
            | EditError::Degenerate(e) => e,
        }
    }
}

/// Errors when building a mesh from polygon soup.
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub enum BuildError {
    #[fail(display = "polygon {} references vertex {}, but there are only {} positions",
        polygon, index, num_positions)]
    IndexOutOfRange {
        polygon: usize,
        index: usize,
        num_positions: usize,
    },

    #[fail(display = "polygon {} has only {} vertices (at least 3 are required)", polygon, degree)]
    DegeneratePolygon {
        polygon: usize,
        degree: usize,
    },

    #[fail(display = "polygon {} contains vertex {} more than once", polygon, index)]
    RepeatedVertex {
        polygon: usize,
        index: usize,
    },

    /// The directed edge `from -> to` is used by two polygons. Either more
    /// than two polygons share an edge or the polygons are not consistently
    /// oriented.
    #[fail(display = "edge {} -> {} is used by more than one polygon in the same direction \
        (non-manifold edge or inconsistent orientation)", from, to)]
    NonManifoldEdge {
        from: usize,
        to: usize,
    },

    /// The faces around vertex `index` do not form a single fan.
    #[fail(display = "the faces around vertex {} do not form a single fan", index)]
    NonManifoldVertex {
        index: usize,
    },
}

/// Errors of the batch operations of the resampler. If one of these is
/// returned, the mesh was not modified.
#[derive(Debug, Clone, Copy, PartialEq, Fail)]
pub enum ResampleError {
    #[fail(display = "the mesh contains non-triangular faces (e.g. {:?} with degree {}); \
        triangulate first", face, degree)]
    NonTriangular {
        face: FaceHandle,
        degree: usize,
    },

    /// The edge length to aim for is zero, negative or not finite. For
    /// `resample` without explicit target length, this happens if all edges
    /// of the input have length zero.
    #[fail(display = "invalid target edge length {}", length)]
    InvalidTargetLength {
        length: f64,
    },

    /// One of the local edits the batch operation consists of was refused.
    /// This indicates a mesh the algorithm can't handle (or a bug).
    #[fail(display = "local edit failed during resampling: {}", _0)]
    Edit(#[cause] EditError),
}

impl From<EditError> for ResampleError {
    fn from(src: EditError) -> Self {
        ResampleError::Edit(src)
    }
}
