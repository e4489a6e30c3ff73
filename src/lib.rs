//! Halfedge mesh with local editing operations and a resampler.
//!
//! The central type is [`HalfEdgeMesh`]: an oriented 2-manifold polygon
//! mesh (possibly with boundary) stored as halfedges. Meshes are created
//! from polygon soup (see [`core::PolygonSoup`] and [`shape`]) and modified
//! through operations that either succeed and leave a valid mesh or refuse
//! with an [`EditError`] without touching anything:
//!
//! - flip, split and collapse edges, collapse faces,
//! - erase vertices and edges (merging the adjacent faces),
//! - bevel vertices, edges and faces,
//! - triangulate all faces.
//!
//! On top of that, [`algo`] contains the batch operations of the resampler:
//! Loop subdivision, quadric error decimation and isotropic remeshing. The
//! [`pick`] and [`selection`] modules are the glue for interactive editors.
//!
//! ```
//! use meshedit::{Element, Selection, shape};
//!
//! let mut mesh = shape::icosahedron().build().unwrap();
//! let e = mesh.edge_handles().next().unwrap();
//!
//! let mut selection = Selection::new();
//! selection.select(Element::Edge(e));
//! selection.split(&mut mesh).unwrap();
//!
//! assert_eq!(mesh.num_vertices(), 13);
//! assert!(matches!(selection.element(), Some(Element::Vertex(_))));
//! ```

pub mod algo;
pub mod core;
pub mod error;
pub mod handle;
pub mod map;
pub mod math;
pub mod pick;
pub mod selection;
pub mod shape;

pub use self::{
    algo::MeshResampler,
    core::HalfEdgeMesh,
    error::{BuildError, EditError, ResampleError},
    handle::{EdgeHandle, Element, FaceHandle, HalfEdgeHandle, Handle, VertexHandle, hsize},
    math::Pos3,
    pick::PickMap,
    selection::Selection,
};
