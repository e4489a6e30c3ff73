//! Handles to refer to mesh elements, and the [`Element`] sum type.
//!
//! A handle is a small `Copy` value: a slot index into one of the arenas of a
//! [`HalfEdgeMesh`][crate::HalfEdgeMesh] plus the generation of that slot at
//! the time the handle was created. When an element is removed, the
//! generation of its slot is bumped, so stale handles are detected instead of
//! silently referring to whatever element reuses the slot later.

use std::{fmt, hash::Hash};

use derive_more::From;


/// The integer type used for handle indices and generations.
///
/// This is `u32` by default. With the `large-handle` feature, it's `u64`.
#[cfg(not(feature = "large-handle"))]
#[allow(non_camel_case_types)]
pub type hsize = u32;

/// The integer type used for handle indices and generations.
#[cfg(feature = "large-handle")]
#[allow(non_camel_case_types)]
pub type hsize = u64;


/// Types that refer to one element in a mesh.
///
/// The `idx` is the slot index inside an arena, the `generation` is the
/// counter of that slot. Two handles are equal only if both are equal.
pub trait Handle: 'static + Copy + fmt::Debug + Eq + Ord + Hash {
    /// Creates a handle from the raw slot index and generation.
    fn new(idx: hsize, generation: hsize) -> Self;

    /// Returns the slot index.
    fn idx(&self) -> hsize;

    /// Returns the generation of the slot this handle was created for.
    fn generation(&self) -> hsize;

    /// Shorthand for `idx() as usize`.
    #[inline(always)]
    fn to_usize(&self) -> usize {
        self.idx() as usize
    }

    /// A handle that never refers to an existing element. Used as
    /// placeholder while new elements are wired together.
    #[inline(always)]
    fn dangling() -> Self {
        Self::new(hsize::max_value(), hsize::max_value())
    }
}

macro_rules! make_handle_type {
    ($(#[$attr:meta])* $name:ident = $short:expr;) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            idx: hsize,
            generation: hsize,
        }

        impl Handle for $name {
            #[inline(always)]
            fn new(idx: hsize, generation: hsize) -> Self {
                Self { idx, generation }
            }

            #[inline(always)]
            fn idx(&self) -> hsize {
                self.idx
            }

            #[inline(always)]
            fn generation(&self) -> hsize {
                self.generation
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                if self.generation == 0 {
                    write!(f, "{}{}", $short, self.idx)
                } else {
                    write!(f, "{}{}@{}", $short, self.idx, self.generation)
                }
            }
        }
    };
}

make_handle_type! {
    /// Handle to refer to a vertex.
    VertexHandle = "V";
}
make_handle_type! {
    /// Handle to refer to a face (real face or boundary loop).
    FaceHandle = "F";
}
make_handle_type! {
    /// Handle to refer to an (undirected) edge.
    EdgeHandle = "E";
}
make_handle_type! {
    /// Handle to refer to a half edge.
    ///
    /// Both half edges of an edge live in the slot of that edge: the index of
    /// a half edge is `2 * edge_index + side`. Thus the twin is found by
    /// flipping the lowest bit and the edge by halving the index. The
    /// generation is always the one of the edge slot.
    HalfEdgeHandle = "H";
}

#[cfg(not(feature = "large-handle"))]
static_assertions::assert_eq_size!(VertexHandle, u64);
#[cfg(not(feature = "large-handle"))]
static_assertions::assert_eq_size!(HalfEdgeHandle, u64);

impl EdgeHandle {
    /// Returns the canonical half edge of this edge (side 0).
    #[inline(always)]
    pub fn half(self) -> HalfEdgeHandle {
        HalfEdgeHandle::new(self.idx * 2, self.generation)
    }

    /// Returns both half edges of this edge: `[side 0, side 1]`.
    #[inline(always)]
    pub fn halves(self) -> [HalfEdgeHandle; 2] {
        let h = self.half();
        [h, h.twin()]
    }
}

impl HalfEdgeHandle {
    /// Returns the oppositely oriented half edge of the same edge.
    #[inline(always)]
    pub fn twin(self) -> Self {
        Self::new(self.idx ^ 1, self.generation)
    }

    /// Returns the edge this half edge belongs to.
    #[inline(always)]
    pub fn edge(self) -> EdgeHandle {
        EdgeHandle::new(self.idx / 2, self.generation)
    }

    /// Returns `0` for the canonical half edge of the edge, `1` for its twin.
    #[inline(always)]
    pub fn side(self) -> usize {
        (self.idx & 1) as usize
    }
}


/// One mesh element of any kind.
///
/// This is what a selection or a pick id refers to. Code that has to behave
/// differently for different kinds of elements matches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, From)]
pub enum Element {
    Vertex(VertexHandle),
    Edge(EdgeHandle),
    Face(FaceHandle),
    HalfEdge(HalfEdgeHandle),
}

impl Element {
    pub fn vertex(self) -> Option<VertexHandle> {
        match self {
            Element::Vertex(v) => Some(v),
            _ => None,
        }
    }

    pub fn edge(self) -> Option<EdgeHandle> {
        match self {
            Element::Edge(e) => Some(e),
            _ => None,
        }
    }

    pub fn face(self) -> Option<FaceHandle> {
        match self {
            Element::Face(f) => Some(f),
            _ => None,
        }
    }

    pub fn half_edge(self) -> Option<HalfEdgeHandle> {
        match self {
            Element::HalfEdge(h) => Some(h),
            _ => None,
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Element::Vertex(h) => write!(f, "vertex {:?}", h),
            Element::Edge(h) => write!(f, "edge {:?}", h),
            Element::Face(h) => write!(f, "face {:?}", h),
            Element::HalfEdge(h) => write!(f, "half edge {:?}", h),
        }
    }
}
