//! The [`HalfEdgeMesh`]: element store, relations, queries and the integrity
//! checker.

// # Some notes for developers about this implementation
//
// - Both half edges of an edge live in the same slot of `edges`. The twin of
//   a half edge is thus never stored: it's found by flipping the lowest bit
//   of the half edge index (see `HalfEdgeHandle::twin`).
// - Every half edge has a face. Holes in the surface are represented by
//   faces with `boundary = true`, so the `next` cycles around holes are
//   ordinary face cycles and circulating around a boundary vertex via
//   `twin.next` is closed, just like around an interior vertex.
// - Mutating methods live in `ops`. They are the only code that touches the
//   relations directly; each of them either succeeds and leaves a valid mesh
//   or refuses before changing anything.

use std::{cell::Cell, iter};

use cgmath::prelude::*;
use smallvec::SmallVec;

use crate::{
    handle::{EdgeHandle, Element, FaceHandle, HalfEdgeHandle, Handle, VertexHandle, hsize},
    map::{DenseMap, HandleSet},
    math::{self, BoundingBox, Pos3, PosIteratorExt, Vec3},
};

mod adj;
pub mod build;
pub mod ops;

#[cfg(test)]
#[macro_use]
pub(crate) mod tests;

pub use self::{
    adj::{FaceCirculator, VertexCirculator},
    build::{Polygon, PolygonSoup},
    ops::{Bevel, BevelKind, BevelParams, SplitEdgeResult},
};


/// Small inline list of half edges, sized for typical faces and vertex fans.
pub(crate) type HalfEdgeList = SmallVec<[HalfEdgeHandle; 8]>;


// ===============================================================================================
// ===== Definition of types stored inside the data structure
// ===============================================================================================

/// Data stored per vertex.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Vertex {
    /// One arbitrary outgoing half edge.
    pub(crate) halfedge: HalfEdgeHandle,
    pub(crate) position: Pos3,
    /// Displacement along the vertex normal, used for previews.
    pub(crate) offset: f64,
    /// Rest position, reset after subdivision.
    pub(crate) bind_position: Pos3,
}

/// Data stored per face.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Face {
    /// One arbitrary half edge of this face.
    pub(crate) halfedge: HalfEdgeHandle,
    /// `true` if this face represents a hole in the surface.
    pub(crate) boundary: bool,
}

/// Data stored per half edge.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HalfEdge {
    /// The next half edge around the face (counter clock wise).
    pub(crate) next: HalfEdgeHandle,
    /// The vertex this half edge starts at.
    pub(crate) vertex: VertexHandle,
    pub(crate) face: FaceHandle,
}

/// Data stored per edge: its two half edges.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Edge {
    pub(crate) halves: [HalfEdge; 2],
}


/// Implementation of the *half edge mesh*, owning all vertices, edges, faces
/// and half edges of one surface.
///
/// The mesh represents an orientable, manifold (possibly bounded) polygon
/// surface. Each half edge stores its `next` half edge around its face, its
/// origin vertex, its face, and implicitly its `twin` and its `edge`. The
/// following invariants hold before and after every public method call:
///
/// 1. `twin(twin(h)) == h` for every half edge.
/// 2. Following `next` around a face returns to the start after exactly
///    `face_degree` steps.
/// 3. Circulating around a vertex via `twin.next`, starting at its half edge,
///    visits every half edge leaving the vertex exactly once.
/// 4. Every edge has exactly two half edges (one per direction) and one or
///    two adjacent real faces.
/// 5. There are no isolated vertices.
///
/// The mesh can only be modified via the methods in [`ops`] and the
/// [resampler][crate::algo]. Handles returned by those are valid until the
/// next structural modification; removed elements are detected via the
/// generation stored in the handles.
///
/// # References
///
/// Introduced in: Mäntylä, Martti. An introduction to solid modeling. Computer
/// science press, 1988.
#[derive(Debug)]
pub struct HalfEdgeMesh {
    vertices: DenseMap<VertexHandle, Vertex>,
    edges: DenseMap<EdgeHandle, Edge>,
    faces: DenseMap<FaceHandle, Face>,

    /// Number of faces with `boundary = true`, kept up to date by `add_face`
    /// and `remove_face`.
    num_boundaries: hsize,

    /// Bumped on every structural modification.
    revision: u64,

    /// Re-entrancy guard of `check_finite_positions`.
    checking_positions: Cell<bool>,
}

impl Clone for HalfEdgeMesh {
    fn clone(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            edges: self.edges.clone(),
            faces: self.faces.clone(),
            num_boundaries: self.num_boundaries,
            revision: self.revision,
            // A clone is not inside the check, even if `self` is.
            checking_positions: Cell::new(false),
        }
    }
}

impl Default for HalfEdgeMesh {
    fn default() -> Self {
        Self::new()
    }
}


// ===============================================================================================
// ===== Internal helper methods
// ===============================================================================================

impl HalfEdgeMesh {
    pub(crate) fn v(&self, vh: VertexHandle) -> &Vertex {
        &self.vertices[vh]
    }

    pub(crate) fn v_mut(&mut self, vh: VertexHandle) -> &mut Vertex {
        &mut self.vertices[vh]
    }

    pub(crate) fn f(&self, fh: FaceHandle) -> &Face {
        &self.faces[fh]
    }

    pub(crate) fn f_mut(&mut self, fh: FaceHandle) -> &mut Face {
        &mut self.faces[fh]
    }

    pub(crate) fn he(&self, h: HalfEdgeHandle) -> &HalfEdge {
        &self.edges[h.edge()].halves[h.side()]
    }

    pub(crate) fn he_mut(&mut self, h: HalfEdgeHandle) -> &mut HalfEdge {
        &mut self.edges[h.edge()].halves[h.side()]
    }

    /// Sets `next` of `a` to `b`.
    #[inline(always)]
    pub(crate) fn link(&mut self, a: HalfEdgeHandle, b: HalfEdgeHandle) {
        self.he_mut(a).next = b;
    }

    /// Adds a vertex with the given position. Its `halfedge` is dangling and
    /// has to be set by the caller.
    pub(crate) fn add_vertex(&mut self, position: Pos3) -> VertexHandle {
        self.vertices.push(Vertex {
            halfedge: HalfEdgeHandle::dangling(),
            position,
            offset: 0.0,
            bind_position: position,
        })
    }

    /// Adds an edge between `from` and `to` and returns the half edge
    /// pointing from `from` to `to` (side 0). The `next` and `face` fields of
    /// both half edges are dangling and have to be set by the caller. The
    /// `halfedge` fields of the vertices are not changed.
    pub(crate) fn add_edge(&mut self, from: VertexHandle, to: VertexHandle) -> HalfEdgeHandle {
        let dummy = |vertex| HalfEdge {
            next: HalfEdgeHandle::dangling(),
            vertex,
            face: FaceHandle::dangling(),
        };
        let eh = self.edges.push(Edge { halves: [dummy(from), dummy(to)] });
        eh.half()
    }

    pub(crate) fn add_face(&mut self, halfedge: HalfEdgeHandle, boundary: bool) -> FaceHandle {
        if boundary {
            self.num_boundaries += 1;
        }
        self.faces.push(Face { halfedge, boundary })
    }

    pub(crate) fn remove_vertex(&mut self, vh: VertexHandle) {
        let removed = self.vertices.remove(vh);
        debug_assert!(removed.is_some(), "removed dead vertex {:?}", vh);
    }

    pub(crate) fn remove_edge(&mut self, eh: EdgeHandle) {
        let removed = self.edges.remove(eh);
        debug_assert!(removed.is_some(), "removed dead edge {:?}", eh);
    }

    pub(crate) fn remove_face(&mut self, fh: FaceHandle) {
        match self.faces.remove(fh) {
            Some(Face { boundary: true, .. }) => self.num_boundaries -= 1,
            Some(_) => {}
            None => debug_assert!(false, "removed dead face {:?}", fh),
        }
    }

    /// Marks the end of a structural modification.
    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    /// Collects the half edges of the face `f`, starting at `start` (which
    /// has to be a half edge of `f`).
    pub(crate) fn face_cycle_from(&self, start: HalfEdgeHandle) -> HalfEdgeList {
        FaceCirculator::new(self, start).collect()
    }

    /// Collects the outgoing half edges of `v`, starting at `start` (which
    /// has to leave `v`), in the `twin.next` order.
    pub(crate) fn vertex_fan_from(&self, start: HalfEdgeHandle) -> HalfEdgeList {
        VertexCirculator::new(self, start).collect()
    }

    /// Runs `op` and restores the previous state of the mesh if it fails.
    /// Used by operations that are composed of several smaller operations,
    /// any of which might refuse.
    pub(crate) fn transaction<T, E>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, E>,
    ) -> Result<T, E> {
        let backup = self.clone();
        let out = op(self);
        if out.is_err() {
            *self = backup;
        }
        out
    }
}


// ===============================================================================================
// ===== Public API: iteration and relations
// ===============================================================================================

impl HalfEdgeMesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: DenseMap::new(),
            edges: DenseMap::new(),
            faces: DenseMap::new(),
            num_boundaries: 0,
            revision: 0,
            checking_positions: Cell::new(false),
        }
    }

    /// A counter that is increased by every structural modification. Data
    /// derived from the connectivity (e.g. a [`PickMap`][crate::pick::PickMap])
    /// is outdated once this changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn num_vertices(&self) -> hsize {
        self.vertices.num_elements()
    }

    pub fn num_edges(&self) -> hsize {
        self.edges.num_elements()
    }

    pub fn num_half_edges(&self) -> hsize {
        2 * self.edges.num_elements()
    }

    /// Number of real faces (boundary loops are not counted).
    pub fn num_faces(&self) -> hsize {
        self.faces.num_elements() - self.num_boundaries
    }

    /// Number of boundary loops (holes).
    pub fn num_boundaries(&self) -> hsize {
        self.num_boundaries
    }

    /// `V - E + F` (boundary loops are not counted as faces).
    pub fn euler_characteristic(&self) -> i64 {
        self.num_vertices() as i64 - self.num_edges() as i64 + self.num_faces() as i64
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_handles(&self) -> impl Iterator<Item = VertexHandle> + '_ {
        self.vertices.handles()
    }

    pub fn edge_handles(&self) -> impl Iterator<Item = EdgeHandle> + '_ {
        self.edges.handles()
    }

    /// Handles of all real faces.
    pub fn face_handles(&self) -> impl Iterator<Item = FaceHandle> + '_ {
        self.faces.iter().filter(|(_, f)| !f.boundary).map(|(fh, _)| fh)
    }

    /// Handles of all boundary loops.
    pub fn boundary_handles(&self) -> impl Iterator<Item = FaceHandle> + '_ {
        self.faces.iter().filter(|(_, f)| f.boundary).map(|(fh, _)| fh)
    }

    pub fn half_edge_handles(&self) -> impl Iterator<Item = HalfEdgeHandle> + '_ {
        self.edges.handles().flat_map(|eh| {
            let [a, b] = eh.halves();
            iter::once(a).chain(iter::once(b))
        })
    }

    pub fn contains_vertex(&self, vh: VertexHandle) -> bool {
        self.vertices.contains_handle(vh)
    }

    pub fn contains_edge(&self, eh: EdgeHandle) -> bool {
        self.edges.contains_handle(eh)
    }

    /// Returns `true` for real faces and boundary loops of this mesh.
    pub fn contains_face(&self, fh: FaceHandle) -> bool {
        self.faces.contains_handle(fh)
    }

    pub fn contains_half_edge(&self, h: HalfEdgeHandle) -> bool {
        self.edges.contains_handle(h.edge())
    }

    pub fn contains(&self, element: Element) -> bool {
        match element {
            Element::Vertex(v) => self.contains_vertex(v),
            Element::Edge(e) => self.contains_edge(e),
            Element::Face(f) => self.contains_face(f),
            Element::HalfEdge(h) => self.contains_half_edge(h),
        }
    }

    /// The next half edge around the face of `h`.
    pub fn next(&self, h: HalfEdgeHandle) -> HalfEdgeHandle {
        self.he(h).next
    }

    /// The half edge whose `next` is `h`. This walks around the face.
    pub fn prev(&self, h: HalfEdgeHandle) -> HalfEdgeHandle {
        let mut curr = h;
        loop {
            let next = self.he(curr).next;
            if next == h {
                return curr;
            }
            curr = next;
        }
    }

    pub fn twin(&self, h: HalfEdgeHandle) -> HalfEdgeHandle {
        h.twin()
    }

    /// The vertex `h` starts at.
    pub fn vertex(&self, h: HalfEdgeHandle) -> VertexHandle {
        self.he(h).vertex
    }

    /// The vertex `h` points to.
    pub fn target(&self, h: HalfEdgeHandle) -> VertexHandle {
        self.he(h.twin()).vertex
    }

    pub fn edge(&self, h: HalfEdgeHandle) -> EdgeHandle {
        h.edge()
    }

    pub fn face(&self, h: HalfEdgeHandle) -> FaceHandle {
        self.he(h).face
    }

    /// One outgoing half edge of `v`.
    pub fn vertex_half_edge(&self, v: VertexHandle) -> HalfEdgeHandle {
        self.v(v).halfedge
    }

    /// One half edge of the face `f`.
    pub fn face_half_edge(&self, f: FaceHandle) -> HalfEdgeHandle {
        self.f(f).halfedge
    }

    /// The canonical half edge of `e`.
    pub fn edge_half_edge(&self, e: EdgeHandle) -> HalfEdgeHandle {
        e.half()
    }

    pub fn endpoints(&self, e: EdgeHandle) -> [VertexHandle; 2] {
        let h = e.half();
        [self.vertex(h), self.vertex(h.twin())]
    }

    /// Iterates over the half edges of the face `f`.
    pub fn face_half_edges(&self, f: FaceHandle) -> FaceCirculator<'_> {
        FaceCirculator::new(self, self.f(f).halfedge)
    }

    /// Iterates over the vertices of the face `f` (in order).
    pub fn face_vertices(&self, f: FaceHandle) -> impl Iterator<Item = VertexHandle> + '_ {
        self.face_half_edges(f).map(move |h| self.he(h).vertex)
    }

    /// Iterates over the half edges leaving `v`.
    pub fn vertex_out_half_edges(&self, v: VertexHandle) -> VertexCirculator<'_> {
        VertexCirculator::new(self, self.v(v).halfedge)
    }

    /// Iterates over the vertices connected to `v` by an edge.
    pub fn vertex_neighbors(&self, v: VertexHandle) -> impl Iterator<Item = VertexHandle> + '_ {
        self.vertex_out_half_edges(v).map(move |h| self.target(h))
    }

    /// Iterates over the real faces around `v`.
    pub fn vertex_faces(&self, v: VertexHandle) -> impl Iterator<Item = FaceHandle> + '_ {
        self.vertex_out_half_edges(v)
            .map(move |h| self.he(h).face)
            .filter(move |&f| !self.f(f).boundary)
    }

    /// The edge between `a` and `b`, if there is one.
    pub fn edge_between(&self, a: VertexHandle, b: VertexHandle) -> Option<EdgeHandle> {
        self.half_edge_between(a, b).map(|h| h.edge())
    }

    /// The half edge from `a` to `b`, if there is one.
    pub fn half_edge_between(&self, a: VertexHandle, b: VertexHandle) -> Option<HalfEdgeHandle> {
        self.vertex_out_half_edges(a).find(|&h| self.target(h) == b)
    }

    pub fn is_boundary_face(&self, f: FaceHandle) -> bool {
        self.f(f).boundary
    }

    /// `true` if `h` belongs to a boundary loop.
    pub fn is_boundary_half_edge(&self, h: HalfEdgeHandle) -> bool {
        self.f(self.he(h).face).boundary
    }

    /// `true` if one side of `e` is a boundary loop.
    pub fn is_boundary_edge(&self, e: EdgeHandle) -> bool {
        let [a, b] = e.halves();
        self.is_boundary_half_edge(a) || self.is_boundary_half_edge(b)
    }

    /// `true` if `v` lies on a boundary loop.
    pub fn is_boundary_vertex(&self, v: VertexHandle) -> bool {
        self.vertex_out_half_edges(v).any(|h| self.is_boundary_half_edge(h))
    }

    /// Number of sides of the face (or boundary loop) `f`.
    pub fn face_degree(&self, f: FaceHandle) -> usize {
        self.face_half_edges(f).count()
    }

    /// Number of real faces around `v`.
    pub fn vertex_degree(&self, v: VertexHandle) -> usize {
        self.vertex_faces(v).count()
    }

    /// Number of edges incident to `v`.
    pub fn valence(&self, v: VertexHandle) -> usize {
        self.vertex_out_half_edges(v).count()
    }

    /// `true` if all real faces are triangles.
    pub fn is_triangle_mesh(&self) -> bool {
        self.face_handles().all(|f| self.face_degree(f) == 3)
    }

    /// Returns `true` if there are no boundary loops.
    pub fn is_closed(&self) -> bool {
        self.num_boundaries() == 0
    }
}


// ===============================================================================================
// ===== Public API: geometry
// ===============================================================================================

impl HalfEdgeMesh {
    pub fn position(&self, v: VertexHandle) -> Pos3 {
        self.v(v).position
    }

    pub fn set_position(&mut self, v: VertexHandle, position: Pos3) {
        self.v_mut(v).position = position;
    }

    pub fn offset(&self, v: VertexHandle) -> f64 {
        self.v(v).offset
    }

    pub fn set_offset(&mut self, v: VertexHandle, offset: f64) {
        self.v_mut(v).offset = offset;
    }

    pub fn bind_position(&self, v: VertexHandle) -> Pos3 {
        self.v(v).bind_position
    }

    pub fn set_bind_position(&mut self, v: VertexHandle, position: Pos3) {
        self.v_mut(v).bind_position = position;
    }

    /// Positions of the vertices of `f`, in order.
    pub fn face_positions(&self, f: FaceHandle) -> SmallVec<[Pos3; 8]> {
        self.face_vertices(f).map(|v| self.position(v)).collect()
    }

    pub fn face_centroid(&self, f: FaceHandle) -> Pos3 {
        self.face_vertices(f)
            .map(|v| self.position(v))
            .centroid()
            .expect("face without vertices")
    }

    /// Unit normal of `f` (Newell's method, so non-planar polygons are fine).
    pub fn face_normal(&self, f: FaceHandle) -> Vec3 {
        math::normalize_or_zero(math::newell_normal(&self.face_positions(f)))
    }

    pub fn face_area(&self, f: FaceHandle) -> f64 {
        math::newell_normal(&self.face_positions(f)).magnitude() / 2.0
    }

    /// Area weighted average of the normals of the real faces around `v`.
    pub fn vertex_normal(&self, v: VertexHandle) -> Vec3 {
        let sum = self.vertex_faces(v)
            .map(|f| math::newell_normal(&self.face_positions(f)))
            .fold(Vec3::zero(), |acc, n| acc + n);
        math::normalize_or_zero(sum)
    }

    pub fn edge_length(&self, e: EdgeHandle) -> f64 {
        let [a, b] = self.endpoints(e);
        self.position(a).distance(self.position(b))
    }

    pub fn edge_midpoint(&self, e: EdgeHandle) -> Pos3 {
        let [a, b] = self.endpoints(e);
        self.position(a).midpoint(self.position(b))
    }

    /// The bounding box of all vertex positions, `None` for empty meshes.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::around(self.vertices.values().map(|v| v.position))
    }

    /// Positions displaced by `offset` along the vertex normal, as used to
    /// preview offsets without changing the mesh.
    pub fn displaced_positions(&self) -> Vec<(VertexHandle, Pos3)> {
        self.vertex_handles()
            .map(|v| (v, self.position(v) + self.vertex_normal(v) * self.offset(v)))
            .collect()
    }

    /// Checks that all vertex positions are finite and calls `report` for
    /// every vertex that is not. Returns the number of reported vertices.
    ///
    /// If `report` itself ends up calling this method again on the same
    /// mesh (e.g. because reporting triggers a redraw), the nested call
    /// returns `0` immediately instead of reporting again.
    pub fn check_finite_positions(&self, mut report: impl FnMut(VertexHandle, Pos3)) -> usize {
        /// Resets the flag when dropped, no matter how the check is left.
        struct Guard<'a>(&'a Cell<bool>);
        impl Drop for Guard<'_> {
            fn drop(&mut self) {
                self.0.set(false);
            }
        }

        if self.checking_positions.replace(true) {
            return 0;
        }
        let _guard = Guard(&self.checking_positions);

        let mut count = 0;
        for (vh, v) in self.vertices.iter() {
            if !math::is_finite(v.position) {
                log::warn!("vertex {:?} has non-finite position {:?}", vh, v.position);
                count += 1;
                report(vh, v.position);
            }
        }
        count
    }
}


// ===============================================================================================
// ===== Integrity check
// ===============================================================================================

impl HalfEdgeMesh {
    /// Checks all invariants of the data structure and panics if one is
    /// violated. This is slow and mainly useful for tests and debugging.
    pub fn check_integrity(&self) {
        // Check vertices
        for (vh, v) in self.vertices.iter() {
            if !self.contains_half_edge(v.halfedge) {
                panic!(
                    "bug (broken reference): [{:?}].halfedge = {:?}, but that half edge \
                        does not exist!",
                    vh,
                    v.halfedge,
                );
            }
            if self.he(v.halfedge).vertex != vh {
                panic!(
                    "bug: [{:?}].halfedge = {:?}, but [{:?}].vertex = {:?} (should be {:?})",
                    vh,
                    v.halfedge,
                    v.halfedge,
                    self.he(v.halfedge).vertex,
                    vh,
                );
            }
        }

        // Check faces
        for (fh, f) in self.faces.iter() {
            if !self.contains_half_edge(f.halfedge) {
                panic!(
                    "bug (broken reference): [{:?}].halfedge = {:?}, but that half edge \
                        does not exist!",
                    fh,
                    f.halfedge,
                );
            }
            if self.he(f.halfedge).face != fh {
                panic!(
                    "bug: [{:?}].halfedge = {:?}, but [{:?}].face = {:?} (should be {:?})",
                    fh,
                    f.halfedge,
                    f.halfedge,
                    self.he(f.halfedge).face,
                    fh,
                );
            }
        }

        // Check half edges and edges
        for eh in self.edges.handles() {
            let [a, b] = eh.halves();
            if a.twin().twin() != a {
                panic!("bug: twin of twin of {:?} is not itself", a);
            }

            for &h in &[a, b] {
                let he = self.he(h);
                if !self.faces.contains_handle(he.face) {
                    panic!(
                        "bug (broken reference): [{:?}].face = {:?}, but that face does not exist!",
                        h,
                        he.face,
                    );
                }
                if !self.vertices.contains_handle(he.vertex) {
                    panic!(
                        "bug (broken reference): [{:?}].vertex = {:?}, but that vertex \
                            does not exist!",
                        h,
                        he.vertex,
                    );
                }
                if !self.contains_half_edge(he.next) {
                    panic!(
                        "bug (broken reference): [{:?}].next = {:?}, but that half edge \
                            does not exist!",
                        h,
                        he.next,
                    );
                }
                if self.he(he.next).vertex != self.target(h) {
                    panic!(
                        "bug: [{:?}] points to {:?}, but its next half edge {:?} starts at {:?}",
                        h,
                        self.target(h),
                        he.next,
                        self.he(he.next).vertex,
                    );
                }
            }

            if self.he(a).vertex == self.he(b).vertex {
                panic!("bug: {:?} is a loop at vertex {:?}", eh, self.he(a).vertex);
            }
            if self.f(self.he(a).face).boundary && self.f(self.he(b).face).boundary {
                panic!("bug: {:?} has no adjacent real face", eh);
            }
        }

        // Iterate around all faces to make sure all cycles are fine.
        let mut visited = HandleSet::default();
        for (fh, f) in self.faces.iter() {
            let mut h = f.halfedge;
            let mut degree = 0;
            loop {
                if self.he(h).face != fh {
                    panic!(
                        "bug: while iterating around {:?}, {:?} was encountered and its face \
                            is {:?}",
                        fh,
                        h,
                        self.he(h).face,
                    );
                }

                // All half edges in this cycle should be not visited yet!
                if !visited.insert(h) {
                    panic!(
                        "bug: encountered {:?} while iterating around {:?}, but we already \
                            visited it!",
                        h,
                        fh,
                    );
                }

                degree += 1;
                h = self.he(h).next;
                if h == f.halfedge {
                    break;
                }
            }

            if degree < 3 && !f.boundary {
                panic!("bug: face {:?} has degree {}", fh, degree);
            }
        }
        if visited.len() != self.num_half_edges() as usize {
            panic!(
                "bug: {} half edges exist, but only {} are part of a face cycle",
                self.num_half_edges(),
                visited.len(),
            );
        }

        // Iterate around all vertices to make sure all fans are fine: every
        // half edge leaving the vertex is visited exactly once.
        let mut visited = HandleSet::default();
        for (vh, v) in self.vertices.iter() {
            let mut h = v.halfedge;
            loop {
                if self.he(h).vertex != vh {
                    panic!(
                        "bug: while iterating around {:?}, {:?} was encountered and its vertex \
                            is {:?}",
                        vh,
                        h,
                        self.he(h).vertex,
                    );
                }
                if !visited.insert(h) {
                    panic!(
                        "bug: encountered {:?} while iterating around {:?}, but we already \
                            visited it!",
                        h,
                        vh,
                    );
                }

                h = self.he(h.twin()).next;
                if h == v.halfedge {
                    break;
                }
            }
        }
        if visited.len() != self.num_half_edges() as usize {
            panic!(
                "bug: {} half edges exist, but only {} are reachable by circulating around \
                    vertices (some vertex is not a single fan)",
                self.num_half_edges(),
                visited.len(),
            );
        }

        let boundaries = self.faces.values().filter(|f| f.boundary).count();
        if boundaries != self.num_boundaries as usize {
            panic!(
                "bug: {} boundary loops exist, but the counter says {}",
                boundaries,
                self.num_boundaries,
            );
        }

        // Two edges between the same pair of vertices.
        let mut pairs = HandleSet::default();
        for eh in self.edges.handles() {
            let [a, b] = self.endpoints(eh);
            let key = if a < b { (a, b) } else { (b, a) };
            if !pairs.insert(key) {
                panic!("bug: there are multiple edges between {:?} and {:?}", a, b);
            }
        }
    }
}
