//! Local edit operations on a [`HalfEdgeMesh`].
//!
//! Every operation takes a handle to the element it is applied to and returns
//! a handle to the element that is most significant after the operation (the
//! flipped edge, the new vertex, the merged face, ...). If an operation is not
//! applicable, it returns an [`EditError`] and the mesh is left unchanged.
//! Each successful operation bumps the mesh's
//! [revision][HalfEdgeMesh::revision].
//!
//! The operations are written in two stages: first every precondition is
//! checked without touching the mesh, then the relations are rewired. The
//! rewiring stage never fails.

use smallvec::SmallVec;

use crate::{
    error::EditError,
    handle::{EdgeHandle, Element, FaceHandle, HalfEdgeHandle, VertexHandle},
};
use super::{HalfEdgeList, HalfEdgeMesh};

mod bevel;
mod collapse;
mod erase;
mod flip;
mod split;

pub use self::{
    bevel::{Bevel, BevelKind, BevelParams},
    split::SplitEdgeResult,
};


/// Logs the refusal and returns it as error.
fn refuse<T>(err: EditError) -> Result<T, EditError> {
    log::debug!("refused edit: {}", err);
    Err(err)
}

impl HalfEdgeMesh {
    pub(crate) fn check_vertex(&self, v: VertexHandle) -> Result<(), EditError> {
        if self.contains_vertex(v) {
            Ok(())
        } else {
            refuse(EditError::Stale(Element::Vertex(v)))
        }
    }

    pub(crate) fn check_edge(&self, e: EdgeHandle) -> Result<(), EditError> {
        if self.contains_edge(e) {
            Ok(())
        } else {
            refuse(EditError::Stale(Element::Edge(e)))
        }
    }

    pub(crate) fn check_face(&self, f: FaceHandle) -> Result<(), EditError> {
        if self.contains_face(f) {
            Ok(())
        } else {
            refuse(EditError::Stale(Element::Face(f)))
        }
    }

    /// Splits the face of `start` into triangles by adding edges from the
    /// origin of `start` to all other vertices of the face. `start`'s face
    /// keeps being used for the first triangle. Returns the new edges (empty
    /// for triangles).
    ///
    /// Must not be called for boundary loops.
    pub(crate) fn fan_triangulate(&mut self, start: HalfEdgeHandle) -> Vec<EdgeHandle> {
        let hs = self.face_cycle_from(start);
        let k = hs.len();
        if k <= 3 {
            return vec![];
        }

        let center = self.he(start).vertex;
        let mut new_edges = Vec::with_capacity(k - 3);

        // We build the triangles [center, x(i + 1), x(i + 2)] where `x(i)` is
        // the origin of `hs[i]`. `back` is the half edge from the center to
        // `x(i + 1)`.
        let mut back = hs[0];
        let mut face = self.he(start).face;
        for i in 0..k - 3 {
            let target = self.he(hs[i + 2]).vertex;
            let diag = self.add_edge(target, center);
            new_edges.push(diag.edge());

            if i > 0 {
                face = self.add_face(back, false);
            }
            self.set_triangle(face, [back, hs[i + 1], diag]);
            back = diag.twin();
        }

        let face = self.add_face(back, false);
        self.set_triangle(face, [back, hs[k - 2], hs[k - 1]]);

        new_edges
    }

    /// Splits the face of `start` into triangles without adding a second edge
    /// between two vertices that are already connected. The face is fanned
    /// from the origin of `start` if possible, otherwise from the first
    /// vertex of the face that works as fan center. If there is none, ears
    /// are cut off one by one. Returns the new edges.
    ///
    /// A remainder that can't be split any further without duplicating an
    /// edge stays one polygon.
    ///
    /// Must not be called for boundary loops.
    pub(crate) fn triangulate_face(&mut self, start: HalfEdgeHandle) -> Vec<EdgeHandle> {
        let hs = self.face_cycle_from(start);
        let k = hs.len();
        if k <= 3 {
            return vec![];
        }

        // A fan center must not be connected to any vertex of the face
        // except its two neighbors in the face.
        let vs = hs.iter().map(|&h| self.he(h).vertex).collect::<SmallVec<[_; 8]>>();
        let center = (0..k).find(|&i| {
            (2..k - 1).all(|d| self.edge_between(vs[i], vs[(i + d) % k]).is_none())
        });

        match center {
            Some(i) => self.fan_triangulate(hs[i]),
            None => self.clip_ears(start),
        }
    }

    /// Cuts triangles `[x(i), x(i + 1), x(i + 2)]` off the face of `start`
    /// as long as the diagonal `x(i + 2) -> x(i)` does not exist yet.
    fn clip_ears(&mut self, start: HalfEdgeHandle) -> Vec<EdgeHandle> {
        let mut new_edges = vec![];
        let mut rest = start;
        loop {
            let hs = self.face_cycle_from(rest);
            let k = hs.len();
            if k <= 3 {
                break;
            }

            let ear = hs.iter().enumerate().find(|&(i, &h)| {
                let far = self.he(hs[(i + 2) % k]).vertex;
                self.edge_between(self.he(h).vertex, far).is_none()
            });
            match ear {
                Some((_, &h)) => {
                    let (e, remainder) = self.cut_ear(h);
                    new_edges.push(e);
                    rest = remainder;
                }
                None => {
                    log::warn!(
                        "can't triangulate {:?} (degree {}) without duplicating an edge",
                        self.he(rest).face,
                        k,
                    );
                    break;
                }
            }
        }

        new_edges
    }

    /// Cuts the triangle formed by `h` and its next half edge off their face
    /// by adding an edge from the target of `next(h)` to the origin of `h`.
    /// The triangle becomes a new face. Returns the new edge and its half
    /// edge in the remaining face.
    fn cut_ear(&mut self, h: HalfEdgeHandle) -> (EdgeHandle, HalfEdgeHandle) {
        // `h: x -> y`, `n: y -> z`, the new edge is `z -> x`.
        let face = self.he(h).face;
        let p = self.prev(h);
        let n = self.next(h);
        let nn = self.next(n);
        let x = self.he(h).vertex;
        let z = self.he(nn).vertex;

        let diag = self.add_edge(z, x);
        let rest = diag.twin();
        let ear = self.add_face(h, false);
        self.set_triangle(ear, [h, n, diag]);

        self.link(p, rest);
        self.link(rest, nn);
        self.he_mut(rest).face = face;
        self.f_mut(face).halfedge = rest;

        (diag.edge(), rest)
    }

    /// Links the three half edges to a cycle and assigns them to `face`.
    fn set_triangle(&mut self, face: FaceHandle, [a, b, c]: [HalfEdgeHandle; 3]) {
        self.link(a, b);
        self.link(b, c);
        self.link(c, a);
        for &h in &[a, b, c] {
            self.he_mut(h).face = face;
        }
        self.f_mut(face).halfedge = a;
    }

    /// Merges a face that was reduced to two sides into a single edge.
    ///
    /// `x` and `y` are the two half edges of the two-sided face `x -> y -> x`.
    /// The edge of `y` survives and takes over the place of `x`'s twin in the
    /// face on the other side. The edge of `x` and the face are removed.
    /// Returns the surviving edge.
    pub(crate) fn merge_two_gon(&mut self, x: HalfEdgeHandle, y: HalfEdgeHandle) -> EdgeHandle {
        debug_assert_eq!(self.next(x), y);
        debug_assert_eq!(self.next(y), x);

        let gone_face = self.he(x).face;
        let tx = x.twin();
        let prev_tx = self.prev(tx);
        let next_tx = self.he(tx).next;
        let outer = self.he(tx).face;

        // `y` replaces `tx`. Both start at the same vertex.
        self.link(prev_tx, y);
        self.link(y, next_tx);
        self.he_mut(y).face = outer;
        if self.f(outer).halfedge == tx {
            self.f_mut(outer).halfedge = y;
        }

        let from = self.he(y).vertex;
        if self.v(from).halfedge == tx {
            self.v_mut(from).halfedge = y;
        }
        let to = self.he(x).vertex;
        if self.v(to).halfedge == x {
            self.v_mut(to).halfedge = y.twin();
        }

        self.remove_edge(x.edge());
        self.remove_face(gone_face);

        y.edge()
    }

    /// Splits every real face with more than three sides into triangles.
    ///
    /// Faces are fanned from the origin of the face's half edge. If that
    /// vertex is already connected to another vertex of the face (other than
    /// its two neighbors), the next vertex of the face that isn't is used.
    /// If no vertex qualifies, ears are cut off instead. No pair of vertices
    /// is ever connected by two edges; a face that can't be split without
    /// that keeps more than three sides.
    pub fn triangulate(&mut self) {
        let faces = self.face_handles()
            .filter(|&f| self.face_degree(f) > 3)
            .collect::<Vec<_>>();
        if faces.is_empty() {
            return;
        }

        let mut new_edges = 0;
        for f in faces {
            let start = self.f(f).halfedge;
            new_edges += self.triangulate_face(start).len();
        }

        log::debug!("triangulate: added {} edges", new_edges);
        if new_edges > 0 {
            self.bump_revision();
        }
    }

    /// Shorthand to collect the face cycle of `f` starting at its half edge.
    pub(crate) fn face_cycle(&self, f: FaceHandle) -> HalfEdgeList {
        self.face_cycle_from(self.f(f).halfedge)
    }

    /// Shorthand to collect the outgoing half edges of `v`.
    pub(crate) fn vertex_fan(&self, v: VertexHandle) -> HalfEdgeList {
        self.vertex_fan_from(self.v(v).halfedge)
    }
}
