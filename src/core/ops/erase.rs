use smallvec::SmallVec;

use crate::{
    error::EditError,
    handle::{EdgeHandle, Element, FaceHandle, VertexHandle},
    map::HandleSet,
};
use super::{refuse, HalfEdgeMesh};


impl HalfEdgeMesh {
    /// Removes the vertex `v` and all its edges, merging the faces around it
    /// into one face, which is returned.
    ///
    /// Refused for boundary vertices, if two of the faces around `v` are the
    /// same face, if a neighbour would be left with a single edge or if the
    /// merged face would contain a vertex twice or have fewer than three
    /// sides.
    pub fn erase_vertex(&mut self, v: VertexHandle) -> Result<FaceHandle, EditError> {
        self.check_vertex(v)?;
        let el = Element::Vertex(v);

        // `out[i]` are the outgoing half edges, `faces[i]` the face of
        // `out[i]`. In `faces[i]`, the twin of `out[i - 1]` comes right
        // before `out[i]`.
        let out = self.vertex_fan(v);
        let n = out.len();
        let faces = out.iter().map(|&h| self.he(h).face).collect::<SmallVec<[_; 8]>>();

        if faces.iter().any(|&f| self.f(f).boundary) {
            return refuse(EditError::Boundary(el));
        }
        let mut seen = HandleSet::default();
        if !faces.iter().all(|&f| seen.insert(f)) {
            return refuse(EditError::NonManifold(el));
        }
        if out.iter().any(|&h| self.valence(self.target(h)) < 3) {
            return refuse(EditError::Degenerate(el));
        }

        // The chain of face `i` runs from `next(out[i])` to the half edge
        // before `twin(out[i - 1])`.
        let mut merged_vertices = HandleSet::default();
        let mut degree = 0;
        for i in 0..n {
            let stop = out[(i + n - 1) % n].twin();
            let mut h = self.next(out[i]);
            while h != stop {
                degree += 1;
                if !merged_vertices.insert(self.he(h).vertex) {
                    return refuse(EditError::NonManifold(el));
                }
                h = self.next(h);
            }
        }
        if degree < 3 {
            return refuse(EditError::Degenerate(el));
        }

        // ----- Rewire ----------------------------------------------------------------------
        let merged = faces[0];
        let mut lasts = SmallVec::<[_; 8]>::new();
        for i in 0..n {
            lasts.push(self.prev(out[(i + n - 1) % n].twin()));
        }

        for i in 0..n {
            let first_prev = self.next(out[(i + n - 1) % n]);
            self.link(lasts[i], first_prev);

            let neighbor = self.target(out[i]);
            if self.v(neighbor).halfedge == out[i].twin() {
                let replacement = self.next(out[i]);
                self.v_mut(neighbor).halfedge = replacement;
            }
        }

        let start = self.next(out[0]);
        let mut h = start;
        loop {
            self.he_mut(h).face = merged;
            h = self.next(h);
            if h == start {
                break;
            }
        }
        self.f_mut(merged).halfedge = start;

        for &f in &faces[1..] {
            self.remove_face(f);
        }
        for &h in &out {
            self.remove_edge(h.edge());
        }
        self.remove_vertex(v);

        self.bump_revision();
        Ok(merged)
    }

    /// Removes the edge `e` and merges its two faces into one, which is
    /// returned.
    ///
    /// Refused for boundary edges, if both sides are the same face, if an
    /// endpoint would be left with a single edge or if the two faces share a
    /// vertex besides the endpoints of `e`.
    pub fn erase_edge(&mut self, e: EdgeHandle) -> Result<FaceHandle, EditError> {
        self.check_edge(e)?;
        let el = Element::Edge(e);

        let h0 = e.half();
        let h3 = h0.twin();
        let f0 = self.he(h0).face;
        let f1 = self.he(h3).face;
        let a = self.he(h0).vertex;
        let b = self.he(h3).vertex;

        if self.f(f0).boundary || self.f(f1).boundary {
            return refuse(EditError::Boundary(el));
        }
        if f0 == f1 {
            return refuse(EditError::NonManifold(el));
        }
        if self.valence(a) < 3 || self.valence(b) < 3 {
            return refuse(EditError::Degenerate(el));
        }
        let f0_vertices = self.face_vertices(f0).collect::<HandleSet<_>>();
        let shared = self.face_vertices(f1)
            .filter(|w| f0_vertices.contains(w))
            .count();
        if shared != 2 {
            return refuse(EditError::NonManifold(el));
        }

        // ----- Rewire ----------------------------------------------------------------------
        let p0 = self.prev(h0);
        let n0 = self.next(h0);
        let p3 = self.prev(h3);
        let n3 = self.next(h3);

        let mut h = n3;
        while h != h3 {
            self.he_mut(h).face = f0;
            h = self.next(h);
        }

        self.link(p0, n3);
        self.link(p3, n0);
        self.f_mut(f0).halfedge = n0;

        if self.v(a).halfedge == h0 {
            self.v_mut(a).halfedge = n3;
        }
        if self.v(b).halfedge == h3 {
            self.v_mut(b).halfedge = n0;
        }

        self.remove_face(f1);
        self.remove_edge(e);

        self.bump_revision();
        Ok(f0)
    }
}
