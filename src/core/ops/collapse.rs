use smallvec::SmallVec;

use crate::{
    error::EditError,
    handle::{EdgeHandle, Element, FaceHandle, HalfEdgeHandle, VertexHandle},
    map::{HandleMap, HandleSet},
};
use super::{refuse, HalfEdgeMesh};


impl HalfEdgeMesh {
    /// Merges the endpoints of `e` into one vertex at the edge's midpoint and
    /// returns it. The surviving vertex is the first endpoint
    /// (`vertex(e.half())`).
    ///
    /// Adjacent triangles (and triangular holes) degenerate and are removed;
    /// their two remaining edges are merged into one. Larger adjacent faces
    /// lose one side.
    ///
    /// The collapse is refused if the result would not be a manifold mesh:
    ///
    /// - the endpoints have common neighbours other than the apexes of the
    ///   adjacent triangles (link condition),
    /// - the edge is an interior edge, but both endpoints are on the boundary,
    /// - an apex would be left with fewer than three edges (two, if it is on
    ///   the boundary),
    /// - both sides of the edge are the same face.
    ///
    /// Collapsing any edge of a tetrahedron is refused, for example.
    pub fn collapse_edge(&mut self, e: EdgeHandle) -> Result<VertexHandle, EditError> {
        self.check_edge(e)?;
        let el = Element::Edge(e);

        let h0 = e.half();
        let h3 = h0.twin();
        let a = self.he(h0).vertex;
        let b = self.he(h3).vertex;
        let f0 = self.he(h0).face;
        let f1 = self.he(h3).face;

        if f0 == f1 {
            return refuse(EditError::NonManifold(el));
        }
        let interior = !self.f(f0).boundary && !self.f(f1).boundary;
        if interior && self.is_boundary_vertex(a) && self.is_boundary_vertex(b) {
            return refuse(EditError::NonManifold(el));
        }

        // Sides with three edges turn into two-sided faces.
        let mut apexes = HandleSet::default();
        let mut degree_three = [false; 2];
        for (i, &h) in [h0, h3].iter().enumerate() {
            if self.face_degree(self.he(h).face) != 3 {
                continue;
            }

            degree_three[i] = true;
            let x = self.next(h);
            let y = self.next(x);
            if !self.can_merge_two_gon(x, y) {
                return refuse(EditError::NonManifold(el));
            }
            apexes.insert(self.target(x));
        }

        let a_neighbors = self.vertex_neighbors(a).collect::<HandleSet<_>>();
        let common = self.vertex_neighbors(b)
            .filter(|w| a_neighbors.contains(w))
            .collect::<HandleSet<_>>();
        if common != apexes {
            return refuse(EditError::NonManifold(el));
        }
        if apexes.iter().any(|&w| !self.apex_keeps_enough_edges(w)) {
            return refuse(EditError::Degenerate(el));
        }

        // ----- Rewire ----------------------------------------------------------------------
        let midpoint = self.edge_midpoint(e);
        let n0 = self.next(h0);
        let p0 = self.prev(h0);
        let n3 = self.next(h3);
        let p3 = self.prev(h3);

        for h in self.vertex_fan(b) {
            self.he_mut(h).vertex = a;
        }

        self.link(p0, n0);
        self.link(p3, n3);
        if self.f(f0).halfedge == h0 {
            self.f_mut(f0).halfedge = n0;
        }
        if self.f(f1).halfedge == h3 {
            self.f_mut(f1).halfedge = n3;
        }
        self.remove_edge(e);

        if degree_three[0] {
            self.merge_two_gon(n0, p0);
        }
        if degree_three[1] {
            self.merge_two_gon(n3, p3);
        }

        self.remove_vertex(b);
        self.reanchor_vertex(a, &[n0, p0.twin(), n3, p3.twin()]);
        self.set_position(a, midpoint);

        self.bump_revision();
        Ok(a)
    }

    /// Merges all vertices of the face `f` into one vertex at the face's
    /// centroid and returns it. The face and its edges are removed. The
    /// surviving vertex is the origin of the face's half edge.
    ///
    /// The same manifold conditions as for [`collapse_edge`][Self::collapse_edge]
    /// apply, generalized to all vertices of the face. Additionally, refused
    /// for boundary loops and if two sides of the face border the same face.
    pub fn collapse_face(&mut self, f: FaceHandle) -> Result<VertexHandle, EditError> {
        self.check_face(f)?;
        let el = Element::Face(f);
        if self.f(f).boundary {
            return refuse(EditError::Boundary(el));
        }

        let hs = self.face_cycle(f);
        let k = hs.len();
        let vs = hs.iter().map(|&h| self.he(h).vertex).collect::<SmallVec<[_; 8]>>();
        let sides = hs.iter().map(|&h| self.he(h.twin()).face).collect::<SmallVec<[_; 8]>>();

        // The faces on the other side must be distinct, otherwise they would
        // touch the new vertex twice.
        let mut seen = HandleSet::default();
        if sides.iter().any(|&s| s == f || !seen.insert(s)) {
            return refuse(EditError::NonManifold(el));
        }

        let in_face = vs.iter().cloned().collect::<HandleSet<_>>();
        let face_edges = hs.iter().map(|h| h.edge()).collect::<HandleSet<_>>();
        let mut outside_edges: HandleMap<VertexHandle, usize> = HandleMap::default();
        for &v in &vs {
            for h in self.vertex_out_half_edges(v) {
                let w = self.target(h);
                if !in_face.contains(&w) {
                    *outside_edges.entry(w).or_insert(0) += 1;
                } else if !face_edges.contains(&h.edge()) {
                    // A chord would become a loop.
                    return refuse(EditError::NonManifold(el));
                }
            }
        }

        let mut degree_three: SmallVec<[bool; 8]> = SmallVec::from_elem(false, k);
        let mut apexes: HandleMap<VertexHandle, usize> = HandleMap::default();
        for i in 0..k {
            if self.face_degree(sides[i]) != 3 {
                continue;
            }

            degree_three[i] = true;
            let x = self.next(hs[i].twin());
            let y = self.next(x);
            if !self.can_merge_two_gon(x, y) {
                return refuse(EditError::NonManifold(el));
            }
            *apexes.entry(self.target(x)).or_insert(0) += 1;
        }

        // Every outside vertex ends up with exactly one edge to the new
        // vertex.
        for (w, &count) in &outside_edges {
            let merged = apexes.get(w).cloned().unwrap_or(0);
            if merged > 1 || count != 1 + merged {
                return refuse(EditError::NonManifold(el));
            }
        }
        if apexes.keys().any(|&w| !self.apex_keeps_enough_edges(w)) {
            return refuse(EditError::Degenerate(el));
        }

        // At most one boundary fan may meet at the new vertex.
        let boundary_out = vs.iter()
            .flat_map(|&v| self.vertex_out_half_edges(v))
            .filter(|&h| {
                let face = self.he(h).face;
                self.f(face).boundary
                    && !face_edges.contains(&h.edge())
                    && !sides.iter().zip(&degree_three).any(|(&s, &d)| d && s == face)
            })
            .count();
        if boundary_out > 1 {
            return refuse(EditError::NonManifold(el));
        }

        // ----- Rewire ----------------------------------------------------------------------
        let centroid = self.face_centroid(f);
        let survivor = vs[0];

        for &v in &vs[1..] {
            for h in self.vertex_fan(v) {
                self.he_mut(h).vertex = survivor;
            }
        }

        let mut two_gons = SmallVec::<[(HalfEdgeHandle, HalfEdgeHandle); 8]>::new();
        let mut anchors = SmallVec::<[HalfEdgeHandle; 16]>::new();
        for i in 0..k {
            let t = hs[i].twin();
            let side = sides[i];
            let p = self.prev(t);
            let n = self.next(t);

            self.link(p, n);
            if self.f(side).halfedge == t {
                self.f_mut(side).halfedge = n;
            }
            if degree_three[i] {
                two_gons.push((n, p));
            }
            anchors.push(n);
            anchors.push(p.twin());
        }

        for &h in &hs {
            self.remove_edge(h.edge());
        }
        self.remove_face(f);
        for (x, y) in two_gons {
            self.merge_two_gon(x, y);
        }
        for &v in &vs[1..] {
            self.remove_vertex(v);
        }

        self.reanchor_vertex(survivor, &anchors);
        self.set_position(survivor, centroid);

        self.bump_revision();
        Ok(survivor)
    }

    /// Whether the two-sided face `x -> y` left behind by a collapse can be
    /// merged into one edge: at least one of the faces outside of it has to
    /// be a real face.
    fn can_merge_two_gon(&self, x: HalfEdgeHandle, y: HalfEdgeHandle) -> bool {
        !(self.is_boundary_half_edge(x.twin()) && self.is_boundary_half_edge(y.twin()))
    }

    /// Whether the apex `w` of a degenerating triangle still has enough edges
    /// after losing one.
    fn apex_keeps_enough_edges(&self, w: VertexHandle) -> bool {
        let min = if self.is_boundary_vertex(w) { 3 } else { 4 };
        self.valence(w) >= min
    }

    /// Sets the half edge of `v` to the first candidate that still exists
    /// and starts at `v`.
    fn reanchor_vertex(&mut self, v: VertexHandle, candidates: &[HalfEdgeHandle]) {
        let anchor = candidates.iter()
            .cloned()
            .find(|&h| self.contains_half_edge(h) && self.he(h).vertex == v);

        match anchor {
            Some(h) => self.v_mut(v).halfedge = h,
            None => panic!("bug: no outgoing half edge left at {:?} after collapse", v),
        }
    }
}
