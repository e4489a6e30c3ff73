use crate::{
    error::EditError,
    handle::{EdgeHandle, Element},
};
use super::{refuse, HalfEdgeMesh};


impl HalfEdgeMesh {
    /// Rotates the edge `e` inside the polygon formed by its two adjacent
    /// faces.
    ///
    /// For two triangles `[a, b, c]` and `[b, a, d]` this replaces the edge
    /// `a-b` by the other diagonal `c-d`, resulting in the triangles
    /// `[d, c, a]` and `[c, d, b]`. Faces with more sides work the same way:
    /// both endpoints of the edge move one vertex forward in their face. The
    /// same edge handle is returned.
    ///
    /// Refused for boundary edges, if an endpoint has fewer than three edges,
    /// if the new edge would be a duplicate of an existing one or if a face
    /// would contain a vertex twice.
    pub fn flip_edge(&mut self, e: EdgeHandle) -> Result<EdgeHandle, EditError> {
        self.check_edge(e)?;

        // Names of elements before the flip:
        //
        //            c
        //          ⟋ ⟍
        //      h2 ⟋ f0 ⟍ h1
        //       ⟋        ⟍
        //     a  —— h0 ——▶ b
        //       ⟍ ◀—h3——  ⟋
        //      h4 ⟍ f1  ⟋ h5
        //           ⟍ ⟋
        //            d
        //
        // `h2` and `h5` might be followed by further half edges if the faces
        // are not triangles.
        let h0 = e.half();
        let h3 = h0.twin();
        let f0 = self.he(h0).face;
        let f1 = self.he(h3).face;

        if self.f(f0).boundary || self.f(f1).boundary {
            return refuse(EditError::Boundary(Element::Edge(e)));
        }
        if f0 == f1 {
            return refuse(EditError::NonManifold(Element::Edge(e)));
        }

        let a = self.he(h0).vertex;
        let b = self.he(h3).vertex;
        if self.valence(a) < 3 || self.valence(b) < 3 {
            return refuse(EditError::Degenerate(Element::Edge(e)));
        }

        let h1 = self.next(h0);
        let h2 = self.next(h1);
        let h4 = self.next(h3);
        let h5 = self.next(h4);
        let h0_prev = self.prev(h0);
        let h3_prev = self.prev(h3);

        let c = self.he(h2).vertex;
        let d = self.he(h5).vertex;
        // `d` must not already be part of `f0` (and vice versa), `c == d`
        // included.
        let repeats = self.face_vertices(f0).any(|w| w == d)
            || self.face_vertices(f1).any(|w| w == c);
        if repeats || self.edge_between(c, d).is_some() {
            return refuse(EditError::NonManifold(Element::Edge(e)));
        }

        // ----- Rewire ----------------------------------------------------------------------
        self.he_mut(h0).vertex = d;
        self.he_mut(h3).vertex = c;

        self.link(h0, h2);
        self.link(h0_prev, h4);
        self.link(h4, h0);
        self.link(h3, h5);
        self.link(h3_prev, h1);
        self.link(h1, h3);

        self.he_mut(h4).face = f0;
        self.he_mut(h1).face = f1;
        self.f_mut(f0).halfedge = h0;
        self.f_mut(f1).halfedge = h3;

        if self.v(a).halfedge == h0 {
            self.v_mut(a).halfedge = h4;
        }
        if self.v(b).halfedge == h3 {
            self.v_mut(b).halfedge = h1;
        }

        self.bump_revision();
        Ok(e)
    }
}
