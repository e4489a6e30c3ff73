//! Bevel operations.
//!
//! Beveling is a two phase process. First, `bevel_vertex`, `bevel_edge` or
//! `bevel_face` change the connectivity and return the new face. All new
//! vertices are placed at the position of the vertex they were created from.
//! Second, one of the `*_compute_new_positions` methods moves the new
//! vertices according to an inset (and shift) amount. The second phase can
//! be repeated with different amounts (e.g. while the user drags the mouse)
//! as long as the connectivity is not changed in between.
//!
//! [`Bevel`] bundles the data needed for the second phase:
//!
//! ```
//! use meshedit::{Element, core::BevelParams, shape};
//!
//! let mut mesh = shape::cube().build().unwrap();
//! let f = mesh.face_handles().next().unwrap();
//!
//! let bevel = mesh.begin_bevel(Element::Face(f)).unwrap();
//! mesh.apply_bevel_offsets(&bevel, BevelParams::new().with_inset(0.25)).unwrap();
//! mesh.apply_bevel_offsets(&bevel, BevelParams::new().with_inset(0.5).with_shift(0.2)).unwrap();
//!
//! assert_eq!(mesh.num_faces(), 6 + 4);
//! ```

use cgmath::prelude::*;

use crate::{
    error::EditError,
    handle::{EdgeHandle, Element, FaceHandle, HalfEdgeHandle, VertexHandle},
    math::{self, Pos3, PosIteratorExt},
};
use super::{refuse, HalfEdgeMesh};


/// What was beveled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BevelKind {
    Vertex,
    Edge,
    Face,
}

/// The amounts used to place the vertices of a bevel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BevelParams {
    /// How far the new vertices move away from their original position, as
    /// a fraction of the distance towards the neighbor (vertex and edge
    /// bevels) or towards the face's centroid (face bevels). *Default*: 0.
    pub inset: f64,

    /// How far the new vertices of a face bevel move along the face normal.
    /// Ignored for vertex and edge bevels. *Default*: 0.
    pub shift: f64,
}

impl BevelParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inset(self, inset: f64) -> Self {
        Self { inset, ..self }
    }

    pub fn with_shift(self, shift: f64) -> Self {
        Self { shift, ..self }
    }
}

impl Default for BevelParams {
    fn default() -> Self {
        Self { inset: 0.0, shift: 0.0 }
    }
}

/// A bevel whose new vertices can still be moved, created by
/// [`HalfEdgeMesh::begin_bevel`].
///
/// Only valid as long as the mesh is not structurally changed. After that,
/// [`HalfEdgeMesh::apply_bevel_offsets`] refuses to use it.
#[derive(Debug, Clone, PartialEq)]
pub struct Bevel {
    kind: BevelKind,
    face: FaceHandle,
    spokes: Vec<HalfEdgeHandle>,
    originals: Vec<Pos3>,
    revision: u64,
}

impl Bevel {
    pub fn kind(&self) -> BevelKind {
        self.kind
    }

    /// The new face.
    pub fn face(&self) -> FaceHandle {
        self.face
    }

    /// For each half edge `h` of the new face, `twin(h).next`: the half edge
    /// from a new vertex to the vertex it moves towards.
    pub fn spokes(&self) -> &[HalfEdgeHandle] {
        &self.spokes
    }

    /// Position of the origin of each spoke directly after beveling.
    pub fn originals(&self) -> &[Pos3] {
        &self.originals
    }
}


impl HalfEdgeMesh {
    /// Replaces the vertex `v` by a new face with one vertex per edge of `v`.
    /// Each new vertex is connected to one of the old neighbors of `v`.
    /// Returns the new face.
    ///
    /// Refused if `v` has fewer than three edges.
    pub fn bevel_vertex(&mut self, v: VertexHandle) -> Result<FaceHandle, EditError> {
        self.check_vertex(v)?;

        // `out[i]` leaves `v`, the face of `out[i]` contains
        // `twin(out[i - 1]) -> out[i]`.
        let out = self.vertex_fan(v);
        let n = out.len();
        if n < 3 {
            return refuse(EditError::Degenerate(Element::Vertex(v)));
        }

        let position = self.position(v);
        let new_vertices = out.iter()
            .map(|&h| {
                let u = self.add_vertex(position);
                self.he_mut(h).vertex = u;
                self.v_mut(u).halfedge = h;
                u
            })
            .collect::<Vec<_>>();

        // `ring[i]` goes from `new_vertices[i - 1]` to `new_vertices[i]` and
        // lies in the face of `out[i]`. Its twin is part of the new face.
        let mut ring = Vec::with_capacity(n);
        for i in 0..n {
            let prev = (i + n - 1) % n;
            let r = self.add_edge(new_vertices[prev], new_vertices[i]);
            let face = self.he(out[i]).face;

            self.link(out[prev].twin(), r);
            self.link(r, out[i]);
            self.he_mut(r).face = face;
            ring.push(r);
        }

        let new_face = self.add_face(ring[0].twin(), false);
        for i in 0..n {
            let inner = ring[i].twin();
            self.link(inner, ring[(i + n - 1) % n].twin());
            self.he_mut(inner).face = new_face;
        }

        self.remove_vertex(v);
        self.bump_revision();
        Ok(new_face)
    }

    /// Replaces the edge `e` by a new face. Each endpoint of `e` is replaced
    /// by one new vertex per other edge of that endpoint. `e` itself becomes
    /// the side of the new face next to `e`'s first face. Returns the new
    /// face.
    ///
    /// Refused if the new face would have fewer than three sides.
    pub fn bevel_edge(&mut self, e: EdgeHandle) -> Result<FaceHandle, EditError> {
        self.check_edge(e)?;

        // `h0` goes from `a` to `b`. `a_out` are the outgoing half edges of
        // `a` except `h0`, in `twin.next` order starting after `h0`; the same
        // for `b` and `h3`.
        let h0 = e.half();
        let h3 = h0.twin();
        let a = self.he(h0).vertex;
        let b = self.he(h3).vertex;
        let a_out = self.vertex_fan_from(h0)[1..].to_vec();
        let b_out = self.vertex_fan_from(h3)[1..].to_vec();
        let (p, q) = (a_out.len(), b_out.len());
        if p + q < 3 {
            return refuse(EditError::Degenerate(Element::Edge(e)));
        }

        let pos_a = self.position(a);
        let pos_b = self.position(b);
        let us = a_out.iter().map(|_| self.add_vertex(pos_a)).collect::<Vec<_>>();
        let zs = b_out.iter().map(|_| self.add_vertex(pos_b)).collect::<Vec<_>>();
        for (&h, &u) in a_out.iter().zip(&us) {
            self.he_mut(h).vertex = u;
            self.v_mut(u).halfedge = h;
        }
        for (&h, &z) in b_out.iter().zip(&zs) {
            self.he_mut(h).vertex = z;
            self.v_mut(z).halfedge = h;
        }

        // `h0` now goes from the last `u` to the first `z` and stays in its
        // face, `h3` becomes part of the new face.
        self.he_mut(h0).vertex = us[p - 1];
        self.he_mut(h3).vertex = zs[0];

        // The edge closing the gap in the face of `h3`, from the last `z`
        // to the first `u`.
        let f1 = self.he(h3).face;
        let gap = self.add_edge(zs[q - 1], us[0]);
        self.link(b_out[q - 1].twin(), gap);
        self.link(gap, a_out[0]);
        self.he_mut(gap).face = f1;
        if self.f(f1).halfedge == h3 {
            self.f_mut(f1).halfedge = gap;
        }

        // Edges between consecutive new vertices, each in the face between
        // the two corresponding old edges.
        let chain = |mesh: &mut Self, out: &[HalfEdgeHandle], new: &[VertexHandle]| {
            (0..out.len() - 1)
                .map(|j| {
                    let c = mesh.add_edge(new[j], new[j + 1]);
                    let face = mesh.he(out[j + 1]).face;
                    mesh.link(out[j].twin(), c);
                    mesh.link(c, out[j + 1]);
                    mesh.he_mut(c).face = face;
                    c
                })
                .collect::<Vec<_>>()
        };
        let a_chain = chain(self, &a_out, &us);
        let b_chain = chain(self, &b_out, &zs);

        // The new face: h3, the a chain backwards, the gap, the b chain
        // backwards.
        let mut cycle = vec![h3];
        cycle.extend(a_chain.iter().rev().map(|c| c.twin()));
        cycle.push(gap.twin());
        cycle.extend(b_chain.iter().rev().map(|c| c.twin()));

        let new_face = self.add_face(h3, false);
        for (i, &h) in cycle.iter().enumerate() {
            self.link(h, cycle[(i + 1) % cycle.len()]);
            self.he_mut(h).face = new_face;
        }

        self.remove_vertex(a);
        self.remove_vertex(b);
        self.bump_revision();
        Ok(new_face)
    }

    /// Insets the face `f`: a copy of each of its vertices is created and
    /// connected to the original vertex, the copies form the new, inner face
    /// (which is returned) and `f` becomes one of the quads in the ring
    /// around it.
    ///
    /// Refused for boundary loops.
    pub fn bevel_face(&mut self, f: FaceHandle) -> Result<FaceHandle, EditError> {
        self.check_face(f)?;
        if self.f(f).boundary {
            return refuse(EditError::Boundary(Element::Face(f)));
        }

        let hs = self.face_cycle(f);
        let k = hs.len();
        let us = hs.iter()
            .map(|&h| {
                let p = self.position(self.he(h).vertex);
                self.add_vertex(p)
            })
            .collect::<Vec<_>>();

        // `spokes[i]` goes from the old vertex `i` to `us[i]`, `inner[i]` from
        // `us[i]` to `us[i + 1]`.
        let spokes = (0..k)
            .map(|i| self.add_edge(self.he(hs[i]).vertex, us[i]))
            .collect::<Vec<_>>();
        let inner = (0..k)
            .map(|i| self.add_edge(us[i], us[(i + 1) % k]))
            .collect::<Vec<_>>();

        // The quad of side `i`: hs[i] -> spokes[i + 1] -> twin(inner[i]) ->
        // twin(spokes[i]). The first one reuses `f`.
        for i in 0..k {
            let j = (i + 1) % k;
            let quad = if i == 0 { f } else { self.add_face(hs[i], false) };
            let cycle = [hs[i], spokes[j], inner[i].twin(), spokes[i].twin()];
            for (c, &h) in cycle.iter().enumerate() {
                self.link(h, cycle[(c + 1) % 4]);
                self.he_mut(h).face = quad;
            }
            self.f_mut(quad).halfedge = hs[i];
        }

        let new_face = self.add_face(inner[0], false);
        for i in 0..k {
            self.link(inner[i], inner[(i + 1) % k]);
            self.he_mut(inner[i]).face = new_face;
            self.v_mut(us[i]).halfedge = inner[i];
        }

        self.bump_revision();
        Ok(new_face)
    }

    /// For every half edge `h` of the face `f`, returns `twin(h).next`. After
    /// a bevel, these are the half edges from the new vertices towards the
    /// vertices they are moved towards.
    pub fn bevel_spokes(&self, f: FaceHandle) -> Vec<HalfEdgeHandle> {
        self.face_half_edges(f).map(|h| self.next(h.twin())).collect()
    }

    /// Moves the new vertices of a vertex bevel: each origin of `spokes` is
    /// placed `inset` of the way from `original` towards the spoke's target.
    pub fn bevel_vertex_compute_new_positions(
        &mut self,
        original: Pos3,
        spokes: &[HalfEdgeHandle],
        inset: f64,
    ) {
        for &h in spokes {
            let target = self.position(self.target(h));
            let v = self.vertex(h);
            self.set_position(v, original + (target - original) * inset);
        }
    }

    /// Moves the new vertices of an edge bevel: the origin of `spokes[i]` is
    /// placed `inset` of the way from `originals[i]` towards the spoke's
    /// target.
    pub fn bevel_edge_compute_new_positions(
        &mut self,
        originals: &[Pos3],
        spokes: &[HalfEdgeHandle],
        inset: f64,
    ) {
        assert_eq!(originals.len(), spokes.len(), "one original position per spoke required");

        for (&original, &h) in originals.iter().zip(spokes) {
            let target = self.position(self.target(h));
            let v = self.vertex(h);
            self.set_position(v, original + (target - original) * inset);
        }
    }

    /// Moves the new vertices of a face bevel: the origin of `spokes[i]` is
    /// placed `inset` of the way from `originals[i]` towards the centroid of
    /// all originals and then moved by `shift` along the normal of the
    /// polygon formed by the originals.
    pub fn bevel_face_compute_new_positions(
        &mut self,
        originals: &[Pos3],
        spokes: &[HalfEdgeHandle],
        shift: f64,
        inset: f64,
    ) {
        assert_eq!(originals.len(), spokes.len(), "one original position per spoke required");

        let centroid = match originals.iter().cloned().centroid() {
            Some(c) => c,
            None => return,
        };
        let normal = math::normalize_or_zero(math::newell_normal(originals));

        for (&original, &h) in originals.iter().zip(spokes) {
            let v = self.vertex(h);
            let p = original + (centroid - original) * inset + normal * shift;
            self.set_position(v, p);
        }
    }

    /// First phase of a bevel of `element` (a vertex, edge or face; a half
    /// edge means its edge). Returns everything needed to move the new
    /// vertices later via [`apply_bevel_offsets`][Self::apply_bevel_offsets].
    pub fn begin_bevel(&mut self, element: Element) -> Result<Bevel, EditError> {
        let (kind, face) = match element {
            Element::Vertex(v) => (BevelKind::Vertex, self.bevel_vertex(v)?),
            Element::Edge(e) => (BevelKind::Edge, self.bevel_edge(e)?),
            Element::HalfEdge(h) => (BevelKind::Edge, self.bevel_edge(h.edge())?),
            Element::Face(f) => (BevelKind::Face, self.bevel_face(f)?),
        };

        let spokes = self.bevel_spokes(face);
        let originals = spokes.iter().map(|&h| self.position(self.vertex(h))).collect();

        Ok(Bevel {
            kind,
            face,
            spokes,
            originals,
            revision: self.revision,
        })
    }

    /// Second phase of a bevel: moves the new vertices of `bevel`. Can be
    /// called any number of times. Refused with [`EditError::Stale`] if the
    /// mesh was structurally changed since the bevel was created.
    pub fn apply_bevel_offsets(
        &mut self,
        bevel: &Bevel,
        params: BevelParams,
    ) -> Result<(), EditError> {
        if bevel.revision != self.revision || !self.contains_face(bevel.face) {
            return refuse(EditError::Stale(Element::Face(bevel.face)));
        }

        match bevel.kind {
            BevelKind::Vertex => {
                // All new vertices were created at the same position.
                let original = bevel.originals[0];
                self.bevel_vertex_compute_new_positions(original, &bevel.spokes, params.inset);
            }
            BevelKind::Edge => {
                self.bevel_edge_compute_new_positions(
                    &bevel.originals,
                    &bevel.spokes,
                    params.inset,
                );
            }
            BevelKind::Face => {
                self.bevel_face_compute_new_positions(
                    &bevel.originals,
                    &bevel.spokes,
                    params.shift,
                    params.inset,
                );
            }
        }

        Ok(())
    }
}
