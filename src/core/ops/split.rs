use crate::{
    error::EditError,
    handle::{EdgeHandle, VertexHandle},
};
use super::HalfEdgeMesh;


/// Everything created by [`HalfEdgeMesh::split_edge_detailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitEdgeResult {
    /// The new vertex at the midpoint.
    pub vertex: VertexHandle,

    /// The two halves of the split edge. The first one is the original edge
    /// (now ending at the new vertex), the second one is new.
    pub along: [EdgeHandle; 2],

    /// Edges added to triangulate the adjacent faces, one per adjacent
    /// triangle. They all end at the new vertex unless the second face had
    /// to be triangulated from another vertex.
    pub across: Vec<EdgeHandle>,
}

impl HalfEdgeMesh {
    /// Inserts a new vertex at the midpoint of `e` and returns it.
    ///
    /// The adjacent real faces are split into triangles by connecting the new
    /// vertex to their other vertices: each adjacent triangle becomes two
    /// triangles, larger faces are fanned. If both faces share a vertex
    /// besides the endpoints of `e`, the new vertex is only connected to it
    /// once and the second face is triangulated from another vertex (see
    /// [`triangulate`][Self::triangulate]). A boundary loop next to `e`
    /// simply gets one more side. The handle `e` stays valid and refers to the half
    /// between the first endpoint and the new vertex.
    pub fn split_edge(&mut self, e: EdgeHandle) -> Result<VertexHandle, EditError> {
        self.split_edge_detailed(e).map(|res| res.vertex)
    }

    /// Like [`split_edge`][Self::split_edge], but returns all new elements.
    pub fn split_edge_detailed(&mut self, e: EdgeHandle) -> Result<SplitEdgeResult, EditError> {
        self.check_edge(e)?;

        // Before:                     After:
        //
        //    a ——— h0 ——▶ b              a — h0 ▶ m — g0 ▶ b
        //    a ◀—— h3 ——— b              a ◀ h3 — m ◀ g1 — b
        let h0 = e.half();
        let h3 = h0.twin();
        let a = self.he(h0).vertex;
        let b = self.he(h3).vertex;
        let f0 = self.he(h0).face;
        let f1 = self.he(h3).face;
        let h0_next = self.next(h0);
        let h3_prev = self.prev(h3);

        let midpoint = self.edge_midpoint(e);
        let m = self.add_vertex(midpoint);
        let g0 = self.add_edge(m, b);
        let g1 = g0.twin();

        self.he_mut(h3).vertex = m;

        self.link(g0, h0_next);
        self.link(h0, g0);
        self.he_mut(g0).face = f0;

        self.link(h3_prev, g1);
        self.link(g1, h3);
        self.he_mut(g1).face = f1;

        if self.v(b).halfedge == h3 {
            self.v_mut(b).halfedge = g1;
        }
        self.v_mut(m).halfedge = g0;

        let mut across = Vec::new();
        if !self.f(f0).boundary {
            across.extend(self.triangulate_face(g0));
        }
        if !self.f(f1).boundary {
            across.extend(self.triangulate_face(h3));
        }

        log::trace!("split {:?} ({:?} - {:?}), new vertex {:?}", e, a, b, m);
        self.bump_revision();
        Ok(SplitEdgeResult {
            vertex: m,
            along: [e, g0.edge()],
            across,
        })
    }
}


#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use cgmath::{Point3, prelude::*};

    use crate::{
        core::{tests::*, HalfEdgeMesh, PolygonSoup},
        shape,
    };

    #[test]
    fn split_interior_edge_of_two_triangles() {
        let (mut mesh, [a, _, c, _]) = two_triangles();
        let e = mesh.edge_between(a, c).unwrap();
        let far = mesh.target(e.half());
        let res = mesh.split_edge_detailed(e).unwrap();
        mesh.check_integrity();

        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_faces(), 4);
        assert_eq!(mesh.num_edges(), 8);
        assert_eq!(res.across.len(), 2);
        assert_eq!(mesh.valence(res.vertex), 4);
        assert!(!mesh.is_boundary_vertex(res.vertex));
        assert_relative_eq!(
            mesh.position(res.vertex).distance(Point3::new(0.5, 0.5, 0.0)),
            0.0,
        );

        assert_eq!(res.along[0], e);
        let mut ends = mesh.endpoints(res.along[1]).to_vec();
        ends.sort();
        let mut expected = vec![far, res.vertex];
        expected.sort();
        assert_eq!(ends, expected);
    }

    #[test]
    fn split_boundary_edge() {
        let (mut mesh, [a, b, ..]) = two_triangles();
        let e = mesh.edge_between(a, b).unwrap();
        let res = mesh.split_edge_detailed(e).unwrap();
        mesh.check_integrity();

        assert_eq!(res.across.len(), 1);
        assert_eq!(mesh.num_faces(), 3);
        assert!(mesh.is_boundary_vertex(res.vertex));
        assert_eq!(mesh.valence(res.vertex), 3);
        let boundary = mesh.boundary_handles().next().unwrap();
        assert_eq!(mesh.face_degree(boundary), 5);
    }

    #[test]
    fn split_edge_of_quads_fans() {
        let mut mesh = shape::cube().build().unwrap();
        let e = mesh.edge_handles().next().unwrap();
        let res = mesh.split_edge_detailed(e).unwrap();
        mesh.check_integrity();

        // Both quads become pentagons, each fanned into three triangles.
        assert_eq!(res.across.len(), 4);
        assert_eq!(mesh.num_faces(), 6 - 2 + 6);
        assert_eq!(mesh.euler_characteristic(), 2);
    }

    #[test]
    fn split_edge_between_faces_sharing_a_corner() {
        // A closed mesh of the triangles `[0, 1, 2]`, `[1, 0, 3]` and the quad
        // `[0, 2, 1, 3]`. The triangle and the quad share the edge `0-2` and
        // the far corner `1`.
        let mut soup = PolygonSoup::new();
        soup.add_position(Point3::new(0.0, 0.0, 0.0));
        soup.add_position(Point3::new(1.0, 1.0, 0.0));
        soup.add_position(Point3::new(1.0, 0.0, 1.0));
        soup.add_position(Point3::new(0.0, 1.0, 1.0));
        soup.add_polygon([0, 1, 2]);
        soup.add_polygon([1, 0, 3]);
        soup.add_polygon([0, 2, 1, 3]);
        let (mut mesh, map) = HalfEdgeMesh::from_soup_with_map(&soup).unwrap();
        mesh.check_integrity();

        let v = |i: usize| map[i].unwrap();
        let e = mesh.edge_between(v(0), v(2)).unwrap();
        let res = mesh.split_edge_detailed(e).unwrap();
        mesh.check_integrity();

        assert_eq!(mesh.num_vertices(), 5);
        assert_eq!(mesh.num_edges(), 9);
        assert_eq!(mesh.num_faces(), 6);
        assert_eq!(res.across.len(), 3);
        assert!(mesh.is_triangle_mesh());
        assert_eq!(mesh.euler_characteristic(), 2);
        assert_eq!(mesh.vertex_neighbors(res.vertex).filter(|&n| n == v(1)).count(), 1);
    }

    #[test]
    fn split_many_edges_keeps_invariants() {
        let mut mesh = shape::octahedron().build().unwrap();
        let edges = mesh.edge_handles().collect::<Vec<_>>();
        for e in edges {
            mesh.split_edge(e).unwrap();
            mesh.check_integrity();
        }

        assert_eq!(mesh.num_vertices(), 6 + 12);
        assert_eq!(mesh.euler_characteristic(), 2);
        assert!(mesh.is_triangle_mesh());
    }
}
