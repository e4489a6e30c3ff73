//! Building a [`HalfEdgeMesh`] from indexed polygon data.

use fxhash::{FxHashMap, FxHashSet};

use crate::{
    error::BuildError,
    handle::{HalfEdgeHandle, VertexHandle},
    math::Pos3,
};
use super::HalfEdgeMesh;


/// One polygon of a [`PolygonSoup`]: indices into the position list, in
/// counter clock wise order (seen from the outside of the surface).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    pub vertices: Vec<usize>,
}

impl Polygon {
    pub fn new(vertices: impl Into<Vec<usize>>) -> Self {
        Self { vertices: vertices.into() }
    }

    pub fn degree(&self) -> usize {
        self.vertices.len()
    }
}

/// Indexed polygon data as delivered by file loaders: an ordered list of
/// positions and a list of polygons referencing them.
///
/// Normals and texture coordinates are not part of the mesh and are thus
/// not part of this type; the renderer keeps them if it needs them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonSoup {
    pub positions: Vec<Pos3>,
    pub polygons: Vec<Polygon>,
}

impl PolygonSoup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a position and returns its index.
    pub fn add_position(&mut self, p: Pos3) -> usize {
        self.positions.push(p);
        self.positions.len() - 1
    }

    pub fn add_polygon(&mut self, vertices: impl Into<Vec<usize>>) {
        self.polygons.push(Polygon::new(vertices));
    }

    /// Shorthand for [`HalfEdgeMesh::from_soup`].
    pub fn build(&self) -> Result<HalfEdgeMesh, BuildError> {
        HalfEdgeMesh::from_soup(self)
    }
}


impl HalfEdgeMesh {
    /// Builds a mesh from polygon soup.
    ///
    /// Edges used by only one polygon become boundary edges; the holes they
    /// surround are stored as boundary loops. Positions not referenced by any
    /// polygon are skipped (with a warning), since the mesh cannot contain
    /// isolated vertices.
    ///
    /// Fails if an index is out of range, a polygon has fewer than three
    /// vertices or repeats a vertex, a directed edge is used twice (more than
    /// two polygons at an edge, or inconsistent orientation), or the polygons
    /// around a vertex do not form a single fan.
    pub fn from_soup(soup: &PolygonSoup) -> Result<Self, BuildError> {
        Self::from_soup_with_map(soup).map(|(mesh, _)| mesh)
    }

    /// Like [`from_soup`][Self::from_soup], but additionally returns the
    /// vertex handle for every position index (`None` for unreferenced
    /// positions).
    pub fn from_soup_with_map(
        soup: &PolygonSoup,
    ) -> Result<(Self, Vec<Option<VertexHandle>>), BuildError> {
        let num_positions = soup.positions.len();

        // ----- Validate polygons ------------------------------------------------------------
        for (pi, poly) in soup.polygons.iter().enumerate() {
            if poly.degree() < 3 {
                return Err(BuildError::DegeneratePolygon { polygon: pi, degree: poly.degree() });
            }

            let mut seen = FxHashSet::default();
            for &idx in &poly.vertices {
                if idx >= num_positions {
                    return Err(BuildError::IndexOutOfRange {
                        polygon: pi,
                        index: idx,
                        num_positions,
                    });
                }
                if !seen.insert(idx) {
                    return Err(BuildError::RepeatedVertex { polygon: pi, index: idx });
                }
            }
        }

        // ----- Vertices ---------------------------------------------------------------------
        let mut mesh = Self::new();
        let mut referenced = vec![false; num_positions];
        for &idx in soup.polygons.iter().flat_map(|p| &p.vertices) {
            referenced[idx] = true;
        }

        let vertex_map = soup.positions.iter()
            .zip(&referenced)
            .enumerate()
            .map(|(idx, (&pos, &used))| {
                if used {
                    Some(mesh.add_vertex(pos))
                } else {
                    log::warn!("position {} is not referenced by any polygon, skipping it", idx);
                    None
                }
            })
            .collect::<Vec<_>>();
        let vh = |idx: usize| vertex_map[idx].expect("referenced position has a vertex");

        // ----- Edges and faces --------------------------------------------------------------
        // All half edges created so far, by directed index pair.
        let mut half_edges: FxHashMap<(usize, usize), HalfEdgeHandle> = FxHashMap::default();
        // Directed pairs already used by a polygon.
        let mut claimed: FxHashSet<(usize, usize)> = FxHashSet::default();

        for poly in &soup.polygons {
            let n = poly.degree();
            let mut cycle = Vec::with_capacity(n);
            for i in 0..n {
                let from = poly.vertices[i];
                let to = poly.vertices[(i + 1) % n];

                if !claimed.insert((from, to)) {
                    return Err(BuildError::NonManifoldEdge { from, to });
                }

                let h = match half_edges.get(&(from, to)) {
                    Some(&h) => h,
                    None => {
                        let h = mesh.add_edge(vh(from), vh(to));
                        half_edges.insert((from, to), h);
                        half_edges.insert((to, from), h.twin());
                        h
                    }
                };
                cycle.push(h);
            }

            let face = mesh.add_face(cycle[0], false);
            for i in 0..n {
                let h = cycle[i];
                mesh.he_mut(h).face = face;
                mesh.link(h, cycle[(i + 1) % n]);
                let origin = mesh.he(h).vertex;
                mesh.v_mut(origin).halfedge = h;
            }
        }

        // ----- Boundary loops ---------------------------------------------------------------
        // Every vertex can have at most one outgoing boundary half edge,
        // otherwise two fans touch at that vertex.
        let mut boundary_out: FxHashMap<usize, HalfEdgeHandle> = FxHashMap::default();
        let mut unclaimed = half_edges.iter()
            .filter(|(pair, _)| !claimed.contains(pair))
            .map(|(&pair, &h)| (pair, h))
            .collect::<Vec<_>>();

        // Hash map iteration order is arbitrary, sort to be deterministic.
        unclaimed.sort_by_key(|&(pair, _)| pair);
        for &((from, _), h) in &unclaimed {
            if boundary_out.insert(from, h).is_some() {
                return Err(BuildError::NonManifoldVertex { index: from });
            }
        }

        for &((_, to), h) in &unclaimed {
            // The number of outgoing and incoming boundary half edges is equal
            // for every vertex, so `to` has exactly one.
            let next = boundary_out[&to];
            mesh.link(h, next);
        }

        let mut in_loop = FxHashSet::default();
        for &(_, start) in &unclaimed {
            if !in_loop.insert(start) {
                continue;
            }

            let face = mesh.add_face(start, true);
            mesh.he_mut(start).face = face;
            let mut h = mesh.next(start);
            while h != start {
                in_loop.insert(h);
                mesh.he_mut(h).face = face;
                h = mesh.next(h);
            }
        }

        // Boundary vertices point to their outgoing boundary half edge.
        for (&from, &h) in &boundary_out {
            mesh.v_mut(vh(from)).halfedge = h;
        }

        // ----- Check that the faces around each vertex form one fan -------------------------
        let mut out_degree = vec![0usize; num_positions];
        for &(from, _) in half_edges.keys() {
            out_degree[from] += 1;
        }
        for (idx, v) in vertex_map.iter().enumerate() {
            if let Some(v) = *v {
                if mesh.valence(v) != out_degree[idx] {
                    return Err(BuildError::NonManifoldVertex { index: idx });
                }
            }
        }

        log::debug!(
            "built mesh with {} vertices, {} edges, {} faces and {} boundary loops",
            mesh.num_vertices(),
            mesh.num_edges(),
            mesh.num_faces(),
            mesh.num_boundaries(),
        );

        Ok((mesh, vertex_map))
    }

    /// Converts the mesh back to polygon soup. Positions are in vertex
    /// iteration order and only real faces are exported.
    pub fn to_soup(&self) -> PolygonSoup {
        let mut index_of = FxHashMap::default();
        let mut soup = PolygonSoup::new();
        for v in self.vertex_handles() {
            index_of.insert(v, soup.add_position(self.position(v)));
        }
        for f in self.face_handles() {
            soup.add_polygon(self.face_vertices(f).map(|v| index_of[&v]).collect::<Vec<_>>());
        }

        soup
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;

    fn square_soup() -> PolygonSoup {
        let mut soup = PolygonSoup::new();
        soup.add_position(Pos3::new(0.0, 0.0, 0.0));
        soup.add_position(Pos3::new(1.0, 0.0, 0.0));
        soup.add_position(Pos3::new(1.0, 1.0, 0.0));
        soup.add_position(Pos3::new(0.0, 1.0, 0.0));
        soup
    }

    #[test]
    fn single_quad() {
        let mut soup = square_soup();
        soup.add_polygon(vec![0, 1, 2, 3]);
        let mesh = soup.build().unwrap();
        mesh.check_integrity();

        assert_eq!(mesh.num_vertices(), 4);
        assert_eq!(mesh.num_edges(), 4);
        assert_eq!(mesh.num_faces(), 1);
        assert_eq!(mesh.num_boundaries(), 1);
        assert!(mesh.vertex_handles().all(|v| mesh.is_boundary_vertex(v)));

        let b = mesh.boundary_handles().next().unwrap();
        assert_eq!(mesh.face_degree(b), 4);
    }

    #[test]
    fn two_triangles_share_interior_edge() {
        let mut soup = square_soup();
        soup.add_polygon(vec![0, 1, 2]);
        soup.add_polygon(vec![0, 2, 3]);
        let (mesh, map) = HalfEdgeMesh::from_soup_with_map(&soup).unwrap();
        mesh.check_integrity();

        assert_eq!(mesh.num_edges(), 5);
        let diagonal = mesh.edge_between(map[0].unwrap(), map[2].unwrap()).unwrap();
        assert!(!mesh.is_boundary_edge(diagonal));
        assert_eq!(mesh.num_boundaries(), 1);
    }

    #[test]
    fn closed_shapes_have_no_boundary() {
        for soup in &[shape::tetrahedron(), shape::cube(), shape::octahedron()] {
            let mesh = soup.build().unwrap();
            mesh.check_integrity();
            assert!(mesh.is_closed());
            assert_eq!(mesh.euler_characteristic(), 2);
        }
    }

    #[test]
    fn unreferenced_positions_are_skipped() {
        let mut soup = square_soup();
        soup.add_polygon(vec![0, 1, 2]);
        let (mesh, map) = HalfEdgeMesh::from_soup_with_map(&soup).unwrap();

        assert_eq!(mesh.num_vertices(), 3);
        assert!(map[3].is_none());
    }

    #[test]
    fn invalid_polygons() {
        let mut soup = square_soup();
        soup.add_polygon(vec![0, 1]);
        assert_eq!(soup.build().unwrap_err(), BuildError::DegeneratePolygon { polygon: 0, degree: 2 });

        let mut soup = square_soup();
        soup.add_polygon(vec![0, 1, 7]);
        assert_eq!(
            soup.build().unwrap_err(),
            BuildError::IndexOutOfRange { polygon: 0, index: 7, num_positions: 4 },
        );

        let mut soup = square_soup();
        soup.add_polygon(vec![0, 1, 2, 1]);
        assert_eq!(soup.build().unwrap_err(), BuildError::RepeatedVertex { polygon: 0, index: 1 });
    }

    #[test]
    fn inconsistent_orientation() {
        let mut soup = square_soup();
        soup.add_polygon(vec![0, 1, 2]);
        soup.add_polygon(vec![0, 1, 3]);
        assert_eq!(soup.build().unwrap_err(), BuildError::NonManifoldEdge { from: 0, to: 1 });
    }

    #[test]
    fn three_faces_at_one_edge() {
        let mut soup = square_soup();
        soup.add_position(Pos3::new(0.5, 0.5, 1.0));
        soup.add_polygon(vec![0, 1, 2]);
        soup.add_polygon(vec![1, 0, 3]);
        soup.add_polygon(vec![1, 0, 4]);
        assert_eq!(soup.build().unwrap_err(), BuildError::NonManifoldEdge { from: 1, to: 0 });
    }

    #[test]
    fn bowtie_vertex() {
        // Two triangles touching only at vertex 0.
        let mut soup = square_soup();
        soup.add_position(Pos3::new(-1.0, 0.0, 0.0));
        soup.add_position(Pos3::new(-1.0, -1.0, 0.0));
        soup.add_polygon(vec![0, 1, 2]);
        soup.add_polygon(vec![0, 4, 5]);
        assert_eq!(soup.build().unwrap_err(), BuildError::NonManifoldVertex { index: 0 });
    }

    #[test]
    fn soup_round_trip() {
        let mesh = shape::cube().build().unwrap();
        let again = mesh.to_soup().build().unwrap();
        again.check_integrity();

        assert_eq!(again.num_vertices(), mesh.num_vertices());
        assert_eq!(again.num_edges(), mesh.num_edges());
        assert_eq!(again.num_faces(), mesh.num_faces());
    }
}
