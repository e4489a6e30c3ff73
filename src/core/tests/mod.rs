//! Helpers shared by the unit tests of the mesh and its operations, plus
//! tests that run long sequences of random operations.

use cgmath::Point3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    error::EditError,
    handle::{Element, VertexHandle, hsize},
    math::Pos3,
    shape,
};
use super::{HalfEdgeMesh, PolygonSoup};


/// Asserts that `$op` (an operation on `$mesh`) is refused with `$err` and
/// leaves the mesh untouched.
macro_rules! assert_refused {
    ($mesh:ident . $op:ident ( $($arg:expr),* ) => $err:expr) => {{
        let before = $crate::core::tests::Snapshot::of(&$mesh);
        assert_eq!($mesh.$op($($arg),*), Err($err));
        assert_eq!(
            $crate::core::tests::Snapshot::of(&$mesh),
            before,
            "refused operation changed the mesh",
        );
        $mesh.check_integrity();
    }};
}


/// The unit square `a (0, 0)`, `b (1, 0)`, `c (1, 1)`, `d (0, 1)` split into
/// the triangles `[a, b, c]` and `[a, c, d]`.
pub(crate) fn two_triangles() -> (HalfEdgeMesh, [VertexHandle; 4]) {
    let mut soup = PolygonSoup::new();
    soup.add_position(Point3::new(0.0, 0.0, 0.0));
    soup.add_position(Point3::new(1.0, 0.0, 0.0));
    soup.add_position(Point3::new(1.0, 1.0, 0.0));
    soup.add_position(Point3::new(0.0, 1.0, 0.0));
    soup.add_polygon([0, 1, 2]);
    soup.add_polygon([0, 2, 3]);

    let (mesh, map) = HalfEdgeMesh::from_soup_with_map(&soup).unwrap();
    let v = |i: usize| map[i].unwrap();
    (mesh, [v(0), v(1), v(2), v(3)])
}

/// A single regular `n`-gon in the xy-plane.
pub(crate) fn polygon(n: usize) -> HalfEdgeMesh {
    let mut soup = PolygonSoup::new();
    for i in 0..n {
        let angle = i as f64 / n as f64 * std::f64::consts::PI * 2.0;
        soup.add_position(Point3::new(angle.cos(), angle.sin(), 0.0));
    }
    soup.add_polygon((0..n).collect::<Vec<_>>());

    HalfEdgeMesh::from_soup(&soup).unwrap()
}

/// The vertex sets of all real faces, independent of the order in which
/// faces and vertices are stored.
pub(crate) fn face_vertex_sets(mesh: &HalfEdgeMesh) -> Vec<Vec<VertexHandle>> {
    let mut out = mesh.face_handles()
        .map(|f| {
            let mut vs = mesh.face_vertices(f).collect::<Vec<_>>();
            vs.sort();
            vs
        })
        .collect::<Vec<_>>();
    out.sort();
    out
}

/// Everything a refused operation has to leave as it was.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Snapshot {
    revision: u64,
    counts: [hsize; 4],
    cycles: Vec<Vec<VertexHandle>>,
    positions: Vec<(VertexHandle, Pos3)>,
}

impl Snapshot {
    pub(crate) fn of(mesh: &HalfEdgeMesh) -> Self {
        // Each face and boundary loop as its vertex cycle, rotated to start
        // at the smallest handle. The order of faces doesn't matter.
        let mut cycles = mesh.face_handles()
            .chain(mesh.boundary_handles())
            .map(|f| {
                let mut vs = mesh.face_vertices(f).collect::<Vec<_>>();
                let min = (0..vs.len()).min_by_key(|&i| vs[i]).unwrap_or(0);
                vs.rotate_left(min);
                vs
            })
            .collect::<Vec<_>>();
        cycles.sort();

        Self {
            revision: mesh.revision(),
            counts: [
                mesh.num_vertices(),
                mesh.num_edges(),
                mesh.num_faces(),
                mesh.num_boundaries(),
            ],
            cycles,
            positions: mesh.vertex_handles().map(|v| (v, mesh.position(v))).collect(),
        }
    }
}

/// Picks a random element of `iter` or `None` if it's empty.
fn pick<T>(rng: &mut StdRng, iter: impl Iterator<Item = T>) -> Option<T> {
    let items = iter.collect::<Vec<_>>();
    if items.is_empty() {
        None
    } else {
        let i = rng.gen_range(0..items.len());
        items.into_iter().nth(i)
    }
}

/// Applies `steps` random operations to random elements of `mesh`. Refused
/// operations must not change anything, successful ones must leave a valid
/// mesh. Returns the number of successful operations.
fn random_edits(mesh: &mut HalfEdgeMesh, rng: &mut StdRng, steps: usize) -> usize {
    let mut applied = 0;
    for _ in 0..steps {
        let before = Snapshot::of(mesh);
        let rev = mesh.revision();
        let chi = mesh.euler_characteristic();
        let holes = mesh.num_boundaries();

        let op = rng.gen_range(0..12);
        let result: Result<Element, EditError> = match op {
            0 | 1 => match pick(rng, mesh.edge_handles()) {
                Some(e) => mesh.flip_edge(e).map(Element::Edge),
                None => continue,
            },
            2 => match pick(rng, mesh.edge_handles()) {
                Some(e) => mesh.split_edge(e).map(Element::Vertex),
                None => continue,
            },
            3 | 4 => match pick(rng, mesh.edge_handles()) {
                Some(e) => mesh.collapse_edge(e).map(Element::Vertex),
                None => continue,
            },
            5 => match pick(rng, mesh.vertex_handles()) {
                Some(v) => mesh.erase_vertex(v).map(Element::Face),
                None => continue,
            },
            6 => match pick(rng, mesh.edge_handles()) {
                Some(e) => mesh.erase_edge(e).map(Element::Face),
                None => continue,
            },
            7 => match pick(rng, mesh.vertex_handles()) {
                Some(v) => mesh.bevel_vertex(v).map(Element::Face),
                None => continue,
            },
            8 => match pick(rng, mesh.face_handles()) {
                Some(f) => mesh.collapse_face(f).map(Element::Vertex),
                None => continue,
            },
            9 => match pick(rng, mesh.edge_handles()) {
                Some(e) => mesh.bevel_edge(e).map(Element::Face),
                None => continue,
            },
            10 => match pick(rng, mesh.face_handles()) {
                Some(f) => mesh.bevel_face(f).map(Element::Face),
                None => continue,
            },
            _ => {
                let edges = mesh.num_edges();
                let faces = mesh.num_faces();
                mesh.triangulate();
                mesh.check_integrity();

                let added = mesh.num_edges() - edges;
                assert_eq!(mesh.num_faces() - faces, added, "each new edge adds one face");
                assert_eq!(mesh.revision() > rev, added > 0);
                if added > 0 {
                    applied += 1;
                } else {
                    assert_eq!(Snapshot::of(mesh), before);
                }
                continue;
            }
        };

        match result {
            Ok(el) => {
                applied += 1;
                assert!(mesh.contains(el), "op {} returned dead element {}", op, el);
                assert!(mesh.revision() > rev);
            }
            Err(e) => assert_eq!(Snapshot::of(mesh), before, "op {} refused with {} but changed the mesh", op, e),
        }

        mesh.check_integrity();

        // Closing a hole changes the Euler characteristic, nothing else may.
        if mesh.num_boundaries() == holes {
            assert_eq!(mesh.euler_characteristic(), chi, "op {} changed the topology", op);
        }
    }

    applied
}


// ===============================================================================================
// ===== Tests
// ===============================================================================================

#[test]
fn empty_mesh() {
    let mesh = HalfEdgeMesh::new();
    mesh.check_integrity();

    assert!(mesh.is_empty());
    assert_eq!(mesh.num_vertices(), 0);
    assert_eq!(mesh.num_faces(), 0);
    assert_eq!(mesh.euler_characteristic(), 0);
    assert_eq!(mesh.bounding_box(), None);
}

#[test]
fn relations_of_two_triangles() {
    let (mesh, [a, b, c, d]) = two_triangles();
    mesh.check_integrity();

    assert_eq!(mesh.num_vertices(), 4);
    assert_eq!(mesh.num_edges(), 5);
    assert_eq!(mesh.num_half_edges(), 10);
    assert_eq!(mesh.num_faces(), 2);
    assert_eq!(mesh.num_boundaries(), 1);
    assert_eq!(mesh.euler_characteristic(), 1);

    let ac = mesh.half_edge_between(a, c).unwrap();
    assert_eq!(mesh.vertex(ac), a);
    assert_eq!(mesh.target(ac), c);
    assert_eq!(mesh.twin(mesh.twin(ac)), ac);
    assert_eq!(mesh.prev(mesh.next(ac)), ac);
    assert!(!mesh.is_boundary_edge(ac.edge()));
    assert!(mesh.is_boundary_edge(mesh.edge_between(a, b).unwrap()));
    assert!(mesh.edge_between(b, d).is_none());

    assert_eq!(mesh.valence(a), 3);
    assert_eq!(mesh.valence(b), 2);
    assert_eq!(mesh.vertex_faces(a).count(), 2);
    assert_eq!(mesh.vertex_faces(b).count(), 1);
    assert!(mesh.vertex_handles().all(|v| mesh.is_boundary_vertex(v)));
    assert!(mesh.is_triangle_mesh());
    assert!(!mesh.is_closed());
}

#[test]
fn geometry_of_two_triangles() {
    let (mut mesh, [a, b, c, _]) = two_triangles();
    let f = mesh.half_edge_between(a, b).map(|h| mesh.face(h)).unwrap();

    assert_eq!(mesh.face_area(f), 0.5);
    assert_eq!(mesh.face_normal(f), cgmath::Vector3::new(0.0, 0.0, 1.0));
    assert_eq!(mesh.edge_length(mesh.edge_between(a, b).unwrap()), 1.0);

    mesh.set_offset(c, 2.0);
    let displaced = mesh.displaced_positions();
    let (_, p) = displaced.iter().find(|(v, _)| *v == c).unwrap();
    assert_eq!(*p, Point3::new(1.0, 1.0, 2.0));

    let bb = mesh.bounding_box().unwrap();
    assert_eq!(bb.min, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(bb.max, Point3::new(1.0, 1.0, 0.0));
}

#[test]
fn check_finite_positions_reports_bad_vertices() {
    let (mut mesh, [a, b, ..]) = two_triangles();
    assert_eq!(mesh.check_finite_positions(|_, _| panic!("no bad vertex expected")), 0);

    mesh.set_position(a, Point3::new(std::f64::NAN, 0.0, 0.0));
    mesh.set_position(b, Point3::new(0.0, std::f64::INFINITY, 0.0));
    let mut reported = vec![];
    assert_eq!(mesh.check_finite_positions(|v, _| reported.push(v)), 2);
    reported.sort();
    let mut expected = vec![a, b];
    expected.sort();
    assert_eq!(reported, expected);
}

#[test]
fn check_finite_positions_is_not_reentrant() {
    let (mut mesh, [a, ..]) = two_triangles();
    mesh.set_position(a, Point3::new(std::f64::NAN, 0.0, 0.0));

    let mesh = mesh;
    let mut nested = vec![];
    let outer = mesh.check_finite_positions(|_, _| {
        nested.push(mesh.check_finite_positions(|_, _| panic!("nested check reported")));
    });

    assert_eq!(outer, 1);
    assert_eq!(nested, vec![0]);

    // The guard is released afterwards.
    assert_eq!(mesh.check_finite_positions(|_, _| {}), 1);
}

#[test]
fn clone_is_independent() {
    let mesh = shape::cube().build().unwrap();
    let mut copy = mesh.clone();
    copy.triangulate();

    assert_eq!(mesh.num_faces(), 6);
    assert_eq!(copy.num_faces(), 12);
    mesh.check_integrity();
    copy.check_integrity();
}

#[test]
fn handles_are_not_reused_by_accident() {
    let mut mesh = shape::icosahedron().build().unwrap();
    let e = mesh.edge_handles().next().unwrap();
    let [_, b] = mesh.endpoints(e);
    mesh.collapse_edge(e).unwrap();

    // The slot of `b` is reused by the new vertex, the old handle stays dead.
    let f = mesh.face_handles().next().unwrap();
    let e = mesh.face_half_edges(f).next().unwrap().edge();
    let v = mesh.split_edge(e).unwrap();
    assert!(!mesh.contains_vertex(b));
    assert!(mesh.contains_vertex(v));
    assert_ne!(v, b);
    assert_eq!(mesh.erase_vertex(b), Err(EditError::Stale(Element::Vertex(b))));
}

#[test]
fn refused_ops_leave_mesh_untouched() {
    let (mut mesh, [a, b, c, _]) = two_triangles();
    let boundary = mesh.edge_between(a, b).unwrap();
    let inner = mesh.edge_between(a, c).unwrap();

    assert_refused!(mesh.flip_edge(boundary) => EditError::Boundary(Element::Edge(boundary)));
    assert_refused!(mesh.collapse_edge(inner) => EditError::NonManifold(Element::Edge(inner)));
    assert_refused!(mesh.erase_vertex(b) => EditError::Boundary(Element::Vertex(b)));
    assert_refused!(mesh.bevel_vertex(b) => EditError::Degenerate(Element::Vertex(b)));
}

#[test]
fn random_edits_on_icosahedron() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut mesh = shape::icosahedron().build().unwrap();

    let applied = random_edits(&mut mesh, &mut rng, 400);
    assert!(applied > 50, "only {} of 400 operations applied", applied);
    assert!(mesh.is_closed());
}

#[test]
fn random_edits_on_grid() {
    let mut rng = StdRng::seed_from_u64(17);
    let mut mesh = shape::Grid { cols: 6, rows: 5, triangulated: true, ..shape::Grid::default() }
        .to_soup()
        .build()
        .unwrap();

    let applied = random_edits(&mut mesh, &mut rng, 300);
    assert!(applied > 30, "only {} of 300 operations applied", applied);
}

#[test]
fn random_edits_on_quads() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut mesh = shape::Grid { cols: 4, rows: 4, ..shape::Grid::default() }
        .to_soup()
        .build()
        .unwrap();
    mesh.triangulate();
    mesh.check_integrity();

    random_edits(&mut mesh, &mut rng, 200);
}

#[test]
fn random_edits_on_polygons() {
    // Splits and bevels between quads often hit faces that share more than
    // the edge between them.
    let mut rng = StdRng::seed_from_u64(11);
    let mut mesh = shape::cube().build().unwrap();

    random_edits(&mut mesh, &mut rng, 300);
    assert!(mesh.is_closed());
    assert_eq!(mesh.euler_characteristic(), 2);
}

#[test]
fn face_counters_follow_edits() {
    let mut rng = StdRng::seed_from_u64(29);
    let mut mesh = shape::Grid { cols: 3, rows: 3, ..shape::Grid::default() }
        .to_soup()
        .build()
        .unwrap();

    for _ in 0..10 {
        random_edits(&mut mesh, &mut rng, 10);
        assert_eq!(mesh.num_faces() as usize, mesh.face_handles().count());
        assert_eq!(mesh.num_boundaries() as usize, mesh.boundary_handles().count());
    }

    let mut closed = shape::cube().build().unwrap();
    assert_eq!((closed.num_faces(), closed.num_boundaries()), (6, 0));
    closed.triangulate();
    assert_eq!((closed.num_faces(), closed.num_boundaries()), (12, 0));
}
