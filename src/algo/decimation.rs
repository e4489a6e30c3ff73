use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    ops::Add,
};

use cgmath::{prelude::*, Matrix3, Matrix4, Vector4};

use crate::{
    core::HalfEdgeMesh,
    handle::{EdgeHandle, VertexHandle},
    map::HandleMap,
    math::{self, Pos3, Vec3},
};


/// Configuration of [`downsample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownsampleConfig {
    /// The fraction of faces to keep. Ignored if `target_faces` is set.
    /// *Default*: 0.25.
    pub target_ratio: f64,

    /// Absolute number of faces to stop at. *Default*: `None`.
    pub target_faces: Option<usize>,

    /// Weight of the planes that keep boundary vertices on the boundary,
    /// relative to the face planes. *Default*: 100.
    pub boundary_weight: f64,
}

impl Default for DownsampleConfig {
    fn default() -> Self {
        Self {
            target_ratio: 0.25,
            target_faces: None,
            boundary_weight: 100.0,
        }
    }
}

impl DownsampleConfig {
    pub fn with_target_ratio(self, target_ratio: f64) -> Self {
        Self { target_ratio, ..self }
    }

    pub fn with_target_faces(self, target_faces: usize) -> Self {
        Self { target_faces: Some(target_faces), ..self }
    }

    pub fn with_boundary_weight(self, boundary_weight: f64) -> Self {
        Self { boundary_weight, ..self }
    }
}


/// Simplifies the mesh by collapsing edges until the face count drops to the
/// target or no edge can be collapsed anymore. Returns the number of
/// collapsed edges.
///
/// Edges are collapsed in the order of the quadric error of the merged
/// vertex; the merged vertex is placed where that error is minimal. The
/// costs of all edges around the merged vertex are re-evaluated after each
/// collapse. Collapses that would break the manifold property are skipped.
///
/// # References
///
/// Garland, Michael, and Paul S. Heckbert. Surface simplification using
/// quadric error metrics. SIGGRAPH 1997.
pub fn downsample(mesh: &mut HalfEdgeMesh, config: &DownsampleConfig) -> usize {
    let num_faces = mesh.num_faces() as usize;
    let target = config.target_faces
        .unwrap_or_else(|| (num_faces as f64 * config.target_ratio).round() as usize);
    if num_faces <= target {
        log::debug!("downsample: mesh has {} faces already (target {})", num_faces, target);
        return 0;
    }

    let mut state = State {
        quadrics: initial_quadrics(mesh, config.boundary_weight),
        stamps: HandleMap::default(),
        heap: BinaryHeap::new(),
    };
    for e in mesh.edge_handles() {
        state.push(mesh, e);
    }

    let mut collapses = 0;
    let mut skipped = 0;
    while mesh.num_faces() as usize > target {
        let candidate = match state.heap.pop() {
            Some(c) => c,
            None => break,
        };
        if !state.is_current(mesh, &candidate) {
            continue;
        }

        let [a, b] = candidate.ends;
        if mesh.collapse_edge(candidate.edge).is_err() {
            skipped += 1;
            continue;
        }

        // The first endpoint survives.
        mesh.set_position(a, candidate.target);
        let merged = state.quadrics[&a] + state.quadrics[&b];
        state.quadrics.remove(&b);
        state.quadrics.insert(a, merged);
        *state.stamps.entry(a).or_insert(0) += 1;

        let edges = mesh.vertex_out_half_edges(a).map(|h| h.edge()).collect::<Vec<_>>();
        for e in edges {
            state.push(mesh, e);
        }
        collapses += 1;
    }

    log::info!(
        "downsample: {} -> {} faces ({} collapses, {} refused)",
        num_faces,
        mesh.num_faces(),
        collapses,
        skipped,
    );
    collapses
}


/// A symmetric 4x4 matrix measuring the sum of squared distances to a set
/// of planes.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Quadric(Matrix4<f64>);

impl Quadric {
    fn zero() -> Self {
        Quadric(Matrix4::zero())
    }

    /// The quadric of the plane through `p` with unit normal `n`.
    fn plane(n: Vec3, p: Pos3, weight: f64) -> Self {
        let v = Vector4::new(n.x, n.y, n.z, -n.dot(p.to_vec()));
        Quadric(Matrix4::from_cols(v * v.x, v * v.y, v * v.z, v * v.w) * weight)
    }

    fn error(&self, p: Pos3) -> f64 {
        let v = p.to_homogeneous();
        v.dot(self.0 * v)
    }

    /// The point with minimal error or `None` if it's not unique.
    fn optimum(&self) -> Option<Pos3> {
        let m = &self.0;
        let a = Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate());
        if a.determinant().abs() < 1e-10 {
            return None;
        }

        let p = Pos3::from_vec(a.invert()? * -m.w.truncate());
        if math::is_finite(p) {
            Some(p)
        } else {
            None
        }
    }
}

impl Add for Quadric {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Quadric(self.0 + other.0)
    }
}

/// Sums the planes of all faces around each vertex. Boundary edges add a
/// plane perpendicular to their face which keeps the vertex on the boundary.
fn initial_quadrics(mesh: &HalfEdgeMesh, boundary_weight: f64) -> HandleMap<VertexHandle, Quadric> {
    let mut quadrics = mesh.vertex_handles()
        .map(|v| (v, Quadric::zero()))
        .collect::<HandleMap<_, _>>();

    for f in mesh.face_handles() {
        let normal = mesh.face_normal(f);
        let q = Quadric::plane(normal, mesh.face_centroid(f), 1.0);
        for v in mesh.face_vertices(f) {
            let entry = quadrics.entry(v).or_insert_with(Quadric::zero);
            *entry = *entry + q;
        }

        for h in mesh.face_half_edges(f).filter(|&h| mesh.is_boundary_half_edge(h.twin())) {
            let [a, b] = [mesh.vertex(h), mesh.target(h)];
            let along = mesh.position(b) - mesh.position(a);
            let n = math::normalize_or_zero(along.cross(normal));
            let q = Quadric::plane(n, mesh.position(a), boundary_weight);
            for &v in &[a, b] {
                let entry = quadrics.entry(v).or_insert_with(Quadric::zero);
                *entry = *entry + q;
            }
        }
    }

    quadrics
}


/// An entry in the priority queue. It's outdated if the edge or one of its
/// endpoints changed since it was pushed, which is detected via the stamps.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cost: f64,
    edge: EdgeHandle,
    ends: [VertexHandle; 2],
    stamps: [u32; 2],
    target: Pos3,
}

// Reversed, to make `BinaryHeap` a min-heap.
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.partial_cmp(&self.cost).unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

struct State {
    quadrics: HandleMap<VertexHandle, Quadric>,
    stamps: HandleMap<VertexHandle, u32>,
    heap: BinaryHeap<Candidate>,
}

impl State {
    fn stamp(&self, v: VertexHandle) -> u32 {
        self.stamps.get(&v).cloned().unwrap_or(0)
    }

    fn push(&mut self, mesh: &HalfEdgeMesh, e: EdgeHandle) {
        let ends = mesh.endpoints(e);
        let [a, b] = ends;
        let q = self.quadrics[&a] + self.quadrics[&b];

        let target = q.optimum().unwrap_or_else(|| {
            let pa = mesh.position(a);
            let pb = mesh.position(b);
            let options = [pa, pb, pa.midpoint(pb)];
            options.iter()
                .cloned()
                .min_by(|x, y| q.error(*x).partial_cmp(&q.error(*y)).unwrap_or(Ordering::Equal))
                .unwrap_or(pa)
        });

        self.heap.push(Candidate {
            cost: q.error(target),
            edge: e,
            ends,
            stamps: [self.stamp(a), self.stamp(b)],
            target,
        });
    }

    fn is_current(&self, mesh: &HalfEdgeMesh, c: &Candidate) -> bool {
        mesh.contains_edge(c.edge)
            && mesh.endpoints(c.edge) == c.ends
            && c.stamps == [self.stamp(c.ends[0]), self.stamp(c.ends[1])]
    }
}
