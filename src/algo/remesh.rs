use cgmath::prelude::*;

use crate::{
    core::HalfEdgeMesh,
    error::ResampleError,
    handle::VertexHandle,
    math::{Pos3, PosIteratorExt},
};
use super::require_triangles;


/// Configuration of [`resample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleConfig {
    /// Maximum number of split/collapse/flip/relax rounds. *Default*: 5.
    pub iterations: u32,

    /// The edge length to aim for. Has to be positive and finite.
    /// *Default*: `None`, meaning the mean edge length of the input.
    pub target_length: Option<f64>,

    /// How far vertices move towards the centroid of their neighbors in each
    /// relaxation step (tangentially only). *Default*: 0.2.
    pub smoothing_weight: f64,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            iterations: 5,
            target_length: None,
            smoothing_weight: 0.2,
        }
    }
}

impl ResampleConfig {
    pub fn with_iterations(self, iterations: u32) -> Self {
        Self { iterations, ..self }
    }

    pub fn with_target_length(self, target_length: f64) -> Self {
        Self { target_length: Some(target_length), ..self }
    }

    pub fn with_smoothing_weight(self, smoothing_weight: f64) -> Self {
        Self { smoothing_weight, ..self }
    }
}


/// Isotropic remeshing: makes all edges roughly `target_length` long and
/// the vertex valences as regular as possible.
///
/// Each round splits edges longer than 4/3 of the target length once, collapses
/// interior edges shorter than 4/5 of it (unless that would create an edge
/// that is too long), flips edges if that brings the valences of the four
/// involved vertices closer to 6 (4 on the boundary) and finally moves all
/// interior vertices tangentially towards the centroid of their neighbors.
/// Stops early when a round does not change the connectivity.
///
/// Refused (without changing the mesh) if the mesh contains non-triangular
/// faces or if the target length is not positive and finite.
///
/// # References
///
/// Botsch, Mario, and Leif Kobbelt. A remeshing approach to multiresolution
/// modeling. SGP 2004.
pub fn resample(mesh: &mut HalfEdgeMesh, config: &ResampleConfig) -> Result<(), ResampleError> {
    require_triangles(mesh, "resample")?;

    let target = match config.target_length.or_else(|| mean_edge_length(mesh)) {
        Some(l) => l,
        None => return Ok(()),
    };
    if !(target.is_finite() && target > 0.0) {
        log::warn!("resample refused: invalid target edge length {}", target);
        return Err(ResampleError::InvalidTargetLength { length: target });
    }
    let high = target * 4.0 / 3.0;
    let low = target * 4.0 / 5.0;

    for round in 0..config.iterations {
        let splits = split_long_edges(mesh, high);
        let collapses = collapse_short_edges(mesh, low, high);
        let flips = equalize_valences(mesh);
        relax(mesh, config.smoothing_weight);

        log::debug!(
            "resample round {}: {} splits, {} collapses, {} flips",
            round,
            splits,
            collapses,
            flips,
        );
        if splits + collapses + flips == 0 {
            break;
        }
    }

    log::info!(
        "resample: {} vertices, {} faces (target edge length {})",
        mesh.num_vertices(),
        mesh.num_faces(),
        target,
    );
    Ok(())
}

fn mean_edge_length(mesh: &HalfEdgeMesh) -> Option<f64> {
    let n = mesh.num_edges();
    if n == 0 {
        return None;
    }

    let sum: f64 = mesh.edge_handles().map(|e| mesh.edge_length(e)).sum();
    Some(sum / n as f64)
}

/// Splits every edge longer than `high` once. Halves that are still too
/// long are split in the next round.
fn split_long_edges(mesh: &mut HalfEdgeMesh, high: f64) -> usize {
    let long = mesh.edge_handles()
        .filter(|&e| mesh.edge_length(e) > high)
        .collect::<Vec<_>>();

    long.into_iter().filter(|&e| mesh.split_edge(e).is_ok()).count()
}

/// Collapses interior edges shorter than `low` if the merged vertex has no
/// edge longer than `high`.
fn collapse_short_edges(mesh: &mut HalfEdgeMesh, low: f64, high: f64) -> usize {
    let mut collapses = 0;
    let edges = mesh.edge_handles().collect::<Vec<_>>();
    for e in edges {
        if !mesh.contains_edge(e) || mesh.edge_length(e) >= low {
            continue;
        }

        let [a, b] = mesh.endpoints(e);
        if mesh.is_boundary_vertex(a) || mesh.is_boundary_vertex(b) {
            continue;
        }

        let midpoint = mesh.edge_midpoint(e);
        let too_long = mesh.vertex_neighbors(a)
            .chain(mesh.vertex_neighbors(b))
            .any(|n| mesh.position(n).distance(midpoint) > high);
        if too_long {
            continue;
        }

        if mesh.collapse_edge(e).is_ok() {
            collapses += 1;
        }
    }

    collapses
}

fn target_valence(mesh: &HalfEdgeMesh, v: VertexHandle) -> i64 {
    if mesh.is_boundary_vertex(v) { 4 } else { 6 }
}

/// Flips interior edges if that reduces the total deviation of the four
/// involved vertices from their target valence.
fn equalize_valences(mesh: &mut HalfEdgeMesh) -> usize {
    let mut flips = 0;
    let edges = mesh.edge_handles().collect::<Vec<_>>();
    for e in edges {
        if mesh.is_boundary_edge(e) {
            continue;
        }

        let h = e.half();
        let a = mesh.vertex(h);
        let b = mesh.target(h);
        let c = mesh.target(mesh.next(h));
        let d = mesh.target(mesh.next(h.twin()));

        let deviation = |changes: [i64; 4]| -> i64 {
            [a, b, c, d].iter()
                .zip(&changes)
                .map(|(&v, &change)| {
                    let valence = mesh.valence(v) as i64 + change;
                    (valence - target_valence(mesh, v)).abs()
                })
                .sum()
        };

        let before = deviation([0, 0, 0, 0]);
        let after = deviation([-1, -1, 1, 1]);
        if after < before && mesh.flip_edge(e).is_ok() {
            flips += 1;
        }
    }

    flips
}

/// Moves every interior vertex by `weight` towards the centroid of its
/// neighbors, projected into the vertex's tangent plane.
fn relax(mesh: &mut HalfEdgeMesh, weight: f64) {
    let moves = mesh.vertex_handles()
        .filter(|&v| !mesh.is_boundary_vertex(v))
        .filter_map(|v| {
            let p = mesh.position(v);
            let centroid = mesh.vertex_neighbors(v).map(|n| mesh.position(n)).centroid()?;
            let normal = mesh.vertex_normal(v);
            let delta = centroid - p;
            let tangential = delta - normal * normal.dot(delta);
            Some((v, p + tangential * weight))
        })
        .collect::<Vec<(VertexHandle, Pos3)>>();

    for (v, p) in moves {
        mesh.set_position(v, p);
    }
}
