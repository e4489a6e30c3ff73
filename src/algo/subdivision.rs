use cgmath::prelude::*;

use crate::{
    core::HalfEdgeMesh,
    error::ResampleError,
    handle::{EdgeHandle, VertexHandle},
    map::{HandleMap, HandleSet},
    math::{Pos3, Vec3},
};
use super::require_triangles;


/// Loop subdivision: every triangle is split into four and all vertices are
/// moved to the weighted average of their neighborhood.
///
/// For a closed mesh with `V` vertices, `E` edges and `F` faces, the result
/// has `V + E` vertices and `4F` faces. Afterwards, the bind position of
/// every vertex equals its position.
///
/// Refused (without changing the mesh) if the mesh contains non-triangular
/// faces.
///
/// # References
///
/// Loop, Charles. Smooth subdivision surfaces based on triangles. Master's
/// thesis, University of Utah, 1987.
pub fn upsample(mesh: &mut HalfEdgeMesh) -> Result<(), ResampleError> {
    require_triangles(mesh, "upsample")?;
    let num_vertices = mesh.num_vertices();
    let num_faces = mesh.num_faces();

    mesh.transaction(|mesh| -> Result<(), ResampleError> {
        // ----- (1) Calculate new positions for old vertices ------------------------------------
        // We can't write them yet, as the edge points below are calculated
        // from the old positions.
        let old_positions = mesh.vertex_handles()
            .map(|v| (v, vertex_point(mesh, v)))
            .collect::<Vec<_>>();

        // ----- (2) Calculate positions of the future edge midpoints --------------------------
        let edge_points = mesh.edge_handles()
            .map(|e| (e, edge_point(mesh, e)))
            .collect::<Vec<_>>();

        // ----- (3) Split all old edges -------------------------------------------------------
        // The old vertices keep their handles, new ones are remembered to
        // decide which edges to flip.
        let mut new_vertices: HandleMap<VertexHandle, Pos3> = HandleMap::default();
        let mut across: HandleSet<EdgeHandle> = HandleSet::default();
        for (e, p) in edge_points {
            let res = mesh.split_edge_detailed(e)?;
            new_vertices.insert(res.vertex, p);
            across.extend(res.across);
        }

        // ----- (4) Flip new edges connecting an old and a new vertex --------------------------
        // Afterwards each old triangle is replaced by three corner triangles
        // and one triangle between the new vertices.
        let mut flips = 0;
        for e in across {
            let [a, b] = mesh.endpoints(e);
            if new_vertices.contains_key(&a) != new_vertices.contains_key(&b) {
                mesh.flip_edge(e)?;
                flips += 1;
            }
        }

        // ----- (5) Write all positions -------------------------------------------------------
        for (v, p) in old_positions.into_iter().chain(new_vertices) {
            mesh.set_position(v, p);
            mesh.set_bind_position(v, p);
        }

        log::info!(
            "upsample: {} -> {} vertices, {} -> {} faces ({} flips)",
            num_vertices,
            mesh.num_vertices(),
            num_faces,
            mesh.num_faces(),
            flips,
        );
        Ok(())
    })
}

/// The new position of the old vertex `v`.
fn vertex_point(mesh: &HalfEdgeMesh, v: VertexHandle) -> Pos3 {
    let p = mesh.position(v);

    if mesh.is_boundary_vertex(v) {
        // Only the two neighbors along the boundary are taken into account.
        let boundary_neighbors = mesh.vertex_out_half_edges(v)
            .filter(|&h| mesh.is_boundary_half_edge(h) || mesh.is_boundary_half_edge(h.twin()))
            .map(|h| mesh.position(mesh.target(h)).to_vec())
            .fold(Vec3::zero(), |acc, n| acc + n);

        return Pos3::from_vec(p.to_vec() * 0.75 + boundary_neighbors * 0.125);
    }

    let mut valence = 0;
    let sum = mesh.vertex_neighbors(v)
        .inspect(|_| valence += 1)
        .map(|n| mesh.position(n).to_vec())
        .fold(Vec3::zero(), |acc, n| acc + n);

    let n = valence as f64;
    let beta = 3.0 / (8.0 * n);
    Pos3::from_vec(p.to_vec() * (1.0 - n * beta) + sum * beta)
}

/// The position of the vertex that will be inserted on `e`.
fn edge_point(mesh: &HalfEdgeMesh, e: EdgeHandle) -> Pos3 {
    if mesh.is_boundary_edge(e) {
        return mesh.edge_midpoint(e);
    }

    let h = e.half();
    let a = mesh.position(mesh.vertex(h)).to_vec();
    let b = mesh.position(mesh.target(h)).to_vec();
    let c = mesh.position(mesh.target(mesh.next(h))).to_vec();
    let d = mesh.position(mesh.target(mesh.next(h.twin()))).to_vec();

    Pos3::from_vec((a + b) * 0.375 + (c + d) * 0.125)
}
