//! Throughput of the local edits and the resampler on sphere-like meshes.

use criterion::{
    criterion_group, criterion_main, black_box, BatchSize, Criterion,
};

use meshedit::{
    algo::{self, DownsampleConfig, ResampleConfig},
    shape, HalfEdgeMesh,
};


/// Icosahedron subdivided `levels` times: `20 * 4^levels` faces.
fn sphere(levels: u32) -> HalfEdgeMesh {
    let mut mesh = shape::icosahedron().build().unwrap();
    for _ in 0..levels {
        algo::upsample(&mut mesh).unwrap();
    }
    mesh
}



// ===============================================================================================
// ===== Benchmarks
// ===============================================================================================

/// Walk the one-ring of every vertex.
fn count_vertex_neighbors(c: &mut Criterion) {
    c.bench_function(
        "count_vertex_neighbors",
        |b| {
            let mesh = sphere(4);

            b.iter(|| {
                let mesh = black_box(&mesh);

                for v in mesh.vertex_handles() {
                    black_box(mesh.vertex_neighbors(v).count());
                }
            })
        },
    );
}

fn split_all_edges(c: &mut Criterion) {
    c.bench_function(
        "split_all_edges",
        |b| {
            let mesh = sphere(3);

            b.iter_batched(
                || mesh.clone(),
                |mut mesh| {
                    let edges = mesh.edge_handles().collect::<Vec<_>>();
                    for e in edges {
                        black_box(mesh.split_edge(e).unwrap());
                    }
                    mesh
                },
                BatchSize::LargeInput,
            )
        },
    );
}

fn flip_all_edges(c: &mut Criterion) {
    c.bench_function(
        "flip_all_edges",
        |b| {
            let mesh = sphere(3);

            b.iter_batched(
                || mesh.clone(),
                |mut mesh| {
                    let edges = mesh.edge_handles().collect::<Vec<_>>();
                    for e in edges {
                        let _ = black_box(mesh.flip_edge(e));
                    }
                    mesh
                },
                BatchSize::LargeInput,
            )
        },
    );
}

fn upsample(c: &mut Criterion) {
    c.bench_function(
        "upsample",
        |b| {
            let mesh = sphere(3);

            b.iter_batched(
                || mesh.clone(),
                |mut mesh| {
                    algo::upsample(&mut mesh).unwrap();
                    mesh
                },
                BatchSize::LargeInput,
            )
        },
    );
}

fn downsample(c: &mut Criterion) {
    c.bench_function(
        "downsample",
        |b| {
            let mesh = sphere(3);
            let config = DownsampleConfig::default();

            b.iter_batched(
                || mesh.clone(),
                |mut mesh| {
                    black_box(algo::downsample(&mut mesh, &config));
                    mesh
                },
                BatchSize::LargeInput,
            )
        },
    );
}

fn resample(c: &mut Criterion) {
    c.bench_function(
        "resample",
        |b| {
            let mesh = sphere(2);
            let config = ResampleConfig::default().with_iterations(3);

            b.iter_batched(
                || mesh.clone(),
                |mut mesh| {
                    algo::resample(&mut mesh, &config).unwrap();
                    mesh
                },
                BatchSize::LargeInput,
            )
        },
    );
}


criterion_group!(benches,
    count_vertex_neighbors,
    split_all_edges,
    flip_all_edges,
    upsample,
    downsample,
    resample,
);
criterion_main!(benches);
