//! Algorithms changing the resolution of a whole mesh, built on top of the
//! local edit operations.
//!
//! - [`upsample`]: Loop subdivision, every triangle becomes four.
//! - [`downsample`]: quadric error decimation by edge collapses.
//! - [`resample`]: isotropic remeshing towards a target edge length.
//!
//! [`MeshResampler`] bundles the configuration of all three.

use crate::{
    core::HalfEdgeMesh,
    error::ResampleError,
};

pub mod decimation;
pub mod remesh;
pub mod subdivision;

pub use self::{
    decimation::{downsample, DownsampleConfig},
    remesh::{resample, ResampleConfig},
    subdivision::upsample,
};


/// Configuration of all resampling operations. The entry points simply
/// forward to the free functions of this module.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MeshResampler {
    pub downsample: DownsampleConfig,
    pub resample: ResampleConfig,
}

impl MeshResampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_downsample(self, downsample: DownsampleConfig) -> Self {
        Self { downsample, ..self }
    }

    pub fn with_resample(self, resample: ResampleConfig) -> Self {
        Self { resample, ..self }
    }

    pub fn upsample(&self, mesh: &mut HalfEdgeMesh) -> Result<(), ResampleError> {
        upsample(mesh)
    }

    /// Returns the number of collapsed edges.
    pub fn downsample(&self, mesh: &mut HalfEdgeMesh) -> usize {
        downsample(mesh, &self.downsample)
    }

    pub fn resample(&self, mesh: &mut HalfEdgeMesh) -> Result<(), ResampleError> {
        resample(mesh, &self.resample)
    }
}

/// Refuses meshes with non-triangular faces.
fn require_triangles(mesh: &HalfEdgeMesh, what: &str) -> Result<(), ResampleError> {
    let offender = mesh.face_handles()
        .map(|f| (f, mesh.face_degree(f)))
        .find(|&(_, degree)| degree != 3);

    match offender {
        None => Ok(()),
        Some((face, degree)) => {
            log::warn!(
                "{} requires a triangle mesh, but {:?} has {} sides; nothing was changed",
                what,
                face,
                degree,
            );
            Err(ResampleError::NonTriangular { face, degree })
        }
    }
}
