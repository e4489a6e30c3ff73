//! Circulators around faces and vertices.

use std::iter::FusedIterator;

use crate::handle::HalfEdgeHandle;
use super::HalfEdgeMesh;


/// Iterates over the half edges of one face by following `next`.
#[derive(Debug, Clone)]
pub enum FaceCirculator<'a> {
    Empty,
    NonEmpty {
        mesh: &'a HalfEdgeMesh,
        current_he: HalfEdgeHandle,
        start_he: HalfEdgeHandle,
    },
}

impl<'a> FaceCirculator<'a> {
    pub(crate) fn new(mesh: &'a HalfEdgeMesh, start_he: HalfEdgeHandle) -> Self {
        FaceCirculator::NonEmpty {
            mesh,
            current_he: start_he,
            start_he,
        }
    }
}

impl Iterator for FaceCirculator<'_> {
    type Item = HalfEdgeHandle;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        match *self {
            FaceCirculator::Empty => None,
            FaceCirculator::NonEmpty { mesh, ref mut current_he, start_he } => {
                let out = *current_he;

                // Advance iterator
                let next = mesh.he(out).next;
                if next == start_he {
                    *self = FaceCirculator::Empty;
                } else {
                    *current_he = next;
                }

                Some(out)
            }
        }
    }
}

impl FusedIterator for FaceCirculator<'_> {}


/// Iterates over the half edges leaving one vertex by following
/// `twin.next`, which walks around the vertex in clockwise order.
#[derive(Debug, Clone)]
pub enum VertexCirculator<'a> {
    Empty,
    NonEmpty {
        mesh: &'a HalfEdgeMesh,
        current_he: HalfEdgeHandle,
        start_he: HalfEdgeHandle,
    },
}

impl<'a> VertexCirculator<'a> {
    pub(crate) fn new(mesh: &'a HalfEdgeMesh, start_he: HalfEdgeHandle) -> Self {
        VertexCirculator::NonEmpty {
            mesh,
            current_he: start_he,
            start_he,
        }
    }
}

impl Iterator for VertexCirculator<'_> {
    type Item = HalfEdgeHandle;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        match *self {
            VertexCirculator::Empty => None,
            VertexCirculator::NonEmpty { mesh, ref mut current_he, start_he } => {
                let out = *current_he;

                let next = mesh.he(out.twin()).next;
                if next == start_he {
                    *self = VertexCirculator::Empty;
                } else {
                    *current_he = next;
                }

                Some(out)
            }
        }
    }
}

impl FusedIterator for VertexCirculator<'_> {}
