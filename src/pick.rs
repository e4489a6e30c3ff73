//! Resolving pick ids back to mesh elements.
//!
//! A renderer that supports picking draws every element in a unique color
//! and later reads back the color under the cursor. [`PickMap`] assigns the
//! ids during a traversal of the mesh and maps them back to elements. How
//! ids are encoded as colors is up to the renderer.

use std::convert::TryFrom;

use boolinator::Boolinator;

use crate::{
    core::HalfEdgeMesh,
    handle::Element,
};


/// Maps pick ids to the elements of one mesh.
///
/// The map is only valid for the exact state of the mesh it was built from:
/// after any structural edit, [`resolve`][PickMap::resolve] returns `None`
/// for all ids and the map has to be rebuilt.
#[derive(Debug, Clone)]
pub struct PickMap {
    first_id: u32,
    end_id: u32,
    elements: Vec<Element>,
    revision: u64,
}

impl PickMap {
    /// Traverses all real faces of `mesh` and assigns consecutive ids,
    /// starting at `first_id`. For each half edge `h` of a face (and
    /// `h2 = next(h)`), the ids are assigned in this order: the vertex of
    /// `h2`, the face, the edge of `h2` and `h2` itself. Thus, every face,
    /// vertex and edge gets multiple ids.
    ///
    /// To give several meshes disjoint ids, start the next map at the
    /// [`end_id`][PickMap::end_id] of this one.
    ///
    /// All ids including the end id have to fit into `u32`: returns `None`
    /// if `first_id` plus four times the number of half edges of real faces
    /// exceeds `u32::MAX`.
    pub fn build(mesh: &HalfEdgeMesh, first_id: u32) -> Option<Self> {
        let mut elements = Vec::with_capacity(4 * mesh.num_half_edges() as usize);
        for f in mesh.face_handles() {
            for h in mesh.face_half_edges(f) {
                let h2 = mesh.next(h);
                elements.push(Element::Vertex(mesh.vertex(h2)));
                elements.push(Element::Face(f));
                elements.push(Element::Edge(h2.edge()));
                elements.push(Element::HalfEdge(h2));
            }
        }

        let end_id = u32::try_from(elements.len()).ok()
            .and_then(|len| first_id.checked_add(len));
        let end_id = match end_id {
            Some(end_id) => end_id,
            None => {
                log::warn!(
                    "{} pick ids starting at {} do not fit into u32",
                    elements.len(),
                    first_id,
                );
                return None;
            }
        };

        log::trace!("assigned {} pick ids starting at {}", elements.len(), first_id);
        Some(Self {
            first_id,
            end_id,
            elements,
            revision: mesh.revision(),
        })
    }

    pub fn first_id(&self) -> u32 {
        self.first_id
    }

    /// One past the last id of this map.
    pub fn end_id(&self) -> u32 {
        self.end_id
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Iterates over all `(id, element)` pairs in the order of the
    /// traversal, e.g. to draw each element with its id.
    pub fn iter(&self) -> impl Iterator<Item = (u32, Element)> + '_ {
        (self.first_id..self.end_id).zip(self.elements.iter().cloned())
    }

    /// Whether this map still describes `mesh`.
    pub fn is_current(&self, mesh: &HalfEdgeMesh) -> bool {
        self.revision == mesh.revision()
    }

    /// Returns the element with the given id or `None` if there is no such
    /// id or the mesh was changed since this map was built.
    pub fn resolve(&self, mesh: &HalfEdgeMesh, id: u32) -> Option<Element> {
        self.is_current(mesh).as_option()?;
        let idx = id.checked_sub(self.first_id)?;
        let el = *self.elements.get(idx as usize)?;

        mesh.contains(el).as_some(el)
    }
}
