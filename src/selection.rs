//! Commands applied to the currently selected element.
//!
//! An interactive editor keeps one selected element and applies commands to
//! it. [`Selection`] dispatches each command on the kind of the element and
//! moves the selection to the element returned by the operation, so that
//! the selection never refers to a removed element. If the operation is
//! refused, the selection stays where it is.
//!
//! Half edges are treated like their edge by all commands.

use crate::{
    algo::MeshResampler,
    core::{Bevel, BevelParams, HalfEdgeMesh},
    error::{EditError, ResampleError},
    handle::{EdgeHandle, Element, FaceHandle, VertexHandle},
    pick::PickMap,
};


/// The selected element (if any) and the pending bevel (if any).
#[derive(Debug, Clone, Default)]
pub struct Selection {
    element: Option<Element>,
    bevel: Option<Bevel>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(&self) -> Option<Element> {
        self.element
    }

    /// The bevel created by the last [`bevel`][Selection::bevel] command,
    /// whose vertices can still be moved via
    /// [`adjust_bevel`][Selection::adjust_bevel].
    pub fn pending_bevel(&self) -> Option<&Bevel> {
        self.bevel.as_ref()
    }

    pub fn select(&mut self, element: Element) {
        self.element = Some(element);
    }

    pub fn clear(&mut self) {
        self.element = None;
        self.bevel = None;
    }

    /// Selects the element with the given pick id. Returns `false` and keeps
    /// the current selection if the id can't be resolved.
    pub fn select_picked(&mut self, map: &PickMap, mesh: &HalfEdgeMesh, id: u32) -> bool {
        match map.resolve(mesh, id) {
            Some(el) => {
                self.select(el);
                true
            }
            None => false,
        }
    }

    fn selected_edge(&self) -> Option<EdgeHandle> {
        match self.element? {
            Element::Edge(e) => Some(e),
            Element::HalfEdge(h) => Some(h.edge()),
            _ => None,
        }
    }

    /// Runs `op` and, if it succeeds, selects the element it returned.
    /// Returns `Ok(None)` if there is nothing to apply the command to.
    fn run(
        &mut self,
        mesh: &mut HalfEdgeMesh,
        op: Option<Op>,
    ) -> Result<Option<Element>, EditError> {
        let op = match op {
            Some(op) => op,
            None => return Ok(None),
        };

        let el = op.run(mesh)?;
        self.element = Some(el);
        Ok(Some(el))
    }

    /// Collapses the selected edge or face; selects the resulting vertex.
    pub fn collapse(&mut self, mesh: &mut HalfEdgeMesh) -> Result<Option<Element>, EditError> {
        let op = match (self.element, self.selected_edge()) {
            (_, Some(e)) => Some(Op::CollapseEdge(e)),
            (Some(Element::Face(f)), _) => Some(Op::CollapseFace(f)),
            _ => None,
        };
        self.run(mesh, op)
    }

    /// Flips the selected edge; the edge stays selected.
    pub fn flip(&mut self, mesh: &mut HalfEdgeMesh) -> Result<Option<Element>, EditError> {
        let op = self.selected_edge().map(Op::Flip);
        self.run(mesh, op)
    }

    /// Splits the selected edge; selects the new vertex.
    pub fn split(&mut self, mesh: &mut HalfEdgeMesh) -> Result<Option<Element>, EditError> {
        let op = self.selected_edge().map(Op::Split);
        self.run(mesh, op)
    }

    /// Erases the selected edge or vertex; selects the merged face.
    pub fn erase(&mut self, mesh: &mut HalfEdgeMesh) -> Result<Option<Element>, EditError> {
        let op = match (self.element, self.selected_edge()) {
            (_, Some(e)) => Some(Op::EraseEdge(e)),
            (Some(Element::Vertex(v)), _) => Some(Op::EraseVertex(v)),
            _ => None,
        };
        self.run(mesh, op)
    }

    /// Bevels the selected element and keeps the bevel pending for
    /// [`adjust_bevel`][Selection::adjust_bevel].
    ///
    /// Afterwards, the new face is selected after a face bevel, an edge of
    /// the new face after an edge bevel and a vertex of the new face after a
    /// vertex bevel.
    pub fn bevel(&mut self, mesh: &mut HalfEdgeMesh) -> Result<Option<Element>, EditError> {
        let element = match self.element {
            Some(el) => el,
            None => return Ok(None),
        };

        let bevel = mesh.begin_bevel(element)?;
        let h = mesh.face_half_edge(bevel.face());
        let selected = match element {
            Element::Face(_) => Element::Face(bevel.face()),
            Element::Edge(_) | Element::HalfEdge(_) => Element::Edge(h.edge()),
            Element::Vertex(_) => Element::Vertex(mesh.vertex(h)),
        };

        self.element = Some(selected);
        self.bevel = Some(bevel);
        Ok(Some(selected))
    }

    /// Moves the vertices of the pending bevel. Returns `Ok(false)` if there
    /// is no pending bevel.
    pub fn adjust_bevel(
        &mut self,
        mesh: &mut HalfEdgeMesh,
        params: BevelParams,
    ) -> Result<bool, EditError> {
        match &self.bevel {
            Some(bevel) => mesh.apply_bevel_offsets(bevel, params).map(|_| true),
            None => Ok(false),
        }
    }

    /// Triangulates the mesh. Vertices, edges and faces keep their handles,
    /// so the selection stays.
    pub fn triangulate(&mut self, mesh: &mut HalfEdgeMesh) {
        mesh.triangulate();
    }

    /// Upsamples the mesh and clears the selection. If the mesh is refused,
    /// the selection stays.
    pub fn upsample(
        &mut self,
        mesh: &mut HalfEdgeMesh,
        resampler: &MeshResampler,
    ) -> Result<(), ResampleError> {
        resampler.upsample(mesh)?;
        self.clear();
        Ok(())
    }

    /// Downsamples the mesh and clears the selection.
    pub fn downsample(&mut self, mesh: &mut HalfEdgeMesh, resampler: &MeshResampler) {
        resampler.downsample(mesh);
        self.clear();
    }

    /// Resamples the mesh and clears the selection. If the mesh is refused,
    /// the selection stays.
    pub fn resample(
        &mut self,
        mesh: &mut HalfEdgeMesh,
        resampler: &MeshResampler,
    ) -> Result<(), ResampleError> {
        resampler.resample(mesh)?;
        self.clear();
        Ok(())
    }
}

/// A single element command, resolved from the selection.
#[derive(Debug, Clone, Copy)]
enum Op {
    CollapseEdge(EdgeHandle),
    CollapseFace(FaceHandle),
    Flip(EdgeHandle),
    Split(EdgeHandle),
    EraseEdge(EdgeHandle),
    EraseVertex(VertexHandle),
}

impl Op {
    fn run(self, mesh: &mut HalfEdgeMesh) -> Result<Element, EditError> {
        match self {
            Op::CollapseEdge(e) => mesh.collapse_edge(e).map(Element::Vertex),
            Op::CollapseFace(f) => mesh.collapse_face(f).map(Element::Vertex),
            Op::Flip(e) => mesh.flip_edge(e).map(Element::Edge),
            Op::Split(e) => mesh.split_edge(e).map(Element::Vertex),
            Op::EraseEdge(e) => mesh.erase_edge(e).map(Element::Face),
            Op::EraseVertex(v) => mesh.erase_vertex(v).map(Element::Face),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape;

    fn icosahedron() -> HalfEdgeMesh {
        shape::icosahedron().build().unwrap()
    }

    fn any_edge(mesh: &HalfEdgeMesh) -> EdgeHandle {
        mesh.edge_handles().next().unwrap()
    }

    #[test]
    fn nothing_to_apply() {
        let mut mesh = icosahedron();
        let rev = mesh.revision();
        let mut sel = Selection::new();

        assert_eq!(sel.collapse(&mut mesh), Ok(None));
        assert_eq!(sel.bevel(&mut mesh), Ok(None));

        // Flips and splits need an edge.
        let f = mesh.face_handles().next().unwrap();
        sel.select(Element::Face(f));
        assert_eq!(sel.flip(&mut mesh), Ok(None));
        assert_eq!(sel.split(&mut mesh), Ok(None));
        assert_eq!(sel.erase(&mut mesh), Ok(None));

        assert_eq!(mesh.revision(), rev);
        assert_eq!(sel.element(), Some(Element::Face(f)));
    }

    #[test]
    fn split_selects_new_vertex() {
        let mut mesh = icosahedron();
        let e = any_edge(&mesh);
        let mut sel = Selection::new();
        sel.select(Element::Edge(e));

        let v = match sel.split(&mut mesh).unwrap() {
            Some(Element::Vertex(v)) => v,
            other => panic!("unexpected selection {:?}", other),
        };
        assert_eq!(sel.element(), Some(Element::Vertex(v)));
        assert_eq!(mesh.num_vertices(), 13);
        assert!(mesh.contains_vertex(v));
        mesh.check_integrity();
    }

    #[test]
    fn flip_keeps_edge_and_half_edge_means_edge() {
        let mut mesh = icosahedron();
        let e = any_edge(&mesh);
        let mut sel = Selection::new();
        sel.select(Element::HalfEdge(e.half().twin()));

        assert_eq!(sel.flip(&mut mesh), Ok(Some(Element::Edge(e))));
        assert_eq!(sel.element(), Some(Element::Edge(e)));
        mesh.check_integrity();
    }

    #[test]
    fn collapse_selects_vertex() {
        let mut mesh = icosahedron();
        let mut sel = Selection::new();
        sel.select(Element::Edge(any_edge(&mesh)));

        let res = sel.collapse(&mut mesh).unwrap();
        assert!(matches!(res, Some(Element::Vertex(_))));
        assert_eq!(mesh.num_vertices(), 11);
        assert!(mesh.contains(sel.element().unwrap()));
        mesh.check_integrity();
    }

    #[test]
    fn erase_edge_then_vertex() {
        let mut mesh = icosahedron();
        let mut sel = Selection::new();
        sel.select(Element::Edge(any_edge(&mesh)));

        let f = match sel.erase(&mut mesh).unwrap() {
            Some(Element::Face(f)) => f,
            other => panic!("unexpected selection {:?}", other),
        };
        assert_eq!(mesh.face_degree(f), 4);
        assert_eq!(mesh.num_faces(), 19);

        let v = mesh.vertex_handles()
            .find(|&v| !mesh.face_vertices(f).any(|u| u == v))
            .unwrap();
        sel.select(Element::Vertex(v));
        let res = sel.erase(&mut mesh).unwrap();
        assert!(matches!(res, Some(Element::Face(_))));
        assert!(!mesh.contains_vertex(v));
        mesh.check_integrity();
    }

    #[test]
    fn refused_command_keeps_selection() {
        let mut mesh = shape::Grid::default().to_soup().build().unwrap();
        let e = mesh.edge_handles().find(|&e| mesh.is_boundary_edge(e)).unwrap();
        let rev = mesh.revision();
        let mut sel = Selection::new();
        sel.select(Element::Edge(e));

        assert_eq!(sel.flip(&mut mesh), Err(EditError::Boundary(Element::Edge(e))));
        assert_eq!(sel.element(), Some(Element::Edge(e)));
        assert_eq!(mesh.revision(), rev);
    }

    #[test]
    fn bevel_face_and_adjust() {
        let mut mesh = shape::cube().build().unwrap();
        let f = mesh.face_handles().next().unwrap();
        let mut sel = Selection::new();
        assert_eq!(sel.adjust_bevel(&mut mesh, BevelParams::new()), Ok(false));

        sel.select(Element::Face(f));
        let new = match sel.bevel(&mut mesh).unwrap() {
            Some(Element::Face(new)) => new,
            other => panic!("unexpected selection {:?}", other),
        };
        assert_eq!(sel.pending_bevel().map(|b| b.face()), Some(new));
        assert_eq!(mesh.face_degree(new), 4);

        let params = BevelParams::new().with_inset(0.5).with_shift(0.25);
        assert_eq!(sel.adjust_bevel(&mut mesh, params), Ok(true));
        assert_eq!(sel.adjust_bevel(&mut mesh, BevelParams::new()), Ok(true));

        // A structural edit makes the pending bevel stale.
        mesh.triangulate();
        assert_eq!(
            sel.adjust_bevel(&mut mesh, params),
            Err(EditError::Stale(Element::Face(new))),
        );
    }

    #[test]
    fn bevel_vertex_and_edge_select_parts_of_new_face() {
        let mut mesh = shape::cube().build().unwrap();
        let mut sel = Selection::new();

        let v = mesh.vertex_handles().next().unwrap();
        sel.select(Element::Vertex(v));
        let res = sel.bevel(&mut mesh).unwrap();
        let face = sel.pending_bevel().unwrap().face();
        match res {
            Some(Element::Vertex(w)) => assert!(mesh.face_vertices(face).any(|u| u == w)),
            other => panic!("unexpected selection {:?}", other),
        }

        let e = mesh.edge_handles()
            .find(|&e| mesh.endpoints(e).iter().all(|&u| mesh.valence(u) == 3))
            .unwrap();
        sel.select(Element::Edge(e));
        let res = sel.bevel(&mut mesh).unwrap();
        let face = sel.pending_bevel().unwrap().face();
        match res {
            Some(Element::Edge(e)) => {
                assert!(mesh.face_half_edges(face).any(|h| h.edge() == e));
            }
            other => panic!("unexpected selection {:?}", other),
        }
        mesh.check_integrity();
    }

    #[test]
    fn batch_commands() {
        let mut mesh = shape::cube().build().unwrap();
        let resampler = MeshResampler::new();
        let f = mesh.face_handles().next().unwrap();
        let mut sel = Selection::new();
        sel.select(Element::Face(f));

        // Quads are refused, the selection stays.
        assert!(matches!(
            sel.upsample(&mut mesh, &resampler),
            Err(ResampleError::NonTriangular { .. }),
        ));
        assert_eq!(sel.element(), Some(Element::Face(f)));

        sel.triangulate(&mut mesh);
        assert_eq!(sel.element(), Some(Element::Face(f)));
        assert!(mesh.contains_face(f));

        sel.upsample(&mut mesh, &resampler).unwrap();
        assert_eq!(sel.element(), None);

        sel.select(Element::Face(mesh.face_handles().next().unwrap()));
        sel.downsample(&mut mesh, &resampler);
        assert_eq!(sel.element(), None);

        sel.select(Element::Face(mesh.face_handles().next().unwrap()));
        sel.resample(&mut mesh, &resampler).unwrap();
        assert_eq!(sel.element(), None);
        mesh.check_integrity();
    }

    #[test]
    fn select_by_pick_id() {
        let mesh = shape::tetrahedron().build().unwrap();
        let map = PickMap::build(&mesh, 1).unwrap();
        let mut sel = Selection::new();

        assert!(sel.select_picked(&map, &mesh, 2));
        let f = mesh.face_handles().next().unwrap();
        assert_eq!(sel.element(), Some(Element::Face(f)));

        assert!(!sel.select_picked(&map, &mesh, 0));
        assert_eq!(sel.element(), Some(Element::Face(f)));
    }
}
