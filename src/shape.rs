//! Procedurally generated polygon soups: simple solids, a disc and a grid.
//!
//! All shapes have their polygons oriented counter clock wise when looking
//! at them from the outside (or from +z for the flat shapes).

use std::f64::consts::PI;

use cgmath::{prelude::*, Vector3};

use crate::{
    core::PolygonSoup,
    math::Pos3,
};


/// A regular tetrahedron inscribed in the cube `[-1, 1]³`.
pub fn tetrahedron() -> PolygonSoup {
    PolygonSoup {
        positions: vec![
            Pos3::new(1.0, 1.0, 1.0),
            Pos3::new(1.0, -1.0, -1.0),
            Pos3::new(-1.0, 1.0, -1.0),
            Pos3::new(-1.0, -1.0, 1.0),
        ],
        polygons: vec![],
    }.with_polygons(&[&[0, 1, 2], &[0, 3, 1], &[0, 2, 3], &[1, 3, 2]])
}

/// The unit cube `[0, 1]³` made of six quads. The index of a vertex is
/// `x + 2y + 4z`.
pub fn cube() -> PolygonSoup {
    let positions = (0..8)
        .map(|i| Pos3::new((i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64))
        .collect();

    PolygonSoup { positions, polygons: vec![] }.with_polygons(&[
        &[0, 2, 3, 1], // bottom
        &[4, 5, 7, 6], // top
        &[0, 1, 5, 4], // front
        &[2, 6, 7, 3], // back
        &[0, 4, 6, 2], // left
        &[1, 3, 7, 5], // right
    ])
}

/// A regular octahedron with its vertices on the coordinate axes.
pub fn octahedron() -> PolygonSoup {
    PolygonSoup {
        positions: vec![
            Pos3::new(1.0, 0.0, 0.0),
            Pos3::new(-1.0, 0.0, 0.0),
            Pos3::new(0.0, 1.0, 0.0),
            Pos3::new(0.0, -1.0, 0.0),
            Pos3::new(0.0, 0.0, 1.0),
            Pos3::new(0.0, 0.0, -1.0),
        ],
        polygons: vec![],
    }.with_polygons(&[
        &[0, 2, 4], &[2, 1, 4], &[1, 3, 4], &[3, 0, 4],
        &[2, 0, 5], &[1, 2, 5], &[3, 1, 5], &[0, 3, 5],
    ])
}

/// A regular icosahedron (12 vertices of valence 5, 20 triangles).
pub fn icosahedron() -> PolygonSoup {
    let p = (1.0 + 5f64.sqrt()) / 2.0;
    PolygonSoup {
        positions: vec![
            Pos3::new(-1.0, p, 0.0),
            Pos3::new(1.0, p, 0.0),
            Pos3::new(-1.0, -p, 0.0),
            Pos3::new(1.0, -p, 0.0),
            Pos3::new(0.0, -1.0, p),
            Pos3::new(0.0, 1.0, p),
            Pos3::new(0.0, -1.0, -p),
            Pos3::new(0.0, 1.0, -p),
            Pos3::new(p, 0.0, -1.0),
            Pos3::new(p, 0.0, 1.0),
            Pos3::new(-p, 0.0, -1.0),
            Pos3::new(-p, 0.0, 1.0),
        ],
        polygons: vec![],
    }.with_polygons(&[
        &[0, 11, 5], &[0, 5, 1], &[0, 1, 7], &[0, 7, 10], &[0, 10, 11],
        &[1, 5, 9], &[5, 11, 4], &[11, 10, 2], &[10, 7, 6], &[7, 1, 8],
        &[3, 9, 4], &[3, 4, 2], &[3, 2, 6], &[3, 6, 8], &[3, 8, 9],
        &[4, 9, 5], &[2, 4, 11], &[6, 2, 10], &[8, 6, 7], &[9, 8, 1],
    ])
}

impl PolygonSoup {
    fn with_polygons(mut self, polygons: &[&[usize]]) -> Self {
        for p in polygons {
            self.add_polygon(p.to_vec());
        }
        self
    }
}


/// A flat round disc that lies in the XY-plane and which normals point upwards
/// (+z). It consists of a center vertex and a fan of triangles around it.
#[derive(Debug, Clone)]
pub struct Disc {
    /// The number of faces generated for the disc. Has to be at least 3 or
    /// else creating the soup will panic. *Default*: 16.
    pub faces: u32,

    /// The center point of the disc. *Default*: `[0, 0, 0]`.
    pub center: Pos3,

    /// The outer radius (with ∞ faces, this would be the real radius).
    /// *Default*: 1.0.
    pub radius: f64,
}

impl Default for Disc {
    fn default() -> Self {
        Self {
            faces: 16,
            center: Pos3::origin(),
            radius: 1.0,
        }
    }
}

impl Disc {
    pub fn to_soup(&self) -> PolygonSoup {
        assert!(
            self.faces >= 3,
            "trying to build a disc with {} faces (minimum is 3)",
            self.faces,
        );

        // Vertex 0 is the center, the outer ones follow counter clock wise,
        // the first one at [r, 0, 0]. Face `i` is `[center, i + 1, i + 2]`.
        let mut soup = PolygonSoup::new();
        let center = soup.add_position(self.center);
        for i in 0..self.faces {
            let angle = (i as f64 / self.faces as f64) * 2.0 * PI;
            soup.add_position(self.center + Vector3::new(
                self.radius * angle.cos(),
                self.radius * angle.sin(),
                0.0,
            ));
        }

        let n = self.faces as usize;
        for i in 0..n {
            soup.add_polygon(vec![center, 1 + i, 1 + (i + 1) % n]);
        }

        soup
    }
}


/// A flat rectangular grid of quads (or triangles) in the XY-plane, starting
/// at the origin, with normals pointing upwards (+z).
#[derive(Debug, Clone)]
pub struct Grid {
    /// Number of cells along x. *Default*: 4.
    pub cols: u32,

    /// Number of cells along y. *Default*: 4.
    pub rows: u32,

    /// Side length of one cell. *Default*: 1.0.
    pub cell_size: f64,

    /// Split each cell into two triangles. *Default*: `false`.
    pub triangulated: bool,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            cols: 4,
            rows: 4,
            cell_size: 1.0,
            triangulated: false,
        }
    }
}

impl Grid {
    pub fn to_soup(&self) -> PolygonSoup {
        assert!(self.cols >= 1 && self.rows >= 1, "trying to build an empty grid");

        let (cols, rows) = (self.cols as usize, self.rows as usize);
        let idx = |x: usize, y: usize| y * (cols + 1) + x;

        let mut soup = PolygonSoup::new();
        for y in 0..=rows {
            for x in 0..=cols {
                soup.add_position(Pos3::new(
                    x as f64 * self.cell_size,
                    y as f64 * self.cell_size,
                    0.0,
                ));
            }
        }

        for y in 0..rows {
            for x in 0..cols {
                let (a, b, c, d) = (idx(x, y), idx(x + 1, y), idx(x + 1, y + 1), idx(x, y + 1));
                if self.triangulated {
                    soup.add_polygon(vec![a, b, c]);
                    soup.add_polygon(vec![a, c, d]);
                } else {
                    soup.add_polygon(vec![a, b, c, d]);
                }
            }
        }

        soup
    }
}
