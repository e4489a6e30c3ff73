//! Geometric types and small helpers on top of `cgmath`.

use cgmath::{prelude::*, Point3, Vector3};


/// A position in 3D space.
pub type Pos3 = Point3<f64>;

/// A direction or offset in 3D space.
pub type Vec3 = Vector3<f64>;


/// An axis aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Pos3,
    pub max: Pos3,
}

impl BoundingBox {
    /// Returns the smallest box around all points of `iter` or `None` if the
    /// iterator is empty.
    pub fn around(iter: impl IntoIterator<Item = Pos3>) -> Option<Self> {
        let mut iter = iter.into_iter();
        let first = iter.next()?;
        let mut out = Self { min: first, max: first };
        for p in iter {
            out.add_point(p);
        }

        Some(out)
    }

    /// Grows the box so that it contains `p`.
    pub fn add_point(&mut self, p: Pos3) {
        fn min(state: &mut f64, new: f64) {
            if new < *state {
                *state = new;
            }
        }
        fn max(state: &mut f64, new: f64) {
            if new > *state {
                *state = new;
            }
        }

        min(&mut self.min.x, p.x);
        min(&mut self.min.y, p.y);
        min(&mut self.min.z, p.z);
        max(&mut self.max.x, p.x);
        max(&mut self.max.y, p.y);
        max(&mut self.max.z, p.z);
    }

    pub fn center(&self) -> Pos3 {
        self.min.midpoint(self.max)
    }

    pub fn diagonal(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn contains(&self, p: Pos3) -> bool {
        self.min.x <= p.x && p.x <= self.max.x
            && self.min.y <= p.y && p.y <= self.max.y
            && self.min.z <= p.z && p.z <= self.max.z
    }
}


/// Extension trait to add some useful methods to iterators over positions.
pub trait PosIteratorExt: Iterator<Item = Pos3> + Sized {
    /// Calculates the centroid of all points yielded by this iterator.
    /// Returns `None` if the iterator is empty.
    fn centroid(self) -> Option<Pos3> {
        let mut count = 0u32;
        let mut sum = Vec3::zero();
        for p in self {
            count += 1;
            sum += p.to_vec();
        }

        if count == 0 {
            None
        } else {
            Some(Pos3::from_vec(sum / count as f64))
        }
    }
}

impl<I: Iterator<Item = Pos3>> PosIteratorExt for I {}


/// Returns the (not normalized) normal of the polygon through `points` via
/// Newell's method. Its length is twice the area of the polygon, so summing
/// these gives area weighted normals.
pub fn newell_normal(points: &[Pos3]) -> Vec3 {
    let mut n = Vec3::zero();
    for (i, a) in points.iter().enumerate() {
        let b = points[(i + 1) % points.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n
}

/// Normalizes `v` or returns the zero vector if `v` is (almost) zero.
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let len = v.magnitude();
    if len > 1e-300 {
        v / len
    } else {
        Vec3::zero()
    }
}

/// Returns `true` if all components of `p` are finite.
pub fn is_finite(p: Pos3) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite()
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn centroid_of_square() {
        let c = vec![
            Pos3::new(0.0, 0.0, 0.0),
            Pos3::new(2.0, 0.0, 0.0),
            Pos3::new(2.0, 2.0, 0.0),
            Pos3::new(0.0, 2.0, 0.0),
        ].into_iter().centroid();

        assert_eq!(c, Some(Pos3::new(1.0, 1.0, 0.0)));
        assert_eq!(Vec::<Pos3>::new().into_iter().centroid(), None);
    }

    #[test]
    fn newell_normal_of_ccw_square_points_up() {
        let n = newell_normal(&[
            Pos3::new(0.0, 0.0, 0.0),
            Pos3::new(2.0, 0.0, 0.0),
            Pos3::new(2.0, 2.0, 0.0),
            Pos3::new(0.0, 2.0, 0.0),
        ]);

        assert_relative_eq!(n.x, 0.0);
        assert_relative_eq!(n.y, 0.0);
        // Twice the area.
        assert_relative_eq!(n.z, 8.0);
    }

    #[test]
    fn bounding_box() {
        let bb = BoundingBox::around(vec![
            Pos3::new(1.0, -1.0, 0.5),
            Pos3::new(-2.0, 3.0, 0.0),
        ]).unwrap();

        assert_eq!(bb.min, Pos3::new(-2.0, -1.0, 0.0));
        assert_eq!(bb.max, Pos3::new(1.0, 3.0, 0.5));
        assert!(bb.contains(Pos3::new(0.0, 0.0, 0.25)));
        assert!(!bb.contains(Pos3::new(0.0, 4.0, 0.25)));
        assert_eq!(BoundingBox::around(vec![]), None);
    }
}
