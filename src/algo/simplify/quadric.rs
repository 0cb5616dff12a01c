//! Quadric error metrics.
//!
//! Each vertex carries a symmetric 4x4 error quadric approximating the sum of
//! squared distances to a set of planes (Garland & Heckbert, 1997). Quadrics
//! are additive, so the error of merging two vertices is measured against the
//! sum of their quadrics.

use nalgebra::{Matrix4, Point3, Vector3, Vector4};

/// Determinant threshold below which the constrained system is treated as
/// singular and the minimizer falls back to an endpoint.
const SINGULAR_EPS: f64 = 1.0e-12;

/// A quadric error matrix (4x4 symmetric matrix).
///
/// Stored as the 10 unique elements of the upper triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadric {
    /// Upper triangular elements: [a, b, c, d, e, f, g, h, i, j]
    /// Matrix form:
    /// | a b c d |
    /// | b e f g |
    /// | c f h i |
    /// | d g i j |
    data: [f64; 10],
}

impl Quadric {
    /// Create a zero quadric.
    pub fn zero() -> Self {
        Self { data: [0.0; 10] }
    }

    /// Create a quadric from the plane `n . x + d = 0`.
    /// The normal should be unit length.
    pub fn from_plane(n: Vector3<f64>, d: f64) -> Self {
        let (a, b, c) = (n.x, n.y, n.z);
        Self {
            data: [
                a * a, // [0,0]
                a * b, // [0,1] = [1,0]
                a * c, // [0,2] = [2,0]
                a * d, // [0,3] = [3,0]
                b * b, // [1,1]
                b * c, // [1,2] = [2,1]
                b * d, // [1,3] = [3,1]
                c * c, // [2,2]
                c * d, // [2,3] = [3,2]
                d * d, // [3,3]
            ],
        }
    }

    /// Evaluate the quadric error for a point.
    /// Returns v^T * Q * v where v = [x, y, z, 1].
    pub fn evaluate(&self, p: &Point3<f64>) -> f64 {
        let (x, y, z) = (p.x, p.y, p.z);

        self.data[0] * x * x
            + 2.0 * self.data[1] * x * y
            + 2.0 * self.data[2] * x * z
            + 2.0 * self.data[3] * x
            + self.data[4] * y * y
            + 2.0 * self.data[5] * y * z
            + 2.0 * self.data[6] * y
            + self.data[7] * z * z
            + 2.0 * self.data[8] * z
            + self.data[9]
    }

    /// Expand to the full 4x4 matrix.
    fn to_matrix(&self) -> Matrix4<f64> {
        #[rustfmt::skip]
        let m = Matrix4::new(
            self.data[0], self.data[1], self.data[2], self.data[3],
            self.data[1], self.data[4], self.data[5], self.data[6],
            self.data[2], self.data[5], self.data[7], self.data[8],
            self.data[3], self.data[6], self.data[8], self.data[9],
        );
        m
    }

    /// Find the point that minimizes the quadric error.
    ///
    /// Solves the system obtained by replacing the last row with
    /// `[0, 0, 0, 1]` (forcing the homogeneous coordinate to 1) against the
    /// right-hand side `[0, 0, 0, 1]` by partial-pivot LU elimination.
    /// Returns `None` if the system is singular, which happens whenever the
    /// accumulated planes do not constrain all three coordinates (flat or
    /// ruled neighborhoods).
    pub fn minimizer(&self) -> Option<Point3<f64>> {
        let mut m = self.to_matrix();
        m[(3, 0)] = 0.0;
        m[(3, 1)] = 0.0;
        m[(3, 2)] = 0.0;
        m[(3, 3)] = 1.0;

        let lu = m.lu();
        if lu.determinant().abs() < SINGULAR_EPS {
            return None;
        }
        let sol = lu.solve(&Vector4::new(0.0, 0.0, 0.0, 1.0))?;
        Some(Point3::new(sol.x, sol.y, sol.z))
    }
}

impl std::ops::Add for Quadric {
    type Output = Quadric;

    fn add(self, other: Quadric) -> Quadric {
        let mut result = self;
        result += other;
        result
    }
}

impl std::ops::AddAssign for Quadric {
    fn add_assign(&mut self, other: Quadric) {
        for i in 0..10 {
            self.data[i] += other.data[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quadric_from_plane() {
        // Plane z = 0 (normal [0, 0, 1], d = 0)
        let q = Quadric::from_plane(Vector3::new(0.0, 0.0, 1.0), 0.0);

        // Error should be z^2 for any point
        let p1 = Point3::new(0.0, 0.0, 0.0);
        assert!((q.evaluate(&p1) - 0.0).abs() < 1e-10);

        let p2 = Point3::new(0.0, 0.0, 1.0);
        assert!((q.evaluate(&p2) - 1.0).abs() < 1e-10);

        let p3 = Point3::new(5.0, 3.0, 2.0);
        assert!((q.evaluate(&p3) - 4.0).abs() < 1e-10);
    }

    #[test]
    fn test_quadric_addition() {
        let q1 = Quadric::from_plane(Vector3::new(1.0, 0.0, 0.0), 0.0); // x = 0
        let q2 = Quadric::from_plane(Vector3::new(0.0, 1.0, 0.0), 0.0); // y = 0

        let q = q1 + q2;

        // Combined error should be x^2 + y^2
        let p = Point3::new(3.0, 4.0, 0.0);
        assert!((q.evaluate(&p) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_minimizer_of_three_planes() {
        // x = 1, y = 2, z = 3 intersect in a single point
        let q = Quadric::from_plane(Vector3::new(1.0, 0.0, 0.0), -1.0)
            + Quadric::from_plane(Vector3::new(0.0, 1.0, 0.0), -2.0)
            + Quadric::from_plane(Vector3::new(0.0, 0.0, 1.0), -3.0);

        let p = q.minimizer().unwrap();
        assert!((p - Point3::new(1.0, 2.0, 3.0)).norm() < 1e-10);
        assert!(q.evaluate(&p).abs() < 1e-10);
    }

    #[test]
    fn test_minimizer_singular_for_coplanar_set() {
        // Two copies of the same plane leave x and y unconstrained
        let q = Quadric::from_plane(Vector3::new(0.0, 0.0, 1.0), 0.0)
            + Quadric::from_plane(Vector3::new(0.0, 0.0, 1.0), 0.0);

        assert!(q.minimizer().is_none());

        // any point in the plane has zero error, so the fallback cost is zero
        let p = Point3::new(0.7, -2.0, 0.0);
        assert!(q.evaluate(&p).abs() < 1e-10);
    }
}
