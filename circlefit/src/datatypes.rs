//! Points going into a fit, and the circle coming out of it.

use crate::vector::V;

/// A 2D sample point.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
#[cfg_attr(feature = "fuzz", derive(arbitrary::Arbitrary))]
pub struct Point {
    #[allow(missing_docs)]
    pub x: f64,
    #[allow(missing_docs)]
    pub y: f64,
}

/// Points can be easily converted to/from an (x, y) pair.
impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Points can be easily converted to/from an (x, y) pair.
impl From<Point> for (f64, f64) {
    fn from(Point { x, y }: Point) -> Self {
        (x, y)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance between two points.
    pub fn euclidean_distance(&self, r: Point) -> f64 {
        V::from(*self).euclidean_distance(V::from(r))
    }

    /// Are both components finite (not NaN or infinite)?
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Shift this point by the given offset.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A circle in the plane.
/// This is also the parameter vector (a, b, r) the solver optimizes.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Circle {
    /// Center of the circle, i.e. (a, b).
    pub center: Point,
    /// Radius of the circle, i.e. r.
    pub radius: f64,
}

impl Circle {
    /// Create a new circle.
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Are the center and radius all finite?
    pub fn is_finite(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite()
    }

    /// Signed distance from the point to this circle's perimeter.
    /// Positive outside the circle, negative inside.
    pub fn geometric_residual(&self, p: Point) -> f64 {
        self.center.euclidean_distance(p) - self.radius
    }

    /// The residual the solver minimizes, `(x - a)^2 + (y - b)^2 - r^2`.
    #[inline(always)]
    pub fn algebraic_residual(&self, p: Point) -> f64 {
        (V::from(p) - V::from(self.center)).magnitude_squared() - self.radius.powi(2)
    }
}

/// Parameter order is (a, b, r).
impl From<[f64; 3]> for Circle {
    fn from([a, b, r]: [f64; 3]) -> Self {
        Self {
            center: Point { x: a, y: b },
            radius: r,
        }
    }
}

/// Parameter order is (a, b, r).
impl From<Circle> for [f64; 3] {
    fn from(circle: Circle) -> Self {
        [circle.center.x, circle.center.y, circle.radius]
    }
}

impl std::fmt::Display for Circle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Center: {}, Radius: {}", self.center, self.radius)
    }
}
