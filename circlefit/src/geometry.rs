//! Checks and heuristics on the raw point set, run before the solver starts.

use tracing::warn;

use crate::{
    Degeneracy, FitError,
    datatypes::{Circle, Point},
    vector::V,
};

/// A circle has 3 unknowns (a, b, r), so it needs at least this many points.
pub const MIN_POINTS: usize = 3;

/// Reject point sets the solver can't do anything meaningful with.
pub(crate) fn validate(points: &[Point]) -> Result<(), FitError> {
    if points.len() < MIN_POINTS {
        return Err(FitError::InsufficientPoints {
            found: points.len(),
        });
    }
    if let Some(index) = points.iter().position(|p| !p.is_finite()) {
        return Err(FitError::NonFinitePoint { index });
    }
    Ok(())
}

/// Arithmetic mean of the points.
pub(crate) fn centroid(points: &[Point]) -> Point {
    let n = points.len() as f64;
    let sum = points
        .iter()
        .map(|p| V::from(*p))
        .fold(V::new(0.0, 0.0), |acc, v| acc + v);
    let mean = sum / n;
    Point::new(mean.x, mean.y)
}

/// Mean Euclidean distance from `center` to the points.
pub(crate) fn mean_distance(points: &[Point], center: Point) -> f64 {
    let total: f64 = points.iter().map(|p| p.euclidean_distance(center)).sum();
    total / points.len() as f64
}

/// Starting circle for the solver: centered on the centroid of the points,
/// with the mean distance from the centroid as its radius.
///
/// This is cheap and close to the answer when the points are spread roughly
/// evenly around the circle. It's biased towards the inside of the arc when
/// they only cover part of it, but the solver usually recovers from that.
/// If every point is identical the radius is 0.
pub fn initial_guess(points: &[Point]) -> Result<Circle, FitError> {
    validate(points)?;
    let center = centroid(points);
    let radius = mean_distance(points, center);
    Ok(Circle { center, radius })
}

/// Eigen-decomposition of the points' 2x2 covariance matrix.
/// The covariance is computed on points centered on their centroid and divided by
/// `extent`, so it can't overflow or underflow whatever units the points are in.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Spread {
    /// Largest absolute X or Y offset of any point from the centroid.
    pub extent: f64,
    /// Normalized variance along the direction the points are most spread out in.
    pub major: f64,
    /// Normalized variance along the perpendicular direction.
    pub minor: f64,
}

impl Spread {
    /// Length scale of the point cloud, in the points' own units.
    pub fn scale(&self) -> f64 {
        self.extent * self.major.sqrt()
    }
}

pub(crate) fn spread(points: &[Point]) -> Spread {
    let c = V::from(centroid(points));
    let offsets: Vec<V> = points.iter().map(|p| V::from(*p) - c).collect();
    let extent = offsets
        .iter()
        .flat_map(|d| [d.x.abs(), d.y.abs()])
        .fold(0.0, libm::fmax);
    if extent == 0.0 {
        return Spread {
            extent,
            major: 0.0,
            minor: 0.0,
        };
    }

    let n = points.len() as f64;
    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for d in offsets {
        let d = d / extent;
        sxx += d.x * d.x;
        syy += d.y * d.y;
        sxy += d.x * d.y;
    }
    let (sxx, syy, sxy) = (sxx / n, syy / n, sxy / n);

    // Closed form for a symmetric 2x2 matrix.
    // The minor eigenvalue comes from the determinant, so it doesn't lose precision
    // by subtracting two nearly-equal numbers.
    let half_trace = (sxx + syy) / 2.0;
    let major = half_trace + libm::hypot((sxx - syy) / 2.0, sxy);
    let det = sxx * syy - sxy * sxy;
    let minor = if major > 0.0 {
        (det / major).max(0.0)
    } else {
        0.0
    };
    Spread {
        extent,
        major,
        minor,
    }
}

/// Fail if the points are all identical or all on one line.
/// Neither case has a finite, unique circle through it.
pub(crate) fn check_spread(points: &[Point], tolerance: f64) -> Result<Spread, FitError> {
    let spread = spread(points);
    let largest_coordinate = points
        .iter()
        .flat_map(|p| [p.x.abs(), p.y.abs()])
        .fold(0.0, libm::fmax);
    // At or below this, the offsets are just rounding noise from computing the centroid.
    let resolution = 16.0 * f64::EPSILON * largest_coordinate;
    if spread.extent <= resolution {
        warn!(num_points = points.len(), "all points coincide");
        return Err(Degeneracy::Coincident.into());
    }
    if spread.minor <= tolerance * spread.major {
        warn!(
            num_points = points.len(),
            major = spread.major,
            minor = spread.minor,
            "points are collinear"
        );
        return Err(Degeneracy::Collinear.into());
    }
    Ok(spread)
}
