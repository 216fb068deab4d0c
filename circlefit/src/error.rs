use faer::linalg::svd::SvdError;

use crate::datatypes::Circle;

/// Why a point set (or the solver's progress on it) was judged degenerate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(feature = "unstable-exhaustive"), non_exhaustive)]
pub enum Degeneracy {
    /// Every point sits at the same location, so there's no circle to find.
    Coincident,
    /// The points lie on a straight line, i.e. a circle of infinite radius.
    Collinear,
    /// The Jacobian lost rank while solving. The problem has no unique answer near
    /// the current estimate.
    SingularJacobian,
    /// The damped normal equations could not be factored, or gave a non-finite step.
    IllConditioned,
    /// The fit converged to a radius indistinguishable from zero.
    ZeroRadius,
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Degeneracy::Coincident => "all points coincide",
            Degeneracy::Collinear => "the points are collinear",
            Degeneracy::SingularJacobian => "the Jacobian is rank-deficient",
            Degeneracy::IllConditioned => "the normal equations are ill-conditioned",
            Degeneracy::ZeroRadius => "the radius collapsed to zero",
        };
        f.write_str(s)
    }
}

/// Errors that could occur when fitting a circle.
#[derive(thiserror::Error, Debug)]
#[cfg_attr(not(feature = "unstable-exhaustive"), non_exhaustive)]
pub enum FitError {
    /// A circle has 3 parameters, so it needs at least 3 points.
    #[error("Need at least 3 points to fit a circle, but only {found} were given")]
    InsufficientPoints {
        /// How many points were given.
        found: usize,
    },
    /// One of the points had a NaN or infinite coordinate.
    #[error("Point {index} has a non-finite coordinate")]
    NonFinitePoint {
        /// Index of the offending point.
        index: usize,
    },
    /// The initial guess had a NaN or infinite component.
    #[error("The initial guess ({0}) is not finite")]
    InvalidGuess(Circle),
    /// A solver setting was out of range.
    #[error("Invalid solver config: {0}")]
    InvalidConfig(&'static str),
    /// The points don't define a circle, or the problem is numerically unstable.
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(Degeneracy),
    /// The solver ran out of iterations.
    /// The last accepted estimate is still available, but it's unreliable.
    #[error(
        "Could not converge within {iterations} iterations (sum of squares {sum_of_squares:e})"
    )]
    NonConvergence {
        /// Best circle found before giving up.
        estimate: Circle,
        /// How many iterations were run.
        iterations: usize,
        /// Sum of squared residuals at `estimate`.
        sum_of_squares: f64,
    },
    /// Solver converged, but to a radius that's negative or not finite.
    #[error("The fit converged to an invalid circle ({0})")]
    InvalidResult(Circle),
    /// Faer: could not decompose Jacobian.
    #[error("Something went wrong doing SVD in faer")]
    FaerSvd(SvdError),
}

impl From<Degeneracy> for FitError {
    fn from(d: Degeneracy) -> Self {
        Self::DegenerateGeometry(d)
    }
}

impl FitError {
    /// If the solver simply ran out of iterations, the circle it had reached.
    /// Callers can decide for themselves whether it's good enough.
    pub fn unconverged_estimate(&self) -> Option<Circle> {
        match self {
            Self::NonConvergence { estimate, .. } => Some(*estimate),
            _ => None,
        }
    }

    /// Is this a degenerate-geometry failure?
    pub fn degeneracy(&self) -> Option<Degeneracy> {
        match self {
            Self::DegenerateGeometry(d) => Some(*d),
            _ => None,
        }
    }
}
