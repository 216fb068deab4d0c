//! Fits a circle to 2D points.
//!
//! The fit minimizes the sum of squared algebraic residuals
//! `(x - a)² + (y - b)² - r²` over the center `(a, b)` and radius `r`,
//! using a Levenberg-Marquardt solver that starts from the points' centroid
//! and mean radius.
//!
//! ```
//! use circlefit::{Config, Point, fit};
//!
//! let points = [(1.0, 0.0), (0.0, 1.0), (-1.0, 0.0), (0.0, -1.0)].map(Point::from);
//! let outcome = fit(&points, Config::default()).unwrap();
//! assert!((outcome.circle().radius - 1.0).abs() < 1e-9);
//! ```

pub use crate::analysis::{FitAnalysis, ParameterErrors};
pub use crate::datatypes::{Circle, Point};
pub use crate::error::{Degeneracy, FitError};
pub use crate::fit_outcome::{FitOutcome, FitOutcomeAnalysis, Termination};
pub use crate::geometry::{MIN_POINTS, initial_guess};
pub use crate::solver::Config;
pub use crate::warnings::{Warning, WarningContent};
use crate::{
    analysis::{Analysis, NoAnalysis},
    solver::Model,
};

/// Post-fit numeric analysis.
mod analysis;
/// Input points and the fitted circle.
pub mod datatypes;
/// Errors that can stop a fit.
mod error;
/// Data returned from a successful fit.
mod fit_outcome;
/// Checks and heuristics on the raw point set.
mod geometry;
/// Levenberg-Marquardt solver.
mod solver;
mod vector;
/// Non-fatal lints about a fit.
mod warnings;

/// Fit a circle to the points, starting from [`initial_guess`].
pub fn fit(points: &[Point], config: Config) -> Result<FitOutcome, FitError> {
    let (outcome, NoAnalysis) = fit_inner(points, None, config)?;
    Ok(outcome)
}

/// Fit a circle to the points, starting from the given circle.
///
/// A non-positive radius in the guess is replaced by the mean distance from
/// the guessed center to the points, since the solver can't move away from r = 0.
pub fn fit_with_guess(
    points: &[Point],
    initial_guess: Circle,
    config: Config,
) -> Result<FitOutcome, FitError> {
    let (outcome, NoAnalysis) = fit_inner(points, Some(initial_guess), config)?;
    Ok(outcome)
}

/// Just like [`fit`], but also analyzes how well-conditioned the solution is
/// and estimates standard errors for each parameter.
pub fn fit_with_analysis(points: &[Point], config: Config) -> Result<FitOutcomeAnalysis, FitError> {
    let (outcome, analysis) = fit_inner::<FitAnalysis>(points, None, config)?;
    Ok(FitOutcomeAnalysis { analysis, outcome })
}

#[tracing::instrument(level = "debug", skip_all, fields(num_points = points.len()))]
fn fit_inner<A: Analysis>(
    points: &[Point],
    guess: Option<Circle>,
    config: Config,
) -> Result<(FitOutcome, A), FitError> {
    config.validate()?;
    geometry::validate(points)?;
    let spread = geometry::check_spread(points, config.degeneracy_tolerance)?;
    let start = match guess {
        Some(guess) => reseed_guess(points, guess)?,
        None => initial_guess(points)?,
    };

    let mut model = Model::new(points);
    let solved = model.solve_levenberg_marquardt(start, &config)?;

    let circle = check_result(
        solved.circle,
        spread.scale(),
        config.degeneracy_tolerance,
    )?;

    let analysis = A::analyze(&mut model, &solved)?;
    let mut warnings = warnings::lint(points, circle);
    warnings.extend(analysis.warnings());
    tracing::info!(
        %circle,
        iterations = solved.iterations,
        termination = %solved.termination,
        "fit converged"
    );

    let outcome = FitOutcome {
        circle,
        iterations: solved.iterations,
        evaluations: solved.evaluations,
        sum_of_squares: solved.sum_of_squares,
        termination: solved.termination,
        warnings,
        num_points: points.len(),
    };
    Ok((outcome, analysis))
}

/// Reject a converged circle that isn't a usable answer.
/// `scale` is the size of the point cloud, which the radius is compared against.
fn check_result(circle: Circle, scale: f64, tolerance: f64) -> Result<Circle, FitError> {
    if !circle.is_finite() || circle.radius < 0.0 {
        tracing::warn!(%circle, "fit converged to an invalid circle");
        return Err(FitError::InvalidResult(circle));
    }
    if circle.radius <= tolerance * scale {
        tracing::warn!(%circle, "fit converged to a zero radius");
        return Err(Degeneracy::ZeroRadius.into());
    }
    Ok(circle)
}

/// Only called once the points are known not to coincide, so some point is always
/// away from the guessed center.
fn reseed_guess(points: &[Point], guess: Circle) -> Result<Circle, FitError> {
    if !guess.is_finite() {
        return Err(FitError::InvalidGuess(guess));
    }
    if guess.radius > 0.0 {
        return Ok(guess);
    }
    let radius = geometry::mean_distance(points, guess.center);
    debug_assert!(radius > 0.0, "reseeded radius must be positive");
    tracing::debug!(radius, "replaced non-positive radius in initial guess");
    Ok(Circle { radius, ..guess })
}
