use crate::{
    FitAnalysis, Warning,
    datatypes::{Circle, Point},
};

/// Why a successful fit stopped iterating.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(not(feature = "unstable-exhaustive"), non_exhaustive)]
pub enum Termination {
    /// The sum of squares stopped decreasing meaningfully.
    CostTolerance,
    /// The solver's steps became negligibly small.
    StepTolerance,
    /// Every point lies exactly on the circle.
    ExactFit,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Termination::CostTolerance => "sum of squares stopped decreasing",
            Termination::StepTolerance => "step size fell below tolerance",
            Termination::ExactFit => "exact fit",
        };
        f.write_str(s)
    }
}

/// Data from a successful fit.
#[derive(Debug)]
#[cfg_attr(not(feature = "unstable-exhaustive"), non_exhaustive)]
pub struct FitOutcome {
    /// The fitted circle.
    pub(crate) circle: Circle,
    /// How many trial steps the solver took.
    pub(crate) iterations: usize,
    /// How many times the residual vector was evaluated.
    pub(crate) evaluations: usize,
    /// Sum of squared algebraic residuals at the solution.
    pub(crate) sum_of_squares: f64,
    /// Why the solver stopped.
    pub(crate) termination: Termination,
    /// Things that look suspicious about the input or the fit.
    pub(crate) warnings: Vec<Warning>,
    /// How many points were fitted.
    pub(crate) num_points: usize,
}

impl FitOutcome {
    /// The fitted circle.
    pub fn circle(&self) -> Circle {
        self.circle
    }

    /// How many trial steps (accepted or rejected) the solver took.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// How many times the residual vector was evaluated.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Sum of squared algebraic residuals at the solution.
    pub fn sum_of_squares(&self) -> f64 {
        self.sum_of_squares
    }

    /// Why the solver stopped.
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Things that look suspicious about the input or the fit.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// How many points were fitted.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Root-mean-square of the algebraic residuals.
    pub fn rms_residual(&self) -> f64 {
        (self.sum_of_squares / self.num_points as f64).sqrt()
    }

    /// Signed distance from each point to the fitted circle, in the same order as `points`.
    pub fn geometric_residuals(&self, points: &[Point]) -> Vec<f64> {
        points
            .iter()
            .map(|p| self.circle.geometric_residual(*p))
            .collect()
    }
}

/// Just like [`FitOutcome`] except it also contains the result of
/// numeric analysis on the Jacobian at the solution.
#[derive(Debug)]
pub struct FitOutcomeAnalysis {
    /// Conditioning and uncertainty of the fit.
    pub analysis: FitAnalysis,
    /// Other data.
    pub outcome: FitOutcome,
}

impl AsRef<FitOutcome> for FitOutcomeAnalysis {
    fn as_ref(&self) -> &FitOutcome {
        &self.outcome
    }
}
