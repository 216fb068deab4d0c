use faer::Mat;

use crate::{FitError, datatypes::Point};

pub(crate) mod levenberg_marquardt;

/// Number of parameters being solved for: a, b and r.
pub(crate) const NUM_PARAMS: usize = 3;

/// Configuration for the Levenberg-Marquardt solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    /// How many trial steps (accepted or rejected) to attempt before giving up.
    pub max_iterations: usize,
    /// Converge once the relative decrease in the sum of squares drops below this,
    /// on two accepted steps in a row.
    pub tolerance: f64,
    /// Converge once the step is this small, relative to the parameters.
    pub step_tolerance: f64,
    /// Starting value of the damping factor λ.
    /// Small values start out close to Gauss-Newton.
    pub initial_damping: f64,
    /// λ is divided by this after an accepted step and multiplied by it after a rejected one.
    pub damping_factor: f64,
    /// Upper bound on λ.
    pub max_damping: f64,
    /// Relative threshold below which the point cloud or the Jacobian is treated as
    /// having lost a dimension.
    pub degeneracy_tolerance: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-10,
            step_tolerance: 1e-12,
            initial_damping: 1e-3,
            damping_factor: 10.0,
            max_damping: 1e16,
            degeneracy_tolerance: 1e-10,
        }
    }
}

impl Config {
    /// Set `max_iterations`.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set `tolerance`.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set `step_tolerance`.
    pub fn with_step_tolerance(mut self, step_tolerance: f64) -> Self {
        self.step_tolerance = step_tolerance;
        self
    }

    /// Set `initial_damping`.
    pub fn with_initial_damping(mut self, initial_damping: f64) -> Self {
        self.initial_damping = initial_damping;
        self
    }

    /// Set `damping_factor`.
    pub fn with_damping_factor(mut self, damping_factor: f64) -> Self {
        self.damping_factor = damping_factor;
        self
    }

    /// Set `max_damping`.
    pub fn with_max_damping(mut self, max_damping: f64) -> Self {
        self.max_damping = max_damping;
        self
    }

    /// Set `degeneracy_tolerance`.
    pub fn with_degeneracy_tolerance(mut self, degeneracy_tolerance: f64) -> Self {
        self.degeneracy_tolerance = degeneracy_tolerance;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), FitError> {
        let positive = |x: f64| x.is_finite() && x > 0.0;
        if self.max_iterations == 0 {
            return Err(FitError::InvalidConfig("max_iterations must be at least 1"));
        }
        if !positive(self.tolerance) {
            return Err(FitError::InvalidConfig("tolerance must be positive"));
        }
        if !positive(self.step_tolerance) {
            return Err(FitError::InvalidConfig("step_tolerance must be positive"));
        }
        if !positive(self.initial_damping) {
            return Err(FitError::InvalidConfig("initial_damping must be positive"));
        }
        if !(self.damping_factor.is_finite() && self.damping_factor > 1.0) {
            return Err(FitError::InvalidConfig("damping_factor must be greater than 1"));
        }
        if !(self.max_damping.is_finite() && self.max_damping >= self.initial_damping) {
            return Err(FitError::InvalidConfig(
                "max_damping must be finite and at least initial_damping",
            ));
        }
        if !positive(self.degeneracy_tolerance) {
            return Err(FitError::InvalidConfig(
                "degeneracy_tolerance must be positive",
            ));
        }
        Ok(())
    }
}

/// The least-squares problem: one residual row per point, one column per parameter.
pub(crate) struct Model<'p> {
    points: &'p [Point],
    /// N x 3, overwritten in place on every relinearization.
    jacobian: Mat<f64>,
}

impl<'p> Model<'p> {
    pub fn new(points: &'p [Point]) -> Self {
        Self {
            points,
            jacobian: Mat::zeros(points.len(), NUM_PARAMS),
        }
    }

    pub fn num_residuals(&self) -> usize {
        self.points.len()
    }

    /// Compute the residual vector, i.e. how far each point is from lying on the circle
    /// described by `params`.
    pub fn residual(&self, params: &[f64; NUM_PARAMS], out: &mut [f64]) {
        debug_assert_eq!(out.len(), self.points.len());
        let [a, b, r] = *params;
        for (out, p) in out.iter_mut().zip(self.points) {
            *out = (p.x - a).powi(2) + (p.y - b).powi(2) - r.powi(2);
        }
    }

    /// Overwrite the Jacobian with the partial derivatives at `params`.
    pub fn refresh_jacobian(&mut self, params: &[f64; NUM_PARAMS]) {
        let [a, b, r] = *params;
        for (row, p) in self.points.iter().enumerate() {
            self.jacobian[(row, 0)] = -2.0 * (p.x - a);
            self.jacobian[(row, 1)] = -2.0 * (p.y - b);
            self.jacobian[(row, 2)] = -2.0 * r;
        }
    }

    pub fn jacobian(&self) -> &Mat<f64> {
        &self.jacobian
    }

    /// Singular values of the current Jacobian, largest first.
    pub fn singular_values(&self) -> Result<[f64; NUM_PARAMS], FitError> {
        let mut sigma = self
            .jacobian
            .singular_values()
            .map_err(FitError::FaerSvd)?;
        sigma.sort_by(|l, r| r.total_cmp(l));
        let mut out = [0.0; NUM_PARAMS];
        for (dst, src) in out.iter_mut().zip(sigma) {
            *dst = src;
        }
        Ok(out)
    }
}

pub(crate) fn sum_of_squares(residuals: &[f64]) -> f64 {
    residuals.iter().map(|r| r * r).sum()
}
