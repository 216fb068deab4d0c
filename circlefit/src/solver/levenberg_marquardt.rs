use faer::{Col, ColRef, Mat, Side, prelude::Solve};
use tracing::{debug, warn};

use crate::{
    Config, Degeneracy, FitError, Termination,
    datatypes::Circle,
    solver::{Model, NUM_PARAMS, sum_of_squares},
};

/// Floor for the diagonal entries used to scale the damping term.
/// Keeps the damped matrix positive definite even if a column of J is all zero.
const MIN_DIAGONAL: f64 = 1e-12;
/// Lower bound for λ, so that dividing it after many good steps can't underflow.
const MIN_DAMPING: f64 = 1e-15;
/// Accepted steps in a row whose relative cost decrease is under tolerance.
const SMALL_DECREASES_TO_CONVERGE: usize = 2;

#[derive(Debug)]
pub(crate) struct SuccessfulSolve {
    pub circle: Circle,
    pub iterations: usize,
    pub evaluations: usize,
    pub sum_of_squares: f64,
    pub termination: Termination,
}

impl Model<'_> {
    #[inline(never)]
    pub fn solve_levenberg_marquardt(
        &mut self,
        guess: Circle,
        config: &Config,
    ) -> Result<SuccessfulSolve, FitError> {
        let m = self.num_residuals();
        let mut params: [f64; NUM_PARAMS] = guess.into();
        let mut residuals = vec![0.0; m];
        let mut trial_residuals = vec![0.0; m];

        self.residual(&params, &mut residuals);
        let mut evaluations = 1;
        let mut cost = sum_of_squares(&residuals);
        if !cost.is_finite() {
            warn!(%guess, "sum of squares overflowed at the initial guess");
            return Err(Degeneracy::IllConditioned.into());
        }
        if cost == 0.0 {
            return Ok(SuccessfulSolve {
                circle: guess,
                iterations: 0,
                evaluations,
                sum_of_squares: cost,
                termination: Termination::ExactFit,
            });
        }

        let mut damping = config.initial_damping;
        let mut small_decreases = 0;
        let mut relinearize = true;
        let mut jtj = Mat::<f64>::zeros(NUM_PARAMS, NUM_PARAMS);
        let mut gradient = Col::<f64>::zeros(NUM_PARAMS);

        for iteration in 1..=config.max_iterations {
            if relinearize {
                self.refresh_jacobian(&params);
                self.check_rank(config.degeneracy_tolerance)?;
                let j = self.jacobian().as_ref();
                jtj = j.transpose() * j;
                gradient = j.transpose() * ColRef::from_slice(&residuals);
                relinearize = false;
            }

            /* Solve the damped normal equations for the step d:
               (JᵀJ + λ·diag(JᵀJ)) d = -Jᵀr
            */
            let mut a = jtj.clone();
            for i in 0..NUM_PARAMS {
                a[(i, i)] += damping * jtj[(i, i)].max(MIN_DIAGONAL);
            }
            let b = Col::<f64>::from_fn(NUM_PARAMS, |i| -gradient[i]);
            let factored = a
                .llt(Side::Lower)
                .map_err(|_| FitError::from(Degeneracy::IllConditioned))?;
            let d = factored.solve(&b);
            assert_eq!(
                d.nrows(),
                NUM_PARAMS,
                "the `d` column must be the same size as the number of parameters."
            );
            if d.iter().any(|d| !d.is_finite()) {
                warn!(iteration, damping, "step is not finite");
                return Err(Degeneracy::IllConditioned.into());
            }

            // Convergence check: if `d` is small enough relative to the parameters,
            // then we're at a local minimum. Noisy points never get the residual to zero,
            // but this is still the least-squares solution.
            let current_inf_norm = params.iter().map(|v| v.abs()).fold(0.0, libm::fmax);
            let step_inf_norm = d.iter().map(|d| d.abs()).fold(0.0, libm::fmax);
            let step_threshold = config.step_tolerance * (current_inf_norm + config.step_tolerance);
            if step_inf_norm <= step_threshold {
                debug!(iteration, cost, "step below tolerance");
                return Ok(SuccessfulSolve {
                    circle: params.into(),
                    iterations: iteration,
                    evaluations,
                    sum_of_squares: cost,
                    termination: Termination::StepTolerance,
                });
            }

            let mut candidate = params;
            for (p, d) in candidate.iter_mut().zip(d.iter()) {
                *p += d;
            }
            self.residual(&candidate, &mut trial_residuals);
            evaluations += 1;
            let candidate_cost = sum_of_squares(&trial_residuals);

            // The cost is even in r, so a step through r = 0 lands on the mirror
            // solution with a negative radius. Never accept one.
            let keeps_radius_positive = candidate[NUM_PARAMS - 1] > 0.0;
            if keeps_radius_positive && candidate_cost.is_finite() && candidate_cost < cost {
                let relative_decrease = (cost - candidate_cost) / cost;
                debug!(
                    iteration,
                    cost = candidate_cost,
                    relative_decrease,
                    damping,
                    "accepted step"
                );
                params = candidate;
                std::mem::swap(&mut residuals, &mut trial_residuals);
                cost = candidate_cost;
                damping = (damping / config.damping_factor).max(MIN_DAMPING);
                relinearize = true;

                if cost == 0.0 {
                    return Ok(SuccessfulSolve {
                        circle: params.into(),
                        iterations: iteration,
                        evaluations,
                        sum_of_squares: cost,
                        termination: Termination::ExactFit,
                    });
                }
                if relative_decrease < config.tolerance {
                    small_decreases += 1;
                    if small_decreases >= SMALL_DECREASES_TO_CONVERGE {
                        return Ok(SuccessfulSolve {
                            circle: params.into(),
                            iterations: iteration,
                            evaluations,
                            sum_of_squares: cost,
                            termination: Termination::CostTolerance,
                        });
                    }
                } else {
                    small_decreases = 0;
                }
            } else {
                // Rejected: stay put, lean further towards gradient descent and retry
                // with the same linearization. Larger λ also means a shorter step,
                // so the radius eventually stays positive.
                damping = (damping * config.damping_factor).min(config.max_damping);
                debug!(
                    iteration,
                    cost,
                    candidate_cost,
                    keeps_radius_positive,
                    damping,
                    "rejected step"
                );
            }
        }

        Err(FitError::NonConvergence {
            estimate: params.into(),
            iterations: config.max_iterations,
            sum_of_squares: cost,
        })
    }

    /// Fail if the Jacobian has (numerically) lost a rank.
    /// With a rank-deficient Jacobian there's a direction the parameters can move in
    /// without changing the residuals at all, so the fit is undetermined.
    fn check_rank(&self, tolerance: f64) -> Result<(), FitError> {
        let [largest, _, smallest] = self.singular_values()?;
        if smallest.is_nan() || smallest <= tolerance * largest {
            warn!(largest, smallest, "Jacobian is rank-deficient");
            return Err(Degeneracy::SingularJacobian.into());
        }
        Ok(())
    }
}
