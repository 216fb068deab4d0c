use faer::{Mat, Side, prelude::Solve};

use crate::{
    Degeneracy, FitError, Warning, WarningContent,
    solver::{Model, NUM_PARAMS, levenberg_marquardt::SuccessfulSolve},
};

/// Above this condition number, the fit gets an [`WarningContent::IllConditioned`] warning.
const ILL_CONDITIONED: f64 = 1e8;

pub(crate) trait Analysis: Sized {
    fn analyze(model: &mut Model<'_>, solved: &SuccessfulSolve) -> Result<Self, FitError>;
    fn warnings(&self) -> Vec<Warning>;
}

#[derive(Default, Debug)]
pub(crate) struct NoAnalysis;

impl Analysis for NoAnalysis {
    fn analyze(_: &mut Model<'_>, _: &SuccessfulSolve) -> Result<Self, FitError> {
        Ok(Self)
    }

    fn warnings(&self) -> Vec<Warning> {
        Vec::new()
    }
}

/// One standard error per fitted parameter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterErrors {
    /// Standard error of the center's X component.
    pub center_x: f64,
    /// Standard error of the center's Y component.
    pub center_y: f64,
    /// Standard error of the radius.
    pub radius: f64,
}

/// How well-determined the fitted circle is.
#[derive(Debug, Clone, PartialEq)]
pub struct FitAnalysis {
    /// Singular values of the Jacobian at the solution, largest first.
    pub singular_values: [f64; NUM_PARAMS],
    /// Largest singular value divided by the smallest.
    /// Large values mean small changes to the points can move the circle a lot.
    pub condition_number: f64,
    /// Standard errors estimated from the residual variance and (JᵀJ)⁻¹.
    /// `None` with exactly 3 points, since there are no spare degrees of freedom
    /// to estimate the variance from.
    pub standard_errors: Option<ParameterErrors>,
}

impl Analysis for FitAnalysis {
    fn analyze(model: &mut Model<'_>, solved: &SuccessfulSolve) -> Result<Self, FitError> {
        let params: [f64; NUM_PARAMS] = solved.circle.into();
        model.refresh_jacobian(&params);
        let singular_values = model.singular_values()?;
        let condition_number = singular_values[0] / singular_values[NUM_PARAMS - 1];

        let degrees_of_freedom = model.num_residuals().saturating_sub(NUM_PARAMS);
        let standard_errors = if degrees_of_freedom == 0 {
            None
        } else {
            let variance = solved.sum_of_squares / degrees_of_freedom as f64;
            let j = model.jacobian().as_ref();
            let jtj: Mat<f64> = j.transpose() * j;
            let factored = jtj
                .llt(Side::Lower)
                .map_err(|_| FitError::from(Degeneracy::IllConditioned))?;
            let covariance = factored.solve(&Mat::<f64>::identity(NUM_PARAMS, NUM_PARAMS));
            let std_err = |i: usize| (variance * covariance[(i, i)]).max(0.0).sqrt();
            Some(ParameterErrors {
                center_x: std_err(0),
                center_y: std_err(1),
                radius: std_err(2),
            })
        };

        Ok(Self {
            singular_values,
            condition_number,
            standard_errors,
        })
    }

    fn warnings(&self) -> Vec<Warning> {
        if self.condition_number > ILL_CONDITIONED {
            vec![Warning {
                about_point: None,
                content: WarningContent::IllConditioned(self.condition_number),
            }]
        } else {
            Vec::new()
        }
    }
}
