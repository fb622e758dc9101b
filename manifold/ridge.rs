use super::config::ConfigError;
use super::linalg::{NumericalError, ensure_finite, least_squares};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, concatenate};

/// Weighted, L2-regularized least-squares solver over flat response vectors.
pub trait RidgeSolver: Sync {
    /// Solves for the `n_coef x n_responses` coefficient matrix `C` in `responses ≈ design * C`.
    ///
    /// Callers must not pass zero-row systems.
    fn solve(
        &self,
        responses: ArrayView2<'_, f64>,
        design: ArrayView2<'_, f64>,
        weights: ArrayView1<'_, f64>,
    ) -> Result<Array2<f64>, NumericalError>;
}

/// Ridge regression by augmented minimum-norm least squares.
///
/// Minimizes `sum_i w_i ||y_i - x_i C||^2 + (sum_i w_i) * penalty^2 * ||C||_F^2`.
/// The penalty is scaled by the total weight, so multiplying every weight by the same
/// positive constant leaves the solution unchanged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RidgeRegression {
    penalty: f64,
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self { penalty: 0.0 }
    }
}

impl RidgeRegression {
    /// Rejects penalties that are negative or not finite.
    pub fn new(penalty: f64) -> Result<Self, ConfigError> {
        if !penalty.is_finite() || penalty < 0.0 {
            return Err(ConfigError::InvalidPenalty(penalty));
        }
        Ok(Self { penalty })
    }
}

impl RidgeSolver for RidgeRegression {
    fn solve(
        &self,
        responses: ArrayView2<'_, f64>,
        design: ArrayView2<'_, f64>,
        weights: ArrayView1<'_, f64>,
    ) -> Result<Array2<f64>, NumericalError> {
        let n_obs = design.nrows();
        let n_coef = design.ncols();
        if responses.nrows() != n_obs || weights.len() != n_obs {
            return Err(NumericalError::DimensionMismatch(format!(
                "ridge regression: design has {} rows, responses {}, weights {}",
                n_obs,
                responses.nrows(),
                weights.len()
            )));
        }
        if n_obs == 0 {
            return Err(NumericalError::EmptySystem);
        }

        let sqrt_weights: Array1<f64> = weights.mapv(f64::sqrt);
        let column = sqrt_weights.view().insert_axis(Axis(1));
        let weighted_design = &design * &column;
        let weighted_responses = &responses * &column;

        let penalty_scale = weights.sum().sqrt() * self.penalty;
        let penalty_rows = Array2::<f64>::eye(n_coef) * penalty_scale;
        let zero_rows = Array2::<f64>::zeros((n_coef, responses.ncols()));

        let augmented_design = concatenate(Axis(0), &[weighted_design.view(), penalty_rows.view()])
            .map_err(|e| NumericalError::DimensionMismatch(e.to_string()))?;
        let augmented_responses =
            concatenate(Axis(0), &[weighted_responses.view(), zero_rows.view()])
                .map_err(|e| NumericalError::DimensionMismatch(e.to_string()))?;
        ensure_finite(&augmented_design, "ridge design")?;
        ensure_finite(&augmented_responses, "ridge responses")?;

        log::debug!(
            "Ridge solve: {} observations, {} coefficients, {} responses, penalty {:.3e}",
            n_obs,
            n_coef,
            responses.ncols(),
            self.penalty
        );
        let coefficients = least_squares(&augmented_design, &augmented_responses)?;
        ensure_finite(&coefficients, "ridge solve")?;
        Ok(coefficients)
    }
}
