use super::grassmann::{Grassmann, GrassmannGeometry};
use super::regression::{CoefficientTensor, ManifoldLmError};
use ndarray::{Array2, ArrayView1, Axis};

/// Result of `GroupedManifoldLm::fit`.
#[derive(Debug, Clone)]
pub struct GrassmannLmFit {
    /// `n_emb x n_features x n_coef` tangent-space coefficients.
    pub beta: CoefficientTensor,
    /// Base point the tangent space was anchored at.
    pub base_point: Array2<f64>,
    /// One row per design group, in group-id order.
    pub reduced_design: Array2<f64>,
    /// Rows per design group; these were the regression weights.
    pub group_sizes: Vec<usize>,
}

impl GrassmannLmFit {
    /// Tangent vector `sum_k beta[.., .., k] * covariates[k]` at the base point.
    pub fn tangent_at(&self, covariates: ArrayView1<'_, f64>) -> Result<Array2<f64>, ManifoldLmError> {
        let n_coef = self.beta.len_of(Axis(2));
        if covariates.len() != n_coef {
            return Err(ManifoldLmError::ShapeMismatch(format!(
                "{} covariates supplied to a model with {} coefficients",
                covariates.len(),
                n_coef
            )));
        }
        let (n_emb, n_features, _) = self.beta.dim();
        let mut tangent = Array2::<f64>::zeros((n_emb, n_features));
        for (slice, &x) in self.beta.axis_iter(Axis(2)).zip(covariates.iter()) {
            tangent.scaled_add(x, &slice);
        }
        Ok(tangent)
    }

    /// Predicted subspace for a covariate pattern, as orthonormal rows.
    pub fn subspace_at(&self, covariates: ArrayView1<'_, f64>) -> Result<Array2<f64>, ManifoldLmError> {
        let tangent = self.tangent_at(covariates)?;
        Ok(Grassmann.exp(self.base_point.view(), tangent.view())?)
    }
}
