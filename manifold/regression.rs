//! Geodesic regression on the Grassmann manifold.
//!
//! Manifold-valued responses are linearized with the logarithmic map at a caller supplied
//! base point, regressed on the covariates with a weighted ridge solve in that tangent
//! space, and the coefficients are returned as an `n_emb x n_features x n_coef` tensor.
//! `Exp_base(sum_k beta[.., .., k] * x_k)` is the fitted subspace for covariates `x`.

use super::config::{ConfigError, RegressionConfig};
use super::grassmann::{Grassmann, GrassmannGeometry};
use super::groups::RowGroups;
use super::linalg::{NumericalError, ensure_finite};
use super::model::GrassmannLmFit;
use super::ridge::{RidgeRegression, RidgeSolver};
use super::subspace::{PcaSubspaceFitter, SubspaceFitter};
use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis};
use rayon::prelude::*;
use thiserror::Error;

/// Linear map from one unit of each covariate to a tangent displacement at the base point,
/// indexed `[embedding, feature, coefficient]`.
pub type CoefficientTensor = Array3<f64>;

#[derive(Debug, Error)]
pub enum ManifoldLmError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error(
        "Too few observations in design matrix group {group}: {size} rows, but a rank-{n_emb} subspace needs at least {n_emb}"
    )]
    InsufficientData {
        group: usize,
        size: usize,
        n_emb: usize,
    },

    #[error("Weight {index} is {value}; weights must be finite and non-negative")]
    InvalidWeight { index: usize, value: f64 },

    #[error("Numerical failure: {0}")]
    NumericalFailure(#[from] NumericalError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

// Evaluates `task(0..count)` and returns the results in index order regardless of scheduling.
fn map_in_order<T, F>(parallel: bool, count: usize, task: F) -> Result<Vec<T>, NumericalError>
where
    T: Send,
    F: Fn(usize) -> Result<T, NumericalError> + Sync + Send,
{
    if parallel {
        (0..count).into_par_iter().map(&task).collect()
    } else {
        (0..count).map(&task).collect()
    }
}

/// Tangent-space least squares for pre-computed coordinate systems.
#[derive(Debug, Clone)]
pub struct GeodesicRegression<G = Grassmann, R = RidgeRegression> {
    geometry: G,
    solver: R,
    parallel: bool,
}

impl GeodesicRegression {
    pub fn new(config: &RegressionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            geometry: Grassmann,
            solver: RidgeRegression::new(config.ridge_penalty)?,
            parallel: config.parallel,
        })
    }
}

impl<G: GrassmannGeometry, R: RidgeSolver> GeodesicRegression<G, R> {
    pub fn with_backends(geometry: G, solver: R, parallel: bool) -> Self {
        Self {
            geometry,
            solver,
            parallel,
        }
    }

    /// Fits `beta` such that `Exp_base(sum_k beta[.., .., k] * design[j, k])` approximates
    /// `coord_systems[j]` in the weighted least-squares sense.
    ///
    /// # Arguments
    /// * `coord_systems`: one `n_emb x n_features` orthonormal-row matrix per design row.
    /// * `design`: `n_obs x n_coef` covariates.
    /// * `base_point`: `n_emb x n_features` point anchoring the tangent space.
    /// * `weights`: optional non-negative per-observation weights; all ones when `None`.
    ///
    /// With zero observations the regression is skipped and the all-zero tensor is returned.
    pub fn fit(
        &self,
        coord_systems: &[Array2<f64>],
        design: ArrayView2<'_, f64>,
        base_point: ArrayView2<'_, f64>,
        weights: Option<ArrayView1<'_, f64>>,
    ) -> Result<CoefficientTensor, ManifoldLmError> {
        let (n_obs, n_coef) = design.dim();
        let (n_emb, n_features) = base_point.dim();

        if coord_systems.len() != n_obs {
            return Err(ManifoldLmError::ShapeMismatch(format!(
                "{} coordinate systems supplied for a design matrix with {} rows",
                coord_systems.len(),
                n_obs
            )));
        }
        if let Some(index) = coord_systems
            .iter()
            .position(|coords| coords.dim() != base_point.dim())
        {
            return Err(ManifoldLmError::ShapeMismatch(format!(
                "coordinate system {} has shape {:?} but the base point has shape {:?}",
                index,
                coord_systems[index].dim(),
                base_point.dim()
            )));
        }
        let weights = match weights {
            Some(w) if w.len() != n_obs => {
                return Err(ManifoldLmError::ShapeMismatch(format!(
                    "{} weights supplied for {} observations",
                    w.len(),
                    n_obs
                )));
            }
            Some(w) => w.to_owned(),
            None => Array1::ones(n_obs),
        };
        if let Some((index, &value)) = weights
            .iter()
            .enumerate()
            .find(|&(_, &w)| !w.is_finite() || w < 0.0)
        {
            return Err(ManifoldLmError::InvalidWeight { index, value });
        }

        log::info!(
            "Geodesic regression: {} observations, {} coefficients, Gr({}, {})",
            n_obs,
            n_coef,
            n_emb,
            n_features
        );

        let tangents = map_in_order(self.parallel, n_obs, |i| {
            self.geometry.log(base_point, coord_systems[i].view())
        })?;

        let width = n_emb * n_features;
        let coefficients = if n_obs == 0 {
            log::debug!("No observations; returning the zero coefficient tensor");
            Array2::zeros((n_coef, width))
        } else {
            let mut stacked = Array2::<f64>::zeros((n_obs, width));
            for (i, tangent) in tangents.iter().enumerate() {
                for (dst, &src) in stacked.row_mut(i).iter_mut().zip(tangent.iter()) {
                    *dst = src;
                }
            }
            self.solver.solve(stacked.view(), design, weights.view())?
        };

        if coefficients.dim() != (n_coef, width) {
            return Err(NumericalError::DimensionMismatch(format!(
                "ridge solver returned shape {:?}, expected ({}, {})",
                coefficients.dim(),
                n_coef,
                width
            ))
            .into());
        }
        ensure_finite(&coefficients, "ridge solve")?;

        Ok(Array3::from_shape_fn(
            (n_emb, n_features, n_coef),
            |(e, f, c)| coefficients[[c, e * n_features + f]],
        ))
    }
}

/// Fits the geodesic regression directly from raw observations and a possibly redundant
/// design matrix, using one subspace per distinct covariate pattern.
#[derive(Debug, Clone)]
pub struct GroupedManifoldLm<F = PcaSubspaceFitter, G = Grassmann, R = RidgeRegression> {
    fitter: F,
    regression: GeodesicRegression<G, R>,
}

impl GroupedManifoldLm {
    pub fn new(config: &RegressionConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            fitter: PcaSubspaceFitter,
            regression: GeodesicRegression::new(config)?,
        })
    }
}

impl<F, G, R> GroupedManifoldLm<F, G, R>
where
    F: SubspaceFitter,
    G: GrassmannGeometry,
    R: RidgeSolver,
{
    pub fn with_backends(fitter: F, regression: GeodesicRegression<G, R>) -> Self {
        Self { fitter, regression }
    }

    /// # Arguments
    /// * `y`: `n_samples x n_features` raw data.
    /// * `design_matrix`: `n_samples x n_coef`; identical rows form one group.
    /// * `base_point`: `n_emb x n_features`.
    ///
    /// Every group must contain at least `n_emb` rows; this is checked before any subspace
    /// is fitted. Group subspaces pass through the origin and each group is weighted by its
    /// row count.
    pub fn fit(
        &self,
        y: ArrayView2<'_, f64>,
        design_matrix: ArrayView2<'_, f64>,
        base_point: ArrayView2<'_, f64>,
    ) -> Result<GrassmannLmFit, ManifoldLmError> {
        let (n_emb, n_features) = base_point.dim();
        if y.nrows() != design_matrix.nrows() {
            return Err(ManifoldLmError::ShapeMismatch(format!(
                "data has {} rows but the design matrix has {}",
                y.nrows(),
                design_matrix.nrows()
            )));
        }
        if y.ncols() != n_features {
            return Err(ManifoldLmError::ShapeMismatch(format!(
                "data has {} features but the base point has {}",
                y.ncols(),
                n_features
            )));
        }
        if n_emb > n_features {
            return Err(ManifoldLmError::ShapeMismatch(format!(
                "embedding dimension {} exceeds the {} available features",
                n_emb, n_features
            )));
        }

        let groups = RowGroups::from_design(design_matrix);
        if let Some((group, size)) = groups.smallest_group() {
            if size < n_emb {
                return Err(ManifoldLmError::InsufficientData { group, size, n_emb });
            }
        }
        log::info!(
            "Grouped manifold LM: {} samples in {} design groups",
            y.nrows(),
            groups.n_groups()
        );
        log::debug!("Design group sizes: {:?}", groups.sizes);

        let members = groups.members();
        let coord_systems = map_in_order(self.regression.parallel, members.len(), |g| {
            let block = y.select(Axis(0), &members[g]);
            self.fitter.fit(block.view(), n_emb, false)
        })?;

        let weights = groups.sizes.iter().map(|&size| size as f64).collect::<Array1<f64>>();
        let beta = self.regression.fit(
            &coord_systems,
            groups.reduced_design.view(),
            base_point,
            Some(weights.view()),
        )?;

        Ok(GrassmannLmFit {
            beta,
            base_point: base_point.to_owned(),
            reduced_design: groups.reduced_design,
            group_sizes: groups.sizes,
        })
    }
}

/// `GeodesicRegression` with the default backends and configuration.
pub fn grassmann_geodesic_regression(
    coord_systems: &[Array2<f64>],
    design: ArrayView2<'_, f64>,
    base_point: ArrayView2<'_, f64>,
    weights: Option<ArrayView1<'_, f64>>,
) -> Result<CoefficientTensor, ManifoldLmError> {
    GeodesicRegression::new(&RegressionConfig::default())?.fit(
        coord_systems,
        design,
        base_point,
        weights,
    )
}

/// `GroupedManifoldLm` with the default backends and configuration; returns `beta` only.
pub fn grassmann_lm(
    y: ArrayView2<'_, f64>,
    design_matrix: ArrayView2<'_, f64>,
    base_point: ArrayView2<'_, f64>,
) -> Result<CoefficientTensor, ManifoldLmError> {
    let fit = GroupedManifoldLm::new(&RegressionConfig::default())?.fit(
        y,
        design_matrix,
        base_point,
    )?;
    Ok(fit.beta)
}
