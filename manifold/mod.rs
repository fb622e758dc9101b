//! Geodesic regression of subspace-valued responses on the Grassmann manifold.
pub mod config;
pub mod grassmann;
pub mod groups;
pub mod linalg;
pub mod model;
pub mod regression;
pub mod ridge;
pub mod subspace;
#[cfg(test)]
mod test_support;

pub use config::{ConfigError, RegressionConfig};
pub use grassmann::{Grassmann, GrassmannGeometry, geodesic_distance, projector};
pub use groups::RowGroups;
pub use linalg::NumericalError;
pub use model::GrassmannLmFit;
pub use regression::{
    CoefficientTensor, GeodesicRegression, GroupedManifoldLm, ManifoldLmError,
    grassmann_geodesic_regression, grassmann_lm,
};
pub use ridge::{RidgeRegression, RidgeSolver};
pub use subspace::{PcaSubspaceFitter, SubspaceFitter};
