#![deny(unused_variables)]
#![deny(dead_code)]
#![deny(unused_imports)]
#![deny(clippy::no_effect_underscore_binding)]

#[path = "../manifold/mod.rs"]
pub mod manifold;

pub use manifold::{
    CoefficientTensor, GeodesicRegression, GrassmannLmFit, GroupedManifoldLm, ManifoldLmError,
    RegressionConfig, grassmann_geodesic_regression, grassmann_lm,
};
