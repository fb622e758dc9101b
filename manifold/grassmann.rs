//! Geometry of the Grassmann manifold `Gr(n_emb, n_features)`.
//!
//! Points are `n_emb x n_features` matrices with orthonormal rows; the subspace is the row
//! space. Tangent vectors at a point `P` have the same shape and satisfy `P * X^T = 0`.

use super::linalg::{NumericalError, ensure_finite, least_squares, thin_svd};
use ndarray::{Array2, ArrayView2};

/// Logarithmic and exponential maps on the Grassmann manifold.
///
/// Implementations must be `Sync` so that per-observation evaluations can be spread over
/// the rayon pool.
pub trait GrassmannGeometry: Sync {
    /// Tangent vector at `base` whose geodesic reaches `point`.
    fn log(
        &self,
        base: ArrayView2<'_, f64>,
        point: ArrayView2<'_, f64>,
    ) -> Result<Array2<f64>, NumericalError>;

    /// Point reached by following the geodesic from `base` along `tangent` for unit time.
    fn exp(
        &self,
        base: ArrayView2<'_, f64>,
        tangent: ArrayView2<'_, f64>,
    ) -> Result<Array2<f64>, NumericalError>;
}

/// Closed-form SVD based maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct Grassmann;

fn check_same_shape(
    base: ArrayView2<'_, f64>,
    other: ArrayView2<'_, f64>,
    what: &str,
) -> Result<(), NumericalError> {
    if base.dim() != other.dim() {
        return Err(NumericalError::DimensionMismatch(format!(
            "{what} has shape {:?} but the base point has shape {:?}",
            other.dim(),
            base.dim()
        )));
    }
    Ok(())
}

impl GrassmannGeometry for Grassmann {
    fn log(
        &self,
        base: ArrayView2<'_, f64>,
        point: ArrayView2<'_, f64>,
    ) -> Result<Array2<f64>, NumericalError> {
        check_same_shape(base, point, "point")?;
        let (n_emb, n_features) = base.dim();
        if n_emb == 0 || n_features == 0 {
            return Ok(Array2::zeros(base.dim()));
        }

        // z = Q P^T, then B = z^{-1} (Q - z P); the singular values of B are tan(theta).
        let overlap = point.dot(&base.t());
        let residual = &point - &overlap.dot(&base);
        let slope = least_squares(&overlap, &residual)?;
        let (u, tangents, vt) = thin_svd(&slope)?;

        let angles = tangents.mapv(f64::atan);
        let tangent = (&u * &angles).dot(&vt);
        ensure_finite(&tangent, "Grassmann log map")?;
        Ok(tangent)
    }

    fn exp(
        &self,
        base: ArrayView2<'_, f64>,
        tangent: ArrayView2<'_, f64>,
    ) -> Result<Array2<f64>, NumericalError> {
        check_same_shape(base, tangent, "tangent vector")?;
        let (n_emb, n_features) = base.dim();
        if n_emb == 0 || n_features == 0 {
            return Ok(base.to_owned());
        }
        ensure_finite(&tangent, "Grassmann exp map input")?;

        let (u, angles, vt) = thin_svd(&tangent)?;
        let cosines = angles.mapv(f64::cos);
        let sines = angles.mapv(f64::sin);

        let along_base = (&u * &cosines).dot(&u.t()).dot(&base);
        let orthogonal = (&u * &sines).dot(&vt);
        let point = along_base + orthogonal;
        ensure_finite(&point, "Grassmann exp map")?;
        Ok(point)
    }
}

/// Orthogonal projector `U^T U` onto the row space of `coords`.
///
/// Two coordinate systems describe the same subspace exactly when their projectors agree.
pub fn projector(coords: ArrayView2<'_, f64>) -> Array2<f64> {
    coords.t().dot(&coords)
}

/// Riemannian distance `||Log_P(Q)||_F`, i.e. the 2-norm of the principal angles.
pub fn geodesic_distance<G: GrassmannGeometry + ?Sized>(
    geometry: &G,
    base: ArrayView2<'_, f64>,
    point: ArrayView2<'_, f64>,
) -> Result<f64, NumericalError> {
    let tangent = geometry.log(base, point)?;
    Ok(tangent.iter().map(|v| v * v).sum::<f64>().sqrt())
}
