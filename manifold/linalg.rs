use ndarray::{Array1, Array2, ArrayBase, Data, Ix2, s};
use ndarray_linalg::error::LinalgError;
use ndarray_linalg::{LeastSquaresSvd, SVD};
use thiserror::Error;

/// Failures raised by the numerical collaborators (geometry, subspace fitting, ridge solves).
///
/// These are never retried or downgraded by the regression layer; they surface to the
/// caller wrapped in `ManifoldLmError::NumericalFailure`.
#[derive(Debug, Error)]
pub enum NumericalError {
    #[error("LAPACK routine failed: {0}")]
    Linalg(#[from] LinalgError),

    #[error("SVD did not return the requested singular vectors")]
    MissingSingularVectors,

    #[error("Cannot fit a rank-{rank} subspace to a block of {rows} rows and {cols} columns")]
    RankExceedsBlock {
        rank: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Least-squares system has no rows")]
    EmptySystem,

    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("Non-finite values produced by {0}")]
    NonFinite(&'static str),

    #[error("Backend error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Thin singular value decomposition `a = U * diag(s) * Vt`.
///
/// For an `m x n` input with `r = min(m, n)`, returns `U` of shape `m x r`, `s` of length `r`
/// and `Vt` of shape `r x n`. Zero-sized inputs never reach LAPACK.
pub fn thin_svd<S: Data<Elem = f64>>(
    a: &ArrayBase<S, Ix2>,
) -> Result<(Array2<f64>, Array1<f64>, Array2<f64>), NumericalError> {
    let (rows, cols) = a.dim();
    let rank = rows.min(cols);
    if rank == 0 {
        return Ok((
            Array2::zeros((rows, 0)),
            Array1::zeros(0),
            Array2::zeros((0, cols)),
        ));
    }

    let (u, singular, vt) = a.svd(true, true)?;
    let u = u.ok_or(NumericalError::MissingSingularVectors)?;
    let vt = vt.ok_or(NumericalError::MissingSingularVectors)?;

    Ok((
        u.slice(s![.., ..rank]).to_owned(),
        singular,
        vt.slice(s![..rank, ..]).to_owned(),
    ))
}

/// Right singular vectors only, truncated to the leading `count` rows of `Vt`.
pub fn leading_right_singular_vectors<S: Data<Elem = f64>>(
    a: &ArrayBase<S, Ix2>,
    count: usize,
) -> Result<Array2<f64>, NumericalError> {
    let (rows, cols) = a.dim();
    if count > cols || count > rows {
        return Err(NumericalError::RankExceedsBlock {
            rank: count,
            rows,
            cols,
        });
    }
    if count == 0 {
        return Ok(Array2::zeros((0, cols)));
    }

    let (_, _, vt) = a.svd(false, true)?;
    let vt = vt.ok_or(NumericalError::MissingSingularVectors)?;
    Ok(vt.slice(s![..count, ..]).to_owned())
}

/// Minimum-norm least-squares solution of `a * x = b` for a matrix right-hand side.
pub fn least_squares<S1, S2>(
    a: &ArrayBase<S1, Ix2>,
    b: &ArrayBase<S2, Ix2>,
) -> Result<Array2<f64>, NumericalError>
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    if a.nrows() != b.nrows() {
        return Err(NumericalError::DimensionMismatch(format!(
            "least squares: system has {} rows but right-hand side has {}",
            a.nrows(),
            b.nrows()
        )));
    }
    if a.nrows() == 0 {
        return Err(NumericalError::EmptySystem);
    }
    if a.ncols() == 0 || b.ncols() == 0 {
        return Ok(Array2::zeros((a.ncols(), b.ncols())));
    }

    let result = a.least_squares(b)?;
    Ok(result.solution)
}

/// Fails with `NonFinite` if any entry of `values` is NaN or infinite.
pub(crate) fn ensure_finite<S: Data<Elem = f64>>(
    values: &ArrayBase<S, Ix2>,
    origin: &'static str,
) -> Result<(), NumericalError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(NumericalError::NonFinite(origin))
    }
}
