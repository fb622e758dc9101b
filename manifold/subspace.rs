use super::linalg::{NumericalError, leading_right_singular_vectors};
use ndarray::{Array2, ArrayView2, Axis};

/// Computes a rank-`rank` orthonormal basis (a Grassmann point) that best fits a data block.
pub trait SubspaceFitter: Sync {
    /// Returns a `rank x n_features` matrix with orthonormal rows spanning the dominant
    /// subspace of `block`. With `center == false` the subspace passes through the origin.
    fn fit(
        &self,
        block: ArrayView2<'_, f64>,
        rank: usize,
        center: bool,
    ) -> Result<Array2<f64>, NumericalError>;
}

/// Exact PCA via a dense SVD of the (optionally centered) block.
#[derive(Debug, Clone, Copy, Default)]
pub struct PcaSubspaceFitter;

impl SubspaceFitter for PcaSubspaceFitter {
    fn fit(
        &self,
        block: ArrayView2<'_, f64>,
        rank: usize,
        center: bool,
    ) -> Result<Array2<f64>, NumericalError> {
        let (rows, cols) = block.dim();
        if rank > rows || rank > cols {
            return Err(NumericalError::RankExceedsBlock { rank, rows, cols });
        }

        let coords = if center && rows > 0 {
            match block.mean_axis(Axis(0)) {
                Some(means) => {
                    let centered = &block - &means;
                    leading_right_singular_vectors(&centered, rank)?
                }
                None => leading_right_singular_vectors(&block, rank)?,
            }
        } else {
            leading_right_singular_vectors(&block, rank)?
        };

        log::trace!(
            "Fitted rank-{} subspace to a {}x{} block (centered: {})",
            rank,
            rows,
            cols,
            center
        );
        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifold::grassmann::projector;
    use crate::manifold::test_support::assert_matrix_close;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn recovers_plane_spanned_by_data() {
        // Every row lies in span{(1, 1, 0), (0, 0, 1)}.
        let block = array![
            [1.0, 1.0, 0.0],
            [0.0, 0.0, 2.0],
            [2.0, 2.0, -1.0],
            [-1.0, -1.0, 3.0],
        ];
        let coords = PcaSubspaceFitter.fit(block.view(), 2, false).unwrap();
        assert_eq!(coords.dim(), (2, 3));
        assert_matrix_close(&coords.dot(&coords.t()), &Array2::eye(2), 1e-12);

        let half = 0.5;
        let expected = array![[half, half, 0.0], [half, half, 0.0], [0.0, 0.0, 1.0]];
        assert_matrix_close(&projector(coords.view()), &expected, 1e-12);
    }

    #[test]
    fn uncentered_fit_follows_the_mean_direction() {
        let block = array![
            [10.0, 0.1, 0.0],
            [10.0, -0.1, 0.0],
            [10.0, 0.0, 0.1],
            [10.0, 0.0, -0.1],
        ];
        let uncentered = PcaSubspaceFitter.fit(block.view(), 1, false).unwrap();
        assert_abs_diff_eq!(uncentered[[0, 0]].abs(), 1.0, epsilon = 1e-6);

        let centered = PcaSubspaceFitter.fit(block.view(), 1, true).unwrap();
        assert_abs_diff_eq!(centered[[0, 0]].abs(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn rank_larger_than_block_is_an_error() {
        let block = array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let err = PcaSubspaceFitter.fit(block.view(), 3, false).unwrap_err();
        assert!(matches!(
            err,
            NumericalError::RankExceedsBlock {
                rank: 3,
                rows: 2,
                cols: 3
            }
        ));
    }
}
