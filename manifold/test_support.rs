use approx::assert_abs_diff_eq;
use ndarray::{ArrayBase, Data, Dimension};

pub(crate) fn assert_matrix_close<S1, S2, D>(
    actual: &ArrayBase<S1, D>,
    expected: &ArrayBase<S2, D>,
    tolerance: f64,
) where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
    D: Dimension,
{
    assert_eq!(actual.shape(), expected.shape(), "shape mismatch");
    for (&a, &e) in actual.iter().zip(expected.iter()) {
        assert_abs_diff_eq!(a, e, epsilon = tolerance);
    }
}
