use itertools::Itertools;
use ndarray::{Array2, ArrayView1, ArrayView2};
use std::cmp::Ordering;

/// Partition of design-matrix rows by exact covariate-pattern equality.
///
/// Group ids run over `0..n_groups()` in the lexicographic order of the distinct patterns,
/// so the grouping does not depend on the order of the input rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroups {
    /// Group id of every input row.
    pub assignment: Vec<usize>,
    /// One representative row per group, in group-id order.
    pub reduced_design: Array2<f64>,
    /// Number of input rows in each group.
    pub sizes: Vec<usize>,
}

// Signed zeros describe the same covariate value.
fn normalize(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

fn compare_patterns(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> Ordering {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| normalize(x).total_cmp(&normalize(y)))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

impl RowGroups {
    pub fn from_design(design: ArrayView2<'_, f64>) -> Self {
        let (n_rows, n_coef) = design.dim();
        let order = (0..n_rows)
            .sorted_by(|&i, &j| compare_patterns(design.row(i), design.row(j)))
            .collect::<Vec<_>>();

        let mut assignment = vec![0usize; n_rows];
        let mut representatives: Vec<usize> = Vec::new();
        let mut sizes: Vec<usize> = Vec::new();

        for &row in &order {
            let starts_group = match representatives.last() {
                Some(&previous) => {
                    compare_patterns(design.row(previous), design.row(row)).is_ne()
                }
                None => true,
            };
            if starts_group {
                representatives.push(row);
                sizes.push(0);
            }
            let group = representatives.len() - 1;
            assignment[row] = group;
            sizes[group] += 1;
        }

        let reduced_design = Array2::from_shape_fn((representatives.len(), n_coef), |(g, c)| {
            normalize(design[[representatives[g], c]])
        });

        Self {
            assignment,
            reduced_design,
            sizes,
        }
    }

    pub fn n_groups(&self) -> usize {
        self.sizes.len()
    }

    /// Row indices of every group, indexed by group id.
    pub fn members(&self) -> Vec<Vec<usize>> {
        let mut members: Vec<Vec<usize>> = self
            .sizes
            .iter()
            .map(|&size| Vec::with_capacity(size))
            .collect();
        for (row, &group) in self.assignment.iter().enumerate() {
            members[group].push(row);
        }
        members
    }

    /// Smallest group as `(group id, size)`, or `None` when there are no rows.
    pub fn smallest_group(&self) -> Option<(usize, usize)> {
        self.sizes
            .iter()
            .copied()
            .enumerate()
            .min_by_key(|&(_, size)| size)
    }
}
