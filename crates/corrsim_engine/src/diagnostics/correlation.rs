//! Sample correlation matrices of a batch's columns.

use corrsim_core::types::DomainError;

use crate::batch::SampleBatch;

/// Pearson (linear) correlation matrix of the batch's columns, row-major
/// `dim × dim`.
///
/// A constant column has undefined correlation; its off-diagonal entries are
/// NaN.
///
/// # Errors
///
/// `EmptyInput` for a batch with fewer than two paths.
pub fn pearson_matrix(batch: &SampleBatch) -> Result<Vec<f64>, DomainError> {
    if batch.paths() < 2 {
        return Err(DomainError::EmptyInput {
            what: "a correlation matrix",
        });
    }
    let columns = (0..batch.dim())
        .map(|j| batch.column(j))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(matrix_of(&columns))
}

/// Spearman (rank) correlation matrix: Pearson correlation of the columns'
/// ranks, with ties given their average rank.
///
/// # Errors
///
/// `EmptyInput` for a batch with fewer than two paths.
///
/// # Examples
///
/// ```
/// use corrsim_engine::batch::SampleBatch;
/// use corrsim_engine::diagnostics::spearman_matrix;
///
/// // Monotone but non-linear relationship: rank correlation is exactly 1.
/// let batch = SampleBatch::from_vec(4, 2, vec![1.0, 1.0, 2.0, 8.0, 3.0, 27.0, 4.0, 64.0]).unwrap();
/// let rho = spearman_matrix(&batch).unwrap();
/// assert!((rho[1] - 1.0).abs() < 1e-12);
/// ```
pub fn spearman_matrix(batch: &SampleBatch) -> Result<Vec<f64>, DomainError> {
    if batch.paths() < 2 {
        return Err(DomainError::EmptyInput {
            what: "a correlation matrix",
        });
    }
    let ranked = (0..batch.dim())
        .map(|j| batch.column(j).map(|column| average_ranks(&column)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(matrix_of(&ranked))
}

/// 1-based ranks; tied values share the mean of the ranks they span.
pub fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_unstable_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // Positions start..end hold ranks start+1..=end.
        let rank = (start + end + 1) as f64 / 2.0;
        for &index in &order[start..end] {
            ranks[index] = rank;
        }
        start = end;
    }
    ranks
}

fn matrix_of(columns: &[Vec<f64>]) -> Vec<f64> {
    let dim = columns.len();
    let standardised: Vec<Vec<f64>> = columns.iter().map(|c| centre(c)).collect();

    let mut matrix = vec![0.0; dim * dim];
    for i in 0..dim {
        matrix[i * dim + i] = 1.0;
        for j in 0..i {
            let r = correlation(&standardised[i], &standardised[j]);
            matrix[i * dim + j] = r;
            matrix[j * dim + i] = r;
        }
    }
    matrix
}

fn centre(values: &[f64]) -> Vec<f64> {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    values.iter().map(|x| x - mean).collect()
}

fn correlation(a: &[f64], b: &[f64]) -> f64 {
    let (mut ab, mut aa, mut bb) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        ab += x * y;
        aa += x * x;
        bb += y * y;
    }
    let r = ab / (aa * bb).sqrt();
    if r.is_nan() {
        r
    } else {
        r.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_average_ranks_with_ties() {
        assert_eq!(average_ranks(&[10.0, 30.0, 20.0]), vec![1.0, 3.0, 2.0]);
        assert_eq!(
            average_ranks(&[5.0, 1.0, 5.0, 5.0, 0.0]),
            vec![4.0, 2.0, 4.0, 4.0, 1.0]
        );
    }

    #[test]
    fn test_pearson_perfect_linear() {
        let batch =
            SampleBatch::from_vec(3, 3, vec![1.0, 2.0, 3.0, 2.0, 4.0, 1.0, 3.0, 6.0, -1.0]).unwrap();
        let r = pearson_matrix(&batch).unwrap();
        assert_relative_eq!(r[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(r[2], -1.0, epsilon = 1e-12);
        assert_eq!(r[4], 1.0);
        assert_eq!(r[3], r[1]);
    }

    #[test]
    fn test_spearman_vs_pearson_nonlinear() {
        let xs: Vec<f64> = (1..=20).map(f64::from).collect();
        let data: Vec<f64> = xs.iter().flat_map(|&x| [x, x.exp()]).collect();
        let batch = SampleBatch::from_vec(20, 2, data).unwrap();

        let pearson = pearson_matrix(&batch).unwrap();
        let spearman = spearman_matrix(&batch).unwrap();
        assert_relative_eq!(spearman[1], 1.0, epsilon = 1e-12);
        assert!(pearson[1] < 0.9);
    }

    #[test]
    fn test_constant_column_is_nan() {
        let batch = SampleBatch::from_vec(3, 2, vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0]).unwrap();
        assert!(pearson_matrix(&batch).unwrap()[1].is_nan());
    }

    #[test]
    fn test_too_few_paths() {
        let batch = SampleBatch::zeros(1, 2);
        assert!(matches!(
            spearman_matrix(&batch),
            Err(DomainError::EmptyInput { .. })
        ));
    }
}
