use crate::error::RiskError;
use crate::stats::descriptive::mean;
use crate::types::Matrix;
use crate::RiskResult;

/// Floor applied to Cholesky pivots to absorb small negative round-off.
const PIVOT_FLOOR: f64 = 1e-10;

/// Relative pivot size below which a matrix is treated as singular.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Matrix-vector multiplication.
pub fn mat_vec_multiply(mat: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    mat.iter().map(|row| dot(row, v)).collect()
}

/// Dot product.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn check_square(matrix: &[Vec<f64>], context: &str) -> RiskResult<usize> {
    let n = matrix.len();
    for row in matrix {
        if row.len() != n {
            return Err(RiskError::mismatch(context, n, row.len()));
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(RiskError::NumericalInstability(format!(
                "{context}: matrix contains NaN or infinite entries"
            )));
        }
    }
    Ok(n)
}

/// Lower-triangular Cholesky factor `L` with `L * L^T = matrix`.
///
/// Diagonal entries are `sqrt(max(a_jj - sum, 1e-10))`, so slightly
/// indefinite correlation matrices still factor. Use [`strict_cholesky`]
/// when singularity must be detected.
#[allow(clippy::needless_range_loop)]
pub fn cholesky_decomposition(matrix: &[Vec<f64>]) -> RiskResult<Matrix> {
    let n = check_square(matrix, "cholesky_decomposition")?;
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                l[i][j] = (matrix[i][i] - sum).max(PIVOT_FLOOR).sqrt();
            } else {
                l[i][j] = (matrix[i][j] - sum) / l[j][j];
            }
        }
    }
    Ok(l)
}

/// Cholesky factor that fails with [`RiskError::SingularMatrix`] when a pivot
/// is not positive relative to the matrix scale.
#[allow(clippy::needless_range_loop)]
pub fn strict_cholesky(matrix: &[Vec<f64>]) -> RiskResult<Matrix> {
    let n = check_square(matrix, "strict_cholesky")?;
    let scale = (0..n).map(|i| matrix[i][i].abs()).fold(0.0_f64, f64::max);
    if scale <= 0.0 {
        return Err(RiskError::SingularMatrix(
            "matrix has an all-zero diagonal".into(),
        ));
    }
    let tolerance = scale * SINGULAR_TOLERANCE;
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
            if i == j {
                let pivot = matrix[i][i] - sum;
                if pivot <= tolerance {
                    return Err(RiskError::SingularMatrix(format!(
                        "non-positive pivot {pivot:e} at row {i}"
                    )));
                }
                l[i][j] = pivot.sqrt();
            } else {
                l[i][j] = (matrix[i][j] - sum) / l[j][j];
            }
        }
    }
    Ok(l)
}

/// Solve `L L^T x = b` given the lower factor `L`.
pub fn cholesky_solve(l: &[Vec<f64>], b: &[f64]) -> RiskResult<Vec<f64>> {
    let n = l.len();
    if b.len() != n {
        return Err(RiskError::mismatch("cholesky_solve", n, b.len()));
    }
    let mut y = vec![0.0; n];
    for i in 0..n {
        let sum: f64 = (0..i).map(|k| l[i][k] * y[k]).sum();
        y[i] = (b[i] - sum) / l[i][i];
    }
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let sum: f64 = ((i + 1)..n).map(|k| l[k][i] * x[k]).sum();
        x[i] = (y[i] - sum) / l[i][i];
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(RiskError::NumericalInstability(
            "cholesky_solve produced non-finite values".into(),
        ));
    }
    Ok(x)
}

/// Sample covariance matrix (n - 1 denominator) of equal-length series.
#[allow(clippy::needless_range_loop)]
pub fn covariance_matrix(returns: &[Vec<f64>]) -> Matrix {
    let n = returns.len();
    let means: Vec<f64> = returns.iter().map(|r| mean(r)).collect();
    let mut cov = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in i..n {
            let len = returns[i].len().min(returns[j].len());
            let c = if len < 2 {
                0.0
            } else {
                returns[i][..len]
                    .iter()
                    .zip(returns[j][..len].iter())
                    .map(|(a, b)| (a - means[i]) * (b - means[j]))
                    .sum::<f64>()
                    / (len - 1) as f64
            };
            cov[i][j] = c;
            cov[j][i] = c;
        }
    }
    cov
}

/// `Sigma_ij = rho_ij * sigma_i * sigma_j`.
pub fn correlation_to_covariance(corr: &[Vec<f64>], vols: &[f64]) -> Matrix {
    corr.iter()
        .enumerate()
        .map(|(i, row)| {
            row.iter()
                .enumerate()
                .map(|(j, rho)| rho * vols[i] * vols[j])
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn reconstruct(l: &[Vec<f64>]) -> Matrix {
        let n = l.len();
        (0..n)
            .map(|i| (0..n).map(|j| (0..n).map(|k| l[i][k] * l[j][k]).sum()).collect())
            .collect()
    }

    #[test]
    fn test_identity_factor_is_identity() {
        let eye = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ];
        assert_eq!(cholesky_decomposition(&eye).unwrap(), eye);
    }

    #[test]
    fn test_two_by_two_reconstructs() {
        for rho in [-0.95, -0.4, 0.0, 0.3, 0.8, 0.99] {
            let m = vec![vec![1.0, rho], vec![rho, 1.0]];
            let l = cholesky_decomposition(&m).unwrap();
            assert_eq!(l[0][1], 0.0);
            let back = reconstruct(&l);
            for i in 0..2 {
                for j in 0..2 {
                    assert_abs_diff_eq!(back[i][j], m[i][j], epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_tolerant_factor_survives_semidefinite() {
        let m = vec![vec![1.0, 1.0], vec![1.0, 1.0]];
        let l = cholesky_decomposition(&m).unwrap();
        assert!(l[1][1] > 0.0);
        assert!(strict_cholesky(&m).is_err());
    }

    #[test]
    fn test_non_square_rejected() {
        let m = vec![vec![1.0, 0.0], vec![0.0]];
        assert!(matches!(
            cholesky_decomposition(&m),
            Err(RiskError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_solve_round_trip() {
        let a = vec![
            vec![4.0, 2.0, 0.6],
            vec![2.0, 5.0, 1.0],
            vec![0.6, 1.0, 3.0],
        ];
        let l = strict_cholesky(&a).unwrap();
        let x = cholesky_solve(&l, &[1.0, 2.0, 3.0]).unwrap();
        let ax = mat_vec_multiply(&a, &x);
        assert_abs_diff_eq!(ax[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ax[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ax[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_covariance_matches_hand_computation() {
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let b = vec![2.0, 4.0, 6.0, 8.0];
        let cov = covariance_matrix(&[a, b]);
        assert_abs_diff_eq!(cov[0][0], 5.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cov[0][1], 10.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cov[1][1], 20.0 / 3.0, epsilon = 1e-12);
    }
}
