use crate::types::Matrix;

use super::descriptive::mean;

/// Minimum paired observations for a non-zero correlation estimate.
pub const MIN_CORRELATION_OBSERVATIONS: usize = 10;

/// Off-diagonal entries are clamped into `[-MAX_CORRELATION, MAX_CORRELATION]`.
pub const MAX_CORRELATION: f64 = 0.99;

/// Upper bound on the sum of absolute off-diagonal entries in one row.
pub const MAX_ROW_ABS_SUM: f64 = 0.95;

/// Pearson correlation over the most recent common observations, clamped to
/// `[-0.99, 0.99]`. Returns 0 with fewer than ten pairs or zero variance.
pub fn robust_correlation(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < MIN_CORRELATION_OBSERVATIONS {
        return 0.0;
    }
    let x = &x[x.len() - n..];
    let y = &y[y.len() - n..];

    let mx = mean(x);
    let my = mean(y);
    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        let dx = a - mx;
        let dy = b - my;
        cov += dx * dy;
        vx += dx * dx;
        vy += dy * dy;
    }
    let denom = (vx * vy).sqrt();
    if denom <= 0.0 || !denom.is_finite() {
        return 0.0;
    }
    (cov / denom).clamp(-MAX_CORRELATION, MAX_CORRELATION)
}

/// Build the pairwise robust correlation matrix and regularize it.
pub fn calculate_robust_correlation_matrix(returns: &[Vec<f64>]) -> Matrix {
    let n = returns.len();
    let mut corr = vec![vec![0.0; n]; n];
    for i in 0..n {
        corr[i][i] = 1.0;
        for j in (i + 1)..n {
            let rho = robust_correlation(&returns[i], &returns[j]);
            corr[i][j] = rho;
            corr[j][i] = rho;
        }
    }
    regularize_correlation_matrix(&corr)
}

/// Return a regularized copy of a correlation matrix.
///
/// The diagonal is forced to 1 and off-diagonals clamped to ±0.99. Any row
/// whose absolute off-diagonal sum exceeds 0.95 is scaled down to 0.95,
/// which makes the matrix strictly diagonally dominant and therefore safe to
/// factor. The result is symmetrized by taking the smaller magnitude of each
/// mirrored pair.
#[allow(clippy::needless_range_loop)]
pub fn regularize_correlation_matrix(matrix: &[Vec<f64>]) -> Matrix {
    let n = matrix.len();
    let mut out: Matrix = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| {
                    if i == j {
                        1.0
                    } else {
                        let v = matrix[i].get(j).copied().unwrap_or(0.0);
                        if v.is_finite() {
                            v.clamp(-MAX_CORRELATION, MAX_CORRELATION)
                        } else {
                            0.0
                        }
                    }
                })
                .collect()
        })
        .collect();

    for i in 0..n {
        let row_sum: f64 = (0..n).filter(|&j| j != i).map(|j| out[i][j].abs()).sum();
        if row_sum > MAX_ROW_ABS_SUM {
            let scale = MAX_ROW_ABS_SUM / row_sum;
            for j in 0..n {
                if j != i {
                    out[i][j] *= scale;
                }
            }
        }
    }

    for i in 0..n {
        for j in (i + 1)..n {
            let v = if out[i][j].abs() <= out[j][i].abs() {
                out[i][j]
            } else {
                out[j][i]
            };
            out[i][j] = v;
            out[j][i] = v;
        }
    }
    out
}
