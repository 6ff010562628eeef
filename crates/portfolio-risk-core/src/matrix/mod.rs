//! Dense linear algebra and standard-normal helpers.

pub mod linalg;
pub mod normal;

pub use linalg::{
    cholesky_decomposition, cholesky_solve, correlation_to_covariance, covariance_matrix,
    dot, mat_vec_multiply, strict_cholesky,
};
pub use normal::{box_muller_random, normal_inverse, normal_pdf};
