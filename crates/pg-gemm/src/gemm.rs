//! GEMM entry points: C := beta * C + alpha * op(A) * op(B).
//!
//! All validation happens before C is touched, so a rejected call leaves C
//! exactly as it was.

use crate::config::GemmConfig;
use crate::error::{GemmError, Result};
use crate::general::General;
use crate::kernel::Kernel;
use crate::plan;
use crate::scheduler::{self, Dispatch};
use crate::transpose::Transpose;
use crate::view::{MatrixMut, MatrixRef};

/// Multiply strided views with the default configuration.
///
/// `a` and `b` are given as stored; `t_a` and `t_b` say whether each enters
/// the product transposed.
///
/// # Errors
/// Returns `GemmError::Dimension` if op(A), op(B) and C do not conform.
pub fn multiply(
    t_a: Transpose,
    t_b: Transpose,
    alpha: f64,
    a: MatrixRef<'_>,
    b: MatrixRef<'_>,
    beta: f64,
    c: &mut MatrixMut<'_>,
) -> Result<()> {
    multiply_with_config(&GemmConfig::default(), t_a, t_b, alpha, a, b, beta, c).map(|_| ())
}

/// [`multiply`] with explicit blocking constants. Returns how the product
/// was dispatched.
#[allow(clippy::too_many_arguments)]
pub fn multiply_with_config(
    config: &GemmConfig,
    t_a: Transpose,
    t_b: Transpose,
    alpha: f64,
    a: MatrixRef<'_>,
    b: MatrixRef<'_>,
    beta: f64,
    c: &mut MatrixMut<'_>,
) -> Result<Dispatch> {
    config.validate()?;

    let kernel = Kernel::select(t_a, t_b);
    let (m, n, k) = plan::conform(kernel, &a, &b, c.rows(), c.cols())?;

    if m == 0 || n == 0 {
        return Ok(Dispatch::Skipped);
    }

    scale(c, beta);

    if alpha == 0.0 || k == 0 {
        log::trace!("gemm {}x{}x{}: no product to accumulate", m, n, k);
        return Ok(Dispatch::Skipped);
    }

    scheduler::execute(kernel, a, b, c, alpha, config)
}

/// C := beta * C. `beta == 0` overwrites, so NaN or Inf in C never survive.
fn scale(c: &mut MatrixMut<'_>, beta: f64) {
    if beta == 1.0 {
        return;
    }
    for i in 0..c.rows() {
        let row = c.row_mut(i);
        if beta == 0.0 {
            row.fill(0.0);
        } else {
            for v in row.iter_mut() {
                *v *= beta;
            }
        }
    }
}

/// BLAS-style DGEMM over raw row-major buffers.
///
/// op(A) is `m x k`, op(B) is `k x n` and C is `m x n`. `lda`, `ldb` and
/// `ldc` are the row pitches of the buffers as stored.
///
/// # Errors
/// - `GemmError::LeadingDimension` if a leading dimension is smaller than
///   the stored row length.
/// - `GemmError::Dimension` if op(A), op(B) and C do not conform.
/// - `GemmError::Shape` if a buffer is too short for its matrix.
#[allow(clippy::too_many_arguments)]
pub fn dgemm(
    t_a: Transpose,
    t_b: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: f64,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    beta: f64,
    c: &mut [f64],
    ldc: usize,
) -> Result<()> {
    dgemm_with_config(
        &GemmConfig::default(),
        t_a,
        t_b,
        m,
        n,
        k,
        alpha,
        a,
        lda,
        b,
        ldb,
        beta,
        c,
        ldc,
    )
    .map(|_| ())
}

/// [`dgemm`] with explicit blocking constants.
#[allow(clippy::too_many_arguments)]
pub fn dgemm_with_config(
    config: &GemmConfig,
    t_a: Transpose,
    t_b: Transpose,
    m: usize,
    n: usize,
    k: usize,
    alpha: f64,
    a: &[f64],
    lda: usize,
    b: &[f64],
    ldb: usize,
    beta: f64,
    c: &mut [f64],
    ldc: usize,
) -> Result<Dispatch> {
    let (a_rows, a_cols) = t_a.apply(m, k);
    let (b_rows, b_cols) = t_b.apply(k, n);
    check_leading_dim("lda", lda, a_cols)?;
    check_leading_dim("ldb", ldb, b_cols)?;
    check_leading_dim("ldc", ldc, n)?;

    let a = MatrixRef::new(a, a_rows, a_cols, lda)?;
    let b = MatrixRef::new(b, b_rows, b_cols, ldb)?;
    let mut c = MatrixMut::new(c, m, n, ldc)?;
    multiply_with_config(config, t_a, t_b, alpha, a, b, beta, &mut c)
}

fn check_leading_dim(name: &'static str, ld: usize, row_len: usize) -> Result<()> {
    if ld < row_len {
        return Err(GemmError::LeadingDimension { name, ld, row_len });
    }
    Ok(())
}

/// GEMM over owned matrices; (m, n, k) are taken from the operand shapes.
///
/// # Errors
/// Returns `GemmError::Dimension` if the shapes do not conform.
pub fn gemm(
    t_a: Transpose,
    t_b: Transpose,
    alpha: f64,
    a: &General,
    b: &General,
    beta: f64,
    c: &mut General,
) -> Result<()> {
    multiply(t_a, t_b, alpha, a.as_view(), b.as_view(), beta, &mut c.as_view_mut())
}
