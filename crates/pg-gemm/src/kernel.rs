//! Serial inner kernels, one per transpose combination.
//!
//! Each kernel computes `C += alpha * op(A) * op(B)` over views that already
//! satisfy the shape invariants. Loop orders keep the innermost loop on a
//! contiguous row of whichever operand is stored row-wise along it.

use crate::transpose::Transpose;
use crate::view::{MatrixMut, MatrixRef};

/// Kernel variant, resolved once per call from the two transpose flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// C += alpha * A * B
    NotNot,
    /// C += alpha * A^T * B
    TransNot,
    /// C += alpha * A * B^T
    NotTrans,
    /// C += alpha * A^T * B^T
    TransTrans,
}

impl Kernel {
    pub fn select(t_a: Transpose, t_b: Transpose) -> Self {
        match (t_a, t_b) {
            (Transpose::NoTrans, Transpose::NoTrans) => Kernel::NotNot,
            (Transpose::Trans, Transpose::NoTrans) => Kernel::TransNot,
            (Transpose::NoTrans, Transpose::Trans) => Kernel::NotTrans,
            (Transpose::Trans, Transpose::Trans) => Kernel::TransTrans,
        }
    }

    pub fn op_a(self) -> Transpose {
        match self {
            Kernel::NotNot | Kernel::NotTrans => Transpose::NoTrans,
            Kernel::TransNot | Kernel::TransTrans => Transpose::Trans,
        }
    }

    pub fn op_b(self) -> Transpose {
        match self {
            Kernel::NotNot | Kernel::TransNot => Transpose::NoTrans,
            Kernel::NotTrans | Kernel::TransTrans => Transpose::Trans,
        }
    }

    /// Accumulate `alpha * op(a) * op(b)` into `c`. Shapes must already
    /// conform; see [`crate::plan::conform`].
    pub(crate) fn run(self, a: MatrixRef<'_>, b: MatrixRef<'_>, c: &mut MatrixMut<'_>, alpha: f64) {
        match self {
            Kernel::NotNot => not_not(a, b, c, alpha),
            Kernel::TransNot => trans_not(a, b, c, alpha),
            Kernel::NotTrans => not_trans(a, b, c, alpha),
            Kernel::TransTrans => trans_trans(a, b, c, alpha),
        }
    }

    /// Block of A feeding output rows `i0..i0+rows` over contraction `k0..k0+klen`.
    #[inline]
    pub(crate) fn a_block<'a>(
        self,
        a: &MatrixRef<'a>,
        i0: usize,
        rows: usize,
        k0: usize,
        klen: usize,
    ) -> MatrixRef<'a> {
        match self.op_a() {
            Transpose::NoTrans => a.view(i0, k0, rows, klen),
            Transpose::Trans => a.view(k0, i0, klen, rows),
        }
    }

    /// Block of B feeding output cols `j0..j0+cols` over contraction `k0..k0+klen`.
    #[inline]
    pub(crate) fn b_block<'a>(
        self,
        b: &MatrixRef<'a>,
        j0: usize,
        cols: usize,
        k0: usize,
        klen: usize,
    ) -> MatrixRef<'a> {
        match self.op_b() {
            Transpose::NoTrans => b.view(k0, j0, klen, cols),
            Transpose::Trans => b.view(j0, k0, cols, klen),
        }
    }
}

fn not_not(a: MatrixRef<'_>, b: MatrixRef<'_>, c: &mut MatrixMut<'_>, alpha: f64) {
    debug_assert_eq!(a.cols(), b.rows(), "inner dimension mismatch");
    debug_assert_eq!(a.rows(), c.rows(), "outer dimension mismatch");
    debug_assert_eq!(b.cols(), c.cols(), "outer dimension mismatch");

    for i in 0..a.rows() {
        let c_row = c.row_mut(i);
        for (l, &v) in a.row(i).iter().enumerate() {
            let tmp = alpha * v;
            if tmp != 0.0 {
                for (cj, &w) in c_row.iter_mut().zip(b.row(l)) {
                    *cj += tmp * w;
                }
            }
        }
    }
}

fn trans_not(a: MatrixRef<'_>, b: MatrixRef<'_>, c: &mut MatrixMut<'_>, alpha: f64) {
    debug_assert_eq!(a.rows(), b.rows(), "inner dimension mismatch");
    debug_assert_eq!(a.cols(), c.rows(), "outer dimension mismatch");
    debug_assert_eq!(b.cols(), c.cols(), "outer dimension mismatch");

    for l in 0..a.rows() {
        let b_row = b.row(l);
        for (i, &v) in a.row(l).iter().enumerate() {
            let tmp = alpha * v;
            if tmp != 0.0 {
                for (cj, &w) in c.row_mut(i).iter_mut().zip(b_row) {
                    *cj += tmp * w;
                }
            }
        }
    }
}

fn not_trans(a: MatrixRef<'_>, b: MatrixRef<'_>, c: &mut MatrixMut<'_>, alpha: f64) {
    debug_assert_eq!(a.cols(), b.cols(), "inner dimension mismatch");
    debug_assert_eq!(a.rows(), c.rows(), "outer dimension mismatch");
    debug_assert_eq!(b.rows(), c.cols(), "outer dimension mismatch");

    for i in 0..a.rows() {
        let a_row = a.row(i);
        let c_row = c.row_mut(i);
        for (j, cj) in c_row.iter_mut().enumerate() {
            let dot: f64 = a_row.iter().zip(b.row(j)).map(|(&x, &y)| x * y).sum();
            *cj += alpha * dot;
        }
    }
}

fn trans_trans(a: MatrixRef<'_>, b: MatrixRef<'_>, c: &mut MatrixMut<'_>, alpha: f64) {
    debug_assert_eq!(a.rows(), b.cols(), "inner dimension mismatch");
    debug_assert_eq!(a.cols(), c.rows(), "outer dimension mismatch");
    debug_assert_eq!(b.rows(), c.cols(), "outer dimension mismatch");

    for l in 0..a.rows() {
        for (i, &v) in a.row(l).iter().enumerate() {
            let tmp = alpha * v;
            if tmp != 0.0 {
                for (j, cj) in c.row_mut(i).iter_mut().enumerate() {
                    *cj += tmp * b.row(j)[l];
                }
            }
        }
    }
}
