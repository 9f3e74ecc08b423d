//! Block partitioning of a GEMM problem.
//!
//! The output is cut into `block_size x block_size` tiles (clipped at the
//! right and bottom edges). Tiles are the unit of parallel work: they never
//! overlap, so each one can be accumulated into without synchronisation.
//! The contraction dimension is walked in `block_size` chunks inside a tile.

use crate::error::{GemmError, Result};
use crate::kernel::Kernel;
use crate::view::MatrixRef;

/// Check that op(A)·op(B) fits a `c_rows x c_cols` output and return its
/// `(m, n, k)`.
///
/// # Errors
/// Returns `GemmError::Dimension` if the contraction lengths of op(A) and
/// op(B) differ or C is not `m x n`.
pub fn conform(
    kernel: Kernel,
    a: &MatrixRef<'_>,
    b: &MatrixRef<'_>,
    c_rows: usize,
    c_cols: usize,
) -> Result<(usize, usize, usize)> {
    let (m, k) = kernel.op_a().apply(a.rows(), a.cols());
    let (k2, n) = kernel.op_b().apply(b.rows(), b.cols());
    if k != k2 || c_rows != m || c_cols != n {
        return Err(GemmError::Dimension {
            m,
            k,
            k2,
            n,
            c_rows,
            c_cols,
        });
    }
    Ok((m, n, k))
}

/// Top-left corner of an output tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub i0: usize,
    pub j0: usize,
}

/// Partition of one GEMM call into output tiles and contraction chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockPlan {
    /// Length of the shared dimension summed over.
    pub contraction_len: usize,
    /// Rows of op(A) and of C.
    pub out_rows: usize,
    /// Columns of op(B) and of C.
    pub out_cols: usize,
    pub block_size: usize,
}

impl BlockPlan {
    /// Plan the product op(A)·op(B) for operands stored as `a` and `b`.
    ///
    /// Operands are expected to have passed [`conform`].
    pub fn new(a: &MatrixRef<'_>, b: &MatrixRef<'_>, kernel: Kernel, block_size: usize) -> Self {
        let (out_rows, contraction_len) = kernel.op_a().apply(a.rows(), a.cols());
        let (_, out_cols) = kernel.op_b().apply(b.rows(), b.cols());
        debug_assert_eq!(kernel.op_b().apply(b.rows(), b.cols()).0, contraction_len);
        BlockPlan {
            contraction_len,
            out_rows,
            out_cols,
            block_size,
        }
    }

    pub fn row_blocks(&self) -> usize {
        self.out_rows.div_ceil(self.block_size)
    }

    pub fn col_blocks(&self) -> usize {
        self.out_cols.div_ceil(self.block_size)
    }

    /// Number of output tiles that can be computed independently.
    pub fn parallel_blocks(&self) -> usize {
        self.row_blocks() * self.col_blocks()
    }

    /// Every output tile exactly once, in row-major tile order.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> {
        let bs = self.block_size;
        let out_cols = self.out_cols;
        (0..self.out_rows)
            .step_by(bs)
            .flat_map(move |i0| (0..out_cols).step_by(bs).map(move |j0| Tile { i0, j0 }))
    }

    /// (rows, cols) of `tile`, clipped at the matrix edge.
    pub fn tile_extent(&self, tile: Tile) -> (usize, usize) {
        debug_assert!(tile.i0 < self.out_rows && tile.j0 < self.out_cols);
        (
            self.block_size.min(self.out_rows - tile.i0),
            self.block_size.min(self.out_cols - tile.j0),
        )
    }

    /// `(k0, len)` for each contraction chunk, in order.
    pub fn chunks(&self) -> impl Iterator<Item = (usize, usize)> {
        let bs = self.block_size;
        let total = self.contraction_len;
        (0..total).step_by(bs).map(move |k0| (k0, bs.min(total - k0)))
    }
}
