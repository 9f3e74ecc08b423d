//! Strided row-major views over caller-owned `f64` buffers.
//!
//! A view never owns or copies its elements. Sub-views share the parent's
//! buffer and stride and are offset by a (row, col) origin.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::error::{GemmError, Result};

/// Minimum buffer length holding a `rows x cols` matrix with row pitch `stride`.
pub fn required_len(rows: usize, cols: usize, stride: usize) -> usize {
    if rows == 0 || cols == 0 {
        0
    } else {
        (rows - 1) * stride + cols
    }
}

fn check_layout(len: usize, rows: usize, cols: usize, stride: usize) -> Result<()> {
    let needed = rows
        .checked_sub(1)
        .and_then(|r| r.checked_mul(stride))
        .and_then(|off| off.checked_add(cols));
    let fits = match needed {
        // rows == 0 needs no storage at all.
        None => rows == 0,
        Some(n) => cols == 0 || n <= len,
    };
    if stride < cols || !fits {
        return Err(GemmError::Shape {
            rows,
            cols,
            stride,
            len,
        });
    }
    Ok(())
}

fn check_extent(
    rows: usize,
    cols: usize,
    row0: usize,
    col0: usize,
    n_rows: usize,
    n_cols: usize,
) -> Result<()> {
    let row_end = row0.checked_add(n_rows);
    let col_end = col0.checked_add(n_cols);
    match (row_end, col_end) {
        (Some(re), Some(ce)) if re <= rows && ce <= cols => Ok(()),
        _ => Err(GemmError::OutOfBounds {
            row0,
            col0,
            rows: n_rows,
            cols: n_cols,
            parent_rows: rows,
            parent_cols: cols,
        }),
    }
}

/// A read-only strided matrix view.
#[derive(Clone, Copy)]
pub struct MatrixRef<'a> {
    data: &'a [f64],
    rows: usize,
    cols: usize,
    stride: usize,
}

impl<'a> MatrixRef<'a> {
    /// Wrap `data` as a `rows x cols` matrix with row pitch `stride`.
    ///
    /// # Errors
    /// Returns `GemmError::Shape` if `stride < cols` or `data` is too short.
    pub fn new(data: &'a [f64], rows: usize, cols: usize, stride: usize) -> Result<Self> {
        check_layout(data.len(), rows, cols, stride)?;
        let len = required_len(rows, cols, stride);
        Ok(MatrixRef {
            data: &data[..len],
            rows,
            cols,
            stride,
        })
    }

    /// Wrap a buffer whose layout the caller has already validated.
    pub(crate) fn new_unchecked(data: &'a [f64], rows: usize, cols: usize, stride: usize) -> Self {
        debug_assert!(check_layout(data.len(), rows, cols, stride).is_ok());
        MatrixRef {
            data,
            rows,
            cols,
            stride,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Row `r` as a contiguous slice of `cols` elements.
    ///
    /// # Panics
    /// Panics if `r >= rows`.
    #[inline]
    pub fn row(&self, r: usize) -> &'a [f64] {
        assert!(r < self.rows, "row {} out of range for {} rows", r, self.rows);
        if self.cols == 0 {
            return &[];
        }
        let off = r * self.stride;
        &self.data[off..off + self.cols]
    }

    /// Element at logical position (r, c).
    #[inline]
    pub fn get(&self, r: usize, c: usize) -> f64 {
        assert!(c < self.cols, "col {} out of range for {} cols", c, self.cols);
        self.row(r)[c]
    }

    /// Checked sub-view sharing this view's buffer and stride.
    ///
    /// # Errors
    /// Returns `GemmError::OutOfBounds` if the region leaves this view.
    pub fn try_view(&self, row0: usize, col0: usize, n_rows: usize, n_cols: usize) -> Result<Self> {
        check_extent(self.rows, self.cols, row0, col0, n_rows, n_cols)?;
        Ok(self.view(row0, col0, n_rows, n_cols))
    }

    /// Sub-view for callers that already hold the extent invariant.
    #[inline]
    pub(crate) fn view(&self, row0: usize, col0: usize, n_rows: usize, n_cols: usize) -> Self {
        debug_assert!(check_extent(self.rows, self.cols, row0, col0, n_rows, n_cols).is_ok());
        let len = required_len(n_rows, n_cols, self.stride);
        let data = if len == 0 {
            &self.data[..0]
        } else {
            let start = row0 * self.stride + col0;
            &self.data[start..start + len]
        };
        MatrixRef {
            data,
            rows: n_rows,
            cols: n_cols,
            stride: self.stride,
        }
    }
}

impl fmt::Debug for MatrixRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixRef")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("stride", &self.stride)
            .finish()
    }
}

/// A mutable strided matrix view.
///
/// Rows of a strided matrix interleave with the rows of its neighbours, so
/// two column-disjoint sub-views cannot both be expressed as `&mut [f64]`
/// over their full span. The view therefore keeps a raw pointer and only
/// ever materialises slices one logical row at a time.
pub struct MatrixMut<'a> {
    ptr: NonNull<f64>,
    len: usize,
    rows: usize,
    cols: usize,
    stride: usize,
    _marker: PhantomData<&'a mut [f64]>,
}

// SAFETY: a MatrixMut is an exclusive borrow of its element range, the same
// as `&mut [f64]`.
unsafe impl Send for MatrixMut<'_> {}
unsafe impl Sync for MatrixMut<'_> {}

impl<'a> MatrixMut<'a> {
    /// Wrap `data` as a mutable `rows x cols` matrix with row pitch `stride`.
    ///
    /// # Errors
    /// Returns `GemmError::Shape` if `stride < cols` or `data` is too short.
    pub fn new(data: &'a mut [f64], rows: usize, cols: usize, stride: usize) -> Result<Self> {
        check_layout(data.len(), rows, cols, stride)?;
        let len = required_len(rows, cols, stride);
        Ok(MatrixMut {
            ptr: NonNull::from(&mut data[..len]).cast::<f64>(),
            len,
            rows,
            cols,
            stride,
            _marker: PhantomData,
        })
    }

    /// Wrap a buffer whose layout the caller has already validated.
    pub(crate) fn new_unchecked(data: &'a mut [f64], rows: usize, cols: usize, stride: usize) -> Self {
        debug_assert!(check_layout(data.len(), rows, cols, stride).is_ok());
        MatrixMut {
            ptr: NonNull::from(data).cast::<f64>(),
            len: required_len(rows, cols, stride),
            rows,
            cols,
            stride,
            _marker: PhantomData,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Row `r` as a contiguous slice of `cols` elements.
    ///
    /// # Panics
    /// Panics if `r >= rows`.
    #[inline]
    pub fn row(&self, r: usize) -> &[f64] {
        assert!(r < self.rows, "row {} out of range for {} rows", r, self.rows);
        if self.cols == 0 {
            return &[];
        }
        // SAFETY: r < rows implies r * stride + cols <= len.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr().add(r * self.stride), self.cols) }
    }

    /// Row `r` as a mutable contiguous slice of `cols` elements.
    ///
    /// # Panics
    /// Panics if `r >= rows`.
    #[inline]
    pub fn row_mut(&mut self, r: usize) -> &mut [f64] {
        assert!(r < self.rows, "row {} out of range for {} rows", r, self.rows);
        if self.cols == 0 {
            return &mut [];
        }
        // SAFETY: r < rows implies r * stride + cols <= len, and `&mut self`
        // guarantees no other slice of this view is alive.
        unsafe {
            std::slice::from_raw_parts_mut(self.ptr.as_ptr().add(r * self.stride), self.cols)
        }
    }

    #[inline]
    pub fn get(&self, r: usize, c: usize) -> f64 {
        assert!(c < self.cols, "col {} out of range for {} cols", c, self.cols);
        self.row(r)[c]
    }

    #[inline]
    pub fn set(&mut self, r: usize, c: usize, value: f64) {
        assert!(c < self.cols, "col {} out of range for {} cols", c, self.cols);
        self.row_mut(r)[c] = value;
    }

    /// Read-only view of the same elements.
    pub fn as_view(&self) -> MatrixRef<'_> {
        // SAFETY: ptr is valid for len elements for the lifetime of &self.
        let data = unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) };
        MatrixRef {
            data,
            rows: self.rows,
            cols: self.cols,
            stride: self.stride,
        }
    }

    /// Shorter-lived mutable view over the same elements.
    pub fn reborrow(&mut self) -> MatrixMut<'_> {
        MatrixMut {
            ptr: self.ptr,
            len: self.len,
            rows: self.rows,
            cols: self.cols,
            stride: self.stride,
            _marker: PhantomData,
        }
    }

    /// Checked mutable sub-view sharing this view's buffer and stride.
    ///
    /// # Errors
    /// Returns `GemmError::OutOfBounds` if the region leaves this view.
    pub fn try_view_mut(
        &mut self,
        row0: usize,
        col0: usize,
        n_rows: usize,
        n_cols: usize,
    ) -> Result<MatrixMut<'_>> {
        check_extent(self.rows, self.cols, row0, col0, n_rows, n_cols)?;
        // SAFETY: extent checked; `&mut self` keeps the parent unusable while
        // the sub-view lives.
        Ok(unsafe { self.tile(row0, col0, n_rows, n_cols) })
    }

    /// Unchecked sub-view handed out from a shared reference.
    ///
    /// # Safety
    /// The region must lie inside this view, and no two sub-views alive at
    /// the same time may share an element. The parent must not be accessed
    /// through any other path while the sub-view lives.
    #[inline]
    pub(crate) unsafe fn tile(
        &self,
        row0: usize,
        col0: usize,
        n_rows: usize,
        n_cols: usize,
    ) -> MatrixMut<'a> {
        debug_assert!(check_extent(self.rows, self.cols, row0, col0, n_rows, n_cols).is_ok());
        let len = required_len(n_rows, n_cols, self.stride);
        let ptr = if len == 0 {
            self.ptr
        } else {
            NonNull::new_unchecked(self.ptr.as_ptr().add(row0 * self.stride + col0))
        };
        MatrixMut {
            ptr,
            len,
            rows: n_rows,
            cols: n_cols,
            stride: self.stride,
            _marker: PhantomData,
        }
    }
}

impl fmt::Debug for MatrixMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixMut")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("stride", &self.stride)
            .finish()
    }
}
