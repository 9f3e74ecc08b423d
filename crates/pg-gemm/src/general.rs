use crate::error::{GemmError, Result};
use crate::view::{required_len, MatrixMut, MatrixRef};

/// An owned, row-major, dense `f64` matrix with an explicit row stride.
#[derive(Debug, Clone, PartialEq)]
pub struct General {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
    stride: usize,
}

impl General {
    /// Zero-filled `rows x cols` matrix with a packed stride.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        General {
            data: vec![0.0; rows * cols],
            rows,
            cols,
            stride: cols,
        }
    }

    /// `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Matrix whose element (i, j) is `f(i, j)`.
    pub fn from_fn<F: FnMut(usize, usize) -> f64>(rows: usize, cols: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        General {
            data,
            rows,
            cols,
            stride: cols,
        }
    }

    /// Take ownership of packed row-major data.
    ///
    /// # Errors
    /// Returns `GemmError::Shape` if `data.len() != rows * cols`.
    pub fn from_vec(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(GemmError::Shape {
                rows,
                cols,
                stride: cols,
                len: data.len(),
            });
        }
        Ok(General {
            data,
            rows,
            cols,
            stride: cols,
        })
    }

    /// Take ownership of row-major data laid out with row pitch `stride`.
    ///
    /// # Errors
    /// Returns `GemmError::Shape` if `stride < cols` or `data` is too short.
    pub fn with_stride(data: Vec<f64>, rows: usize, cols: usize, stride: usize) -> Result<Self> {
        MatrixRef::new(&data, rows, cols, stride)?;
        Ok(General {
            data,
            rows,
            cols,
            stride,
        })
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

    /// The backing buffer, including any row padding.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn get(&self, r: usize, c: usize) -> f64 {
        self.as_view().get(r, c)
    }

    pub fn set(&mut self, r: usize, c: usize, value: f64) {
        self.as_view_mut().set(r, c, value);
    }

    /// Packed transpose of this matrix.
    pub fn transpose(&self) -> General {
        let view = self.as_view();
        General::from_fn(self.cols, self.rows, |i, j| view.get(j, i))
    }

    pub fn as_view(&self) -> MatrixRef<'_> {
        let len = required_len(self.rows, self.cols, self.stride);
        MatrixRef::new_unchecked(&self.data[..len], self.rows, self.cols, self.stride)
    }

    pub fn as_view_mut(&mut self) -> MatrixMut<'_> {
        let len = required_len(self.rows, self.cols, self.stride);
        MatrixMut::new_unchecked(&mut self.data[..len], self.rows, self.cols, self.stride)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_len_checked() {
        assert!(matches!(
            General::from_vec(vec![0.0; 5], 2, 3),
            Err(GemmError::Shape { len: 5, .. })
        ));
        let m = General::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert_eq!(m.get(1, 0), 4.0);
    }

    #[test]
    fn test_identity() {
        let id = General::identity(3);
        assert_eq!(id.data(), &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_with_stride() {
        let m = General::with_stride(vec![1.0, 2.0, 0.0, 3.0, 4.0], 2, 2, 3).unwrap();
        assert_eq!(m.get(1, 1), 4.0);
        assert!(General::with_stride(vec![0.0; 4], 2, 3, 2).is_err());
    }

    #[test]
    fn test_transpose_and_set() {
        let mut m = General::from_fn(2, 3, |i, j| (i * 3 + j) as f64);
        m.set(0, 2, 9.0);
        let t = m.transpose();
        assert_eq!((t.rows(), t.cols()), (3, 2));
        assert_eq!(t.get(2, 0), 9.0);
        assert_eq!(t.get(1, 1), 4.0);
    }
}
