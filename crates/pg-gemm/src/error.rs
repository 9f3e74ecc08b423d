use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GemmError {
    #[error("buffer of {len} elements cannot hold a {rows}x{cols} matrix with stride {stride}")]
    Shape {
        rows: usize,
        cols: usize,
        stride: usize,
        len: usize,
    },
    #[error("sub-view [{row0}+{rows}, {col0}+{cols}] exceeds {parent_rows}x{parent_cols} parent")]
    OutOfBounds {
        row0: usize,
        col0: usize,
        rows: usize,
        cols: usize,
        parent_rows: usize,
        parent_cols: usize,
    },
    #[error("gemm dimension mismatch: [{m}x{k}] @ [{k2}x{n}] into [{c_rows}x{c_cols}]")]
    Dimension {
        m: usize,
        k: usize,
        k2: usize,
        n: usize,
        c_rows: usize,
        c_cols: usize,
    },
    #[error("{name} = {ld} is smaller than row length {row_len}")]
    LeadingDimension {
        name: &'static str,
        ld: usize,
        row_len: usize,
    },
    #[error("invalid transpose flag: {0}")]
    InvalidFlag(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, GemmError>;
