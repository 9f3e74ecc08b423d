//! `pg-gemm` - blocked, parallel double-precision GEMM.
//!
//! Computes `C := beta * C + alpha * op(A) * op(B)` for row-major matrices
//! with explicit row strides. This crate provides:
//! - Strided matrix views (`MatrixRef`, `MatrixMut`) over caller buffers
//! - A block planner that tiles the output space
//! - Four serial kernels, one per transpose combination
//! - A fork-join scheduler that spreads output tiles over scoped workers
//! - BLAS-style (`dgemm`) and view-level (`multiply`) entry points
//!
//! ```
//! use pg_gemm::{dgemm, Transpose};
//!
//! let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
//! let b = [7.0, 8.0, 9.0, 10.0, 11.0, 12.0];
//! let mut c = [0.0; 4];
//! dgemm(Transpose::NoTrans, Transpose::NoTrans, 2, 2, 3, 1.0, &a, 3, &b, 2, 0.0, &mut c, 2)?;
//! assert_eq!(c, [58.0, 64.0, 139.0, 154.0]);
//! # Ok::<(), pg_gemm::GemmError>(())
//! ```

pub mod config;
pub mod error;
pub mod gemm;
pub mod general;
pub mod kernel;
pub mod plan;
pub mod scheduler;
pub mod transpose;
pub mod view;

// Re-export primary types at the crate root for convenience.
pub use config::GemmConfig;
pub use error::{GemmError, Result};
pub use gemm::{dgemm, dgemm_with_config, gemm, multiply, multiply_with_config};
pub use general::General;
pub use kernel::Kernel;
pub use plan::{BlockPlan, Tile};
pub use scheduler::Dispatch;
pub use transpose::Transpose;
pub use view::{MatrixMut, MatrixRef};
