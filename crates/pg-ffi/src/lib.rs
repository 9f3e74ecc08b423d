mod error;
mod types;

pub use types::*;

use std::ffi::CString;
use std::os::raw::c_char;

use pg_gemm::Transpose;

use crate::error::{fail, record};

/// Execute a closure that returns a `PgStatus`, catching any panics
/// and converting them into `PgStatus::ErrorInternal`.
fn catch_panic<F: FnOnce() -> PgStatus + std::panic::UnwindSafe>(f: F) -> PgStatus {
    match std::panic::catch_unwind(f) {
        Ok(status) => status,
        Err(_) => fail(PgStatus::ErrorInternal, "internal panic".to_string()),
    }
}

/// Build a slice from a pointer and element count. A null pointer is only
/// accepted together with a zero length.
unsafe fn slice_arg<'a>(name: &str, ptr: *const f64, len: usize) -> Result<&'a [f64], PgStatus> {
    if ptr.is_null() {
        if len == 0 {
            return Ok(&[]);
        }
        return Err(fail(
            PgStatus::ErrorInvalidArgument,
            format!("{} is null but has length {}", name, len),
        ));
    }
    Ok(std::slice::from_raw_parts(ptr, len))
}

unsafe fn slice_arg_mut<'a>(
    name: &str,
    ptr: *mut f64,
    len: usize,
) -> Result<&'a mut [f64], PgStatus> {
    if ptr.is_null() {
        if len == 0 {
            return Ok(&mut []);
        }
        return Err(fail(
            PgStatus::ErrorInvalidArgument,
            format!("{} is null but has length {}", name, len),
        ));
    }
    Ok(std::slice::from_raw_parts_mut(ptr, len))
}

fn transpose_arg(code: i32) -> Result<Transpose, PgStatus> {
    Transpose::try_from(code).map_err(record)
}

/// Compute `C := beta * C + alpha * op(A) * op(B)` on row-major buffers.
///
/// `trans_a` / `trans_b` take `PG_NO_TRANS` (111) or `PG_TRANS` (112).
/// op(A) is `m x k`, op(B) is `k x n`, C is `m x n`; `lda`, `ldb` and `ldc`
/// are row pitches of the matrices as stored. `a_len`, `b_len` and `c_len`
/// are the element counts of the buffers. C is not modified unless the call
/// returns `PgStatus::Ok`.
///
/// # Safety
/// Each non-null pointer must be valid for its given length, and `c` must not
/// alias `a` or `b`.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn pg_dgemm(
    trans_a: i32,
    trans_b: i32,
    m: usize,
    n: usize,
    k: usize,
    alpha: f64,
    a: *const f64,
    a_len: usize,
    lda: usize,
    b: *const f64,
    b_len: usize,
    ldb: usize,
    beta: f64,
    c: *mut f64,
    c_len: usize,
    ldc: usize,
) -> PgStatus {
    catch_panic(|| {
        let run = || -> Result<(), PgStatus> {
            let t_a = transpose_arg(trans_a)?;
            let t_b = transpose_arg(trans_b)?;
            let a = unsafe { slice_arg("a", a, a_len)? };
            let b = unsafe { slice_arg("b", b, b_len)? };
            let c = unsafe { slice_arg_mut("c", c, c_len)? };
            pg_gemm::dgemm(t_a, t_b, m, n, k, alpha, a, lda, b, ldb, beta, c, ldc).map_err(record)
        };
        match run() {
            Ok(()) => PgStatus::Ok,
            Err(status) => status,
        }
    })
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error on this
/// thread, or null if no error has occurred. The caller must free the
/// returned string with `pg_free_string`.
#[no_mangle]
pub extern "C" fn pg_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `pg_last_error`.
///
/// # Safety
/// `s` must be null or a pointer obtained from `pg_last_error`.
#[no_mangle]
pub unsafe extern "C" fn pg_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
