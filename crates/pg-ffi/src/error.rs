use std::cell::RefCell;
use std::ffi::CString;

use pg_gemm::GemmError;

use crate::types::PgStatus;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Remember `msg` as this thread's last error and return `status`.
pub(crate) fn fail(status: PgStatus, msg: String) -> PgStatus {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
    status
}

/// Record a core error and map it to its status code.
pub(crate) fn record(err: GemmError) -> PgStatus {
    let status = PgStatus::from(&err);
    fail(status, err.to_string())
}

/// Take the last error message, leaving `None` in its place.
pub(crate) fn take_last_error() -> Option<CString> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}
