use pg_gemm::GemmError;

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PgStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorShape = 2,
    ErrorDimension = 3,
    ErrorInvalidFlag = 4,
    ErrorInternal = 5,
}

impl From<&GemmError> for PgStatus {
    fn from(err: &GemmError) -> Self {
        match err {
            GemmError::Shape { .. } | GemmError::OutOfBounds { .. } => PgStatus::ErrorShape,
            GemmError::Dimension { .. } | GemmError::LeadingDimension { .. } => {
                PgStatus::ErrorDimension
            }
            GemmError::InvalidFlag(_) => PgStatus::ErrorInvalidFlag,
            GemmError::InvalidConfig(_) => PgStatus::ErrorInvalidArgument,
        }
    }
}

/// CBLAS code for an untransposed operand.
pub const PG_NO_TRANS: i32 = 111;
/// CBLAS code for a transposed operand.
pub const PG_TRANS: i32 = 112;
