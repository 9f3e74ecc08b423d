use std::fmt;

use crate::error::{GemmError, Result};

/// Whether an operand enters the product as stored or transposed.
///
/// The raw integer codes follow the CBLAS convention (`111` / `112`).
/// Conjugate transpose (`113`) has no meaning for real matrices and is
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transpose {
    NoTrans,
    Trans,
}

impl Transpose {
    pub const NO_TRANS_CODE: i32 = 111;
    pub const TRANS_CODE: i32 = 112;

    /// Returns true for [`Transpose::Trans`].
    pub fn is_trans(self) -> bool {
        self == Transpose::Trans
    }

    /// The CBLAS integer code for this flag.
    pub fn code(self) -> i32 {
        match self {
            Transpose::NoTrans => Self::NO_TRANS_CODE,
            Transpose::Trans => Self::TRANS_CODE,
        }
    }

    /// Logical (rows, cols) of op(X) for a matrix stored as `rows x cols`.
    pub fn apply(self, rows: usize, cols: usize) -> (usize, usize) {
        match self {
            Transpose::NoTrans => (rows, cols),
            Transpose::Trans => (cols, rows),
        }
    }
}

impl From<bool> for Transpose {
    fn from(trans: bool) -> Self {
        if trans {
            Transpose::Trans
        } else {
            Transpose::NoTrans
        }
    }
}

impl TryFrom<i32> for Transpose {
    type Error = GemmError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            Self::NO_TRANS_CODE => Ok(Transpose::NoTrans),
            Self::TRANS_CODE => Ok(Transpose::Trans),
            other => Err(GemmError::InvalidFlag(format!(
                "code {} (expected {} or {})",
                other,
                Self::NO_TRANS_CODE,
                Self::TRANS_CODE
            ))),
        }
    }
}

impl TryFrom<char> for Transpose {
    type Error = GemmError;

    fn try_from(c: char) -> Result<Self> {
        match c {
            'N' | 'n' => Ok(Transpose::NoTrans),
            'T' | 't' => Ok(Transpose::Trans),
            other => Err(GemmError::InvalidFlag(format!(
                "character {:?} (expected 'N' or 'T')",
                other
            ))),
        }
    }
}

impl fmt::Display for Transpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transpose::NoTrans => write!(f, "N"),
            Transpose::Trans => write!(f, "T"),
        }
    }
}
