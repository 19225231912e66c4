//! Server registry error types
//!
//! Every registry operation reports failure through [`ServerError`]. The
//! variants mirror the status words RPC servers put into their replies, so
//! dispatch glue can forward them with [`ServerError::code`].

use core::fmt;

/// Status word for a successful operation.
pub const STATUS_SUCCESS: i32 = 0;

/// Errors returned by the context and handle registries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[must_use = "server errors must be handled"]
pub enum ServerError {
    /// A parameter was missing or out of range.
    ///
    /// Checked before any side effect; the registry is unchanged.
    InvalidParameter,

    /// A fixed pool or buffer is exhausted, or an allocation failed.
    ///
    /// Not retried internally. The caller has to free a slot or handle,
    /// or build the component with a larger bound.
    InsufficientSpace,

    /// The handle is not tracked by the table.
    InvalidHandle,

    /// The operation is not permitted in the current state.
    ///
    /// Returned when adding a handle that is already present.
    OperationDenied,

    /// Construction of a per-client resource failed earlier.
    ///
    /// Also used by callers to report failures of their own backing
    /// stores through the same status channel.
    Aborted,
}

impl ServerError {
    /// Get a short description of the error.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidParameter => "invalid parameter",
            Self::InsufficientSpace => "insufficient space",
            Self::InvalidHandle => "invalid handle",
            Self::OperationDenied => "operation denied",
            Self::Aborted => "operation aborted",
        }
    }

    /// Convert to the status word carried in an RPC reply.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::InvalidParameter => -3,
            Self::InsufficientSpace => -4,
            Self::InvalidHandle => -5,
            Self::OperationDenied => -6,
            Self::Aborted => -7,
        }
    }

    /// Convert from a reply status word.
    ///
    /// Returns `None` for [`STATUS_SUCCESS`] and for unknown codes.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            -3 => Some(Self::InvalidParameter),
            -4 => Some(Self::InsufficientSpace),
            -5 => Some(Self::InvalidHandle),
            -6 => Some(Self::OperationDenied),
            -7 => Some(Self::Aborted),
            _ => None,
        }
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result type for registry operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Status word for any registry result.
#[must_use]
pub fn status_code<T>(result: &ServerResult<T>) -> i32 {
    match result {
        Ok(_) => STATUS_SUCCESS,
        Err(err) => err.code(),
    }
}
