//! Service result codes
//!
//! Control calls return a signed 32-bit result: negative values indicate
//! errors, zero indicates success, positive values may carry additional
//! information depending on the operation.

use core::fmt;

/// Error codes returned by the system-management service.
///
/// These mirror the transport's negative result codes. Codes this driver
/// does not distinguish are collapsed into [`StmError::Failed`]; the raw
/// value should be logged at the call site before conversion when it
/// matters for diagnosis.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StmError {
    /// Access to the device was denied.
    AccessDenied = -1,
    /// The resource already exists (e.g. a subscription is already
    /// registered elsewhere).
    Exists = -2,
    /// Invalid argument or malformed request.
    Invalid = -4,
    /// The service is out of request memory.
    NoMemory = -5,
    /// The device path does not exist.
    NotFound = -6,
    /// The service's request queue is full.
    QueueFull = -8,
    /// Unrecognised failure.
    Failed = -128,
}

impl StmError {
    /// Raw result code as returned by the service.
    #[inline]
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Try to convert from a raw result code.
    ///
    /// Returns `None` for non-negative values and for `-128` itself
    /// (which is only produced locally as a catch-all).
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            -1 => Some(Self::AccessDenied),
            -2 => Some(Self::Exists),
            -4 => Some(Self::Invalid),
            -5 => Some(Self::NoMemory),
            -6 => Some(Self::NotFound),
            -8 => Some(Self::QueueFull),
            _ => None,
        }
    }

    /// Error name for logging.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AccessDenied => "AccessDenied",
            Self::Exists => "Exists",
            Self::Invalid => "Invalid",
            Self::NoMemory => "NoMemory",
            Self::NotFound => "NotFound",
            Self::QueueFull => "QueueFull",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for StmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_i32())
    }
}

/// Result type for STM control operations.
pub type StmResult<T = i32> = Result<T, StmError>;

/// Check a raw result code and convert to a `Result`.
///
/// Non-negative values pass through unchanged; negative values map to
/// [`StmError`], with unknown codes collapsing to [`StmError::Failed`].
#[inline]
pub fn check(value: i32) -> StmResult {
    if value >= 0 {
        Ok(value)
    } else {
        Err(StmError::from_raw(value).unwrap_or(StmError::Failed))
    }
}
