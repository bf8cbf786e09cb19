//! Driver status codes and error type.

use std::fmt;
use thiserror::Error;

/// Raw status codes returned by the switch driver.
///
/// The driver collapses most failure detail into a generic failure code;
/// the few distinguished codes are kept because the orchestrator maps them
/// onto its own taxonomy (resource exhaustion in particular).
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HalStatus {
    Ok = 0,
    Failure = -1,
    NotSupported = -2,
    NoMemory = -3,
    InsufficientResources = -4,
    InvalidParameter = -5,
    NotFound = -6,
    Uninitialized = -7,
}

impl HalStatus {
    /// Creates a status from a raw driver return value. Unknown codes map
    /// to `Failure`.
    pub fn from_raw(status: i32) -> Self {
        match status {
            0 => HalStatus::Ok,
            -2 => HalStatus::NotSupported,
            -3 => HalStatus::NoMemory,
            -4 => HalStatus::InsufficientResources,
            -5 => HalStatus::InvalidParameter,
            -6 => HalStatus::NotFound,
            -7 => HalStatus::Uninitialized,
            _ => HalStatus::Failure,
        }
    }

    /// Returns true if the status indicates success.
    pub fn is_ok(&self) -> bool {
        *self == HalStatus::Ok
    }

    /// Converts to a `Result`, returning `Ok(())` on success.
    pub fn into_result(self) -> HalResult<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(HalError::Status { status: self })
        }
    }
}

impl fmt::Display for HalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HalStatus::Ok => "HAL_OK",
            HalStatus::Failure => "HAL_FAILURE",
            HalStatus::NotSupported => "HAL_NOT_SUPPORTED",
            HalStatus::NoMemory => "HAL_NO_MEMORY",
            HalStatus::InsufficientResources => "HAL_INSUFFICIENT_RESOURCES",
            HalStatus::InvalidParameter => "HAL_INVALID_PARAMETER",
            HalStatus::NotFound => "HAL_NOT_FOUND",
            HalStatus::Uninitialized => "HAL_UNINITIALIZED",
        };
        write!(f, "{}", s)
    }
}

/// Error type for driver operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// The driver returned an error status.
    #[error("driver call failed: {status}")]
    Status { status: HalStatus },

    /// The driver ran out of a hardware resource pool.
    #[error("out of hardware resources: {resource}")]
    OutOfResources { resource: String },

    /// Internal driver-wrapper error.
    #[error("internal driver error: {message}")]
    Internal { message: String },
}

impl HalError {
    /// Creates a resource-exhaustion error.
    pub fn out_of_resources(resource: impl Into<String>) -> Self {
        HalError::OutOfResources {
            resource: resource.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        HalError::Internal {
            message: message.into(),
        }
    }

    /// Returns true if the error reports hardware resource exhaustion.
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, HalError::OutOfResources { .. })
            || matches!(
                self,
                HalError::Status {
                    status: HalStatus::InsufficientResources | HalStatus::NoMemory
                }
            )
    }
}

/// Result type for driver operations.
pub type HalResult<T> = Result<T, HalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_raw() {
        assert_eq!(HalStatus::from_raw(0), HalStatus::Ok);
        assert_eq!(HalStatus::from_raw(-6), HalStatus::NotFound);
        assert_eq!(HalStatus::from_raw(-999), HalStatus::Failure);
    }

    #[test]
    fn test_into_result() {
        assert!(HalStatus::Ok.into_result().is_ok());
        assert!(HalStatus::Failure.into_result().is_err());
    }

    #[test]
    fn test_resource_exhaustion() {
        assert!(HalError::out_of_resources("policer pool").is_resource_exhaustion());
        assert!(HalStatus::InsufficientResources
            .into_result()
            .unwrap_err()
            .is_resource_exhaustion());
        assert!(!HalStatus::NotFound
            .into_result()
            .unwrap_err()
            .is_resource_exhaustion());
    }
}
