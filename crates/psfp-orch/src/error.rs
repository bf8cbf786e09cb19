//! Orchestrator error taxonomy.

use log::error;
use std::fmt;
use thiserror::Error;
use tsn_hal::HalError;

/// The entity kinds the orchestrator manages or references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    FlowMeter,
    Gate,
    Filter,
    Stream,
    StreamCollection,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::FlowMeter => "flow meter",
            EntityKind::Gate => "stream gate",
            EntityKind::Filter => "stream filter",
            EntityKind::Stream => "stream",
            EntityKind::StreamCollection => "stream collection",
        };
        write!(f, "{}", s)
    }
}

/// Which binding kind a filter conflict is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    Stream,
    StreamCollection,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BindingKind::Stream => "stream",
            BindingKind::StreamCollection => "stream collection",
        };
        write!(f, "{}", s)
    }
}

/// Field-level configuration rules, checked before any mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("a stream and a stream collection cannot be bound at the same time")]
    BothStreamAndCollection,

    #[error("invalid priority value {ipv}; valid range is 0 to 7")]
    InvalidIpv { ipv: u8 },

    #[error("invalid cycle time {cycle_time_ns} ns; valid range is 0 to 1,000,000,000")]
    InvalidCycleTime { cycle_time_ns: u32 },

    #[error("invalid cycle time extension {extension_ns} ns; valid range is 0 to 1,000,000,000")]
    InvalidCycleTimeExtension { extension_ns: u32 },

    #[error("invalid gate control list length {length}; at most {max} entries are supported")]
    InvalidGclLength { length: u32, max: u32 },

    #[error("gate control entry {index}: invalid priority value {ipv}; valid range is 0 to 7")]
    InvalidGceIpv { index: usize, ipv: u8 },

    #[error(
        "gate control entry {index}: invalid time interval {interval_ns} ns; \
         valid range is 1 to 999,999,999"
    )]
    InvalidGceTimeInterval { index: usize, interval_ns: u32 },

    #[error(
        "the sum of the active gate control entries' time intervals ({total_ns} ns) \
         exceeds the cycle time ({cycle_time_ns} ns)"
    )]
    CycleTimeExceeded { total_ns: u64, cycle_time_ns: u32 },
}

/// Orchestrator error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PsfpError {
    /// PSFP is not supported on this platform.
    #[error("PSFP is not supported on this platform")]
    NotSupported,

    /// A request argument is malformed.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// An instance id is outside the platform's range for its kind.
    #[error("{kind} id {id} is out of range (max {max})")]
    OutOfRange { kind: EntityKind, id: u32, max: u32 },

    /// The referenced instance has not been created.
    #[error("no such {kind} instance: {id}")]
    NoSuchInstance { kind: EntityKind, id: u32 },

    /// Out of memory.
    #[error("out of memory")]
    OutOfMemory,

    /// The hardware resource pool backing the request is exhausted.
    #[error("out of hardware resources")]
    OutOfHardwareResource,

    /// Another filter already owns the same stream or collection binding.
    #[error("another stream filter is using the same {0}")]
    Conflict(BindingKind),

    /// A field-level configuration rule was violated.
    #[error("{0}")]
    ValidationFailed(#[from] ValidationError),

    /// An underlying driver call failed. Indicates a subsystem defect, not
    /// a user error; details are on the log.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for orchestrator operations.
pub type PsfpResult<T> = Result<T, PsfpError>;

/// Logs a failed driver call and converts it into the taxonomy.
///
/// Driver failures are undifferentiated from the caller's point of view;
/// resource exhaustion is the one distinction kept.
pub(crate) fn driver_failure(op: &str, err: HalError) -> PsfpError {
    error!("{} failed: {}", op, err);
    if err.is_resource_exhaustion() {
        PsfpError::OutOfHardwareResource
    } else {
        PsfpError::Internal(format!("{} failed: {}", op, err))
    }
}
