//! Hardware driver boundary for the TSN PSFP subsystem.
//!
//! The switch driver exposes synchronous alloc/free/get/set calls for
//! policers, stream gates, gate control lists and stream filters, plus
//! status and counter reads. This crate wraps that surface in safe Rust:
//! raw status codes become [`HalError`], driver structs become plain data
//! types, and the whole API is gathered behind the [`PsfpHardware`] trait
//! so the orchestrator can be driven against mock hardware in tests.
//!
//! Driver calls are treated as fast, synchronous and non-blocking; the
//! orchestrator never retries a failed call.

mod api;
mod error;
mod types;

pub use api::PsfpHardware;
pub use error::{HalError, HalResult, HalStatus};
pub use types::{
    HalCapabilities, HalFilterConfig, HalFilterStatus, HalGateConfig, HalGateSchedule,
    HalGateStatus, HalGce, HalPolicerConfig, HalPolicerStatus, IngressCounters, OptBool,
    PolicerHandle,
};
