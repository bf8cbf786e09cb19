//! Shared value types for the TSN PSFP subsystem.
//!
//! This crate holds the small, copyable types that cross crate boundaries:
//! the per-entity instance-id newtypes and the PTP [`Timestamp`] used to
//! anchor stream gate schedules.

mod ids;
mod timestamp;

pub use ids::{FilterId, FlowMeterId, GateId, StreamCollectionId, StreamId};
pub use timestamp::Timestamp;
