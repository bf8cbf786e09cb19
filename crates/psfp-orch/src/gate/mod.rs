//! Stream gate manager.
//!
//! A stream gate admits or discards frames on a cyclic schedule (the gate
//! control list) anchored at an absolute PTP base time. Configuration is
//! two-phase: an accepted config becomes *pending* and is handed to the
//! hardware together with a base time; the hardware adopts it when that
//! instant arrives, at which point the software promotes it to the
//! *operational* config on the next status read.
//!
//! On some chip families the base-time comparator is truncated, so a base
//! time further than a bounded horizon from current time cannot be
//! programmed directly. For those, the pending base time is staged: the
//! hardware gets "now + horizon" and a software timer re-runs the decision
//! shortly before that point, hopping forward until the remainder fits.

mod orch;
mod types;

pub use types::{GateConfig, GateControl, GateControlEntry, GateState, GateStatus, GCL_LENGTH_MAX};

pub(crate) use types::GateEntry;
