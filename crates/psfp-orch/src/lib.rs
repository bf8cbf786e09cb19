//! Per-stream filtering and policing orchestrator.
//!
//! This crate implements time-aware per-stream traffic admission control
//! for a switch ASIC: flow metering (policing), cyclic stream gating
//! (time-based admission anchored at an absolute base time) and stream
//! filters binding a traffic stream to at most one gate and one meter.
//!
//! # Architecture
//!
//! ```text
//! management plane (CLI / SNMP / JSON glue)
//!      │
//!      ▼
//!   PsfpOrch ──────────────┬──> PsfpHardware (policer / gate / GCL / filter)
//!      │                   │
//!      ├── flow meters     └──> StreamCatalog (stream attach + counters)
//!      ├── stream gates ──> tsn-timer (base-time staging)
//!      └── stream filters
//! ```
//!
//! All state lives behind one coarse lock; public operations and timer
//! dispatches are fully serialized. The only background thread is the
//! timer engine's worker, used to stage gate base times that lie beyond
//! the hardware's bounded base-time horizon.

pub mod capabilities;
pub mod error;
pub mod filter;
pub mod flow_meter;
pub mod gate;
pub mod orch;
pub mod stream;

pub use capabilities::PsfpCapabilities;
pub use error::{BindingKind, EntityKind, PsfpError, PsfpResult, ValidationError};
pub use filter::{
    FilterConfig, FilterControl, FilterStatistics, FilterStatus, FilterWarnings,
};
pub use flow_meter::{ColorMode, FlowMeterConfig, FlowMeterControl, FlowMeterStatus};
pub use gate::{GateConfig, GateControl, GateControlEntry, GateState, GateStatus, GCL_LENGTH_MAX};
pub use orch::{PsfpOptions, PsfpOrch};
pub use stream::{
    ClientAttachment, StreamAction, StreamBinding, StreamCapabilities, StreamCatalog,
    StreamChange, StreamClient, StreamEvent, StreamStatus,
};
