//! Stream filter manager.
//!
//! A stream filter is the binding point of the subsystem: it joins one
//! stream (or one stream collection) to at most one flow meter and one
//! stream gate, and carries the per-stream SDU size check.
//!
//! References are soft: a filter may name a meter, gate or stream that
//! does not (yet) exist. Dangling references surface as operational
//! warnings, never as errors — the referenced entity may be created later,
//! at which point the filter re-attaches automatically. What *is* enforced
//! is exclusivity: no two filters may own the same stream or the same
//! stream collection.

mod orch;
mod types;
mod warnings;

pub use types::{FilterConfig, FilterControl, FilterStatistics, FilterStatus};
pub use warnings::FilterWarnings;

pub(crate) use types::FilterEntry;
