//! Deadline-ordered timer engine.
//!
//! A [`TimerTable`] holds timer descriptors (one-shot or periodic) inside
//! some larger state structure `S`; a [`TimerHost`] wraps `S` in the single
//! subsystem lock and runs one worker thread that sleeps until the earliest
//! active deadline and dispatches due timers through the [`TimerDispatch`]
//! trait.
//!
//! Every timer operation and every dispatch runs while the subsystem lock
//! is held, so dispatches can never interleave with other calls into `S`.
//!
//! # Contract
//!
//! Timer ids are handed out by [`TimerTable::init`] and stay valid until
//! [`TimerTable::free`]. Using an id outside that window, or starting a
//! periodic timer with a zero period, is a programming error and panics.

mod driver;
mod table;

pub use driver::{TimerDispatch, TimerHost, TimerWorker};
pub use table::{TimerId, TimerTable};
