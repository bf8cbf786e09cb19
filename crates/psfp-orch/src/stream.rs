//! Boundary to the external stream / stream-collection module.
//!
//! Streams and stream collections are owned by a separate subsystem; PSFP
//! only references them by id, attaches per-stream actions to them, and
//! reads their ingress counters. The stream module arbitrates between the
//! clients that may claim a stream (PSFP among them) and pushes change
//! notifications that the filter manager reacts to via
//! [`PsfpOrch::on_stream_event`](crate::orch::PsfpOrch::on_stream_event).

use std::fmt;
use tsn_hal::{IngressCounters, PolicerHandle};
use tsn_types::{FilterId, StreamCollectionId, StreamId};

/// Stream-module limits, folded into the capability snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamCapabilities {
    pub stream_id_max: u32,
    pub stream_collection_id_max: u32,
}

/// The clients that may claim a stream. The stream module keeps one
/// attachment slot per client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamClient {
    /// Per-stream filtering and policing (this subsystem).
    Psfp,
    /// Frame replication and elimination.
    Frer,
}

/// Attachment state of one client slot on a stream or collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientAttachment {
    pub enabled: bool,
    /// The client's own instance id (a filter id for PSFP).
    pub client_id: u32,
}

/// Status of a stream or stream collection, as far as PSFP cares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStatus {
    /// The stream (collection) itself reports operational warnings, which
    /// propagate into the warnings of a filter bound to it.
    pub has_oper_warnings: bool,
    /// State of the PSFP client slot.
    pub psfp: ClientAttachment,
}

/// The action descriptor a filter pushes onto its stream or collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamAction {
    pub enabled: bool,
    /// Identifies the owning filter instance.
    pub client_id: u32,
    /// Request cut-through forwarding; the stream module arbitrates
    /// between PSFP and FRER.
    pub cut_through_override: bool,
    pub cut_through_disable: bool,
    /// Policer to meter the stream with, if the filter has a flow meter
    /// bound and it exists.
    pub policer: Option<PolicerHandle>,
    /// Hardware filter instance frames of this stream are subjected to.
    pub filter: Option<FilterId>,
}

/// A filter's stream-side binding: exactly one of stream or collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamBinding {
    Stream(StreamId),
    Collection(StreamCollectionId),
}

impl fmt::Display for StreamBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamBinding::Stream(id) => write!(f, "stream {}", id),
            StreamBinding::Collection(id) => write!(f, "stream collection {}", id),
        }
    }
}

/// What happened to a stream or collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamChange {
    Added,
    Modified,
    Deleted,
}

/// One entry of the stream module's change notification feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamEvent {
    pub binding: StreamBinding,
    pub change: StreamChange,
}

/// Access to the external stream / stream-collection module.
///
/// Implementations wrap the stream subsystem; tests substitute mocks.
/// Lookups answer `None` for ids that have not been created — a normal,
/// recoverable state surfaced as a filter warning, never an error.
pub trait StreamCatalog: Send + Sync {
    /// One-shot limit query, used by the capability provider.
    fn capabilities(&self) -> StreamCapabilities;

    /// Status of a stream or collection, `None` if it does not exist.
    fn status(&self, binding: StreamBinding) -> Option<StreamStatus>;

    /// Installs (or clears, with `action.enabled == false`) a client's
    /// action on a stream or collection.
    fn action_set(
        &self,
        binding: StreamBinding,
        client: StreamClient,
        action: &StreamAction,
    ) -> Result<(), String>;

    /// Ingress counters of the stream or collection.
    fn counters(&self, binding: StreamBinding) -> Result<IngressCounters, String>;

    /// Clears the ingress counters of the stream or collection.
    fn counters_clear(&self, binding: StreamBinding) -> Result<(), String>;
}
